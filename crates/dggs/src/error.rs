//! Error types for the DGGS query helper.

use thiserror::Error;

/// Longest slice of an error response body kept in messages.
pub(crate) const ERROR_BODY_LIMIT: usize = 200;

/// Errors produced by the DGGS client.
#[derive(Error, Debug)]
pub enum DggsError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP Error {status}: {message}")]
    Status { status: u16, message: String },

    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("extent transform failed: {0}")]
    Transform(#[from] copstac_core::Error),

    #[error("client error: {0}")]
    Client(String),
}

impl DggsError {
    /// Build the error for a non-success HTTP response.
    ///
    /// The body is truncated; 400 responses carry a list of likely causes.
    pub fn from_status(status: u16, reason: &str, body: &str) -> Self {
        let mut message = reason.to_string();
        let body = body.trim();
        if !body.is_empty() {
            message.push_str("\nDetails: ");
            message.extend(body.chars().take(ERROR_BODY_LIMIT));
        }
        if status == 400 {
            message.push_str(
                "\n\nPossible causes:\n\
                 - Bounding box too large (try a smaller area)\n\
                 - Invalid DGGS CRS parameter\n\
                 - Invalid zone ID",
            );
        }
        Self::Status { status, message }
    }

    /// HTTP status code, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result alias for DGGS operations.
pub type Result<T> = std::result::Result<T, DggsError>;
