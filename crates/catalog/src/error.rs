//! Error types for catalog export.

use thiserror::Error;

/// Errors produced while exporting layers to a STAC catalog.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("layer '{layer}' could not be exported: {reason}")]
    Layer { layer: String, reason: String },

    #[error("cannot transform extent of layer '{layer}' to WGS84: {source}")]
    Transform {
        layer: String,
        #[source]
        source: copstac_core::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("required metadata field '{0}' is empty")]
    MissingField(&'static str),

    #[error("unknown classification '{0}' (expected one of: public-release, internal, confidential, restricted, classified)")]
    InvalidClassification(String),
}

/// Result alias for catalog operations.
pub type Result<T> = std::result::Result<T, ExportError>;
