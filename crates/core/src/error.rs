//! Error types for COP-STAC core

use thiserror::Error;

/// Main error type for layer, CRS and I/O operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("Invalid GeoTIFF {path}: {reason}")]
    InvalidGeoTiff { path: String, reason: String },

    #[error("Unsupported CRS transform: {from} -> {to}")]
    UnsupportedTransform { from: String, to: String },

    #[error("Invalid extent: ({min_x}, {min_y}, {max_x}, {max_y})")]
    InvalidExtent {
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
    },

    #[error("Layer '{0}' has no spatial extent")]
    EmptyLayer(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;
