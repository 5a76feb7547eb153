//! # COP-STAC DGGS
//!
//! Query helper for SRTM elevation data indexed by Discrete Global Grid
//! System zones, served by an OGC API endpoint (GNOSIS Earth by default).
//!
//! ```no_run
//! use copstac_core::Extent;
//! use copstac_dggs::{DggsClientBlocking, DggsClientOptions};
//!
//! let mut client = DggsClientBlocking::new(DggsClientOptions::default())?;
//! let summary = client.get_coverage_summary(&Extent::new(-122.5, 37.7, -122.3, 37.9), "rHEALPix-R12");
//! println!("{} features", summary.feature_count);
//! # Ok::<(), copstac_dggs::DggsError>(())
//! ```

pub mod blocking;
pub mod client;
pub mod error;
pub mod models;

pub use blocking::DggsClientBlocking;
pub use client::{
    available_dggs_crs, DggsClient, DggsClientOptions, DEFAULT_BASE_URL, DEFAULT_COLLECTION,
    DEFAULT_DGGS_CRS, DEFAULT_ZONE_LEVEL,
};
pub use error::{DggsError, Result};
pub use models::{CoverageSummary, DggsFeature, ElevationStats, FeatureCollection};
