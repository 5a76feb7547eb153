//! # COP-STAC Catalog
//!
//! Exports map layers as a STAC 1.0.0 catalog carrying the COP (Common
//! Operating Picture) extension.
//!
//! - [`sanitize_id`] / [`IdRegistry`]: item identifiers from layer names
//! - [`create_stac_item`] / [`create_collection`]: document assembly
//! - [`StacCopExporter`]: writes assets, items, the optional collection and
//!   the ZIP archive
//!
//! ```no_run
//! use copstac_catalog::{CopMetadata, ExportOptions, StacCopExporter};
//! use copstac_core::{Layer, VectorLayer};
//!
//! let layer: Layer = VectorLayer::open("Roads", "roads.geojson", None)?.into();
//! let mut exporter = StacCopExporter::new("out", ExportOptions::default())?;
//! let report = exporter.export_layers(&[layer], &CopMetadata::default())?;
//! println!("{} items", report.items.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod archive;
pub mod assembler;
pub mod error;
pub mod exporter;
pub mod metadata;
pub mod sanitize;
pub mod stac_models;

pub use archive::ArchiveInfo;
pub use assembler::{create_collection, create_stac_item, relative_href};
pub use error::{ExportError, Result};
pub use exporter::{ExportOptions, ExportReport, LayerFailure, StacCopExporter};
pub use metadata::{Classification, CopMetadata, EmptyFieldPolicy};
pub use sanitize::{sanitize_id, IdRegistry};
pub use stac_models::{StacCollection, StacItem, COP_EXTENSION_URL, STAC_VERSION};
