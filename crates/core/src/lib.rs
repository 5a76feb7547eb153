//! # COP-STAC Core
//!
//! Layer model, coordinate reference systems and geospatial I/O shared by
//! the catalog assembler and the DGGS query helper.
//!
//! This crate provides:
//! - `Layer`: tagged vector/raster layer descriptor
//! - `Extent`: axis-aligned bounding rectangle
//! - `CRS`: Coordinate Reference System handling
//! - `CrsTransform`: reprojection of extents and geometries to WGS84
//! - I/O for GeoJSON feature collections and GeoTIFF headers

pub mod crs;
pub mod error;
pub mod extent;
pub mod io;
pub mod layer;
pub mod raster;
pub mod reproject;
pub mod vector;

pub use crs::CRS;
pub use error::{Error, Result};
pub use extent::Extent;
pub use layer::{Layer, LayerKind, RasterLayer, VectorLayer};
pub use reproject::{BuiltinTransform, CrsTransform};
