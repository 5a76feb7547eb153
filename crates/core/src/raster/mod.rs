//! Raster grid georeferencing

mod geotransform;

pub use geotransform::GeoTransform;

use serde::{Deserialize, Serialize};

use crate::crs::CRS;
use crate::extent::Extent;

/// Header-level description of a raster dataset: size, georeferencing and
/// CRS. Pixel data is never loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterInfo {
    pub width: u32,
    pub height: u32,
    pub transform: GeoTransform,
    /// CRS from the GeoKey directory, if one was declared.
    pub crs: Option<CRS>,
}

impl RasterInfo {
    /// Extent covered by the full grid in the raster's own CRS.
    pub fn extent(&self) -> Extent {
        self.transform
            .bounds(self.width as usize, self.height as usize)
    }
}
