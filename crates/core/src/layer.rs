//! Map layers as a tagged vector/raster variant.
//!
//! Both kinds expose the same surface (display name, CRS, extent, data
//! source); the kind is decided once when the layer is opened.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::extent::Extent;
use crate::io::{read_geojson, read_geotiff_info, write_geojson};
use crate::reproject::CrsTransform;
use crate::vector::{collection_extent, reproject_collection, FeatureCollection};

/// Geometry/raster kind of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Vector,
    Raster,
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vector => write!(f, "vector"),
            Self::Raster => write!(f, "raster"),
        }
    }
}

/// A vector layer held in memory.
#[derive(Debug, Clone)]
pub struct VectorLayer {
    name: String,
    crs: CRS,
    features: FeatureCollection,
    source: Option<PathBuf>,
}

impl VectorLayer {
    pub fn new(name: impl Into<String>, crs: CRS, features: FeatureCollection) -> Self {
        Self {
            name: name.into(),
            crs,
            features,
            source: None,
        }
    }

    /// Open a GeoJSON file. Coordinates are taken to be in `crs`, or
    /// WGS84 when not given (RFC 7946).
    pub fn open(name: impl Into<String>, path: impl AsRef<Path>, crs: Option<CRS>) -> Result<Self> {
        let path = path.as_ref();
        let features = read_geojson(path)?;
        debug!("Read {} features from {}", features.features.len(), path.display());
        let mut layer = Self::new(name, crs.unwrap_or_default(), features);
        layer.source = Some(path.to_path_buf());
        Ok(layer)
    }

    pub fn features(&self) -> &FeatureCollection {
        &self.features
    }

    /// Write the layer as a WGS84 GeoJSON FeatureCollection.
    pub fn write_geojson_wgs84(&self, transform: &dyn CrsTransform, path: &Path) -> Result<()> {
        let geographic = reproject_collection(&self.features, transform, &self.crs, &CRS::wgs84())?;
        write_geojson(&geographic, path)
    }
}

/// A raster layer referenced by its source file.
#[derive(Debug, Clone)]
pub struct RasterLayer {
    name: String,
    crs: CRS,
    extent: Extent,
    source: PathBuf,
}

impl RasterLayer {
    pub fn new(name: impl Into<String>, crs: CRS, extent: Extent, source: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            crs,
            extent,
            source: source.into(),
        }
    }

    /// Open a GeoTIFF, taking extent and CRS from its header.
    ///
    /// `crs` overrides the header CRS; one of the two must be present.
    pub fn open(name: impl Into<String>, path: impl AsRef<Path>, crs: Option<CRS>) -> Result<Self> {
        let path = path.as_ref();
        let info = read_geotiff_info(path)?;
        let crs = crs.or_else(|| info.crs.clone()).ok_or_else(|| Error::InvalidGeoTiff {
            path: path.display().to_string(),
            reason: "no CRS in GeoKey directory; specify one explicitly".into(),
        })?;
        debug!(
            "Raster {}: {}x{} in {}",
            path.display(),
            info.width,
            info.height,
            crs
        );
        Ok(Self::new(name, crs, info.extent(), path))
    }

    /// Replace the header extent.
    pub fn with_extent(mut self, extent: Extent) -> Self {
        self.extent = extent;
        self
    }
}

/// A map layer selected for export.
#[derive(Debug, Clone)]
pub enum Layer {
    Vector(VectorLayer),
    Raster(RasterLayer),
}

impl Layer {
    /// Display name.
    pub fn name(&self) -> &str {
        match self {
            Self::Vector(v) => &v.name,
            Self::Raster(r) => &r.name,
        }
    }

    pub fn kind(&self) -> LayerKind {
        match self {
            Self::Vector(_) => LayerKind::Vector,
            Self::Raster(_) => LayerKind::Raster,
        }
    }

    pub fn crs(&self) -> &CRS {
        match self {
            Self::Vector(v) => &v.crs,
            Self::Raster(r) => &r.crs,
        }
    }

    /// Extent in the layer's own CRS.
    pub fn extent(&self) -> Result<Extent> {
        match self {
            Self::Vector(v) => {
                collection_extent(&v.features)?.ok_or_else(|| Error::EmptyLayer(v.name.clone()))
            }
            Self::Raster(r) => Ok(r.extent),
        }
    }

    /// Path of the underlying data, if the layer came from a file.
    pub fn source(&self) -> Option<&Path> {
        match self {
            Self::Vector(v) => v.source.as_deref(),
            Self::Raster(r) => Some(&r.source),
        }
    }
}

impl From<VectorLayer> for Layer {
    fn from(layer: VectorLayer) -> Self {
        Self::Vector(layer)
    }
}

impl From<RasterLayer> for Layer {
    fn from(layer: RasterLayer) -> Self {
        Self::Raster(layer)
    }
}
