//! Layer manifest: the list of layers handed to `copstac export`.
//!
//! ```json
//! {"layers": [
//!   {"name": "Roads", "kind": "vector", "source": "roads.geojson"},
//!   {"name": "Terrain", "kind": "raster", "source": "dem.tif", "crs": "EPSG:32630"}
//! ]}
//! ```
//!
//! Relative sources are resolved against the manifest's directory.

use anyhow::{Context, Result};
use copstac_core::{Extent, Layer, LayerKind, RasterLayer, VectorLayer, CRS};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub layers: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    pub kind: LayerKind,
    pub source: PathBuf,
    /// CRS override (`EPSG:nnnn`, PROJ or WKT).
    #[serde(default)]
    pub crs: Option<String>,
    /// `[xmin, ymin, xmax, ymax]` in the layer CRS (rasters only).
    #[serde(default)]
    pub extent: Option<Vec<f64>>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Invalid manifest {}", path.display()))
    }

    /// Open every entry. Entries that cannot be opened are logged and
    /// returned by name as the second element.
    pub fn open_layers(&self, base_dir: &Path) -> (Vec<Layer>, Vec<String>) {
        let mut layers = Vec::with_capacity(self.layers.len());
        let mut skipped = Vec::new();
        for entry in &self.layers {
            match entry.open(base_dir) {
                Ok(layer) => layers.push(layer),
                Err(e) => {
                    warn!("Skipping layer {}: {:#}", entry.name, e);
                    skipped.push(entry.name.clone());
                }
            }
        }
        (layers, skipped)
    }
}

impl ManifestEntry {
    pub fn open(&self, base_dir: &Path) -> Result<Layer> {
        let source = if self.source.is_absolute() {
            self.source.clone()
        } else {
            base_dir.join(&self.source)
        };
        let crs = self
            .crs
            .as_deref()
            .map(str::parse::<CRS>)
            .transpose()
            .with_context(|| format!("Invalid CRS for layer {}", self.name))?;
        let extent = self
            .extent
            .as_deref()
            .map(Extent::from_slice)
            .transpose()
            .with_context(|| format!("Invalid extent for layer {}", self.name))?;

        let layer = match self.kind {
            LayerKind::Vector => VectorLayer::open(&self.name, &source, crs)?.into(),
            LayerKind::Raster => match (crs, extent) {
                // Fully described rasters are not read.
                (Some(crs), Some(extent)) => RasterLayer::new(&self.name, crs, extent, source).into(),
                (crs, extent) => {
                    let raster = RasterLayer::open(&self.name, &source, crs)?;
                    match extent {
                        Some(extent) => raster.with_extent(extent).into(),
                        None => raster.into(),
                    }
                }
            },
        };
        Ok(layer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const ROADS: &str = r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "properties": {"name": "A-6"},
         "geometry": {"type": "LineString", "coordinates": [[-3.7, 40.4], [-3.8, 40.5]]}}
    ]}"#;

    #[test]
    fn opens_relative_sources() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("roads.geojson"), ROADS).unwrap();
        let manifest_path = tmp.path().join("layers.json");
        fs::write(
            &manifest_path,
            r#"{"layers": [
                {"name": "Roads", "kind": "vector", "source": "roads.geojson"},
                {"name": "Terrain", "kind": "raster", "source": "dem.tif",
                 "crs": "EPSG:32630", "extent": [440000, 4470000, 450000, 4480000]},
                {"name": "Missing", "kind": "vector", "source": "nope.geojson"}
            ]}"#,
        )
        .unwrap();

        let manifest = Manifest::load(&manifest_path).unwrap();
        let (layers, skipped) = manifest.open_layers(tmp.path());
        assert_eq!(layers.len(), 2);
        assert_eq!(skipped, ["Missing"]);

        assert_eq!(layers[0].kind(), LayerKind::Vector);
        assert!(layers[0].crs().is_wgs84());
        assert_eq!(layers[1].kind(), LayerKind::Raster);
        assert_eq!(layers[1].crs().epsg(), Some(32630));
        assert_eq!(
            layers[1].extent().unwrap(),
            Extent::new(440000.0, 4470000.0, 450000.0, 4480000.0)
        );
        assert_eq!(layers[1].source(), Some(tmp.path().join("dem.tif").as_path()));
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = serde_json::from_str::<Manifest>(
            r#"{"layers": [{"name": "X", "kind": "mesh", "source": "x"}]}"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn bad_crs_is_reported() {
        let entry = ManifestEntry {
            name: "Roads".into(),
            kind: LayerKind::Vector,
            source: "roads.geojson".into(),
            crs: Some("not a crs".into()),
            extent: None,
        };
        let err = entry.open(Path::new(".")).unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid CRS for layer Roads"));
    }
}
