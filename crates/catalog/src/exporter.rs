//! Export driver: writes assets, item documents and (on request) the
//! collection under `{output}/stac_cop_export/`.

use chrono::{Local, NaiveDateTime, Utc};
use copstac_core::{BuiltinTransform, CrsTransform, Layer};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::archive::{self, ArchiveInfo};
use crate::assembler::{create_collection, create_stac_item};
use crate::error::{ExportError, Result};
use crate::metadata::{CopMetadata, EmptyFieldPolicy};
use crate::sanitize::IdRegistry;
use crate::stac_models::{StacItem, StacLink};

/// Directory created under the output directory for the catalog.
pub const EXPORT_DIR_NAME: &str = "stac_cop_export";
/// Asset subdirectory of the catalog.
pub const ASSETS_DIR_NAME: &str = "assets";
pub const COLLECTION_FILE_NAME: &str = "collection.json";

/// Configuration for [`StacCopExporter`].
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Treatment of empty required metadata fields.
    pub empty_fields: EmptyFieldPolicy,
    /// Collection the items belong to. Items get a `collection` field and
    /// link only when this is set.
    pub collection_id: Option<String>,
}

/// A layer that could not be exported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerFailure {
    pub layer: String,
    pub message: String,
}

/// Outcome of [`StacCopExporter::export_layers`].
#[derive(Debug, Default)]
pub struct ExportReport {
    /// Item documents written, in layer order.
    pub items: Vec<PathBuf>,
    pub failures: Vec<LayerFailure>,
}

impl ExportReport {
    /// Whether every layer was exported.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Exports layers to a STAC catalog with the COP extension.
pub struct StacCopExporter {
    output_dir: PathBuf,
    stac_dir: PathBuf,
    assets_dir: PathBuf,
    options: ExportOptions,
    transform: Box<dyn CrsTransform>,
    ids: IdRegistry,
    items: Vec<StacItem>,
}

impl StacCopExporter {
    /// Create the catalog directories under `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>, options: ExportOptions) -> Result<Self> {
        let output_dir = output_dir.into();
        let stac_dir = output_dir.join(EXPORT_DIR_NAME);
        let assets_dir = stac_dir.join(ASSETS_DIR_NAME);
        fs::create_dir_all(&assets_dir)?;
        debug!("Catalog directory: {}", stac_dir.display());

        Ok(Self {
            output_dir,
            stac_dir,
            assets_dir,
            options,
            transform: Box::new(BuiltinTransform),
            ids: IdRegistry::new(),
            items: Vec::new(),
        })
    }

    /// Replace the CRS transform used for bounding boxes and vector output.
    pub fn with_transform(mut self, transform: impl CrsTransform + 'static) -> Self {
        self.transform = Box::new(transform);
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn stac_dir(&self) -> &Path {
        &self.stac_dir
    }

    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    /// Items exported so far in this run.
    pub fn items(&self) -> &[StacItem] {
        &self.items
    }

    /// Export one layer and write its item document. Returns the item path.
    ///
    /// The item id is only reserved once the item is written; a failed
    /// layer leaves it free for the next layer of the same name.
    pub fn export_layer(&mut self, layer: &Layer, metadata: &CopMetadata) -> Result<PathBuf> {
        metadata.check(self.options.empty_fields)?;

        let id = self.ids.next_id(layer.name());
        let asset_path = self.export_layer_data(layer, &id)?;
        let mut item = create_stac_item(
            layer,
            &id,
            &asset_path,
            metadata,
            &self.stac_dir,
            self.transform.as_ref(),
            Utc::now(),
        )?;
        if let Some(collection) = &self.options.collection_id {
            item.collection = Some(collection.clone());
            item.links
                .push(StacLink::json("collection", format!("./{}", COLLECTION_FILE_NAME)));
        }

        let item_path = self.stac_dir.join(format!("{}.json", id));
        write_json(&item, &item_path)?;
        self.ids.claim(layer.name());
        info!("Exported layer '{}' as {}", layer.name(), item_path.display());

        self.items.push(item);
        Ok(item_path)
    }

    /// Produce the asset file for a layer.
    ///
    /// Vector layers are written as WGS84 GeoJSON to `assets/{id}.geojson`;
    /// raster layers keep pointing at their original source file.
    pub fn export_layer_data(&self, layer: &Layer, id: &str) -> Result<PathBuf> {
        let layer_error = |reason: String| ExportError::Layer {
            layer: layer.name().to_string(),
            reason,
        };

        match layer {
            Layer::Vector(vector) => {
                let path = self.assets_dir.join(format!("{}.geojson", id));
                vector
                    .write_geojson_wgs84(self.transform.as_ref(), &path)
                    .map_err(|e| layer_error(e.to_string()))?;
                debug!("Wrote {} features to {}", vector.features().features.len(), path.display());
                Ok(path)
            }
            Layer::Raster(_) => {
                let source = layer
                    .source()
                    .ok_or_else(|| layer_error("raster layer has no source file".into()))?;
                if !source.is_file() {
                    return Err(layer_error(format!(
                        "source {} is not a readable file",
                        source.display()
                    )));
                }
                Ok(source.to_path_buf())
            }
        }
    }

    /// Export every layer, continuing past per-layer failures.
    ///
    /// Only a metadata policy violation aborts the run.
    pub fn export_layers(&mut self, layers: &[Layer], metadata: &CopMetadata) -> Result<ExportReport> {
        metadata.check(self.options.empty_fields)?;

        let mut report = ExportReport::default();
        for layer in layers {
            match self.export_layer(layer, metadata) {
                Ok(path) => report.items.push(path),
                Err(e) => {
                    warn!("Skipping layer '{}': {}", layer.name(), e);
                    report.failures.push(LayerFailure {
                        layer: layer.name().to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Exported {}/{} layers to {}",
            report.items.len(),
            layers.len(),
            self.stac_dir.display()
        );
        Ok(report)
    }

    /// Write `collection.json` over the items exported so far.
    pub fn write_collection(
        &self,
        id: &str,
        title: &str,
        description: &str,
        metadata: &CopMetadata,
    ) -> Result<PathBuf> {
        let collection = create_collection(id, title, description, &self.items, metadata, Utc::now());
        let path = self.stac_dir.join(COLLECTION_FILE_NAME);
        write_json(&collection, &path)?;
        info!(
            "Wrote collection '{}' with {} items to {}",
            id,
            self.items.len(),
            path.display()
        );
        Ok(path)
    }

    /// Package the catalog directory as a timestamped ZIP with a SHA-256 sidecar.
    ///
    /// The archive name carries the local wall-clock time.
    pub fn create_zip_archive(&self) -> Result<ArchiveInfo> {
        self.create_zip_archive_at(Local::now().naive_local())
    }

    /// As [`create_zip_archive`](Self::create_zip_archive), naming the
    /// archive after `timestamp`.
    pub fn create_zip_archive_at(&self, timestamp: NaiveDateTime) -> Result<ArchiveInfo> {
        let name = archive::archive_file_name(timestamp);
        archive::create_zip_archive(&self.output_dir, &self.stac_dir, &name)
    }
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    fs::write(path, text)?;
    Ok(())
}
