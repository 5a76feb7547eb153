//! Assembly of STAC Item and Collection documents.
//!
//! Pure functions: nothing here touches the filesystem beyond resolving
//! relative paths.

use chrono::{DateTime, SecondsFormat, Utc};
use copstac_core::{CrsTransform, Extent, Layer, LayerKind, CRS};
use std::collections::BTreeMap;
use std::path::{Component, Path};

use crate::error::{ExportError, Result};
use crate::metadata::CopMetadata;
use crate::stac_models::{
    CollectionExtent, CopAssetType, PolygonGeometry, SpatialExtent, StacAsset, StacCollection,
    StacItem, StacItemProperties, StacLink, TemporalExtent, COP_EXTENSION_URL, STAC_VERSION,
};

/// Key of the single asset attached to every item.
pub const DATA_ASSET_KEY: &str = "data";

pub const GEOJSON_MEDIA_TYPE: &str = "application/geo+json";
pub const GEOTIFF_MEDIA_TYPE: &str = "image/tiff; application=geotiff";

/// Format a timestamp the way items record `datetime`.
pub fn format_datetime(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Build the STAC Item for one exported layer.
///
/// The layer extent is reprojected to WGS84 with `transform`; a failure
/// there is returned rather than producing an item without a bbox.
pub fn create_stac_item(
    layer: &Layer,
    id: &str,
    asset_path: &Path,
    metadata: &CopMetadata,
    stac_dir: &Path,
    transform: &dyn CrsTransform,
    now: DateTime<Utc>,
) -> Result<StacItem> {
    let native = layer.extent().map_err(|e| ExportError::Layer {
        layer: layer.name().to_string(),
        reason: e.to_string(),
    })?;
    let extent = transform
        .transform_extent(&native, layer.crs(), &CRS::wgs84())
        .map_err(|source| ExportError::Transform {
            layer: layer.name().to_string(),
            source,
        })?;

    let (asset_type, media_type) = match layer.kind() {
        LayerKind::Vector => (CopAssetType::Feature, GEOJSON_MEDIA_TYPE),
        LayerKind::Raster => (CopAssetType::Imagery, GEOTIFF_MEDIA_TYPE),
    };

    let asset = StacAsset {
        href: relative_href(asset_path, stac_dir)?,
        title: Some(format!("{} Data", layer.name())),
        type_: Some(media_type.to_string()),
        roles: Some(vec!["data".to_string()]),
        cop_asset_type: Some(asset_type),
    };

    Ok(StacItem {
        stac_version: STAC_VERSION.to_string(),
        stac_extensions: vec![COP_EXTENSION_URL.to_string()],
        type_: "Feature".to_string(),
        id: id.to_string(),
        bbox: extent.to_bbox(),
        geometry: PolygonGeometry::from_ring(extent.to_ring()),
        properties: StacItemProperties {
            datetime: format_datetime(now),
            title: Some(layer.name().to_string()),
            extra: metadata.to_properties().into_iter().collect(),
        },
        assets: BTreeMap::from([(DATA_ASSET_KEY.to_string(), asset)]),
        links: vec![StacLink::new("self", format!("./{}.json", id))],
        collection: None,
    })
}

/// Build a Collection header over `items`.
///
/// The spatial extent is the union of item bboxes (the whole world when
/// there are no items); the temporal interval spans the item datetimes
/// (`now` to `now` when none parse).
pub fn create_collection(
    id: &str,
    title: &str,
    description: &str,
    items: &[StacItem],
    metadata: &CopMetadata,
    now: DateTime<Utc>,
) -> StacCollection {
    let bbox = items
        .iter()
        .map(|item| Extent::from_slice(&item.bbox).unwrap_or_else(|_| Extent::world()))
        .reduce(|a, b| a.union(&b))
        .unwrap_or_else(Extent::world);

    let times: Vec<DateTime<Utc>> = items
        .iter()
        .filter_map(|item| DateTime::parse_from_rfc3339(&item.properties.datetime).ok())
        .map(|t| t.with_timezone(&Utc))
        .collect();
    let start = times.iter().min().copied().unwrap_or(now);
    let end = times.iter().max().copied().unwrap_or(now);

    let mut links = vec![
        StacLink::json("self", "./collection.json"),
        StacLink::json("root", "./collection.json"),
    ];
    links.extend(
        items
            .iter()
            .map(|item| StacLink::json("item", format!("./{}.json", item.id))),
    );

    StacCollection {
        stac_version: STAC_VERSION.to_string(),
        stac_extensions: vec![COP_EXTENSION_URL.to_string()],
        type_: "Collection".to_string(),
        id: id.to_string(),
        title: Some(title.to_string()),
        description: description.to_string(),
        license: "proprietary".to_string(),
        extent: CollectionExtent {
            spatial: SpatialExtent {
                bbox: vec![bbox.to_bbox()],
            },
            temporal: TemporalExtent {
                interval: vec![[format_datetime(start), format_datetime(end)]],
            },
        },
        links,
        extra: metadata.to_properties().into_iter().collect(),
    }
}

/// Path of `target` relative to the directory `base`, with `/` separators.
///
/// Computed lexically (no symlink resolution); `..` segments are emitted
/// when `target` lies outside `base`. Paths on different roots are
/// returned whole.
pub fn relative_href(target: &Path, base: &Path) -> std::io::Result<String> {
    let target_abs = std::path::absolute(target)?;
    let base_abs = std::path::absolute(base)?;
    let target = normalized(&target_abs);
    let base = normalized(&base_abs);

    let common = target
        .iter()
        .zip(base.iter())
        .take_while(|(a, b)| a == b)
        .count();
    if common == 0 {
        return Ok(target_abs.to_string_lossy().replace('\\', "/"));
    }

    let mut segments: Vec<String> = vec!["..".to_string(); base.len() - common];
    segments.extend(
        target[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );
    if segments.is_empty() {
        return Ok(".".to_string());
    }
    Ok(segments.join("/"))
}

fn normalized(path: &Path) -> Vec<Component<'_>> {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(parts.last(), Some(Component::Normal(_))) {
                    parts.pop();
                }
            }
            other => parts.push(other),
        }
    }
    parts
}
