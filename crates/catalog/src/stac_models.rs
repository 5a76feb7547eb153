//! STAC (SpatioTemporal Asset Catalog) data types.
//!
//! Lightweight serde models for the documents written by an export: one
//! Item per layer and an optional Collection, both carrying the COP
//! extension.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// STAC specification version written to every document.
pub const STAC_VERSION: &str = "1.0.0";

/// JSON schema of the COP extension.
pub const COP_EXTENSION_URL: &str = "https://stac-extensions.github.io/cop/v1.0.0/schema.json";

// ---------------------------------------------------------------------------
// Item
// ---------------------------------------------------------------------------

/// A single STAC Item (GeoJSON Feature).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StacItem {
    pub stac_version: String,

    pub stac_extensions: Vec<String>,

    #[serde(rename = "type")]
    pub type_: String,

    /// Sanitized item identifier.
    pub id: String,

    /// Bounding box `[west, south, east, north]`.
    pub bbox: [f64; 4],

    pub geometry: PolygonGeometry,

    pub properties: StacItemProperties,

    pub assets: BTreeMap<String, StacAsset>,

    #[serde(default)]
    pub links: Vec<StacLink>,

    /// Collection this item belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
}

impl StacItem {
    /// Get an asset by key.
    pub fn asset(&self, key: &str) -> Option<&StacAsset> {
        self.assets.get(key)
    }

    /// Look up a property that is not modelled explicitly (e.g. `cop:mission`).
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.extra.get(key)
    }
}

/// GeoJSON Polygon.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PolygonGeometry {
    #[serde(rename = "type")]
    pub type_: String,
    pub coordinates: Vec<Vec<[f64; 2]>>,
}

impl PolygonGeometry {
    /// Polygon with a single closed exterior ring.
    pub fn from_ring(ring: Vec<[f64; 2]>) -> Self {
        Self {
            type_: "Polygon".to_string(),
            coordinates: vec![ring],
        }
    }
}

/// STAC Item properties.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StacItemProperties {
    /// ISO 8601 datetime (UTC).
    pub datetime: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// `cop:*` fields and anything else not modelled explicitly.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Kind of payload an asset holds, as recorded in `cop:asset_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CopAssetType {
    Feature,
    Imagery,
}

/// A single STAC Asset (file reference).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StacAsset {
    /// Path of the asset relative to the item document.
    pub href: String,

    /// Human-readable title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Media type (e.g., `"application/geo+json"`).
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    /// Roles: `["data"]`, `["thumbnail"]`, `["overview"]`, etc.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,

    #[serde(rename = "cop:asset_type", skip_serializing_if = "Option::is_none")]
    pub cop_asset_type: Option<CopAssetType>,
}

/// A STAC Link.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StacLink {
    /// Relationship: `"self"`, `"root"`, `"item"`, `"collection"`, etc.
    pub rel: String,

    pub href: String,

    /// Media type of the linked resource.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
}

impl StacLink {
    pub fn new(rel: &str, href: impl Into<String>) -> Self {
        Self {
            rel: rel.to_string(),
            href: href.into(),
            type_: None,
        }
    }

    pub fn json(rel: &str, href: impl Into<String>) -> Self {
        Self {
            type_: Some("application/json".to_string()),
            ..Self::new(rel, href)
        }
    }
}

// ---------------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------------

/// A STAC Collection.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StacCollection {
    pub stac_version: String,

    pub stac_extensions: Vec<String>,

    #[serde(rename = "type")]
    pub type_: String,

    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    pub description: String,

    pub license: String,

    pub extent: CollectionExtent,

    pub links: Vec<StacLink>,

    /// `cop:*` fields shared by every item.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl StacCollection {
    /// Item links, in export order.
    pub fn item_links(&self) -> impl Iterator<Item = &StacLink> {
        self.links.iter().filter(|l| l.rel == "item")
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CollectionExtent {
    pub spatial: SpatialExtent,
    pub temporal: TemporalExtent,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SpatialExtent {
    pub bbox: Vec<[f64; 4]>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TemporalExtent {
    pub interval: Vec<[String; 2]>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
