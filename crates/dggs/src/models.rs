//! Response and summary types for the DGGS service.

use copstac_core::Extent;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn feature_collection_type() -> String {
    "FeatureCollection".to_string()
}

/// GeoJSON FeatureCollection as returned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type", default = "feature_collection_type")]
    pub type_: String,

    #[serde(default)]
    pub features: Vec<DggsFeature>,

    /// Other top-level members (`links`, `numberMatched`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FeatureCollection {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Zone identifier of every feature that has one, in response order.
    pub fn zone_ids(&self) -> Vec<String> {
        self.features.iter().filter_map(DggsFeature::zone_id).collect()
    }

    /// Elevation statistics, `None` when no feature carries a value.
    pub fn elevation_stats(&self) -> Option<ElevationStats> {
        ElevationStats::from_values(self.features.iter().filter_map(DggsFeature::elevation))
    }
}

/// One GeoJSON feature of a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DggsFeature {
    #[serde(rename = "type", default)]
    pub type_: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    #[serde(default)]
    pub geometry: Option<Value>,

    /// `null` in the document is kept as `None`.
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
}

impl DggsFeature {
    fn property(&self, key: &str) -> Option<&Value> {
        self.properties.as_ref()?.get(key)
    }

    /// `dggs_zone_id`, falling back to `zone_id` and then the feature id.
    pub fn zone_id(&self) -> Option<String> {
        ["dggs_zone_id", "zone_id"]
            .iter()
            .filter_map(|key| self.property(key))
            .chain(self.id.as_ref())
            .find_map(value_as_id)
    }

    /// `elevation`, falling back to `height`.
    pub fn elevation(&self) -> Option<f64> {
        ["elevation", "height"]
            .iter()
            .filter_map(|key| self.property(key))
            .find_map(Value::as_f64)
    }

    /// Zone bounds from `min_lon`/`min_lat`/`max_lon`/`max_lat` (or the
    /// spelled-out `*_longitude`/`*_latitude`) properties.
    pub fn bounds(&self) -> Option<Extent> {
        let get = |short: &str, long: &str| {
            self.property(short)
                .and_then(Value::as_f64)
                .or_else(|| self.property(long).and_then(Value::as_f64))
        };
        Some(Extent::new(
            get("min_lon", "min_longitude")?,
            get("min_lat", "min_latitude")?,
            get("max_lon", "max_longitude")?,
            get("max_lat", "max_latitude")?,
        ))
    }
}

pub(crate) fn value_as_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Minimum, maximum and number of elevation samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElevationStats {
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

impl ElevationStats {
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        values.into_iter().fold(None, |acc, v| {
            Some(match acc {
                None => Self {
                    min: v,
                    max: v,
                    count: 1,
                },
                Some(s) => Self {
                    min: s.min.min(v),
                    max: s.max.max(v),
                    count: s.count + 1,
                },
            })
        })
    }
}

/// Coverage of the service over a queried extent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageSummary {
    pub success: bool,
    pub error: Option<String>,
    pub zone_count: usize,
    pub feature_count: usize,
    pub zones: Vec<String>,
    pub dggs_crs: String,
    pub extent: Extent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_stats: Option<ElevationStats>,
}

impl CoverageSummary {
    pub fn from_collection(collection: &FeatureCollection, extent: Extent, dggs_crs: &str) -> Self {
        let zones = collection.zone_ids();
        Self {
            success: true,
            error: None,
            zone_count: zones.len(),
            feature_count: collection.len(),
            zones,
            dggs_crs: dggs_crs.to_string(),
            extent,
            elevation_stats: collection.elevation_stats(),
        }
    }

    pub fn failure(error: impl Into<String>, extent: Extent, dggs_crs: &str) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            zone_count: 0,
            feature_count: 0,
            zones: Vec::new(),
            dggs_crs: dggs_crs.to_string(),
            extent,
            elevation_stats: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature", "id": "R78", "geometry": null,
     "properties": {"dggs_zone_id": "R7852", "elevation": 112.5}},
    {"type": "Feature", "id": "R79", "geometry": null,
     "properties": {"zone_id": "R7853", "height": 98.0}},
    {"type": "Feature", "id": 17, "geometry": null, "properties": null},
    {"type": "Feature", "geometry": null, "properties": {"dggs_zone_id": "R7852", "elevation": 140}}
  ],
  "numberReturned": 4
}"#;

    #[test]
    fn zone_id_fallbacks_keep_order_and_duplicates() {
        let fc: FeatureCollection = serde_json::from_str(RESPONSE).unwrap();
        assert_eq!(fc.zone_ids(), ["R7852", "R7853", "17", "R7852"]);
        assert!(fc.extra.contains_key("numberReturned"));
    }

    #[test]
    fn elevation_with_height_fallback() {
        let fc: FeatureCollection = serde_json::from_str(RESPONSE).unwrap();
        let stats = fc.elevation_stats().unwrap();
        assert_eq!(stats.min, 98.0);
        assert_eq!(stats.max, 140.0);
        assert_eq!(stats.count, 3);
    }

    #[test]
    fn empty_collection_summary() {
        let fc: FeatureCollection =
            serde_json::from_str(r#"{"type": "FeatureCollection", "features": []}"#).unwrap();
        let summary = CoverageSummary::from_collection(&fc, Extent::new(0.0, 0.0, 1.0, 1.0), "H3");
        assert!(summary.success);
        assert_eq!(summary.feature_count, 0);
        assert!(summary.elevation_stats.is_none());
        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("elevation_stats").is_none());
    }

    #[test]
    fn bounds_accept_both_spellings() {
        let f: DggsFeature = serde_json::from_str(
            r#"{"type": "Feature", "id": "A", "properties":
                {"min_longitude": -10, "min_lat": 35, "max_lon": 5, "max_latitude": 45}}"#,
        )
        .unwrap();
        assert_eq!(f.bounds(), Some(Extent::new(-10.0, 35.0, 5.0, 45.0)));

        let partial: DggsFeature =
            serde_json::from_str(r#"{"type": "Feature", "properties": {"min_lat": 1}}"#).unwrap();
        assert!(partial.bounds().is_none());
    }
}
