//! GeoJSON (RFC 7946) files, read and written with the `geojson` crate.

use geojson::GeoJson;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::vector::{feature_collection, Feature, FeatureCollection};

/// Read a GeoJSON file as a FeatureCollection.
pub fn read_geojson<P: AsRef<Path>>(path: P) -> Result<FeatureCollection> {
    let text = fs::read_to_string(path.as_ref())?;
    parse_geojson(&text)
}

/// Parse a GeoJSON document. A lone Feature or Geometry becomes a
/// one-feature collection.
pub fn parse_geojson(text: &str) -> Result<FeatureCollection> {
    Ok(match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(fc) => fc,
        GeoJson::Feature(f) => feature_collection(vec![f]),
        GeoJson::Geometry(g) => feature_collection(vec![Feature {
            bbox: None,
            geometry: Some(g),
            id: None,
            properties: None,
            foreign_members: None,
        }]),
    })
}

/// Write a FeatureCollection as pretty-printed GeoJSON.
pub fn write_geojson<P: AsRef<Path>>(collection: &FeatureCollection, path: P) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    serde_json::to_writer_pretty(&mut writer, collection)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::vector::JsonValue;

    const ROADS: &str = r#"{
      "type": "FeatureCollection",
      "name": "roads",
      "features": [
        {
          "type": "Feature",
          "id": 7,
          "geometry": {"type": "LineString", "coordinates": [[-122.5, 37.7], [-122.3, 37.9, 12.0]]},
          "properties": {"name": "Market St", "lanes": 4, "osm_way": 18446744073709551615, "tags": ["a", "b"]}
        },
        {
          "type": "Feature",
          "geometry": {
            "type": "Polygon",
            "coordinates": [
              [[0, 0], [4, 0], [4, 4], [0, 4], [0, 0]],
              [[1, 1], [2, 1], [2, 2], [1, 1]]
            ]
          },
          "properties": null
        },
        {"type": "Feature", "geometry": null, "properties": {}}
      ]
    }"#;

    #[test]
    fn parse_feature_collection() {
        let fc = parse_geojson(ROADS).unwrap();
        assert_eq!(fc.features.len(), 3);

        let road = &fc.features[0];
        assert_eq!(road.id, Some(::geojson::feature::Id::Number(7u64.into())));
        assert_eq!(road.property("name"), Some(&JsonValue::from("Market St")));
        assert_eq!(road.property("lanes"), Some(&JsonValue::from(4)));
        assert!(fc.features[2].geometry.is_none());
        assert_eq!(
            fc.foreign_members.as_ref().unwrap()["name"],
            JsonValue::from("roads")
        );
    }

    #[test]
    fn file_round_trip_keeps_ids_and_members() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roads.geojson");
        let fc = parse_geojson(ROADS).unwrap();
        write_geojson(&fc, &path).unwrap();

        let back = read_geojson(&path).unwrap();
        assert_eq!(back, fc);

        let raw: JsonValue = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["name"], "roads");
        assert_eq!(raw["features"][0]["id"], 7);
        assert_eq!(raw["features"][0]["properties"]["osm_way"].as_u64(), Some(u64::MAX));
        assert_eq!(raw["features"][0]["properties"]["tags"], serde_json::json!(["a", "b"]));
    }

    #[test]
    fn single_feature_and_geometry_are_accepted() {
        let feature = r#"{"type": "Feature", "geometry": {"type": "Point", "coordinates": [1.0, 2.0]}, "properties": {}}"#;
        assert_eq!(parse_geojson(feature).unwrap().features.len(), 1);
        let point = r#"{"type": "Point", "coordinates": [1.0, 2.0]}"#;
        assert!(parse_geojson(point).unwrap().features[0].geometry.is_some());
    }

    #[test]
    fn rejects_malformed_documents() {
        assert!(matches!(parse_geojson(r#"{"features": []}"#), Err(Error::GeoJson(_))));
        assert!(parse_geojson(r#"{"type": "Topology"}"#).is_err());
        assert!(parse_geojson("{not json").is_err());
    }
}
