//! Vector data: GeoJSON feature collections from the `geojson` crate.
//!
//! Ids, properties and foreign members stay as read. Geometry work
//! (envelopes, reprojection) goes through `geo-types`.

use geo_types::{
    Coord, Geometry, GeometryCollection, Line, LineString, MultiLineString, MultiPoint,
    MultiPolygon, Point, Polygon,
};

pub use geojson::{Feature, FeatureCollection, JsonObject, JsonValue};

use crate::crs::CRS;
use crate::error::Result;
use crate::extent::Extent;
use crate::reproject::CrsTransform;

/// A collection holding `features`, without bbox or foreign members.
pub fn feature_collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// A feature with `geometry` and no properties.
pub fn feature(geometry: &Geometry<f64>) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geojson::Value::from(geometry))),
        id: None,
        properties: None,
        foreign_members: None,
    }
}

/// Envelope of every coordinate in the collection.
///
/// `Ok(None)` when no feature carries a geometry with coordinates.
pub fn collection_extent(collection: &FeatureCollection) -> Result<Option<Extent>> {
    let mut coords = Vec::new();
    for geometry in collection.features.iter().filter_map(|f| f.geometry.as_ref()) {
        let geometry = Geometry::<f64>::try_from(geometry.value.clone())?;
        collect_coords(&geometry, &mut coords);
    }
    Ok(Extent::from_points(coords.into_iter().map(|c| (c.x, c.y))))
}

/// Reproject every geometry, returning a new collection.
///
/// Everything but coordinates is carried over; bounding boxes, which
/// would be stale, are dropped.
pub fn reproject_collection(
    collection: &FeatureCollection,
    transform: &dyn CrsTransform,
    from: &CRS,
    to: &CRS,
) -> Result<FeatureCollection> {
    if from.is_equivalent(to) {
        return Ok(collection.clone());
    }

    let mut out = collection.clone();
    out.bbox = None;
    for feature in &mut out.features {
        feature.bbox = None;
        if let Some(geometry) = feature.geometry.as_mut() {
            let native = Geometry::<f64>::try_from(geometry.value.clone())?;
            let mapped = try_map_coords(&native, &mut |c: Coord<f64>| {
                let (x, y) = transform.transform_point(c.x, c.y, from, to)?;
                Ok(Coord { x, y })
            })?;
            geometry.value = geojson::Value::from(&mapped);
            geometry.bbox = None;
        }
    }
    Ok(out)
}

fn collect_coords(geometry: &Geometry<f64>, out: &mut Vec<Coord<f64>>) {
    match geometry {
        Geometry::Point(p) => out.push(p.0),
        Geometry::Line(l) => out.extend([l.start, l.end]),
        Geometry::LineString(ls) => out.extend(ls.0.iter().copied()),
        Geometry::Polygon(p) => {
            out.extend(p.exterior().0.iter().copied());
            for ring in p.interiors() {
                out.extend(ring.0.iter().copied());
            }
        }
        Geometry::MultiPoint(mp) => out.extend(mp.0.iter().map(|p| p.0)),
        Geometry::MultiLineString(mls) => {
            for ls in &mls.0 {
                out.extend(ls.0.iter().copied());
            }
        }
        Geometry::MultiPolygon(mp) => {
            for p in &mp.0 {
                collect_coords(&Geometry::Polygon(p.clone()), out);
            }
        }
        Geometry::GeometryCollection(gc) => {
            for g in &gc.0 {
                collect_coords(g, out);
            }
        }
        Geometry::Rect(r) => out.extend([r.min(), r.max()]),
        Geometry::Triangle(t) => out.extend([t.v1(), t.v2(), t.v3()]),
    }
}

type CoordFn<'a> = dyn FnMut(Coord<f64>) -> Result<Coord<f64>> + 'a;

fn map_line_string(ls: &LineString<f64>, f: &mut CoordFn<'_>) -> Result<LineString<f64>> {
    ls.0.iter()
        .map(|c| f(*c))
        .collect::<Result<Vec<_>>>()
        .map(LineString)
}

fn map_polygon(p: &Polygon<f64>, f: &mut CoordFn<'_>) -> Result<Polygon<f64>> {
    let exterior = map_line_string(p.exterior(), f)?;
    let interiors = p
        .interiors()
        .iter()
        .map(|ring| map_line_string(ring, f))
        .collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

/// Apply a fallible coordinate function to every vertex of a geometry.
pub fn try_map_coords(geometry: &Geometry<f64>, f: &mut CoordFn<'_>) -> Result<Geometry<f64>> {
    Ok(match geometry {
        Geometry::Point(p) => Geometry::Point(Point(f(p.0)?)),
        Geometry::Line(l) => Geometry::Line(Line::new(f(l.start)?, f(l.end)?)),
        Geometry::LineString(ls) => Geometry::LineString(map_line_string(ls, f)?),
        Geometry::Polygon(p) => Geometry::Polygon(map_polygon(p, f)?),
        Geometry::MultiPoint(mp) => Geometry::MultiPoint(MultiPoint(
            mp.0.iter()
                .map(|p| f(p.0).map(Point))
                .collect::<Result<Vec<_>>>()?,
        )),
        Geometry::MultiLineString(mls) => Geometry::MultiLineString(MultiLineString(
            mls.0
                .iter()
                .map(|ls| map_line_string(ls, f))
                .collect::<Result<Vec<_>>>()?,
        )),
        Geometry::MultiPolygon(mp) => Geometry::MultiPolygon(MultiPolygon(
            mp.0.iter()
                .map(|p| map_polygon(p, f))
                .collect::<Result<Vec<_>>>()?,
        )),
        Geometry::GeometryCollection(gc) => Geometry::GeometryCollection(GeometryCollection(
            gc.0.iter()
                .map(|g| try_map_coords(g, f))
                .collect::<Result<Vec<_>>>()?,
        )),
        // Rects and triangles do not survive a non-affine transform; emit polygons.
        Geometry::Rect(r) => Geometry::Polygon(map_polygon(&r.to_polygon(), f)?),
        Geometry::Triangle(t) => Geometry::Polygon(map_polygon(&t.to_polygon(), f)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reproject::BuiltinTransform;
    use geo_types::{coord, line_string, point, polygon, Triangle};

    fn no_geometry() -> Feature {
        Feature {
            bbox: None,
            geometry: None,
            id: None,
            properties: None,
            foreign_members: None,
        }
    }

    fn sample() -> FeatureCollection {
        let mut road = feature(&Geometry::LineString(line_string![
            (x: 440_000.0, y: 4_474_000.0),
            (x: 441_000.0, y: 4_475_000.0),
        ]));
        road.set_property("name", "A-6");
        road.id = Some(geojson::feature::Id::Number(7u64.into()));
        let mut collection = feature_collection(vec![
            road,
            feature(&Geometry::Point(point!(x: 439_500.0, y: 4_476_000.0))),
            no_geometry(),
        ]);
        let mut members = JsonObject::new();
        members.insert("source".into(), "survey".into());
        collection.foreign_members = Some(members);
        collection
    }

    #[test]
    fn extent_covers_all_geometries() {
        let extent = collection_extent(&sample()).unwrap().unwrap();
        assert_eq!(extent, Extent::new(439_500.0, 4_474_000.0, 441_000.0, 4_476_000.0));
    }

    #[test]
    fn extent_of_empty_collection() {
        assert!(collection_extent(&feature_collection(Vec::new())).unwrap().is_none());
        let blank = feature_collection(vec![no_geometry()]);
        assert!(collection_extent(&blank).unwrap().is_none());
    }

    #[test]
    fn triangle_vertices_count_toward_extent() {
        let tri = Triangle::new(
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 3.0, y: 1.0 },
            coord! { x: 1.0, y: 5.0 },
        );
        let mut coords = Vec::new();
        collect_coords(&Geometry::Triangle(tri), &mut coords);
        assert_eq!(
            Extent::from_points(coords.into_iter().map(|c| (c.x, c.y))),
            Some(Extent::new(0.0, 0.0, 3.0, 5.0))
        );
    }

    #[test]
    fn reprojection_keeps_everything_but_coordinates() {
        let geo = reproject_collection(
            &sample(),
            &BuiltinTransform,
            &CRS::from_epsg(32630),
            &CRS::wgs84(),
        )
        .unwrap();
        assert_eq!(geo.features.len(), 3);
        assert_eq!(
            geo.features[0].property("name"),
            Some(&JsonValue::from("A-6"))
        );
        assert_eq!(
            geo.features[0].id,
            Some(geojson::feature::Id::Number(7u64.into()))
        );
        assert_eq!(
            geo.foreign_members.as_ref().unwrap()["source"],
            JsonValue::from("survey")
        );
        let extent = collection_extent(&geo).unwrap().unwrap();
        assert!(extent.min_x > -4.0 && extent.max_x < -3.0);
        assert!(extent.min_y > 40.0 && extent.max_y < 41.0);
        assert!(geo.features[2].geometry.is_none());
    }

    #[test]
    fn polygon_holes_are_mapped() {
        let poly = polygon!(
            exterior: [(x: 0.0, y: 0.0), (x: 4.0, y: 0.0), (x: 4.0, y: 4.0), (x: 0.0, y: 0.0)],
            interiors: [[(x: 1.0, y: 1.0), (x: 2.0, y: 1.0), (x: 2.0, y: 2.0), (x: 1.0, y: 1.0)]],
        );
        let shifted = try_map_coords(&Geometry::Polygon(poly), &mut |c: Coord<f64>| {
            Ok(Coord { x: c.x + 10.0, y: c.y })
        })
        .unwrap();
        match shifted {
            Geometry::Polygon(p) => {
                assert_eq!(p.exterior().0[1].x, 14.0);
                assert_eq!(p.interiors()[0].0[0].x, 11.0);
            }
            other => panic!("expected polygon, got {:?}", other),
        }
    }
}
