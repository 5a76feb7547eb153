//! Axis-aligned bounding rectangles.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A bounding rectangle in the units of whatever CRS it was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Whole-world geographic extent.
    pub fn world() -> Self {
        Self::new(-180.0, -90.0, 180.0, 90.0)
    }

    /// Build from a STAC/GeoJSON style `[min_x, min_y, max_x, max_y]` slice.
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        match values {
            [min_x, min_y, max_x, max_y] => {
                Self::new(*min_x, *min_y, *max_x, *max_y).validated()
            }
            _ => Err(Error::InvalidParameter {
                name: "extent",
                value: format!("{:?}", values),
                reason: "expected four values".into(),
            }),
        }
    }

    /// Parse `xmin,ymin,xmax,ymax`.
    pub fn parse(s: &str) -> Result<Self> {
        let values = s
            .split(',')
            .map(|v| v.trim().parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::InvalidParameter {
                name: "extent",
                value: s.to_string(),
                reason: e.to_string(),
            })?;
        Self::from_slice(&values)
    }

    /// Reject NaN/infinite values and inverted ranges.
    pub fn validated(self) -> Result<Self> {
        let finite = [self.min_x, self.min_y, self.max_x, self.max_y]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.min_x > self.max_x || self.min_y > self.max_y {
            return Err(Error::InvalidExtent {
                min_x: self.min_x,
                min_y: self.min_y,
                max_x: self.max_x,
                max_y: self.max_y,
            });
        }
        Ok(self)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Check if two extents intersect (touching edges count).
    pub fn intersects(&self, other: &Extent) -> bool {
        !(self.max_x < other.min_x
            || self.min_x > other.max_x
            || self.max_y < other.min_y
            || self.min_y > other.max_y)
    }

    /// Smallest extent covering both.
    pub fn union(&self, other: &Extent) -> Extent {
        Extent::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    /// Grow to include a point.
    pub fn include_point(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    /// Envelope of a set of points, `None` when the iterator is empty.
    pub fn from_points<I>(points: I) -> Option<Extent>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut iter = points.into_iter();
        let (x, y) = iter.next()?;
        let mut extent = Extent::new(x, y, x, y);
        for (x, y) in iter {
            extent.include_point(x, y);
        }
        Some(extent)
    }

    /// `[min_x, min_y, max_x, max_y]`, the STAC `bbox` layout.
    pub fn to_bbox(&self) -> [f64; 4] {
        [self.min_x, self.min_y, self.max_x, self.max_y]
    }

    /// Closed counter-clockwise ring starting at the lower-left corner.
    pub fn to_ring(&self) -> Vec<[f64; 2]> {
        vec![
            [self.min_x, self.min_y],
            [self.max_x, self.min_y],
            [self.max_x, self.max_y],
            [self.min_x, self.max_y],
            [self.min_x, self.min_y],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_covers_both() {
        let a = Extent::new(0.0, 0.0, 1.0, 1.0);
        let b = Extent::new(-2.0, 0.5, 0.5, 3.0);
        assert_eq!(a.union(&b), Extent::new(-2.0, 0.0, 1.0, 3.0));
    }

    #[test]
    fn intersection_rules() {
        let a = Extent::new(0.0, 0.0, 1.0, 1.0);
        assert!(a.intersects(&Extent::new(1.0, 1.0, 2.0, 2.0)));
        assert!(a.intersects(&Extent::new(0.2, 0.2, 0.3, 0.3)));
        assert!(!a.intersects(&Extent::new(1.5, 0.0, 2.0, 1.0)));
    }

    #[test]
    fn parse_comma_separated() {
        let e = Extent::parse("-122.5, 37.7,-122.3,37.9").unwrap();
        assert_eq!(e.to_bbox(), [-122.5, 37.7, -122.3, 37.9]);
        assert!(Extent::parse("1,2,3").is_err());
        assert!(Extent::parse("a,b,c,d").is_err());
        assert!(Extent::parse("5,0,1,1").is_err());
    }

    #[test]
    fn ring_is_closed() {
        let ring = Extent::new(1.0, 2.0, 3.0, 4.0).to_ring();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring.first(), ring.last());
    }

    #[test]
    fn envelope_of_points() {
        assert!(Extent::from_points(Vec::new()).is_none());
        let e = Extent::from_points(vec![(1.0, 5.0), (-1.0, 2.0), (0.0, 7.0)]).unwrap();
        assert_eq!(e, Extent::new(-1.0, 2.0, 1.0, 7.0));
    }
}
