//! Affine geotransformation for rasters

use serde::{Deserialize, Serialize};

use crate::extent::Extent;

/// Affine transformation coefficients for georeferencing rasters.
///
/// Converts between pixel coordinates (col, row) and map coordinates (x, y):
/// ```text
/// x = origin_x + col * pixel_width + row * row_rotation
/// y = origin_y + col * col_rotation + row * pixel_height
/// ```
///
/// For north-up images the rotations are 0 and `pixel_height` is negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub origin_y: f64,
    pub pixel_width: f64,
    pub pixel_height: f64,
    pub row_rotation: f64,
    pub col_rotation: f64,
}

impl GeoTransform {
    /// North-up transform with no rotation.
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
            row_rotation: 0.0,
            col_rotation: 0.0,
        }
    }

    /// From GeoTIFF ModelPixelScale `[sx, sy, sz]` + ModelTiepoint
    /// `[i, j, k, x, y, z]`.
    pub fn from_scale_tiepoint(scale: &[f64], tiepoint: &[f64]) -> Option<Self> {
        if scale.len() < 2 || tiepoint.len() < 6 {
            return None;
        }
        let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
        let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
        Some(Self::new(origin_x, origin_y, scale[0], -scale[1]))
    }

    /// From a GeoTIFF ModelTransformation 4x4 row-major matrix.
    pub fn from_matrix(m: &[f64]) -> Option<Self> {
        if m.len() < 16 {
            return None;
        }
        Some(Self {
            origin_x: m[3],
            origin_y: m[7],
            pixel_width: m[0],
            pixel_height: m[5],
            row_rotation: m[1],
            col_rotation: m[4],
        })
    }

    /// Map coordinates of a pixel corner.
    pub fn pixel_to_geo_corner(&self, col: usize, row: usize) -> (f64, f64) {
        let col_f = col as f64;
        let row_f = row as f64;
        let x = self.origin_x + col_f * self.pixel_width + row_f * self.row_rotation;
        let y = self.origin_y + col_f * self.col_rotation + row_f * self.pixel_height;
        (x, y)
    }

    /// Extent of a grid of the given dimensions.
    pub fn bounds(&self, width: usize, height: usize) -> Extent {
        let corners = [
            self.pixel_to_geo_corner(0, 0),
            self.pixel_to_geo_corner(width, 0),
            self.pixel_to_geo_corner(0, height),
            self.pixel_to_geo_corner(width, height),
        ];
        let mut extent = Extent::new(corners[0].0, corners[0].1, corners[0].0, corners[0].1);
        for &(x, y) in &corners[1..] {
            extent.include_point(x, y);
        }
        extent
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, -1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bounds() {
        let gt = GeoTransform::new(0.0, 100.0, 1.0, -1.0);
        let e = gt.bounds(100, 50);
        assert_relative_eq!(e.min_x, 0.0, epsilon = 1e-10);
        assert_relative_eq!(e.min_y, 50.0, epsilon = 1e-10);
        assert_relative_eq!(e.max_x, 100.0, epsilon = 1e-10);
        assert_relative_eq!(e.max_y, 100.0, epsilon = 1e-10);
    }

    #[test]
    fn test_scale_tiepoint() {
        let gt = GeoTransform::from_scale_tiepoint(
            &[10.0, 10.0, 0.0],
            &[0.0, 0.0, 0.0, 100.0, 200.0, 0.0],
        )
        .unwrap();
        assert_eq!(gt.origin_x, 100.0);
        assert_eq!(gt.origin_y, 200.0);
        assert_eq!(gt.pixel_height, -10.0);
        assert!(GeoTransform::from_scale_tiepoint(&[1.0], &[0.0; 6]).is_none());
    }
}
