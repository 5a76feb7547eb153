//! GeoTIFF header reading (dimensions, georeferencing, EPSG code).
//!
//! Only the first IFD is decoded; pixel data is never read.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use tiff::decoder::Decoder;
use tiff::tags::Tag;

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::raster::{GeoTransform, RasterInfo};

const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const MODEL_TRANSFORMATION: u16 = 34264;
const GEO_KEY_DIRECTORY: u16 = 34735;

const GEOGRAPHIC_TYPE_GEO_KEY: u16 = 2048;
const PROJECTED_CS_TYPE_GEO_KEY: u16 = 3072;
const USER_DEFINED: u16 = 32767;

/// Read header information from a GeoTIFF file.
pub fn read_geotiff_info<P: AsRef<Path>>(path: P) -> Result<RasterInfo> {
    let path = path.as_ref();
    let file = File::open(path)?;
    read_geotiff_info_from_reader(BufReader::new(file)).map_err(|e| match e {
        Error::InvalidGeoTiff { reason, .. } => Error::InvalidGeoTiff {
            path: path.display().to_string(),
            reason,
        },
        other => other,
    })
}

/// Read header information from any `Read + Seek` source.
pub fn read_geotiff_info_from_reader<R: Read + Seek>(reader: R) -> Result<RasterInfo> {
    let bad = |reason: String| Error::InvalidGeoTiff {
        path: "<reader>".into(),
        reason,
    };

    let mut decoder =
        Decoder::new(reader).map_err(|e| bad(format!("TIFF decode error: {}", e)))?;
    let (width, height) = decoder
        .dimensions()
        .map_err(|e| bad(format!("cannot read dimensions: {}", e)))?;

    let scale = decoder.get_tag_f64_vec(Tag::from_u16_exhaustive(MODEL_PIXEL_SCALE)).ok();
    let tiepoint = decoder.get_tag_f64_vec(Tag::from_u16_exhaustive(MODEL_TIEPOINT)).ok();
    let matrix = decoder
        .get_tag_f64_vec(Tag::from_u16_exhaustive(MODEL_TRANSFORMATION))
        .ok();

    let transform = match (&scale, &tiepoint, &matrix) {
        (Some(s), Some(t), _) => GeoTransform::from_scale_tiepoint(s, t),
        (_, _, Some(m)) => GeoTransform::from_matrix(m),
        _ => None,
    }
    .ok_or_else(|| bad("no georeferencing tags (ModelPixelScale/ModelTiepoint)".into()))?;

    let crs = decoder
        .get_tag_u16_vec(Tag::from_u16_exhaustive(GEO_KEY_DIRECTORY))
        .ok()
        .and_then(|keys| crs_from_geokeys(&keys));

    Ok(RasterInfo {
        width,
        height,
        transform,
        crs,
    })
}

/// Find ProjectedCSTypeGeoKey (3072) or GeographicTypeGeoKey (2048) in a
/// GeoKeyDirectory.
///
/// Layout: `[version, revision, minor, count, (key_id, location, count, value)*]`.
/// Only inline values (`location == 0`) are EPSG codes.
fn crs_from_geokeys(keys: &[u16]) -> Option<CRS> {
    let count = *keys.get(3)? as usize;
    let mut geographic = None;

    for entry in keys[4..].chunks_exact(4).take(count) {
        let (key_id, location, value) = (entry[0], entry[1], entry[3]);
        if location != 0 || value == 0 || value == USER_DEFINED {
            continue;
        }
        match key_id {
            PROJECTED_CS_TYPE_GEO_KEY => return Some(CRS::from_epsg(value as u32)),
            GEOGRAPHIC_TYPE_GEO_KEY => geographic = Some(CRS::from_epsg(value as u32)),
            _ => {}
        }
    }

    geographic
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tiff::encoder::colortype::Gray32Float;
    use tiff::encoder::TiffEncoder;

    fn encode(
        width: u32,
        height: u32,
        georef: Option<(&[f64], &[f64])>,
        geokeys: &[u16],
    ) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut encoder = TiffEncoder::new(Cursor::new(&mut buf)).unwrap();
            let mut image = encoder.new_image::<Gray32Float>(width, height).unwrap();
            if let Some((scale, tiepoint)) = georef {
                image
                    .encoder()
                    .write_tag(Tag::Unknown(MODEL_PIXEL_SCALE), scale)
                    .unwrap();
                image
                    .encoder()
                    .write_tag(Tag::Unknown(MODEL_TIEPOINT), tiepoint)
                    .unwrap();
            }
            if !geokeys.is_empty() {
                image
                    .encoder()
                    .write_tag(Tag::Unknown(GEO_KEY_DIRECTORY), geokeys)
                    .unwrap();
            }
            let data = vec![0f32; (width * height) as usize];
            image.write_data(&data).unwrap();
        }
        buf
    }

    #[test]
    fn reads_utm_header() {
        let keys: [u16; 12] = [
            1, 1, 0, 2, //
            1024, 0, 1, 1, // GTModelTypeGeoKey = Projected
            3072, 0, 1, 32630, // ProjectedCSTypeGeoKey = EPSG:32630
        ];
        let scale: &[f64] = &[30.0, 30.0, 0.0];
        let tiepoint: &[f64] = &[0.0, 0.0, 0.0, 440_000.0, 4_475_000.0, 0.0];
        let buf = encode(20, 10, Some((scale, tiepoint)), &keys);
        let info = read_geotiff_info_from_reader(Cursor::new(buf)).unwrap();
        assert_eq!((info.width, info.height), (20, 10));
        assert_eq!(info.crs, Some(CRS::from_epsg(32630)));

        let extent = info.extent();
        assert_eq!(extent.min_x, 440_000.0);
        assert_eq!(extent.max_x, 440_600.0);
        assert_eq!(extent.min_y, 4_474_700.0);
        assert_eq!(extent.max_y, 4_475_000.0);
    }

    #[test]
    fn geographic_key_is_a_fallback() {
        let keys: [u16; 8] = [1, 1, 0, 1, 2048, 0, 1, 4326];
        let scale: &[f64] = &[0.25, 0.25, 0.0];
        let tiepoint: &[f64] = &[0.0, 0.0, 0.0, -10.0, 50.0, 0.0];
        let buf = encode(4, 4, Some((scale, tiepoint)), &keys);
        let info = read_geotiff_info_from_reader(Cursor::new(buf)).unwrap();
        assert_eq!(info.crs, Some(CRS::wgs84()));
    }

    #[test]
    fn user_defined_crs_is_unknown() {
        assert!(crs_from_geokeys(&[1, 1, 0, 1, 3072, 0, 1, USER_DEFINED]).is_none());
        assert!(crs_from_geokeys(&[1, 1]).is_none());
    }

    #[test]
    fn plain_tiff_is_rejected() {
        let buf = encode(2, 2, None, &[]);
        let err = read_geotiff_info_from_reader(Cursor::new(buf)).unwrap_err();
        assert!(matches!(err, Error::InvalidGeoTiff { .. }));
    }

    #[test]
    fn garbage_is_rejected() {
        let err = read_geotiff_info_from_reader(Cursor::new(b"not a tiff".to_vec())).unwrap_err();
        assert!(matches!(err, Error::InvalidGeoTiff { .. }));
    }
}
