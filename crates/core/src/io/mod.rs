//! I/O for vector layers (GeoJSON) and raster headers (GeoTIFF)

pub mod geojson;
pub mod geotiff;

pub use self::geojson::{parse_geojson, read_geojson, write_geojson};
pub use geotiff::{read_geotiff_info, read_geotiff_info_from_reader};
