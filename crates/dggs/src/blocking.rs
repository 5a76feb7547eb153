//! Blocking (synchronous) API.
//!
//! Wraps the async [`DggsClient`] with a Tokio runtime so callers don't need
//! to manage their own async runtime.

use std::path::Path;

use copstac_core::{Extent, CRS};

use crate::client::{DggsClient, DggsClientOptions};
use crate::error::{DggsError, Result};
use crate::models::{CoverageSummary, FeatureCollection};

/// Blocking wrapper around [`DggsClient`].
///
/// Uses an internal single-threaded Tokio runtime; must not be called from
/// within another runtime.
pub struct DggsClientBlocking {
    rt: tokio::runtime::Runtime,
    inner: DggsClient,
}

impl DggsClientBlocking {
    pub fn new(options: DggsClientOptions) -> Result<Self> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| DggsError::Client(e.to_string()))?;

        let inner = DggsClient::new(options)?;
        Ok(Self { rt, inner })
    }

    pub fn last_error(&self) -> Option<&str> {
        self.inner.last_error()
    }

    pub fn build_query_url(&self, extent: &Extent, dggs_crs: &str, zone_id: Option<&str>) -> String {
        self.inner.build_query_url(extent, dggs_crs, zone_id)
    }

    pub fn query_dggs_data(
        &mut self,
        extent: &Extent,
        dggs_crs: &str,
        zone_id: Option<&str>,
    ) -> Result<FeatureCollection> {
        self.rt
            .block_on(self.inner.query_dggs_data(extent, dggs_crs, zone_id))
    }

    pub fn get_dggs_zones_for_extent(&mut self, extent: &Extent, dggs_crs: &str) -> Vec<String> {
        self.rt
            .block_on(self.inner.get_dggs_zones_for_extent(extent, dggs_crs))
    }

    pub fn get_coverage_summary(&mut self, extent: &Extent, dggs_crs: &str) -> CoverageSummary {
        self.rt
            .block_on(self.inner.get_coverage_summary(extent, dggs_crs))
    }

    pub fn fetch_and_save_geojson(
        &mut self,
        extent: &Extent,
        output_path: &Path,
        dggs_crs: &str,
        zone_id: Option<&str>,
    ) -> bool {
        self.rt.block_on(
            self.inner
                .fetch_and_save_geojson(extent, output_path, dggs_crs, zone_id),
        )
    }

    pub fn query_zone_data(&mut self, zone_id: &str, dggs_crs: &str) -> Result<FeatureCollection> {
        self.rt.block_on(self.inner.query_zone_data(zone_id, dggs_crs))
    }

    pub fn list_zones(&mut self, extent: &Extent, dggs_crs: &str, zone_level: u32) -> Result<Vec<String>> {
        self.rt
            .block_on(self.inner.list_zones(extent, dggs_crs, zone_level))
    }

    pub fn transform_extent_to_wgs84(&self, extent: &Extent, source_crs: &CRS) -> Result<Extent> {
        self.inner.transform_extent_to_wgs84(extent, source_crs)
    }
}
