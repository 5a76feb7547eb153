//! Async client for the DGGS elevation service.
//!
//! Wraps an OGC API endpoint serving SRTM ViewFinder Panorama elevation
//! data indexed by DGGS zone. Every query records a human-readable error
//! in [`DggsClient::last_error`] when it fails.

use std::path::Path;
use std::time::Duration;

use copstac_core::{Extent, CRS};
use reqwest::header::ACCEPT;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::error::{DggsError, Result};
use crate::models::{value_as_id, CoverageSummary, FeatureCollection};

/// GNOSIS Earth OGC API root.
pub const DEFAULT_BASE_URL: &str = "https://maps.gnosis.earth/ogcapi";
/// Elevation collection queried by default.
pub const DEFAULT_COLLECTION: &str = "SRTM_ViewFinderPanorama";
pub const DEFAULT_DGGS_CRS: &str = "rHEALPix-R12";
/// Zone level requested when listing zones.
pub const DEFAULT_ZONE_LEVEL: u32 = 2;

const AVAILABLE_DGGS_CRS: [&str; 5] = ["rHEALPix-R12", "rHEALPix-R10", "rHEALPix-R8", "ISEA3H", "H3"];

/// DGGS reference systems offered to users.
pub fn available_dggs_crs() -> &'static [&'static str] {
    &AVAILABLE_DGGS_CRS
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Configuration for [`DggsClient`].
#[derive(Debug, Clone)]
pub struct DggsClientOptions {
    /// OGC API root (default GNOSIS Earth).
    pub base_url: String,
    /// Collection holding the elevation data.
    pub collection: String,
    /// Per-request timeout (default 30 s).
    pub request_timeout: Duration,
    /// Honour `HTTP(S)_PROXY` environment variables (default true).
    pub system_proxy: bool,
}

impl Default for DggsClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            request_timeout: Duration::from_secs(30),
            system_proxy: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Async client for DGGS elevation queries.
pub struct DggsClient {
    client: reqwest::Client,
    options: DggsClientOptions,
    last_error: Option<String>,
}

impl DggsClient {
    pub fn new(options: DggsClientOptions) -> Result<Self> {
        let mut builder = reqwest::Client::builder().timeout(options.request_timeout);
        if !options.system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .map_err(|e| DggsError::Client(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            options,
            last_error: None,
        })
    }

    pub fn options(&self) -> &DggsClientOptions {
        &self.options
    }

    /// Message of the most recent failed operation, cleared on success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn collection_url(&self) -> String {
        format!(
            "{}/collections/{}",
            self.options.base_url.trim_end_matches('/'),
            encode_path_segment(&self.options.collection)
        )
    }

    // ── URLs ────────────────────────────────────────────────────────

    /// Items query for an extent in geographic coordinates.
    ///
    /// `bbox` keeps literal commas; string parameters are percent-encoded.
    pub fn build_query_url(&self, extent: &Extent, dggs_crs: &str, zone_id: Option<&str>) -> String {
        let mut url = format!(
            "{}/items?bbox={},{},{},{}&dggs-crs={}",
            self.collection_url(),
            extent.min_x,
            extent.min_y,
            extent.max_x,
            extent.max_y,
            encode_query_value(dggs_crs)
        );
        if let Some(zone) = zone_id {
            url.push_str("&zone-id=");
            url.push_str(&encode_query_value(zone));
        }
        url.push_str("&f=json");
        url
    }

    /// Data of a single zone.
    pub fn zone_data_url(&self, zone_id: &str, dggs_crs: &str) -> String {
        format!(
            "{}/dggs/{}/zones/{}/data.geojson",
            self.collection_url(),
            encode_path_segment(dggs_crs),
            encode_path_segment(zone_id)
        )
    }

    /// Zone listing at `zone_level`.
    pub fn zones_url(&self, dggs_crs: &str, zone_level: u32) -> String {
        format!(
            "{}/dggs/{}/zones.geojson?zone-level={}",
            self.collection_url(),
            encode_path_segment(dggs_crs),
            zone_level
        )
    }

    // ── Queries ─────────────────────────────────────────────────────

    /// Query elevation features intersecting `extent` (EPSG:4326).
    pub async fn query_dggs_data(
        &mut self,
        extent: &Extent,
        dggs_crs: &str,
        zone_id: Option<&str>,
    ) -> Result<FeatureCollection> {
        let url = self.build_query_url(extent, dggs_crs, zone_id);
        info!("Querying DGGS data: {}", url);
        let value = self.query_value(&url).await?;
        let parsed = parse_collection(value);
        let collection = self.record(parsed)?;
        info!("Retrieved {} features", collection.len());
        Ok(collection)
    }

    /// Zone ids of the features covering `extent`, in response order and
    /// not deduplicated. Empty when the query fails.
    pub async fn get_dggs_zones_for_extent(&mut self, extent: &Extent, dggs_crs: &str) -> Vec<String> {
        match self.query_dggs_data(extent, dggs_crs, None).await {
            Ok(collection) => collection.zone_ids(),
            Err(_) => Vec::new(),
        }
    }

    /// Zone/feature counts and elevation range over `extent`.
    pub async fn get_coverage_summary(&mut self, extent: &Extent, dggs_crs: &str) -> CoverageSummary {
        match self.query_dggs_data(extent, dggs_crs, None).await {
            Ok(collection) => CoverageSummary::from_collection(&collection, *extent, dggs_crs),
            Err(e) => CoverageSummary::failure(e.to_string(), *extent, dggs_crs),
        }
    }

    /// Query and write the response body to `output_path` as received.
    ///
    /// The body must parse as a FeatureCollection; it is then written
    /// byte for byte, keeping the server's key order and formatting.
    /// Returns `false` on any failure; see [`last_error`](Self::last_error).
    pub async fn fetch_and_save_geojson(
        &mut self,
        extent: &Extent,
        output_path: &Path,
        dggs_crs: &str,
        zone_id: Option<&str>,
    ) -> bool {
        let url = self.build_query_url(extent, dggs_crs, zone_id);
        info!("Fetching DGGS data: {}", url);
        let fetched = self.get_text(&url).await;
        let Ok(body) = self.record(fetched) else {
            return false;
        };
        let checked = serde_json::from_str::<FeatureCollection>(&body).map_err(DggsError::from);
        if self.record(checked).is_err() {
            return false;
        }

        let written = std::fs::write(output_path, &body).map_err(DggsError::from);
        match self.record(written) {
            Ok(()) => {
                info!("Saved DGGS data to {}", output_path.display());
                true
            }
            Err(_) => false,
        }
    }

    /// Data of a single zone.
    pub async fn query_zone_data(&mut self, zone_id: &str, dggs_crs: &str) -> Result<FeatureCollection> {
        let url = self.zone_data_url(zone_id, dggs_crs);
        info!("Querying zone {}: {}", zone_id, url);
        let fetched = self.get_json(&url).await;
        if let Err(e) = &fetched {
            if e.status() == Some(404) {
                warn!("No data available for zone {}", zone_id);
            }
        }
        let collection = fetched.and_then(parse_collection);
        self.record(collection)
    }

    /// Zones at `zone_level` intersecting `extent`.
    ///
    /// Zones are matched on their bound properties; zones without bounds
    /// are kept. Features without an id are skipped.
    pub async fn list_zones(
        &mut self,
        extent: &Extent,
        dggs_crs: &str,
        zone_level: u32,
    ) -> Result<Vec<String>> {
        let url = self.zones_url(dggs_crs, zone_level);
        info!("Fetching zones list: {}", url);
        let fetched = self.get_json(&url).await.and_then(parse_collection);
        let listing = self.record(fetched)?;

        let zones: Vec<String> = listing
            .features
            .iter()
            .filter(|f| f.bounds().map_or(true, |b| b.intersects(extent)))
            .filter_map(|f| f.id.as_ref().and_then(value_as_id))
            .collect();
        info!("Found {} matching zones", zones.len());
        Ok(zones)
    }

    /// Reproject an extent to WGS84 for querying.
    pub fn transform_extent_to_wgs84(&self, extent: &Extent, source_crs: &CRS) -> Result<Extent> {
        Ok(copstac_core::reproject::transform_extent_to_wgs84(extent, source_crs)?)
    }

    // ── Private helpers ─────────────────────────────────────────────

    async fn query_value(&mut self, url: &str) -> Result<Value> {
        let fetched = self.get_json(url).await;
        self.record(fetched)
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        let body = self.get_text(url).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DggsError::from_status(
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown"),
                &body,
            ));
        }

        let body = resp.text().await?;
        debug!("Received {} bytes from {}", body.len(), url);
        Ok(body)
    }

    fn record<T>(&mut self, result: Result<T>) -> Result<T> {
        match &result {
            Ok(_) => self.last_error = None,
            Err(e) => {
                error!("{}", e);
                self.last_error = Some(e.to_string());
            }
        }
        result
    }
}

fn parse_collection(value: Value) -> Result<FeatureCollection> {
    Ok(serde_json::from_value(value)?)
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
fn encode_query_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

fn encode_path_segment(segment: &str) -> String {
    encode_query_value(segment)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
