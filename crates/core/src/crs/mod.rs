//! Coordinate Reference System handling

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Coordinate Reference System representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CRS {
    /// WKT representation
    wkt: Option<String>,
    /// EPSG code if known
    epsg: Option<u32>,
    /// PROJ string if available
    proj: Option<String>,
}

impl CRS {
    /// Create a CRS from an EPSG code
    pub fn from_epsg(code: u32) -> Self {
        Self {
            wkt: None,
            epsg: Some(code),
            proj: None,
        }
    }

    /// Create a CRS from a WKT string
    pub fn from_wkt(wkt: impl Into<String>) -> Self {
        Self {
            wkt: Some(wkt.into()),
            epsg: None,
            proj: None,
        }
    }

    /// Create a CRS from a PROJ string
    pub fn from_proj(proj: impl Into<String>) -> Self {
        Self {
            wkt: None,
            epsg: None,
            proj: Some(proj.into()),
        }
    }

    /// WGS84 geographic CRS (EPSG:4326)
    pub fn wgs84() -> Self {
        Self::from_epsg(4326)
    }

    /// Web Mercator (EPSG:3857)
    pub fn web_mercator() -> Self {
        Self::from_epsg(3857)
    }

    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    pub fn wkt(&self) -> Option<&str> {
        self.wkt.as_deref()
    }

    pub fn proj(&self) -> Option<&str> {
        self.proj.as_deref()
    }

    /// Whether this is WGS84 geographic coordinates.
    ///
    /// `CRS:84` (lon/lat axis order) is treated the same as EPSG:4326 since
    /// coordinates are always handled as (x=lon, y=lat).
    pub fn is_wgs84(&self) -> bool {
        self.epsg == Some(4326)
    }

    /// Check if two CRS are equivalent
    pub fn is_equivalent(&self, other: &CRS) -> bool {
        if let (Some(a), Some(b)) = (self.epsg, other.epsg) {
            return a == b;
        }
        if let (Some(a), Some(b)) = (&self.wkt, &other.wkt) {
            return a == b;
        }
        if let (Some(a), Some(b)) = (&self.proj, &other.proj) {
            return a == b;
        }
        false
    }

    /// Authority identifier, e.g. `EPSG:4326`.
    pub fn authid(&self) -> String {
        if let Some(code) = self.epsg {
            return format!("EPSG:{}", code);
        }
        if let Some(proj) = &self.proj {
            return proj.clone();
        }
        if let Some(wkt) = &self.wkt {
            let end = wkt
                .char_indices()
                .nth(50)
                .map(|(i, _)| i)
                .unwrap_or(wkt.len());
            return format!("WKT:{}", &wkt[..end]);
        }
        "Unknown".to_string()
    }
}

impl FromStr for CRS {
    type Err = Error;

    /// Parse `EPSG:nnnn`, a bare EPSG code, `CRS:84`, a PROJ string
    /// (`+proj=...`) or WKT.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidParameter {
                name: "crs",
                value: String::new(),
                reason: "empty CRS identifier".into(),
            });
        }

        let upper = s.to_ascii_uppercase();
        if upper == "CRS:84" || upper == "OGC:CRS84" {
            return Ok(Self::wgs84());
        }
        let code = upper.strip_prefix("EPSG:").unwrap_or(&upper);
        if let Ok(code) = code.parse::<u32>() {
            return Ok(Self::from_epsg(code));
        }
        if s.starts_with("+proj") {
            return Ok(Self::from_proj(s));
        }
        if upper.starts_with("GEOGCS")
            || upper.starts_with("PROJCS")
            || upper.starts_with("GEOGCRS")
            || upper.starts_with("PROJCRS")
        {
            return Ok(Self::from_wkt(s));
        }

        Err(Error::InvalidParameter {
            name: "crs",
            value: s.to_string(),
            reason: "expected EPSG:<code>, a PROJ string or WKT".into(),
        })
    }
}

impl fmt::Display for CRS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.authid())
    }
}

impl Default for CRS {
    fn default() -> Self {
        Self::wgs84()
    }
}
