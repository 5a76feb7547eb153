//! COP metadata record and the policy for empty fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::{ExportError, Result};

/// Default DGGS reference system recorded in exported items.
pub const DEFAULT_DGGS_CRS: &str = "rHEALPix-R12";

/// Default releasability marking.
pub const DEFAULT_RELEASABILITY: &str = "1:N";

/// Security classification of the exported data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum Classification {
    #[default]
    PublicRelease,
    Internal,
    Confidential,
    Restricted,
    Classified,
}

impl Classification {
    pub const ALL: [Classification; 5] = [
        Self::PublicRelease,
        Self::Internal,
        Self::Confidential,
        Self::Restricted,
        Self::Classified,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PublicRelease => "public-release",
            Self::Internal => "internal",
            Self::Confidential => "confidential",
            Self::Restricted => "restricted",
            Self::Classified => "classified",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Classification {
    type Err = ExportError;

    /// Accepts `public-release`, `public_release` and `public release`,
    /// case-insensitively.
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace([' ', '_'], "-");
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| ExportError::InvalidClassification(s.to_string()))
    }
}

impl TryFrom<String> for Classification {
    type Error = ExportError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// How empty required metadata fields are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyFieldPolicy {
    /// Write empty values as `""`.
    #[default]
    PassThrough,
    /// Refuse to export when a required field is empty.
    RejectEmpty,
}

/// Metadata attached to every item of one export run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CopMetadata {
    pub mission: String,
    pub classification: Classification,
    pub releasability: String,
    pub dggs_crs: String,
    pub dggs_zone_id: Option<String>,
    pub service_provider: Option<String>,
}

impl Default for CopMetadata {
    fn default() -> Self {
        Self {
            mission: String::new(),
            classification: Classification::default(),
            releasability: DEFAULT_RELEASABILITY.to_string(),
            dggs_crs: DEFAULT_DGGS_CRS.to_string(),
            dggs_zone_id: None,
            service_provider: None,
        }
    }
}

impl CopMetadata {
    /// Check required fields against `policy`.
    pub fn check(&self, policy: EmptyFieldPolicy) -> Result<()> {
        if policy == EmptyFieldPolicy::PassThrough {
            return Ok(());
        }
        if self.mission.trim().is_empty() {
            return Err(ExportError::MissingField("mission"));
        }
        Ok(())
    }

    /// Every field as a `cop:`-prefixed STAC property. Unset optional
    /// fields are omitted.
    pub fn to_properties(&self) -> Map<String, Value> {
        let mut props = Map::new();
        props.insert("cop:mission".into(), self.mission.clone().into());
        props.insert(
            "cop:classification".into(),
            self.classification.as_str().into(),
        );
        props.insert("cop:releasability".into(), self.releasability.clone().into());
        props.insert("cop:dggs_crs".into(), self.dggs_crs.clone().into());
        if let Some(zone) = &self.dggs_zone_id {
            props.insert("cop:dggs_zone_id".into(), zone.clone().into());
        }
        if let Some(provider) = &self.service_provider {
            props.insert("cop:service_provider".into(), provider.clone().into());
        }
        props
    }
}
