#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Risk zone and zone category types.
//!
//! A risk zone is a circle on the map (center + radius in kilometers) that
//! contributes its base risk to any route passing through it. These types
//! match the on-disk zone dataset format: a JSON array of
//! `{ name, latitude, longitude, radius, baseRisk, category? }` records.

use std::str::FromStr as _;

use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::EnumString;

/// Category tag attached to a risk zone.
///
/// The dataset pipeline emits a small closed set of tags. Anything else is
/// kept verbatim as [`ZoneCategory::Custom`] so that hand-edited datasets
/// still round-trip and still participate in the substring-based
/// time-of-day predicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumString, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ZoneCategory {
    /// Physical assault hotspots
    Assault,
    /// Theft, snatching, pickpocketing
    Theft,
    /// Road segments with a history of traffic accidents
    AccidentProne,
    /// Streets with poor or no lighting at night
    PoorLighting,
    /// Areas without safe pedestrian infrastructure
    UnsafePedestrian,
    /// Uncategorized incidents
    Other,
    /// Any tag outside the known set, kept as written
    #[strum(default)]
    Custom(String),
}

impl ZoneCategory {
    /// Returns the tag as it appears in the dataset.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Assault => "assault",
            Self::Theft => "theft",
            Self::AccidentProne => "accident_prone",
            Self::PoorLighting => "poor_lighting",
            Self::UnsafePedestrian => "unsafe_pedestrian",
            Self::Other => "other",
            Self::Custom(label) => label,
        }
    }

    /// Whether the tag mentions assault or lighting (case-insensitive).
    ///
    /// These zones are weighted up for night travel.
    #[must_use]
    pub fn is_night_sensitive(&self) -> bool {
        match self {
            Self::Assault | Self::PoorLighting => true,
            Self::Custom(label) => {
                let lower = label.to_ascii_lowercase();
                lower.contains("assault") || lower.contains("lighting")
            }
            _ => false,
        }
    }

    /// Whether the tag mentions accidents (case-insensitive).
    ///
    /// These zones are weighted up for evening travel.
    #[must_use]
    pub fn is_evening_sensitive(&self) -> bool {
        match self {
            Self::AccidentProne => true,
            Self::Custom(label) => label.to_ascii_lowercase().contains("accident"),
            _ => false,
        }
    }

    /// Default base risk for a zone of this category when the source data
    /// carries no explicit severity.
    #[must_use]
    pub const fn default_base_risk(&self) -> f64 {
        match self {
            Self::Assault => 40.0,
            Self::Theft => 32.0,
            Self::AccidentProne => 28.0,
            Self::PoorLighting => 25.0,
            Self::UnsafePedestrian => 22.0,
            Self::Other | Self::Custom(_) => 20.0,
        }
    }

    /// Returns all known (non-custom) categories.
    #[must_use]
    pub const fn known() -> [Self; 6] {
        [
            Self::Assault,
            Self::Theft,
            Self::AccidentProne,
            Self::PoorLighting,
            Self::UnsafePedestrian,
            Self::Other,
        ]
    }
}

impl From<String> for ZoneCategory {
    fn from(raw: String) -> Self {
        let trimmed = raw.trim();
        match Self::from_str(trimmed) {
            Ok(Self::Custom(_)) | Err(_) => Self::Custom(trimmed.to_string()),
            Ok(known) => known,
        }
    }
}

impl From<ZoneCategory> for String {
    fn from(category: ZoneCategory) -> Self {
        match category {
            ZoneCategory::Custom(label) => label,
            known => known.label().to_string(),
        }
    }
}

impl std::fmt::Display for ZoneCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A circular geographic region with a base risk contribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskZone {
    /// Unique identifier within the loaded dataset.
    pub name: String,
    /// Center latitude (degrees).
    pub latitude: f64,
    /// Center longitude (degrees).
    pub longitude: f64,
    /// Influence radius in kilometers.
    pub radius: f64,
    /// Risk weight contributed when a route intersects the zone.
    pub base_risk: f64,
    /// Optional category tag. Blank tags deserialize as `None`.
    #[serde(
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<ZoneCategory>,
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<ZoneCategory>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .filter(|s| !s.trim().is_empty())
        .map(ZoneCategory::from))
}
