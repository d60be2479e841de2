#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Route risk assessment types.
//!
//! Two level scales coexist on purpose: [`RouteRiskLevel`] is the three-way
//! scale reported for a whole route, while [`SegmentRiskLevel`] is the
//! four-way scale used to color individual edges on the map. They use
//! different thresholds and are kept separate.

use std::collections::BTreeSet;

use saferoute_geomath::Coord;
use saferoute_zones_models::ZoneCategory;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Overall risk level of a route.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteRiskLevel {
    /// Score below 40
    #[default]
    Low,
    /// Score from 40 through 70
    Moderate,
    /// Score above 70
    High,
}

impl RouteRiskLevel {
    /// Maps a 0-100 route score onto the three-way scale.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score < 40.0 {
            Self::Low
        } else if score <= 70.0 {
            Self::Moderate
        } else {
            Self::High
        }
    }
}

/// Risk level of a single route edge.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SegmentRiskLevel {
    /// Score below 25
    Safe,
    /// Score from 25 up to 40
    Low,
    /// Score from 40 through 70
    Moderate,
    /// Score above 70
    High,
}

impl SegmentRiskLevel {
    /// Maps a 0-100 segment score onto the four-way scale.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score < 25.0 {
            Self::Safe
        } else if score < 40.0 {
            Self::Low
        } else if score <= 70.0 {
            Self::Moderate
        } else {
            Self::High
        }
    }

    /// Representative numeric value of the level, used when analyzing how
    /// risk is distributed along a route. Not a display score.
    #[must_use]
    pub const fn proxy(self) -> f64 {
        match self {
            Self::High => 82.0,
            Self::Moderate => 55.0,
            Self::Low => 32.0,
            Self::Safe => 15.0,
        }
    }
}

/// Time-of-day bucket the traveler falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TravelWindow {
    /// Daytime, or no usable time given
    #[default]
    Day,
    /// After 20:00, before the night window
    Evening,
    /// After 23:00 or before 04:00
    Night,
}

impl TravelWindow {
    #[must_use]
    pub const fn is_night(self) -> bool {
        matches!(self, Self::Night)
    }

    #[must_use]
    pub const fn is_evening(self) -> bool {
        matches!(self, Self::Evening)
    }
}

/// A candidate route geometry as returned by a routing provider.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RouteGeometry {
    /// Ordered vertices, `x` = longitude, `y` = latitude.
    pub coordinates: Vec<Coord<f64>>,
    /// Provider-estimated travel time in seconds.
    pub duration_seconds: f64,
}

impl RouteGeometry {
    #[must_use]
    pub const fn new(coordinates: Vec<Coord<f64>>, duration_seconds: f64) -> Self {
        Self {
            coordinates,
            duration_seconds,
        }
    }

    /// Builds a geometry from raw `[longitude, latitude, ...]` positions.
    ///
    /// Positions with fewer than two components are dropped; any extra
    /// components (elevation) are ignored.
    #[must_use]
    pub fn from_positions(positions: &[Vec<f64>], duration_seconds: f64) -> Self {
        let coordinates = positions
            .iter()
            .filter_map(|p| match p.as_slice() {
                [lon, lat, ..] => Some(Coord { x: *lon, y: *lat }),
                _ => None,
            })
            .collect();

        Self::new(coordinates, duration_seconds)
    }

    /// Vertices as `[longitude, latitude]` pairs.
    #[must_use]
    pub fn positions(&self) -> Vec<[f64; 2]> {
        self.coordinates.iter().map(|c| [c.x, c.y]).collect()
    }

    /// Travel time in minutes.
    #[must_use]
    pub fn duration_minutes(&self) -> f64 {
        self.duration_seconds / 60.0
    }

    /// Whether the geometry has enough vertices to form at least one edge.
    #[must_use]
    pub fn is_routable(&self) -> bool {
        self.coordinates.len() >= 2
    }
}

/// Risk assessment of a whole route.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRiskSummary {
    /// Normalized score in `[0, 100]`.
    pub risk_score: f64,
    pub risk_level: RouteRiskLevel,
    /// Names of every zone the route passes through.
    pub zone_names: BTreeSet<String>,
    /// Categories of the touched zones, de-duplicated in dataset order.
    pub zone_categories: Vec<ZoneCategory>,
    pub total_length_km: f64,
    pub night_travel: bool,
    pub evening_travel: bool,
}

impl RouteRiskSummary {
    /// Summary for a route too short to score: zero risk, no zones.
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }
}

/// One classified edge of a route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteSegment {
    pub start: Coord<f64>,
    pub end: Coord<f64>,
    /// Segment score in `[0, 100]`.
    pub score: f64,
    pub level: SegmentRiskLevel,
}

/// One itemized contributor to a route's risk, shown as an alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskBreakdownItem {
    pub factor: String,
    pub impact: f64,
}

impl RiskBreakdownItem {
    #[must_use]
    pub fn new(factor: impl Into<String>, impact: f64) -> Self {
        Self {
            factor: factor.into(),
            impact,
        }
    }
}

/// A ranked, described route ready to hand back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedRoute {
    /// `route-<index>` in ranked order.
    pub id: String,
    pub geometry: RouteGeometry,
    pub duration_minutes: f64,
    pub summary: RouteRiskSummary,
    pub segments: Vec<RouteSegment>,
    pub breakdown: Vec<RiskBreakdownItem>,
    /// Set on the lowest-risk route only.
    pub primary: bool,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_level_thresholds() {
        assert_eq!(RouteRiskLevel::from_score(0.0), RouteRiskLevel::Low);
        assert_eq!(RouteRiskLevel::from_score(39.99), RouteRiskLevel::Low);
        assert_eq!(RouteRiskLevel::from_score(40.0), RouteRiskLevel::Moderate);
        assert_eq!(RouteRiskLevel::from_score(70.0), RouteRiskLevel::Moderate);
        assert_eq!(RouteRiskLevel::from_score(70.01), RouteRiskLevel::High);
    }

    #[test]
    fn segment_level_thresholds() {
        assert_eq!(SegmentRiskLevel::from_score(24.9), SegmentRiskLevel::Safe);
        assert_eq!(SegmentRiskLevel::from_score(25.0), SegmentRiskLevel::Low);
        assert_eq!(SegmentRiskLevel::from_score(40.0), SegmentRiskLevel::Moderate);
        assert_eq!(SegmentRiskLevel::from_score(70.0), SegmentRiskLevel::Moderate);
        assert_eq!(SegmentRiskLevel::from_score(100.0), SegmentRiskLevel::High);
    }

    #[test]
    fn levels_serialize_in_upper_case() {
        assert_eq!(RouteRiskLevel::Moderate.to_string(), "MODERATE");
        assert_eq!(SegmentRiskLevel::Safe.as_ref(), "SAFE");
        assert_eq!(
            serde_json::to_value(RouteRiskLevel::High).unwrap(),
            serde_json::json!("HIGH")
        );
    }

    #[test]
    fn from_positions_drops_short_entries() {
        let geometry = RouteGeometry::from_positions(
            &[vec![77.2, 28.6], vec![77.3], vec![77.4, 28.7, 210.0], vec![]],
            600.0,
        );
        assert_eq!(geometry.positions(), vec![[77.2, 28.6], [77.4, 28.7]]);
        assert!(geometry.is_routable());
        assert!((geometry.duration_minutes() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_summary_is_low_and_empty() {
        let zero = RouteRiskSummary::zero();
        assert!(zero.risk_score.abs() < f64::EPSILON);
        assert_eq!(zero.risk_level, RouteRiskLevel::Low);
        assert!(zero.zone_names.is_empty());
        assert!(!zero.night_travel && !zero.evening_travel);
    }

    #[test]
    fn summary_serializes_camel_case() {
        let summary = RouteRiskSummary {
            risk_score: 55.0,
            risk_level: RouteRiskLevel::Moderate,
            zone_names: BTreeSet::from(["A".to_string()]),
            zone_categories: vec![ZoneCategory::Theft],
            total_length_km: 3.2,
            night_travel: false,
            evening_travel: true,
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["riskLevel"], "MODERATE");
        assert_eq!(value["zoneCategories"][0], "theft");
        assert_eq!(value["eveningTravel"], true);
    }
}
