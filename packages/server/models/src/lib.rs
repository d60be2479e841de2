#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the `SafeRoute` server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the risk pipeline types to allow independent evolution of the API
//! contract. Coordinates on the wire are `[longitude, latitude]` pairs.

use saferoute_geomath::{Coord, lon_lat};
use saferoute_risk_models::{
    PlannedRoute, RiskBreakdownItem, RouteGeometry, RouteRiskLevel, RouteSegment,
    SegmentRiskLevel,
};
use saferoute_zones_models::ZoneCategory;
use serde::{Deserialize, Serialize};

/// Travel time assumed when a request carries none.
pub const DEFAULT_TRAVEL_TIME: &str = "14:00";

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
    /// Number of risk zones loaded.
    pub zone_count: usize,
}

/// A point given as latitude/longitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ApiLocation {
    /// Latitude (degrees).
    pub lat: f64,
    /// Longitude (degrees).
    pub lng: f64,
}

impl ApiLocation {
    /// Converts to a lon/lat coordinate, rejecting non-finite or
    /// out-of-range values.
    #[must_use]
    pub fn to_coord(self) -> Option<Coord<f64>> {
        let valid = self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat.abs() <= 90.0
            && self.lng.abs() <= 180.0;
        valid.then(|| lon_lat(self.lng, self.lat))
    }
}

/// Body of `POST /api/route`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRouteRequest {
    pub origin: ApiLocation,
    pub destination: ApiLocation,
    /// Local travel time, `HH:MM` 24-hour.
    pub time: Option<String>,
    /// `DRIVING`, `WALKING`, or `BIKE` (case-insensitive).
    pub mode: Option<String>,
}

/// One caller-supplied route in `POST /api/score`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCandidateRoute {
    /// `[longitude, latitude]` positions. Entries with fewer than two
    /// components are ignored.
    pub coordinates: Vec<Vec<f64>>,
    #[serde(default)]
    pub duration_seconds: f64,
}

impl From<ApiCandidateRoute> for RouteGeometry {
    fn from(route: ApiCandidateRoute) -> Self {
        Self::from_positions(&route.coordinates, route.duration_seconds)
    }
}

/// Body of `POST /api/score`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiScoreRequest {
    pub routes: Vec<ApiCandidateRoute>,
    /// Local travel time, `HH:MM` 24-hour.
    pub time: Option<String>,
}

/// A classified route edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRouteSegment {
    /// Start and end as `[longitude, latitude]`.
    pub coordinates: [[f64; 2]; 2],
    pub risk_level: SegmentRiskLevel,
}

impl From<&RouteSegment> for ApiRouteSegment {
    fn from(segment: &RouteSegment) -> Self {
        Self {
            coordinates: [
                [segment.start.x, segment.start.y],
                [segment.end.x, segment.end.y],
            ],
            risk_level: segment.level,
        }
    }
}

/// A scored, ranked route option.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRouteOption {
    /// `route-<index>` in ranked order.
    pub id: String,
    /// `[longitude, latitude]` vertices.
    pub coordinates: Vec<[f64; 2]>,
    pub segments: Vec<ApiRouteSegment>,
    /// Travel time in minutes.
    pub duration: f64,
    pub risk_score: f64,
    pub risk_level: RouteRiskLevel,
    pub description: String,
    /// Whether this is the recommended (lowest-risk) route.
    pub primary: bool,
    /// Itemized risk contributors.
    pub alerts: Vec<RiskBreakdownItem>,
    pub zone_categories: Vec<ZoneCategory>,
}

impl From<PlannedRoute> for ApiRouteOption {
    fn from(route: PlannedRoute) -> Self {
        Self {
            coordinates: route.geometry.positions(),
            segments: route.segments.iter().map(ApiRouteSegment::from).collect(),
            duration: route.duration_minutes,
            risk_score: route.summary.risk_score,
            risk_level: route.summary.risk_level,
            description: route.description,
            primary: route.primary,
            alerts: route.breakdown,
            zone_categories: route.summary.zone_categories,
            id: route.id,
        }
    }
}

/// Response of the route endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRoutesResponse {
    pub routes: Vec<ApiRouteOption>,
    /// Set when the routes could not be computed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiRoutesResponse {
    #[must_use]
    pub fn from_planned(routes: Vec<PlannedRoute>) -> Self {
        Self {
            routes: routes.into_iter().map(ApiRouteOption::from).collect(),
            error: None,
        }
    }

    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            routes: Vec::new(),
            error: Some(error.into()),
        }
    }
}
