#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Route geometry providers.
//!
//! The risk pipeline never computes paths itself. It scores whatever
//! candidate geometries a [`RouteProvider`] returns for an
//! origin/destination pair. [`ors::OrsProvider`] is the `OpenRouteService`
//! implementation.

pub mod ors;

use std::str::FromStr as _;

use saferoute_geomath::Coord;
use saferoute_risk_models::RouteGeometry;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Errors that can occur while fetching routes.
#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    /// HTTP request to the provider failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider response was not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The provider rejected the request or returned something unusable.
    #[error("Provider error: {message}")]
    Provider {
        /// Description of what went wrong.
        message: String,
    },

    /// The provider is missing required configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of what is missing.
        message: String,
    },
}

/// How the traveler is getting there.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
    Bike,
}

impl TravelMode {
    /// Parses a mode tag case-insensitively. Missing or unknown tags mean
    /// [`TravelMode::Driving`].
    #[must_use]
    pub fn parse_or_default(raw: Option<&str>) -> Self {
        raw.and_then(|s| Self::from_str(s.trim()).ok())
            .unwrap_or_default()
    }
}

/// A request for candidate routes between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteQuery {
    pub origin: Coord<f64>,
    pub destination: Coord<f64>,
    pub mode: TravelMode,
}

/// Source of candidate route geometries.
#[async_trait::async_trait]
pub trait RouteProvider: Send + Sync {
    /// Fetches candidate routes for the query.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError`] if the provider cannot be reached or returns
    /// an unusable response.
    async fn routes(&self, query: &RouteQuery) -> Result<Vec<RouteGeometry>, RoutingError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn travel_mode_parses_case_insensitively() {
        assert_eq!(TravelMode::parse_or_default(Some("walking")), TravelMode::Walking);
        assert_eq!(TravelMode::parse_or_default(Some(" BIKE ")), TravelMode::Bike);
        assert_eq!(TravelMode::parse_or_default(Some("Driving")), TravelMode::Driving);
    }

    #[test]
    fn travel_mode_defaults_to_driving() {
        assert_eq!(TravelMode::parse_or_default(None), TravelMode::Driving);
        assert_eq!(TravelMode::parse_or_default(Some("hovercraft")), TravelMode::Driving);
        assert_eq!(TravelMode::default().to_string(), "DRIVING");
    }
}
