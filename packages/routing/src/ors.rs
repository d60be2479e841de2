//! `OpenRouteService` directions client.
//!
//! Requests alternative routes from the `GeoJSON` directions endpoint and
//! falls back to a single-route request when the alternatives request fails
//! or comes back empty.
//!
//! See <https://openrouteservice.org/dev/#/api-docs/v2/directions>

use saferoute_risk_models::RouteGeometry;
use serde::Serialize;

use crate::{RouteProvider, RouteQuery, RoutingError, TravelMode};

/// Public `OpenRouteService` API.
pub const DEFAULT_BASE_URL: &str = "https://api.openrouteservice.org";

/// How much two alternatives may overlap before the provider drops one.
const SHARE_FACTOR: f64 = 0.6;

/// `OpenRouteService` routing profile for a travel mode.
#[must_use]
pub const fn profile(mode: TravelMode) -> &'static str {
    match mode {
        TravelMode::Driving => "driving-car",
        TravelMode::Walking => "foot-walking",
        TravelMode::Bike => "cycling-regular",
    }
}

/// Number of alternative routes to ask for.
#[must_use]
pub const fn target_count(mode: TravelMode) -> u8 {
    match mode {
        TravelMode::Driving => 2,
        TravelMode::Walking | TravelMode::Bike => 3,
    }
}

#[derive(Debug, Serialize)]
struct DirectionsRequest {
    coordinates: [[f64; 2]; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    alternative_routes: Option<AlternativeRoutes>,
}

#[derive(Debug, Serialize)]
struct AlternativeRoutes {
    target_count: u8,
    share_factor: f64,
}

impl DirectionsRequest {
    fn new(query: &RouteQuery, alternatives: bool) -> Self {
        Self {
            coordinates: [
                [query.origin.x, query.origin.y],
                [query.destination.x, query.destination.y],
            ],
            alternative_routes: alternatives.then(|| AlternativeRoutes {
                target_count: target_count(query.mode),
                share_factor: SHARE_FACTOR,
            }),
        }
    }
}

/// `OpenRouteService` provider.
pub struct OrsProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl OrsProvider {
    /// Creates a provider against the given API base URL.
    #[must_use]
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Creates a provider from `ORS_API_KEY` and the optional `ORS_BASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::Config`] if `ORS_API_KEY` is not set.
    pub fn from_env() -> Result<Self, RoutingError> {
        let api_key = std::env::var("ORS_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| RoutingError::Config {
                message: "ORS_API_KEY environment variable not set".to_string(),
            })?;
        let base_url =
            std::env::var("ORS_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        Ok(Self::new(api_key, base_url))
    }

    fn directions_url(&self, mode: TravelMode) -> String {
        format!("{}/v2/directions/{}/geojson", self.base_url, profile(mode))
    }

    async fn request(
        &self,
        query: &RouteQuery,
        alternatives: bool,
    ) -> Result<Vec<RouteGeometry>, RoutingError> {
        let resp = self
            .client
            .post(self.directions_url(query.mode))
            .header("Authorization", self.api_key.as_str())
            .json(&DirectionsRequest::new(query, alternatives))
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let detail = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| error_message(&v))
                .unwrap_or(body);
            return Err(RoutingError::Provider {
                message: format!("HTTP {status}: {detail}"),
            });
        }

        let body: serde_json::Value = serde_json::from_str(&body)?;
        parse_response(&body)
    }
}

#[async_trait::async_trait]
impl RouteProvider for OrsProvider {
    async fn routes(&self, query: &RouteQuery) -> Result<Vec<RouteGeometry>, RoutingError> {
        let profile = profile(query.mode);

        match self.request(query, true).await {
            Ok(routes) if !routes.is_empty() => {
                log::debug!("ORS returned {} route(s) for {profile}", routes.len());
                return Ok(routes);
            }
            Ok(_) => {
                log::warn!("ORS returned no alternatives for {profile}; retrying single route");
            }
            Err(e) => {
                log::warn!(
                    "ORS alternatives request failed for {profile}: {e}; retrying single route"
                );
            }
        }

        let mut routes = self.request(query, false).await?;
        routes.truncate(1);
        Ok(routes)
    }
}

/// Extracts the error message from an ORS error body.
///
/// ORS reports errors either as `{"error": "..."}` or as
/// `{"error": {"code": ..., "message": "..."}}`.
fn error_message(body: &serde_json::Value) -> Option<String> {
    let error = &body["error"];
    error
        .as_str()
        .or_else(|| error["message"].as_str())
        .map(String::from)
}

/// Parses a directions `FeatureCollection` into route geometries.
///
/// Features that are not line strings, that have fewer than two positions,
/// or that contain a position with fewer than two components are skipped.
fn parse_response(body: &serde_json::Value) -> Result<Vec<RouteGeometry>, RoutingError> {
    let features = body["features"]
        .as_array()
        .ok_or_else(|| RoutingError::Provider {
            message: "ORS response has no features array".to_string(),
        })?;

    Ok(features
        .iter()
        .enumerate()
        .filter_map(|(index, value)| {
            let route = parse_feature(value.clone());
            if route.is_none() {
                log::warn!("Skipping unusable ORS feature {index}");
            }
            route
        })
        .collect())
}

fn parse_feature(value: serde_json::Value) -> Option<RouteGeometry> {
    let feature = geojson::Feature::from_json_value(value).ok()?;

    let geojson::Value::LineString(positions) = feature.geometry?.value else {
        return None;
    };
    if positions.len() < 2 || positions.iter().any(|p| p.len() < 2) {
        return None;
    }

    let duration_seconds = feature
        .properties
        .as_ref()
        .and_then(|props| props.get("summary"))
        .and_then(|summary| summary.get("duration"))
        .and_then(serde_json::Value::as_f64)
        .unwrap_or(0.0);

    Some(RouteGeometry::from_positions(&positions, duration_seconds))
}
