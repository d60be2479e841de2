//! HTTP handler functions for the `SafeRoute` API.

use std::sync::Arc;

use actix_web::{HttpResponse, web};
use saferoute_risk::RoutePlanner;
use saferoute_risk_models::RouteGeometry;
use saferoute_routing::{RouteQuery, TravelMode};
use saferoute_server_models::{
    ApiHealth, ApiRouteRequest, ApiRoutesResponse, ApiScoreRequest, DEFAULT_TRAVEL_TIME,
};

use crate::AppState;

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        zone_count: state.zones.len(),
    })
}

/// `GET /api/zones`
///
/// Returns the loaded zone dataset for map overlays.
pub async fn zones(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.zones.zones())
}

/// `POST /api/route`
///
/// Fetches alternatives from the route provider and returns them scored,
/// de-duplicated and ranked by risk.
pub async fn route(state: web::Data<AppState>, body: web::Json<ApiRouteRequest>) -> HttpResponse {
    let request = body.into_inner();

    let (Some(origin), Some(destination)) =
        (request.origin.to_coord(), request.destination.to_coord())
    else {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Invalid origin or destination coordinates"
        }));
    };

    let Some(provider) = state.provider.clone() else {
        return HttpResponse::ServiceUnavailable()
            .json(ApiRoutesResponse::failed("No route provider configured"));
    };

    let query = RouteQuery {
        origin,
        destination,
        mode: TravelMode::parse_or_default(request.mode.as_deref()),
    };

    let candidates = match provider.routes(&query).await {
        Ok(candidates) => candidates,
        Err(e) => {
            log::error!("Failed to fetch {} routes: {e}", query.mode);
            return HttpResponse::BadGateway()
                .json(ApiRoutesResponse::failed(format!("Failed to fetch routes: {e}")));
        }
    };

    log::debug!("Provider returned {} candidate(s)", candidates.len());

    let time = request
        .time
        .unwrap_or_else(|| DEFAULT_TRAVEL_TIME.to_string());
    plan_response(&state, candidates, time).await
}

/// `POST /api/score`
///
/// Scores and ranks caller-supplied route geometry without contacting the
/// route provider.
pub async fn score(state: web::Data<AppState>, body: web::Json<ApiScoreRequest>) -> HttpResponse {
    let request = body.into_inner();

    let candidates: Vec<RouteGeometry> = request
        .routes
        .into_iter()
        .map(RouteGeometry::from)
        .collect();
    let time = request
        .time
        .unwrap_or_else(|| DEFAULT_TRAVEL_TIME.to_string());

    plan_response(&state, candidates, time).await
}

/// Runs the risk pipeline on the blocking pool and renders the result.
async fn plan_response(
    state: &AppState,
    candidates: Vec<RouteGeometry>,
    time: String,
) -> HttpResponse {
    let zones = Arc::clone(&state.zones);
    let dedup = state.dedup;

    let planned =
        web::block(move || RoutePlanner::new(&zones, dedup).plan(candidates, Some(&time))).await;

    match planned {
        Ok(routes) => HttpResponse::Ok().json(ApiRoutesResponse::from_planned(routes)),
        Err(e) => {
            log::error!("Route scoring failed: {e}");
            HttpResponse::InternalServerError()
                .json(ApiRoutesResponse::failed("Failed to score routes"))
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use saferoute_geomath::lon_lat;
    use saferoute_risk::DedupOptions;
    use saferoute_routing::{RouteProvider, RoutingError};
    use saferoute_zones::ZoneStore;

    use super::*;

    struct FixedProvider(Result<Vec<RouteGeometry>, String>);

    #[async_trait::async_trait]
    impl RouteProvider for FixedProvider {
        async fn routes(&self, _query: &RouteQuery) -> Result<Vec<RouteGeometry>, RoutingError> {
            self.0
                .clone()
                .map_err(|message| RoutingError::Provider { message })
        }
    }

    fn state(provider: Option<FixedProvider>) -> AppState {
        let zones = ZoneStore::from_json_str(
            r#"[{ "name": "Old Market", "latitude": 28.6, "longitude": 77.2,
                  "radius": 1.0, "baseRisk": 40, "category": "theft" }]"#,
        )
        .unwrap();

        AppState {
            zones: Arc::new(zones),
            provider: provider.map(|p| Arc::new(p) as Arc<dyn RouteProvider>),
            dedup: DedupOptions::default(),
        }
    }

    fn through_market() -> RouteGeometry {
        RouteGeometry::new(vec![lon_lat(77.19, 28.6), lon_lat(77.21, 28.6)], 300.0)
    }

    fn north_bypass() -> RouteGeometry {
        RouteGeometry::new(vec![lon_lat(77.19, 28.7), lon_lat(77.21, 28.7)], 420.0)
    }

    async fn call(state: AppState, req: test::TestRequest) -> (StatusCode, serde_json::Value) {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(crate::configure),
        )
        .await;
        let resp = test::call_service(&app, req.to_request()).await;
        let status = resp.status();
        let body: serde_json::Value = test::read_body_json(resp).await;
        (status, body)
    }

    fn route_request() -> test::TestRequest {
        test::TestRequest::post()
            .uri("/api/route")
            .set_json(serde_json::json!({
                "origin": { "lat": 28.6, "lng": 77.19 },
                "destination": { "lat": 28.6, "lng": 77.21 },
                "mode": "walking"
            }))
    }

    #[actix_web::test]
    async fn health_reports_zone_count() {
        let (status, body) = call(state(None), test::TestRequest::get().uri("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["healthy"], true);
        assert_eq!(body["zoneCount"], 1);
    }

    #[actix_web::test]
    async fn zones_lists_dataset() {
        let (status, body) = call(state(None), test::TestRequest::get().uri("/api/zones")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["name"], "Old Market");
        assert_eq!(body[0]["baseRisk"], 40.0);
    }

    #[actix_web::test]
    async fn route_ranks_provider_alternatives() {
        let provider = FixedProvider(Ok(vec![through_market(), north_bypass()]));
        let (status, body) = call(state(Some(provider)), route_request()).await;

        assert_eq!(status, StatusCode::OK);
        let routes = body["routes"].as_array().unwrap();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0]["id"], "route-0");
        assert_eq!(routes[0]["primary"], true);
        assert_eq!(routes[1]["primary"], false);
        assert_eq!(routes[0]["coordinates"][0], serde_json::json!([77.19, 28.7]));
        assert_eq!(routes[0]["duration"], 7.0);
        assert_eq!(routes[1]["zoneCategories"], serde_json::json!(["theft"]));
        assert_eq!(routes[1]["alerts"][0]["factor"], "Route intersects: Old Market");
        assert!(body.get("error").is_none());
    }

    #[actix_web::test]
    async fn route_rejects_invalid_coordinates() {
        let req = test::TestRequest::post()
            .uri("/api/route")
            .set_json(serde_json::json!({
                "origin": { "lat": 128.6, "lng": 77.19 },
                "destination": { "lat": 28.6, "lng": 77.21 }
            }));
        let provider = FixedProvider(Ok(vec![north_bypass()]));
        let (status, body) = call(state(Some(provider)), req).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[actix_web::test]
    async fn route_reports_provider_failure() {
        let provider = FixedProvider(Err("quota exceeded".to_string()));
        let (status, body) = call(state(Some(provider)), route_request()).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["routes"], serde_json::json!([]));
        assert!(body["error"].as_str().unwrap().contains("quota exceeded"));
    }

    #[actix_web::test]
    async fn route_without_provider_is_unavailable() {
        let (status, body) = call(state(None), route_request()).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["routes"], serde_json::json!([]));
    }

    #[actix_web::test]
    async fn score_uses_caller_geometry() {
        let req = test::TestRequest::post()
            .uri("/api/score")
            .set_json(serde_json::json!({
                "routes": [
                    { "coordinates": [[77.19, 28.6], [77.21, 28.6]], "durationSeconds": 300 },
                    { "coordinates": [[77.19, 28.6], [77.21]] }
                ],
                "time": "23:30"
            }));
        let (status, body) = call(state(None), req).await;

        assert_eq!(status, StatusCode::OK);
        let routes = body["routes"].as_array().unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0]["riskLevel"], "HIGH");
        assert_eq!(routes[0]["segments"].as_array().unwrap().len(), 1);
        let alerts = routes[0]["alerts"].as_array().unwrap();
        assert_eq!(alerts.last().unwrap()["factor"], "Late Night Risk Modifier");
    }

    #[actix_web::test]
    async fn score_with_no_routes_is_empty() {
        let req = test::TestRequest::post()
            .uri("/api/score")
            .set_json(serde_json::json!({ "routes": [] }));
        let (status, body) = call(state(None), req).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "routes": [] }));
    }
}
