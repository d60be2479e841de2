#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for `SafeRoute`.
//!
//! Loads the risk zone dataset once at startup and shares it read-only
//! across workers. `POST /api/route` asks the configured route provider for
//! alternatives between two points and returns them scored and ranked;
//! `POST /api/score` does the same for caller-supplied geometry.

mod handlers;

use std::path::PathBuf;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use saferoute_risk::DedupOptions;
use saferoute_routing::RouteProvider;
use saferoute_routing::ors::OrsProvider;
use saferoute_zones::ZoneStore;

/// Zone dataset used when `SAFEROUTE_ZONES_PATH` is not set.
pub const DEFAULT_ZONES_PATH: &str = "data/risk-zones.json";

/// Server settings, read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
    pub zones_path: PathBuf,
    pub dedup: DedupOptions,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
            zones_path: PathBuf::from(DEFAULT_ZONES_PATH),
            dedup: DedupOptions::default(),
        }
    }
}

impl ServerConfig {
    /// Reads `BIND_ADDR`, `PORT`, `SAFEROUTE_ZONES_PATH`,
    /// `SAFEROUTE_DEDUP_THRESHOLD_M` and `SAFEROUTE_DEDUP_SAMPLES`.
    /// Missing or unparsable values keep their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let bind_addr = lookup("BIND_ADDR").unwrap_or(defaults.bind_addr);
        let port = lookup("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);
        let zones_path = lookup("SAFEROUTE_ZONES_PATH").map_or(defaults.zones_path, PathBuf::from);
        let threshold_meters = lookup("SAFEROUTE_DEDUP_THRESHOLD_M")
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v >= 0.0)
            .unwrap_or(defaults.dedup.threshold_meters);
        let sample_points = lookup("SAFEROUTE_DEDUP_SAMPLES")
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(defaults.dedup.sample_points);

        Self {
            bind_addr,
            port,
            zones_path,
            dedup: DedupOptions {
                threshold_meters,
                sample_points,
            },
        }
    }
}

/// Shared application state.
pub struct AppState {
    /// Immutable zone dataset.
    pub zones: Arc<ZoneStore>,
    /// Source of candidate routes. `None` when no provider is configured,
    /// in which case only `/api/score` can produce routes.
    pub provider: Option<Arc<dyn RouteProvider>>,
    pub dedup: DedupOptions,
}

impl AppState {
    /// Loads the zone dataset and sets up the `OpenRouteService` provider
    /// from the environment.
    ///
    /// A missing dataset leaves the store empty; a missing API key leaves
    /// the provider unset. Neither is fatal.
    #[must_use]
    pub fn from_config(config: &ServerConfig) -> Self {
        let zones = ZoneStore::load_or_empty(&config.zones_path);

        let provider = match OrsProvider::from_env() {
            Ok(provider) => Some(Arc::new(provider) as Arc<dyn RouteProvider>),
            Err(e) => {
                log::warn!("Route provider unavailable: {e}");
                None
            }
        };

        Self {
            zones: Arc::new(zones),
            provider,
            dedup: config.dedup,
        }
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/zones", web::get().to(handlers::zones))
            .route("/route", web::post().to(handlers::route))
            .route("/score", web::post().to(handlers::score)),
    );
}

/// Starts the `SafeRoute` API server.
///
/// This is a regular async function; the caller provides the runtime (for
/// example via `#[actix_web::main]`) and initializes logging.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    log::info!("Loading risk zones from {}...", config.zones_path.display());
    let state = web::Data::new(AppState::from_config(&config));

    let ServerConfig { bind_addr, port, .. } = config;

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
