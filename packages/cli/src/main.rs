#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for the `SafeRoute` toolchain.
//!
//! Runs the API server, plans routes between two points through the route
//! provider, scores route geometry from a file, and builds the zone dataset
//! from raw incident CSV exports.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use saferoute_risk::{DedupOptions, RoutePlanner};
use saferoute_risk_models::RouteGeometry;
use saferoute_routing::ors::OrsProvider;
use saferoute_routing::{RouteProvider as _, RouteQuery, TravelMode};
use saferoute_server::{DEFAULT_ZONES_PATH, ServerConfig};
use saferoute_server_models::{ApiLocation, ApiRoutesResponse, ApiScoreRequest, DEFAULT_TRAVEL_TIME};
use saferoute_zones::ZoneStore;
use saferoute_zones::ingest::{self, Bounds, BuildOptions};

#[derive(Parser)]
#[command(name = "saferoute", about = "Safety-aware route planning toolchain")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server (configured through the environment)
    Serve,
    /// Fetch alternatives between two points and rank them by risk
    Route {
        /// Origin as "lat,lng"
        #[arg(long, value_parser = parse_location)]
        from: ApiLocation,
        /// Destination as "lat,lng"
        #[arg(long, value_parser = parse_location)]
        to: ApiLocation,
        /// DRIVING, WALKING, or BIKE
        #[arg(long)]
        mode: Option<String>,
        /// Local travel time, HH:MM (default 14:00)
        #[arg(long)]
        time: Option<String>,
        /// Zone dataset (JSON)
        #[arg(long, default_value = DEFAULT_ZONES_PATH)]
        zones: PathBuf,
    },
    /// Score route geometry from a JSON file shaped like the `/api/score` body
    Score {
        /// Input file with `{ "routes": [...], "time": ... }`
        input: PathBuf,
        /// Overrides the time given in the file
        #[arg(long)]
        time: Option<String>,
        /// Zone dataset (JSON)
        #[arg(long, default_value = DEFAULT_ZONES_PATH)]
        zones: PathBuf,
    },
    /// Build the zone dataset from an incident CSV export
    BuildZones {
        /// CSV file with at least latitude and longitude columns
        input: PathBuf,
        /// Output JSON file
        #[arg(long, default_value = DEFAULT_ZONES_PATH)]
        output: PathBuf,
        /// Keep only rows inside "west,south,east,north"
        #[arg(long)]
        bounds: Option<Bounds>,
        /// Radius in km for rows that carry none
        #[arg(long, default_value = "0.8")]
        default_radius: f64,
        /// Merge zones whose centers are closer than this many km
        #[arg(long, default_value = "0.5")]
        cluster_distance: f64,
    },
}

/// Parses `"lat,lng"` into a validated location.
fn parse_location(s: &str) -> Result<ApiLocation, String> {
    let Some((lat, lng)) = s.split_once(',') else {
        return Err(format!("invalid location '{s}': expected lat,lng"));
    };
    let location = ApiLocation {
        lat: lat
            .trim()
            .parse()
            .map_err(|e| format!("invalid latitude in '{s}': {e}"))?,
        lng: lng
            .trim()
            .parse()
            .map_err(|e| format!("invalid longitude in '{s}': {e}"))?,
    };

    if location.to_coord().is_none() {
        return Err(format!("location '{s}' is out of range"));
    }
    Ok(location)
}

fn print_routes(routes: ApiRoutesResponse) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(&routes)?);
    Ok(())
}

fn load_zones(path: &Path) -> Result<ZoneStore, Box<dyn std::error::Error>> {
    Ok(ZoneStore::load(path)?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve => {
            // The server uses actix-web's runtime, so we need to run it
            // in a blocking task to avoid nesting tokio runtimes.
            tokio::task::spawn_blocking(|| {
                actix_web::rt::System::new()
                    .block_on(saferoute_server::run_server(ServerConfig::from_env()))
            })
            .await??;
        }
        Commands::Route {
            from,
            to,
            mode,
            time,
            zones,
        } => {
            let (Some(origin), Some(destination)) = (from.to_coord(), to.to_coord()) else {
                return Err("origin or destination out of range".into());
            };
            let store = load_zones(&zones)?;
            let provider = OrsProvider::from_env()?;
            let query = RouteQuery {
                origin,
                destination,
                mode: TravelMode::parse_or_default(mode.as_deref()),
            };

            let candidates = provider.routes(&query).await?;
            log::info!("Provider returned {} candidate(s)", candidates.len());

            let time = time.unwrap_or_else(|| DEFAULT_TRAVEL_TIME.to_string());
            let planned = RoutePlanner::new(&store, DedupOptions::default())
                .plan(candidates, Some(&time));
            print_routes(ApiRoutesResponse::from_planned(planned))?;
        }
        Commands::Score { input, time, zones } => {
            let store = load_zones(&zones)?;
            let request: ApiScoreRequest =
                serde_json::from_reader(BufReader::new(File::open(&input)?))?;

            let time = time
                .or(request.time)
                .unwrap_or_else(|| DEFAULT_TRAVEL_TIME.to_string());
            let candidates: Vec<RouteGeometry> = request
                .routes
                .into_iter()
                .map(RouteGeometry::from)
                .collect();

            let planned = RoutePlanner::new(&store, DedupOptions::default())
                .plan(candidates, Some(&time));
            print_routes(ApiRoutesResponse::from_planned(planned))?;
        }
        Commands::BuildZones {
            input,
            output,
            bounds,
            default_radius,
            cluster_distance,
        } => {
            let options = BuildOptions {
                bounds,
                default_radius_km: default_radius,
                cluster_distance_km: cluster_distance,
            };

            let zones = ingest::build_zones(BufReader::new(File::open(&input)?), &options)?;
            if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            ingest::write_zones(&zones, BufWriter::new(File::create(&output)?))?;
            log::info!("Wrote {} zones to {}", zones.len(), output.display());
        }
    }

    Ok(())
}
