#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Risk scoring and route selection.
//!
//! Given candidate route geometries from a routing provider and a
//! [`ZoneStore`](saferoute_zones::ZoneStore), this crate scores each route
//! for personal-safety risk, classifies its segments, collapses near
//! duplicates, ranks the survivors, and writes a comparative description for
//! each one. Everything here is a pure function of the geometry, the zone
//! store, and the local time.

pub mod breakdown;
pub mod dedup;
pub mod describe;
pub mod pipeline;
pub mod scorer;
pub mod segment;
pub mod time;

pub use dedup::DedupOptions;
pub use pipeline::{CandidateError, RoutePlanner, ScoredCandidate};
pub use scorer::RiskScorer;

/// Added to a route or segment score when it touches no known zone, to
/// account for unmonitored stretches.
pub const REMOTE_BASELINE: f64 = 18.0;
