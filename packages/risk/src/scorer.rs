//! Route-level risk scoring.
//!
//! A route's score is the sum of four terms, clamped to `[0, 100]`:
//!
//! * **zone component** - the (time-weighted) base risk of every zone the
//!   route passes through, as a percentage of the dataset's total base risk,
//!   or the remote baseline when the route touches no zone at all;
//! * **length factor** - 0.4 per kilometer, capped at 15;
//! * **segment factor** - 0.08 per edge, capped at 8;
//! * **time modifier** - 28 at night, 14 in the evening.
//!
//! Zone contact is detected by sampling each edge at a quarter, half, and
//! three quarters of the way along it.

use std::collections::BTreeSet;

use saferoute_geomath::{Coord, edges, lerp, polyline_length_km};
use saferoute_risk_models::{RouteRiskLevel, RouteRiskSummary, TravelWindow};
use saferoute_zones::ZoneStore;
use saferoute_zones_models::RiskZone;

use crate::{REMOTE_BASELINE, time};

/// Parametric positions sampled along every edge.
pub const EDGE_SAMPLES: [f64; 3] = [0.25, 0.5, 0.75];

/// Route-level time modifier at night.
pub const NIGHT_MODIFIER: f64 = 28.0;

/// Route-level time modifier in the evening.
pub const EVENING_MODIFIER: f64 = 14.0;

const NIGHT_ZONE_MULTIPLIER: f64 = 1.4;
const EVENING_ZONE_MULTIPLIER: f64 = 1.25;

const LENGTH_FACTOR_PER_KM: f64 = 0.4;
const LENGTH_FACTOR_CAP: f64 = 15.0;
const SEGMENT_FACTOR_PER_EDGE: f64 = 0.08;
const SEGMENT_FACTOR_CAP: f64 = 8.0;

/// Scores routes against a zone store.
///
/// Holds nothing but a shared reference to the store, so a single scorer
/// can be used from many threads at once.
#[derive(Debug, Clone, Copy)]
pub struct RiskScorer<'a> {
    store: &'a ZoneStore,
}

impl<'a> RiskScorer<'a> {
    #[must_use]
    pub const fn new(store: &'a ZoneStore) -> Self {
        Self { store }
    }

    #[must_use]
    pub const fn store(&self) -> &'a ZoneStore {
        self.store
    }

    /// Scores a route at the given local time (`HH:MM`, 24-hour).
    ///
    /// Routes with fewer than two coordinates get [`RouteRiskSummary::zero`].
    /// Edges with a non-finite endpoint are skipped.
    #[must_use]
    pub fn score(&self, coords: &[Coord<f64>], local_time: Option<&str>) -> RouteRiskSummary {
        self.score_in_window(coords, time::travel_window(local_time))
    }

    /// Scores a route for an already-classified travel window.
    #[must_use]
    pub fn score_in_window(
        &self,
        coords: &[Coord<f64>],
        window: TravelWindow,
    ) -> RouteRiskSummary {
        if coords.len() < 2 {
            return RouteRiskSummary::zero();
        }

        let touched = self.touched_zone_names(coords);
        let touched_zones = || {
            self.store
                .zones()
                .iter()
                .filter(|zone| touched.contains(zone.name.as_str()))
        };

        let total_zone_risk: f64 = touched_zones()
            .map(|zone| weighted_risk(zone, window))
            .sum();

        let max_possible_risk = self.store.max_possible_risk();
        let mut zone_component = if max_possible_risk > 0.0 {
            total_zone_risk / max_possible_risk * 100.0
        } else {
            0.0
        };
        if touched.is_empty() {
            zone_component += REMOTE_BASELINE;
        }

        let total_length_km = polyline_length_km(coords);
        let edge_count = coords.len() - 1;
        let length_factor = (total_length_km * LENGTH_FACTOR_PER_KM).min(LENGTH_FACTOR_CAP);
        #[allow(clippy::cast_precision_loss)]
        let segment_factor = (edge_count as f64 * SEGMENT_FACTOR_PER_EDGE).min(SEGMENT_FACTOR_CAP);
        let time_modifier = window_modifier(window);

        let risk_score =
            (zone_component + length_factor + segment_factor + time_modifier).clamp(0.0, 100.0);

        log::debug!(
            "Scored route: coords={} lengthKm={total_length_km:.2} zonesHit={} \
             rawZoneRisk={total_zone_risk:.1} zoneComp={zone_component:.1} \
             lenFactor={length_factor:.1} segFactor={segment_factor:.1} \
             timeMod={time_modifier:.0} -> riskScore={risk_score:.1}",
            coords.len(),
            touched.len(),
        );

        let mut zone_categories = Vec::new();
        for category in touched_zones().filter_map(|zone| zone.category.as_ref()) {
            if !category.label().is_empty() && !zone_categories.contains(category) {
                zone_categories.push(category.clone());
            }
        }

        RouteRiskSummary {
            risk_score,
            risk_level: RouteRiskLevel::from_score(risk_score),
            zone_names: touched.into_iter().map(str::to_string).collect(),
            zone_categories,
            total_length_km,
            night_travel: window.is_night(),
            evening_travel: window.is_evening(),
        }
    }

    /// Names of every zone containing at least one edge sample point.
    fn touched_zone_names(&self, coords: &[Coord<f64>]) -> BTreeSet<&'a str> {
        let store = self.store;
        let mut touched = BTreeSet::new();

        for (a, b) in edges(coords) {
            for t in EDGE_SAMPLES {
                for zone in store.zones_containing(lerp(a, b, t)) {
                    touched.insert(zone.name.as_str());
                }
            }
        }

        touched
    }
}

/// Zone base risk after the category-specific time-of-day weighting.
fn weighted_risk(zone: &RiskZone, window: TravelWindow) -> f64 {
    let category = zone.category.as_ref();

    match window {
        TravelWindow::Night if category.is_some_and(|c| c.is_night_sensitive()) => {
            zone.base_risk * NIGHT_ZONE_MULTIPLIER
        }
        TravelWindow::Evening if category.is_some_and(|c| c.is_evening_sensitive()) => {
            zone.base_risk * EVENING_ZONE_MULTIPLIER
        }
        _ => zone.base_risk,
    }
}

/// Additive time-of-day term shared by route and segment scores.
#[must_use]
pub const fn window_modifier(window: TravelWindow) -> f64 {
    match window {
        TravelWindow::Night => NIGHT_MODIFIER,
        TravelWindow::Evening => EVENING_MODIFIER,
        TravelWindow::Day => 0.0,
    }
}
