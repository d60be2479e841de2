//! End-to-end route selection: score, de-duplicate, rank, describe.

use rayon::prelude::*;
use saferoute_geomath::Coord;
use saferoute_risk_models::{
    PlannedRoute, RiskBreakdownItem, RouteGeometry, RouteRiskSummary, RouteSegment, TravelWindow,
};
use saferoute_zones::ZoneStore;

use crate::{
    RiskScorer,
    dedup::{DedupOptions, Deduplicate, filter_duplicates},
    describe::describe,
    time,
};

/// Why a candidate route was dropped before ranking.
#[derive(Debug, thiserror::Error)]
pub enum CandidateError {
    #[error("route has {count} usable coordinate(s), need at least 2")]
    Degenerate { count: usize },

    #[error("route scored a non-finite risk value: {score}")]
    NonFiniteScore { score: f64 },
}

/// A candidate route with its risk assessment, before ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub geometry: RouteGeometry,
    pub summary: RouteRiskSummary,
    pub segments: Vec<RouteSegment>,
    pub breakdown: Vec<RiskBreakdownItem>,
}

impl Deduplicate for ScoredCandidate {
    fn coordinates(&self) -> &[Coord<f64>] {
        &self.geometry.coordinates
    }

    fn risk_score(&self) -> f64 {
        self.summary.risk_score
    }
}

/// Turns raw candidate geometries into ranked, described routes.
#[derive(Debug, Clone, Copy)]
pub struct RoutePlanner<'a> {
    scorer: RiskScorer<'a>,
    dedup: DedupOptions,
}

impl<'a> RoutePlanner<'a> {
    #[must_use]
    pub const fn new(store: &'a ZoneStore, dedup: DedupOptions) -> Self {
        Self {
            scorer: RiskScorer::new(store),
            dedup,
        }
    }

    /// Scores a single candidate.
    ///
    /// # Errors
    ///
    /// * [`CandidateError::Degenerate`] if the geometry has fewer than two
    ///   coordinates
    /// * [`CandidateError::NonFiniteScore`] if scoring produced NaN
    pub fn score_candidate(
        &self,
        geometry: RouteGeometry,
        window: TravelWindow,
    ) -> Result<ScoredCandidate, CandidateError> {
        if !geometry.is_routable() {
            return Err(CandidateError::Degenerate {
                count: geometry.coordinates.len(),
            });
        }

        let coords = &geometry.coordinates;
        let summary = self.scorer.score_in_window(coords, window);
        if !summary.risk_score.is_finite() {
            return Err(CandidateError::NonFiniteScore {
                score: summary.risk_score,
            });
        }

        let segments = self.scorer.route_segments_in_window(coords, window);
        let breakdown = self.scorer.breakdown_in_window(coords, window);

        Ok(ScoredCandidate {
            geometry,
            summary,
            segments,
            breakdown,
        })
    }

    /// Scores every candidate in parallel, drops failures and duplicates,
    /// ranks the rest by ascending risk, and describes each one.
    ///
    /// Returns an empty list when no candidate survives.
    #[must_use]
    pub fn plan(
        &self,
        candidates: Vec<RouteGeometry>,
        local_time: Option<&str>,
    ) -> Vec<PlannedRoute> {
        let window = time::travel_window(local_time);
        let total = candidates.len();

        let results: Vec<_> = candidates
            .into_par_iter()
            .map(|geometry| self.score_candidate(geometry, window))
            .collect();

        let scored: Vec<ScoredCandidate> = results
            .into_iter()
            .enumerate()
            .filter_map(|(index, result)| match result {
                Ok(candidate) => Some(candidate),
                Err(e) => {
                    log::warn!("Dropping candidate route {index}: {e}");
                    None
                }
            })
            .collect();

        let mut survivors = filter_duplicates(scored, &self.dedup);
        survivors.sort_by(|a, b| a.summary.risk_score.total_cmp(&b.summary.risk_score));

        log::info!(
            "Planned {} of {total} candidate route(s) (window: {window:?})",
            survivors.len()
        );

        let summaries: Vec<RouteRiskSummary> =
            survivors.iter().map(|c| c.summary.clone()).collect();

        survivors
            .into_iter()
            .enumerate()
            .map(|(index, candidate)| {
                let duration_minutes = candidate.geometry.duration_minutes();
                let description = describe(
                    &candidate.summary,
                    duration_minutes,
                    Some(candidate.segments.as_slice()),
                    &summaries,
                );

                PlannedRoute {
                    id: format!("route-{index}"),
                    geometry: candidate.geometry,
                    duration_minutes,
                    summary: candidate.summary,
                    segments: candidate.segments,
                    breakdown: candidate.breakdown,
                    primary: index == 0,
                    description,
                }
            })
            .collect()
    }
}
