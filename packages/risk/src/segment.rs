//! Per-edge risk classification for map rendering.
//!
//! Unlike the route score, a segment is judged by its midpoint alone, every
//! containing zone contributes its unweighted base risk, and the time
//! modifier is added regardless of zone category.

use saferoute_geomath::{Coord, edges, midpoint};
use saferoute_risk_models::{RouteSegment, SegmentRiskLevel, TravelWindow};

use crate::{REMOTE_BASELINE, RiskScorer, scorer::window_modifier, time};

impl RiskScorer<'_> {
    /// Scores the edge `a -> b` at the given local time.
    #[must_use]
    pub fn classify_segment(
        &self,
        a: Coord<f64>,
        b: Coord<f64>,
        local_time: Option<&str>,
    ) -> (f64, SegmentRiskLevel) {
        self.classify_segment_in_window(a, b, time::travel_window(local_time))
    }

    #[must_use]
    pub fn classify_segment_in_window(
        &self,
        a: Coord<f64>,
        b: Coord<f64>,
        window: TravelWindow,
    ) -> (f64, SegmentRiskLevel) {
        let store = self.store();
        let hits = store.zones_containing(midpoint(a, b));

        let zone_risk: f64 = hits.iter().map(|zone| zone.base_risk).sum();
        let max_possible_risk = store.max_possible_risk();
        let mut score = if max_possible_risk > 0.0 {
            zone_risk / max_possible_risk * 100.0
        } else {
            0.0
        };
        if hits.is_empty() {
            score += REMOTE_BASELINE;
        }
        score += window_modifier(window);

        let score = score.clamp(0.0, 100.0);
        (score, SegmentRiskLevel::from_score(score))
    }

    /// Classifies every well-formed edge of a route, in order.
    #[must_use]
    pub fn route_segments(
        &self,
        coords: &[Coord<f64>],
        local_time: Option<&str>,
    ) -> Vec<RouteSegment> {
        self.route_segments_in_window(coords, time::travel_window(local_time))
    }

    #[must_use]
    pub fn route_segments_in_window(
        &self,
        coords: &[Coord<f64>],
        window: TravelWindow,
    ) -> Vec<RouteSegment> {
        edges(coords)
            .map(|(start, end)| {
                let (score, level) = self.classify_segment_in_window(start, end, window);
                RouteSegment {
                    start,
                    end,
                    score,
                    level,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use saferoute_geomath::lon_lat;
    use saferoute_zones::ZoneStore;
    use saferoute_zones_models::{RiskZone, ZoneCategory};

    use super::*;

    fn store() -> ZoneStore {
        let zone = |name: &str, lat: f64, base_risk: f64, category| RiskZone {
            name: name.to_string(),
            latitude: lat,
            longitude: 0.0,
            radius: 1.0,
            base_risk,
            category,
        };
        ZoneStore::new(vec![
            zone("hot", 0.0, 60.0, Some(ZoneCategory::Theft)),
            zone("warm", 1.0, 30.0, None),
            zone("mild", 2.0, 10.0, None),
        ])
    }

    /// Edge of about 0.2 km centered on the given latitude.
    fn edge_at(lat: f64) -> (Coord<f64>, Coord<f64>) {
        (lon_lat(0.0, lat - 0.001), lon_lat(0.0, lat + 0.001))
    }

    #[test]
    fn midpoint_zone_risk_is_normalized() {
        let store = store();
        let scorer = RiskScorer::new(&store);

        let (a, b) = edge_at(0.0);
        let (score, level) = scorer.classify_segment(a, b, Some("12:00"));
        assert!((score - 60.0).abs() < 1e-9);
        assert_eq!(level, SegmentRiskLevel::Moderate);

        let (a, b) = edge_at(2.0);
        let (score, level) = scorer.classify_segment(a, b, None);
        assert!((score - 10.0).abs() < 1e-9);
        assert_eq!(level, SegmentRiskLevel::Safe);
    }

    #[test]
    fn untouched_midpoint_gets_baseline_and_time_modifier() {
        let store = store();
        let scorer = RiskScorer::new(&store);
        let (a, b) = edge_at(10.0);

        let (day, day_level) = scorer.classify_segment(a, b, Some("10:00"));
        let (evening, evening_level) = scorer.classify_segment(a, b, Some("21:00"));
        let (night, night_level) = scorer.classify_segment(a, b, Some("02:00"));

        assert!((day - 18.0).abs() < 1e-9);
        assert_eq!(day_level, SegmentRiskLevel::Safe);
        assert!((evening - 32.0).abs() < 1e-9);
        assert_eq!(evening_level, SegmentRiskLevel::Low);
        assert!((night - 46.0).abs() < 1e-9);
        assert_eq!(night_level, SegmentRiskLevel::Moderate);
    }

    #[test]
    fn night_modifier_ignores_category_and_clamps() {
        let store = store();
        let scorer = RiskScorer::new(&store);
        let (a, b) = edge_at(0.0);

        let (score, level) = scorer.classify_segment(a, b, Some("23:45"));
        assert!((score - 88.0).abs() < 1e-9);
        assert_eq!(level, SegmentRiskLevel::High);

        let only = ZoneStore::new(vec![RiskZone {
            name: "solo".to_string(),
            latitude: 0.0,
            longitude: 0.0,
            radius: 1.0,
            base_risk: 5.0,
            category: None,
        }]);
        let (score, _) = RiskScorer::new(&only).classify_segment(a, b, Some("23:45"));
        assert!((score - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn one_segment_per_well_formed_edge() {
        let store = store();
        let scorer = RiskScorer::new(&store);
        let route = [
            lon_lat(0.0, -0.001),
            lon_lat(0.0, 0.001),
            lon_lat(0.0, 5.0),
            lon_lat(f64::NAN, 5.0),
            lon_lat(0.0, 6.0),
        ];

        let segments = scorer.route_segments(&route, None);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].start, route[0]);
        assert_eq!(segments[0].end, route[1]);
        assert_eq!(segments[0].level, SegmentRiskLevel::Moderate);
        assert_eq!(segments[1].start, route[1]);
        assert!(scorer.route_segments(&route[..1], None).is_empty());
    }
}
