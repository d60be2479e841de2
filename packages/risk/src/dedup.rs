//! Collapsing of near-identical route alternatives.
//!
//! Providers often return "alternatives" that follow the same road with
//! trivial offsets. Two routes are duplicates when the average distance
//! between points sampled at the same fractional position along each route
//! is below a threshold; the riskier of the pair is discarded.
//!
//! Comparison is pairwise, so cost grows with the square of the candidate
//! count. Providers return a handful of alternatives, which keeps this cheap.

use saferoute_geomath::{Coord, haversine_m, point_at};

/// Tunables for duplicate detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DedupOptions {
    /// Average deviation (meters) below which two routes are duplicates.
    pub threshold_meters: f64,
    /// Number of evenly spaced positions sampled along each route.
    pub sample_points: usize,
}

impl Default for DedupOptions {
    fn default() -> Self {
        Self {
            threshold_meters: 50.0,
            sample_points: 50,
        }
    }
}

/// A route that can take part in de-duplication.
pub trait Deduplicate {
    fn coordinates(&self) -> &[Coord<f64>];
    fn risk_score(&self) -> f64;
}

/// Average haversine distance in meters between points sampled at the same
/// parametric positions `k / (samples - 1)` along both routes.
///
/// Samples that land on a malformed edge of either route are skipped and the
/// average is taken over the rest. Returns `None` when either route has fewer
/// than two coordinates or no sample is usable.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average_deviation_meters(
    a: &[Coord<f64>],
    b: &[Coord<f64>],
    samples: usize,
) -> Option<f64> {
    if a.len() < 2 || b.len() < 2 || samples == 0 {
        return None;
    }

    let step = if samples > 1 {
        1.0 / (samples - 1) as f64
    } else {
        0.0
    };

    let mut total = 0.0;
    let mut valid = 0_usize;
    for k in 0..samples {
        let t = k as f64 * step;
        if let (Some(p), Some(q)) = (point_at(a, t), point_at(b, t)) {
            total += haversine_m(p, q);
            valid += 1;
        }
    }

    (valid > 0).then(|| total / valid as f64)
}

/// Removes routes that duplicate a better (or equal, earlier) route.
///
/// For every pair still standing, the route with the higher risk score is
/// dropped; on a tie the later one goes. The survivors keep their relative
/// order. Never empties a non-empty input.
#[must_use]
pub fn filter_duplicates<T: Deduplicate>(routes: Vec<T>, options: &DedupOptions) -> Vec<T> {
    let mut removed = vec![false; routes.len()];

    for i in 0..routes.len() {
        for j in (i + 1)..routes.len() {
            if removed[i] {
                break;
            }
            if removed[j] {
                continue;
            }

            let Some(deviation) = average_deviation_meters(
                routes[i].coordinates(),
                routes[j].coordinates(),
                options.sample_points,
            ) else {
                continue;
            };

            if deviation < options.threshold_meters {
                let drop = if routes[i].risk_score() > routes[j].risk_score() {
                    i
                } else {
                    j
                };
                log::debug!(
                    "Routes {i} and {j} deviate by {deviation:.1} m on average; dropping {drop}"
                );
                removed[drop] = true;
            }
        }
    }

    routes
        .into_iter()
        .zip(removed)
        .filter_map(|(route, removed)| (!removed).then_some(route))
        .collect()
}

#[cfg(test)]
mod tests {
    use saferoute_geomath::lon_lat;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Candidate {
        name: &'static str,
        coords: Vec<Coord<f64>>,
        score: f64,
    }

    impl Deduplicate for Candidate {
        fn coordinates(&self) -> &[Coord<f64>] {
            &self.coords
        }

        fn risk_score(&self) -> f64 {
            self.score
        }
    }

    /// Straight north-bound line from the origin shifted `east_deg` east.
    fn line(name: &'static str, east_deg: f64, score: f64) -> Candidate {
        Candidate {
            name,
            coords: vec![lon_lat(east_deg, 0.0), lon_lat(east_deg, 0.05)],
            score,
        }
    }

    fn names(routes: &[Candidate]) -> Vec<&'static str> {
        routes.iter().map(|r| r.name).collect()
    }

    #[test]
    fn identical_routes_have_zero_deviation() {
        let a = line("a", 0.0, 10.0);
        let deviation = average_deviation_meters(&a.coords, &a.coords, 50).unwrap();
        assert!(deviation.abs() < 1e-9);
    }

    #[test]
    fn deviation_ignores_vertex_density() {
        let sparse = [lon_lat(0.0, 0.0), lon_lat(0.0, 0.02)];
        let dense = [lon_lat(0.0, 0.0), lon_lat(0.0, 0.01), lon_lat(0.0, 0.02)];
        let deviation = average_deviation_meters(&sparse, &dense, 50).unwrap();
        assert!(deviation < 1e-6, "{deviation}");
    }

    #[test]
    fn deviation_undefined_for_short_routes() {
        let a = [lon_lat(0.0, 0.0)];
        let b = [lon_lat(0.0, 0.0), lon_lat(0.0, 1.0)];
        assert_eq!(average_deviation_meters(&a, &b, 50), None);
        assert_eq!(average_deviation_meters(&b, &b, 0), None);
    }

    #[test]
    fn deviation_skips_samples_on_malformed_edges() {
        let clean = [
            lon_lat(0.0, 0.0),
            lon_lat(0.0, 0.01),
            lon_lat(0.0, 0.02),
        ];
        let broken = [
            lon_lat(0.0, 0.0),
            lon_lat(0.0, 0.01),
            lon_lat(f64::NAN, 0.02),
        ];

        let deviation = average_deviation_meters(&clean, &broken, 50).unwrap();
        assert!(deviation < 1e-6, "{deviation}");

        let all_bad = [lon_lat(f64::NAN, 0.0), lon_lat(f64::NAN, 0.01)];
        assert_eq!(average_deviation_meters(&clean, &all_bad, 50), None);
    }

    #[test]
    fn malformed_tail_still_counts_as_duplicate() {
        let clean = Candidate {
            name: "clean",
            coords: vec![lon_lat(0.0, 0.0), lon_lat(0.0, 0.05), lon_lat(0.0, 0.1)],
            score: 10.0,
        };
        let broken = Candidate {
            name: "broken",
            coords: vec![lon_lat(0.0, 0.0), lon_lat(0.0, 0.05), lon_lat(f64::NAN, f64::NAN)],
            score: 40.0,
        };
        let routes = vec![clean, broken];

        let kept = filter_duplicates(routes, &DedupOptions::default());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name, "clean");
    }

    #[test]
    fn keeps_the_lower_scoring_duplicate() {
        // 0.0002 degrees of longitude at the equator is about 22 m.
        let routes = vec![
            line("risky", 0.0, 60.0),
            line("far", 0.01, 10.0),
            line("safe", 0.0002, 40.0),
        ];

        let kept = filter_duplicates(routes, &DedupOptions::default());
        assert_eq!(names(&kept), vec!["far", "safe"]);
    }

    #[test]
    fn ties_drop_the_later_route() {
        let routes = vec![line("first", 0.0, 30.0), line("second", 0.0001, 30.0)];
        let kept = filter_duplicates(routes, &DedupOptions::default());
        assert_eq!(names(&kept), vec!["first"]);
    }

    #[test]
    fn distinct_routes_survive_in_order() {
        let routes = vec![
            line("a", 0.0, 50.0),
            line("b", 0.01, 20.0),
            line("c", 0.02, 35.0),
        ];
        let kept = filter_duplicates(routes.clone(), &DedupOptions::default());
        assert_eq!(kept, routes);
    }

    #[test]
    fn never_empties_and_is_idempotent() {
        let single = vec![line("only", 0.0, 99.0)];
        assert_eq!(filter_duplicates(single, &DedupOptions::default()).len(), 1);

        let routes = vec![
            line("a", 0.0, 50.0),
            line("b", 0.0001, 40.0),
            line("c", 0.0002, 45.0),
            line("d", 0.0003, 30.0),
            line("e", 0.02, 70.0),
            Candidate {
                name: "stub",
                coords: vec![lon_lat(0.0, 0.0)],
                score: 0.0,
            },
        ];
        let count = routes.len();

        let once = filter_duplicates(routes, &DedupOptions::default());
        assert!(!once.is_empty() && once.len() <= count);
        assert!(names(&once).contains(&"stub"));

        let twice = filter_duplicates(once.clone(), &DedupOptions::default());
        assert_eq!(twice, once);
    }

    #[test]
    fn threshold_is_tunable() {
        let routes = vec![line("a", 0.0, 10.0), line("b", 0.01, 20.0)];
        let loose = DedupOptions {
            threshold_meters: 2_000.0,
            ..DedupOptions::default()
        };
        assert_eq!(names(&filter_duplicates(routes, &loose)), vec!["a"]);
    }
}
