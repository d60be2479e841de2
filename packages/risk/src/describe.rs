//! Natural-language route descriptions.
//!
//! A description is built from independent clauses: overall exposure,
//! comparison with the sibling routes, zones passed, how evenly risk is
//! spread along the route, time of day, and travel time.

use saferoute_risk_models::{RouteRiskSummary, RouteSegment};

/// How far the riskiest segment must sit above the average to count as a
/// concentrated spike.
const SPIKE_MARGIN: f64 = 25.0;

/// Segment-proxy variance below which risk reads as evenly spread.
const EVEN_VARIANCE: f64 = 200.0;

/// Describes one route in the context of every surviving route.
///
/// `all_summaries` should include `summary` itself. An empty slice is
/// treated like a single route, so no comparison is made. Without
/// `segments` the risk-distribution clause is skipped.
#[must_use]
pub fn describe(
    summary: &RouteRiskSummary,
    duration_minutes: f64,
    segments: Option<&[RouteSegment]>,
    all_summaries: &[RouteRiskSummary],
) -> String {
    let mut clauses: Vec<String> = Vec::with_capacity(6);

    clauses.push(exposure_clause(summary.risk_score).to_string());

    if let Some(comparison) = comparison_clause(summary.risk_score, all_summaries) {
        clauses.push(comparison);
    }

    clauses.push(zone_clause(summary));

    if let Some(character) = segments.and_then(character_clause) {
        clauses.push(character.to_string());
    }

    if summary.night_travel {
        clauses.push("Night travel: assault and lighting risk elevated.".to_string());
    } else if summary.evening_travel {
        clauses.push("Evening: slightly elevated risk.".to_string());
    }

    clauses.push(format!("~{:.0} min.", duration_minutes.round()));

    clauses.join(" ")
}

fn exposure_clause(risk_score: f64) -> &'static str {
    let safety = (100.0 - risk_score).max(0.0);

    if safety >= 75.0 {
        "Low overall exposure."
    } else if safety >= 55.0 {
        "Moderate overall exposure."
    } else if safety >= 35.0 {
        "Elevated exposure; some higher-risk segments."
    } else {
        "Higher overall exposure; consider alternatives if possible."
    }
}

fn comparison_clause(risk_score: f64, all_summaries: &[RouteRiskSummary]) -> Option<String> {
    let count = all_summaries.len();
    if count < 2 {
        return None;
    }

    let scores = || all_summaries.iter().map(|s| s.risk_score);
    let min = scores().fold(f64::INFINITY, f64::min);
    let max = scores().fold(f64::NEG_INFINITY, f64::max);

    Some(if risk_score <= min {
        format!("This is the safest option among {count} routes.")
    } else if risk_score >= max {
        format!("This is the riskiest of the {count} options.")
    } else {
        match scores().filter(|&s| s < risk_score).count() {
            1 => "1 route has lower risk.".to_string(),
            safer => format!("{safer} routes have lower risk."),
        }
    })
}

fn zone_clause(summary: &RouteRiskSummary) -> String {
    let count = summary.zone_names.len();
    if count == 0 {
        return "No known risk zones on this path.".to_string();
    }

    let noun = if count == 1 { "zone" } else { "zones" };
    if summary.zone_categories.is_empty() {
        format!("Passes {count} known risk {noun}.")
    } else {
        let categories = summary
            .zone_categories
            .iter()
            .map(|c| c.label())
            .collect::<Vec<_>>()
            .join(", ");
        format!("Passes {count} known risk {noun} ({categories}).")
    }
}

/// Notes a concentrated spike or an even spread of segment risk.
#[allow(clippy::cast_precision_loss)]
fn character_clause(segments: &[RouteSegment]) -> Option<&'static str> {
    if segments.is_empty() {
        return None;
    }

    let proxies: Vec<f64> = segments.iter().map(|s| s.level.proxy()).collect();
    let n = proxies.len() as f64;
    let avg = proxies.iter().sum::<f64>() / n;
    let max = proxies.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let variance = proxies.iter().map(|x| (x - avg).powi(2)).sum::<f64>() / n;

    let spike = max > avg + SPIKE_MARGIN;

    if spike && segments.len() > 3 {
        Some("One or more segments show concentrated risk.")
    } else if !spike && variance < EVEN_VARIANCE && segments.len() > 2 {
        Some("Risk is relatively even along the path.")
    } else {
        None
    }
}
