//! Itemized risk alerts shown next to each route.

use saferoute_geomath::{Coord, is_finite};
use saferoute_risk_models::{RiskBreakdownItem, TravelWindow};
use saferoute_zones::contains;

use crate::{RiskScorer, time};

/// Alert impact for late-night travel.
pub const NIGHT_ALERT_IMPACT: f64 = 15.0;

/// Alert impact for evening travel.
pub const EVENING_ALERT_IMPACT: f64 = 8.0;

impl RiskScorer<'_> {
    /// Lists the zones the route passes through and the time-of-day factor.
    ///
    /// A zone is listed, in dataset order, when any route vertex lies inside
    /// its radius; its impact is the zone's base risk. A night or evening
    /// item follows. An empty route has no alerts.
    #[must_use]
    pub fn breakdown(
        &self,
        coords: &[Coord<f64>],
        local_time: Option<&str>,
    ) -> Vec<RiskBreakdownItem> {
        self.breakdown_in_window(coords, time::travel_window(local_time))
    }

    #[must_use]
    pub fn breakdown_in_window(
        &self,
        coords: &[Coord<f64>],
        window: TravelWindow,
    ) -> Vec<RiskBreakdownItem> {
        if coords.is_empty() {
            return Vec::new();
        }

        let mut items: Vec<_> = self
            .store()
            .zones()
            .iter()
            .filter(|zone| {
                coords
                    .iter()
                    .any(|&point| is_finite(point) && contains(zone, point))
            })
            .map(|zone| {
                RiskBreakdownItem::new(format!("Route intersects: {}", zone.name), zone.base_risk)
            })
            .collect();

        match window {
            TravelWindow::Night => {
                items.push(RiskBreakdownItem::new(
                    "Late Night Risk Modifier",
                    NIGHT_ALERT_IMPACT,
                ));
            }
            TravelWindow::Evening => {
                items.push(RiskBreakdownItem::new(
                    "Evening Risk Modifier",
                    EVENING_ALERT_IMPACT,
                ));
            }
            TravelWindow::Day => {}
        }

        items
    }
}
