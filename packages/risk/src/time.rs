//! Time-of-day parsing for the night and evening risk modifiers.

use chrono::{NaiveTime, Timelike as _};
use saferoute_risk_models::TravelWindow;

const FORMATS: [&str; 3] = ["%H:%M", "%H:%M:%S", "%H:%M:%S%.f"];

/// Parses a 24-hour `HH:MM`, `HH:MM:SS`, or `HH:MM:SS.fff` local time.
///
/// Surrounding whitespace is ignored. Returns `None` for anything else.
#[must_use]
pub fn parse_local_time(raw: &str) -> Option<NaiveTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(trimmed, format).ok())
}

/// Buckets a local time.
///
/// Night is strictly after 23:00 or strictly before 04:00. Evening is
/// strictly after 20:00 and not night. Both boundaries are exclusive, so
/// 23:00 itself is evening and 20:00 itself is day.
#[must_use]
pub fn classify(time: NaiveTime) -> TravelWindow {
    let after = |hour: u32| {
        NaiveTime::from_hms_opt(hour, 0, 0).is_some_and(|boundary| time > boundary)
    };

    if after(23) || time.hour() < 4 {
        TravelWindow::Night
    } else if after(20) {
        TravelWindow::Evening
    } else {
        TravelWindow::Day
    }
}

/// Buckets an optional raw time string. Absent or unparsable times fall in
/// the day window, which carries no modifier.
#[must_use]
pub fn travel_window(local_time: Option<&str>) -> TravelWindow {
    let Some(raw) = local_time else {
        return TravelWindow::Day;
    };

    parse_local_time(raw).map_or_else(
        || {
            log::debug!("Ignoring unparsable travel time '{raw}'");
            TravelWindow::Day
        },
        classify,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_formats() {
        let expected = NaiveTime::from_hms_opt(21, 5, 0);
        assert_eq!(parse_local_time("21:05"), expected);
        assert_eq!(parse_local_time(" 21:05:00 "), expected);
        assert_eq!(
            parse_local_time("21:05:00.250"),
            NaiveTime::from_hms_milli_opt(21, 5, 0, 250)
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_local_time(""), None);
        assert_eq!(parse_local_time("   "), None);
        assert_eq!(parse_local_time("late"), None);
        assert_eq!(parse_local_time("25:00"), None);
        assert_eq!(parse_local_time("12:61"), None);
    }

    #[test]
    fn window_boundaries_are_exclusive() {
        let window = |raw: &str| travel_window(Some(raw));

        assert_eq!(window("14:00"), TravelWindow::Day);
        assert_eq!(window("20:00"), TravelWindow::Day);
        assert_eq!(window("20:01"), TravelWindow::Evening);
        assert_eq!(window("23:00"), TravelWindow::Evening);
        assert_eq!(window("23:00:01"), TravelWindow::Night);
        assert_eq!(window("23:30"), TravelWindow::Night);
        assert_eq!(window("00:00"), TravelWindow::Night);
        assert_eq!(window("03:59"), TravelWindow::Night);
        assert_eq!(window("04:00"), TravelWindow::Day);
    }

    #[test]
    fn missing_or_bad_time_is_day() {
        assert_eq!(travel_window(None), TravelWindow::Day);
        assert_eq!(travel_window(Some("midnight")), TravelWindow::Day);
    }
}
