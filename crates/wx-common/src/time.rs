//! Time-step normalization and model valid ranges.

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Round `t` to the nearest multiple of `step_hours`, measured from
/// midnight UTC of the same day.
///
/// Ties round up: 01:30 with a 3-hour step becomes 03:00. A result on the
/// day boundary rolls into the next day.
pub fn round_to_step(t: DateTime<Utc>, step_hours: u32) -> DateTime<Utc> {
    let step = i64::from(step_hours) * 3600;
    let since_midnight = i64::from(t.num_seconds_from_midnight());
    let rounded = (since_midnight + step / 2) / step * step;

    let midnight = t - Duration::seconds(since_midnight)
        - Duration::nanoseconds(i64::from(t.nanosecond()));
    midnight + Duration::seconds(rounded)
}

/// The date span over which a model archive has data.
///
/// `end == None` means "present": the span is open-ended but bounded by
/// the model's availability lag (recent analyses are not yet published).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidRange {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

impl ValidRange {
    /// Span starting at `start` and extending to the present.
    pub fn since(start: DateTime<Utc>) -> Self {
        Self { start, end: None }
    }

    /// Whether `t` falls inside the span, evaluated at wall-clock `now`
    /// with the archive's publication `lag` applied to the open end.
    pub fn contains_at(&self, t: DateTime<Utc>, now: DateTime<Utc>, lag: Duration) -> bool {
        let end = self.end.unwrap_or(now - lag);
        t >= self.start && t <= end
    }

    /// Human-readable description of the span, for error messages.
    pub fn describe(&self) -> String {
        match self.end {
            Some(end) => format!("{} to {}", self.start, end),
            None => format!("{} to present", self.start),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_round_up_past_half() {
        // 100 minutes past midnight against a 180-minute step rounds up.
        let t = Utc.with_ymd_and_hms(2020, 1, 24, 1, 40, 0).unwrap();
        let r = round_to_step(t, 3);
        assert_eq!(r, Utc.with_ymd_and_hms(2020, 1, 24, 3, 0, 0).unwrap());
    }

    #[test]
    fn test_round_down_before_half() {
        let t = Utc.with_ymd_and_hms(2020, 1, 24, 1, 20, 0).unwrap();
        let r = round_to_step(t, 3);
        assert_eq!(r, Utc.with_ymd_and_hms(2020, 1, 24, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_tie_rounds_up() {
        let t = Utc.with_ymd_and_hms(2020, 1, 24, 1, 30, 0).unwrap();
        let r = round_to_step(t, 3);
        assert_eq!(r, Utc.with_ymd_and_hms(2020, 1, 24, 3, 0, 0).unwrap());
    }

    #[test]
    fn test_already_on_step_is_unchanged() {
        let t = Utc.with_ymd_and_hms(2020, 1, 24, 6, 0, 0).unwrap();
        assert_eq!(round_to_step(t, 3), t);
        assert_eq!(round_to_step(t, 1), t);
    }

    #[test]
    fn test_rolls_into_next_day() {
        let t = Utc.with_ymd_and_hms(2020, 1, 24, 23, 10, 0).unwrap();
        let r = round_to_step(t, 3);
        assert_eq!(r, Utc.with_ymd_and_hms(2020, 1, 25, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_valid_range_with_lag() {
        let start = Utc.with_ymd_and_hms(2016, 7, 15, 0, 0, 0).unwrap();
        let range = ValidRange::since(start);
        let now = Utc.with_ymd_and_hms(2020, 1, 24, 12, 0, 0).unwrap();
        let lag = Duration::hours(3);

        let ok = Utc.with_ymd_and_hms(2020, 1, 24, 9, 0, 0).unwrap();
        let too_recent = Utc.with_ymd_and_hms(2020, 1, 24, 10, 0, 0).unwrap();
        let too_old = Utc.with_ymd_and_hms(2016, 7, 14, 0, 0, 0).unwrap();

        assert!(range.contains_at(ok, now, lag));
        assert!(!range.contains_at(too_recent, now, lag));
        assert!(!range.contains_at(too_old, now, lag));
    }

    #[test]
    fn test_closed_range_ignores_lag() {
        let range = ValidRange {
            start: Utc.with_ymd_and_hms(2016, 7, 15, 0, 0, 0).unwrap(),
            end: Some(Utc.with_ymd_and_hms(2018, 1, 1, 0, 0, 0).unwrap()),
        };
        let now = Utc.with_ymd_and_hms(2020, 1, 24, 12, 0, 0).unwrap();
        let t = Utc.with_ymd_and_hms(2017, 6, 1, 0, 0, 0).unwrap();
        assert!(range.contains_at(t, now, Duration::hours(3)));
        assert!(!range.contains_at(now, now, Duration::hours(3)));
    }
}
