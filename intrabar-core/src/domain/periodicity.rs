//! Periodicity — how often a series closes a bar.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Time unit of a bar period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodUnit {
    Second,
    Minute,
    Hour,
    Day,
}

impl PeriodUnit {
    fn seconds(&self) -> i64 {
        match self {
            PeriodUnit::Second => 1,
            PeriodUnit::Minute => 60,
            PeriodUnit::Hour => 3_600,
            PeriodUnit::Day => 86_400,
        }
    }

    fn suffix(&self) -> &'static str {
        match self {
            PeriodUnit::Second => "s",
            PeriodUnit::Minute => "min",
            PeriodUnit::Hour => "h",
            PeriodUnit::Day => "d",
        }
    }
}

/// Periodicity descriptor, e.g. "5 minutes" or "1 day".
///
/// A zero `value` is silently floored to 1, the same permissive setter
/// policy used for indicator parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Periodicity {
    unit: PeriodUnit,
    value: u32,
}

impl Periodicity {
    pub fn new(unit: PeriodUnit, value: u32) -> Self {
        Self {
            unit,
            value: value.max(1),
        }
    }

    pub fn seconds(value: u32) -> Self {
        Self::new(PeriodUnit::Second, value)
    }

    pub fn minutes(value: u32) -> Self {
        Self::new(PeriodUnit::Minute, value)
    }

    pub fn hours(value: u32) -> Self {
        Self::new(PeriodUnit::Hour, value)
    }

    pub fn days(value: u32) -> Self {
        Self::new(PeriodUnit::Day, value)
    }

    pub fn unit(&self) -> PeriodUnit {
        self.unit
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    /// Length of one bar period.
    pub fn as_duration(&self) -> Duration {
        Duration::seconds(self.unit.seconds() * i64::from(self.value))
    }

    /// Strictly finer-grained: one bar of `self` spans less time than one
    /// bar of `other`. This is the registration precondition for secondary
    /// series against the primary.
    pub fn is_finer_than(&self, other: &Periodicity) -> bool {
        self.as_duration() < other.as_duration()
    }

    /// Whether `timestamp` falls on a close boundary of this periodicity.
    ///
    /// The live scheduler uses this to skip the grace wait entirely when the
    /// primary series cannot produce a bar at a candidate timestamp.
    pub fn aligns(&self, timestamp: NaiveDateTime) -> bool {
        let period = self.as_duration().num_seconds();
        timestamp.and_utc().timestamp().rem_euclid(period) == 0
    }
}

impl fmt::Display for Periodicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.suffix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn finer_than_is_strict() {
        assert!(Periodicity::minutes(1).is_finer_than(&Periodicity::minutes(5)));
        assert!(!Periodicity::minutes(5).is_finer_than(&Periodicity::minutes(5)));
        assert!(!Periodicity::hours(1).is_finer_than(&Periodicity::minutes(30)));
    }

    #[test]
    fn finer_than_crosses_units() {
        assert!(Periodicity::seconds(30).is_finer_than(&Periodicity::minutes(1)));
        assert!(Periodicity::minutes(90).is_finer_than(&Periodicity::hours(2)));
    }

    #[test]
    fn zero_value_floors_to_one() {
        let p = Periodicity::minutes(0);
        assert_eq!(p.value(), 1);
        assert_eq!(p.as_duration(), Duration::minutes(1));
    }

    #[test]
    fn alignment_on_five_minute_boundary() {
        let p = Periodicity::minutes(5);
        assert!(p.aligns(at(12, 0, 0)));
        assert!(p.aligns(at(12, 5, 0)));
        assert!(!p.aligns(at(12, 1, 0)));
        assert!(!p.aligns(at(12, 5, 30)));
    }

    #[test]
    fn display_matches_label_shape() {
        assert_eq!(Periodicity::minutes(1).to_string(), "1min");
        assert_eq!(Periodicity::minutes(5).to_string(), "5min");
        assert_eq!(Periodicity::seconds(30).to_string(), "30s");
        assert_eq!(Periodicity::days(1).to_string(), "1d");
    }
}
