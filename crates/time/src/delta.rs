//! [`TimeDelta`] — the duration over which a [`crate::TimeVector`] query or
//! a [`Param`](../param) evaluation is averaged.
//!
//! A delta is either a fixed span of wall-clock time, or a
//! [`UnitsTimeDelta`]: a unit duration plus a set of integer ranges into
//! the unit grid of the containing macro period (used by adaptive
//! horizon blocks, spec §3 "UnitsTimeDelta").

use chrono::Duration;
use hydrosched_core::{HkError, HkResult};
use std::ops::RangeInclusive;

/// A duration, expressed either as a fixed span or as a set of unit
/// ranges into some containing macro period's unit grid.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeDelta {
    /// A fixed span of wall-clock time.
    Fixed(Duration),
    /// A set of unit ranges (adaptive horizon blocks).
    Units(UnitsTimeDelta),
}

impl TimeDelta {
    /// Total duration covered.
    pub fn duration(&self) -> Duration {
        match self {
            TimeDelta::Fixed(d) => *d,
            TimeDelta::Units(u) => u.duration(),
        }
    }

    /// Duration expressed in fractional hours (used by [`HourProduct`]
    /// and the MW<->GWh conversions).
    pub fn hours(&self) -> f64 {
        self.duration().num_milliseconds() as f64 / 3_600_000.0
    }

    /// Duration expressed in fractional seconds (used by the m3/s<->Mm3
    /// conversions).
    pub fn seconds(&self) -> f64 {
        self.duration().num_milliseconds() as f64 / 1_000.0
    }
}

/// A unit duration plus a set of integer ranges (inclusive, 0-indexed)
/// into the unit grid of a containing macro period.
///
/// Total duration = `unit * sum(range length)`. Successive-unit runs with
/// equal label are expected to already be merged by the caller (the
/// adaptive horizon classifier does this before constructing one of
/// these, see `hydrosched_horizon::adaptive`).
#[derive(Debug, Clone, PartialEq)]
pub struct UnitsTimeDelta {
    unit: Duration,
    ranges: Vec<RangeInclusive<u32>>,
}

impl UnitsTimeDelta {
    /// Build a `UnitsTimeDelta`, failing if `unit` is non-positive or any
    /// range is inverted.
    pub fn new(unit: Duration, ranges: Vec<RangeInclusive<u32>>) -> HkResult<Self> {
        if unit <= Duration::zero() {
            return Err(HkError::Construction(
                "UnitsTimeDelta unit duration must be positive".into(),
            ));
        }
        for r in &ranges {
            if r.start() > r.end() {
                return Err(HkError::Construction(format!(
                    "UnitsTimeDelta range {}..={} is inverted",
                    r.start(),
                    r.end()
                )));
            }
        }
        Ok(Self { unit, ranges })
    }

    pub fn unit(&self) -> Duration {
        self.unit
    }

    pub fn ranges(&self) -> &[RangeInclusive<u32>] {
        &self.ranges
    }

    /// Number of unit slots spanned (sum of range lengths).
    pub fn num_units(&self) -> u32 {
        self.ranges.iter().map(|r| r.end() - r.start() + 1).sum()
    }

    pub fn duration(&self) -> Duration {
        self.unit * self.num_units() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_hours() {
        let d = TimeDelta::Fixed(Duration::hours(3));
        assert_eq!(d.hours(), 3.0);
    }

    #[test]
    fn test_units_duration() {
        let utd = UnitsTimeDelta::new(Duration::hours(1), vec![0..=3, 7..=7]).unwrap();
        assert_eq!(utd.num_units(), 5);
        assert_eq!(utd.duration(), Duration::hours(5));
    }

    #[test]
    fn test_zero_unit_rejected() {
        let err = UnitsTimeDelta::new(Duration::zero(), vec![0..=1]).unwrap_err();
        assert!(matches!(err, HkError::Construction(_)));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = UnitsTimeDelta::new(Duration::hours(1), vec![5..=2]).unwrap_err();
        assert!(matches!(err, HkError::Construction(_)));
    }
}
