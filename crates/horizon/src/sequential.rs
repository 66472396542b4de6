//! [`SequentialHorizon`] — a flat list of periods with fixed durations.

use chrono::Duration;
use hydrosched_time::TimeDelta;

use crate::traits::{Horizon, Period};

/// A horizon whose period durations never change across `update!` calls.
/// Optionally shifted forward by a fixed `offset` (used when this horizon
/// represents a sub-window of a larger calendar).
#[derive(Debug, Clone)]
pub struct SequentialHorizon {
    durations: Vec<Duration>,
    offset: Duration,
}

impl SequentialHorizon {
    pub fn new(durations: Vec<Duration>) -> Self {
        Self {
            durations,
            offset: Duration::zero(),
        }
    }

    pub fn with_offset(durations: Vec<Duration>, offset: Duration) -> Self {
        Self { durations, offset }
    }

    pub fn offset(&self) -> Duration {
        self.offset
    }
}

impl Horizon for SequentialHorizon {
    fn num_periods(&self) -> Period {
        self.durations.len()
    }

    fn start_duration(&self, t: Period) -> Duration {
        self.offset
            + self.durations[..t - 1]
                .iter()
                .fold(Duration::zero(), |acc, d| acc + *d)
    }

    fn time_delta(&self, t: Period) -> TimeDelta {
        TimeDelta::Fixed(self.durations[t - 1])
    }

    fn has_constant_durations(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydrosched_core::HkError;

    fn h() -> SequentialHorizon {
        SequentialHorizon::new(vec![Duration::hours(1); 4])
    }

    #[test]
    fn test_num_periods_and_duration() {
        let h = h();
        assert_eq!(h.num_periods(), 4);
        assert_eq!(h.duration(), Duration::hours(4));
    }

    #[test]
    fn test_start_duration_accumulates() {
        let h = h();
        assert_eq!(h.start_duration(1), Duration::zero());
        assert_eq!(h.start_duration(3), Duration::hours(2));
    }

    #[test]
    fn test_end_period_from_duration_exact_match() {
        let h = h();
        assert_eq!(h.end_period_from_duration(Duration::hours(2)).unwrap(), 2);
    }

    #[test]
    fn test_end_period_from_duration_fails_on_misalignment() {
        let h = h();
        let err = h.end_period_from_duration(Duration::minutes(90)).unwrap_err();
        assert!(matches!(err, HkError::NoAlignment(_)));
    }

    #[test]
    fn test_has_constant_durations_and_not_adaptive() {
        let h = h();
        assert!(h.has_constant_durations());
        assert!(!h.is_adaptive());
    }

    #[test]
    fn test_generic_hint_fallbacks() {
        let h = h();
        assert_eq!(h.may_shift_from(2), (None, false));
        assert!(h.must_update(2));
    }
}
