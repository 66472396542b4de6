//! [`ShiftableHorizon`] — exposes shift hints over the uniform-duration
//! prefix of its inner horizon when `probtime` advances by exactly one
//! unit of the innermost block structure.

use std::sync::Arc;

use chrono::Duration;
use hydrosched_time::TimeDelta;

use crate::traits::{Horizon, Period};

#[derive(Debug, Clone)]
pub struct ShiftableHorizon {
    inner: Arc<dyn Horizon>,
    unit_duration: Duration,
    shifted: bool,
}

impl ShiftableHorizon {
    pub fn new(inner: Arc<dyn Horizon>, unit_duration: Duration) -> Self {
        Self {
            inner,
            unit_duration,
            shifted: false,
        }
    }

    /// Record whether this `update!` advanced probtime by exactly one
    /// innermost unit; only then does the shift hint activate.
    pub fn update(&mut self, advance: Duration) {
        self.shifted = advance == self.unit_duration;
    }

    /// The maximal prefix of periods sharing period 1's duration.
    fn uniform_prefix_len(&self) -> usize {
        let n = self.inner.num_periods();
        if n == 0 {
            return 0;
        }
        let first = self.inner.time_delta(1).duration();
        (1..=n)
            .take_while(|&t| self.inner.time_delta(t).duration() == first)
            .count()
    }
}

impl Horizon for ShiftableHorizon {
    fn num_periods(&self) -> Period {
        self.inner.num_periods()
    }

    fn start_duration(&self, t: Period) -> Duration {
        self.inner.start_duration(t)
    }

    fn time_delta(&self, t: Period) -> TimeDelta {
        self.inner.time_delta(t)
    }

    fn is_adaptive(&self) -> bool {
        self.inner.is_adaptive()
    }

    fn has_constant_durations(&self) -> bool {
        self.inner.has_constant_durations()
    }

    fn may_shift_from(&self, t: Period) -> (Option<Period>, bool) {
        if self.shifted && t < self.uniform_prefix_len() {
            (Some(t + 1), true)
        } else {
            self.inner.may_shift_from(t)
        }
    }

    fn must_update(&self, t: Period) -> bool {
        if self.shifted && t < self.uniform_prefix_len() {
            false
        } else {
            self.inner.must_update(t)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequential::SequentialHorizon;

    #[test]
    fn test_shift_hints_active_over_uniform_prefix() {
        let inner = Arc::new(SequentialHorizon::new(vec![
            Duration::hours(1),
            Duration::hours(1),
            Duration::hours(2),
        ]));
        let mut h = ShiftableHorizon::new(inner, Duration::hours(1));
        h.update(Duration::hours(1));
        assert_eq!(h.may_shift_from(1), (Some(2), true));
        assert!(!h.must_update(1));
        // period 3 (duration 2h) breaks the uniform prefix.
        assert_eq!(h.may_shift_from(3), (None, false));
    }

    #[test]
    fn test_no_shift_when_advance_differs_from_unit() {
        let inner = Arc::new(SequentialHorizon::new(vec![Duration::hours(1); 3]));
        let mut h = ShiftableHorizon::new(inner, Duration::hours(1));
        h.update(Duration::hours(2));
        assert_eq!(h.may_shift_from(1), (None, false));
        assert!(h.must_update(1));
    }
}
