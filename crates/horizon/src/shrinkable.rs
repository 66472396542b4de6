//! [`ShrinkableHorizon`] — a receding-horizon wrapper whose designated
//! "shrink periods" absorb elapsed duration down to a floor before
//! resetting to their maxima.

use std::sync::Arc;

use chrono::{Duration, NaiveDateTime};
use hydrosched_time::TimeDelta;

use crate::traits::{Horizon, Period};

#[derive(Debug, Clone)]
pub struct ShrinkableHorizon {
    inner: Arc<dyn Horizon>,
    shrink_indices: Vec<usize>,
    minperiod: Duration,
    current: Vec<Duration>,
    prev_probtime: Option<NaiveDateTime>,
    must_update_flags: Vec<bool>,
    shift_hints: Vec<(Option<Period>, bool)>,
}

impl ShrinkableHorizon {
    pub fn new(inner: Arc<dyn Horizon>, shrink_indices: Vec<usize>, minperiod: Duration) -> Self {
        let n = inner.num_periods();
        let current = (1..=n).map(|t| inner.time_delta(t).duration()).collect();
        Self {
            inner,
            shrink_indices,
            minperiod,
            current,
            prev_probtime: None,
            must_update_flags: vec![true; n],
            shift_hints: vec![(None, false); n],
        }
    }

    /// Sum, over shrink periods, of the duration still available above
    /// `minperiod`.
    pub fn remaining_duration(&self) -> Duration {
        self.shrink_indices
            .iter()
            .map(|&i| self.current[i] - self.minperiod)
            .fold(Duration::zero(), |acc, d| acc + d)
    }

    fn maxima(&self) -> Vec<Duration> {
        (1..=self.inner.num_periods())
            .map(|t| self.inner.time_delta(t).duration())
            .collect()
    }

    pub fn update(&mut self, probtime: NaiveDateTime) {
        let prev = match self.prev_probtime {
            Some(p) => p,
            None => {
                self.prev_probtime = Some(probtime);
                return;
            }
        };
        let advance = probtime - prev;
        self.prev_probtime = Some(probtime);
        let n = self.current.len();
        self.must_update_flags = vec![false; n];
        self.shift_hints = vec![(None, false); n];

        if advance <= Duration::zero() {
            return;
        }

        let remaining = self.remaining_duration();
        if advance <= remaining {
            let mut to_remove = advance;
            for &i in &self.shrink_indices {
                if to_remove <= Duration::zero() {
                    break;
                }
                let headroom = self.current[i] - self.minperiod;
                let take = to_remove.min(headroom);
                if take > Duration::zero() {
                    self.current[i] = self.current[i] - take;
                    self.must_update_flags[i] = true;
                    to_remove = to_remove - take;
                }
            }
        } else if advance == remaining + self.minperiod {
            let maxima = self.maxima();
            for &i in &self.shrink_indices {
                self.current[i] = maxima[i];
                self.must_update_flags[i] = true;
            }
            for t in 0..n {
                if !self.shrink_indices.contains(&t) {
                    self.shift_hints[t] = (Some(t + 1), true);
                }
            }
        } else {
            let maxima = self.maxima();
            for &i in &self.shrink_indices {
                self.current[i] = maxima[i];
                self.must_update_flags[i] = true;
            }
        }
    }
}

impl Horizon for ShrinkableHorizon {
    fn num_periods(&self) -> Period {
        self.current.len()
    }

    fn start_duration(&self, t: Period) -> Duration {
        self.current[..t - 1]
            .iter()
            .fold(Duration::zero(), |acc, d| acc + *d)
    }

    fn time_delta(&self, t: Period) -> TimeDelta {
        TimeDelta::Fixed(self.current[t - 1])
    }

    fn has_constant_durations(&self) -> bool {
        false
    }

    fn may_shift_from(&self, t: Period) -> (Option<Period>, bool) {
        self.shift_hints.get(t - 1).copied().unwrap_or((None, false))
    }

    fn must_update(&self, t: Period) -> bool {
        self.must_update_flags.get(t - 1).copied().unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequential::SequentialHorizon;
    use chrono::NaiveDate;

    fn dt(h: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::hours(h)
    }

    fn fresh() -> ShrinkableHorizon {
        let inner = Arc::new(SequentialHorizon::new(vec![
            Duration::hours(4),
            Duration::hours(1),
            Duration::hours(1),
        ]));
        ShrinkableHorizon::new(inner, vec![0], Duration::hours(1))
    }

    #[test]
    fn test_first_update_is_a_no_op() {
        let mut h = fresh();
        h.update(dt(0));
        assert_eq!(h.duration(), Duration::hours(6));
    }

    #[test]
    fn test_equal_probtime_marks_nothing_for_update() {
        let mut h = fresh();
        h.update(dt(0));
        h.update(dt(0));
        assert!((1..=3).all(|t| !h.must_update(t)));
    }

    #[test]
    fn test_shrink_reduces_total_by_advance() {
        let mut h = fresh();
        h.update(dt(0));
        h.update(dt(2));
        assert_eq!(h.duration(), Duration::hours(4));
        assert!(h.must_update(1));
        assert!(!h.must_update(2));
    }

    /// Round-trip property: an advance of exactly one `minperiod` after
    /// hitting the floor restores the original total duration.
    #[test]
    fn test_reset_at_floor_restores_original_total() {
        let mut h = fresh();
        h.update(dt(0));
        let original_total = h.duration();
        h.update(dt(3)); // shrink period 1 from 4h to 1h (floor)
        assert_eq!(h.remaining_duration(), Duration::zero());
        h.update(dt(4)); // advance == remaining(0) + minperiod(1h) -> reset
        assert_eq!(h.duration(), original_total);
        assert_eq!(h.may_shift_from(2), (Some(2), true));
    }
}
