//! [`ShortenedHorizon`] — restricts an inner horizon to `[ix_start,
//! ix_stop]`, re-indexed to `1..=ix_stop-ix_start+1`.

use std::sync::Arc;

use chrono::Duration;
use hydrosched_core::{HkError, HkResult};
use hydrosched_time::TimeDelta;

use crate::traits::{Horizon, Period};

#[derive(Debug, Clone)]
pub struct ShortenedHorizon {
    inner: Arc<dyn Horizon>,
    ix_start: Period,
    ix_stop: Period,
}

impl ShortenedHorizon {
    pub fn new(inner: Arc<dyn Horizon>, ix_start: Period, ix_stop: Period) -> HkResult<Self> {
        if ix_start == 0 || ix_start > ix_stop || ix_stop > inner.num_periods() {
            return Err(HkError::Construction(format!(
                "ShortenedHorizon requires 1 <= ix_start <= ix_stop <= {}, got [{}, {}]",
                inner.num_periods(),
                ix_start,
                ix_stop
            )));
        }
        Ok(Self {
            inner,
            ix_start,
            ix_stop,
        })
    }

    fn to_parent(&self, t: Period) -> Period {
        t + self.ix_start - 1
    }
}

impl Horizon for ShortenedHorizon {
    fn num_periods(&self) -> Period {
        self.ix_stop - self.ix_start + 1
    }

    fn start_duration(&self, t: Period) -> Duration {
        self.inner.start_duration(self.to_parent(t)) - self.inner.start_duration(self.ix_start)
    }

    fn time_delta(&self, t: Period) -> TimeDelta {
        self.inner.time_delta(self.to_parent(t))
    }

    fn is_adaptive(&self) -> bool {
        self.inner.is_adaptive()
    }

    fn has_constant_durations(&self) -> bool {
        self.inner.has_constant_durations()
    }

    /// Defined only against another `ShortenedHorizon` over the same
    /// parent with a compatible offset; any other `fine` fails with
    /// [`HkError::NoAlignment`].
    fn get_subperiods(&self, fine: &dyn Horizon, t: Period) -> HkResult<(Period, Period)> {
        let coarse_durs = self.block_durations();
        let fine_durs = fine.block_durations();
        if coarse_durs == fine_durs {
            return Ok((t, t));
        }
        Err(HkError::NoAlignment(
            "ShortenedHorizon.get_subperiods requires matching block durations".into(),
        ))
    }

    fn may_shift_from(&self, t: Period) -> (Option<Period>, bool) {
        match self.inner.may_shift_from(self.to_parent(t)) {
            (Some(parent_t), true) if parent_t >= self.ix_start && parent_t <= self.ix_stop => {
                (Some(parent_t - self.ix_start + 1), true)
            }
            _ => (None, false),
        }
    }

    fn must_update(&self, t: Period) -> bool {
        self.inner.must_update(self.to_parent(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequential::SequentialHorizon;

    #[test]
    fn test_reindexes_to_one_based() {
        let inner = Arc::new(SequentialHorizon::new(vec![Duration::hours(1); 5]));
        let h = ShortenedHorizon::new(inner, 2, 4).unwrap();
        assert_eq!(h.num_periods(), 3);
        assert_eq!(h.start_duration(1), Duration::zero());
        assert_eq!(h.start_duration(2), Duration::hours(1));
    }

    #[test]
    fn test_rejects_out_of_range_window() {
        let inner = Arc::new(SequentialHorizon::new(vec![Duration::hours(1); 3]));
        assert!(ShortenedHorizon::new(inner.clone(), 0, 2).is_err());
        assert!(ShortenedHorizon::new(inner, 2, 4).is_err());
    }
}
