//! [`ExternalHorizon`] — a read-only wrapper whose `build!`/`update!` are
//! no-ops, because some other (master) horizon instance already drives
//! the shared inner state.

use std::sync::Arc;

use chrono::Duration;
use hydrosched_time::TimeDelta;

use crate::traits::{Horizon, Period};

#[derive(Debug, Clone)]
pub struct ExternalHorizon {
    inner: Arc<dyn Horizon>,
}

impl ExternalHorizon {
    pub fn new(inner: Arc<dyn Horizon>) -> Self {
        Self { inner }
    }

    /// No-op: the master horizon this instance mirrors is updated
    /// elsewhere.
    pub fn update(&self) {}

    /// No-op: see [`ExternalHorizon::update`].
    pub fn build(&self) {}
}

impl Horizon for ExternalHorizon {
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
        self.inner.may_shift_from(t)
    }

    fn must_update(&self, t: Period) -> bool {
        self.inner.must_update(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequential::SequentialHorizon;

    #[test]
    fn test_forwards_reads_to_inner() {
        let inner = Arc::new(SequentialHorizon::new(vec![Duration::hours(1); 3]));
        let h = ExternalHorizon::new(inner);
        assert_eq!(h.num_periods(), 3);
        h.update();
        assert_eq!(h.num_periods(), 3);
    }
}
