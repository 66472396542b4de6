//! [`Stateful`] — forces recomputation on every `update!`, overriding
//! whatever constant-ness its child reports.

use std::sync::Arc;

use hydrosched_core::HkResult;
use hydrosched_time::{ProbTime, TimeDelta};

use crate::traits::Param;

#[derive(Debug, Clone)]
pub struct Stateful(pub Arc<dyn Param>);

impl Param for Stateful {
    fn value(&self, probtime: &ProbTime, delta: &TimeDelta) -> HkResult<f64> {
        self.0.value(probtime, delta)
    }
    fn is_constant(&self) -> bool {
        false
    }
    fn is_durational(&self) -> bool {
        self.0.is_durational()
    }
    fn is_stateful(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaf::Constant;
    use chrono::{Duration, NaiveDate};

    #[test]
    fn test_stateful_always_reports_non_constant() {
        let p = Stateful(Arc::new(Constant(5.0)));
        assert!(p.is_stateful());
        assert!(!p.is_constant());
        let t = NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let pt = ProbTime::new(t, t);
        let d = TimeDelta::Fixed(Duration::hours(1));
        assert_eq!(p.value(&pt, &d).unwrap(), 5.0);
    }
}
