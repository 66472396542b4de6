//! [`FlipSign`] — negation, with a constructor-level simplification that
//! cancels a double flip.

use std::sync::Arc;

use hydrosched_core::HkResult;
use hydrosched_time::{ProbTime, TimeDelta};

use crate::traits::Param;

#[derive(Debug, Clone)]
pub struct FlipSign(Arc<dyn Param>);

impl FlipSign {
    /// `FlipSign(FlipSign(p))` simplifies to `p` itself rather than
    /// wrapping twice.
    pub fn new(inner: Arc<dyn Param>) -> Arc<dyn Param> {
        match inner.as_flip_sign_inner() {
            Some(grandchild) => grandchild.clone(),
            None => Arc::new(FlipSign(inner)),
        }
    }
}

impl Param for FlipSign {
    fn value(&self, probtime: &ProbTime, delta: &TimeDelta) -> HkResult<f64> {
        Ok(-self.0.value(probtime, delta)?)
    }
    fn is_constant(&self) -> bool {
        self.0.is_constant()
    }
    fn is_durational(&self) -> bool {
        self.0.is_durational()
    }
    fn is_stateful(&self) -> bool {
        self.0.is_stateful()
    }
    fn as_flip_sign_inner(&self) -> Option<&Arc<dyn Param>> {
        Some(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaf::Constant;
    use chrono::{Duration, NaiveDate};

    fn pt() -> ProbTime {
        let t = NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        ProbTime::new(t, t)
    }

    fn d() -> TimeDelta {
        TimeDelta::Fixed(Duration::hours(1))
    }

    #[test]
    fn test_flip_sign_negates() {
        let p = FlipSign::new(Arc::new(Constant(5.0)));
        assert_eq!(p.value(&pt(), &d()).unwrap(), -5.0);
    }

    #[test]
    fn test_double_flip_sign_cancels() {
        let inner: Arc<dyn Param> = Arc::new(Constant(5.0));
        let once = FlipSign::new(inner.clone());
        let twice = FlipSign::new(once.clone());
        // Must be the same object as `inner`, not a doubly-wrapped one.
        assert!(Arc::ptr_eq(&twice, &inner));
        assert_eq!(twice.value(&pt(), &d()).unwrap(), 5.0);
    }
}
