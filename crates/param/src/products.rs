//! [`TwoProduct`] and [`HourProduct`].

use std::sync::Arc;

use hydrosched_core::HkResult;
use hydrosched_time::{ProbTime, TimeDelta};

use crate::traits::Param;

/// `a * b`. Constant iff both children are; zero if either is; one iff
/// both are; durational/stateful if either child is.
#[derive(Debug, Clone)]
pub struct TwoProduct {
    pub a: Arc<dyn Param>,
    pub b: Arc<dyn Param>,
}

impl TwoProduct {
    pub fn new(a: Arc<dyn Param>, b: Arc<dyn Param>) -> Self {
        Self { a, b }
    }
}

impl Param for TwoProduct {
    fn value(&self, probtime: &ProbTime, delta: &TimeDelta) -> HkResult<f64> {
        Ok(self.a.value(probtime, delta)? * self.b.value(probtime, delta)?)
    }
    fn is_constant(&self) -> bool {
        self.a.is_constant() && self.b.is_constant()
    }
    fn is_zero(&self) -> bool {
        self.a.is_zero() || self.b.is_zero()
    }
    fn is_one(&self) -> bool {
        self.a.is_one() && self.b.is_one()
    }
    fn is_durational(&self) -> bool {
        self.a.is_durational() || self.b.is_durational()
    }
    fn is_stateful(&self) -> bool {
        self.a.is_stateful() || self.b.is_stateful()
    }
}

/// `p * delta.hours()`. Always durational; never reported constant, since
/// its value scales with block length even when `p` doesn't.
#[derive(Debug, Clone)]
pub struct HourProduct(pub Arc<dyn Param>);

impl Param for HourProduct {
    fn value(&self, probtime: &ProbTime, delta: &TimeDelta) -> HkResult<f64> {
        Ok(self.0.value(probtime, delta)? * delta.hours())
    }
    fn is_durational(&self) -> bool {
        true
    }
    fn is_stateful(&self) -> bool {
        self.0.is_stateful()
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

    #[test]
    fn test_two_product_value_and_flags() {
        let p = TwoProduct::new(Arc::new(Constant(2.0)), Arc::new(Constant(3.0)));
        let d = TimeDelta::Fixed(Duration::hours(1));
        assert_eq!(p.value(&pt(), &d).unwrap(), 6.0);
        assert!(p.is_constant());
    }

    #[test]
    fn test_two_product_zero_short_circuits_flag() {
        let p = TwoProduct::new(Arc::new(Constant(0.0)), Arc::new(Constant(3.0)));
        assert!(p.is_zero());
    }

    #[test]
    fn test_hour_product_scales_by_delta() {
        let p = HourProduct(Arc::new(Constant(2.0)));
        let d = TimeDelta::Fixed(Duration::hours(3));
        assert_eq!(p.value(&pt(), &d).unwrap(), 6.0);
        assert!(p.is_durational());
        assert!(!p.is_constant());
    }
}
