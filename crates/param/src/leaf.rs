//! Leaf params: [`Zero`], [`PlusOne`], [`MinusOne`], [`Constant`].

use hydrosched_core::HkResult;
use hydrosched_time::{ProbTime, TimeDelta};

use crate::traits::Param;

#[derive(Debug, Clone, Copy, Default)]
pub struct Zero;

impl Param for Zero {
    fn value(&self, _probtime: &ProbTime, _delta: &TimeDelta) -> HkResult<f64> {
        Ok(0.0)
    }
    fn is_constant(&self) -> bool {
        true
    }
    fn is_zero(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PlusOne;

impl Param for PlusOne {
    fn value(&self, _probtime: &ProbTime, _delta: &TimeDelta) -> HkResult<f64> {
        Ok(1.0)
    }
    fn is_constant(&self) -> bool {
        true
    }
    fn is_one(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MinusOne;

impl Param for MinusOne {
    fn value(&self, _probtime: &ProbTime, _delta: &TimeDelta) -> HkResult<f64> {
        Ok(-1.0)
    }
    fn is_constant(&self) -> bool {
        true
    }
}

/// A fixed scalar. Reduces to [`Zero`]/[`PlusOne`]-like flags when it
/// happens to hold `0.0`/`1.0`, so downstream combinators that check
/// `is_zero`/`is_one` don't need to special-case how the constant was
/// built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constant(pub f64);

impl Param for Constant {
    fn value(&self, _probtime: &ProbTime, _delta: &TimeDelta) -> HkResult<f64> {
        Ok(self.0)
    }
    fn is_constant(&self) -> bool {
        true
    }
    fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
    fn is_one(&self) -> bool {
        self.0 == 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn pt() -> ProbTime {
        ProbTime::new(
            NaiveDate::from_ymd_opt(2020, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            NaiveDate::from_ymd_opt(2020, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        )
    }

    fn d() -> TimeDelta {
        TimeDelta::Fixed(Duration::hours(1))
    }

    #[test]
    fn test_zero_flags() {
        let z = Zero;
        assert_eq!(z.value(&pt(), &d()).unwrap(), 0.0);
        assert!(z.is_constant() && z.is_zero() && !z.is_one());
    }

    #[test]
    fn test_constant_reduces_flags() {
        assert!(Constant(0.0).is_zero());
        assert!(Constant(1.0).is_one());
        assert!(!Constant(2.0).is_zero() && !Constant(2.0).is_one());
    }
}
