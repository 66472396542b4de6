//! Unit-conversion combinators: m3/s <-> Mm3, MW <-> GWh, cost-per-MW <->
//! cost-per-GWh. Each has a `*Series` variant that samples a raw profile
//! `TimeVector` directly (phase-in blended) instead of wrapping a child
//! [`Param`], for series that are pure unit conversions of input data
//! rather than of a derived expression.

use std::sync::Arc;

use hydrosched_core::HkResult;
use hydrosched_time::{ProbTime, TimeDelta, TimeVector};

use crate::series::profile_value;
use crate::traits::Param;

/// `p * delta.seconds() * 1e-6`: m3/s to Mm3 over the block.
#[derive(Debug, Clone)]
pub struct M3SToMM3(pub Arc<dyn Param>);

impl Param for M3SToMM3 {
    fn value(&self, probtime: &ProbTime, delta: &TimeDelta) -> HkResult<f64> {
        Ok(self.0.value(probtime, delta)? * delta.seconds() * 1e-6)
    }
    fn is_durational(&self) -> bool {
        true
    }
    fn is_stateful(&self) -> bool {
        self.0.is_stateful()
    }
}

#[derive(Debug, Clone)]
pub struct M3SToMM3Series(pub Arc<TimeVector>);

impl Param for M3SToMM3Series {
    fn value(&self, probtime: &ProbTime, delta: &TimeDelta) -> HkResult<f64> {
        let v = profile_value(&self.0, probtime, delta, false)?;
        Ok(v * delta.seconds() * 1e-6)
    }
    fn is_durational(&self) -> bool {
        true
    }
}

/// `p * delta.hours() * 1e-3`: MW to GWh over the block.
#[derive(Debug, Clone)]
pub struct MWToGWh(pub Arc<dyn Param>);

impl Param for MWToGWh {
    fn value(&self, probtime: &ProbTime, delta: &TimeDelta) -> HkResult<f64> {
        Ok(self.0.value(probtime, delta)? * delta.hours() * 1e-3)
    }
    fn is_durational(&self) -> bool {
        true
    }
    fn is_stateful(&self) -> bool {
        self.0.is_stateful()
    }
}

#[derive(Debug, Clone)]
pub struct MWToGWhSeries(pub Arc<TimeVector>);

impl Param for MWToGWhSeries {
    fn value(&self, probtime: &ProbTime, delta: &TimeDelta) -> HkResult<f64> {
        let v = profile_value(&self.0, probtime, delta, false)?;
        Ok(v * delta.hours() * 1e-3)
    }
    fn is_durational(&self) -> bool {
        true
    }
}

/// `p / delta.hours() * 1e3`: a cost-per-MW figure re-expressed per GWh.
/// Division by a zero-length block is a construction-time impossibility
/// (deltas are always positive), but guarded anyway since `delta.hours()`
/// can in principle be zero for a degenerate `UnitsTimeDelta`.
#[derive(Debug, Clone)]
pub struct CostPerMWToGWh(pub Arc<dyn Param>);

impl Param for CostPerMWToGWh {
    fn value(&self, probtime: &ProbTime, delta: &TimeDelta) -> HkResult<f64> {
        let hours = delta.hours();
        if hours == 0.0 {
            return Err(hydrosched_core::HkError::DivisionByZero(
                "CostPerMWToGWh: delta has zero hours".into(),
            ));
        }
        Ok(self.0.value(probtime, delta)? / hours * 1e3)
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
    fn test_m3s_to_mm3() {
        let p = M3SToMM3(Arc::new(Constant(1.0)));
        let d = TimeDelta::Fixed(Duration::hours(1));
        // 1 m3/s for 3600s = 3600 m3 = 0.0036 Mm3
        assert!((p.value(&pt(), &d).unwrap() - 0.0036).abs() < 1e-12);
    }

    #[test]
    fn test_mw_to_gwh() {
        let p = MWToGWh(Arc::new(Constant(1000.0)));
        let d = TimeDelta::Fixed(Duration::hours(2));
        // 1000 MW for 2h = 2000 MWh = 2 GWh
        assert!((p.value(&pt(), &d).unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_cost_per_mw_to_gwh() {
        let p = CostPerMWToGWh(Arc::new(Constant(10.0)));
        let d = TimeDelta::Fixed(Duration::hours(2));
        assert!((p.value(&pt(), &d).unwrap() - 5000.0).abs() < 1e-9);
    }
}
