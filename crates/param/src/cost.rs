//! Cost and loss combinators: [`FossilMC`], [`ExogenCost`],
//! [`ExogenIncome`], [`InConversionLoss`], [`OutConversionLoss`],
//! [`TransmissionLossRHS`].

use std::sync::Arc;

use hydrosched_core::{HkError, HkResult};
use hydrosched_time::{ProbTime, TimeDelta, TimeVector};

use crate::series::profile_value;
use crate::traits::Param;

/// `(fuel_level*fuel_profile + co2_factor*co2_level*co2_profile) /
/// efficiency + variable_cost`.
///
/// `fuel_level`, `co2_factor`, `co2_level`, `efficiency` and
/// `variable_cost` are sampled at datatime (they describe slowly-varying
/// plant characteristics); `fuel_profile` and `co2_profile` are sampled at
/// scenariotime with phase-in blending (they track a fuel/carbon price
/// scenario).
#[derive(Debug, Clone)]
pub struct FossilMC {
    pub fuel_level: Arc<TimeVector>,
    pub fuel_profile: Arc<TimeVector>,
    pub co2_factor: Arc<TimeVector>,
    pub co2_level: Arc<TimeVector>,
    pub co2_profile: Arc<TimeVector>,
    pub efficiency: Arc<TimeVector>,
    pub variable_cost: Arc<TimeVector>,
}

impl Param for FossilMC {
    fn value(&self, probtime: &ProbTime, delta: &TimeDelta) -> HkResult<f64> {
        let datatime = probtime.datatime();
        let fl = self.fuel_level.weighted_average(datatime, delta)?;
        let fp = profile_value(&self.fuel_profile, probtime, delta, false)?;
        let cf = self.co2_factor.weighted_average(datatime, delta)?;
        let cl = self.co2_level.weighted_average(datatime, delta)?;
        let cp = profile_value(&self.co2_profile, probtime, delta, false)?;
        let ef = self.efficiency.weighted_average(datatime, delta)?;
        let vo = self.variable_cost.weighted_average(datatime, delta)?;
        if ef == 0.0 {
            return Err(HkError::DivisionByZero(
                "FossilMC: efficiency is zero".into(),
            ));
        }
        Ok((fl * fp + cf * cl * cp) / ef + vo)
    }
}

/// `price * conversion / (1 - loss)`.
#[derive(Debug, Clone)]
pub struct ExogenCost {
    pub price: Arc<dyn Param>,
    pub conversion: Arc<dyn Param>,
    pub loss: Arc<dyn Param>,
}

impl Param for ExogenCost {
    fn value(&self, probtime: &ProbTime, delta: &TimeDelta) -> HkResult<f64> {
        let loss = self.loss.value(probtime, delta)?;
        let denom = 1.0 - loss;
        if denom == 0.0 {
            return Err(HkError::DivisionByZero("ExogenCost: loss is 1.0".into()));
        }
        Ok(self.price.value(probtime, delta)? * self.conversion.value(probtime, delta)? / denom)
    }
    fn is_durational(&self) -> bool {
        self.price.is_durational() || self.conversion.is_durational() || self.loss.is_durational()
    }
    fn is_stateful(&self) -> bool {
        self.price.is_stateful() || self.conversion.is_stateful() || self.loss.is_stateful()
    }
}

/// `price * conversion * (1 - loss)`.
#[derive(Debug, Clone)]
pub struct ExogenIncome {
    pub price: Arc<dyn Param>,
    pub conversion: Arc<dyn Param>,
    pub loss: Arc<dyn Param>,
}

impl Param for ExogenIncome {
    fn value(&self, probtime: &ProbTime, delta: &TimeDelta) -> HkResult<f64> {
        let loss = self.loss.value(probtime, delta)?;
        Ok(self.price.value(probtime, delta)?
            * self.conversion.value(probtime, delta)?
            * (1.0 - loss))
    }
    fn is_durational(&self) -> bool {
        self.price.is_durational() || self.conversion.is_durational() || self.loss.is_durational()
    }
    fn is_stateful(&self) -> bool {
        self.price.is_stateful() || self.conversion.is_stateful() || self.loss.is_stateful()
    }
}

/// `conversion * (1 - loss)`.
#[derive(Debug, Clone)]
pub struct InConversionLoss {
    pub conversion: Arc<dyn Param>,
    pub loss: Arc<dyn Param>,
}

impl Param for InConversionLoss {
    fn value(&self, probtime: &ProbTime, delta: &TimeDelta) -> HkResult<f64> {
        let loss = self.loss.value(probtime, delta)?;
        Ok(self.conversion.value(probtime, delta)? * (1.0 - loss))
    }
    fn is_durational(&self) -> bool {
        self.conversion.is_durational() || self.loss.is_durational()
    }
    fn is_stateful(&self) -> bool {
        self.conversion.is_stateful() || self.loss.is_stateful()
    }
}

/// `conversion / (1 - loss)`.
#[derive(Debug, Clone)]
pub struct OutConversionLoss {
    pub conversion: Arc<dyn Param>,
    pub loss: Arc<dyn Param>,
}

impl Param for OutConversionLoss {
    fn value(&self, probtime: &ProbTime, delta: &TimeDelta) -> HkResult<f64> {
        let loss = self.loss.value(probtime, delta)?;
        let denom = 1.0 - loss;
        if denom == 0.0 {
            return Err(HkError::DivisionByZero(
                "OutConversionLoss: loss is 1.0".into(),
            ));
        }
        Ok(self.conversion.value(probtime, delta)? / denom)
    }
    fn is_durational(&self) -> bool {
        self.conversion.is_durational() || self.loss.is_durational()
    }
    fn is_stateful(&self) -> bool {
        self.conversion.is_stateful() || self.loss.is_stateful()
    }
}

/// `capacity * loss * utilization`. Durational status is inherited from
/// `capacity` alone (loss and utilization are dimensionless fractions that
/// don't themselves scale with block length).
#[derive(Debug, Clone)]
pub struct TransmissionLossRHS {
    pub capacity: Arc<dyn Param>,
    pub loss: Arc<dyn Param>,
    pub utilization: Arc<dyn Param>,
}

impl Param for TransmissionLossRHS {
    fn value(&self, probtime: &ProbTime, delta: &TimeDelta) -> HkResult<f64> {
        Ok(self.capacity.value(probtime, delta)?
            * self.loss.value(probtime, delta)?
            * self.utilization.value(probtime, delta)?)
    }
    fn is_durational(&self) -> bool {
        self.capacity.is_durational()
    }
    fn is_stateful(&self) -> bool {
        self.capacity.is_stateful() || self.loss.is_stateful() || self.utilization.is_stateful()
    }
}
