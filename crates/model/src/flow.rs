//! [`Flow`] — a decision variable family moving a commodity between
//! balances through one or more [`Arrow`]s.

use std::sync::Arc;

use hydrosched_core::{HkError, HkResult, Id};
use hydrosched_horizon::Horizon;
use hydrosched_param::{Constant, Param};
use hydrosched_solver::Problem;
use hydrosched_time::ProbTime;

use crate::arrow::Arrow;
use crate::cost::SumCost;
use crate::support::{recompute_periods, shift_pairs};

#[derive(Debug, Clone)]
pub struct Flow {
    pub id: Id,
    pub arrows: Vec<Arrow>,
    pub upper: Arc<dyn Param>,
    pub lower: Arc<dyn Param>,
    pub cost: SumCost,
    pub horizon: Arc<dyn Horizon>,
}

impl Flow {
    /// `lower` defaults to `LowerZero` per spec §3 "one upper Capacity
    /// and one lower Capacity (default LowerZero)".
    pub fn new(id: Id, arrows: Vec<Arrow>, upper: Arc<dyn Param>, horizon: Arc<dyn Horizon>) -> Self {
        Self {
            id,
            arrows,
            upper,
            lower: Arc::new(Constant(0.0)),
            cost: SumCost::default(),
            horizon,
        }
    }

    pub fn build(&self, problem: &mut Problem) -> HkResult<()> {
        problem
            .add_var(self.id.clone(), self.horizon.num_periods())
            .map_err(HkError::from)
    }

    pub fn setconstants(&mut self, problem: &mut Problem) -> HkResult<()> {
        let horizon = self.horizon.clone();
        if horizon.has_constant_durations() {
            if self.lower.is_constant() && !self.lower.is_durational() {
                self.write_bound(problem, &self.lower.clone(), true)?;
            }
            if self.upper.is_constant() && !self.upper.is_durational() {
                self.write_bound(problem, &self.upper.clone(), false)?;
            }
            for arrow in self.arrows.iter().filter(|a| a.balance_is_endogenous) {
                if arrow.coeff.is_constant() && !arrow.coeff.is_durational() {
                    let epoch = epoch_time();
                    let delta = horizon.time_delta(1);
                    let v = arrow.coeff.value(&ProbTime::new(epoch, epoch), &delta)?
                        * arrow.direction.sign();
                    for t in 1..=horizon.num_periods() {
                        problem
                            .set_con_coeff(&arrow.balance, &self.id, t, t, v)
                            .map_err(HkError::from)?;
                    }
                }
            }
        }
        self.cost.setconstants(&self.id, horizon.as_ref(), problem)?;
        Ok(())
    }

    pub fn update(&mut self, probtime: &ProbTime, problem: &mut Problem) -> HkResult<()> {
        let horizon = self.horizon.clone();
        self.update_bound(&horizon, probtime, problem, true)?;
        self.update_bound(&horizon, probtime, problem, false)?;

        for arrow in self.arrows.clone().iter().filter(|a| a.balance_is_endogenous) {
            let periods = recompute_periods(horizon.as_ref(), arrow.coeff.is_stateful());
            for t in periods {
                let delta = horizon.time_delta(t);
                let v = arrow.coeff.value(probtime, &delta)? * arrow.direction.sign();
                problem
                    .set_con_coeff(&arrow.balance, &self.id, t, t, v)
                    .map_err(HkError::from)?;
            }
        }

        self.cost.update(&self.id, horizon.as_ref(), probtime, problem)?;
        Ok(())
    }

    fn write_bound(&self, problem: &mut Problem, param: &Arc<dyn Param>, is_lower: bool) -> HkResult<()> {
        let epoch = epoch_time();
        let delta = self.horizon.time_delta(1);
        let v = param.value(&ProbTime::new(epoch, epoch), &delta)?;
        for t in 1..=self.horizon.num_periods() {
            if is_lower {
                problem.set_lb(&self.id, t, v).map_err(HkError::from)?;
            } else {
                problem.set_ub(&self.id, t, v).map_err(HkError::from)?;
            }
        }
        Ok(())
    }

    fn update_bound(
        &self,
        horizon: &Arc<dyn Horizon>,
        probtime: &ProbTime,
        problem: &mut Problem,
        is_lower: bool,
    ) -> HkResult<()> {
        let param = if is_lower { &self.lower } else { &self.upper };
        let pairs = shift_pairs(horizon.as_ref());
        for &(from, to) in &pairs {
            let v = if is_lower {
                problem.get_lb(&self.id, from).unwrap_or(0.0)
            } else {
                problem.get_ub(&self.id, from).unwrap_or(f64::INFINITY)
            };
            if is_lower {
                problem.set_lb(&self.id, to, v).map_err(HkError::from)?;
            } else {
                problem.set_ub(&self.id, to, v).map_err(HkError::from)?;
            }
        }
        let periods = recompute_periods(horizon.as_ref(), param.is_stateful());
        for t in periods {
            let delta = horizon.time_delta(t);
            let v = param.value(probtime, &delta)?;
            if is_lower {
                problem.set_lb(&self.id, t, v).map_err(HkError::from)?;
            } else {
                problem.set_ub(&self.id, t, v).map_err(HkError::from)?;
            }
        }
        Ok(())
    }
}

fn epoch_time() -> chrono::NaiveDateTime {
    chrono::NaiveDate::from_ymd_opt(1970, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrow::Direction;
    use hydrosched_horizon::SequentialHorizon;

    #[test]
    fn test_build_adds_var_with_default_lower_bound_zero() {
        let h: Arc<dyn Horizon> = Arc::new(SequentialHorizon::new(vec![chrono::Duration::hours(1); 2]));
        let flow = Flow::new(
            Id::new("Flow", "F1"),
            vec![Arrow::new(
                Id::new("Balance", "B1"),
                Direction::In,
                Arc::new(Constant(1.0)),
            )],
            Arc::new(Constant(10.0)),
            h,
        );
        let mut problem = Problem::new();
        flow.build(&mut problem).unwrap();
        assert_eq!(problem.num_vars(), 2);
        assert_eq!(problem.get_lb(&flow.id, 1).unwrap(), 0.0);
    }
}
