//! [`Storage`] — a reservoir/state variable contributing its net change
//! `x[t-1] - x[t]` to a balance row (spec §4.4).

use std::sync::Arc;

use hydrosched_core::{HkError, HkResult, Id};
use hydrosched_horizon::Horizon;
use hydrosched_param::{Constant, Param};
use hydrosched_solver::Problem;
use hydrosched_time::ProbTime;

use crate::cost::SumCost;
use crate::support::{recompute_periods, shift_pairs};

#[derive(Debug, Clone)]
pub struct Storage {
    pub id: Id,
    pub start_id: Id,
    pub balance: Id,
    pub upper: Arc<dyn Param>,
    pub lower: Arc<dyn Param>,
    pub loss: Option<Arc<dyn Param>>,
    pub cost: SumCost,
    pub horizon: Arc<dyn Horizon>,
}

impl Storage {
    pub fn new(id: Id, balance: Id, upper: Arc<dyn Param>, horizon: Arc<dyn Horizon>) -> Self {
        let start_id = Id::new("StorageStart", id.instance());
        Self {
            id,
            start_id,
            balance,
            upper,
            lower: Arc::new(Constant(0.0)),
            loss: None,
            cost: SumCost::default(),
            horizon,
        }
    }

    /// The `(in, out)` state-variable pair boundary conditions connect
    /// across: `in` is the fixable start scalar, `out` is the last
    /// period's storage level.
    pub fn state_vars(&self) -> (Id, Id) {
        (self.start_id.clone(), self.id.clone())
    }

    pub fn build(&self, problem: &mut Problem) -> HkResult<()> {
        let t = self.horizon.num_periods();
        problem.add_var(self.id.clone(), t).map_err(HkError::from)?;
        problem
            .add_var(self.start_id.clone(), 1)
            .map_err(HkError::from)?;
        problem
            .make_fixable(&self.start_id, 1)
            .map_err(HkError::from)?;
        Ok(())
    }

    pub fn setconstants(&mut self, problem: &mut Problem) -> HkResult<()> {
        let horizon = self.horizon.clone();
        let t_max = horizon.num_periods();

        for t in 1..=t_max {
            problem
                .set_con_coeff(&self.balance, &self.id, t, t, -1.0)
                .map_err(HkError::from)?;
        }

        let loss_is_constant = self
            .loss
            .as_ref()
            .map(|l| l.is_constant() && !l.is_durational())
            .unwrap_or(true);
        if loss_is_constant && horizon.has_constant_durations() {
            let epoch = epoch_time();
            let delta = horizon.time_delta(1);
            let loss_v = match &self.loss {
                Some(l) => l.value(&ProbTime::new(epoch, epoch), &delta)?,
                None => 0.0,
            };
            let retained = 1.0 - loss_v;
            for t in 1..=t_max {
                if t == 1 {
                    problem
                        .set_con_coeff(&self.balance, &self.start_id, t, 1, retained)
                        .map_err(HkError::from)?;
                } else {
                    problem
                        .set_con_coeff(&self.balance, &self.id, t, t - 1, retained)
                        .map_err(HkError::from)?;
                }
            }
        }

        if horizon.has_constant_durations() {
            if self.lower.is_constant() && !self.lower.is_durational() {
                self.write_bound(problem, true)?;
            }
            if self.upper.is_constant() && !self.upper.is_durational() {
                self.write_bound(problem, false)?;
            }
        }

        self.cost.setconstants(&self.id, horizon.as_ref(), problem)?;
        Ok(())
    }

    pub fn update(&mut self, probtime: &ProbTime, problem: &mut Problem) -> HkResult<()> {
        let horizon = self.horizon.clone();

        if let Some(loss) = self.loss.clone() {
            if !(loss.is_constant() && !loss.is_durational()) {
                let periods = recompute_periods(horizon.as_ref(), loss.is_stateful());
                for t in periods {
                    let delta = horizon.time_delta(t);
                    let retained = 1.0 - loss.value(probtime, &delta)?;
                    if t == 1 {
                        problem
                            .set_con_coeff(&self.balance, &self.start_id, t, 1, retained)
                            .map_err(HkError::from)?;
                    } else {
                        problem
                            .set_con_coeff(&self.balance, &self.id, t, t - 1, retained)
                            .map_err(HkError::from)?;
                    }
                }
            }
        }

        self.update_bound(&horizon, probtime, problem, true)?;
        self.update_bound(&horizon, probtime, problem, false)?;
        self.cost.update(&self.id, horizon.as_ref(), probtime, problem)?;
        Ok(())
    }

    fn write_bound(&self, problem: &mut Problem, is_lower: bool) -> HkResult<()> {
        let param = if is_lower { &self.lower } else { &self.upper };
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
    use hydrosched_horizon::SequentialHorizon;

    #[test]
    fn test_build_adds_level_and_start_vars() {
        let h: Arc<dyn Horizon> = Arc::new(SequentialHorizon::new(vec![chrono::Duration::hours(1); 3]));
        let storage = Storage::new(
            Id::new("Storage", "S1"),
            Id::new("Balance", "B1"),
            Arc::new(Constant(100.0)),
            h,
        );
        let mut problem = Problem::new();
        storage.build(&mut problem).unwrap();
        assert_eq!(problem.num_vars(), 4);
    }
}
