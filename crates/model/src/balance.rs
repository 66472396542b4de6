//! [`Balance`] — a commodity conservation equation (endogenous) or a
//! price feed (exogenous).

use std::sync::Arc;

use hydrosched_core::{HkError, HkResult, Id};
use hydrosched_horizon::Horizon;
use hydrosched_param::Param;
use hydrosched_solver::Problem;
use hydrosched_time::ProbTime;

use crate::arrow::Direction;
use crate::support::{recompute_periods, shift_pairs};

#[derive(Debug, Clone)]
pub struct RhsTerm {
    pub term_id: String,
    pub value: Arc<dyn Param>,
    pub direction: Direction,
}

#[derive(Debug, Clone)]
pub enum Balance {
    Endogenous {
        id: Id,
        commodity: String,
        horizon: Arc<dyn Horizon>,
        rhs_terms: Vec<RhsTerm>,
    },
    Exogenous {
        id: Id,
        commodity: String,
        horizon: Arc<dyn Horizon>,
        price: Arc<dyn Param>,
    },
}

impl Balance {
    pub fn id(&self) -> &Id {
        match self {
            Balance::Endogenous { id, .. } => id,
            Balance::Exogenous { id, .. } => id,
        }
    }

    pub fn horizon(&self) -> &Arc<dyn Horizon> {
        match self {
            Balance::Endogenous { horizon, .. } => horizon,
            Balance::Exogenous { horizon, .. } => horizon,
        }
    }

    pub fn price(&self) -> Option<&Arc<dyn Param>> {
        match self {
            Balance::Exogenous { price, .. } => Some(price),
            Balance::Endogenous { .. } => None,
        }
    }

    /// spec §4.4: "Balance (endogenous) adds one equality constraint of
    /// size num_periods." Exogenous balances add no equation.
    pub fn build(&self, problem: &mut Problem) -> HkResult<()> {
        if let Balance::Endogenous { id, horizon, .. } = self {
            problem
                .add_eq(id.clone(), horizon.num_periods())
                .map_err(HkError::from)?;
        }
        Ok(())
    }

    pub fn setconstants(&self, problem: &mut Problem) -> HkResult<()> {
        let (id, horizon, rhs_terms) = match self {
            Balance::Endogenous {
                id,
                horizon,
                rhs_terms,
                ..
            } => (id, horizon, rhs_terms),
            Balance::Exogenous { .. } => return Ok(()),
        };
        if !horizon.has_constant_durations() {
            return Ok(());
        }
        for term in rhs_terms {
            if term.value.is_constant() && !term.value.is_durational() {
                let delta = horizon.time_delta(1);
                let epoch = chrono::NaiveDate::from_ymd_opt(1970, 1, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap();
                let probtime = ProbTime::new(epoch, epoch);
                let v = term.value.value(&probtime, &delta)? * term.direction.sign();
                for t in 1..=horizon.num_periods() {
                    problem
                        .set_rhs_term(id, &term.term_id, t, v)
                        .map_err(HkError::from)?;
                }
            }
        }
        Ok(())
    }

    pub fn update(&self, probtime: &ProbTime, problem: &mut Problem) -> HkResult<()> {
        let (id, horizon, rhs_terms) = match self {
            Balance::Endogenous {
                id,
                horizon,
                rhs_terms,
                ..
            } => (id, horizon, rhs_terms),
            Balance::Exogenous { .. } => return Ok(()),
        };

        let pairs = shift_pairs(horizon.as_ref());
        for term in rhs_terms {
            for &(from, to) in &pairs {
                let v = problem
                    .get_rhs_term(id, &term.term_id, from)
                    .unwrap_or(0.0);
                problem
                    .set_rhs_term(id, &term.term_id, to, v)
                    .map_err(HkError::from)?;
            }
        }

        for term in rhs_terms {
            let periods = recompute_periods(horizon.as_ref(), term.value.is_stateful());
            for t in periods {
                let delta = horizon.time_delta(t);
                let v = term.value.value(probtime, &delta)? * term.direction.sign();
                problem
                    .set_rhs_term(id, &term.term_id, t, v)
                    .map_err(HkError::from)?;
            }
        }
        Ok(())
    }
}
