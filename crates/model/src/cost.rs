//! [`SumCost`] — an object's objective-coefficient contributions,
//! one or more named [`Param`] terms summed per period into the owning
//! variable's objective coefficient (spec §4.4 "SumCost's constant
//! objective coefficients, cached in a (period × term) matrix with a
//! dirty-mask").

use std::sync::Arc;

use hydrosched_core::{HkResult, Id};
use hydrosched_horizon::Horizon;
use hydrosched_param::Param;
use hydrosched_solver::Problem;
use hydrosched_time::ProbTime;

use crate::support::{recompute_periods, shift_pairs};

#[derive(Debug, Clone)]
pub struct CostTerm {
    pub name: String,
    pub value: Arc<dyn Param>,
}

/// A per-period cache of every term's contribution, so that a single
/// term's recompute doesn't require re-evaluating its siblings.
#[derive(Debug, Clone, Default)]
pub struct SumCost {
    pub terms: Vec<CostTerm>,
    cache: Vec<Vec<f64>>,
}

impl SumCost {
    pub fn new(terms: Vec<CostTerm>) -> Self {
        Self {
            terms,
            cache: Vec::new(),
        }
    }

    fn ensure_cache(&mut self, num_periods: usize) {
        if self.cache.len() != self.terms.len() {
            self.cache = vec![vec![0.0; num_periods]; self.terms.len()];
        }
        for row in &mut self.cache {
            if row.len() != num_periods {
                row.resize(num_periods, 0.0);
            }
        }
    }

    /// Write every term that is constant and the horizon has constant
    /// durations, for every period, once.
    pub fn setconstants(&mut self, var: &Id, horizon: &dyn Horizon, problem: &mut Problem) -> HkResult<()> {
        let num_periods = horizon.num_periods();
        self.ensure_cache(num_periods);
        if !horizon.has_constant_durations() {
            return Ok(());
        }
        for (ti, term) in self.terms.iter().enumerate() {
            if term.value.is_constant() && !term.value.is_durational() {
                let delta = horizon.time_delta(1);
                let epoch = chrono::NaiveDate::from_ymd_opt(1970, 1, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap();
                let probtime = ProbTime::new(epoch, epoch);
                let v = term.value.value(&probtime, &delta)?;
                for t in 0..num_periods {
                    self.cache[ti][t] = v;
                }
            }
        }
        self.flush(var, num_periods, problem)?;
        Ok(())
    }

    pub fn update(
        &mut self,
        var: &Id,
        horizon: &dyn Horizon,
        probtime: &ProbTime,
        problem: &mut Problem,
    ) -> HkResult<()> {
        let num_periods = horizon.num_periods();
        self.ensure_cache(num_periods);

        let pairs = shift_pairs(horizon);
        for (ti, _term) in self.terms.iter().enumerate() {
            for &(from, to) in &pairs {
                self.cache[ti][to - 1] = self.cache[ti][from - 1];
            }
        }

        for (ti, term) in self.terms.iter().enumerate() {
            let periods = recompute_periods(horizon, term.value.is_stateful());
            for t in periods {
                let delta = horizon.time_delta(t);
                let v = term.value.value(probtime, &delta)?;
                self.cache[ti][t - 1] = v;
            }
        }

        self.flush(var, num_periods, problem)?;
        Ok(())
    }

    fn flush(&self, var: &Id, num_periods: usize, problem: &mut Problem) -> HkResult<()> {
        for t in 1..=num_periods {
            let total: f64 = self.cache.iter().map(|row| row[t - 1]).sum();
            problem
                .set_obj_coeff(var, t, total)
                .map_err(hydrosched_core::HkError::from)?;
        }
        Ok(())
    }
}
