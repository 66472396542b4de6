//! Pure-Rust reference backend: `good_lp` over the `clarabel` interior
//! point solver, the last rung of the cascade when HiGHS itself cannot
//! be reached. Grounded in `gat_algo`'s own `good_lp`+`clarabel` usage
//! (`gat-algo/src/opf/dc_opf.rs`, `test_clarabel_simple.rs`).
//!
//! `good_lp`/Clarabel doesn't expose constraint dual values, so
//! [`ReferenceBackend`] always reports zero duals; it exists to let a
//! `solve!()` still return *a* feasible answer, not to replace HiGHS as
//! a source of shadow prices.

use good_lp::solvers::clarabel::clarabel;
use good_lp::{constraint, variable, Expression, Solution as GoodLpSolution, SolverModel, Variable};

use crate::backend::Backend;
use crate::cascade::Solution;
use crate::error::{SolverError, SolverResult};
use crate::options::SolverOptions;
use crate::problem::{ConKind, Problem};

#[derive(Debug, Default)]
pub struct ReferenceBackend;

impl Backend for ReferenceBackend {
    fn name(&self) -> &'static str {
        "good_lp/clarabel"
    }

    fn solve(&self, problem: &Problem, _options: &SolverOptions) -> SolverResult<Solution> {
        let mut vars = good_lp::variables!();
        let mut columns: Vec<Variable> = Vec::with_capacity(problem.num_vars());
        for i in 0..problem.num_vars() {
            let lb = problem.lb_buffer().get(i).unwrap_or(0.0);
            let ub = problem.ub_buffer().get(i).unwrap_or(f64::INFINITY);
            let mut v = variable().min(lb);
            if ub.is_finite() {
                v = v.max(ub);
            }
            columns.push(vars.add(v));
        }

        let mut row_exprs: Vec<Expression> = vec![Expression::from(0.0); problem.num_cons()];
        for (&(row, col), &value) in problem.con_coeff_buffer().iter() {
            row_exprs[row] = std::mem::replace(&mut row_exprs[row], Expression::from(0.0))
                + value * columns[col];
        }

        let objective = (0..problem.num_vars())
            .map(|i| problem.obj_coeff_buffer().get(i).unwrap_or(0.0) * columns[i])
            .fold(Expression::from(0.0), |acc, term| acc + term);

        let mut model = vars.minimise(objective).using(clarabel);
        for row in 0..problem.num_cons() {
            let rhs = problem.rhs_buffer().sum(row);
            let lhs = row_exprs[row].clone();
            model = match problem.con_kind(row) {
                ConKind::Eq => model.with(constraint!(lhs == rhs)),
                ConKind::Le => model.with(constraint!(lhs <= rhs)),
                ConKind::Ge => model.with(constraint!(lhs >= rhs)),
            };
        }

        let solution = model
            .solve()
            .map_err(|e| SolverError::InfeasibleOrSolverError(e.to_string()))?;

        let var_values: Vec<f64> = columns.iter().map(|v| solution.value(*v)).collect();
        let objective_value = (0..problem.num_vars())
            .map(|i| problem.obj_coeff_buffer().get(i).unwrap_or(0.0) * var_values[i])
            .sum();

        Ok(Solution {
            var_values,
            con_duals: vec![0.0; problem.num_cons()],
            var_duals: vec![0.0; problem.num_vars()],
            objective: objective_value,
        })
    }
}
