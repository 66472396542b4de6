//! HiGHS backend, grounded in MUSE_2.0's `simulation::optimisation`
//! module: build a `highs::RowProblem` column-by-column/row-by-row from
//! the flat buffers, `optimise(Sense::Minimise)`, read back
//! `columns()`/`dual_rows()`.

use std::collections::HashMap;

use highs::{HighsModelStatus, RowProblem, Sense};

use crate::backend::Backend;
use crate::cascade::Solution;
use crate::error::{SolverError, SolverResult};
use crate::options::{SolverKind, SolverOptions};
use crate::problem::{ConKind, Problem};

#[derive(Debug, Default)]
pub struct HighsBackend;

impl Backend for HighsBackend {
    fn name(&self) -> &'static str {
        "highs"
    }

    fn solve(&self, problem: &Problem, options: &SolverOptions) -> SolverResult<Solution> {
        let mut pb = RowProblem::default();

        let mut columns = Vec::with_capacity(problem.num_vars());
        for i in 0..problem.num_vars() {
            let obj = problem.obj_coeff_buffer().get(i).unwrap_or(0.0);
            let lb = problem.lb_buffer().get(i).unwrap_or(0.0);
            let ub = problem.ub_buffer().get(i).unwrap_or(f64::INFINITY);
            columns.push(pb.add_column(obj, lb..=ub));
        }

        let mut row_terms: HashMap<usize, Vec<(highs::Col, f64)>> = HashMap::new();
        for (&(row, col), &value) in problem.con_coeff_buffer().iter() {
            row_terms.entry(row).or_default().push((columns[col], value));
        }

        for row in 0..problem.num_cons() {
            let rhs = problem.rhs_buffer().sum(row);
            let bounds = match problem.con_kind(row) {
                ConKind::Eq => rhs..=rhs,
                ConKind::Le => f64::NEG_INFINITY..=rhs,
                ConKind::Ge => rhs..=f64::INFINITY,
            };
            let terms = row_terms.remove(&row).unwrap_or_default();
            pb.add_row(bounds, terms);
        }

        // options.warmstart would clear/reuse a basis across solves; this
        // backend builds a fresh RowProblem every call, so there is no
        // carried-over basis for it to act on and the flag is a no-op here.
        let mut model = pb.optimise(Sense::Minimise);
        model.set_option("output_flag", !options.silent);
        model.set_option("presolve", "on");
        model.set_option("simplex_scale_strategy", options.simplex_scale_strategy);
        model.set_option("simplex_strategy", options.simplex_strategy);
        model.set_option(
            "simplex_max_concurrency",
            options.simplex_max_concurrency,
        );
        model.set_option("run_crossover", if options.run_crossover { "on" } else { "off" });
        if let Some(limit) = options.time_limit {
            model.set_option("time_limit", limit);
        }
        if matches!(options.solver, SolverKind::Ipm) {
            model.set_option("solver", "ipm");
        }

        let solved = model.solve();
        match solved.status() {
            HighsModelStatus::Optimal => {
                let solution = solved.get_solution();
                let var_values = solution.columns().to_vec();
                let con_duals = solution.dual_rows().to_vec();
                let var_duals = solution.dual_columns().to_vec();
                let objective = var_values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| v * problem.obj_coeff_buffer().get(i).unwrap_or(0.0))
                    .sum();
                Ok(Solution {
                    var_values,
                    con_duals,
                    var_duals,
                    objective,
                })
            }
            status => Err(SolverError::InfeasibleOrSolverError(format!("{status:?}"))),
        }
    }
}
