//! [`Problem`] — the LP facade of spec §4.5: register variables and
//! constraints under an [`Id`], write coefficients through differential
//! buffers, `solve!()`, then read back values/duals.

use std::collections::{HashMap, HashSet};

use hydrosched_core::Id;

use crate::buffer::{DiffBuffer, MatrixBuffer, RhsBuffer};
use crate::cascade::{solve_cascade, Solution};
use crate::error::{SolverError, SolverResult};
use crate::options::SolverOptions;
use crate::registry::Registry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConKind {
    Eq,
    Le,
    Ge,
}

#[derive(Debug, Clone, Copy)]
struct FixState {
    lb: f64,
    ub: f64,
}

#[derive(Debug, Default)]
pub struct Problem {
    vars: Registry,
    cons: Registry,
    con_kind: Vec<ConKind>,

    obj_coeff: DiffBuffer<f64>,
    lb: DiffBuffer<f64>,
    ub: DiffBuffer<f64>,
    con_coeff: MatrixBuffer,
    rhs: RhsBuffer,

    fixable: HashSet<usize>,
    fixed: HashMap<usize, FixState>,

    options: SolverOptions,
    solution: Option<Solution>,
}

impl Problem {
    pub fn new() -> Self {
        Self::default()
    }

    // -- registration -----------------------------------------------

    pub fn add_var(&mut self, id: Id, n: usize) -> SolverResult<()> {
        let entry = self.vars.add(id, n)?;
        self.obj_coeff.grow_to(entry.start + entry.n);
        self.lb.grow_to(entry.start + entry.n);
        self.ub.grow_to(entry.start + entry.n);
        for i in entry.start..entry.start + entry.n {
            self.lb.update(i, 0.0);
        }
        Ok(())
    }

    fn add_con(&mut self, id: Id, n: usize, kind: ConKind) -> SolverResult<()> {
        let entry = self.cons.add(id, n)?;
        self.con_kind.resize(entry.start + entry.n, kind);
        Ok(())
    }

    pub fn add_eq(&mut self, id: Id, n: usize) -> SolverResult<()> {
        self.add_con(id, n, ConKind::Eq)
    }

    pub fn add_le(&mut self, id: Id, n: usize) -> SolverResult<()> {
        self.add_con(id, n, ConKind::Le)
    }

    pub fn add_ge(&mut self, id: Id, n: usize) -> SolverResult<()> {
        self.add_con(id, n, ConKind::Ge)
    }

    // -- writes -------------------------------------------------------

    pub fn set_con_coeff(&mut self, con: &Id, var: &Id, ci: usize, vi: usize, value: f64) -> SolverResult<()> {
        let row = self.cons.flat_index(con, ci)?;
        let col = self.vars.flat_index(var, vi)?;
        self.con_coeff.set(row, col, value);
        self.solution = None;
        Ok(())
    }

    pub fn set_ub(&mut self, var: &Id, i: usize, value: f64) -> SolverResult<()> {
        let flat = self.vars.flat_index(var, i)?;
        self.ub.update(flat, value);
        self.solution = None;
        Ok(())
    }

    pub fn set_lb(&mut self, var: &Id, i: usize, value: f64) -> SolverResult<()> {
        let flat = self.vars.flat_index(var, i)?;
        self.lb.update(flat, value);
        self.solution = None;
        Ok(())
    }

    pub fn set_obj_coeff(&mut self, var: &Id, i: usize, value: f64) -> SolverResult<()> {
        let flat = self.vars.flat_index(var, i)?;
        self.obj_coeff.update(flat, value);
        self.solution = None;
        Ok(())
    }

    pub fn set_rhs_term(&mut self, con: &Id, term_id: &str, i: usize, value: f64) -> SolverResult<()> {
        let row = self.cons.flat_index(con, i)?;
        self.rhs.set(row, term_id, value);
        self.solution = None;
        Ok(())
    }

    // -- reads (structural, always available) -------------------------

    pub fn get_con_coeff(&self, con: &Id, var: &Id, ci: usize, vi: usize) -> SolverResult<f64> {
        let row = self.cons.flat_index(con, ci)?;
        let col = self.vars.flat_index(var, vi)?;
        Ok(self.con_coeff.get(row, col).unwrap_or(0.0))
    }

    pub fn get_ub(&self, var: &Id, i: usize) -> SolverResult<f64> {
        let flat = self.vars.flat_index(var, i)?;
        Ok(self.ub.get(flat).unwrap_or(f64::INFINITY))
    }

    pub fn get_lb(&self, var: &Id, i: usize) -> SolverResult<f64> {
        let flat = self.vars.flat_index(var, i)?;
        Ok(self.lb.get(flat).unwrap_or(0.0))
    }

    pub fn get_obj_coeff(&self, var: &Id, i: usize) -> SolverResult<f64> {
        let flat = self.vars.flat_index(var, i)?;
        Ok(self.obj_coeff.get(flat).unwrap_or(0.0))
    }

    pub fn get_rhs_term(&self, con: &Id, term_id: &str, i: usize) -> SolverResult<f64> {
        let row = self.cons.flat_index(con, i)?;
        Ok(self.rhs.get(row, term_id).unwrap_or(0.0))
    }

    // -- reads (solution-dependent) -------------------------------------

    pub fn get_var_value(&self, var: &Id, i: usize) -> SolverResult<f64> {
        let flat = self.vars.flat_index(var, i)?;
        let sol = self.solution.as_ref().ok_or(SolverError::NoSolutionAvailable)?;
        Ok(sol.var_values[flat])
    }

    pub fn get_con_dual(&self, con: &Id, i: usize) -> SolverResult<f64> {
        let row = self.cons.flat_index(con, i)?;
        let sol = self.solution.as_ref().ok_or(SolverError::NoSolutionAvailable)?;
        Ok(sol.con_duals[row])
    }

    pub fn get_objective_value(&self) -> SolverResult<f64> {
        let sol = self.solution.as_ref().ok_or(SolverError::NoSolutionAvailable)?;
        Ok(sol.objective)
    }

    pub fn get_fix_var_dual(&self, var: &Id, i: usize) -> SolverResult<f64> {
        let flat = self.vars.flat_index(var, i)?;
        let sol = self.solution.as_ref().ok_or(SolverError::NoSolutionAvailable)?;
        Ok(sol.var_duals[flat])
    }

    // -- fixing ---------------------------------------------------------

    pub fn make_fixable(&mut self, var: &Id, i: usize) -> SolverResult<()> {
        let flat = self.vars.flat_index(var, i)?;
        self.fixable.insert(flat);
        Ok(())
    }

    pub fn fix(&mut self, var: &Id, i: usize, value: f64) -> SolverResult<()> {
        let flat = self.vars.flat_index(var, i)?;
        if !self.fixable.contains(&flat) {
            return Err(SolverError::Construction(format!(
                "{var} index {i} was never marked fixable"
            )));
        }
        if !self.fixed.contains_key(&flat) {
            self.fixed.insert(
                flat,
                FixState {
                    lb: self.lb.get(flat).unwrap_or(0.0),
                    ub: self.ub.get(flat).unwrap_or(f64::INFINITY),
                },
            );
        }
        self.lb.update(flat, value);
        self.ub.update(flat, value);
        self.solution = None;
        Ok(())
    }

    pub fn unfix(&mut self, var: &Id, i: usize) -> SolverResult<()> {
        let flat = self.vars.flat_index(var, i)?;
        if let Some(saved) = self.fixed.remove(&flat) {
            self.lb.update(flat, saved.lb);
            self.ub.update(flat, saved.ub);
            self.solution = None;
        }
        Ok(())
    }

    // -- options ----------------------------------------------------------

    pub fn set_silent(&mut self) {
        self.options.set_silent();
    }

    pub fn set_unsilent(&mut self) {
        self.options.set_unsilent();
    }

    pub fn set_param(&mut self, name: &str, value: crate::options::ParamValue) -> SolverResult<()> {
        self.options.set_param(name, value)
    }

    // -- solve --------------------------------------------------------------

    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    pub fn num_cons(&self) -> usize {
        self.cons.len()
    }

    pub fn con_kind(&self, row: usize) -> ConKind {
        self.con_kind[row]
    }

    pub fn obj_coeff_buffer(&self) -> &DiffBuffer<f64> {
        &self.obj_coeff
    }

    pub fn lb_buffer(&self) -> &DiffBuffer<f64> {
        &self.lb
    }

    pub fn ub_buffer(&self) -> &DiffBuffer<f64> {
        &self.ub
    }

    pub fn con_coeff_buffer(&self) -> &MatrixBuffer {
        &self.con_coeff
    }

    pub fn rhs_buffer(&self) -> &RhsBuffer {
        &self.rhs
    }

    /// Run the solve cascade (spec §4.5 `solve!()`): flush the dirty
    /// buffers into the active backend, run it, fall back through the
    /// strategies named in [`SolverOptions`] on failure.
    pub fn solve(&mut self) -> SolverResult<()> {
        let solution = solve_cascade(self, &self.options)?;
        self.solution = Some(solution);
        self.obj_coeff.reset();
        self.lb.reset();
        self.ub.reset();
        self.con_coeff.reset();
        self.rhs.reset();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_var_id_rejected() {
        let mut p = Problem::new();
        p.add_var(Id::new("Flow", "A"), 3).unwrap();
        let err = p.add_var(Id::new("Flow", "A"), 1).unwrap_err();
        assert!(matches!(err, SolverError::DuplicateId(_)));
    }

    #[test]
    fn test_default_bounds_are_zero_to_infinity() {
        let mut p = Problem::new();
        p.add_var(Id::new("Flow", "A"), 2).unwrap();
        assert_eq!(p.get_lb(&Id::new("Flow", "A"), 1).unwrap(), 0.0);
        assert_eq!(p.get_ub(&Id::new("Flow", "A"), 1).unwrap(), f64::INFINITY);
    }

    #[test]
    fn test_read_before_solve_fails() {
        let mut p = Problem::new();
        p.add_var(Id::new("Flow", "A"), 1).unwrap();
        let err = p.get_var_value(&Id::new("Flow", "A"), 1).unwrap_err();
        assert!(matches!(err, SolverError::NoSolutionAvailable));
    }

    #[test]
    fn test_fix_requires_fixable_marker() {
        let mut p = Problem::new();
        p.add_var(Id::new("Flow", "A"), 1).unwrap();
        let err = p.fix(&Id::new("Flow", "A"), 1, 5.0).unwrap_err();
        assert!(matches!(err, SolverError::Construction(_)));
    }

    #[test]
    fn test_fix_then_unfix_restores_bounds() {
        let mut p = Problem::new();
        let id = Id::new("Flow", "A");
        p.add_var(id.clone(), 1).unwrap();
        p.set_ub(&id, 1, 10.0).unwrap();
        p.make_fixable(&id, 1).unwrap();
        p.fix(&id, 1, 3.0).unwrap();
        assert_eq!(p.get_lb(&id, 1).unwrap(), 3.0);
        assert_eq!(p.get_ub(&id, 1).unwrap(), 3.0);
        p.unfix(&id, 1).unwrap();
        assert_eq!(p.get_lb(&id, 1).unwrap(), 0.0);
        assert_eq!(p.get_ub(&id, 1).unwrap(), 10.0);
    }

    #[test]
    fn test_rhs_term_round_trip() {
        let mut p = Problem::new();
        let con = Id::new("Balance", "A");
        p.add_eq(con.clone(), 1).unwrap();
        p.set_rhs_term(&con, "inflow", 1, 4.0).unwrap();
        p.set_rhs_term(&con, "mustrun", 1, 1.5).unwrap();
        assert_eq!(p.get_rhs_term(&con, "inflow", 1).unwrap(), 4.0);
        assert_eq!(p.rhs_buffer().sum(0), 5.5);
    }
}
