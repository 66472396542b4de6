//! Boundary conditions (spec §4.6): connect a state variable's initial
//! value to its own or another object's terminal value, inject a
//! terminal value function, or feed Benders-style future-cost cuts.

use hydrosched_core::{HkError, HkResult, Id};
use hydrosched_solver::Problem;

/// A reference to one flat slot of a variable family: `(id, index)`.
#[derive(Debug, Clone, PartialEq)]
pub struct StateVarRef {
    pub id: Id,
    pub index: usize,
}

impl StateVarRef {
    pub fn new(id: Id, index: usize) -> Self {
        Self { id, index }
    }
}

/// `(var_in, var_out)` — the first/last flat slots of one object's state
/// variable, e.g. a `Storage`'s `(start_id@1, id@T)`.
pub type StatePair = (StateVarRef, StateVarRef);

/// Tagging types accepted by the assembly completeness check (spec §4.6
/// "tagging objects so the assembly's completeness check accepts
/// them"). Carry no state of their own.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInitialCondition;
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTerminalCondition;
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBoundaryCondition;

/// For each state variable `(var_in, var_out)` of one object, adds the
/// equality `var_out - var_in = 0`.
#[derive(Debug, Clone)]
pub struct StartEqualStop {
    pub con: Id,
    pub state: StatePair,
}

impl StartEqualStop {
    pub fn build(&self, problem: &mut Problem) -> HkResult<()> {
        problem.add_eq(self.con.clone(), 1).map_err(HkError::from)
    }

    pub fn setconstants(&self, problem: &mut Problem) -> HkResult<()> {
        let (var_in, var_out) = &self.state;
        problem
            .set_con_coeff(&self.con, &var_out.id, 1, var_out.index, 1.0)
            .map_err(HkError::from)?;
        problem
            .set_con_coeff(&self.con, &var_in.id, 1, var_in.index, -1.0)
            .map_err(HkError::from)
    }
}

/// Pairwise, `out`'s terminal equals `in`'s initial (spec §4.6:
/// "both must have the same state-variable count").
#[derive(Debug, Clone)]
pub struct ConnectTwoObjects {
    pub con: Id,
    pub out_state: StatePair,
    pub in_state: StatePair,
}

impl ConnectTwoObjects {
    pub fn build(&self, problem: &mut Problem) -> HkResult<()> {
        problem.add_eq(self.con.clone(), 1).map_err(HkError::from)
    }

    pub fn setconstants(&self, problem: &mut Problem) -> HkResult<()> {
        let out_var = &self.out_state.1;
        let in_var = &self.in_state.0;
        problem
            .set_con_coeff(&self.con, &out_var.id, 1, out_var.index, 1.0)
            .map_err(HkError::from)?;
        problem
            .set_con_coeff(&self.con, &in_var.id, 1, in_var.index, -1.0)
            .map_err(HkError::from)
    }
}

/// Writes the last-period objective coefficient of each object's
/// out-state variable to `-value`, injecting a terminal value function
/// cheaply (spec §4.6).
#[derive(Debug, Clone)]
pub struct EndValues {
    pub out_vars: Vec<StateVarRef>,
    pub values: Vec<f64>,
}

impl EndValues {
    pub fn apply(&self, problem: &mut Problem) -> HkResult<()> {
        for (sv, value) in self.out_vars.iter().zip(self.values.iter()) {
            problem
                .set_obj_coeff(&sv.id, sv.index, -value)
                .map_err(HkError::from)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct Cut {
    constant: f64,
    slopes: Vec<f64>,
}

/// Preallocates `maxcuts` `≥`-rows of shape
/// `future_cost ≥ constant + sum(slope·state_var_out)`, stored as a ring
/// keyed by `cutix`. `updatecuts!` averages a new per-scenario cut
/// (`constant_i = objective - sum(slope·in_state_value)`,
/// `slope_i = fix_var_dual` of each state's in-variable) weighted by
/// `probabilities`, and writes the averaged cut into the current ring
/// slot. `clearcuts!` resets every row to the lower bound with zero
/// slopes.
#[derive(Debug, Clone)]
pub struct SimpleSingleCuts {
    pub con: Id,
    pub future_cost_var: Id,
    pub state_vars: Vec<StateVarRef>,
    pub probabilities: Vec<f64>,
    pub maxcuts: usize,
    pub lower_bound: f64,
    cuts: Vec<Cut>,
    cutix: usize,
}

impl SimpleSingleCuts {
    pub fn new(
        con: Id,
        future_cost_var: Id,
        state_vars: Vec<StateVarRef>,
        probabilities: Vec<f64>,
        maxcuts: usize,
        lower_bound: f64,
    ) -> Self {
        Self {
            con,
            future_cost_var,
            state_vars,
            probabilities,
            maxcuts,
            lower_bound,
            cuts: Vec::new(),
            cutix: 0,
        }
    }

    pub fn build(&self, problem: &mut Problem) -> HkResult<()> {
        problem.add_ge(self.con.clone(), self.maxcuts).map_err(HkError::from)
    }

    pub fn setconstants(&self, problem: &mut Problem) -> HkResult<()> {
        for row in 1..=self.maxcuts {
            problem
                .set_con_coeff(&self.con, &self.future_cost_var, row, 1, 1.0)
                .map_err(HkError::from)?;
        }
        Ok(())
    }

    /// Fold one new cut per scenario (already evaluated by the caller
    /// after a scenario solve) into the averaged cut written at the
    /// current ring position, then advance `cutix`.
    pub fn updatecuts(
        &mut self,
        scenario_constants: &[f64],
        scenario_slopes: &[Vec<f64>],
        problem: &mut Problem,
    ) -> HkResult<()> {
        if self.maxcuts == 0 {
            return Ok(());
        }
        let n_state = self.state_vars.len();
        let mut constant = 0.0;
        let mut slopes = vec![0.0; n_state];
        for (s, slope_vec) in scenario_slopes.iter().enumerate() {
            let p = self.probabilities.get(s).copied().unwrap_or(0.0);
            constant += p * scenario_constants.get(s).copied().unwrap_or(0.0);
            for (j, &v) in slope_vec.iter().enumerate() {
                slopes[j] += p * v;
            }
        }

        let row = self.cutix + 1;
        problem
            .set_rhs_term(&self.con, "cut", row, constant)
            .map_err(HkError::from)?;
        for (sv, &slope) in self.state_vars.iter().zip(slopes.iter()) {
            problem
                .set_con_coeff(&self.con, &sv.id, row, sv.index, -slope)
                .map_err(HkError::from)?;
        }

        if self.cuts.len() <= self.cutix {
            self.cuts.push(Cut { constant, slopes });
        } else {
            self.cuts[self.cutix] = Cut { constant, slopes };
        }
        self.cutix = (self.cutix + 1) % self.maxcuts;
        Ok(())
    }

    pub fn clearcuts(&mut self, problem: &mut Problem) -> HkResult<()> {
        self.cuts.clear();
        self.cutix = 0;
        for row in 1..=self.maxcuts {
            problem
                .set_rhs_term(&self.con, "cut", row, self.lower_bound)
                .map_err(HkError::from)?;
            for sv in &self.state_vars {
                problem
                    .set_con_coeff(&self.con, &sv.id, row, sv.index, 0.0)
                    .map_err(HkError::from)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydrosched_core::Id;

    #[test]
    fn test_start_equal_stop_writes_equal_and_opposite_coeffs() {
        let mut problem = Problem::new();
        let var_in = Id::new("StorageStart", "S1");
        let var_out = Id::new("Storage", "S1");
        problem.add_var(var_in.clone(), 1).unwrap();
        problem.add_var(var_out.clone(), 3).unwrap();
        let cond = StartEqualStop {
            con: Id::new("StartEqualStop", "S1"),
            state: (StateVarRef::new(var_in.clone(), 1), StateVarRef::new(var_out.clone(), 3)),
        };
        cond.build(&mut problem).unwrap();
        cond.setconstants(&mut problem).unwrap();
        assert_eq!(problem.get_con_coeff(&cond.con, &var_out, 1, 3).unwrap(), 1.0);
        assert_eq!(problem.get_con_coeff(&cond.con, &var_in, 1, 1).unwrap(), -1.0);
    }

    #[test]
    fn test_clearcuts_resets_rows_to_lower_bound() {
        let mut problem = Problem::new();
        let state_id = Id::new("Storage", "S1");
        let future_cost = Id::new("FutureCost", "Stage1");
        problem.add_var(state_id.clone(), 1).unwrap();
        problem.add_var(future_cost.clone(), 1).unwrap();
        let mut cuts = SimpleSingleCuts::new(
            Id::new("Cut", "Stage1"),
            future_cost,
            vec![StateVarRef::new(state_id, 1)],
            vec![1.0],
            2,
            -1000.0,
        );
        cuts.build(&mut problem).unwrap();
        cuts.setconstants(&mut problem).unwrap();
        cuts.clearcuts(&mut problem).unwrap();
        assert_eq!(problem.get_rhs_term(&cuts.con, "cut", 1).unwrap(), -1000.0);
        assert_eq!(problem.get_rhs_term(&cuts.con, "cut", 2).unwrap(), -1000.0);
    }
}
