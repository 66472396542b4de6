//! The assembly orchestrator (spec §2, §4.4-4.6): enumerates objects to
//! collect horizons, then drives `build! → setconstants! → update!`
//! across every object in that fixed order, checking the five
//! assembly-post-condition invariants of spec §3 before `setconstants!`.

use std::collections::HashSet;
use std::sync::Arc;

use hydrosched_core::{HkResult, Id};
use hydrosched_horizon::Horizon;
use hydrosched_solver::Problem;
use hydrosched_time::ProbTime;

use crate::balance::Balance;
use crate::boundary::{ConnectTwoObjects, SimpleSingleCuts, StartEqualStop, StatePair, StateVarRef};
use crate::error::ModelResult;
use crate::flow::Flow;
use crate::storage::Storage;
use crate::traits::{HydroRamping, RampingTransmission, SoftBound, StartUpCost};

/// A tagged-variant dispatch over the small closed family of top-level
/// and boundary objects (spec §9: "encode each family as a tagged
/// variant with a dispatch table").
#[derive(Debug, Clone)]
pub enum Object {
    Balance(Balance),
    Flow(Flow),
    Storage(Storage),
    RampingTransmission(RampingTransmission),
    HydroRamping(HydroRamping),
    SoftBound(SoftBound),
    StartUpCost(StartUpCost),
    StartEqualStop(StartEqualStop),
    ConnectTwoObjects(ConnectTwoObjects),
    SimpleSingleCuts(SimpleSingleCuts),
}

impl Object {
    pub fn build(&self, problem: &mut Problem) -> HkResult<()> {
        match self {
            Object::Balance(o) => o.build(problem),
            Object::Flow(o) => o.build(problem),
            Object::Storage(o) => o.build(problem),
            Object::RampingTransmission(o) => o.build(problem),
            Object::HydroRamping(o) => o.build(problem),
            Object::SoftBound(o) => o.build(problem),
            Object::StartUpCost(o) => o.build(problem),
            Object::StartEqualStop(o) => o.build(problem),
            Object::ConnectTwoObjects(o) => o.build(problem),
            Object::SimpleSingleCuts(o) => o.build(problem),
        }
    }

    pub fn setconstants(&mut self, problem: &mut Problem) -> HkResult<()> {
        match self {
            Object::Balance(o) => o.setconstants(problem),
            Object::Flow(o) => o.setconstants(problem),
            Object::Storage(o) => o.setconstants(problem),
            Object::RampingTransmission(o) => o.setconstants(problem),
            Object::HydroRamping(o) => o.setconstants(problem),
            Object::SoftBound(o) => o.setconstants(problem),
            Object::StartUpCost(o) => o.setconstants(problem),
            Object::StartEqualStop(o) => o.setconstants(problem),
            Object::ConnectTwoObjects(o) => o.setconstants(problem),
            Object::SimpleSingleCuts(o) => o.setconstants(problem),
        }
    }

    pub fn update(&mut self, probtime: &ProbTime, problem: &mut Problem) -> HkResult<()> {
        match self {
            Object::Balance(o) => o.update(probtime, problem),
            Object::Flow(o) => o.update(probtime, problem),
            Object::Storage(o) => o.update(probtime, problem),
            Object::RampingTransmission(o) => o.update(probtime, problem),
            Object::HydroRamping(o) => o.update(probtime, problem),
            Object::SoftBound(o) => o.update(probtime, problem),
            Object::StartUpCost(o) => o.update(probtime, problem),
            // boundary equalities are static topology, written once in setconstants!
            Object::StartEqualStop(_) | Object::ConnectTwoObjects(_) | Object::SimpleSingleCuts(_) => Ok(()),
        }
    }

    pub fn horizon(&self) -> Option<&Arc<dyn Horizon>> {
        match self {
            Object::Balance(o) => Some(o.horizon()),
            Object::Flow(o) => Some(&o.horizon),
            Object::Storage(o) => Some(&o.horizon),
            Object::RampingTransmission(o) => Some(&o.horizon),
            Object::HydroRamping(HydroRamping::Without { horizon, .. }) => Some(horizon),
            Object::HydroRamping(HydroRamping::With { horizon, .. }) => Some(horizon),
            Object::SoftBound(o) => Some(&o.horizon),
            Object::StartUpCost(o) => Some(&o.horizon),
            Object::StartEqualStop(_) | Object::ConnectTwoObjects(_) | Object::SimpleSingleCuts(_) => None,
        }
    }
}

#[derive(Default)]
pub struct Assembly {
    objects: Vec<Object>,
    state_vars: Vec<StatePair>,
    no_initial: HashSet<(Id, usize)>,
    no_terminal: HashSet<(Id, usize)>,
}

impl Assembly {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, object: Object) {
        self.objects.push(object);
    }

    /// Registers a `(var_in, var_out)` pair as declaring state (spec §3
    /// invariant 4: "every object declaring state variables" must have
    /// each end covered by a boundary condition or an explicit
    /// no-condition tag).
    pub fn declare_state_var(&mut self, pair: StatePair) {
        self.state_vars.push(pair);
    }

    pub fn mark_no_initial_condition(&mut self, sv: StateVarRef) {
        self.no_initial.insert((sv.id, sv.index));
    }

    pub fn mark_no_terminal_condition(&mut self, sv: StateVarRef) {
        self.no_terminal.insert((sv.id, sv.index));
    }

    /// spec §2: "enumerates balances to collect horizons". Distinct
    /// horizon instances are deduplicated by pointer identity; adaptive
    /// and shrinkable/shiftable horizons are already fully constructed
    /// by their own `build`/`new` before being handed to objects, so
    /// there is no further per-horizon build step here.
    pub fn buildhorizons(&self) -> Vec<Arc<dyn Horizon>> {
        let mut out: Vec<Arc<dyn Horizon>> = Vec::new();
        for object in &self.objects {
            if let Some(h) = object.horizon() {
                if !out.iter().any(|seen| Arc::ptr_eq(seen, h)) {
                    out.push(h.clone());
                }
            }
        }
        out
    }

    /// Entry point for the kernel's own `build!` phase. Returns
    /// [`crate::error::ModelError`] rather than the workspace-wide
    /// `HkError`, narrowing the surface a caller outside this crate has
    /// to match on (the same layering `hydrosched-core`'s `HkError` doc
    /// comment describes for crate-local error types).
    pub fn build(&self, problem: &mut Problem) -> ModelResult<()> {
        for object in &self.objects {
            object.build(problem)?;
        }
        Ok(())
    }

    pub fn setconstants(&mut self, problem: &mut Problem) -> ModelResult<()> {
        self.check_invariants()?;
        for object in &mut self.objects {
            object.setconstants(problem)?;
        }
        Ok(())
    }

    pub fn update(&mut self, probtime: &ProbTime, problem: &mut Problem) -> ModelResult<()> {
        for object in &mut self.objects {
            object.update(probtime, problem)?;
        }
        Ok(())
    }

    fn find_balance_id(&self, id: &Id) -> bool {
        self.objects.iter().any(|o| matches!(o, Object::Balance(b) if b.id() == id))
    }

    fn find_flow_horizon(&self, id: &Id) -> Option<&Arc<dyn Horizon>> {
        self.objects.iter().find_map(|o| match o {
            Object::Flow(f) if &f.id == id => Some(&f.horizon),
            _ => None,
        })
    }

    /// Checks spec §3's five assembly-post-condition invariants (invariant
    /// 5, no duplicate Id, is instead enforced structurally by
    /// [`hydrosched_solver::Problem`]'s registry rejecting reused ids
    /// during `build!`; invariant 1 is structural — every object holds a
    /// non-optional `Arc<dyn Horizon>`).
    pub fn check_invariants(&self) -> ModelResult<()> {
        for object in &self.objects {
            if let Object::Flow(flow) = object {
                for arrow in &flow.arrows {
                    if arrow.balance_is_endogenous && !self.find_balance_id(&arrow.balance) {
                        return Err(crate::error::ModelError::AssemblyIncomplete(format!(
                            "arrow on {} references missing balance {}",
                            flow.id, arrow.balance
                        )));
                    }
                }
            }
        }

        for object in &self.objects {
            if let Object::RampingTransmission(ramp) = object {
                let h1 = self.find_flow_horizon(&ramp.first_flow);
                let h2 = self.find_flow_horizon(&ramp.second_flow);
                if let (Some(a), Some(b)) = (h1, h2) {
                    if !Arc::ptr_eq(a, b) && a.num_periods() != b.num_periods() {
                        return Err(crate::error::ModelError::AssemblyIncomplete(format!(
                            "transmission ramping {} has flows with differing horizons",
                            ramp.sum_var
                        )));
                    }
                }
            }
        }

        for (var_in, var_out) in &self.state_vars {
            let initial_covered = self.no_initial.contains(&(var_in.id.clone(), var_in.index))
                || self.objects.iter().any(|o| match o {
                    Object::StartEqualStop(s) => s.state.0 == *var_in,
                    Object::ConnectTwoObjects(c) => c.in_state.0 == *var_in,
                    _ => false,
                });
            if !initial_covered {
                return Err(crate::error::ModelError::AssemblyIncomplete(format!(
                    "no initial boundary condition for {}@{}",
                    var_in.id, var_in.index
                )));
            }

            let terminal_covered = self.no_terminal.contains(&(var_out.id.clone(), var_out.index))
                || self.objects.iter().any(|o| match o {
                    Object::StartEqualStop(s) => s.state.1 == *var_out,
                    Object::ConnectTwoObjects(c) => c.out_state.1 == *var_out,
                    _ => false,
                });
            if !terminal_covered {
                return Err(crate::error::ModelError::AssemblyIncomplete(format!(
                    "no terminal boundary condition for {}@{}",
                    var_out.id, var_out.index
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrow::{Arrow, Direction};
    use crate::balance::RhsTerm;
    use hydrosched_horizon::SequentialHorizon;
    use hydrosched_param::Constant;

    fn horizon() -> Arc<dyn Horizon> {
        Arc::new(SequentialHorizon::new(vec![chrono::Duration::hours(1); 2]))
    }

    #[test]
    fn test_missing_balance_reference_fails_invariant_check() {
        let h = horizon();
        let flow = Flow::new(
            Id::new("Flow", "F1"),
            vec![Arrow::new(Id::new("Balance", "Ghost"), Direction::In, Arc::new(Constant(1.0)))],
            Arc::new(Constant(10.0)),
            h,
        );
        let mut assembly = Assembly::new();
        assembly.add(Object::Flow(flow));
        let err = assembly.check_invariants().unwrap_err();
        assert!(matches!(err, crate::error::ModelError::AssemblyIncomplete(_)));
    }

    #[test]
    fn test_build_setconstants_update_pipeline_succeeds() {
        let h = horizon();
        let balance = Balance::Endogenous {
            id: Id::new("Balance", "B1"),
            commodity: "Energy".into(),
            horizon: h.clone(),
            rhs_terms: vec![RhsTerm {
                term_id: "demand".into(),
                value: Arc::new(Constant(5.0)),
                direction: Direction::Out,
            }],
        };
        let flow = Flow::new(
            Id::new("Flow", "F1"),
            vec![Arrow::new(Id::new("Balance", "B1"), Direction::In, Arc::new(Constant(1.0)))],
            Arc::new(Constant(10.0)),
            h,
        );

        let mut assembly = Assembly::new();
        assembly.add(Object::Balance(balance));
        assembly.add(Object::Flow(flow));

        let mut problem = Problem::new();
        assembly.build(&mut problem).unwrap();
        assembly.setconstants(&mut problem).unwrap();

        let epoch = chrono::NaiveDate::from_ymd_opt(1970, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let probtime = ProbTime::new(epoch, epoch);
        assembly.update(&probtime, &mut problem).unwrap();

        assert_eq!(problem.num_vars(), 1);
        assert_eq!(problem.num_cons(), 2);
    }
}
