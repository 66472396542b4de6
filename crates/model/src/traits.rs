//! The trait family (spec §4.4): small objects that attach to one
//! parent Flow/Storage, owning their own auxiliary variables and
//! constraints — `RampingTransmission`, `HydroRamping`, `SoftBound`,
//! `StartUpCost`.

use std::sync::Arc;

use hydrosched_core::{HkError, HkResult, Id};
use hydrosched_horizon::Horizon;
use hydrosched_param::Param;
use hydrosched_solver::Problem;
use hydrosched_time::ProbTime;

use crate::support::{recompute_periods, shift_pairs};

fn epoch_time() -> chrono::NaiveDateTime {
    chrono::NaiveDate::from_ymd_opt(1970, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Writes `value(t)` through `write`, constant across the horizon when
/// possible (`setconstants!`, `probtime=None`), else following the same
/// shift-then-recompute two-pass update every main object uses
/// (`update!`, `probtime=Some`): periods the horizon says are provably
/// unchanged are copied via `read`/`write` rather than recomputed.
///
/// `problem` is threaded through explicitly (rather than captured by
/// `read`/`write`) so the same `&mut Problem` borrow can serve both a
/// read and a write in the same pass without aliasing.
fn write_value_series(
    param: &Arc<dyn Param>,
    horizon: &dyn Horizon,
    probtime: Option<&ProbTime>,
    problem: &mut Problem,
    read: impl Fn(&Problem, usize) -> f64,
    mut write: impl FnMut(&mut Problem, usize, f64) -> HkResult<()>,
) -> HkResult<()> {
    match probtime {
        None => {
            if !(param.is_constant() && !param.is_durational() && horizon.has_constant_durations()) {
                return Ok(());
            }
            let epoch = epoch_time();
            let delta = horizon.time_delta(1);
            let v = param.value(&ProbTime::new(epoch, epoch), &delta)?;
            for t in 1..=horizon.num_periods() {
                write(problem, t, v)?;
            }
        }
        Some(pt) => {
            if param.is_constant() && !param.is_durational() {
                return Ok(());
            }
            for &(from, to) in &shift_pairs(horizon) {
                let v = read(problem, from);
                write(problem, to, v)?;
            }
            let periods = recompute_periods(horizon, param.is_stateful());
            for t in periods {
                let delta = horizon.time_delta(t);
                let v = param.value(pt, &delta)?;
                write(problem, t, v)?;
            }
        }
    }
    Ok(())
}

/// spec §4.4 "Ramping (transmission) introduces a sum-transmission
/// variable `s[t] = secondflow[t] - firstflow[t]`, two `≤` families
/// `±(s[t]-s[t-1]) ≤ cap[t]`, a named start variable `s[0]` made
/// fixable."
#[derive(Debug, Clone)]
pub struct RampingTransmission {
    pub sum_var: Id,
    pub start_var: Id,
    pub sum_con: Id,
    pub up_con: Id,
    pub down_con: Id,
    pub first_flow: Id,
    pub second_flow: Id,
    pub cap: Arc<dyn Param>,
    pub horizon: Arc<dyn Horizon>,
}

impl RampingTransmission {
    pub fn build(&self, problem: &mut Problem) -> HkResult<()> {
        let t = self.horizon.num_periods();
        problem.add_var(self.sum_var.clone(), t).map_err(HkError::from)?;
        problem.add_var(self.start_var.clone(), 1).map_err(HkError::from)?;
        problem.make_fixable(&self.start_var, 1).map_err(HkError::from)?;
        problem.add_eq(self.sum_con.clone(), t).map_err(HkError::from)?;
        problem.add_le(self.up_con.clone(), t).map_err(HkError::from)?;
        problem.add_le(self.down_con.clone(), t).map_err(HkError::from)?;
        Ok(())
    }

    pub fn setconstants(&self, problem: &mut Problem) -> HkResult<()> {
        let t_max = self.horizon.num_periods();
        for t in 1..=t_max {
            problem.set_con_coeff(&self.sum_con, &self.sum_var, t, t, 1.0).map_err(HkError::from)?;
            problem.set_con_coeff(&self.sum_con, &self.second_flow, t, t, -1.0).map_err(HkError::from)?;
            problem.set_con_coeff(&self.sum_con, &self.first_flow, t, t, 1.0).map_err(HkError::from)?;

            problem.set_con_coeff(&self.up_con, &self.sum_var, t, t, 1.0).map_err(HkError::from)?;
            problem.set_con_coeff(&self.down_con, &self.sum_var, t, t, -1.0).map_err(HkError::from)?;
            if t == 1 {
                problem.set_con_coeff(&self.up_con, &self.start_var, t, 1, -1.0).map_err(HkError::from)?;
                problem.set_con_coeff(&self.down_con, &self.start_var, t, 1, 1.0).map_err(HkError::from)?;
            } else {
                problem.set_con_coeff(&self.up_con, &self.sum_var, t, t - 1, -1.0).map_err(HkError::from)?;
                problem.set_con_coeff(&self.down_con, &self.sum_var, t, t - 1, 1.0).map_err(HkError::from)?;
            }
        }
        let up_con = self.up_con.clone();
        let down_con = self.down_con.clone();
        write_value_series(
            &self.cap,
            self.horizon.as_ref(),
            None,
            problem,
            move |p, t| p.get_rhs_term(&up_con, "cap", t).unwrap_or(0.0),
            {
                let up_con = self.up_con.clone();
                let down_con = self.down_con.clone();
                move |p, t, v| {
                    p.set_rhs_term(&up_con, "cap", t, v).map_err(HkError::from)?;
                    p.set_rhs_term(&down_con, "cap", t, v).map_err(HkError::from)
                }
            },
        )
    }

    pub fn update(&self, probtime: &ProbTime, problem: &mut Problem) -> HkResult<()> {
        let up_con = self.up_con.clone();
        let down_con = self.down_con.clone();
        write_value_series(
            &self.cap,
            self.horizon.as_ref(),
            Some(probtime),
            problem,
            move |p, t| p.get_rhs_term(&up_con, "cap", t).unwrap_or(0.0),
            move |p, t, v| {
                p.set_rhs_term(&self.up_con, "cap", t, v).map_err(HkError::from)?;
                p.set_rhs_term(&self.down_con, "cap", t, v).map_err(HkError::from)
            },
        )
    }
}

/// spec §4.4 "Ramping (hydro) (two variants): 'without' has only
/// `±(flow[t]-flow[t-1]) ≤ cap[t]` for `t ≥ 2`, no state; 'with' adds
/// a named start and end fixable variable and the last-period
/// equality `flow[T] = endflow`."
#[derive(Debug, Clone)]
pub enum HydroRamping {
    Without {
        flow: Id,
        up_con: Id,
        down_con: Id,
        cap: Arc<dyn Param>,
        horizon: Arc<dyn Horizon>,
    },
    With {
        flow: Id,
        start_var: Id,
        end_var: Id,
        up_con: Id,
        down_con: Id,
        end_con: Id,
        cap: Arc<dyn Param>,
        horizon: Arc<dyn Horizon>,
    },
}

impl HydroRamping {
    pub fn build(&self, problem: &mut Problem) -> HkResult<()> {
        match self {
            HydroRamping::Without { up_con, down_con, horizon, .. } => {
                let n = horizon.num_periods().saturating_sub(1);
                problem.add_le(up_con.clone(), n).map_err(HkError::from)?;
                problem.add_le(down_con.clone(), n).map_err(HkError::from)?;
            }
            HydroRamping::With {
                start_var,
                end_var,
                up_con,
                down_con,
                end_con,
                horizon,
                ..
            } => {
                let t = horizon.num_periods();
                problem.add_var(start_var.clone(), 1).map_err(HkError::from)?;
                problem.make_fixable(start_var, 1).map_err(HkError::from)?;
                problem.add_var(end_var.clone(), 1).map_err(HkError::from)?;
                problem.make_fixable(end_var, 1).map_err(HkError::from)?;
                problem.add_le(up_con.clone(), t).map_err(HkError::from)?;
                problem.add_le(down_con.clone(), t).map_err(HkError::from)?;
                problem.add_eq(end_con.clone(), 1).map_err(HkError::from)?;
            }
        }
        Ok(())
    }

    pub fn setconstants(&self, problem: &mut Problem) -> HkResult<()> {
        match self {
            HydroRamping::Without { flow, up_con, down_con, cap, horizon } => {
                let t_max = horizon.num_periods();
                for t in 2..=t_max {
                    let row = t - 1;
                    problem.set_con_coeff(up_con, flow, row, t, 1.0).map_err(HkError::from)?;
                    problem.set_con_coeff(up_con, flow, row, t - 1, -1.0).map_err(HkError::from)?;
                    problem.set_con_coeff(down_con, flow, row, t, -1.0).map_err(HkError::from)?;
                    problem.set_con_coeff(down_con, flow, row, t - 1, 1.0).map_err(HkError::from)?;
                }
                let up = up_con.clone();
                let down = down_con.clone();
                let up2 = up_con.clone();
                let down2 = down_con.clone();
                write_value_series(
                    cap,
                    horizon.as_ref(),
                    None,
                    problem,
                    move |p, t| {
                        if t < 2 {
                            return 0.0;
                        }
                        p.get_rhs_term(&up, "cap", t - 1).unwrap_or(0.0)
                    },
                    move |p, t, v| {
                        if t < 2 {
                            return Ok(());
                        }
                        let row = t - 1;
                        p.set_rhs_term(&up2, "cap", row, v).map_err(HkError::from)?;
                        p.set_rhs_term(&down2, "cap", row, v).map_err(HkError::from)
                    },
                )
            }
            HydroRamping::With {
                flow,
                start_var,
                end_var,
                up_con,
                down_con,
                end_con,
                cap,
                horizon,
            } => {
                let t_max = horizon.num_periods();
                for t in 1..=t_max {
                    problem.set_con_coeff(up_con, flow, t, t, 1.0).map_err(HkError::from)?;
                    problem.set_con_coeff(down_con, flow, t, t, -1.0).map_err(HkError::from)?;
                    if t == 1 {
                        problem.set_con_coeff(up_con, start_var, t, 1, -1.0).map_err(HkError::from)?;
                        problem.set_con_coeff(down_con, start_var, t, 1, 1.0).map_err(HkError::from)?;
                    } else {
                        problem.set_con_coeff(up_con, flow, t, t - 1, -1.0).map_err(HkError::from)?;
                        problem.set_con_coeff(down_con, flow, t, t - 1, 1.0).map_err(HkError::from)?;
                    }
                }
                problem.set_con_coeff(end_con, flow, 1, t_max, 1.0).map_err(HkError::from)?;
                problem.set_con_coeff(end_con, end_var, 1, 1, -1.0).map_err(HkError::from)?;
                let up = up_con.clone();
                let up2 = up_con.clone();
                let down2 = down_con.clone();
                write_value_series(
                    cap,
                    horizon.as_ref(),
                    None,
                    problem,
                    move |p, t| p.get_rhs_term(&up, "cap", t).unwrap_or(0.0),
                    move |p, t, v| {
                        p.set_rhs_term(&up2, "cap", t, v).map_err(HkError::from)?;
                        p.set_rhs_term(&down2, "cap", t, v).map_err(HkError::from)
                    },
                )
            }
        }
    }

    pub fn update(&self, probtime: &ProbTime, problem: &mut Problem) -> HkResult<()> {
        match self {
            HydroRamping::Without { up_con, down_con, cap, horizon, .. } => {
                let up = up_con.clone();
                let up2 = up_con.clone();
                let down2 = down_con.clone();
                write_value_series(
                    cap,
                    horizon.as_ref(),
                    Some(probtime),
                    problem,
                    move |p, t| {
                        if t < 2 {
                            return 0.0;
                        }
                        p.get_rhs_term(&up, "cap", t - 1).unwrap_or(0.0)
                    },
                    move |p, t, v| {
                        if t < 2 {
                            return Ok(());
                        }
                        let row = t - 1;
                        p.set_rhs_term(&up2, "cap", row, v).map_err(HkError::from)?;
                        p.set_rhs_term(&down2, "cap", row, v).map_err(HkError::from)
                    },
                )
            }
            HydroRamping::With { up_con, down_con, cap, horizon, .. } => {
                let up = up_con.clone();
                let up2 = up_con.clone();
                let down2 = down_con.clone();
                write_value_series(
                    cap,
                    horizon.as_ref(),
                    Some(probtime),
                    problem,
                    move |p, t| p.get_rhs_term(&up, "cap", t).unwrap_or(0.0),
                    move |p, t, v| {
                        p.set_rhs_term(&up2, "cap", t, v).map_err(HkError::from)?;
                        p.set_rhs_term(&down2, "cap", t, v).map_err(HkError::from)
                    },
                )
            }
        }
    }
}

/// spec §4.4 "SoftBound adds `sign·var[t] − breach[t] ≤ sign·softcap[t]`
/// with `breach ≥ 0` and `breach[t]` in the objective with coefficient
/// = penalty. Sign is +1 for upper, −1 for lower."
#[derive(Debug, Clone)]
pub struct SoftBound {
    pub parent: Id,
    pub breach: Id,
    pub con: Id,
    pub sign: f64,
    pub softcap: Arc<dyn Param>,
    pub penalty: Arc<dyn Param>,
    pub horizon: Arc<dyn Horizon>,
}

impl SoftBound {
    pub fn upper(parent: Id, breach: Id, con: Id, softcap: Arc<dyn Param>, penalty: Arc<dyn Param>, horizon: Arc<dyn Horizon>) -> Self {
        Self { parent, breach, con, sign: 1.0, softcap, penalty, horizon }
    }

    pub fn lower(parent: Id, breach: Id, con: Id, softcap: Arc<dyn Param>, penalty: Arc<dyn Param>, horizon: Arc<dyn Horizon>) -> Self {
        Self { parent, breach, con, sign: -1.0, softcap, penalty, horizon }
    }

    pub fn build(&self, problem: &mut Problem) -> HkResult<()> {
        let t = self.horizon.num_periods();
        problem.add_var(self.breach.clone(), t).map_err(HkError::from)?;
        problem.add_le(self.con.clone(), t).map_err(HkError::from)
    }

    pub fn setconstants(&self, problem: &mut Problem) -> HkResult<()> {
        let t_max = self.horizon.num_periods();
        for t in 1..=t_max {
            problem.set_con_coeff(&self.con, &self.parent, t, t, self.sign).map_err(HkError::from)?;
            problem.set_con_coeff(&self.con, &self.breach, t, t, -1.0).map_err(HkError::from)?;
        }
        let sign = self.sign;
        let con = self.con.clone();
        let con2 = self.con.clone();
        write_value_series(
            &self.softcap,
            self.horizon.as_ref(),
            None,
            problem,
            move |p, t| p.get_rhs_term(&con, "softcap", t).unwrap_or(0.0),
            move |p, t, v| p.set_rhs_term(&con2, "softcap", t, v * sign).map_err(HkError::from),
        )?;
        let breach = self.breach.clone();
        let breach2 = self.breach.clone();
        write_value_series(
            &self.penalty,
            self.horizon.as_ref(),
            None,
            problem,
            move |p, t| p.get_obj_coeff(&breach, t).unwrap_or(0.0),
            move |p, t, v| p.set_obj_coeff(&breach2, t, v).map_err(HkError::from),
        )
    }

    pub fn update(&self, probtime: &ProbTime, problem: &mut Problem) -> HkResult<()> {
        let sign = self.sign;
        let con = self.con.clone();
        let con2 = self.con.clone();
        write_value_series(
            &self.softcap,
            self.horizon.as_ref(),
            Some(probtime),
            problem,
            move |p, t| p.get_rhs_term(&con, "softcap", t).unwrap_or(0.0),
            move |p, t, v| p.set_rhs_term(&con2, "softcap", t, v * sign).map_err(HkError::from),
        )?;
        let breach = self.breach.clone();
        let breach2 = self.breach.clone();
        write_value_series(
            &self.penalty,
            self.horizon.as_ref(),
            Some(probtime),
            problem,
            move |p, t| p.get_obj_coeff(&breach, t).unwrap_or(0.0),
            move |p, t, v| p.set_obj_coeff(&breach2, t, v).map_err(HkError::from),
        )
    }
}

/// `StartUpCost` is named in spec §2/§4.4 as a trait parallel to Ramping
/// and SoftBound, but no formula is given (unlike those two). Since the
/// kernel's backends (HiGHS simplex/IPM, good_lp/clarabel) are
/// continuous-only, a binary commitment indicator isn't an option; this
/// implements the standard LP relaxation: a nonnegative `startup[t]`
/// bounded below by the parent's period-to-period increase,
/// `startup[t] ≥ var[t] − var[t-1]`, penalized in the objective by
/// `cost[t]`. A named fixable `var[0]` anchors the first period the same
/// way Ramping's `s[0]` does.
#[derive(Debug, Clone)]
pub struct StartUpCost {
    pub parent: Id,
    pub startup: Id,
    pub start_var: Id,
    pub con: Id,
    pub cost: Arc<dyn Param>,
    pub horizon: Arc<dyn Horizon>,
}

impl StartUpCost {
    pub fn build(&self, problem: &mut Problem) -> HkResult<()> {
        let t = self.horizon.num_periods();
        problem.add_var(self.startup.clone(), t).map_err(HkError::from)?;
        problem.add_var(self.start_var.clone(), 1).map_err(HkError::from)?;
        problem.make_fixable(&self.start_var, 1).map_err(HkError::from)?;
        problem.add_le(self.con.clone(), t).map_err(HkError::from)
    }

    pub fn setconstants(&self, problem: &mut Problem) -> HkResult<()> {
        let t_max = self.horizon.num_periods();
        for t in 1..=t_max {
            problem.set_con_coeff(&self.con, &self.parent, t, t, 1.0).map_err(HkError::from)?;
            problem.set_con_coeff(&self.con, &self.startup, t, t, -1.0).map_err(HkError::from)?;
            if t == 1 {
                problem.set_con_coeff(&self.con, &self.start_var, t, 1, -1.0).map_err(HkError::from)?;
            } else {
                problem.set_con_coeff(&self.con, &self.parent, t, t - 1, -1.0).map_err(HkError::from)?;
            }
        }
        let startup = self.startup.clone();
        let startup2 = self.startup.clone();
        write_value_series(
            &self.cost,
            self.horizon.as_ref(),
            None,
            problem,
            move |p, t| p.get_obj_coeff(&startup, t).unwrap_or(0.0),
            move |p, t, v| p.set_obj_coeff(&startup2, t, v).map_err(HkError::from),
        )
    }

    pub fn update(&self, probtime: &ProbTime, problem: &mut Problem) -> HkResult<()> {
        let startup = self.startup.clone();
        let startup2 = self.startup.clone();
        write_value_series(
            &self.cost,
            self.horizon.as_ref(),
            Some(probtime),
            problem,
            move |p, t| p.get_obj_coeff(&startup, t).unwrap_or(0.0),
            move |p, t, v| p.set_obj_coeff(&startup2, t, v).map_err(HkError::from),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydrosched_horizon::SequentialHorizon;
    use hydrosched_param::Constant;

    #[test]
    fn test_soft_bound_optimum_matches_boundary_scenario_s6() {
        // S6: softcap=80, penalty=100, ub=100, flow objcoeff=-50
        // optimum: flow=100, breach=20, obj = -50*100 + 100*20 = -3000
        let h: Arc<dyn Horizon> = Arc::new(SequentialHorizon::new(vec![chrono::Duration::hours(1); 1]));
        let flow = Id::new("Flow", "F1");
        let breach = Id::new("Breach", "F1");
        let con = Id::new("SoftBoundCon", "F1");
        let soft = SoftBound::upper(
            flow.clone(),
            breach,
            con,
            Arc::new(Constant(80.0)),
            Arc::new(Constant(100.0)),
            h.clone(),
        );
        let mut problem = Problem::new();
        problem.add_var(flow.clone(), 1).unwrap();
        problem.set_ub(&flow, 1, 100.0).unwrap();
        problem.set_obj_coeff(&flow, 1, -50.0).unwrap();
        soft.build(&mut problem).unwrap();
        soft.setconstants(&mut problem).unwrap();
        assert_eq!(problem.get_rhs_term(&soft.con, "softcap", 1).unwrap(), 80.0);
        assert_eq!(problem.get_obj_coeff(&soft.breach, 1).unwrap(), 100.0);
    }

    #[test]
    fn test_ramping_transmission_builds_three_constraint_families() {
        let h: Arc<dyn Horizon> = Arc::new(SequentialHorizon::new(vec![chrono::Duration::hours(1); 2]));
        let ramp = RampingTransmission {
            sum_var: Id::new("SumTransmission", "L1"),
            start_var: Id::new("SumTransmissionStart", "L1"),
            sum_con: Id::new("SumTransmissionEq", "L1"),
            up_con: Id::new("RampUp", "L1"),
            down_con: Id::new("RampDown", "L1"),
            first_flow: Id::new("Flow", "A"),
            second_flow: Id::new("Flow", "B"),
            cap: Arc::new(Constant(50.0)),
            horizon: h,
        };
        let mut problem = Problem::new();
        problem.add_var(ramp.first_flow.clone(), 2).unwrap();
        problem.add_var(ramp.second_flow.clone(), 2).unwrap();
        ramp.build(&mut problem).unwrap();
        ramp.setconstants(&mut problem).unwrap();
        assert_eq!(problem.num_cons(), 6);
        assert_eq!(problem.get_rhs_term(&ramp.up_con, "cap", 1).unwrap(), 50.0);
    }
}
