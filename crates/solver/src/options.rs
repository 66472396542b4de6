//! [`SolverOptions`] — solver tunables (spec §6), mutated via
//! `set_param(name, value)` the way `gat_algo::opf::traits::SolverConfig`
//! is mutated, but with unknown names rejected rather than silently
//! ignored (an explicit Open Question resolution, see DESIGN.md).

use crate::error::{SolverError, SolverResult};

#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SolverKind {
    Simplex,
    Ipm,
}

#[derive(Debug, Clone)]
pub struct SolverOptions {
    pub simplex_scale_strategy: i32,
    pub simplex_strategy: i32,
    pub time_limit: Option<f64>,
    pub simplex_max_concurrency: i32,
    pub solver: SolverKind,
    pub run_crossover: bool,
    pub warmstart: bool,
    pub silent: bool,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            simplex_scale_strategy: 2,
            simplex_strategy: 1,
            time_limit: None,
            simplex_max_concurrency: 1,
            solver: SolverKind::Simplex,
            run_crossover: true,
            warmstart: true,
            silent: false,
        }
    }
}

impl SolverOptions {
    /// Recognizes exactly the tunables of spec §6; any other name fails
    /// rather than being silently accepted.
    pub fn set_param(&mut self, name: &str, value: ParamValue) -> SolverResult<()> {
        match (name, value) {
            ("simplex-scale-strategy", ParamValue::Int(v)) if (1..=5).contains(&v) => {
                self.simplex_scale_strategy = v as i32;
            }
            ("simplex-strategy", ParamValue::Int(v)) if (1..=4).contains(&v) => {
                self.simplex_strategy = v as i32;
            }
            ("time-limit", ParamValue::Float(v)) => self.time_limit = Some(v),
            ("simplex-max-concurrency", ParamValue::Int(v)) => self.simplex_max_concurrency = v as i32,
            ("solver", ParamValue::Str(v)) if v == "simplex" => self.solver = SolverKind::Simplex,
            ("solver", ParamValue::Str(v)) if v == "ipm" => self.solver = SolverKind::Ipm,
            ("run-crossover", ParamValue::Str(v)) if v == "on" => self.run_crossover = true,
            ("run-crossover", ParamValue::Str(v)) if v == "off" => self.run_crossover = false,
            ("warmstart", ParamValue::Bool(v)) => self.warmstart = v,
            (name, value) => {
                return Err(SolverError::Construction(format!(
                    "unrecognized solver param {name:?} = {value:?}"
                )))
            }
        }
        Ok(())
    }

    pub fn set_silent(&mut self) {
        self.silent = true;
    }

    pub fn set_unsilent(&mut self) {
        self.silent = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = SolverOptions::default();
        assert_eq!(opts.solver, SolverKind::Simplex);
        assert!(opts.warmstart);
    }

    #[test]
    fn test_set_known_param() {
        let mut opts = SolverOptions::default();
        opts.set_param("time-limit", ParamValue::Float(30.0)).unwrap();
        assert_eq!(opts.time_limit, Some(30.0));
    }

    #[test]
    fn test_unknown_param_rejected() {
        let mut opts = SolverOptions::default();
        let err = opts.set_param("bogus", ParamValue::Bool(true)).unwrap_err();
        assert!(matches!(err, SolverError::Construction(_)));
    }

    #[test]
    fn test_out_of_range_scale_strategy_rejected() {
        let mut opts = SolverOptions::default();
        let err = opts
            .set_param("simplex-scale-strategy", ParamValue::Int(9))
            .unwrap_err();
        assert!(matches!(err, SolverError::Construction(_)));
    }
}
