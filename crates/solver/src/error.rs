//! [`SolverError`] — the solver crate's local error enum, converting into
//! [`hydrosched_core::HkError`] at the boundary the way
//! `gat_solver_common::SolverError` is folded into `GatError` higher up.

use hydrosched_core::{HkError, Id};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("duplicate id: {0}")]
    DuplicateId(Id),

    #[error("out of range: {0}")]
    OutOfRange(String),

    #[error("no solution available")]
    NoSolutionAvailable,

    #[error("solver error / infeasible: {0}")]
    InfeasibleOrSolverError(String),

    #[error("construction error: {0}")]
    Construction(String),
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<SolverError> for HkError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::DuplicateId(id) => HkError::DuplicateId(id.to_string()),
            SolverError::OutOfRange(msg) => HkError::OutOfRange(msg),
            SolverError::NoSolutionAvailable => HkError::NoSolution,
            SolverError::InfeasibleOrSolverError(msg) => HkError::SolverFailure(msg),
            SolverError::Construction(msg) => HkError::Construction(msg),
        }
    }
}
