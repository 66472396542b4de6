//! [`ModelError`] — assembly-layer errors, converting into
//! [`hydrosched_core::HkError`] at the boundary.

use hydrosched_core::HkError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("construction error: {0}")]
    Construction(String),

    #[error("unresolved elements: {0:?}")]
    UnresolvedElements(Vec<String>),

    #[error("duplicate id: {0}")]
    DuplicateId(String),

    #[error("assembly incomplete: {0}")]
    AssemblyIncomplete(String),

    #[error(transparent)]
    Solver(#[from] hydrosched_solver::SolverError),

    #[error(transparent)]
    Core(#[from] HkError),
}

pub type ModelResult<T> = Result<T, ModelError>;

impl From<ModelError> for HkError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Construction(msg) => HkError::Construction(msg),
            ModelError::UnresolvedElements(v) => HkError::UnresolvedElements(v),
            ModelError::DuplicateId(id) => HkError::DuplicateId(id),
            ModelError::AssemblyIncomplete(msg) => HkError::AssemblyIncomplete(msg),
            ModelError::Solver(e) => e.into(),
            ModelError::Core(e) => e,
        }
    }
}
