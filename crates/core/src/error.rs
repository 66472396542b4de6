//! Unified error type for the scheduling kernel.
//!
//! Every crate in the workspace funnels its failures through [`HkError`] at
//! the boundary where a caller (assembly, the solver façade, a test) needs
//! one error type to match on. Crate-local error enums still exist where a
//! module wants a narrower match (e.g. `param::ParamError`); they convert
//! into `HkError` via `#[from]`, the same layering `gat-core::GatError`
//! used for I/O/parse/solver errors.

use thiserror::Error;

/// Unified error type for all kernel operations.
#[derive(Error, Debug)]
pub enum HkError {
    /// Malformed time vector, non-positive duration/period count, or any
    /// other constructor-time validation failure (spec §7 "construction
    /// error").
    #[error("construction error: {0}")]
    Construction(String),

    /// The element-resolution fixpoint finished with elements still
    /// pending dependencies (spec §7 "unresolved element").
    #[error("unresolved elements: {0:?}")]
    UnresolvedElements(Vec<String>),

    /// The same variable or constraint `Id` was declared twice.
    #[error("duplicate id: {0}")]
    DuplicateId(String),

    /// A top-level object's `assemble!` returned `false` after every
    /// dependency retry was exhausted.
    #[error("assembly incomplete: {0}")]
    AssemblyIncomplete(String),

    /// Evaluating a loss-inverse parameter where `1 - loss == 0`.
    #[error("division by zero evaluating {0}")]
    DivisionByZero(String),

    /// A caller indexed a variable or constraint outside `1..=num_periods`.
    #[error("out of range: {0}")]
    OutOfRange(String),

    /// The solve cascade exhausted every fallback without reaching an
    /// optimal status.
    #[error("solver error or infeasible: {0}")]
    SolverFailure(String),

    /// A solution was read before any successful `solve!`.
    #[error("no solution available")]
    NoSolution,

    /// A time-vector or parameter query had no value to return (e.g. an
    /// `Infinite` vector with zero entries queried over a zero-length
    /// interval).
    #[error("empty query: {0}")]
    EmptyQuery(String),

    /// A horizon's `end_period_from_duration` / subperiod alignment could
    /// not find an exact match (spec §4.2, kept strict per §9).
    #[error("no alignment: {0}")]
    NoAlignment(String),

    /// Generic wrapper for errors raised below the kernel (I/O, etc.).
    #[error("{0}")]
    Other(String),
}

/// Convenience alias for `Result<T, HkError>`.
pub type HkResult<T> = Result<T, HkError>;

impl From<String> for HkError {
    fn from(s: String) -> Self {
        HkError::Other(s)
    }
}

impl From<&str> for HkError {
    fn from(s: &str) -> Self {
        HkError::Other(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HkError::SolverFailure("cascade exhausted".into());
        assert!(err.to_string().contains("solver error or infeasible"));
        assert!(err.to_string().contains("cascade exhausted"));
    }

    #[test]
    fn test_result_type_alias() {
        fn example_fn() -> HkResult<i32> {
            Ok(42)
        }
        assert_eq!(example_fn().unwrap(), 42);
    }

    #[test]
    fn test_question_mark_operator() {
        fn inner() -> HkResult<()> {
            Err(HkError::Construction("bad duration".into()))
        }

        fn outer() -> HkResult<()> {
            inner()?;
            Ok(())
        }

        assert!(outer().is_err());
    }

    #[test]
    fn test_no_solution_variant() {
        let err = HkError::NoSolution;
        assert_eq!(err.to_string(), "no solution available");
    }
}
