//! # hydrosched-solver
//!
//! The LP facade (spec §4.5): register variables/constraints under an
//! [`hydrosched_core::Id`], write through differential buffers,
//! `solve!()` against a HiGHS-primary/reference-fallback cascade, read
//! back values and duals.

pub mod backend;
pub mod buffer;
pub mod cascade;
pub mod error;
pub mod options;
pub mod problem;
pub mod registry;

pub use buffer::{DiffBuffer, MatrixBuffer, RhsBuffer};
pub use cascade::Solution;
pub use error::{SolverError, SolverResult};
pub use options::{ParamValue, SolverKind, SolverOptions};
pub use problem::{ConKind, Problem};
pub use registry::Registry;
