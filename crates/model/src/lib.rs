//! Compositional LP modeling kernel: balances, flows, storages and the
//! shared traits (ramping, soft bounds, start-up cost) that sit on top
//! of [`hydrosched_solver::Problem`].

pub mod arrow;
pub mod assembly;
pub mod balance;
pub mod boundary;
pub mod cost;
pub mod error;
pub mod flow;
pub mod registry;
pub mod storage;
pub mod support;
pub mod traits;

pub use arrow::{Arrow, Direction};
pub use assembly::{Assembly, Object};
pub use balance::{Balance, RhsTerm};
pub use error::{ModelError, ModelResult};
pub use flow::Flow;
pub use storage::Storage;
