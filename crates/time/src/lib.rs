//! # hydrosched-time
//!
//! Immutable time-indexed series ([`TimeVector`]), durations
//! ([`TimeDelta`], [`UnitsTimeDelta`]), and the multi-component instant
//! they are evaluated against ([`ProbTime`]).

pub mod delta;
pub mod iso;
pub mod probtime;
pub mod vector;

pub use delta::{TimeDelta, UnitsTimeDelta};
pub use probtime::ProbTime;
pub use vector::TimeVector;
