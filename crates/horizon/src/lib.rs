//! # hydrosched-horizon
//!
//! The [`Horizon`] family: period-index -> `(start offset, duration)`,
//! plus the `may_shift_from`/`must_update` hint algebra that lets the
//! `update!` loop skip recomputing values it can prove are unchanged.

pub mod adaptive;
pub mod classify;
pub mod external;
pub mod sequential;
pub mod shiftable;
pub mod shortened;
pub mod shrinkable;
pub mod traits;

pub use adaptive::{AdaptiveHorizon, UnitSampler};
pub use classify::ClassifyMethod;
pub use external::ExternalHorizon;
pub use sequential::SequentialHorizon;
pub use shiftable::ShiftableHorizon;
pub use shortened::ShortenedHorizon;
pub use shrinkable::ShrinkableHorizon;
pub use traits::{Horizon, Period};
