//! The [`Param`] object-safe trait and its capability flags.
//!
//! Grounded in the same strategy-pattern shape as
//! `gat_algo::opf::traits::OpfFormulation`: a small object-safe trait with
//! defaulted query methods, dispatched through `Arc<dyn Param>` rather than
//! an enum, so that new combinators can be added (by other crates, or by
//! tests) without touching this one.

use std::fmt::Debug;

use hydrosched_core::HkResult;
use hydrosched_time::{ProbTime, TimeDelta};

/// A parameter expression: a value computable at a [`ProbTime`] over a
/// [`TimeDelta`], plus compositional capability flags that the horizon and
/// solver layers use to skip unnecessary recomputation.
///
/// The five flags bubble upward compositionally — a two-product is
/// constant iff both children are, durational iff either child is, and so
/// on. Each combinator documents its own propagation rule.
pub trait Param: Debug + Send + Sync {
    /// Evaluate the parameter over `[probtime, probtime + delta)`.
    fn value(&self, probtime: &ProbTime, delta: &TimeDelta) -> HkResult<f64>;

    /// True if `value` returns the same number regardless of `probtime`
    /// (though it may still depend on `delta`, e.g. [`HourProduct`]).
    fn is_constant(&self) -> bool {
        false
    }

    /// True if the param is the constant `1.0`.
    fn is_one(&self) -> bool {
        false
    }

    /// True if the param is the constant `0.0`.
    fn is_zero(&self) -> bool {
        false
    }

    /// True if `value` scales with `delta`'s length (e.g. an hour-product
    /// or an m3/s-to-Mm3 conversion). Durational params cannot be held
    /// constant across a horizon shift that changes block length.
    fn is_durational(&self) -> bool {
        false
    }

    /// True if the param carries state across evaluations (observed order
    /// matters, or it must be recomputed on every `update!`).
    fn is_stateful(&self) -> bool {
        false
    }

    /// If this param is itself a [`FlipSign`](crate::flip_sign::FlipSign),
    /// its inner child. Used only by `FlipSign::new` to implement the
    /// `FlipSign(FlipSign(p)) == p` constructor-level simplification.
    fn as_flip_sign_inner(&self) -> Option<&std::sync::Arc<dyn Param>> {
        None
    }
}
