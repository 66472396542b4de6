//! The [`Horizon`] object-safe trait and the shift/update hint algebra.
//!
//! Object-safe and dispatched through `Arc<dyn Horizon>`, the same
//! strategy-pattern shape used by [`hydrosched_param::Param`] and
//! grounded in the same `gat_algo::opf::traits` template. Unlike `Param`,
//! `Horizon` doesn't need solver access to answer its own questions — the
//! `build!`/`setconstants!`/`update!` orchestration that writes into the LP
//! lives in the `model`/`solver` crates and calls back into these methods.

use chrono::{Duration, NaiveDateTime};
use hydrosched_core::{HkError, HkResult};
use hydrosched_time::TimeDelta;

/// A period index into a horizon. Periods are 1-indexed, matching the
/// spec's `t ∈ 1..T` convention.
pub type Period = usize;

pub trait Horizon: std::fmt::Debug + Send + Sync {
    /// Total number of periods, `T`.
    fn num_periods(&self) -> Period;

    /// Total duration summed over all periods.
    fn duration(&self) -> Duration {
        (1..=self.num_periods())
            .map(|t| self.time_delta(t).duration())
            .fold(Duration::zero(), |acc, d| acc + d)
    }

    /// Accumulated duration of all periods strictly before `t`.
    fn start_duration(&self, t: Period) -> Duration;

    /// The duration of period `t`, as a [`TimeDelta`].
    fn time_delta(&self, t: Period) -> TimeDelta;

    /// Calendar start time of period `t`, given the horizon's base time.
    fn start_time(&self, t: Period, base: NaiveDateTime) -> NaiveDateTime {
        base + self.start_duration(t)
    }

    /// The first period whose end exactly matches accumulated duration
    /// `target`. Fails with [`HkError::NoAlignment`] if no period boundary
    /// matches exactly.
    fn end_period_from_duration(&self, target: Duration) -> HkResult<Period> {
        let mut acc = Duration::zero();
        for t in 1..=self.num_periods() {
            acc = acc + self.time_delta(t).duration();
            if acc == target {
                return Ok(t);
            }
            if acc > target {
                break;
            }
        }
        Err(HkError::NoAlignment(format!(
            "no period boundary matches duration {target}"
        )))
    }

    /// Durations of every period, in order. Used by the default
    /// [`Horizon::get_subperiods`] alignment walk.
    fn block_durations(&self) -> Vec<Duration> {
        (1..=self.num_periods()).map(|t| self.time_delta(t).duration()).collect()
    }

    /// Map period `t` of `self` (the coarse horizon) onto a contiguous
    /// period range of `fine`. When both horizons share identical block
    /// durations, this is the identity `(t, t)`. Otherwise the two block
    /// lists are walked together, requiring that `t`'s boundaries land
    /// exactly on boundaries of `fine`; a boundary mismatch fails with
    /// [`HkError::NoAlignment`].
    fn get_subperiods(&self, fine: &dyn Horizon, t: Period) -> HkResult<(Period, Period)> {
        let coarse_durs = self.block_durations();
        let fine_durs = fine.block_durations();
        if coarse_durs == fine_durs {
            return Ok((t, t));
        }
        align_subperiods(&coarse_durs, &fine_durs, t)
    }

    /// True for [`crate::AdaptiveHorizon`] and any wrapper over one.
    fn is_adaptive(&self) -> bool {
        false
    }

    /// True when every period's duration is fixed across `update!` calls
    /// (so `setconstants!` can cache period-independent coefficients).
    fn has_constant_durations(&self) -> bool {
        false
    }

    /// If `ok`, the value the caller would compute for period `t` is
    /// provably equal to the value already stored in the LP for period
    /// `t'`. Generic fallback: `(None, false)` — no wrapper claims a shift.
    fn may_shift_from(&self, t: Period) -> (Option<Period>, bool) {
        let _ = t;
        (None, false)
    }

    /// If false, period `t`'s value can be reused as-is (after applying
    /// any shift from `may_shift_from`). Generic fallback: always `true`.
    fn must_update(&self, t: Period) -> bool {
        let _ = t;
        true
    }
}

/// Walk two block-duration lists, finding the exact `fine`-index range
/// that period `t` of `coarse_durs` maps onto.
fn align_subperiods(
    coarse_durs: &[Duration],
    fine_durs: &[Duration],
    t: Period,
) -> HkResult<(Period, Period)> {
    if t == 0 || t > coarse_durs.len() {
        return Err(HkError::OutOfRange(format!("period {t} out of range")));
    }
    let coarse_start: Duration = coarse_durs[..t - 1].iter().fold(Duration::zero(), |a, d| a + *d);
    let coarse_end = coarse_start + coarse_durs[t - 1];

    let find_boundary = |target: Duration| -> HkResult<Period> {
        let mut acc = Duration::zero();
        for (i, d) in fine_durs.iter().enumerate() {
            if acc == target {
                return Ok(i + 1);
            }
            acc = acc + *d;
        }
        if acc == target {
            return Ok(fine_durs.len() + 1);
        }
        Err(HkError::NoAlignment(
            "fine horizon boundaries are not divisible by the coarse period".into(),
        ))
    };

    let start_idx = find_boundary(coarse_start)?;
    let end_boundary_idx = find_boundary(coarse_end)?;
    if end_boundary_idx <= start_idx {
        return Err(HkError::NoAlignment(
            "fine horizon boundaries are not divisible by the coarse period".into(),
        ));
    }
    Ok((start_idx, end_boundary_idx - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_subperiods_exact_match() {
        let h = Duration::hours(1);
        let coarse = vec![h * 3, h * 3];
        let fine = vec![h, h, h, h, h, h];
        assert_eq!(align_subperiods(&coarse, &fine, 1).unwrap(), (1, 3));
        assert_eq!(align_subperiods(&coarse, &fine, 2).unwrap(), (4, 6));
    }

    #[test]
    fn test_align_subperiods_fails_on_misaligned_boundary() {
        let h = Duration::hours(1);
        let coarse = vec![h * 3];
        let fine = vec![h * 2, h * 2];
        let err = align_subperiods(&coarse, &fine, 1).unwrap_err();
        assert!(matches!(err, HkError::NoAlignment(_)));
    }
}
