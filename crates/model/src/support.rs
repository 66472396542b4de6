//! Small helpers shared by every main object's `update!` loop, so each
//! one follows spec §4.4's two-pass pseudocode (shift pass, then
//! recompute pass) without repeating the period-walking boilerplate.

use hydrosched_horizon::{Horizon, Period};

/// `(from, to)` pairs where period `to`'s value can be copied from the
/// LP's currently-stored value at period `from`, per
/// `horizon.may_shift_from`.
pub fn shift_pairs(horizon: &dyn Horizon) -> Vec<(Period, Period)> {
    (1..=horizon.num_periods())
        .filter_map(|t| {
            let (from, ok) = horizon.may_shift_from(t);
            if ok {
                from.filter(|&tp| tp != t).map(|tp| (tp, t))
            } else {
                None
            }
        })
        .collect()
}

/// Periods that must be recomputed this cycle: either the horizon says
/// so, or the parameter being written is stateful (stateful params
/// bypass the shift pass and always recompute, spec §4.4).
pub fn recompute_periods(horizon: &dyn Horizon, force_every_period: bool) -> Vec<Period> {
    (1..=horizon.num_periods())
        .filter(|&t| force_every_period || horizon.must_update(t))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydrosched_horizon::SequentialHorizon;

    #[test]
    fn test_recompute_periods_default_horizon_is_everything() {
        let h = SequentialHorizon::new(vec![chrono::Duration::hours(1); 3]);
        assert_eq!(recompute_periods(&h, false), vec![1, 2, 3]);
    }
}
