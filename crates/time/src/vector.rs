//! [`TimeVector`] — immutable, time-indexed numeric series with
//! weighted-average queries over arbitrary intervals.

use crate::delta::TimeDelta;
use crate::iso::get_similar_date_time;
use chrono::{Duration, NaiveDateTime};
use hydrosched_core::{HkError, HkResult};

/// An immutable time-indexed numeric series.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeVector {
    /// Every query returns the same value.
    Constant(f64),
    /// A strictly increasing index of `(time, value)` steps; the step
    /// function is extended with the first value before the first index
    /// and the last value after the last index.
    Infinite { index: Vec<NaiveDateTime>, values: Vec<f64> },
    /// Like `Infinite`, but confined to a scenario window `[start, stop)`
    /// that repeats periodically.
    Rotating {
        index: Vec<NaiveDateTime>,
        values: Vec<f64>,
        start: NaiveDateTime,
        stop: NaiveDateTime,
    },
}

impl TimeVector {
    pub fn constant(v: f64) -> Self {
        TimeVector::Constant(v)
    }

    /// Build an `Infinite` vector, failing if `index` is not strictly
    /// sorted or its length does not match `values`.
    pub fn infinite(index: Vec<NaiveDateTime>, values: Vec<f64>) -> HkResult<Self> {
        require_sorted(&index)?;
        require_equal_len(&index, &values)?;
        Ok(TimeVector::Infinite { index, values })
    }

    /// Build a `Rotating` vector, failing if `index` is not strictly
    /// sorted, its length does not match `values`, or `index` is not
    /// contained in `[start, stop]`.
    pub fn rotating(
        index: Vec<NaiveDateTime>,
        values: Vec<f64>,
        start: NaiveDateTime,
        stop: NaiveDateTime,
    ) -> HkResult<Self> {
        require_sorted(&index)?;
        require_equal_len(&index, &values)?;
        if stop <= start {
            return Err(HkError::Construction(
                "Rotating vector scenario window must have stop > start".into(),
            ));
        }
        if let (Some(first), Some(last)) = (index.first(), index.last()) {
            if *first < start || *last > stop {
                return Err(HkError::Construction(
                    "Rotating vector index must lie within [start, stop]".into(),
                ));
            }
        }
        Ok(TimeVector::Rotating {
            index,
            values,
            start,
            stop,
        })
    }

    /// The time-weighted mean of the step function over `[start, start +
    /// duration(delta)]`.
    pub fn weighted_average(&self, start: NaiveDateTime, delta: &TimeDelta) -> HkResult<f64> {
        match delta {
            TimeDelta::Fixed(d) => self.weighted_average_span(start, *d),
            TimeDelta::Units(utd) => {
                let mut total = 0.0;
                let mut total_weight = 0.0;
                for range in utd.ranges() {
                    let len_units = range.end() - range.start() + 1;
                    let seg_start = start + utd.unit() * (*range.start() as i32);
                    let seg_dur = utd.unit() * len_units as i32;
                    let weight = len_units as f64;
                    total += self.weighted_average_span(seg_start, seg_dur)? * weight;
                    total_weight += weight;
                }
                if total_weight == 0.0 {
                    return Err(HkError::EmptyQuery(
                        "UnitsTimeDelta has no unit ranges".into(),
                    ));
                }
                Ok(total / total_weight)
            }
        }
    }

    /// The last index time, if any. `Constant` has none; a `Rotating`
    /// vector's index is reported as-is (callers that need an absolute
    /// cutover point, e.g. [`Param::Prognosis`](../param), should prefer
    /// `Infinite` vectors for that role).
    pub fn last_index(&self) -> Option<NaiveDateTime> {
        match self {
            TimeVector::Constant(_) => None,
            TimeVector::Infinite { index, .. } => index.last().copied(),
            TimeVector::Rotating { index, .. } => index.last().copied(),
        }
    }

    fn weighted_average_span(&self, start: NaiveDateTime, duration: Duration) -> HkResult<f64> {
        match self {
            TimeVector::Constant(v) => Ok(*v),
            TimeVector::Infinite { index, values } => {
                if values.is_empty() {
                    return Err(HkError::EmptyQuery(
                        "Infinite vector has no values".into(),
                    ));
                }
                Ok(integrate_step_function(index, values, start, start + duration))
            }
            TimeVector::Rotating {
                index,
                values,
                start: win_start,
                stop: win_stop,
            } => {
                if values.is_empty() {
                    return Err(HkError::EmptyQuery(
                        "Rotating vector has no values".into(),
                    ));
                }
                rotating_weighted_average(index, values, *win_start, *win_stop, start, duration)
            }
        }
    }
}

fn require_sorted(index: &[NaiveDateTime]) -> HkResult<()> {
    if index.windows(2).any(|w| w[0] >= w[1]) {
        return Err(HkError::Construction(
            "invalid vector: index must be strictly sorted".into(),
        ));
    }
    Ok(())
}

fn require_equal_len(index: &[NaiveDateTime], values: &[f64]) -> HkResult<()> {
    if index.len() != values.len() {
        return Err(HkError::Construction(
            "invalid vector: index and values must have equal length".into(),
        ));
    }
    Ok(())
}

/// Time-weighted average of the piecewise-constant step function defined
/// by `(index[i], values[i])` over `[from, to)`, extending the first
/// value before `index[0]` and the last value after `index[last]`.
fn integrate_step_function(
    index: &[NaiveDateTime],
    values: &[f64],
    from: NaiveDateTime,
    to: NaiveDateTime,
) -> f64 {
    let total = to - from;
    if total <= Duration::zero() {
        return value_at(index, values, from);
    }

    let mut acc = 0.0;
    let mut cursor = from;
    while cursor < to {
        let current_value = value_at(index, values, cursor);
        let next_break = index
            .iter()
            .copied()
            .find(|t| *t > cursor)
            .unwrap_or(to);
        let seg_end = next_break.min(to);
        let w = (seg_end - cursor).num_milliseconds() as f64;
        acc += current_value * w;
        cursor = seg_end;
    }
    acc / total.num_milliseconds() as f64
}

fn value_at(index: &[NaiveDateTime], values: &[f64], at: NaiveDateTime) -> f64 {
    match index.binary_search(&at) {
        Ok(i) => values[i],
        Err(0) => values[0],
        Err(i) if i >= index.len() => values[values.len() - 1],
        Err(i) => values[i - 1],
    }
}

/// Weighted average over `[start, start+duration]` for a `Rotating`
/// vector, crossing the scenario window boundary any number of times.
fn rotating_weighted_average(
    index: &[NaiveDateTime],
    values: &[f64],
    win_start: NaiveDateTime,
    win_stop: NaiveDateTime,
    start: NaiveDateTime,
    duration: Duration,
) -> HkResult<f64> {
    if duration < Duration::zero() {
        return Err(HkError::Construction(
            "weighted_average called with negative duration".into(),
        ));
    }

    let mut remaining = duration;
    let mut cursor = get_similar_date_time(start, win_start, win_stop);
    let mut acc = 0.0;
    let total_ms = duration.num_milliseconds().max(1) as f64;

    if duration == Duration::zero() {
        return Ok(value_at(index, values, cursor));
    }

    // Bound iterations to avoid runaway loops on pathological inputs.
    for _ in 0..1_000_000 {
        if remaining <= Duration::zero() {
            break;
        }
        let window_left = win_stop - cursor;
        let take = remaining.min(window_left);
        let segment_end = cursor + take;
        let w = take.num_milliseconds() as f64;
        acc += integrate_step_function(index, values, cursor, segment_end) * w;
        remaining = remaining - take;
        cursor = if segment_end >= win_stop {
            win_start
        } else {
            segment_end
        };
    }

    Ok(acc / total_ms)
}
