//! [`AdaptiveHorizon`] — macro periods subdivided into data-classified
//! blocks.

use chrono::{Duration, NaiveDateTime};
use hydrosched_core::{HkError, HkResult};
use hydrosched_time::{TimeDelta, UnitsTimeDelta};

use crate::classify::{labels_to_ranges, ClassifyMethod};
use crate::traits::{Horizon, Period};

/// A sample source for a macro period's unit grid — typically a closure
/// reading a [`hydrosched_time::TimeVector`] or an exogenous price/RHS
/// term at each unit boundary.
pub trait UnitSampler: Send + Sync {
    fn sample(&self, at: NaiveDateTime) -> HkResult<f64>;
}

impl<F> UnitSampler for F
where
    F: Fn(NaiveDateTime) -> HkResult<f64> + Send + Sync,
{
    fn sample(&self, at: NaiveDateTime) -> HkResult<f64> {
        self(at)
    }
}

#[derive(Debug, Clone)]
pub struct AdaptiveHorizon {
    macro_durations: Vec<Duration>,
    num_block: usize,
    unit_duration: Duration,
    method: ClassifyMethod,
    offset: Duration,
    blocks: Vec<UnitsTimeDelta>,
}

impl AdaptiveHorizon {
    /// Construct with every macro period's blocks placed (for now) as a
    /// single range covering the whole macro, pending the first
    /// `update!` call that actually classifies them.
    pub fn build(
        macro_durations: Vec<Duration>,
        num_block: usize,
        unit_duration: Duration,
        method: ClassifyMethod,
        offset: Duration,
    ) -> HkResult<Self> {
        if num_block == 0 {
            return Err(HkError::Construction(
                "AdaptiveHorizon requires num_block > 0".into(),
            ));
        }
        if unit_duration <= Duration::zero() {
            return Err(HkError::Construction(
                "AdaptiveHorizon requires unit_duration > 0".into(),
            ));
        }
        let mut blocks = Vec::with_capacity(macro_durations.len() * num_block);
        for macro_duration in &macro_durations {
            let num_units = units_in(*macro_duration, unit_duration)?;
            blocks.push(UnitsTimeDelta::new(unit_duration, vec![0..=num_units - 1])?);
            for _ in 1..num_block {
                blocks.push(UnitsTimeDelta::new(unit_duration, vec![])?);
            }
        }
        Ok(Self {
            macro_durations,
            num_block,
            unit_duration,
            method,
            offset,
            blocks,
        })
    }

    /// Re-classify every macro period's unit grid by sampling `sampler`
    /// once per unit and partitioning with `self.method`.
    pub fn update(&mut self, base: NaiveDateTime, sampler: &dyn UnitSampler) -> HkResult<()> {
        let mut macro_start = self.offset;
        for (m, macro_duration) in self.macro_durations.clone().iter().enumerate() {
            let num_units = units_in(*macro_duration, self.unit_duration)? as usize;
            let mut x = Vec::with_capacity(num_units);
            for u in 0..num_units {
                let at = base + macro_start + self.unit_duration * u as i32;
                x.push(sampler.sample(at)?);
            }
            let labels = self.method.classify(&x, self.num_block);
            let ranges = labels_to_ranges(&labels, self.num_block);
            for (k, block_ranges) in ranges.into_iter().enumerate() {
                let idx = m * self.num_block + k;
                self.blocks[idx] = UnitsTimeDelta::new(self.unit_duration, block_ranges)?;
            }
            macro_start = macro_start + *macro_duration;
        }
        Ok(())
    }

    pub fn macro_of(&self, t: Period) -> usize {
        (t - 1) / self.num_block
    }
}

fn units_in(macro_duration: Duration, unit_duration: Duration) -> HkResult<u32> {
    let total_ms = macro_duration.num_milliseconds();
    let unit_ms = unit_duration.num_milliseconds();
    if unit_ms <= 0 || total_ms % unit_ms != 0 {
        return Err(HkError::Construction(
            "macro duration is not an exact multiple of the unit duration".into(),
        ));
    }
    Ok((total_ms / unit_ms) as u32)
}

impl Horizon for AdaptiveHorizon {
    fn num_periods(&self) -> Period {
        self.macro_durations.len() * self.num_block
    }

    fn start_duration(&self, t: Period) -> Duration {
        let m = self.macro_of(t);
        let macro_start = self.offset
            + self.macro_durations[..m]
                .iter()
                .fold(Duration::zero(), |acc, d| acc + *d);
        let k0 = m * self.num_block;
        let preceding: Duration = self.blocks[k0..t - 1]
            .iter()
            .fold(Duration::zero(), |acc, utd| acc + utd.duration());
        macro_start + preceding
    }

    fn time_delta(&self, t: Period) -> TimeDelta {
        TimeDelta::Units(self.blocks[t - 1].clone())
    }

    fn is_adaptive(&self) -> bool {
        true
    }

    fn has_constant_durations(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn base() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    struct ConstZero;
    impl UnitSampler for ConstZero {
        fn sample(&self, _at: NaiveDateTime) -> HkResult<f64> {
            Ok(0.0)
        }
    }

    #[test]
    fn test_build_default_single_range_per_macro() {
        let h = AdaptiveHorizon::build(
            vec![Duration::hours(168)],
            2,
            Duration::hours(1),
            ClassifyMethod::KMeans,
            Duration::zero(),
        )
        .unwrap();
        assert_eq!(h.num_periods(), 2);
    }

    /// Boundary scenario S3.
    #[test]
    fn test_update_classifies_degenerate_input_into_even_blocks() {
        let mut h = AdaptiveHorizon::build(
            vec![Duration::hours(168)],
            2,
            Duration::hours(1),
            ClassifyMethod::KMeans,
            Duration::zero(),
        )
        .unwrap();
        h.update(base(), &ConstZero).unwrap();
        let d0 = h.time_delta(1).duration();
        let d1 = h.time_delta(2).duration();
        assert_eq!(d0, Duration::hours(84));
        assert_eq!(d1, Duration::hours(84));
        assert_eq!(d0 + d1, Duration::hours(168));
    }

    #[test]
    fn test_non_dividing_unit_duration_rejected() {
        let err = AdaptiveHorizon::build(
            vec![Duration::hours(100)],
            2,
            Duration::hours(3),
            ClassifyMethod::KMeans,
            Duration::zero(),
        )
        .unwrap_err();
        assert!(matches!(err, HkError::Construction(_)));
    }
}
