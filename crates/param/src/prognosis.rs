//! [`Prognosis`] and [`UMMSeries`] — confidence-weighted and
//! availability-driven blends between two data-time-indexed series.

use std::sync::Arc;

use chrono::{Duration, NaiveDateTime};
use hydrosched_core::HkResult;
use hydrosched_time::{ProbTime, TimeDelta, TimeVector};

use crate::series::profile_value;
use crate::traits::Param;

/// Blend `first` (sampled at datatime, valid only up to `cutover`) into
/// `second` (sampled at scenariotime, phase-in blended) across a query
/// window that straddles `cutover`, weighting each side by the fraction of
/// the window it covers.
fn split_at_cutover(
    first: &TimeVector,
    second: &TimeVector,
    start: NaiveDateTime,
    delta: &TimeDelta,
    cutover: NaiveDateTime,
    probtime: &ProbTime,
) -> HkResult<f64> {
    let total = delta.duration();
    let first_len = (cutover - start).clamp(Duration::zero(), total);
    let second_len = total - first_len;

    if second_len <= Duration::zero() {
        return first.weighted_average(start, &TimeDelta::Fixed(total));
    }
    if first_len <= Duration::zero() {
        return profile_value(second, probtime, delta, false);
    }

    let first_part = first.weighted_average(start, &TimeDelta::Fixed(first_len))?;
    let second_part = second.weighted_average(start + first_len, &TimeDelta::Fixed(second_len))?;
    let w1 = first_len.num_milliseconds() as f64;
    let w2 = second_len.num_milliseconds() as f64;
    Ok((first_part * w1 + second_part * w2) / (w1 + w2))
}

/// `level * blended`, where `blended` mixes `profile` (the default,
/// scenario-time series) with `prognosis` (a datatime-indexed forecast)
/// according to `confidence` (itself a [`Param`], typically a ramp that
/// reaches `1.0` as the forecast horizon approaches):
///
/// - `confidence == 0` or the query starts after `prognosis`'s last index:
///   pure `profile`.
/// - `confidence == 1` and the query fits entirely inside the prognosis
///   window: pure `prognosis`, sampled at datatime.
/// - otherwise: `profile*(1-c) + prognosis*c`, with `prognosis` itself
///   falling back to a `profile` tail beyond its last index.
#[derive(Debug, Clone)]
pub struct Prognosis {
    pub level: Arc<TimeVector>,
    pub profile: Arc<TimeVector>,
    pub prognosis: Arc<TimeVector>,
    pub confidence: Arc<dyn Param>,
}

impl Param for Prognosis {
    fn value(&self, probtime: &ProbTime, delta: &TimeDelta) -> HkResult<f64> {
        let datatime = probtime.datatime();
        let level = self.level.weighted_average(datatime, delta)?;
        let c = self.confidence.value(probtime, delta)?.clamp(0.0, 1.0);
        let last = self.prognosis.last_index();
        let beyond = last.map_or(false, |l| datatime > l);
        let fits = last.map_or(true, |l| datatime + delta.duration() <= l);

        let blended = if c == 0.0 || beyond {
            profile_value(&self.profile, probtime, delta, false)?
        } else if c == 1.0 && fits {
            self.prognosis.weighted_average(datatime, delta)?
        } else {
            let profile_v = profile_value(&self.profile, probtime, delta, false)?;
            let prog_v = if fits {
                self.prognosis.weighted_average(datatime, delta)?
            } else {
                split_at_cutover(
                    &self.prognosis,
                    &self.profile,
                    datatime,
                    delta,
                    last.expect("fits is false only when last is Some"),
                    probtime,
                )?
            };
            profile_v * (1.0 - c) + prog_v * c
        };
        Ok(level * blended)
    }
}

/// `level * blended`, where `blended` is `umm_profile` (a datatime-indexed
/// unplanned-unavailability schedule) while the query precedes its last
/// index, and falls over to `profile` (scenariotime, phase-in blended)
/// beyond it — unlike [`Prognosis`] there is no confidence weighting, just
/// a hard cutover, since an unavailability schedule is either known or
/// not.
#[derive(Debug, Clone)]
pub struct UMMSeries {
    pub level: Arc<TimeVector>,
    pub umm_profile: Arc<TimeVector>,
    pub profile: Arc<TimeVector>,
}

impl Param for UMMSeries {
    fn value(&self, probtime: &ProbTime, delta: &TimeDelta) -> HkResult<f64> {
        let datatime = probtime.datatime();
        let level = self.level.weighted_average(datatime, delta)?;
        let last = self.umm_profile.last_index();
        let fits = last.map_or(true, |l| datatime + delta.duration() <= l);
        let beyond = last.map_or(false, |l| datatime > l);

        let blended = if beyond {
            profile_value(&self.profile, probtime, delta, false)?
        } else if fits {
            self.umm_profile.weighted_average(datatime, delta)?
        } else {
            split_at_cutover(
                &self.umm_profile,
                &self.profile,
                datatime,
                delta,
                last.expect("fits is false only when last is Some"),
                probtime,
            )?
        };
        Ok(level * blended)
    }
}
