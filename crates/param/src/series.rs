//! [`MeanSeries`] / [`MeanSeriesIgnorePhasein`] and the phase-in blending
//! helper shared by every series-backed param that samples a "profile"
//! (scenario-time-indexed) time vector.

use std::sync::Arc;

use hydrosched_core::HkResult;
use hydrosched_time::{ProbTime, TimeDelta, TimeVector};

use crate::traits::Param;

/// Sample `profile` at the probtime's scenario time.
///
/// When `ignore_phasein` is `false` and `probtime` carries a full
/// phase-in triple (`scenariotime1`, `scenariotime2`, `phaseinvector`),
/// the sample is instead a blend of `profile` evaluated at each of the two
/// scenario times, weighted by the phase-in vector's own weighted average
/// over `scenariotime1..+delta` (clamped to `[0, 1]` so a phase-in vector
/// that overshoots its nominal range can't invert the blend).
pub fn profile_value(
    profile: &TimeVector,
    probtime: &ProbTime,
    delta: &TimeDelta,
    ignore_phasein: bool,
) -> HkResult<f64> {
    if ignore_phasein {
        return profile.weighted_average(probtime.scenariotime(), delta);
    }
    match (
        probtime.scenariotime1(),
        probtime.scenariotime2(),
        probtime.phaseinvector(),
    ) {
        (Some(t1), Some(t2), Some(phasein)) => {
            let weight = phasein.weighted_average(t1, delta)?.clamp(0.0, 1.0);
            let v1 = profile.weighted_average(t1, delta)?;
            let v2 = profile.weighted_average(t2, delta)?;
            Ok(v1 * (1.0 - weight) + v2 * weight)
        }
        _ => profile.weighted_average(probtime.scenariotime(), delta),
    }
}

/// `level.wavg(datatime) * profile.wavg(scenariotime)`, with the profile
/// sample phase-in-blended per [`profile_value`].
#[derive(Debug, Clone)]
pub struct MeanSeries {
    pub level: Arc<TimeVector>,
    pub profile: Arc<TimeVector>,
}

impl Param for MeanSeries {
    fn value(&self, probtime: &ProbTime, delta: &TimeDelta) -> HkResult<f64> {
        let level = self.level.weighted_average(probtime.datatime(), delta)?;
        let profile = profile_value(&self.profile, probtime, delta, false)?;
        Ok(level * profile)
    }
}

/// Like [`MeanSeries`], but never phase-in blends the profile sample —
/// used for series that are defined independently of the phase-in
/// scenario pairing (e.g. must-run schedules that don't vary between the
/// two blended scenarios).
#[derive(Debug, Clone)]
pub struct MeanSeriesIgnorePhasein {
    pub level: Arc<TimeVector>,
    pub profile: Arc<TimeVector>,
}

impl Param for MeanSeriesIgnorePhasein {
    fn value(&self, probtime: &ProbTime, delta: &TimeDelta) -> HkResult<f64> {
        let level = self.level.weighted_average(probtime.datatime(), delta)?;
        let profile = profile_value(&self.profile, probtime, delta, true)?;
        Ok(level * profile)
    }
}
