//! [`ProbTime`] — the multi-component instant parameters are evaluated
//! against.

use chrono::NaiveDateTime;
use std::sync::Arc;

use crate::vector::TimeVector;

/// A "problem time": the instant at which a [`Param`](../param) or
/// horizon `update!` is evaluated.
///
/// Every `ProbTime` carries a `datatime` (calendar time, used for level
/// data) and a `scenariotime` (within-scenario cycle time, used for
/// profile data). Extended variants add a second scenario time (for
/// phase-in blending between two simultaneous scenario streams), a
/// phase-in weight vector, and/or a prognosis data time.
#[derive(Clone, Debug)]
pub struct ProbTime {
    datatime: NaiveDateTime,
    scenariotime: NaiveDateTime,
    scenariotime1: Option<NaiveDateTime>,
    scenariotime2: Option<NaiveDateTime>,
    phaseinvector: Option<Arc<TimeVector>>,
    prognosisdatatime: Option<NaiveDateTime>,
}

impl ProbTime {
    /// A plain problem time with only `datatime`/`scenariotime` set.
    pub fn new(datatime: NaiveDateTime, scenariotime: NaiveDateTime) -> Self {
        Self {
            datatime,
            scenariotime,
            scenariotime1: None,
            scenariotime2: None,
            phaseinvector: None,
            prognosisdatatime: None,
        }
    }

    pub fn with_phasein(
        mut self,
        scenariotime1: NaiveDateTime,
        scenariotime2: NaiveDateTime,
        phaseinvector: Arc<TimeVector>,
    ) -> Self {
        self.scenariotime1 = Some(scenariotime1);
        self.scenariotime2 = Some(scenariotime2);
        self.phaseinvector = Some(phaseinvector);
        self
    }

    pub fn with_prognosis(mut self, prognosisdatatime: NaiveDateTime) -> Self {
        self.prognosisdatatime = Some(prognosisdatatime);
        self
    }

    pub fn datatime(&self) -> NaiveDateTime {
        self.datatime
    }

    pub fn scenariotime(&self) -> NaiveDateTime {
        self.scenariotime
    }

    pub fn scenariotime1(&self) -> Option<NaiveDateTime> {
        self.scenariotime1
    }

    pub fn scenariotime2(&self) -> Option<NaiveDateTime> {
        self.scenariotime2
    }

    pub fn phaseinvector(&self) -> Option<&Arc<TimeVector>> {
        self.phaseinvector.as_ref()
    }

    pub fn prognosisdatatime(&self) -> Option<NaiveDateTime> {
        self.prognosisdatatime
    }

    /// Advance both `datatime` and `scenariotime` by the same offset,
    /// keeping any phase-in/prognosis components unchanged except where
    /// the caller explicitly updates them. Used by the horizon shift-hint
    /// fast path, where successive probtimes differ by exactly one
    /// period's duration.
    pub fn advanced(&self, by: chrono::Duration) -> Self {
        Self {
            datatime: self.datatime + by,
            scenariotime: self.scenariotime + by,
            scenariotime1: self.scenariotime1.map(|t| t + by),
            scenariotime2: self.scenariotime2.map(|t| t + by),
            phaseinvector: self.phaseinvector.clone(),
            prognosisdatatime: self.prognosisdatatime.map(|t| t + by),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn dt(h: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::hours(h)
    }

    #[test]
    fn test_plain_probtime_round_trip() {
        let pt = ProbTime::new(dt(0), dt(100));
        assert_eq!(pt.datatime(), dt(0));
        assert_eq!(pt.scenariotime(), dt(100));
        assert!(pt.phaseinvector().is_none());
    }

    #[test]
    fn test_advanced_shifts_all_time_components() {
        let pt = ProbTime::new(dt(0), dt(100)).with_prognosis(dt(5));
        let next = pt.advanced(Duration::hours(1));
        assert_eq!(next.datatime(), dt(1));
        assert_eq!(next.scenariotime(), dt(101));
        assert_eq!(next.prognosisdatatime(), Some(dt(6)));
    }
}
