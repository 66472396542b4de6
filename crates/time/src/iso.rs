//! ISO-week-year helpers used to align `Rotating` vector queries across
//! scenario years without breaking weekday/week-of-year alignment.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};

/// The `DateTime` of Monday of ISO week 1 of `year`.
pub fn iso_year_start(year: i32) -> NaiveDateTime {
    NaiveDate::from_isoywd_opt(year, 1, Weekday::Mon)
        .expect("ISO week 1 always exists")
        .and_hms_opt(0, 0, 0)
        .expect("midnight always exists")
}

/// Shift `t` so that its ISO week-year becomes `target_year`, preserving
/// ISO week number, weekday and time-of-day.
pub fn shift_to_iso_year(t: NaiveDateTime, target_year: i32) -> NaiveDateTime {
    let source_year = t.iso_week().year();
    let offset = iso_year_start(target_year) - iso_year_start(source_year);
    t + offset
}

/// Map `t` into the half-open scenario window `[start, stop)`.
///
/// First tries year-preserving ISO shifts (so that a multi-year window
/// keeps weekday/week-of-year alignment across the wrap); if no nearby
/// ISO-year shift lands inside the window (e.g. the window is much
/// shorter than a year), falls back to wrapping by whole window lengths,
/// which is exact for sub-year windows.
pub fn get_similar_date_time(t: NaiveDateTime, start: NaiveDateTime, stop: NaiveDateTime) -> NaiveDateTime {
    debug_assert!(start < stop);

    let base_year = t.iso_week().year();
    for delta in 0..=8 {
        for year in [base_year + delta, base_year - delta] {
            let shifted = shift_to_iso_year(t, year);
            if shifted >= start && shifted < stop {
                return shifted;
            }
        }
        if delta == 0 {
            continue;
        }
    }

    // Fallback: wrap by whole window lengths.
    let window = stop - start;
    if window <= Duration::zero() {
        return start;
    }
    let mut shifted = t;
    while shifted < start {
        shifted = shifted + window;
    }
    while shifted >= stop {
        shifted = shifted - window;
    }
    shifted
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_iso_year_start_is_monday() {
        let start = iso_year_start(2024);
        assert_eq!(start.weekday(), Weekday::Mon);
    }

    #[test]
    fn test_sub_year_window_wraps_by_duration() {
        let start = dt(2020, 1, 1, 0);
        let stop = start + Duration::hours(3);
        let t = start + Duration::hours(3);
        let mapped = get_similar_date_time(t, start, stop);
        assert_eq!(mapped, start);
    }

    #[test]
    fn test_within_window_is_identity() {
        let start = dt(2020, 1, 1, 0);
        let stop = start + Duration::hours(3);
        let t = start + Duration::hours(1);
        assert_eq!(get_similar_date_time(t, start, stop), t);
    }
}
