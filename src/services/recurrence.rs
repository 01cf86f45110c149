use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate};

use crate::domain::errors::{SchedulingError, SchedulingResult};
use crate::services::calendar::TimeInterval;

/// A recurring series may span at most a year
pub const MAX_SERIES_DAYS: i64 = 366;

/// Expand a recurring booking request into concrete occurrences: one
/// interval per date from the base date through `until` inclusive whose
/// weekday (0 = Monday) is selected, each keeping the base's UTC
/// time-of-day and duration.
pub fn expand_recurrence(
    base: &TimeInterval,
    weekdays: &[u8],
    until: NaiveDate,
) -> SchedulingResult<Vec<TimeInterval>> {
    if weekdays.is_empty() {
        return Err(SchedulingError::Validation(
            "weekdays must not be empty".to_string(),
        ));
    }
    let selected: BTreeSet<u8> = weekdays.iter().copied().collect();
    if let Some(invalid) = selected.iter().find(|d| **d > 6) {
        return Err(SchedulingError::Validation(format!(
            "invalid weekday {} (expected 0-6, 0 = Monday)",
            invalid
        )));
    }

    let first = base.start.date_naive();
    if until < first {
        return Err(SchedulingError::Validation(format!(
            "until {} falls before the first occurrence {}",
            until, first
        )));
    }
    if (until - first).num_days() > MAX_SERIES_DAYS {
        return Err(SchedulingError::Validation(format!(
            "recurring series may span at most {} days",
            MAX_SERIES_DAYS
        )));
    }

    let duration = base.end - base.start;
    if duration >= Duration::days(1) {
        // occurrences on consecutive days would overlap each other
        return Err(SchedulingError::Validation(
            "recurring occurrences must be shorter than a day".to_string(),
        ));
    }

    let time_of_day = base.start.time();
    let mut occurrences = Vec::new();
    let mut date = first;
    while date <= until {
        if selected.contains(&(date.weekday().num_days_from_monday() as u8)) {
            let start = date.and_time(time_of_day).and_utc();
            occurrences.push(TimeInterval::new(start, start + duration)?);
        }
        date += Duration::days(1);
    }

    Ok(occurrences)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::calendar::parse_datetime;

    fn base(start: &str, end: &str) -> TimeInterval {
        TimeInterval::new(parse_datetime(start).unwrap(), parse_datetime(end).unwrap()).unwrap()
    }

    #[test]
    fn test_expands_selected_weekdays_only() {
        // 2026-03-02 is a Monday; Mon/Wed for two weeks
        let occurrences = expand_recurrence(
            &base("2026-03-02T09:00:00Z", "2026-03-02T09:30:00Z"),
            &[0, 2],
            NaiveDate::from_ymd_opt(2026, 3, 13).unwrap(),
        )
        .unwrap();

        let starts: Vec<String> = occurrences
            .iter()
            .map(|o| o.start.to_rfc3339())
            .collect();
        assert_eq!(
            starts,
            vec![
                "2026-03-02T09:00:00+00:00",
                "2026-03-04T09:00:00+00:00",
                "2026-03-09T09:00:00+00:00",
                "2026-03-11T09:00:00+00:00",
            ]
        );
    }

    #[test]
    fn test_base_date_excluded_when_weekday_not_selected() {
        // Base falls on Monday but only Wednesday is selected
        let occurrences = expand_recurrence(
            &base("2026-03-02T09:00:00Z", "2026-03-02T09:30:00Z"),
            &[2],
            NaiveDate::from_ymd_opt(2026, 3, 8).unwrap(),
        )
        .unwrap();

        assert_eq!(occurrences.len(), 1);
        assert_eq!(occurrences[0].start.to_rfc3339(), "2026-03-04T09:00:00+00:00");
    }

    #[test]
    fn test_occurrences_keep_duration() {
        let occurrences = expand_recurrence(
            &base("2026-03-02T10:00:00Z", "2026-03-02T11:15:00Z"),
            &[0],
            NaiveDate::from_ymd_opt(2026, 3, 16).unwrap(),
        )
        .unwrap();

        assert_eq!(occurrences.len(), 3);
        for occurrence in &occurrences {
            assert_eq!(occurrence.duration_minutes(), 75);
        }
    }

    #[test]
    fn test_rejects_empty_and_invalid_weekdays() {
        let interval = base("2026-03-02T09:00:00Z", "2026-03-02T09:30:00Z");
        let until = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();

        assert!(expand_recurrence(&interval, &[], until).is_err());
        assert!(expand_recurrence(&interval, &[7], until).is_err());
    }

    #[test]
    fn test_rejects_until_before_base() {
        let interval = base("2026-03-02T09:00:00Z", "2026-03-02T09:30:00Z");
        let result = expand_recurrence(
            &interval,
            &[0],
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_series_over_a_year() {
        let interval = base("2026-03-02T09:00:00Z", "2026-03-02T09:30:00Z");
        let result = expand_recurrence(
            &interval,
            &[0],
            NaiveDate::from_ymd_opt(2027, 6, 1).unwrap(),
        );
        assert!(result.is_err());
    }
}
