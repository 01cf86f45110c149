use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::{SchedulingError, SchedulingResult};

/// Half-open time range `[start, end)` in UTC. Construction enforces
/// `start < end`; every operation below assumes well-formed inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> SchedulingResult<Self> {
        if start >= end {
            return Err(SchedulingError::InvalidInterval);
        }
        Ok(Self { start, end })
    }

    /// Half-open overlap: touching endpoints do not overlap
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// `other` lies entirely within `self`
    pub fn contains(&self, other: &TimeInterval) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn intersect(&self, other: &TimeInterval) -> Option<TimeInterval> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(TimeInterval { start, end })
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

impl std::fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", to_storage(&self.start), to_storage(&self.end))
    }
}

/// Sort by start ascending (ties by end ascending) and coalesce
/// overlapping or touching intervals into a disjoint ordered list
pub fn merge(mut intervals: Vec<TimeInterval>) -> Vec<TimeInterval> {
    if intervals.len() <= 1 {
        return intervals;
    }

    intervals.sort_by(|a, b| a.start.cmp(&b.start).then(a.end.cmp(&b.end)));

    let mut merged: Vec<TimeInterval> = Vec::with_capacity(intervals.len());
    for interval in intervals {
        match merged.last_mut() {
            Some(last) if interval.start <= last.end => {
                last.end = last.end.max(interval.end);
            }
            _ => merged.push(interval),
        }
    }

    merged
}

/// Remove every occluding interval from `base`, returning the zero or
/// more residual sub-intervals in chronological order. Occlusions are
/// merged first, so callers may pass raw overlapping records.
pub fn subtract(base: &TimeInterval, occlusions: &[TimeInterval]) -> Vec<TimeInterval> {
    let mut residuals = Vec::new();
    let mut cursor = base.start;

    for occlusion in merge(occlusions.to_vec()) {
        if occlusion.end <= cursor {
            continue;
        }
        if occlusion.start >= base.end {
            break;
        }
        if occlusion.start > cursor {
            residuals.push(TimeInterval {
                start: cursor,
                end: occlusion.start.min(base.end),
            });
        }
        cursor = cursor.max(occlusion.end);
        if cursor >= base.end {
            return residuals;
        }
    }

    if cursor < base.end {
        residuals.push(TimeInterval {
            start: cursor,
            end: base.end,
        });
    }

    residuals
}

/// Storage form used for appointment datetimes: second precision with a
/// `Z` suffix, so lexicographic comparison in SQL matches time order
pub fn to_storage(datetime: &DateTime<Utc>) -> String {
    datetime.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse an RFC 3339 datetime (any offset) into UTC
pub fn parse_datetime(value: &str) -> SchedulingResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| SchedulingError::Validation(format!("Invalid datetime {}: {}", value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interval(start: &str, end: &str) -> TimeInterval {
        TimeInterval::new(parse_datetime(start).unwrap(), parse_datetime(end).unwrap()).unwrap()
    }

    #[test]
    fn test_rejects_malformed_interval() {
        let at = parse_datetime("2026-03-02T09:00:00Z").unwrap();
        assert!(matches!(
            TimeInterval::new(at, at),
            Err(SchedulingError::InvalidInterval)
        ));
        assert!(matches!(
            TimeInterval::new(at, at - chrono::Duration::minutes(1)),
            Err(SchedulingError::InvalidInterval)
        ));
    }

    #[test]
    fn test_touching_intervals_do_not_overlap() {
        let a = interval("2026-03-02T09:00:00Z", "2026-03-02T10:00:00Z");
        let b = interval("2026-03-02T10:00:00Z", "2026-03-02T11:00:00Z");
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
        assert!(a.intersect(&b).is_none());
    }

    #[test]
    fn test_partial_overlap() {
        let a = interval("2026-03-02T09:00:00Z", "2026-03-02T10:30:00Z");
        let b = interval("2026-03-02T10:00:00Z", "2026-03-02T11:00:00Z");
        assert!(a.overlaps(&b));

        let shared = a.intersect(&b).unwrap();
        assert_eq!(shared, interval("2026-03-02T10:00:00Z", "2026-03-02T10:30:00Z"));
    }

    #[test]
    fn test_subtract_nothing_returns_base() {
        let base = interval("2026-03-02T09:00:00Z", "2026-03-02T17:00:00Z");
        assert_eq!(subtract(&base, &[]), vec![base]);
    }

    #[test]
    fn test_subtract_self_returns_empty() {
        let base = interval("2026-03-02T09:00:00Z", "2026-03-02T17:00:00Z");
        assert!(subtract(&base, &[base]).is_empty());
    }

    #[test]
    fn test_subtract_middle_splits_base() {
        let base = interval("2026-03-02T09:00:00Z", "2026-03-02T17:00:00Z");
        let lunch = interval("2026-03-02T13:00:00Z", "2026-03-02T14:00:00Z");

        let residuals = subtract(&base, &[lunch]);
        assert_eq!(
            residuals,
            vec![
                interval("2026-03-02T09:00:00Z", "2026-03-02T13:00:00Z"),
                interval("2026-03-02T14:00:00Z", "2026-03-02T17:00:00Z"),
            ]
        );
    }

    #[test]
    fn test_subtract_unsorted_overlapping_occlusions() {
        let base = interval("2026-03-02T09:00:00Z", "2026-03-02T17:00:00Z");
        let occlusions = vec![
            interval("2026-03-02T12:30:00Z", "2026-03-02T14:00:00Z"),
            interval("2026-03-02T10:00:00Z", "2026-03-02T11:00:00Z"),
            interval("2026-03-02T13:00:00Z", "2026-03-02T13:30:00Z"),
        ];

        let residuals = subtract(&base, &occlusions);
        assert_eq!(
            residuals,
            vec![
                interval("2026-03-02T09:00:00Z", "2026-03-02T10:00:00Z"),
                interval("2026-03-02T11:00:00Z", "2026-03-02T12:30:00Z"),
                interval("2026-03-02T14:00:00Z", "2026-03-02T17:00:00Z"),
            ]
        );
    }

    #[test]
    fn test_subtract_occlusion_extending_past_edges() {
        let base = interval("2026-03-02T09:00:00Z", "2026-03-02T12:00:00Z");
        let over = interval("2026-03-02T08:00:00Z", "2026-03-02T10:00:00Z");

        assert_eq!(
            subtract(&base, &[over]),
            vec![interval("2026-03-02T10:00:00Z", "2026-03-02T12:00:00Z")]
        );
    }

    #[test]
    fn test_merge_coalesces_touching_and_overlapping() {
        let merged = merge(vec![
            interval("2026-03-02T11:00:00Z", "2026-03-02T12:00:00Z"),
            interval("2026-03-02T09:00:00Z", "2026-03-02T10:00:00Z"),
            interval("2026-03-02T10:00:00Z", "2026-03-02T11:30:00Z"),
        ]);
        assert_eq!(
            merged,
            vec![interval("2026-03-02T09:00:00Z", "2026-03-02T12:00:00Z")]
        );
    }

    #[test]
    fn test_merge_keeps_disjoint_apart() {
        let merged = merge(vec![
            interval("2026-03-02T14:00:00Z", "2026-03-02T15:00:00Z"),
            interval("2026-03-02T09:00:00Z", "2026-03-02T10:00:00Z"),
        ]);
        assert_eq!(merged.len(), 2);
        assert!(merged[0].end <= merged[1].start);
    }

    #[test]
    fn test_storage_roundtrip() {
        let dt = parse_datetime("2026-03-02T09:00:00+02:00").unwrap();
        assert_eq!(to_storage(&dt), "2026-03-02T07:00:00Z");
        assert_eq!(parse_datetime(&to_storage(&dt)).unwrap(), dt);
    }
}
