use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::api::middleware::error::{ApiError, ApiResult};
use crate::domain::errors::{SchedulingError, SchedulingResult};
use crate::domain::ports::schedule_repository::ScheduleRepository;
use crate::models::{parse_time_of_day, WeeklySchedule};
use crate::services::calendar::{subtract, TimeInterval};

/// Snapshot of one provider's working pattern, loaded once per resolution
/// or validation request and discarded afterwards. Schedules and
/// exceptions can change between requests, so nothing here outlives the
/// request that loaded it.
pub struct ProviderCalendar {
    timezone: Tz,
    /// Weekday (0 = Monday) to that day's working hours
    days: HashMap<i64, WeeklySchedule>,
    /// Full-day exceptions within the loaded date range
    exceptions: HashSet<NaiveDate>,
}

impl ProviderCalendar {
    /// Open intervals for one provider-local calendar date, ordered and
    /// pairwise disjoint. Empty on non-working days and full-day
    /// exceptions; the break window (if any) is already carved out.
    pub fn open_intervals(&self, date: NaiveDate) -> SchedulingResult<Vec<TimeInterval>> {
        if self.exceptions.contains(&date) {
            return Ok(Vec::new());
        }

        let weekday = date.weekday().num_days_from_monday() as i64;
        let day = match self.days.get(&weekday) {
            Some(day) if day.is_working_day => day,
            _ => return Ok(Vec::new()),
        };

        let working = TimeInterval::new(
            self.local_to_utc(date, time_of_day(&day.start_time)?)?,
            self.local_to_utc(date, time_of_day(&day.end_time)?)?,
        )?;

        match (&day.break_start, &day.break_end) {
            (Some(break_start), Some(break_end)) => {
                let break_window = TimeInterval::new(
                    self.local_to_utc(date, time_of_day(break_start)?)?,
                    self.local_to_utc(date, time_of_day(break_end)?)?,
                )?;
                Ok(subtract(&working, &[break_window]))
            }
            _ => Ok(vec![working]),
        }
    }

    /// The provider-local calendar date an instant falls on
    pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.timezone).date_naive()
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Map a provider-local wall-clock time to UTC. Ambiguous local times
    /// (clocks rolled back) resolve to the earlier instant; nonexistent
    /// ones (clocks sprung forward) shift to the same wall-clock an hour
    /// later.
    fn local_to_utc(&self, date: NaiveDate, time: NaiveTime) -> SchedulingResult<DateTime<Utc>> {
        let local = date.and_time(time);
        match self.timezone.from_local_datetime(&local) {
            LocalResult::Single(at) | LocalResult::Ambiguous(at, _) => Ok(at.with_timezone(&Utc)),
            LocalResult::None => self
                .timezone
                .from_local_datetime(&(local + Duration::hours(1)))
                .earliest()
                .map(|at| at.with_timezone(&Utc))
                .ok_or_else(|| {
                    SchedulingError::Validation(format!(
                        "time {} does not exist on {} in {}",
                        time, date, self.timezone
                    ))
                }),
        }
    }
}

fn time_of_day(value: &str) -> SchedulingResult<NaiveTime> {
    parse_time_of_day(value).map_err(SchedulingError::Validation)
}

/// Loads per-request [`ProviderCalendar`] snapshots from the schedule
/// repository.
#[derive(Clone)]
pub struct AvailabilityService {
    schedule_repo: Arc<dyn ScheduleRepository>,
}

impl AvailabilityService {
    pub fn new(schedule_repo: Arc<dyn ScheduleRepository>) -> Self {
        Self { schedule_repo }
    }

    /// Load the provider's weekly schedule, exceptions within `[from, to]`
    /// and timezone in one pass. Fails with `NotFound` for an unknown
    /// provider.
    pub async fn load_calendar(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ApiResult<ProviderCalendar> {
        let timezone_name = self
            .schedule_repo
            .get_provider_timezone(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Provider {} not found", user_id)))?;

        let timezone: Tz = timezone_name.parse().map_err(|_| {
            ApiError::Internal(format!(
                "Provider {} has invalid timezone {}",
                user_id, timezone_name
            ))
        })?;

        let days = self
            .schedule_repo
            .get_weekly_schedule(user_id)
            .await?
            .into_iter()
            .map(|day| (day.weekday, day))
            .collect();

        let from_str = from.format("%Y-%m-%d").to_string();
        let to_str = to.format("%Y-%m-%d").to_string();
        let mut exceptions = HashSet::new();
        for day_off in self
            .schedule_repo
            .get_non_working_days_between(user_id, &from_str, &to_str)
            .await?
        {
            let date = NaiveDate::parse_from_str(&day_off.date, "%Y-%m-%d").map_err(|_| {
                ApiError::Internal(format!("Stored non-working day {} is malformed", day_off.id))
            })?;
            exceptions.insert(date);
        }

        Ok(ProviderCalendar {
            timezone,
            days,
            exceptions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(weekday: i64, hours: (&str, &str), lunch: Option<(&str, &str)>) -> WeeklySchedule {
        WeeklySchedule::new(
            "provider-1".to_string(),
            weekday,
            true,
            hours.0.to_string(),
            hours.1.to_string(),
            lunch.map(|(s, _)| s.to_string()),
            lunch.map(|(_, e)| e.to_string()),
        )
    }

    fn calendar(timezone: &str, days: Vec<WeeklySchedule>) -> ProviderCalendar {
        ProviderCalendar {
            timezone: timezone.parse().unwrap(),
            days: days.into_iter().map(|d| (d.weekday, d)).collect(),
            exceptions: HashSet::new(),
        }
    }

    #[test]
    fn test_break_splits_working_day() {
        let cal = calendar(
            "UTC",
            vec![day(0, ("09:00", "17:00"), Some(("13:00", "14:00")))],
        );
        // 2026-03-02 is a Monday
        let open = cal
            .open_intervals(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap())
            .unwrap();

        assert_eq!(open.len(), 2);
        assert_eq!(open[0].start.to_rfc3339(), "2026-03-02T09:00:00+00:00");
        assert_eq!(open[0].end.to_rfc3339(), "2026-03-02T13:00:00+00:00");
        assert_eq!(open[1].start.to_rfc3339(), "2026-03-02T14:00:00+00:00");
        assert_eq!(open[1].end.to_rfc3339(), "2026-03-02T17:00:00+00:00");
    }

    #[test]
    fn test_day_without_schedule_row_is_empty() {
        let cal = calendar("UTC", vec![day(0, ("09:00", "17:00"), None)]);
        let open = cal
            .open_intervals(NaiveDate::from_ymd_opt(2026, 3, 3).unwrap())
            .unwrap();
        assert!(open.is_empty());
    }

    #[test]
    fn test_exception_overrides_schedule() {
        let mut cal = calendar("UTC", vec![day(0, ("09:00", "17:00"), None)]);
        let monday = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        cal.exceptions.insert(monday);
        assert!(cal.open_intervals(monday).unwrap().is_empty());
    }

    #[test]
    fn test_local_hours_convert_to_utc() {
        // New York is UTC-5 in winter
        let cal = calendar("America/New_York", vec![day(0, ("09:00", "17:00"), None)]);
        let open = cal
            .open_intervals(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap())
            .unwrap();

        assert_eq!(open.len(), 1);
        assert_eq!(open[0].start.to_rfc3339(), "2026-01-05T14:00:00+00:00");
        assert_eq!(open[0].end.to_rfc3339(), "2026-01-05T22:00:00+00:00");
    }

    #[test]
    fn test_dst_switch_keeps_local_hours() {
        // US DST starts 2026-03-08; the following Monday is UTC-4
        let cal = calendar("America/New_York", vec![day(0, ("09:00", "17:00"), None)]);
        let open = cal
            .open_intervals(NaiveDate::from_ymd_opt(2026, 3, 9).unwrap())
            .unwrap();

        assert_eq!(open[0].start.to_rfc3339(), "2026-03-09T13:00:00+00:00");
        assert_eq!(open[0].end.to_rfc3339(), "2026-03-09T21:00:00+00:00");
    }

    #[test]
    fn test_open_intervals_sorted_and_disjoint() {
        let cal = calendar(
            "UTC",
            vec![day(0, ("08:00", "20:00"), Some(("12:30", "13:15")))],
        );
        let open = cal
            .open_intervals(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap())
            .unwrap();

        for pair in open.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
    }
}
