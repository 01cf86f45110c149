use chrono::{Duration, NaiveDate};

use crate::api::middleware::error::{ApiError, ApiResult};
use crate::services::availability_service::AvailabilityService;
use crate::services::calendar::{subtract, TimeInterval};
use crate::services::ledger::BookingLedger;

/// Longest date range a single slot resolution may cover
pub const MAX_RANGE_DAYS: i64 = 92;

/// Resolves bookable slots: open intervals minus busy time, discretised
/// into candidate start times.
#[derive(Clone)]
pub struct SlotService {
    availability: AvailabilityService,
    ledger: BookingLedger,
}

impl SlotService {
    pub fn new(availability: AvailabilityService, ledger: BookingLedger) -> Self {
        Self { availability, ledger }
    }

    /// Bookable slots of `duration_minutes` for every date in
    /// `[from, to]` (provider-local dates), in chronological order.
    /// Candidate starts advance by `step_minutes`, defaulting to the
    /// duration so slots do not overlap each other.
    pub async fn resolve_slots(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
        duration_minutes: i64,
        step_minutes: Option<i64>,
    ) -> ApiResult<Vec<TimeInterval>> {
        if duration_minutes <= 0 {
            return Err(ApiError::BadRequest(
                "duration_minutes must be positive".to_string(),
            ));
        }
        let step_minutes = step_minutes.unwrap_or(duration_minutes);
        if step_minutes <= 0 {
            return Err(ApiError::BadRequest(
                "step_minutes must be positive".to_string(),
            ));
        }
        if to < from {
            return Err(ApiError::BadRequest(format!(
                "date range end {} falls before start {}",
                to, from
            )));
        }
        if (to - from).num_days() >= MAX_RANGE_DAYS {
            return Err(ApiError::BadRequest(format!(
                "date range may cover at most {} days",
                MAX_RANGE_DAYS
            )));
        }

        let calendar = self.availability.load_calendar(user_id, from, to).await?;

        // One ledger read covers the whole range, padded a day on each
        // side so appointments crossing a local/UTC date boundary are
        // not missed
        let window = TimeInterval::new(
            (from - Duration::days(1)).and_time(chrono::NaiveTime::MIN).and_utc(),
            (to + Duration::days(2)).and_time(chrono::NaiveTime::MIN).and_utc(),
        )?;
        let busy = self.ledger.busy_intervals(user_id, &window, None).await?;

        let duration = Duration::minutes(duration_minutes);
        let step = Duration::minutes(step_minutes);
        let mut slots = Vec::new();
        let mut date = from;
        while date <= to {
            for open in calendar.open_intervals(date)? {
                for residual in subtract(&open, &busy) {
                    let mut start = residual.start;
                    while start + duration <= residual.end {
                        slots.push(TimeInterval::new(start, start + duration)?);
                        start += step;
                    }
                }
            }
            date += Duration::days(1);
        }

        Ok(slots)
    }
}
