use std::sync::Arc;

use crate::api::middleware::error::{ApiError, ApiResult};
use crate::domain::ports::appointment_repository::AppointmentRepository;
use crate::services::calendar::{self, merge, TimeInterval};

/// Read-only view over a provider's non-cancelled appointments.
///
/// Busy time comes back sorted and coalesced, so downstream consumers
/// never reason about raw overlapping records.
#[derive(Clone)]
pub struct BookingLedger {
    appointment_repo: Arc<dyn AppointmentRepository>,
}

impl BookingLedger {
    pub fn new(appointment_repo: Arc<dyn AppointmentRepository>) -> Self {
        Self { appointment_repo }
    }

    /// Merged busy intervals intersecting `range`.
    /// `exclude_appointment_id` drops the appointment currently being
    /// edited so a reschedule does not collide with itself.
    pub async fn busy_intervals(
        &self,
        user_id: &str,
        range: &TimeInterval,
        exclude_appointment_id: Option<&str>,
    ) -> ApiResult<Vec<TimeInterval>> {
        let records = self
            .appointment_repo
            .list_busy_between(
                user_id,
                &calendar::to_storage(&range.start),
                &calendar::to_storage(&range.end),
            )
            .await?;

        let mut intervals = Vec::with_capacity(records.len());
        for appointment in records {
            if exclude_appointment_id == Some(appointment.id.as_str()) {
                continue;
            }
            let interval = appointment.interval().map_err(|e| {
                ApiError::Internal(format!(
                    "Stored appointment {} is malformed: {}",
                    appointment.id, e
                ))
            })?;
            intervals.push(interval);
        }

        Ok(merge(intervals))
    }
}
