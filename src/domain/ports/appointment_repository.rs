use crate::api::middleware::error::ApiResult;
use crate::models::{Appointment, AppointmentStatus};
use crate::services::calendar::TimeInterval;

/// Repository for a provider's appointment ledger.
///
/// The `*_checked` writes re-verify the no-overlap invariant inside the
/// same transaction as the write; the in-memory conflict guard is only an
/// optimistic pre-check. A write that loses a race returns
/// `Ok(Some(conflicting_interval))` and commits nothing.
#[async_trait::async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn get_appointment(&self, user_id: &str, id: &str) -> ApiResult<Option<Appointment>>;

    /// Non-cancelled appointments intersecting `[from, to)` (RFC 3339
    /// storage-form bounds), ordered by start
    async fn list_busy_between(
        &self,
        user_id: &str,
        from: &str,
        to: &str,
    ) -> ApiResult<Vec<Appointment>>;

    async fn create_appointment_checked(
        &self,
        appointment: &Appointment,
    ) -> ApiResult<Option<TimeInterval>>;

    /// Insert a whole recurring series atomically: either every instance
    /// commits or none does
    async fn create_series_checked(
        &self,
        appointments: &[Appointment],
    ) -> ApiResult<Option<TimeInterval>>;

    async fn reschedule_appointment_checked(
        &self,
        user_id: &str,
        id: &str,
        start: &str,
        end: &str,
    ) -> ApiResult<Option<TimeInterval>>;

    async fn update_appointment_status(
        &self,
        user_id: &str,
        id: &str,
        status: AppointmentStatus,
    ) -> ApiResult<()>;

    async fn delete_appointment(&self, user_id: &str, id: &str) -> ApiResult<()>;
}
