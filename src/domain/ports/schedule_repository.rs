use crate::api::middleware::error::ApiResult;
use crate::models::{NonWorkingDay, WeeklySchedule};

/// Repository for a provider's working hours and full-day exceptions
#[async_trait::async_trait]
pub trait ScheduleRepository: Send + Sync {
    /// All weekly schedule rows for a provider (at most one per weekday)
    async fn get_weekly_schedule(&self, user_id: &str) -> ApiResult<Vec<WeeklySchedule>>;

    /// Non-working-day exceptions with `from <= date <= to` (dates in
    /// YYYY-MM-DD form)
    async fn get_non_working_days_between(
        &self,
        user_id: &str,
        from: &str,
        to: &str,
    ) -> ApiResult<Vec<NonWorkingDay>>;

    /// IANA timezone of the provider's working hours
    async fn get_provider_timezone(&self, user_id: &str) -> ApiResult<Option<String>>;
}
