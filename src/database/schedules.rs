use crate::api::middleware::error::ApiResult;
use crate::database::Database;
use crate::domain::ports::schedule_repository::ScheduleRepository;
use crate::models::{NonWorkingDay, WeeklySchedule};

impl Database {
    /// Full replace of one weekday's record (insert or overwrite)
    pub async fn replace_day_schedule(&self, day: &WeeklySchedule) -> ApiResult<()> {
        sqlx::query(
            "INSERT INTO weekly_schedule (id, user_id, weekday, is_working_day, start_time, end_time, break_start, break_end, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT (user_id, weekday) DO UPDATE SET
                 is_working_day = excluded.is_working_day,
                 start_time = excluded.start_time,
                 end_time = excluded.end_time,
                 break_start = excluded.break_start,
                 break_end = excluded.break_end,
                 updated_at = excluded.updated_at",
        )
        .bind(&day.id)
        .bind(&day.user_id)
        .bind(day.weekday)
        .bind(day.is_working_day)
        .bind(&day.start_time)
        .bind(&day.end_time)
        .bind(&day.break_start)
        .bind(&day.break_end)
        .bind(&day.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_weekly_schedule(&self, user_id: &str) -> ApiResult<Vec<WeeklySchedule>> {
        let days = sqlx::query_as::<_, WeeklySchedule>(
            "SELECT id, user_id, weekday, is_working_day, start_time, end_time, break_start, break_end, updated_at
             FROM weekly_schedule
             WHERE user_id = ?
             ORDER BY weekday ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(days)
    }

    pub async fn create_non_working_day(&self, day: &NonWorkingDay) -> ApiResult<()> {
        sqlx::query(
            "INSERT INTO non_working_days (id, user_id, date, description, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&day.id)
        .bind(&day.user_id)
        .bind(&day.date)
        .bind(&day.description)
        .bind(&day.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_non_working_day(
        &self,
        user_id: &str,
        id: &str,
    ) -> ApiResult<Option<NonWorkingDay>> {
        let day = sqlx::query_as::<_, NonWorkingDay>(
            "SELECT id, user_id, date, description, created_at
             FROM non_working_days
             WHERE user_id = ? AND id = ?",
        )
        .bind(user_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(day)
    }

    pub async fn list_non_working_days(&self, user_id: &str) -> ApiResult<Vec<NonWorkingDay>> {
        let days = sqlx::query_as::<_, NonWorkingDay>(
            "SELECT id, user_id, date, description, created_at
             FROM non_working_days
             WHERE user_id = ?
             ORDER BY date ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(days)
    }

    pub async fn delete_non_working_day(&self, user_id: &str, id: &str) -> ApiResult<()> {
        sqlx::query("DELETE FROM non_working_days WHERE user_id = ? AND id = ?")
            .bind(user_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl ScheduleRepository for Database {
    async fn get_weekly_schedule(&self, user_id: &str) -> ApiResult<Vec<WeeklySchedule>> {
        Database::get_weekly_schedule(self, user_id).await
    }

    async fn get_non_working_days_between(
        &self,
        user_id: &str,
        from: &str,
        to: &str,
    ) -> ApiResult<Vec<NonWorkingDay>> {
        let days = sqlx::query_as::<_, NonWorkingDay>(
            "SELECT id, user_id, date, description, created_at
             FROM non_working_days
             WHERE user_id = ? AND date >= ? AND date <= ?
             ORDER BY date ASC",
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(days)
    }

    async fn get_provider_timezone(&self, user_id: &str) -> ApiResult<Option<String>> {
        let timezone = sqlx::query_scalar::<_, String>("SELECT timezone FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(timezone)
    }
}
