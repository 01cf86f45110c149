use sqlx::{Any, Row, Transaction};

use crate::api::middleware::error::{ApiError, ApiResult};
use crate::database::Database;
use crate::domain::ports::appointment_repository::AppointmentRepository;
use crate::models::{Appointment, AppointmentStatus};
use crate::services::calendar::{self, TimeInterval};

impl Database {
    pub async fn get_appointment(&self, user_id: &str, id: &str) -> ApiResult<Option<Appointment>> {
        let row = sqlx::query(
            "SELECT id, user_id, client_id, service_id, start_datetime, end_datetime, status, price_charged, created_at, updated_at
             FROM appointments
             WHERE user_id = ? AND id = ?",
        )
        .bind(user_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(appointment_from_row).transpose()
    }

    /// Appointments intersecting `[from, to)`, optionally filtered by
    /// status, ordered chronologically. Bounds are storage-form RFC 3339
    /// strings, so string comparison matches time order.
    pub async fn list_appointments_between(
        &self,
        user_id: &str,
        from: &str,
        to: &str,
        status: Option<&AppointmentStatus>,
    ) -> ApiResult<Vec<Appointment>> {
        let rows = sqlx::query(
            "SELECT id, user_id, client_id, service_id, start_datetime, end_datetime, status, price_charged, created_at, updated_at
             FROM appointments
             WHERE user_id = ? AND start_datetime < ? AND end_datetime > ?
             ORDER BY start_datetime ASC, end_datetime ASC",
        )
        .bind(user_id)
        .bind(to)
        .bind(from)
        .fetch_all(&self.pool)
        .await?;

        let mut appointments = Vec::with_capacity(rows.len());
        for row in rows {
            let appointment = appointment_from_row(row)?;
            if status.map_or(true, |wanted| appointment.status == *wanted) {
                appointments.push(appointment);
            }
        }
        Ok(appointments)
    }
}

/// Re-check the overlap invariant inside the write transaction. Returns
/// the first conflicting interval, or None when the range is free.
async fn overlap_in_tx(
    tx: &mut Transaction<'_, Any>,
    user_id: &str,
    start: &str,
    end: &str,
    exclude_id: Option<&str>,
) -> ApiResult<Option<TimeInterval>> {
    let row = match exclude_id {
        Some(exclude_id) => {
            sqlx::query(
                "SELECT start_datetime, end_datetime FROM appointments
                 WHERE user_id = ? AND status != 'cancelled'
                   AND start_datetime < ? AND end_datetime > ? AND id != ?
                 ORDER BY start_datetime ASC LIMIT 1",
            )
            .bind(user_id)
            .bind(end)
            .bind(start)
            .bind(exclude_id)
            .fetch_optional(&mut **tx)
            .await?
        }
        None => {
            sqlx::query(
                "SELECT start_datetime, end_datetime FROM appointments
                 WHERE user_id = ? AND status != 'cancelled'
                   AND start_datetime < ? AND end_datetime > ?
                 ORDER BY start_datetime ASC LIMIT 1",
            )
            .bind(user_id)
            .bind(end)
            .bind(start)
            .fetch_optional(&mut **tx)
            .await?
        }
    };

    match row {
        Some(row) => {
            let start: String = row.try_get("start_datetime")?;
            let end: String = row.try_get("end_datetime")?;
            Ok(Some(parse_stored_interval(&start, &end)?))
        }
        None => Ok(None),
    }
}

async fn insert_in_tx(tx: &mut Transaction<'_, Any>, appointment: &Appointment) -> ApiResult<()> {
    sqlx::query(
        "INSERT INTO appointments (id, user_id, client_id, service_id, start_datetime, end_datetime, status, price_charged, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&appointment.id)
    .bind(&appointment.user_id)
    .bind(&appointment.client_id)
    .bind(&appointment.service_id)
    .bind(&appointment.start_datetime)
    .bind(&appointment.end_datetime)
    .bind(appointment.status.as_str())
    .bind(appointment.price_charged)
    .bind(&appointment.created_at)
    .bind(&appointment.updated_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

#[async_trait::async_trait]
impl AppointmentRepository for Database {
    async fn get_appointment(&self, user_id: &str, id: &str) -> ApiResult<Option<Appointment>> {
        Database::get_appointment(self, user_id, id).await
    }

    async fn list_busy_between(
        &self,
        user_id: &str,
        from: &str,
        to: &str,
    ) -> ApiResult<Vec<Appointment>> {
        let rows = sqlx::query(
            "SELECT id, user_id, client_id, service_id, start_datetime, end_datetime, status, price_charged, created_at, updated_at
             FROM appointments
             WHERE user_id = ? AND status != 'cancelled'
               AND start_datetime < ? AND end_datetime > ?
             ORDER BY start_datetime ASC, end_datetime ASC",
        )
        .bind(user_id)
        .bind(to)
        .bind(from)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(appointment_from_row).collect()
    }

    async fn create_appointment_checked(
        &self,
        appointment: &Appointment,
    ) -> ApiResult<Option<TimeInterval>> {
        let mut tx = self.pool.begin().await?;

        if let Some(conflict) = overlap_in_tx(
            &mut tx,
            &appointment.user_id,
            &appointment.start_datetime,
            &appointment.end_datetime,
            None,
        )
        .await?
        {
            // dropping the transaction rolls it back
            return Ok(Some(conflict));
        }

        insert_in_tx(&mut tx, appointment).await?;
        tx.commit().await?;
        Ok(None)
    }

    async fn create_series_checked(
        &self,
        appointments: &[Appointment],
    ) -> ApiResult<Option<TimeInterval>> {
        let mut tx = self.pool.begin().await?;

        for appointment in appointments {
            // each check also sees the instances inserted earlier in
            // this transaction, so intra-batch overlaps are caught too
            if let Some(conflict) = overlap_in_tx(
                &mut tx,
                &appointment.user_id,
                &appointment.start_datetime,
                &appointment.end_datetime,
                None,
            )
            .await?
            {
                return Ok(Some(conflict));
            }
            insert_in_tx(&mut tx, appointment).await?;
        }

        tx.commit().await?;
        Ok(None)
    }

    async fn reschedule_appointment_checked(
        &self,
        user_id: &str,
        id: &str,
        start: &str,
        end: &str,
    ) -> ApiResult<Option<TimeInterval>> {
        let mut tx = self.pool.begin().await?;

        if let Some(conflict) = overlap_in_tx(&mut tx, user_id, start, end, Some(id)).await? {
            return Ok(Some(conflict));
        }

        let now = chrono::Utc::now().to_rfc3339();
        let result = sqlx::query(
            "UPDATE appointments SET start_datetime = ?, end_datetime = ?, updated_at = ?
             WHERE user_id = ? AND id = ?",
        )
        .bind(start)
        .bind(end)
        .bind(&now)
        .bind(user_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("Appointment {} not found", id)));
        }

        tx.commit().await?;
        Ok(None)
    }

    async fn update_appointment_status(
        &self,
        user_id: &str,
        id: &str,
        status: AppointmentStatus,
    ) -> ApiResult<()> {
        let now = chrono::Utc::now().to_rfc3339();
        let result = sqlx::query(
            "UPDATE appointments SET status = ?, updated_at = ?
             WHERE user_id = ? AND id = ?",
        )
        .bind(status.as_str())
        .bind(&now)
        .bind(user_id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("Appointment {} not found", id)));
        }

        Ok(())
    }

    async fn delete_appointment(&self, user_id: &str, id: &str) -> ApiResult<()> {
        sqlx::query("DELETE FROM appointments WHERE user_id = ? AND id = ?")
            .bind(user_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

fn appointment_from_row(row: sqlx::any::AnyRow) -> ApiResult<Appointment> {
    let status: String = row.try_get("status")?;
    Ok(Appointment {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        // `try_get_unchecked`: the `Any` driver refuses the checked
        // `Option<String>` decode of a NULL column.
        client_id: row.try_get_unchecked::<Option<String>, _>("client_id")?,
        service_id: row.try_get_unchecked::<Option<String>, _>("service_id")?,
        start_datetime: row.try_get("start_datetime")?,
        end_datetime: row.try_get("end_datetime")?,
        status: status
            .parse()
            .map_err(|e: String| ApiError::Internal(e))?,
        price_charged: row.try_get("price_charged")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn parse_stored_interval(start: &str, end: &str) -> ApiResult<TimeInterval> {
    let interval = TimeInterval::new(
        calendar::parse_datetime(start)?,
        calendar::parse_datetime(end)?,
    )?;
    Ok(interval)
}
