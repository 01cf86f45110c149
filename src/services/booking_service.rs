use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use tracing::info;

use crate::api::middleware::error::{ApiError, ApiResult};
use crate::domain::errors::{DateConflict, SchedulingError};
use crate::domain::ports::appointment_repository::AppointmentRepository;
use crate::events::{EventBus, SystemEvent};
use crate::models::{Appointment, AppointmentStatus};
use crate::services::availability_service::{AvailabilityService, ProviderCalendar};
use crate::services::calendar::{self, TimeInterval};
use crate::services::ledger::BookingLedger;
use crate::services::recurrence::expand_recurrence;

/// Conflict guard and write path for appointments.
///
/// Every write runs the optimistic in-memory check first for a fast,
/// user-friendly rejection, then hands the final say to the repository's
/// transactional re-check: of two racing overlapping writes at most one
/// commits, and the loser surfaces as `DoubleBooked` at write time.
#[derive(Clone)]
pub struct BookingService {
    appointment_repo: Arc<dyn AppointmentRepository>,
    availability: AvailabilityService,
    ledger: BookingLedger,
    event_bus: EventBus,
}

impl BookingService {
    pub fn new(
        appointment_repo: Arc<dyn AppointmentRepository>,
        availability: AvailabilityService,
        ledger: BookingLedger,
        event_bus: EventBus,
    ) -> Self {
        Self {
            appointment_repo,
            availability,
            ledger,
            event_bus,
        }
    }

    /// Validate a proposed booking against the provider's availability
    /// and existing appointments. `exclude_appointment_id` names the
    /// appointment being edited so a reschedule does not collide with
    /// itself.
    pub async fn validate_booking(
        &self,
        user_id: &str,
        proposed: &TimeInterval,
        exclude_appointment_id: Option<&str>,
    ) -> ApiResult<()> {
        let from = proposed.start.date_naive() - Duration::days(1);
        let to = proposed.end.date_naive() + Duration::days(1);
        let calendar = self.availability.load_calendar(user_id, from, to).await?;
        self.check_with_calendar(&calendar, user_id, proposed, exclude_appointment_id)
            .await
    }

    /// Book a validated appointment. The repository re-checks the overlap
    /// invariant inside the insert transaction.
    pub async fn book(
        &self,
        user_id: &str,
        client_id: Option<String>,
        service_id: Option<String>,
        interval: TimeInterval,
        price: f64,
    ) -> ApiResult<Appointment> {
        self.validate_booking(user_id, &interval, None).await?;

        let appointment = Appointment::new(user_id.to_string(), client_id, service_id, &interval, price);
        if let Some(conflict) = self
            .appointment_repo
            .create_appointment_checked(&appointment)
            .await?
        {
            // lost a race after the pre-check passed
            return Err(SchedulingError::DoubleBooked { conflict }.into());
        }

        info!(appointment_id = %appointment.id, user_id = %user_id, "appointment booked");
        self.event_bus.publish(SystemEvent::AppointmentBooked {
            appointment_id: appointment.id.clone(),
            user_id: user_id.to_string(),
            start_datetime: appointment.start_datetime.clone(),
            end_datetime: appointment.end_datetime.clone(),
            timestamp: Utc::now().to_rfc3339(),
        });

        Ok(appointment)
    }

    /// Move an existing appointment to a new interval, revalidating with
    /// the appointment itself excluded from the busy set.
    pub async fn reschedule(
        &self,
        user_id: &str,
        appointment_id: &str,
        interval: TimeInterval,
    ) -> ApiResult<Appointment> {
        let existing = self
            .appointment_repo
            .get_appointment(user_id, appointment_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Appointment {} not found", appointment_id)))?;

        if matches!(existing.status, AppointmentStatus::Cancelled) {
            return Err(ApiError::BadRequest(
                "Cancelled appointments cannot be rescheduled".to_string(),
            ));
        }

        self.validate_booking(user_id, &interval, Some(appointment_id))
            .await?;

        if let Some(conflict) = self
            .appointment_repo
            .reschedule_appointment_checked(
                user_id,
                appointment_id,
                &calendar::to_storage(&interval.start),
                &calendar::to_storage(&interval.end),
            )
            .await?
        {
            return Err(SchedulingError::DoubleBooked { conflict }.into());
        }

        info!(appointment_id = %appointment_id, "appointment rescheduled");
        self.event_bus.publish(SystemEvent::AppointmentRescheduled {
            appointment_id: appointment_id.to_string(),
            user_id: user_id.to_string(),
            old_start: existing.start_datetime.clone(),
            new_start: calendar::to_storage(&interval.start),
            timestamp: Utc::now().to_rfc3339(),
        });

        self.appointment_repo
            .get_appointment(user_id, appointment_id)
            .await?
            .ok_or_else(|| ApiError::Internal("Rescheduled appointment disappeared".to_string()))
    }

    /// Apply a status transition. Same-state transitions are no-ops;
    /// cancelled is terminal. Cancelling frees the time range for new
    /// bookings.
    pub async fn transition_status(
        &self,
        user_id: &str,
        appointment_id: &str,
        new_status: AppointmentStatus,
    ) -> ApiResult<Appointment> {
        let mut appointment = self
            .appointment_repo
            .get_appointment(user_id, appointment_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Appointment {} not found", appointment_id)))?;

        if appointment.status == new_status {
            return Ok(appointment);
        }
        if !appointment.status.can_transition_to(new_status) {
            return Err(ApiError::BadRequest(format!(
                "Cannot transition appointment from {} to {}",
                appointment.status, new_status
            )));
        }

        self.appointment_repo
            .update_appointment_status(user_id, appointment_id, new_status)
            .await?;

        info!(
            appointment_id = %appointment_id,
            from = %appointment.status,
            to = %new_status,
            "appointment status changed"
        );
        self.event_bus.publish(SystemEvent::AppointmentStatusChanged {
            appointment_id: appointment_id.to_string(),
            user_id: user_id.to_string(),
            old_status: appointment.status,
            new_status,
            timestamp: Utc::now().to_rfc3339(),
        });

        appointment.status = new_status;
        Ok(appointment)
    }

    pub async fn delete(&self, user_id: &str, appointment_id: &str) -> ApiResult<()> {
        self.appointment_repo
            .get_appointment(user_id, appointment_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Appointment {} not found", appointment_id)))?;

        self.appointment_repo
            .delete_appointment(user_id, appointment_id)
            .await?;
        info!(appointment_id = %appointment_id, "appointment deleted");
        Ok(())
    }

    /// Book a recurring series. The whole batch is validated first,
    /// collecting every conflict; any failure rejects the batch with a
    /// per-date conflict list and zero instances created. A clean batch
    /// commits inside one transaction.
    pub async fn book_recurring(
        &self,
        user_id: &str,
        client_id: Option<String>,
        service_id: Option<String>,
        base: TimeInterval,
        weekdays: &[u8],
        until: NaiveDate,
        price: f64,
    ) -> ApiResult<Vec<Appointment>> {
        let occurrences = expand_recurrence(&base, weekdays, until)?;

        let from = base.start.date_naive() - Duration::days(1);
        let calendar = self
            .availability
            .load_calendar(user_id, from, until + Duration::days(1))
            .await?;

        let mut conflicts = Vec::new();
        for occurrence in &occurrences {
            match self
                .check_with_calendar(&calendar, user_id, occurrence, None)
                .await
            {
                Ok(()) => {}
                Err(ApiError::Scheduling(reason)) => conflicts.push(DateConflict {
                    date: occurrence.start.date_naive(),
                    reason: reason.to_string(),
                }),
                Err(other) => return Err(other),
            }
        }
        if !conflicts.is_empty() {
            return Err(SchedulingError::RecurrenceConflicts(conflicts).into());
        }

        let appointments: Vec<Appointment> = occurrences
            .iter()
            .map(|occurrence| {
                Appointment::new(
                    user_id.to_string(),
                    client_id.clone(),
                    service_id.clone(),
                    occurrence,
                    price,
                )
            })
            .collect();

        if let Some(conflict) = self
            .appointment_repo
            .create_series_checked(&appointments)
            .await?
        {
            return Err(SchedulingError::DoubleBooked { conflict }.into());
        }

        info!(
            user_id = %user_id,
            instances = appointments.len(),
            "recurring series booked"
        );
        self.event_bus.publish(SystemEvent::RecurringSeriesBooked {
            user_id: user_id.to_string(),
            instance_count: appointments.len(),
            first_start: appointments
                .first()
                .map(|a| a.start_datetime.clone())
                .unwrap_or_default(),
            timestamp: Utc::now().to_rfc3339(),
        });

        Ok(appointments)
    }

    /// The conflict check proper, against an already-loaded calendar so
    /// batch validation reads the schedule once.
    async fn check_with_calendar(
        &self,
        calendar: &ProviderCalendar,
        user_id: &str,
        proposed: &TimeInterval,
        exclude_appointment_id: Option<&str>,
    ) -> ApiResult<()> {
        let date = calendar.local_date(proposed.start);
        let open = calendar.open_intervals(date)?;

        if !open.iter().any(|interval| interval.contains(proposed)) {
            let nearest = open
                .iter()
                .min_by_key(|interval| distance_seconds(interval, proposed))
                .copied();
            return Err(SchedulingError::OutsideAvailability { nearest }.into());
        }

        let window = TimeInterval::new(
            proposed.start - Duration::days(1),
            proposed.end + Duration::days(1),
        )?;
        let busy = self
            .ledger
            .busy_intervals(user_id, &window, exclude_appointment_id)
            .await?;

        if let Some(conflict) = busy.into_iter().find(|b| b.overlaps(proposed)) {
            return Err(SchedulingError::DoubleBooked { conflict }.into());
        }

        Ok(())
    }
}

fn distance_seconds(open: &TimeInterval, proposed: &TimeInterval) -> i64 {
    if open.end <= proposed.start {
        (proposed.start - open.end).num_seconds()
    } else if open.start >= proposed.end {
        (open.start - proposed.end).num_seconds()
    } else {
        0
    }
}
