use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Duration;
use serde::Deserialize;

use crate::api::middleware::{ApiError, ApiResult, AppState, AuthenticatedProvider};
use crate::models::{
    parse_date, Appointment, AppointmentListResponse, AppointmentStatus,
    CreateAppointmentRequest, RecurringAppointmentRequest, RecurringSeriesResponse,
    RescheduleAppointmentRequest, ServiceOffering, UpdateAppointmentStatusRequest,
};
use crate::services::calendar::{self, TimeInterval};

pub async fn create_appointment(
    State(state): State<AppState>,
    axum::Extension(provider): axum::Extension<AuthenticatedProvider>,
    Json(request): Json<CreateAppointmentRequest>,
) -> ApiResult<(StatusCode, Json<Appointment>)> {
    let offering = resolve_offering(&state, provider.id(), request.service_id.as_deref()).await?;
    ensure_client_exists(&state, provider.id(), request.client_id.as_deref()).await?;

    let start = calendar::parse_datetime(&request.start)?;
    let end = match &request.end {
        Some(end) => calendar::parse_datetime(end)?,
        None => {
            let minutes = offering
                .as_ref()
                .map(|service| service.duration_minutes)
                .ok_or_else(|| {
                    ApiError::BadRequest(
                        "Either end or service_id is required to size the appointment".to_string(),
                    )
                })?;
            start + Duration::minutes(minutes)
        }
    };
    let price = request
        .price
        .or(offering.as_ref().map(|service| service.price))
        .unwrap_or(0.0);

    let interval = TimeInterval::new(start, end)?;
    let appointment = state
        .booking_service
        .book(
            provider.id(),
            request.client_id,
            request.service_id,
            interval,
            price,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(appointment)))
}

#[derive(Deserialize)]
pub struct ListAppointmentsParams {
    pub from: Option<String>,
    pub to: Option<String>,
    pub status: Option<String>,
}

pub async fn list_appointments(
    State(state): State<AppState>,
    axum::Extension(provider): axum::Extension<AuthenticatedProvider>,
    Query(params): Query<ListAppointmentsParams>,
) -> ApiResult<Json<AppointmentListResponse>> {
    // Date bounds are inclusive calendar days, widened to datetime bounds
    let from = match &params.from {
        Some(from) => {
            let date = parse_date(from).map_err(ApiError::BadRequest)?;
            format!("{}T00:00:00Z", date.format("%Y-%m-%d"))
        }
        None => "0001-01-01T00:00:00Z".to_string(),
    };
    let to = match &params.to {
        Some(to) => {
            let date = parse_date(to).map_err(ApiError::BadRequest)? + Duration::days(1);
            format!("{}T00:00:00Z", date.format("%Y-%m-%d"))
        }
        None => "9999-12-31T00:00:00Z".to_string(),
    };
    let status = match &params.status {
        Some(status) => Some(
            status
                .parse::<AppointmentStatus>()
                .map_err(ApiError::BadRequest)?,
        ),
        None => None,
    };

    let appointments = state
        .db
        .list_appointments_between(provider.id(), &from, &to, status.as_ref())
        .await?;

    Ok(Json(AppointmentListResponse {
        count: appointments.len() as i64,
        appointments,
    }))
}

pub async fn get_appointment(
    State(state): State<AppState>,
    axum::Extension(provider): axum::Extension<AuthenticatedProvider>,
    Path(id): Path<String>,
) -> ApiResult<Json<Appointment>> {
    let appointment = state
        .db
        .get_appointment(provider.id(), &id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Appointment {} not found", id)))?;

    Ok(Json(appointment))
}

pub async fn reschedule_appointment(
    State(state): State<AppState>,
    axum::Extension(provider): axum::Extension<AuthenticatedProvider>,
    Path(id): Path<String>,
    Json(request): Json<RescheduleAppointmentRequest>,
) -> ApiResult<Json<Appointment>> {
    let interval = TimeInterval::new(
        calendar::parse_datetime(&request.start)?,
        calendar::parse_datetime(&request.end)?,
    )?;

    let appointment = state
        .booking_service
        .reschedule(provider.id(), &id, interval)
        .await?;

    Ok(Json(appointment))
}

pub async fn update_appointment_status(
    State(state): State<AppState>,
    axum::Extension(provider): axum::Extension<AuthenticatedProvider>,
    Path(id): Path<String>,
    Json(request): Json<UpdateAppointmentStatusRequest>,
) -> ApiResult<Json<Appointment>> {
    let appointment = state
        .booking_service
        .transition_status(provider.id(), &id, request.status)
        .await?;

    Ok(Json(appointment))
}

pub async fn delete_appointment(
    State(state): State<AppState>,
    axum::Extension(provider): axum::Extension<AuthenticatedProvider>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.booking_service.delete(provider.id(), &id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/appointments/recurring`: all-or-nothing series creation.
/// Any conflicting occurrence rejects the whole batch with a per-date
/// conflict list.
pub async fn create_recurring_appointments(
    State(state): State<AppState>,
    axum::Extension(provider): axum::Extension<AuthenticatedProvider>,
    Json(request): Json<RecurringAppointmentRequest>,
) -> ApiResult<(StatusCode, Json<RecurringSeriesResponse>)> {
    let offering = resolve_offering(&state, provider.id(), request.service_id.as_deref()).await?;
    ensure_client_exists(&state, provider.id(), request.client_id.as_deref()).await?;

    let base = TimeInterval::new(
        calendar::parse_datetime(&request.start)?,
        calendar::parse_datetime(&request.end)?,
    )?;
    let until = parse_date(&request.until).map_err(ApiError::BadRequest)?;
    let price = request
        .price
        .or(offering.as_ref().map(|service| service.price))
        .unwrap_or(0.0);

    let appointments = state
        .booking_service
        .book_recurring(
            provider.id(),
            request.client_id,
            request.service_id,
            base,
            &request.weekdays,
            until,
            price,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RecurringSeriesResponse {
            count: appointments.len() as i64,
            appointments,
        }),
    ))
}

async fn resolve_offering(
    state: &AppState,
    user_id: &str,
    service_id: Option<&str>,
) -> ApiResult<Option<ServiceOffering>> {
    match service_id {
        Some(service_id) => {
            let offering = state
                .db
                .get_service_offering(user_id, service_id)
                .await?
                .ok_or_else(|| ApiError::NotFound(format!("Service {} not found", service_id)))?;
            Ok(Some(offering))
        }
        None => Ok(None),
    }
}

async fn ensure_client_exists(
    state: &AppState,
    user_id: &str,
    client_id: Option<&str>,
) -> ApiResult<()> {
    if let Some(client_id) = client_id {
        state
            .db
            .get_client(user_id, client_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Client {} not found", client_id)))?;
    }
    Ok(())
}
