use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, ApiResult, AppState, AuthenticatedProvider};
use crate::models::{
    parse_date, CreateNonWorkingDayRequest, NonWorkingDay, NonWorkingDayListResponse,
    UpsertDayScheduleRequest, WeeklySchedule, WeeklyScheduleResponse,
};

pub async fn get_weekly_schedule(
    State(state): State<AppState>,
    axum::Extension(provider): axum::Extension<AuthenticatedProvider>,
) -> ApiResult<Json<WeeklyScheduleResponse>> {
    let days = state.db.get_weekly_schedule(provider.id()).await?;

    Ok(Json(WeeklyScheduleResponse { days }))
}

#[derive(Deserialize)]
pub struct ReplaceWeekEntry {
    pub weekday: i64,
    #[serde(flatten)]
    pub day: UpsertDayScheduleRequest,
}

#[derive(Deserialize)]
pub struct ReplaceWeekRequest {
    pub days: Vec<ReplaceWeekEntry>,
}

/// `PUT /api/schedule` replaces several days at once. Each entry is a
/// full-day replace; days not named keep their current record.
pub async fn replace_weekly_schedule(
    State(state): State<AppState>,
    axum::Extension(provider): axum::Extension<AuthenticatedProvider>,
    Json(request): Json<ReplaceWeekRequest>,
) -> ApiResult<Json<WeeklyScheduleResponse>> {
    for entry in &request.days {
        validate_weekday(entry.weekday)?;
        entry.day.validate().map_err(ApiError::BadRequest)?;
    }

    for entry in request.days {
        let day = day_record(provider.id(), entry.weekday, entry.day);
        state.db.replace_day_schedule(&day).await?;
    }

    let days = state.db.get_weekly_schedule(provider.id()).await?;
    Ok(Json(WeeklyScheduleResponse { days }))
}

/// `PUT /api/schedule/:weekday` is a full replace of one day: the
/// caller supplies every field, nothing is merged.
pub async fn replace_day_schedule(
    State(state): State<AppState>,
    axum::Extension(provider): axum::Extension<AuthenticatedProvider>,
    Path(weekday): Path<i64>,
    Json(request): Json<UpsertDayScheduleRequest>,
) -> ApiResult<Json<WeeklySchedule>> {
    validate_weekday(weekday)?;
    request.validate().map_err(ApiError::BadRequest)?;

    let day = day_record(provider.id(), weekday, request);
    state.db.replace_day_schedule(&day).await?;

    // the upsert keeps the existing row's id, so return the stored record
    let stored = state
        .db
        .get_weekly_schedule(provider.id())
        .await?
        .into_iter()
        .find(|d| d.weekday == weekday)
        .ok_or_else(|| ApiError::Internal("Replaced day schedule disappeared".to_string()))?;

    Ok(Json(stored))
}

pub async fn list_non_working_days(
    State(state): State<AppState>,
    axum::Extension(provider): axum::Extension<AuthenticatedProvider>,
) -> ApiResult<Json<NonWorkingDayListResponse>> {
    let days = state.db.list_non_working_days(provider.id()).await?;

    Ok(Json(NonWorkingDayListResponse {
        count: days.len() as i64,
        days,
    }))
}

pub async fn create_non_working_day(
    State(state): State<AppState>,
    axum::Extension(provider): axum::Extension<AuthenticatedProvider>,
    Json(request): Json<CreateNonWorkingDayRequest>,
) -> ApiResult<(StatusCode, Json<NonWorkingDay>)> {
    parse_date(&request.date).map_err(ApiError::BadRequest)?;

    let day = NonWorkingDay::new(
        provider.id().to_string(),
        request.date,
        request.description.unwrap_or_default(),
    );
    state.db.create_non_working_day(&day).await?;

    Ok((StatusCode::CREATED, Json(day)))
}

pub async fn delete_non_working_day(
    State(state): State<AppState>,
    axum::Extension(provider): axum::Extension<AuthenticatedProvider>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .db
        .get_non_working_day(provider.id(), &id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Non-working day {} not found", id)))?;

    state.db.delete_non_working_day(provider.id(), &id).await?;

    Ok(StatusCode::NO_CONTENT)
}

fn validate_weekday(weekday: i64) -> ApiResult<()> {
    if !(0..=6).contains(&weekday) {
        return Err(ApiError::BadRequest(format!(
            "Invalid weekday {} (expected 0-6, 0 = Monday)",
            weekday
        )));
    }
    Ok(())
}

fn day_record(user_id: &str, weekday: i64, request: UpsertDayScheduleRequest) -> WeeklySchedule {
    WeeklySchedule::new(
        user_id.to_string(),
        weekday,
        request.is_working_day,
        request.start_time,
        request.end_time,
        request.break_start,
        request.break_end,
    )
}
