use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, ApiResult, AppState, AuthenticatedProvider};
use crate::models::{parse_date, AvailabilityResponse, SlotResponse};
use crate::services::calendar;

#[derive(Deserialize)]
pub struct AvailabilityParams {
    pub from: String,
    /// Defaults to `from` (single-day resolution)
    pub to: Option<String>,
    pub service_id: Option<String>,
    pub duration_minutes: Option<i64>,
    pub step_minutes: Option<i64>,
}

/// `GET /api/availability` lists bookable slots for the acting provider.
/// The duration comes either from an explicit `duration_minutes` or from
/// the referenced service offering.
pub async fn get_availability(
    State(state): State<AppState>,
    axum::Extension(provider): axum::Extension<AuthenticatedProvider>,
    Query(params): Query<AvailabilityParams>,
) -> ApiResult<Json<AvailabilityResponse>> {
    let from = parse_date(&params.from).map_err(ApiError::BadRequest)?;
    let to = match &params.to {
        Some(to) => parse_date(to).map_err(ApiError::BadRequest)?,
        None => from,
    };

    let duration_minutes = match (params.duration_minutes, &params.service_id) {
        (Some(minutes), _) => minutes,
        (None, Some(service_id)) => {
            state
                .db
                .get_service_offering(provider.id(), service_id)
                .await?
                .ok_or_else(|| ApiError::NotFound(format!("Service {} not found", service_id)))?
                .duration_minutes
        }
        (None, None) => {
            return Err(ApiError::BadRequest(
                "Either service_id or duration_minutes is required".to_string(),
            ))
        }
    };

    let slots = state
        .slot_service
        .resolve_slots(provider.id(), from, to, duration_minutes, params.step_minutes)
        .await?;

    Ok(Json(AvailabilityResponse {
        count: slots.len() as i64,
        slots: slots
            .iter()
            .map(|slot| SlotResponse {
                start: calendar::to_storage(&slot.start),
                end: calendar::to_storage(&slot.end),
            })
            .collect(),
    }))
}
