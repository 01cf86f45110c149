use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::api::middleware::{ApiError, ApiResult, AppState, AuthenticatedProvider};
use crate::models::{
    CreateServiceRequest, ServiceListResponse, ServiceOffering, UpdateServiceRequest,
};

pub async fn create_service(
    State(state): State<AppState>,
    axum::Extension(provider): axum::Extension<AuthenticatedProvider>,
    Json(request): Json<CreateServiceRequest>,
) -> ApiResult<(StatusCode, Json<ServiceOffering>)> {
    validate_service_fields(&request.title, request.duration_minutes, request.price)?;

    let service = ServiceOffering::new(
        provider.id().to_string(),
        request.title,
        request.description,
        request.duration_minutes,
        request.price,
    );
    state.db.create_service_offering(&service).await?;

    Ok((StatusCode::CREATED, Json(service)))
}

pub async fn list_services(
    State(state): State<AppState>,
    axum::Extension(provider): axum::Extension<AuthenticatedProvider>,
) -> ApiResult<Json<ServiceListResponse>> {
    let services = state.db.list_service_offerings(provider.id()).await?;

    Ok(Json(ServiceListResponse {
        count: services.len() as i64,
        services,
    }))
}

pub async fn get_service(
    State(state): State<AppState>,
    axum::Extension(provider): axum::Extension<AuthenticatedProvider>,
    Path(id): Path<String>,
) -> ApiResult<Json<ServiceOffering>> {
    let service = state
        .db
        .get_service_offering(provider.id(), &id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Service {} not found", id)))?;

    Ok(Json(service))
}

pub async fn update_service(
    State(state): State<AppState>,
    axum::Extension(provider): axum::Extension<AuthenticatedProvider>,
    Path(id): Path<String>,
    Json(request): Json<UpdateServiceRequest>,
) -> ApiResult<Json<ServiceOffering>> {
    let mut service = state
        .db
        .get_service_offering(provider.id(), &id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Service {} not found", id)))?;

    if let Some(title) = request.title {
        service.title = title;
    }
    if let Some(description) = request.description {
        service.description = description;
    }
    if let Some(duration_minutes) = request.duration_minutes {
        service.duration_minutes = duration_minutes;
    }
    if let Some(price) = request.price {
        service.price = price;
    }
    if let Some(active) = request.active {
        service.active = active;
    }
    validate_service_fields(&service.title, service.duration_minutes, service.price)?;
    service.updated_at = chrono::Utc::now().to_rfc3339();

    state.db.update_service_offering(&service).await?;

    Ok(Json(service))
}

pub async fn delete_service(
    State(state): State<AppState>,
    axum::Extension(provider): axum::Extension<AuthenticatedProvider>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .db
        .get_service_offering(provider.id(), &id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Service {} not found", id)))?;

    state.db.delete_service_offering(provider.id(), &id).await?;

    Ok(StatusCode::NO_CONTENT)
}

fn validate_service_fields(title: &str, duration_minutes: i64, price: f64) -> ApiResult<()> {
    if title.trim().is_empty() {
        return Err(ApiError::BadRequest("title is required".to_string()));
    }
    if duration_minutes <= 0 {
        return Err(ApiError::BadRequest(
            "duration_minutes must be positive".to_string(),
        ));
    }
    if price < 0.0 {
        return Err(ApiError::BadRequest("price must not be negative".to_string()));
    }
    Ok(())
}
