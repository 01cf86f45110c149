use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::api::middleware::{ApiError, ApiResult, AppState, AuthenticatedProvider};
use crate::models::{Client, ClientListResponse, CreateClientRequest, UpdateClientRequest};
use crate::services::auth::validate_and_normalize_email;

pub async fn create_client(
    State(state): State<AppState>,
    axum::Extension(provider): axum::Extension<AuthenticatedProvider>,
    Json(request): Json<CreateClientRequest>,
) -> ApiResult<(StatusCode, Json<Client>)> {
    if request.first_name.trim().is_empty() {
        return Err(ApiError::BadRequest("first_name is required".to_string()));
    }
    let email = match &request.email {
        Some(email) => Some(validate_and_normalize_email(email)?),
        None => None,
    };

    let client = Client::new(
        provider.id().to_string(),
        request.first_name,
        request.last_name,
        email,
        request.phone,
        request.notes,
    );
    state.db.create_client(&client).await?;

    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn list_clients(
    State(state): State<AppState>,
    axum::Extension(provider): axum::Extension<AuthenticatedProvider>,
) -> ApiResult<Json<ClientListResponse>> {
    let clients = state.db.list_clients(provider.id()).await?;

    Ok(Json(ClientListResponse {
        count: clients.len() as i64,
        clients,
    }))
}

pub async fn get_client(
    State(state): State<AppState>,
    axum::Extension(provider): axum::Extension<AuthenticatedProvider>,
    Path(id): Path<String>,
) -> ApiResult<Json<Client>> {
    let client = state
        .db
        .get_client(provider.id(), &id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Client {} not found", id)))?;

    Ok(Json(client))
}

pub async fn update_client(
    State(state): State<AppState>,
    axum::Extension(provider): axum::Extension<AuthenticatedProvider>,
    Path(id): Path<String>,
    Json(request): Json<UpdateClientRequest>,
) -> ApiResult<Json<Client>> {
    let mut client = state
        .db
        .get_client(provider.id(), &id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Client {} not found", id)))?;

    if let Some(first_name) = request.first_name {
        if first_name.trim().is_empty() {
            return Err(ApiError::BadRequest("first_name must not be empty".to_string()));
        }
        client.first_name = first_name;
    }
    if let Some(last_name) = request.last_name {
        client.last_name = last_name;
    }
    if let Some(email) = request.email {
        client.email = match email {
            Some(email) => Some(validate_and_normalize_email(&email)?),
            None => None,
        };
    }
    if let Some(phone) = request.phone {
        client.phone = phone;
    }
    if let Some(notes) = request.notes {
        client.notes = notes;
    }
    client.updated_at = chrono::Utc::now().to_rfc3339();

    state.db.update_client(&client).await?;

    Ok(Json(client))
}

pub async fn delete_client(
    State(state): State<AppState>,
    axum::Extension(provider): axum::Extension<AuthenticatedProvider>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .db
        .get_client(provider.id(), &id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Client {} not found", id)))?;

    state.db.delete_client(provider.id(), &id).await?;

    Ok(StatusCode::NO_CONTENT)
}
