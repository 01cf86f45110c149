use axum::{extract::State, http::StatusCode, Json};

use crate::api::middleware::{ApiResult, AppState, AuthenticatedProvider};
use crate::models::{LoginRequest, LoginResponse, ProviderResponse};
use crate::services::auth;

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let auth_result = auth::authenticate(
        &state.db,
        &request.email,
        &request.password,
        state.session_duration_hours,
    )
    .await?;

    Ok(Json(LoginResponse {
        token: auth_result.session.token,
        expires_at: auth_result.session.expires_at,
        provider: ProviderResponse::from(&auth_result.user),
    }))
}

pub async fn logout(
    State(state): State<AppState>,
    axum::Extension(provider): axum::Extension<AuthenticatedProvider>,
) -> ApiResult<StatusCode> {
    state.db.delete_session(&provider.token).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn me(
    axum::Extension(provider): axum::Extension<AuthenticatedProvider>,
) -> ApiResult<Json<ProviderResponse>> {
    Ok(Json(ProviderResponse::from(&provider.user)))
}
