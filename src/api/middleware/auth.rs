use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::api::middleware::error::ApiError;
use crate::database::Database;
use crate::events::EventBus;
use crate::models::User;
use crate::services::{AvailabilityService, BookingService, SlotService};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub session_duration_hours: i64,
    pub event_bus: EventBus,
    pub availability_service: AvailabilityService,
    pub slot_service: SlotService,
    pub booking_service: BookingService,
}

/// Extract and validate the session token from the Authorization header,
/// then attach the acting provider to the request. Expired sessions are
/// deleted on sight.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let token = match auth_header.and_then(|value| value.strip_prefix("Bearer ")) {
        Some(token) => token,
        None => return Err(ApiError::Unauthorized),
    };

    let session = state
        .db
        .get_session_by_token(token)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    if session.is_expired() {
        state.db.delete_session(token).await.ok();
        return Err(ApiError::Unauthorized);
    }

    // Sliding expiry: each authenticated request pushes the session out
    let _ = state
        .db
        .extend_session(token, state.session_duration_hours)
        .await;

    let user = state
        .db
        .get_user_by_id(&session.user_id)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    let token = token.to_string();
    request.extensions_mut().insert(AuthenticatedProvider {
        user,
        token,
    });

    Ok(next.run(request).await)
}

/// The acting provider, threaded explicitly into every engine call and
/// ownership filter. The engine never resolves an ambient current user.
#[derive(Clone)]
pub struct AuthenticatedProvider {
    pub user: User,
    pub token: String,
}

impl AuthenticatedProvider {
    pub fn id(&self) -> &str {
        &self.user.id
    }
}
