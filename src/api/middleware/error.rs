use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use crate::domain::errors::SchedulingError;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized,
    Internal(String),
    Conflict(String),
    /// Engine-level booking conflict; rendered with structured detail so
    /// callers can adjust and retry
    Scheduling(SchedulingError),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized => write!(f, "Unauthorized"),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::Scheduling(err) => write!(f, "Conflict: {}", err),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Unauthorized" }),
            ),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg })),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            ApiError::Scheduling(err) => scheduling_conflict_body(err),
        };

        (status, Json(body)).into_response()
    }
}

/// Conflict responses carry the data a caller needs to adjust the
/// request: the nearest open interval, the conflicting time range, or
/// the per-date conflict list. Never the other party's appointment id.
fn scheduling_conflict_body(err: SchedulingError) -> (StatusCode, serde_json::Value) {
    let message = err.to_string();
    match err {
        SchedulingError::OutsideAvailability { nearest } => (
            StatusCode::CONFLICT,
            json!({ "error": message, "nearest_open": nearest }),
        ),
        SchedulingError::DoubleBooked { conflict } => (
            StatusCode::CONFLICT,
            json!({ "error": message, "conflict": conflict }),
        ),
        SchedulingError::RecurrenceConflicts(conflicts) => (
            StatusCode::CONFLICT,
            json!({ "error": message, "conflicts": conflicts }),
        ),
        // Non-conflict engine errors are normally mapped before reaching
        // this variant; degrade sensibly if one slips through
        SchedulingError::NotFound(_) => (StatusCode::NOT_FOUND, json!({ "error": message })),
        SchedulingError::Persistence(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": message }))
        }
        _ => (StatusCode::BAD_REQUEST, json!({ "error": message })),
    }
}

impl From<SchedulingError> for ApiError {
    fn from(err: SchedulingError) -> Self {
        match err {
            SchedulingError::InvalidInterval | SchedulingError::Validation(_) => {
                ApiError::BadRequest(err.to_string())
            }
            SchedulingError::NotFound(what) => ApiError::NotFound(what),
            SchedulingError::Persistence(msg) => ApiError::Internal(msg),
            conflict => ApiError::Scheduling(conflict),
        }
    }
}

// Convert from sqlx errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                // Check for unique constraint violations
                let message = db_err.message();
                if message.contains("UNIQUE") || message.contains("unique") {
                    ApiError::Conflict("Resource already exists".to_string())
                } else {
                    ApiError::Internal(format!("Database error: {}", message))
                }
            }
            _ => ApiError::Internal(format!("DBG Internal server error: {:?}", err)),
        }
    }
}

// Convert from argon2 errors
impl From<argon2::password_hash::Error> for ApiError {
    fn from(_: argon2::password_hash::Error) -> Self {
        ApiError::Internal("Password hashing error".to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
