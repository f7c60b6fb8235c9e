//! API error types with IntoResponse
//!
//! Errors are converted to JSON `{error, message}` bodies with matching
//! status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::DbError;
use crate::models::ValidationError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Validation failed (400)
    Validation(ValidationError),

    /// Missing or unknown session, bad credentials (401)
    Unauthorized { reason: String },

    /// Authenticated but not allowed (403)
    Forbidden { reason: String },

    /// Resource not found (404)
    NotFound { resource: &'static str, id: String },

    /// Duplicate or state conflict (409)
    Conflict { message: String },

    /// Database error (500, logged)
    Database(DbError),
}

impl ApiError {
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized {
            reason: reason.into(),
        }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Validation(e) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "validation_error",
                    "message": e.to_string()
                }),
            ),
            Self::Unauthorized { reason } => (
                StatusCode::UNAUTHORIZED,
                json!({
                    "error": "unauthorized",
                    "message": reason
                }),
            ),
            Self::Forbidden { reason } => (
                StatusCode::FORBIDDEN,
                json!({
                    "error": "forbidden",
                    "message": reason
                }),
            ),
            Self::NotFound { resource, id } => (
                StatusCode::NOT_FOUND,
                json!({
                    "error": "not_found",
                    "message": format!("{} '{}' not found", resource, id)
                }),
            ),
            Self::Conflict { message } => (
                StatusCode::CONFLICT,
                json!({
                    "error": "conflict",
                    "message": message
                }),
            ),
            Self::Database(e) => {
                // Log the actual error, return generic message
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "internal_error",
                        "message": "an internal error occurred"
                    }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { resource, id } => Self::NotFound { resource, id },
            DbError::Conflict { resource, id } => Self::Conflict {
                message: format!("{} '{}' already exists", resource, id),
            },
            DbError::Sqlx(_) => Self::Database(e),
        }
    }
}
