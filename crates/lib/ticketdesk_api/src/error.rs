//! Application error types.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use ticketdesk_core::auth::AuthError;
use ticketdesk_core::notify::NotifyError;
use ticketdesk_core::store::StoreError;
use ticketdesk_core::tickets::TicketError;
use tracing::error;

use crate::models::ErrorResponse;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The mutation committed but the assignee could not be notified.
    #[error("Notification failed: {0}")]
    Notification(String),

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AppError::Validation(m) => (StatusCode::BAD_REQUEST, "validation_error", m.as_str()),
            AppError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, "unauthorized", m.as_str()),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m.as_str()),
            AppError::Conflict(m) => (StatusCode::CONFLICT, "conflict", m.as_str()),
            AppError::Notification(m) => {
                error!(detail = %m, "notification failed after commit");
                (StatusCode::BAD_GATEWAY, "notification_failed", m.as_str())
            }
            AppError::Internal(detail) => {
                error!(detail = %detail, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error",
                )
            }
        };
        let body = Json(ErrorResponse {
            error: error.to_string(),
            message: message.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(m) => AppError::Conflict(m),
            StoreError::Constraint(m) => AppError::Validation(m),
            StoreError::Db(_) | StoreError::Unavailable(_) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            e if e.is_unauthorized() => AppError::Unauthorized(e.to_string()),
            AuthError::ValidationError(msg) => AppError::Validation(msg),
            AuthError::DuplicateEmail => AppError::Conflict("Email already registered".into()),
            AuthError::Store(e) => AppError::from(e),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<TicketError> for AppError {
    fn from(e: TicketError) -> Self {
        match e {
            TicketError::NotFound(what) => AppError::NotFound(format!("{what} not found")),
            TicketError::NoFieldsToUpdate => AppError::NotFound(e.to_string()),
            TicketError::Validation(msg) => AppError::Validation(msg),
            TicketError::Store(e) => AppError::from(e),
        }
    }
}

impl From<NotifyError> for AppError {
    fn from(e: NotifyError) -> Self {
        AppError::Notification(e.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::Validation(format!("Invalid input format: {}", e.body_text()))
    }
}

impl From<PathRejection> for AppError {
    fn from(_: PathRejection) -> Self {
        AppError::Validation("Invalid ID".into())
    }
}
