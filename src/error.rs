use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::{
    dao::storage::StorageError,
    state::{edit_lock::NotOwner, ledger::ConfirmError},
};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The line was confirmed before.
    #[error("{0}")]
    AlreadyConfirmed(String),
    /// Another session holds a live edit lock.
    #[error("board is locked by another session ({remaining_ms} ms remaining)")]
    LockDenied { remaining_ms: i64 },
    /// Release attempted by a session that does not own the lock.
    #[error("lock is owned by another session")]
    NotOwner,
    /// The change would flip cells that belong to confirmed lines.
    #[error("cells {cells:?} belong to confirmed lines and cannot change")]
    CellLocked { cells: Vec<u8> },
    /// Storage backend is unavailable.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

impl From<ConfirmError> for ServiceError {
    fn from(err: ConfirmError) -> Self {
        match err {
            ConfirmError::MalformedLine(message) => ServiceError::InvalidInput(message),
            already @ ConfirmError::AlreadyConfirmed(_) => {
                ServiceError::AlreadyConfirmed(already.to_string())
            }
        }
    }
}

impl From<NotOwner> for ServiceError {
    fn from(_: NotOwner) -> Self {
        ServiceError::NotOwner
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Caller is not allowed to perform the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Conflict with current state.
    #[error("conflict: {message}")]
    Conflict {
        message: String,
        remaining_ms: Option<i64>,
    },
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    fn conflict(message: String) -> Self {
        AppError::Conflict {
            message,
            remaining_ms: None,
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::AlreadyConfirmed(message) => AppError::conflict(message),
            err @ ServiceError::LockDenied { remaining_ms } => AppError::Conflict {
                message: err.to_string(),
                remaining_ms: Some(remaining_ms),
            },
            err @ ServiceError::NotOwner => AppError::Forbidden(err.to_string()),
            err @ ServiceError::CellLocked { .. } => AppError::conflict(err.to_string()),
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::Degraded => AppError::ServiceUnavailable("degraded mode".into()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    remaining_ms: Option<i64>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, remaining_ms) = match &self {
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, None),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, None),
            AppError::Conflict { remaining_ms, .. } => (StatusCode::CONFLICT, *remaining_ms),
            AppError::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, None),
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
            remaining_ms,
        });

        (status, payload).into_response()
    }
}
