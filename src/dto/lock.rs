//! Payloads of the edit lock routes.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    dto::validation::validate_session_id,
    state::{clock::iso_timestamp, edit_lock::LockView},
};

/// Live lock state of a board.
#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
pub struct LockStatusResponse {
    pub locked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_session_id: Option<String>,
    /// ISO-8601 time of the last acquire/renew.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acquired_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_ms: Option<i64>,
}

impl From<LockView> for LockStatusResponse {
    fn from(view: LockView) -> Self {
        match view {
            LockView::Unlocked => Self {
                locked: false,
                owner_session_id: None,
                acquired_at: None,
                remaining_ms: None,
            },
            LockView::Held {
                owner,
                acquired_at_ms,
                remaining_ms,
            } => Self {
                locked: true,
                owner_session_id: Some(owner),
                acquired_at: Some(iso_timestamp(acquired_at_ms)),
                remaining_ms: Some(remaining_ms),
            },
        }
    }
}

/// Ask for the edit lock of a board.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AcquireLockRequest {
    #[validate(custom(function = "validate_session_id"))]
    pub session_id: String,
}

/// Granted lock.
#[derive(Debug, Serialize, ToSchema)]
pub struct AcquireLockResponse {
    pub session_id: String,
    /// True when the session already held the lock and only refreshed it.
    pub renewed: bool,
    pub acquired_at: String,
    pub expires_in_ms: i64,
}

/// Release parameters. Without a session id the lock is released unconditionally.
#[derive(Debug, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct ReleaseLockQuery {
    #[validate(custom(function = "validate_session_id"))]
    pub session_id: Option<String>,
}
