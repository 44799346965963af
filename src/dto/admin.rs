//! DTO definitions used by the admin and roster routes.

use serde::Serialize;
use utoipa::ToSchema;

/// Outcome of a full reset.
#[derive(Debug, Serialize, ToSchema)]
pub struct ResetResponse {
    pub message: String,
    /// Boards whose keys were wiped.
    pub boards: Vec<String>,
}

/// Configured boards, in display order.
#[derive(Debug, Serialize, ToSchema)]
pub struct BoardListResponse {
    pub boards: Vec<String>,
}

/// Fresh session token for clients that do not generate their own.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub session_id: String,
}
