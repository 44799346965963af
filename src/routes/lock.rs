use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use axum_valid::Valid;

use crate::{
    dto::lock::{AcquireLockRequest, AcquireLockResponse, LockStatusResponse, ReleaseLockQuery},
    error::AppError,
    services::lock_service,
    state::SharedState,
};

/// Edit lock routes of a single board.
pub fn router() -> Router<SharedState> {
    Router::new().route(
        "/boards/{board}/lock",
        get(lock_status).post(acquire_lock).delete(release_lock),
    )
}

/// Current edit lock of a board.
#[utoipa::path(
    get,
    path = "/boards/{board}/lock",
    tag = "locks",
    params(("board" = String, Path, description = "Board name")),
    responses((status = 200, description = "Live lock state", body = LockStatusResponse))
)]
pub async fn lock_status(
    State(state): State<SharedState>,
    Path(board): Path<String>,
) -> Result<Json<LockStatusResponse>, AppError> {
    Ok(Json(lock_service::status(&state, &board).await?))
}

/// Acquire or renew the edit lock.
#[utoipa::path(
    post,
    path = "/boards/{board}/lock",
    tag = "locks",
    params(("board" = String, Path, description = "Board name")),
    request_body = AcquireLockRequest,
    responses(
        (status = 200, description = "Lock granted", body = AcquireLockResponse),
        (status = 409, description = "Locked by another session; body carries `remaining_ms`"),
    )
)]
pub async fn acquire_lock(
    State(state): State<SharedState>,
    Path(board): Path<String>,
    Valid(Json(payload)): Valid<Json<AcquireLockRequest>>,
) -> Result<Json<AcquireLockResponse>, AppError> {
    let response = lock_service::acquire(&state, &board, &payload.session_id).await?;
    Ok(Json(response))
}

/// Release the edit lock.
#[utoipa::path(
    delete,
    path = "/boards/{board}/lock",
    tag = "locks",
    params(("board" = String, Path, description = "Board name"), ReleaseLockQuery),
    responses(
        (status = 204, description = "Lock released"),
        (status = 403, description = "Lock owned by another session"),
    )
)]
pub async fn release_lock(
    State(state): State<SharedState>,
    Path(board): Path<String>,
    Valid(Query(query)): Valid<Query<ReleaseLockQuery>>,
) -> Result<StatusCode, AppError> {
    lock_service::release(&state, &board, query.session_id.as_deref()).await?;
    Ok(StatusCode::NO_CONTENT)
}
