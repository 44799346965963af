use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::admin::{BoardListResponse, SessionResponse},
    services::admin_service,
    state::SharedState,
};

/// Roster and session endpoints that need no storage.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/theatres", get(list_boards))
        .route("/sessions", post(issue_session))
}

/// List the configured boards.
#[utoipa::path(
    get,
    path = "/theatres",
    tag = "boards",
    responses((status = 200, description = "Configured boards", body = BoardListResponse))
)]
pub async fn list_boards(State(state): State<SharedState>) -> Json<BoardListResponse> {
    Json(admin_service::list_boards(&state))
}

/// Issue a random session token usable for edit locks.
#[utoipa::path(
    post,
    path = "/sessions",
    tag = "locks",
    responses((status = 200, description = "New session", body = SessionResponse))
)]
pub async fn issue_session() -> Json<SessionResponse> {
    Json(admin_service::issue_session())
}
