use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::admin::ResetResponse, error::AppError, services::admin_service, state::SharedState,
};

/// Administrative endpoints.
pub fn router() -> Router<SharedState> {
    Router::new().route("/admin/reset", post(reset_all))
}

/// Wipe every board: marks, comments, center text, confirmed lines, counters and locks.
#[utoipa::path(
    post,
    path = "/admin/reset",
    tag = "admin",
    responses((status = 200, description = "All boards reset", body = ResetResponse))
)]
pub async fn reset_all(State(state): State<SharedState>) -> Result<Json<ResetResponse>, AppError> {
    Ok(Json(admin_service::reset_all(&state).await?))
}
