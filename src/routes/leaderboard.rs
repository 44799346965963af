use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::leaderboard::LeaderboardResponse, error::AppError, services::leaderboard_service,
    state::SharedState,
};

#[utoipa::path(
    get,
    path = "/leaderboard",
    tag = "leaderboard",
    responses((status = 200, description = "Boards ranked by confirmed lines, then marked cells", body = LeaderboardResponse))
)]
/// Rank every board.
pub async fn leaderboard(
    State(state): State<SharedState>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    Ok(Json(leaderboard_service::leaderboard(&state).await?))
}

/// Configure the leaderboard route.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/leaderboard", get(leaderboard))
}
