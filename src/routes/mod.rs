use axum::Router;

use crate::state::SharedState;

/// Administrative routes.
pub mod admin;
/// Card and line routes.
pub mod board;
/// Swagger UI.
pub mod docs;
/// Health routes.
pub mod health;
/// Leaderboard route.
pub mod leaderboard;
/// Edit lock routes.
pub mod lock;
/// Roster and session routes.
pub mod public;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(public::router())
        .merge(board::router())
        .merge(lock::router())
        .merge(leaderboard::router())
        .merge(admin::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
