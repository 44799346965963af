//! Roster listing, session issuing and the global reset.

use tracing::warn;
use uuid::Uuid;

use crate::{
    dao::board::BoardRepository,
    dto::admin::{BoardListResponse, ResetResponse, SessionResponse},
    error::ServiceError,
    state::SharedState,
};

/// Configured board roster.
pub fn list_boards(state: &SharedState) -> BoardListResponse {
    BoardListResponse {
        boards: state.config().boards().to_vec(),
    }
}

/// Hand out a random session token. Sessions are self-asserted; nothing is stored.
pub fn issue_session() -> SessionResponse {
    SessionResponse {
        session_id: Uuid::new_v4().to_string(),
    }
}

/// Delete every key of every configured board, locks included.
pub async fn reset_all(state: &SharedState) -> Result<ResetResponse, ServiceError> {
    let store = state.require_kv_store().await?;
    let boards = state.config().boards().to_vec();

    for board in &boards {
        BoardRepository::new(store.clone(), board.clone())
            .clear()
            .await?;
    }

    warn!(count = boards.len(), "all boards reset");
    Ok(ResetResponse {
        message: "All boards reset".into(),
        boards,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::kv_store::memory::MemoryKvStore,
        services::{board_service, lock_service},
        state::{AppState, geometry::LineKind},
    };

    #[tokio::test]
    async fn reset_wipes_every_board() {
        let store = MemoryKvStore::new();
        let state = AppState::new(AppConfig::default());
        state.install_kv_store(Arc::new(store.clone())).await;

        board_service::set_marked_cells(&state, "ARCO", vec![0, 1, 2, 3, 4])
            .await
            .unwrap();
        board_service::confirm_line(&state, "ARCO", LineKind::Row, 0, vec![0, 1, 2, 3, 4])
            .await
            .unwrap();
        board_service::upsert_comment(&state, "Annenberg", 1, Some("hi".into()))
            .await
            .unwrap();
        lock_service::acquire(&state, "ARCO", "A").await.unwrap();

        let response = reset_all(&state).await.unwrap();
        assert_eq!(response.boards.len(), 6);
        assert!(store.is_empty());

        let view = board_service::get_board(&state, "ARCO").await.unwrap();
        assert_eq!(view.confirmed_count, 0);
        assert!(view.locked_cells.is_empty());
    }

    #[test]
    fn sessions_are_unique() {
        assert_ne!(issue_session().session_id, issue_session().session_id);
    }
}
