use std::sync::Arc;

use futures::future::try_join_all;

use crate::{
    dao::{board::BoardRepository, kv_store::KvStore, storage::StorageResult},
    dto::leaderboard::LeaderboardResponse,
    error::ServiceError,
    services::board_service::count,
    state::{
        SharedState,
        leaderboard::{self, BoardStats},
    },
};

/// Counters of one board, taken from the card and the ledger rather than their projections.
async fn board_stats(store: Arc<dyn KvStore>, board: String) -> StorageResult<BoardStats> {
    let repo = BoardRepository::new(store, board.clone());
    let ledger = repo.ledger().await?;
    let marked = repo.marked_cells().await?;
    Ok(BoardStats {
        confirmed_count: count(ledger.confirmed_count()),
        marked_count: count(marked.len()),
        first_confirmed_at: ledger.first_confirmed_at().map(str::to_owned),
        board,
    })
}

/// Rank every configured board.
pub async fn leaderboard(state: &SharedState) -> Result<LeaderboardResponse, ServiceError> {
    let store = state.require_kv_store().await?;
    let stats = try_join_all(
        state
            .config()
            .boards()
            .iter()
            .map(|board| board_stats(store.clone(), board.clone())),
    )
    .await?;

    Ok(leaderboard::rank(stats).into())
}
