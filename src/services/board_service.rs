//! Card operations of a single board: marking, comments, center text and line confirmation.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::{
    dao::{board::BoardRepository, storage::StorageResult},
    dto::board::{
        BoardView, CenterTextResponse, CommentsResponse, ConfirmLineResponse,
        ConfirmedLineSummary, LineSummary, MarkedCellsResponse, comments_by_cell,
    },
    error::ServiceError,
    state::{
        SharedState,
        clock::iso_timestamp,
        geometry::{CELL_COUNT, CENTER_INDEX, LineKind, is_valid_cell},
        ledger::ConfirmationLedger,
        lines,
    },
};

/// Longest comment kept on a cell, in characters.
pub const MAX_COMMENT_CHARS: usize = 200;
/// Longest center cell text, in characters.
pub const MAX_CENTER_TEXT_CHARS: usize = 50;
/// Text shown on the center cell until somebody customises it.
pub const DEFAULT_CENTER_TEXT: &str = "FREE";

fn ensure_cell(cell: u8) -> Result<(), ServiceError> {
    if is_valid_cell(cell) {
        Ok(())
    } else {
        Err(ServiceError::InvalidInput(format!(
            "cell {cell} is out of range (expected 0..{})",
            CELL_COUNT - 1
        )))
    }
}

/// Trim `text` and cap it at `max_chars`; blank input yields `None`.
fn normalize_text(text: Option<&str>, max_chars: usize) -> Option<String> {
    let trimmed = text.map(str::trim).filter(|text| !text.is_empty())?;
    Some(trimmed.chars().take(max_chars).collect())
}

/// Saturating conversion of a collection size to a stored counter.
pub(crate) fn count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

/// Outcome of a projection write. Projections are rewritten in full by the next mutation,
/// so a failure is logged instead of failing a call whose source record is already stored.
fn log_projection(board: &str, projection: &'static str, result: StorageResult<()>) {
    if let Err(err) = result {
        warn!(board, projection, error = %err, "projection write failed");
    }
}

/// Card, comments, center text, lines and counters of `board`.
pub async fn get_board(state: &SharedState, board: &str) -> Result<BoardView, ServiceError> {
    let repo = state.board(board).await?;
    let marked = repo.marked_cells().await?;
    let comments = repo.comments().await?;
    let center_text = repo
        .center_text()
        .await?
        .unwrap_or_else(|| DEFAULT_CENTER_TEXT.to_owned());
    let ledger = repo.ledger().await?;

    Ok(BoardView {
        board: repo.board().to_owned(),
        comments: comments_by_cell(&comments),
        center_text,
        confirmed_lines: ledger.lines().iter().map(Into::into).collect(),
        locked_cells: lines::locked_cells(ledger.lines()).into_iter().collect(),
        pending_lines: lines::detect(&marked, ledger.lines())
            .into_iter()
            .map(Into::into)
            .collect(),
        confirmed_count: count(ledger.confirmed_count()),
        marked_count: count(marked.len()),
        first_confirmation: ledger.first_confirmed_at().map(str::to_owned),
        marked_cells: marked.into_iter().collect(),
    })
}

/// Persist `next` as the marked set unless it flips a locked cell.
///
/// The card is the only write that can fail the call; `markedCount` follows it as a projection.
async fn commit_marked(
    repo: &BoardRepository,
    ledger: &ConfirmationLedger,
    current: &BTreeSet<u8>,
    next: BTreeSet<u8>,
) -> Result<MarkedCellsResponse, ServiceError> {
    let flipped = lines::locked_cells(ledger.lines())
        .into_iter()
        .filter(|cell| *cell != CENTER_INDEX && current.contains(cell) != next.contains(cell))
        .collect::<Vec<_>>();
    if !flipped.is_empty() {
        return Err(ServiceError::CellLocked { cells: flipped });
    }

    let marked_count = count(next.len());
    repo.set_marked_cells(&next).await?;
    log_projection(
        repo.board(),
        "markedCount",
        repo.set_marked_count(marked_count).await,
    );

    let pending_lines = lines::detect(&next, ledger.lines())
        .into_iter()
        .map(LineSummary::from)
        .collect::<Vec<_>>();
    if !pending_lines.is_empty() {
        debug!(
            board = repo.board(),
            pending = pending_lines.len(),
            "completed lines awaiting confirmation"
        );
    }

    Ok(MarkedCellsResponse {
        marked_cells: next.into_iter().collect(),
        marked_count,
        pending_lines,
    })
}

/// Replace the marked set of `board` and report the lines now waiting for confirmation.
pub async fn set_marked_cells(
    state: &SharedState,
    board: &str,
    cells: Vec<u8>,
) -> Result<MarkedCellsResponse, ServiceError> {
    for cell in &cells {
        ensure_cell(*cell)?;
    }

    let repo = state.board(board).await?;
    let ledger = repo.ledger().await?;
    let current = repo.marked_cells().await?;
    commit_marked(&repo, &ledger, &current, cells.into_iter().collect()).await
}

/// Mark or unmark a single cell of `board`.
pub async fn toggle_cell(
    state: &SharedState,
    board: &str,
    cell: u8,
    marked: bool,
) -> Result<MarkedCellsResponse, ServiceError> {
    ensure_cell(cell)?;

    let repo = state.board(board).await?;
    let ledger = repo.ledger().await?;
    let current = repo.marked_cells().await?;

    let mut next = current.clone();
    if marked {
        next.insert(cell);
    } else {
        next.remove(&cell);
    }
    commit_marked(&repo, &ledger, &current, next).await
}

/// Set the comment of `cell`, or remove it when `text` is missing or blank.
///
/// Comments stay editable on locked cells.
pub async fn upsert_comment(
    state: &SharedState,
    board: &str,
    cell: u8,
    text: Option<String>,
) -> Result<CommentsResponse, ServiceError> {
    ensure_cell(cell)?;

    let repo = state.board(board).await?;
    let mut comments = repo.comments().await?;
    match normalize_text(text.as_deref(), MAX_COMMENT_CHARS) {
        Some(text) => {
            debug!(board = repo.board(), cell, "comment updated");
            comments.insert(cell, text);
        }
        None => {
            debug!(board = repo.board(), cell, "comment removed");
            comments.remove(&cell);
        }
    }
    repo.set_comments(&comments).await?;

    Ok(CommentsResponse {
        comments: comments_by_cell(&comments),
    })
}

/// Remove the comment of `cell`.
pub async fn delete_comment(
    state: &SharedState,
    board: &str,
    cell: u8,
) -> Result<CommentsResponse, ServiceError> {
    upsert_comment(state, board, cell, None).await
}

/// Replace the center cell text; missing or blank text restores the default.
pub async fn set_center_text(
    state: &SharedState,
    board: &str,
    text: Option<String>,
) -> Result<CenterTextResponse, ServiceError> {
    let repo = state.board(board).await?;
    let center_text = normalize_text(text.as_deref(), MAX_CENTER_TEXT_CHARS)
        .unwrap_or_else(|| DEFAULT_CENTER_TEXT.to_owned());
    repo.set_center_text(&center_text).await?;
    debug!(board = repo.board(), text = %center_text, "center text updated");

    Ok(CenterTextResponse { center_text })
}

/// Confirm a completed line of `board`.
///
/// The ledger (lines + first confirmation) is written in one go; the count and first
/// confirmation keys are projections rewritten from it afterwards and never fail the call.
pub async fn confirm_line(
    state: &SharedState,
    board: &str,
    kind: LineKind,
    index: u8,
    cells: Vec<u8>,
) -> Result<ConfirmLineResponse, ServiceError> {
    let repo = state.board(board).await?;
    let mut ledger = repo.ledger().await?;
    let marked = repo.marked_cells().await?;

    let outcome = ledger.confirm(kind, index, &cells, iso_timestamp(state.now_ms()))?;
    if !lines::is_complete(&marked, outcome.line) {
        return Err(ServiceError::InvalidInput(format!(
            "{} is not complete",
            outcome.line.display_name()
        )));
    }

    repo.set_ledger(&ledger).await?;
    let confirmed_count = count(outcome.confirmed_count);
    log_projection(
        repo.board(),
        "confirmedCount",
        repo.set_confirmed_count(confirmed_count).await,
    );
    if let Some(first) = ledger.first_confirmed_at() {
        log_projection(
            repo.board(),
            "firstConfirmation",
            repo.set_first_confirmation(first).await,
        );
    }

    info!(
        board = repo.board(),
        line = %outcome.line.display_name(),
        confirmed_count,
        first = outcome.is_first_confirmation,
        "line confirmed"
    );

    Ok(ConfirmLineResponse {
        line: outcome.line.into(),
        confirmed_count,
        is_first_confirmation: outcome.is_first_confirmation,
        confirmed_at: outcome.confirmed_at,
    })
}

/// Confirmed lines of `board` in confirmation order.
pub async fn confirmed_lines(
    state: &SharedState,
    board: &str,
) -> Result<Vec<ConfirmedLineSummary>, ServiceError> {
    let repo = state.board(board).await?;
    let ledger = repo.ledger().await?;
    Ok(ledger.lines().iter().map(Into::into).collect())
}

/// Completed lines of `board` that still need a confirmation.
pub async fn pending_lines(
    state: &SharedState,
    board: &str,
) -> Result<Vec<LineSummary>, ServiceError> {
    let repo = state.board(board).await?;
    let ledger = repo.ledger().await?;
    let marked = repo.marked_cells().await?;
    Ok(lines::detect(&marked, ledger.lines())
        .into_iter()
        .map(Into::into)
        .collect())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::kv_store::{KvStore, memory::MemoryKvStore},
        state::{AppState, clock::ManualClock},
    };

    const BOARD: &str = "Camelot";

    async fn setup() -> (SharedState, MemoryKvStore) {
        let store = MemoryKvStore::new();
        let clock = Arc::new(ManualClock::new(1_700_000_000_000));
        let state = AppState::with_clock(AppConfig::default(), clock);
        state.install_kv_store(Arc::new(store.clone())).await;
        (state, store)
    }

    #[tokio::test]
    async fn fresh_board_has_defaults() {
        let (state, _) = setup().await;
        let view = get_board(&state, BOARD).await.unwrap();
        assert!(view.marked_cells.is_empty());
        assert_eq!(view.center_text, DEFAULT_CENTER_TEXT);
        assert_eq!(view.confirmed_count, 0);
        assert_eq!(view.first_confirmation, None);
    }

    #[tokio::test]
    async fn marking_reports_pending_lines_and_counts() {
        let (state, _) = setup().await;
        let response = set_marked_cells(&state, BOARD, vec![2, 7, 17, 22])
            .await
            .unwrap();
        assert_eq!(response.marked_count, 4);
        assert_eq!(response.pending_lines.len(), 1);
        assert_eq!(response.pending_lines[0].kind, LineKind::Column);
        assert_eq!(response.pending_lines[0].index, 2);
    }

    #[tokio::test]
    async fn off_card_cells_are_rejected() {
        let (state, _) = setup().await;
        assert!(matches!(
            set_marked_cells(&state, BOARD, vec![3, 25]).await,
            Err(ServiceError::InvalidInput(_))
        ));
        assert!(matches!(
            toggle_cell(&state, BOARD, 30, true).await,
            Err(ServiceError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn incomplete_lines_cannot_be_confirmed() {
        let (state, _) = setup().await;
        set_marked_cells(&state, BOARD, vec![0, 1, 2]).await.unwrap();
        let err = confirm_line(&state, BOARD, LineKind::Row, 0, vec![0, 1, 2, 3, 4])
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
        assert!(confirmed_lines(&state, BOARD).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_cells_are_rejected() {
        let (state, _) = setup().await;
        set_marked_cells(&state, BOARD, vec![0, 1, 2, 3, 4]).await.unwrap();
        let err = confirm_line(&state, BOARD, LineKind::Row, 0, vec![0, 1, 2, 3, 5])
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn locked_cells_reject_toggles_but_keep_comments() {
        let (state, _) = setup().await;
        set_marked_cells(&state, BOARD, vec![4, 8, 16, 20]).await.unwrap();
        confirm_line(&state, BOARD, LineKind::Diagonal, 1, vec![4, 8, 12, 16, 20])
            .await
            .unwrap();

        let err = toggle_cell(&state, BOARD, 8, false).await.unwrap_err();
        assert!(matches!(err, ServiceError::CellLocked { ref cells } if cells == &[8]));

        toggle_cell(&state, BOARD, 0, true).await.unwrap();
        let comments = upsert_comment(&state, BOARD, 8, Some("saw it".into()))
            .await
            .unwrap();
        assert_eq!(comments.comments["8"], "saw it");
    }

    #[tokio::test]
    async fn confirmed_cells_stay_locked_through_other_edits() {
        let (state, _) = setup().await;
        let row = vec![5, 6, 7, 8, 9];
        set_marked_cells(&state, BOARD, row.clone()).await.unwrap();
        confirm_line(&state, BOARD, LineKind::Row, 1, row.clone())
            .await
            .unwrap();

        toggle_cell(&state, BOARD, 0, true).await.unwrap();
        toggle_cell(&state, BOARD, 24, true).await.unwrap();
        toggle_cell(&state, BOARD, 0, false).await.unwrap();
        set_marked_cells(&state, BOARD, vec![5, 6, 7, 8, 9, 3, 21])
            .await
            .unwrap();
        set_marked_cells(&state, BOARD, vec![9, 8, 7, 6, 5])
            .await
            .unwrap();

        let view = get_board(&state, BOARD).await.unwrap();
        assert_eq!(view.locked_cells, row);
        assert_eq!(view.marked_cells, row);
        for cell in &row {
            let err = toggle_cell(&state, BOARD, *cell, false).await.unwrap_err();
            assert!(matches!(err, ServiceError::CellLocked { ref cells } if cells == &[*cell]));
        }
        let err = set_marked_cells(&state, BOARD, vec![5, 6])
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::CellLocked { ref cells } if cells == &[7, 8, 9]));
        assert_eq!(get_board(&state, BOARD).await.unwrap().locked_cells, row);
    }

    #[tokio::test]
    async fn failed_projection_writes_keep_the_card_authoritative() {
        let (state, store) = setup().await;
        store.fail_on("set", "markedCount:");
        let response = set_marked_cells(&state, BOARD, vec![0, 1, 2])
            .await
            .unwrap();
        assert_eq!(response.marked_count, 3);
        assert_eq!(store.get("markedCount:Camelot".into()).await.unwrap(), None);

        store.fail_on("set", "confirmedCount:");
        toggle_cell(&state, BOARD, 3, true).await.unwrap();
        toggle_cell(&state, BOARD, 4, true).await.unwrap();
        let confirmed = confirm_line(&state, BOARD, LineKind::Row, 0, vec![0, 1, 2, 3, 4])
            .await
            .unwrap();
        assert_eq!(confirmed.confirmed_count, 1);
        assert_eq!(store.get("confirmedCount:Camelot".into()).await.unwrap(), None);

        let view = get_board(&state, BOARD).await.unwrap();
        assert_eq!(view.marked_count, 5);
        assert_eq!(view.confirmed_count, 1);
    }

    #[tokio::test]
    async fn failed_card_write_leaves_the_board_untouched() {
        let (state, store) = setup().await;
        set_marked_cells(&state, BOARD, vec![1]).await.unwrap();
        store.fail_on("set", "card:");
        assert!(matches!(
            set_marked_cells(&state, BOARD, vec![1, 2]).await,
            Err(ServiceError::Unavailable(_))
        ));
        store.clear_failures();

        let view = get_board(&state, BOARD).await.unwrap();
        assert_eq!(view.marked_cells, [1]);
        assert_eq!(
            store.get("markedCount:Camelot".into()).await.unwrap(),
            Some(serde_json::json!(1))
        );
    }

    #[tokio::test]
    async fn projections_follow_the_ledger() {
        let (state, store) = setup().await;
        set_marked_cells(&state, BOARD, vec![0, 1, 2, 3, 4, 5, 10, 15, 20])
            .await
            .unwrap();
        let first = confirm_line(&state, BOARD, LineKind::Row, 0, vec![0, 1, 2, 3, 4])
            .await
            .unwrap();
        let second = confirm_line(&state, BOARD, LineKind::Column, 0, vec![0, 5, 10, 15, 20])
            .await
            .unwrap();

        assert!(first.is_first_confirmation);
        assert!(!second.is_first_confirmation);
        assert_eq!(second.confirmed_count, 2);

        let count = store.get("confirmedCount:Camelot".into()).await.unwrap();
        assert_eq!(count, Some(serde_json::json!(2)));
        let first_at = store.get("firstConfirmation:Camelot".into()).await.unwrap();
        assert_eq!(first_at, Some(serde_json::json!(first.confirmed_at)));
    }

    #[tokio::test]
    async fn comments_are_trimmed_truncated_and_cleared() {
        let (state, _) = setup().await;
        let long = "x".repeat(MAX_COMMENT_CHARS + 20);
        let comments = upsert_comment(&state, BOARD, 3, Some(format!("  {long}  ")))
            .await
            .unwrap();
        assert_eq!(comments.comments["3"].chars().count(), MAX_COMMENT_CHARS);

        let comments = upsert_comment(&state, BOARD, 3, Some("   ".into()))
            .await
            .unwrap();
        assert!(comments.comments.is_empty());

        upsert_comment(&state, BOARD, 4, Some("ok".into()))
            .await
            .unwrap();
        let comments = delete_comment(&state, BOARD, 4).await.unwrap();
        assert!(!comments.comments.contains_key("4"));
    }

    #[tokio::test]
    async fn center_text_defaults_when_blank() {
        let (state, _) = setup().await;
        let response = set_center_text(&state, BOARD, Some(" Intermission ".into()))
            .await
            .unwrap();
        assert_eq!(response.center_text, "Intermission");

        let long = "é".repeat(MAX_CENTER_TEXT_CHARS + 5);
        let response = set_center_text(&state, BOARD, Some(long)).await.unwrap();
        assert_eq!(response.center_text.chars().count(), MAX_CENTER_TEXT_CHARS);

        let response = set_center_text(&state, BOARD, None).await.unwrap();
        assert_eq!(response.center_text, DEFAULT_CENTER_TEXT);
    }

    #[tokio::test]
    async fn degraded_state_reports_unavailable() {
        let state = AppState::new(AppConfig::default());
        assert!(matches!(
            get_board(&state, BOARD).await,
            Err(ServiceError::Degraded)
        ));
    }

    #[tokio::test]
    async fn offline_store_surfaces_storage_errors() {
        let (state, store) = setup().await;
        store.set_offline(true);
        assert!(matches!(
            set_marked_cells(&state, BOARD, vec![1]).await,
            Err(ServiceError::Unavailable(_))
        ));
    }
}
