use std::{sync::Arc, time::Duration};

use theatre_bingo_back::{
    config::AppConfig,
    dao::kv_store::memory::MemoryKvStore,
    error::ServiceError,
    services::{admin_service, board_service, leaderboard_service, lock_service},
    state::{
        AppState, SharedState,
        clock::ManualClock,
        edit_lock::{LOCK_TIMEOUT, LOCK_TIMEOUT_MS},
        geometry::LineKind,
    },
};

const START_MS: i64 = 1_741_852_800_000;

async fn setup(config: AppConfig) -> (SharedState, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(START_MS));
    let state = AppState::with_clock(config, clock.clone());
    state.install_kv_store(Arc::new(MemoryKvStore::new())).await;
    (state, clock)
}

#[tokio::test]
async fn annenberg_confirms_first_row() {
    let (state, _) = setup(AppConfig::default()).await;
    let board = "Annenberg";

    let marked = board_service::set_marked_cells(&state, board, vec![0, 1, 2, 3])
        .await
        .unwrap();
    assert!(marked.pending_lines.is_empty());

    let marked = board_service::toggle_cell(&state, board, 4, true)
        .await
        .unwrap();
    assert_eq!(marked.pending_lines.len(), 1);
    let row = &marked.pending_lines[0];
    assert_eq!((row.kind, row.index), (LineKind::Row, 0));
    assert_eq!(row.cells, [0, 1, 2, 3, 4]);

    let cells = row.cells.clone();
    let confirmed = board_service::confirm_line(&state, board, LineKind::Row, 0, cells)
        .await
        .unwrap();
    assert_eq!(confirmed.confirmed_count, 1);
    assert!(confirmed.is_first_confirmation);
    assert_eq!(confirmed.confirmed_at, "2025-03-13T08:00:00.000Z");

    let view = board_service::get_board(&state, board).await.unwrap();
    assert_eq!(view.locked_cells, [0, 1, 2, 3, 4]);
    assert!(view.pending_lines.is_empty());
    assert_eq!(
        view.first_confirmation.as_deref(),
        Some("2025-03-13T08:00:00.000Z")
    );

    let err = board_service::toggle_cell(&state, board, 1, false)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::CellLocked { .. }));

    let err = board_service::confirm_line(&state, board, LineKind::Row, 0, vec![0, 1, 2, 3, 4])
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::AlreadyConfirmed(_)));

    board_service::toggle_cell(&state, board, 20, true)
        .await
        .unwrap();
    board_service::set_marked_cells(&state, board, vec![4, 3, 2, 1, 0, 9])
        .await
        .unwrap();

    let view = board_service::get_board(&state, board).await.unwrap();
    assert_eq!(view.confirmed_count, 1);
    assert_eq!(view.marked_cells, [0, 1, 2, 3, 4, 9]);
    assert_eq!(view.locked_cells, [0, 1, 2, 3, 4]);
    for cell in 0..5 {
        let err = board_service::toggle_cell(&state, board, cell, false)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::CellLocked { .. }));
    }
}

#[tokio::test]
async fn first_confirmation_never_moves() {
    let (state, clock) = setup(AppConfig::default()).await;
    let board = "High School";

    board_service::set_marked_cells(&state, board, vec![0, 6, 18, 24, 2, 7, 17, 22])
        .await
        .unwrap();
    let diagonal = vec![0, 6, 12, 18, 24];
    let first = board_service::confirm_line(&state, board, LineKind::Diagonal, 0, diagonal)
        .await
        .unwrap();

    clock.advance(Duration::from_secs(90));
    let column = vec![2, 7, 12, 17, 22];
    let second = board_service::confirm_line(&state, board, LineKind::Column, 2, column)
        .await
        .unwrap();
    assert!(!second.is_first_confirmation);
    assert_ne!(first.confirmed_at, second.confirmed_at);

    let view = board_service::get_board(&state, board).await.unwrap();
    assert_eq!(view.first_confirmation, Some(first.confirmed_at));
    assert_eq!(view.confirmed_count, 2);
}

#[tokio::test]
async fn lock_lifecycle() {
    let (state, clock) = setup(AppConfig::default()).await;
    let board = "ARCO";

    lock_service::acquire(&state, board, "A").await.unwrap();
    let err = lock_service::acquire(&state, board, "B").await.unwrap_err();
    match err {
        ServiceError::LockDenied { remaining_ms } => assert_eq!(remaining_ms, LOCK_TIMEOUT_MS),
        other => panic!("unexpected error: {other:?}"),
    }

    clock.advance(Duration::from_secs(60));
    let renewed = lock_service::acquire(&state, board, "A").await.unwrap();
    assert!(renewed.renewed);
    let status = lock_service::status(&state, board).await.unwrap();
    assert_eq!(status.owner_session_id.as_deref(), Some("A"));
    assert_eq!(status.remaining_ms, Some(LOCK_TIMEOUT_MS));

    clock.advance(LOCK_TIMEOUT);
    let status = lock_service::status(&state, board).await.unwrap();
    assert!(!status.locked);

    let granted = lock_service::acquire(&state, board, "B").await.unwrap();
    assert!(!granted.renewed);
    assert!(matches!(
        lock_service::release(&state, board, Some("A")).await,
        Err(ServiceError::NotOwner)
    ));
    lock_service::release(&state, board, Some("B")).await.unwrap();
}

#[tokio::test]
async fn locks_are_per_board() {
    let (state, _) = setup(AppConfig::default()).await;
    lock_service::acquire(&state, "Festival", "A").await.unwrap();
    lock_service::acquire(&state, "Camelot", "B").await.unwrap();
    assert!(!lock_service::status(&state, "D'Place").await.unwrap().locked);
}

#[tokio::test]
async fn leaderboard_tie_groups() {
    let (state, _) = setup(AppConfig::with_boards(["X", "Y", "Z"])).await;

    let empty = leaderboard_service::leaderboard(&state).await.unwrap();
    assert_eq!(empty.top_group, None);
    assert_eq!(empty.bottom_group, None);

    // X and Y: two lines, 10 cells. Z: one line, 20 cells.
    for board in ["X", "Y"] {
        board_service::set_marked_cells(&state, board, vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9])
            .await
            .unwrap();
        board_service::confirm_line(&state, board, LineKind::Row, 0, vec![0, 1, 2, 3, 4])
            .await
            .unwrap();
        board_service::confirm_line(&state, board, LineKind::Row, 1, vec![5, 6, 7, 8, 9])
            .await
            .unwrap();
    }
    let z_cells: Vec<u8> = (0..25).filter(|cell| *cell < 20 || *cell == 24).collect();
    board_service::set_marked_cells(&state, "Z", z_cells)
        .await
        .unwrap();
    board_service::confirm_line(&state, "Z", LineKind::Row, 3, vec![15, 16, 17, 18, 19])
        .await
        .unwrap();

    let ranked = leaderboard_service::leaderboard(&state).await.unwrap();
    let order = ranked
        .boards
        .iter()
        .map(|entry| {
            (
                entry.board.as_str(),
                entry.rank,
                entry.confirmed_count,
                entry.marked_count,
            )
        })
        .collect::<Vec<_>>();
    assert_eq!(order, [("X", 1, 2, 10), ("Y", 1, 2, 10), ("Z", 3, 1, 21)]);
    assert_eq!(ranked.top_group, Some(vec!["X".to_string(), "Y".to_string()]));
    assert_eq!(ranked.bottom_group, Some(vec!["Z".to_string()]));
    assert_eq!(ranked.first_overall.as_deref(), Some("X"));
}

#[tokio::test]
async fn reset_returns_every_board_to_blank() {
    let (state, _) = setup(AppConfig::default()).await;
    board_service::set_marked_cells(&state, "Camelot", vec![10, 11, 13, 14])
        .await
        .unwrap();
    let row = vec![10, 11, 12, 13, 14];
    board_service::confirm_line(&state, "Camelot", LineKind::Row, 2, row)
        .await
        .unwrap();
    board_service::set_center_text(&state, "Camelot", Some("Knights".into()))
        .await
        .unwrap();
    lock_service::acquire(&state, "Camelot", "A").await.unwrap();

    admin_service::reset_all(&state).await.unwrap();

    let view = board_service::get_board(&state, "Camelot").await.unwrap();
    assert!(view.marked_cells.is_empty());
    assert!(view.confirmed_lines.is_empty());
    assert_eq!(view.center_text, "FREE");
    assert!(!lock_service::status(&state, "Camelot").await.unwrap().locked);

    let ranked = leaderboard_service::leaderboard(&state).await.unwrap();
    assert!(ranked.boards.iter().all(|entry| entry.confirmed_count == 0));
    assert_eq!(ranked.first_overall, None);
}
