use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Theatre Bingo Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::health::storage_probe,
        crate::routes::public::list_boards,
        crate::routes::public::issue_session,
        crate::routes::board::get_board,
        crate::routes::board::set_marked_cells,
        crate::routes::board::toggle_cell,
        crate::routes::board::upsert_comment,
        crate::routes::board::delete_comment,
        crate::routes::board::set_center_text,
        crate::routes::board::confirmed_lines,
        crate::routes::board::pending_lines,
        crate::routes::board::confirm_line,
        crate::routes::lock::lock_status,
        crate::routes::lock::acquire_lock,
        crate::routes::lock::release_lock,
        crate::routes::leaderboard::leaderboard,
        crate::routes::admin::reset_all,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::StorageProbeResponse,
            crate::dto::admin::BoardListResponse,
            crate::dto::admin::SessionResponse,
            crate::dto::admin::ResetResponse,
            crate::dto::board::BoardView,
            crate::dto::board::LineSummary,
            crate::dto::board::ConfirmedLineSummary,
            crate::dto::board::SetMarkedCellsRequest,
            crate::dto::board::ToggleCellRequest,
            crate::dto::board::MarkedCellsResponse,
            crate::dto::board::CommentRequest,
            crate::dto::board::CommentsResponse,
            crate::dto::board::CenterTextRequest,
            crate::dto::board::CenterTextResponse,
            crate::dto::board::ConfirmLineRequest,
            crate::dto::board::ConfirmLineResponse,
            crate::dto::lock::LockStatusResponse,
            crate::dto::lock::AcquireLockRequest,
            crate::dto::lock::AcquireLockResponse,
            crate::dto::leaderboard::LeaderboardEntry,
            crate::dto::leaderboard::LeaderboardResponse,
            crate::state::geometry::LineKind,
        )
    ),
    tags(
        (name = "health", description = "Health check and storage probe"),
        (name = "boards", description = "Board roster and card state"),
        (name = "lines", description = "Completed and confirmed lines"),
        (name = "locks", description = "Advisory edit locks and sessions"),
        (name = "leaderboard", description = "Ranking of boards"),
        (name = "admin", description = "Administrative operations"),
    )
)]
pub struct ApiDoc;
