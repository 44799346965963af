use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, put},
};
use axum_valid::Valid;

use crate::{
    dto::board::{
        BoardView, CenterTextRequest, CenterTextResponse, CommentRequest, CommentsResponse,
        ConfirmLineRequest, ConfirmLineResponse, ConfirmedLineSummary, LineSummary,
        MarkedCellsResponse, SetMarkedCellsRequest, ToggleCellRequest,
    },
    error::AppError,
    services::board_service,
    state::SharedState,
};

/// Card routes of a single board.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/boards/{board}", get(get_board))
        .route("/boards/{board}/cells", put(set_marked_cells))
        .route("/boards/{board}/cells/{cell}", put(toggle_cell))
        .route("/boards/{board}/comments", put(upsert_comment))
        .route("/boards/{board}/comments/{cell}", delete(delete_comment))
        .route("/boards/{board}/center", put(set_center_text))
        .route(
            "/boards/{board}/lines",
            get(confirmed_lines).post(confirm_line),
        )
        .route("/boards/{board}/lines/pending", get(pending_lines))
}

/// Full state of a board.
#[utoipa::path(
    get,
    path = "/boards/{board}",
    tag = "boards",
    params(("board" = String, Path, description = "Board name")),
    responses(
        (status = 200, description = "Board state", body = BoardView),
        (status = 400, description = "Unknown board"),
    )
)]
pub async fn get_board(
    State(state): State<SharedState>,
    Path(board): Path<String>,
) -> Result<Json<BoardView>, AppError> {
    Ok(Json(board_service::get_board(&state, &board).await?))
}

/// Replace the marked cells of a board.
#[utoipa::path(
    put,
    path = "/boards/{board}/cells",
    tag = "boards",
    params(("board" = String, Path, description = "Board name")),
    request_body = SetMarkedCellsRequest,
    responses(
        (status = 200, description = "Marked cells stored", body = MarkedCellsResponse),
        (status = 409, description = "A locked cell would change"),
    )
)]
pub async fn set_marked_cells(
    State(state): State<SharedState>,
    Path(board): Path<String>,
    Valid(Json(payload)): Valid<Json<SetMarkedCellsRequest>>,
) -> Result<Json<MarkedCellsResponse>, AppError> {
    let response = board_service::set_marked_cells(&state, &board, payload.cells).await?;
    Ok(Json(response))
}

/// Mark or unmark one cell.
#[utoipa::path(
    put,
    path = "/boards/{board}/cells/{cell}",
    tag = "boards",
    params(
        ("board" = String, Path, description = "Board name"),
        ("cell" = u8, Path, description = "Cell index, 0 to 24"),
    ),
    request_body = ToggleCellRequest,
    responses(
        (status = 200, description = "Marked cells stored", body = MarkedCellsResponse),
        (status = 409, description = "The cell is locked"),
    )
)]
pub async fn toggle_cell(
    State(state): State<SharedState>,
    Path((board, cell)): Path<(String, u8)>,
    Valid(Json(payload)): Valid<Json<ToggleCellRequest>>,
) -> Result<Json<MarkedCellsResponse>, AppError> {
    let response = board_service::toggle_cell(&state, &board, cell, payload.marked).await?;
    Ok(Json(response))
}

/// Set or clear the comment of a cell.
#[utoipa::path(
    put,
    path = "/boards/{board}/comments",
    tag = "boards",
    params(("board" = String, Path, description = "Board name")),
    request_body = CommentRequest,
    responses((status = 200, description = "Comments after the update", body = CommentsResponse))
)]
pub async fn upsert_comment(
    State(state): State<SharedState>,
    Path(board): Path<String>,
    Valid(Json(payload)): Valid<Json<CommentRequest>>,
) -> Result<Json<CommentsResponse>, AppError> {
    let response =
        board_service::upsert_comment(&state, &board, payload.cell, payload.text).await?;
    Ok(Json(response))
}

/// Remove the comment of a cell.
#[utoipa::path(
    delete,
    path = "/boards/{board}/comments/{cell}",
    tag = "boards",
    params(
        ("board" = String, Path, description = "Board name"),
        ("cell" = u8, Path, description = "Cell index, 0 to 24"),
    ),
    responses((status = 200, description = "Comments after the removal", body = CommentsResponse))
)]
pub async fn delete_comment(
    State(state): State<SharedState>,
    Path((board, cell)): Path<(String, u8)>,
) -> Result<Json<CommentsResponse>, AppError> {
    Ok(Json(board_service::delete_comment(&state, &board, cell).await?))
}

/// Customise the free center cell.
#[utoipa::path(
    put,
    path = "/boards/{board}/center",
    tag = "boards",
    params(("board" = String, Path, description = "Board name")),
    request_body = CenterTextRequest,
    responses((status = 200, description = "Center text stored", body = CenterTextResponse))
)]
pub async fn set_center_text(
    State(state): State<SharedState>,
    Path(board): Path<String>,
    Valid(Json(payload)): Valid<Json<CenterTextRequest>>,
) -> Result<Json<CenterTextResponse>, AppError> {
    Ok(Json(
        board_service::set_center_text(&state, &board, payload.text).await?,
    ))
}

/// Confirmed lines of a board.
#[utoipa::path(
    get,
    path = "/boards/{board}/lines",
    tag = "lines",
    params(("board" = String, Path, description = "Board name")),
    responses((status = 200, description = "Confirmed lines in confirmation order", body = [ConfirmedLineSummary]))
)]
pub async fn confirmed_lines(
    State(state): State<SharedState>,
    Path(board): Path<String>,
) -> Result<Json<Vec<ConfirmedLineSummary>>, AppError> {
    Ok(Json(board_service::confirmed_lines(&state, &board).await?))
}

/// Completed lines awaiting confirmation.
#[utoipa::path(
    get,
    path = "/boards/{board}/lines/pending",
    tag = "lines",
    params(("board" = String, Path, description = "Board name")),
    responses((status = 200, description = "Completed lines awaiting confirmation", body = [LineSummary]))
)]
pub async fn pending_lines(
    State(state): State<SharedState>,
    Path(board): Path<String>,
) -> Result<Json<Vec<LineSummary>>, AppError> {
    Ok(Json(board_service::pending_lines(&state, &board).await?))
}

/// Confirm a completed line; its cells become locked.
#[utoipa::path(
    post,
    path = "/boards/{board}/lines",
    tag = "lines",
    params(("board" = String, Path, description = "Board name")),
    request_body = ConfirmLineRequest,
    responses(
        (status = 200, description = "Line confirmed", body = ConfirmLineResponse),
        (status = 400, description = "Malformed or incomplete line"),
        (status = 409, description = "Line already confirmed"),
    )
)]
pub async fn confirm_line(
    State(state): State<SharedState>,
    Path(board): Path<String>,
    Valid(Json(payload)): Valid<Json<ConfirmLineRequest>>,
) -> Result<Json<ConfirmLineResponse>, AppError> {
    let response = board_service::confirm_line(
        &state,
        &board,
        payload.kind,
        payload.index,
        payload.cells,
    )
    .await?;
    Ok(Json(response))
}
