use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::health::{HealthResponse, StorageProbeResponse},
    error::AppError,
    services::health_service,
    state::SharedState,
};

#[utoipa::path(
    get,
    path = "/healthcheck",
    tag = "health",
    responses((status = 200, description = "Service status and storage backend", body = HealthResponse))
)]
/// Return the current health status of the backend and ping the store.
pub async fn healthcheck(State(state): State<SharedState>) -> Json<HealthResponse> {
    let status = health_service::health_status(&state).await;
    Json(status)
}

#[utoipa::path(
    get,
    path = "/storage/probe",
    tag = "health",
    responses(
        (status = 200, description = "Write/read/delete round trip succeeded", body = StorageProbeResponse),
        (status = 503, description = "Storage unavailable"),
    )
)]
/// Exercise the store with a throwaway key.
pub async fn storage_probe(
    State(state): State<SharedState>,
) -> Result<Json<StorageProbeResponse>, AppError> {
    Ok(Json(health_service::storage_probe(&state).await?))
}

/// Configure the health routes subtree.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/healthcheck", get(healthcheck))
        .route("/storage/probe", get(storage_probe))
}
