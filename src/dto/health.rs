use serde::Serialize;
use utoipa::ToSchema;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Name of the installed storage backend, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
}

impl HealthResponse {
    /// Create a health response indicating the system is operational.
    pub fn ok(backend: &str) -> Self {
        Self {
            status: "ok".to_string(),
            backend: Some(backend.to_string()),
        }
    }

    /// Create a health response indicating the system is in degraded mode.
    pub fn degraded(backend: Option<&str>) -> Self {
        Self {
            status: "degraded".to_string(),
            backend: backend.map(str::to_string),
        }
    }
}

/// Result of a write/read/delete round trip against the store.
#[derive(Debug, Serialize, ToSchema)]
pub struct StorageProbeResponse {
    pub backend: String,
    pub message: String,
    /// Value read back after the write.
    #[schema(value_type = Object)]
    pub value: serde_json::Value,
}
