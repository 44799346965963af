use serde_json::json;
use tracing::{info, warn};

use crate::{
    dao::{kv_store::KvStore, storage::StorageError},
    dto::health::{HealthResponse, StorageProbeResponse},
    error::ServiceError,
    state::SharedState,
};

const PROBE_KEY: &str = "probe:storage";

/// Report whether a usable store is installed, logging connectivity issues.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let store = state.kv_store().await;
    let backend = store.as_ref().map(|store| store.backend_name());

    match (&store, state.is_degraded()) {
        (Some(store), false) => match store.health_check().await {
            Ok(()) => HealthResponse::ok(store.backend_name()),
            Err(err) => {
                warn!(error = %err, "storage health check failed");
                HealthResponse::degraded(backend)
            }
        },
        _ => {
            warn!("storage unavailable (degraded mode)");
            HealthResponse::degraded(backend)
        }
    }
}

/// Write, read back and delete a throwaway key.
pub async fn storage_probe(state: &SharedState) -> Result<StorageProbeResponse, ServiceError> {
    let store = state.require_kv_store().await?;
    let written = json!({ "probe": true, "timestamp": state.now_ms() });

    store.set(PROBE_KEY.into(), written).await?;
    // The key is removed even when the read fails.
    let read = store.get(PROBE_KEY.into()).await;
    store.delete(PROBE_KEY.into()).await?;

    let value = read?.ok_or_else(|| StorageError::ReadBack {
        key: PROBE_KEY.into(),
    })?;
    info!(backend = store.backend_name(), "storage probe succeeded");

    Ok(StorageProbeResponse {
        backend: store.backend_name().into(),
        message: "read/write/delete operations successful".into(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::kv_store::memory::MemoryKvStore,
        state::AppState,
    };

    #[tokio::test]
    async fn reports_backend_when_healthy() {
        let store = MemoryKvStore::new();
        let state = AppState::new(AppConfig::default());
        assert_eq!(health_status(&state).await.status, "degraded");

        state.install_kv_store(Arc::new(store.clone())).await;
        let health = health_status(&state).await;
        assert_eq!(health.status, "ok");
        assert_eq!(health.backend.as_deref(), Some("memory"));

        store.set_offline(true);
        assert_eq!(health_status(&state).await.status, "degraded");
    }

    #[tokio::test]
    async fn probe_leaves_nothing_behind() {
        let store = MemoryKvStore::new();
        let state = AppState::new(AppConfig::default());
        state.install_kv_store(Arc::new(store.clone())).await;

        let probe = storage_probe(&state).await.unwrap();
        assert_eq!(probe.value["probe"], true);
        assert!(store.is_empty());

        store.set_offline(true);
        assert!(matches!(
            storage_probe(&state).await,
            Err(ServiceError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn failed_read_back_still_cleans_up() {
        let store = MemoryKvStore::new();
        let state = AppState::new(AppConfig::default());
        state.install_kv_store(Arc::new(store.clone())).await;

        store.fail_on("get", PROBE_KEY);
        assert!(matches!(
            storage_probe(&state).await,
            Err(ServiceError::Unavailable(_))
        ));
        assert!(store.is_empty());
    }
}
