//! In-process store used when no database is configured, and as the test double.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use dashmap::DashMap;
use futures::future::BoxFuture;
use serde_json::Value;
use thiserror::Error;

use crate::dao::{
    kv_store::KvStore,
    storage::{StorageError, StorageResult},
};

#[derive(Debug, Error)]
#[error("in-memory store is offline")]
struct Offline;

#[derive(Debug, Error)]
#[error("injected failure")]
struct Injected;

/// `DashMap`-backed store. Cloning shares the same underlying map.
#[derive(Clone, Default)]
pub struct MemoryKvStore {
    entries: Arc<DashMap<String, Value>>,
    offline: Arc<AtomicBool>,
    // operation name -> key prefix that fails
    failures: Arc<DashMap<&'static str, String>>,
}

impl MemoryKvStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an unreachable backend: every call fails until switched back on.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Make `operation` (`"get"`, `"set"` or `"delete"`) fail for keys starting with `key_prefix`.
    /// Each operation holds one prefix; a later call replaces it.
    pub fn fail_on(&self, operation: &'static str, key_prefix: impl Into<String>) {
        self.failures.insert(operation, key_prefix.into());
    }

    /// Drop every failure registered with [`MemoryKvStore::fail_on`].
    pub fn clear_failures(&self) {
        self.failures.clear();
    }

    /// Whether the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn ensure_online(&self, operation: &str) -> StorageResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StorageError::unavailable(
                format!("memory store {operation} failed"),
                Offline,
            ));
        }
        Ok(())
    }

    fn ensure_available(&self, operation: &'static str, key: &str) -> StorageResult<()> {
        self.ensure_online(operation)?;
        let injected = self
            .failures
            .get(operation)
            .is_some_and(|prefix| key.starts_with(prefix.value().as_str()));
        if injected {
            return Err(StorageError::unavailable(
                format!("memory store {operation} of `{key}` failed"),
                Injected,
            ));
        }
        Ok(())
    }
}

impl KvStore for MemoryKvStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn get(&self, key: String) -> BoxFuture<'static, StorageResult<Option<Value>>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_available("get", &key)?;
            Ok(store.entries.get(&key).map(|entry| entry.value().clone()))
        })
    }

    fn set(&self, key: String, value: Value) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_available("set", &key)?;
            store.entries.insert(key, value);
            Ok(())
        })
    }

    fn delete(&self, key: String) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_available("delete", &key)?;
            store.entries.remove(&key);
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_online("health check") })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        self.health_check()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn set_get_delete() {
        let store = MemoryKvStore::new();
        assert_eq!(store.get("card:A".into()).await.unwrap(), None);

        store.set("card:A".into(), json!([1, 2])).await.unwrap();
        assert_eq!(store.get("card:A".into()).await.unwrap(), Some(json!([1, 2])));

        store.set("card:A".into(), json!([3])).await.unwrap();
        assert_eq!(store.get("card:A".into()).await.unwrap(), Some(json!([3])));

        store.delete("card:A".into()).await.unwrap();
        assert!(store.is_empty());
        // deleting an absent key is fine
        store.delete("card:A".into()).await.unwrap();
    }

    #[tokio::test]
    async fn offline_store_fails_every_call() {
        let store = MemoryKvStore::new();
        store.set_offline(true);
        assert!(store.get("k".into()).await.is_err());
        assert!(store.set("k".into(), json!(1)).await.is_err());
        assert!(store.health_check().await.is_err());

        store.set_offline(false);
        assert!(store.health_check().await.is_ok());
    }

    #[tokio::test]
    async fn injected_failures_hit_matching_keys_only() {
        let store = MemoryKvStore::new();
        store.fail_on("set", "markedCount:");
        assert!(store.set("markedCount:A".into(), json!(1)).await.is_err());
        store.set("card:A".into(), json!([1])).await.unwrap();
        assert_eq!(store.get("markedCount:A".into()).await.unwrap(), None);

        store.clear_failures();
        store.set("markedCount:A".into(), json!(1)).await.unwrap();
    }
}
