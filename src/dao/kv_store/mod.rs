/// CouchDB-backed store.
#[cfg(feature = "couch-store")]
pub mod couchdb;
/// In-process store.
pub mod memory;
/// MongoDB-backed store.
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use serde_json::Value;

/// Key-value collaborator holding every piece of board state.
///
/// Each call is an independent round trip: there is no multi-key transaction and concurrent
/// writers to the same key resolve as last-write-wins.
pub trait KvStore: Send + Sync {
    /// Short identifier of the backend, reported by the health endpoint.
    fn backend_name(&self) -> &'static str;
    fn get(&self, key: String) -> BoxFuture<'static, StorageResult<Option<Value>>>;
    fn set(&self, key: String, value: Value) -> BoxFuture<'static, StorageResult<()>>;
    fn delete(&self, key: String) -> BoxFuture<'static, StorageResult<()>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
