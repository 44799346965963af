use std::sync::Arc;

use futures::future::BoxFuture;
use mongodb::{Client, Collection, Database, bson::doc};
use serde_json::Value;
use tokio::sync::RwLock;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{MongoKvDocument, key_filter},
};
use crate::dao::{
    kv_store::KvStore,
    storage::{StorageError, StorageResult},
};

const KV_COLLECTION_NAME: &str = "kv";

/// Key-value store backed by a single MongoDB collection keyed by `_id`.
#[derive(Clone)]
pub struct MongoKvStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    // Kept so the connection pool lives as long as the database handle.
    #[allow(dead_code)]
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoKvStore {
    /// Establish a connection to MongoDB.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        Ok(Self { inner })
    }

    async fn collection(&self) -> Collection<MongoKvDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoKvDocument>(KV_COLLECTION_NAME)
    }

    async fn find(&self, key: String) -> StorageResult<Option<Value>> {
        let collection = self.collection().await;
        let document = collection
            .find_one(key_filter(&key))
            .await
            .map_err(|source| MongoDaoError::Get {
                key: key.clone(),
                source,
            })?;

        document
            .map(|document| {
                serde_json::from_str(&document.value)
                    .map_err(|source| StorageError::corrupted(key.clone(), source))
            })
            .transpose()
    }

    async fn upsert(&self, key: String, value: Value) -> MongoResult<()> {
        let value = serde_json::to_string(&value).map_err(|source| MongoDaoError::Encode {
            key: key.clone(),
            source,
        })?;
        let document = MongoKvDocument {
            key: key.clone(),
            value,
        };

        let collection = self.collection().await;
        collection
            .replace_one(key_filter(&key), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::Set { key, source })?;
        Ok(())
    }

    async fn remove(&self, key: String) -> MongoResult<()> {
        let collection = self.collection().await;
        collection
            .delete_one(key_filter(&key))
            .await
            .map_err(|source| MongoDaoError::Delete { key, source })?;
        Ok(())
    }
}

impl KvStore for MongoKvStore {
    fn backend_name(&self) -> &'static str {
        "mongodb"
    }

    fn get(&self, key: String) -> BoxFuture<'static, StorageResult<Option<Value>>> {
        let store = self.clone();
        Box::pin(async move { store.find(key).await })
    }

    fn set(&self, key: String, value: Value) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.upsert(key, value).await.map_err(Into::into) })
    }

    fn delete(&self, key: String) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.remove(key).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
