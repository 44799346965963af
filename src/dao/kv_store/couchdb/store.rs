use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode, Url};
use serde_json::Value;

use crate::dao::{kv_store::KvStore, storage::StorageResult};

use super::{
    config::CouchConfig,
    error::{CouchDaoError, CouchResult},
    models::{CouchKvDocument, CouchRevision},
};

/// Key-value store keeping one CouchDB document per key.
#[derive(Clone)]
pub struct CouchKvStore {
    client: Client,
    database_url: Arc<Url>,
    database: Arc<str>,
    auth: Option<(Arc<str>, Arc<str>)>,
}

impl CouchKvStore {
    /// Establish a connection to CouchDB and ensure the database exists.
    pub async fn connect(config: CouchConfig) -> CouchResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| CouchDaoError::ClientBuilder { source })?;

        let database_url = database_url(&config.base_url, &config.database)?;
        let auth = config
            .credentials
            .map(|(user, pass)| (Arc::<str>::from(user), Arc::<str>::from(pass)));

        let store = Self {
            client,
            database_url: Arc::new(database_url),
            database: Arc::from(config.database),
            auth,
        };

        store.ensure_database().await?;
        Ok(store)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth {
            Some((ref user, ref pass)) => builder.basic_auth(user.as_ref(), Some(pass.as_ref())),
            None => builder,
        }
    }

    /// Request against the document named `key`; the key is percent-encoded as one path segment.
    fn document_request(&self, method: Method, key: &str) -> reqwest::RequestBuilder {
        let mut url = (*self.database_url).clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(key);
        }
        self.authorize(self.client.request(method, url))
    }

    async fn ensure_database(&self) -> CouchResult<()> {
        let database = self.database.to_string();
        let url = (*self.database_url).clone();

        let response = self
            .authorize(self.client.get(url.clone()))
            .send()
            .await
            .map_err(|source| CouchDaoError::DatabaseQuery {
                database: database.clone(),
                source,
            })?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => {
                let create = self
                    .authorize(self.client.put(url))
                    .send()
                    .await
                    .map_err(|source| CouchDaoError::DatabaseCreate {
                        database: database.clone(),
                        source,
                    })?;
                if create.status().is_success() {
                    Ok(())
                } else {
                    Err(CouchDaoError::DatabaseStatus {
                        database,
                        status: create.status(),
                    })
                }
            }
            other => Err(CouchDaoError::DatabaseStatus {
                database,
                status: other,
            }),
        }
    }

    async fn fetch(&self, key: &str) -> CouchResult<Option<CouchKvDocument>> {
        let response = self
            .document_request(Method::GET, key)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                key: key.to_owned(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .json::<CouchKvDocument>()
                .await
                .map(Some)
                .map_err(|source| CouchDaoError::DecodeResponse {
                    key: key.to_owned(),
                    source,
                }),
            other => Err(CouchDaoError::RequestStatus {
                key: key.to_owned(),
                status: other,
            }),
        }
    }

    async fn current_revision(&self, key: &str) -> CouchResult<Option<String>> {
        let response = self
            .document_request(Method::HEAD, key)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                key: key.to_owned(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                // HEAD carries the revision in the ETag header, quoted.
                let etag = response
                    .headers()
                    .get(reqwest::header::ETAG)
                    .and_then(|value| value.to_str().ok())
                    .map(|value| value.trim_matches('"').to_owned());
                match etag {
                    Some(rev) => Ok(Some(rev)),
                    None => Ok(self.fetch(key).await?.and_then(|doc| doc.rev)),
                }
            }
            other => Err(CouchDaoError::RequestStatus {
                key: key.to_owned(),
                status: other,
            }),
        }
    }

    async fn put(&self, key: String, value: Value) -> CouchResult<()> {
        let rev = self.current_revision(&key).await?;
        let document = CouchKvDocument {
            id: key.clone(),
            rev,
            value,
        };

        let response = self
            .document_request(Method::PUT, &key)
            .json(&document)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                key: key.clone(),
                source,
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(CouchDaoError::RequestStatus {
                key,
                status: response.status(),
            })
        }
    }

    async fn remove(&self, key: String) -> CouchResult<()> {
        let Some(rev) = self.current_revision(&key).await? else {
            return Ok(());
        };

        let response = self
            .document_request(Method::DELETE, &key)
            .query(&[("rev", rev)])
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                key: key.clone(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(()),
            status if status.is_success() => Ok(()),
            other => Err(CouchDaoError::RequestStatus { key, status: other }),
        }
    }

    async fn ping(&self) -> CouchResult<()> {
        let database = self.database.to_string();
        let response = self
            .authorize(self.client.get((*self.database_url).clone()))
            .send()
            .await
            .map_err(|source| CouchDaoError::DatabaseQuery {
                database: database.clone(),
                source,
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(CouchDaoError::DatabaseStatus {
                database,
                status: response.status(),
            })
        }
    }
}

fn database_url(base_url: &str, database: &str) -> CouchResult<Url> {
    let invalid = |reason: String| CouchDaoError::InvalidBaseUrl {
        url: base_url.to_owned(),
        reason,
    };

    let mut url =
        Url::parse(base_url.trim_end_matches('/')).map_err(|err| invalid(err.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| invalid("URL cannot be a base".into()))?
        .pop_if_empty()
        .push(database);
    Ok(url)
}

impl KvStore for CouchKvStore {
    fn backend_name(&self) -> &'static str {
        "couchdb"
    }

    fn get(&self, key: String) -> BoxFuture<'static, StorageResult<Option<Value>>> {
        let store = self.clone();
        Box::pin(async move {
            let document = store.fetch(&key).await?;
            Ok(document.map(|doc| doc.value))
        })
    }

    fn set(&self, key: String, value: Value) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.put(key, value).await.map_err(Into::into) })
    }

    fn delete(&self, key: String) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.remove(key).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_database().await.map_err(Into::into) })
    }
}
