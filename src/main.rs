//! Theatre Bingo Back binary entrypoint wiring the REST layer to the selected storage backend.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::{Context, bail};
use axum::Router;
use futures::{FutureExt, future::BoxFuture};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use theatre_bingo_back::{
    config::AppConfig,
    dao::{
        kv_store::{KvStore, memory::MemoryKvStore},
        storage::StorageError,
    },
    routes,
    services::storage_supervisor,
    state::{AppState, SharedState},
};

/// Environment variable selecting the storage backend.
const STORAGE_BACKEND_ENV: &str = "STORAGE_BACKEND";

type Connector =
    Box<dyn FnMut() -> BoxFuture<'static, Result<Arc<dyn KvStore>, StorageError>> + Send>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let app_state = AppState::new(AppConfig::load());

    let backend = env::var(STORAGE_BACKEND_ENV).unwrap_or_else(|_| "memory".into());
    let connect = storage_connector(&backend)?;
    info!(backend = %backend, "starting storage supervisor");
    tokio::spawn(storage_supervisor::run(app_state.clone(), connect));

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Build the connect callback handed to the storage supervisor.
fn storage_connector(backend: &str) -> anyhow::Result<Connector> {
    match backend.trim().to_ascii_lowercase().as_str() {
        "" | "memory" => {
            // One map for the whole process so reconnects keep the data.
            let store = MemoryKvStore::new();
            Ok(Box::new(move || {
                let store: Arc<dyn KvStore> = Arc::new(store.clone());
                async move { Ok::<_, StorageError>(store) }.boxed()
            }))
        }
        #[cfg(feature = "couch-store")]
        "couch" | "couchdb" => {
            use theatre_bingo_back::dao::kv_store::couchdb::{CouchConfig, CouchKvStore};

            let config = CouchConfig::from_env().context("reading CouchDB configuration")?;
            Ok(Box::new(move || {
                let config = config.clone();
                async move {
                    let store = CouchKvStore::connect(config).await?;
                    Ok::<Arc<dyn KvStore>, StorageError>(Arc::new(store))
                }
                .boxed()
            }))
        }
        #[cfg(feature = "mongo-store")]
        "mongo" | "mongodb" => {
            use theatre_bingo_back::dao::kv_store::mongodb::{MongoConfig, MongoKvStore};

            Ok(Box::new(|| {
                async {
                    let config = MongoConfig::from_env().await?;
                    let store = MongoKvStore::connect(config).await?;
                    Ok::<Arc<dyn KvStore>, StorageError>(Arc::new(store))
                }
                .boxed()
            }))
        }
        other => bail!("unsupported {STORAGE_BACKEND_ENV} `{other}` (is the feature enabled?)"),
    }
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
