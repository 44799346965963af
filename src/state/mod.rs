/// Time source.
pub mod clock;
/// Advisory edit lock.
pub mod edit_lock;
/// Card layout and lines.
pub mod geometry;
/// Board ranking.
pub mod leaderboard;
/// Confirmed lines of a board.
pub mod ledger;
/// Line completion and locked cells.
pub mod lines;

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{
    config::AppConfig,
    dao::{board::BoardRepository, kv_store::KvStore},
    error::ServiceError,
    state::clock::{Clock, SystemClock},
};

/// Handle to the application state shared by every handler.
pub type SharedState = Arc<AppState>;

/// Central application state: the installed storage backend, the board roster and the clock.
pub struct AppState {
    kv_store: RwLock<Option<Arc<dyn KvStore>>>,
    degraded: watch::Sender<bool>,
    config: AppConfig,
    clock: Arc<dyn Clock>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Same as [`AppState::new`] with an explicit time source.
    pub fn with_clock(config: AppConfig, clock: Arc<dyn Clock>) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            kv_store: RwLock::new(None),
            degraded: degraded_tx,
            config,
            clock,
        })
    }

    /// Obtain a handle to the current store, if one is installed.
    pub async fn kv_store(&self) -> Option<Arc<dyn KvStore>> {
        let guard = self.kv_store.read().await;
        guard.as_ref().cloned()
    }

    /// Current store, or [`ServiceError::Degraded`] while none is usable.
    pub async fn require_kv_store(&self) -> Result<Arc<dyn KvStore>, ServiceError> {
        if self.is_degraded() {
            return Err(ServiceError::Degraded);
        }
        self.kv_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new store implementation and leave degraded mode.
    pub async fn install_kv_store(&self, store: Arc<dyn KvStore>) {
        {
            let mut guard = self.kv_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current store and enter degraded mode.
    pub async fn clear_kv_store(&self) {
        {
            let mut guard = self.kv_store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    /// Loaded application configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Current time in epoch milliseconds.
    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Repository for `board` after checking it belongs to the roster.
    pub async fn board(&self, board: &str) -> Result<BoardRepository, ServiceError> {
        let name = self
            .config
            .resolve_board(board)
            .ok_or_else(|| ServiceError::InvalidInput(format!("unknown board `{board}`")))?;
        let store = self.require_kv_store().await?;
        Ok(BoardRepository::new(store, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::kv_store::memory::MemoryKvStore;

    #[tokio::test]
    async fn starts_degraded_until_a_store_is_installed() {
        let state = AppState::new(AppConfig::default());
        assert!(state.is_degraded());
        assert!(matches!(
            state.require_kv_store().await,
            Err(ServiceError::Degraded)
        ));

        let mut watcher = state.degraded_watcher();
        state.install_kv_store(Arc::new(MemoryKvStore::new())).await;
        assert!(watcher.has_changed().unwrap());
        assert!(!*watcher.borrow_and_update());
        assert!(state.require_kv_store().await.is_ok());

        state.clear_kv_store().await;
        assert!(state.is_degraded());
    }

    #[tokio::test]
    async fn unknown_boards_are_rejected() {
        let state = AppState::new(AppConfig::default());
        state.install_kv_store(Arc::new(MemoryKvStore::new())).await;

        assert!(state.board("Annenberg").await.is_ok());
        assert!(matches!(
            state.board("Broadway").await,
            Err(ServiceError::InvalidInput(_))
        ));
    }
}
