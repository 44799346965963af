//! Advisory edit lock of a board: status, acquire/renew and release.

use tracing::{debug, info, warn};

use crate::{
    dto::lock::{AcquireLockResponse, LockStatusResponse},
    error::ServiceError,
    state::{
        SharedState,
        clock::iso_timestamp,
        edit_lock::{self, AcquireDecision, LOCK_TIMEOUT_MS},
    },
};

/// Live lock state of `board`. A stale record found on the way is deleted.
pub async fn status(state: &SharedState, board: &str) -> Result<LockStatusResponse, ServiceError> {
    let repo = state.board(board).await?;
    let stored = repo.lock().await?;
    let view = edit_lock::inspect(stored.as_ref(), state.now_ms());

    if stored.is_some() && !view.is_locked() {
        debug!(board = repo.board(), "purging expired edit lock");
        repo.delete_lock().await?;
    }

    Ok(view.into())
}

/// Grant, renew or deny the lock of `board` for `session_id`.
///
/// Two sessions racing on an unlocked board may both be granted; the last write wins.
pub async fn acquire(
    state: &SharedState,
    board: &str,
    session_id: &str,
) -> Result<AcquireLockResponse, ServiceError> {
    if session_id.trim().is_empty() {
        return Err(ServiceError::InvalidInput("session id must not be blank".into()));
    }

    let repo = state.board(board).await?;
    let stored = repo.lock().await?;

    match edit_lock::decide_acquire(stored.as_ref(), session_id, state.now_ms()) {
        AcquireDecision::Grant { lock, renewed } => {
            repo.set_lock(&lock).await?;
            if renewed {
                debug!(board = repo.board(), session_id, "edit lock renewed");
            } else {
                info!(board = repo.board(), session_id, "edit lock granted");
            }
            Ok(AcquireLockResponse {
                acquired_at: iso_timestamp(lock.acquired_at_ms),
                session_id: lock.session_id,
                renewed,
                expires_in_ms: LOCK_TIMEOUT_MS,
            })
        }
        AcquireDecision::Deny { remaining_ms } => {
            info!(
                board = repo.board(),
                session_id, remaining_ms, "edit lock denied"
            );
            Err(ServiceError::LockDenied { remaining_ms })
        }
    }
}

/// Release the lock of `board`. Without a session the release is unconditional.
pub async fn release(
    state: &SharedState,
    board: &str,
    session_id: Option<&str>,
) -> Result<(), ServiceError> {
    let repo = state.board(board).await?;
    let stored = repo.lock().await?;

    if let Err(err) = edit_lock::check_release(stored.as_ref(), session_id, state.now_ms()) {
        warn!(
            board = repo.board(),
            session_id = session_id.unwrap_or_default(),
            "refusing to release a lock held by another session"
        );
        return Err(err.into());
    }

    repo.delete_lock().await?;
    info!(board = repo.board(), "edit lock released");
    Ok(())
}
