//! Advisory edit lock of a board.
//!
//! The lock is plain data (owner session + acquisition time) persisted in the store, never an
//! in-process mutex: it has to survive restarts and be visible to every server instance. Expiry
//! is lazy, every read recomputes liveness against the current time, so callers must go through
//! [`inspect`] before trusting a stored lock.

use std::time::Duration;

use thiserror::Error;

/// How long a lock stays valid after its last acquisition or renewal.
pub const LOCK_TIMEOUT: Duration = Duration::from_secs(3 * 60);
/// [`LOCK_TIMEOUT`] in epoch milliseconds arithmetic.
pub const LOCK_TIMEOUT_MS: i64 = LOCK_TIMEOUT.as_millis() as i64;

/// Lock record as persisted for a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditLock {
    /// Opaque, caller-supplied session identifier owning the lock.
    pub session_id: String,
    /// Epoch milliseconds of the last acquire/renew.
    pub acquired_at_ms: i64,
}

impl EditLock {
    /// Milliseconds elapsed since the lock was acquired.
    pub fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms - self.acquired_at_ms
    }

    /// Whether the lock is past its deadline.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.age_ms(now_ms) >= LOCK_TIMEOUT_MS
    }

    /// Milliseconds left before expiry, clamped at zero.
    pub fn remaining_ms(&self, now_ms: i64) -> i64 {
        (LOCK_TIMEOUT_MS - self.age_ms(now_ms)).max(0)
    }
}

/// Lock state as observed at a given instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockView {
    /// Nobody holds a live lock.
    Unlocked,
    /// A live lock is held.
    Held {
        /// Session owning the lock.
        owner: String,
        /// Epoch milliseconds of the last acquire/renew.
        acquired_at_ms: i64,
        /// Milliseconds left before expiry.
        remaining_ms: i64,
    },
}

impl LockView {
    /// Whether a live lock exists.
    pub fn is_locked(&self) -> bool {
        matches!(self, LockView::Held { .. })
    }
}

/// Outcome of an acquire request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireDecision {
    /// The caller obtains (or renews) the lock; the record must be written.
    Grant {
        /// Lock record to persist.
        lock: EditLock,
        /// True when the caller already held a live lock.
        renewed: bool,
    },
    /// A different session holds a live lock.
    Deny {
        /// Milliseconds before the current lock expires.
        remaining_ms: i64,
    },
}

/// Release was requested by a session that does not hold the live lock.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("lock on the board is owned by another session")]
pub struct NotOwner;

/// Project a stored lock onto its live view. Expired locks read as unlocked.
pub fn inspect(stored: Option<&EditLock>, now_ms: i64) -> LockView {
    match stored {
        Some(lock) if !lock.is_expired(now_ms) => LockView::Held {
            owner: lock.session_id.clone(),
            acquired_at_ms: lock.acquired_at_ms,
            remaining_ms: lock.remaining_ms(now_ms),
        },
        _ => LockView::Unlocked,
    }
}

/// Decide an acquire request from `session_id` against the stored lock.
pub fn decide_acquire(stored: Option<&EditLock>, session_id: &str, now_ms: i64) -> AcquireDecision {
    let renewed = match inspect(stored, now_ms) {
        LockView::Held {
            owner,
            remaining_ms,
            ..
        } => {
            if owner != session_id {
                return AcquireDecision::Deny { remaining_ms };
            }
            true
        }
        LockView::Unlocked => false,
    };

    AcquireDecision::Grant {
        lock: EditLock {
            session_id: session_id.to_owned(),
            acquired_at_ms: now_ms,
        },
        renewed,
    }
}

/// Check whether the lock may be deleted on behalf of `requester`.
///
/// Without a requester the release is unconditional. A requester only fails when a live lock is
/// held by somebody else.
pub fn check_release(
    stored: Option<&EditLock>,
    requester: Option<&str>,
    now_ms: i64,
) -> Result<(), NotOwner> {
    let Some(requester) = requester else {
        return Ok(());
    };

    match inspect(stored, now_ms) {
        LockView::Held { owner, .. } if owner != requester => Err(NotOwner),
        _ => Ok(()),
    }
}
