//! Typed access to the keys of one board.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use serde::{Serialize, de::DeserializeOwned};

use crate::{
    dao::{
        kv_store::KvStore,
        models::{ConfirmationLedgerEntity, EditLockEntity},
        storage::{StorageError, StorageResult},
    },
    state::{edit_lock::EditLock, ledger::ConfirmationLedger},
};

/// Every per-board key of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardKey {
    /// Marked cell indices.
    Card,
    /// Cell comments keyed by cell index.
    Comments,
    /// Custom text of the free center cell.
    CenterText,
    /// Confirmation ledger (confirmed lines + first confirmation time).
    ConfirmedLines,
    /// Advisory edit lock.
    Lock,
    /// Projection: first confirmation timestamp.
    FirstConfirmation,
    /// Projection: number of confirmed lines.
    ConfirmedCount,
    /// Projection: number of marked cells.
    MarkedCount,
}

impl BoardKey {
    /// All keys, used when wiping a board.
    pub const ALL: [BoardKey; 8] = [
        BoardKey::Card,
        BoardKey::Comments,
        BoardKey::CenterText,
        BoardKey::ConfirmedLines,
        BoardKey::Lock,
        BoardKey::FirstConfirmation,
        BoardKey::ConfirmedCount,
        BoardKey::MarkedCount,
    ];

    fn prefix(self) -> &'static str {
        match self {
            BoardKey::Card => "card",
            BoardKey::Comments => "comments",
            BoardKey::CenterText => "centerText",
            BoardKey::ConfirmedLines => "confirmedLines",
            BoardKey::Lock => "lock",
            BoardKey::FirstConfirmation => "firstConfirmation",
            BoardKey::ConfirmedCount => "confirmedCount",
            BoardKey::MarkedCount => "markedCount",
        }
    }

    /// Store key of this entry for `board`, e.g. `card:Annenberg`.
    pub fn for_board(self, board: &str) -> String {
        format!("{}:{board}", self.prefix())
    }
}

/// Repository bound to a single board.
#[derive(Clone)]
pub struct BoardRepository {
    store: Arc<dyn KvStore>,
    board: String,
}

impl BoardRepository {
    /// Bind `store` to `board`.
    pub fn new(store: Arc<dyn KvStore>, board: impl Into<String>) -> Self {
        Self {
            store,
            board: board.into(),
        }
    }

    /// Name of the board this repository reads and writes.
    pub fn board(&self) -> &str {
        &self.board
    }

    async fn read<T: DeserializeOwned>(&self, key: BoardKey) -> StorageResult<Option<T>> {
        let key = key.for_board(&self.board);
        match self.store.get(key.clone()).await? {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|source| StorageError::corrupted(key, source)),
        }
    }

    async fn write<T: Serialize>(&self, key: BoardKey, value: &T) -> StorageResult<()> {
        let key = key.for_board(&self.board);
        let value =
            serde_json::to_value(value).map_err(|source| StorageError::corrupted(&key, source))?;
        self.store.set(key, value).await
    }

    async fn remove(&self, key: BoardKey) -> StorageResult<()> {
        self.store.delete(key.for_board(&self.board)).await
    }

    /// Marked cells; a missing key is an empty set.
    pub async fn marked_cells(&self) -> StorageResult<BTreeSet<u8>> {
        Ok(self.read(BoardKey::Card).await?.unwrap_or_default())
    }

    /// Replace the marked cells.
    pub async fn set_marked_cells(&self, cells: &BTreeSet<u8>) -> StorageResult<()> {
        self.write(BoardKey::Card, cells).await
    }

    /// Cell comments keyed by cell index.
    pub async fn comments(&self) -> StorageResult<BTreeMap<u8, String>> {
        Ok(self.read(BoardKey::Comments).await?.unwrap_or_default())
    }

    /// Replace every comment of the board.
    pub async fn set_comments(&self, comments: &BTreeMap<u8, String>) -> StorageResult<()> {
        self.write(BoardKey::Comments, comments).await
    }

    /// Custom center text, if any was stored.
    pub async fn center_text(&self) -> StorageResult<Option<String>> {
        self.read(BoardKey::CenterText).await
    }

    /// Store the center text.
    pub async fn set_center_text(&self, text: &str) -> StorageResult<()> {
        self.write(BoardKey::CenterText, &text).await
    }

    /// Load the confirmation ledger; a missing record is an empty ledger.
    pub async fn ledger(&self) -> StorageResult<ConfirmationLedger> {
        let key = BoardKey::ConfirmedLines;
        let Some(entity) = self.read::<ConfirmationLedgerEntity>(key).await? else {
            return Ok(ConfirmationLedger::default());
        };
        ConfirmationLedger::try_from(entity).map_err(|reason| {
            StorageError::corrupted(
                key.for_board(&self.board),
                <serde_json::Error as serde::de::Error>::custom(reason),
            )
        })
    }

    /// Persist the whole ledger in one write.
    pub async fn set_ledger(&self, ledger: &ConfirmationLedger) -> StorageResult<()> {
        self.write(
            BoardKey::ConfirmedLines,
            &ConfirmationLedgerEntity::from(ledger),
        )
        .await
    }

    /// Stored edit lock, expired or not.
    pub async fn lock(&self) -> StorageResult<Option<EditLock>> {
        Ok(self
            .read::<EditLockEntity>(BoardKey::Lock)
            .await?
            .map(Into::into))
    }

    /// Store `lock`, replacing any previous holder.
    pub async fn set_lock(&self, lock: &EditLock) -> StorageResult<()> {
        self.write(BoardKey::Lock, &EditLockEntity::from(lock)).await
    }

    /// Remove the edit lock.
    pub async fn delete_lock(&self) -> StorageResult<()> {
        self.remove(BoardKey::Lock).await
    }

    /// Write the first-confirmation projection.
    pub async fn set_first_confirmation(&self, timestamp: &str) -> StorageResult<()> {
        self.write(BoardKey::FirstConfirmation, &timestamp).await
    }

    /// Write the confirmed-count projection.
    pub async fn set_confirmed_count(&self, count: u32) -> StorageResult<()> {
        self.write(BoardKey::ConfirmedCount, &count).await
    }

    /// Write the marked-count projection.
    pub async fn set_marked_count(&self, count: u32) -> StorageResult<()> {
        self.write(BoardKey::MarkedCount, &count).await
    }

    /// Delete every key of the board.
    pub async fn clear(&self) -> StorageResult<()> {
        for key in BoardKey::ALL {
            self.remove(key).await?;
        }
        Ok(())
    }
}
