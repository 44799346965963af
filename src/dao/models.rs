use serde::{Deserialize, Serialize};

use crate::state::{
    edit_lock::EditLock,
    geometry::{LineId, LineKind},
    ledger::{ConfirmationLedger, ConfirmedLine},
};

/// Confirmed line as stored inside the ledger record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfirmedLineEntity {
    /// Direction of the line.
    #[serde(rename = "type")]
    pub kind: LineKind,
    /// Position of the line among lines of the same direction.
    pub index: u8,
    /// Cells captured at confirmation time.
    pub items: Vec<u8>,
    /// ISO-8601 confirmation time.
    pub timestamp: String,
}

/// Composite record holding every confirmed line of a board and its first confirmation time.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationLedgerEntity {
    /// Confirmed lines in append order.
    #[serde(default)]
    pub lines: Vec<ConfirmedLineEntity>,
    /// Timestamp of the first confirmation.
    #[serde(default)]
    pub first_confirmed_at: Option<String>,
}

/// Persisted advisory edit lock.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EditLockEntity {
    /// Session owning the lock.
    pub session_id: String,
    /// Epoch milliseconds of the last acquire/renew.
    pub timestamp: i64,
}

impl From<&ConfirmedLine> for ConfirmedLineEntity {
    fn from(line: &ConfirmedLine) -> Self {
        Self {
            kind: line.line.kind(),
            index: line.line.index(),
            items: line.cells.to_vec(),
            timestamp: line.confirmed_at.clone(),
        }
    }
}

impl TryFrom<ConfirmedLineEntity> for ConfirmedLine {
    type Error = String;

    fn try_from(entity: ConfirmedLineEntity) -> Result<Self, Self::Error> {
        let line = LineId::new(entity.kind, entity.index)
            .ok_or_else(|| format!("unknown {} index {}", entity.kind, entity.index))?;
        let cells = line.cells();
        if entity.items != cells {
            return Err(format!(
                "{line} lists cells {:?}, expected {cells:?}",
                entity.items
            ));
        }
        Ok(Self {
            line,
            cells,
            confirmed_at: entity.timestamp,
        })
    }
}

impl From<&ConfirmationLedger> for ConfirmationLedgerEntity {
    fn from(ledger: &ConfirmationLedger) -> Self {
        Self {
            lines: ledger.lines().iter().map(Into::into).collect(),
            first_confirmed_at: ledger.first_confirmed_at().map(str::to_owned),
        }
    }
}

impl TryFrom<ConfirmationLedgerEntity> for ConfirmationLedger {
    type Error = String;

    fn try_from(entity: ConfirmationLedgerEntity) -> Result<Self, Self::Error> {
        let lines = entity
            .lines
            .into_iter()
            .map(ConfirmedLine::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ConfirmationLedger::from_parts(
            lines,
            entity.first_confirmed_at,
        ))
    }
}

impl From<&EditLock> for EditLockEntity {
    fn from(lock: &EditLock) -> Self {
        Self {
            session_id: lock.session_id.clone(),
            timestamp: lock.acquired_at_ms,
        }
    }
}

impl From<EditLockEntity> for EditLock {
    fn from(entity: EditLockEntity) -> Self {
        Self {
            session_id: entity.session_id,
            acquired_at_ms: entity.timestamp,
        }
    }
}
