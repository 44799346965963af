//! Confirmation ledger of a board: the append-only list of confirmed lines together with the
//! timestamp of the very first confirmation.
//!
//! Both live in one record so that appending a line and recording the first confirmation are a
//! single storage write.

use thiserror::Error;

use crate::state::geometry::{LINE_LENGTH, LineId, LineKind};

/// A line the players explicitly locked in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedLine {
    /// Which line was confirmed.
    pub line: LineId,
    /// Cells of the line captured at confirmation time.
    pub cells: [u8; LINE_LENGTH],
    /// ISO-8601 timestamp of the confirmation.
    pub confirmed_at: String,
}

/// Reasons a confirmation can be refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfirmError {
    /// Line identifier or cells do not describe a line of the card.
    #[error("malformed line: {0}")]
    MalformedLine(String),
    /// The line has already been confirmed for this board.
    #[error("{0} is already confirmed")]
    AlreadyConfirmed(LineId),
}

/// Result of a successful confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmOutcome {
    /// Line that was appended.
    pub line: LineId,
    /// Number of confirmed lines after the append.
    pub confirmed_count: usize,
    /// Whether this was the first confirmation ever recorded for the board.
    pub is_first_confirmation: bool,
    /// Timestamp stored on the new line.
    pub confirmed_at: String,
}

/// Confirmed lines of one board plus the first-confirmation timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfirmationLedger {
    lines: Vec<ConfirmedLine>,
    first_confirmed_at: Option<String>,
}

impl ConfirmationLedger {
    /// Rebuild a ledger from persisted parts.
    ///
    /// When the stored first-confirmation timestamp is missing but lines exist, the earliest line
    /// timestamp is used instead.
    pub fn from_parts(lines: Vec<ConfirmedLine>, first_confirmed_at: Option<String>) -> Self {
        let first_confirmed_at = first_confirmed_at
            .or_else(|| lines.iter().map(|line| line.confirmed_at.clone()).min());
        Self {
            lines,
            first_confirmed_at,
        }
    }

    /// Confirmed lines in append order.
    pub fn lines(&self) -> &[ConfirmedLine] {
        &self.lines
    }

    /// Number of confirmed lines.
    pub fn confirmed_count(&self) -> usize {
        self.lines.len()
    }

    /// Timestamp of the first confirmation, if any.
    pub fn first_confirmed_at(&self) -> Option<&str> {
        self.first_confirmed_at.as_deref()
    }

    /// Whether `line` has already been confirmed.
    pub fn is_confirmed(&self, line: LineId) -> bool {
        self.lines.iter().any(|existing| existing.line == line)
    }

    /// Append `line` after checking that `cells` match the card geometry and that the line was
    /// not confirmed before. The first confirmation timestamp is recorded once and never
    /// overwritten.
    pub fn confirm(
        &mut self,
        kind: LineKind,
        index: u8,
        cells: &[u8],
        now: String,
    ) -> Result<ConfirmOutcome, ConfirmError> {
        let line = LineId::new(kind, index).ok_or_else(|| {
            ConfirmError::MalformedLine(format!(
                "{kind} index {index} is out of range (expected < {})",
                kind.count()
            ))
        })?;

        let expected = line.cells();
        if cells != expected.as_slice() {
            return Err(ConfirmError::MalformedLine(format!(
                "cells {cells:?} do not match {line} (expected {expected:?})"
            )));
        }

        if self.is_confirmed(line) {
            return Err(ConfirmError::AlreadyConfirmed(line));
        }

        let is_first_confirmation = self.first_confirmed_at.is_none();
        if is_first_confirmation {
            self.first_confirmed_at = Some(now.clone());
        }

        self.lines.push(ConfirmedLine {
            line,
            cells: expected,
            confirmed_at: now.clone(),
        });

        Ok(ConfirmOutcome {
            line,
            confirmed_count: self.lines.len(),
            is_first_confirmation,
            confirmed_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T1: &str = "2025-03-01T18:00:00.000Z";
    const T2: &str = "2025-03-01T18:05:00.000Z";

    #[test]
    fn first_confirmation_sets_counters() {
        let mut ledger = ConfirmationLedger::default();
        let outcome = ledger
            .confirm(LineKind::Row, 0, &[0, 1, 2, 3, 4], T1.into())
            .unwrap();

        assert_eq!(outcome.confirmed_count, 1);
        assert!(outcome.is_first_confirmation);
        assert_eq!(ledger.first_confirmed_at(), Some(T1));
        assert_eq!(ledger.lines()[0].cells, [0, 1, 2, 3, 4]);
    }

    #[test]
    fn second_confirmation_of_the_same_line_is_rejected() {
        let mut ledger = ConfirmationLedger::default();
        ledger
            .confirm(LineKind::Column, 1, &[1, 6, 11, 16, 21], T1.into())
            .unwrap();
        let err = ledger
            .confirm(LineKind::Column, 1, &[1, 6, 11, 16, 21], T2.into())
            .unwrap_err();

        assert!(matches!(err, ConfirmError::AlreadyConfirmed(_)));
        assert_eq!(ledger.confirmed_count(), 1);
    }

    #[test]
    fn first_confirmation_timestamp_is_never_overwritten() {
        let mut ledger = ConfirmationLedger::default();
        ledger
            .confirm(LineKind::Row, 0, &[0, 1, 2, 3, 4], T1.into())
            .unwrap();
        let outcome = ledger
            .confirm(LineKind::Diagonal, 0, &[0, 6, 12, 18, 24], T2.into())
            .unwrap();

        assert!(!outcome.is_first_confirmation);
        assert_eq!(outcome.confirmed_count, 2);
        assert_eq!(ledger.first_confirmed_at(), Some(T1));
    }

    #[test]
    fn mismatching_cells_are_malformed() {
        let mut ledger = ConfirmationLedger::default();
        let err = ledger
            .confirm(LineKind::Row, 1, &[0, 1, 2, 3, 4], T1.into())
            .unwrap_err();
        assert!(matches!(err, ConfirmError::MalformedLine(_)));

        let err = ledger
            .confirm(LineKind::Row, 1, &[5, 6, 7, 8], T1.into())
            .unwrap_err();
        assert!(matches!(err, ConfirmError::MalformedLine(_)));
        assert_eq!(ledger.confirmed_count(), 0);
        assert_eq!(ledger.first_confirmed_at(), None);
    }

    #[test]
    fn out_of_range_index_is_malformed() {
        let mut ledger = ConfirmationLedger::default();
        let err = ledger
            .confirm(LineKind::Diagonal, 2, &[0, 6, 12, 18, 24], T1.into())
            .unwrap_err();
        assert!(matches!(err, ConfirmError::MalformedLine(_)));
    }

    #[test]
    fn from_parts_recovers_missing_first_timestamp() {
        let line = LineId::new(LineKind::Row, 3).unwrap();
        let ledger = ConfirmationLedger::from_parts(
            vec![ConfirmedLine {
                line,
                cells: line.cells(),
                confirmed_at: T2.into(),
            }],
            None,
        );
        assert_eq!(ledger.first_confirmed_at(), Some(T2));
    }
}
