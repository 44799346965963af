//! Payloads of the board routes: card state, comments, center text and lines.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dto::validation::validate_cells,
    state::{
        geometry::{LineId, LineKind},
        ledger::ConfirmedLine,
    },
};

/// A line of the card.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq, Eq)]
pub struct LineSummary {
    #[serde(rename = "type")]
    pub kind: LineKind,
    pub index: u8,
    pub cells: Vec<u8>,
    /// Human readable label, e.g. "Row 1".
    pub name: String,
}

impl From<LineId> for LineSummary {
    fn from(line: LineId) -> Self {
        Self {
            kind: line.kind(),
            index: line.index(),
            cells: line.cells().to_vec(),
            name: line.display_name(),
        }
    }
}

/// A confirmed line with its confirmation time.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq, Eq)]
pub struct ConfirmedLineSummary {
    #[serde(flatten)]
    pub line: LineSummary,
    /// ISO-8601 confirmation time.
    pub confirmed_at: String,
}

impl From<&ConfirmedLine> for ConfirmedLineSummary {
    fn from(confirmed: &ConfirmedLine) -> Self {
        Self {
            line: confirmed.line.into(),
            confirmed_at: confirmed.confirmed_at.clone(),
        }
    }
}

/// Full state of a board.
#[derive(Debug, Serialize, ToSchema)]
pub struct BoardView {
    pub board: String,
    pub marked_cells: Vec<u8>,
    /// Comments keyed by cell index.
    pub comments: BTreeMap<String, String>,
    pub center_text: String,
    pub confirmed_lines: Vec<ConfirmedLineSummary>,
    /// Cells belonging to confirmed lines; they cannot be marked or unmarked anymore.
    pub locked_cells: Vec<u8>,
    /// Completed lines waiting for confirmation.
    pub pending_lines: Vec<LineSummary>,
    pub confirmed_count: u32,
    pub marked_count: u32,
    pub first_confirmation: Option<String>,
}

/// Replace the whole marked set of a board.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SetMarkedCellsRequest {
    #[validate(custom(function = "validate_cells"))]
    pub cells: Vec<u8>,
}

/// Mark or unmark a single cell.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ToggleCellRequest {
    pub marked: bool,
}

/// Marked set after a mutation, with the lines it completed.
#[derive(Debug, Serialize, ToSchema)]
pub struct MarkedCellsResponse {
    pub marked_cells: Vec<u8>,
    pub marked_count: u32,
    /// Completed lines waiting for confirmation.
    pub pending_lines: Vec<LineSummary>,
}

/// Set or clear the comment of a cell. A missing or blank text removes the comment.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CommentRequest {
    #[validate(range(max = 24))]
    pub cell: u8,
    #[serde(default)]
    pub text: Option<String>,
}

/// Comments of a board after a mutation.
#[derive(Debug, Serialize, ToSchema)]
pub struct CommentsResponse {
    pub comments: BTreeMap<String, String>,
}

/// Replace the text of the free center cell. A missing or blank text restores "FREE".
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CenterTextRequest {
    #[serde(default)]
    pub text: Option<String>,
}

/// Center text after a mutation.
#[derive(Debug, Serialize, ToSchema)]
pub struct CenterTextResponse {
    pub center_text: String,
}

/// Confirm a completed line.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ConfirmLineRequest {
    #[serde(rename = "type")]
    pub kind: LineKind,
    pub index: u8,
    /// Cells of the line, in card order.
    #[validate(length(equal = 5), custom(function = "validate_cells"))]
    pub cells: Vec<u8>,
}

/// Outcome of a successful confirmation.
#[derive(Debug, Serialize, ToSchema)]
pub struct ConfirmLineResponse {
    pub line: LineSummary,
    pub confirmed_count: u32,
    pub is_first_confirmation: bool,
    pub confirmed_at: String,
}

/// Render comments with string keys, the way they are exchanged with clients.
pub fn comments_by_cell(comments: &BTreeMap<u8, String>) -> BTreeMap<String, String> {
    comments
        .iter()
        .map(|(cell, text)| (cell.to_string(), text.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn confirm_request_accepts_short_kind_names() {
        let request: ConfirmLineRequest = serde_json::from_value(json!({
            "type": "col",
            "index": 2,
            "cells": [2, 7, 12, 17, 22]
        }))
        .unwrap();
        assert_eq!(request.kind, LineKind::Column);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn confirm_request_rejects_wrong_cell_count() {
        let request = ConfirmLineRequest {
            kind: LineKind::Row,
            index: 0,
            cells: vec![0, 1, 2, 3],
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn comment_request_rejects_off_card_cells() {
        let request = CommentRequest {
            cell: 25,
            text: Some("hi".into()),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn confirmed_line_summary_is_flat() {
        let line = LineId::new(LineKind::Diagonal, 0).unwrap();
        let summary = ConfirmedLineSummary {
            line: line.into(),
            confirmed_at: "2025-03-01T18:00:00.000Z".into(),
        };
        let value = serde_json::to_value(summary).unwrap();
        assert_eq!(value["type"], "diagonal");
        assert_eq!(value["cells"], json!([0, 6, 12, 18, 24]));
        assert_eq!(value["confirmed_at"], "2025-03-01T18:00:00.000Z");
    }
}
