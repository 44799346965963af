//! Static layout of the 5×5 card: cell indices, the free center and the twelve winning lines.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Number of cells along one side of the card.
pub const GRID_SIZE: u8 = 5;
/// Total number of cells on a card.
pub const CELL_COUNT: u8 = GRID_SIZE * GRID_SIZE;
/// Index of the free center cell, always considered marked.
pub const CENTER_INDEX: u8 = 12;
/// Number of cells in every line.
pub const LINE_LENGTH: usize = GRID_SIZE as usize;

/// Direction of a winning line on the card.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    /// Horizontal line, indexed top to bottom.
    Row,
    /// Vertical line, indexed left to right.
    #[serde(alias = "col")]
    Column,
    /// Diagonal: index 0 runs top-left to bottom-right, index 1 top-right to bottom-left.
    #[serde(alias = "diag")]
    Diagonal,
}

impl LineKind {
    /// Number of lines of this kind on the card.
    pub fn count(self) -> u8 {
        match self {
            LineKind::Row | LineKind::Column => GRID_SIZE,
            LineKind::Diagonal => 2,
        }
    }
}

impl fmt::Display for LineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LineKind::Row => "row",
            LineKind::Column => "column",
            LineKind::Diagonal => "diagonal",
        };
        f.write_str(label)
    }
}

/// Identifies one of the twelve lines of the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineId {
    kind: LineKind,
    index: u8,
}

impl LineId {
    /// Build a line identifier, returning `None` when the index is out of range for the kind.
    pub fn new(kind: LineKind, index: u8) -> Option<Self> {
        (index < kind.count()).then_some(Self { kind, index })
    }

    /// Direction of the line.
    pub fn kind(self) -> LineKind {
        self.kind
    }

    /// Position of the line among the lines of the same kind.
    pub fn index(self) -> u8 {
        self.index
    }

    /// Cell indices belonging to this line, in reading order.
    pub fn cells(self) -> [u8; LINE_LENGTH] {
        let i = self.index;
        let mut cells = [0u8; LINE_LENGTH];
        for (k, cell) in (0u8..).zip(cells.iter_mut()) {
            *cell = match self.kind {
                LineKind::Row => i * GRID_SIZE + k,
                LineKind::Column => k * GRID_SIZE + i,
                LineKind::Diagonal if i == 0 => k * (GRID_SIZE + 1),
                LineKind::Diagonal => (GRID_SIZE - 1) + k * (GRID_SIZE - 1),
            };
        }
        cells
    }

    /// Human readable name used in logs and client payloads.
    pub fn display_name(self) -> String {
        match self.kind {
            LineKind::Row => format!("Row {}", self.index + 1),
            LineKind::Column => format!("Column {}", self.index + 1),
            LineKind::Diagonal if self.index == 0 => {
                "Diagonal (top-left to bottom-right)".to_string()
            }
            LineKind::Diagonal => "Diagonal (top-right to bottom-left)".to_string(),
        }
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.index)
    }
}

/// Every line of the card in evaluation order: rows, then columns, then diagonals (main first).
pub fn all_lines() -> impl Iterator<Item = LineId> {
    [LineKind::Row, LineKind::Column, LineKind::Diagonal]
        .into_iter()
        .flat_map(|kind| (0..kind.count()).map(move |index| LineId { kind, index }))
}

/// Whether `cell` is a valid index on the card.
pub fn is_valid_cell(cell: u8) -> bool {
    cell < CELL_COUNT
}
