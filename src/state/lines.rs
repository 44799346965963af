//! Line-completion detection and the derived locked-cell view.

use std::collections::BTreeSet;

use crate::state::{
    geometry::{CENTER_INDEX, LineId, all_lines},
    ledger::ConfirmedLine,
};

/// Whether every cell of `line` is marked, counting the center as always marked.
pub fn is_complete(marked: &BTreeSet<u8>, line: LineId) -> bool {
    line.cells()
        .iter()
        .all(|cell| *cell == CENTER_INDEX || marked.contains(cell))
}

/// Lines that are complete but have not been confirmed yet, in evaluation order.
pub fn detect(marked: &BTreeSet<u8>, confirmed: &[ConfirmedLine]) -> Vec<LineId> {
    all_lines()
        .filter(|line| is_complete(marked, *line))
        .filter(|line| !confirmed.iter().any(|existing| existing.line == *line))
        .collect()
}

/// Every cell covered by a confirmed line. Locked cells can no longer be marked or unmarked.
pub fn locked_cells(confirmed: &[ConfirmedLine]) -> BTreeSet<u8> {
    confirmed
        .iter()
        .flat_map(|line| line.cells.iter().copied())
        .collect()
}
