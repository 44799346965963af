//! Validation helpers for DTOs.

use validator::ValidationError;

use crate::state::geometry::{CELL_COUNT, is_valid_cell};

/// Longest session identifier accepted from clients.
pub const MAX_SESSION_ID_LEN: usize = 128;

/// Validates that every cell index lies on the card and appears once.
pub fn validate_cells(cells: &[u8]) -> Result<(), ValidationError> {
    if let Some(cell) = cells.iter().find(|cell| !is_valid_cell(**cell)) {
        let mut err = ValidationError::new("cell_range");
        err.message = Some(
            format!(
                "cell {cell} is out of range (expected 0..{})",
                CELL_COUNT - 1
            )
            .into(),
        );
        return Err(err);
    }

    let mut seen = [false; CELL_COUNT as usize];
    for cell in cells {
        if std::mem::replace(&mut seen[*cell as usize], true) {
            let mut err = ValidationError::new("cell_duplicate");
            err.message = Some(format!("cell {cell} is listed twice").into());
            return Err(err);
        }
    }

    Ok(())
}

/// Validates that a session identifier is non-blank, printable and reasonably short.
///
/// # Examples
///
/// ```ignore
/// validate_session_id("3f1c9a7e-5d2b-4b8e-9c1a-7e2f4d6b8a0c") // Ok
/// validate_session_id("   ")                                   // Err - blank
/// ```
pub fn validate_session_id(id: &str) -> Result<(), ValidationError> {
    if id.trim().is_empty() {
        let mut err = ValidationError::new("session_id_blank");
        err.message = Some("Session ID must not be blank".into());
        return Err(err);
    }

    if id.len() > MAX_SESSION_ID_LEN {
        let mut err = ValidationError::new("session_id_length");
        err.message = Some(
            format!(
                "Session ID must be at most {MAX_SESSION_ID_LEN} bytes (got {})",
                id.len()
            )
            .into(),
        );
        return Err(err);
    }

    if id.chars().any(char::is_control) {
        let mut err = ValidationError::new("session_id_format");
        err.message = Some("Session ID must not contain control characters".into());
        return Err(err);
    }

    Ok(())
}
