//! Framing for the append-only CI output file.

use crate::error::EnvError;

/// Formats a multi-line `key<<DELIMITER` block.
///
/// The delimiter is the upper-cased key with a `_BODY` suffix
/// (`matrix` -> `MATRIX_BODY`).
pub fn heredoc_entry(key: &str, value: &str) -> Result<String, EnvError> {
    let delimiter = format!("{}_BODY", key.to_uppercase());
    if value.lines().any(|line| line == delimiter) {
        return Err(EnvError::DelimiterCollision {
            key: key.to_string(),
            delimiter,
        });
    }
    Ok(format!("{key}<<{delimiter}\n{value}\n{delimiter}\n"))
}
