//! Writing exported text to a user-chosen destination.

use std::fs;
use std::path::Path;

use crate::domain::{AppError, Result};

/// Write `text` verbatim to `path`, creating parent directories.
///
/// # Errors
/// Returns error if the directory or file cannot be written.
pub fn write_export(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            AppError::io(format!("Failed to create directory {}", parent.display()), e)
        })?;
    }

    fs::write(path, text)
        .map_err(|e| AppError::io(format!("Failed to write {}", path.display()), e))?;

    tracing::info!(path = %path.display(), bytes = text.len(), "Chat log exported");
    Ok(())
}
