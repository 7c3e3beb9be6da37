use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{atomic_write, backup_path_for};
use crate::error::AppError;

/// Back up the current file (if there is one) and atomically replace it.
///
/// Returns the backup path when a backup was made. Callers only invoke this
/// when the content actually changed.
pub fn persist(path: &Path, content: &str, existed: bool) -> Result<Option<PathBuf>, AppError> {
    let backup = if existed {
        let backup = backup_path_for(path);
        fs::copy(path, &backup).map_err(|e| AppError::BackupFailed {
            path: path.display().to_string(),
            source: e,
        })?;
        log::debug!("Backed up {} to {}", path.display(), backup.display());
        Some(backup)
    } else {
        None
    };

    atomic_write(path, content.as_bytes())?;
    log::info!("Wrote {}", path.display());
    Ok(backup)
}
