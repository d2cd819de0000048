use crate::errors::{VaultError, VaultResult};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_BACKUP_DIR_NAME: &str = ".backup";

pub fn default_backup_dir(vault_root: &Path) -> PathBuf {
    vault_root.join(DEFAULT_BACKUP_DIR_NAME)
}

pub fn create_backup(source: &Path, backup_dir: &Path) -> VaultResult<()> {
    if !source.exists() {
        tracing::debug!(path = %source.display(), "backup skipped, nothing to protect");
        return Ok(());
    }
    if !source.is_file() {
        return Err(VaultError::BackupFailed(format!(
            "not a regular file: {}",
            source.display()
        )));
    }

    let base_name = source
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            VaultError::BackupFailed(format!("unusable file name: {}", source.display()))
        })?;

    fs::create_dir_all(backup_dir).map_err(|error| {
        VaultError::BackupFailed(format!(
            "cannot create backup directory {}: {error}",
            backup_dir.display()
        ))
    })?;

    // Microsecond resolution keeps rapid repeated backups from colliding.
    let stamp = Local::now().format("%Y%m%d_%H%M%S_%6f");
    let backup_path = backup_dir.join(format!("{base_name}.{stamp}.bak"));
    fs::copy(source, &backup_path).map_err(|error| {
        VaultError::BackupFailed(format!(
            "copy to {} failed: {error}",
            backup_path.display()
        ))
    })?;

    tracing::debug!(backup = %backup_path.display(), "backup created");
    Ok(())
}
