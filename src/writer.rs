use crate::backup::{self, create_backup};
use crate::errors::{VaultError, VaultResult};
use crate::frontmatter::{self, Frontmatter, SplitDocument};
use crate::paths::resolve_note_path;
use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WriteOptions {
    pub backup: bool,
    pub backup_dir: Option<PathBuf>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            backup: true,
            backup_dir: None,
        }
    }
}

impl WriteOptions {
    pub fn without_backup() -> Self {
        Self {
            backup: false,
            backup_dir: None,
        }
    }

    fn backup_dir_for(&self, vault_root: &Path) -> PathBuf {
        self.backup_dir
            .clone()
            .unwrap_or_else(|| backup::default_backup_dir(vault_root))
    }
}

pub fn create_note(
    vault_root: &Path,
    note_path: &str,
    content: &str,
    metadata: Option<&Mapping>,
    overwrite: bool,
    opts: &WriteOptions,
) -> VaultResult<()> {
    let full_path = resolve_note_path(vault_root, note_path)?;
    let existed = full_path.exists();
    if existed && !overwrite {
        return Err(VaultError::AlreadyExists(note_path.to_string()));
    }
    if existed && opts.backup {
        create_backup(&full_path, &opts.backup_dir_for(vault_root))?;
    }

    // Serialize before touching the file so a bad mapping never produces a
    // partial note.
    let rendered = frontmatter::render(metadata, content)?;

    if let Some(parent) = full_path.parent() {
        fs::create_dir_all(parent)?;
    }
    if let Err(error) = fs::write(&full_path, rendered.as_bytes()) {
        let detail = format!("write failed for {}: {error}", full_path.display());
        if !existed && full_path.exists() {
            if let Err(cleanup) = fs::remove_file(&full_path) {
                return Err(VaultError::Io(format!(
                    "{detail}; removing partial file also failed: {cleanup}"
                )));
            }
        }
        return Err(VaultError::Io(detail));
    }

    tracing::info!(path = %full_path.display(), "note created");
    Ok(())
}

pub fn edit_note(
    vault_root: &Path,
    note_path: &str,
    content: &str,
    opts: &WriteOptions,
) -> VaultResult<()> {
    let full_path = resolve_note_path(vault_root, note_path)?;
    ensure_regular_file(&full_path, note_path)?;
    if opts.backup {
        create_backup(&full_path, &opts.backup_dir_for(vault_root))?;
    }

    fs::write(&full_path, content.as_bytes())?;
    tracing::info!(path = %full_path.display(), "note overwritten");
    Ok(())
}

pub fn append_to_note(
    vault_root: &Path,
    note_path: &str,
    content: &str,
    opts: &WriteOptions,
) -> VaultResult<()> {
    let full_path = resolve_note_path(vault_root, note_path)?;
    ensure_regular_file(&full_path, note_path)?;
    if opts.backup {
        create_backup(&full_path, &opts.backup_dir_for(vault_root))?;
    }

    let mut file = OpenOptions::new().append(true).open(&full_path)?;
    file.write_all(b"\n")?;
    file.write_all(content.as_bytes())?;
    tracing::info!(path = %full_path.display(), "content appended");
    Ok(())
}

pub fn delete_note(vault_root: &Path, note_path: &str, opts: &WriteOptions) -> VaultResult<()> {
    let full_path = resolve_note_path(vault_root, note_path)?;
    if !full_path.exists() {
        tracing::debug!(path = %full_path.display(), "delete skipped, note already absent");
        return Ok(());
    }
    if !full_path.is_file() {
        return Err(VaultError::NotAFile(note_path.to_string()));
    }
    if opts.backup {
        create_backup(&full_path, &opts.backup_dir_for(vault_root))?;
    }

    fs::remove_file(&full_path)?;
    tracing::info!(path = %full_path.display(), "note deleted");
    Ok(())
}

pub fn update_metadata(
    vault_root: &Path,
    note_path: &str,
    updates: &Mapping,
    opts: &WriteOptions,
) -> VaultResult<()> {
    let full_path = resolve_note_path(vault_root, note_path)?;
    ensure_regular_file(&full_path, note_path)?;
    if opts.backup {
        create_backup(&full_path, &opts.backup_dir_for(vault_root))?;
    }

    let content = fs::read_to_string(&full_path)?;
    let SplitDocument {
        frontmatter, body, ..
    } = frontmatter::split(&content);

    let (mut mapping, body) = match frontmatter {
        Frontmatter::Parsed(mapping) => (mapping, body),
        Frontmatter::Absent => (Mapping::new(), body),
        Frontmatter::NotMapping { body_start } => {
            tracing::warn!(
                path = %full_path.display(),
                "existing frontmatter is not a mapping, replacing it"
            );
            (Mapping::new(), &content[body_start..])
        }
        Frontmatter::Malformed { detail } => {
            return Err(VaultError::MetadataParse(format!("{note_path}: {detail}")));
        }
    };

    frontmatter::merge_updates(&mut mapping, updates);
    let rendered = frontmatter::render(Some(&mapping), body)?;
    fs::write(&full_path, rendered.as_bytes())?;
    tracing::info!(path = %full_path.display(), "metadata updated");
    Ok(())
}

fn ensure_regular_file(full_path: &Path, note_path: &str) -> VaultResult<()> {
    if !full_path.exists() {
        return Err(VaultError::NotFound(note_path.to_string()));
    }
    if !full_path.is_file() {
        return Err(VaultError::NotAFile(note_path.to_string()));
    }
    Ok(())
}
