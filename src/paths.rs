use crate::errors::{VaultError, VaultResult};
use std::path::{Component, Path, PathBuf};

pub fn resolve_note_path(vault_root: &Path, relative: &str) -> VaultResult<PathBuf> {
    let normalized = relative.replace('\\', "/");
    if normalized.starts_with('/') || has_drive_prefix(&normalized) {
        return Err(VaultError::InvalidPath(format!(
            "absolute paths are not allowed: {relative}"
        )));
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in normalized.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(VaultError::InvalidPath(format!(
                        "path escapes the vault root: {relative}"
                    )));
                }
            }
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        return Err(VaultError::InvalidPath(format!(
            "path resolves to the vault root itself: {relative}"
        )));
    }

    let root = normalize_lexically(vault_root);
    let mut full_path = root.clone();
    for segment in &segments {
        full_path.push(segment);
    }

    // Redundant post-join check; guards against normalization bugs above.
    if !full_path.starts_with(&root) || full_path == root {
        return Err(VaultError::InvalidPath(format!(
            "resolved path left the vault root: {relative}"
        )));
    }

    Ok(full_path)
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic()
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
