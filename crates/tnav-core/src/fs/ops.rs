//! Directory listing and file operations.

use std::cmp::Ordering;
use std::path::{Component, Path, PathBuf};

use crate::error::{CoreError, CoreResult};
use crate::fs::entry::Entry;

/// Reads the immediate children of a directory, sorted directories first
/// and then by name (ordinal comparison).
///
/// Children whose metadata cannot be read are still listed; the failure is
/// captured on the [`Entry`] itself.
///
/// # Errors
///
/// - [`CoreError::NotFound`]: the path does not exist.
/// - [`CoreError::NotADirectory`]: the path is not a directory.
/// - [`CoreError::PermissionDenied`]: read access is denied.
/// - [`CoreError::Io`]: any other I/O error.
pub fn list_directory(path: &Path) -> CoreResult<Vec<Entry>> {
    if !path.exists() {
        return Err(CoreError::NotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(CoreError::NotADirectory(path.to_path_buf()));
    }

    let read_dir = std::fs::read_dir(path).map_err(|e| CoreError::from_io(e, path))?;

    let mut entries: Vec<Entry> = read_dir
        .filter_map(|dir_entry| match dir_entry {
            Ok(dir_entry) => Some(Entry::new(dir_entry.path())),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "skipping unreadable directory entry"
                );
                None
            }
        })
        .collect();
    entries.sort_by(compare_entries);

    tracing::debug!(path = %path.display(), count = entries.len(), "listed directory");
    Ok(entries)
}

fn compare_entries(a: &Entry, b: &Entry) -> Ordering {
    b.is_dir()
        .cmp(&a.is_dir())
        .then_with(|| a.name().cmp(b.name()))
}

/// Returns `true` if `path` exists and is (or links to) a directory.
pub fn is_directory(path: &Path) -> bool {
    path.is_dir()
}

/// Makes `path` absolute (relative to the process working directory) and
/// removes `.` and `..` components lexically, without resolving symlinks.
pub fn normalize(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Checks that `name` is a single, non-empty path component.
pub fn validate_name(name: &str) -> CoreResult<()> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || trimmed.contains('/')
        || trimmed.contains(std::path::MAIN_SEPARATOR)
    {
        return Err(CoreError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Creates an empty file named `name` inside `dir` and returns its path.
///
/// # Errors
///
/// - [`CoreError::InvalidName`] if `name` is not a single component.
/// - [`CoreError::AlreadyExists`] if something with that name exists.
pub fn create_file(dir: &Path, name: &str) -> CoreResult<PathBuf> {
    validate_name(name)?;
    let path = dir.join(name.trim());
    std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .map_err(|e| CoreError::from_io(e, &path))?;
    tracing::info!(path = %path.display(), "created file");
    Ok(path)
}

/// Creates a directory named `name` inside `dir` and returns its path.
pub fn create_directory(dir: &Path, name: &str) -> CoreResult<PathBuf> {
    validate_name(name)?;
    let path = dir.join(name.trim());
    std::fs::create_dir(&path).map_err(|e| CoreError::from_io(e, &path))?;
    tracing::info!(path = %path.display(), "created directory");
    Ok(path)
}

/// Deletes a file, symlink or directory (recursively).
///
/// Symlinks are removed themselves; their targets are never touched.
pub fn delete_entry(path: &Path) -> CoreResult<()> {
    let meta = std::fs::symlink_metadata(path).map_err(|e| CoreError::from_io(e, path))?;
    let result = if meta.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };
    result.map_err(|e| CoreError::from_io(e, path))?;
    tracing::info!(path = %path.display(), "deleted entry");
    Ok(())
}
