//! The file through which the chosen directory is handed to the parent
//! shell.
//!
//! A shell wrapper runs `tnav`, then reads this file, `cd`s into the path it
//! contains and deletes it. The file holds the absolute path as UTF-8 with
//! no trailing newline; its absence means "stay where you are".

use std::path::{Path, PathBuf};

use crate::error::{CoreError, CoreResult};

pub const HANDOFF_FILE_NAME: &str = ".tnav_target";

/// Location of the handoff file under `home`.
pub fn handoff_path(home: &Path) -> PathBuf {
    home.join(HANDOFF_FILE_NAME)
}

/// Writes `target` as the sole content of `file`, replacing any old value.
pub fn write_handoff(file: &Path, target: &Path) -> CoreResult<()> {
    std::fs::write(file, target.to_string_lossy().as_bytes())
        .map_err(|e| CoreError::from_io(e, file))?;
    tracing::info!(target = %target.display(), "wrote handoff file");
    Ok(())
}

/// Removes a stale handoff file. A missing file is not an error.
pub fn clear_handoff(file: &Path) -> CoreResult<()> {
    match std::fs::remove_file(file) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CoreError::from_io(e, file)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_stores_path_without_newline() {
        let tmp = TempDir::new().unwrap();
        let file = handoff_path(tmp.path());
        write_handoff(&file, Path::new("/home/alice/projects")).unwrap();

        assert_eq!(
            std::fs::read_to_string(&file).unwrap(),
            "/home/alice/projects"
        );
    }

    #[test]
    fn write_overwrites_previous_target() {
        let tmp = TempDir::new().unwrap();
        let file = handoff_path(tmp.path());
        write_handoff(&file, Path::new("/a/long/old/path")).unwrap();
        write_handoff(&file, Path::new("/b")).unwrap();
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "/b");
    }

    #[test]
    fn clear_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let file = handoff_path(tmp.path());
        clear_handoff(&file).unwrap();

        std::fs::write(&file, "/x").unwrap();
        clear_handoff(&file).unwrap();
        assert!(!file.exists());
    }
}
