//! Common filesystem utilities

use crate::core::error::{Result, StageError};
use std::path::{Path, PathBuf};

/// Ensure a file's parent directory exists.
///
/// Creates the parent directory (and all ancestors) if it doesn't exist.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)
            .map_err(|e| StageError::io(format!("cannot create directory {}", parent.display()), e))?;
    }
    Ok(())
}

/// Remove a file or directory tree if present.
///
/// Returns true if something was removed.
pub fn remove_if_exists(path: &Path) -> Result<bool> {
    let md = match std::fs::symlink_metadata(path) {
        Ok(md) => md,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(StageError::io(format!("cannot stat {}", path.display()), e)),
    };
    let result = if md.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };
    result.map_err(|e| StageError::io(format!("cannot remove {}", path.display()), e))?;
    Ok(true)
}

/// Scoped ownership of a downloaded archive.
///
/// The file is deleted when the guard is dropped, whether the step that
/// owns it succeeded or bailed out halfway through extraction.
#[derive(Debug)]
pub struct ArchiveGuard {
    path: PathBuf,
}

impl ArchiveGuard {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ArchiveGuard {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
