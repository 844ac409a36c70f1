//! Working directory lock
//!
//! `source` unpacks into the working directory, `package` copies out of it
//! and `clean` deletes from it. Each holds an advisory lock file for its
//! whole duration so two invocations never touch the same tree at once.

use crate::core::error::{Result, StageError};
use fs2::FileExt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Lock file name inside the working directory
pub const LOCK_FILE_NAME: &str = ".stage.lock";

/// How old a lock file can be before it's considered stale (2 hours)
const STALE_LOCK_AGE_SECS: u64 = 7200;

/// Check if a lock file is stale (older than STALE_LOCK_AGE_SECS)
fn is_stale_lock(lock_path: &Path) -> bool {
    if let Ok(metadata) = std::fs::metadata(lock_path)
        && let Ok(modified) = metadata.modified()
        && let Ok(age) = std::time::SystemTime::now().duration_since(modified)
    {
        return age.as_secs() > STALE_LOCK_AGE_SECS;
    }
    false
}

/// Acquire an exclusive lock on a working directory.
/// Returns a guard that releases the lock when dropped.
pub fn acquire_work_dir_lock(work_dir: &Path) -> Result<WorkDirLock> {
    let lock_path = work_dir.join(LOCK_FILE_NAME);

    if lock_path.exists() && is_stale_lock(&lock_path) {
        let _ = std::fs::remove_file(&lock_path);
    }

    let lock_file = File::create(&lock_path)
        .map_err(|e| StageError::io(format!("cannot create lock file {}", lock_path.display()), e))?;

    if lock_file.try_lock_exclusive().is_err() {
        return Err(StageError::Locked { path: lock_path });
    }

    Ok(WorkDirLock {
        _file: lock_file,
        path: lock_path,
    })
}

/// RAII guard for the working directory lock; deletes the lock file on drop
#[derive(Debug)]
pub struct WorkDirLock {
    _file: File,
    path: PathBuf,
}

impl WorkDirLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for WorkDirLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
