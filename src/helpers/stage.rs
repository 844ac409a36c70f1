//! Staging: select files from the extracted tree and copy them out
//!
//! Selection happens before anything is written, so a failed selection
//! leaves the destination directory exactly as it was.

use crate::core::error::{Result, StageError};
use crate::core::output;
use glob::{MatchOptions, Pattern};
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Files placed into the destination include directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagingResult {
    pub dest_dir: PathBuf,
    /// Paths relative to `dest_dir`, sorted.
    pub files: Vec<PathBuf>,
}

impl StagingResult {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Absolute locations of the staged files.
    pub fn paths(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.files.iter().map(|f| self.dest_dir.join(f))
    }
}

fn compile_pattern(pattern: &str) -> Result<Pattern> {
    Pattern::new(pattern).map_err(|e| StageError::Pattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

/// Check a pattern without touching the filesystem.
pub fn validate_pattern(pattern: &str) -> Result<()> {
    compile_pattern(pattern).map(|_| ())
}

/// Select files under `src_dir` whose file name matches `pattern`.
///
/// Only direct children are considered unless `recursive` is set, in which
/// case the returned relative paths keep their subdirectories. Fails with
/// [`StageError::LayoutMismatch`] when `src_dir` is missing and
/// [`StageError::NoFilesMatched`] when nothing matches.
pub fn select(src_dir: &Path, pattern: &str, recursive: bool) -> Result<Vec<PathBuf>> {
    let compiled = compile_pattern(pattern)?;

    if !src_dir.is_dir() {
        return Err(StageError::LayoutMismatch {
            expected: src_dir.to_path_buf(),
        });
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut matches = Vec::new();

    for entry in WalkDir::new(src_dir).min_depth(1).max_depth(max_depth) {
        let entry = entry.map_err(|e| {
            let context = format!("cannot read {}", src_dir.display());
            match e.into_io_error() {
                Some(io) => StageError::io(context, io),
                None => StageError::io(context, std::io::Error::other("filesystem loop")),
            }
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if !compiled.matches_with(&name, MATCH_OPTIONS) {
            continue;
        }

        if let Ok(rel) = entry.path().strip_prefix(src_dir) {
            matches.push(rel.to_path_buf());
        }
    }

    if matches.is_empty() {
        return Err(StageError::NoFilesMatched {
            pattern: pattern.to_string(),
            dir: src_dir.to_path_buf(),
        });
    }

    matches.sort();
    Ok(matches)
}

/// Copy previously selected files from `src_dir` into `dest_dir`.
///
/// Existing files with the same name are overwritten.
pub fn copy_selected(src_dir: &Path, files: &[PathBuf], dest_dir: &Path) -> Result<StagingResult> {
    std::fs::create_dir_all(dest_dir)
        .map_err(|e| StageError::io(format!("cannot create directory {}", dest_dir.display()), e))?;

    for rel in files {
        let src = src_dir.join(rel);
        let dest = dest_dir.join(rel);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StageError::io(format!("cannot create directory {}", parent.display()), e)
            })?;
        }
        std::fs::copy(&src, &dest).map_err(|e| {
            StageError::io(
                format!("copy failed: {} -> {}", src.display(), dest.display()),
                e,
            )
        })?;
        output::detail(&format!("staged {}", rel.display()));
    }

    Ok(StagingResult {
        dest_dir: dest_dir.to_path_buf(),
        files: files.to_vec(),
    })
}

/// Select then copy.
pub fn stage(src_dir: &Path, pattern: &str, recursive: bool, dest_dir: &Path) -> Result<StagingResult> {
    let files = select(src_dir, pattern, recursive)?;
    copy_selected(src_dir, &files, dest_dir)
}
