//! Error types for the fetch-stage step.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while fetching, extracting or staging a package.
///
/// Every variant is terminal for the invocation; nothing is retried.
#[derive(Error, Debug)]
pub enum StageError {
    #[error("download failed: {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("cannot extract {}: {reason}", archive.display())]
    Extract { archive: PathBuf, reason: String },

    #[error("expected directory not found after extraction: {} (has the upstream layout changed?)", expected.display())]
    LayoutMismatch { expected: PathBuf },

    #[error("no files match pattern '{pattern}' in {}", dir.display())]
    NoFilesMatched { pattern: String, dir: PathBuf },

    #[error("invalid package descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("invalid file pattern '{pattern}': {reason}")]
    Pattern { pattern: String, reason: String },

    #[error("invalid layout template: {0}")]
    Template(String),

    #[error("no layout rule matches version {version}")]
    NoLayout { version: String },

    #[error("invalid recipe {}: {reason}", path.display())]
    Recipe { path: PathBuf, reason: String },

    #[error(
        "working directory {} is in use by another stage process. If this is incorrect, delete '{}'",
        path.display(),
        path.display()
    )]
    Locked { path: PathBuf },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl StageError {
    /// Wrap an I/O error with a short description of what was being attempted.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        StageError::Io {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, StageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_mentions_url() {
        let err = StageError::Fetch {
            url: "https://example.com/archive/1.0.zip".to_string(),
            reason: "status code 404".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("https://example.com/archive/1.0.zip"));
        assert!(msg.contains("404"));
    }

    #[test]
    fn test_layout_mismatch_mentions_path() {
        let err = StageError::LayoutMismatch {
            expected: PathBuf::from("transwarp-2.2.2/include"),
        };
        assert!(err.to_string().contains("transwarp-2.2.2/include"));
    }

    #[test]
    fn test_io_keeps_source() {
        let err = StageError::io(
            "cannot create include",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("cannot create include"));
    }
}
