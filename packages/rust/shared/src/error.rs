//! Error types for MineScout.
//!
//! Library crates use [`MineScoutError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Search failures are deliberately *not* part of this type: a failed search is
//! a normal [`SearchOutcome`](crate::SearchOutcome) value, not an error.

use std::path::PathBuf;

/// Top-level error type for MineScout operations that can actually fail.
#[derive(Debug, thiserror::Error)]
pub enum MineScoutError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// HTTP client construction error.
    #[error("network error: {0}")]
    Network(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Invalid user input (unknown step, malformed note argument, ...).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Report serialization error.
    #[error("export error: {0}")]
    Export(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, MineScoutError>;

impl MineScoutError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = MineScoutError::config("missing endpoint");
        assert_eq!(err.to_string(), "config error: missing endpoint");

        let err = MineScoutError::validation("unknown step 'assay'");
        assert!(err.to_string().contains("unknown step"));
    }

    #[test]
    fn io_error_keeps_path() {
        let err = MineScoutError::io(
            "/tmp/report.csv",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("/tmp/report.csv"));
    }
}
