//! Typed error handling for actorlint.
//!
//! Provides structured errors that library consumers can match on,
//! with full context about what went wrong and where.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for actorlint operations.
///
/// This provides typed errors that library consumers can match on,
/// unlike opaque `anyhow::Error` types.
#[derive(Error, Debug)]
pub enum ActorlintError {
    /// I/O error when reading/writing files
    #[error("I/O error at {path}: {message}")]
    Io {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Syntax error when parsing Rust source
    #[error("Parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Configuration file errors
    #[error("Config error at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// Workspace/crate structure errors
    #[error("Workspace error at {path}: {message}")]
    Workspace { path: PathBuf, message: String },
}

impl ActorlintError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create a parse error.
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a workspace error.
    pub fn workspace(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Workspace {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error (analysis can continue without
    /// the affected file).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::Config { .. })
    }

    /// Get the path associated with this error.
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Io { path, .. } => path,
            Self::Parse { path, .. } => path,
            Self::Config { path, .. } => path,
            Self::Workspace { path, .. } => path,
        }
    }
}

/// Convenience type alias for actorlint results.
pub type ActorlintResult<T> = Result<T, ActorlintError>;

/// Extension trait for converting std::io::Error with path context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    fn with_path(self, path: impl Into<PathBuf>) -> ActorlintResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> ActorlintResult<T> {
        self.map_err(|e| ActorlintError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error() {
        let err = ActorlintError::io(
            PathBuf::from("/test/file.rs"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        );
        assert!(matches!(err, ActorlintError::Io { .. }));
        assert_eq!(err.path(), &PathBuf::from("/test/file.rs"));
        assert!(err.to_string().contains("/test/file.rs"));
    }

    #[test]
    fn test_is_recoverable() {
        assert!(ActorlintError::parse("/test.rs", "unexpected token").is_recoverable());
        assert!(ActorlintError::config("/actorlint.toml", "bad key").is_recoverable());
        assert!(!ActorlintError::workspace("/ws", "no crates").is_recoverable());
    }

    #[test]
    fn test_io_result_ext() {
        let result: std::io::Result<()> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));
        let actorlint_result = result.with_path("/missing/file.rs");
        assert!(actorlint_result.is_err());
    }
}
