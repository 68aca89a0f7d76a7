//! Error types for linkweave.
//!
//! Scanning itself never fails; these errors cover the fallible edges around
//! it: loading rule files, validating them and resolving navigation targets.

use std::io;
use std::path::PathBuf;
use thiserror::Error as ThisError;

/// The core error type for all linkweave operations.
#[derive(ThisError, Debug)]
pub enum Error {
    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Rule or settings file not found where one was required
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Malformed rule file or settings
    #[error("Parse error: {reason}")]
    ParseError { reason: String },

    /// Invalid configuration
    #[error("Configuration error: {reason}")]
    ConfigError { reason: String },

    /// Rule set failed validation
    #[error("Validation error: {reason}")]
    ValidationError { reason: String },

    /// A match resolved to something that cannot be navigated to
    #[error("Invalid target: {reason}")]
    InvalidTarget { reason: String },
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a file not found error
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Error::FileNotFound { path: path.into() }
    }

    /// Create a parse error
    pub fn parse_error(reason: impl Into<String>) -> Self {
        Error::ParseError {
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(reason: impl Into<String>) -> Self {
        Error::ConfigError {
            reason: reason.into(),
        }
    }

    /// Create a validation error
    pub fn validation_error(reason: impl Into<String>) -> Self {
        Error::ValidationError {
            reason: reason.into(),
        }
    }

    /// Create an invalid target error
    pub fn invalid_target(reason: impl Into<String>) -> Self {
        Error::InvalidTarget {
            reason: reason.into(),
        }
    }
}
