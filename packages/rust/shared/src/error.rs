//! Error types for Web Baby.
//!
//! Library crates use [`WebBabyError`] via `thiserror`.
//! The CLI wraps this with `color-eyre`; the server maps it to HTTP status codes.
//!
//! Provider failures are deliberately absent: a failed fetch is data
//! (`FetchOutcome`), never an error.

use std::path::PathBuf;

/// Top-level error type for all Web Baby operations.
#[derive(Debug, thiserror::Error)]
pub enum WebBabyError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// HTTP client construction error.
    #[error("network error: {0}")]
    Network(String),

    /// The storage engine is unreachable or rejected a statement.
    #[error("storage error: {0}")]
    Storage(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Caller-supplied data failed validation.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// The command was blank after trimming.
    #[error("Command cannot be empty.")]
    EmptyCommand,

    /// Nothing was left of the command after prefix stripping.
    #[error("Could not detect topic/dish.")]
    NoSubjectDetected,

    /// No stored knowledge for the requested topic.
    #[error("No stored knowledge for '{0}'")]
    TopicNotFound(String),

    /// No taught concept for the requested word.
    #[error("No concept taught for '{0}'")]
    ConceptNotFound(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, WebBabyError>;

impl WebBabyError {
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

    /// Wrap any storage-engine error.
    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::Storage(err.to_string())
    }

    /// Whether the caller can fix this by changing the input.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyCommand | Self::NoSubjectDetected | Self::Validation { .. }
        )
    }

    /// Whether this is a missing-record condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::TopicNotFound(_) | Self::ConceptNotFound(_))
    }
}
