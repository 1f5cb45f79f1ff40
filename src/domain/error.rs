//! Domain-level error types for jemai-chat.
//!
//! All errors are typed with `thiserror`. Most of them never reach the user:
//! reads degrade to an empty log and view commands absorb failures at the
//! dispatch boundary.

use thiserror::Error;

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// The log file (or an export destination) could not be read or written.
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// A log line or view message did not decode.
    #[error("Parse error: {message}")]
    Parse {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Nothing matched the lookup (e.g. no assistant reply in the log).
    #[error("Not found: {what}")]
    NotFound { what: String },

    /// An index refers to an entry that is not part of the current render.
    #[error("Stale reference: index {idx} outside rendered log of {len} entries")]
    StaleReference { idx: i64, len: usize },

    /// The log file could not be watched for changes.
    #[error("Watch error: {message}")]
    Watch {
        message: String,
        #[source]
        source: Option<notify::Error>,
    },

    /// The system clipboard is unavailable or held no text.
    #[error("Clipboard error: {message}")]
    Clipboard { message: String },

    /// Configuration or environment error.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl AppError {
    /// Create an IO error with context.
    pub fn io(message: impl Into<String>, err: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(err),
        }
    }

    /// Create a watch error with context.
    pub fn watch(message: impl Into<String>, err: notify::Error) -> Self {
        Self::Watch {
            message: message.into(),
            source: Some(err),
        }
    }

    /// Create a parse error from a serde_json failure.
    pub fn parse(err: serde_json::Error) -> Self {
        Self::Parse {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

/// Result type alias using `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_keeps_source() {
        use std::error::Error as _;

        let err = AppError::io(
            "Failed to read log",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "IO error: Failed to read log");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_stale_reference_message() {
        let err = AppError::StaleReference { idx: 5, len: 3 };
        assert_eq!(
            err.to_string(),
            "Stale reference: index 5 outside rendered log of 3 entries"
        );

        let err = AppError::StaleReference { idx: -1, len: 0 };
        assert_eq!(
            err.to_string(),
            "Stale reference: index -1 outside rendered log of 0 entries"
        );
    }
}
