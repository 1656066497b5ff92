//! Domain-level error types for chat-maint.
//!
//! All errors are typed with `thiserror` and carry enough context to be
//! reported directly to the operator running a maintenance command.

use thiserror::Error;

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// Username contains characters outside `[A-Za-z0-9_]`.
    #[error("Invalid username '{username}': only letters, digits and underscore are allowed")]
    InvalidUsername { username: String },

    /// No user record matches the given username.
    #[error("User not found: {username}")]
    UserNotFound { username: String },

    /// Failed to open or query the document store.
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    /// JSON parsing or serialization failed.
    #[error("JSON error: {message}")]
    JsonParse {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Configuration or environment error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// IO operation failed.
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },
}

impl AppError {
    /// Create a database error from rusqlite error.
    pub fn database(err: rusqlite::Error) -> Self {
        Self::Database {
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create a JSON parse error.
    pub fn json_parse(err: serde_json::Error) -> Self {
        Self::JsonParse {
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create an IO error with context.
    pub fn io(message: impl Into<String>, err: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(err),
        }
    }

    /// Create an IO error for a failed write to `path`.
    pub fn write_failed(path: &std::path::Path, err: std::io::Error) -> Self {
        Self::io(format!("Failed to write {}", path.display()), err)
    }
}

/// Result type alias using `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
