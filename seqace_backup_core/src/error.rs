//! Error types for the backup core.
//!
//! Expected absences (a password not saved in the keychain, an empty backup
//! listing) are values, not errors; only genuinely exceptional conditions
//! reach this type.

use thiserror::Error;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, BackupError>;

/// Errors that can occur during backup, restore, and clear operations
#[derive(Debug, Error)]
pub enum BackupError {
    /// A required external tool is missing or not signed in. Fatal, reported
    /// before any operation begins.
    #[error("{0}")]
    Setup(String),

    /// A named resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// An external command exited non-zero or could not be spawned
    #[error("{tool} command failed: {message}")]
    Transport { tool: &'static str, message: String },

    /// A response was not in the expected structured form
    #[error("Failed to parse {context}: {message}")]
    Parse {
        context: &'static str,
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The favorites property list could not be read or written
    #[error("Favorites plist error: {0}")]
    Codec(#[from] plist::Error),

    /// Snapshot serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BackupError {
    /// Create a transport error for a named command-line tool
    pub fn transport(tool: &'static str, message: impl Into<String>) -> Self {
        Self::Transport {
            tool,
            message: message.into(),
        }
    }

    /// Create a parse error with the context that failed to decode
    pub fn parse(context: &'static str, message: impl ToString) -> Self {
        Self::Parse {
            context,
            message: message.to_string(),
        }
    }
}
