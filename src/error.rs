/// Error types for bashtrack
///
/// Every fallible operation in the library returns [`RecallError`].
/// Uses thiserror for ergonomic error handling.

use thiserror::Error;

/// Main error type for bashtrack operations
#[derive(Error, Debug)]
pub enum RecallError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O errors (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A schema step failed and was rolled back
    #[error("Migration {version} ({name}) failed: {source}")]
    Migration {
        version: i64,
        name: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored timestamp that none of the known layouts can parse
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Result type alias for bashtrack operations
pub type Result<T> = std::result::Result<T, RecallError>;

/// Convert RecallError to a user-friendly error message
impl RecallError {
    pub fn user_message(&self) -> String {
        match self {
            RecallError::Database(e) => {
                format!("Database error occurred. Please try again. Details: {}", e)
            }
            RecallError::Io(e) => {
                format!("File system error. Check permissions. Details: {}", e)
            }
            RecallError::Migration { version, name, .. } => {
                format!(
                    "Could not upgrade the history database (step {} '{}'). Nothing was changed.",
                    version, name
                )
            }
            RecallError::Config(msg) => {
                format!("Configuration issue: {}", msg)
            }
            RecallError::Serialization(e) => {
                format!("Data format error: {}", e)
            }
            RecallError::InvalidTimestamp(raw) => {
                format!("Stored timestamp '{}' could not be read", raw)
            }
            RecallError::Generic(msg) => msg.clone(),
        }
    }
}
