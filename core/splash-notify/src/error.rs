//! Error types for the notification layer.

use thiserror::Error;

/// Result type for notification operations.
pub type NotifyResult<T> = Result<T, NotifyError>;

/// Errors that can occur while notifying the sync engine.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The engine refused or failed the commit.
    #[error("sync engine error: {0}")]
    Engine(String),

    /// Notice store file error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
