//! Common error types for Entrain

use thiserror::Error;

/// Common result type for Entrain operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Entrain services
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested object or setting not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation conflicts with current state (e.g. a training job is
    /// already active)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// External recognizer service error
    #[error("Recognizer service error: {0}")]
    Recognizer(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
