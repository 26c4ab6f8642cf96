//! Error types for the database layer.

use thiserror::Error;

/// Database operation result type.
pub type Result<T> = std::result::Result<T, DbError>;

/// Errors raised by the catalog and report databases.
#[derive(Error, Debug)]
pub enum DbError {
    /// SQLx error (connection, query, decoding)
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Failed to start the async runtime
    #[error("Runtime error: {0}")]
    Io(#[from] std::io::Error),

    /// The database role was never connected
    #[error("Not connected: {0}")]
    Unavailable(String),
}

impl DbError {
    /// Create an unavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}
