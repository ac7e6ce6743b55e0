//! Error types for the channel directory

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Channel directory unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for DirectoryError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Channel directory query failed: {:?}", err);
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                DirectoryError::Unavailable(err.to_string())
            }
            _ => DirectoryError::Database(err.to_string()),
        }
    }
}

/// Result type alias for directory lookups
pub type DirectoryResult<T> = Result<T, DirectoryError>;
