//! Shared database types for Energram
//!
//! Common error type returned by repositories and document stores.

use crate::error::Error;
use thiserror::Error;

/// Repository-level errors
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Record already exists")]
    AlreadyExists,

    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx::Error),

    /// Backing store could not be reached (non-sqlx backends)
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<RepositoryError> for Error {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Error::NotFound("Record not found".to_string()),
            RepositoryError::AlreadyExists => Error::Conflict("Record already exists".to_string()),
            RepositoryError::Connection(e) => Error::Database(e),
            RepositoryError::Unavailable(msg) => Error::Unavailable(msg),
            RepositoryError::InvalidData(msg) => Error::Validation(msg),
        }
    }
}
