//! Hard substrate errors.
//!
//! Anything redb reports that is not "table does not exist" surfaces here.
//! These abort the owning transaction; soft per-record errors live in
//! `cask_core::RecErr` and never take this path.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Underlying storage engine failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// File-level failure (open, copy).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<redb::DatabaseError> for Error {
    fn from(e: redb::DatabaseError) -> Self {
        Error::Storage(e.to_string())
    }
}

impl From<redb::TransactionError> for Error {
    fn from(e: redb::TransactionError) -> Self {
        Error::Storage(e.to_string())
    }
}

impl From<redb::TableError> for Error {
    fn from(e: redb::TableError) -> Self {
        Error::Storage(e.to_string())
    }
}

impl From<redb::StorageError> for Error {
    fn from(e: redb::StorageError) -> Self {
        Error::Storage(e.to_string())
    }
}

impl From<redb::CommitError> for Error {
    fn from(e: redb::CommitError) -> Self {
        Error::Storage(e.to_string())
    }
}
