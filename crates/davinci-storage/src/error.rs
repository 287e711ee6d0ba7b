//! Storage errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The blocking database task did not complete.
    #[error("storage task failed: {0}")]
    Join(String),

    /// The sqlite backend was selected without a database path.
    #[error("sqlite storage requires a path")]
    MissingPath,

    /// A stored row could not be turned back into a bookmark.
    #[error("corrupt bookmark row: {0}")]
    Corrupt(String),
}

pub type StorageResult<T> = Result<T, StorageError>;
