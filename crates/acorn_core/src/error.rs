//! Error types for acorn core.

use acorn_codec::CodecError;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in acorn core operations.
///
/// Engine-level errors are propagated verbatim; the facade performs no
/// retry logic. A transaction either fully commits or fully rolls back,
/// so no error here leaves partially applied writes behind.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Value encoding or decoding failed.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// The engine failed to open or lock the database file.
    #[error("database error: {0}")]
    Database(#[from] redb::DatabaseError),

    /// The engine failed to begin a transaction.
    #[error("transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    /// The engine failed to open a table.
    #[error("table error: {0}")]
    Table(#[from] redb::TableError),

    /// Engine-level storage or I/O failure.
    #[error("storage error: {0}")]
    Storage(#[from] redb::StorageError),

    /// The engine failed to commit a transaction.
    #[error("commit error: {0}")]
    Commit(#[from] redb::CommitError),

    /// A mutating call was made through a read-only transaction.
    #[error("write attempted on a read-only transaction")]
    ReadOnlyTransaction,

    /// The key holds a nested bucket where a plain value was required.
    #[error("key {key:?} holds a nested bucket")]
    KeyHoldsBucket {
        /// The offending key.
        key: String,
    },

    /// The key holds a plain value where a bucket was required.
    #[error("key {key:?} holds a plain value, not a bucket")]
    KeyHoldsValue {
        /// The offending key.
        key: String,
    },

    /// A cursor operation required a valid current entry.
    #[error("cursor is not positioned on a valid entry")]
    CursorNotPositioned,

    /// A stored entry does not match the facade's byte layout.
    #[error("corrupt entry: {message}")]
    Corrupt {
        /// Description of the damage.
        message: String,
    },
}

impl CoreError {
    /// Creates a key-holds-bucket error.
    pub fn key_holds_bucket(key: impl Into<String>) -> Self {
        Self::KeyHoldsBucket { key: key.into() }
    }

    /// Creates a key-holds-value error.
    pub fn key_holds_value(key: impl Into<String>) -> Self {
        Self::KeyHoldsValue { key: key.into() }
    }

    /// Creates a corrupt entry error.
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt {
            message: message.into(),
        }
    }
}
