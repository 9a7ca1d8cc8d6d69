//! Error types for local store operations.

use contactsync_model::LocalId;
use std::io;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The store refused access to the caller.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// A field insert referenced a position that holds no container insert.
    #[error("invalid back-reference to operation {index} at operation {position}")]
    InvalidBackReference {
        /// Referenced position.
        index: usize,
        /// Position of the referencing operation.
        position: usize,
    },

    /// A field insert referenced a container that does not exist.
    #[error("unknown container: {0}")]
    UnknownContainer(LocalId),

    /// The store rejected the batch.
    #[error("batch rejected: {0}")]
    Rejected(String),

    /// The snapshot file is corrupted.
    #[error("store corrupted: {0}")]
    Corrupted(String),

    /// Another process holds the store lock.
    #[error("store locked: another process has exclusive access")]
    Locked,
}

impl StoreError {
    /// Creates an access denied error.
    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::AccessDenied(message.into())
    }

    /// Creates a rejection error.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    /// Returns true if the store refused access.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, StoreError::AccessDenied(_))
    }
}
