//! Error types for the sync engine.

use crate::source::SourceError;
use contactsync_store::StoreError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during a sync pass.
#[derive(Error, Debug)]
pub enum SyncError {
    /// No remote account matches the host account.
    #[error("no remote account matches {0}")]
    AccountNotFound(String),

    /// The local store refused access.
    #[error("local store denied access: {0}")]
    SecurityDenied(#[source] StoreError),

    /// One batch could not be applied.
    #[error("{purpose} failed: {source}")]
    BatchApply {
        /// What the batch was for.
        purpose: String,
        /// Store error.
        #[source]
        source: StoreError,
    },

    /// The pass was cancelled.
    #[error("sync cancelled")]
    Cancelled,

    /// The remote set names the same external id more than once.
    #[error("duplicate external id in remote contacts: {0}")]
    DuplicateExternalId(String),

    /// The remote source failed.
    #[error("remote source error: {0}")]
    Source(#[from] SourceError),

    /// The local store failed.
    #[error("local store error: {0}")]
    Store(StoreError),

    /// A pass for the same account is already running.
    #[error("a sync pass for {0} is already running")]
    PassInProgress(String),
}

impl SyncError {
    /// Returns true if this error must be reported to the host instead of
    /// only being logged.
    pub fn is_host_visible(&self) -> bool {
        matches!(
            self,
            SyncError::SecurityDenied(_) | SyncError::PassInProgress(_)
        )
    }
}

impl From<StoreError> for SyncError {
    fn from(err: StoreError) -> Self {
        if err.is_access_denied() {
            SyncError::SecurityDenied(err)
        } else {
            SyncError::Store(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_access_denied_becomes_security_denied() {
        let err: SyncError = StoreError::access_denied("revoked").into();
        assert!(matches!(err, SyncError::SecurityDenied(_)));
        assert!(err.is_host_visible());

        let err: SyncError = StoreError::rejected("constraint").into();
        assert!(matches!(err, SyncError::Store(_)));
        assert!(!err.is_host_visible());
    }

    #[test]
    fn error_display() {
        let err = SyncError::BatchApply {
            purpose: "insert of u1".into(),
            source: StoreError::rejected("full"),
        };
        assert_eq!(err.to_string(), "insert of u1 failed: batch rejected: full");

        let err = SyncError::DuplicateExternalId("u1".into());
        assert!(err.to_string().contains("u1"));
        assert!(!SyncError::Cancelled.is_host_visible());
    }
}
