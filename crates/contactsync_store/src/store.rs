//! Local store trait definition.

use crate::error::StoreResult;
use contactsync_model::{AccountKey, FieldEntry, LocalId, LocalRecord, Operation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A stored contact container with its field rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredContact {
    /// Store-assigned id.
    pub local_id: LocalId,
    /// Owning account.
    pub account: AccountKey,
    /// External id, `None` for contacts the sync does not manage.
    pub external_id: Option<String>,
    /// Field rows in insertion order.
    pub fields: Vec<FieldEntry>,
}

impl StoredContact {
    /// Returns the index entry of this contact.
    pub fn record(&self) -> LocalRecord {
        LocalRecord {
            local_id: self.local_id,
            external_id: self.external_id.clone(),
        }
    }
}

/// Outcome of a successfully applied batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReceipt {
    /// Ids assigned to inserted containers, in operation order.
    pub inserted: Vec<LocalId>,
    /// Number of containers deleted.
    pub deleted: usize,
    /// Number of field rows written.
    pub fields_written: usize,
}

impl BatchReceipt {
    /// Returns true if the batch inserted, deleted or wrote anything.
    pub fn changed(&self) -> bool {
        !self.inserted.is_empty() || self.deleted > 0 || self.fields_written > 0
    }
}

/// A local contact store.
///
/// # Invariants
///
/// - `apply_batch` is all-or-nothing: either every operation is applied or
///   the store is left unchanged
/// - A [`contactsync_model::ContainerRef::BackReference`] resolves to the id
///   assigned to the container insert at that position of the same batch
/// - Deleting a container deletes its field rows
/// - Stores must be `Send + Sync` so a runner can be shared across threads
///
/// # Implementors
///
/// - [`crate::MemoryStore`] - For testing and ephemeral mirrors
/// - [`crate::FileStore`] - Persistent CBOR snapshot
pub trait LocalStore: Send + Sync {
    /// Returns the index of every contact of `account` that has an external id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StoreError::AccessDenied`] if the caller may not
    /// read the store.
    fn query_managed_records(&self, account: &AccountKey) -> StoreResult<Vec<LocalRecord>>;

    /// Applies a batch of operations atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if any operation fails; no operation of the batch
    /// is then applied.
    fn apply_batch(&self, operations: &[Operation]) -> StoreResult<BatchReceipt>;

    /// Returns every contact of `account`, managed or not, ordered by local id.
    fn list_contacts(&self, account: &AccountKey) -> StoreResult<Vec<StoredContact>>;
}

impl<T: LocalStore + ?Sized> LocalStore for &T {
    fn query_managed_records(&self, account: &AccountKey) -> StoreResult<Vec<LocalRecord>> {
        (**self).query_managed_records(account)
    }

    fn apply_batch(&self, operations: &[Operation]) -> StoreResult<BatchReceipt> {
        (**self).apply_batch(operations)
    }

    fn list_contacts(&self, account: &AccountKey) -> StoreResult<Vec<StoredContact>> {
        (**self).list_contacts(account)
    }
}

impl<T: LocalStore + ?Sized> LocalStore for Arc<T> {
    fn query_managed_records(&self, account: &AccountKey) -> StoreResult<Vec<LocalRecord>> {
        (**self).query_managed_records(account)
    }

    fn apply_batch(&self, operations: &[Operation]) -> StoreResult<BatchReceipt> {
        (**self).apply_batch(operations)
    }

    fn list_contacts(&self, account: &AccountKey) -> StoreResult<Vec<StoredContact>> {
        (**self).list_contacts(account)
    }
}
