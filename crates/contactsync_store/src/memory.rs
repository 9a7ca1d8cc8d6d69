//! In-memory contact store.

use crate::error::{StoreError, StoreResult};
use crate::store::{BatchReceipt, LocalStore, StoredContact};
use crate::table::ContactTable;
use contactsync_model::{AccountKey, FieldEntry, LocalId, LocalRecord, Operation};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::debug;

/// An in-memory contact store.
///
/// This store keeps all contacts in memory and is suitable for:
/// - Unit and integration tests
/// - Ephemeral mirrors that don't need persistence
///
/// Batches are staged on a copy of the table and swapped in only when every
/// operation succeeded.
///
/// # Fault injection
///
/// Tests can make the store deny access ([`MemoryStore::set_access_denied`])
/// or reject every batch naming a given external id
/// ([`MemoryStore::reject_external_id`]).
///
/// # Example
///
/// ```rust
/// use contactsync_model::{AccountKey, Operation};
/// use contactsync_store::{LocalStore, MemoryStore};
///
/// let store = MemoryStore::new();
/// let account = AccountKey::new("alice@example.com", "contactsync");
/// store
///     .apply_batch(&[Operation::insert_container(&account, "u1")])
///     .unwrap();
/// assert_eq!(store.query_managed_records(&account).unwrap().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    table: RwLock<ContactTable>,
    access_denied: AtomicBool,
    rejected_ids: RwLock<HashSet<String>>,
    batches_applied: AtomicU64,
}

impl MemoryStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `table`.
    #[must_use]
    pub fn with_table(table: ContactTable) -> Self {
        Self {
            table: RwLock::new(table),
            ..Self::default()
        }
    }

    /// Returns a copy of the current table.
    #[must_use]
    pub fn snapshot(&self) -> ContactTable {
        self.table.read().clone()
    }

    /// Inserts a contact that the sync does not manage.
    pub fn insert_unmanaged(&self, account: &AccountKey, fields: Vec<FieldEntry>) -> LocalId {
        self.table.write().insert_unmanaged(account, fields)
    }

    /// Returns a stored container by id.
    pub fn get(&self, local_id: LocalId) -> Option<StoredContact> {
        self.table.read().get(local_id).cloned()
    }

    /// Makes every subsequent call fail with [`StoreError::AccessDenied`].
    pub fn set_access_denied(&self, denied: bool) {
        self.access_denied.store(denied, Ordering::SeqCst);
    }

    /// Makes every batch that names `external_id` fail.
    pub fn reject_external_id(&self, external_id: impl Into<String>) {
        self.rejected_ids.write().insert(external_id.into());
    }

    /// Returns the number of successfully applied batches.
    pub fn batches_applied(&self) -> u64 {
        self.batches_applied.load(Ordering::SeqCst)
    }

    fn check_access(&self) -> StoreResult<()> {
        if self.access_denied.load(Ordering::SeqCst) {
            Err(StoreError::access_denied("memory store access revoked"))
        } else {
            Ok(())
        }
    }

    fn check_rejected(&self, operations: &[Operation]) -> StoreResult<()> {
        let rejected = self.rejected_ids.read();
        match operations
            .iter()
            .filter_map(Operation::external_id)
            .find(|id| rejected.contains(*id))
        {
            Some(id) => Err(StoreError::rejected(format!("external id {id} is rejected"))),
            None => Ok(()),
        }
    }
}

impl LocalStore for MemoryStore {
    fn query_managed_records(&self, account: &AccountKey) -> StoreResult<Vec<LocalRecord>> {
        self.check_access()?;
        Ok(self.table.read().managed_records(account))
    }

    fn apply_batch(&self, operations: &[Operation]) -> StoreResult<BatchReceipt> {
        self.check_access()?;
        self.check_rejected(operations)?;

        let mut table = self.table.write();
        let mut staged = table.clone();
        let receipt = staged.apply(operations)?;
        *table = staged;

        self.batches_applied.fetch_add(1, Ordering::SeqCst);
        debug!(
            operations = operations.len(),
            inserted = receipt.inserted.len(),
            deleted = receipt.deleted,
            "applied batch"
        );
        Ok(receipt)
    }

    fn list_contacts(&self, account: &AccountKey) -> StoreResult<Vec<StoredContact>> {
        self.check_access()?;
        Ok(self.table.read().contacts_of(account))
    }
}
