//! File-based contact store for persistent mirrors.

use crate::error::{StoreError, StoreResult};
use crate::store::{BatchReceipt, LocalStore, StoredContact};
use crate::table::ContactTable;
use contactsync_model::{AccountKey, LocalRecord, Operation};
use fs2::FileExt;
use parking_lot::RwLock;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A contact store persisted as a CBOR snapshot file.
///
/// # Layout
///
/// ```text
/// <path>           # CBOR-encoded contact table
/// <path>.lock      # Advisory lock for single-writer
/// <path>.tmp       # Staging file for atomic snapshot writes
/// ```
///
/// # Durability
///
/// Every successful batch rewrites the snapshot to the staging file,
/// syncs it and renames it over `<path>`. The in-memory table is swapped
/// only after the rename, so a failed write leaves both the file and the
/// in-memory state at the previous batch.
///
/// # Cost
///
/// Each batch that changes something clones the table and rewrites the
/// whole snapshot, photos included. A pass issues one batch per new
/// contact and two per updated one, so a pass over a mirror of N contacts
/// writes the file up to 2N times. Batches that change nothing, such as
/// deleting a contact that is already gone, skip the rewrite. Mirrors with
/// many large photos are better served by a store with row-level writes.
///
/// # Example
///
/// ```no_run
/// use contactsync_store::FileStore;
/// use std::path::Path;
///
/// let store = FileStore::open(Path::new("contacts.cbor")).unwrap();
/// ```
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    table: RwLock<ContactTable>,
    /// Lock file handle (held for exclusive access).
    _lock_file: File,
}

impl FileStore {
    /// Opens or creates a store at `path`, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Locked`] if another process holds the store, or
    /// [`StoreError::Corrupted`] if the snapshot cannot be decoded.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(sibling(path, "lock"))?;

        if lock_file.try_lock_exclusive().is_err() {
            return Err(StoreError::Locked);
        }

        let table = if path.exists() {
            let file = File::open(path)?;
            ciborium::from_reader(BufReader::new(file))
                .map_err(|e| StoreError::Corrupted(e.to_string()))?
        } else {
            ContactTable::new()
        };

        info!(path = %path.display(), contacts = table.len(), "opened contact store");

        Ok(Self {
            path: path.to_path_buf(),
            table: RwLock::new(table),
            _lock_file: lock_file,
        })
    }

    /// Returns the path of the snapshot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns a copy of the current table.
    #[must_use]
    pub fn snapshot(&self) -> ContactTable {
        self.table.read().clone()
    }

    fn persist(&self, table: &ContactTable) -> StoreResult<()> {
        let temp_path = sibling(&self.path, "tmp");

        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        ciborium::into_writer(table, &mut writer)
            .map_err(|e| StoreError::Corrupted(e.to_string()))?;
        writer.flush()?;
        writer
            .into_inner()
            .map_err(|e| StoreError::Io(e.into_error()))?
            .sync_all()?;

        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

impl LocalStore for FileStore {
    fn query_managed_records(&self, account: &AccountKey) -> StoreResult<Vec<LocalRecord>> {
        Ok(self.table.read().managed_records(account))
    }

    fn apply_batch(&self, operations: &[Operation]) -> StoreResult<BatchReceipt> {
        let mut table = self.table.write();
        let mut staged = table.clone();
        let receipt = staged.apply(operations)?;
        if !receipt.changed() {
            debug!(operations = operations.len(), "batch changed nothing");
            return Ok(receipt);
        }

        self.persist(&staged)?;
        *table = staged;

        debug!(
            operations = operations.len(),
            inserted = receipt.inserted.len(),
            deleted = receipt.deleted,
            "persisted batch"
        );
        Ok(receipt)
    }

    fn list_contacts(&self, account: &AccountKey) -> StoreResult<Vec<StoredContact>> {
        Ok(self.table.read().contacts_of(account))
    }
}

/// Returns `<path>.<suffix>`.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}
