//! Batch operations and local record identities.

use crate::account::AccountKey;
use crate::field::FieldEntry;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned id of a local contact container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocalId(pub i64);

impl LocalId {
    /// Returns the raw id.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index entry of a local contact.
///
/// Records without an external id were not created by a sync pass and are
/// never modified by one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocalRecord {
    /// Store-assigned id.
    pub local_id: LocalId,
    /// External id of the mirrored remote contact.
    pub external_id: Option<String>,
}

impl LocalRecord {
    /// Creates a record mirroring the remote contact `external_id`.
    pub fn managed(local_id: i64, external_id: impl Into<String>) -> Self {
        Self {
            local_id: LocalId(local_id),
            external_id: Some(external_id.into()),
        }
    }

    /// Creates a record the sync does not manage.
    pub fn unmanaged(local_id: i64) -> Self {
        Self {
            local_id: LocalId(local_id),
            external_id: None,
        }
    }
}

/// Parent reference of a field insert.
///
/// A container inserted by the same batch has no id until the store runs
/// the batch, so fields point at the position of its insert instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerRef {
    /// Index of an `InsertContainer` earlier in the same batch.
    BackReference(usize),
    /// An already stored container.
    Existing(LocalId),
}

/// One operation of an atomically applied batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Delete a container, and its fields, by local id.
    DeleteByLocalId(LocalId),
    /// Delete every container of `account` mirroring `external_id`.
    DeleteByExternalId {
        /// Owning account.
        account: AccountKey,
        /// External id to match.
        external_id: String,
    },
    /// Insert an empty container mirroring `external_id`.
    InsertContainer {
        /// Owning account.
        account: AccountKey,
        /// External id of the mirrored remote contact.
        external_id: String,
    },
    /// Insert one field row under `parent`.
    InsertField {
        /// Container the row belongs to.
        parent: ContainerRef,
        /// Row contents.
        field: FieldEntry,
    },
}

impl Operation {
    /// Creates a delete-by-local-id operation.
    pub fn delete_local(local_id: LocalId) -> Self {
        Operation::DeleteByLocalId(local_id)
    }

    /// Creates a delete-by-external-id operation.
    pub fn delete_external(account: &AccountKey, external_id: impl Into<String>) -> Self {
        Operation::DeleteByExternalId {
            account: account.clone(),
            external_id: external_id.into(),
        }
    }

    /// Creates a container insert.
    pub fn insert_container(account: &AccountKey, external_id: impl Into<String>) -> Self {
        Operation::InsertContainer {
            account: account.clone(),
            external_id: external_id.into(),
        }
    }

    /// Creates a field insert under the container inserted at `index` of the batch.
    pub fn insert_field(index: usize, field: FieldEntry) -> Self {
        Operation::InsertField {
            parent: ContainerRef::BackReference(index),
            field,
        }
    }

    /// Returns the external id this operation names, if any.
    pub fn external_id(&self) -> Option<&str> {
        match self {
            Operation::DeleteByExternalId { external_id, .. }
            | Operation::InsertContainer { external_id, .. } => Some(external_id),
            Operation::DeleteByLocalId(_) | Operation::InsertField { .. } => None,
        }
    }

    /// Returns true for delete operations.
    pub fn is_delete(&self) -> bool {
        matches!(
            self,
            Operation::DeleteByLocalId(_) | Operation::DeleteByExternalId { .. }
        )
    }
}
