//! Batch building: turns a reconciliation into ordered store batches.
//!
//! An updated contact is replaced, not patched: its container is deleted
//! by external id in one batch and reinserted with freshly mapped fields
//! in the next. The two never share a batch, because the reinserted
//! container only gets an id once its own batch runs.

use crate::correlate::ReconciliationResult;
use crate::mapper::map_contact;
use contactsync_model::{AccountKey, Operation, RemoteContact};
use std::fmt;

/// What a planned batch is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchPurpose {
    /// Removes local containers whose remote contact is gone.
    StaleDeletion {
        /// Number of containers deleted.
        count: usize,
    },
    /// Removes the previous representation of an updated contact.
    ReplaceDelete {
        /// External id being replaced.
        external_id: String,
    },
    /// Inserts a contact with all of its fields.
    Insert {
        /// External id being inserted.
        external_id: String,
        /// True if this insert follows a [`BatchPurpose::ReplaceDelete`].
        replacing: bool,
    },
}

impl fmt::Display for BatchPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchPurpose::StaleDeletion { count } => write!(f, "deletion of {count} stale contacts"),
            BatchPurpose::ReplaceDelete { external_id } => {
                write!(f, "replace-delete of {external_id}")
            }
            BatchPurpose::Insert {
                external_id,
                replacing: true,
            } => write!(f, "re-insert of {external_id}"),
            BatchPurpose::Insert { external_id, .. } => write!(f, "insert of {external_id}"),
        }
    }
}

/// One batch to be applied atomically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedBatch {
    /// What the batch does.
    pub purpose: BatchPurpose,
    /// Operations, in order.
    pub operations: Vec<Operation>,
}

/// The ordered batches of one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchPlan {
    /// Batches in apply order.
    pub batches: Vec<PlannedBatch>,
}

impl BatchPlan {
    /// Returns the number of batches.
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    /// Returns true if the plan holds no batches.
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Returns the total number of operations across all batches.
    pub fn operation_count(&self) -> usize {
        self.batches.iter().map(|batch| batch.operations.len()).sum()
    }

    /// Returns the number of contacts inserted for the first time.
    pub fn planned_inserts(&self) -> usize {
        self.count(|purpose| {
            matches!(
                purpose,
                BatchPurpose::Insert {
                    replacing: false,
                    ..
                }
            )
        })
    }

    /// Returns the number of contacts replaced.
    pub fn planned_updates(&self) -> usize {
        self.count(|purpose| matches!(purpose, BatchPurpose::Insert { replacing: true, .. }))
    }

    /// Returns the number of stale containers deleted.
    pub fn planned_deletes(&self) -> usize {
        self.batches
            .iter()
            .map(|batch| match batch.purpose {
                BatchPurpose::StaleDeletion { count } => count,
                _ => 0,
            })
            .sum()
    }

    fn count(&self, predicate: impl Fn(&BatchPurpose) -> bool) -> usize {
        self.batches
            .iter()
            .filter(|batch| predicate(&batch.purpose))
            .count()
    }
}

impl IntoIterator for BatchPlan {
    type Item = PlannedBatch;
    type IntoIter = std::vec::IntoIter<PlannedBatch>;

    fn into_iter(self) -> Self::IntoIter {
        self.batches.into_iter()
    }
}

/// Builds the batches for `result`, scoped to `account`.
///
/// Order: one stale-deletion batch, then a replace-delete and insert pair
/// per updated contact, then one insert per new contact.
pub fn build_plan(account: &AccountKey, result: ReconciliationResult) -> BatchPlan {
    let ReconciliationResult {
        stale_local_ids,
        new_remote,
        updated_remote,
    } = result;

    let mut batches = Vec::with_capacity(1 + updated_remote.len() * 2 + new_remote.len());

    if !stale_local_ids.is_empty() {
        batches.push(PlannedBatch {
            purpose: BatchPurpose::StaleDeletion {
                count: stale_local_ids.len(),
            },
            operations: stale_local_ids
                .into_iter()
                .map(Operation::delete_local)
                .collect(),
        });
    }

    for contact in &updated_remote {
        let Some(external_id) = contact.external_id() else {
            continue;
        };
        batches.push(PlannedBatch {
            purpose: BatchPurpose::ReplaceDelete {
                external_id: external_id.to_string(),
            },
            operations: vec![Operation::delete_external(account, external_id)],
        });
        batches.extend(insert(account, contact, true));
    }

    for contact in &new_remote {
        batches.extend(insert(account, contact, false));
    }

    BatchPlan { batches }
}

fn insert(account: &AccountKey, contact: &RemoteContact, replacing: bool) -> Option<PlannedBatch> {
    let mapped = map_contact(contact)?;
    Some(PlannedBatch {
        purpose: BatchPurpose::Insert {
            external_id: mapped.external_id.clone(),
            replacing,
        },
        operations: mapped.into_operations(account),
    })
}
