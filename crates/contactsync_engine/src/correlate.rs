//! Correlation of remote contacts with the local mirror.

use crate::error::{SyncError, SyncResult};
use contactsync_model::{LocalId, LocalRecord, RemoteContact};
use std::collections::{HashMap, HashSet};

/// Outcome of correlating one remote set with one local set.
///
/// Computed once per pass and consumed by the batch builder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationResult {
    /// Local ids whose external id no longer exists remotely, ascending.
    pub stale_local_ids: Vec<LocalId>,
    /// Remote contacts with no local counterpart, in remote order.
    pub new_remote: Vec<RemoteContact>,
    /// Remote contacts with a local counterpart, in remote order.
    pub updated_remote: Vec<RemoteContact>,
}

impl ReconciliationResult {
    /// Returns true if there is nothing to delete, insert or replace.
    pub fn is_empty(&self) -> bool {
        self.stale_local_ids.is_empty()
            && self.new_remote.is_empty()
            && self.updated_remote.is_empty()
    }
}

/// Splits remote contacts into those with a usable external id and counts
/// the rest.
pub fn partition_identified(contacts: Vec<RemoteContact>) -> (Vec<RemoteContact>, usize) {
    let total = contacts.len();
    let identified: Vec<RemoteContact> = contacts
        .into_iter()
        .filter(|contact| contact.external_id().is_some())
        .collect();
    let discarded = total - identified.len();
    (identified, discarded)
}

/// Rejects a remote set that names the same external id twice.
pub fn validate_remote(remote: &[RemoteContact]) -> SyncResult<()> {
    let mut seen = HashSet::with_capacity(remote.len());
    for id in remote.iter().filter_map(RemoteContact::external_id) {
        if !seen.insert(id) {
            return Err(SyncError::DuplicateExternalId(id.to_string()));
        }
    }
    Ok(())
}

/// Correlates `remote` with `local` by external id.
///
/// Local records without an external id never become stale. Remote
/// contacts without one are ignored. When several local records share an
/// external id they all count as the counterpart of that remote contact.
pub fn reconcile(remote: Vec<RemoteContact>, local: &[LocalRecord]) -> ReconciliationResult {
    let local_by_external: HashMap<&str, &LocalRecord> = local
        .iter()
        .filter_map(|record| record.external_id.as_deref().map(|id| (id, record)))
        .collect();

    let remote_ids: HashSet<&str> = remote.iter().filter_map(RemoteContact::external_id).collect();

    let mut stale_local_ids: Vec<LocalId> = local
        .iter()
        .filter(|record| {
            record
                .external_id
                .as_deref()
                .is_some_and(|id| !remote_ids.contains(id))
        })
        .map(|record| record.local_id)
        .collect();
    stale_local_ids.sort_unstable();
    stale_local_ids.dedup();

    let mut new_remote = Vec::new();
    let mut updated_remote = Vec::new();
    for contact in remote {
        match contact.external_id() {
            Some(id) if local_by_external.contains_key(id) => updated_remote.push(contact),
            Some(_) => new_remote.push(contact),
            None => {}
        }
    }

    ReconciliationResult {
        stale_local_ids,
        new_remote,
        updated_remote,
    }
}
