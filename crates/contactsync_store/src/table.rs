//! In-memory contact table shared by the store implementations.

use crate::error::{StoreError, StoreResult};
use crate::store::{BatchReceipt, StoredContact};
use contactsync_model::{AccountKey, ContainerRef, FieldEntry, LocalId, LocalRecord, Operation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Contact containers keyed by local id.
///
/// `apply` mutates the table in place and may leave it half-applied on
/// error; stores run it on a staged clone and swap only on success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactTable {
    next_id: i64,
    contacts: BTreeMap<LocalId, StoredContact>,
}

impl Default for ContactTable {
    fn default() -> Self {
        Self {
            next_id: 1,
            contacts: BTreeMap::new(),
        }
    }
}

impl ContactTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored containers across all accounts.
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    /// Returns true if the table holds no container.
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// Returns a stored container by id.
    pub fn get(&self, local_id: LocalId) -> Option<&StoredContact> {
        self.contacts.get(&local_id)
    }

    /// Returns the managed records of `account`.
    pub fn managed_records(&self, account: &AccountKey) -> Vec<LocalRecord> {
        self.contacts
            .values()
            .filter(|c| &c.account == account && c.external_id.is_some())
            .map(StoredContact::record)
            .collect()
    }

    /// Returns every container of `account`.
    pub fn contacts_of(&self, account: &AccountKey) -> Vec<StoredContact> {
        self.contacts
            .values()
            .filter(|c| &c.account == account)
            .cloned()
            .collect()
    }

    /// Inserts a container without an external id.
    pub fn insert_unmanaged(&mut self, account: &AccountKey, fields: Vec<FieldEntry>) -> LocalId {
        let local_id = self.allocate();
        self.contacts.insert(
            local_id,
            StoredContact {
                local_id,
                account: account.clone(),
                external_id: None,
                fields,
            },
        );
        local_id
    }

    fn allocate(&mut self) -> LocalId {
        let id = LocalId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Applies `operations` in order.
    pub fn apply(&mut self, operations: &[Operation]) -> StoreResult<BatchReceipt> {
        let mut receipt = BatchReceipt::default();
        // Container id assigned at each position, for back-reference lookup.
        let mut assigned: Vec<Option<LocalId>> = Vec::with_capacity(operations.len());

        for (position, op) in operations.iter().enumerate() {
            let created = match op {
                Operation::DeleteByLocalId(local_id) => {
                    if self.contacts.remove(local_id).is_some() {
                        receipt.deleted += 1;
                    }
                    None
                }
                Operation::DeleteByExternalId {
                    account,
                    external_id,
                } => {
                    let before = self.contacts.len();
                    self.contacts.retain(|_, c| {
                        !(&c.account == account
                            && c.external_id.as_deref() == Some(external_id.as_str()))
                    });
                    receipt.deleted += before - self.contacts.len();
                    None
                }
                Operation::InsertContainer {
                    account,
                    external_id,
                } => {
                    let local_id = self.allocate();
                    self.contacts.insert(
                        local_id,
                        StoredContact {
                            local_id,
                            account: account.clone(),
                            external_id: Some(external_id.clone()),
                            fields: Vec::new(),
                        },
                    );
                    receipt.inserted.push(local_id);
                    Some(local_id)
                }
                Operation::InsertField { parent, field } => {
                    let target = resolve(*parent, position, &assigned)?;
                    let contact = self
                        .contacts
                        .get_mut(&target)
                        .ok_or(StoreError::UnknownContainer(target))?;
                    contact.fields.push(field.clone());
                    receipt.fields_written += 1;
                    None
                }
            };
            assigned.push(created);
        }

        Ok(receipt)
    }
}

fn resolve(
    parent: ContainerRef,
    position: usize,
    assigned: &[Option<LocalId>],
) -> StoreResult<LocalId> {
    match parent {
        ContainerRef::Existing(local_id) => Ok(local_id),
        ContainerRef::BackReference(index) => assigned
            .get(index)
            .copied()
            .flatten()
            .ok_or(StoreError::InvalidBackReference { index, position }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> AccountKey {
        AccountKey::new("alice@example.com", "contactsync")
    }

    fn note(text: &str) -> FieldEntry {
        FieldEntry::Note { text: text.into() }
    }

    #[test]
    fn insert_with_back_reference() {
        let mut table = ContactTable::new();
        let receipt = table
            .apply(&[
                Operation::insert_container(&account(), "u1"),
                Operation::insert_field(0, note("one")),
                Operation::insert_field(0, note("two")),
            ])
            .unwrap();

        assert_eq!(receipt.inserted, vec![LocalId(1)]);
        assert_eq!(receipt.fields_written, 2);

        let stored = table.get(LocalId(1)).unwrap();
        assert_eq!(stored.external_id.as_deref(), Some("u1"));
        assert_eq!(stored.fields, vec![note("one"), note("two")]);
    }

    #[test]
    fn back_reference_must_point_backwards_at_a_container() {
        let mut table = ContactTable::new();

        let forward = table.apply(&[
            Operation::insert_field(1, note("x")),
            Operation::insert_container(&account(), "u1"),
        ]);
        assert!(matches!(
            forward,
            Err(StoreError::InvalidBackReference {
                index: 1,
                position: 0
            })
        ));

        let mut table = ContactTable::new();
        let not_a_container = table.apply(&[
            Operation::delete_local(LocalId(4)),
            Operation::insert_field(0, note("x")),
        ]);
        assert!(matches!(
            not_a_container,
            Err(StoreError::InvalidBackReference { index: 0, .. })
        ));
    }

    #[test]
    fn existing_parent_must_exist() {
        let mut table = ContactTable::new();
        let result = table.apply(&[Operation::InsertField {
            parent: ContainerRef::Existing(LocalId(42)),
            field: note("x"),
        }]);
        assert!(matches!(result, Err(StoreError::UnknownContainer(LocalId(42)))));
    }

    #[test]
    fn delete_by_external_id_is_account_scoped() {
        let other = AccountKey::new("alice@example.com", "other-type");
        let mut table = ContactTable::new();
        table
            .apply(&[
                Operation::insert_container(&account(), "u1"),
                Operation::insert_field(0, note("mine")),
            ])
            .unwrap();
        table
            .apply(&[Operation::insert_container(&other, "u1")])
            .unwrap();

        let receipt = table
            .apply(&[Operation::delete_external(&account(), "u1")])
            .unwrap();

        assert_eq!(receipt.deleted, 1);
        assert!(table.managed_records(&account()).is_empty());
        assert_eq!(table.managed_records(&other).len(), 1);
    }

    #[test]
    fn delete_missing_local_id_is_not_an_error() {
        let mut table = ContactTable::new();
        let receipt = table.apply(&[Operation::delete_local(LocalId(9))]).unwrap();
        assert_eq!(receipt.deleted, 0);
    }

    #[test]
    fn managed_records_skip_unmanaged() {
        let mut table = ContactTable::new();
        let unmanaged = table.insert_unmanaged(&account(), vec![note("local only")]);
        table
            .apply(&[Operation::insert_container(&account(), "u1")])
            .unwrap();

        let records = table.managed_records(&account());
        assert_eq!(records.len(), 1);
        assert!(records.iter().all(|r| r.local_id != unmanaged));
        assert_eq!(table.contacts_of(&account()).len(), 2);
    }
}
