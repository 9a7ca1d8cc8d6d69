//! Test fixtures and store helpers.
//!
//! Provides the standard test account, sample contacts and stores that are
//! already populated the way a previous pass would have left them.

use chrono::NaiveDate;
use contactsync_model::{
    AccountKey, Address, AddressKind, EmailKind, FieldEntry, LocalId, Operation, PhoneKind,
    RemoteAccount, RemoteContact,
};
use contactsync_store::{FileStore, LocalStore};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Name of the standard test account.
pub const TEST_ACCOUNT_NAME: &str = "alice@example.com";

/// Type of the standard test account.
pub const TEST_ACCOUNT_TYPE: &str = "contactsync";

/// Remote id of the standard test account.
pub const TEST_REMOTE_ACCOUNT_ID: &str = "acc-alice";

/// Returns the standard host account.
pub fn account() -> AccountKey {
    AccountKey::new(TEST_ACCOUNT_NAME, TEST_ACCOUNT_TYPE)
}

/// Returns the remote account matching [`account`].
pub fn remote_account() -> RemoteAccount {
    RemoteAccount::new(TEST_REMOTE_ACCOUNT_ID, TEST_ACCOUNT_NAME)
}

/// Returns a calendar date.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("Invalid date")
}

/// Returns a contact with every supported property set.
pub fn sample_contact(id: &str) -> RemoteContact {
    RemoteContact::new(id)
        .with_formatted_name(format!("Contact {id}"))
        .with_name("Contact", id)
        .with_email(format!("{id}@example.com"), EmailKind::Home)
        .with_email(format!("{id}@work.example.com"), EmailKind::Work)
        .with_phone("+41 44 123 45 67", PhoneKind::Mobile)
        .with_phone("+41 44 765 43 21", PhoneKind::Fax)
        .with_address(Address {
            kind: AddressKind::Home,
            street: Some("Bahnhofstrasse 1".into()),
            locality: Some("Zurich".into()),
            region: Some("ZH".into()),
            postal_code: Some("8001".into()),
            country: Some("Switzerland".into()),
        })
        .with_birthday(date(1990, 4, 1))
        .with_anniversary(date(2015, 9, 12))
        .with_note(format!("note for {id}"))
        .with_organization("Example Corp")
        .with_title("Engineer")
        .with_url(format!("https://example.com/{id}"))
        .with_photo(vec![0x89, 0x50, 0x4e, 0x47])
}

/// Returns a contact holding only an id and a display name.
pub fn minimal_contact(id: &str) -> RemoteContact {
    RemoteContact::new(id).with_formatted_name(format!("Contact {id}"))
}

/// A file store in a temporary directory that is removed on drop.
pub struct TestStore {
    /// The store.
    pub store: FileStore,
    /// The temporary directory (kept alive to prevent cleanup).
    temp_dir: TempDir,
}

impl TestStore {
    /// Creates an empty file store in a new temporary directory.
    pub fn file() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = FileStore::open(&temp_dir.path().join("contacts.cbor"))
            .expect("Failed to open file store");
        Self { store, temp_dir }
    }

    /// Returns the snapshot path.
    pub fn path(&self) -> PathBuf {
        self.store.path().to_path_buf()
    }

    /// Returns the temporary directory.
    pub fn dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Closes and reopens the store from disk.
    pub fn reopen(self) -> Self {
        let Self { store, temp_dir } = self;
        let path = store.path().to_path_buf();
        drop(store);
        let store = FileStore::open(&path).expect("Failed to reopen file store");
        Self { store, temp_dir }
    }
}

impl std::ops::Deref for TestStore {
    type Target = FileStore;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

/// Runs a test with a temporary file store.
pub fn with_file_store<F, R>(f: F) -> R
where
    F: FnOnce(&FileStore) -> R,
{
    let test_store = TestStore::file();
    f(&test_store.store)
}

/// Inserts a managed container for each id, the way a pass would.
///
/// Each container gets a single note so that replacement is observable.
pub fn seed_mirror<L: LocalStore>(store: &L, account: &AccountKey, ids: &[&str]) -> Vec<LocalId> {
    ids.iter()
        .map(|id| {
            let receipt = store
                .apply_batch(&[
                    Operation::insert_container(account, *id),
                    Operation::insert_field(
                        0,
                        FieldEntry::Note {
                            text: format!("seeded {id}"),
                        },
                    ),
                ])
                .expect("Failed to seed mirror");
            receipt.inserted[0]
        })
        .collect()
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;
    use contactsync_store::MemoryStore;

    /// Creates a memory store mirroring `ids` for [`account`].
    pub fn mirrored_store(ids: &[&str]) -> MemoryStore {
        let store = MemoryStore::new();
        seed_mirror(&store, &account(), ids);
        store
    }

    /// Creates a memory store mirroring `ids` plus `unmanaged` contacts the
    /// user created by hand.
    pub fn mixed_store(ids: &[&str], unmanaged: usize) -> (MemoryStore, Vec<LocalId>) {
        let store = mirrored_store(ids);
        let manual = (0..unmanaged)
            .map(|n| {
                store.insert_unmanaged(
                    &account(),
                    vec![FieldEntry::Note {
                        text: format!("handmade {n}"),
                    }],
                )
            })
            .collect();
        (store, manual)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_reopen() {
        let test_store = TestStore::file();
        seed_mirror(&test_store.store, &account(), &["u1", "u2"]);
        let path = test_store.path();
        assert!(path.starts_with(test_store.dir()));

        let test_store = test_store.reopen();
        let records = test_store.query_managed_records(&account()).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_with_file_store() {
        with_file_store(|store| {
            assert!(store.snapshot().is_empty());
        });
    }

    #[test]
    fn test_mixed_scenario() {
        let (store, manual) = scenarios::mixed_store(&["u1"], 2);
        assert_eq!(manual.len(), 2);
        assert_eq!(store.query_managed_records(&account()).unwrap().len(), 1);
        assert_eq!(store.list_contacts(&account()).unwrap().len(), 3);
    }

    #[test]
    fn test_sample_contact_is_complete() {
        let contact = sample_contact("u1");
        assert_eq!(contact.external_id(), Some("u1"));
        assert!(remote_account().matches(&account()));
        assert_eq!(contact.photos.len(), 1);
        assert!(contact.birthday.is_some());
    }
}
