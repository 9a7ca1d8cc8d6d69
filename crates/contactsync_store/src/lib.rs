//! # contactsync store
//!
//! Local contact store trait and implementations.
//!
//! The store is the local side of a sync: a flat table of contact
//! containers, each holding typed field rows, that accepts atomically
//! applied batches of [`contactsync_model::Operation`]s.
//!
//! ## Design Principles
//!
//! - A batch is all-or-nothing
//! - Field inserts reference containers of the same batch by position
//! - Contacts without an external id belong to the user, not the sync
//! - Every access is scoped to an [`contactsync_model::AccountKey`]
//!
//! ## Available Stores
//!
//! - [`MemoryStore`] - For testing and ephemeral mirrors
//! - [`FileStore`] - CBOR snapshot on disk
//!
//! ## Example
//!
//! ```rust
//! use contactsync_model::{AccountKey, FieldEntry, Operation};
//! use contactsync_store::{LocalStore, MemoryStore};
//!
//! let store = MemoryStore::new();
//! let account = AccountKey::new("alice@example.com", "contactsync");
//! let receipt = store
//!     .apply_batch(&[
//!         Operation::insert_container(&account, "u1"),
//!         Operation::insert_field(0, FieldEntry::Note { text: "hi".into() }),
//!     ])
//!     .unwrap();
//! assert_eq!(receipt.fields_written, 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod file;
mod memory;
mod store;
mod table;

pub use error::{StoreError, StoreResult};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use store::{BatchReceipt, LocalStore, StoredContact};
pub use table::ContactTable;
