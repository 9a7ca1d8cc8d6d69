//! # contactsync testkit
//!
//! Test utilities for contactsync.
//!
//! This crate provides:
//! - The standard test account and sample contacts
//! - Temporary file stores and pre-seeded mirrors
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust
//! use contactsync_store::LocalStore;
//! use contactsync_testkit::prelude::*;
//!
//! let store = scenarios::mirrored_store(&["u1", "u2"]);
//! assert_eq!(store.query_managed_records(&account()).unwrap().len(), 2);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
