//! # contactsync model
//!
//! Data types shared by every contactsync crate.
//!
//! This crate provides:
//! - [`RemoteContact`], the decrypted record handed over by the remote side
//! - [`FieldEntry`] and the target type enumerations of the local store
//! - [`Operation`], the unit of work submitted to a local store batch
//! - [`AccountKey`] / [`RemoteAccount`] for account scoping
//!
//! This is a pure data crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod account;
mod contact;
mod field;
mod operation;

pub use account::{AccountKey, RemoteAccount};
pub use contact::{
    Address, AddressKind, ContactEvent, Email, EmailKind, PhoneKind, Photo, RemoteContact,
    StructuredName, Telephone,
};
pub use field::{
    EmailType, EventType, FieldEntry, FieldKind, NameField, OrganizationSlot, OrganizationType,
    PhoneType, PostalField, PostalType, WebsiteType,
};
pub use operation::{ContainerRef, LocalId, LocalRecord, Operation};
