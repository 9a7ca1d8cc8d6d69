//! Shared helpers for the contactsync benchmarks.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod utils;
