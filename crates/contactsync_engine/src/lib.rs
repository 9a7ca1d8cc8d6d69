//! # contactsync engine
//!
//! One-way reconciliation of remote contacts onto a local contact store.
//!
//! This crate provides:
//! - Field mapping from remote contacts to typed local field rows
//! - Correlation of remote and local sets by external id
//! - Batch building with delete-then-insert replacement
//! - The sync runner state machine with per-account cancellation
//! - A background scheduler for periodic and on-demand passes
//!
//! ## Architecture
//!
//! A pass runs these stages in order:
//! 1. Resolve the remote account matching the host account
//! 2. Fetch its contacts and drop those without an external id
//! 3. Read the local index scoped to the same account
//! 4. Reconcile into stale, new and updated sets
//! 5. Apply the planned batches one by one
//!
//! ## Key Invariants
//!
//! - The remote is authoritative; nothing flows back
//! - External id equality is the only correlation key
//! - Local contacts without an external id are never touched
//! - A replaced contact is deleted in one batch and reinserted in the next
//! - A failed batch does not stop the pass; an access denial does
//!
//! ## Example
//!
//! ```rust
//! use contactsync_engine::{StaticRemote, SyncConfig, SyncRunner};
//! use contactsync_model::{RemoteAccount, RemoteContact};
//! use contactsync_store::MemoryStore;
//! use std::sync::Arc;
//!
//! let remote = Arc::new(StaticRemote::new().with_account(
//!     RemoteAccount::new("acc-1", "alice@example.com"),
//!     vec![RemoteContact::new("u1").with_formatted_name("Bob")],
//! ));
//! let config = SyncConfig::default();
//! let account = config.account("alice@example.com");
//! let runner = SyncRunner::new(config, Arc::clone(&remote), remote, MemoryStore::new());
//!
//! let report = runner.run_sync(&account).unwrap();
//! assert_eq!(report.stats.inserted, 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod batch;
mod config;
mod correlate;
mod error;
mod mapper;
mod registry;
mod runner;
mod schedule;
mod source;
mod state;

pub use batch::{build_plan, BatchPlan, BatchPurpose, PlannedBatch};
pub use config::{SyncConfig, DEFAULT_ACCOUNT_TYPE, DEFAULT_SYNC_INTERVAL};
pub use correlate::{partition_identified, reconcile, validate_remote, ReconciliationResult};
pub use error::{SyncError, SyncResult};
pub use mapper::{insert_batch, map_contact, map_fields, MappedContact};
pub use registry::{CancelToken, PassGuard, PassRegistry};
pub use runner::SyncRunner;
pub use schedule::{ScheduledReport, SyncScheduler, SyncTrigger};
pub use source::{AccountResolver, RemoteSource, SourceError, SourceResult, StaticRemote};
pub use state::{PassOutcome, RunnerStats, SyncReport, SyncState, SyncStats};
