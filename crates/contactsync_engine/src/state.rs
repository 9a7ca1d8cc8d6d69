//! Sync pass states, statistics and reports.

use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// The state of a sync pass for one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    /// No pass has run yet.
    #[default]
    Idle,
    /// Looking up the remote account for the host identity.
    ResolvingAccount,
    /// Listing remote contacts.
    FetchingRemote,
    /// Reading the local index.
    QueryingLocal,
    /// Correlating and planning batches.
    Reconciling,
    /// Submitting batches to the store.
    Applying,
    /// The pass finished.
    Done,
    /// The pass stopped on request.
    Cancelled,
    /// The store refused access.
    SecurityDenied,
    /// The pass stopped on an error.
    Failed,
}

impl SyncState {
    /// Returns true while a pass is running.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            SyncState::ResolvingAccount
                | SyncState::FetchingRemote
                | SyncState::QueryingLocal
                | SyncState::Reconciling
                | SyncState::Applying
        )
    }

    /// Returns true if this state ends a pass.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SyncState::Done | SyncState::Cancelled | SyncState::SecurityDenied | SyncState::Failed
        )
    }
}

/// Counts of one pass. Only applied batches are counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Contacts inserted for the first time.
    pub inserted: u64,
    /// Contacts replaced with fresh fields.
    pub updated: u64,
    /// Stale containers deleted.
    pub deleted: u64,
    /// Batches that failed or were skipped.
    pub failed_batches: u64,
}

impl SyncStats {
    /// Returns the number of contacts changed.
    pub fn total_changes(&self) -> u64 {
        self.inserted + self.updated + self.deleted
    }

    /// Adds `other` to these counts.
    pub fn accumulate(&mut self, other: &SyncStats) {
        self.inserted += other.inserted;
        self.updated += other.updated;
        self.deleted += other.deleted;
        self.failed_batches += other.failed_batches;
    }
}

impl fmt::Display for SyncStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} inserted, {} updated, {} deleted, {} failed batches",
            self.inserted, self.updated, self.deleted, self.failed_batches
        )
    }
}

/// How a pass ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// Every stage ran. Individual batches may still have failed.
    Completed,
    /// No remote account matches the host identity; nothing was done.
    AccountNotFound,
    /// The pass stopped on request after the in-flight batch.
    Cancelled,
    /// The pass stopped before applying anything further.
    Failed {
        /// Error message.
        reason: String,
    },
}

impl PassOutcome {
    /// Returns the terminal state matching this outcome.
    pub fn state(&self) -> SyncState {
        match self {
            PassOutcome::Completed | PassOutcome::AccountNotFound => SyncState::Done,
            PassOutcome::Cancelled => SyncState::Cancelled,
            PassOutcome::Failed { .. } => SyncState::Failed,
        }
    }
}

impl fmt::Display for PassOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassOutcome::Completed => f.write_str("completed"),
            PassOutcome::AccountNotFound => f.write_str("account not found"),
            PassOutcome::Cancelled => f.write_str("cancelled"),
            PassOutcome::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

/// Result of one sync pass.
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// Unique id of the pass, also recorded on its log span.
    pub pass_id: Uuid,
    /// How the pass ended.
    pub outcome: PassOutcome,
    /// Counts of applied changes.
    pub stats: SyncStats,
    /// Wall-clock duration.
    pub duration: Duration,
}

impl SyncReport {
    /// Returns true if the pass completed and every batch applied.
    pub fn is_clean(&self) -> bool {
        self.outcome == PassOutcome::Completed && self.stats.failed_batches == 0
    }
}

/// Totals over every pass a runner executed.
#[derive(Debug, Clone, Default)]
pub struct RunnerStats {
    /// Passes that ended in [`SyncState::Done`], including passes for
    /// accounts with no remote counterpart.
    pub passes_completed: u64,
    /// Passes that were cancelled, failed or denied.
    pub passes_aborted: u64,
    /// Sum of all pass counts.
    pub totals: SyncStats,
    /// Message of the most recent failure, if any.
    pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_classification() {
        assert!(!SyncState::Idle.is_active());
        assert!(SyncState::FetchingRemote.is_active());
        assert!(SyncState::Applying.is_active());
        assert!(SyncState::Done.is_terminal());
        assert!(SyncState::SecurityDenied.is_terminal());
        assert!(!SyncState::Reconciling.is_terminal());
        assert_eq!(SyncState::default(), SyncState::Idle);
    }

    #[test]
    fn outcome_states() {
        assert_eq!(PassOutcome::AccountNotFound.state(), SyncState::Done);
        assert_eq!(PassOutcome::Cancelled.state(), SyncState::Cancelled);
        assert_eq!(
            PassOutcome::Failed {
                reason: "x".into()
            }
            .state(),
            SyncState::Failed
        );
    }

    #[test]
    fn stats_accumulate() {
        let mut totals = SyncStats::default();
        let pass = SyncStats {
            inserted: 2,
            updated: 1,
            deleted: 3,
            failed_batches: 1,
        };
        totals.accumulate(&pass);
        totals.accumulate(&pass);
        assert_eq!(totals.total_changes(), 12);
        assert_eq!(totals.failed_batches, 2);
        assert_eq!(
            pass.to_string(),
            "2 inserted, 1 updated, 3 deleted, 1 failed batches"
        );
    }
}
