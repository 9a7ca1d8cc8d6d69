//! The sync runner: one-way reconciliation of a remote account onto the
//! local store.

use crate::batch::{build_plan, BatchPlan, BatchPurpose};
use crate::config::SyncConfig;
use crate::correlate::{partition_identified, reconcile, validate_remote};
use crate::error::{SyncError, SyncResult};
use crate::registry::{CancelToken, PassRegistry};
use crate::source::{AccountResolver, RemoteSource};
use crate::state::{PassOutcome, RunnerStats, SyncReport, SyncState, SyncStats};
use contactsync_model::AccountKey;
use contactsync_store::{BatchReceipt, LocalStore};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, info_span, warn};
use uuid::Uuid;

/// Runs sync passes for any number of host accounts.
///
/// A pass resolves the remote account, fetches its contacts, reads the
/// local index, reconciles both and applies the resulting batches in
/// order. A failed batch is logged and skipped; the pass goes on with the
/// next one. Only an access denial by the store stops a pass outright.
///
/// At most one pass per [`AccountKey`] runs at a time. Passes for
/// different accounts may run concurrently on different threads.
pub struct SyncRunner<S, R, L> {
    config: SyncConfig,
    source: S,
    resolver: R,
    store: L,
    registry: Arc<PassRegistry>,
    states: RwLock<HashMap<AccountKey, SyncState>>,
    stats: RwLock<RunnerStats>,
}

impl<S: RemoteSource, R: AccountResolver, L: LocalStore> SyncRunner<S, R, L> {
    /// Creates a new runner.
    pub fn new(config: SyncConfig, source: S, resolver: R, store: L) -> Self {
        Self {
            config,
            source,
            resolver,
            store,
            registry: Arc::new(PassRegistry::new()),
            states: RwLock::new(HashMap::new()),
            stats: RwLock::new(RunnerStats::default()),
        }
    }

    /// Uses `registry` to track running passes, so that runners sharing it
    /// never sync the same account concurrently.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<PassRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Returns the local store.
    pub fn store(&self) -> &L {
        &self.store
    }

    /// Returns the registry of running passes.
    pub fn registry(&self) -> &Arc<PassRegistry> {
        &self.registry
    }

    /// Returns the state of the most recent pass for `account`.
    pub fn state(&self, account: &AccountKey) -> SyncState {
        self.states.read().get(account).copied().unwrap_or_default()
    }

    /// Returns totals over every pass this runner executed.
    pub fn stats(&self) -> RunnerStats {
        self.stats.read().clone()
    }

    /// Asks the running pass of `account` to stop after its in-flight
    /// batch. Returns false if no pass is running.
    pub fn cancel(&self, account: &AccountKey) -> bool {
        let cancelled = self.registry.cancel(account);
        if cancelled {
            info!(account = %account, "cancellation requested");
        }
        cancelled
    }

    /// Returns true if a pass for `account` is running.
    pub fn is_running(&self, account: &AccountKey) -> bool {
        self.registry.is_running(account)
    }

    /// Computes the batches a pass would apply, without applying them.
    ///
    /// Returns `None` if no remote account matches `account`.
    pub fn plan(&self, account: &AccountKey) -> SyncResult<Option<BatchPlan>> {
        self.prepare(account, &CancelToken::new(), false)
    }

    /// Runs one pass for `account`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::SecurityDenied`] if the store refused access
    /// and [`SyncError::PassInProgress`] if a pass for `account` is already
    /// running. Every other failure is logged and reported through
    /// [`SyncReport::outcome`].
    pub fn run_sync(&self, account: &AccountKey) -> SyncResult<SyncReport> {
        let Some(guard) = self.registry.begin(account) else {
            warn!(account = %account, "sync pass already running");
            return Err(SyncError::PassInProgress(account.to_string()));
        };

        let pass_id = Uuid::new_v4();
        let span = info_span!("sync_pass", %pass_id, account = %account);
        let _entered = span.enter();
        let start = Instant::now();
        info!("starting sync pass");

        let mut stats = SyncStats::default();
        let outcome = match self.execute(account, guard.token(), &mut stats) {
            Ok(outcome) => outcome,
            Err(SyncError::Cancelled) => PassOutcome::Cancelled,
            Err(err @ SyncError::SecurityDenied(_)) => {
                error!(error = %err, "local store denied access, stopping pass");
                self.set_state(account, SyncState::SecurityDenied);
                self.record(&stats, false, Some(err.to_string()));
                return Err(err);
            }
            Err(err) => {
                error!(error = %err, "sync pass failed");
                PassOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        };

        self.set_state(account, outcome.state());
        let failure = match &outcome {
            PassOutcome::Failed { reason } => Some(reason.clone()),
            _ => None,
        };
        self.record(&stats, outcome.state() == SyncState::Done, failure);

        let report = SyncReport {
            pass_id,
            outcome,
            stats,
            duration: start.elapsed(),
        };
        info!(
            outcome = %report.outcome,
            inserted = stats.inserted,
            updated = stats.updated,
            deleted = stats.deleted,
            failed_batches = stats.failed_batches,
            elapsed_ms = report.duration.as_millis() as u64,
            "sync pass finished"
        );
        Ok(report)
    }

    fn execute(
        &self,
        account: &AccountKey,
        token: &CancelToken,
        stats: &mut SyncStats,
    ) -> SyncResult<PassOutcome> {
        match self.prepare(account, token, true)? {
            Some(plan) => self.apply_plan(account, plan, token, stats),
            None => Ok(PassOutcome::AccountNotFound),
        }
    }

    fn prepare(
        &self,
        account: &AccountKey,
        token: &CancelToken,
        track: bool,
    ) -> SyncResult<Option<BatchPlan>> {
        let enter = |state: SyncState| {
            if track {
                self.set_state(account, state);
            }
        };

        enter(SyncState::ResolvingAccount);
        let Some(remote_account) = self
            .resolver
            .current_accounts()?
            .into_iter()
            .find(|candidate| candidate.matches(account))
        else {
            warn!(account = %account, "no remote account matches, nothing to sync");
            return Ok(None);
        };
        check_cancelled(token)?;

        enter(SyncState::FetchingRemote);
        let fetched = self.source.list_contacts(&remote_account.account_id)?;
        let (remote, discarded) = partition_identified(fetched);
        if discarded > 0 {
            debug!(discarded, "ignoring remote contacts without an id");
        }
        validate_remote(&remote)?;
        info!(
            remote_account = %remote_account.account_id,
            count = remote.len(),
            "fetched remote contacts"
        );
        check_cancelled(token)?;

        enter(SyncState::QueryingLocal);
        let local = self.store.query_managed_records(account)?;
        debug!(count = local.len(), "read local index");
        check_cancelled(token)?;

        enter(SyncState::Reconciling);
        let result = reconcile(remote, &local);
        info!(
            stale = result.stale_local_ids.len(),
            new = result.new_remote.len(),
            updated = result.updated_remote.len(),
            "reconciled"
        );

        Ok(Some(build_plan(account, result)))
    }

    fn apply_plan(
        &self,
        account: &AccountKey,
        plan: BatchPlan,
        token: &CancelToken,
        stats: &mut SyncStats,
    ) -> SyncResult<PassOutcome> {
        self.set_state(account, SyncState::Applying);

        // Ids whose replace-delete failed; their re-insert would duplicate them.
        let mut kept_back: HashSet<String> = HashSet::new();

        for batch in plan {
            if token.is_cancelled() {
                info!("cancelled, issuing no further batches");
                return Ok(PassOutcome::Cancelled);
            }

            if let BatchPurpose::Insert {
                external_id,
                replacing: true,
            } = &batch.purpose
            {
                if kept_back.contains(external_id) {
                    warn!(purpose = %batch.purpose, "skipping, previous version was not removed");
                    stats.failed_batches += 1;
                    continue;
                }
            }

            match self.store.apply_batch(&batch.operations) {
                Ok(receipt) => {
                    debug!(
                        purpose = %batch.purpose,
                        operations = batch.operations.len(),
                        "applied batch"
                    );
                    count_applied(stats, &batch.purpose, &receipt);
                }
                Err(err) if err.is_access_denied() => return Err(SyncError::SecurityDenied(err)),
                Err(source) => {
                    let err = SyncError::BatchApply {
                        purpose: batch.purpose.to_string(),
                        source,
                    };
                    warn!(error = %err, "batch failed, continuing with next");
                    stats.failed_batches += 1;
                    if let BatchPurpose::ReplaceDelete { external_id } = batch.purpose {
                        kept_back.insert(external_id);
                    }
                }
            }
        }

        Ok(PassOutcome::Completed)
    }

    fn set_state(&self, account: &AccountKey, state: SyncState) {
        self.states.write().insert(account.clone(), state);
    }

    fn record(&self, pass: &SyncStats, completed: bool, failure: Option<String>) {
        let mut stats = self.stats.write();
        if completed {
            stats.passes_completed += 1;
        } else {
            stats.passes_aborted += 1;
        }
        stats.totals.accumulate(pass);
        if failure.is_some() {
            stats.last_error = failure;
        }
    }
}

fn check_cancelled(token: &CancelToken) -> SyncResult<()> {
    if token.is_cancelled() {
        Err(SyncError::Cancelled)
    } else {
        Ok(())
    }
}

fn count_applied(stats: &mut SyncStats, purpose: &BatchPurpose, receipt: &BatchReceipt) {
    match purpose {
        BatchPurpose::StaleDeletion { .. } => stats.deleted += receipt.deleted as u64,
        BatchPurpose::ReplaceDelete { .. } => {}
        BatchPurpose::Insert {
            replacing: true, ..
        } => stats.updated += 1,
        BatchPurpose::Insert { .. } => stats.inserted += 1,
    }
}
