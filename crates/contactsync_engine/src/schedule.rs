//! Background scheduling of sync passes for one account.

use crate::error::SyncResult;
use crate::runner::SyncRunner;
use crate::source::{AccountResolver, RemoteSource};
use crate::state::SyncReport;
use contactsync_model::AccountKey;
use contactsync_store::LocalStore;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Why a pass was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
    /// The periodic interval elapsed.
    Periodic,
    /// The host asked for a pass.
    Manual {
        /// Run ahead of anything already queued.
        expedited: bool,
    },
}

/// A finished pass together with its trigger.
#[derive(Debug)]
pub struct ScheduledReport {
    /// What started the pass.
    pub trigger: SyncTrigger,
    /// Result of [`SyncRunner::run_sync`].
    pub result: SyncResult<SyncReport>,
}

#[derive(Debug, Default)]
struct Queue {
    pending: VecDeque<SyncTrigger>,
    shutdown: bool,
    /// Set while the worker runs a pass it took from this queue.
    busy: bool,
}

impl Queue {
    /// Queues `trigger` unless an equivalent request is already pending.
    fn push(&mut self, trigger: SyncTrigger) -> bool {
        match trigger {
            SyncTrigger::Manual { expedited: true } => {
                self.pending
                    .retain(|queued| !matches!(queued, SyncTrigger::Manual { .. }));
                self.pending.push_front(trigger);
                true
            }
            SyncTrigger::Manual { expedited: false } => {
                if self
                    .pending
                    .iter()
                    .any(|queued| matches!(queued, SyncTrigger::Manual { .. }))
                {
                    return false;
                }
                self.pending.push_back(trigger);
                true
            }
            SyncTrigger::Periodic => {
                if self.pending.contains(&trigger) {
                    return false;
                }
                self.pending.push_back(trigger);
                true
            }
        }
    }
}

#[derive(Debug, Default)]
struct Shared {
    queue: Mutex<Queue>,
    wakeup: Condvar,
}

/// Runs passes for one account on a background thread.
///
/// A pass starts whenever the periodic interval of the runner's
/// configuration elapses or the host calls [`SyncScheduler::request_sync`].
/// Any pass resets the periodic timer. Requests that arrive while an
/// equivalent one is pending are merged into it.
pub struct SyncScheduler {
    account: AccountKey,
    shared: Arc<Shared>,
    cancel: Box<dyn Fn() -> bool + Send + Sync>,
    reports: Receiver<ScheduledReport>,
    worker: Option<JoinHandle<()>>,
}

impl SyncScheduler {
    /// Starts a scheduler that syncs `account` with `runner`.
    pub fn start<S, R, L>(runner: Arc<SyncRunner<S, R, L>>, account: AccountKey) -> Self
    where
        S: RemoteSource + 'static,
        R: AccountResolver + 'static,
        L: LocalStore + 'static,
    {
        let shared = Arc::new(Shared::default());
        if runner.config().sync_on_start {
            shared.queue.lock().push(SyncTrigger::Periodic);
        }

        let (sender, reports) = mpsc::channel();
        let worker = {
            let shared = Arc::clone(&shared);
            let runner = Arc::clone(&runner);
            let account = account.clone();
            thread::Builder::new()
                .name("contactsync-scheduler".into())
                .spawn(move || worker_loop(&runner, &account, &shared, &sender))
        };
        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(err) => {
                warn!(error = %err, "could not spawn scheduler thread");
                None
            }
        };

        let cancel: Box<dyn Fn() -> bool + Send + Sync> = {
            let runner = Arc::clone(&runner);
            let account = account.clone();
            Box::new(move || runner.cancel(&account))
        };

        info!(
            account = %account,
            interval_secs = runner.config().sync_interval.as_secs(),
            "scheduler started"
        );
        Self {
            account,
            shared,
            cancel,
            reports,
            worker,
        }
    }

    /// Returns the account this scheduler syncs.
    pub fn account(&self) -> &AccountKey {
        &self.account
    }

    /// Requests a pass. Returns false if an equivalent request is pending.
    pub fn request_sync(&self, trigger: SyncTrigger) -> bool {
        let queued = self.shared.queue.lock().push(trigger);
        if queued {
            debug!(?trigger, "sync requested");
            self.shared.wakeup.notify_one();
        } else {
            debug!(?trigger, "sync request merged with pending one");
        }
        queued
    }

    /// Cancels the pass this scheduler is running, if any. Returns false
    /// if the worker is idle.
    ///
    /// Passes for the same account started by other callers of the
    /// runner are left alone.
    pub fn cancel(&self) -> bool {
        let busy = self.shared.queue.lock().busy;
        busy && (self.cancel)()
    }

    /// Returns the channel that receives every finished pass.
    pub fn reports(&self) -> &Receiver<ScheduledReport> {
        &self.reports
    }

    /// Stops the worker after the running pass and waits for it.
    pub fn shutdown(&mut self) {
        let busy = {
            let mut queue = self.shared.queue.lock();
            queue.shutdown = true;
            queue.pending.clear();
            queue.busy
        };
        self.shared.wakeup.notify_all();
        if busy {
            (self.cancel)();
        }

        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!(account = %self.account, "scheduler thread panicked");
            }
            info!(account = %self.account, "scheduler stopped");
        }
    }
}

impl Drop for SyncScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop<S, R, L>(
    runner: &SyncRunner<S, R, L>,
    account: &AccountKey,
    shared: &Shared,
    sender: &Sender<ScheduledReport>,
) where
    S: RemoteSource,
    R: AccountResolver,
    L: LocalStore,
{
    let interval = runner.config().sync_interval;
    // An interval too large to represent disables periodic passes.
    let deadline = || Instant::now().checked_add(interval);
    let mut next_periodic = deadline();
    if next_periodic.is_none() {
        info!(account = %account, "sync interval out of range, periodic passes disabled");
    }

    loop {
        let Some(trigger) = next_trigger(shared, next_periodic) else {
            return;
        };

        let result = runner.run_sync(account);
        shared.queue.lock().busy = false;
        next_periodic = deadline();

        if sender.send(ScheduledReport { trigger, result }).is_err() {
            debug!("report receiver dropped");
        }
    }
}

/// Waits for the next trigger and marks the worker busy; `None` on
/// shutdown.
fn next_trigger(shared: &Shared, next_periodic: Option<Instant>) -> Option<SyncTrigger> {
    let mut queue = shared.queue.lock();
    loop {
        if queue.shutdown {
            return None;
        }
        if let Some(trigger) = queue.pending.pop_front() {
            queue.busy = true;
            return Some(trigger);
        }
        let Some(next_periodic) = next_periodic else {
            shared.wakeup.wait(&mut queue);
            continue;
        };
        let now = Instant::now();
        if now >= next_periodic {
            queue.busy = true;
            return Some(SyncTrigger::Periodic);
        }
        let timeout = next_periodic.saturating_duration_since(now);
        shared
            .wakeup
            .wait_for(&mut queue, timeout.max(Duration::from_millis(1)));
    }
}
