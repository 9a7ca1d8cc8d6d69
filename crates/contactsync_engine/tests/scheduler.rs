//! Scheduler tests with a real worker thread.

use contactsync_engine::{
    PassOutcome, StaticRemote, SyncConfig, SyncRunner, SyncScheduler, SyncTrigger,
};
use contactsync_model::{AccountKey, LocalRecord, Operation};
use contactsync_store::{BatchReceipt, LocalStore, MemoryStore, StoreResult, StoredContact};
use contactsync_testkit::prelude::*;
use parking_lot::Mutex;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(5);

type Runner = SyncRunner<Arc<StaticRemote>, Arc<StaticRemote>, MemoryStore>;

fn runner(config: SyncConfig) -> Arc<Runner> {
    let remote =
        Arc::new(StaticRemote::new().with_account(remote_account(), vec![sample_contact("u1")]));
    Arc::new(SyncRunner::new(
        config,
        Arc::clone(&remote),
        remote,
        MemoryStore::new(),
    ))
}

fn quiet_config() -> SyncConfig {
    SyncConfig::new(TEST_ACCOUNT_TYPE).with_sync_interval(Duration::from_secs(3600))
}

#[test]
fn manual_request_runs_a_pass() {
    let runner = runner(quiet_config());
    let mut scheduler = SyncScheduler::start(Arc::clone(&runner), account());

    assert!(scheduler.request_sync(SyncTrigger::Manual { expedited: true }));
    let scheduled = scheduler.reports().recv_timeout(WAIT).unwrap();

    assert_eq!(scheduled.trigger, SyncTrigger::Manual { expedited: true });
    let report = scheduled.result.unwrap();
    assert_eq!(report.outcome, PassOutcome::Completed);
    assert_eq!(report.stats.inserted, 1);
    assert_eq!(
        runner.store().query_managed_records(&account()).unwrap().len(),
        1
    );

    scheduler.shutdown();
}

#[test]
fn sync_on_start_queues_a_pass() {
    let runner = runner(quiet_config().with_sync_on_start(true));
    let scheduler = SyncScheduler::start(runner, account());

    let scheduled = scheduler.reports().recv_timeout(WAIT).unwrap();
    assert_eq!(scheduled.trigger, SyncTrigger::Periodic);
    assert!(scheduled.result.unwrap().is_clean());
}

#[test]
fn periodic_passes_repeat() {
    let config = SyncConfig::new(TEST_ACCOUNT_TYPE).with_sync_interval(Duration::from_millis(20));
    let runner = runner(config);
    let mut scheduler = SyncScheduler::start(Arc::clone(&runner), account());

    for _ in 0..3 {
        let scheduled = scheduler.reports().recv_timeout(WAIT).unwrap();
        assert_eq!(scheduled.trigger, SyncTrigger::Periodic);
        assert_eq!(scheduled.result.unwrap().outcome, PassOutcome::Completed);
    }
    scheduler.shutdown();

    // Repeat passes replace the contact instead of duplicating it.
    assert_eq!(
        runner.store().query_managed_records(&account()).unwrap().len(),
        1
    );
    assert!(runner.stats().passes_completed >= 3);
}

#[test]
fn shutdown_stops_the_worker() {
    let runner = runner(quiet_config());
    let mut scheduler = SyncScheduler::start(Arc::clone(&runner), account());
    scheduler.shutdown();

    // Requests after shutdown are accepted but never run.
    scheduler.request_sync(SyncTrigger::Manual { expedited: false });
    assert!(scheduler
        .reports()
        .recv_timeout(Duration::from_millis(100))
        .is_err());
    assert_eq!(runner.stats().passes_completed, 0);
    assert!(!scheduler.cancel());
}

/// Holds every local query until the test lets it through.
struct GatedStore {
    inner: MemoryStore,
    entered: Mutex<mpsc::Sender<()>>,
    release: Mutex<mpsc::Receiver<()>>,
}

impl LocalStore for GatedStore {
    fn query_managed_records(&self, account: &AccountKey) -> StoreResult<Vec<LocalRecord>> {
        let _ = self.entered.lock().send(());
        let _ = self.release.lock().recv();
        self.inner.query_managed_records(account)
    }

    fn apply_batch(&self, operations: &[Operation]) -> StoreResult<BatchReceipt> {
        self.inner.apply_batch(operations)
    }

    fn list_contacts(&self, account: &AccountKey) -> StoreResult<Vec<StoredContact>> {
        self.inner.list_contacts(account)
    }
}

type GatedRunner = SyncRunner<Arc<StaticRemote>, Arc<StaticRemote>, GatedStore>;

fn gated_runner() -> (Arc<GatedRunner>, mpsc::Receiver<()>, mpsc::Sender<()>) {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let remote =
        Arc::new(StaticRemote::new().with_account(remote_account(), vec![sample_contact("u1")]));
    let store = GatedStore {
        inner: MemoryStore::new(),
        entered: Mutex::new(entered_tx),
        release: Mutex::new(release_rx),
    };
    let runner = SyncRunner::new(quiet_config(), Arc::clone(&remote), remote, store);
    (Arc::new(runner), entered_rx, release_tx)
}

#[test]
fn unrepresentable_interval_only_runs_on_request() {
    let config =
        SyncConfig::new(TEST_ACCOUNT_TYPE).with_sync_interval(Duration::from_secs(u64::MAX));
    let runner = runner(config);
    let mut scheduler = SyncScheduler::start(Arc::clone(&runner), account());

    assert!(scheduler.request_sync(SyncTrigger::Manual { expedited: true }));
    let scheduled = scheduler.reports().recv_timeout(WAIT).unwrap();
    assert_eq!(scheduled.result.unwrap().outcome, PassOutcome::Completed);

    // The worker survives and keeps serving requests.
    assert!(scheduler.request_sync(SyncTrigger::Manual { expedited: false }));
    let scheduled = scheduler.reports().recv_timeout(WAIT).unwrap();
    assert_eq!(scheduled.result.unwrap().stats.updated, 1);

    scheduler.shutdown();
    assert_eq!(runner.stats().passes_completed, 2);
}

#[test]
fn cancel_stops_the_running_pass() {
    let (runner, entered, release) = gated_runner();
    let mut scheduler = SyncScheduler::start(Arc::clone(&runner), account());

    scheduler.request_sync(SyncTrigger::Manual { expedited: true });
    entered.recv_timeout(WAIT).unwrap();
    assert!(scheduler.cancel());
    release.send(()).unwrap();

    let report = scheduler.reports().recv_timeout(WAIT).unwrap().result.unwrap();
    assert_eq!(report.outcome, PassOutcome::Cancelled);
    assert_eq!(report.stats.inserted, 0);
    assert!(runner.store().inner.snapshot().is_empty());
    assert!(!scheduler.cancel());

    scheduler.shutdown();
}

#[test]
fn shutdown_leaves_other_passes_alone() {
    let (runner, entered, release) = gated_runner();
    let mut scheduler = SyncScheduler::start(Arc::clone(&runner), account());

    let outside = {
        let runner = Arc::clone(&runner);
        thread::spawn(move || runner.run_sync(&account()))
    };
    entered.recv_timeout(WAIT).unwrap();

    // The pass belongs to another caller, not to the idle scheduler.
    assert!(!scheduler.cancel());
    scheduler.shutdown();
    release.send(()).unwrap();

    let report = outside.join().unwrap().unwrap();
    assert_eq!(report.outcome, PassOutcome::Completed);
    assert_eq!(report.stats.inserted, 1);
}
