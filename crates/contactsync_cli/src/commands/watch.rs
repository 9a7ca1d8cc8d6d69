//! Watch command implementation.
//!
//! Keeps a scheduler running until stdin is closed. Lines read from stdin
//! control it:
//!
//! - `sync` - request an expedited pass
//! - `cancel` - cancel the running pass

use crate::commands::sync::ReportOutput;
use crate::snapshot::RemoteSnapshot;
use contactsync_engine::{SyncConfig, SyncRunner, SyncScheduler, SyncTrigger};
use contactsync_store::FileStore;
use std::io::BufRead;
use std::path::Path;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::warn;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Runs the watch command.
pub fn run(
    store_path: &Path,
    remote_path: &Path,
    config: SyncConfig,
    account_name: &str,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let remote = Arc::new(RemoteSnapshot::load(remote_path)?.into_remote());
    let store = FileStore::open(store_path)?;
    let account = config.account(account_name);
    let label = account.to_string();

    let runner = Arc::new(SyncRunner::new(
        config.with_sync_on_start(true),
        Arc::clone(&remote),
        remote,
        store,
    ));
    let mut scheduler = SyncScheduler::start(runner, account);

    let (lines_tx, lines_rx) = mpsc::channel();
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if lines_tx.send(line).is_err() {
                break;
            }
        }
    });

    loop {
        print_reports(&scheduler, &label, format)?;
        match lines_rx.recv_timeout(POLL_INTERVAL) {
            Ok(line) => match line.trim() {
                "sync" => {
                    scheduler.request_sync(SyncTrigger::Manual { expedited: true });
                }
                "cancel" => {
                    if !scheduler.cancel() {
                        eprintln!("no sync pass is running");
                    }
                }
                "" => {}
                other => eprintln!("unknown command: {other} (expected sync or cancel)"),
            },
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    scheduler.shutdown();
    print_reports(&scheduler, &label, format)
}

fn print_reports(
    scheduler: &SyncScheduler,
    label: &str,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    while let Ok(scheduled) = scheduler.reports().try_recv() {
        match scheduled.result {
            Ok(report) => ReportOutput::new(label, &report).print(format)?,
            Err(err) => warn!(trigger = ?scheduled.trigger, error = %err, "scheduled pass failed"),
        }
    }
    Ok(())
}
