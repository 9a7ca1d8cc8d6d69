//! Sync command implementation.

use crate::snapshot::RemoteSnapshot;
use contactsync_engine::{SyncConfig, SyncReport, SyncRunner};
use contactsync_store::FileStore;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Printable summary of one pass.
#[derive(Debug, Serialize)]
pub struct ReportOutput {
    /// Pass id.
    pub pass_id: String,
    /// Account the pass ran for.
    pub account: String,
    /// How the pass ended.
    pub outcome: String,
    /// Contacts inserted.
    pub inserted: u64,
    /// Contacts replaced.
    pub updated: u64,
    /// Stale contacts deleted.
    pub deleted: u64,
    /// Batches that did not apply.
    pub failed_batches: u64,
    /// Duration in milliseconds.
    pub duration_ms: u64,
}

impl ReportOutput {
    /// Builds the summary of `report`.
    pub fn new(account: &str, report: &SyncReport) -> Self {
        Self {
            pass_id: report.pass_id.to_string(),
            account: account.to_string(),
            outcome: report.outcome.to_string(),
            inserted: report.stats.inserted,
            updated: report.stats.updated,
            deleted: report.stats.deleted,
            failed_batches: report.stats.failed_batches,
            duration_ms: report.duration.as_millis() as u64,
        }
    }

    /// Prints the summary in `format`.
    pub fn print(&self, format: &str) -> Result<(), Box<dyn std::error::Error>> {
        match format {
            "json" => println!("{}", serde_json::to_string_pretty(self)?),
            _ => {
                println!("Sync pass {} for {}", self.pass_id, self.account);
                println!("  Outcome:        {}", self.outcome);
                println!("  Inserted:       {}", self.inserted);
                println!("  Updated:        {}", self.updated);
                println!("  Deleted:        {}", self.deleted);
                println!("  Failed batches: {}", self.failed_batches);
                println!("  Duration:       {} ms", self.duration_ms);
            }
        }
        Ok(())
    }
}

/// Runs one pass from `remote_path` into the store at `store_path`.
pub fn execute(
    store_path: &Path,
    remote_path: &Path,
    config: SyncConfig,
    account_name: &str,
) -> Result<ReportOutput, Box<dyn std::error::Error>> {
    let remote = Arc::new(RemoteSnapshot::load(remote_path)?.into_remote());
    let store = FileStore::open(store_path)?;
    let account = config.account(account_name);

    let runner = SyncRunner::new(config, Arc::clone(&remote), remote, store);
    let report = runner.run_sync(&account)?;
    Ok(ReportOutput::new(&account.to_string(), &report))
}

/// Runs the sync command.
pub fn run(
    store_path: &Path,
    remote_path: &Path,
    config: SyncConfig,
    account_name: &str,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    execute(store_path, remote_path, config, account_name)?.print(format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contactsync_model::{LocalId, RemoteContact};
    use contactsync_store::LocalStore;
    use contactsync_testkit::{account, remote_account, sample_contact, TEST_ACCOUNT_NAME};
    use tempfile::tempdir;

    fn write_snapshot(path: &Path, contacts: Vec<RemoteContact>) {
        let snapshot = RemoteSnapshot {
            accounts: vec![remote_account()],
            contacts: [(remote_account().account_id, contacts)].into_iter().collect(),
        };
        std::fs::write(path, serde_json::to_vec(&snapshot).unwrap()).unwrap();
    }

    #[test]
    fn sync_twice_replaces_and_deletes() {
        let dir = tempdir().unwrap();
        let remote = dir.path().join("remote.json");
        let store = dir.path().join("contacts.cbor");

        write_snapshot(&remote, vec![sample_contact("u1"), sample_contact("u2")]);
        let first = execute(&store, &remote, SyncConfig::default(), TEST_ACCOUNT_NAME).unwrap();
        assert_eq!(first.inserted, 2);
        assert_eq!(first.outcome, "completed");

        write_snapshot(&remote, vec![sample_contact("u2")]);
        let second = execute(&store, &remote, SyncConfig::default(), TEST_ACCOUNT_NAME).unwrap();
        assert_eq!(second.updated, 1);
        assert_eq!(second.deleted, 1);

        let store = FileStore::open(&store).unwrap();
        let records = store.query_managed_records(&account()).unwrap();
        assert_eq!(records.len(), 1);
        assert_ne!(records[0].local_id, LocalId(2));
    }

    #[test]
    fn unknown_account_reports_not_found() {
        let dir = tempdir().unwrap();
        let remote = dir.path().join("remote.json");
        write_snapshot(&remote, vec![sample_contact("u1")]);

        let output = execute(
            &dir.path().join("contacts.cbor"),
            &remote,
            SyncConfig::default(),
            "nobody@example.com",
        )
        .unwrap();
        assert_eq!(output.outcome, "account not found");
        assert_eq!(output.inserted, 0);
    }
}
