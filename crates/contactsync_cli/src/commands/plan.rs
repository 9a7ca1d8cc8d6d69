//! Plan command implementation.

use crate::snapshot::RemoteSnapshot;
use contactsync_engine::{BatchPlan, SyncConfig, SyncRunner};
use contactsync_store::FileStore;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Batches a pass would apply.
#[derive(Debug, Serialize)]
pub struct PlanOutput {
    /// Account the plan is for.
    pub account: String,
    /// False if no remote account matches.
    pub account_found: bool,
    /// Contacts that would be inserted.
    pub inserts: usize,
    /// Contacts that would be replaced.
    pub updates: usize,
    /// Stale contacts that would be deleted.
    pub deletes: usize,
    /// Batches in apply order.
    pub batches: Vec<BatchOutput>,
}

/// One planned batch.
#[derive(Debug, Serialize)]
pub struct BatchOutput {
    /// What the batch does.
    pub purpose: String,
    /// Number of operations.
    pub operations: usize,
}

impl PlanOutput {
    fn new(account: String, plan: Option<BatchPlan>) -> Self {
        let Some(plan) = plan else {
            return Self {
                account,
                account_found: false,
                inserts: 0,
                updates: 0,
                deletes: 0,
                batches: Vec::new(),
            };
        };
        Self {
            account,
            account_found: true,
            inserts: plan.planned_inserts(),
            updates: plan.planned_updates(),
            deletes: plan.planned_deletes(),
            batches: plan
                .into_iter()
                .map(|batch| BatchOutput {
                    purpose: batch.purpose.to_string(),
                    operations: batch.operations.len(),
                })
                .collect(),
        }
    }
}

/// Computes the plan of a pass without applying it.
pub fn execute(
    store_path: &Path,
    remote_path: &Path,
    config: SyncConfig,
    account_name: &str,
) -> Result<PlanOutput, Box<dyn std::error::Error>> {
    let remote = Arc::new(RemoteSnapshot::load(remote_path)?.into_remote());
    let store = FileStore::open(store_path)?;
    let account = config.account(account_name);

    let runner = SyncRunner::new(config, Arc::clone(&remote), remote, store);
    let plan = runner.plan(&account)?;
    Ok(PlanOutput::new(account.to_string(), plan))
}

/// Runs the plan command.
pub fn run(
    store_path: &Path,
    remote_path: &Path,
    config: SyncConfig,
    account_name: &str,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = execute(store_path, remote_path, config, account_name)?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&output)?),
        _ => print_text_output(&output),
    }
    Ok(())
}

fn print_text_output(output: &PlanOutput) {
    println!("Sync plan for {}", output.account);
    if !output.account_found {
        println!("  No remote account matches; nothing would change.");
        return;
    }
    println!(
        "  {} inserts, {} updates, {} deletes in {} batches",
        output.inserts,
        output.updates,
        output.deletes,
        output.batches.len()
    );
    for (index, batch) in output.batches.iter().enumerate() {
        println!(
            "  {:>4}. {} ({} operations)",
            index + 1,
            batch.purpose,
            batch.operations
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contactsync_store::LocalStore;
    use contactsync_testkit::{
        account, minimal_contact, remote_account, seed_mirror, TEST_ACCOUNT_NAME,
    };
    use tempfile::tempdir;

    #[test]
    fn plan_lists_batches_without_applying() {
        let dir = tempdir().unwrap();
        let remote_path = dir.path().join("remote.json");
        let store_path = dir.path().join("contacts.cbor");

        let snapshot = RemoteSnapshot {
            accounts: vec![remote_account()],
            contacts: [(
                remote_account().account_id,
                vec![minimal_contact("keep"), minimal_contact("new")],
            )]
            .into_iter()
            .collect(),
        };
        std::fs::write(&remote_path, serde_json::to_vec(&snapshot).unwrap()).unwrap();
        {
            let store = FileStore::open(&store_path).unwrap();
            seed_mirror(&store, &account(), &["keep", "gone"]);
        }

        let output = execute(&store_path, &remote_path, SyncConfig::default(), TEST_ACCOUNT_NAME)
            .unwrap();
        assert!(output.account_found);
        assert_eq!((output.inserts, output.updates, output.deletes), (1, 1, 1));
        let purposes: Vec<&str> = output.batches.iter().map(|b| b.purpose.as_str()).collect();
        assert_eq!(
            purposes,
            vec![
                "deletion of 1 stale contacts",
                "replace-delete of keep",
                "re-insert of keep",
                "insert of new",
            ]
        );

        let store = FileStore::open(&store_path).unwrap();
        assert_eq!(store.query_managed_records(&account()).unwrap().len(), 2);
    }
}
