//! Inspect command implementation.

use contactsync_model::{AccountKey, FieldKind};
use contactsync_store::{FileStore, LocalStore, StoredContact};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Store inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Snapshot path.
    pub path: String,
    /// Account inspected.
    pub account: String,
    /// Contacts created by sync passes.
    pub managed_count: usize,
    /// Contacts created by hand.
    pub unmanaged_count: usize,
    /// Number of field rows per kind.
    pub field_counts: BTreeMap<String, usize>,
    /// Contacts (if requested).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contacts: Option<Vec<StoredContact>>,
}

/// Inspects the contacts of `account` in the store at `path`.
pub fn execute(
    path: &Path,
    account: &AccountKey,
    show_contacts: bool,
) -> Result<InspectResult, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("No contact store found at {}", path.display()).into());
    }

    let store = FileStore::open(path)?;
    let contacts = store.list_contacts(account)?;

    let managed_count = contacts
        .iter()
        .filter(|contact| contact.external_id.is_some())
        .count();
    let mut field_counts: BTreeMap<String, usize> = BTreeMap::new();
    for field in contacts.iter().flat_map(|contact| &contact.fields) {
        let kind: FieldKind = field.kind();
        *field_counts.entry(kind.to_string()).or_default() += 1;
    }

    Ok(InspectResult {
        path: path.display().to_string(),
        account: account.to_string(),
        managed_count,
        unmanaged_count: contacts.len() - managed_count,
        field_counts,
        contacts: show_contacts.then_some(contacts),
    })
}

/// Runs the inspect command.
pub fn run(
    path: &Path,
    account: &AccountKey,
    show_contacts: bool,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = execute(path, account, show_contacts)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

fn print_text_output(result: &InspectResult) {
    println!("Contact store: {}", result.path);
    println!("Account:       {}", result.account);
    println!();
    println!("Contacts:");
    println!("  Managed:   {}", result.managed_count);
    println!("  Unmanaged: {}", result.unmanaged_count);

    if !result.field_counts.is_empty() {
        println!();
        println!("Fields:");
        for (kind, count) in &result.field_counts {
            println!("  {kind:<13} {count}");
        }
    }

    if let Some(contacts) = &result.contacts {
        println!();
        for contact in contacts {
            println!(
                "#{} {}",
                contact.local_id,
                contact.external_id.as_deref().unwrap_or("(unmanaged)")
            );
            for field in &contact.fields {
                println!("    {}", field.summary());
            }
        }
    }
}
