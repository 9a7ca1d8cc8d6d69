//! Remote snapshot files.
//!
//! A snapshot is a JSON document holding the remote accounts and their
//! decrypted contacts:
//!
//! ```json
//! {
//!   "accounts": [{ "account_id": "acc-1", "email": "alice@example.com" }],
//!   "contacts": { "acc-1": [{ "id": "u1", "formatted_name": "Bob" }] }
//! }
//! ```

use contactsync_engine::StaticRemote;
use contactsync_model::{RemoteAccount, RemoteContact};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Remote accounts and contacts loaded from disk.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSnapshot {
    /// Accounts visible to the session.
    pub accounts: Vec<RemoteAccount>,
    /// Contacts per remote account id.
    pub contacts: HashMap<String, Vec<RemoteContact>>,
}

impl RemoteSnapshot {
    /// Reads a snapshot from `path`.
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let file = File::open(path)
            .map_err(|e| format!("cannot open remote snapshot {}: {e}", path.display()))?;
        let snapshot: Self = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| format!("invalid remote snapshot {}: {e}", path.display()))?;
        Ok(snapshot)
    }

    /// Returns a remote serving this snapshot.
    pub fn into_remote(self) -> StaticRemote {
        StaticRemote::from_parts(self.accounts, self.contacts)
    }
}
