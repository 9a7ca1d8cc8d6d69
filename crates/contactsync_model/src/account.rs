//! Account identities.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Host-level account identity that scopes every local store access.
///
/// Two accounts with the same name but different types are distinct: the
/// local store keeps their contacts apart and a sync pass for one never
/// touches the other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountKey {
    /// Account name, usually the login e-mail address.
    pub name: String,
    /// Account type.
    pub account_type: String,
}

impl AccountKey {
    /// Creates a new account key.
    pub fn new(name: impl Into<String>, account_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            account_type: account_type.into(),
        }
    }
}

impl fmt::Display for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.account_type)
    }
}

/// An account known to the remote side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAccount {
    /// Externally authoritative account id, used to list remote contacts.
    pub account_id: String,
    /// Login identity of the account.
    pub email: String,
}

impl RemoteAccount {
    /// Creates a new remote account.
    pub fn new(account_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            email: email.into(),
        }
    }

    /// Returns true if this account is the one registered on the host as `key`.
    ///
    /// The host account name may carry either the login e-mail or the
    /// remote account id.
    pub fn matches(&self, key: &AccountKey) -> bool {
        self.email == key.name || self.account_id == key.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_by_email_or_id() {
        let account = RemoteAccount::new("user-1", "alice@example.com");

        assert!(account.matches(&AccountKey::new("alice@example.com", "contacts")));
        assert!(account.matches(&AccountKey::new("user-1", "contacts")));
        assert!(!account.matches(&AccountKey::new("bob@example.com", "contacts")));
    }

    #[test]
    fn account_key_display() {
        let key = AccountKey::new("alice@example.com", "contactsync");
        assert_eq!(key.to_string(), "alice@example.com (contactsync)");
    }
}
