//! Remote side abstractions: where contacts and accounts come from.

use contactsync_model::{RemoteAccount, RemoteContact};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Result type for remote source calls.
pub type SourceResult<T> = Result<T, SourceError>;

/// Errors reported by a remote source or account resolver.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    /// The remote could not be reached.
    #[error("remote unavailable: {0}")]
    Unavailable(String),

    /// The remote rejected the session credentials.
    #[error("remote rejected credentials: {0}")]
    Unauthorized(String),

    /// The remote returned data that could not be decoded.
    #[error("invalid remote data: {0}")]
    InvalidData(String),
}

/// A source of decrypted remote contacts.
///
/// Implementations return the full contact set of one remote account.
/// Contacts without an external id may be included; the runner discards
/// them before reconciliation.
pub trait RemoteSource: Send + Sync {
    /// Lists every contact of the remote account `account_id`.
    fn list_contacts(&self, account_id: &str) -> SourceResult<Vec<RemoteContact>>;
}

/// Resolves the remote accounts the current session can see.
pub trait AccountResolver: Send + Sync {
    /// Returns the accounts of the current session.
    fn current_accounts(&self) -> SourceResult<Vec<RemoteAccount>>;
}

impl<T: RemoteSource + ?Sized> RemoteSource for Arc<T> {
    fn list_contacts(&self, account_id: &str) -> SourceResult<Vec<RemoteContact>> {
        (**self).list_contacts(account_id)
    }
}

impl<T: AccountResolver + ?Sized> AccountResolver for Arc<T> {
    fn current_accounts(&self) -> SourceResult<Vec<RemoteAccount>> {
        (**self).current_accounts()
    }
}

/// An in-memory remote that serves as both source and resolver.
///
/// Used by tests and by the CLI, which loads it from a JSON snapshot.
#[derive(Debug, Default)]
pub struct StaticRemote {
    accounts: RwLock<Vec<RemoteAccount>>,
    contacts: RwLock<HashMap<String, Vec<RemoteContact>>>,
    failure: RwLock<Option<SourceError>>,
    fetches: AtomicU64,
}

impl StaticRemote {
    /// Creates an empty remote with no accounts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a remote from accounts and their contacts.
    pub fn from_parts(
        accounts: Vec<RemoteAccount>,
        contacts: HashMap<String, Vec<RemoteContact>>,
    ) -> Self {
        Self {
            accounts: RwLock::new(accounts),
            contacts: RwLock::new(contacts),
            ..Self::default()
        }
    }

    /// Adds an account holding `contacts`.
    #[must_use]
    pub fn with_account(self, account: RemoteAccount, contacts: Vec<RemoteContact>) -> Self {
        self.set_contacts(&account.account_id, contacts);
        self.accounts.write().push(account);
        self
    }

    /// Replaces the contacts of `account_id`.
    pub fn set_contacts(&self, account_id: &str, contacts: Vec<RemoteContact>) {
        self.contacts.write().insert(account_id.to_string(), contacts);
    }

    /// Makes every call fail with `error` until cleared with `None`.
    pub fn set_failure(&self, error: Option<SourceError>) {
        *self.failure.write() = error;
    }

    /// Returns how many times contacts were listed.
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> SourceResult<()> {
        match self.failure.read().as_ref() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl RemoteSource for StaticRemote {
    fn list_contacts(&self, account_id: &str) -> SourceResult<Vec<RemoteContact>> {
        self.check_failure()?;
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .contacts
            .read()
            .get(account_id)
            .cloned()
            .unwrap_or_default())
    }
}

impl AccountResolver for StaticRemote {
    fn current_accounts(&self) -> SourceResult<Vec<RemoteAccount>> {
        self.check_failure()?;
        Ok(self.accounts.read().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_remote_serves_contacts_per_account() {
        let remote = StaticRemote::new()
            .with_account(
                RemoteAccount::new("acc-1", "alice@example.com"),
                vec![RemoteContact::new("u1")],
            )
            .with_account(RemoteAccount::new("acc-2", "bob@example.com"), vec![]);

        assert_eq!(remote.current_accounts().unwrap().len(), 2);
        assert_eq!(remote.list_contacts("acc-1").unwrap().len(), 1);
        assert!(remote.list_contacts("acc-2").unwrap().is_empty());
        assert!(remote.list_contacts("unknown").unwrap().is_empty());
        assert_eq!(remote.fetch_count(), 3);
    }

    #[test]
    fn static_remote_failure() {
        let remote = StaticRemote::new();
        remote.set_failure(Some(SourceError::Unavailable("offline".into())));

        assert_eq!(
            remote.current_accounts(),
            Err(SourceError::Unavailable("offline".into()))
        );
        assert!(remote.list_contacts("acc-1").is_err());
        assert_eq!(remote.fetch_count(), 0);

        remote.set_failure(None);
        assert!(remote.current_accounts().is_ok());
    }

    #[test]
    fn arc_delegates() {
        let remote = Arc::new(StaticRemote::new().with_account(
            RemoteAccount::new("acc-1", "alice@example.com"),
            vec![RemoteContact::new("u1")],
        ));
        let source: &dyn RemoteSource = &remote;
        assert_eq!(source.list_contacts("acc-1").unwrap().len(), 1);
        assert_eq!(remote.fetch_count(), 1);
    }
}
