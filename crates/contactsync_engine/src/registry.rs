//! Registry of running passes, one per account.

use contactsync_model::AccountKey;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag of one pass.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Tracks which accounts have a pass running.
///
/// A registry can be shared between runners so that two runners never
/// sync the same account at once.
#[derive(Debug, Default)]
pub struct PassRegistry {
    active: Mutex<HashMap<AccountKey, CancelToken>>,
}

impl PassRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a pass for `account`, or returns `None` if one is running.
    pub fn begin(&self, account: &AccountKey) -> Option<PassGuard<'_>> {
        let mut active = self.active.lock();
        if active.contains_key(account) {
            return None;
        }
        let token = CancelToken::new();
        active.insert(account.clone(), token.clone());
        Some(PassGuard {
            registry: self,
            account: account.clone(),
            token,
        })
    }

    /// Cancels the running pass of `account`. Returns false if none runs.
    pub fn cancel(&self, account: &AccountKey) -> bool {
        match self.active.lock().get(account) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancels every running pass.
    pub fn cancel_all(&self) {
        for token in self.active.lock().values() {
            token.cancel();
        }
    }

    /// Returns true if `account` has a pass running.
    pub fn is_running(&self, account: &AccountKey) -> bool {
        self.active.lock().contains_key(account)
    }
}

/// Registration of one running pass; unregisters on drop.
#[derive(Debug)]
pub struct PassGuard<'a> {
    registry: &'a PassRegistry,
    account: AccountKey,
    token: CancelToken,
}

impl PassGuard<'_> {
    /// Returns the cancellation token of this pass.
    pub fn token(&self) -> &CancelToken {
        &self.token
    }
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.registry.active.lock().remove(&self.account);
    }
}
