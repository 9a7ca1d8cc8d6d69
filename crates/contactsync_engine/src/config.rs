//! Configuration for the sync engine.

use contactsync_model::AccountKey;
use std::time::Duration;

/// Default account type registered on the host.
pub const DEFAULT_ACCOUNT_TYPE: &str = "contactsync";

/// Default interval between periodic passes.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(6 * 60 * 60);

/// Configuration for sync passes.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Account type the mirrored contacts are filed under.
    pub account_type: String,
    /// Interval between periodic passes.
    pub sync_interval: Duration,
    /// Whether a scheduler runs a pass as soon as it starts.
    pub sync_on_start: bool,
}

impl SyncConfig {
    /// Creates a new sync configuration.
    pub fn new(account_type: impl Into<String>) -> Self {
        Self {
            account_type: account_type.into(),
            sync_interval: DEFAULT_SYNC_INTERVAL,
            sync_on_start: false,
        }
    }

    /// Sets the periodic interval.
    ///
    /// A scheduler treats an interval too large to add to the current time
    /// as "never" and only runs passes on request.
    pub fn with_sync_interval(mut self, interval: Duration) -> Self {
        self.sync_interval = interval;
        self
    }

    /// Sets whether a scheduler syncs immediately on start.
    pub fn with_sync_on_start(mut self, enabled: bool) -> Self {
        self.sync_on_start = enabled;
        self
    }

    /// Returns the host account key for `name` under the configured type.
    pub fn account(&self, name: impl Into<String>) -> AccountKey {
        AccountKey::new(name, self.account_type.clone())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ACCOUNT_TYPE)
    }
}
