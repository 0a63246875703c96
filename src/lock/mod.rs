//! Distributed mutual exclusion for headless browser sessions.
//!
//! At most one browser session may run at a time across every service
//! instance sharing a store. Acquisition is a single conditional write with a
//! TTL and never waits: a held lock fails fast with [`LockError::Held`].
//! The TTL only matters when a holder dies without releasing.

mod backend;
mod config;
mod memory;
#[cfg(feature = "redis-backend")]
mod redis;

pub use backend::{LockError, LockRecord, LockResult, LockStore};
pub use config::{LockBackendType, LockConfig, ReleaseMode};
pub use memory::InMemoryLockStore;
#[cfg(feature = "redis-backend")]
pub use redis::RedisLockStore;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

/// Well-known key shared by every instance.
pub const DEFAULT_LOCK_KEY: &str = "jobscrape:browser-lock";

/// Crash-recovery expiry for a lock whose holder never released it.
pub const DEFAULT_LOCK_TTL: Duration = Duration::from_secs(5 * 60);

/// Proof of a successful acquisition, consumed by [`LockManager::release`].
#[derive(Debug)]
pub struct LockHandle {
    record: LockRecord,
    value: String,
}

impl LockHandle {
    pub fn record(&self) -> &LockRecord {
        &self.record
    }
}

/// Acquires and releases the browser lock against a [`LockStore`].
#[derive(Clone)]
pub struct LockManager {
    store: Arc<dyn LockStore>,
    key: String,
    ttl: Duration,
    release_mode: ReleaseMode,
}

impl LockManager {
    pub fn new(store: Arc<dyn LockStore>) -> Self {
        Self {
            store,
            key: DEFAULT_LOCK_KEY.to_string(),
            ttl: DEFAULT_LOCK_TTL,
            release_mode: ReleaseMode::Unconditional,
        }
    }

    /// Process-local manager, mostly for tests and single-instance runs.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryLockStore::new()))
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_release_mode(mut self, mode: ReleaseMode) -> Self {
        self.release_mode = mode;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Try to take the lock for `resource_id`. One conditional write, no retry.
    pub async fn acquire(&self, resource_id: &str) -> LockResult<LockHandle> {
        let record = LockRecord::new(resource_id);
        let value = serde_json::to_string(&record)?;

        if self.store.set_if_absent(&self.key, &value, self.ttl).await? {
            debug!("Acquired browser lock '{}' for {}", self.key, resource_id);
            Ok(LockHandle { record, value })
        } else {
            debug!("Browser lock '{}' busy, rejecting {}", self.key, resource_id);
            Err(LockError::Held {
                key: self.key.clone(),
            })
        }
    }

    /// Give the lock back. Store failures are logged and swallowed; the TTL
    /// reclaims the key if the delete never lands.
    pub async fn release(&self, handle: LockHandle) {
        let result = match self.release_mode {
            ReleaseMode::Unconditional => self.store.delete(&self.key).await.map(|_| true),
            ReleaseMode::Fenced => self.store.delete_if_value(&self.key, &handle.value).await,
        };

        match result {
            Ok(true) => debug!(
                "Released browser lock '{}' for {}",
                self.key, handle.record.resource_id
            ),
            Ok(false) => warn!(
                "Browser lock '{}' was no longer held by {} at release",
                self.key, handle.record.resource_id
            ),
            Err(e) => warn!(
                "Failed to release browser lock '{}' for {}: {}",
                self.key, handle.record.resource_id, e
            ),
        }
    }

    /// Inspect the current holder, if any.
    pub async fn current(&self) -> LockResult<Option<LockRecord>> {
        match self.store.get(&self.key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Delete the key without a handle. Operator escape hatch.
    pub async fn force_release(&self) -> LockResult<()> {
        self.store.delete(&self.key).await
    }
}
