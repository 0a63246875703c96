//! Pluggable key-value store behind the browser lock.
//!
//! Allows swapping between in-memory (single process, tests) and Redis
//! (shared across independent service instances).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result type for lock operations.
pub type LockResult<T> = Result<T, LockError>;

/// Errors from lock operations.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    /// Another session holds the lock. Callers should retry later.
    #[error("Lock '{key}' is held by another browser session")]
    Held { key: String },
    #[error("Lock store unavailable: {0}")]
    Store(String),
    /// The configured store cannot see locks held by other processes.
    #[error("Lock backend '{backend}' is process-local; set LOCK_BACKEND=redis and REDIS_URL to reach the shared lock")]
    ProcessLocal { backend: String },
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for LockError {
    fn from(e: serde_json::Error) -> Self {
        LockError::Serialization(e.to_string())
    }
}

/// Value stored under the lock key while a session is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockRecord {
    pub resource_id: String,
    pub acquired_at_epoch_millis: i64,
    /// Unique per acquisition; only consulted by fenced release.
    #[serde(default)]
    pub token: String,
}

impl LockRecord {
    pub fn new(resource_id: &str) -> Self {
        Self {
            resource_id: resource_id.to_string(),
            acquired_at_epoch_millis: chrono::Utc::now().timestamp_millis(),
            token: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// Trait for lock storage backends.
///
/// `set_if_absent` must be atomic: of any number of concurrent callers for the
/// same key, at most one observes `true` until the key is deleted or expires.
#[async_trait]
pub trait LockStore: Send + Sync {
    /// Store `value` under `key` with a TTL only if the key is absent.
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> LockResult<bool>;

    /// Read the current value, if any unexpired value exists.
    async fn get(&self, key: &str) -> LockResult<Option<String>>;

    /// Delete the key unconditionally.
    async fn delete(&self, key: &str) -> LockResult<()>;

    /// Delete the key only if it still holds `expected`. Returns whether it was deleted.
    async fn delete_if_value(&self, key: &str, expected: &str) -> LockResult<bool>;
}
