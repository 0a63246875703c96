//! Lock backend configuration.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::backend::{LockError, LockResult, LockStore};
use super::memory::InMemoryLockStore;
use super::{LockManager, DEFAULT_LOCK_KEY, DEFAULT_LOCK_TTL};

/// Where the lock record lives.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LockBackendType {
    /// Process-local; only coordinates sessions inside one service instance.
    #[default]
    Memory,
    /// Shared Redis key; coordinates every instance pointed at the same server.
    Redis,
}

impl LockBackendType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "mem" | "local" => Some(Self::Memory),
            "redis" => Some(Self::Redis),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Redis => "redis",
        }
    }

    /// Whether separate processes observe the same lock record.
    pub fn is_shared(&self) -> bool {
        matches!(self, Self::Redis)
    }
}

/// How a session gives the lock back.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseMode {
    /// Delete the key regardless of who holds it.
    #[default]
    Unconditional,
    /// Delete only if the key still carries this session's token.
    Fenced,
}

impl ReleaseMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "unconditional" | "delete" => Some(Self::Unconditional),
            "fenced" | "compare" => Some(Self::Fenced),
            _ => None,
        }
    }
}

/// Lock configuration (`[lock]` table).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockConfig {
    #[serde(default)]
    pub backend: LockBackendType,

    /// Redis connection URL, required when `backend = "redis"`.
    #[serde(default)]
    pub redis_url: Option<String>,

    #[serde(default = "default_key")]
    pub key: String,

    /// Crash-recovery expiry in seconds.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    #[serde(default)]
    pub release: ReleaseMode,
}

fn default_key() -> String {
    DEFAULT_LOCK_KEY.to_string()
}

fn default_ttl_secs() -> u64 {
    DEFAULT_LOCK_TTL.as_secs()
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            backend: LockBackendType::default(),
            redis_url: None,
            key: default_key(),
            ttl_secs: default_ttl_secs(),
            release: ReleaseMode::default(),
        }
    }
}

impl LockConfig {
    /// Apply `LOCK_BACKEND`, `REDIS_URL`, `LOCK_TTL_SECS` and `LOCK_RELEASE`.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = env::var("LOCK_BACKEND") {
            if let Some(backend) = LockBackendType::from_str(&val) {
                self.backend = backend;
            }
        }

        // A Redis URL on its own is enough to opt into the shared backend
        if let Ok(url) = env::var("REDIS_URL") {
            if !url.is_empty() {
                if env::var("LOCK_BACKEND").is_err() {
                    self.backend = LockBackendType::Redis;
                }
                self.redis_url = Some(url);
            }
        }

        if let Ok(val) = env::var("LOCK_TTL_SECS") {
            if let Ok(secs) = val.parse::<u64>() {
                if secs > 0 {
                    self.ttl_secs = secs;
                }
            }
        }

        if let Ok(val) = env::var("LOCK_RELEASE") {
            if let Some(mode) = ReleaseMode::from_str(&val) {
                self.release = mode;
            }
        }

        self
    }

    /// Fail unless the backend is visible to other processes.
    pub fn require_shared(&self) -> LockResult<()> {
        if self.backend.is_shared() {
            Ok(())
        } else {
            Err(LockError::ProcessLocal {
                backend: self.backend.as_str().to_string(),
            })
        }
    }

    /// Log when sessions in other processes will not be excluded.
    pub fn warn_if_process_local(&self) {
        if !self.backend.is_shared() {
            tracing::warn!(
                "Browser lock uses the {} backend; sessions in other processes are not excluded. \
                 Set LOCK_BACKEND=redis and REDIS_URL for cross-process exclusion",
                self.backend.as_str()
            );
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs.max(1))
    }

    /// Build the configured store and wrap it in a manager.
    pub async fn build(&self) -> LockResult<LockManager> {
        let store = create_store(self).await?;
        Ok(LockManager::new(store)
            .with_key(self.key.clone())
            .with_ttl(self.ttl())
            .with_release_mode(self.release))
    }
}

async fn create_store(config: &LockConfig) -> LockResult<Arc<dyn LockStore>> {
    match config.backend {
        LockBackendType::Memory => {
            tracing::debug!("Using in-memory browser lock");
            Ok(Arc::new(InMemoryLockStore::new()))
        }
        #[cfg(feature = "redis-backend")]
        LockBackendType::Redis => {
            let url = config.redis_url.as_deref().ok_or_else(|| {
                LockError::Store("lock backend is redis but no REDIS_URL is set".to_string())
            })?;
            tracing::debug!("Using Redis browser lock at {}", url);
            let store = super::redis::RedisLockStore::new(url).await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "redis-backend"))]
        LockBackendType::Redis => Err(LockError::Store(
            "Redis support not compiled. Rebuild with: cargo build --features redis-backend"
                .to_string(),
        )),
    }
}
