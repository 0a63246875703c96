//! Redis-backed lock store for distributed multi-process coordination.
//!
//! Acquisition is a single `SET key value NX PX ttl`; Redis expiry is the
//! crash-recovery path for holders that never release.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};

use super::backend::{LockError, LockResult, LockStore};

/// Compare-and-delete used by fenced release.
const DELETE_IF_VALUE_SCRIPT: &str = r#"
    if redis.call('GET', KEYS[1]) == ARGV[1] then
        return redis.call('DEL', KEYS[1])
    else
        return 0
    end
"#;

/// Redis-backed lock storage.
#[derive(Clone)]
pub struct RedisLockStore {
    conn: ConnectionManager,
}

impl RedisLockStore {
    /// Connect to Redis.
    ///
    /// # Arguments
    /// * `redis_url` - Redis connection URL (e.g., "redis://localhost:6379")
    pub async fn new(redis_url: &str) -> LockResult<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| LockError::Store(format!("Redis connection error: {}", e)))?;

        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| LockError::Store(format!("Redis connection manager error: {}", e)))?;

        Ok(Self { conn })
    }
}

#[async_trait]
impl LockStore for RedisLockStore {
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> LockResult<bool> {
        let mut conn = self.conn.clone();

        // Reply is "OK" when set, nil when the key already exists
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("PX")
            .arg(ttl.as_millis().max(1) as u64)
            .query_async(&mut conn)
            .await
            .map_err(|e| LockError::Store(e.to_string()))?;

        Ok(reply.is_some())
    }

    async fn get(&self, key: &str) -> LockResult<Option<String>> {
        let mut conn = self.conn.clone();
        conn.get(key)
            .await
            .map_err(|e| LockError::Store(e.to_string()))
    }

    async fn delete(&self, key: &str) -> LockResult<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key)
            .await
            .map_err(|e| LockError::Store(e.to_string()))
    }

    async fn delete_if_value(&self, key: &str, expected: &str) -> LockResult<bool> {
        let mut conn = self.conn.clone();
        let deleted: i64 = Script::new(DELETE_IF_VALUE_SCRIPT)
            .key(key)
            .arg(expected)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| LockError::Store(e.to_string()))?;

        Ok(deleted == 1)
    }
}
