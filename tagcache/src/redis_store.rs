//! Redis store implementation.

use crate::config::{self, CacheConfig};
use crate::error::{CacheError, CacheResult};
use crate::traits::CacheStore;
use async_trait::async_trait;
use parking_lot::RwLock;
use redis::{AsyncCommands, Client, RedisError, aio::ConnectionManager};
use std::time::Duration;
use tracing::debug;

/// Redis-backed store.
///
/// Values are plain Redis strings and tags are Redis sets. When a key prefix
/// is configured it is applied to every key and tag set, while set members
/// keep the caller's unprefixed keys.
pub struct RedisStore {
    connection: RwLock<Option<ConnectionManager>>,
    key_prefix: Option<String>,
}

impl RedisStore {
    /// Connect to Redis.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tagcache::*;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), CacheError> {
    ///     let config = CacheConfig::redis("redis://localhost:6379")?;
    ///     let store = RedisStore::connect(&config).await?;
    ///     store.ping().await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn connect(config: &CacheConfig) -> CacheResult<Self> {
        let client =
            Client::open(config.url.as_str()).map_err(|e| CacheError::InvalidUrl(e.to_string()))?;

        let connection =
            tokio::time::timeout(config.connection_timeout, ConnectionManager::new(client))
                .await
                .map_err(|_| CacheError::Timeout)?
                .map_err(|e| CacheError::Connection(e.to_string()))?;

        debug!(url = %config.url, prefix = ?config.key_prefix, "Connected to Redis");

        Ok(Self::from_connection(connection, config.key_prefix.clone()))
    }

    /// Wrap an existing connection manager.
    pub fn from_connection(connection: ConnectionManager, key_prefix: Option<String>) -> Self {
        Self {
            connection: RwLock::new(Some(connection)),
            key_prefix,
        }
    }

    fn connection(&self) -> CacheResult<ConnectionManager> {
        self.connection
            .read()
            .clone()
            .ok_or_else(|| CacheError::Connection("store closed".to_string()))
    }

    fn build_key(&self, key: &str) -> String {
        config::build_key(self.key_prefix.as_deref(), key)
    }
}

/// How a value's TTL is sent to Redis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueExpiry {
    /// Plain SET.
    Persist,
    /// SETEX with whole seconds.
    Seconds(u64),
    /// PSETEX with milliseconds, at least one.
    Millis(u64),
}

impl ValueExpiry {
    fn from_ttl(ttl: Option<Duration>) -> Self {
        match ttl.filter(|ttl| !ttl.is_zero()) {
            None => Self::Persist,
            Some(ttl) if ttl.as_secs() > 0 && ttl.subsec_nanos() == 0 => {
                Self::Seconds(ttl.as_secs())
            }
            Some(ttl) => Self::Millis(u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)),
        }
    }
}

/// EXPIRE seconds for a TTL; sub-second TTLs round up to one second.
fn expire_seconds(ttl: Duration) -> i64 {
    let secs = ttl.as_secs().saturating_add(u64::from(ttl.subsec_nanos() > 0));
    i64::try_from(secs).unwrap_or(i64::MAX).max(1)
}

fn is_connection_failure(err: &RedisError) -> bool {
    err.is_io_error()
        || err.is_connection_refusal()
        || err.is_connection_dropped()
        || err.is_timeout()
}

fn read_error(err: RedisError) -> CacheError {
    if is_connection_failure(&err) {
        CacheError::Connection(err.to_string())
    } else {
        CacheError::StoreRead(err.to_string())
    }
}

fn write_error(err: RedisError) -> CacheError {
    if is_connection_failure(&err) {
        CacheError::Connection(err.to_string())
    } else {
        CacheError::StoreWrite(err.to_string())
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn ping(&self) -> CacheResult<()> {
        let mut conn = self.connection()?;
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let key = self.build_key(key);
        let mut conn = self.connection()?;

        let value: Option<Vec<u8>> = conn.get(&key).await.map_err(read_error)?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> CacheResult<()> {
        let key = self.build_key(key);
        let mut conn = self.connection()?;

        match ValueExpiry::from_ttl(ttl) {
            ValueExpiry::Seconds(seconds) => {
                let _: () = conn
                    .set_ex(&key, value, seconds)
                    .await
                    .map_err(write_error)?;
            }
            ValueExpiry::Millis(millis) => {
                let _: () = conn
                    .pset_ex(&key, value, millis)
                    .await
                    .map_err(write_error)?;
            }
            ValueExpiry::Persist => {
                let _: () = conn.set(&key, value).await.map_err(write_error)?;
            }
        }

        Ok(())
    }

    async fn delete(&self, keys: &[&str]) -> CacheResult<u64> {
        if keys.is_empty() {
            return Ok(0);
        }

        let keys: Vec<String> = keys.iter().map(|key| self.build_key(key)).collect();
        let mut conn = self.connection()?;
        let removed: u64 = conn.del(&keys).await.map_err(write_error)?;
        Ok(removed)
    }

    async fn set_members(&self, set_key: &str) -> CacheResult<Vec<String>> {
        let set_key = self.build_key(set_key);
        let mut conn = self.connection()?;
        let members: Vec<String> = conn.smembers(&set_key).await.map_err(read_error)?;
        Ok(members)
    }

    async fn add_to_set(&self, set_key: &str, members: &[&str]) -> CacheResult<u64> {
        if members.is_empty() {
            return Ok(0);
        }

        let set_key = self.build_key(set_key);
        let mut conn = self.connection()?;
        let added: u64 = conn
            .sadd(&set_key, members.to_vec())
            .await
            .map_err(write_error)?;
        Ok(added)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> CacheResult<bool> {
        let key = self.build_key(key);
        let mut conn = self.connection()?;
        let exists: bool = conn
            .expire(&key, expire_seconds(ttl))
            .await
            .map_err(write_error)?;
        Ok(exists)
    }

    async fn flush_all(&self) -> CacheResult<()> {
        let mut conn = self.connection()?;
        let _: () = redis::cmd("FLUSHALL")
            .query_async(&mut conn)
            .await
            .map_err(write_error)?;
        Ok(())
    }

    /// Drop this store's handle to the connection manager. Clones of the
    /// manager held elsewhere stay connected. Closing twice is an error.
    async fn close(&self) -> CacheResult<()> {
        match self.connection.write().take() {
            Some(_) => {
                debug!("Closed Redis connection");
                Ok(())
            }
            None => Err(CacheError::Connection("store already closed".to_string())),
        }
    }
}
