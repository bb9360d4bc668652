//! Cache store trait definition.

use crate::error::CacheResult;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Primitive operations a backing store must provide.
///
/// Values are opaque bytes; tags live in set-typed entries. Stores classify
/// their own failures into [`CacheError::Connection`],
/// [`CacheError::StoreRead`] and [`CacheError::StoreWrite`].
///
/// [`CacheError::Connection`]: crate::CacheError::Connection
/// [`CacheError::StoreRead`]: crate::CacheError::StoreRead
/// [`CacheError::StoreWrite`]: crate::CacheError::StoreWrite
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Check that the store is reachable.
    async fn ping(&self) -> CacheResult<()>;

    /// Get the raw bytes stored under a key.
    ///
    /// # Returns
    ///
    /// Returns `Ok(Some(bytes))` if the key exists, `Ok(None)` if not found,
    /// or an error if the operation fails.
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    /// Store raw bytes under a key.
    ///
    /// # Arguments
    ///
    /// * `key` - The cache key
    /// * `value` - The encoded value
    /// * `ttl` - Optional time-to-live; `None` or zero means no expiration
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> CacheResult<()>;

    /// Delete keys, returning how many existed.
    ///
    /// Deleting a missing key is not an error.
    async fn delete(&self, keys: &[&str]) -> CacheResult<u64>;

    /// Get every member of a set. A missing set is empty.
    async fn set_members(&self, set_key: &str) -> CacheResult<Vec<String>>;

    /// Add members to a set, returning how many were new.
    async fn add_to_set(&self, set_key: &str, members: &[&str]) -> CacheResult<u64>;

    /// Set the expiration of a key, returning whether the key exists.
    async fn expire(&self, key: &str, ttl: Duration) -> CacheResult<bool>;

    /// Remove every key from the store.
    ///
    /// **Warning:** This is not limited to keys written by this crate.
    async fn flush_all(&self) -> CacheResult<()>;

    /// Release the connection. Later operations fail.
    ///
    /// Whether a second close succeeds is up to the store: `RedisStore`
    /// reports it as a connection error, `InMemoryStore` accepts it.
    async fn close(&self) -> CacheResult<()>;
}

#[async_trait]
impl<S: CacheStore + ?Sized> CacheStore for Arc<S> {
    async fn ping(&self) -> CacheResult<()> {
        (**self).ping().await
    }

    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> CacheResult<()> {
        (**self).set(key, value, ttl).await
    }

    async fn delete(&self, keys: &[&str]) -> CacheResult<u64> {
        (**self).delete(keys).await
    }

    async fn set_members(&self, set_key: &str) -> CacheResult<Vec<String>> {
        (**self).set_members(set_key).await
    }

    async fn add_to_set(&self, set_key: &str, members: &[&str]) -> CacheResult<u64> {
        (**self).add_to_set(set_key, members).await
    }

    async fn expire(&self, key: &str, ttl: Duration) -> CacheResult<bool> {
        (**self).expire(key, ttl).await
    }

    async fn flush_all(&self) -> CacheResult<()> {
        (**self).flush_all().await
    }

    async fn close(&self) -> CacheResult<()> {
        (**self).close().await
    }
}
