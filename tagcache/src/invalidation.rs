//! Tag-based cache invalidation

use crate::config::DEFAULT_TAG_TTL;
use crate::encoder::{Encoder, Encoding};
use crate::error::{CacheError, CacheResult};
use crate::traits::CacheStore;
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Options for [`TaggedCache::set`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// Time-to-live of the entry. `None` stores it without expiration.
    pub expiration: Option<Duration>,

    /// Tags the entry can later be invalidated by.
    pub tags: Vec<String>,
}

impl SetOptions {
    /// Options with no expiration and no tags.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the expiration.
    pub fn with_expiration(mut self, ttl: Duration) -> Self {
        self.expiration = Some(ttl);
        self
    }

    /// Add a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Add several tags.
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }
}

/// Store and encoder, only reachable through the cache's lock.
struct Inner<S, E> {
    store: S,
    encoder: E,
}

/// Cache with tag-based invalidation support.
///
/// Every tagged write also adds the key to one set per tag, so a whole tag
/// can be invalidated without scanning the keyspace. All operations on one
/// instance run one at a time: each holds the lock for its full duration,
/// store round trips included.
pub struct TaggedCache<S: CacheStore, E: Encoder = Encoding> {
    inner: Mutex<Inner<S, E>>,
    encoder_name: &'static str,
    tag_ttl: Duration,
}

impl<S: CacheStore, E: Encoder> TaggedCache<S, E> {
    /// Create new tagged cache
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tagcache::*;
    ///
    /// let tagged = TaggedCache::new(InMemoryStore::new(), JsonEncoder);
    /// assert_eq!(tagged.encoder_name(), "json");
    /// ```
    pub fn new(store: S, encoder: E) -> Self {
        Self {
            encoder_name: encoder.name(),
            inner: Mutex::new(Inner { store, encoder }),
            tag_ttl: DEFAULT_TAG_TTL,
        }
    }

    /// Override the TTL refreshed on a tag's member set by every tagged write.
    pub fn with_tag_ttl(mut self, ttl: Duration) -> Self {
        self.tag_ttl = ttl;
        self
    }

    /// TTL applied to tag member sets.
    pub fn tag_ttl(&self) -> Duration {
        self.tag_ttl
    }

    /// Name of the active encoder.
    pub fn encoder_name(&self) -> &'static str {
        self.encoder_name
    }

    /// Check that the store is reachable.
    pub async fn ping(&self) -> CacheResult<()> {
        let inner = self.inner.lock().await;
        inner.store.ping().await.map_err(|e| match e {
            CacheError::Connection(_) => e,
            other => CacheError::Connection(other.to_string()),
        })
    }

    /// Get a value.
    ///
    /// Fails with [`CacheError::NotFound`] when the key is absent and with
    /// [`CacheError::Decode`] when the stored bytes do not decode into `T`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> CacheResult<T> {
        let inner = self.inner.lock().await;
        let bytes = inner
            .store
            .get(key)
            .await?
            .ok_or_else(|| CacheError::NotFound(key.to_string()))?;
        inner.encoder.decode(&bytes)
    }

    /// Get a value into an existing target, which is only written on success.
    pub async fn get_into<T: DeserializeOwned>(
        &self,
        key: &str,
        target: &mut T,
    ) -> CacheResult<()> {
        *target = self.get(key).await?;
        Ok(())
    }

    /// Set a value with optional expiration and tags
    ///
    /// Nothing is written when encoding fails. When the write itself fails
    /// the tags are left untouched. Tag bookkeeping failures are logged but
    /// do not fail the call, since the value is already stored.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tagcache::*;
    /// # use std::time::Duration;
    /// # async fn example() -> CacheResult<()> {
    /// let cache = TaggedCache::new(InMemoryStore::new(), Encoding::Json);
    /// cache.set(
    ///     "user:123",
    ///     &"Alice",
    ///     SetOptions::new()
    ///         .with_expiration(Duration::from_secs(3600))
    ///         .with_tags(["users", "active-users"]),
    /// ).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        options: SetOptions,
    ) -> CacheResult<()> {
        let inner = self.inner.lock().await;

        let bytes = inner.encoder.encode(value)?;
        inner.store.set(key, bytes, options.expiration).await?;

        for tag in &options.tags {
            if let Err(e) = inner.store.add_to_set(tag, &[key]).await {
                warn!(key = %key, tag = %tag, error = %e, "Failed to add key to tag");
            }
            if let Err(e) = inner.store.expire(tag, self.tag_ttl).await {
                warn!(tag = %tag, error = %e, "Failed to refresh tag expiration");
            }
        }

        Ok(())
    }

    /// Delete a specific key
    ///
    /// The key stays listed in its tags; invalidating them later skips it.
    pub async fn delete(&self, key: &str) -> CacheResult<()> {
        let inner = self.inner.lock().await;
        inner.store.delete(&[key]).await?;
        Ok(())
    }

    /// Invalidate all keys with any of the specified tags
    ///
    /// Best effort: failures are logged and the remaining keys and tags are
    /// still processed. A tag whose members cannot be read is skipped.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// // Invalidate all user and session data
    /// tagged.invalidate(&["users", "sessions"]).await;
    /// ```
    pub async fn invalidate<T: AsRef<str>>(&self, tags: &[T]) {
        if tags.is_empty() {
            return;
        }

        let inner = self.inner.lock().await;

        for tag in tags {
            let tag = tag.as_ref();
            let keys = match inner.store.set_members(tag).await {
                Ok(keys) => keys,
                Err(e) => {
                    warn!(tag = %tag, error = %e, "Failed to read tag members, skipping tag");
                    continue;
                }
            };

            for key in &keys {
                if let Err(e) = inner.store.delete(&[key.as_str()]).await {
                    warn!(tag = %tag, key = %key, error = %e, "Failed to delete tagged key");
                }
            }

            if let Err(e) = inner.store.delete(&[tag]).await {
                warn!(tag = %tag, error = %e, "Failed to delete tag");
            }

            debug!(tag = %tag, keys = keys.len(), "Invalidated tag");
        }
    }

    /// Remove every key from the store, not only those written by this cache.
    ///
    /// Failures are logged, never returned.
    pub async fn flush(&self) {
        let inner = self.inner.lock().await;
        match inner.store.flush_all().await {
            Ok(()) => debug!("Flushed cache store"),
            Err(e) => warn!(error = %e, "Failed to flush cache store"),
        }
    }

    /// Close the underlying store.
    pub async fn close(self) -> CacheResult<()> {
        let inner = self.inner.into_inner();
        inner.store.close().await
    }
}

#[cfg(feature = "redis")]
impl TaggedCache<crate::redis_store::RedisStore, Encoding> {
    /// Connect to Redis using a configuration.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tagcache::*;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), CacheError> {
    ///     let config = CacheConfig::redis("redis://localhost:6379")?
    ///         .with_encoding(Encoding::Json);
    ///     let cache = TaggedCache::connect(config).await?;
    ///     cache.ping().await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn connect(config: crate::config::CacheConfig) -> CacheResult<Self> {
        let store = crate::redis_store::RedisStore::connect(&config).await?;
        Ok(Self::new(store, config.encoding).with_tag_ttl(config.tag_ttl))
    }
}
