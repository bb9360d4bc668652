//! Helper functions for common cache operations.

use crate::encoder::Encoder;
use crate::error::CacheResult;
use crate::invalidation::{SetOptions, TaggedCache};
use crate::traits::CacheStore;
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

/// Remember a value under a key.
///
/// If the key exists, returns the cached value. If not, calls the factory
/// function, caches the result with `options` (tags included), and returns
/// it. Errors other than a miss are returned without calling the factory.
///
/// # Examples
///
/// ```rust
/// # use tagcache::*;
/// # async fn example() -> CacheResult<()> {
/// let cache = TaggedCache::new(InMemoryStore::new(), Encoding::Json);
///
/// let total: u64 = remember(&cache, "stats:total", SetOptions::new().with_tag("stats"), || async {
///     Ok(42)
/// })
/// .await?;
/// assert_eq!(total, 42);
/// # Ok(())
/// # }
/// ```
pub async fn remember<S, E, T, F, Fut>(
    cache: &TaggedCache<S, E>,
    key: &str,
    options: SetOptions,
    factory: F,
) -> CacheResult<T>
where
    S: CacheStore,
    E: Encoder,
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = CacheResult<T>>,
{
    match cache.get(key).await {
        Ok(value) => return Ok(value),
        Err(e) if e.is_not_found() => debug!(key = %key, "Cache miss, computing value"),
        Err(e) => return Err(e),
    }

    let value = factory().await?;
    cache.set(key, &value, options).await?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::JsonEncoder;
    use crate::error::CacheError;
    use crate::memory::InMemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_remember_computes_once() {
        let cache = TaggedCache::new(InMemoryStore::new(), JsonEncoder);
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value: String = remember(&cache, "key", SetOptions::new(), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok("computed".to_string())
            })
            .await
            .unwrap();
            assert_eq!(value, "computed");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_remember_applies_tags() {
        let cache = TaggedCache::new(InMemoryStore::new(), JsonEncoder);

        let _: i32 = remember(&cache, "key", SetOptions::new().with_tag("tag"), || async {
            Ok(7)
        })
        .await
        .unwrap();

        cache.invalidate(&["tag"]).await;
        assert!(cache.get::<i32>("key").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_remember_propagates_decode_errors() {
        let store = InMemoryStore::new();
        store.set("key", b"wrong".to_vec(), None).await.unwrap();
        let cache = TaggedCache::new(store, JsonEncoder);

        let result: CacheResult<i32> =
            remember(&cache, "key", SetOptions::new(), || async { Ok(1) }).await;

        assert!(matches!(result, Err(CacheError::Decode(_))));
    }

    #[tokio::test]
    async fn test_remember_factory_error_stores_nothing() {
        let cache = TaggedCache::new(InMemoryStore::new(), JsonEncoder);

        let result: CacheResult<i32> = remember(&cache, "key", SetOptions::new(), || async {
            Err(CacheError::Timeout)
        })
        .await;

        assert!(matches!(result, Err(CacheError::Timeout)));
        assert!(cache.get::<i32>("key").await.unwrap_err().is_not_found());
    }
}
