//! Tests against a live Redis server.
//!
//! Disabled by default; run with `cargo test -- --ignored` with Redis
//! listening on `TAGCACHE_REDIS_URL` (or `redis://localhost:6379`).

#![cfg(feature = "redis")]

use std::time::Duration;
use tagcache::*;

async fn connect(prefix: &str, encoding: Encoding) -> TaggedCache<RedisStore> {
    let config = CacheConfig::from_env()
        .unwrap()
        .with_key_prefix(prefix)
        .with_encoding(encoding);
    TaggedCache::connect(config).await.unwrap()
}

#[tokio::test]
#[ignore]
async fn test_redis_set_get_delete() {
    let cache = connect("tagcache-test-basic", Encoding::Json).await;
    cache.ping().await.unwrap();

    cache
        .set(
            "my-key",
            "hello",
            SetOptions::new().with_expiration(Duration::from_secs(100)),
        )
        .await
        .unwrap();

    let value: String = cache.get("my-key").await.unwrap();
    assert_eq!(value, "hello");

    cache.delete("my-key").await.unwrap();
    assert!(cache.get::<String>("my-key").await.unwrap_err().is_not_found());

    cache.close().await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_redis_tag_invalidation() {
    for encoding in [
        Encoding::Json,
        #[cfg(feature = "msgpack")]
        Encoding::MessagePack,
        #[cfg(feature = "bincode")]
        Encoding::Bincode,
    ] {
        let cache = connect("tagcache-test-tags", encoding).await;

        cache
            .set("a", &vec![1, 2, 3], SetOptions::new().with_tag("numbers"))
            .await
            .unwrap();
        cache
            .set("b", &vec![4], SetOptions::new().with_tag("numbers"))
            .await
            .unwrap();

        cache.invalidate(&["numbers"]).await;

        assert!(cache.get::<Vec<i32>>("a").await.unwrap_err().is_not_found());
        assert!(cache.get::<Vec<i32>>("b").await.unwrap_err().is_not_found());

        cache.close().await.unwrap();
    }
}

#[tokio::test]
#[ignore]
async fn test_redis_ttl() {
    let cache = connect("tagcache-test-ttl", Encoding::Json).await;

    cache
        .set(
            "ttl_key",
            "ttl_value",
            SetOptions::new().with_expiration(Duration::from_secs(1)),
        )
        .await
        .unwrap();

    let value: String = cache.get("ttl_key").await.unwrap();
    assert_eq!(value, "ttl_value");

    tokio::time::sleep(Duration::from_secs(2)).await;

    assert!(cache.get::<String>("ttl_key").await.unwrap_err().is_not_found());
}

#[tokio::test]
#[ignore]
async fn test_redis_closed_store() {
    let config = CacheConfig::from_env().unwrap();
    let store = RedisStore::connect(&config).await.unwrap();
    store.close().await.unwrap();

    assert!(store.ping().await.unwrap_err().is_connection_error());
    assert!(store.close().await.is_err());
}
