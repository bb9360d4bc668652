//! Tagged cache walkthrough.
//!
//! Uses Redis when `TAGCACHE_REDIS_URL` is set, the in-memory store
//! otherwise.
//!
//! ```sh
//! RUST_LOG=tagcache=debug cargo run --example tagged_cache
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tagcache::*;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Serialize, Deserialize)]
struct Article {
    id: u64,
    title: String,
}

async fn walkthrough<S: CacheStore>(cache: TaggedCache<S>) -> CacheResult<()> {
    cache.ping().await?;
    println!("Using {} encoding", cache.encoder_name());

    for id in 1..=3 {
        let article = Article {
            id,
            title: format!("Article {id}"),
        };
        cache
            .set(
                &format!("article:{id}"),
                &article,
                SetOptions::new()
                    .with_expiration(Duration::from_secs(100))
                    .with_tag("articles")
                    .with_tag(format!("author:{}", id % 2)),
            )
            .await?;
    }

    let article: Article = cache.get("article:2").await?;
    println!("Cached: {article:?}");

    cache.invalidate(&["author:1"]).await;
    for id in 1..=3 {
        match cache.get::<Article>(&format!("article:{id}")).await {
            Ok(article) => println!("article:{id} still cached: {}", article.title),
            Err(e) if e.is_not_found() => println!("article:{id} invalidated"),
            Err(e) => return Err(e),
        }
    }

    cache.invalidate(&["articles"]).await;
    cache.close().await
}

#[tokio::main]
async fn main() -> CacheResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if std::env::var("TAGCACHE_REDIS_URL").is_ok() {
        let cache = TaggedCache::connect(CacheConfig::from_env()?).await?;
        walkthrough(cache).await
    } else {
        let cache = TaggedCache::new(InMemoryStore::new(), Encoding::Json);
        walkthrough(cache).await
    }
}
