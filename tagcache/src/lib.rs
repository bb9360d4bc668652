//! Tagged caching over Redis.
//!
//! A cache facade for a remote key-value store with pluggable value encoders
//! and tag-based bulk invalidation.
//!
//! # Features
//!
//! - `redis` - Enable the Redis store (enabled by default)
//! - `msgpack` - Enable the MessagePack encoder (enabled by default)
//! - `bincode` - Enable the bincode encoder (enabled by default)
//! - **Tag-based invalidation** - Invalidate multiple cache entries by tag
//! - **Pluggable encoders** - JSON, MessagePack or bincode, chosen once per cache
//!
//! Expiration is left entirely to the store. Tag member sets are not pruned
//! when their keys expire or are deleted; invalidation treats such stale
//! members as harmless misses.
//!
//! # Examples
//!
//! ## Redis Cache
//!
//! ```no_run
//! use tagcache::*;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), CacheError> {
//!     let config = CacheConfig::redis("redis://localhost:6379")?;
//!     let cache = TaggedCache::connect(config).await?;
//!     cache.ping().await?;
//!
//!     cache
//!         .set(
//!             "my-key",
//!             "hello",
//!             SetOptions::new()
//!                 .with_expiration(Duration::from_secs(100))
//!                 .with_tag("my-tag"),
//!         )
//!         .await?;
//!
//!     let value: String = cache.get("my-key").await?;
//!     assert_eq!(value, "hello");
//!
//!     cache.delete("my-key").await?;
//!     cache.close().await
//! }
//! ```
//!
//! ## Tag-based Invalidation
//!
//! ```
//! use tagcache::*;
//!
//! # async fn example() -> Result<(), CacheError> {
//! let tagged = TaggedCache::new(InMemoryStore::new(), Encoding::Json);
//!
//! // Set with tags
//! tagged
//!     .set(
//!         "user:123",
//!         &serde_json::json!({ "name": "Alice" }),
//!         SetOptions::new().with_tags(["users", "active-users"]),
//!     )
//!     .await?;
//!
//! // Invalidate all entries with "users" tag
//! tagged.invalidate(&["users"]).await;
//! assert!(tagged.get::<serde_json::Value>("user:123").await.unwrap_err().is_not_found());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod encoder;
pub mod error;
pub mod helpers;
pub mod invalidation;
pub mod memory;
pub mod traits;

#[cfg(feature = "redis")]
pub mod redis_store;

pub use config::{CacheConfig, DEFAULT_TAG_TTL};
pub use encoder::{Encoder, Encoding, JsonEncoder};
pub use error::{CacheError, CacheResult};
pub use helpers::*;
pub use invalidation::{SetOptions, TaggedCache};
pub use memory::InMemoryStore;
pub use traits::CacheStore;

#[cfg(feature = "msgpack")]
pub use encoder::MessagePackEncoder;

#[cfg(feature = "bincode")]
pub use encoder::BincodeEncoder;

#[cfg(feature = "redis")]
pub use redis_store::RedisStore;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::CacheConfig;
    pub use crate::encoder::{Encoder, Encoding, JsonEncoder};
    pub use crate::error::{CacheError, CacheResult};
    pub use crate::invalidation::{SetOptions, TaggedCache};
    pub use crate::memory::InMemoryStore;
    pub use crate::traits::CacheStore;

    #[cfg(feature = "msgpack")]
    pub use crate::encoder::MessagePackEncoder;

    #[cfg(feature = "bincode")]
    pub use crate::encoder::BincodeEncoder;

    #[cfg(feature = "redis")]
    pub use crate::redis_store::RedisStore;
}
