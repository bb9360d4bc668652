//! Cache configuration types.

use crate::encoder::Encoding;
use crate::error::{CacheError, CacheResult};
use std::env;
use std::time::Duration;

/// Default lifetime of a tag's member set: 720 hours.
pub const DEFAULT_TAG_TTL: Duration = Duration::from_secs(720 * 60 * 60);

/// Default connection timeout.
pub const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

const DEFAULT_URL: &str = "redis://localhost:6379";

const URL_SCHEMES: &[&str] = &["redis://", "rediss://", "redis+unix://", "unix://"];

/// Cache configuration.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Connection URL
    pub url: String,

    /// Key prefix for all cache keys and tag sets
    pub key_prefix: Option<String>,

    /// Encoding used for stored values
    pub encoding: Encoding,

    /// Expiration applied to a tag's member set on every tagged write
    pub tag_ttl: Duration,

    /// Connection timeout
    pub connection_timeout: Duration,
}

impl CacheConfig {
    /// Create a new Redis cache configuration.
    ///
    /// # Arguments
    ///
    /// * `url` - Redis connection URL (e.g., "redis://localhost:6379")
    ///
    /// # Examples
    ///
    /// ```
    /// use tagcache::CacheConfig;
    ///
    /// let config = CacheConfig::redis("redis://localhost:6379").unwrap();
    /// assert!(CacheConfig::redis("http://localhost").is_err());
    /// ```
    pub fn redis(url: impl Into<String>) -> CacheResult<Self> {
        let url = url.into();
        if !URL_SCHEMES.iter().any(|scheme| url.starts_with(scheme)) {
            return Err(CacheError::InvalidUrl(url));
        }

        Ok(Self {
            url,
            key_prefix: None,
            encoding: Encoding::default(),
            tag_ttl: DEFAULT_TAG_TTL,
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// - `TAGCACHE_REDIS_URL` (falls back to `REDIS_URL`)
    /// - `TAGCACHE_KEY_PREFIX`
    /// - `TAGCACHE_ENCODING` - `json`, `msgpack` or `bincode`
    /// - `TAGCACHE_TAG_TTL_SECS`
    /// - `TAGCACHE_CONNECT_TIMEOUT_SECS`
    pub fn from_env() -> CacheResult<Self> {
        let url = env::var("TAGCACHE_REDIS_URL")
            .or_else(|_| env::var("REDIS_URL"))
            .unwrap_or_else(|_| DEFAULT_URL.to_string());

        let mut config = Self::redis(url)?;

        if let Ok(prefix) = env::var("TAGCACHE_KEY_PREFIX")
            && !prefix.is_empty()
        {
            config = config.with_key_prefix(prefix);
        }

        if let Ok(encoding) = env::var("TAGCACHE_ENCODING") {
            let encoding = Encoding::from_str(&encoding).ok_or_else(|| {
                CacheError::Config(format!("unknown encoding '{encoding}'"))
            })?;
            config = config.with_encoding(encoding);
        }

        if let Some(secs) = env_secs("TAGCACHE_TAG_TTL_SECS")? {
            config = config.with_tag_ttl(secs);
        }

        if let Some(secs) = env_secs("TAGCACHE_CONNECT_TIMEOUT_SECS")? {
            config = config.with_connection_timeout(secs);
        }

        Ok(config)
    }

    /// Set the key prefix.
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Set the value encoding.
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Set the tag set TTL.
    pub fn with_tag_ttl(mut self, ttl: Duration) -> Self {
        self.tag_ttl = ttl;
        self
    }

    /// Set the connection timeout.
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Build the final key with prefix if configured.
    pub fn build_key(&self, key: &str) -> String {
        build_key(self.key_prefix.as_deref(), key)
    }
}

pub(crate) fn build_key(prefix: Option<&str>, key: &str) -> String {
    match prefix {
        Some(prefix) => format!("{}:{}", prefix, key),
        None => key.to_string(),
    }
}

fn env_secs(name: &str) -> CacheResult<Option<Duration>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(|secs| Some(Duration::from_secs(secs)))
            .map_err(|e| CacheError::Config(format!("{name}: {e}"))),
        Err(_) => Ok(None),
    }
}
