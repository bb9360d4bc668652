//! Process-local store.

use crate::error::{CacheError, CacheResult};
use crate::traits::CacheStore;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

const WRONG_TYPE: &str = "WRONGTYPE Operation against a key holding the wrong kind of value";

/// Writes between two sweeps of expired entries.
const PURGE_INTERVAL: u64 = 1024;

/// In-memory store with Redis-like value and set semantics.
///
/// Expired entries are dropped when touched, and a periodic sweep on writes
/// removes the ones nobody reads again. A TTL too large to represent as a
/// deadline is treated as no expiration. Useful for tests and single-process
/// deployments.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    data: Arc<RwLock<HashMap<String, Entry>>>,
    closed: Arc<AtomicBool>,
    writes: Arc<AtomicU64>,
}

#[derive(Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

#[derive(Clone)]
enum Value {
    Bytes(Vec<u8>),
    Set(HashSet<String>),
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|exp| exp > now)
    }
}

impl InMemoryStore {
    /// Create new in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries, sets included.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let data = self.data.read().await;
        data.values().filter(|entry| entry.is_live(now)).count()
    }

    /// Whether the store holds no live entries.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn ensure_open(&self) -> CacheResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(CacheError::Connection("store closed".to_string()));
        }
        Ok(())
    }

    /// Remove every expired entry.
    pub async fn purge_expired(&self) {
        let now = Instant::now();
        let mut data = self.data.write().await;
        data.retain(|_, entry| entry.is_live(now));
    }

    fn deadline(now: Instant, ttl: Option<Duration>) -> Option<Instant> {
        ttl.filter(|ttl| !ttl.is_zero())
            .and_then(|ttl| now.checked_add(ttl))
    }

    /// Look up a live entry, dropping it if it has expired.
    fn live_entry<'a>(
        data: &'a mut HashMap<String, Entry>,
        key: &str,
        now: Instant,
    ) -> Option<&'a Entry> {
        if data.get(key).is_some_and(|entry| !entry.is_live(now)) {
            data.remove(key);
        }
        data.get(key)
    }
}

#[async_trait]
impl CacheStore for InMemoryStore {
    async fn ping(&self) -> CacheResult<()> {
        self.ensure_open()
    }

    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        self.ensure_open()?;
        let mut data = self.data.write().await;
        match Self::live_entry(&mut data, key, Instant::now()) {
            Some(entry) => match &entry.value {
                Value::Bytes(bytes) => Ok(Some(bytes.clone())),
                Value::Set(_) => Err(CacheError::StoreRead(WRONG_TYPE.to_string())),
            },
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> CacheResult<()> {
        self.ensure_open()?;
        let now = Instant::now();
        let entry = Entry {
            value: Value::Bytes(value),
            expires_at: Self::deadline(now, ttl),
        };

        let mut data = self.data.write().await;
        if self.writes.fetch_add(1, Ordering::Relaxed) % PURGE_INTERVAL == PURGE_INTERVAL - 1 {
            data.retain(|_, entry| entry.is_live(now));
        }
        data.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, keys: &[&str]) -> CacheResult<u64> {
        self.ensure_open()?;
        let now = Instant::now();
        let mut data = self.data.write().await;
        let removed = keys
            .iter()
            .filter_map(|key| data.remove(*key))
            .filter(|entry| entry.is_live(now))
            .count();
        Ok(removed as u64)
    }

    async fn set_members(&self, set_key: &str) -> CacheResult<Vec<String>> {
        self.ensure_open()?;
        let mut data = self.data.write().await;
        match Self::live_entry(&mut data, set_key, Instant::now()) {
            Some(entry) => match &entry.value {
                Value::Set(members) => Ok(members.iter().cloned().collect()),
                Value::Bytes(_) => Err(CacheError::StoreRead(WRONG_TYPE.to_string())),
            },
            None => Ok(Vec::new()),
        }
    }

    async fn add_to_set(&self, set_key: &str, members: &[&str]) -> CacheResult<u64> {
        self.ensure_open()?;
        let now = Instant::now();
        let mut data = self.data.write().await;

        let entry = data.entry(set_key.to_string()).or_insert_with(|| Entry {
            value: Value::Set(HashSet::new()),
            expires_at: None,
        });
        if !entry.is_live(now) {
            *entry = Entry {
                value: Value::Set(HashSet::new()),
                expires_at: None,
            };
        }

        match &mut entry.value {
            Value::Set(set) => {
                let added = members
                    .iter()
                    .filter(|member| set.insert(member.to_string()))
                    .count();
                Ok(added as u64)
            }
            Value::Bytes(_) => Err(CacheError::StoreWrite(WRONG_TYPE.to_string())),
        }
    }

    async fn expire(&self, key: &str, ttl: Duration) -> CacheResult<bool> {
        self.ensure_open()?;
        let now = Instant::now();
        let mut data = self.data.write().await;
        match data.get_mut(key) {
            Some(entry) if entry.is_live(now) => {
                entry.expires_at = now.checked_add(ttl);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn flush_all(&self) -> CacheResult<()> {
        self.ensure_open()?;
        self.data.write().await.clear();
        Ok(())
    }

    async fn close(&self) -> CacheResult<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}
