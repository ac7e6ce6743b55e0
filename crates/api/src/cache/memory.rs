//! In-memory response store with TTL
//!
//! Default backend for the GraphQL response cache when no Redis is configured.
//! Total size is bounded: when a new response does not fit, expired entries
//! are dropped first, then the entries closest to expiry.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use super::{CacheResult, ResponseStore};

/// Default memory budget for cached keys and bodies
pub const DEFAULT_MAX_BYTES: usize = 64 * 1024 * 1024;

/// Cache entry with expiration
#[derive(Clone)]
struct CacheEntry {
    body: Vec<u8>,
    /// `None` when the TTL reaches past what `Instant` can represent
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(body: Vec<u8>, ttl: Duration) -> Self {
        Self {
            body,
            expires_at: Instant::now().checked_add(ttl),
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() > at)
    }
}

fn entry_size(key: &str, entry: &CacheEntry) -> usize {
    key.len() + entry.body.len()
}

#[derive(Default)]
struct Entries {
    map: HashMap<String, CacheEntry>,
    bytes: usize,
}

impl Entries {
    fn insert(&mut self, key: String, entry: CacheEntry) {
        self.bytes += entry_size(&key, &entry);
        if let Some(previous) = self.map.insert(key.clone(), entry) {
            self.bytes -= entry_size(&key, &previous);
        }
    }

    fn remove(&mut self, key: &str) {
        if let Some(previous) = self.map.remove(key) {
            self.bytes -= entry_size(key, &previous);
        }
    }

    fn remove_expired(&mut self) {
        self.map.retain(|_, entry| !entry.is_expired());
        self.bytes = self
            .map
            .iter()
            .map(|(key, entry)| entry_size(key, entry))
            .sum();
    }

    /// Drop the entry that expires soonest; entries without expiry go last
    fn evict_one(&mut self) -> bool {
        let Some(key) = self
            .map
            .iter()
            .min_by_key(|(_, entry)| (entry.expires_at.is_none(), entry.expires_at))
            .map(|(key, _)| key.clone())
        else {
            return false;
        };

        self.remove(&key);
        true
    }
}

/// Thread-safe in-memory response store
pub struct InMemoryResponseStore {
    /// Maps cache key -> response body
    entries: RwLock<Entries>,
    max_bytes: usize,
}

impl Default for InMemoryResponseStore {
    fn default() -> Self {
        Self::with_max_bytes(DEFAULT_MAX_BYTES)
    }
}

impl InMemoryResponseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding at most `max_bytes` of keys and bodies
    pub fn with_max_bytes(max_bytes: usize) -> Self {
        Self {
            entries: RwLock::new(Entries::default()),
            max_bytes,
        }
    }

    /// Clear expired entries (call periodically for memory management)
    pub fn cleanup(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove_expired();
        }
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        if let Ok(entries) = self.entries.read() {
            let total = entries.map.len();
            let expired = entries.map.values().filter(|e| e.is_expired()).count();
            CacheStats {
                total_entries: total,
                expired_entries: expired,
                active_entries: total - expired,
                total_bytes: entries.bytes,
            }
        } else {
            CacheStats::default()
        }
    }
}

#[async_trait]
impl ResponseStore for InMemoryResponseStore {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let Ok(entries) = self.entries.read() else {
            return Ok(None);
        };

        Ok(entries
            .map
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.body.clone()))
    }

    async fn put(&self, key: &str, body: Vec<u8>, ttl: Duration) -> CacheResult<()> {
        let entry = CacheEntry::new(body, ttl);
        let size = entry_size(key, &entry);
        if size > self.max_bytes {
            tracing::debug!(key = %key, size, "Response larger than cache budget, not stored");
            return Ok(());
        }

        let Ok(mut entries) = self.entries.write() else {
            return Ok(());
        };

        entries.remove(key);
        if entries.bytes + size > self.max_bytes {
            entries.remove_expired();
        }
        while entries.bytes + size > self.max_bytes {
            if !entries.evict_one() {
                break;
            }
        }

        entries.insert(key.to_string(), entry);
        Ok(())
    }
}

/// Cache statistics
#[derive(Default, Debug)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub active_entries: usize,
    pub total_bytes: usize,
}
