//! In-memory cache implementation with LRU eviction.
//!
//! Provides a thread-safe in-memory cache with TTL support using
//! tokio synchronization primitives and LRU eviction policy.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::RwLock;

use helmsman_core::cache::{Cache, Result};

/// A single cache entry with optional expiration.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    /// Creates a new cache entry with optional TTL.
    fn new(value: Vec<u8>, ttl: Option<Duration>) -> Self {
        let expires_at = ttl.map(|d| Instant::now() + d);
        Self { value, expires_at }
    }

    /// Returns true if this entry has expired.
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Instant::now() > exp)
    }
}

/// In-memory cache implementation with LRU eviction.
///
/// Thread-safe cache using `Arc<RwLock<LruCache>>` for concurrent access.
/// Expired entries are dropped lazily when they are read.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    store: Arc<RwLock<LruCache<String, CacheEntry>>>,
}

impl MemoryCache {
    /// Creates a new in-memory cache with LRU eviction.
    ///
    /// A `max_entries` of zero is raised to one.
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or_else(|| {
            tracing::warn!("CACHE_MAX_ENTRIES is 0, using a capacity of 1");
            NonZeroUsize::MIN
        });
        Self {
            store: Arc::new(RwLock::new(LruCache::new(capacity))),
        }
    }

    /// Number of stored entries, expired or not.
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }
}

/// Reads a live entry, evicting it if it has expired.
fn live_value(store: &mut LruCache<String, CacheEntry>, key: &str) -> Option<Vec<u8>> {
    match store.get(key) {
        Some(entry) if entry.is_expired() => {
            store.pop(key);
            None
        }
        Some(entry) => Some(entry.value.clone()),
        None => None,
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut store = self.store.write().await;
        Ok(live_value(&mut store, key))
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let mut store = self.store.write().await;
        store.put(key.to_string(), CacheEntry::new(value.to_vec(), ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut store = self.store.write().await;
        store.pop(key);
        Ok(())
    }

    async fn multi_get(&self, keys: &[String]) -> Result<HashMap<String, Vec<u8>>> {
        let mut store = self.store.write().await;
        let hits = keys
            .iter()
            .filter_map(|key| live_value(&mut store, key).map(|value| (key.clone(), value)))
            .collect();
        Ok(hits)
    }

    async fn multi_set(&self, entries: &[(String, Vec<u8>)], ttl: Option<Duration>) -> Result<()> {
        let mut store = self.store.write().await;
        for (key, value) in entries {
            store.put(key.clone(), CacheEntry::new(value.clone(), ttl));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Default max entries for tests
    const TEST_MAX_ENTRIES: usize = 1000;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        let key = "trades:1";
        let value = b"{\"id\":1}";

        cache.set(key, value, None).await.unwrap();
        let result = cache.get(key).await.unwrap();

        assert_eq!(result, Some(value.to_vec()));
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        let result = cache.get("trades:404").await.unwrap();

        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_delete() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        let key = "tags:3";

        cache.set(key, b"to be deleted", None).await.unwrap();
        assert!(cache.get(key).await.unwrap().is_some());

        cache.delete(key).await.unwrap();
        assert!(cache.get(key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_key_is_ok() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        assert!(cache.delete("tags:999").await.is_ok());
    }

    #[tokio::test]
    async fn test_ttl_expiration() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        let key = "users:5";

        cache
            .set(key, b"short-lived", Some(Duration::from_millis(50)))
            .await
            .unwrap();

        assert!(cache.get(key).await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(cache.get(key).await.unwrap().is_none());
        // Expired entries are evicted on read
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_overwrite_value() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        let key = "accounts:2";

        cache.set(key, b"first", None).await.unwrap();
        cache.set(key, b"second", None).await.unwrap();

        let result = cache.get(key).await.unwrap();
        assert_eq!(result, Some(b"second".to_vec()));
    }

    #[tokio::test]
    async fn test_multi_get_returns_only_hits() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        cache.set("users:1", b"one", None).await.unwrap();
        cache.set("users:3", b"three", None).await.unwrap();
        cache
            .set("users:4", b"four", Some(Duration::from_millis(1)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let keys: Vec<String> = ["users:1", "users:2", "users:3", "users:4"]
            .iter()
            .map(|k| k.to_string())
            .collect();
        let hits = cache.multi_get(&keys).await.unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits.get("users:1"), Some(&b"one".to_vec()));
        assert_eq!(hits.get("users:3"), Some(&b"three".to_vec()));
        assert!(!hits.contains_key("users:2"));
        assert!(!hits.contains_key("users:4"));
    }

    #[tokio::test]
    async fn test_multi_set() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        let entries = vec![
            ("tags:1".to_string(), b"a".to_vec()),
            ("tags:2".to_string(), b"b".to_vec()),
        ];

        cache
            .multi_set(&entries, Some(Duration::from_secs(60)))
            .await
            .unwrap();

        assert_eq!(cache.get("tags:1").await.unwrap(), Some(b"a".to_vec()));
        assert_eq!(cache.get("tags:2").await.unwrap(), Some(b"b".to_vec()));
    }

    #[tokio::test]
    async fn test_lru_eviction() {
        let cache = MemoryCache::new(3);

        cache.set("key1", b"value1", None).await.unwrap();
        cache.set("key2", b"value2", None).await.unwrap();
        cache.set("key3", b"value3", None).await.unwrap();

        // Access key1 to make it recently used
        cache.get("key1").await.unwrap();

        // Insert a 4th entry - should evict key2 (least recently used)
        cache.set("key4", b"value4", None).await.unwrap();

        assert!(cache.get("key1").await.unwrap().is_some());
        assert!(cache.get("key2").await.unwrap().is_none());
        assert!(cache.get("key3").await.unwrap().is_some());
        assert!(cache.get("key4").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_zero_max_entries_holds_one() {
        let cache = MemoryCache::new(0);

        cache.set("a", b"1", None).await.unwrap();
        cache.set("b", b"2", None).await.unwrap();

        assert_eq!(cache.len().await, 1);
        assert!(cache.get("b").await.unwrap().is_some());
    }
}
