use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use super::Result;

/// Trait for byte-level cache operations.
///
/// Implementations must be safe to share between every repository in the
/// process.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Gets a value from the cache by key.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Sets a value in the cache with an optional TTL.
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()>;

    /// Deletes a value from the cache by key.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Gets several values at once.
    ///
    /// Only hits are returned; keys that are absent or expired are omitted.
    async fn multi_get(&self, keys: &[String]) -> Result<HashMap<String, Vec<u8>>> {
        let mut hits = HashMap::with_capacity(keys.len());
        for key in keys {
            if let Some(value) = self.get(key).await? {
                hits.insert(key.clone(), value);
            }
        }
        Ok(hits)
    }

    /// Sets several values at once, all with the same TTL.
    async fn multi_set(&self, entries: &[(String, Vec<u8>)], ttl: Option<Duration>) -> Result<()> {
        for (key, value) in entries {
            self.set(key, value, ttl).await?;
        }
        Ok(())
    }
}
