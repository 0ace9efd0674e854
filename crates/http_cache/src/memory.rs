use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::types::{CacheError, CachedResponse, ResponseCache};

/// Response cache held in process memory.
///
/// Nothing survives the process, which makes it suitable for tests and cache-less runs.
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CachedResponse>>,
    ttl: Duration,
}

impl MemoryCache {
    /// Create an empty cache with the given lifetime
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Number of stored entries, expired or not
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the cache holds no entries
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl ResponseCache for MemoryCache {
    async fn get(
        &self,
        key: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<CachedResponse>, CacheError> {
        let cached = {
            let entries = self.entries.read().await;
            entries.get(key).cloned()
        };

        match cached {
            Some(response) if response.is_fresh(self.ttl, now) => Ok(Some(response)),
            Some(_) => {
                self.entries.write().await.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, response: CachedResponse) -> Result<(), CacheError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), response);
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, CacheError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, response| response.is_fresh(self.ttl, now));
        Ok((before - entries.len()) as u64)
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }
}
