use std::time::Duration;

use chrono::{DateTime, Utc};

/// Default lifetime of a cached response: six hours.
pub const DEFAULT_TTL: Duration = Duration::from_secs(6 * 60 * 60);

/// A raw HTTP response as it was stored in the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    /// HTTP status code of the original response
    pub status: u16,
    /// Response body as text
    pub body: String,
    /// When the response was stored
    pub stored_at: DateTime<Utc>,
}

impl CachedResponse {
    /// Create a response stored at the given instant
    pub fn new(status: u16, body: impl Into<String>, stored_at: DateTime<Utc>) -> Self {
        Self {
            status,
            body: body.into(),
            stored_at,
        }
    }

    /// Whether the entry is still within `ttl` of when it was stored.
    ///
    /// An entry stops being fresh exactly when its age reaches `ttl`.
    pub fn is_fresh(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        now - self.stored_at < ttl
    }
}

/// Errors raised by cache backends
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Underlying database error
    #[error("Cache database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be turned back into a response
    #[error("Corrupt cache entry: {0}")]
    Corrupt(String),
}

/// A key-value store for HTTP responses with a fixed time-to-live.
///
/// Callers pass the current time in explicitly, so expiry never depends on the wall clock
/// inside the store.
#[async_trait::async_trait]
pub trait ResponseCache: Send + Sync {
    /// Look up a fresh entry. Expired entries are treated as absent.
    async fn get(
        &self,
        key: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<CachedResponse>, CacheError>;

    /// Insert or replace the entry for `key`.
    async fn put(&self, key: &str, response: CachedResponse) -> Result<(), CacheError>;

    /// Drop every entry that has expired as of `now`, returning how many were removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, CacheError>;

    /// Lifetime applied to every entry
    fn ttl(&self) -> Duration;
}
