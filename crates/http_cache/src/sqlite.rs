use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use tracing::{debug, info};

use crate::types::{CacheError, CachedResponse, ResponseCache};

const CREATE_RESPONSES_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS responses (
        cache_key TEXT PRIMARY KEY NOT NULL,
        status INTEGER NOT NULL,
        body TEXT NOT NULL,
        stored_at INTEGER NOT NULL
    )
"#;

/// Response cache persisted in a local sqlite file
pub struct SqliteCache {
    pool: SqlitePool,
    ttl: Duration,
}

impl SqliteCache {
    /// Open (or create) the cache file at `path`
    pub async fn open(path: impl AsRef<Path>, ttl: Duration) -> Result<Self, CacheError> {
        let path = path.as_ref();
        info!("Opening HTTP response cache at {}", path.display());

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        // Runs are single-process and sequential, one connection is enough
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        sqlx::query(CREATE_RESPONSES_TABLE).execute(&pool).await?;

        Ok(Self { pool, ttl })
    }

    /// Number of rows currently stored, expired or not
    pub async fn len(&self) -> Result<i64, CacheError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM responses")
            .fetch_one(&self.pool)
            .await?;

        Ok(row.try_get("count")?)
    }

    /// Close the underlying pool
    pub async fn close(&self) {
        self.pool.close().await;
    }

    fn cutoff_millis(&self, now: DateTime<Utc>) -> i64 {
        let ttl = chrono::Duration::from_std(self.ttl).unwrap_or(chrono::Duration::MAX);
        now.checked_sub_signed(ttl)
            .map(|cutoff| cutoff.timestamp_millis())
            .unwrap_or(i64::MIN)
    }
}

#[async_trait::async_trait]
impl ResponseCache for SqliteCache {
    async fn get(
        &self,
        key: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<CachedResponse>, CacheError> {
        let row = sqlx::query("SELECT status, body, stored_at FROM responses WHERE cache_key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let status: i64 = row.try_get("status")?;
        let body: String = row.try_get("body")?;
        let stored_at_ms: i64 = row.try_get("stored_at")?;

        let status = u16::try_from(status)
            .map_err(|_| CacheError::Corrupt(format!("invalid status {}", status)))?;
        let stored_at = DateTime::from_timestamp_millis(stored_at_ms)
            .ok_or_else(|| CacheError::Corrupt(format!("invalid timestamp {}", stored_at_ms)))?;

        let response = CachedResponse::new(status, body, stored_at);

        if !response.is_fresh(self.ttl, now) {
            debug!("Cache entry expired, removing: {}", key);
            sqlx::query("DELETE FROM responses WHERE cache_key = ?")
                .bind(key)
                .execute(&self.pool)
                .await?;
            return Ok(None);
        }

        Ok(Some(response))
    }

    async fn put(&self, key: &str, response: CachedResponse) -> Result<(), CacheError> {
        sqlx::query(
            r#"
            INSERT INTO responses (cache_key, status, body, stored_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (cache_key)
            DO UPDATE SET
                status = EXCLUDED.status,
                body = EXCLUDED.body,
                stored_at = EXCLUDED.stored_at
            "#,
        )
        .bind(key)
        .bind(i64::from(response.status))
        .bind(response.body)
        .bind(response.stored_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, CacheError> {
        let result = sqlx::query("DELETE FROM responses WHERE stored_at <= ?")
            .bind(self.cutoff_millis(now))
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_put_then_get_within_ttl() {
        let dir = TempDir::new().unwrap();
        let cache = SqliteCache::open(dir.path().join("cache.sqlite"), Duration::from_secs(60))
            .await
            .unwrap();

        let response = CachedResponse::new(200, r#"{"dates":["01/05/2024"]}"#, epoch());
        cache.put("GET /a", response.clone()).await.unwrap();

        let hit = cache
            .get("GET /a", epoch() + chrono::Duration::seconds(30))
            .await
            .unwrap();
        assert_eq!(hit, Some(response));
        assert!(cache.get("GET /b", epoch()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_removed_on_read() {
        let dir = TempDir::new().unwrap();
        let cache = SqliteCache::open(dir.path().join("cache.sqlite"), Duration::from_secs(60))
            .await
            .unwrap();

        cache
            .put("GET /a", CachedResponse::new(200, "[]", epoch()))
            .await
            .unwrap();

        let miss = cache
            .get("GET /a", epoch() + chrono::Duration::seconds(60))
            .await
            .unwrap();
        assert!(miss.is_none());
        assert_eq!(cache.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_put_replaces_existing_entry() {
        let dir = TempDir::new().unwrap();
        let cache = SqliteCache::open(dir.path().join("cache.sqlite"), Duration::from_secs(60))
            .await
            .unwrap();

        cache
            .put("GET /a", CachedResponse::new(200, "[\"old\"]", epoch()))
            .await
            .unwrap();
        let later = epoch() + chrono::Duration::seconds(10);
        cache
            .put("GET /a", CachedResponse::new(200, "[\"new\"]", later))
            .await
            .unwrap();

        let hit = cache.get("GET /a", later).await.unwrap().unwrap();
        assert_eq!(hit.body, "[\"new\"]");
        assert_eq!(hit.stored_at, later);
        assert_eq!(cache.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_entries_persist_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.sqlite");

        {
            let cache = SqliteCache::open(&path, Duration::from_secs(60)).await.unwrap();
            cache
                .put("GET /a", CachedResponse::new(200, "[]", epoch()))
                .await
                .unwrap();
            cache.close().await;
        }

        let reopened = SqliteCache::open(&path, Duration::from_secs(60)).await.unwrap();
        assert!(reopened.get("GET /a", epoch()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let dir = TempDir::new().unwrap();
        let cache = SqliteCache::open(dir.path().join("cache.sqlite"), Duration::from_secs(60))
            .await
            .unwrap();

        cache
            .put("old", CachedResponse::new(200, "[]", epoch()))
            .await
            .unwrap();
        cache
            .put(
                "fresh",
                CachedResponse::new(200, "[]", epoch() + chrono::Duration::seconds(50)),
            )
            .await
            .unwrap();

        let removed = cache
            .purge_expired(epoch() + chrono::Duration::seconds(60))
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(cache.len().await.unwrap(), 1);
    }
}
