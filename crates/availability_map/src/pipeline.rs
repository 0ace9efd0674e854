use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use campground_enrich::{
    CachedClient, EnrichedRecord, Enricher, NswParksClient, SessionManager, load_campgrounds,
};
use campground_map::MapRenderer;
use chrono::{Local, Utc};
use http_cache::{MemoryCache, ResponseCache, SqliteCache};

use crate::config::AppConfig;

/// Build the response cache selected by the configuration
async fn open_cache(config: &AppConfig) -> Result<Arc<dyn ResponseCache>> {
    if config.no_cache {
        log::info!("🧠 Using in-memory response cache");
        return Ok(Arc::new(MemoryCache::new(config.cache_ttl())));
    }

    let cache = SqliteCache::open(&config.cache_path, config.cache_ttl())
        .await
        .with_context(|| format!("Failed to open cache at {}", config.cache_path.display()))?;

    match cache.purge_expired(Utc::now()).await {
        Ok(0) => {}
        Ok(removed) => log::info!("🧹 Removed {} expired cache entries", removed),
        Err(e) => log::warn!("⚠️ Could not purge expired cache entries: {}", e),
    }

    Ok(Arc::new(cache))
}

fn write_enriched_json(path: &Path, records: &[EnrichedRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write enriched records to {}", path.display()))?;
    log::info!("📝 Wrote enriched records to {}", path.display());
    Ok(())
}

/// Load, enrich and render. Returns the number of markers placed on the map.
pub async fn run(config: &AppConfig) -> Result<usize> {
    let records = load_campgrounds(&config.input)?;
    let cache = open_cache(config).await?;

    let session = SessionManager::new(Some(config.session_config()))?;
    if let Err(e) = session.acquire_cookies().await {
        // Uncached lookups will most likely resolve to unknown without a session
        log::warn!("⚠️ Continuing without session cookies: {}", e);
    }

    let stats = session.get_session_stats().await;
    log::info!(
        "🍪 Session: {} cookies, {} failed attempts, acquired at {}",
        stats.cookie_count,
        stats.failure_count,
        stats
            .acquired_at
            .map(|at| at.to_rfc3339())
            .unwrap_or_else(|| "never".to_string())
    );

    let http = CachedClient::new(
        session.get_client().clone(),
        cache,
        config.user_agent.clone(),
        session.config().timeout,
    );
    let client = Arc::new(NswParksClient::new(http, config.availability_url.clone()));
    let enricher = Enricher::new(client);

    let today = Local::now().date_naive();
    let enriched = enricher.enrich(records, today).await;

    if let Some(path) = &config.enriched_json {
        write_enriched_json(path, &enriched)?;
    }

    let placed = MapRenderer::new(None)
        .save(&enriched, &config.output)
        .with_context(|| format!("Failed to save map to {}", config.output.display()))?;

    Ok(placed)
}
