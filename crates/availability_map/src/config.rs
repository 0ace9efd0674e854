use std::path::PathBuf;
use std::time::Duration;

use campground_enrich::{DEFAULT_AVAILABILITY_URL, DEFAULT_SITE_URL, DEFAULT_USER_AGENT, SessionConfig};
use clap::Parser;
use validator::Validate;

/// Command line and environment configuration
#[derive(Debug, Clone, Parser, Validate)]
#[command(name = "campsite-map")]
#[command(version)]
#[command(about = "Map NSW campgrounds coloured by today's booking availability")]
pub struct AppConfig {
    /// JSON file holding an array of campground records
    #[arg(long, env = "CAMPGROUNDS_PATH", default_value = "all_campground.json")]
    pub input: PathBuf,

    /// Where to write the HTML map
    #[arg(long, env = "OUTPUT_MAP_PATH", default_value = "index.html")]
    pub output: PathBuf,

    /// Sqlite file for the HTTP response cache
    #[arg(long, env = "HTTP_CACHE_PATH", default_value = ".http_cache.sqlite")]
    pub cache_path: PathBuf,

    /// Lifetime of cached responses in seconds
    #[arg(long, env = "HTTP_CACHE_TTL_SECS", default_value_t = 21_600)]
    #[validate(range(min = 1, message = "Cache TTL must be at least one second"))]
    pub cache_ttl_secs: u64,

    /// Keep responses in memory only for this run
    #[arg(long)]
    pub no_cache: bool,

    /// Site root visited to obtain session cookies
    #[arg(long, env = "NSW_PARKS_SITE_URL", default_value = DEFAULT_SITE_URL)]
    pub site_url: String,

    /// Reservation API availability endpoint
    #[arg(long, env = "NSW_PARKS_AVAILABILITY_URL", default_value = DEFAULT_AVAILABILITY_URL)]
    pub availability_url: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 20)]
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub timeout_secs: u64,

    /// User agent sent with every request
    #[arg(long, env = "HTTP_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    #[validate(length(min = 1, message = "User agent is required"))]
    pub user_agent: String,

    /// Also write the enriched records as JSON to this path
    #[arg(long, env = "ENRICHED_JSON_PATH")]
    pub enriched_json: Option<PathBuf>,
}

impl AppConfig {
    /// Lifetime of cached responses
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Session settings derived from this configuration
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            base_url: self.site_url.clone(),
            user_agent: self.user_agent.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}
