use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, Url};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::types::EnrichError;

/// Root of the NSW National Parks website, visited to pick up session cookies
pub const DEFAULT_SITE_URL: &str = "https://www.nationalparks.nsw.gov.au/";

/// User agent sent with every request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) ";

/// Per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Manages an anonymous cookie session with the parks website
pub struct SessionManager {
    client: Client,
    jar: Arc<Jar>,
    site_url: Url,
    session_state: RwLock<SessionState>,
    config: SessionConfig,
}

#[derive(Debug, Clone, Default)]
struct SessionState {
    /// When cookies were last acquired
    acquired_at: Option<DateTime<Utc>>,

    /// Cookies held for the site after the last acquisition
    cookie_count: usize,

    /// Number of failed acquisitions
    failure_count: u32,
}

/// Settings for the anonymous session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Site root visited to obtain cookies
    pub base_url: String,

    /// User agent for every request made through the session client
    pub user_agent: String,

    /// Timeout applied to each request
    pub timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SITE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl SessionManager {
    /// Create a new session manager. No request is made until [`Self::acquire_cookies`].
    pub fn new(config: Option<SessionConfig>) -> Result<Self, EnrichError> {
        let config = config.unwrap_or_default();

        let site_url = Url::parse(&config.base_url)
            .map_err(|e| EnrichError::ConfigError(format!("Invalid site URL: {}", e)))?;

        // Cookies set by the site are replayed on every later request
        let jar = Arc::new(Jar::default());

        let client = Client::builder()
            .cookie_provider(jar.clone())
            .timeout(config.timeout)
            .build()
            .map_err(|e| EnrichError::Session(format!("Failed to create session client: {}", e)))?;

        Ok(Self {
            client,
            jar,
            site_url,
            session_state: RwLock::new(SessionState::default()),
            config,
        })
    }

    /// Visit the site root once and keep whatever cookies it sets.
    ///
    /// Returns the number of cookies now held for the site.
    pub async fn acquire_cookies(&self) -> Result<usize, EnrichError> {
        info!("Acquiring session cookies from {}", self.site_url);
        debug!("Using user agent: {}", self.config.user_agent);

        let result = self
            .client
            .get(self.site_url.clone())
            .header("User-Agent", &self.config.user_agent)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header("Accept-Language", "en-AU,en;q=0.5")
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                self.record_failure().await;
                return Err(EnrichError::Session(format!(
                    "Failed to reach {}: {}",
                    self.site_url, e
                )));
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            self.record_failure().await;
            return Err(EnrichError::Session(format!(
                "Session request failed with status {}",
                status
            )));
        }

        let cookie_count = self.cookie_count();
        {
            let mut state = self.session_state.write().await;
            state.acquired_at = Some(Utc::now());
            state.cookie_count = cookie_count;
            state.failure_count = 0;
        }

        info!("Session established with {} cookies", cookie_count);
        Ok(cookie_count)
    }

    /// Cookie header the session would send to the site, if any cookies are held
    pub fn cookie_header(&self) -> Option<String> {
        self.jar
            .cookies(&self.site_url)
            .and_then(|value| value.to_str().ok().map(str::to_string))
    }

    fn cookie_count(&self) -> usize {
        self.cookie_header()
            .map(|header| header.split(';').filter(|c| !c.trim().is_empty()).count())
            .unwrap_or(0)
    }

    async fn record_failure(&self) {
        let mut state = self.session_state.write().await;
        state.failure_count += 1;
        warn!(
            "Session acquisition failed, failure count: {}",
            state.failure_count
        );
    }

    /// Get the HTTP client carrying the session cookies
    pub fn get_client(&self) -> &Client {
        &self.client
    }

    /// Session settings
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Get current session statistics
    pub async fn get_session_stats(&self) -> SessionStats {
        let state = self.session_state.read().await;

        SessionStats {
            acquired: state.acquired_at.is_some(),
            acquired_at: state.acquired_at,
            cookie_count: state.cookie_count,
            failure_count: state.failure_count,
            user_agent: self.config.user_agent.clone(),
        }
    }
}

/// Statistics about the current session
#[derive(Debug, Serialize)]
pub struct SessionStats {
    /// Whether cookies were acquired successfully at least once
    pub acquired: bool,
    /// When cookies were last acquired
    pub acquired_at: Option<DateTime<Utc>>,
    /// Cookies held for the site
    pub cookie_count: usize,
    /// Failed acquisitions since the last success
    pub failure_count: u32,
    /// User agent in use
    pub user_agent: String,
}
