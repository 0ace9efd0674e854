use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use http_cache::{CachedResponse, ResponseCache};
use reqwest::header::USER_AGENT;
use reqwest::{Client, Request, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::types::FetchError;

/// HTTP client that replays successful GET responses from a [`ResponseCache`].
///
/// Requests are keyed by their full signature (method, URL with query, user agent), so an
/// identical request inside the cache lifetime never reaches the network.
pub struct CachedClient {
    client: Client,
    cache: Arc<dyn ResponseCache>,
    user_agent: String,
    timeout: Duration,
}

impl CachedClient {
    /// Wrap a client (usually the session client) with a response cache
    pub fn new(
        client: Client,
        cache: Arc<dyn ResponseCache>,
        user_agent: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            cache,
            user_agent: user_agent.into(),
            timeout,
        }
    }

    /// Build the GET request for `url` with `params` appended to its query
    pub fn build_request(&self, url: &str, params: &[(&str, String)]) -> Result<Request, FetchError> {
        self.client
            .get(url)
            .query(params)
            .header(USER_AGENT, &self.user_agent)
            .timeout(self.timeout)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))
    }

    /// Cache key for a request
    pub fn request_signature(&self, request: &Request) -> String {
        format!(
            "{} {} user-agent={}",
            request.method(),
            request.url(),
            self.user_agent
        )
    }

    /// GET `url` with `params` and decode the body as JSON.
    ///
    /// Only `200 OK` responses are cached. Cache failures are logged and never fail the request.
    pub async fn get_json(&self, url: &str, params: &[(&str, String)]) -> Result<Value, FetchError> {
        let body = self.get_text(url, params).await?;
        serde_json::from_str(&body).map_err(|e| FetchError::Parse(e.to_string()))
    }

    /// GET `url` with `params` and return the body text
    pub async fn get_text(&self, url: &str, params: &[(&str, String)]) -> Result<String, FetchError> {
        let request = self.build_request(url, params)?;
        let full_url = request.url().to_string();
        let key = self.request_signature(&request);

        match self.cache.get(&key, Utc::now()).await {
            Ok(Some(cached)) if cached.status == StatusCode::OK.as_u16() => {
                debug!("Cache hit for {}", full_url);
                return Ok(cached.body);
            }
            Ok(Some(cached)) => {
                debug!("Ignoring cached {} response for {}", cached.status, full_url);
            }
            Ok(None) => {}
            Err(e) => warn!("Cache read failed for {}: {}", full_url, e),
        }

        debug!("Requesting {}", full_url);

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if status == StatusCode::OK {
            let cached = CachedResponse::new(status.as_u16(), body.clone(), Utc::now());
            if let Err(e) = self.cache.put(&key, cached).await {
                warn!("Cache write failed for {}: {}", full_url, e);
            }
        } else {
            debug!("Not caching {} response for {}", status, full_url);
        }

        Ok(body)
    }
}
