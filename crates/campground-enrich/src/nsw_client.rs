use serde_json::Value;
use tracing::debug;

use crate::cached_client::CachedClient;
use crate::types::FetchError;

/// Availability endpoint of the NSW National Parks reservation API
pub const DEFAULT_AVAILABILITY_URL: &str =
    "https://www.nationalparks.nsw.gov.au/npws/ReservationApi/AvailabilityDates";

/// Source of bookable dates for a campground
#[async_trait::async_trait]
pub trait AvailabilityClient: Send + Sync {
    /// Dates (`DD/MM/YYYY`) on which the campground identified by `context_id` can be booked
    async fn fetch_dates(&self, context_id: &str) -> Result<Vec<String>, FetchError>;
}

/// Client for the NSW National Parks reservation API
pub struct NswParksClient {
    http: CachedClient,
    availability_url: String,
}

impl NswParksClient {
    /// Create a client over a cached, cookie-carrying HTTP client
    pub fn new(http: CachedClient, availability_url: impl Into<String>) -> Self {
        Self {
            http,
            availability_url: availability_url.into(),
        }
    }

    /// Query parameters for a two-adult availability lookup
    fn availability_params(context_id: &str) -> Vec<(&'static str, String)> {
        vec![
            ("contextItemId", context_id.to_string()),
            ("adults", "2".to_string()),
            ("children", "0".to_string()),
            ("infants", "0".to_string()),
        ]
    }
}

#[async_trait::async_trait]
impl AvailabilityClient for NswParksClient {
    async fn fetch_dates(&self, context_id: &str) -> Result<Vec<String>, FetchError> {
        debug!("Fetching availability for context {}", context_id);

        let params = Self::availability_params(context_id);
        let payload = self.http.get_json(&self.availability_url, &params).await?;

        parse_availability_payload(&payload).ok_or(FetchError::UnexpectedShape)
    }
}

/// Fetch dates for `context_id`, collapsing every failure to `None`
pub async fn fetch_availability(
    client: &dyn AvailabilityClient,
    context_id: &str,
) -> Option<Vec<String>> {
    match client.fetch_dates(context_id).await {
        Ok(dates) => Some(dates),
        Err(e) => {
            debug!("Availability lookup for {} failed: {}", context_id, e);
            None
        }
    }
}

/// Extract the date list from an availability response.
///
/// The response shape is not documented, so several are accepted, in this order:
/// 1. an object with a truthy `dates` value, or failing that its `Dates` value, holding an
///    array of strings;
/// 2. a bare array of strings.
///
/// Anything else yields `None`.
pub fn parse_availability_payload(payload: &Value) -> Option<Vec<String>> {
    match payload {
        Value::Object(fields) => {
            let dates = fields
                .get("dates")
                .filter(|v| is_truthy(v))
                .or_else(|| fields.get("Dates"))?;
            string_array(dates)
        }
        Value::Array(_) => string_array(payload),
        _ => None,
    }
}

fn string_array(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session_manager::{SessionConfig, SessionManager};
    use http_cache::MemoryCache;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_lowercase_key_wins() {
        let payload = json!({"dates": ["01/01/2025"], "Dates": ["02/01/2025"]});
        assert_eq!(
            parse_availability_payload(&payload),
            Some(strings(&["01/01/2025"]))
        );
    }

    #[test]
    fn test_capitalised_key_used_when_lowercase_missing_or_empty() {
        let payload = json!({"Dates": ["02/01/2025"]});
        assert_eq!(
            parse_availability_payload(&payload),
            Some(strings(&["02/01/2025"]))
        );

        let payload = json!({"dates": [], "Dates": ["02/01/2025"]});
        assert_eq!(
            parse_availability_payload(&payload),
            Some(strings(&["02/01/2025"]))
        );

        let payload = json!({"dates": null, "Dates": ["02/01/2025"]});
        assert_eq!(
            parse_availability_payload(&payload),
            Some(strings(&["02/01/2025"]))
        );
    }

    #[test]
    fn test_bare_array_returned_unchanged() {
        let payload = json!(["01/01/2025", "02/01/2025"]);
        assert_eq!(
            parse_availability_payload(&payload),
            Some(strings(&["01/01/2025", "02/01/2025"]))
        );
    }

    #[test]
    fn test_unexpected_shapes() {
        assert_eq!(parse_availability_payload(&json!({"other": 1})), None);
        assert_eq!(parse_availability_payload(&json!({"dates": "01/01/2025"})), None);
        assert_eq!(parse_availability_payload(&json!({"dates": ["01/01/2025", 2]})), None);
        assert_eq!(parse_availability_payload(&json!([1, 2])), None);
        assert_eq!(parse_availability_payload(&json!("01/01/2025")), None);
        assert_eq!(parse_availability_payload(&Value::Null), None);
    }

    #[test]
    fn test_truthy_non_list_dates_does_not_fall_through() {
        let payload = json!({"dates": "soon", "Dates": ["02/01/2025"]});
        assert_eq!(parse_availability_payload(&payload), None);
    }

    async fn nsw_client(server: &MockServer, cache: Arc<MemoryCache>) -> NswParksClient {
        let session = SessionManager::new(Some(SessionConfig {
            base_url: server.url("/"),
            timeout: Duration::from_secs(5),
            ..SessionConfig::default()
        }))
        .unwrap();

        let http = CachedClient::new(
            session.get_client().clone(),
            cache,
            session.config().user_agent.clone(),
            session.config().timeout,
        );
        NswParksClient::new(http, server.url("/npws/ReservationApi/AvailabilityDates"))
    }

    #[tokio::test]
    async fn test_fetch_sends_expected_query() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/npws/ReservationApi/AvailabilityDates")
                    .query_param("contextItemId", "X1")
                    .query_param("adults", "2")
                    .query_param("children", "0")
                    .query_param("infants", "0");
                then.status(200)
                    .json_body(json!({"dates": ["01/01/2025"], "Dates": ["02/01/2025"]}));
            })
            .await;

        let client = nsw_client(&server, Arc::new(MemoryCache::new(Duration::from_secs(60)))).await;
        let dates = fetch_availability(&client, "X1").await;

        mock.assert_async().await;
        assert_eq!(dates, Some(strings(&["01/01/2025"])));
    }

    #[tokio::test]
    async fn test_fetch_collapses_failures_to_none() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).query_param("contextItemId", "OTHER");
                then.status(200).json_body(json!({"other": 1}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).query_param("contextItemId", "BROKEN");
                then.status(200).body("{not json");
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).query_param("contextItemId", "GONE");
                then.status(404);
            })
            .await;

        let client = nsw_client(&server, Arc::new(MemoryCache::new(Duration::from_secs(60)))).await;

        assert_eq!(
            client.fetch_dates("OTHER").await,
            Err(FetchError::UnexpectedShape)
        );
        assert!(matches!(
            client.fetch_dates("BROKEN").await,
            Err(FetchError::Parse(_))
        ));
        assert_eq!(client.fetch_dates("GONE").await, Err(FetchError::HttpStatus(404)));

        for id in ["OTHER", "BROKEN", "GONE"] {
            assert_eq!(fetch_availability(&client, id).await, None);
        }
    }

    #[tokio::test]
    async fn test_session_cookies_are_forwarded() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/");
                then.status(200).header("Set-Cookie", "session=abc; Path=/");
            })
            .await;
        let availability = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/npws/ReservationApi/AvailabilityDates")
                    .header("cookie", "session=abc");
                then.status(200).json_body(json!(["01/01/2025"]));
            })
            .await;

        let session = SessionManager::new(Some(SessionConfig {
            base_url: server.url("/"),
            timeout: Duration::from_secs(5),
            ..SessionConfig::default()
        }))
        .unwrap();
        session.acquire_cookies().await.unwrap();

        let http = CachedClient::new(
            session.get_client().clone(),
            Arc::new(MemoryCache::new(Duration::from_secs(60))),
            session.config().user_agent.clone(),
            session.config().timeout,
        );
        let client =
            NswParksClient::new(http, server.url("/npws/ReservationApi/AvailabilityDates"));

        let dates = client.fetch_dates("X1").await.unwrap();

        availability.assert_async().await;
        assert_eq!(dates, strings(&["01/01/2025"]));
    }
}
