//! arrivelah HTTP client.

use std::time::Duration;

use tracing::debug;

use crate::domain::StopId;

use super::error::FetchError;
use super::types::{ArrivalResponse, RawServiceRecord};

/// Default base URL for the arrivelah API.
const DEFAULT_BASE_URL: &str = "https://arrivelah2.busrouter.sg";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How much of an unparseable body to keep for diagnostics.
const BODY_SNIPPET_CHARS: usize = 500;

/// Configuration for the arrival client.
#[derive(Debug, Clone)]
pub struct ArrivalClientConfig {
    /// Base URL for the API (defaults to the public arrivelah instance)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl ArrivalClientConfig {
    /// Create a config pointing at the public API.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom base URL (for testing or self-hosted instances).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for ArrivalClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// arrivelah API client.
///
/// Each call to `get_arrivals` is exactly one GET request. There is no
/// retry here; callers poll again on their own schedule.
#[derive(Debug, Clone)]
pub struct ArrivalClient {
    http: reqwest::Client,
    base_url: String,
}

impl ArrivalClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ArrivalClientConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch arrival predictions for a stop.
    ///
    /// The stop must not be empty; empty identifiers are filtered out
    /// before any request is made.
    pub async fn get_arrivals(&self, stop: &StopId) -> Result<Vec<RawServiceRecord>, FetchError> {
        debug_assert!(!stop.is_empty(), "empty stop identifiers are never fetched");

        let url = format!("{}/", self.base_url);
        debug!(stop = %stop, "requesting arrivals");

        let response = self
            .http
            .get(&url)
            .query(&[("id", stop.as_str())])
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        classify_body(&body)
    }
}

/// Parse an arrivals response body and classify the outcome.
///
/// - `services` null or absent: [`FetchError::InvalidStop`]
/// - `services` empty: [`FetchError::NoActiveService`]
/// - body not JSON of the expected shape: [`FetchError::Json`]
pub fn classify_body(body: &str) -> Result<Vec<RawServiceRecord>, FetchError> {
    let response: ArrivalResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(BODY_SNIPPET_CHARS).collect()),
        })?;

    match response.services {
        None => Err(FetchError::InvalidStop),
        Some(services) if services.is_empty() => Err(FetchError::NoActiveService),
        Some(services) => Ok(services),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = ArrivalClientConfig::new()
            .with_base_url("http://localhost:8080")
            .with_timeout(5);

        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn config_defaults() {
        let config = ArrivalClientConfig::default();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn client_creation_strips_trailing_slash() {
        let config = ArrivalClientConfig::new().with_base_url("http://localhost:8080/");
        let client = ArrivalClient::new(config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn classify_success() {
        let body = r#"{"services": [{"no": "15", "operator": "SBST"}]}"#;
        let services = classify_body(body).unwrap();
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].line_hint(), Some("15"));
    }

    #[test]
    fn classify_invalid_stop() {
        assert!(matches!(
            classify_body(r#"{"services": null}"#),
            Err(FetchError::InvalidStop)
        ));
        assert!(matches!(classify_body("{}"), Err(FetchError::InvalidStop)));
    }

    #[test]
    fn classify_no_active_service() {
        assert!(matches!(
            classify_body(r#"{"services": []}"#),
            Err(FetchError::NoActiveService)
        ));
    }

    #[test]
    fn classify_unparseable_body() {
        let err = classify_body("<html>502 Bad Gateway</html>").unwrap_err();
        assert!(err.is_transport());
        match err {
            FetchError::Json { body, .. } => {
                assert_eq!(body.as_deref(), Some("<html>502 Bad Gateway</html>"));
            }
            other => panic!("expected Json error, got {other:?}"),
        }

        // `services` of the wrong type makes the whole body unusable
        assert!(classify_body(r#"{"services": "none"}"#).unwrap_err().is_transport());
    }

    #[test]
    fn classify_truncates_large_bodies() {
        let body = "x".repeat(2000);
        match classify_body(&body) {
            Err(FetchError::Json { body: Some(snippet), .. }) => {
                assert_eq!(snippet.len(), BODY_SNIPPET_CHARS);
            }
            other => panic!("expected Json error, got {other:?}"),
        }
    }
}
