use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, instrument, warn};

use launchpad_core::{CoreError, CoreResult, ExternalLaunchFetcher, RawLaunchDocument};

use crate::retry::RetryPolicy;

/// Public SpaceX API base URL
pub const DEFAULT_SPACEX_API_URL: &str = "https://api.spacexdata.com";

const SOURCE_NAME: &str = "spacex";

/// Configuration for the SpaceX client
#[derive(Debug, Clone)]
pub struct SpaceXClientConfig {
    /// Base URL of the SpaceX API
    pub base_url: String,
    /// Timeout in seconds for each HTTP request
    pub timeout_secs: u64,
    /// Retry behaviour for transient failures
    pub retry: RetryPolicy,
}

impl Default for SpaceXClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SPACEX_API_URL.to_string(),
            timeout_secs: 30,
            retry: RetryPolicy::default(),
        }
    }
}

/// Query response envelope; documents live under `docs`
#[derive(Debug, Deserialize)]
struct LaunchQueryResponse {
    docs: Vec<RawLaunchDocument>,
}

/// Client for the SpaceX launches query endpoint
#[derive(Debug, Clone)]
pub struct SpaceXClient {
    config: SpaceXClientConfig,
    client: Client,
}

impl SpaceXClient {
    /// Creates a new SpaceXClient with the provided configuration
    pub fn new(config: SpaceXClientConfig) -> CoreResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                CoreError::ConfigurationError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// Creates a client for the given base URL with default settings
    pub fn with_url(base_url: impl Into<String>) -> CoreResult<Self> {
        Self::new(SpaceXClientConfig {
            base_url: base_url.into(),
            ..SpaceXClientConfig::default()
        })
    }

    fn query_url(&self) -> String {
        format!(
            "{}/v4/launches/query",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// Unpaginated query populating rocket names and payload customers
    fn query_body() -> Value {
        json!({
            "query": {},
            "options": {
                "pagination": false,
                "populate": [
                    { "path": "rocket", "select": { "name": 1 } },
                    { "path": "payloads", "select": { "customers": 1 } }
                ]
            }
        })
    }

    /// Maps a transport error to a CoreError
    fn map_http_error(error: reqwest::Error) -> CoreError {
        if error.is_timeout() {
            CoreError::NetworkError(format!("Request timeout: {}", error))
        } else if error.is_connect() {
            CoreError::NetworkError(format!("Connection error: {}", error))
        } else {
            CoreError::NetworkError(format!("HTTP error: {}", error))
        }
    }

    async fn fetch_once(&self) -> CoreResult<Vec<RawLaunchDocument>> {
        let response = self
            .client
            .post(self.query_url())
            .json(&Self::query_body())
            .send()
            .await
            .map_err(Self::map_http_error)?;

        let status = response.status();
        let body = response.text().await.map_err(Self::map_http_error)?;

        if !status.is_success() {
            return Err(CoreError::FetchError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: LaunchQueryResponse = serde_json::from_str(&body).map_err(|e| {
            CoreError::SerializationError(format!("Failed to parse launch data: {}", e))
        })?;

        Ok(parsed.docs)
    }
}

#[async_trait]
impl ExternalLaunchFetcher for SpaceXClient {
    fn source_name(&self) -> &str {
        SOURCE_NAME
    }

    #[instrument(skip(self), fields(url = %self.query_url()))]
    async fn fetch_all(&self) -> CoreResult<Vec<RawLaunchDocument>> {
        let policy = &self.config.retry;
        let mut attempt = 1;

        loop {
            match self.fetch_once().await {
                Ok(docs) => {
                    info!(count = docs.len(), attempt, "Downloaded launch data");
                    return Ok(docs);
                }
                Err(err) if err.is_transient() && policy.should_retry(attempt) => {
                    let delay = policy.delay_for(attempt);
                    warn!(attempt, ?delay, error = %err, "Launch data download failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    debug!(attempt, error = %err, "Launch data download failed");
                    return Err(err);
                }
            }
        }
    }
}
