//! HTTP client for fetching search pages
//!
//! A thin wrapper over `reqwest` that adds a shared rate limiter and maps
//! transport failures onto [`SearchError`]. Requests are never retried.

use crate::infrastructure::config::defaults;
use crate::infrastructure::search_error::{SearchError, SearchResult};
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, direct::NotKeyed},
};
use reqwest::{
    Client,
    header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue},
};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    /// 0 disables rate limiting
    pub max_requests_per_second: u32,
    pub follow_redirects: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::USER_AGENT.to_string(),
            timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            max_requests_per_second: defaults::MAX_REQUESTS_PER_SECOND,
            follow_redirects: true,
        }
    }
}

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// HTTP client with rate limiting, safe to share across concurrent searches
pub struct HttpClient {
    client: Client,
    rate_limiter: Option<DirectRateLimiter>,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with the given configuration
    pub fn new(config: HttpClientConfig) -> SearchResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("ja,en;q=0.8"));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()
            .map_err(|e| SearchError::Configuration {
                message: format!("Failed to create HTTP client: {e}"),
            })?;

        let rate_limiter =
            NonZeroU32::new(config.max_requests_per_second).map(|rps| RateLimiter::direct(Quota::per_second(rps)));

        Ok(Self {
            client,
            rate_limiter,
            config,
        })
    }

    /// Fetch a URL and return its body as text
    pub async fn get_text(&self, url: &Url) -> SearchResult<String> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        info!("Fetching URL: {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| SearchError::request_failed(url.as_str(), &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let text = response.text().await.map_err(|e| SearchError::BodyDecodeFailed {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        debug!("Successfully fetched: {} ({} chars)", url, text.len());
        Ok(text)
    }

    /// Get the configuration
    pub const fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}
