//! Search page fetcher
//!
//! Turns a keyword into the Mercari search URL and downloads that page.
//! One request per call, no caching.

use crate::infrastructure::config::mercari;
use crate::infrastructure::http_client::{HttpClient, HttpClientConfig};
use crate::infrastructure::search_error::{SearchError, SearchResult};
use async_trait::async_trait;
use scraper::Html;
use std::sync::Arc;
use url::Url;

/// Raw search page together with the URL it was requested from
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: Url,
    pub body: String,
}

impl FetchedPage {
    /// Parse the body as an HTML document
    pub fn document(&self) -> Html {
        Html::parse_document(&self.body)
    }
}

/// Source of search result pages
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Retrieve the results page for `keyword`
    async fn fetch_page(&self, keyword: &str) -> SearchResult<FetchedPage>;
}

/// Fetches search pages from the live site
pub struct SearchPageFetcher {
    client: Arc<HttpClient>,
    search_base: Url,
}

impl SearchPageFetcher {
    /// Fetcher for the Mercari search page
    pub fn new(client: Arc<HttpClient>) -> SearchResult<Self> {
        let search_base = Url::parse(mercari::SEARCH_PAGE).map_err(|e| SearchError::Configuration {
            message: format!("Invalid search page URL {}: {e}", mercari::SEARCH_PAGE),
        })?;
        Ok(Self::with_search_base(client, search_base))
    }

    /// Build a client from `config` and a fetcher on top of it
    pub fn from_config(config: HttpClientConfig) -> SearchResult<Self> {
        Self::new(Arc::new(HttpClient::new(config)?))
    }

    /// Fetcher that targets a different search endpoint (mirrors, local servers)
    pub const fn with_search_base(client: Arc<HttpClient>, search_base: Url) -> Self {
        Self { client, search_base }
    }

    /// Search URL for `keyword`, with the keyword query-encoded
    pub fn search_url(&self, keyword: &str) -> Url {
        let mut url = self.search_base.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair(mercari::KEYWORD_PARAM, keyword);
        url
    }
}

#[async_trait]
impl PageSource for SearchPageFetcher {
    async fn fetch_page(&self, keyword: &str) -> SearchResult<FetchedPage> {
        let url = self.search_url(keyword);
        let body = self.client.get_text(&url).await?;
        Ok(FetchedPage { url, body })
    }
}
