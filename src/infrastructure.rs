//! Infrastructure layer: HTTP access, HTML parsing, configuration, logging

pub mod config;
pub mod http_client;
pub mod logging;
pub mod parsing;
pub mod search_error;
pub mod search_page_fetcher;

// Re-export commonly used items
pub use config::{AppConfig, ConfigManager, LoggingConfig, mercari};
pub use http_client::{HttpClient, HttpClientConfig};
pub use logging::{build_subscriber, get_log_directory, init_logging_with_config};
pub use parsing::{ContextualParser, ListingExtractor, ListingSelectors, PageContext};
pub use search_error::{SearchError, SearchResult};
pub use search_page_fetcher::{FetchedPage, PageSource, SearchPageFetcher};
