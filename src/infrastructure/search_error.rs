//! Error types for fetching and extracting a search results page
//!
//! Every variant carries plain strings so errors stay `Clone` and can travel
//! with the message they failed on.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("HTTP request failed: {url} - {message}")]
    RequestFailed { url: String, message: String },

    #[error("HTTP request failed with status {status}: {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to read response body from {url}: {message}")]
    BodyDecodeFailed { url: String, message: String },

    #[error("Invalid search keyword: {reason}")]
    InvalidKeyword { reason: String },

    #[error("Invalid CSS selector: {selector} - {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Failed to serialize listings: {message}")]
    Serialization { message: String },
}

impl SearchError {
    pub fn request_failed(url: &str, error: &impl std::fmt::Display) -> Self {
        Self::RequestFailed {
            url: url.to_string(),
            message: error.to_string(),
        }
    }

    pub fn invalid_keyword(reason: impl Into<String>) -> Self {
        Self::InvalidKeyword {
            reason: reason.into(),
        }
    }

    pub fn invalid_selector(selector: &str, reason: &impl std::fmt::Display) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }

    /// True when the failure happened while talking to the site
    pub const fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Self::RequestFailed { .. } | Self::HttpStatus { .. } | Self::BodyDecodeFailed { .. }
        )
    }
}

pub type SearchResult<T> = Result<T, SearchError>;
