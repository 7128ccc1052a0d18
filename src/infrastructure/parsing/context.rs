//! Parsing context for search result pages

use url::Url;

/// The page a document was fetched from
#[derive(Debug, Clone)]
pub struct PageContext {
    /// URL used for the request; relative links resolve against it
    pub page_url: Url,
}

impl PageContext {
    pub const fn new(page_url: Url) -> Self {
        Self { page_url }
    }
}
