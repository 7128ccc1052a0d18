//! Search use case: keyword in, listing records out

use crate::domain::listing::ListingRecord;
use crate::infrastructure::parsing::{ContextualParser, ListingExtractor, PageContext};
use crate::infrastructure::search_error::SearchResult;
use crate::infrastructure::search_page_fetcher::{FetchedPage, PageSource};
use std::sync::Arc;
use tracing::info;

/// Fetches one search page and extracts its listings
#[derive(Clone)]
pub struct SearchService {
    source: Arc<dyn PageSource>,
    extractor: &'static ListingExtractor,
}

impl SearchService {
    pub fn new(source: Arc<dyn PageSource>) -> SearchResult<Self> {
        Ok(Self {
            source,
            extractor: ListingExtractor::shared()?,
        })
    }

    /// Search for `keyword`; any fetch failure aborts the whole call
    pub async fn search(&self, keyword: &str) -> SearchResult<Vec<ListingRecord>> {
        let page = self.source.fetch_page(keyword).await?;
        let records = self.extract_page(&page)?;

        info!("Found {} listings for keyword '{}'", records.len(), keyword);
        Ok(records)
    }

    // Sync so the parsed document never lives across an await
    fn extract_page(&self, page: &FetchedPage) -> SearchResult<Vec<ListingRecord>> {
        let document = page.document();
        let context = PageContext::new(page.url.clone());
        self.extractor.parse_with_context(&document, &context)
    }
}
