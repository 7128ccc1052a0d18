//! Listing extractor for search result pages
//!
//! Walks every listing container in document order and turns each one into
//! a [`ListingRecord`]. Containers are independent: a card that lacks some
//! sub-element yields a sparser record, never an error.

use super::{ContextualParser, ListingSelectors, PageContext};
use crate::domain::listing::ListingRecord;
use crate::infrastructure::search_error::{SearchError, SearchResult};
use once_cell::sync::OnceCell;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

static SHARED_EXTRACTOR: OnceCell<ListingExtractor> = OnceCell::new();

/// Extracts listing records using a compiled selector table
#[derive(Debug)]
pub struct ListingExtractor {
    container: Selector,
    link: Selector,
    name: Selector,
    price: Selector,
    image: Selector,
    sold_out_badge: Selector,
}

impl ListingExtractor {
    /// Create an extractor for the Mercari markup
    pub fn new() -> SearchResult<Self> {
        Self::with_selectors(&ListingSelectors::MERCARI)
    }

    /// Create an extractor from a custom selector table
    pub fn with_selectors(selectors: &ListingSelectors) -> SearchResult<Self> {
        Ok(Self {
            container: Self::compile_selector(selectors.container)?,
            link: Self::compile_selector(selectors.link)?,
            name: Self::compile_selector(selectors.name)?,
            price: Self::compile_selector(selectors.price)?,
            image: Self::compile_selector(selectors.image)?,
            sold_out_badge: Self::compile_selector(selectors.sold_out_badge)?,
        })
    }

    /// Process-wide extractor for the Mercari markup, compiled on first use
    pub fn shared() -> SearchResult<&'static Self> {
        SHARED_EXTRACTOR.get_or_try_init(Self::new)
    }

    fn compile_selector(selector: &str) -> SearchResult<Selector> {
        Selector::parse(selector).map_err(|e| {
            warn!("Failed to compile selector '{}': {}", selector, e);
            SearchError::invalid_selector(selector, &e)
        })
    }

    /// Extract one record per listing container, in document order
    pub fn extract(&self, document: &Html, page_url: &Url) -> Vec<ListingRecord> {
        let records: Vec<ListingRecord> = document
            .select(&self.container)
            .enumerate()
            .map(|(index, container)| self.extract_record(container, index, page_url))
            .collect();

        debug!("Extracted {} listings from {}", records.len(), page_url);
        records
    }

    /// Parse `html` and extract its listings
    pub fn extract_from_str(&self, html: &str, page_url: &Url) -> Vec<ListingRecord> {
        let document = Html::parse_document(html);
        self.extract(&document, page_url)
    }

    fn extract_record(&self, container: ElementRef<'_>, index: usize, page_url: &Url) -> ListingRecord {
        let href = Self::first_attr(container, &self.link, "href");
        let url = href.as_deref().and_then(|href| Self::resolve_url(href, page_url));

        if href.is_none() {
            debug!("Listing {} has no link", index);
        }

        ListingRecord {
            name: Self::collect_text(container, &self.name),
            price: Self::collect_text(container, &self.price),
            image: Self::first_attr(container, &self.image, "src"),
            url,
            href,
            sold_out: container.select(&self.sold_out_badge).next().is_some(),
        }
    }

    /// Text of every match, concatenated, untrimmed
    fn collect_text(container: ElementRef<'_>, selector: &Selector) -> String {
        container
            .select(selector)
            .flat_map(|element| element.text())
            .collect()
    }

    /// Attribute of the first match only
    fn first_attr(container: ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
        container
            .select(selector)
            .next()
            .and_then(|element| element.value().attr(attr))
            .map(str::to_string)
    }

    /// Resolve `href` against the page URL with standard URL rules
    fn resolve_url(href: &str, page_url: &Url) -> Option<String> {
        match page_url.join(href) {
            Ok(url) => Some(url.into()),
            Err(e) => {
                warn!("Failed to resolve listing link '{}' against {}: {}", href, page_url, e);
                None
            }
        }
    }
}

impl ContextualParser for ListingExtractor {
    type Output = Vec<ListingRecord>;
    type Context = PageContext;

    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> SearchResult<Self::Output> {
        Ok(self.extract(html, &context.page_url))
    }
}
