//! HTML parsing infrastructure for search result pages
//!
//! Trait-based parsing: a parser is built once from a selector table and is
//! then applied to any number of documents.

pub mod config;
pub mod context;
pub mod listing_parser;

pub use config::ListingSelectors;
pub use context::PageContext;
pub use listing_parser::ListingExtractor;

use crate::infrastructure::search_error::SearchResult;
use scraper::Html;

/// Parser that needs information about the page it is reading
pub trait ContextualParser {
    type Output;
    type Context;

    /// Parse HTML with contextual information
    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> SearchResult<Self::Output>;
}
