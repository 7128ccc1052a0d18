//! Mercari search node
//!
//! Fetches one Mercari Japan search results page for a keyword and turns the
//! listing cards on it into [`ListingRecord`]s. The search is exposed to flow
//! hosts as a single node type, `mercari-search`.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{MercariSearchNode, SearchService};
pub use domain::{ListingRecord, Message};
pub use infrastructure::{ListingExtractor, SearchError, SearchPageFetcher, SearchResult};
