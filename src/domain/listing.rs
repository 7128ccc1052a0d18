use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// One product card scraped from a search results page.
///
/// Text fields are kept exactly as they appear in the markup: nothing is
/// trimmed, and `price` keeps its currency formatting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ListingRecord {
    pub name: String,
    pub price: String,
    pub image: Option<String>,
    /// `href` resolved against the search page URL
    pub url: Option<String>,
    /// Link target as written in the markup
    pub href: Option<String>,
    pub sold_out: bool,
}

impl ListingRecord {
    /// Whether the record carries a usable link to the listing detail page
    pub fn has_link(&self) -> bool {
        self.url.is_some()
    }
}
