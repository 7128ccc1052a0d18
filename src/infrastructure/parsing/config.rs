//! CSS selector table for Mercari search result pages
//!
//! The site publishes no stable markup contract. Every class marker the
//! extractor depends on lives in this one table.

/// Field -> selector mapping for one listing card.
///
/// All selectors except `container` are evaluated relative to a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingSelectors {
    /// One product card
    pub container: &'static str,
    /// Anchor pointing to the listing detail page
    pub link: &'static str,
    pub name: &'static str,
    pub price: &'static str,
    /// Thumbnail image element
    pub image: &'static str,
    /// Badge rendered only on sold out cards
    pub sold_out_badge: &'static str,
}

impl ListingSelectors {
    pub const MERCARI: Self = Self {
        container: ".items-box",
        link: "a",
        name: ".items-box-name",
        price: ".items-box-price",
        image: ".items-box-photo img",
        sold_out_badge: ".item-sold-out-badge",
    };
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self::MERCARI
    }
}
