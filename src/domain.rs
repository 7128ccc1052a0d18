//! Domain module - listing records and host messages
//!
//! Each module is its own file in the domain/ directory;
//! public exports are defined here for convenience.

pub mod listing;
pub mod message;

pub use listing::ListingRecord;
pub use message::Message;
