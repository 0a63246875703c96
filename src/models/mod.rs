//! Data models for board ingestion.

mod listing;
mod location;

pub use listing::{
    format_id, upstream_url, CanonicalListing, Column, ListingProperties, PostDetail, RawBlock,
};
pub use location::LocationKey;
