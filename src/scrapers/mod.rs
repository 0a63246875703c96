//! Job board scrapers.

mod board;
mod config;
pub mod extract;

pub use board::{BoardScraper, PageTimeouts, LIST_RESOURCE};
pub use config::{BoardConfig, DetailSelectors, ListSelectors};
pub use extract::{extract_blocks, extract_detail};
