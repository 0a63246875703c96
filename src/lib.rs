//! jobscrape - job board ingestion through a locked headless browser.
//!
//! Scrapes a JavaScript-rendered job board with at most one browser session
//! running at a time across all instances, then normalizes the scraped rows
//! into deduplicated, typed listings served as JSON.

pub mod browser;
pub mod config;
pub mod error;
pub mod lock;
pub mod models;
pub mod normalize;
pub mod scrapers;
pub mod server;
pub mod services;
