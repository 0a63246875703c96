//! Text normalization for scraped board rows.
//!
//! - `tags`: comma splitting and placeholder cleansing
//! - `salary`: range canonicalization and numeric extraction
//! - `location`: Jaro-Winkler matching onto canonical location keys
//! - `pipeline`: dedup + projection of raw rows into listings

mod location;
mod pipeline;
mod salary;
mod tags;

pub use location::{jaro, jaro_winkler, LocationMatch, LocationMatcher, DEFAULT_MATCH_THRESHOLD};
pub use pipeline::{dedup_blocks, listing_salary_value, sort_by_salary, Normalizer};
pub use salary::{normalize_salary, parse_salary_value};
pub use tags::{clean_company, tagify};
