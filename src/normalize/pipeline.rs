//! Raw block → canonical listing pipeline.
//!
//! Every step is total: malformed cells become `None`, unmatched locations
//! become `ANYWHERE`, and one bad row never drops the rest of the batch.

use std::collections::HashSet;

use crate::models::{
    format_id, upstream_url, CanonicalListing, Column, ListingProperties, LocationKey, RawBlock,
};

use super::location::LocationMatcher;
use super::salary::{normalize_salary, parse_salary_value};
use super::tags::{clean_company, tagify};

/// Converts scraped rows into canonical listings.
#[derive(Debug, Clone)]
pub struct Normalizer {
    detail_base_url: String,
    matcher: LocationMatcher,
}

impl Normalizer {
    pub fn new(detail_base_url: impl Into<String>, matcher: LocationMatcher) -> Self {
        Self {
            detail_base_url: detail_base_url.into(),
            matcher,
        }
    }

    pub fn matcher(&self) -> &LocationMatcher {
        &self.matcher
    }

    /// Run the full pipeline: validity filter, dedup, projection.
    pub fn normalize(&self, blocks: Vec<RawBlock>) -> Vec<CanonicalListing> {
        let total = blocks.len();
        let valid: Vec<RawBlock> = blocks.into_iter().filter(RawBlock::is_valid).collect();
        let unique = dedup_blocks(valid);

        if unique.len() != total {
            tracing::debug!(
                "Normalized {} of {} scraped rows ({} invalid or duplicate)",
                unique.len(),
                total,
                total - unique.len()
            );
        }

        unique.iter().map(|block| self.project(block)).collect()
    }

    /// Map one row's positional cells onto a listing.
    pub fn project(&self, block: &RawBlock) -> CanonicalListing {
        let formatted_id = format_id(&block.id);
        let location = block.cell(Column::Location).map(str::to_string);
        let location_tags = location
            .as_deref()
            .map(|raw| self.location_tags(raw))
            .unwrap_or_default();

        let properties = ListingProperties {
            title: block.cell(Column::Title).map(str::to_string),
            status: block.cell(Column::Status).map(str::to_string),
            company: clean_company(block.cell(Column::Company)),
            category: block.cell(Column::Category).map(str::to_string),
            location,
            location_tags,
            remote_policy: block.cell(Column::OfficePolicy).map(str::to_string),
            skills: block.cell(Column::Skills).map(skill_tags).unwrap_or_default(),
            salary_range: block.cell(Column::Salary).and_then(normalize_salary),
        };

        CanonicalListing {
            id: block.id.clone(),
            row_index: block.row_index,
            apply_link: upstream_url(&self.detail_base_url, &formatted_id),
            formatted_id,
            properties,
        }
    }

    /// Distinct location keys for a comma-joined location cell, in first-seen order.
    fn location_tags(&self, raw: &str) -> Vec<LocationKey> {
        let mut tags = Vec::new();
        for part in tagify(raw) {
            let key = self.matcher.resolve(&part);
            if !tags.contains(&key) {
                tags.push(key);
            }
        }
        tags
    }
}

/// Distinct skill tags in first-seen order.
fn skill_tags(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    tagify(raw)
        .into_iter()
        .filter(|tag| seen.insert(tag.clone()))
        .collect()
}

/// Keep the first occurrence of each id, preserving order.
pub fn dedup_blocks(blocks: Vec<RawBlock>) -> Vec<RawBlock> {
    let mut seen = HashSet::new();
    blocks
        .into_iter()
        .filter(|block| seen.insert(block.id.clone()))
        .collect()
}

/// Comparable salary for a listing: the highest value across its ranges.
pub fn listing_salary_value(listing: &CanonicalListing) -> u64 {
    listing
        .properties
        .salary_range
        .as_ref()
        .and_then(|ranges| ranges.iter().map(|r| parse_salary_value(r)).max())
        .unwrap_or(0)
}

/// Sort listings by salary, highest first. Ties keep upstream order.
pub fn sort_by_salary(listings: &mut [CanonicalListing]) {
    listings.sort_by_key(|listing| std::cmp::Reverse(listing_salary_value(listing)));
}
