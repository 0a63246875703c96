//! Scraped rows and the canonical listings derived from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::location::LocationKey;

/// Column positions of the upstream board table.
///
/// Cells are positional: a row's `properties[i]` holds the column at index `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Status,
    Title,
    Company,
    Category,
    OfficePolicy,
    Location,
    Skills,
    Salary,
}

impl Column {
    /// Header schema, in upstream column order.
    pub const SCHEMA: [Column; 8] = [
        Column::Status,
        Column::Title,
        Column::Company,
        Column::Category,
        Column::OfficePolicy,
        Column::Location,
        Column::Skills,
        Column::Salary,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn header(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Title => "title",
            Self::Company => "company",
            Self::Category => "category",
            Self::OfficePolicy => "office-policy",
            Self::Location => "location",
            Self::Skills => "skills",
            Self::Salary => "salary",
        }
    }
}

/// One scraped board row. Lives only for the duration of a scrape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock {
    /// Opaque upstream identifier.
    pub id: String,
    /// Position in upstream ordering (0 = most recent).
    pub row_index: usize,
    /// Raw text cells, indexed by [`Column`].
    pub properties: Vec<Option<String>>,
}

impl RawBlock {
    pub fn new(id: impl Into<String>, row_index: usize, properties: Vec<Option<String>>) -> Self {
        Self {
            id: id.into(),
            row_index,
            properties,
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.properties.is_empty()
    }

    /// Trimmed cell text for a column. Missing, out-of-range and blank cells are `None`.
    pub fn cell(&self, column: Column) -> Option<&str> {
        self.properties
            .get(column.index())
            .and_then(|c| c.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Named fields projected from a row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingProperties {
    pub title: Option<String>,
    pub status: Option<String>,
    pub company: Option<String>,
    pub category: Option<String>,
    /// Raw comma-joined location text.
    pub location: Option<String>,
    pub location_tags: Vec<LocationKey>,
    pub remote_policy: Option<String>,
    pub skills: Vec<String>,
    pub salary_range: Option<Vec<String>>,
}

/// A normalized job listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalListing {
    pub id: String,
    pub row_index: usize,
    pub formatted_id: String,
    pub apply_link: String,
    pub properties: ListingProperties,
}

/// Content read from a posting's detail page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetail {
    pub date_posted: Option<DateTime<Utc>>,
    pub description: Option<String>,
}

/// Strip separator characters from an upstream id.
pub fn format_id(id: &str) -> String {
    id.chars().filter(|c| *c != '-').collect()
}

/// Build the upstream page URL for a formatted id.
pub fn upstream_url(base: &str, formatted_id: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), formatted_id)
}
