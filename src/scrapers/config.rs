//! Board scraper configuration types.
//!
//! These structs define where the board lives and which DOM hooks the
//! extractors key on, so an upstream markup change is a config edit.

use std::env;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

/// Board configuration (`[board]` table).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Rendered board page holding the listing table.
    #[serde(default)]
    pub board_url: String,
    /// Base for per-listing pages; `{detail_base_url}/{formatted_id}`.
    #[serde(default)]
    pub detail_base_url: String,
    #[serde(default)]
    pub list: ListSelectors,
    #[serde(default)]
    pub detail: DetailSelectors,
    /// Years a posted-date line may mention. Defaults to last year and this year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted_years: Option<Vec<i32>>,
}

impl BoardConfig {
    /// Apply `BOARD_URL` and `BOARD_DETAIL_BASE_URL`.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = env::var("BOARD_URL") {
            if !url.is_empty() {
                self.board_url = url;
            }
        }
        if let Ok(url) = env::var("BOARD_DETAIL_BASE_URL") {
            if !url.is_empty() {
                self.detail_base_url = url;
            }
        }
        self
    }

    /// Detail base, falling back to the board URL's origin.
    pub fn effective_detail_base(&self) -> String {
        if !self.detail_base_url.is_empty() {
            return self.detail_base_url.trim_end_matches('/').to_string();
        }
        url::Url::parse(&self.board_url)
            .map(|u| u.origin().ascii_serialization())
            .unwrap_or_default()
    }

    /// Host whose links count as navigation noise on detail pages.
    pub fn upstream_host(&self) -> Option<String> {
        url::Url::parse(&self.effective_detail_base())
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
    }

    pub fn expected_years(&self) -> Vec<i32> {
        match self.posted_years {
            Some(ref years) if !years.is_empty() => years.clone(),
            _ => {
                let year = chrono::Utc::now().year();
                vec![year - 1, year]
            }
        }
    }
}

/// DOM hooks for the listing table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListSelectors {
    /// Container that must render before extraction.
    pub container: String,
    /// One element per row; must carry both id and index attributes.
    pub row: String,
    pub block_id_attr: String,
    pub row_index_attr: String,
    /// Cell elements inside a row.
    pub cell: String,
    pub column_index_attr: String,
    /// Expanded-value elements inside a cell, preferred over the cell text.
    pub popup: String,
}

impl Default for ListSelectors {
    fn default() -> Self {
        Self {
            container: ".notion-table-view".to_string(),
            row: "[data-block-id][data-index]".to_string(),
            block_id_attr: "data-block-id".to_string(),
            row_index_attr: "data-index".to_string(),
            cell: "[data-col-index]".to_string(),
            column_index_attr: "data-col-index".to_string(),
            popup: "[data-popup]".to_string(),
        }
    }
}

/// DOM hooks for a listing's detail page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailSelectors {
    /// Body text container; its rendering gates extraction.
    pub content: String,
    /// Property panel scanned for the posted date.
    pub properties: String,
    /// Embedded bookmark cards, dropped from the description.
    pub bookmark: String,
    /// Placeholder block text, matched case-insensitively.
    pub back_to_board_text: String,
}

impl Default for DetailSelectors {
    fn default() -> Self {
        Self {
            content: ".notion-page-content".to_string(),
            properties: ".notion-collection-page-properties".to_string(),
            bookmark: ".notion-bookmark-block".to_string(),
            back_to_board_text: "back to board".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_base_falls_back_to_board_origin() {
        let config = BoardConfig {
            board_url: "https://jobs.example.site/board?v=1".to_string(),
            ..Default::default()
        };
        assert_eq!(config.effective_detail_base(), "https://jobs.example.site");
        assert_eq!(config.upstream_host().as_deref(), Some("jobs.example.site"));

        let config = BoardConfig {
            detail_base_url: "https://posts.example.site/".to_string(),
            ..config
        };
        assert_eq!(config.effective_detail_base(), "https://posts.example.site");
        assert_eq!(config.upstream_host().as_deref(), Some("posts.example.site"));
    }

    #[test]
    fn test_expected_years_default_to_current_pair() {
        let year = chrono::Utc::now().year();
        assert_eq!(BoardConfig::default().expected_years(), vec![year - 1, year]);

        let config = BoardConfig {
            posted_years: Some(vec![2023, 2024]),
            ..Default::default()
        };
        assert_eq!(config.expected_years(), vec![2023, 2024]);
    }

    #[test]
    fn test_partial_selector_table() {
        let config: BoardConfig = toml::from_str(
            r##"
            board_url = "https://jobs.example.site/board"

            [list]
            container = "#table"
            "##,
        )
        .unwrap();
        assert_eq!(config.list.container, "#table");
        assert_eq!(config.list.row, ListSelectors::default().row);
        assert_eq!(config.detail, DetailSelectors::default());
    }
}
