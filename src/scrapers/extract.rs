//! Pure extraction over rendered board HTML.
//!
//! The browser only hands back serialized container markup; everything that
//! turns markup into rows, descriptions and dates happens here so it can be
//! exercised against fixture HTML.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::config::{DetailSelectors, ListSelectors};
use crate::error::{ScrapeError, ScrapeResult};
use crate::models::{PostDetail, RawBlock};

/// Descriptions shorter than this carry no meaningful content.
pub const MIN_DESCRIPTION_WORDS: usize = 10;

/// Upper bound on a cell's column index; anything beyond is markup noise.
const MAX_COLUMNS: usize = 64;

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

static YEAR_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{4}\b").unwrap());
static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").unwrap());
static MONTH_DAY_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([a-z]{3,9})\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})\b").unwrap()
});
static DAY_MONTH_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)?\s+([a-z]{3,9})\.?,?\s+(\d{4})\b").unwrap()
});
static US_NUMERIC_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").unwrap());

fn parse_selector(selector: &str) -> ScrapeResult<Selector> {
    Selector::parse(selector).map_err(|e| ScrapeError::InvalidSelector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Walk the listing table and return one block per row, ordered by row index.
///
/// Rows missing either identifying attribute are skipped. A cell's value is
/// the comma-joined text of its popup elements when any exist, otherwise the
/// cell's own text; blank cells become `None`.
pub fn extract_blocks(html: &str, selectors: &ListSelectors) -> ScrapeResult<Vec<RawBlock>> {
    let row_selector = parse_selector(&selectors.row)?;
    let cell_selector = parse_selector(&selectors.cell)?;
    let popup_selector = parse_selector(&selectors.popup)?;

    let fragment = Html::parse_fragment(html);
    let mut blocks = Vec::new();

    for row in fragment.select(&row_selector) {
        let Some(id) = row
            .value()
            .attr(&selectors.block_id_attr)
            .map(str::trim)
            .filter(|id| !id.is_empty())
        else {
            continue;
        };
        let Some(row_index) = row
            .value()
            .attr(&selectors.row_index_attr)
            .and_then(|v| v.trim().parse::<usize>().ok())
        else {
            continue;
        };

        let mut properties: Vec<Option<String>> = Vec::new();
        for cell in row.select(&cell_selector) {
            let Some(column) = cell
                .value()
                .attr(&selectors.column_index_attr)
                .and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|c| *c < MAX_COLUMNS)
            else {
                continue;
            };
            if column >= properties.len() {
                properties.resize(column + 1, None);
            }
            if properties[column].is_none() {
                properties[column] = cell_text(cell, &popup_selector);
            }
        }

        blocks.push(RawBlock::new(id, row_index, properties));
    }

    blocks.sort_by_key(|block| block.row_index);
    Ok(blocks)
}

fn cell_text(cell: ElementRef<'_>, popup: &Selector) -> Option<String> {
    let popups: Vec<String> = cell
        .select(popup)
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|text| !text.is_empty())
        .collect();

    let text = if popups.is_empty() {
        collapse_whitespace(&cell.text().collect::<String>())
    } else {
        popups.join(", ")
    };

    Some(text).filter(|t| !t.is_empty())
}

/// Decides which elements are left out of a detail page's text.
struct NoiseFilter<'a> {
    bookmark: Option<Selector>,
    upstream_host: Option<&'a str>,
    placeholder: String,
}

impl<'a> NoiseFilter<'a> {
    fn for_content(selectors: &DetailSelectors, upstream_host: Option<&'a str>) -> ScrapeResult<Self> {
        let bookmark = if selectors.bookmark.trim().is_empty() {
            None
        } else {
            Some(parse_selector(&selectors.bookmark)?)
        };
        Ok(Self {
            bookmark,
            upstream_host,
            placeholder: collapse_whitespace(&selectors.back_to_board_text).to_lowercase(),
        })
    }

    fn none() -> Self {
        Self {
            bookmark: None,
            upstream_host: None,
            placeholder: String::new(),
        }
    }

    fn is_noise(&self, el: ElementRef<'_>) -> bool {
        let name = el.value().name();
        if matches!(name, "script" | "style" | "noscript" | "template") {
            return true;
        }
        if self.bookmark.as_ref().is_some_and(|s| s.matches(&el)) {
            return true;
        }
        if name == "a" && el.value().attr("href").is_some_and(|h| self.links_upstream(h)) {
            return true;
        }
        if self.placeholder.is_empty() {
            return false;
        }
        let text = collapse_whitespace(&el.text().collect::<String>()).to_lowercase();
        text.trim_matches(|c: char| !c.is_alphanumeric()) == self.placeholder
    }

    fn links_upstream(&self, href: &str) -> bool {
        match url::Url::parse(href) {
            Ok(parsed) => match (parsed.host_str(), self.upstream_host) {
                (Some(host), Some(upstream)) => host.eq_ignore_ascii_case(upstream),
                _ => false,
            },
            // Relative links resolve against the upstream page itself
            Err(url::ParseError::RelativeUrlWithoutBase) => true,
            Err(_) => false,
        }
    }
}

fn is_block_element(name: &str) -> bool {
    matches!(
        name,
        "p" | "div"
            | "section"
            | "article"
            | "header"
            | "footer"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "li"
            | "ul"
            | "ol"
            | "tr"
            | "table"
            | "blockquote"
            | "pre"
            | "hr"
    )
}

fn collect_text(el: ElementRef<'_>, noise: &NoiseFilter<'_>, out: &mut String) {
    for child in el.children() {
        if let Some(child_el) = ElementRef::wrap(child) {
            if noise.is_noise(child_el) {
                continue;
            }
            let name = child_el.value().name();
            if name == "br" {
                out.push('\n');
                continue;
            }
            let block = is_block_element(name);
            if block {
                out.push('\n');
            }
            collect_text(child_el, noise, out);
            if block {
                out.push('\n');
            }
        } else if let Some(text) = child.value().as_text() {
            // Source formatting whitespace never starts a new line
            out.extend(text.chars().map(|c| if c.is_whitespace() { ' ' } else { c }));
        }
    }
}

/// Visible text lines of an HTML fragment after noise removal.
fn text_lines(html: &str, noise: &NoiseFilter<'_>) -> Vec<String> {
    if html.trim().is_empty() {
        return Vec::new();
    }
    let fragment = Html::parse_fragment(html);
    let mut out = String::new();
    collect_text(fragment.root_element(), noise, &mut out);

    out.split('\n')
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Extract a listing's description and posted date.
///
/// `content_html` is the rendered body container and `properties_html` the
/// property panel; either may be empty when the upstream page lacks it.
pub fn extract_detail(
    content_html: &str,
    properties_html: &str,
    selectors: &DetailSelectors,
    upstream_host: Option<&str>,
    years: &[i32],
) -> ScrapeResult<PostDetail> {
    let noise = NoiseFilter::for_content(selectors, upstream_host)?;
    let description = text_lines(content_html, &noise).join("\n");
    let word_count = description.split_whitespace().count();

    let date_posted = find_posted_date(&text_lines(properties_html, &NoiseFilter::none()), years);

    Ok(PostDetail {
        date_posted,
        description: (word_count >= MIN_DESCRIPTION_WORDS).then_some(description),
    })
}

/// First property line mentioning an expected year that parses as a date.
pub fn find_posted_date(lines: &[String], years: &[i32]) -> Option<DateTime<Utc>> {
    let mentions_year = |line: &str| {
        YEAR_TOKEN
            .find_iter(line)
            .filter_map(|m| m.as_str().parse::<i32>().ok())
            .any(|y| years.contains(&y))
    };

    lines
        .iter()
        .filter(|line| mentions_year(line.as_str()))
        .find_map(|line| parse_date(line))
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn month_number(name: &str) -> Option<u32> {
    let name = name.to_lowercase();
    if name.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|month| month.starts_with(&name))
        .map(|i| i as u32 + 1)
}

fn capture_num<T: std::str::FromStr>(caps: &regex::Captures<'_>, i: usize) -> Option<T> {
    caps.get(i).and_then(|m| m.as_str().parse().ok())
}

/// Parse the first recognizable date in free text.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    if let Some(caps) = ISO_DATE.captures(text) {
        if let (Some(y), Some(m), Some(d)) = (capture_num(&caps, 1), capture_num(&caps, 2), capture_num(&caps, 3)) {
            if let Some(date) = NaiveDate::from_ymd_opt(y, m, d) {
                return Some(date);
            }
        }
    }

    for caps in MONTH_DAY_YEAR.captures_iter(text) {
        let month = caps.get(1).and_then(|m| month_number(m.as_str()));
        if let (Some(m), Some(d), Some(y)) = (month, capture_num(&caps, 2), capture_num(&caps, 3)) {
            if let Some(date) = NaiveDate::from_ymd_opt(y, m, d) {
                return Some(date);
            }
        }
    }

    for caps in DAY_MONTH_YEAR.captures_iter(text) {
        let month = caps.get(2).and_then(|m| month_number(m.as_str()));
        if let (Some(d), Some(m), Some(y)) = (capture_num(&caps, 1), month, capture_num(&caps, 3)) {
            if let Some(date) = NaiveDate::from_ymd_opt(y, m, d) {
                return Some(date);
            }
        }
    }

    let caps = US_NUMERIC_DATE.captures(text)?;
    NaiveDate::from_ymd_opt(capture_num(&caps, 3)?, capture_num(&caps, 1)?, capture_num(&caps, 2)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST_HTML: &str = r#"
        <div class="notion-table-view">
          <div data-block-id="bbbb-2222" data-index="1">
            <div data-col-index="0">Open</div>
            <div data-col-index="1">  Backend   Engineer </div>
            <div data-col-index="6">
              <span>Rust…</span>
              <div data-popup>Rust</div>
              <div data-popup>Postgres</div>
            </div>
          </div>
          <div data-block-id="aaaa-1111" data-index="0">
            <div data-col-index="0">Hiring</div>
            <div data-col-index="2">   </div>
            <div data-col-index="7">$150k - $200k</div>
          </div>
          <div data-index="2"><div data-col-index="0">No id</div></div>
          <div data-block-id="cccc-3333" data-index="x"><div data-col-index="0">Bad index</div></div>
          <div data-block-id="dddd-4444" data-index="3"></div>
        </div>
    "#;

    #[test]
    fn test_extract_blocks() {
        let blocks = extract_blocks(LIST_HTML, &ListSelectors::default()).unwrap();
        let ids: Vec<&str> = blocks.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["aaaa-1111", "bbbb-2222", "dddd-4444"]);

        let first = &blocks[0];
        assert_eq!(first.row_index, 0);
        assert_eq!(first.properties.len(), 8);
        assert_eq!(first.properties[0].as_deref(), Some("Hiring"));
        assert_eq!(first.properties[2], None);
        assert_eq!(first.properties[7].as_deref(), Some("$150k - $200k"));

        let second = &blocks[1];
        assert_eq!(second.properties[1].as_deref(), Some("Backend Engineer"));
        assert_eq!(second.properties[6].as_deref(), Some("Rust, Postgres"));

        assert!(blocks[2].properties.is_empty());
    }

    #[test]
    fn test_extract_blocks_invalid_selector() {
        let selectors = ListSelectors {
            row: "[[".to_string(),
            ..Default::default()
        };
        let err = extract_blocks(LIST_HTML, &selectors).unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidSelector { .. }));
    }

    #[test]
    fn test_extract_blocks_empty_html() {
        assert!(extract_blocks("", &ListSelectors::default())
            .unwrap()
            .is_empty());
    }

    const CONTENT_HTML: &str = r#"
        <div class="notion-page-content">
          <div><a href="/board">← Back to board</a></div>
          <h2>About the role</h2>
          <p>We are hiring a backend engineer to build
             reliable ingestion services in Rust.</p>
          <div class="notion-bookmark-block">Bookmark card text that should vanish</div>
          <p>Apply via <a href="https://jobs.example.site/other">another listing</a> or
             <a href="https://careers.acme.test/apply">our site</a>.</p>
          <script>console.log("x")</script>
        </div>
    "#;

    const PROPERTIES_HTML: &str = r#"
        <div class="notion-collection-page-properties">
          <div>Status Hiring</div>
          <div>Founded 2015</div>
          <div>Posted March 4, 2024</div>
          <div>Updated 2024-05-01</div>
        </div>
    "#;

    #[test]
    fn test_extract_detail() {
        let detail = extract_detail(
            CONTENT_HTML,
            PROPERTIES_HTML,
            &DetailSelectors::default(),
            Some("jobs.example.site"),
            &[2023, 2024],
        )
        .unwrap();

        let description = detail.description.unwrap();
        assert_eq!(
            description,
            "About the role\n\
             We are hiring a backend engineer to build reliable ingestion services in Rust.\n\
             Apply via or our site."
        );
        assert!(!description.to_lowercase().contains("back to board"));
        assert!(!description.contains("Bookmark"));
        assert!(!description.contains("console"));

        let date = detail.date_posted.unwrap();
        assert_eq!(date.to_rfc3339(), "2024-03-04T00:00:00+00:00");
    }

    #[test]
    fn test_short_description_discarded() {
        let detail = extract_detail(
            "<div><p>Too short to matter.</p></div>",
            "",
            &DetailSelectors::default(),
            None,
            &[2024],
        )
        .unwrap();
        assert_eq!(detail.description, None);
        assert_eq!(detail.date_posted, None);
    }

    #[test]
    fn test_posted_date_skips_unexpected_years() {
        let lines = vec!["Founded March 1, 2015".to_string(), "Posted 5/6/2024".to_string()];
        let date = find_posted_date(&lines, &[2023, 2024]).unwrap();
        assert_eq!(date.date_naive(), NaiveDate::from_ymd_opt(2024, 5, 6).unwrap());

        assert_eq!(find_posted_date(&lines, &[2030]), None);
    }

    #[test]
    fn test_unparseable_year_line_keeps_scanning() {
        let lines = vec!["Season 2024".to_string(), "Posted 2024-01-09".to_string()];
        let date = find_posted_date(&lines, &[2024]).unwrap();
        assert_eq!(date.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 9).unwrap());
    }

    #[test]
    fn test_year_inside_longer_number_is_ignored() {
        let lines = vec![
            "Ref 20245 filed March 4, 2023".to_string(),
            "Posted 2024-01-09".to_string(),
        ];
        let date = find_posted_date(&lines, &[2024]).unwrap();
        assert_eq!(date.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 9).unwrap());
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 4);
        assert_eq!(parse_date("2024-03-04"), expected);
        assert_eq!(parse_date("Posted March 4, 2024"), expected);
        assert_eq!(parse_date("Mar 4th 2024"), expected);
        assert_eq!(parse_date("4 March 2024"), expected);
        assert_eq!(parse_date("03/04/2024"), expected);
        assert_eq!(parse_date("Posted 4, 2024"), None);
        assert_eq!(parse_date("2024-13-40"), None);
    }
}
