//! Salary range canonicalization and numeric extraction.

use std::sync::LazyLock;

use regex::Regex;

use super::tags::tagify;

static MARKET_RATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)market\s*rate").expect("valid market rate pattern"));

fn is_more_than_marker(c: char) -> bool {
    c == '+' || c == '>'
}

/// Normalize raw salary text into canonical range strings.
///
/// `"$300k +"` and `"+$300k"` both become `"$300k+"`; dashed ranges are kept
/// as-is. Returns `None` when no candidate survives.
pub fn normalize_salary(raw: &str) -> Option<Vec<String>> {
    let stripped = MARKET_RATE.replace_all(raw, "");
    let ranges: Vec<String> = tagify(&stripped)
        .iter()
        .filter_map(|candidate| normalize_candidate(candidate))
        .collect();

    if ranges.is_empty() {
        None
    } else {
        Some(ranges)
    }
}

fn normalize_candidate(candidate: &str) -> Option<String> {
    let candidate = candidate.trim();
    if candidate.contains('-') || !candidate.contains(is_more_than_marker) {
        return Some(candidate.to_string()).filter(|s| !s.is_empty());
    }

    let bare: String = candidate
        .chars()
        .filter(|c| !is_more_than_marker(*c))
        .collect();
    let bare = bare.trim();
    if bare.is_empty() {
        None
    } else {
        Some(format!("{bare}+"))
    }
}

/// Extract a comparable number from salary text (in the text's own unit, e.g. thousands).
///
/// Ranges compare by their upper bound. Unparseable input yields 0.
pub fn parse_salary_value(raw: &str) -> u64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | '€' | '£' | 'k' | 'K' | '+' | '>' | '<' | '~' | ',' | ' '))
        .collect();

    let upper = match cleaned.rsplit_once('-') {
        Some((_, upper)) => upper,
        None => cleaned.as_str(),
    };

    upper.trim().parse::<u64>().unwrap_or(0)
}
