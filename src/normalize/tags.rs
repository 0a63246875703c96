//! Comma-separated tag splitting and field cleansing.

/// Placeholder text the board shows in place of hidden company names.
const COMPANY_PLACEHOLDER: &str = "No access";

/// Split a comma-joined string into trimmed, non-empty tokens.
pub fn tagify(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Remove the company placeholder. Blank results become `None`.
pub fn clean_company(raw: Option<&str>) -> Option<String> {
    let cleaned = raw?.replace(COMPANY_PLACEHOLDER, "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}
