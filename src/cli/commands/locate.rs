//! Location matching command.

use console::style;

use jobscrape::config::Settings;
use jobscrape::normalize::{tagify, LocationMatcher};

/// Print the key each comma-separated part of `text` resolves to.
pub fn cmd_locate(settings: &Settings, text: &str, threshold: Option<f64>) -> anyhow::Result<()> {
    let matcher = threshold.map(LocationMatcher::new).unwrap_or(settings.matcher);

    let parts = tagify(text);
    if parts.is_empty() {
        let m = matcher.best_match(text);
        println!("  {} {}", style("(empty)").dim(), style(m.key).bold());
        return Ok(());
    }

    for part in parts {
        let m = matcher.best_match(&part);
        let how = if m.exact {
            style("exact".to_string()).green()
        } else if m.score >= matcher.threshold {
            style(format!("{:.4}", m.score)).cyan()
        } else {
            style(format!("{:.4} < {}", m.score, matcher.threshold)).yellow()
        };
        println!("  {} → {} ({})", part, style(m.key).bold(), how);
    }
    Ok(())
}
