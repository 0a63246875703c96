//! List and detail scrape commands.

use console::style;

use jobscrape::config::Settings;
use jobscrape::error::ScrapeError;
use jobscrape::models::format_id;
use jobscrape::normalize::{listing_salary_value, sort_by_salary};
use jobscrape::services::IngestionService;

use super::SortKey;

fn report_failure(e: ScrapeError) -> anyhow::Error {
    if e.is_lock_held() {
        eprintln!(
            "{} Another browser session is running; try again shortly",
            style("!").yellow()
        );
    } else {
        eprintln!("{} {}", style("✗").red(), e);
    }
    e.into()
}

/// Scrape the board and print listings.
pub async fn cmd_list(settings: &Settings, sort: SortKey, json: bool) -> anyhow::Result<()> {
    settings.validate().map_err(anyhow::Error::msg)?;
    let service = IngestionService::from_settings(settings).await?;

    if !json {
        println!(
            "{} Scraping {}",
            style("→").cyan(),
            settings.board.board_url
        );
    }

    let mut listings = service.listings().await.map_err(report_failure)?;
    if sort == SortKey::Salary {
        sort_by_salary(&mut listings);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&listings)?);
        return Ok(());
    }

    for listing in &listings {
        let p = &listing.properties;
        println!(
            "  {} {} {}",
            style(&listing.formatted_id).dim(),
            style(p.title.as_deref().unwrap_or("(untitled)")).bold(),
            p.company
                .as_deref()
                .map(|c| format!("@ {}", c))
                .unwrap_or_default()
        );

        let mut facts = Vec::new();
        if let Some(ref status) = p.status {
            facts.push(status.clone());
        }
        if !p.location_tags.is_empty() {
            let tags: Vec<&str> = p.location_tags.iter().map(|t| t.label()).collect();
            facts.push(tags.join(" / "));
        }
        if let Some(ref ranges) = p.salary_range {
            facts.push(ranges.join(", "));
        }
        if !p.skills.is_empty() {
            facts.push(p.skills.join(", "));
        }
        if !facts.is_empty() {
            println!("      {}", style(facts.join(" · ")).dim());
        }
    }

    let with_salary = listings
        .iter()
        .filter(|l| listing_salary_value(l) > 0)
        .count();
    println!(
        "{} {} listings ({} with salary)",
        style("✓").green(),
        listings.len(),
        with_salary
    );
    Ok(())
}

/// Scrape and print one listing's detail page.
pub async fn cmd_detail(settings: &Settings, id: &str, json: bool) -> anyhow::Result<()> {
    settings.validate().map_err(anyhow::Error::msg)?;
    let service = IngestionService::from_settings(settings).await?;

    let detail = service.detail(id).await.map_err(report_failure)?;

    if json {
        let body = serde_json::json!({
            "postID": id,
            "formattedId": format_id(id),
            "post": detail,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    let posted = detail
        .date_posted
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "unknown".to_string());
    println!("{} {}", style("Posted:").bold(), posted);
    match detail.description {
        Some(ref description) => println!("\n{}", description),
        None => println!("{}", style("(no meaningful description)").dim()),
    }
    Ok(())
}
