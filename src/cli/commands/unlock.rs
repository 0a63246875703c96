//! Operator recovery for a stuck browser lock.

use chrono::{TimeZone, Utc};
use console::style;

use jobscrape::config::Settings;

/// Delete the lock key. Without `--yes`, only reports the current holder.
pub async fn cmd_unlock(settings: &Settings, yes: bool) -> anyhow::Result<()> {
    // A fresh in-memory store would always report the lock as free
    settings.lock.require_shared()?;
    let lock = settings.lock.build().await?;

    let Some(record) = lock.current().await? else {
        println!("{} Lock '{}' is free", style("✓").green(), lock.key());
        return Ok(());
    };

    let since = Utc
        .timestamp_millis_opt(record.acquired_at_epoch_millis)
        .single()
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| record.acquired_at_epoch_millis.to_string());
    println!(
        "{} Lock '{}' held by {} since {}",
        style("!").yellow(),
        lock.key(),
        record.resource_id,
        since
    );

    if !yes {
        println!("  Re-run with --yes to release it, or wait for the TTL to expire");
        return Ok(());
    }

    lock.force_release().await?;
    println!("{} Released lock '{}'", style("✓").green(), lock.key());
    Ok(())
}
