//! Read-only reports over stored campaigns and scrape logs.

use chrono::Utc;
use promowatch_core::{CampaignQuery, CampaignRecord};

/// Prints one page of campaigns matching `query`.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_campaigns_list(
    pool: &sqlx::PgPool,
    query: &CampaignQuery,
) -> anyhow::Result<()> {
    let (rows, total) = promowatch_db::list_campaigns(pool, query).await?;

    if rows.is_empty() {
        println!("no campaigns found (total matching: {total}); run `scrape` first");
        return Ok(());
    }

    let now = Utc::now();
    let shown = rows.len();
    println!(
        "{:<7}{:<9}{:<11}{:<12}{:<6}NAME",
        "ID", "ACTIVE", "CATEGORY", "LAST SEEN", "DAYS"
    );
    for row in rows {
        let campaign = CampaignRecord::from(row);
        println!(
            "{:<7}{:<9}{:<11}{:<12}{:<6}{}",
            campaign.id,
            if campaign.is_active { "yes" } else { "no" },
            campaign.category,
            campaign.last_seen_at.format("%Y-%m-%d").to_string(),
            campaign.days_since_seen(now),
            truncate(&campaign.name, 50),
        );
    }
    println!("showing {shown} from offset {} of {total}", query.offset());

    Ok(())
}

/// Prints totals and per-category and per-competitor counts.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_stats(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let stats = promowatch_db::campaign_stats(pool).await?;

    println!(
        "total: {}  active: {}  inactive: {}",
        stats.total, stats.active, stats.inactive
    );
    println!();
    println!("{:<11}COUNT", "CATEGORY");
    for c in &stats.by_category {
        println!("{:<11}{}", c.category, c.count);
    }
    println!();
    println!("{:<20}{:<8}ACTIVE", "COMPETITOR", "TOTAL");
    for c in &stats.by_competitor {
        println!("{:<20}{:<8}{}", c.competitor_name, c.total, c.active);
    }

    Ok(())
}

/// Prints the most recent `limit` scrape-log entries.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_logs(pool: &sqlx::PgPool, limit: i64) -> anyhow::Result<()> {
    let logs = promowatch_db::list_scrape_logs(pool, limit.clamp(1, 200)).await?;

    if logs.is_empty() {
        println!("no scrape runs recorded yet");
        return Ok(());
    }

    println!(
        "{:<18}{:<9}{:<7}{:<5}ERROR",
        "RUN AT", "STATUS", "FOUND", "NEW"
    );
    for log in &logs {
        println!(
            "{:<18}{:<9}{:<7}{:<5}{}",
            log.run_at.format("%Y-%m-%d %H:%M").to_string(),
            log.status,
            log.campaigns_found,
            log.new_campaigns,
            log.error_message
                .as_deref()
                .map_or_else(String::new, |m| truncate(m, 80)),
        );
    }

    Ok(())
}

/// Shortens `text` to `max` characters, marking the cut with `...`.
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}...", text.chars().take(max).collect::<String>())
    } else {
        text.to_string()
    }
}
