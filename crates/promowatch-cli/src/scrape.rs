//! `scrape` command: one reconciliation run, live or demo, against Postgres
//! or an in-memory store.

use anyhow::Context;
use promowatch_core::{AppConfig, CampaignRecord, RunSummary, ScrapeStatus};
use promowatch_db::PgCampaignStore;
use promowatch_pipeline::{EngineSettings, MemoryStore, ReconcileEngine};
use promowatch_scraper::PageClient;

use crate::report::truncate;

/// Runs the engine once and prints the summary.
///
/// With `dry_run` the run goes against an empty in-memory store, so every
/// candidate shows up as new and the database is never contacted, so
/// `DATABASE_URL` may be unset.
///
/// # Errors
///
/// Returns an error if the competitor config cannot be loaded, the run cannot
/// start, or a database-backed run ends with `failed` status.
pub(crate) async fn run_scrape(
    config: &AppConfig,
    use_demo: bool,
    dry_run: bool,
) -> anyhow::Result<()> {
    let competitor = promowatch_core::load_competitor(&config.competitor_path)
        .with_context(|| format!("loading {}", config.competitor_path.display()))?;
    let settings = EngineSettings::from_app_config(competitor, config);
    let client = PageClient::from_app_config(config)?;
    tracing::info!(
        competitor = %settings.competitor.name,
        use_demo,
        dry_run,
        "cli: scrape starting"
    );

    if dry_run {
        let store = MemoryStore::new();
        let engine = ReconcileEngine::new(client, store.clone(), settings);
        let summary = engine.run(use_demo).await?;
        println!("dry-run: nothing was written to the database");
        println!("{}", format_summary(&summary));
        print_candidates(&store.campaigns());
        return Ok(());
    }

    let pool = crate::connect(config).await?;
    let engine = ReconcileEngine::new(client, PgCampaignStore::new(pool), settings);
    let summary = engine.run(use_demo).await?;
    println!("{}", format_summary(&summary));

    if summary.status == ScrapeStatus::Failed {
        anyhow::bail!(
            "scrape run failed: {}",
            summary.error_message.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}

pub(crate) fn format_summary(summary: &RunSummary) -> String {
    let mut out = format!(
        "status: {}\nfound: {}  new: {}  updated: {}  deactivated: {}\nsource: {}",
        summary.status,
        summary.campaigns_found,
        summary.new_campaigns,
        summary.updated_campaigns,
        summary.deactivated_campaigns,
        if summary.used_demo_data { "demo" } else { "live" },
    );
    if let Some(message) = &summary.error_message {
        out.push_str("\nerror: ");
        out.push_str(message);
    }
    out
}

fn print_candidates(campaigns: &[CampaignRecord]) {
    if campaigns.is_empty() {
        return;
    }
    println!();
    println!("{:<11}NAME", "CATEGORY");
    for campaign in campaigns {
        println!("{:<11}{}", campaign.category, truncate(&campaign.name, 60));
    }
}
