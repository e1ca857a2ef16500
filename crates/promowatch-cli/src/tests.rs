use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use promowatch_core::{
    AppConfig, DatabaseSettings, RunSummary, ScrapeStatus, ScraperSettings, ServerSettings,
};

use super::*;
use crate::report::truncate;
use crate::scrape::{format_summary, run_scrape};

fn config_without_database() -> AppConfig {
    AppConfig {
        log_level: "info".to_string(),
        competitor_path: PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../config/competitor.yaml"),
        database: DatabaseSettings {
            url: None,
            max_connections: 2,
            min_connections: 0,
            acquire_timeout: Duration::from_secs(1),
        },
        scraper: ScraperSettings {
            request_timeout_secs: 5,
            user_agent: "promowatch-test/0.1".to_string(),
            inter_request_delay: Duration::ZERO,
            max_retries: 0,
            retry_backoff_base_secs: 0,
        },
        server: ServerSettings {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
            scrape_cron: "0 0 6 * * *".to_string(),
        },
        min_candidates: 5,
    }
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["promowatch-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_db_migrate_command() {
    let cli = Cli::try_parse_from(["promowatch-cli", "db", "migrate"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn scrape_defaults_to_live_run() {
    let cli = Cli::try_parse_from(["promowatch-cli", "scrape"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Scrape {
            demo: false,
            dry_run: false
        })
    ));
}

#[test]
fn scrape_accepts_demo_and_dry_run() {
    let cli = Cli::try_parse_from(["promowatch-cli", "scrape", "--demo", "--dry-run"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Scrape {
            demo: true,
            dry_run: true
        })
    ));
}

#[test]
fn campaigns_list_builds_query() {
    let cli = Cli::try_parse_from([
        "promowatch-cli",
        "campaigns",
        "list",
        "--category",
        "dining",
        "--inactive",
        "--search",
        "美食",
        "--limit",
        "10",
    ])
    .unwrap();

    let Some(Commands::Campaigns { command }) = cli.command else {
        panic!("expected campaigns command");
    };
    let query = command.to_query().expect("list builds a query");
    assert_eq!(query.category.as_deref(), Some("dining"));
    assert_eq!(query.is_active, Some(false));
    assert_eq!(query.search.as_deref(), Some("美食"));
    assert_eq!(query.limit(), 10);
    assert_eq!(query.offset(), 0);
}

#[test]
fn campaigns_list_without_status_flags_includes_both() {
    let cli = Cli::try_parse_from(["promowatch-cli", "campaigns", "list"]).unwrap();
    let Some(Commands::Campaigns { command }) = cli.command else {
        panic!("expected campaigns command");
    };
    assert_eq!(command.to_query().and_then(|q| q.is_active), None);
}

#[test]
fn campaigns_active_and_inactive_conflict() {
    let result = Cli::try_parse_from([
        "promowatch-cli",
        "campaigns",
        "list",
        "--active",
        "--inactive",
    ]);
    assert!(result.is_err());
}

#[test]
fn campaigns_stats_has_no_query() {
    let cli = Cli::try_parse_from(["promowatch-cli", "campaigns", "stats"]).unwrap();
    let Some(Commands::Campaigns { command }) = cli.command else {
        panic!("expected campaigns command");
    };
    assert!(command.to_query().is_none());
}

#[test]
fn logs_limit_defaults_to_twenty() {
    let cli = Cli::try_parse_from(["promowatch-cli", "logs"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Logs { limit: 20 })));
}

#[test]
fn summary_format_includes_counts_and_error() {
    let summary = RunSummary {
        run_at: Utc::now(),
        status: ScrapeStatus::Partial,
        campaigns_found: 10,
        new_campaigns: 3,
        updated_campaigns: 7,
        deactivated_campaigns: 1,
        used_demo_data: true,
        error_message: Some("live extraction produced 2 candidate(s)".to_string()),
    };

    let text = format_summary(&summary);
    assert!(text.starts_with("status: partial"));
    assert!(text.contains("found: 10  new: 3  updated: 7  deactivated: 1"));
    assert!(text.contains("source: demo"));
    assert!(text.ends_with("error: live extraction produced 2 candidate(s)"));
}

#[test]
fn truncate_counts_characters_not_bytes() {
    assert_eq!(truncate("万豪旅享家会员积分加倍", 5), "万豪旅享家...");
    assert_eq!(truncate("short", 10), "short");
}

#[tokio::test]
async fn demo_dry_run_needs_no_database_url() {
    let config = config_without_database();
    run_scrape(&config, true, true)
        .await
        .expect("dry run should not touch the database");
}

#[tokio::test]
async fn database_backed_scrape_without_url_fails_before_running() {
    let config = config_without_database();
    let err = run_scrape(&config, true, false)
        .await
        .expect_err("missing DATABASE_URL");
    assert!(err.to_string().contains("DATABASE_URL"), "got: {err}");
}
