mod report;
mod scrape;

use clap::{Parser, Subcommand};
use promowatch_core::CampaignQuery;
use tracing_subscriber::EnvFilter;

use crate::report::{run_campaigns_list, run_logs, run_stats};
use crate::scrape::run_scrape;

#[derive(Debug, Parser)]
#[command(name = "promowatch-cli")]
#[command(about = "Competitor promotion tracker command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Run one reconciliation against the configured competitor pages
    Scrape {
        /// Load the built-in demo campaigns instead of fetching pages
        #[arg(long)]
        demo: bool,

        /// Run against an in-memory store and leave the database untouched
        #[arg(long)]
        dry_run: bool,
    },
    /// Inspect stored campaigns
    Campaigns {
        #[command(subcommand)]
        command: CampaignCommands,
    },
    /// Show recent scrape-log entries, newest first
    Logs {
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    Ping,
    Migrate,
}

#[derive(Debug, Subcommand)]
enum CampaignCommands {
    /// List campaigns, most recently seen first
    List {
        #[arg(long)]
        category: Option<String>,

        /// Only active campaigns
        #[arg(long, conflicts_with = "inactive")]
        active: bool,

        /// Only inactive campaigns
        #[arg(long)]
        inactive: bool,

        /// Case-insensitive substring of name or description
        #[arg(long)]
        search: Option<String>,

        #[arg(long, default_value_t = 50)]
        limit: i64,

        #[arg(long, default_value_t = 0)]
        offset: i64,
    },
    /// Totals by status, category and competitor
    Stats,
}

impl CampaignCommands {
    fn to_query(&self) -> Option<CampaignQuery> {
        match self {
            CampaignCommands::List {
                category,
                active,
                inactive,
                search,
                limit,
                offset,
            } => Some(CampaignQuery {
                competitor: None,
                category: category.clone(),
                is_active: match (active, inactive) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                },
                search: search.clone(),
                limit: Some(*limit),
                offset: Some(*offset),
            }),
            CampaignCommands::Stats => None,
        }
    }
}

async fn connect(config: &promowatch_core::AppConfig) -> anyhow::Result<sqlx::PgPool> {
    Ok(promowatch_db::connect(&config.database).await?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("promowatch-cli ready; run with --help for commands");
        return Ok(());
    };

    let config = promowatch_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match command {
        Commands::Db {
            command: DbCommands::Ping,
        } => {
            let pool = connect(&config).await?;
            promowatch_db::ping(&pool).await?;
            println!("database ok");
        }
        Commands::Db {
            command: DbCommands::Migrate,
        } => {
            let pool = connect(&config).await?;
            let applied = promowatch_db::migrate(&pool).await?;
            if applied.is_empty() {
                println!("schema already up to date");
            }
            for migration in &applied {
                println!("applied {} {}", migration.version, migration.description);
            }
        }
        Commands::Scrape { demo, dry_run } => run_scrape(&config, demo, dry_run).await?,
        Commands::Campaigns { command } => {
            let pool = connect(&config).await?;
            match command.to_query() {
                Some(query) => run_campaigns_list(&pool, &query).await?,
                None => run_stats(&pool).await?,
            }
        }
        Commands::Logs { limit } => {
            let pool = connect(&config).await?;
            run_logs(&pool, limit).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests;
