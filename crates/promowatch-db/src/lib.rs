//! Postgres persistence for campaigns and scrape logs.

use std::collections::HashSet;

use promowatch_core::{ConfigError, DatabaseSettings};
use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;

// Path relative to crates/promowatch-db/Cargo.toml; resolves to <workspace-root>/migrations/
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

#[derive(Debug, Error)]
pub enum DbError {
    #[error("record not found")]
    NotFound,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// A migration applied by [`migrate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMigration {
    pub version: i64,
    pub description: String,
}

/// Opens a pool sized and bounded by `settings`.
///
/// # Errors
///
/// Returns [`DbError::Config`] if no database URL is configured, or
/// [`DbError::Sqlx`] if the connection cannot be established.
pub async fn connect(settings: &DatabaseSettings) -> Result<PgPool, DbError> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(settings.acquire_timeout)
        .connect(settings.url()?)
        .await?;
    Ok(pool)
}

/// Brings the schema up to date and returns the migrations this call
/// applied, oldest first. Empty when the schema was already current.
///
/// # Errors
///
/// Returns [`DbError::Migration`] if any migration fails.
pub async fn migrate(pool: &PgPool) -> Result<Vec<AppliedMigration>, DbError> {
    // A fresh database has no bookkeeping table yet.
    let before: HashSet<i64> =
        sqlx::query_scalar::<_, i64>("SELECT version FROM _sqlx_migrations WHERE success")
            .fetch_all(pool)
            .await
            .map(|versions| versions.into_iter().collect())
            .unwrap_or_default();

    MIGRATOR.run(pool).await?;

    let applied: Vec<AppliedMigration> = MIGRATOR
        .iter()
        .filter(|m| !m.migration_type.is_down_migration() && !before.contains(&m.version))
        .map(|m| AppliedMigration {
            version: m.version,
            description: m.description.to_string(),
        })
        .collect();
    for migration in &applied {
        tracing::info!(
            version = migration.version,
            description = %migration.description,
            "applied migration"
        );
    }
    Ok(applied)
}

/// Round-trips `SELECT 1` to prove the pool can reach the database.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn ping(pool: &PgPool) -> Result<(), DbError> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await?;
    Ok(())
}

pub mod campaigns;
pub mod scrape_logs;
pub mod store;

pub use campaigns::{
    campaign_stats, find_campaign_matches, get_campaign, insert_campaign, list_active_campaigns,
    list_campaigns, list_categories, list_competitors, update_campaign, CampaignRow,
    CampaignStats, CategoryCount, CompetitorCount,
};
pub use scrape_logs::{insert_scrape_log, latest_scrape_log, list_scrape_logs, ScrapeLogRow};
pub use store::{PgCampaignStore, PgStoreSession};
