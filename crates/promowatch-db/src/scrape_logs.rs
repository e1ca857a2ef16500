//! Database operations for the append-only `scrape_logs` table.

use chrono::{DateTime, Utc};
use promowatch_core::NewScrapeLog;
use sqlx::PgPool;

use crate::DbError;

/// A row from the `scrape_logs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScrapeLogRow {
    pub id: i64,
    pub run_at: DateTime<Utc>,
    pub competitor_name: String,
    pub source_url: String,
    pub status: String,
    pub campaigns_found: i32,
    pub new_campaigns: i32,
    pub error_message: Option<String>,
}

/// Appends one scrape-log entry and returns its id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_scrape_log(pool: &PgPool, entry: &NewScrapeLog) -> Result<i64, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO scrape_logs \
             (run_at, competitor_name, source_url, status, \
              campaigns_found, new_campaigns, error_message) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING id",
    )
    .bind(entry.run_at)
    .bind(&entry.competitor_name)
    .bind(&entry.source_url)
    .bind(entry.status.as_str())
    .bind(entry.campaigns_found)
    .bind(entry.new_campaigns)
    .bind(entry.error_message.as_deref())
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Lists scrape-log entries, most recent first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_scrape_logs(pool: &PgPool, limit: i64) -> Result<Vec<ScrapeLogRow>, DbError> {
    let rows = sqlx::query_as::<_, ScrapeLogRow>(
        "SELECT id, run_at, competitor_name, source_url, status, \
                campaigns_found, new_campaigns, error_message \
         FROM scrape_logs \
         ORDER BY run_at DESC, id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns the most recent scrape-log entry, if any run has been logged.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn latest_scrape_log(pool: &PgPool) -> Result<Option<ScrapeLogRow>, DbError> {
    let row = sqlx::query_as::<_, ScrapeLogRow>(
        "SELECT id, run_at, competitor_name, source_url, status, \
                campaigns_found, new_campaigns, error_message \
         FROM scrape_logs \
         ORDER BY run_at DESC, id DESC \
         LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
