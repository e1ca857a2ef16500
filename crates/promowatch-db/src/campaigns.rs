//! Database operations for the `campaigns` table.
//!
//! Write helpers take a `&mut PgConnection` so the store session can run them
//! inside one transaction; dashboard reads take the pool.

use chrono::{DateTime, Utc};
use promowatch_core::{
    CampaignCategory, CampaignQuery, CampaignRecord, CampaignUpdate, NewCampaign,
};
use sqlx::{PgConnection, PgPool};

use crate::DbError;

const CAMPAIGN_COLUMNS: &str = "id, competitor_name, name, info, source_url, category, \
     first_seen_at, last_seen_at, is_active";

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `campaigns` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CampaignRow {
    pub id: i64,
    pub competitor_name: String,
    pub name: String,
    pub info: String,
    pub source_url: String,
    pub category: String,
    pub first_seen_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
    pub is_active: bool,
}

impl From<CampaignRow> for CampaignRecord {
    fn from(row: CampaignRow) -> Self {
        CampaignRecord {
            id: row.id,
            competitor_name: row.competitor_name,
            name: row.name,
            info: row.info,
            source_url: row.source_url,
            category: CampaignCategory::from_label(&row.category),
            first_seen_at: row.first_seen_at,
            last_seen_at: row.last_seen_at,
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CompetitorCount {
    pub competitor_name: String,
    pub total: i64,
    pub active: i64,
}

/// Aggregate counts for the dashboard summary.
#[derive(Debug, Clone)]
pub struct CampaignStats {
    pub total: i64,
    pub active: i64,
    pub inactive: i64,
    pub by_category: Vec<CategoryCount>,
    pub by_competitor: Vec<CompetitorCount>,
}

// ---------------------------------------------------------------------------
// Reconciliation writes
// ---------------------------------------------------------------------------

/// Returns stored campaigns of `competitor_name` matching `name` and
/// `source_url`: the URLs must be equal unless either side is empty.
///
/// Exact URL matches sort first, then active rows, then most recently seen.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_campaign_matches(
    conn: &mut PgConnection,
    competitor_name: &str,
    name: &str,
    source_url: &str,
) -> Result<Vec<CampaignRow>, DbError> {
    let rows = sqlx::query_as::<_, CampaignRow>(&format!(
        "SELECT {CAMPAIGN_COLUMNS} FROM campaigns \
         WHERE competitor_name = $1 AND name = $2 \
           AND (source_url = '' OR $3 = '' OR source_url = $3) \
         ORDER BY (source_url = $3) DESC, is_active DESC, last_seen_at DESC, id"
    ))
    .bind(competitor_name)
    .bind(name)
    .bind(source_url)
    .fetch_all(conn)
    .await?;

    Ok(rows)
}

/// Inserts a campaign with `first_seen_at = last_seen_at = seen_at` and
/// returns its id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_campaign(
    conn: &mut PgConnection,
    campaign: &NewCampaign,
) -> Result<i64, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO campaigns \
             (competitor_name, name, info, source_url, category, \
              first_seen_at, last_seen_at, is_active) \
         VALUES ($1, $2, $3, $4, $5, $6, $6, true) \
         RETURNING id",
    )
    .bind(&campaign.competitor_name)
    .bind(&campaign.name)
    .bind(&campaign.info)
    .bind(&campaign.source_url)
    .bind(campaign.category.as_str())
    .bind(campaign.seen_at)
    .fetch_one(conn)
    .await?;

    Ok(id)
}

/// Applies the non-`None` fields of `update` to campaign `id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row has that id, or [`DbError::Sqlx`]
/// if the update fails.
pub async fn update_campaign(
    conn: &mut PgConnection,
    id: i64,
    update: &CampaignUpdate,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE campaigns SET \
             last_seen_at = COALESCE($2, last_seen_at), \
             is_active = COALESCE($3, is_active), \
             info = COALESCE($4, info), \
             category = COALESCE($5, category), \
             updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(id)
    .bind(update.last_seen_at)
    .bind(update.is_active)
    .bind(update.info.as_deref())
    .bind(update.category.map(CampaignCategory::as_str))
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}

/// Lists every active campaign of `competitor_name`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_active_campaigns(
    conn: &mut PgConnection,
    competitor_name: &str,
) -> Result<Vec<CampaignRow>, DbError> {
    let rows = sqlx::query_as::<_, CampaignRow>(&format!(
        "SELECT {CAMPAIGN_COLUMNS} FROM campaigns \
         WHERE competitor_name = $1 AND is_active = true \
         ORDER BY id"
    ))
    .bind(competitor_name)
    .fetch_all(conn)
    .await?;

    Ok(rows)
}

// ---------------------------------------------------------------------------
// Dashboard reads
// ---------------------------------------------------------------------------

const LIST_FILTER: &str = "WHERE ($1::text IS NULL OR competitor_name ILIKE $1) \
       AND ($2::text IS NULL OR category = $2) \
       AND ($3::boolean IS NULL OR is_active = $3) \
       AND ($4::text IS NULL OR name ILIKE $4 OR info ILIKE $4)";

/// Lists campaigns matching `query`, most recently seen first, and returns
/// the page together with the unpaginated match count.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either query fails.
pub async fn list_campaigns(
    pool: &PgPool,
    query: &CampaignQuery,
) -> Result<(Vec<CampaignRow>, i64), DbError> {
    let competitor = query.competitor_filter().map(contains_pattern);
    let category = query.category_filter();
    let search = query.search_filter().map(contains_pattern);

    let rows = sqlx::query_as::<_, CampaignRow>(&format!(
        "SELECT {CAMPAIGN_COLUMNS} FROM campaigns {LIST_FILTER} \
         ORDER BY last_seen_at DESC, id DESC \
         LIMIT $5 OFFSET $6"
    ))
    .bind(competitor.as_deref())
    .bind(category)
    .bind(query.is_active)
    .bind(search.as_deref())
    .bind(query.limit())
    .bind(query.offset())
    .fetch_all(pool)
    .await?;

    let total = sqlx::query_scalar::<_, i64>(&format!(
        "SELECT COUNT(*) FROM campaigns {LIST_FILTER}"
    ))
    .bind(competitor.as_deref())
    .bind(category)
    .bind(query.is_active)
    .bind(search.as_deref())
    .fetch_one(pool)
    .await?;

    Ok((rows, total))
}

/// Fetches one campaign by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_campaign(pool: &PgPool, id: i64) -> Result<Option<CampaignRow>, DbError> {
    let row = sqlx::query_as::<_, CampaignRow>(&format!(
        "SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Distinct category labels in use, alphabetically.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_categories(pool: &PgPool) -> Result<Vec<String>, DbError> {
    let rows = sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT category FROM campaigns ORDER BY category",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Distinct competitor names, alphabetically.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_competitors(pool: &PgPool) -> Result<Vec<String>, DbError> {
    let rows = sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT competitor_name FROM campaigns ORDER BY competitor_name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Totals, active/inactive split, and per-category and per-competitor counts.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any query fails.
pub async fn campaign_stats(pool: &PgPool) -> Result<CampaignStats, DbError> {
    let (total, active): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COUNT(*) FILTER (WHERE is_active) FROM campaigns",
    )
    .fetch_one(pool)
    .await?;

    let by_category = sqlx::query_as::<_, CategoryCount>(
        "SELECT category, COUNT(*) AS count FROM campaigns \
         GROUP BY category ORDER BY count DESC, category",
    )
    .fetch_all(pool)
    .await?;

    let by_competitor = sqlx::query_as::<_, CompetitorCount>(
        "SELECT competitor_name, COUNT(*) AS total, \
                COUNT(*) FILTER (WHERE is_active) AS active \
         FROM campaigns GROUP BY competitor_name ORDER BY competitor_name",
    )
    .fetch_all(pool)
    .await?;

    Ok(CampaignStats {
        total,
        active,
        inactive: total - active,
        by_category,
        by_competitor,
    })
}

/// `ILIKE` pattern matching `needle` anywhere, with wildcards in the needle
/// escaped.
fn contains_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_pattern_wraps_needle() {
        assert_eq!(contains_pattern("brunch"), "%brunch%");
        assert_eq!(contains_pattern("会员"), "%会员%");
    }

    #[test]
    fn contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn row_converts_to_record_with_parsed_category() {
        let now = Utc::now();
        let row = CampaignRow {
            id: 7,
            competitor_name: "Marriott".to_string(),
            name: "水疗养生套餐".to_string(),
            info: String::new(),
            source_url: String::new(),
            category: "spa".to_string(),
            first_seen_at: now,
            last_seen_at: now,
            is_active: true,
        };
        let record = CampaignRecord::from(row);
        assert_eq!(record.category, CampaignCategory::Spa);
        assert_eq!(record.id, 7);
    }
}
