use axum::{extract::State, Extension, Json};
use serde::Serialize;

use crate::middleware::RequestId;

use super::scrape::ScrapeLogItem;
use super::{map_db_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct CategoryCountItem {
    category: String,
    count: i64,
}

#[derive(Debug, Serialize)]
pub(super) struct CompetitorCountItem {
    competitor_name: String,
    total: i64,
    active: i64,
}

#[derive(Debug, Serialize)]
pub(super) struct StatsData {
    total: i64,
    active: i64,
    inactive: i64,
    by_category: Vec<CategoryCountItem>,
    by_competitor: Vec<CompetitorCountItem>,
    last_scrape: Option<ScrapeLogItem>,
}

pub(super) async fn get_stats(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<StatsData>>, ApiError> {
    let stats = promowatch_db::campaign_stats(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let last_scrape = promowatch_db::latest_scrape_log(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = StatsData {
        total: stats.total,
        active: stats.active,
        inactive: stats.inactive,
        by_category: stats
            .by_category
            .into_iter()
            .map(|c| CategoryCountItem {
                category: c.category,
                count: c.count,
            })
            .collect(),
        by_competitor: stats
            .by_competitor
            .into_iter()
            .map(|c| CompetitorCountItem {
                competitor_name: c.competitor_name,
                total: c.total,
                active: c.active,
            })
            .collect(),
        last_scrape: last_scrape.map(ScrapeLogItem::from),
    };

    Ok(Json(ApiResponse::new(data, req_id.0)))
}
