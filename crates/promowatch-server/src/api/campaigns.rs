use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use promowatch_core::{CampaignCategory, CampaignQuery, CampaignRecord};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct CampaignItem {
    id: i64,
    competitor_name: String,
    name: String,
    info: String,
    source_url: String,
    category: CampaignCategory,
    first_seen_at: DateTime<Utc>,
    last_seen_at: DateTime<Utc>,
    is_active: bool,
    days_since_seen: i64,
}

#[derive(Debug, Serialize)]
pub(super) struct CampaignList {
    items: Vec<CampaignItem>,
    total: i64,
    limit: i64,
    offset: i64,
}

impl CampaignItem {
    fn from_record(record: CampaignRecord, now: DateTime<Utc>) -> Self {
        Self {
            days_since_seen: record.days_since_seen(now),
            id: record.id,
            competitor_name: record.competitor_name,
            name: record.name,
            info: record.info,
            source_url: record.source_url,
            category: record.category,
            first_seen_at: record.first_seen_at,
            last_seen_at: record.last_seen_at,
            is_active: record.is_active,
        }
    }
}

pub(super) async fn list_campaigns(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<CampaignQuery>,
) -> Result<Json<ApiResponse<CampaignList>>, ApiError> {
    if let Some(category) = query.category_filter() {
        if !CampaignCategory::ALL.iter().any(|c| c.as_str() == category) {
            return Err(ApiError::new(
                req_id.0,
                "validation_error",
                format!("unknown category: {category}"),
            ));
        }
    }

    let (rows, total) = promowatch_db::list_campaigns(&state.pool, &query)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let now = Utc::now();
    let items = rows
        .into_iter()
        .map(|row| CampaignItem::from_record(row.into(), now))
        .collect();

    Ok(Json(ApiResponse::new(
        CampaignList {
            items,
            total,
            limit: query.limit(),
            offset: query.offset(),
        },
        req_id.0,
    )))
}

pub(super) async fn get_campaign(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<CampaignItem>>, ApiError> {
    let row = promowatch_db::get_campaign(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| {
            ApiError::new(req_id.0.clone(), "not_found", format!("campaign {id} not found"))
        })?;

    Ok(Json(ApiResponse::new(
        CampaignItem::from_record(row.into(), Utc::now()),
        req_id.0,
    )))
}

pub(super) async fn list_categories(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let categories = promowatch_db::list_categories(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(categories, req_id.0)))
}

pub(super) async fn list_competitors(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let competitors = promowatch_db::list_competitors(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(competitors, req_id.0)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use chrono::{Duration, Utc};
    use promowatch_core::{CampaignCategory, CampaignRecord};

    use super::CampaignItem;
    use crate::api::test_support::{get, lazy_pool, state};

    #[test]
    fn campaign_item_carries_days_since_seen() {
        let now = Utc::now();
        let record = CampaignRecord {
            id: 7,
            competitor_name: "Marriott".to_string(),
            name: "水疗养生套餐".to_string(),
            info: String::new(),
            source_url: String::new(),
            category: CampaignCategory::Spa,
            first_seen_at: now - Duration::days(10),
            last_seen_at: now - Duration::days(3),
            is_active: false,
        };

        let json = serde_json::to_value(CampaignItem::from_record(record, now)).expect("json");
        assert_eq!(json["days_since_seen"], 3);
        assert_eq!(json["category"], "spa");
        assert_eq!(json["name"], "水疗养生套餐");
    }

    #[tokio::test]
    async fn unknown_category_is_rejected_before_querying() {
        let (status, json) = get(state(lazy_pool()), "/api/v1/campaigns?category=casino").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
    }

    async fn seed_demo(pool: &sqlx::PgPool) {
        let app_state = state(pool.clone());
        let summary = app_state.engine.run(true).await.expect("demo run");
        assert_eq!(summary.new_campaigns, 10);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn list_campaigns_filters_and_pages(pool: sqlx::PgPool) {
        seed_demo(&pool).await;

        let (status, json) = get(state(pool.clone()), "/api/v1/campaigns?limit=3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["total"], 10);
        assert_eq!(json["data"]["items"].as_array().map(Vec::len), Some(3));
        assert_eq!(json["data"]["limit"], 3);

        let (_, json) = get(state(pool.clone()), "/api/v1/campaigns?category=rewards").await;
        assert_eq!(json["data"]["total"], 2);

        let (_, json) = get(
            state(pool.clone()),
            "/api/v1/campaigns?category=all&is_active=false",
        )
        .await;
        assert_eq!(json["data"]["total"], 0);

        let (_, json) = get(state(pool), "/api/v1/campaigns?search=%E6%9C%88%E9%A5%BC").await;
        let items = json["data"]["items"].as_array().expect("items");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["name"], "中秋团圆季");
        assert_eq!(items[0]["days_since_seen"], 0);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn get_campaign_returns_404_for_unknown_id(pool: sqlx::PgPool) {
        let (status, json) = get(state(pool), "/api/v1/campaigns/999999").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "not_found");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn get_campaign_returns_stored_campaign(pool: sqlx::PgPool) {
        seed_demo(&pool).await;
        let id: i64 = sqlx::query_scalar("SELECT id FROM campaigns WHERE name = $1")
            .bind("婚礼场地预订优惠")
            .fetch_one(&pool)
            .await
            .expect("seeded id");

        let (status, json) = get(state(pool), &format!("/api/v1/campaigns/{id}")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["id"], id);
        assert_eq!(json["data"]["category"], "wedding");
        assert_eq!(json["data"]["is_active"], true);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn categories_and_competitors_reflect_stored_rows(pool: sqlx::PgPool) {
        seed_demo(&pool).await;

        let (status, json) = get(state(pool.clone()), "/api/v1/categories").await;
        assert_eq!(status, StatusCode::OK);
        let categories = json["data"].as_array().expect("categories");
        assert!(categories.iter().any(|c| c == "family"));
        assert!(categories.iter().all(|c| c != "general"));

        let (_, json) = get(state(pool), "/api/v1/competitors").await;
        assert_eq!(json["data"], serde_json::json!(["Marriott"]));
    }
}
