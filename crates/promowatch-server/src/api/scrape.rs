use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use promowatch_core::RunSummary;
use promowatch_db::ScrapeLogRow;
use promowatch_pipeline::PipelineError;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState};

const DEFAULT_LOG_LIMIT: i64 = 20;
const MAX_LOG_LIMIT: i64 = 200;

#[derive(Debug, Default, Deserialize)]
pub(super) struct ScrapeRequest {
    #[serde(default)]
    pub use_demo: bool,
}

#[derive(Debug, Deserialize)]
pub(super) struct ScrapeLogQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct ScrapeLogItem {
    id: i64,
    run_at: DateTime<Utc>,
    competitor_name: String,
    source_url: String,
    status: String,
    campaigns_found: i32,
    new_campaigns: i32,
    error_message: Option<String>,
}

impl From<ScrapeLogRow> for ScrapeLogItem {
    fn from(row: ScrapeLogRow) -> Self {
        Self {
            id: row.id,
            run_at: row.run_at,
            competitor_name: row.competitor_name,
            source_url: row.source_url,
            status: row.status,
            campaigns_found: row.campaigns_found,
            new_campaigns: row.new_campaigns,
            error_message: row.error_message,
        }
    }
}

fn normalize_log_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LOG_LIMIT).clamp(1, MAX_LOG_LIMIT)
}

/// Runs one reconciliation and returns its summary. An empty body means a
/// live run.
///
/// The run executes on its own task, so a client that disconnects does not
/// cancel it.
pub(super) async fn trigger_scrape(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Bytes,
) -> Result<Json<ApiResponse<RunSummary>>, ApiError> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        ScrapeRequest::default()
    } else {
        serde_json::from_slice::<ScrapeRequest>(&body).map_err(|e| {
            ApiError::new(
                req_id.0.clone(),
                "validation_error",
                format!("invalid scrape request: {e}"),
            )
        })?
    };

    tracing::info!(use_demo = request.use_demo, "api: scrape requested");
    let engine = Arc::clone(&state.engine);
    let use_demo = request.use_demo;
    let outcome = tokio::spawn(async move { engine.run(use_demo).await })
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "api: scrape task did not complete");
            ApiError::new(req_id.0.clone(), "internal_error", "scrape task did not complete")
        })?;

    match outcome {
        Ok(summary) => Ok(Json(ApiResponse::new(summary, req_id.0))),
        Err(PipelineError::AlreadyRunning) => Err(ApiError::new(
            req_id.0,
            "conflict",
            "a scrape run is already in progress",
        )),
        Err(e @ PipelineError::Configuration(_)) => {
            tracing::error!(error = %e, "api: scrape cannot start");
            Err(ApiError::new(req_id.0, "configuration_error", e.to_string()))
        }
    }
}

pub(super) async fn list_scrape_logs(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ScrapeLogQuery>,
) -> Result<Json<ApiResponse<Vec<ScrapeLogItem>>>, ApiError> {
    let rows = promowatch_db::list_scrape_logs(&state.pool, normalize_log_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows.into_iter().map(ScrapeLogItem::from).collect();
    Ok(Json(ApiResponse::new(data, req_id.0)))
}
