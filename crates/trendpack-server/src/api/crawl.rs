//! Crawl trigger and status endpoints.

use std::collections::HashMap;

use axum::{body::Bytes, extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use trendpack_core::Category;

use crate::middleware::RequestId;
use crate::pipeline::{self, CrawlRunSummary};
use crate::stats::{CrawlLogEntry, CrawlStats};

use super::{packs::PackItem, ApiError, ApiResponse, AppState, ResponseMeta};

const DEFAULT_ITEM_LIMIT: usize = 10;
const MAX_ITEM_LIMIT: usize = 50;

/// Packs shown by the status endpoint.
const STATUS_RECENT_PACKS: i64 = 5;
/// Log lines shown by the status endpoint.
const STATUS_RECENT_LOGS: usize = 10;

#[derive(Debug, Default, Deserialize)]
pub(super) struct RunRequest {
    pub categories: Option<Vec<String>>,
    pub limit: Option<usize>,
}

/// Triggers a full pipeline run. Unknown categories are dropped; an omitted
/// or empty list means every category.
pub(super) async fn run_crawl(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Bytes,
) -> Result<Json<ApiResponse<CrawlRunSummary>>, ApiError> {
    let request: RunRequest = if body.is_empty() {
        RunRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::new(req_id.0.clone(), "bad_request", format!("invalid JSON body: {e}")))?
    };

    let categories = resolve_categories(request.categories.as_deref());
    let limit = request
        .limit
        .unwrap_or(DEFAULT_ITEM_LIMIT)
        .clamp(1, MAX_ITEM_LIMIT);

    tracing::info!(
        categories = ?categories.iter().map(|c| c.as_str()).collect::<Vec<_>>(),
        limit,
        "crawl run triggered"
    );

    let summary = pipeline::run_crawl(
        &state.pool,
        &state.client,
        &state.crawler,
        &state.stats,
        &categories,
        limit,
    )
    .await;

    Ok(Json(ApiResponse {
        data: summary,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Maps requested category names onto the whitelist, preserving request
/// order and dropping duplicates. `None` or an empty list selects all.
fn resolve_categories(requested: Option<&[String]>) -> Vec<Category> {
    match requested {
        None => Category::ALL.to_vec(),
        Some(names) if names.is_empty() => Category::ALL.to_vec(),
        Some(names) => {
            let mut resolved: Vec<Category> = Vec::new();
            for name in names {
                match Category::parse(name) {
                    Some(category) if !resolved.contains(&category) => resolved.push(category),
                    Some(_) => {}
                    None => {
                        tracing::warn!(category = %name, "unknown category ignored");
                    }
                }
            }
            resolved
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct CrawlStatusData {
    pub recent_packs: Vec<PackItem>,
    pub total_packs: i64,
    pub total_items: i64,
    pub stats: HashMap<String, CrawlStats>,
    pub recent_logs: Vec<CrawlLogEntry>,
}

/// Best-effort view of pipeline state: DB failures degrade to empty data
/// with a warning instead of failing the endpoint.
pub(super) async fn crawl_status(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<CrawlStatusData>> {
    let recent_packs = match trendpack_db::list_recent_packs(&state.pool, STATUS_RECENT_PACKS).await
    {
        Ok(rows) => rows.into_iter().map(PackItem::from).collect(),
        Err(e) => {
            tracing::warn!(error = %e, "status: recent pack listing failed");
            Vec::new()
        }
    };
    let total_packs = trendpack_db::count_packs(&state.pool).await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "status: pack count failed");
        0
    });
    let total_items = trendpack_db::count_items(&state.pool).await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "status: item count failed");
        0
    });

    Json(ApiResponse {
        data: CrawlStatusData {
            recent_packs,
            total_packs,
            total_items,
            stats: state.stats.stats_snapshot().await,
            recent_logs: state.stats.recent_logs(STATUS_RECENT_LOGS).await,
        },
        meta: ResponseMeta::new(req_id.0),
    })
}
