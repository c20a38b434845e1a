//! Recent pack listing.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use trendpack_db::TrendPackRow;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct PacksQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct PackItem {
    pub id: i64,
    pub week_key: String,
    pub category: String,
    pub title: String,
    pub summary: String,
    pub trend_keywords: Vec<String>,
    pub status: String,
    pub generated_at: Option<DateTime<Utc>>,
}

impl From<TrendPackRow> for PackItem {
    fn from(row: TrendPackRow) -> Self {
        Self {
            id: row.id,
            week_key: row.week_key,
            category: row.category,
            title: row.title,
            summary: row.summary,
            trend_keywords: row.trend_keywords,
            status: row.status,
            generated_at: row.generated_at,
        }
    }
}

fn normalize_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(20).clamp(1, 100)
}

pub(super) async fn list_packs(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<PacksQuery>,
) -> Result<Json<ApiResponse<Vec<PackItem>>>, ApiError> {
    let rows = trendpack_db::list_recent_packs(&state.pool, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(PackItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}
