//! Database operations for the `trend_packs` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use trendpack_core::Category;

use crate::DbError;

/// A row from the `trend_packs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TrendPackRow {
    pub id: i64,
    pub week_key: String,
    pub category: String,
    pub title: String,
    pub summary: String,
    pub trend_keywords: Vec<String>,
    pub status: String,
    pub generated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const PACK_COLUMNS: &str = "id, week_key, category, title, summary, trend_keywords, status, \
                            generated_at, created_at, updated_at";

/// Creates or refreshes the weekly pack for `(week_key, category)`.
///
/// The pair is unique; a rerun within the same week updates title, summary,
/// and keywords in place. The pack is published immediately — the pipeline
/// exercises no draft/review gate.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_trend_pack(
    pool: &PgPool,
    week_key: &str,
    category: Category,
    title: &str,
    summary: &str,
    keywords: &[String],
) -> Result<TrendPackRow, DbError> {
    let row = sqlx::query_as::<_, TrendPackRow>(&format!(
        "INSERT INTO trend_packs (week_key, category, title, summary, trend_keywords, status, generated_at) \
         VALUES ($1, $2, $3, $4, $5, 'published', NOW()) \
         ON CONFLICT (week_key, category) DO UPDATE SET \
             title          = EXCLUDED.title, \
             summary        = EXCLUDED.summary, \
             trend_keywords = EXCLUDED.trend_keywords, \
             status         = 'published', \
             generated_at   = NOW(), \
             updated_at     = NOW() \
         RETURNING {PACK_COLUMNS}"
    ))
    .bind(week_key)
    .bind(category.as_str())
    .bind(title)
    .bind(summary)
    .bind(keywords)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Fetches the pack for a `(week_key, category)` pair.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no such pack exists, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_pack_by_week_category(
    pool: &PgPool,
    week_key: &str,
    category: Category,
) -> Result<TrendPackRow, DbError> {
    let row = sqlx::query_as::<_, TrendPackRow>(&format!(
        "SELECT {PACK_COLUMNS} FROM trend_packs WHERE week_key = $1 AND category = $2"
    ))
    .bind(week_key)
    .bind(category.as_str())
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Returns the most recent `limit` packs, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recent_packs(pool: &PgPool, limit: i64) -> Result<Vec<TrendPackRow>, DbError> {
    let rows = sqlx::query_as::<_, TrendPackRow>(&format!(
        "SELECT {PACK_COLUMNS} FROM trend_packs \
         ORDER BY generated_at DESC NULLS LAST, id DESC \
         LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Total pack count, for the status endpoint.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_packs(pool: &PgPool) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM trend_packs")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
