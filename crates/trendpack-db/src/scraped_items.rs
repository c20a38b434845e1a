//! Database operations for the `scraped_items` table.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::{PgPool, QueryBuilder};

use crate::DbError;

/// A row from the `scraped_items` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScrapedItemRow {
    pub id: i64,
    pub pack_id: i64,
    pub source_domain: String,
    pub source_type: String,
    pub url: String,
    pub title: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub extracted_data: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Insert parameters for one item; the caller has already validated and
/// deduplicated them.
#[derive(Debug, Clone)]
pub struct NewScrapedItem {
    pub source_domain: String,
    pub source_type: String,
    pub url: String,
    pub title: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub extracted_data: Option<serde_json::Value>,
}

/// Loads every item URL already stored for a pack, for pre-insert dedup.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_item_urls(pool: &PgPool, pack_id: i64) -> Result<HashSet<String>, DbError> {
    let urls: Vec<String> =
        sqlx::query_scalar("SELECT url FROM scraped_items WHERE pack_id = $1")
            .bind(pack_id)
            .fetch_all(pool)
            .await?;

    Ok(urls.into_iter().collect())
}

/// Bulk-inserts items in a single multi-row statement.
///
/// All rows succeed or the whole statement fails; callers wanting per-item
/// recovery fall back to [`insert_item`].
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_items(
    pool: &PgPool,
    pack_id: i64,
    items: &[NewScrapedItem],
) -> Result<(), DbError> {
    if items.is_empty() {
        return Ok(());
    }

    let mut builder = QueryBuilder::new(
        "INSERT INTO scraped_items \
         (pack_id, source_domain, source_type, url, title, summary, tags, extracted_data) ",
    );
    builder.push_values(items, |mut b, item| {
        b.push_bind(pack_id)
            .push_bind(&item.source_domain)
            .push_bind(&item.source_type)
            .push_bind(&item.url)
            .push_bind(&item.title)
            .push_bind(&item.summary)
            .push_bind(&item.tags)
            .push_bind(&item.extracted_data);
    });
    builder.build().execute(pool).await?;

    Ok(())
}

/// Inserts a single item.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_item(
    pool: &PgPool,
    pack_id: i64,
    item: &NewScrapedItem,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO scraped_items \
         (pack_id, source_domain, source_type, url, title, summary, tags, extracted_data) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(pack_id)
    .bind(&item.source_domain)
    .bind(&item.source_type)
    .bind(&item.url)
    .bind(&item.title)
    .bind(&item.summary)
    .bind(&item.tags)
    .bind(&item.extracted_data)
    .execute(pool)
    .await?;

    Ok(())
}

/// Total item count, for the status endpoint.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_items(pool: &PgPool) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM scraped_items")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
