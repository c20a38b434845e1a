//! Database operations for `prompt_templates` and `pack_prompts`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use trendpack_core::Category;

use crate::DbError;

/// A row from the `prompt_templates` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PromptTemplateRow {
    pub id: i64,
    pub category: String,
    pub name: String,
    pub body: String,
    pub is_free: bool,
    pub sort_hint: i32,
    pub created_at: DateTime<Utc>,
}

/// Lists the non-free templates eligible for linking to a pack of this
/// category, in stable `sort_hint, id` order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_paid_templates(
    pool: &PgPool,
    category: Category,
) -> Result<Vec<PromptTemplateRow>, DbError> {
    let rows = sqlx::query_as::<_, PromptTemplateRow>(
        "SELECT id, category, name, body, is_free, sort_hint, created_at \
         FROM prompt_templates \
         WHERE category = $1 AND is_free = FALSE \
         ORDER BY sort_hint, id",
    )
    .bind(category.as_str())
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Prompt ids already linked to a pack, so a rerun links only the delta.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_linked_prompt_ids(pool: &PgPool, pack_id: i64) -> Result<Vec<i64>, DbError> {
    let ids: Vec<i64> =
        sqlx::query_scalar("SELECT prompt_id FROM pack_prompts WHERE pack_id = $1")
            .bind(pack_id)
            .fetch_all(pool)
            .await?;

    Ok(ids)
}

/// Links one prompt to a pack at the given sort position.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails (including a unique
/// violation on `(pack_id, prompt_id)`).
pub async fn insert_pack_prompt(
    pool: &PgPool,
    pack_id: i64,
    prompt_id: i64,
    sort_order: i32,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO pack_prompts (pack_id, prompt_id, sort_order) VALUES ($1, $2, $3)",
    )
    .bind(pack_id)
    .bind(prompt_id)
    .bind(sort_order)
    .execute(pool)
    .await?;

    Ok(())
}

/// Seeds a couple of sample templates per category for development and tests.
///
/// No-op when the table already has rows.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if a query fails.
pub async fn seed_prompt_templates(pool: &PgPool) -> Result<u64, DbError> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM prompt_templates")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        return Ok(0);
    }

    let mut inserted = 0u64;
    for category in Category::ALL {
        for (idx, (name, is_free)) in [
            ("weekly digest", false),
            ("deep dive", false),
            ("starter", true),
        ]
        .into_iter()
        .enumerate()
        {
            sqlx::query(
                "INSERT INTO prompt_templates (category, name, body, is_free, sort_hint) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(category.as_str())
            .bind(format!("{category} {name}"))
            .bind(format!(
                "Write a {name} about this week's {category} trends using the attached items."
            ))
            .bind(is_free)
            .bind(i32::try_from(idx).unwrap_or(0))
            .execute(pool)
            .await?;
            inserted += 1;
        }
    }

    Ok(inserted)
}
