//! Crawl pipeline: keywords → scrape → process → persist → link.
//!
//! Categories run strictly sequentially, as do keywords within a category,
//! with fixed delays between them. One category's failure is recorded in its
//! own result and never aborts the remaining categories.

use std::collections::HashSet;
use std::time::Duration;

use serde::Serialize;
use sqlx::PgPool;
use trendpack_core::{current_week_key, Category, CrawlerConfig};
use trendpack_scraper::extract::extract_structured_data;
use trendpack_scraper::summary::{
    apply_category_summary_template, calculate_quality_score, enrich_summary,
};
use trendpack_scraper::validate::{dedup_key, is_duplicate, validate_item};
use trendpack_scraper::{collect_trend_keywords, crawl_by_category, FetchClient, ScrapedItem};

use crate::stats::{LogLevel, StatsRegistry};

/// Quality scores below this are logged; the item is still kept.
const LOW_QUALITY_THRESHOLD: u8 = 50;

/// Outcome for one category within a run.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryRunResult {
    pub category: String,
    pub pack_id: Option<i64>,
    pub keywords: Vec<String>,
    pub items_crawled: usize,
    pub items_saved: usize,
    pub items_skipped: usize,
    pub prompts_linked: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate outcome for a whole run.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlRunSummary {
    pub results: Vec<CategoryRunResult>,
    pub categories_run: usize,
    pub categories_failed: usize,
    pub total_items_saved: usize,
    pub duration_ms: u64,
}

/// Runs the full pipeline for the given categories.
pub async fn run_crawl(
    pool: &PgPool,
    client: &FetchClient,
    config: &CrawlerConfig,
    stats: &StatsRegistry,
    categories: &[Category],
    limit: usize,
) -> CrawlRunSummary {
    let started = std::time::Instant::now();
    let mut results = Vec::with_capacity(categories.len());

    for category in categories {
        results.push(run_category(pool, client, config, stats, *category, limit).await);
    }

    let categories_failed = results.iter().filter(|r| r.error.is_some()).count();
    let total_items_saved = results.iter().map(|r| r.items_saved).sum();

    CrawlRunSummary {
        categories_run: results.len(),
        categories_failed,
        total_items_saved,
        duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        results,
    }
}

async fn run_category(
    pool: &PgPool,
    client: &FetchClient,
    config: &CrawlerConfig,
    stats: &StatsRegistry,
    category: Category,
    limit: usize,
) -> CategoryRunResult {
    stats.start_run(category).await;
    stats
        .log(LogLevel::Info, category, None, None, "crawl started")
        .await;

    let keywords = collect_trend_keywords(client, config, category, config.max_keywords).await;
    let keyword_texts: Vec<String> = keywords.iter().map(|k| k.keyword.clone()).collect();
    stats
        .update(category, |s| s.keywords_collected = keyword_texts.len())
        .await;

    let mut result = CategoryRunResult {
        category: category.as_str().to_owned(),
        pack_id: None,
        keywords: keyword_texts.clone(),
        items_crawled: 0,
        items_saved: 0,
        items_skipped: 0,
        prompts_linked: 0,
        error: None,
    };

    let mut items = scrape_keywords(client, config, stats, category, &keyword_texts, limit).await;
    result.items_crawled = items.len();
    result.items_skipped = items.skipped;
    stats
        .update(category, |s| {
            s.items_crawled = items.deduped.len();
            s.items_skipped = items.skipped;
        })
        .await;

    for item in &mut items.deduped {
        process_item(item, category, stats).await;
    }

    let week_key = current_week_key();
    let pack_summary = pack_summary(category, &keyword_texts);
    let pack = match trendpack_db::upsert_trend_pack(
        pool,
        &week_key,
        category,
        &format!("{category} weekly trends {week_key}"),
        &pack_summary,
        &keyword_texts,
    )
    .await
    {
        Ok(pack) => pack,
        Err(e) => {
            return fail_category(stats, category, result, format!("pack upsert failed: {e}"))
                .await;
        }
    };
    result.pack_id = Some(pack.id);

    let save = save_items(pool, pack.id, category, stats, items.deduped).await;
    result.items_saved = save.saved;
    result.items_skipped += save.skipped;
    stats
        .update(category, |s| {
            s.items_saved = save.saved;
            s.items_skipped += save.skipped;
        })
        .await;

    match link_prompts(pool, pack.id, category).await {
        Ok(linked) => result.prompts_linked = linked,
        Err(e) => {
            return fail_category(stats, category, result, format!("prompt linking failed: {e}"))
                .await;
        }
    }

    stats.finish_run(category).await;
    stats
        .log(
            LogLevel::Info,
            category,
            None,
            None,
            format!(
                "crawl completed: {} saved, {} skipped",
                result.items_saved, result.items_skipped
            ),
        )
        .await;
    result
}

async fn fail_category(
    stats: &StatsRegistry,
    category: Category,
    mut result: CategoryRunResult,
    message: String,
) -> CategoryRunResult {
    stats.update(category, |s| s.errors += 1).await;
    stats
        .log(LogLevel::Error, category, None, None, message.clone())
        .await;
    stats.finish_run(category).await;
    result.error = Some(message);
    result
}

struct CrawledItems {
    deduped: Vec<ScrapedItem>,
    skipped: usize,
}

impl CrawledItems {
    fn len(&self) -> usize {
        self.deduped.len()
    }
}

/// Crawls every keyword sequentially and merges the results, dropping URLs
/// already seen under an earlier keyword. Dropped duplicates count as
/// skipped.
async fn scrape_keywords(
    client: &FetchClient,
    config: &CrawlerConfig,
    stats: &StatsRegistry,
    category: Category,
    keywords: &[String],
    limit: usize,
) -> CrawledItems {
    let mut seen: HashSet<String> = HashSet::new();
    let mut deduped: Vec<ScrapedItem> = Vec::new();
    let mut skipped = 0usize;

    for (index, keyword) in keywords.iter().enumerate() {
        if index > 0 && config.inter_keyword_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(config.inter_keyword_delay_ms)).await;
        }

        let found = crawl_by_category(client, config, category, keyword, limit).await;
        if found.is_empty() {
            stats.update(category, |s| s.warnings += 1).await;
            stats
                .log(
                    LogLevel::Warn,
                    category,
                    Some(keyword.as_str()),
                    None,
                    "keyword yielded no items",
                )
                .await;
            continue;
        }

        for item in found {
            if seen.insert(item.url.clone()) {
                deduped.push(item);
            } else {
                skipped += 1;
            }
        }
    }

    CrawledItems { deduped, skipped }
}

/// Enriches the summary, attaches structured data plus the quality score,
/// and rewrites the summary from the category template when structured
/// fields are present.
async fn process_item(item: &mut ScrapedItem, category: Category, stats: &StatsRegistry) {
    item.summary = enrich_summary(item);

    let mut extracted = extract_structured_data(&item.fragment_html, category);
    if !extracted.is_empty() {
        item.extracted = Some(extracted.clone());
        item.summary = apply_category_summary_template(item, category);
    }

    let quality = calculate_quality_score(item);
    if quality < LOW_QUALITY_THRESHOLD {
        stats
            .log(
                LogLevel::Warn,
                category,
                None,
                None,
                format!("low quality item ({quality}): {}", item.url),
            )
            .await;
    }
    extracted.insert("quality_score".to_owned(), serde_json::json!(quality));
    item.extracted = Some(extracted);
}

fn pack_summary(category: Category, keywords: &[String]) -> String {
    if keywords.is_empty() {
        format!("Weekly {category} trend digest.")
    } else {
        format!("Weekly {category} trends around {}.", keywords.join(", "))
    }
}

struct SaveOutcome {
    saved: usize,
    skipped: usize,
}

/// Persists items after the validity and duplicate gates.
///
/// The happy path is one bulk insert; if that statement fails, each item is
/// retried individually so one bad row cannot discard the batch.
async fn save_items(
    pool: &PgPool,
    pack_id: i64,
    category: Category,
    stats: &StatsRegistry,
    items: Vec<ScrapedItem>,
) -> SaveOutcome {
    let existing = match trendpack_db::list_item_urls(pool, pack_id).await {
        Ok(urls) => urls
            .into_iter()
            .map(|url| dedup_key(pack_id, &url))
            .collect(),
        Err(e) => {
            stats
                .log(
                    LogLevel::Warn,
                    category,
                    None,
                    None,
                    format!("url preload failed, treating pack as empty: {e}"),
                )
                .await;
            HashSet::new()
        }
    };

    let mut skipped = 0usize;
    let mut rows: Vec<trendpack_db::NewScrapedItem> = Vec::new();
    for item in items {
        if !validate_item(&item) || is_duplicate(&item.url, pack_id, &existing) {
            skipped += 1;
            continue;
        }
        rows.push(trendpack_db::NewScrapedItem {
            source_domain: item.source_domain,
            source_type: item.source_type,
            url: item.url,
            title: item.title,
            summary: item.summary,
            tags: item.tags,
            extracted_data: item.extracted.map(serde_json::Value::Object),
        });
    }

    if rows.is_empty() {
        return SaveOutcome { saved: 0, skipped };
    }

    match trendpack_db::insert_items(pool, pack_id, &rows).await {
        Ok(()) => SaveOutcome {
            saved: rows.len(),
            skipped,
        },
        Err(e) => {
            stats
                .log(
                    LogLevel::Warn,
                    category,
                    None,
                    None,
                    format!("bulk insert failed, retrying per item: {e}"),
                )
                .await;

            let mut saved = 0usize;
            for row in &rows {
                match trendpack_db::insert_item(pool, pack_id, row).await {
                    Ok(()) => saved += 1,
                    Err(e) => {
                        skipped += 1;
                        stats
                            .log(
                                LogLevel::Warn,
                                category,
                                None,
                                None,
                                format!("item insert failed for {}: {e}", row.url),
                            )
                            .await;
                    }
                }
            }
            SaveOutcome { saved, skipped }
        }
    }
}

/// Links every eligible non-free template not yet linked to the pack, with
/// sort order continuing from the existing link count. A rerun links
/// nothing new.
async fn link_prompts(
    pool: &PgPool,
    pack_id: i64,
    category: Category,
) -> Result<usize, trendpack_db::DbError> {
    let eligible = trendpack_db::list_paid_templates(pool, category).await?;
    let linked: HashSet<i64> = trendpack_db::list_linked_prompt_ids(pool, pack_id)
        .await?
        .into_iter()
        .collect();

    let mut sort_order = i32::try_from(linked.len()).unwrap_or(i32::MAX);
    let mut added = 0usize;
    for template in eligible {
        if linked.contains(&template.id) {
            continue;
        }
        trendpack_db::insert_pack_prompt(pool, pack_id, template.id, sort_order).await?;
        sort_order = sort_order.saturating_add(1);
        added += 1;
    }

    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn item(url: &str, summary: &str) -> ScrapedItem {
        ScrapedItem {
            source_domain: "shop.example.com".to_owned(),
            source_type: "market".to_owned(),
            url: url.to_owned(),
            title: "Portable SSD 2TB external drive".to_owned(),
            summary: summary.to_owned(),
            tags: vec!["storage".to_owned()],
            extracted: None,
            fragment_html: String::new(),
        }
    }

    #[tokio::test]
    async fn process_item_attaches_quality_score() {
        let stats = StatsRegistry::new();
        let mut subject = item(
            "https://shop.example.com/p/1",
            "A perfectly adequate summary that is long enough to stay untouched by enrichment.",
        );

        process_item(&mut subject, Category::Product, &stats).await;

        let extracted = subject.extracted.expect("extracted map");
        let score = extracted
            .get("quality_score")
            .and_then(serde_json::Value::as_u64)
            .expect("quality_score");
        assert!(score >= 80, "valid full item scores high, got {score}");
    }

    #[tokio::test]
    async fn process_item_rewrites_summary_from_structured_fields() {
        let stats = StatsRegistry::new();
        let mut subject = item("https://shop.example.com/p/2", "short");
        subject.fragment_html = r#"<div class="product_item">
            <span class="price_num">189,000</span>
            <span class="rating">4.8</span>
        </div>"#
            .to_owned();

        process_item(&mut subject, Category::Product, &stats).await;

        assert!(
            subject.summary.contains("price: 189000"),
            "template summary carries the extracted price, got: {}",
            subject.summary
        );
        assert!(subject.summary.starts_with(&subject.title));
    }

    #[tokio::test]
    async fn process_item_without_fields_keeps_enriched_summary() {
        let stats = StatsRegistry::new();
        let mut subject = item("https://shop.example.com/p/3", "short");

        process_item(&mut subject, Category::Product, &stats).await;

        assert!(
            subject.summary.contains("short")
                && subject.summary.contains("Portable SSD 2TB external drive"),
            "enrichment folds the title in, got: {}",
            subject.summary
        );
        let extracted = subject.extracted.expect("extracted map");
        assert_eq!(extracted.len(), 1, "only quality_score is attached");
    }

    #[test]
    fn pack_summary_lists_keywords() {
        let text = pack_summary(
            Category::Stock,
            &["semiconductors".to_owned(), "dividends".to_owned()],
        );
        assert_eq!(text, "Weekly stock trends around semiconductors, dividends.");
        assert_eq!(
            pack_summary(Category::Stock, &[]),
            "Weekly stock trend digest."
        );
    }

    #[test]
    fn crawl_run_summary_serializes_aggregates() {
        let summary = CrawlRunSummary {
            results: vec![CategoryRunResult {
                category: "product".to_owned(),
                pack_id: Some(3),
                keywords: vec!["ssd".to_owned()],
                items_crawled: 4,
                items_saved: 4,
                items_skipped: 0,
                prompts_linked: 2,
                error: None,
            }],
            categories_run: 1,
            categories_failed: 0,
            total_items_saved: 4,
            duration_ms: 120,
        };
        let json = serde_json::to_value(&summary).expect("serialize");
        assert_eq!(json["total_items_saved"], 4);
        assert_eq!(json["results"][0]["pack_id"], 3);
        assert!(
            json["results"][0].get("error").is_none(),
            "error is omitted when absent"
        );
    }

    #[test]
    fn extracted_map_survives_json_conversion() {
        let mut map = Map::new();
        map.insert("quality_score".to_owned(), serde_json::json!(90));
        let value = serde_json::Value::Object(map);
        assert_eq!(value["quality_score"], 90);
    }
}
