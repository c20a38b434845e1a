//! Trending-keyword collection.
//!
//! Keywords are merged across three tiers of sources into a map keyed by
//! lower-cased text, with tier-dependent score weighting, then capped and
//! backfilled from the category's static fallback list. Every fetch failure
//! degrades to zero results from that source; the collector itself never
//! fails.

use std::collections::HashMap;

use scraper::{Html, Selector};
use trendpack_core::{Category, CrawlerConfig, SourceKind};

use crate::client::FetchClient;
use crate::error::ScrapeError;

/// Weight for the shared realtime-trends source.
pub const BASE_WEIGHT: f64 = 1.0;
/// Weight applied when merging category-specific source keywords.
pub const PRIMARY_SOURCE_WEIGHT: f64 = 1.5;
/// Weight applied when merging the shared news-trending keywords.
pub const NEWS_SOURCE_WEIGHT: f64 = 0.5;
/// Results below this floor are backfilled from the static fallback list.
pub const MIN_USABLE_KEYWORDS: usize = 5;

/// Score of the top-ranked realtime entry; ranks below score one less each,
/// bottoming out at 1.
const TOP_RANK_SCORE: f64 = 20.0;

/// A trending search term scoped to one collection cycle. Never persisted;
/// only the final keyword texts survive into the pack's denormalized list.
#[derive(Debug, Clone)]
pub struct TrendKeyword {
    pub keyword: String,
    pub score: f64,
    pub category: Category,
}

/// Collects and ranks trending keywords for a category, capped at `max`.
///
/// The backfill floor applies after capping: even a small `max` yields at
/// least [`MIN_USABLE_KEYWORDS`] entries when the fallback list allows,
/// matching the historical behavior of the pipeline.
pub async fn collect_trend_keywords(
    client: &FetchClient,
    config: &CrawlerConfig,
    category: Category,
    max: usize,
) -> Vec<TrendKeyword> {
    let mut merged: HashMap<String, TrendKeyword> = HashMap::new();

    // Tier 1: shared realtime trends, tagged with the requested category.
    match fetch_ranked_keywords(
        client,
        &format!("{}/trends/realtime", config.realtime_trends_url.trim_end_matches('/')),
        "ol.ranking-list li.ranking-item span.keyword",
    )
    .await
    {
        Ok(found) => merge_keywords(&mut merged, found, BASE_WEIGHT, category),
        Err(e) => {
            tracing::warn!(category = %category, source = "realtime", error = %e, "keyword source failed");
        }
    }

    // Tier 2: category-specific sources, weighted up.
    for kind in category.keyword_sources() {
        let (url, selector) = category_keyword_source(config, *kind);
        match fetch_ranked_keywords(client, &url, selector).await {
            Ok(found) => merge_keywords(&mut merged, found, PRIMARY_SOURCE_WEIGHT, category),
            Err(e) => {
                tracing::warn!(
                    category = %category,
                    source = kind.as_str(),
                    error = %e,
                    "keyword source failed"
                );
            }
        }
    }

    // Tier 3: shared news trending, weighted down.
    match fetch_ranked_keywords(
        client,
        &format!("{}/trend/keywords", config.news_trending_url.trim_end_matches('/')),
        "ul.trend-news li a.tit",
    )
    .await
    {
        Ok(found) => merge_keywords(&mut merged, found, NEWS_SOURCE_WEIGHT, category),
        Err(e) => {
            tracing::warn!(category = %category, source = "news_trending", error = %e, "keyword source failed");
        }
    }

    let mut keywords: Vec<TrendKeyword> = merged.into_values().collect();
    keywords.sort_by(|a, b| b.score.total_cmp(&a.score));
    keywords.truncate(max);

    backfill_from_fallback(&mut keywords, category);

    keywords
        .into_iter()
        .filter_map(|mut kw| {
            kw.keyword = sanitize_keyword(&kw.keyword);
            if kw.keyword.is_empty() {
                None
            } else {
                Some(kw)
            }
        })
        .collect()
}

fn category_keyword_source(config: &CrawlerConfig, kind: SourceKind) -> (String, &'static str) {
    let join = |base: &str, path: &str| format!("{}{path}", base.trim_end_matches('/'));
    match kind {
        SourceKind::Shopping => (
            join(&config.shopping_base_url, "/best/keywords"),
            "ul.best-keyword li a",
        ),
        SourceKind::Marketplace => (
            join(&config.marketplace_base_url, "/hot-keywords"),
            ".hot-keyword-list .keyword",
        ),
        SourceKind::Listings => (
            join(&config.listings_base_url, "/trend/search"),
            "ul.search-rank li .term",
        ),
        SourceKind::Finance => (
            join(&config.finance_base_url, "/popular/searched"),
            "ul.popular_list li a",
        ),
        // News and blog have no dedicated keyword pages; the shared tiers
        // cover them.
        SourceKind::News | SourceKind::Blog => (
            join(&config.news_trending_url, "/trend/keywords"),
            "ul.trend-news li a.tit",
        ),
    }
}

/// Fetches a page and extracts keyword texts in rank order, scored by
/// inverse rank (top entry [`TOP_RANK_SCORE`], floor 1).
async fn fetch_ranked_keywords(
    client: &FetchClient,
    url: &str,
    selector: &str,
) -> Result<Vec<(String, f64)>, ScrapeError> {
    let body = client.fetch_html(url).await?;
    let doc = Html::parse_document(&body);
    let sel = Selector::parse(selector).map_err(|e| ScrapeError::Parse {
        context: selector.to_owned(),
        reason: e.to_string(),
    })?;

    let found: Vec<(String, f64)> = doc
        .select(&sel)
        .map(|e| e.text().collect::<String>().trim().to_owned())
        .filter(|text| !text.is_empty())
        .enumerate()
        .map(|(rank, text)| {
            #[allow(clippy::cast_precision_loss)]
            let score = (TOP_RANK_SCORE - rank as f64).max(1.0);
            (text, score)
        })
        .collect();

    if found.is_empty() {
        return Err(ScrapeError::Parse {
            context: url.to_owned(),
            reason: format!("no keywords matched selector {selector}"),
        });
    }

    Ok(found)
}

/// Merges ranked keywords into the running map, keyed by lower-cased text.
/// An existing entry gains `score * weight`; a new entry starts there.
fn merge_keywords(
    merged: &mut HashMap<String, TrendKeyword>,
    found: Vec<(String, f64)>,
    weight: f64,
    category: Category,
) {
    for (text, score) in found {
        let key = text.to_lowercase();
        let weighted = score * weight;
        merged
            .entry(key)
            .and_modify(|existing| existing.score += weighted)
            .or_insert(TrendKeyword {
                keyword: text,
                score: weighted,
                category,
            });
    }
}

/// Appends static fallback keywords (deduplicated case-insensitively) until
/// the floor is met or the list runs out.
fn backfill_from_fallback(keywords: &mut Vec<TrendKeyword>, category: Category) {
    if keywords.len() >= MIN_USABLE_KEYWORDS {
        return;
    }
    for fallback in category.fallback_keywords() {
        if keywords.len() >= MIN_USABLE_KEYWORDS {
            break;
        }
        let lower = fallback.to_lowercase();
        if keywords.iter().any(|k| k.keyword.to_lowercase() == lower) {
            continue;
        }
        keywords.push(TrendKeyword {
            keyword: (*fallback).to_owned(),
            score: 0.0,
            category,
        });
    }
}

/// Strips everything but letters, digits, and single internal spaces.
/// `char::is_alphanumeric` keeps non-Latin scripts intact.
fn sanitize_keyword(raw: &str) -> String {
    let filtered: String = raw
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    filtered.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kw(text: &str, score: f64) -> (String, f64) {
        (text.to_owned(), score)
    }

    #[test]
    fn merge_sums_weighted_scores_for_existing_keys() {
        let mut merged = HashMap::new();
        merge_keywords(&mut merged, vec![kw("Robot Vacuum", 20.0)], BASE_WEIGHT, Category::Product);
        merge_keywords(
            &mut merged,
            vec![kw("robot vacuum", 10.0)],
            PRIMARY_SOURCE_WEIGHT,
            Category::Product,
        );

        let entry = merged.get("robot vacuum").expect("merged entry");
        assert!((entry.score - 35.0).abs() < 1e-9, "20*1.0 + 10*1.5");
        assert_eq!(entry.keyword, "Robot Vacuum", "first-seen casing is kept");
    }

    #[test]
    fn merge_weights_new_entries_too() {
        let mut merged = HashMap::new();
        merge_keywords(&mut merged, vec![kw("earbuds", 10.0)], NEWS_SOURCE_WEIGHT, Category::Product);
        let entry = merged.get("earbuds").expect("entry");
        assert!((entry.score - 5.0).abs() < 1e-9);
    }

    #[test]
    fn backfill_tops_up_to_the_floor_without_duplicates() {
        let mut keywords = vec![TrendKeyword {
            keyword: "Wireless Earbuds".to_owned(),
            score: 12.0,
            category: Category::Product,
        }];
        backfill_from_fallback(&mut keywords, Category::Product);

        assert_eq!(keywords.len(), MIN_USABLE_KEYWORDS);
        let lowered: Vec<String> = keywords.iter().map(|k| k.keyword.to_lowercase()).collect();
        assert_eq!(
            lowered.iter().filter(|k| k.as_str() == "wireless earbuds").count(),
            1,
            "fallback must not re-add an existing keyword"
        );
    }

    #[test]
    fn sanitize_keeps_local_scripts_and_collapses_whitespace() {
        assert_eq!(sanitize_keyword("  로봇*청소기!! "), "로봇 청소기");
        assert_eq!(sanitize_keyword("air-fryer 2.0"), "air fryer 2 0");
        assert_eq!(sanitize_keyword("@#$%"), "");
    }
}
