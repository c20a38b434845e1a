//! Source adapters.
//!
//! Each source is a narrow adapter — build a search URL, fetch, map matched
//! elements into [`ScrapedItem`] — so upstream markup breakage stays
//! localized and testable against recorded HTML fixtures. One source's
//! failure never aborts the category: the orchestrator logs it and moves on.

mod blog;
mod finance;
mod listings;
mod marketplace;
mod news;
mod shopping;

use std::collections::HashSet;
use std::time::Duration;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use scraper::{ElementRef, Html, Selector};
use trendpack_core::{Category, CrawlerConfig, SourceKind};

use crate::client::FetchClient;
use crate::error::ScrapeError;
use crate::types::ScrapedItem;

/// Crawls every configured source for the category, in order, deduplicating
/// by URL across sources (first source wins). A fixed delay separates source
/// fetches; a source error is logged as a warning and the loop continues.
/// The result is truncated to `limit`.
pub async fn crawl_by_category(
    client: &FetchClient,
    config: &CrawlerConfig,
    category: Category,
    keyword: &str,
    limit: usize,
) -> Vec<ScrapedItem> {
    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut items: Vec<ScrapedItem> = Vec::new();

    for (index, kind) in category.item_sources().iter().enumerate() {
        if index > 0 && config.inter_source_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(config.inter_source_delay_ms)).await;
        }

        match fetch_from_source(client, config, *kind, keyword, limit).await {
            Ok(found) => {
                let mut added = 0usize;
                for item in found {
                    if seen_urls.insert(item.url.clone()) {
                        items.push(item);
                        added += 1;
                    }
                }
                tracing::debug!(
                    category = %category,
                    keyword,
                    source = kind.as_str(),
                    added,
                    "source crawl finished"
                );
            }
            Err(e) => {
                tracing::warn!(
                    category = %category,
                    keyword,
                    source = kind.as_str(),
                    error = %e,
                    "source crawl failed; continuing with remaining sources"
                );
            }
        }
    }

    items.truncate(limit);
    items
}

async fn fetch_from_source(
    client: &FetchClient,
    config: &CrawlerConfig,
    kind: SourceKind,
    keyword: &str,
    limit: usize,
) -> Result<Vec<ScrapedItem>, ScrapeError> {
    match kind {
        SourceKind::News => {
            news::fetch_items(client, &config.news_base_url, keyword, limit).await
        }
        SourceKind::Shopping => {
            shopping::fetch_items(client, &config.shopping_base_url, keyword, limit).await
        }
        SourceKind::Marketplace => {
            marketplace::fetch_items(client, &config.marketplace_base_url, keyword, limit).await
        }
        SourceKind::Listings => {
            listings::fetch_items(client, &config.listings_base_url, keyword, limit).await
        }
        SourceKind::Finance => {
            finance::fetch_items(client, &config.finance_base_url, keyword, limit).await
        }
        SourceKind::Blog => {
            blog::fetch_items(client, &config.blog_base_url, keyword, limit).await
        }
    }
}

// ---------------------------------------------------------------------------
// Shared parsing helpers
// ---------------------------------------------------------------------------

pub(crate) fn encode_keyword(keyword: &str) -> String {
    utf8_percent_encode(keyword, NON_ALPHANUMERIC).to_string()
}

/// Parses a selector known at compile time. Invalid literals surface as a
/// structure error instead of a panic.
pub(crate) fn selector(raw: &'static str) -> Result<Selector, ScrapeError> {
    Selector::parse(raw).map_err(|e| ScrapeError::Parse {
        context: raw.to_owned(),
        reason: e.to_string(),
    })
}

/// Requires the page to carry the adapter's list container; a missing
/// container means the upstream markup changed shape.
pub(crate) fn require_container(
    doc: &Html,
    container: &'static str,
    context: &str,
) -> Result<(), ScrapeError> {
    let sel = selector(container)?;
    if doc.select(&sel).next().is_none() {
        return Err(ScrapeError::Parse {
            context: context.to_owned(),
            reason: format!("expected container {container} not found"),
        });
    }
    Ok(())
}

pub(crate) fn text_of(element: ElementRef<'_>, raw: &'static str) -> Option<String> {
    let sel = Selector::parse(raw).ok()?;
    element.select(&sel).next().map(|e| {
        e.text().collect::<String>().trim().to_owned()
    })
}

pub(crate) fn href_of(element: ElementRef<'_>, raw: &'static str) -> Option<String> {
    let sel = Selector::parse(raw).ok()?;
    element
        .select(&sel)
        .next()
        .and_then(|e| e.value().attr("href"))
        .map(str::to_owned)
}

/// Resolves possibly-relative hrefs against the source's base URL.
pub(crate) fn resolve_href(base_url: &str, href: &str) -> Option<String> {
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_owned());
    }
    url::Url::parse(base_url)
        .ok()?
        .join(href)
        .ok()
        .map(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_keyword_escapes_non_alphanumerics() {
        assert_eq!(encode_keyword("air fryer"), "air%20fryer");
    }

    #[test]
    fn resolve_href_passes_absolute_through() {
        assert_eq!(
            resolve_href("https://base.example.com", "https://other.example.com/x"),
            Some("https://other.example.com/x".to_owned())
        );
    }

    #[test]
    fn resolve_href_joins_relative_paths() {
        assert_eq!(
            resolve_href("https://base.example.com", "/articles/9"),
            Some("https://base.example.com/articles/9".to_owned())
        );
    }

    #[test]
    fn require_container_flags_shape_changes() {
        let doc = Html::parse_document("<html><body><p>changed</p></body></html>");
        let err = require_container(&doc, "ul.list_news", "news search").unwrap_err();
        assert!(matches!(err, ScrapeError::Parse { .. }));
    }
}
