//! News search adapter.
//!
//! Beyond the result list, this adapter re-fetches a handful of individual
//! article pages to enrich summaries and tags from their meta elements.
//! Per-article failures are non-fatal; the item keeps its list-page summary.

use scraper::Html;

use super::{href_of, require_container, resolve_href, selector, text_of};
use crate::client::FetchClient;
use crate::error::ScrapeError;
use crate::types::ScrapedItem;

const CONTAINER: &str = "ul.list_news";
const CARD: &str = "li.news_item";

/// Cap on individual article pages fetched for enrichment per call.
const MAX_ARTICLE_ENRICHMENTS: usize = 5;

pub(super) async fn fetch_items(
    client: &FetchClient,
    base_url: &str,
    keyword: &str,
    limit: usize,
) -> Result<Vec<ScrapedItem>, ScrapeError> {
    let url = format!(
        "{}/search/news?query={}",
        base_url.trim_end_matches('/'),
        super::encode_keyword(keyword)
    );
    let body = client.fetch_html(&url).await?;

    let mut items = parse_list(&body, base_url)?;
    items.truncate(limit);
    enrich_from_articles(client, &mut items).await;
    Ok(items)
}

fn parse_list(body: &str, base_url: &str) -> Result<Vec<ScrapedItem>, ScrapeError> {
    let doc = Html::parse_document(body);
    require_container(&doc, CONTAINER, "news search results")?;

    let card_sel = selector(CARD)?;
    let items = doc
        .select(&card_sel)
        .filter_map(|card| {
            let href = href_of(card, "a.news_tit")?;
            let url = resolve_href(base_url, &href)?;
            let title = text_of(card, "a.news_tit")?;
            let summary = text_of(card, ".news_dsc").unwrap_or_default();
            let tags = text_of(card, ".press")
                .filter(|p| !p.is_empty())
                .map(|p| vec![p])
                .unwrap_or_default();

            Some(ScrapedItem {
                source_domain: ScrapedItem::domain_of(&url),
                source_type: "news".to_owned(),
                title,
                summary,
                tags,
                extracted: None,
                fragment_html: card.html(),
                url,
            })
        })
        .collect();

    Ok(items)
}

/// Best-effort enrichment from up to [`MAX_ARTICLE_ENRICHMENTS`] article
/// pages: a longer meta description replaces the list-page summary, and meta
/// keywords extend the tags.
async fn enrich_from_articles(client: &FetchClient, items: &mut [ScrapedItem]) {
    for item in items.iter_mut().take(MAX_ARTICLE_ENRICHMENTS) {
        match client.fetch_html(&item.url).await {
            Ok(body) => apply_article_meta(item, &body),
            Err(e) => {
                tracing::debug!(url = %item.url, error = %e, "article enrichment fetch failed");
            }
        }
    }
}

fn apply_article_meta(item: &mut ScrapedItem, body: &str) {
    let doc = Html::parse_document(body);

    if let Ok(sel) = scraper::Selector::parse(r#"meta[name="description"]"#) {
        if let Some(description) = doc
            .select(&sel)
            .next()
            .and_then(|e| e.value().attr("content"))
        {
            let description = description.trim();
            if description.chars().count() > item.summary.chars().count() {
                item.summary = description.to_owned();
            }
        }
    }

    if let Ok(sel) = scraper::Selector::parse(r#"meta[name="keywords"]"#) {
        if let Some(keywords) = doc
            .select(&sel)
            .next()
            .and_then(|e| e.value().attr("content"))
        {
            for keyword in keywords.split(',') {
                let keyword = keyword.trim();
                if !keyword.is_empty() && !item.tags.iter().any(|t| t == keyword) {
                    item.tags.push(keyword.to_owned());
                }
            }
        }
    }
}
