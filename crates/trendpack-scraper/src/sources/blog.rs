//! Blog search adapter.

use scraper::Html;

use super::{href_of, require_container, resolve_href, selector, text_of};
use crate::client::FetchClient;
use crate::error::ScrapeError;
use crate::types::ScrapedItem;

const CONTAINER: &str = "ul.blog_list";
const CARD: &str = "li.blog_post";

pub(super) async fn fetch_items(
    client: &FetchClient,
    base_url: &str,
    keyword: &str,
    limit: usize,
) -> Result<Vec<ScrapedItem>, ScrapeError> {
    let url = format!(
        "{}/search?keyword={}",
        base_url.trim_end_matches('/'),
        super::encode_keyword(keyword)
    );
    let body = client.fetch_html(&url).await?;
    let mut items = parse_list(&body, base_url)?;
    items.truncate(limit);
    Ok(items)
}

fn parse_list(body: &str, base_url: &str) -> Result<Vec<ScrapedItem>, ScrapeError> {
    let doc = Html::parse_document(body);
    require_container(&doc, CONTAINER, "blog search results")?;

    let card_sel = selector(CARD)?;
    let items = doc
        .select(&card_sel)
        .filter_map(|card| {
            let href = href_of(card, "a.post_title")?;
            let url = resolve_href(base_url, &href)?;
            let title = text_of(card, "a.post_title")?;
            let summary = text_of(card, ".post_excerpt").unwrap_or_default();
            let tags = post_tags(card);

            Some(ScrapedItem {
                source_domain: ScrapedItem::domain_of(&url),
                source_type: "blog".to_owned(),
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

fn post_tags(card: scraper::ElementRef<'_>) -> Vec<String> {
    let Ok(sel) = scraper::Selector::parse(".post_tag") else {
        return Vec::new();
    };
    card.select(&sel)
        .map(|e| e.text().collect::<String>().trim().to_owned())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
        <html><body>
        <ul class="blog_list">
          <li class="blog_post">
            <a class="post_title" href="https://blog.writer.com/posts/77">A week of zero sugar drinks, honestly reviewed</a>
            <p class="post_excerpt">Seven days, eleven drinks, and a surprising favorite at the end.</p>
            <span class="post_tag">zero-sugar</span>
            <span class="post_tag">review</span>
            <span class="view_count">12,034</span>
          </li>
        </ul>
        </body></html>"#;

    #[test]
    fn parse_list_maps_posts_with_tags() {
        let items = parse_list(FIXTURE, "https://blog-search.example.com").expect("parse");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].source_type, "blog");
        assert_eq!(items[0].source_domain, "blog.writer.com");
        assert_eq!(items[0].tags, vec!["zero-sugar".to_owned(), "review".to_owned()]);
        assert!(items[0].fragment_html.contains("view_count"));
    }
}
