//! Shopping search adapter: product cards with price/rating/review markup.

use scraper::Html;

use super::{href_of, require_container, resolve_href, selector, text_of};
use crate::client::FetchClient;
use crate::error::ScrapeError;
use crate::types::ScrapedItem;

const CONTAINER: &str = "div.product_list";
const CARD: &str = "div.product_item";

pub(super) async fn fetch_items(
    client: &FetchClient,
    base_url: &str,
    keyword: &str,
    limit: usize,
) -> Result<Vec<ScrapedItem>, ScrapeError> {
    let url = format!(
        "{}/search/all?query={}",
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
    require_container(&doc, CONTAINER, "shopping search results")?;

    let card_sel = selector(CARD)?;
    let items = doc
        .select(&card_sel)
        .filter_map(|card| {
            let href = href_of(card, "a.product_link")?;
            let url = resolve_href(base_url, &href)?;
            let title = text_of(card, "a.product_link")?;
            let summary = text_of(card, ".product_desc").unwrap_or_else(|| {
                // Fallback keeps the item above the summary floor when the
                // card has no description text.
                match text_of(card, ".price_num") {
                    Some(price) => format!("{title} listed at {price}"),
                    None => title.clone(),
                }
            });
            let tags = card_tags(card);

            Some(ScrapedItem {
                source_domain: ScrapedItem::domain_of(&url),
                source_type: "market".to_owned(),
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

fn card_tags(card: scraper::ElementRef<'_>) -> Vec<String> {
    let Ok(sel) = scraper::Selector::parse(".product_tag") else {
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
        <div class="product_list">
          <div class="product_item">
            <a class="product_link" href="/catalog/ssd-2tb">Portable SSD 2TB external drive</a>
            <span class="price_num">189,000원</span>
            <span class="rating">4.8</span>
            <span class="review_count">1,204</span>
            <p class="product_desc">Pocket-size external drive with USB-C and hardware encryption.</p>
            <span class="product_tag">storage</span>
            <span class="product_tag">usb-c</span>
          </div>
          <div class="product_item">
            <a class="product_link" href="https://shop.other.com/p/42">Mini air purifier for desks</a>
            <span class="price_num">59,000원</span>
          </div>
        </div>
        </body></html>"#;

    #[test]
    fn parse_list_extracts_cards_with_tags() {
        let items = parse_list(FIXTURE, "https://shopping.example.com").expect("parse");
        assert_eq!(items.len(), 2);

        assert_eq!(items[0].url, "https://shopping.example.com/catalog/ssd-2tb");
        assert_eq!(items[0].tags, vec!["storage".to_owned(), "usb-c".to_owned()]);
        assert!(items[0].summary.starts_with("Pocket-size"));
        assert!(items[0].fragment_html.contains("price_num"));
    }

    #[test]
    fn descriptionless_card_composes_a_price_summary() {
        let items = parse_list(FIXTURE, "https://shopping.example.com").expect("parse");
        assert_eq!(
            items[1].summary,
            "Mini air purifier for desks listed at 59,000원"
        );
    }

    #[test]
    fn missing_container_is_a_parse_error() {
        let err = parse_list("<html><body></body></html>", "https://x.example.com").unwrap_err();
        assert!(matches!(err, ScrapeError::Parse { .. }));
    }
}
