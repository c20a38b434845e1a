//! Real-estate listings adapter.

use scraper::Html;

use super::{href_of, require_container, resolve_href, selector, text_of};
use crate::client::FetchClient;
use crate::error::ScrapeError;
use crate::types::ScrapedItem;

const CONTAINER: &str = "ul.listing_list";
const CARD: &str = "li.listing_item";

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
    require_container(&doc, CONTAINER, "listings search results")?;

    let card_sel = selector(CARD)?;
    let items = doc
        .select(&card_sel)
        .filter_map(|card| {
            let href = href_of(card, "a.listing_link")?;
            let url = resolve_href(base_url, &href)?;
            let title = text_of(card, ".listing_title")?;
            let location = text_of(card, ".location").filter(|l| !l.is_empty());
            let summary = text_of(card, ".listing_desc").unwrap_or_else(|| {
                let price = text_of(card, ".price").unwrap_or_default();
                match &location {
                    Some(location) => format!("{title} in {location}, asking {price}"),
                    None => format!("{title}, asking {price}"),
                }
            });
            let tags = location.map(|l| vec![l]).unwrap_or_default();

            Some(ScrapedItem {
                source_domain: ScrapedItem::domain_of(&url),
                source_type: "listing".to_owned(),
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

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
        <html><body>
        <ul class="listing_list">
          <li class="listing_item">
            <a class="listing_link" href="/listings/301">view</a>
            <span class="listing_title">Renovated 3-room apartment near the station</span>
            <span class="price">₩450,000,000</span>
            <span class="location">Mapo-gu, Seoul</span>
            <span class="area">84㎡</span>
            <span class="floor">12F</span>
          </li>
        </ul>
        </body></html>"#;

    #[test]
    fn parse_list_maps_listing_cards() {
        let items = parse_list(FIXTURE, "https://land.example.com").expect("parse");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].source_type, "listing");
        assert_eq!(
            items[0].summary,
            "Renovated 3-room apartment near the station in Mapo-gu, Seoul, asking ₩450,000,000"
        );
        assert!(items[0].fragment_html.contains("84㎡"));
    }
}
