//! Second-hand marketplace adapter.

use scraper::Html;

use super::{href_of, require_container, resolve_href, selector, text_of};
use crate::client::FetchClient;
use crate::error::ScrapeError;
use crate::types::ScrapedItem;

const CONTAINER: &str = "ul.goods-list";
const CARD: &str = "li.goods-item";

pub(super) async fn fetch_items(
    client: &FetchClient,
    base_url: &str,
    keyword: &str,
    limit: usize,
) -> Result<Vec<ScrapedItem>, ScrapeError> {
    let url = format!(
        "{}/search/products?q={}",
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
    require_container(&doc, CONTAINER, "marketplace search results")?;

    let card_sel = selector(CARD)?;
    let items = doc
        .select(&card_sel)
        .filter_map(|card| {
            let href = href_of(card, "a.goods-link")?;
            let url = resolve_href(base_url, &href)?;
            let title = text_of(card, ".goods-name")?;
            let region = text_of(card, ".goods-region").filter(|r| !r.is_empty());
            let summary = text_of(card, ".goods-desc").unwrap_or_else(|| {
                let price = text_of(card, ".goods-price").unwrap_or_default();
                match &region {
                    Some(region) => format!("{title} offered for {price} in {region}"),
                    None => format!("{title} offered for {price}"),
                }
            });
            let tags = region.map(|r| vec![r]).unwrap_or_default();

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

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
        <html><body>
        <ul class="goods-list">
          <li class="goods-item">
            <a class="goods-link" href="/goods/8817">listing</a>
            <span class="goods-name">Standing desk, motorized, barely used</span>
            <span class="goods-price">250,000원</span>
            <span class="goods-region">Mapo-gu</span>
          </li>
        </ul>
        </body></html>"#;

    #[test]
    fn parse_list_composes_summary_from_price_and_region() {
        let items = parse_list(FIXTURE, "https://market.example.com").expect("parse");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].url, "https://market.example.com/goods/8817");
        assert_eq!(
            items[0].summary,
            "Standing desk, motorized, barely used offered for 250,000원 in Mapo-gu"
        );
        assert_eq!(items[0].tags, vec!["Mapo-gu".to_owned()]);
        assert_eq!(items[0].source_type, "market");
    }
}
