//! Finance quote-search adapter.

use scraper::Html;

use super::{href_of, require_container, resolve_href, selector, text_of};
use crate::client::FetchClient;
use crate::error::ScrapeError;
use crate::types::ScrapedItem;

const CONTAINER: &str = "table.quote_list";
const CARD: &str = "tr.quote_row";

pub(super) async fn fetch_items(
    client: &FetchClient,
    base_url: &str,
    keyword: &str,
    limit: usize,
) -> Result<Vec<ScrapedItem>, ScrapeError> {
    let url = format!(
        "{}/search?query={}",
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
    require_container(&doc, CONTAINER, "finance quote search")?;

    let card_sel = selector(CARD)?;
    let items = doc
        .select(&card_sel)
        .filter_map(|row| {
            let href = href_of(row, "a.stock_name")?;
            let url = resolve_href(base_url, &href)?;
            let title = text_of(row, "a.stock_name")?;
            let price = text_of(row, ".current_price").unwrap_or_default();
            let rate = text_of(row, ".change_rate").unwrap_or_default();
            let volume = text_of(row, ".volume").unwrap_or_default();
            // Quote rows carry no prose; the summary is composed.
            let summary =
                format!("{title} trading at {price} ({rate}) on volume {volume}");
            let tags = text_of(row, ".market_label")
                .filter(|m| !m.is_empty())
                .map(|m| vec![m])
                .unwrap_or_default();

            Some(ScrapedItem {
                source_domain: ScrapedItem::domain_of(&url),
                source_type: "market".to_owned(),
                title,
                summary,
                tags,
                extracted: None,
                fragment_html: row.html(),
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
        <table class="quote_list">
          <tr class="quote_row">
            <td><a class="stock_name" href="/quotes/005930">Alpha Semiconductor</a></td>
            <td class="current_price">71,300</td>
            <td class="change_rate">-2.35%</td>
            <td class="volume">13,204,550</td>
            <td class="market_label">KOSPI</td>
          </tr>
        </table>
        </body></html>"#;

    #[test]
    fn parse_list_composes_quote_summaries() {
        let items = parse_list(FIXTURE, "https://finance.example.com").expect("parse");
        assert_eq!(items.len(), 1);
        assert_eq!(
            items[0].summary,
            "Alpha Semiconductor trading at 71,300 (-2.35%) on volume 13,204,550"
        );
        assert_eq!(items[0].tags, vec!["KOSPI".to_owned()]);
        assert_eq!(items[0].url, "https://finance.example.com/quotes/005930");
    }
}
