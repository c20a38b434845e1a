//! Structured-field extraction from raw item markup.
//!
//! Each category has a small set of known selectors; every field is optional
//! and simply omitted when the markup does not carry it. Numeric text is
//! tolerant of thousands separators, currency symbols, and sign/percent
//! decorations.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use scraper::{Html, Selector};
use serde_json::{Map, Value};
use trendpack_core::{Category, ExtractorKind};

static NON_NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9.\-]").expect("valid numeric-strip regex"));

/// Pulls whatever structured fields the category's extractor knows about out
/// of an item's raw card markup.
#[must_use]
pub fn extract_structured_data(html: &str, category: Category) -> Map<String, Value> {
    let doc = Html::parse_fragment(html);
    let mut fields = Map::new();

    match category.extractor() {
        ExtractorKind::Product => {
            put_decimal(&mut fields, "price", &doc, &[".price_num", ".goods-price"]);
            put_f64(&mut fields, "rating", &doc, &[".rating"]);
            put_i64(&mut fields, "review_count", &doc, &[".review_count"]);
        }
        ExtractorKind::RealEstate => {
            put_decimal(&mut fields, "price", &doc, &[".price"]);
            put_text(&mut fields, "location", &doc, &[".location"]);
            put_text(&mut fields, "area", &doc, &[".area"]);
            put_text(&mut fields, "floor", &doc, &[".floor"]);
        }
        ExtractorKind::Stock => {
            put_decimal(&mut fields, "price", &doc, &[".current_price"]);
            put_f64(&mut fields, "change_rate", &doc, &[".change_rate"]);
            put_i64(&mut fields, "volume", &doc, &[".volume"]);
        }
        ExtractorKind::Content => {
            put_i64(&mut fields, "views", &doc, &[".view_count"]);
            put_i64(&mut fields, "likes", &doc, &[".like_count"]);
            put_i64(&mut fields, "comments", &doc, &[".comment_count"]);
        }
    }

    fields
}

/// First non-empty text content matched by any of `selectors`, in order.
fn first_text(doc: &Html, selectors: &[&str]) -> Option<String> {
    for raw in selectors {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        if let Some(element) = doc.select(&selector).next() {
            let text: String = element.text().collect::<String>().trim().to_owned();
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

fn put_text(fields: &mut Map<String, Value>, key: &str, doc: &Html, selectors: &[&str]) {
    if let Some(text) = first_text(doc, selectors) {
        fields.insert(key.to_owned(), Value::String(text));
    }
}

fn put_decimal(fields: &mut Map<String, Value>, key: &str, doc: &Html, selectors: &[&str]) {
    if let Some(value) = first_text(doc, selectors).and_then(|t| parse_decimal(&t)) {
        // Serialized as a string so JSONB consumers never see float drift.
        fields.insert(key.to_owned(), Value::String(value.to_string()));
    }
}

fn put_i64(fields: &mut Map<String, Value>, key: &str, doc: &Html, selectors: &[&str]) {
    if let Some(value) = first_text(doc, selectors).and_then(|t| parse_i64(&t)) {
        fields.insert(key.to_owned(), Value::from(value));
    }
}

fn put_f64(fields: &mut Map<String, Value>, key: &str, doc: &Html, selectors: &[&str]) {
    if let Some(value) = first_text(doc, selectors).and_then(|t| parse_f64(&t)) {
        if let Some(number) = serde_json::Number::from_f64(value) {
            fields.insert(key.to_owned(), Value::Number(number));
        }
    }
}

/// Strips currency symbols, separators, and units before numeric parsing.
fn clean_number(raw: &str) -> String {
    NON_NUMERIC.replace_all(raw, "").into_owned()
}

pub(crate) fn parse_decimal(raw: &str) -> Option<Decimal> {
    let cleaned = clean_number(raw);
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

pub(crate) fn parse_i64(raw: &str) -> Option<i64> {
    let cleaned = clean_number(raw);
    // Drop any fractional tail; counts are integers.
    let integral = cleaned.split('.').next().unwrap_or("");
    integral.parse::<i64>().ok()
}

pub(crate) fn parse_f64(raw: &str) -> Option<f64> {
    let cleaned = clean_number(raw);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}
