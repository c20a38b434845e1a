//! Summary shaping: category templates, short-summary enrichment, and the
//! informational quality rubric.

use serde_json::Value;
use trendpack_core::{Category, ExtractorKind};

use crate::types::ScrapedItem;
use crate::validate::{
    is_valid_item_url, SUMMARY_MAX_CHARS, SUMMARY_MIN_CHARS, TITLE_MAX_CHARS, TITLE_MIN_CHARS,
};

/// Summaries shorter than this get extended from the title and tags.
pub const MIN_RICH_SUMMARY_CHARS: usize = 60;

/// Canonical field order per extractor kind, as rendered in summary lines.
fn field_order(kind: ExtractorKind) -> &'static [(&'static str, &'static str)] {
    match kind {
        ExtractorKind::Product => &[
            ("price", "price"),
            ("rating", "rating"),
            ("review_count", "reviews"),
        ],
        ExtractorKind::RealEstate => &[
            ("price", "price"),
            ("location", "location"),
            ("area", "area"),
            ("floor", "floor"),
        ],
        ExtractorKind::Stock => &[
            ("price", "price"),
            ("change_rate", "change"),
            ("volume", "volume"),
        ],
        ExtractorKind::Content => &[
            ("views", "views"),
            ("likes", "likes"),
            ("comments", "comments"),
        ],
    }
}

/// Composes the pipe-delimited human-readable line for an item: the title,
/// then `label: value` for each structured field present, in canonical order.
#[must_use]
pub fn apply_category_summary_template(item: &ScrapedItem, category: Category) -> String {
    let mut parts = vec![item.title.clone()];

    if let Some(extracted) = &item.extracted {
        for (key, label) in field_order(category.extractor()) {
            if let Some(value) = extracted.get(*key) {
                parts.push(format!("{label}: {}", render_value(value)));
            }
        }
    }

    parts.join(" | ")
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Extends a too-short summary with title and tag context so the stored text
/// stays informative. Adequate summaries pass through untouched; the result
/// never exceeds the validity ceiling.
#[must_use]
pub fn enrich_summary(item: &ScrapedItem) -> String {
    if item.summary.chars().count() >= MIN_RICH_SUMMARY_CHARS {
        return item.summary.clone();
    }

    let mut enriched = item.summary.trim().to_owned();
    if enriched.is_empty() {
        enriched = item.title.clone();
    } else if !enriched.contains(&item.title) {
        enriched = format!("{enriched} ({})", item.title);
    }
    if !item.tags.is_empty() {
        enriched = format!("{enriched} [{}]", item.tags.join(", "));
    }

    if enriched.chars().count() > SUMMARY_MAX_CHARS {
        enriched = enriched.chars().take(SUMMARY_MAX_CHARS).collect();
    }
    enriched
}

/// Weighted quality rubric, 0..=100. Informational: stored alongside the
/// item's extracted data and logged for low scorers, never used as a filter.
#[must_use]
pub fn calculate_quality_score(item: &ScrapedItem) -> u8 {
    let mut score = 0u8;

    let title_len = item.title.chars().count();
    if (TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&title_len) {
        score += 20;
    }
    let summary_len = item.summary.chars().count();
    if (SUMMARY_MIN_CHARS..=SUMMARY_MAX_CHARS).contains(&summary_len) {
        score += 30;
    }
    if is_valid_item_url(&item.url) {
        score += 20;
    }
    if !item.source_domain.is_empty() {
        score += 10;
    }
    if !item.tags.is_empty() {
        score += 10;
    }
    if item.extracted.as_ref().is_some_and(|m| !m.is_empty()) {
        score += 10;
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn base_item() -> ScrapedItem {
        ScrapedItem {
            source_domain: "shop.example.com".to_owned(),
            source_type: "market".to_owned(),
            url: "https://shop.example.com/p/1".to_owned(),
            title: "Noise cancelling earbuds".to_owned(),
            summary: "Compact earbuds with adaptive noise cancelling and wireless charging case."
                .to_owned(),
            tags: vec!["audio".to_owned()],
            extracted: None,
            fragment_html: String::new(),
        }
    }

    #[test]
    fn template_renders_fields_in_canonical_order() {
        let mut item = base_item();
        let mut extracted = Map::new();
        extracted.insert("review_count".to_owned(), Value::from(120));
        extracted.insert("price".to_owned(), Value::String("59000".to_owned()));
        item.extracted = Some(extracted);

        let line = apply_category_summary_template(&item, Category::Product);
        assert_eq!(
            line,
            "Noise cancelling earbuds | price: 59000 | reviews: 120",
            "price precedes reviews regardless of map order"
        );
    }

    #[test]
    fn template_without_fields_is_just_the_title() {
        let item = base_item();
        assert_eq!(
            apply_category_summary_template(&item, Category::Product),
            item.title
        );
    }

    #[test]
    fn adequate_summaries_pass_through_enrichment() {
        let item = base_item();
        assert_eq!(enrich_summary(&item), item.summary);
    }

    #[test]
    fn short_summaries_gain_title_and_tags() {
        let mut item = base_item();
        item.summary = "On sale now.".to_owned();
        let enriched = enrich_summary(&item);
        assert!(enriched.contains("On sale now."));
        assert!(enriched.contains("Noise cancelling earbuds"));
        assert!(enriched.contains("audio"));
        assert!(enriched.chars().count() <= SUMMARY_MAX_CHARS);
    }

    #[test]
    fn quality_score_full_marks() {
        let mut item = base_item();
        let mut extracted = Map::new();
        extracted.insert("price".to_owned(), Value::String("1".to_owned()));
        item.extracted = Some(extracted);
        assert_eq!(calculate_quality_score(&item), 100);
    }

    #[test]
    fn quality_score_drops_per_missing_facet() {
        let mut item = base_item();
        item.tags.clear();
        item.extracted = None;
        assert_eq!(calculate_quality_score(&item), 80);

        item.url = "not-a-url".to_owned();
        assert_eq!(calculate_quality_score(&item), 60);

        item.title = "hey".to_owned();
        assert_eq!(calculate_quality_score(&item), 40);
    }
}
