//! Item validity and duplicate gates. Pure functions, no I/O.

use std::collections::HashSet;

use crate::types::ScrapedItem;

pub const TITLE_MIN_CHARS: usize = 5;
pub const TITLE_MAX_CHARS: usize = 200;
pub const SUMMARY_MIN_CHARS: usize = 10;
pub const SUMMARY_MAX_CHARS: usize = 1000;

/// Accepts an item iff the title is 5–200 chars, the summary 10–1000 chars,
/// the URL parses as http(s) with a host, and the source domain is non-empty.
///
/// Lengths are measured in characters, not bytes — titles are frequently
/// non-ASCII.
#[must_use]
pub fn validate_item(item: &ScrapedItem) -> bool {
    let title_len = item.title.chars().count();
    let summary_len = item.summary.chars().count();

    (TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&title_len)
        && (SUMMARY_MIN_CHARS..=SUMMARY_MAX_CHARS).contains(&summary_len)
        && is_valid_item_url(&item.url)
        && !item.source_domain.is_empty()
}

/// A well-formed absolute http(s) URL with a host.
#[must_use]
pub fn is_valid_item_url(raw: &str) -> bool {
    match url::Url::parse(raw) {
        Ok(parsed) => {
            matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some()
        }
        Err(_) => false,
    }
}

/// Membership key for the per-pack duplicate set.
#[must_use]
pub fn dedup_key(pack_id: i64, url: &str) -> String {
    format!("{pack_id}:{url}")
}

/// True when this `(pack_id, url)` pair has already been persisted.
#[must_use]
pub fn is_duplicate(url: &str, pack_id: i64, existing: &HashSet<String>) -> bool {
    existing.contains(&dedup_key(pack_id, url))
}
