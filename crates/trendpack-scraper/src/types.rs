//! Pre-persistence item shape shared by all source adapters.

use serde_json::{Map, Value};

/// One scraped item, in the uniform shape every source adapter maps into.
///
/// `fragment_html` carries the raw card markup the item was extracted from so
/// the data processor can pull structured fields out of it later; it is never
/// persisted.
#[derive(Debug, Clone)]
pub struct ScrapedItem {
    pub source_domain: String,
    /// One of `news`, `blog`, `market`, `community`, `listing`.
    pub source_type: String,
    pub url: String,
    pub title: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub extracted: Option<Map<String, Value>>,
    pub fragment_html: String,
}

impl ScrapedItem {
    /// Host portion of the item URL, or an empty string when the URL does not
    /// parse. Validation rejects empty domains downstream.
    #[must_use]
    pub fn domain_of(url: &str) -> String {
        url::Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(ToOwned::to_owned))
            .unwrap_or_default()
    }
}
