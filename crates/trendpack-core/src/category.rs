//! Content category vocabulary shared by the scraper, pipeline, and API.

use serde::{Deserialize, Serialize};

/// One of the six crawlable content categories.
///
/// The set is a closed whitelist: request bodies naming anything else are
/// filtered, not rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Product,
    RealEstate,
    Stock,
    Content,
    Food,
    Travel,
}

/// A scrapeable item source. Each category is wired to an ordered subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    News,
    Shopping,
    Marketplace,
    Listings,
    Finance,
    Blog,
}

/// Which structured-data extractor applies to a category's items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractorKind {
    Product,
    RealEstate,
    Stock,
    Content,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Product,
        Category::RealEstate,
        Category::Stock,
        Category::Content,
        Category::Food,
        Category::Travel,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Product => "product",
            Category::RealEstate => "real-estate",
            Category::Stock => "stock",
            Category::Content => "content",
            Category::Food => "food",
            Category::Travel => "travel",
        }
    }

    /// Parses a category name; returns `None` for anything off the whitelist.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "product" => Some(Category::Product),
            "real-estate" => Some(Category::RealEstate),
            "stock" => Some(Category::Stock),
            "content" => Some(Category::Content),
            "food" => Some(Category::Food),
            "travel" => Some(Category::Travel),
            _ => None,
        }
    }

    /// Ordered item sources scraped for this category.
    #[must_use]
    pub fn item_sources(self) -> &'static [SourceKind] {
        match self {
            Category::Product => &[SourceKind::Shopping, SourceKind::Marketplace, SourceKind::News],
            Category::RealEstate => &[SourceKind::Listings, SourceKind::News],
            Category::Stock => &[SourceKind::Finance, SourceKind::News],
            Category::Content | Category::Travel => &[SourceKind::Blog, SourceKind::News],
            Category::Food => &[SourceKind::Blog, SourceKind::Shopping, SourceKind::News],
        }
    }

    /// Category-specific keyword sources, beyond the shared realtime and
    /// news-trending feeds every category consumes.
    #[must_use]
    pub fn keyword_sources(self) -> &'static [SourceKind] {
        match self {
            Category::Product => &[SourceKind::Shopping, SourceKind::Marketplace],
            Category::RealEstate => &[SourceKind::Listings],
            Category::Stock => &[SourceKind::Finance],
            Category::Content | Category::Food | Category::Travel => &[],
        }
    }

    #[must_use]
    pub fn extractor(self) -> ExtractorKind {
        match self {
            Category::Product => ExtractorKind::Product,
            Category::RealEstate => ExtractorKind::RealEstate,
            Category::Stock => ExtractorKind::Stock,
            Category::Content | Category::Food | Category::Travel => ExtractorKind::Content,
        }
    }

    /// Static keywords appended when live collection comes up short.
    #[must_use]
    pub fn fallback_keywords(self) -> &'static [&'static str] {
        match self {
            Category::Product => &[
                "wireless earbuds",
                "robot vacuum",
                "air fryer",
                "standing desk",
                "mechanical keyboard",
                "portable monitor",
            ],
            Category::RealEstate => &[
                "apartment listings",
                "jeonse outlook",
                "new town development",
                "officetel investment",
                "mortgage rates",
                "redevelopment zone",
            ],
            Category::Stock => &[
                "semiconductor stocks",
                "dividend etf",
                "battery sector",
                "ai chip makers",
                "index rebalancing",
                "treasury yields",
            ],
            Category::Content => &[
                "short form video",
                "webtoon adaptation",
                "ott originals",
                "podcast ranking",
                "creator economy",
                "fan meetup",
            ],
            Category::Food => &[
                "zero sugar drinks",
                "home meal kits",
                "bakery omakase",
                "protein snacks",
                "regional specialties",
                "pop up cafe",
            ],
            Category::Travel => &[
                "off season flights",
                "workation spots",
                "island camping",
                "rail pass routes",
                "hot spring resorts",
                "night markets",
            ],
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SourceKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::News => "news",
            SourceKind::Shopping => "shopping",
            SourceKind::Marketplace => "marketplace",
            SourceKind::Listings => "listings",
            SourceKind::Finance => "finance",
            SourceKind::Blog => "blog",
        }
    }

    /// The persisted `source_type` label for items from this source.
    #[must_use]
    pub fn source_type(self) -> &'static str {
        match self {
            SourceKind::News => "news",
            SourceKind::Blog => "blog",
            SourceKind::Shopping | SourceKind::Marketplace | SourceKind::Finance => "market",
            SourceKind::Listings => "listing",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_every_whitelisted_name() {
        for category in Category::ALL {
            assert_eq!(Category::parse(category.as_str()), Some(category));
        }
    }

    #[test]
    fn parse_rejects_unknown_names() {
        assert_eq!(Category::parse("crypto"), None);
        assert_eq!(Category::parse(""), None);
        assert_eq!(Category::parse("Product"), None, "names are lowercase");
    }

    #[test]
    fn every_category_has_news_as_final_item_source() {
        for category in Category::ALL {
            assert_eq!(
                category.item_sources().last(),
                Some(&SourceKind::News),
                "{category} should fall back to news last"
            );
        }
    }

    #[test]
    fn fallback_lists_meet_the_keyword_floor() {
        for category in Category::ALL {
            assert!(
                category.fallback_keywords().len() >= 5,
                "{category} fallback list too short"
            );
        }
    }

    #[test]
    fn serde_uses_kebab_case() {
        let json = serde_json::to_string(&Category::RealEstate).expect("serialize");
        assert_eq!(json, "\"real-estate\"");
        let parsed: Category = serde_json::from_str("\"real-estate\"").expect("deserialize");
        assert_eq!(parsed, Category::RealEstate);
    }
}
