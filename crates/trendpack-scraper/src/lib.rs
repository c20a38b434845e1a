pub mod client;
pub mod error;
pub mod extract;
pub mod keywords;
mod retry;
pub mod sources;
pub mod summary;
pub mod types;
pub mod validate;

pub use client::FetchClient;
pub use error::{ErrorKind, ScrapeError};
pub use keywords::{collect_trend_keywords, TrendKeyword};
pub use retry::retry_with_backoff;
pub use sources::crawl_by_category;
pub use types::ScrapedItem;
