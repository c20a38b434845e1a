use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Tuning knobs for the crawl pipeline and its outbound HTTP traffic.
///
/// Source base URLs are configurable so tests can point every adapter at a
/// local mock server instead of the live portals.
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Additional attempts after the first failure, for retryable errors.
    pub max_retries: u32,
    /// Base delay for exponential backoff: `base * 2^attempt` milliseconds.
    pub retry_backoff_base_ms: u64,
    /// Fixed sleep between two sources within one category crawl.
    pub inter_source_delay_ms: u64,
    /// Fixed sleep between two keywords within one category run.
    pub inter_keyword_delay_ms: u64,
    /// Cap on keywords collected per category.
    pub max_keywords: usize,
    pub realtime_trends_url: String,
    pub news_trending_url: String,
    pub news_base_url: String,
    pub shopping_base_url: String,
    pub marketplace_base_url: String,
    pub listings_base_url: String,
    pub finance_base_url: String,
    pub blog_base_url: String,
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Static bearer token gating `POST /api/v1/crawl/run`.
    /// May be absent only in development.
    pub crawl_api_key: Option<String>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub crawler: CrawlerConfig,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field(
                "crawl_api_key",
                &self.crawl_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("crawler", &self.crawler)
            .finish()
    }
}
