use crate::app_config::{AppConfig, CrawlerConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// The parsing/validation logic is decoupled from the actual environment so it
/// can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default =
        |var: &str, default: &str| -> String { lookup(var).unwrap_or_else(|_| default.to_string()) };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let database_url = require("DATABASE_URL")?;

    let env = parse_environment(&or_default("TRENDPACK_ENV", "development"));
    let crawl_api_key = lookup("TRENDPACK_CRAWL_API_KEY")
        .ok()
        .filter(|v| !v.trim().is_empty());
    if crawl_api_key.is_none() && env == Environment::Production {
        return Err(ConfigError::MissingEnvVar(
            "TRENDPACK_CRAWL_API_KEY".to_string(),
        ));
    }

    let bind_addr = parse_addr("TRENDPACK_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("TRENDPACK_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("TRENDPACK_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("TRENDPACK_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("TRENDPACK_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let crawler = CrawlerConfig {
        request_timeout_secs: parse_u64("TRENDPACK_CRAWL_REQUEST_TIMEOUT_SECS", "15")?,
        user_agent: or_default(
            "TRENDPACK_CRAWL_USER_AGENT",
            "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
             Chrome/124.0.0.0 Safari/537.36",
        ),
        max_retries: parse_u32("TRENDPACK_CRAWL_MAX_RETRIES", "2")?,
        retry_backoff_base_ms: parse_u64("TRENDPACK_CRAWL_RETRY_BACKOFF_BASE_MS", "1000")?,
        inter_source_delay_ms: parse_u64("TRENDPACK_CRAWL_INTER_SOURCE_DELAY_MS", "500")?,
        inter_keyword_delay_ms: parse_u64("TRENDPACK_CRAWL_INTER_KEYWORD_DELAY_MS", "1000")?,
        max_keywords: parse_usize("TRENDPACK_CRAWL_MAX_KEYWORDS", "5")?,
        realtime_trends_url: or_default(
            "TRENDPACK_SOURCE_REALTIME_TRENDS_URL",
            "https://realtime.signal.bz",
        ),
        news_trending_url: or_default(
            "TRENDPACK_SOURCE_NEWS_TRENDING_URL",
            "https://news.nate.com",
        ),
        news_base_url: or_default("TRENDPACK_SOURCE_NEWS_URL", "https://search.naver.com"),
        shopping_base_url: or_default(
            "TRENDPACK_SOURCE_SHOPPING_URL",
            "https://search.shopping.naver.com",
        ),
        marketplace_base_url: or_default(
            "TRENDPACK_SOURCE_MARKETPLACE_URL",
            "https://m.bunjang.co.kr",
        ),
        listings_base_url: or_default("TRENDPACK_SOURCE_LISTINGS_URL", "https://land.naver.com"),
        finance_base_url: or_default("TRENDPACK_SOURCE_FINANCE_URL", "https://finance.naver.com"),
        blog_base_url: or_default("TRENDPACK_SOURCE_BLOG_URL", "https://section.blog.naver.com"),
    };

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        crawl_api_key,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        crawler,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from<'a>(map: &'a HashMap<&'a str, &'a str>) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| map.get(key).map(ToString::to_string).ok_or(VarError::NotPresent)
    }

    #[test]
    fn minimal_env_gets_defaults() {
        let env = HashMap::from([("DATABASE_URL", "postgres://localhost/trendpack")]);
        let config = build_app_config(lookup_from(&env)).expect("config should build");

        assert_eq!(config.env, Environment::Development);
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.log_level, "info");
        assert!(config.crawl_api_key.is_none(), "no key needed in development");
        assert_eq!(config.crawler.max_retries, 2);
        assert_eq!(config.crawler.retry_backoff_base_ms, 1000);
        assert_eq!(config.crawler.max_keywords, 5);
    }

    #[test]
    fn missing_database_url_is_an_error() {
        let env = HashMap::new();
        let err = build_app_config(lookup_from(&env)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(var) if var == "DATABASE_URL"));
    }

    #[test]
    fn production_requires_crawl_api_key() {
        let env = HashMap::from([
            ("DATABASE_URL", "postgres://localhost/trendpack"),
            ("TRENDPACK_ENV", "production"),
        ]);
        let err = build_app_config(lookup_from(&env)).unwrap_err();
        assert!(
            matches!(err, ConfigError::MissingEnvVar(var) if var == "TRENDPACK_CRAWL_API_KEY")
        );
    }

    #[test]
    fn blank_api_key_is_treated_as_unset() {
        let env = HashMap::from([
            ("DATABASE_URL", "postgres://localhost/trendpack"),
            ("TRENDPACK_CRAWL_API_KEY", "   "),
        ]);
        let config = build_app_config(lookup_from(&env)).expect("config should build");
        assert!(config.crawl_api_key.is_none());
    }

    #[test]
    fn invalid_numeric_value_reports_the_variable() {
        let env = HashMap::from([
            ("DATABASE_URL", "postgres://localhost/trendpack"),
            ("TRENDPACK_CRAWL_MAX_RETRIES", "many"),
        ]);
        let err = build_app_config(lookup_from(&env)).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnvVar { var, .. } if var == "TRENDPACK_CRAWL_MAX_RETRIES"
        ));
    }

    #[test]
    fn source_urls_are_overridable() {
        let env = HashMap::from([
            ("DATABASE_URL", "postgres://localhost/trendpack"),
            ("TRENDPACK_SOURCE_NEWS_URL", "http://127.0.0.1:9999"),
        ]);
        let config = build_app_config(lookup_from(&env)).expect("config should build");
        assert_eq!(config.crawler.news_base_url, "http://127.0.0.1:9999");
    }
}
