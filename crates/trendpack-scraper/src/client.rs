//! HTTP client for public source pages.
//!
//! All outbound traffic goes through [`FetchClient`]: one configured
//! `reqwest::Client` (request timeout, connect timeout, browser-style
//! User-Agent) plus status mapping into the typed [`ScrapeError`] taxonomy
//! and automatic retry on transient failures.

use std::time::Duration;

use reqwest::{Client, StatusCode};

use crate::error::ScrapeError;
use crate::retry::retry_with_backoff;

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Fallback wait after a 429 without a parseable `Retry-After` header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

#[derive(Clone)]
pub struct FetchClient {
    client: Client,
    /// Additional attempts after the first failure.
    max_retries: u32,
    /// Base delay in milliseconds for exponential backoff.
    backoff_base_ms: u64,
}

impl FetchClient {
    /// Creates a client with the given timeout, User-Agent, and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Builds a client from the crawl section of the app config.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the client cannot be constructed.
    pub fn from_config(config: &trendpack_core::CrawlerConfig) -> Result<Self, ScrapeError> {
        Self::new(
            config.request_timeout_secs,
            &config.user_agent,
            config.max_retries,
            config.retry_backoff_base_ms,
        )
    }

    /// Fetches a page body as text, retrying transient failures.
    ///
    /// # Errors
    ///
    /// - [`ScrapeError::Timeout`] — the request timed out after all retries.
    /// - [`ScrapeError::Auth`] — 401/403 (not retried).
    /// - [`ScrapeError::RateLimited`] — 429 after all retries exhausted.
    /// - [`ScrapeError::UnexpectedStatus`] — other non-2xx (5xx retried, 4xx not).
    /// - [`ScrapeError::Http`] — network or TLS failure after all retries.
    pub async fn fetch_html(&self, url: &str) -> Result<String, ScrapeError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.fetch_once(url)
        })
        .await
    }

    async fn fetch_once(&self, url: &str) -> Result<String, ScrapeError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Self::map_transport_error(e, url))?;

        let status = response.status();
        match status {
            s if s.is_success() => response
                .text()
                .await
                .map_err(|e| Self::map_transport_error(e, url)),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ScrapeError::Auth {
                status: status.as_u16(),
                url: url.to_owned(),
            }),
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after_secs = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
                Err(ScrapeError::RateLimited {
                    url: url.to_owned(),
                    retry_after_secs,
                })
            }
            s => Err(ScrapeError::UnexpectedStatus {
                status: s.as_u16(),
                url: url.to_owned(),
            }),
        }
    }

    /// Converts a native client timeout into the typed `Timeout` error so the
    /// taxonomy sees it as `network` regardless of reqwest internals.
    fn map_transport_error(e: reqwest::Error, url: &str) -> ScrapeError {
        if e.is_timeout() {
            ScrapeError::Timeout {
                url: url.to_owned(),
            }
        } else {
            ScrapeError::Http(e)
        }
    }
}
