use thiserror::Error;

/// The five-way failure taxonomy the retry layer dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Timeouts, connection resets — retryable.
    Network,
    /// HTML/structure errors — retrying returns the same bytes.
    Parse,
    /// 401/403 — retrying without new credentials cannot help.
    Auth,
    /// 429 — retryable after backing off.
    RateLimit,
    /// Anything else; retryable only when it smells like a server fault (5xx).
    Unknown,
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("parse error for {context}: {reason}")]
    Parse { context: String, reason: String },

    #[error("access denied (HTTP {status}) from {url}")]
    Auth { status: u16, url: String },

    #[error("rate limited by {url} (retry after {retry_after_secs}s)")]
    RateLimited { url: String, retry_after_secs: u64 },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl ScrapeError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScrapeError::Http(e) => {
                if e.is_timeout() || e.is_connect() {
                    ErrorKind::Network
                } else {
                    ErrorKind::Unknown
                }
            }
            ScrapeError::Timeout { .. } => ErrorKind::Network,
            ScrapeError::Parse { .. } | ScrapeError::InvalidUrl { .. } => ErrorKind::Parse,
            ScrapeError::Auth { .. } => ErrorKind::Auth,
            ScrapeError::RateLimited { .. } => ErrorKind::RateLimit,
            ScrapeError::UnexpectedStatus { .. } => ErrorKind::Unknown,
        }
    }

    /// Whether the retry layer should try again after a backoff delay.
    ///
    /// `Network` and `RateLimit` always retry. `Parse` and `Auth` never do.
    /// `Unknown` retries only for server-side statuses (5xx); a 4xx means the
    /// request itself is wrong and will keep failing.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self.kind() {
            ErrorKind::Network | ErrorKind::RateLimit => true,
            ErrorKind::Parse | ErrorKind::Auth => false,
            ErrorKind::Unknown => match self {
                ScrapeError::UnexpectedStatus { status, .. } => *status >= 500,
                ScrapeError::Http(e) => e.status().is_none_or(|s| s.is_server_error()),
                _ => true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_err() -> ScrapeError {
        ScrapeError::Parse {
            context: "news list".to_owned(),
            reason: "no matching elements".to_owned(),
        }
    }

    #[test]
    fn timeout_classifies_as_network_and_retries() {
        let err = ScrapeError::Timeout {
            url: "https://example.com".to_owned(),
        };
        assert_eq!(err.kind(), ErrorKind::Network);
        assert!(err.is_retryable());
    }

    #[test]
    fn parse_errors_never_retry() {
        assert_eq!(parse_err().kind(), ErrorKind::Parse);
        assert!(!parse_err().is_retryable());
    }

    #[test]
    fn auth_errors_never_retry() {
        let err = ScrapeError::Auth {
            status: 403,
            url: "https://example.com".to_owned(),
        };
        assert_eq!(err.kind(), ErrorKind::Auth);
        assert!(!err.is_retryable());
    }

    #[test]
    fn rate_limit_retries() {
        let err = ScrapeError::RateLimited {
            url: "https://example.com".to_owned(),
            retry_after_secs: 30,
        };
        assert_eq!(err.kind(), ErrorKind::RateLimit);
        assert!(err.is_retryable());
    }

    #[test]
    fn unknown_status_retries_only_on_5xx() {
        let server = ScrapeError::UnexpectedStatus {
            status: 503,
            url: "https://example.com".to_owned(),
        };
        let client = ScrapeError::UnexpectedStatus {
            status: 418,
            url: "https://example.com".to_owned(),
        };
        assert_eq!(server.kind(), ErrorKind::Unknown);
        assert!(server.is_retryable());
        assert!(!client.is_retryable());
    }

    #[test]
    fn invalid_url_is_terminal() {
        let err = ScrapeError::InvalidUrl {
            url: "::".to_owned(),
            reason: "empty host".to_owned(),
        };
        assert!(!err.is_retryable());
    }
}
