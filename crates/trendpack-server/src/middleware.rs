use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Bearer-token settings for the crawl trigger endpoint.
#[derive(Debug, Clone)]
pub struct AuthState {
    api_key: Option<String>,
    pub enabled: bool,
}

impl AuthState {
    /// Builds auth settings from the loaded config.
    ///
    /// In development, a missing `TRENDPACK_CRAWL_API_KEY` disables auth for
    /// local iteration. Config loading already rejects a missing key in
    /// production, so a `None` here outside development cannot happen.
    #[must_use]
    pub fn new(api_key: Option<String>, is_development: bool) -> Self {
        match api_key {
            Some(key) => Self {
                api_key: Some(key),
                enabled: true,
            },
            None => {
                if is_development {
                    tracing::warn!(
                        "TRENDPACK_CRAWL_API_KEY not set; crawl trigger auth disabled in development"
                    );
                }
                Self {
                    api_key: None,
                    enabled: false,
                }
            }
        }
    }

    fn allows(&self, token: &str) -> bool {
        self.api_key.as_deref() == Some(token)
    }
}

#[derive(Debug, Serialize)]
struct MiddlewareErrorBody {
    error: MiddlewareError,
}

#[derive(Debug, Serialize)]
struct MiddlewareError {
    code: &'static str,
    message: &'static str,
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Middleware enforcing Bearer token auth when enabled.
pub async fn require_bearer_auth(
    State(auth): State<AuthState>,
    req: Request,
    next: Next,
) -> Response {
    if !auth.enabled {
        return next.run(req).await;
    }

    let token = extract_bearer_token(req.headers().get(AUTHORIZATION));

    match token {
        Some(token) if auth.allows(token) => next.run(req).await,
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(MiddlewareErrorBody {
                error: MiddlewareError {
                    code: "unauthorized",
                    message: "missing or invalid bearer token",
                },
            }),
        )
            .into_response(),
    }
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_bearer_token_accepts_valid_header() {
        let header = HeaderValue::from_static("Bearer test-token");
        assert_eq!(extract_bearer_token(Some(&header)), Some("test-token"));
    }

    #[test]
    fn extract_bearer_token_rejects_non_bearer_header() {
        let header = HeaderValue::from_static("Basic abc123");
        assert_eq!(extract_bearer_token(Some(&header)), None);
    }

    #[test]
    fn auth_state_disables_without_key_in_dev() {
        let state = AuthState::new(None, true);
        assert!(!state.enabled);
    }

    #[test]
    fn auth_state_matches_only_the_configured_key() {
        let state = AuthState::new(Some("secret".to_owned()), false);
        assert!(state.enabled);
        assert!(state.allows("secret"));
        assert!(!state.allows("other"));
    }
}
