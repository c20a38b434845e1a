mod crawl;
mod packs;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use trendpack_core::CrawlerConfig;
use trendpack_scraper::FetchClient;

use crate::middleware::{request_id, require_bearer_auth, AuthState, RequestId};
use crate::stats::StatsRegistry;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub client: FetchClient,
    pub crawler: Arc<CrawlerConfig>,
    pub stats: StatsRegistry,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_db_error(request_id: String, error: &trendpack_db::DbError) -> ApiError {
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn protected_router(auth: AuthState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/crawl/run", post(crawl::run_crawl))
        .layer(ServiceBuilder::new().layer(axum::middleware::from_fn_with_state(
            auth,
            require_bearer_auth,
        )))
}

pub fn build_app(state: AppState, auth: AuthState) -> Router {
    let public_routes = Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/crawl/status", get(crawl::crawl_status))
        .route("/api/v1/packs", get(packs::list_packs));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match trendpack_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    pub(super) fn test_state(pool: sqlx::PgPool) -> AppState {
        AppState {
            pool,
            client: FetchClient::new(5, "trendpack-test/0.1", 0, 0).expect("client"),
            crawler: Arc::new(test_crawler_config("http://127.0.0.1:1")),
            stats: StatsRegistry::new(),
        }
    }

    pub(super) fn test_crawler_config(base: &str) -> CrawlerConfig {
        CrawlerConfig {
            request_timeout_secs: 5,
            user_agent: "trendpack-test/0.1".to_owned(),
            max_retries: 0,
            retry_backoff_base_ms: 0,
            inter_source_delay_ms: 0,
            inter_keyword_delay_ms: 0,
            max_keywords: 5,
            realtime_trends_url: base.to_owned(),
            news_trending_url: base.to_owned(),
            news_base_url: base.to_owned(),
            shopping_base_url: base.to_owned(),
            marketplace_base_url: base.to_owned(),
            listings_base_url: base.to_owned(),
            finance_base_url: base.to_owned(),
            blog_base_url: base.to_owned(),
        }
    }

    #[test]
    fn api_error_codes_map_to_statuses() {
        let bad = ApiError::new("req-1", "bad_request", "invalid input").into_response();
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

        let unauthorized = ApiError::new("req-2", "unauthorized", "nope").into_response();
        assert_eq!(unauthorized.status(), StatusCode::UNAUTHORIZED);

        let internal = ApiError::new("req-3", "internal_error", "boom").into_response();
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn health_returns_ok_with_request_id_echo(pool: sqlx::PgPool) {
        let auth = AuthState::new(None, true);
        let app = build_app(test_state(pool), auth);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .header("x-request-id", "fixed-id-1")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok()),
            Some("fixed-id-1")
        );

        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
        assert_eq!(json["data"]["status"].as_str(), Some("ok"));
        assert_eq!(json["meta"]["request_id"].as_str(), Some("fixed-id-1"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn crawl_run_requires_bearer_token_when_configured(pool: sqlx::PgPool) {
        let auth = AuthState::new(Some("crawl-secret".to_owned()), false);
        let app = build_app(test_state(pool), auth);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/crawl/run")
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
