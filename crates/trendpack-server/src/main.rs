mod api;
mod middleware;
mod pipeline;
mod stats;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    middleware::AuthState,
    stats::StatsRegistry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(trendpack_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = trendpack_db::PoolConfig::from_app_config(&config);
    let pool = trendpack_db::connect_pool(&config.database_url, pool_config).await?;
    trendpack_db::run_migrations(&pool).await?;
    if matches!(config.env, trendpack_core::Environment::Development) {
        let seeded = trendpack_db::seed_prompt_templates(&pool).await?;
        if seeded > 0 {
            tracing::info!(seeded, "seeded prompt templates");
        }
    }

    let auth = AuthState::new(
        config.crawl_api_key.clone(),
        matches!(config.env, trendpack_core::Environment::Development),
    );
    let client = trendpack_scraper::FetchClient::from_config(&config.crawler)?;
    let state = AppState {
        pool,
        client,
        crawler: Arc::new(config.crawler.clone()),
        stats: StatsRegistry::new(),
    };
    let app = build_app(state, auth);

    tracing::info!(addr = %config.bind_addr, env = %config.env, "starting server");
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
