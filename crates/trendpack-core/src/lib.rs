use thiserror::Error;

mod app_config;
mod category;
mod config;
mod week;

pub use app_config::{AppConfig, CrawlerConfig, Environment};
pub use category::{Category, ExtractorKind, SourceKind};
pub use config::{load_app_config, load_app_config_from_env};
pub use week::{current_week_key, week_key_for};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
