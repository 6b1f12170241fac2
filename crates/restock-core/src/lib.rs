//! Shared domain types, configuration, and pure helpers for the restock
//! reconciliation pipeline.
//!
//! Everything in this crate is I/O-free: identifier normalization, the
//! restock-message classifier, the domain model, and env-based configuration
//! parsing. The HTTP clients live in `restock-events` and `restock-commerce`.

mod app_config;
mod classify;
mod config;
mod normalize;
mod types;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use classify::is_restock_message;
pub use config::{load_app_config, load_app_config_from_env};
pub use normalize::{normalize_id, normalize_quotes, same_product};
pub use types::{
    parse_timestamp, AlertSignal, EnrichedSignupRecord, Enrichment, SignupEvent, SubscriberProfile,
};

/// Errors raised while loading application configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// An environment variable is set but its value cannot be parsed.
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
