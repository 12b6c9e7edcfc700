//! Core data model, reference resolution and configuration for reeltrack.

pub mod app_config;
pub mod config;
pub mod creator;
pub mod format;
pub mod identity;
pub mod posts;
pub mod thumbnail;
pub mod timestamp;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use creator::{
    estimated_payout, load_creator_settings, CreatorProfile, CreatorSettings, PaymentMethods,
    DEFAULT_CREATOR_HANDLE,
};
pub use identity::{
    extract_shortcode, is_valid_reference, resolve_reference, ContentKind, PostReference,
};
pub use posts::{MetricDelta, MetricHistory, MetricSnapshot, NewPost, TrackedPost, HISTORY_CAPACITY};
pub use thumbnail::generate_thumbnail;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read creator file {path}: {source}")]
    CreatorFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse creator file: {0}")]
    CreatorFileParse(#[source] serde_yaml::Error),

    #[error("creator settings validation failed: {0}")]
    Validation(String),
}
