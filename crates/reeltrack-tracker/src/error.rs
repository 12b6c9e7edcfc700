use reeltrack_core::ConfigError;
use reeltrack_db::StoreError;
use thiserror::Error;
use tokio_cron_scheduler::JobSchedulerError;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("invalid Instagram reference: {url}")]
    InvalidReference { url: String },

    /// A reference passed validation but yielded no shortcode. Indicates the
    /// validation and extraction patterns have drifted apart.
    #[error("could not extract a post identifier from {url}")]
    UnresolvableIdentity { url: String },

    #[error("post {shortcode} has already been submitted")]
    DuplicatePost { shortcode: String },

    #[error("no valid Instagram references found")]
    NoValidReferences,

    #[error("a force refresh is already in progress")]
    RefreshInProgress,

    #[error("tracker is shutting down")]
    ShuttingDown,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid creator settings: {0}")]
    Settings(#[from] ConfigError),

    #[error("scheduler error: {0}")]
    Scheduler(#[from] JobSchedulerError),
}
