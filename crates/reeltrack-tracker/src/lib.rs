//! The tracking-and-analytics engine: submission, background growth,
//! force refresh and analytics over a [`reeltrack_db::MetricStore`].

pub mod analytics;
mod error;
mod pipeline;
mod refresh;
pub mod scheduler;
pub mod simulator;
pub mod source;
mod tracker;

use std::time::Duration;

use tokio_util::sync::CancellationToken;

pub use analytics::{compute_analytics, AnalyticsSnapshot, RECENT_ACTIVITY_LIMIT};
pub use error::TrackerError;
pub use pipeline::{BatchItemOutcome, BatchReport};
pub use scheduler::GrowthScheduler;
pub use simulator::{GrowthSimulator, TickOutcome};
pub use source::{MetricReading, MetricsSource, SimulatedSource};
pub use tracker::{Tracker, TrackerConfig};

/// Sleep for `duration` unless `shutdown` fires first.
async fn pause(duration: Duration, shutdown: &CancellationToken) -> Result<(), TrackerError> {
    tokio::select! {
        biased;
        () = shutdown.cancelled() => Err(TrackerError::ShuttingDown),
        () = tokio::time::sleep(duration) => Ok(()),
    }
}
