use std::sync::Arc;
use std::time::Duration;

use reeltrack_core::creator::validate_settings;
use reeltrack_core::{timestamp, AppConfig, CreatorProfile, CreatorSettings, TrackedPost};
use reeltrack_db::{MetricStore, StoreSnapshot};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::analytics::{compute_analytics, AnalyticsSnapshot};
use crate::pipeline::{BatchReport, SubmissionPipeline, SubmissionTiming};
use crate::refresh::ForceRefresher;
use crate::scheduler::GrowthScheduler;
use crate::simulator::{GrowthSimulator, TickOutcome};
use crate::source::MetricsSource;
use crate::TrackerError;

/// Timing knobs for the engine's simulated latencies and schedules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    pub tick_interval: Duration,
    pub submit_latency: Duration,
    pub batch_size: usize,
    pub batch_pacing: Duration,
    pub refresh_latency: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(15),
            submit_latency: Duration::from_millis(2_000),
            batch_size: 5,
            batch_pacing: Duration::from_millis(1_000),
            refresh_latency: Duration::from_millis(3_000),
        }
    }
}

impl From<&AppConfig> for TrackerConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            tick_interval: Duration::from_secs(config.tick_interval_secs),
            submit_latency: Duration::from_millis(config.submit_latency_ms),
            batch_size: config.batch_size,
            batch_pacing: Duration::from_millis(config.batch_pacing_ms),
            refresh_latency: Duration::from_millis(config.refresh_latency_ms),
        }
    }
}

/// The tracking-and-analytics engine.
///
/// Cheap to clone; clones share the same store, busy flag and shutdown
/// signal.
#[derive(Clone)]
pub struct Tracker {
    store: Arc<MetricStore>,
    pipeline: Arc<SubmissionPipeline>,
    simulator: Arc<GrowthSimulator>,
    refresher: Arc<ForceRefresher>,
    tick_interval: Duration,
    shutdown: CancellationToken,
}

impl std::fmt::Debug for Tracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracker")
            .field("store", &self.store)
            .field("tick_interval", &self.tick_interval)
            .field("shutting_down", &self.shutdown.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl Tracker {
    #[must_use]
    pub fn new(
        store: Arc<MetricStore>,
        source: Arc<dyn MetricsSource>,
        config: &TrackerConfig,
    ) -> Self {
        let shutdown = CancellationToken::new();
        let pipeline = SubmissionPipeline::new(
            Arc::clone(&store),
            Arc::clone(&source),
            SubmissionTiming {
                latency: config.submit_latency,
                batch_size: config.batch_size,
                batch_pacing: config.batch_pacing,
            },
            shutdown.clone(),
        );
        let refresher = ForceRefresher::new(
            Arc::clone(&store),
            Arc::clone(&source),
            config.refresh_latency,
            shutdown.clone(),
        );
        let simulator = GrowthSimulator::new(Arc::clone(&store), source);

        Self {
            store,
            pipeline: Arc::new(pipeline),
            simulator: Arc::new(simulator),
            refresher: Arc::new(refresher),
            tick_interval: config.tick_interval,
            shutdown,
        }
    }

    /// Submit one post reference.
    ///
    /// # Errors
    ///
    /// - [`TrackerError::InvalidReference`] if `url` is not a supported shape.
    /// - [`TrackerError::DuplicatePost`] if the shortcode is already tracked.
    /// - [`TrackerError::ShuttingDown`] if shutdown interrupts the fetch.
    /// - [`TrackerError::Store`] if the new collection cannot be persisted.
    ///
    /// The store is unchanged on every error path.
    pub async fn submit(&self, url: &str) -> Result<TrackedPost, TrackerError> {
        self.pipeline.submit(url).await
    }

    /// Submit many references in paced concurrent groups.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::NoValidReferences`] if none of `urls` is a
    /// valid reference. Per-URL failures are reported in the returned
    /// [`BatchReport`], including URLs left unsubmitted by shutdown, which
    /// fail with [`TrackerError::ShuttingDown`].
    pub async fn submit_batch<S: AsRef<str>>(&self, urls: &[S]) -> Result<BatchReport, TrackerError> {
        self.pipeline.submit_batch(urls).await
    }

    /// Remove a post by id. Returns whether anything was removed; unknown ids
    /// leave the store untouched.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Store`] if the shrunk collection cannot be
    /// persisted.
    pub async fn delete_post(&self, id: Uuid) -> Result<bool, TrackerError> {
        self.pipeline.delete(id).await
    }

    #[must_use]
    pub fn compute_analytics(&self) -> AnalyticsSnapshot {
        compute_analytics(&self.store.posts(), timestamp::now_millis())
    }

    /// Boost every tracked post. Only one refresh runs at a time.
    ///
    /// # Errors
    ///
    /// - [`TrackerError::RefreshInProgress`] if another refresh is running.
    /// - [`TrackerError::ShuttingDown`] if shutdown interrupts the fetch.
    /// - [`TrackerError::Store`] if the boosted collection cannot be persisted.
    pub async fn force_refresh(&self) -> Result<usize, TrackerError> {
        self.refresher.run().await
    }

    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.refresher.is_busy()
    }

    #[must_use]
    pub fn subscribe_refreshing(&self) -> watch::Receiver<bool> {
        self.refresher.subscribe()
    }

    /// Run one growth tick immediately, outside the schedule.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Store`] if the grown collection cannot be
    /// persisted.
    pub async fn tick(&self) -> Result<TickOutcome, TrackerError> {
        Ok(self.simulator.tick().await?)
    }

    /// Start periodic growth ticks.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Scheduler`] if the schedule cannot be started.
    pub async fn start_growth(&self) -> Result<GrowthScheduler, TrackerError> {
        Ok(GrowthScheduler::start(Arc::clone(&self.simulator), self.tick_interval).await?)
    }

    /// Apply user-editable creator fields. Derived totals are untouched.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Settings`] if the settings fail validation, or
    /// [`TrackerError::Store`] if the profile cannot be persisted.
    pub async fn update_settings(
        &self,
        settings: CreatorSettings,
    ) -> Result<Arc<CreatorProfile>, TrackerError> {
        validate_settings(&settings)?;
        let handle = settings.handle.clone();
        let profile = self
            .store
            .update_profile(|profile| profile.apply_settings(settings))
            .await?;
        tracing::info!(handle = %handle, "creator settings updated");
        Ok(profile)
    }

    #[must_use]
    pub fn posts(&self) -> Arc<Vec<TrackedPost>> {
        self.store.posts()
    }

    #[must_use]
    pub fn profile(&self) -> Arc<CreatorProfile> {
        self.store.profile()
    }

    /// Notified on every store mutation.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.store.subscribe()
    }

    /// Cancel every in-flight simulated latency. Pending submissions and
    /// refreshes fail with [`TrackerError::ShuttingDown`] without touching
    /// the store.
    pub fn shutdown(&self) {
        if !self.shutdown.is_cancelled() {
            tracing::info!("tracker shutting down");
        }
        self.shutdown.cancel();
    }
}
