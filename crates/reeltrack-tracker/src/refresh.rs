use std::sync::Arc;
use std::time::Duration;

use reeltrack_core::timestamp;
use reeltrack_db::MetricStore;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::source::MetricsSource;
use crate::{pause, TrackerError};

/// User-triggered "refresh everything now", at most one at a time.
pub(crate) struct ForceRefresher {
    store: Arc<MetricStore>,
    source: Arc<dyn MetricsSource>,
    latency: Duration,
    busy: watch::Sender<bool>,
    shutdown: CancellationToken,
}

/// Clears the busy flag however the refresh ends.
struct BusyGuard<'a>(&'a watch::Sender<bool>);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.send_replace(false);
    }
}

impl ForceRefresher {
    pub(crate) fn new(
        store: Arc<MetricStore>,
        source: Arc<dyn MetricsSource>,
        latency: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        let (busy, _) = watch::channel(false);
        Self {
            store,
            source,
            latency,
            busy,
            shutdown,
        }
    }

    pub(crate) fn is_busy(&self) -> bool {
        *self.busy.borrow()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<bool> {
        self.busy.subscribe()
    }

    /// Boost every tracked post after the simulated fetch latency.
    ///
    /// Returns the number of posts refreshed.
    pub(crate) async fn run(&self) -> Result<usize, TrackerError> {
        let claimed = self.busy.send_if_modified(|busy| {
            if *busy {
                false
            } else {
                *busy = true;
                true
            }
        });
        if !claimed {
            tracing::debug!("force refresh rejected, one is already running");
            return Err(TrackerError::RefreshInProgress);
        }
        let _busy = BusyGuard(&self.busy);

        tracing::info!("force refresh started");
        pause(self.latency, &self.shutdown).await?;

        let now = timestamp::now_millis();
        let refreshed = self
            .store
            .update_posts(|posts| {
                for post in posts.iter_mut() {
                    let boost = self.source.refresh_boost(post);
                    post.apply_growth(boost, now);
                }
                Ok::<_, TrackerError>(posts.len())
            })
            .await?;

        tracing::info!(refreshed, "force refresh finished");
        Ok(refreshed)
    }
}
