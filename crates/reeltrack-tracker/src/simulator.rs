use std::sync::Arc;

use reeltrack_core::timestamp;
use reeltrack_db::{MetricStore, StoreError};

use crate::source::MetricsSource;

/// Result of one scheduled growth tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The source decided this tick should do nothing.
    Skipped,
    /// The tick ran; `mutated` posts received growth.
    Applied { mutated: usize },
}

/// Applies background engagement growth to tracked posts.
pub struct GrowthSimulator {
    store: Arc<MetricStore>,
    source: Arc<dyn MetricsSource>,
}

impl GrowthSimulator {
    #[must_use]
    pub fn new(store: Arc<MetricStore>, source: Arc<dyn MetricsSource>) -> Self {
        Self { store, source }
    }

    /// Run one tick as a single atomic read-modify-write of the collection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the grown collection cannot be persisted; the
    /// visible state is left as it was.
    pub async fn tick(&self) -> Result<TickOutcome, StoreError> {
        if !self.source.tick_due() {
            tracing::trace!("growth tick skipped");
            return Ok(TickOutcome::Skipped);
        }

        let now = timestamp::now_millis();
        let mutated = self
            .store
            .update_posts(|posts| {
                let mut mutated = 0;
                for post in posts.iter_mut() {
                    if let Some(delta) = self.source.tick_increment(post) {
                        post.apply_growth(delta, now);
                        mutated += 1;
                    }
                }
                Ok::<_, StoreError>(mutated)
            })
            .await?;

        tracing::debug!(mutated, "growth tick applied");
        Ok(TickOutcome::Applied { mutated })
    }
}
