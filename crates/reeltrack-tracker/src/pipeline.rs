//! Admission of new posts, singly or in paced batches, and their removal.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use reeltrack_core::{
    extract_shortcode, generate_thumbnail, is_valid_reference, timestamp, NewPost, TrackedPost,
};
use reeltrack_db::MetricStore;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::source::MetricsSource;
use crate::{pause, TrackerError};

/// Per-URL result of a batch submission.
#[derive(Debug)]
pub struct BatchItemOutcome {
    pub url: String,
    pub result: Result<TrackedPost, TrackerError>,
}

/// What happened to every URL handed to [`SubmissionPipeline::submit_batch`].
#[derive(Debug, Default)]
pub struct BatchReport {
    /// URLs that were not valid references and were never attempted.
    pub rejected: Vec<String>,
    /// Attempted URLs in input order.
    pub outcomes: Vec<BatchItemOutcome>,
}

impl BatchReport {
    #[must_use]
    pub fn admitted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.admitted()
    }

    pub fn admitted_posts(&self) -> impl Iterator<Item = &TrackedPost> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SubmissionTiming {
    pub latency: Duration,
    pub batch_size: usize,
    pub batch_pacing: Duration,
}

pub(crate) struct SubmissionPipeline {
    store: Arc<MetricStore>,
    source: Arc<dyn MetricsSource>,
    timing: SubmissionTiming,
    shutdown: CancellationToken,
}

impl SubmissionPipeline {
    pub(crate) fn new(
        store: Arc<MetricStore>,
        source: Arc<dyn MetricsSource>,
        timing: SubmissionTiming,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            store,
            source,
            timing,
            shutdown,
        }
    }

    /// Validate, resolve and admit one post at the front of the collection.
    ///
    /// The duplicate check runs twice: once up front so obvious repeats fail
    /// fast, and again inside the store's write so two in-flight submissions
    /// of the same shortcode can never both land.
    pub(crate) async fn submit(&self, url: &str) -> Result<TrackedPost, TrackerError> {
        let url = url.trim();
        if !is_valid_reference(url) {
            tracing::debug!(url, "rejected invalid reference");
            return Err(TrackerError::InvalidReference {
                url: url.to_string(),
            });
        }
        let Some(shortcode) = extract_shortcode(url) else {
            tracing::error!(url, "valid reference yielded no shortcode");
            return Err(TrackerError::UnresolvableIdentity {
                url: url.to_string(),
            });
        };

        if self.store.posts().iter().any(|p| p.shortcode == shortcode) {
            tracing::debug!(shortcode = %shortcode, "duplicate submission");
            return Err(TrackerError::DuplicatePost { shortcode });
        }

        pause(self.timing.latency, &self.shutdown).await?;

        let reading = self.source.initial_reading(&shortcode);
        let post = TrackedPost::new(
            NewPost {
                image_ref: generate_thumbnail(&shortcode),
                shortcode: shortcode.clone(),
                source_url: url.to_string(),
                owner_handle: reading.owner_handle,
                caption: reading.caption,
                views: reading.views,
                likes: reading.likes,
                comments: reading.comments,
            },
            timestamp::now_millis(),
        );
        let admitted = post.clone();

        self.store
            .update_posts(move |posts| {
                if posts.iter().any(|p| p.shortcode == post.shortcode) {
                    return Err(TrackerError::DuplicatePost {
                        shortcode: post.shortcode,
                    });
                }
                posts.insert(0, post);
                Ok(())
            })
            .await?;

        tracing::info!(
            shortcode = %admitted.shortcode,
            id = %admitted.id,
            views = admitted.views,
            "post admitted"
        );
        Ok(admitted)
    }

    /// Submit every valid URL in groups of `batch_size`.
    ///
    /// Members of a group run concurrently; groups run in order with
    /// `batch_pacing` between them. Invalid URLs are dropped up front and
    /// listed in the report. Failures of individual URLs are recorded, not
    /// propagated. Shutdown during pacing stops the batch and records every
    /// unsubmitted URL as [`TrackerError::ShuttingDown`].
    pub(crate) async fn submit_batch<S: AsRef<str>>(
        &self,
        urls: &[S],
    ) -> Result<BatchReport, TrackerError> {
        let (valid, rejected): (Vec<&str>, Vec<&str>) = urls
            .iter()
            .map(AsRef::as_ref)
            .partition(|url| is_valid_reference(url));

        if valid.is_empty() {
            tracing::warn!(submitted = urls.len(), "batch contained no valid references");
            return Err(TrackerError::NoValidReferences);
        }

        let mut report = BatchReport {
            rejected: rejected.into_iter().map(str::to_string).collect(),
            outcomes: Vec::with_capacity(valid.len()),
        };

        let batch_size = self.timing.batch_size.max(1);
        for (index, group) in valid.chunks(batch_size).enumerate() {
            if index > 0 && pause(self.timing.batch_pacing, &self.shutdown).await.is_err() {
                let pending = &valid[index * batch_size..];
                tracing::info!(pending = pending.len(), "batch interrupted by shutdown");
                report.outcomes.extend(pending.iter().map(|url| BatchItemOutcome {
                    url: (*url).to_string(),
                    result: Err(TrackerError::ShuttingDown),
                }));
                break;
            }
            let results = join_all(group.iter().map(|url| self.submit(url))).await;
            for (url, result) in group.iter().zip(results) {
                if let Err(e) = &result {
                    tracing::debug!(url, error = %e, "batch item failed");
                }
                report.outcomes.push(BatchItemOutcome {
                    url: (*url).to_string(),
                    result,
                });
            }
        }

        tracing::info!(
            admitted = report.admitted(),
            failed = report.failed(),
            rejected = report.rejected.len(),
            "batch submission finished"
        );
        Ok(report)
    }

    /// Remove the post with `id`. Unknown ids are a no-op.
    pub(crate) async fn delete(&self, id: Uuid) -> Result<bool, TrackerError> {
        let removed = self
            .store
            .update_posts(|posts| {
                let before = posts.len();
                posts.retain(|p| p.id != id);
                Ok::<_, TrackerError>(posts.len() != before)
            })
            .await?;

        if removed {
            tracing::info!(%id, "post deleted");
        } else {
            tracing::debug!(%id, "delete of unknown post ignored");
        }
        Ok(removed)
    }
}
