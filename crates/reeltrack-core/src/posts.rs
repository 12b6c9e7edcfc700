//! Tracked posts and their bounded metric history.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of snapshots retained per post. Oldest entries are evicted first.
pub const HISTORY_CAPACITY: usize = 24;

/// Point-in-time copy of a post's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSnapshot {
    #[serde(with = "crate::timestamp")]
    pub timestamp: DateTime<Utc>,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
}

/// Counter increments applied by a simulated tick or a forced refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricDelta {
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
}

/// Fixed-capacity, chronological sequence of [`MetricSnapshot`]s.
///
/// Appending to a full history drops the oldest snapshot. Deserializing a
/// longer sequence keeps only the most recent [`HISTORY_CAPACITY`] entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<MetricSnapshot>", into = "Vec<MetricSnapshot>")]
pub struct MetricHistory {
    entries: VecDeque<MetricSnapshot>,
}

impl MetricHistory {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    /// Append a snapshot, evicting the oldest one when at capacity.
    pub fn push(&mut self, snapshot: MetricSnapshot) {
        if self.entries.len() == HISTORY_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(snapshot);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn latest(&self) -> Option<&MetricSnapshot> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricSnapshot> {
        self.entries.iter()
    }
}

impl From<Vec<MetricSnapshot>> for MetricHistory {
    fn from(snapshots: Vec<MetricSnapshot>) -> Self {
        let mut history = Self::new();
        for snapshot in snapshots {
            history.push(snapshot);
        }
        history
    }
}

impl From<MetricHistory> for Vec<MetricSnapshot> {
    fn from(history: MetricHistory) -> Self {
        history.entries.into()
    }
}

/// Metadata and baseline counters for a post being admitted.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub shortcode: String,
    pub source_url: String,
    pub owner_handle: String,
    pub caption: String,
    pub image_ref: String,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
}

/// One tracked social-media post and its rolling metric history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedPost {
    pub id: Uuid,
    pub shortcode: String,
    pub source_url: String,
    pub owner_handle: String,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub caption: String,
    pub image_ref: String,
    #[serde(with = "crate::timestamp")]
    pub submitted_at: DateTime<Utc>,
    #[serde(with = "crate::timestamp")]
    pub last_updated: DateTime<Utc>,
    pub history: MetricHistory,
}

impl TrackedPost {
    /// Build a post with a fresh id and a single-entry history captured at `at`.
    #[must_use]
    pub fn new(new: NewPost, at: DateTime<Utc>) -> Self {
        let mut history = MetricHistory::new();
        history.push(MetricSnapshot {
            timestamp: at,
            views: new.views,
            likes: new.likes,
            comments: new.comments,
        });

        Self {
            id: Uuid::new_v4(),
            shortcode: new.shortcode,
            source_url: new.source_url,
            owner_handle: new.owner_handle,
            views: new.views,
            likes: new.likes,
            comments: new.comments,
            caption: new.caption,
            image_ref: new.image_ref,
            submitted_at: at,
            last_updated: at,
            history,
        }
    }

    /// Add `delta` to the counters, stamp `last_updated`, and append a snapshot
    /// of the post-increment counters.
    pub fn apply_growth(&mut self, delta: MetricDelta, at: DateTime<Utc>) {
        // history timestamps must never go backwards, even across clock skew
        let at = at.max(self.last_updated);

        self.views = self.views.saturating_add(delta.views);
        self.likes = self.likes.saturating_add(delta.likes);
        self.comments = self.comments.saturating_add(delta.comments);
        self.last_updated = at;
        self.history.push(MetricSnapshot {
            timestamp: at,
            views: self.views,
            likes: self.likes,
            comments: self.comments,
        });
    }
}

#[cfg(test)]
#[path = "posts_test.rs"]
mod tests;
