//! Query-time summary statistics over the tracked-post collection.

use chrono::{DateTime, Duration, Utc};
use reeltrack_core::TrackedPost;

/// Number of posts listed in [`AnalyticsSnapshot::recent_activity`].
pub const RECENT_ACTIVITY_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsSnapshot {
    pub total_views: u64,
    pub total_posts: u64,
    /// Day-over-day change in snapshot views, in percent. Zero when the
    /// previous day has no views to compare against.
    pub view_growth_percent: f64,
    pub top_post: Option<TrackedPost>,
    pub recent_activity: Vec<TrackedPost>,
}

/// Derive analytics from `posts` as of `now`.
///
/// Never reorders `posts`; sorting happens on a private list of references.
#[must_use]
pub fn compute_analytics(posts: &[TrackedPost], now: DateTime<Utc>) -> AnalyticsSnapshot {
    let day = Duration::hours(24);
    let recent_start = now - day;
    let previous_start = recent_start - day;

    let mut recent: u64 = 0;
    let mut previous: u64 = 0;
    for snapshot in posts.iter().flat_map(|p| p.history.iter()) {
        if snapshot.timestamp >= recent_start && snapshot.timestamp < now {
            recent = recent.saturating_add(snapshot.views);
        } else if snapshot.timestamp >= previous_start && snapshot.timestamp < recent_start {
            previous = previous.saturating_add(snapshot.views);
        }
    }

    AnalyticsSnapshot {
        total_views: posts.iter().map(|p| p.views).fold(0, u64::saturating_add),
        total_posts: u64::try_from(posts.len()).unwrap_or(u64::MAX),
        view_growth_percent: growth_percent(recent, previous),
        top_post: top_post(posts).cloned(),
        recent_activity: recent_activity(posts),
    }
}

#[allow(clippy::cast_precision_loss)]
fn growth_percent(recent: u64, previous: u64) -> f64 {
    if previous == 0 {
        return 0.0;
    }
    (recent as f64 - previous as f64) / previous as f64 * 100.0
}

/// Highest view count; the earliest post in collection order wins ties.
fn top_post(posts: &[TrackedPost]) -> Option<&TrackedPost> {
    posts.iter().fold(None, |best, post| match best {
        Some(b) if b.views >= post.views => Some(b),
        _ => Some(post),
    })
}

fn recent_activity(posts: &[TrackedPost]) -> Vec<TrackedPost> {
    let mut by_update: Vec<&TrackedPost> = posts.iter().collect();
    // stable: equal timestamps keep collection order
    by_update.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
    by_update
        .into_iter()
        .take(RECENT_ACTIVITY_LIMIT)
        .cloned()
        .collect()
}

#[cfg(test)]
#[path = "analytics_test.rs"]
mod tests;
