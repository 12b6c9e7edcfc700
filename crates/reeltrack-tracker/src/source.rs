//! Where engagement numbers come from.
//!
//! The growth simulator, submission pipeline and force refresh never roll dice
//! themselves; they ask a [`MetricsSource`]. [`SimulatedSource`] is the only
//! implementation today and stands in for a real platform fetcher.

use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reeltrack_core::{MetricDelta, TrackedPost};

/// Probability that a scheduled tick does anything at all.
pub const TICK_PROBABILITY: f64 = 0.3;
/// Probability that a given post is refreshed during an active tick.
pub const POST_UPDATE_PROBABILITY: f64 = 0.2;

const INITIAL_VIEWS: std::ops::Range<u64> = 1_000..501_000;
const TICK_VIEWS: std::ops::Range<u64> = 100..1_100;
const TICK_LIKES: std::ops::Range<u64> = 10..60;
const TICK_COMMENTS: std::ops::Range<u64> = 1..21;
const REFRESH_VIEWS: std::ops::Range<u64> = 1_000..6_000;

const SAMPLE_CAPTION: &str = "Sample Instagram reel caption...";

/// Metadata and counters observed for a newly submitted post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricReading {
    pub owner_handle: String,
    pub caption: String,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
}

pub trait MetricsSource: Send + Sync {
    /// Baseline reading for a post being admitted.
    fn initial_reading(&self, shortcode: &str) -> MetricReading;

    /// Whether the current scheduled tick should refresh anything.
    fn tick_due(&self) -> bool;

    /// Growth for `post` during an active tick, or `None` to leave it alone.
    fn tick_increment(&self, post: &TrackedPost) -> Option<MetricDelta>;

    /// Growth for `post` during a user-triggered force refresh. Always applied.
    fn refresh_boost(&self, post: &TrackedPost) -> MetricDelta;
}

/// Pseudo-random source over a seedable RNG.
#[derive(Debug)]
pub struct SimulatedSource {
    rng: Mutex<StdRng>,
}

impl SimulatedSource {
    /// Reproducible source for tests and demos.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    #[must_use]
    pub fn from_os_rng() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Seeded when `seed` is given, entropy-seeded otherwise.
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_os_rng, Self::from_seed)
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }
}

impl MetricsSource for SimulatedSource {
    fn initial_reading(&self, shortcode: &str) -> MetricReading {
        let views = self.with_rng(|rng| rng.random_range(INITIAL_VIEWS));
        MetricReading {
            owner_handle: format!("user_{}", shortcode.chars().take(6).collect::<String>()),
            caption: SAMPLE_CAPTION.to_string(),
            views,
            likes: views / 10,
            comments: views / 50,
        }
    }

    fn tick_due(&self) -> bool {
        self.with_rng(|rng| rng.random_bool(TICK_PROBABILITY))
    }

    fn tick_increment(&self, _post: &TrackedPost) -> Option<MetricDelta> {
        self.with_rng(|rng| {
            if !rng.random_bool(POST_UPDATE_PROBABILITY) {
                return None;
            }
            Some(MetricDelta {
                views: rng.random_range(TICK_VIEWS),
                likes: rng.random_range(TICK_LIKES),
                comments: rng.random_range(TICK_COMMENTS),
            })
        })
    }

    fn refresh_boost(&self, _post: &TrackedPost) -> MetricDelta {
        let views = self.with_rng(|rng| rng.random_range(REFRESH_VIEWS));
        MetricDelta {
            views,
            likes: views / 10,
            comments: views / 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use reeltrack_core::{timestamp, NewPost};

    use super::*;

    fn post() -> TrackedPost {
        TrackedPost::new(
            NewPost {
                shortcode: "ABC".to_string(),
                source_url: String::new(),
                owner_handle: String::new(),
                caption: String::new(),
                image_ref: String::new(),
                views: 0,
                likes: 0,
                comments: 0,
            },
            timestamp::now_millis(),
        )
    }

    #[test]
    fn same_seed_yields_same_sequence() {
        let a = SimulatedSource::from_seed(7);
        let b = SimulatedSource::from_seed(7);
        for _ in 0..10 {
            assert_eq!(a.initial_reading("XYZ"), b.initial_reading("XYZ"));
            assert_eq!(a.tick_due(), b.tick_due());
        }
    }

    #[test]
    fn initial_reading_respects_ranges_and_ratios() {
        let source = SimulatedSource::from_seed(1);
        for _ in 0..200 {
            let reading = source.initial_reading("ABCDEFGH");
            assert!(INITIAL_VIEWS.contains(&reading.views));
            assert_eq!(reading.likes, reading.views / 10);
            assert_eq!(reading.comments, reading.views / 50);
            assert_eq!(reading.owner_handle, "user_ABCDEF");
        }
    }

    #[test]
    fn tick_increments_stay_in_range() {
        let source = SimulatedSource::from_seed(2);
        let post = post();
        let mut applied = 0;
        for _ in 0..500 {
            if let Some(delta) = source.tick_increment(&post) {
                applied += 1;
                assert!(TICK_VIEWS.contains(&delta.views));
                assert!(TICK_LIKES.contains(&delta.likes));
                assert!(TICK_COMMENTS.contains(&delta.comments));
            }
        }
        // roughly one in five posts is refreshed
        assert!((50..=150).contains(&applied), "applied = {applied}");
    }

    #[test]
    fn tick_gate_fires_roughly_thirty_percent_of_the_time() {
        let source = SimulatedSource::from_seed(3);
        let due = (0..1_000).filter(|_| source.tick_due()).count();
        assert!((220..=380).contains(&due), "due = {due}");
    }

    #[test]
    fn refresh_boost_derives_likes_and_comments_from_views() {
        let source = SimulatedSource::from_seed(4);
        let post = post();
        for _ in 0..200 {
            let boost = source.refresh_boost(&post);
            assert!(REFRESH_VIEWS.contains(&boost.views));
            assert_eq!(boost.likes, boost.views / 10);
            assert_eq!(boost.comments, boost.views / 50);
        }
    }
}
