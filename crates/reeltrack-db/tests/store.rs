//! Integration tests for `MetricStore`.
//!
//! Cover default loading, atomic read-modify-write, persistence round trips
//! through the JSON-file backend, and the guarantee that failed or no-op
//! mutations leave both the visible state and the backend untouched.

use std::sync::{Arc, Mutex};
use std::thread::ThreadId;

use reeltrack_core::{timestamp, MetricDelta, NewPost, TrackedPost};
use reeltrack_db::{
    JsonFileKv, KeyValueStore, MemoryKv, MetricStore, StoreError, CREATOR_KEY, POSTS_KEY,
};
use serde_json::Value;

fn post(shortcode: &str, views: u64) -> TrackedPost {
    TrackedPost::new(
        NewPost {
            shortcode: shortcode.to_string(),
            source_url: format!("https://www.instagram.com/reel/{shortcode}/"),
            owner_handle: format!("user_{shortcode}"),
            caption: "caption".to_string(),
            image_ref: String::new(),
            views,
            likes: views / 10,
            comments: views / 50,
        },
        timestamp::now_millis(),
    )
}

/// Backend whose writes always fail.
struct ReadOnlyKv;

impl KeyValueStore for ReadOnlyKv {
    fn load(&self, _key: &str) -> Result<Option<Value>, StoreError> {
        Ok(None)
    }

    fn save(&self, key: &str, _value: &Value) -> Result<(), StoreError> {
        Err(StoreError::Io {
            path: key.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        })
    }
}

/// Delegates to a shared `MemoryKv` but rejects writes to one key.
struct FailingKeyKv {
    inner: Arc<MemoryKv>,
    failing_key: &'static str,
}

impl KeyValueStore for FailingKeyKv {
    fn load(&self, key: &str) -> Result<Option<Value>, StoreError> {
        self.inner.load(key)
    }

    fn save(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        if key == self.failing_key {
            return Err(StoreError::Io {
                path: key.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::StorageFull, "disk full"),
            });
        }
        self.inner.save(key, value)
    }
}

/// Records the thread each save runs on.
#[derive(Default)]
struct ThreadRecordingKv {
    inner: MemoryKv,
    save_threads: Mutex<Vec<ThreadId>>,
}

impl KeyValueStore for ThreadRecordingKv {
    fn load(&self, key: &str) -> Result<Option<Value>, StoreError> {
        self.inner.load(key)
    }

    fn save(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        self.save_threads
            .lock()
            .unwrap()
            .push(std::thread::current().id());
        self.inner.save(key, value)
    }
}

/// Store backed by `inner` holding a single committed post `AAA`.
async fn seeded(inner: &Arc<MemoryKv>) {
    let store = MetricStore::open(Arc::clone(inner) as Arc<dyn KeyValueStore>).unwrap();
    store
        .update_posts(|posts| {
            posts.push(post("AAA", 1_000));
            Ok::<_, StoreError>(())
        })
        .await
        .unwrap();
}

#[derive(Debug, thiserror::Error)]
enum TestError {
    #[error("rejected")]
    Rejected,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[test]
fn empty_backend_opens_with_defaults() {
    let store = MetricStore::open(Arc::new(MemoryKv::new())).unwrap();
    assert!(store.posts().is_empty());
    let profile = store.profile();
    assert_eq!(profile.handle, "creator");
    assert_eq!(profile.total_posts, 0);
    assert!(profile.approved);
}

#[tokio::test]
async fn update_persists_and_recomputes_profile() {
    let kv = Arc::new(MemoryKv::new());
    let store = MetricStore::open(kv.clone()).unwrap();

    store
        .update_posts(|posts| {
            posts.insert(0, post("AAA", 4_000));
            Ok::<_, StoreError>(())
        })
        .await
        .unwrap();

    assert_eq!(store.posts().len(), 1);
    assert_eq!(store.profile().total_views, 4_000);
    assert!(kv.raw(POSTS_KEY).unwrap().contains("\"shortcode\":\"AAA\""));
    assert!(kv.raw(CREATOR_KEY).unwrap().contains("\"totalViews\":4000"));
}

#[tokio::test]
async fn failed_closure_leaves_everything_unchanged() {
    let kv = Arc::new(MemoryKv::new());
    let store = MetricStore::open(kv.clone()).unwrap();

    let result = store
        .update_posts(|posts| {
            posts.push(post("BBB", 10));
            Err::<(), _>(TestError::Rejected)
        })
        .await;

    assert!(matches!(result, Err(TestError::Rejected)));
    assert!(store.posts().is_empty());
    assert_eq!(kv.save_count(), 0);
}

#[tokio::test]
async fn unchanged_collection_is_not_persisted_or_published() {
    let kv = Arc::new(MemoryKv::new());
    let store = MetricStore::open(kv.clone()).unwrap();
    store
        .update_posts(|posts| {
            posts.push(post("CCC", 10));
            Ok::<_, StoreError>(())
        })
        .await
        .unwrap();
    let saves = kv.save_count();
    let before = kv.raw(POSTS_KEY);

    let mut rx = store.subscribe();
    rx.borrow_and_update();
    store
        .update_posts(|posts| {
            posts.retain(|p| p.shortcode != "missing");
            Ok::<_, StoreError>(())
        })
        .await
        .unwrap();

    assert_eq!(kv.save_count(), saves);
    assert_eq!(kv.raw(POSTS_KEY), before);
    assert!(!rx.has_changed().unwrap());
}

#[tokio::test]
async fn persistence_failure_keeps_previous_snapshot() {
    let store = MetricStore::open(Arc::new(ReadOnlyKv)).unwrap();
    let result = store
        .update_posts(|posts| {
            posts.push(post("DDD", 10));
            Ok::<_, TestError>(())
        })
        .await;

    assert!(matches!(result, Err(TestError::Store(StoreError::Io { .. }))));
    assert!(store.posts().is_empty());
    assert_eq!(store.profile().total_views, 0);
}

#[tokio::test]
async fn subscribers_see_each_published_snapshot() {
    let store = MetricStore::open(Arc::new(MemoryKv::new())).unwrap();
    let mut rx = store.subscribe();

    store
        .update_posts(|posts| {
            posts.push(post("EEE", 1_000));
            Ok::<_, StoreError>(())
        })
        .await
        .unwrap();

    assert!(rx.has_changed().unwrap());
    let seen = rx.borrow_and_update().clone();
    assert_eq!(seen.posts.len(), 1);
    assert_eq!(seen.profile.total_views, 1_000);
}

#[tokio::test]
async fn concurrent_writers_are_serialized() {
    let store = Arc::new(MetricStore::open(Arc::new(MemoryKv::new())).unwrap());

    let mut handles = Vec::new();
    for i in 0..20u64 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store
                .update_posts(|posts| {
                    posts.push(post(&format!("P{i}"), 100));
                    Ok::<_, StoreError>(())
                })
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(store.posts().len(), 20);
    assert_eq!(store.profile().total_views, 2_000);
}

#[tokio::test]
async fn json_file_backend_round_trips_posts_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let kv: Arc<dyn KeyValueStore> = Arc::new(JsonFileKv::new(dir.path()));

    let store = MetricStore::open(Arc::clone(&kv)).unwrap();
    store
        .update_posts(|posts| {
            let mut p = post("FFF", 5_000);
            p.apply_growth(
                MetricDelta {
                    views: 250,
                    likes: 20,
                    comments: 2,
                },
                timestamp::now_millis(),
            );
            posts.insert(0, p);
            posts.insert(0, post("GGG", 7));
            Ok::<_, StoreError>(())
        })
        .await
        .unwrap();
    let written = store.snapshot();

    let reopened = MetricStore::open(kv).unwrap();
    assert_eq!(*reopened.posts(), *written.posts);
    assert_eq!(*reopened.profile(), *written.profile);
    let order: Vec<_> = reopened.posts().iter().map(|p| p.shortcode.clone()).collect();
    assert_eq!(order, ["GGG", "FFF"]);
}

#[tokio::test]
async fn update_profile_cannot_override_derived_totals() {
    let store = MetricStore::open(Arc::new(MemoryKv::new())).unwrap();
    store
        .update_posts(|posts| {
            posts.push(post("HHH", 3_000));
            Ok::<_, StoreError>(())
        })
        .await
        .unwrap();

    let profile = store
        .update_profile(|p| {
            p.handle = "renamed".to_string();
            p.total_views = 1;
        })
        .await
        .unwrap();

    assert_eq!(profile.handle, "renamed");
    assert_eq!(profile.total_views, 3_000);
    assert_eq!(store.profile().handle, "renamed");
}

#[tokio::test]
async fn failed_creator_write_leaves_stored_posts_untouched() {
    let inner = Arc::new(MemoryKv::new());
    seeded(&inner).await;
    let committed = inner.raw(POSTS_KEY);

    let store = MetricStore::open(Arc::new(FailingKeyKv {
        inner: Arc::clone(&inner),
        failing_key: CREATOR_KEY,
    }))
    .unwrap();
    let result = store
        .update_posts(|posts| {
            posts.insert(0, post("BBB", 5_000));
            Ok::<_, StoreError>(())
        })
        .await;

    assert!(matches!(result, Err(StoreError::Io { .. })));
    assert_eq!(store.posts().len(), 1);
    assert_eq!(inner.raw(POSTS_KEY), committed);

    let reopened = MetricStore::open(inner).unwrap();
    let codes: Vec<_> = reopened.posts().iter().map(|p| p.shortcode.clone()).collect();
    assert_eq!(codes, ["AAA"]);
    assert_eq!(reopened.profile().total_views, 1_000);
}

#[tokio::test]
async fn failed_posts_write_reopens_with_consistent_totals() {
    let inner = Arc::new(MemoryKv::new());
    seeded(&inner).await;

    let store = MetricStore::open(Arc::new(FailingKeyKv {
        inner: Arc::clone(&inner),
        failing_key: POSTS_KEY,
    }))
    .unwrap();
    let result = store
        .update_posts(|posts| {
            posts.insert(0, post("CCC", 9_000));
            Ok::<_, StoreError>(())
        })
        .await;
    assert!(result.is_err());
    assert_eq!(store.profile().total_views, 1_000);

    // the creator document may be ahead, but totals follow the stored posts
    let reopened = MetricStore::open(inner).unwrap();
    assert_eq!(reopened.posts().len(), 1);
    assert_eq!(reopened.profile().total_posts, 1);
    assert_eq!(reopened.profile().total_views, 1_000);
}

#[tokio::test]
async fn saves_run_off_the_async_runtime_thread() {
    let kv = Arc::new(ThreadRecordingKv::default());
    let store = MetricStore::open(Arc::clone(&kv) as Arc<dyn KeyValueStore>).unwrap();

    store
        .update_posts(|posts| {
            posts.push(post("DDD", 10));
            Ok::<_, StoreError>(())
        })
        .await
        .unwrap();

    let runtime_thread = std::thread::current().id();
    let save_threads = kv.save_threads.lock().unwrap();
    assert_eq!(save_threads.len(), 2);
    assert!(save_threads.iter().all(|id| *id != runtime_thread));
}
