//! The observable metric store.
//!
//! [`MetricStore`] exclusively owns the tracked-post collection and the single
//! [`CreatorProfile`]. Readers take cheap `Arc` snapshots or subscribe to a
//! `watch` channel; writers go through [`MetricStore::update_posts`] or
//! [`MetricStore::update_profile`], which serialize on an internal lock and
//! publish a whole new snapshot only after it has been persisted.

use std::sync::Arc;

use reeltrack_core::{timestamp, CreatorProfile, TrackedPost, DEFAULT_CREATOR_HANDLE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::{watch, Mutex};

use crate::kv::KeyValueStore;
use crate::StoreError;

/// Key holding the tracked-post collection (newest first).
pub const POSTS_KEY: &str = "posts";
/// Key holding the creator profile.
pub const CREATOR_KEY: &str = "creator";

/// Immutable view of the store at one point in time.
#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    pub posts: Arc<Vec<TrackedPost>>,
    pub profile: Arc<CreatorProfile>,
}

pub struct MetricStore {
    kv: Arc<dyn KeyValueStore>,
    state: watch::Sender<StoreSnapshot>,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for MetricStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.state.borrow();
        f.debug_struct("MetricStore")
            .field("posts", &snapshot.posts.len())
            .field("handle", &snapshot.profile.handle)
            .finish_non_exhaustive()
    }
}

impl MetricStore {
    /// Load the store from `kv`, falling back to an empty collection and a
    /// default profile for keys that were never saved.
    ///
    /// Derived profile totals are recomputed from the loaded posts.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a stored document cannot be read or decoded.
    pub fn open(kv: Arc<dyn KeyValueStore>) -> Result<Self, StoreError> {
        let posts: Vec<TrackedPost> = load_or(kv.as_ref(), POSTS_KEY, Vec::new)?;
        let mut profile: CreatorProfile = load_or(kv.as_ref(), CREATOR_KEY, || {
            CreatorProfile::new(DEFAULT_CREATOR_HANDLE, timestamp::now_millis())
        })?;
        profile.recompute(&posts);

        tracing::debug!(
            posts = posts.len(),
            handle = %profile.handle,
            "opened metric store"
        );

        let (state, _) = watch::channel(StoreSnapshot {
            posts: Arc::new(posts),
            profile: Arc::new(profile),
        });

        Ok(Self {
            kv,
            state,
            write_lock: Mutex::new(()),
        })
    }

    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn posts(&self) -> Arc<Vec<TrackedPost>> {
        Arc::clone(&self.state.borrow().posts)
    }

    #[must_use]
    pub fn profile(&self) -> Arc<CreatorProfile> {
        Arc::clone(&self.state.borrow().profile)
    }

    /// Subscribe to every published snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.state.subscribe()
    }

    /// Atomically read-modify-write the post collection.
    ///
    /// `mutate` runs against a private copy of the current collection while
    /// the write lock is held. If it returns `Err`, or leaves the collection
    /// equal to what it was, nothing is persisted or published. Otherwise the
    /// profile is recomputed, both documents are saved, and the new snapshot
    /// replaces the old one in a single step.
    ///
    /// The posts document is written last and is the commit point. A failed
    /// creator write leaves the stored posts untouched; a creator document
    /// that got ahead of its posts is harmless because [`MetricStore::open`]
    /// recomputes the derived totals.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or [`StoreError`] (converted into `E`) if
    /// persisting fails. In both cases the visible state is unchanged.
    pub async fn update_posts<T, E, F>(&self, mutate: F) -> Result<T, E>
    where
        F: FnOnce(&mut Vec<TrackedPost>) -> Result<T, E>,
        E: From<StoreError>,
    {
        let _guard = self.write_lock.lock().await;
        let current = self.snapshot();

        let mut posts = current.posts.as_ref().clone();
        let out = mutate(&mut posts)?;
        if posts == *current.posts {
            return Ok(out);
        }

        let mut profile = current.profile.as_ref().clone();
        profile.recompute(&posts);

        self.persist(CREATOR_KEY, &profile).await?;
        self.persist(POSTS_KEY, &posts).await?;

        self.state.send_replace(StoreSnapshot {
            posts: Arc::new(posts),
            profile: Arc::new(profile),
        });
        Ok(out)
    }

    /// Atomically edit the creator profile. Derived totals are recomputed
    /// afterwards, so edits to them are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the profile cannot be persisted.
    pub async fn update_profile<F>(&self, edit: F) -> Result<Arc<CreatorProfile>, StoreError>
    where
        F: FnOnce(&mut CreatorProfile),
    {
        let _guard = self.write_lock.lock().await;
        let current = self.snapshot();

        let mut profile = current.profile.as_ref().clone();
        edit(&mut profile);
        profile.recompute(&current.posts);
        if profile == *current.profile {
            return Ok(current.profile);
        }

        self.persist(CREATOR_KEY, &profile).await?;

        let profile = Arc::new(profile);
        self.state.send_replace(StoreSnapshot {
            posts: current.posts,
            profile: Arc::clone(&profile),
        });
        Ok(profile)
    }

    /// Serialize `value` and hand it to the backend on the blocking pool.
    async fn persist<T: Serialize>(&self, key: &'static str, value: &T) -> Result<(), StoreError> {
        let doc = serde_json::to_value(value).map_err(|source| StoreError::Serialize {
            key: key.to_string(),
            source,
        })?;
        let kv = Arc::clone(&self.kv);
        tokio::task::spawn_blocking(move || kv.save(key, &doc))
            .await
            .map_err(|source| StoreError::Task {
                key: key.to_string(),
                source,
            })?
    }
}

fn load_or<T, F>(kv: &dyn KeyValueStore, key: &str, default: F) -> Result<T, StoreError>
where
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    match kv.load(key)? {
        Some(value) => serde_json::from_value(value).map_err(|source| StoreError::Deserialize {
            key: key.to_string(),
            source,
        }),
        None => Ok(default()),
    }
}

