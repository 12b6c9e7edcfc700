//! Persistence and the observable metric store.

pub mod kv;
pub mod store;

use thiserror::Error;

pub use kv::{JsonFileKv, KeyValueStore, MemoryKv};
pub use store::{MetricStore, StoreSnapshot, CREATOR_KEY, POSTS_KEY};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to deserialize '{key}': {source}")]
    Deserialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("background write of '{key}' failed: {source}")]
    Task {
        key: String,
        #[source]
        source: tokio::task::JoinError,
    },
}
