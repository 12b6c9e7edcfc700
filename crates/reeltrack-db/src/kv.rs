//! Durable key-value backends for the metric store.
//!
//! Values are JSON documents. [`JsonFileKv`] keeps one `<key>.json` file per
//! key inside a data directory and replaces files atomically via rename;
//! [`MemoryKv`] keeps serialized documents in memory for tests and dry runs.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde_json::Value;

use crate::StoreError;

/// Generic get/set persistence collaborator.
///
/// Methods are blocking. [`crate::MetricStore`] calls `save` on tokio's
/// blocking pool and `load` only while opening, so implementations may do
/// plain file or network I/O.
pub trait KeyValueStore: Send + Sync {
    /// Load the document stored under `key`, or `None` if nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be read or holds invalid JSON.
    fn load(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Replace the document stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be written.
    fn save(&self, key: &str, value: &Value) -> Result<(), StoreError>;
}

/// One pretty-printed JSON file per key under `dir`.
#[derive(Debug, Clone)]
pub struct JsonFileKv {
    dir: PathBuf,
}

impl JsonFileKv {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for JsonFileKv {
    fn load(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let path = self.path_for(key);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Deserialize {
                key: key.to_string(),
                source,
            })
    }

    fn save(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        let io_err = |path: &Path| {
            let path = path.display().to_string();
            move |source| StoreError::Io { path, source }
        };

        std::fs::create_dir_all(&self.dir).map_err(io_err(&self.dir))?;

        let body = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Serialize {
            key: key.to_string(),
            source,
        })?;

        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        std::fs::write(&tmp, body).map_err(io_err(&tmp))?;
        std::fs::rename(&tmp, &path).map_err(io_err(&path))?;

        tracing::trace!(key, path = %path.display(), "saved store document");
        Ok(())
    }
}

/// In-memory backend. Documents are kept in serialized form so tests can
/// compare exactly what would have been written.
#[derive(Debug, Default)]
pub struct MemoryKv {
    docs: Mutex<HashMap<String, String>>,
    saves: Mutex<usize>,
}

impl MemoryKv {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The serialized document under `key`, if any.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.docs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Number of successful `save` calls so far.
    #[must_use]
    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryKv {
    fn load(&self, key: &str) -> Result<Option<Value>, StoreError> {
        self.raw(key)
            .map(|raw| {
                serde_json::from_str(&raw).map_err(|source| StoreError::Deserialize {
                    key: key.to_string(),
                    source,
                })
            })
            .transpose()
    }

    fn save(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value).map_err(|source| StoreError::Serialize {
            key: key.to_string(),
            source,
        })?;
        self.docs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), raw);
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn json_file_kv_returns_none_for_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let kv = JsonFileKv::new(dir.path());
        assert!(kv.load("posts").unwrap().is_none());
    }

    #[test]
    fn json_file_kv_round_trips_documents() {
        let dir = tempfile::tempdir().unwrap();
        let kv = JsonFileKv::new(dir.path().join("nested"));
        let doc = json!({"views": 10, "at": "2024-05-01T12:00:00.000Z"});
        kv.save("creator", &doc).unwrap();
        assert_eq!(kv.load("creator").unwrap(), Some(doc));
        assert!(dir.path().join("nested/creator.json").exists());
        assert!(!dir.path().join("nested/.creator.json.tmp").exists());
    }

    #[test]
    fn json_file_kv_reports_corrupt_documents() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("posts.json"), "{not json").unwrap();
        let kv = JsonFileKv::new(dir.path());
        let err = kv.load("posts").unwrap_err();
        assert!(matches!(err, StoreError::Deserialize { ref key, .. } if key == "posts"));
    }

    #[test]
    fn memory_kv_counts_saves_and_exposes_raw_form() {
        let kv = MemoryKv::new();
        assert_eq!(kv.save_count(), 0);
        kv.save("posts", &json!([])).unwrap();
        assert_eq!(kv.save_count(), 1);
        assert_eq!(kv.raw("posts").as_deref(), Some("[]"));
        assert_eq!(kv.load("posts").unwrap(), Some(json!([])));
    }
}
