use std::{collections::HashMap, path::{Path, PathBuf}, sync::Arc};
use tokio::sync::RwLock;

use crate::errors::StoreError;
use crate::storage::persistence;
use crate::storage::validation::{validate_json, KeyPolicy};

/// Concurrent map of key -> JSON text, persisted as a single JSON file.
///
/// Validated operations (`create`, `read`, `update`, `delete`) enforce the
/// key policy and JSON syntax; `get`/`set` bypass validation and are meant
/// for administrative paths such as restoring from disk. Values are stored
/// exactly as supplied.
///
/// Every operation takes the lock once and releases it before returning,
/// so each one is atomic with respect to all others. Clones share the same
/// underlying map.
#[derive(Clone, Debug)]
pub struct JsonStore {
    inner: Arc<RwLock<HashMap<String, String>>>,
    file_path: PathBuf,
    policy: KeyPolicy,
}

impl JsonStore {
    /// Empty store persisting to `path`, with the bounded key policy.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self::with_policy(path, KeyPolicy::default())
    }

    pub fn with_policy<P: Into<PathBuf>>(path: P, policy: KeyPolicy) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            file_path: path.into(),
            policy,
        }
    }

    /// Build a store and populate it from `path`. The handle is returned
    /// even when the load fails, so the caller decides whether that is fatal;
    /// a failed load leaves the store empty.
    pub async fn open<P: Into<PathBuf>>(
        path: P,
        policy: KeyPolicy,
    ) -> (Arc<Self>, Result<usize, StoreError>) {
        let store = Self::with_policy(path, policy);
        let loaded = store.load().await;
        (Arc::new(store), loaded)
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn policy(&self) -> KeyPolicy {
        self.policy
    }

    pub(crate) fn map(&self) -> &RwLock<HashMap<String, String>> {
        &self.inner
    }

    /// Insert a new entry; the key must not exist yet.
    pub async fn create(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.policy.check(key)?;
        let mut map = self.inner.write().await;
        if map.contains_key(key) {
            return Err(StoreError::duplicate(key));
        }
        validate_json(value)?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// Stored text for `key`, verbatim.
    pub async fn read(&self, key: &str) -> Result<String, StoreError> {
        self.policy.check(key)?;
        let map = self.inner.read().await;
        map.get(key).cloned().ok_or_else(|| StoreError::not_found(key))
    }

    /// Overwrite an existing entry; the key must already exist.
    pub async fn update(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.policy.check(key)?;
        let mut map = self.inner.write().await;
        let slot = map.get_mut(key).ok_or_else(|| StoreError::not_found(key))?;
        validate_json(value)?;
        *slot = value.to_string();
        Ok(())
    }

    pub async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.policy.check(key)?;
        let mut map = self.inner.write().await;
        map.remove(key).map(|_| ()).ok_or_else(|| StoreError::not_found(key))
    }

    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }

    /// Unvalidated lookup.
    pub async fn get(&self, key: &str) -> Option<String> {
        let map = self.inner.read().await;
        map.get(key).cloned()
    }

    /// Unvalidated upsert. Not for untrusted input.
    pub async fn set(&self, key: String, value: String) {
        let mut map = self.inner.write().await;
        map.insert(key, value);
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.inner.read().await.contains_key(key)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// All keys, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let map = self.inner.read().await;
        let mut keys: Vec<String> = map.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Write the whole store to its file.
    pub async fn save(&self) -> Result<(), StoreError> {
        persistence::save(self).await
    }

    /// Upsert every entry found in the store file; returns how many were read.
    pub async fn load(&self) -> Result<usize, StoreError> {
        persistence::load(self).await
    }
}
