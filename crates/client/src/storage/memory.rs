//! In-memory key-value store.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{KeyValueStore, StorageError};

/// Process-local [`KeyValueStore`].
///
/// Individual keys, or the whole store, can be made to fail so callers can
/// exercise their persistence-failure paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    values: HashMap<String, String>,
    failing_keys: HashSet<String>,
    fail_all: bool,
}

impl Inner {
    fn check(&self, key: Option<&str>) -> Result<(), StorageError> {
        if self.fail_all || key.is_some_and(|k| self.failing_keys.contains(k)) {
            return Err(StorageError::Unavailable(format!(
                "injected failure for {}",
                key.unwrap_or("<all keys>")
            )));
        }
        Ok(())
    }
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with values.
    #[must_use]
    pub fn with_values<K, V>(values: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            inner: Mutex::new(Inner {
                values: values
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
                ..Inner::default()
            }),
        }
    }

    /// Make every operation touching `key` fail until [`Self::heal`] is called.
    pub async fn fail_key(&self, key: &str) {
        self.inner.lock().await.failing_keys.insert(key.to_string());
    }

    /// Make every operation fail until [`Self::heal`] is called.
    pub async fn fail_all(&self) {
        self.inner.lock().await.fail_all = true;
    }

    /// Stop injecting failures.
    pub async fn heal(&self) {
        let mut inner = self.inner.lock().await;
        inner.failing_keys.clear();
        inner.fail_all = false;
    }

    /// Snapshot of the stored values, bypassing failure injection.
    pub async fn snapshot(&self) -> HashMap<String, String> {
        self.inner.lock().await.values.clone()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let inner = self.inner.lock().await;
        inner.check(Some(key))?;
        Ok(inner.values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().await;
        inner.check(Some(key))?;
        inner.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().await;
        inner.check(Some(key))?;
        inner.values.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().await;
        inner.check(None)?;
        inner.values.clear();
        Ok(())
    }
}
