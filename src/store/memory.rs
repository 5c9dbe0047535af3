use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, instrument};

use super::KvStore;
use crate::shared::AppError;

/// In-memory implementation of KvStore for development and testing
///
/// Data is stored in memory and will be lost when the application restarts.
pub struct InMemoryKvStore {
    entries: Mutex<HashMap<String, String>>,
}

impl Default for InMemoryKvStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryKvStore {
    /// Creates a new empty in-memory store
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the current number of keys in the store.
    /// Panics if the lock is poisoned.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .expect("in-memory store lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks if a key exists (useful for assertions in tests).
    /// Panics if the lock is poisoned.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries
            .lock()
            .expect("in-memory store lock poisoned")
            .contains_key(key)
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>, AppError> {
        self.entries
            .lock()
            .map_err(|_| AppError::Store("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl KvStore for InMemoryKvStore {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let value = self.lock()?.get(key).cloned();
        debug!(key = %key, found = value.is_some(), "Read key from memory");
        Ok(value)
    }

    #[instrument(skip(self, value))]
    async fn put(&self, key: &str, value: String) -> Result<(), AppError> {
        debug!(key = %key, bytes = value.len(), "Writing key to memory");
        self.lock()?.insert(key.to_string(), value);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> Result<(), AppError> {
        let removed = self.lock()?.remove(key).is_some();
        debug!(key = %key, removed = removed, "Deleted key from memory");
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
