//! In-memory document storage.
//!
//! Thread-safe implementation of [`StorageProvider`] on a `HashMap` behind a tokio
//! `RwLock`. Every conditional write takes the write lock once and compares the stamp
//! while holding it, so two racing writers can never both observe the same stamp and
//! both succeed.
//!
//! # Performance Characteristics
//!
//! * PUT/GET/DELETE and their conditional forms: O(1) average case
//! * LIST with pagination: O(n log n) in the size of the collection (ids are sorted)
//! * EXISTS/COUNT: O(1)
//!
//! # Example Usage
//!
//! ```rust
//! use movie_catalog::storage::{InMemoryStorage, StorageKey, StorageProvider};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = InMemoryStorage::new();
//!
//! let key = StorageKey::new("Actor", "a1");
//! storage.put(key.clone(), json!({"id": "a1", "name": "Carl Weathers"})).await?;
//!
//! assert!(storage.get(key.clone()).await?.is_some());
//! assert!(storage.delete(key).await?);
//! # Ok(())
//! # }
//! ```

use crate::storage::{
    ConditionalWrite, StorageError, StorageKey, StoragePrefix, StorageProvider, stamp_of,
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Thread-safe in-memory storage.
///
/// Layout: `collection` → `id` → `document`.
#[derive(Clone)]
pub struct InMemoryStorage {
    data: Arc<RwLock<HashMap<String, HashMap<String, Value>>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

/// The stamp of `existing` when it differs from `expected`, `None` when it matches.
fn stamp_mismatch(
    key: &StorageKey,
    existing: &Value,
    expected: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>, StorageError> {
    let current = stamp_of(existing).ok_or_else(|| StorageError::missing_stamp(key))?;
    Ok((current != expected).then_some(current))
}

impl StorageProvider for InMemoryStorage {
    type Error = StorageError;

    async fn put(&self, key: StorageKey, data: Value) -> Result<Value, Self::Error> {
        let mut data_guard = self.data.write().await;
        data_guard
            .entry(key.collection().to_string())
            .or_default()
            .insert(key.id().to_string(), data.clone());
        Ok(data)
    }

    async fn put_if_unmodified(
        &self,
        key: StorageKey,
        data: Value,
        expected: DateTime<Utc>,
    ) -> Result<ConditionalWrite<Value>, Self::Error> {
        let mut data_guard = self.data.write().await;

        let Some(existing) = data_guard
            .get_mut(key.collection())
            .and_then(|docs| docs.get_mut(key.id()))
        else {
            return Ok(ConditionalWrite::Missing);
        };

        if let Some(current) = stamp_mismatch(&key, existing, expected)? {
            return Ok(ConditionalWrite::StampMismatch { current });
        }

        *existing = data.clone();
        Ok(ConditionalWrite::Applied(data))
    }

    async fn put_if_absent(&self, key: StorageKey, data: Value) -> Result<bool, Self::Error> {
        let mut data_guard = self.data.write().await;
        let docs = data_guard.entry(key.collection().to_string()).or_default();
        if docs.contains_key(key.id()) {
            return Ok(false);
        }
        docs.insert(key.id().to_string(), data);
        Ok(true)
    }

    async fn get(&self, key: StorageKey) -> Result<Option<Value>, Self::Error> {
        let data_guard = self.data.read().await;
        Ok(data_guard
            .get(key.collection())
            .and_then(|docs| docs.get(key.id()))
            .cloned())
    }

    async fn delete(&self, key: StorageKey) -> Result<bool, Self::Error> {
        let mut data_guard = self.data.write().await;
        Ok(data_guard
            .get_mut(key.collection())
            .is_some_and(|docs| docs.remove(key.id()).is_some()))
    }

    async fn delete_if_unmodified(
        &self,
        key: StorageKey,
        expected: DateTime<Utc>,
    ) -> Result<ConditionalWrite<()>, Self::Error> {
        let mut data_guard = self.data.write().await;

        let Some(docs) = data_guard.get_mut(key.collection()) else {
            return Ok(ConditionalWrite::Missing);
        };
        let Some(existing) = docs.get(key.id()) else {
            return Ok(ConditionalWrite::Missing);
        };

        if let Some(current) = stamp_mismatch(&key, existing, expected)? {
            return Ok(ConditionalWrite::StampMismatch { current });
        }

        docs.remove(key.id());
        Ok(ConditionalWrite::Applied(()))
    }

    async fn list(
        &self,
        prefix: StoragePrefix,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<(StorageKey, Value)>, Self::Error> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let data_guard = self.data.read().await;
        let Some(docs) = data_guard.get(prefix.collection()) else {
            return Ok(Vec::new());
        };

        // Sorted for consistent pagination
        let mut ids: Vec<_> = docs.keys().collect();
        ids.sort();

        Ok(ids
            .into_iter()
            .skip(offset)
            .take(limit)
            .filter_map(|id| {
                docs.get(id)
                    .map(|doc| (StorageKey::new(prefix.collection(), id), doc.clone()))
            })
            .collect())
    }

    async fn exists(&self, key: StorageKey) -> Result<bool, Self::Error> {
        let data_guard = self.data.read().await;
        Ok(data_guard
            .get(key.collection())
            .is_some_and(|docs| docs.contains_key(key.id())))
    }

    async fn count(&self, prefix: StoragePrefix) -> Result<usize, Self::Error> {
        let data_guard = self.data.read().await;
        Ok(data_guard
            .get(prefix.collection())
            .map(HashMap::len)
            .unwrap_or(0))
    }

    async fn clear(&self) -> Result<(), Self::Error> {
        self.data.write().await.clear();
        Ok(())
    }
}
