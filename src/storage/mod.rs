//! Storage abstraction for catalogue documents.
//!
//! The `StorageProvider` trait defines plain document storage: JSON values under a
//! `collection/id` key. It knows nothing about movies or actors. The one thing it
//! does know is where a document keeps its *stamp* (`meta.lastModified`), because
//! conditional writes compare on it.
//!
//! # Conditional writes
//!
//! The concurrency guard decides on a fingerprint it read earlier; the write that
//! follows is only sound if nothing else landed in between. `put_if_unmodified` and
//! `delete_if_unmodified` close that gap: they apply the change only if the stored
//! stamp still equals the one the caller evaluated against, atomically with the
//! write itself.
//!
//! ```rust
//! use movie_catalog::storage::{ConditionalWrite, InMemoryStorage, StorageKey, StorageProvider};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = InMemoryStorage::new();
//! let key = StorageKey::new("Movie", "m1");
//!
//! let v1 = json!({"id": "m1", "meta": {"lastModified": "2016-01-06T06:13:09Z"}});
//! storage.put(key.clone(), v1).await?;
//!
//! let v2 = json!({"id": "m1", "meta": {"lastModified": "2016-01-06T06:13:10Z"}});
//! let expected = "2016-01-06T06:13:09Z".parse()?;
//! let outcome = storage.put_if_unmodified(key.clone(), v2.clone(), expected).await?;
//! assert!(outcome.is_applied());
//!
//! // Same expectation again: the stamp has moved on.
//! let outcome = storage.put_if_unmodified(key, v2, expected).await?;
//! assert!(!outcome.is_applied());
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod in_memory;

pub use errors::StorageError;
pub use in_memory::InMemoryStorage;

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;
use std::future::Future;

/// Key of one stored document: `collection/id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey {
    collection: String,
    id: String,
}

impl StorageKey {
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Prefix for listing a whole collection.
    pub fn prefix(collection: impl Into<String>) -> StoragePrefix {
        StoragePrefix {
            collection: collection.into(),
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// A collection to list or count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePrefix {
    collection: String,
}

impl StoragePrefix {
    pub fn collection(&self) -> &str {
        &self.collection
    }
}

impl fmt::Display for StoragePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.collection)
    }
}

/// Outcome of a compare-and-swap on a document's stamp.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionalWrite<T> {
    /// The stored stamp matched and the change was applied.
    Applied(T),
    /// The stored stamp differs from the expected one; nothing was changed.
    StampMismatch { current: DateTime<Utc> },
    /// No document under that key; nothing was changed.
    Missing,
}

impl<T> ConditionalWrite<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, ConditionalWrite::Applied(_))
    }
}

/// The stamp of a stored document: `meta.lastModified`.
pub fn stamp_of(document: &Value) -> Option<DateTime<Utc>> {
    document
        .get("meta")?
        .get("lastModified")?
        .as_str()?
        .parse::<DateTime<Utc>>()
        .ok()
}

/// Pure document storage with stamp-conditional writes.
///
/// - `put` both creates and replaces; whether that is a create or an update is the
///   provider's business.
/// - `put` returns what was stored, so callers need no extra `get`.
/// - `delete` returns whether the document existed (204 vs 404).
/// - The conditional variants must compare and write under one critical section.
pub trait StorageProvider: Send + Sync {
    /// The error type returned by storage operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Store `data` at `key`, replacing any existing document.
    fn put(
        &self,
        key: StorageKey,
        data: Value,
    ) -> impl Future<Output = Result<Value, Self::Error>> + Send;

    /// Store `data` at `key` only if the stored document's stamp equals `expected`.
    ///
    /// A stored document without a readable stamp is an error, not a mismatch.
    fn put_if_unmodified(
        &self,
        key: StorageKey,
        data: Value,
        expected: DateTime<Utc>,
    ) -> impl Future<Output = Result<ConditionalWrite<Value>, Self::Error>> + Send;

    /// Store `data` at `key` only if nothing is stored there yet.
    ///
    /// Returns `false` (and stores nothing) when the key is taken.
    fn put_if_absent(
        &self,
        key: StorageKey,
        data: Value,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    fn get(&self, key: StorageKey)
    -> impl Future<Output = Result<Option<Value>, Self::Error>> + Send;

    fn delete(&self, key: StorageKey) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// Delete the document at `key` only if its stamp equals `expected`.
    fn delete_if_unmodified(
        &self,
        key: StorageKey,
        expected: DateTime<Utc>,
    ) -> impl Future<Output = Result<ConditionalWrite<()>, Self::Error>> + Send;

    /// List a collection ordered by id, with offset/limit pagination.
    ///
    /// An offset past the end, or a limit of 0, yields an empty vector.
    fn list(
        &self,
        prefix: StoragePrefix,
        offset: usize,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<(StorageKey, Value)>, Self::Error>> + Send;

    fn exists(&self, key: StorageKey) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    fn count(
        &self,
        prefix: StoragePrefix,
    ) -> impl Future<Output = Result<usize, Self::Error>> + Send;

    /// Remove every document. Intended for tests.
    fn clear(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
