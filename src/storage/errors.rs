//! Storage-specific error types for pure document operations.
//!
//! These errors describe persistence failures only. Missing documents and stamp
//! mismatches are ordinary outcomes (`Option`, [`ConditionalWrite`]) rather than
//! errors, so they never show up here.
//!
//! [`ConditionalWrite`]: crate::storage::ConditionalWrite

use crate::storage::StorageKey;
use std::fmt;

/// Errors that can occur during storage operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// A stored document cannot be used as-is.
    InvalidData { key: String, message: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::InvalidData { key, message } => {
                write!(f, "Invalid data at {}: {}", key, message)
            }
        }
    }
}

impl std::error::Error for StorageError {}

impl StorageError {
    /// The stored document has no readable `meta.lastModified`, so a
    /// conditional write against it cannot be decided.
    pub fn missing_stamp(key: &StorageKey) -> Self {
        Self::InvalidData {
            key: key.to_string(),
            message: "no readable meta.lastModified stamp".to_string(),
        }
    }
}
