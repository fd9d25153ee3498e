//! Storage layer for atelier.
//!
//! This crate provides the key-value persistence adapter the history engine
//! reads and writes through, with two backends:
//! - JSON file storage (default, one file per key)
//! - In-memory storage (for testing)
//!
//! Values are opaque serialized text. Callers encode and decode them.

pub mod error;
pub mod json;
pub mod memory;

pub use error::{StorageError, StorageResult};
pub use json::JsonStorage;
pub use memory::MemoryStorage;

use async_trait::async_trait;

/// A trait for key-value storage backends.
///
/// Keys are represented as path segments, e.g., `["versions", "dsn_123"]`.
/// Every call may suspend and any call may fail.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Read the raw value stored under `key`.
    ///
    /// Returns `None` if the key doesn't exist.
    async fn get(&self, key: &[&str]) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &[&str], value: &str) -> StorageResult<()>;

    /// Remove a value from storage. Removing an absent key succeeds.
    async fn remove(&self, key: &[&str]) -> StorageResult<()>;

    /// List all keys directly under a prefix.
    ///
    /// Returns the full key paths for each item.
    async fn list(&self, prefix: &[&str]) -> StorageResult<Vec<Vec<String>>>;

    /// Check if a key exists.
    async fn exists(&self, key: &[&str]) -> StorageResult<bool> {
        Ok(self.get(key).await?.is_some())
    }
}

/// Validate key components (no empty keys, no path traversal).
pub(crate) fn validate_key(key: &[&str]) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::invalid_key("Key cannot be empty"));
    }

    for component in key {
        if component.is_empty()
            || component.contains('/')
            || component.contains('\\')
            || *component == "."
            || *component == ".."
        {
            return Err(StorageError::invalid_key(format!(
                "Invalid key component: {}",
                component
            )));
        }
    }

    Ok(())
}
