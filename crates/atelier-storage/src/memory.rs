//! In-memory storage implementation for testing.

use crate::{validate_key, Storage, StorageError, StorageResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// In-memory storage for testing.
///
/// This stores all data in memory and is not persistent.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    data: RwLock<BTreeMap<String, String>>,
}

impl MemoryStorage {
    /// Create a new in-memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.data.read().map(|d| d.len()).unwrap_or(0)
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert a key slice to a storage key string.
    fn key_to_string(key: &[&str]) -> String {
        key.join("/")
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get(&self, key: &[&str]) -> StorageResult<Option<String>> {
        validate_key(key)?;
        let data = self
            .data
            .read()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;

        Ok(data.get(&Self::key_to_string(key)).cloned())
    }

    async fn set(&self, key: &[&str], value: &str) -> StorageResult<()> {
        validate_key(key)?;
        let mut data = self
            .data
            .write()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;
        data.insert(Self::key_to_string(key), value.to_string());

        Ok(())
    }

    async fn remove(&self, key: &[&str]) -> StorageResult<()> {
        validate_key(key)?;
        let mut data = self
            .data
            .write()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;
        data.remove(&Self::key_to_string(key));
        Ok(())
    }

    async fn list(&self, prefix: &[&str]) -> StorageResult<Vec<Vec<String>>> {
        let prefix_str = Self::key_to_string(prefix);
        let prefix_with_sep = if prefix_str.is_empty() {
            String::new()
        } else {
            format!("{prefix_str}/")
        };

        let data = self
            .data
            .read()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;
        let results = data
            .keys()
            .filter_map(|k| {
                let remainder = k.strip_prefix(&prefix_with_sep)?;

                // Only include direct children (one level deep)
                if remainder.contains('/') {
                    return None;
                }

                Some(k.split('/').map(|s| s.to_string()).collect())
            })
            .collect();

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_storage() {
        let storage = MemoryStorage::new();

        storage.set(&["versions", "dsn_1"], "[]").await.unwrap();

        let read = storage.get(&["versions", "dsn_1"]).await.unwrap();
        assert_eq!(read.as_deref(), Some("[]"));

        assert!(storage.exists(&["versions", "dsn_1"]).await.unwrap());
        assert!(!storage.exists(&["nonexistent"]).await.unwrap());

        storage.remove(&["versions", "dsn_1"]).await.unwrap();
        assert!(!storage.exists(&["versions", "dsn_1"]).await.unwrap());
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_memory_storage_list_excludes_nested() {
        let storage = MemoryStorage::new();

        storage.set(&["versions", "dsn_1"], "[]").await.unwrap();
        storage.set(&["versions", "dsn_2"], "[]").await.unwrap();
        storage.set(&["versions", "nested", "x"], "[]").await.unwrap();
        storage.set(&["other", "item"], "[]").await.unwrap();

        let items = storage.list(&["versions"]).await.unwrap();
        assert_eq!(
            items,
            vec![
                vec!["versions".to_string(), "dsn_1".to_string()],
                vec!["versions".to_string(), "dsn_2".to_string()],
            ]
        );
    }

    #[tokio::test]
    async fn test_memory_storage_list_empty_prefix() {
        let storage = MemoryStorage::new();

        storage.set(&["item1"], "1").await.unwrap();
        storage.set(&["item2"], "2").await.unwrap();
        storage.set(&["dir", "item3"], "3").await.unwrap();

        let items = storage.list(&[]).await.unwrap();
        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn test_memory_storage_remove_nonexistent() {
        let storage = MemoryStorage::new();
        storage.remove(&["does", "not", "exist"]).await.unwrap();
    }

    #[tokio::test]
    async fn test_memory_storage_overwrite() {
        let storage = MemoryStorage::new();

        storage.set(&["key"], "first").await.unwrap();
        storage.set(&["key"], "second").await.unwrap();

        let result = storage.get(&["key"]).await.unwrap();
        assert_eq!(result.as_deref(), Some("second"));
        assert_eq!(storage.len(), 1);
    }

    #[tokio::test]
    async fn test_memory_storage_rejects_invalid_keys() {
        let storage = MemoryStorage::new();
        assert!(storage.set(&[], "x").await.is_err());
        assert!(storage.get(&["a/b"]).await.is_err());
    }
}
