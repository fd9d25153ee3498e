//! JSON file-based storage implementation.
//!
//! This storage backend stores each key as a separate JSON file.
//! Keys are mapped to file paths: `["versions", "dsn_123"]` -> `versions/dsn_123.json`

use crate::{validate_key, Storage, StorageError, StorageResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// JSON file-based storage.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    base_path: PathBuf,
}

impl JsonStorage {
    /// Create a new JSON storage at the given base path.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Root directory of this storage.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Get the file path for a key.
    fn key_to_path(&self, key: &[&str]) -> StorageResult<PathBuf> {
        validate_key(key)?;

        let Some((name, dirs)) = key.split_last() else {
            return Err(StorageError::invalid_key("Key cannot be empty"));
        };

        let mut path = self.prefix_to_dir(dirs);
        // Append rather than replace so dots in the name survive
        path.push(format!("{name}.json"));

        Ok(path)
    }

    /// Get the directory path for a prefix.
    fn prefix_to_dir(&self, prefix: &[&str]) -> PathBuf {
        let mut path = self.base_path.clone();
        for component in prefix {
            path.push(component);
        }
        path
    }
}

#[async_trait]
impl Storage for JsonStorage {
    async fn get(&self, key: &[&str]) -> StorageResult<Option<String>> {
        let path = self.key_to_path(key)?;
        debug!(path = %path.display(), "Reading from storage");

        match fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn set(&self, key: &[&str], value: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        debug!(path = %path.display(), bytes = value.len(), "Writing to storage");

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Write to a temp file, then rename over the target
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, value).await?;
        fs::rename(&temp_path, &path).await?;

        Ok(())
    }

    async fn remove(&self, key: &[&str]) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        debug!(path = %path.display(), "Removing from storage");

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn list(&self, prefix: &[&str]) -> StorageResult<Vec<Vec<String>>> {
        let dir = self.prefix_to_dir(prefix);
        debug!(path = %dir.display(), "Listing storage");

        let mut results = Vec::new();

        match fs::read_dir(&dir).await {
            Ok(mut entries) => {
                while let Some(entry) = entries.next_entry().await? {
                    let path = entry.path();

                    // Only include .json files
                    if path.extension().is_some_and(|ext| ext == "json") {
                        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                            let mut key: Vec<String> =
                                prefix.iter().map(|s| s.to_string()).collect();
                            key.push(stem.to_string());
                            results.push(key);
                        }
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(StorageError::Io(e)),
        }

        results.sort();
        Ok(results)
    }

    async fn exists(&self, key: &[&str]) -> StorageResult<bool> {
        let path = self.key_to_path(key)?;
        Ok(fs::try_exists(&path).await?)
    }
}

/// Create a storage instance at the default history directory.
pub fn default_storage() -> Option<JsonStorage> {
    atelier_util::path::history_dir().map(JsonStorage::new)
}

/// Create a storage instance at a project-specific directory.
pub fn project_storage(project_root: &Path) -> JsonStorage {
    JsonStorage::new(atelier_util::path::project_data_dir(project_root).join("history"))
}
