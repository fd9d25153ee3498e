//! Version storage.
//!
//! Each design keeps one bounded, newest-first list of versions stored under
//! the key `["versions", <design_id>]`. Saving reads the whole list, prepends,
//! trims to `max_versions` and writes the whole list back. Read-modify-write
//! cycles for one design are serialized; different designs never wait on each
//! other.

use crate::config::HistoryConfig;
use crate::diff::{self, VersionDiff};
use crate::error::{HistoryError, HistoryResult};
use crate::policy::{operation, ErrorPolicy, ErrorReport};
use crate::retry::RetryPolicy;
use crate::snapshot::Snapshot;
use crate::version::{Version, VersionInfo};
use atelier_storage::{Storage, StorageError};
use atelier_util::TimingGuard;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

/// Key prefix for version lists.
pub const VERSIONS_PREFIX: &str = "versions";

/// Default number of versions kept per design.
pub const DEFAULT_MAX_VERSIONS: usize = 20;

/// Persists, lists and restores design versions.
pub struct VersionStore {
    storage: Arc<dyn Storage>,
    policy: Arc<dyn ErrorPolicy>,
    max_versions: usize,
    retry: RetryPolicy,
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl VersionStore {
    /// Create a store with default retention and retry settings.
    pub fn new(storage: Arc<dyn Storage>, policy: Arc<dyn ErrorPolicy>) -> Self {
        Self {
            storage,
            policy,
            max_versions: DEFAULT_MAX_VERSIONS,
            retry: RetryPolicy::default(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Create a store using the retention and retry settings from `config`.
    pub fn from_config(
        storage: Arc<dyn Storage>,
        policy: Arc<dyn ErrorPolicy>,
        config: &HistoryConfig,
    ) -> Self {
        Self::new(storage, policy)
            .with_max_versions(config.max_versions)
            .with_retry(config.retry.clone())
    }

    /// Set the retention bound. Values below 1 are treated as 1.
    pub fn with_max_versions(mut self, max_versions: usize) -> Self {
        self.max_versions = max_versions.max(1);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn max_versions(&self) -> usize {
        self.max_versions
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Persist `snapshot` as a new version for an automatic save.
    ///
    /// Failures are reported to the error policy and swallowed.
    pub async fn save_version(&self, design_id: &str, snapshot: Snapshot) -> Option<Version> {
        match self.persist(design_id, snapshot).await {
            Ok(version) => Some(version),
            Err(e) => {
                warn!(design_id = %design_id, error = %e, "Auto-save failed");
                self.report(operation::AUTO_SAVE, &e);
                None
            }
        }
    }

    /// Persist `snapshot` as a new version, returning the failure to the caller.
    ///
    /// Failures are also reported to the error policy.
    pub async fn save_version_checked(
        &self,
        design_id: &str,
        snapshot: Snapshot,
    ) -> HistoryResult<Version> {
        self.persist(design_id, snapshot).await.map_err(|e| {
            warn!(design_id = %design_id, error = %e, "Save failed");
            self.report(operation::SAVE_VERSION, &e);
            e
        })
    }

    /// All versions of a design, newest first.
    ///
    /// Missing or unreadable history yields an empty list.
    pub async fn get_versions(&self, design_id: &str) -> Vec<Version> {
        match self.load(design_id).await {
            Ok(versions) => versions,
            Err(e) => {
                warn!(design_id = %design_id, error = %e, "Failed to load versions");
                self.report(operation::LOAD_VERSIONS, &e);
                Vec::new()
            }
        }
    }

    /// Look up a single version.
    pub async fn get_version(&self, design_id: &str, version_id: &str) -> HistoryResult<Version> {
        self.load(design_id)
            .await?
            .into_iter()
            .find(|v| v.id().as_str() == version_id)
            .ok_or_else(|| HistoryError::not_found(design_id, version_id))
    }

    /// The most recent version of a design, if any.
    pub async fn latest_version(&self, design_id: &str) -> Option<Version> {
        self.get_versions(design_id).await.into_iter().next()
    }

    /// Return the snapshot stored in a version. Never modifies the list.
    pub async fn restore_version(
        &self,
        design_id: &str,
        version_id: &str,
    ) -> HistoryResult<Snapshot> {
        match self.get_version(design_id, version_id).await {
            Ok(version) => {
                info!(design_id = %design_id, version_id = %version_id, "Restoring version");
                Ok(version.into_data())
            }
            Err(e) => {
                self.report(operation::RESTORE_VERSION, &e);
                Err(e)
            }
        }
    }

    /// Remove one version. Returns whether the list was written successfully.
    ///
    /// Deleting an id that is not in the list succeeds without a write.
    pub async fn delete_version(&self, design_id: &str, version_id: &str) -> bool {
        match self.remove_one(design_id, version_id).await {
            Ok(removed) => {
                debug!(design_id = %design_id, version_id = %version_id, removed, "Deleted version");
                true
            }
            Err(e) => {
                warn!(design_id = %design_id, error = %e, "Failed to delete version");
                self.report(operation::DELETE_VERSION, &e);
                false
            }
        }
    }

    /// Remove every version of a design.
    pub async fn clear_versions(&self, design_id: &str) -> bool {
        let result = async {
            let lock = self.design_lock(design_id)?;
            let _guard = lock.lock().await;
            let storage = self.storage.as_ref();
            let key = versions_key(design_id);
            let key = &key;
            self.retry.run("remove", move || storage.remove(key)).await?;
            self.release_lock(design_id, &lock);
            Ok::<_, HistoryError>(())
        }
        .await;

        match result {
            Ok(()) => {
                info!(design_id = %design_id, "Cleared version history");
                true
            }
            Err(e) => {
                warn!(design_id = %design_id, error = %e, "Failed to clear versions");
                self.report(operation::CLEAR_VERSIONS, &e);
                false
            }
        }
    }

    /// Count, time range and total size of a design's versions.
    pub async fn get_version_info(&self, design_id: &str) -> VersionInfo {
        VersionInfo::from_versions(&self.get_versions(design_id).await)
    }

    /// Diff two versions of the same design, `from` being the older side.
    pub async fn diff_versions(
        &self,
        design_id: &str,
        from: &str,
        to: &str,
    ) -> HistoryResult<VersionDiff> {
        let versions = self.load(design_id).await?;
        let find = |id: &str| {
            versions
                .iter()
                .find(|v| v.id().as_str() == id)
                .ok_or_else(|| HistoryError::not_found(design_id, id))
        };
        Ok(diff::diff(find(from)?, find(to)?))
    }

    /// Design ids that have stored history, sorted.
    pub async fn list_designs(&self) -> HistoryResult<Vec<String>> {
        let storage = self.storage.as_ref();
        let prefix = [VERSIONS_PREFIX];
        let prefix = &prefix;
        let keys = self
            .retry
            .run("list", move || storage.list(prefix))
            .await?;

        let mut designs: Vec<String> = keys
            .into_iter()
            .filter_map(|key| key.last().cloned())
            .collect();
        designs.sort();
        Ok(designs)
    }

    async fn persist(&self, design_id: &str, snapshot: Snapshot) -> HistoryResult<Version> {
        let _timing = TimingGuard::storage("save_version", design_id);
        let lock = self.design_lock(design_id)?;
        let _guard = lock.lock().await;

        let mut versions = self.load(design_id).await?;

        // Keep the list newest first even if the clock stepped backwards
        let now = Utc::now();
        let timestamp = versions
            .first()
            .map_or(now, |head| head.timestamp().max(now));
        let version = Version::new_at(design_id, snapshot, timestamp)?;

        versions.insert(0, version.clone());
        let dropped = versions.len().saturating_sub(self.max_versions);
        versions.truncate(self.max_versions);

        self.write(design_id, &versions).await?;

        info!(
            design_id = %design_id,
            version_id = %version.id(),
            size = version.size(),
            count = versions.len(),
            dropped,
            "Saved version"
        );
        Ok(version)
    }

    async fn remove_one(&self, design_id: &str, version_id: &str) -> HistoryResult<bool> {
        let lock = self.design_lock(design_id)?;
        let _guard = lock.lock().await;

        let mut versions = self.load(design_id).await?;
        let before = versions.len();
        versions.retain(|v| v.id().as_str() != version_id);
        if versions.len() == before {
            return Ok(false);
        }

        self.write(design_id, &versions).await?;
        Ok(true)
    }

    async fn load(&self, design_id: &str) -> HistoryResult<Vec<Version>> {
        let storage = self.storage.as_ref();
        let key = versions_key(design_id);
        let key = &key;
        let raw = self.retry.run("get", move || storage.get(key)).await?;

        match raw {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    async fn write(&self, design_id: &str, versions: &[Version]) -> HistoryResult<()> {
        let json = serde_json::to_string(versions)?;
        let storage = self.storage.as_ref();
        let key = versions_key(design_id);
        let (key, json) = (&key, json.as_str());
        self.retry
            .run("set", move || storage.set(key, json))
            .await?;
        Ok(())
    }

    fn design_lock(&self, design_id: &str) -> HistoryResult<Arc<AsyncMutex<()>>> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;
        Ok(locks.entry(design_id.to_string()).or_default().clone())
    }

    /// Drop the lock entry of a cleared design unless another call holds it.
    fn release_lock(&self, design_id: &str, lock: &Arc<AsyncMutex<()>>) {
        if let Ok(mut locks) = self.locks.lock() {
            // One reference in the map, one held by the caller
            if Arc::strong_count(lock) == 2 {
                locks.remove(design_id);
            }
        }
    }

    fn report(&self, operation: &str, error: &HistoryError) {
        self.policy.report(ErrorReport::from_error(operation, error));
    }
}

impl std::fmt::Debug for VersionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionStore")
            .field("max_versions", &self.max_versions)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

fn versions_key(design_id: &str) -> [&str; 2] {
    [VERSIONS_PREFIX, design_id]
}
