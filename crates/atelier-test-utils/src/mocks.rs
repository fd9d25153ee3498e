//! Mock implementations for testing.
//!
//! Provides test doubles for the persistence adapter and the error policy.

use async_trait::async_trait;
use atelier_history::policy::{ErrorPolicy, ErrorReport};
use atelier_storage::{MemoryStorage, Storage, StorageError, StorageResult};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Storage that fails on demand.
///
/// Wraps a [`MemoryStorage`] and injects `Unavailable` errors. Clones share
/// state, so a test can keep a handle after moving one into a store.
///
/// # Example
///
/// ```rust
/// use atelier_test_utils::mocks::FlakyStorage;
///
/// let storage = FlakyStorage::failing_first(2);
/// assert_eq!(storage.calls(), 0);
/// ```
#[derive(Clone)]
pub struct FlakyStorage {
    inner: Arc<MemoryStorage>,
    state: Arc<Mutex<FlakyState>>,
}

#[derive(Default)]
struct FlakyState {
    /// `None` fails every call.
    remaining_failures: Option<usize>,
    writes_only: bool,
    delay: Duration,
    calls: usize,
    failures: usize,
}

impl Default for FlakyStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl FlakyStorage {
    /// A storage that never fails.
    pub fn new() -> Self {
        Self::failing_first(0)
    }

    /// Fail the first `n` calls, then behave normally.
    pub fn failing_first(n: usize) -> Self {
        Self::with_failures(Some(n))
    }

    /// Fail every call until [`FlakyStorage::heal`].
    pub fn always_failing() -> Self {
        Self::with_failures(None)
    }

    fn with_failures(remaining_failures: Option<usize>) -> Self {
        Self {
            inner: Arc::new(MemoryStorage::new()),
            state: Arc::new(Mutex::new(FlakyState {
                remaining_failures,
                ..FlakyState::default()
            })),
        }
    }

    /// Only inject failures into `set` and `remove`.
    pub fn writes_only(self) -> Self {
        self.state.lock().unwrap().writes_only = true;
        self
    }

    /// Sleep before every call. Works with paused tokio time.
    pub fn with_delay(self, delay: Duration) -> Self {
        self.state.lock().unwrap().delay = delay;
        self
    }

    /// Stop injecting failures.
    pub fn heal(&self) {
        self.state.lock().unwrap().remaining_failures = Some(0);
    }

    /// Fail every call from now on.
    pub fn break_all(&self) {
        self.state.lock().unwrap().remaining_failures = None;
    }

    /// Total calls seen, including failed ones.
    pub fn calls(&self) -> usize {
        self.state.lock().unwrap().calls
    }

    /// Calls that failed by injection.
    pub fn failures(&self) -> usize {
        self.state.lock().unwrap().failures
    }

    /// The backing storage, bypassing failure injection.
    pub fn inner(&self) -> &MemoryStorage {
        &self.inner
    }

    async fn enter(&self, write: bool) -> StorageResult<()> {
        let delay = {
            let mut state = self.state.lock().unwrap();
            state.calls += 1;
            let applies = write || !state.writes_only;
            let fail = applies
                && match state.remaining_failures.as_mut() {
                    None => true,
                    Some(0) => false,
                    Some(n) => {
                        *n -= 1;
                        true
                    }
                };
            if fail {
                state.failures += 1;
                return Err(StorageError::unavailable("injected failure"));
            }
            state.delay
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for FlakyStorage {
    async fn get(&self, key: &[&str]) -> StorageResult<Option<String>> {
        self.enter(false).await?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &[&str], value: &str) -> StorageResult<()> {
        self.enter(true).await?;
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &[&str]) -> StorageResult<()> {
        self.enter(true).await?;
        self.inner.remove(key).await
    }

    async fn list(&self, prefix: &[&str]) -> StorageResult<Vec<Vec<String>>> {
        self.enter(false).await?;
        self.inner.list(prefix).await
    }
}

/// Error policy that keeps every report for later inspection.
///
/// Clones share the same record.
#[derive(Clone, Default)]
pub struct RecordingErrorPolicy {
    reports: Arc<Mutex<Vec<ErrorReport>>>,
}

impl RecordingErrorPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// All reports in arrival order.
    pub fn reports(&self) -> Vec<ErrorReport> {
        self.reports.lock().unwrap().clone()
    }

    /// Operation labels in arrival order.
    pub fn operations(&self) -> Vec<String> {
        self.reports
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.operation.clone())
            .collect()
    }

    pub fn last(&self) -> Option<ErrorReport> {
        self.reports.lock().unwrap().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.reports.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.reports.lock().unwrap().clear();
    }
}

impl ErrorPolicy for RecordingErrorPolicy {
    fn report(&self, report: ErrorReport) {
        self.reports.lock().unwrap().push(report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_history::policy::ErrorCategory;

    #[tokio::test]
    async fn test_failing_first_recovers() {
        let storage = FlakyStorage::failing_first(1);
        assert!(storage.set(&["k"], "v").await.is_err());
        storage.set(&["k"], "v").await.unwrap();
        assert_eq!(storage.get(&["k"]).await.unwrap().as_deref(), Some("v"));
        assert_eq!(storage.calls(), 3);
        assert_eq!(storage.failures(), 1);
    }

    #[tokio::test]
    async fn test_writes_only() {
        let storage = FlakyStorage::always_failing().writes_only();
        assert!(storage.get(&["k"]).await.unwrap().is_none());
        assert!(storage.set(&["k"], "v").await.is_err());

        storage.heal();
        storage.set(&["k"], "v").await.unwrap();
    }

    #[test]
    fn test_recording_policy_shares_state() {
        let policy = RecordingErrorPolicy::new();
        let clone = policy.clone();
        clone.report(ErrorReport::new("auto-save", ErrorCategory::Storage, "boom"));
        assert_eq!(policy.operations(), vec!["auto-save"]);
        policy.clear();
        assert!(clone.is_empty());
    }
}
