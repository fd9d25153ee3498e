//! Auto-save scheduling.
//!
//! An [`AutoSaver`] owns the dirty flag for one editing session and a
//! repeating timer task. Each tick persists the live snapshot through the
//! [`VersionStore`] if anything changed since the last successful save.
//!
//! The dirty flag is an edit counter plus the counter value captured by the
//! last successful save. An edit that lands while a write is in flight bumps
//! the counter past that value, so the flag stays set.
//!
//! Only one persist runs at a time per scheduler. A tick that finds a save in
//! flight is skipped; a manual [`AutoSaver::save`] waits its turn.

use crate::config::HistoryConfig;
use crate::error::{HistoryError, HistoryResult};
use crate::snapshot::Snapshot;
use crate::store::VersionStore;
use crate::version::Version;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

/// Returns the live snapshot to persist.
pub type SnapshotProvider = Arc<dyn Fn() -> Snapshot + Send + Sync>;

/// Shortest allowed tick period.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Periodic and on-demand persistence of one design.
pub struct AutoSaver {
    store: Arc<VersionStore>,
    interval: Duration,
    state: Arc<SaveState>,
    binding: Option<Arc<Binding>>,
    timer: Option<Timer>,
}

struct SaveState {
    edits: AtomicU64,
    saved: AtomicU64,
    persist_lock: Mutex<()>,
}

struct Binding {
    design_id: String,
    provider: SnapshotProvider,
}

struct Timer {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl SaveState {
    fn new() -> Self {
        Self {
            edits: AtomicU64::new(0),
            saved: AtomicU64::new(0),
            persist_lock: Mutex::new(()),
        }
    }

    fn mark_dirty(&self) {
        self.edits.fetch_add(1, Ordering::SeqCst);
    }

    fn is_dirty(&self) -> bool {
        self.edits.load(Ordering::SeqCst) > self.saved.load(Ordering::SeqCst)
    }

    /// Snapshot the edit counter before reading the live state.
    fn begin(&self) -> u64 {
        self.edits.load(Ordering::SeqCst)
    }

    /// Record that every edit up to `seen` is persisted.
    fn mark_saved(&self, seen: u64) {
        self.saved.fetch_max(seen, Ordering::SeqCst);
    }
}

impl AutoSaver {
    /// Create an idle scheduler. Call [`AutoSaver::start`] to bind a design.
    pub fn new(store: Arc<VersionStore>, interval: Duration) -> Self {
        Self {
            store,
            interval: interval.max(MIN_INTERVAL),
            state: Arc::new(SaveState::new()),
            binding: None,
            timer: None,
        }
    }

    pub fn from_config(store: Arc<VersionStore>, config: &HistoryConfig) -> Self {
        Self::new(store, config.autosave_interval)
    }

    /// Bind `design_id` and start the repeating timer.
    ///
    /// Any running timer is stopped first. The first tick fires one full
    /// interval after this call. Must be called within a tokio runtime.
    pub fn start(&mut self, design_id: impl Into<String>, provider: SnapshotProvider) {
        self.stop();

        let binding = Arc::new(Binding {
            design_id: design_id.into(),
            provider,
        });
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_timer(
            self.store.clone(),
            self.state.clone(),
            binding.clone(),
            self.interval,
            cancel.clone(),
        ));

        info!(
            design_id = %binding.design_id,
            interval_ms = self.interval.as_millis() as u64,
            "Auto-save started"
        );
        self.binding = Some(binding);
        self.timer = Some(Timer { cancel, handle });
    }

    /// Cancel future ticks. Idempotent.
    ///
    /// A tick that is already persisting runs to completion.
    pub fn stop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel.cancel();
            debug!(design_id = ?self.design_id(), "Auto-save stopped");
        }
    }

    /// Stop the timer and wait for an in-flight tick to finish.
    pub async fn shutdown(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel.cancel();
            if let Err(e) = timer.handle.await {
                debug!(error = %e, "Auto-save task ended abnormally");
            }
        }
    }

    /// Note that the live state changed. Valid before `start`.
    pub fn mark_dirty(&self) {
        self.state.mark_dirty();
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.state.is_dirty()
    }

    /// Persist the live snapshot now, whether or not it changed.
    ///
    /// Waits for an in-flight tick to finish first.
    pub async fn save(&self) -> HistoryResult<Version> {
        let binding = self.binding.as_ref().ok_or(HistoryError::NotStarted)?;
        let _guard = self.state.persist_lock.lock().await;
        self.persist_checked(binding).await
    }

    /// Persist only if there are unsaved changes.
    pub async fn flush(&self) -> HistoryResult<Option<Version>> {
        let Some(binding) = self.binding.as_ref() else {
            return Ok(None);
        };
        let _guard = self.state.persist_lock.lock().await;
        if !self.state.is_dirty() {
            return Ok(None);
        }
        self.persist_checked(binding).await.map(Some)
    }

    pub fn is_running(&self) -> bool {
        self.timer
            .as_ref()
            .is_some_and(|t| !t.cancel.is_cancelled() && !t.handle.is_finished())
    }

    /// The bound design, if started.
    pub fn design_id(&self) -> Option<&str> {
        self.binding.as_ref().map(|b| b.design_id.as_str())
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    async fn persist_checked(&self, binding: &Binding) -> HistoryResult<Version> {
        let seen = self.state.begin();
        let snapshot = (binding.provider)();
        let version = self
            .store
            .save_version_checked(&binding.design_id, snapshot)
            .await?;
        self.state.mark_saved(seen);
        Ok(version)
    }
}

impl Drop for AutoSaver {
    fn drop(&mut self) {
        if let Some(timer) = &self.timer {
            timer.cancel.cancel();
        }
    }
}

impl std::fmt::Debug for AutoSaver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoSaver")
            .field("design_id", &self.design_id())
            .field("interval", &self.interval)
            .field("running", &self.is_running())
            .field("dirty", &self.has_unsaved_changes())
            .finish()
    }
}

async fn run_timer(
    store: Arc<VersionStore>,
    state: Arc<SaveState>,
    binding: Arc<Binding>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => tick(&store, &state, &binding).await,
        }
    }
    trace!(design_id = %binding.design_id, "Auto-save timer exited");
}

async fn tick(store: &VersionStore, state: &SaveState, binding: &Binding) {
    if !state.is_dirty() {
        trace!(design_id = %binding.design_id, "No changes, skipping auto-save");
        return;
    }
    let Ok(_guard) = state.persist_lock.try_lock() else {
        debug!(design_id = %binding.design_id, "Save in flight, skipping auto-save tick");
        return;
    };

    let seen = state.begin();
    let snapshot = (binding.provider)();
    // Failures are reported by the store; the flag stays set for the next tick
    if store.save_version(&binding.design_id, snapshot).await.is_some() {
        state.mark_saved(seen);
    }
}
