//! Editing session facade.
//!
//! One [`EditingSession`] per open design screen. It ties the undo stack to
//! the auto-saver so the editing surface only has to call [`commit`],
//! [`undo`] and [`redo`].
//!
//! [`commit`]: EditingSession::commit
//! [`undo`]: EditingSession::undo
//! [`redo`]: EditingSession::redo

use crate::config::HistoryConfig;
use crate::diff::{self, VersionDiff};
use crate::error::{HistoryError, HistoryResult};
use crate::scheduler::{AutoSaver, SnapshotProvider};
use crate::snapshot::Snapshot;
use crate::stack::HistoryStack;
use crate::store::VersionStore;
use crate::version::Version;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// Undo/redo plus auto-save for one design.
pub struct EditingSession {
    store: Arc<VersionStore>,
    stack: HistoryStack<Snapshot>,
    live: Arc<RwLock<Snapshot>>,
    saver: AutoSaver,
}

impl EditingSession {
    pub fn new(store: Arc<VersionStore>, config: &HistoryConfig) -> Self {
        Self {
            saver: AutoSaver::from_config(store.clone(), config),
            stack: HistoryStack::new(config.max_undo_depth),
            live: Arc::new(RwLock::new(Snapshot::default())),
            store,
        }
    }

    /// Start editing `design_id` from `initial`.
    ///
    /// Any previous undo history is discarded and the auto-save timer is
    /// (re)started. Call [`EditingSession::close`] first to flush pending
    /// changes of a previously open design.
    pub fn open(&mut self, design_id: impl Into<String>, initial: Snapshot) {
        let design_id = design_id.into();
        self.stack.reset(initial.clone());
        self.set_live(initial);

        let live = self.live.clone();
        let provider: SnapshotProvider = Arc::new(move || match live.read() {
            Ok(snapshot) => snapshot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        });
        info!(design_id = %design_id, "Opened editing session");
        self.saver.start(design_id, provider);
    }

    /// Record a settled change.
    ///
    /// Returns `false` without touching anything when `snapshot` equals the
    /// current state.
    pub fn commit(&mut self, snapshot: Snapshot) -> bool {
        if self.stack.current() == Some(&snapshot) {
            debug!("Skipping unchanged snapshot");
            return false;
        }
        self.stack.record(snapshot.clone());
        self.set_live(snapshot);
        self.saver.mark_dirty();
        true
    }

    /// Step back one change and return the state to re-apply.
    pub fn undo(&mut self) -> Option<Snapshot> {
        let snapshot = self.stack.undo()?;
        self.apply(snapshot.clone());
        Some(snapshot)
    }

    /// Reapply the last undone change and return the state to re-apply.
    pub fn redo(&mut self) -> Option<Snapshot> {
        let snapshot = self.stack.redo()?;
        self.apply(snapshot.clone());
        Some(snapshot)
    }

    pub fn can_undo(&self) -> bool {
        self.stack.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.stack.can_redo()
    }

    /// The live state.
    pub fn current(&self) -> Option<&Snapshot> {
        self.stack.current()
    }

    pub fn design_id(&self) -> Option<&str> {
        self.saver.design_id()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.saver.has_unsaved_changes()
    }

    pub fn history(&self) -> &HistoryStack<Snapshot> {
        &self.stack
    }

    pub fn auto_saver(&self) -> &AutoSaver {
        &self.saver
    }

    /// Save the live state as a new version now.
    pub async fn save(&self) -> HistoryResult<Version> {
        self.saver.save().await
    }

    /// Versions of the open design, newest first.
    pub async fn versions(&self) -> Vec<Version> {
        match self.design_id() {
            Some(id) => self.store.get_versions(id).await,
            None => Vec::new(),
        }
    }

    /// Load a stored version and make it the live state as a new undoable step.
    pub async fn restore(&mut self, version_id: &str) -> HistoryResult<Snapshot> {
        let design_id = self.design_id().ok_or(HistoryError::NotStarted)?.to_string();
        let snapshot = self.store.restore_version(&design_id, version_id).await?;
        self.commit(snapshot.clone());
        Ok(snapshot)
    }

    /// Compare a stored version against the live state.
    pub async fn diff_with_live(&self, version_id: &str) -> HistoryResult<VersionDiff> {
        let design_id = self.design_id().ok_or(HistoryError::NotStarted)?;
        let version = self.store.get_version(design_id, version_id).await?;
        let live = self.stack.current().cloned().unwrap_or_default();
        Ok(diff::diff_snapshots(version.data(), &live))
    }

    /// Stop the timer and persist any unsaved changes.
    pub async fn close(&mut self) -> HistoryResult<Option<Version>> {
        self.saver.shutdown().await;
        let flushed = self.saver.flush().await?;
        info!(
            design_id = ?self.design_id(),
            flushed = flushed.is_some(),
            "Closed editing session"
        );
        Ok(flushed)
    }

    fn apply(&mut self, snapshot: Snapshot) {
        self.set_live(snapshot);
        self.saver.mark_dirty();
    }

    fn set_live(&self, snapshot: Snapshot) {
        match self.live.write() {
            Ok(mut live) => *live = snapshot,
            Err(poisoned) => *poisoned.into_inner() = snapshot,
        }
    }
}

impl std::fmt::Debug for EditingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditingSession")
            .field("design_id", &self.design_id())
            .field("undo_depth", &self.stack.undo_depth())
            .field("redo_depth", &self.stack.redo_depth())
            .field("saver", &self.saver)
            .finish()
    }
}
