//! Design history engine for atelier.
//!
//! This crate provides:
//! - Immutable design snapshots and persisted versions
//! - Undo/redo history for an editing session
//! - Bounded version storage with retry
//! - Interval-based auto-save with dirty tracking
//! - Element-level diffs between versions
//! - Error reporting hooks for the UI
//!
//! # Example
//!
//! ```ignore
//! let store = Arc::new(VersionStore::new(storage, Arc::new(TracingErrorPolicy)));
//! let mut session = EditingSession::new(store, &HistoryConfig::default());
//! session.open("dsn_01j...", initial);
//! session.commit(edited);
//! session.undo();
//! session.close().await?;
//! ```

pub mod config;
pub mod diff;
pub mod error;
pub mod policy;
pub mod retry;
pub mod scheduler;
pub mod session;
pub mod snapshot;
pub mod stack;
pub mod store;
pub mod version;

pub use config::{Config, HistoryConfig};
pub use diff::{diff, diff_snapshots, DiffSummary, ElementChange, VersionDiff};
pub use error::{ConfigError, HistoryError, HistoryResult};
pub use policy::{ChannelErrorPolicy, ErrorCategory, ErrorPolicy, ErrorReport, TracingErrorPolicy};
pub use retry::RetryPolicy;
pub use scheduler::{AutoSaver, SnapshotProvider};
pub use session::EditingSession;
pub use snapshot::{
    DesignElement, DrawingPath, ElementKind, ElementStyle, Geometry, Layer, Point, Snapshot,
};
pub use stack::HistoryStack;
pub use store::VersionStore;
pub use version::{Version, VersionId, VersionInfo};
