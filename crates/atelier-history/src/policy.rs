//! Error policy: where history failures get surfaced.
//!
//! The engine classifies a failure, labels it with the operation that hit it
//! and hands it to an [`ErrorPolicy`]. Reporting is fire-and-forget; a policy
//! must not block the caller. Presenting errors to the user is the policy's
//! job, not the engine's.
//!
//! # Example
//!
//! ```ignore
//! let policy = ChannelErrorPolicy::new();
//! let mut rx = policy.subscribe();
//! tokio::spawn(async move {
//!     while let Ok(report) = rx.recv().await {
//!         toast(format!("{} failed: {}", report.operation, report.message));
//!     }
//! });
//! ```

use crate::error::HistoryError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{error, warn};

/// Default channel capacity.
const DEFAULT_CAPACITY: usize = 64;

/// Operation labels attached to reports.
pub mod operation {
    pub const AUTO_SAVE: &str = "auto-save";
    pub const SAVE_VERSION: &str = "save version";
    pub const LOAD_VERSIONS: &str = "load versions";
    pub const RESTORE_VERSION: &str = "restore version";
    pub const DELETE_VERSION: &str = "delete version";
    pub const CLEAR_VERSIONS: &str = "clear versions";
}

/// Failure classes the engine distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Reading from or writing to the persistence adapter failed.
    Storage,
    /// A requested version does not exist.
    NotFound,
    /// A snapshot or version list could not be encoded or decoded.
    Serialization,
    /// Misuse of the engine (e.g. saving before start).
    Internal,
}

impl ErrorCategory {
    /// Serialization failures propagate exactly like storage failures.
    pub fn is_storage_failure(&self) -> bool {
        matches!(self, Self::Storage | Self::Serialization)
    }
}

/// A classified failure handed to the error policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub operation: String,
    pub category: ErrorCategory,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorReport {
    pub fn new(
        operation: impl Into<String>,
        category: ErrorCategory,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation: operation.into(),
            category,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    /// Build a report from an engine error.
    pub fn from_error(operation: &str, error: &HistoryError) -> Self {
        Self::new(operation, error.category(), error.to_string())
    }
}

/// Receives classified failures from the engine.
pub trait ErrorPolicy: Send + Sync {
    /// Surface a failure. Must return promptly.
    fn report(&self, report: ErrorReport);
}

/// Logs every report through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorPolicy;

impl ErrorPolicy for TracingErrorPolicy {
    fn report(&self, report: ErrorReport) {
        match report.category {
            ErrorCategory::Internal => error!(
                operation = %report.operation,
                category = ?report.category,
                "{}",
                report.message
            ),
            _ => warn!(
                operation = %report.operation,
                category = ?report.category,
                "{}",
                report.message
            ),
        }
    }
}

/// Broadcasts reports to any number of UI subscribers.
#[derive(Debug, Clone)]
pub struct ChannelErrorPolicy {
    sender: broadcast::Sender<ErrorReport>,
}

impl ChannelErrorPolicy {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to future reports.
    pub fn subscribe(&self) -> broadcast::Receiver<ErrorReport> {
        self.sender.subscribe()
    }
}

impl Default for ChannelErrorPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorPolicy for ChannelErrorPolicy {
    fn report(&self, report: ErrorReport) {
        // Ignore send errors (no receivers)
        let _ = self.sender.send(report);
    }
}
