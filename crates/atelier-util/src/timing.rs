//! RAII-based timing utilities for measuring and logging operation durations.
//!
//! Storage writes have no timeout, so a slow adapter only shows up here.
//!
//! # Example
//!
//! ```rust,ignore
//! use atelier_util::timing::TimingGuard;
//!
//! async fn persist(design_id: &str) {
//!     let _timing = TimingGuard::storage("save_version", design_id);
//!     // ... storage round trip ...
//!     // Duration is logged when _timing is dropped
//! }
//! ```

use std::time::Instant;
use tracing::{debug, info, warn};

/// RAII guard that measures and logs the duration of an operation.
pub struct TimingGuard {
    /// Type of operation (e.g., "storage", "autosave")
    operation_type: &'static str,
    /// Name of the specific operation (e.g., "save_version")
    operation_name: String,
    /// Subject of the operation, usually a design id
    subject: String,
    start: Instant,
    info_threshold_ms: u64,
    warn_threshold_ms: u64,
}

impl TimingGuard {
    /// Create a new timing guard.
    ///
    /// The duration will be logged when the guard is dropped.
    pub fn new(
        operation_type: &'static str,
        operation_name: impl Into<String>,
        subject: impl Into<String>,
    ) -> Self {
        let operation_name = operation_name.into();
        let subject = subject.into();
        debug!(
            operation_type = operation_type,
            operation_name = %operation_name,
            subject = %subject,
            "Starting operation"
        );
        Self {
            operation_type,
            operation_name,
            subject,
            start: Instant::now(),
            info_threshold_ms: 250,
            warn_threshold_ms: 5000,
        }
    }

    /// Create a timing guard for a storage round trip.
    pub fn storage(name: impl Into<String>, design_id: impl Into<String>) -> Self {
        Self::new("storage", name, design_id)
    }

    /// Set the threshold for info-level logging (in milliseconds).
    pub fn with_info_threshold(mut self, ms: u64) -> Self {
        self.info_threshold_ms = ms;
        self
    }

    /// Set the threshold for warn-level logging (in milliseconds).
    pub fn with_warn_threshold(mut self, ms: u64) -> Self {
        self.warn_threshold_ms = ms;
        self
    }

    /// Get the elapsed time so far.
    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }

    /// Get the elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> u128 {
        self.start.elapsed().as_millis()
    }
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        let duration_ms = self.start.elapsed().as_millis() as u64;

        if duration_ms >= self.warn_threshold_ms {
            warn!(
                operation_type = self.operation_type,
                operation_name = %self.operation_name,
                subject = %self.subject,
                duration_ms,
                "Slow operation completed"
            );
        } else if duration_ms >= self.info_threshold_ms {
            info!(
                operation_type = self.operation_type,
                operation_name = %self.operation_name,
                subject = %self.subject,
                duration_ms,
                "Operation completed"
            );
        } else {
            debug!(
                operation_type = self.operation_type,
                operation_name = %self.operation_name,
                subject = %self.subject,
                duration_ms,
                "Operation completed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_timing_guard_basic() {
        let guard = TimingGuard::new("test", "basic", "dsn_1");
        sleep(Duration::from_millis(10));
        assert!(guard.elapsed_ms() >= 10);
        drop(guard);
    }

    #[test]
    fn test_timing_guard_thresholds() {
        let guard = TimingGuard::storage("save_version", "dsn_1")
            .with_info_threshold(1)
            .with_warn_threshold(1000);
        sleep(Duration::from_millis(5));
        assert!(guard.elapsed() >= Duration::from_millis(5));
    }
}
