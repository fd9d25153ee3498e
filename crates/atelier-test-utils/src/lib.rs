//! Testing utilities, fixtures, and mocks for atelier.
//!
//! This crate provides common testing infrastructure used across the atelier workspace:
//!
//! - **Fixtures**: Sample designs and temporary project directories
//! - **Mocks**: Fault-injecting storage and a recording error policy
//! - **Assertions**: Helpers for version lists and diffs
//! - **Builders**: Fluent construction of snapshots
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use atelier_test_utils::{FlakyStorage, RecordingErrorPolicy, SnapshotBuilder};
//!
//! #[tokio::test]
//! async fn test_auto_save_failure_is_reported() {
//!     let storage = FlakyStorage::always_failing();
//!     let policy = RecordingErrorPolicy::new();
//!     let store = VersionStore::new(Arc::new(storage), Arc::new(policy.clone()));
//!
//!     let snapshot = SnapshotBuilder::new().panel("elm_bodice").build();
//!     assert!(store.save_version("dsn_1", snapshot).await.is_none());
//!     assert_eq!(policy.operations(), vec!["auto-save"]);
//! }
//! ```

pub mod assertions;
pub mod builders;
pub mod fixtures;
pub mod mocks;

// Re-export commonly used items
pub use builders::SnapshotBuilder;
pub use fixtures::TestProject;
pub use mocks::{FlakyStorage, RecordingErrorPolicy};
