//! Shared utilities for atelier.
//!
//! This crate provides common utilities used across the atelier workspace:
//! - ULID-based identifier generation
//! - Logging setup with tracing
//! - Path utilities
//! - RAII-based timing for storage operations

pub mod id;
pub mod log;
pub mod path;
pub mod timing;

pub use id::{IdPrefix, Identifier};
pub use timing::TimingGuard;
