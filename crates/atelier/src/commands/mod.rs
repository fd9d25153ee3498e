//! Command handlers for the atelier CLI.
//!
//! This module contains handlers for the various CLI subcommands,
//! split into logical groups.

pub mod logging;
pub mod versions;

pub use logging::*;
pub use versions::*;
