//! Path utilities.

use std::path::{Path, PathBuf};

/// Get the atelier configuration directory.
///
/// This follows XDG conventions on Linux/macOS:
/// - `$XDG_CONFIG_HOME/atelier` if set
/// - `~/.config/atelier` otherwise
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("atelier"))
}

/// Get the atelier data directory.
///
/// Version history lives under `<data_dir>/history`.
pub fn data_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|p| p.join("atelier"))
}

/// Get the atelier logs directory.
pub fn logs_dir() -> Option<PathBuf> {
    data_dir().map(|p| p.join("logs"))
}

/// Get the default history storage directory.
pub fn history_dir() -> Option<PathBuf> {
    data_dir().map(|p| p.join("history"))
}

/// Get the project-local atelier directory.
pub fn project_data_dir(project_root: &Path) -> PathBuf {
    project_root.join(".atelier")
}
