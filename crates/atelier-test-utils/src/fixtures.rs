//! Test fixtures for creating reproducible test environments.
//!
//! Provides sample designs and temporary project directories with config
//! files and stored version history laid out the way `JsonStorage` expects.

use crate::builders::SnapshotBuilder;
use atelier_history::snapshot::Snapshot;
use atelier_history::version::Version;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A shirt front: two panels, a collar and a button placket.
pub fn shirt_front() -> Snapshot {
    SnapshotBuilder::new()
        .panel("elm_front_left")
        .panel("elm_front_right")
        .panel("elm_collar")
        .trim("elm_placket")
        .fabric("fab_oxford")
        .build()
}

/// A skirt with a hand-drawn hem line on its own layer.
pub fn sketched_skirt() -> Snapshot {
    SnapshotBuilder::new()
        .panel("elm_skirt_front")
        .panel("elm_waistband")
        .layer("lyr_sketch", "Sketch")
        .stroke("pth_hem", &[(0.0, 300.0), (120.0, 310.0), (240.0, 300.0)])
        .text("elm_note", "raise hem 2cm")
        .build()
}

/// A temporary project directory with configurable atelier files.
///
/// Creates a temporary directory that is automatically cleaned up
/// when the built project is dropped.
///
/// # Example
///
/// ```rust
/// use atelier_test_utils::fixtures::{shirt_front, TestProject};
///
/// let project = TestProject::new()
///     .with_config(r#"{"history": {"maxVersions": 5}}"#)
///     .with_versions("dsn_shirt", vec![shirt_front()])
///     .build();
///
/// assert!(project.path().join("atelier.json").exists());
/// assert!(project.history_dir().join("versions/dsn_shirt.json").exists());
/// ```
pub struct TestProject {
    /// The temporary directory backing this project.
    temp_dir: TempDir,
    /// Files to create (path relative to root -> contents).
    files: HashMap<PathBuf, String>,
}

impl TestProject {
    /// Create a new test project builder.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
            files: HashMap::new(),
        }
    }

    /// Add a file to the project.
    ///
    /// The path should be relative to the project root.
    /// Parent directories are created automatically.
    pub fn with_file(mut self, path: impl AsRef<Path>, contents: impl Into<String>) -> Self {
        self.files
            .insert(path.as_ref().to_path_buf(), contents.into());
        self
    }

    /// Add an `atelier.json` project config.
    pub fn with_config(self, config: &str) -> Self {
        self.with_file("atelier.json", config)
    }

    /// Store `snapshots` as the version history of `design_id`.
    ///
    /// The last snapshot becomes the newest version.
    pub fn with_versions(self, design_id: &str, snapshots: Vec<Snapshot>) -> Self {
        let mut versions: Vec<Version> = snapshots
            .into_iter()
            .map(|s| Version::new(design_id, s).expect("Failed to build version"))
            .collect();
        versions.reverse();

        let json = serde_json::to_string(&versions).expect("Failed to serialize versions");
        self.with_file(
            Path::new(HISTORY_DIR)
                .join("versions")
                .join(format!("{design_id}.json")),
            json,
        )
    }

    /// Build the project, creating all files.
    pub fn build(self) -> BuiltTestProject {
        let root = self.temp_dir.path();

        for (path, contents) in &self.files {
            let full_path = root.join(path);
            if let Some(parent) = full_path.parent() {
                fs::create_dir_all(parent).unwrap_or_else(|e| {
                    panic!(
                        "Failed to create parent directory for {}: {}",
                        full_path.display(),
                        e
                    )
                });
            }
            fs::write(&full_path, contents)
                .unwrap_or_else(|e| panic!("Failed to write file {}: {}", full_path.display(), e));
        }

        BuiltTestProject {
            temp_dir: self.temp_dir,
        }
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// History location relative to a project root.
const HISTORY_DIR: &str = ".atelier/history";

/// A built test project with files created on disk.
///
/// The temporary directory is automatically cleaned up when this is dropped.
pub struct BuiltTestProject {
    temp_dir: TempDir,
}

impl BuiltTestProject {
    /// Get the project root path.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Directory the project's `JsonStorage` lives in.
    pub fn history_dir(&self) -> PathBuf {
        self.path().join(HISTORY_DIR)
    }

    /// Read the stored version list of a design.
    pub fn read_versions(&self, design_id: &str) -> Vec<Version> {
        let path = self
            .history_dir()
            .join("versions")
            .join(format!("{design_id}.json"));
        let content = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
        serde_json::from_str(&content)
            .unwrap_or_else(|e| panic!("Invalid version list {}: {}", path.display(), e))
    }

    /// Write a file relative to the project root.
    pub fn write_file(&self, path: impl AsRef<Path>, contents: impl AsRef<str>) {
        let full_path = self.path().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&full_path, contents.as_ref()).expect("Failed to write file");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_designs() {
        assert_eq!(shirt_front().elements.len(), 4);
        assert_eq!(sketched_skirt().paths.len(), 1);
        assert_eq!(sketched_skirt().active_layer_id, "lyr_sketch");
    }

    #[test]
    fn test_versions_are_newest_first() {
        let project = TestProject::new()
            .with_versions("dsn_1", vec![shirt_front(), sketched_skirt()])
            .build();

        let versions = project.read_versions("dsn_1");
        assert_eq!(versions.len(), 2);
        assert_eq!(versions[0].data(), &sketched_skirt());
    }
}
