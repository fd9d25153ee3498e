//! Custom assertion helpers for common test patterns.
//!
//! Provides functions for making test assertions on version lists and diffs
//! more readable, with better error messages.

use atelier_history::diff::VersionDiff;
use atelier_history::version::Version;

/// Assert that a version list is ordered newest first.
pub fn assert_newest_first(versions: &[Version]) {
    for pair in versions.windows(2) {
        assert!(
            pair[0].timestamp() >= pair[1].timestamp(),
            "Versions out of order: {} ({}) listed before {} ({})",
            pair[0].id(),
            pair[0].timestamp(),
            pair[1].id(),
            pair[1].timestamp()
        );
    }
}

/// Assert that the versions carry the given first-element ids, in order.
///
/// Useful with snapshots built to hold one marker element each.
pub fn assert_markers(versions: &[Version], expected: &[&str]) {
    let actual: Vec<&str> = versions
        .iter()
        .map(|v| {
            v.data()
                .elements
                .first()
                .map(|e| e.id.as_str())
                .unwrap_or("<empty>")
        })
        .collect();
    assert_eq!(actual, expected, "Unexpected version markers");
}

/// Assert the element ids of each part of a diff.
pub fn assert_diff_ids(diff: &VersionDiff, added: &[&str], removed: &[&str], modified: &[&str]) {
    let actual_added: Vec<&str> = diff.added.iter().map(|e| e.id.as_str()).collect();
    let actual_removed: Vec<&str> = diff.removed.iter().map(|e| e.id.as_str()).collect();
    let actual_modified: Vec<&str> = diff.modified.iter().map(|c| c.id()).collect();

    assert_eq!(actual_added, added, "Unexpected added elements");
    assert_eq!(actual_removed, removed, "Unexpected removed elements");
    assert_eq!(actual_modified, modified, "Unexpected modified elements");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::SnapshotBuilder;
    use atelier_history::diff::diff_snapshots;

    #[test]
    fn test_assert_diff_ids() {
        let a = SnapshotBuilder::new().panel("a").panel("b").build();
        let b = SnapshotBuilder::new().panel("a").panel("c").build();
        assert_diff_ids(&diff_snapshots(&a, &b), &["c"], &["b"], &[]);
    }

    #[test]
    #[should_panic(expected = "Unexpected version markers")]
    fn test_assert_markers_fails_on_mismatch() {
        let version = Version::new("dsn_1", SnapshotBuilder::new().panel("x").build()).unwrap();
        assert_markers(&[version], &["y"]);
    }
}
