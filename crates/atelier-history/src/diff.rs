//! Structural diffs between versions.
//!
//! Elements are matched by `id` only. An element whose id changed shows up as
//! one removal plus one addition. Two matched elements count as modified when
//! their JSON encodings differ.

use crate::snapshot::{DesignElement, Snapshot};
use crate::version::Version;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// One element present in both sides with different content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementChange {
    pub before: DesignElement,
    pub after: DesignElement,
}

impl ElementChange {
    pub fn id(&self) -> &str {
        &self.after.id
    }
}

/// Element-level changes between two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionDiff {
    /// Elements only in the newer side, in its order.
    pub added: Vec<DesignElement>,
    /// Elements only in the older side, in its order.
    pub removed: Vec<DesignElement>,
    /// Elements in both with different content, in the newer side's order.
    pub modified: Vec<ElementChange>,
}

impl VersionDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }

    pub fn summary(&self) -> DiffSummary {
        DiffSummary {
            added: self.added.len(),
            removed: self.removed.len(),
            modified: self.modified.len(),
        }
    }
}

/// Change counts for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
}

impl fmt::Display for DiffSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "+{} added, -{} removed, ~{} modified",
            self.added, self.removed, self.modified
        )
    }
}

/// Diff two versions, `a` being the older side.
pub fn diff(a: &Version, b: &Version) -> VersionDiff {
    diff_snapshots(a.data(), b.data())
}

/// Diff two snapshots, `a` being the older side.
///
/// If an id appears more than once on one side, the first occurrence wins.
pub fn diff_snapshots(a: &Snapshot, b: &Snapshot) -> VersionDiff {
    let before = index_by_id(&a.elements);
    let after = index_by_id(&b.elements);

    let mut result = VersionDiff::default();

    for element in first_occurrences(&b.elements) {
        match before.get(element.id.as_str()) {
            None => result.added.push(element.clone()),
            Some(old) if content_differs(old, element) => result.modified.push(ElementChange {
                before: (*old).clone(),
                after: element.clone(),
            }),
            Some(_) => {}
        }
    }

    for element in first_occurrences(&a.elements) {
        if !after.contains_key(element.id.as_str()) {
            result.removed.push(element.clone());
        }
    }

    result
}

fn index_by_id(elements: &[DesignElement]) -> HashMap<&str, &DesignElement> {
    let mut index = HashMap::with_capacity(elements.len());
    for element in elements {
        index.entry(element.id.as_str()).or_insert(element);
    }
    index
}

fn first_occurrences(elements: &[DesignElement]) -> impl Iterator<Item = &DesignElement> {
    let mut seen = HashSet::new();
    elements
        .iter()
        .filter(move |element| seen.insert(element.id.as_str()))
}

// Compares the encoded form. serde_json writes every non-finite number as
// `null`, so a NaN field matches itself here where `PartialEq` would not.
fn content_differs(a: &DesignElement, b: &DesignElement) -> bool {
    match (serde_json::to_string(a), serde_json::to_string(b)) {
        (Ok(a), Ok(b)) => a != b,
        _ => a != b,
    }
}
