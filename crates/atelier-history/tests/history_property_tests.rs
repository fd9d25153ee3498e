//! Property-based tests for the history engine laws.

use atelier_history::diff::diff_snapshots;
use atelier_history::retry::RetryPolicy;
use atelier_history::snapshot::{DesignElement, ElementKind, Geometry, Layer, Snapshot};
use atelier_history::{HistoryStack, TracingErrorPolicy, VersionStore};
use atelier_storage::MemoryStorage;
use atelier_test_utils::assertions::assert_newest_first;
use proptest::prelude::*;
use std::sync::Arc;

/// Operations applied to a history stack.
#[derive(Debug, Clone)]
enum StackOp {
    Record(u32),
    Undo,
    Redo,
}

fn stack_op() -> impl Strategy<Value = StackOp> {
    prop_oneof![
        3 => any::<u32>().prop_map(StackOp::Record),
        2 => Just(StackOp::Undo),
        2 => Just(StackOp::Redo),
    ]
}

fn finite() -> impl Strategy<Value = f64> {
    any::<f64>().prop_filter("finite", |v| v.is_finite())
}

/// Elements with a small id space so snapshots overlap.
fn element_strategy() -> impl Strategy<Value = DesignElement> {
    (0u8..6, finite(), finite(), finite(), finite(), finite()).prop_map(
        |(id, x, y, width, height, rotation)| {
            let mut element = DesignElement::new(
                format!("elm_{id}"),
                ElementKind::Panel,
                "lyr_1",
                Geometry::new(x, y, width, height),
            );
            element.geometry.rotation = rotation;
            element
        },
    )
}

fn snapshot_strategy() -> impl Strategy<Value = Snapshot> {
    prop::collection::vec(element_strategy(), 0..8).prop_map(|elements| Snapshot {
        elements,
        ..Snapshot::blank(Layer::new("lyr_1", "Base"))
    })
}

/// Property: `can_undo` is false exactly when at most one state is recorded.
#[test]
fn prop_can_undo_tracks_past_length() {
    proptest!(|(ops in prop::collection::vec(stack_op(), 0..60), depth in 1usize..10)| {
        let mut stack = HistoryStack::new(depth);
        for op in ops {
            match op {
                StackOp::Record(v) => stack.record(v),
                StackOp::Undo => { stack.undo(); }
                StackOp::Redo => { stack.redo(); }
            }
            prop_assert_eq!(stack.can_undo(), stack.undo_depth() > 1);
            prop_assert!(stack.undo_depth() <= depth);
        }
    });
}

/// Property: undo followed by redo returns to the same current state.
#[test]
fn prop_undo_then_redo_round_trips() {
    proptest!(|(values in prop::collection::vec(any::<u32>(), 2..30))| {
        let mut stack = HistoryStack::new(50);
        for v in &values {
            stack.record(*v);
        }
        let before = stack.current().copied();

        prop_assert!(stack.undo().is_some());
        prop_assert_eq!(stack.redo(), before);
        prop_assert_eq!(stack.current().copied(), before);
    });
}

/// Property: recording always clears the redo history.
#[test]
fn prop_record_clears_future() {
    proptest!(|(values in prop::collection::vec(any::<u32>(), 2..20), undos in 0usize..20, next in any::<u32>())| {
        let mut stack = HistoryStack::new(50);
        for v in &values {
            stack.record(*v);
        }
        for _ in 0..undos {
            stack.undo();
        }
        stack.record(next);
        prop_assert!(!stack.can_redo());
        prop_assert_eq!(stack.current(), Some(&next));
    });
}

/// Property: any sequence of saves keeps the list bounded and newest first.
#[test]
fn prop_saves_respect_retention() {
    proptest!(ProptestConfig::with_cases(32), |(
        snapshots in prop::collection::vec(snapshot_strategy(), 1..12),
        max_versions in 1usize..6
    )| {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let (versions, newest) = runtime.block_on(async {
            let store = VersionStore::new(
                Arc::new(MemoryStorage::new()),
                Arc::new(TracingErrorPolicy),
            )
            .with_max_versions(max_versions)
            .with_retry(RetryPolicy::none());

            let mut newest = None;
            for snapshot in &snapshots {
                newest = store.save_version("dsn_1", snapshot.clone()).await;
            }
            (store.get_versions("dsn_1").await, newest)
        });

        prop_assert_eq!(versions.len(), snapshots.len().min(max_versions));
        assert_newest_first(&versions);
        prop_assert_eq!(Some(&versions[0]), newest.as_ref());
        prop_assert_eq!(versions[0].data(), snapshots.last().unwrap());
    });
}

/// Property: restoring a saved version yields exactly the saved snapshot.
#[test]
fn prop_restore_returns_saved_snapshot() {
    proptest!(ProptestConfig::with_cases(64), |(snapshot in snapshot_strategy())| {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let restored = runtime.block_on(async {
            let store = VersionStore::new(
                Arc::new(MemoryStorage::new()),
                Arc::new(TracingErrorPolicy),
            )
            .with_retry(RetryPolicy::none());

            let version = store
                .save_version_checked("dsn_1", snapshot.clone())
                .await
                .unwrap();
            store
                .restore_version("dsn_1", version.id().as_str())
                .await
                .unwrap()
        });

        prop_assert_eq!(restored, snapshot);
    });
}

/// Property: a snapshot never differs from itself.
#[test]
fn prop_self_diff_is_empty() {
    proptest!(|(snapshot in snapshot_strategy())| {
        prop_assert!(diff_snapshots(&snapshot, &snapshot).is_empty());
    });
}

/// Property: every element id lands in exactly one diff bucket or none.
#[test]
fn prop_diff_buckets_are_disjoint() {
    proptest!(|(a in snapshot_strategy(), b in snapshot_strategy())| {
        let diff = diff_snapshots(&a, &b);
        let mut seen = std::collections::HashSet::new();
        for id in diff
            .added
            .iter()
            .map(|e| &e.id)
            .chain(diff.removed.iter().map(|e| &e.id))
            .chain(diff.modified.iter().map(|c| &c.after.id))
        {
            prop_assert!(seen.insert(id.clone()), "{} reported twice", id);
        }
        for element in &diff.added {
            prop_assert!(a.element(&element.id).is_none());
        }
        for element in &diff.removed {
            prop_assert!(b.element(&element.id).is_none());
        }
    });
}
