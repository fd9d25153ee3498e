//! In-memory undo/redo stack.
//!
//! `past` holds the current state on top plus every earlier state still
//! reachable by undo; `future` holds states undone since the last edit,
//! nearest first. The very first recorded state is the floor and can never be
//! undone past.
//!
//! The stack does not deduplicate. Callers record once per settled change
//! (not per drag frame) and skip states equal to [`HistoryStack::current`].

use crate::snapshot::Snapshot;
use std::collections::VecDeque;
use tracing::trace;

/// Default maximum number of states kept in `past`.
pub const DEFAULT_MAX_DEPTH: usize = 50;

/// Undo/redo history for one editing session.
#[derive(Debug, Clone)]
pub struct HistoryStack<T = Snapshot> {
    past: VecDeque<T>,
    future: VecDeque<T>,
    max_depth: usize,
}

impl<T: Clone> HistoryStack<T> {
    /// Create an empty stack keeping at most `max_depth` past states.
    ///
    /// A depth below 1 is treated as 1.
    pub fn new(max_depth: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: VecDeque::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Record a new current state.
    ///
    /// Drops the oldest past state when over capacity and always clears the
    /// redo history.
    pub fn record(&mut self, state: T) {
        self.past.push_back(state);
        while self.past.len() > self.max_depth {
            self.past.pop_front();
        }
        if !self.future.is_empty() {
            trace!(discarded = self.future.len(), "Clearing redo history");
            self.future.clear();
        }
    }

    /// Whether there is a state before the current one.
    pub fn can_undo(&self) -> bool {
        self.past.len() >= 2
    }

    /// Step back one state, returning the new current state.
    ///
    /// Returns `None` without touching the stack when at the floor.
    pub fn undo(&mut self) -> Option<T> {
        if !self.can_undo() {
            return None;
        }
        let current = self.past.pop_back()?;
        self.future.push_front(current);
        self.past.back().cloned()
    }

    /// Whether there is an undone state to reapply.
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Reapply the most recently undone state and return it.
    pub fn redo(&mut self) -> Option<T> {
        let next = self.future.pop_front()?;
        self.past.push_back(next.clone());
        Some(next)
    }

    /// The current state, if anything has been recorded.
    pub fn current(&self) -> Option<&T> {
        self.past.back()
    }

    /// Number of states in `past` (including the current one).
    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    /// Number of states available to redo.
    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Drop all history.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    /// Drop all history and start over with `floor` as the only state.
    pub fn reset(&mut self, floor: T) {
        self.clear();
        self.past.push_back(floor);
    }
}

impl<T: Clone> Default for HistoryStack<T> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stack() {
        let mut stack: HistoryStack<u32> = HistoryStack::default();
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
        assert_eq!(stack.undo(), None);
        assert_eq!(stack.redo(), None);
        assert_eq!(stack.current(), None);
    }

    #[test]
    fn test_first_record_is_floor() {
        let mut stack = HistoryStack::new(10);
        stack.record(1);
        assert!(!stack.can_undo());
        assert_eq!(stack.undo(), None);
        assert_eq!(stack.current(), Some(&1));
    }

    #[test]
    fn test_undo_returns_previous() {
        let mut stack = HistoryStack::new(10);
        stack.record(1);
        stack.record(2);
        stack.record(3);

        assert_eq!(stack.undo(), Some(2));
        assert_eq!(stack.undo(), Some(1));
        assert_eq!(stack.undo(), None);
        assert_eq!(stack.current(), Some(&1));
        assert_eq!(stack.redo_depth(), 2);
    }

    #[test]
    fn test_redo_reapplies_in_order() {
        let mut stack = HistoryStack::new(10);
        stack.record(1);
        stack.record(2);
        stack.record(3);
        stack.undo();
        stack.undo();

        assert_eq!(stack.redo(), Some(2));
        assert_eq!(stack.redo(), Some(3));
        assert_eq!(stack.redo(), None);
        assert_eq!(stack.current(), Some(&3));
    }

    #[test]
    fn test_record_after_undo_clears_future() {
        let mut stack = HistoryStack::new(10);
        stack.record("s1");
        stack.record("s2");
        assert_eq!(stack.undo(), Some("s1"));
        assert!(stack.can_redo());

        stack.record("s3");
        assert!(!stack.can_redo());
        assert_eq!(stack.redo(), None);
        assert_eq!(stack.current(), Some(&"s3"));
        assert_eq!(stack.undo(), Some("s1"));
    }

    #[test]
    fn test_max_depth_drops_oldest() {
        let mut stack = HistoryStack::new(3);
        for i in 1..=5 {
            stack.record(i);
        }
        assert_eq!(stack.undo_depth(), 3);
        assert_eq!(stack.undo(), Some(4));
        assert_eq!(stack.undo(), Some(3));
        assert_eq!(stack.undo(), None);
    }

    #[test]
    fn test_zero_depth_keeps_current() {
        let mut stack = HistoryStack::new(0);
        stack.record(1);
        stack.record(2);
        assert_eq!(stack.max_depth(), 1);
        assert_eq!(stack.current(), Some(&2));
        assert!(!stack.can_undo());
    }

    #[test]
    fn test_no_deduplication() {
        let mut stack = HistoryStack::new(10);
        stack.record(7);
        stack.record(7);
        assert!(stack.can_undo());
        assert_eq!(stack.undo(), Some(7));
    }

    #[test]
    fn test_reset() {
        let mut stack = HistoryStack::new(10);
        stack.record(1);
        stack.record(2);
        stack.undo();

        stack.reset(9);
        assert_eq!(stack.current(), Some(&9));
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
    }
}
