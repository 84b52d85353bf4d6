//! Bounded undo history.

use std::collections::VecDeque;

use gallery_core::Snapshot;
use serde::{Deserialize, Serialize};

/// Default number of snapshots kept per stack.
pub const DEFAULT_UNDO_DEPTH: usize = 20;

/// LIFO of snapshots that forgets its oldest entry once full.
#[derive(Debug, Clone)]
pub struct UndoStack {
    entries: VecDeque<Snapshot>,
    capacity: usize,
}

impl UndoStack {
    /// A stack holding at most `capacity` snapshots (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a snapshot, evicting the oldest on overflow. Returns the new depth.
    pub fn push(&mut self, snapshot: Snapshot) -> usize {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(snapshot);
        self.entries.len()
    }

    pub fn pop(&mut self) -> Option<Snapshot> {
        self.entries.pop_back()
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_DEPTH)
    }
}

/// Which history an undo applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UndoKind {
    Edit,
    Shuffle,
}

/// The two independent stacks kept by a wall.
#[derive(Debug, Clone, Default)]
pub struct UndoHistory {
    edits: UndoStack,
    shuffles: UndoStack,
}

impl UndoHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            edits: UndoStack::new(capacity),
            shuffles: UndoStack::new(capacity),
        }
    }

    pub fn stack(&self, kind: UndoKind) -> &UndoStack {
        match kind {
            UndoKind::Edit => &self.edits,
            UndoKind::Shuffle => &self.shuffles,
        }
    }

    pub fn stack_mut(&mut self, kind: UndoKind) -> &mut UndoStack {
        match kind {
            UndoKind::Edit => &mut self.edits,
            UndoKind::Shuffle => &mut self.shuffles,
        }
    }

    /// Forget every snapshot in both stacks.
    pub fn clear(&mut self) {
        self.edits = UndoStack::new(self.edits.capacity());
        self.shuffles = UndoStack::new(self.shuffles.capacity());
    }

    pub fn status(&self) -> HistoryStatus {
        HistoryStatus {
            history_count: self.edits.depth(),
            shuffle_count: self.shuffles.depth(),
            can_undo: !self.edits.is_empty(),
            can_undo_shuffle: !self.shuffles.is_empty(),
        }
    }
}

/// Depth of both stacks, shaped for the admin API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistoryStatus {
    pub history_count: usize,
    pub shuffle_count: usize,
    pub can_undo: bool,
    pub can_undo_shuffle: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use gallery_core::{Action, AssetId, Occupancy, TileId};
    use proptest::prelude::*;

    fn snapshot(n: usize) -> Snapshot {
        let occupancy: Occupancy = [(
            TileId::numbered(gallery_core::SizeClass::Xs, n + 1),
            AssetId::new(format!("a{n}")).unwrap(),
        )]
        .into_iter()
        .collect();
        Snapshot::capture(Action::AssignMany { count: n }, &occupancy)
    }

    #[test]
    fn test_lifo_order() {
        let mut stack = UndoStack::new(5);
        stack.push(snapshot(1));
        stack.push(snapshot(2));
        assert_eq!(stack.pop().unwrap().action, Action::AssignMany { count: 2 });
        assert_eq!(stack.pop().unwrap().action, Action::AssignMany { count: 1 });
        assert!(stack.pop().is_none());
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut stack = UndoStack::new(0);
        assert_eq!(stack.capacity(), 1);
        assert_eq!(stack.push(snapshot(1)), 1);
        assert_eq!(stack.push(snapshot(2)), 1);
        assert_eq!(stack.pop().unwrap().action, Action::AssignMany { count: 2 });
    }

    #[test]
    fn test_overflow_evicts_oldest() {
        let mut stack = UndoStack::new(3);
        for n in 0..5 {
            stack.push(snapshot(n));
        }
        let remaining: Vec<_> = std::iter::from_fn(|| stack.pop())
            .map(|s| s.action)
            .collect();
        assert_eq!(
            remaining,
            vec![
                Action::AssignMany { count: 4 },
                Action::AssignMany { count: 3 },
                Action::AssignMany { count: 2 },
            ]
        );
    }

    #[test]
    fn test_history_stacks_are_independent() {
        let mut history = UndoHistory::new(4);
        history.stack_mut(UndoKind::Edit).push(snapshot(1));
        let status = history.status();
        assert_eq!(status.history_count, 1);
        assert_eq!(status.shuffle_count, 0);
        assert!(status.can_undo);
        assert!(!status.can_undo_shuffle);
    }

    proptest! {
        #[test]
        fn prop_depth_is_min_of_pushes_and_capacity(capacity in 0usize..30, pushes in 0usize..60) {
            let mut stack = UndoStack::new(capacity);
            for n in 0..pushes {
                let depth = stack.push(snapshot(n));
                prop_assert_eq!(depth, (n + 1).min(capacity.max(1)));
            }
            prop_assert_eq!(stack.depth(), pushes.min(capacity.max(1)));
        }
    }
}
