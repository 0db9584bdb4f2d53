use std::collections::VecDeque;

use super::PageSequence;
use crate::constants::HISTORY_DEPTH;

/// Bounded undo stack of full sequence snapshots.
///
/// Once `capacity` snapshots are held, pushing another drops the oldest.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: VecDeque<PageSequence>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_capacity(HISTORY_DEPTH)
    }
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            snapshots: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, snapshot: PageSequence) {
        if self.capacity == 0 {
            return;
        }
        if self.snapshots.len() == self.capacity {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(snapshot);
    }

    /// Most recent snapshot, or `None` when there is nothing to undo
    pub fn pop(&mut self) -> Option<PageSequence> {
        self.snapshots.pop_back()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}
