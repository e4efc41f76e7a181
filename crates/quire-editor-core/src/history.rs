//! Bounded linear undo/redo over snapshots.
//!
//! Snapshots are whole buffers rather than operations: the buffers are
//! small flat strings and a snapshot makes `undo(); redo()` restore the
//! exact prior state by construction.

use std::collections::VecDeque;

pub use quire_common::config::DEFAULT_HISTORY_CAP;

/// A sequence of snapshots with a cursor marking the current one.
///
/// Undo and redo only move the cursor. Recording after an undo discards the
/// redo branch (linear history, not a tree).
#[derive(Debug, Clone)]
pub struct EditHistory<T> {
    entries: VecDeque<T>,
    cursor: usize,
    cap: usize,
}

impl<T> Default for EditHistory<T> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAP)
    }
}

impl<T> EditHistory<T> {
    /// Empty history holding at most `cap` snapshots (minimum 1).
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            entries: VecDeque::with_capacity(cap.min(DEFAULT_HISTORY_CAP)),
            cursor: 0,
            cap,
        }
    }

    /// History seeded with the initial state of a document.
    pub fn with_initial(initial: T, cap: usize) -> Self {
        let mut history = Self::new(cap);
        history.record(initial);
        history
    }

    pub fn record(&mut self, snapshot: T) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push_back(snapshot);
        self.cursor = self.entries.len() - 1;

        while self.entries.len() > self.cap {
            self.entries.pop_front();
            self.cursor -= 1;
        }
    }

    /// Step back one snapshot. `None` when already at the oldest one.
    pub fn undo(&mut self) -> Option<&T> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Step forward one snapshot. `None` when already at the newest one.
    pub fn redo(&mut self) -> Option<&T> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    pub fn current(&self) -> Option<&T> {
        self.entries.get(self.cursor)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Drop everything, e.g. after loading a different document.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}
