//! Bounded undo/redo history over committed snapshots.
//!
//! # Responsibility
//! - Track `past`, `present` and `future` snapshots of one document.
//! - Separate undoable commits from silent replacements and hard resets.
//!
//! # Invariants
//! - `past` never holds more than `limit` entries; the oldest are dropped.
//! - `commit` clears `future`.
//! - `undo`/`redo` on an empty stack change nothing.

use std::collections::VecDeque;

/// Default number of undo steps kept.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Undo/redo stack around a present value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History<T> {
    /// Oldest first, most recent last.
    past: VecDeque<T>,
    present: T,
    /// Most recent first.
    future: VecDeque<T>,
    limit: usize,
}

impl<T: Clone> History<T> {
    /// Creates a history with the default bound.
    pub fn new(present: T) -> Self {
        Self::with_limit(present, DEFAULT_HISTORY_LIMIT)
    }

    /// Creates a history keeping at most `limit` undo steps.
    pub fn with_limit(present: T, limit: usize) -> Self {
        Self {
            past: VecDeque::new(),
            present,
            future: VecDeque::new(),
            limit,
        }
    }

    /// Current value.
    pub fn present(&self) -> &T {
        &self.present
    }

    /// Maximum number of undo steps kept.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Number of available undo steps.
    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    /// Number of available redo steps.
    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Records `next` as a new undoable step.
    pub fn commit(&mut self, next: T) {
        let previous = std::mem::replace(&mut self.present, next);
        self.past.push_back(previous);
        while self.past.len() > self.limit {
            self.past.pop_front();
        }
        self.future.clear();
    }

    /// Swaps the present value without touching either stack.
    pub fn replace(&mut self, next: T) {
        self.present = next;
    }

    /// Drops all history and starts over from `next`.
    pub fn reset(&mut self, next: T) {
        self.past.clear();
        self.future.clear();
        self.present = next;
    }

    /// Steps back once. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.past.pop_back() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, previous);
        self.future.push_front(current);
        true
    }

    /// Steps forward once. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.future.pop_front() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, next);
        self.past.push_back(current);
        true
    }
}
