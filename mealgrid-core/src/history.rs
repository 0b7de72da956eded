//! Snapshot-based undo/redo history.
//!
//! Every entry is an independent deep copy of the tracked value, so history
//! can never be changed through the live value. Undo/redo is linear: pushing
//! after an undo drops everything past the cursor.

/// Default number of snapshots kept.
pub const DEFAULT_MAX_DEPTH: usize = 50;

#[derive(Debug, Clone)]
pub struct History<T> {
    entries: Vec<T>,
    cursor: usize,
    max_depth: usize,
}

impl<T: Clone> History<T> {
    /// Creates a history holding `initial` as its only entry.
    ///
    /// A `max_depth` of 0 is treated as 1; the cursor always needs an entry
    /// to point at.
    pub fn new(initial: T, max_depth: usize) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
            max_depth: max_depth.max(1),
        }
    }

    /// Records a new state after the cursor.
    pub fn push(&mut self, value: T) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(value);

        let overflow = self.entries.len().saturating_sub(self.max_depth);
        if overflow > 0 {
            self.entries.drain(..overflow);
        }
        self.cursor = self.entries.len() - 1;
    }

    /// Steps back one entry and returns it.
    pub fn undo(&mut self) -> Option<&T> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(&self.entries[self.cursor])
    }

    /// Steps forward one entry and returns it.
    pub fn redo(&mut self) -> Option<&T> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(&self.entries[self.cursor])
    }

    pub fn current(&self) -> &T {
        &self.entries[self.cursor]
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Drops all entries and starts over from `value`.
    pub fn reset(&mut self, value: T) {
        self.entries.clear();
        self.entries.push(value);
        self.cursor = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}
