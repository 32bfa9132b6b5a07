//! Snapshot-based undo/redo.

/// Maximum number of undo states to keep.
pub const MAX_UNDO_HISTORY: usize = 50;

/// Linear undo history over full-state snapshots.
#[derive(Debug, Clone)]
pub struct History<T> {
    past: Vec<T>,
    future: Vec<T>,
    limit: usize,
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> History<T> {
    pub fn new() -> Self {
        Self::with_limit(MAX_UNDO_HISTORY)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self { past: Vec::new(), future: Vec::new(), limit: limit.max(1) }
    }

    /// Push a snapshot taken before a change. Clears the redo path.
    pub fn record(&mut self, snapshot: T) {
        self.past.push(snapshot);
        self.future.clear();

        if self.past.len() > self.limit {
            self.past.remove(0);
        }
    }

    /// Restore the previous snapshot into `current`.
    /// Returns true if undo was performed.
    pub fn undo(&mut self, current: &mut T) -> bool {
        match self.past.pop() {
            Some(previous) => {
                self.future.push(std::mem::replace(current, previous));
                true
            }
            None => false,
        }
    }

    /// Re-apply the last undone snapshot into `current`.
    /// Returns true if redo was performed.
    pub fn redo(&mut self, current: &mut T) -> bool {
        match self.future.pop() {
            Some(next) => {
                self.past.push(std::mem::replace(current, next));
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.past.len()
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}
