//! Bounded linear undo/redo log of whole-document snapshots.
//!
//! The log always holds at least one entry (the document the session
//! started with). Pushing after an undo discards the abandoned redo
//! branch; pushing past capacity evicts the oldest snapshot.

/// Maximum number of snapshots retained.
pub const HISTORY_CAPACITY: usize = 50;

/// Linear history of document snapshots with a cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    entries: Vec<String>,
    index: usize,
    capacity: usize,
}

impl History {
    /// Start a log whose single entry is `initial`.
    pub fn new(initial: impl Into<String>) -> Self {
        Self::with_capacity(initial, HISTORY_CAPACITY)
    }

    /// Start a log with a custom capacity (minimum 1).
    pub fn with_capacity(initial: impl Into<String>, capacity: usize) -> Self {
        Self {
            entries: vec![initial.into()],
            index: 0,
            capacity: capacity.max(1),
        }
    }

    /// Record a snapshot.
    ///
    /// Identical consecutive snapshots are ignored. Returns `true` when an
    /// entry was appended.
    pub fn push(&mut self, snapshot: impl Into<String>) -> bool {
        let snapshot = snapshot.into();
        if self.entries[self.index] == snapshot {
            return false;
        }
        self.entries.truncate(self.index + 1);
        self.entries.push(snapshot);
        if self.entries.len() > self.capacity {
            self.entries.remove(0);
        }
        self.index = self.entries.len() - 1;
        true
    }

    /// Step back one snapshot, returning the document to restore.
    pub fn undo(&mut self) -> Option<&str> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(&self.entries[self.index])
    }

    /// Step forward one snapshot, returning the document to restore.
    pub fn redo(&mut self) -> Option<&str> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        Some(&self.entries[self.index])
    }

    /// Snapshot at the cursor.
    pub fn current(&self) -> &str {
        &self.entries[self.index]
    }

    pub const fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub const fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_history_has_single_entry() {
        let history = History::new("start");
        assert_eq!(history.len(), 1);
        assert_eq!(history.index(), 0);
        assert_eq!(history.current(), "start");
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_push_identical_snapshot_is_ignored() {
        let mut history = History::new("a");
        history.push("b");
        assert!(!history.push("b"));
        assert_eq!(history.index(), 1);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_push_past_capacity_evicts_oldest() {
        let mut history = History::new("0");
        for i in 1..=HISTORY_CAPACITY {
            history.push(i.to_string());
        }
        assert_eq!(history.len(), HISTORY_CAPACITY);
        assert_eq!(history.index(), HISTORY_CAPACITY - 1);
        assert_eq!(history.entries[0], "1");
        assert_eq!(history.current(), HISTORY_CAPACITY.to_string());
    }

    #[test]
    fn test_undo_at_start_is_noop() {
        let mut history = History::new("a");
        assert_eq!(history.undo(), None);
        assert_eq!(history.index(), 0);
    }

    #[test]
    fn test_redo_at_end_is_noop() {
        let mut history = History::new("a");
        history.push("b");
        assert_eq!(history.redo(), None);
        assert_eq!(history.index(), 1);
    }

    #[test]
    fn test_undo_then_redo_restores() {
        let mut history = History::new("a");
        history.push("b");
        history.push("c");
        assert_eq!(history.undo(), Some("b"));
        assert_eq!(history.undo(), Some("a"));
        assert_eq!(history.redo(), Some("b"));
        assert_eq!(history.current(), "b");
    }

    #[test]
    fn test_push_after_undo_discards_redo_branch() {
        let mut history = History::new("a");
        history.push("b");
        history.push("c");
        history.undo();
        history.push("d");
        assert_eq!(history.len(), 3);
        assert!(!history.can_redo());
        assert_eq!(history.undo(), Some("b"));
    }

    #[test]
    fn test_push_matching_undone_entry_still_truncates_only_on_change() {
        let mut history = History::new("a");
        history.push("b");
        history.undo();
        // equal to the current entry, so the redo branch survives
        assert!(!history.push("a"));
        assert!(history.can_redo());
    }

    proptest! {
        #[test]
        fn prop_index_stays_in_bounds(ops in proptest::collection::vec(0u8..3, 0..200)) {
            let mut history = History::new("seed");
            let mut counter = 0usize;
            for op in ops {
                match op {
                    0 => {
                        counter += 1;
                        history.push(format!("v{counter}"));
                    }
                    1 => { history.undo(); }
                    _ => { history.redo(); }
                }
                prop_assert!(history.index() < history.len());
                prop_assert!(history.len() <= HISTORY_CAPACITY);
            }
        }
    }
}
