//! Undo/redo history.
//!
//! Every buffer mutation the session makes goes through [`History::record`],
//! which stores it as a reversible [`Edit`]. Edits are grouped into
//! transactions, one per completed command: a Normal-mode command is one
//! transaction, an insert session from entry to `<Esc>` is one transaction.
//!
//! ```text
//! history.begin(cursor);
//! history.record(start, removed, inserted);   // after applying it
//! history.commit(cursor);
//! ```
//!
//! Empty transactions are dropped on commit.

use tracing::trace;

use crate::buffer::TextBuffer;
use crate::position::{Position, Range};

// ---------------------------------------------------------------------------
// Edit
// ---------------------------------------------------------------------------

/// One replacement: `removed` was replaced by `inserted` at `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Edit {
    start: Position,
    removed: String,
    inserted: String,
}

impl Edit {
    fn revert<B: TextBuffer + ?Sized>(&self, buf: &mut B) {
        let end = end_after(self.start, &self.inserted);
        buf.replace(Range::new(self.start, end), &self.removed);
    }

    fn apply<B: TextBuffer + ?Sized>(&self, buf: &mut B) {
        let end = end_after(self.start, &self.removed);
        buf.replace(Range::new(self.start, end), &self.inserted);
    }
}

/// Where text ends once placed at `start`.
#[must_use]
pub fn end_after(start: Position, text: &str) -> Position {
    let newlines = text.matches('\n').count();
    if newlines == 0 {
        start.with_col(start.col + text.chars().count())
    } else {
        let tail = text.rsplit('\n').next().unwrap_or("");
        Position::new(start.line + newlines, tail.chars().count())
    }
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Transaction {
    edits: Vec<Edit>,
    cursor_before: Position,
    cursor_after: Position,
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// Linear undo/redo stacks. A new transaction clears the redo stack.
#[derive(Debug, Default)]
pub struct History {
    undo_stack: Vec<Transaction>,
    redo_stack: Vec<Transaction>,
    pending: Option<Transaction>,
}

impl History {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            pending: None,
        }
    }

    /// Open a transaction unless one is already open. Returns whether this
    /// call opened it, so nested callers know who must commit.
    pub fn begin(&mut self, cursor: Position) -> bool {
        if self.pending.is_some() {
            return false;
        }
        self.pending = Some(Transaction {
            edits: Vec::new(),
            cursor_before: cursor,
            cursor_after: cursor,
        });
        true
    }

    /// Record an edit already applied to the buffer. Opens a transaction if
    /// none is pending.
    pub fn record(&mut self, start: Position, removed: String, inserted: String) {
        if removed.is_empty() && inserted.is_empty() {
            return;
        }
        let txn = self.pending.get_or_insert_with(|| Transaction {
            edits: Vec::new(),
            cursor_before: start,
            cursor_after: start,
        });
        txn.edits.push(Edit {
            start,
            removed,
            inserted,
        });
    }

    /// Close the pending transaction. Returns true if it held edits.
    pub fn commit(&mut self, cursor: Position) -> bool {
        let Some(mut txn) = self.pending.take() else {
            return false;
        };
        if txn.edits.is_empty() {
            return false;
        }
        txn.cursor_after = cursor;
        trace!(target: "engine.history", edits = txn.edits.len(), "commit");
        self.undo_stack.push(txn);
        self.redo_stack.clear();
        true
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Undo the newest transaction; returns the cursor to restore.
    pub fn undo<B: TextBuffer + ?Sized>(&mut self, buf: &mut B) -> Option<Position> {
        let txn = self.undo_stack.pop()?;
        for edit in txn.edits.iter().rev() {
            edit.revert(buf);
        }
        let cursor = txn
            .edits
            .iter()
            .map(|e| e.start)
            .min()
            .unwrap_or(txn.cursor_before)
            .min(txn.cursor_before);
        self.redo_stack.push(txn);
        Some(cursor)
    }

    /// Redo the newest undone transaction; returns the cursor to restore.
    pub fn redo<B: TextBuffer + ?Sized>(&mut self, buf: &mut B) -> Option<Position> {
        let txn = self.redo_stack.pop()?;
        for edit in &txn.edits {
            edit.apply(buf);
        }
        let cursor = txn.edits.first().map_or(txn.cursor_after, |e| e.start);
        self.undo_stack.push(txn);
        Some(cursor)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Buffer;
    use pretty_assertions::assert_eq;

    fn edit(h: &mut History, buf: &mut Buffer, range: Range, text: &str) {
        let removed = buf.slice(range);
        buf.replace(range, text);
        h.record(range.start, removed, text.to_string());
    }

    fn r(sl: usize, sc: usize, el: usize, ec: usize) -> Range {
        Range::new(Position::new(sl, sc), Position::new(el, ec))
    }

    #[test]
    fn end_after_counts_lines() {
        assert_eq!(end_after(Position::new(2, 3), "ab"), Position::new(2, 5));
        assert_eq!(end_after(Position::new(2, 3), "ab\ncde"), Position::new(3, 3));
        assert_eq!(end_after(Position::new(0, 0), "x\n"), Position::new(1, 0));
    }

    #[test]
    fn undo_redo_single_transaction() {
        let mut buf = Buffer::from_text("hello world");
        let mut h = History::new();
        h.begin(Position::new(0, 6));
        edit(&mut h, &mut buf, r(0, 6, 0, 11), "there");
        assert!(h.commit(Position::new(0, 10)));
        assert_eq!(buf.contents(), "hello there");

        assert_eq!(h.undo(&mut buf), Some(Position::new(0, 6)));
        assert_eq!(buf.contents(), "hello world");
        assert!(h.can_redo());

        h.redo(&mut buf);
        assert_eq!(buf.contents(), "hello there");
    }

    #[test]
    fn multi_edit_transaction_reverts_in_order() {
        let mut buf = Buffer::from_text("one\ntwo");
        let mut h = History::new();
        h.begin(Position::ZERO);
        edit(&mut h, &mut buf, r(0, 0, 1, 0), "");
        edit(&mut h, &mut buf, r(0, 3, 0, 3), "!\nnew");
        h.commit(Position::ZERO);
        assert_eq!(buf.contents(), "two!\nnew");
        h.undo(&mut buf);
        assert_eq!(buf.contents(), "one\ntwo");
    }

    #[test]
    fn empty_transactions_are_dropped() {
        let mut h = History::new();
        assert!(h.begin(Position::ZERO));
        assert!(!h.begin(Position::ZERO));
        assert!(!h.commit(Position::ZERO));
        assert!(!h.can_undo());
    }

    #[test]
    fn new_edit_clears_redo() {
        let mut buf = Buffer::from_text("a");
        let mut h = History::new();
        edit(&mut h, &mut buf, r(0, 1, 0, 1), "b");
        h.commit(Position::ZERO);
        h.undo(&mut buf);
        edit(&mut h, &mut buf, r(0, 1, 0, 1), "c");
        h.commit(Position::ZERO);
        assert!(!h.can_redo());
        assert_eq!(buf.contents(), "ac");
    }
}
