//! Jump list and change list.
//!
//! The **jump list** records where the cursor was before a jump (`gg`, `G`,
//! `/`, `n`, `%`, `{`, `'a`, ...). `<C-o>` walks back, `<C-i>` forward.
//!
//! The **change list** records where each buffer-mutating command left the
//! cursor. `g;` walks toward older changes, `g,` toward newer ones. Both fail
//! with Vim's changelist diagnostics instead of silently doing nothing.

use crate::error::{Error, Result};
use crate::position::Position;

const JUMPLIST_MAX: usize = 100;
const CHANGELIST_MAX: usize = 100;

// ---------------------------------------------------------------------------
// JumpList
// ---------------------------------------------------------------------------

/// `current == entries.len()` means "not navigating". The first `back()`
/// saves the live position so `forward()` can return to it.
#[derive(Debug, Default, Clone)]
pub struct JumpList {
    entries: Vec<Position>,
    current: usize,
}

impl JumpList {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            current: 0,
        }
    }

    /// Record the position a jump is leaving. Entries on the same line as
    /// the newest entry replace it.
    pub fn push(&mut self, pos: Position) {
        if self.current < self.entries.len() {
            self.entries.truncate(self.current + 1);
        }
        if let Some(last) = self.entries.last_mut().filter(|l| l.line == pos.line) {
            *last = pos;
        } else {
            self.entries.push(pos);
            if self.entries.len() > JUMPLIST_MAX {
                self.entries.remove(0);
            }
        }
        self.current = self.entries.len();
    }

    /// `<C-o>`, `count` entries back.
    pub fn back(&mut self, live: Position, count: usize) -> Option<Position> {
        if self.entries.is_empty() {
            return None;
        }
        if self.current >= self.entries.len() {
            if self.entries.last().is_none_or(|e| e.line != live.line) {
                self.entries.push(live);
            }
            self.current = self.entries.len() - 1;
        }
        if self.current < count {
            return None;
        }
        self.current -= count;
        Some(self.entries[self.current])
    }

    /// `<C-i>`, `count` entries forward.
    pub fn forward(&mut self, count: usize) -> Option<Position> {
        let target = self.current + count;
        if target >= self.entries.len() {
            return None;
        }
        self.current = target;
        Some(self.entries[target])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// ChangeList
// ---------------------------------------------------------------------------

/// Append-only positions of past changes with a movable cursor.
///
/// `current == entries.len()` is the resting state past the newest change.
#[derive(Debug, Default, Clone)]
pub struct ChangeList {
    entries: Vec<Position>,
    current: usize,
}

impl ChangeList {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            current: 0,
        }
    }

    /// Record where a change left the cursor. A change on the same line as
    /// the newest entry updates that entry.
    pub fn push(&mut self, pos: Position) {
        match self.entries.last_mut() {
            Some(last) if last.line == pos.line => *last = pos,
            _ => {
                self.entries.push(pos);
                if self.entries.len() > CHANGELIST_MAX {
                    self.entries.remove(0);
                }
            }
        }
        self.current = self.entries.len();
    }

    /// `g;`: `count` changes older.
    pub fn back(&mut self, count: usize) -> Result<Position> {
        if self.entries.is_empty() {
            return Err(Error::EmptyChangeList);
        }
        if self.current == 0 {
            return Err(Error::ChangeListStart);
        }
        self.current = self.current.saturating_sub(count);
        Ok(self.entries[self.current])
    }

    /// `g,`: `count` changes newer.
    pub fn forward(&mut self, count: usize) -> Result<Position> {
        if self.entries.is_empty() {
            return Err(Error::EmptyChangeList);
        }
        if self.current + 1 >= self.entries.len() {
            return Err(Error::ChangeListEnd);
        }
        self.current = (self.current + count).min(self.entries.len() - 1);
        Ok(self.entries[self.current])
    }

    /// The newest entry, Vim's `'.` mark.
    #[must_use]
    pub fn last(&self) -> Option<Position> {
        self.entries.last().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn p(line: usize, col: usize) -> Position {
        Position::new(line, col)
    }

    // ── JumpList ─────────────────────────────────────────────────────────

    #[test]
    fn jumplist_same_line_collapses() {
        let mut jl = JumpList::new();
        jl.push(p(3, 0));
        jl.push(p(3, 5));
        assert_eq!(jl.len(), 1);
    }

    #[test]
    fn jumplist_back_and_forward() {
        let mut jl = JumpList::new();
        jl.push(p(0, 0));
        jl.push(p(10, 0));
        assert_eq!(jl.back(p(20, 1), 1), Some(p(10, 0)));
        assert_eq!(jl.back(p(10, 0), 1), Some(p(0, 0)));
        assert_eq!(jl.back(p(0, 0), 1), None);
        assert_eq!(jl.forward(1), Some(p(10, 0)));
        assert_eq!(jl.forward(1), Some(p(20, 1)));
        assert_eq!(jl.forward(1), None);
    }

    #[test]
    fn jumplist_push_truncates_future() {
        let mut jl = JumpList::new();
        jl.push(p(0, 0));
        jl.push(p(5, 0));
        jl.back(p(9, 0), 2);
        jl.push(p(7, 0));
        assert_eq!(jl.forward(1), None);
        assert_eq!(jl.len(), 2);
    }

    #[test]
    fn jumplist_is_bounded() {
        let mut jl = JumpList::new();
        for i in 0..250 {
            jl.push(p(i, 0));
        }
        assert_eq!(jl.len(), JUMPLIST_MAX);
    }

    // ── ChangeList ───────────────────────────────────────────────────────

    #[test]
    fn changelist_empty_errors() {
        let mut cl = ChangeList::new();
        assert_eq!(cl.back(1), Err(Error::EmptyChangeList));
        assert_eq!(cl.forward(1), Err(Error::EmptyChangeList));
    }

    #[test]
    fn changelist_walks_both_ways() {
        let mut cl = ChangeList::new();
        cl.push(p(0, 1));
        cl.push(p(4, 2));
        cl.push(p(8, 0));
        assert_eq!(cl.back(1), Ok(p(8, 0)));
        assert_eq!(cl.back(1), Ok(p(4, 2)));
        assert_eq!(cl.back(5), Ok(p(0, 1)));
        assert_eq!(cl.back(1), Err(Error::ChangeListStart));
        assert_eq!(cl.forward(1), Ok(p(4, 2)));
        assert_eq!(cl.forward(9), Ok(p(8, 0)));
        assert_eq!(cl.forward(1), Err(Error::ChangeListEnd));
    }

    #[test]
    fn changelist_merges_same_line() {
        let mut cl = ChangeList::new();
        cl.push(p(0, 2));
        cl.push(p(0, 5));
        assert_eq!(cl.len(), 1);
        assert_eq!(cl.last(), Some(p(0, 5)));
    }

    #[test]
    fn new_change_resets_cursor() {
        let mut cl = ChangeList::new();
        cl.push(p(0, 0));
        cl.push(p(1, 0));
        cl.back(2).unwrap();
        cl.push(p(2, 0));
        assert_eq!(cl.back(1), Ok(p(2, 0)));
    }
}
