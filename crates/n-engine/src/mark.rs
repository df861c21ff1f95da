//! Marks: named positions.
//!
//! | Name      | Scope  | Set by                            |
//! |-----------|--------|-----------------------------------|
//! | `a`-`z`   | buffer | `m{a-z}`                          |
//! | `A`-`Z`   | global | `m{A-Z}`, remembers the buffer    |
//! | `'` `` ` `` | buffer | jumps (position before the jump) |
//! | `^`       | buffer | leaving Insert                    |
//! | `<` `>`   | buffer | leaving Visual                    |
//! | `[` `]`   | buffer | first and last char of a change   |
//!
//! `.` (last change) is read from the change list by the session.
//!
//! Marks follow line insertions and deletions through [`Marks::adjust`].

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::position::Position;

/// Where a mark points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkTarget {
    /// A position in the current buffer.
    Here(Position),
    /// A global mark set in another buffer.
    Elsewhere { buffer: String, pos: Position },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct GlobalMark {
    buffer: String,
    pos: Position,
}

#[derive(Debug, Default, Clone)]
pub struct Marks {
    local: BTreeMap<char, Position>,
    global: BTreeMap<char, GlobalMark>,
}

/// True for names `m` accepts.
#[must_use]
pub const fn is_settable(name: char) -> bool {
    matches!(name, 'a'..='z' | 'A'..='Z' | '\'' | '`' | '[' | ']' | '<' | '>')
}

impl Marks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set mark `name` in `buffer`. `` ` `` is stored as `'`.
    pub fn set(&mut self, name: char, pos: Position, buffer: &str) -> Result<()> {
        match name {
            'A'..='Z' => {
                self.global.insert(
                    name,
                    GlobalMark {
                        buffer: buffer.to_string(),
                        pos,
                    },
                );
            }
            '`' => {
                self.local.insert('\'', pos);
            }
            'a'..='z' | '\'' | '^' | '[' | ']' | '<' | '>' => {
                self.local.insert(name, pos);
            }
            _ => return Err(Error::MarkNotSet(name)),
        }
        Ok(())
    }

    /// Set a mark the editor maintains itself (`'`, `^`, `<`, `>`, `[`,
    /// `]`).
    pub fn remember(&mut self, name: char, pos: Position) {
        self.local.insert(name, pos);
    }

    /// Look up mark `name` from `buffer`.
    pub fn get(&self, name: char, buffer: &str) -> Result<MarkTarget> {
        let name = if name == '`' { '\'' } else { name };
        if let Some(mark) = self.global.get(&name) {
            return Ok(if mark.buffer == buffer {
                MarkTarget::Here(mark.pos)
            } else {
                MarkTarget::Elsewhere {
                    buffer: mark.buffer.clone(),
                    pos: mark.pos,
                }
            });
        }
        self.local
            .get(&name)
            .map(|pos| MarkTarget::Here(*pos))
            .ok_or(Error::MarkNotSet(name))
    }

    /// A local mark, if set.
    #[must_use]
    pub fn local(&self, name: char) -> Option<Position> {
        self.local.get(&name).copied()
    }

    /// Move every mark of `buffer` through `map`, which takes a line number
    /// and returns its new line or `None` if the line is gone. Marks on
    /// deleted lines are dropped.
    pub fn adjust(&mut self, buffer: &str, map: impl Fn(usize) -> Option<usize>) {
        self.local.retain(|_, pos| match map(pos.line) {
            Some(line) => {
                pos.line = line;
                true
            }
            None => false,
        });
        self.global.retain(|_, mark| {
            if mark.buffer != buffer {
                return true;
            }
            match map(mark.pos.line) {
                Some(line) => {
                    mark.pos.line = line;
                    true
                }
                None => false,
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn p(line: usize, col: usize) -> Position {
        Position::new(line, col)
    }

    #[test]
    fn local_marks_stay_in_their_buffer() {
        let mut marks = Marks::new();
        marks.set('a', p(1, 2), "one").unwrap();
        assert_eq!(marks.get('a', "one"), Ok(MarkTarget::Here(p(1, 2))));
        assert_eq!(marks.get('b', "one"), Err(Error::MarkNotSet('b')));
    }

    #[test]
    fn global_marks_name_their_buffer() {
        let mut marks = Marks::new();
        marks.set('A', p(3, 0), "one").unwrap();
        assert_eq!(marks.get('A', "one"), Ok(MarkTarget::Here(p(3, 0))));
        assert_eq!(
            marks.get('A', "two"),
            Ok(MarkTarget::Elsewhere {
                buffer: "one".into(),
                pos: p(3, 0)
            })
        );
    }

    #[test]
    fn backtick_and_quote_share_a_slot() {
        let mut marks = Marks::new();
        marks.set('`', p(2, 4), "x").unwrap();
        assert_eq!(marks.get('\'', "x"), Ok(MarkTarget::Here(p(2, 4))));
    }

    #[test]
    fn adjust_shifts_and_drops() {
        let mut marks = Marks::new();
        marks.set('a', p(1, 0), "x").unwrap();
        marks.set('b', p(3, 1), "x").unwrap();
        marks.set('C', p(3, 0), "y").unwrap();
        // Line 1 deleted.
        marks.adjust("x", |l| match l {
            1 => None,
            l if l > 1 => Some(l - 1),
            l => Some(l),
        });
        assert_eq!(marks.local('a'), None);
        assert_eq!(marks.local('b'), Some(p(2, 1)));
        assert_eq!(marks.get('C', "y"), Ok(MarkTarget::Here(p(3, 0))));
    }

    #[test]
    fn settable_names() {
        assert!(is_settable('q'));
        assert!(is_settable('Q'));
        assert!(!is_settable('.'));
        assert!(!is_settable('1'));
    }
}
