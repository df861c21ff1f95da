//! Positions, spans and selections.
//!
//! Coordinates are 0-indexed and count chars, never bytes. A column may equal
//! the line length: that is the insertion point after the last char, which
//! Insert mode and exclusive spans use.

use std::fmt;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A (line, column) pair. Ordered line first, then column.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    pub const ZERO: Self = Self { line: 0, col: 0 };

    #[inline]
    #[must_use]
    pub const fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }

    /// Same line, different column.
    #[inline]
    #[must_use]
    pub const fn with_col(self, col: usize) -> Self {
        Self {
            line: self.line,
            col,
        }
    }
}

impl Ord for Position {
    #[inline]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.line.cmp(&other.line).then(self.col.cmp(&other.col))
    }
}

impl PartialOrd for Position {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pos({}:{})", self.line, self.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.col + 1)
    }
}

// ---------------------------------------------------------------------------
// Range
// ---------------------------------------------------------------------------

/// A half-open char span `[start, end)` with `start <= end`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    /// Panics in debug builds when `start > end`.
    #[inline]
    #[must_use]
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(start <= end, "Range::new requires start <= end");
        Self { start, end }
    }

    /// Build from two positions in either order.
    #[inline]
    #[must_use]
    pub fn ordered(a: Position, b: Position) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    #[inline]
    #[must_use]
    pub const fn point(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    #[inline]
    #[must_use]
    pub const fn is_single_line(self) -> bool {
        self.start.line == self.end.line
    }

    #[inline]
    #[must_use]
    pub fn contains(self, pos: Position) -> bool {
        pos >= self.start && pos < self.end
    }

    /// Lines touched, counting an empty range as one.
    #[inline]
    #[must_use]
    pub const fn line_span(self) -> usize {
        self.end.line - self.start.line + 1
    }
}

impl fmt::Debug for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Range({}:{} .. {}:{})",
            self.start.line, self.start.col, self.end.line, self.end.col
        )
    }
}

// ---------------------------------------------------------------------------
// Range kinds and selections
// ---------------------------------------------------------------------------

/// How an operator reads the boundaries of a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangeKind {
    /// Exact char span.
    #[default]
    Char,
    /// Whole lines from `start.line` to `end.line`, columns ignored.
    Line,
    /// Rectangle: lines `start.line..=end.line`, columns `start.col..end.col`.
    Block,
}

/// A selection as the host sees it: the fixed `anchor` and the moving
/// `active` end, in either order. Both ends are char positions the cursor
/// sits on, so the selected text includes `active` itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub anchor: Position,
    pub active: Position,
    pub kind: RangeKind,
}

impl Selection {
    /// A collapsed selection: just the cursor.
    #[must_use]
    pub const fn cursor(pos: Position) -> Self {
        Self {
            anchor: pos,
            active: pos,
            kind: RangeKind::Char,
        }
    }

    /// `(first, last)` ends in document order.
    #[must_use]
    pub fn bounds(&self) -> (Position, Position) {
        if self.anchor <= self.active {
            (self.anchor, self.active)
        } else {
            (self.active, self.anchor)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // -- Position -----------------------------------------------------------

    #[test]
    fn positions_order_line_first() {
        assert!(Position::new(0, 99) < Position::new(1, 0));
        assert!(Position::new(2, 3) < Position::new(2, 4));
        assert_eq!(Position::new(2, 3).max(Position::new(1, 8)), Position::new(2, 3));
    }

    #[test]
    fn position_display_is_one_indexed() {
        assert_eq!(Position::new(0, 0).to_string(), "1:1");
        assert_eq!(format!("{:?}", Position::new(3, 7)), "Pos(3:7)");
    }

    // -- Range --------------------------------------------------------------

    #[test]
    fn ordered_swaps_backwards_ends() {
        let r = Range::ordered(Position::new(4, 1), Position::new(1, 2));
        assert_eq!(r.start, Position::new(1, 2));
        assert_eq!(r.end, Position::new(4, 1));
        assert_eq!(r.line_span(), 4);
    }

    #[test]
    fn range_is_half_open() {
        let r = Range::new(Position::new(0, 2), Position::new(0, 5));
        assert!(r.contains(Position::new(0, 2)));
        assert!(r.contains(Position::new(0, 4)));
        assert!(!r.contains(Position::new(0, 5)));
        assert!(r.is_single_line());
    }

    #[test]
    fn point_range_is_empty() {
        let r = Range::point(Position::new(3, 3));
        assert!(r.is_empty());
        assert!(!r.contains(Position::new(3, 3)));
    }

    // -- Selection ----------------------------------------------------------

    #[test]
    fn selection_bounds_normalize() {
        let s = Selection {
            anchor: Position::new(2, 0),
            active: Position::new(0, 4),
            kind: RangeKind::Line,
        };
        assert_eq!(s.bounds(), (Position::new(0, 4), Position::new(2, 0)));
        assert_eq!(Selection::cursor(Position::ZERO).bounds().0, Position::ZERO);
    }
}
