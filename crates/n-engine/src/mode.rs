//! Editing modes.
//!
//! The session is always in exactly one [`Mode`]. Transitions happen only in
//! the session's dispatch code; this module just describes the states.
//!
//! | Mode    | Cursor limit         | Keys mean          |
//! |---------|----------------------|--------------------|
//! | Normal  | `0..len-1`           | commands           |
//! | Insert  | `0..len`             | text               |
//! | Visual  | `0..len-1`           | selection commands |
//! | Replace | `0..len`             | overwriting text   |

use std::fmt;

use crate::position::{Position, RangeKind};

// ---------------------------------------------------------------------------
// VisualKind
// ---------------------------------------------------------------------------

/// Visual sub-mode, one per entry key (`v`, `V`, `<C-v>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualKind {
    Char,
    Line,
    Block,
}

impl VisualKind {
    /// The span kind operators see for a selection of this kind.
    #[must_use]
    pub const fn range_kind(self) -> RangeKind {
        match self {
            Self::Char => RangeKind::Char,
            Self::Line => RangeKind::Line,
            Self::Block => RangeKind::Block,
        }
    }
}

impl fmt::Display for VisualKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char => f.write_str("VISUAL"),
            Self::Line => f.write_str("VISUAL LINE"),
            Self::Block => f.write_str("VISUAL BLOCK"),
        }
    }
}

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// The current editing mode. Visual carries the fixed end of its selection;
/// the moving end is the session cursor.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    #[default]
    Normal,
    Insert,
    Visual { kind: VisualKind, anchor: Position },
    /// `R`: continuous overwrite until Escape.
    Replace,
}

impl Mode {
    /// Status-line name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Insert => "INSERT",
            Self::Visual { kind, .. } => match kind {
                VisualKind::Char => "VISUAL",
                VisualKind::Line => "VISUAL LINE",
                VisualKind::Block => "VISUAL BLOCK",
            },
            Self::Replace => "REPLACE",
        }
    }

    /// True if the cursor may sit one past the last char.
    #[inline]
    #[must_use]
    pub const fn cursor_past_end(self) -> bool {
        matches!(self, Self::Insert | Self::Replace)
    }

    /// True if keys produce text.
    #[inline]
    #[must_use]
    pub const fn is_input(self) -> bool {
        matches!(self, Self::Insert | Self::Replace)
    }

    #[inline]
    #[must_use]
    pub const fn is_visual(self) -> bool {
        matches!(self, Self::Visual { .. })
    }

    /// The visual sub-mode, if any.
    #[inline]
    #[must_use]
    pub const fn visual_kind(self) -> Option<VisualKind> {
        match self {
            Self::Visual { kind, .. } => Some(kind),
            _ => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visual(kind: VisualKind) -> Mode {
        Mode::Visual {
            kind,
            anchor: Position::ZERO,
        }
    }

    #[test]
    fn default_is_normal() {
        assert_eq!(Mode::default(), Mode::Normal);
    }

    #[test]
    fn display_names() {
        assert_eq!(Mode::Normal.to_string(), "NORMAL");
        assert_eq!(visual(VisualKind::Line).to_string(), "VISUAL LINE");
        assert_eq!(Mode::Replace.display_name(), "REPLACE");
    }

    #[test]
    fn input_modes_allow_past_end() {
        assert!(Mode::Insert.cursor_past_end());
        assert!(Mode::Replace.cursor_past_end());
        assert!(!Mode::Normal.cursor_past_end());
        assert!(!visual(VisualKind::Char).cursor_past_end());
    }

    #[test]
    fn visual_predicates() {
        let m = visual(VisualKind::Block);
        assert!(m.is_visual());
        assert!(!m.is_input());
        assert_eq!(m.visual_kind(), Some(VisualKind::Block));
        assert_eq!(VisualKind::Block.range_kind(), RangeKind::Block);
        assert_eq!(Mode::Insert.visual_kind(), None);
    }
}
