//! The buffer contract the interpreter edits through, plus a rope-backed
//! reference implementation.
//!
//! The interpreter never owns storage. Everything it needs from the host is
//! expressed by [`TextBuffer`]: three required methods (line count, line text,
//! replace a span) and a set of provided helpers built on them. The provided
//! helpers walk lines, so a host backed by a real text structure should
//! override the addressing helpers the way [`Buffer`] does with `ropey`.
//!
//! # Char offsets
//!
//! Several scanners (words, brackets, sentences) are easiest to express over a
//! flat char sequence. A buffer's flat form is its lines joined by `'\n'` with
//! no trailing terminator, so offset `n` always maps to exactly one
//! [`Position`] and back.

use std::borrow::Cow;
use std::fmt;

use ropey::Rope;

use crate::position::{Position, Range};

// ---------------------------------------------------------------------------
// The contract
// ---------------------------------------------------------------------------

/// A host-owned line-addressable text buffer.
///
/// A buffer always has at least one line; the empty buffer is one empty line.
pub trait TextBuffer {
    /// Number of lines, at least 1.
    fn line_count(&self) -> usize;

    /// The text of line `idx` without its terminator. Out-of-range lines are
    /// empty.
    fn line(&self, idx: usize) -> Cow<'_, str>;

    /// Replace the chars in `range` with `text`. `text` may contain `'\n'`.
    /// Positions past a line end clamp to the line end.
    fn replace(&mut self, range: Range, text: &str);

    // -- Provided -----------------------------------------------------------

    /// Char count of line `idx`.
    fn line_len(&self, idx: usize) -> usize {
        self.line(idx).chars().count()
    }

    /// Total chars in the flat form (lines plus separators).
    fn len_chars(&self) -> usize {
        let lines = self.line_count();
        (0..lines).map(|l| self.line_len(l)).sum::<usize>() + lines.saturating_sub(1)
    }

    /// Flat char offset of a position. Columns clamp to the line length and
    /// lines clamp to the last line.
    fn offset_of(&self, pos: Position) -> usize {
        let last = self.line_count().saturating_sub(1);
        if pos.line > last {
            return self.len_chars();
        }
        let before: usize = (0..pos.line).map(|l| self.line_len(l) + 1).sum();
        before + pos.col.min(self.line_len(pos.line))
    }

    /// Position of a flat char offset, clamped to the end of the buffer.
    fn position_of(&self, offset: usize) -> Position {
        let mut remaining = offset;
        let last = self.line_count().saturating_sub(1);
        for line in 0..last {
            let len = self.line_len(line);
            if remaining <= len {
                return Position::new(line, remaining);
            }
            remaining -= len + 1;
        }
        Position::new(last, remaining.min(self.line_len(last)))
    }

    /// Char at a flat offset; line separators read as `'\n'`.
    fn char_at(&self, offset: usize) -> Option<char> {
        if offset >= self.len_chars() {
            return None;
        }
        let pos = self.position_of(offset);
        Some(self.line(pos.line).chars().nth(pos.col).unwrap_or('\n'))
    }

    /// Char under a position, `None` at or past the line end.
    fn char_at_pos(&self, pos: Position) -> Option<char> {
        if pos.line >= self.line_count() {
            return None;
        }
        self.line(pos.line).chars().nth(pos.col)
    }

    /// The text of a span in flat form.
    fn slice(&self, range: Range) -> String {
        let start = self.offset_of(range.start);
        let end = self.offset_of(range.end);
        (start..end).filter_map(|i| self.char_at(i)).collect()
    }

    /// The whole buffer in flat form.
    fn contents(&self) -> String {
        let mut out = String::new();
        for l in 0..self.line_count() {
            if l > 0 {
                out.push('\n');
            }
            out.push_str(&self.line(l));
        }
        out
    }

    /// Clamp a position to a valid char (or the insertion point past the end
    /// when `past_end` is set).
    fn clamp(&self, pos: Position, past_end: bool) -> Position {
        let line = pos.line.min(self.line_count().saturating_sub(1));
        let len = self.line_len(line);
        let max = if past_end { len } else { len.saturating_sub(1) };
        Position::new(line, pos.col.min(max))
    }

    /// True when the buffer is a single empty line.
    fn is_blank(&self) -> bool {
        self.line_count() == 1 && self.line_len(0) == 0
    }
}

// ---------------------------------------------------------------------------
// Rope-backed buffer
// ---------------------------------------------------------------------------

/// A [`TextBuffer`] over a [`ropey::Rope`]. Line terminators are normalized to
/// `'\n'` on construction.
#[derive(Clone, Default)]
pub struct Buffer {
    rope: Rope,
}

impl Buffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from text, converting `\r\n` and lone `\r` to `\n`.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let normalized = if text.contains('\r') {
            Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
        } else {
            Cow::Borrowed(text)
        };
        Self {
            rope: Rope::from_str(&normalized),
        }
    }

    /// Build from lines joined with `'\n'`.
    #[must_use]
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let joined: Vec<&str> = lines.iter().map(AsRef::as_ref).collect();
        Self::from_text(&joined.join("\n"))
    }

    #[must_use]
    pub const fn rope(&self) -> &Rope {
        &self.rope
    }
}

impl TextBuffer for Buffer {
    fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    fn line(&self, idx: usize) -> Cow<'_, str> {
        if idx >= self.rope.len_lines() {
            return Cow::Borrowed("");
        }
        let line = self.rope.line(idx);
        let text: Cow<'_, str> = line.into();
        match text {
            Cow::Borrowed(s) => Cow::Borrowed(s.strip_suffix('\n').unwrap_or(s)),
            Cow::Owned(mut s) => {
                if s.ends_with('\n') {
                    s.pop();
                }
                Cow::Owned(s)
            }
        }
    }

    fn replace(&mut self, range: Range, text: &str) {
        let start = self.offset_of(range.start);
        let end = self.offset_of(range.end).max(start);
        if end > start {
            self.rope.remove(start..end);
        }
        if !text.is_empty() {
            self.rope.insert(start, text);
        }
    }

    fn line_len(&self, idx: usize) -> usize {
        if idx >= self.rope.len_lines() {
            return 0;
        }
        let line = self.rope.line(idx);
        let len = line.len_chars();
        if len > 0 && line.char(len - 1) == '\n' {
            len - 1
        } else {
            len
        }
    }

    fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    fn offset_of(&self, pos: Position) -> usize {
        if pos.line >= self.rope.len_lines() {
            return self.rope.len_chars();
        }
        self.rope.line_to_char(pos.line) + pos.col.min(self.line_len(pos.line))
    }

    fn position_of(&self, offset: usize) -> Position {
        let offset = offset.min(self.rope.len_chars());
        let line = self.rope.char_to_line(offset);
        Position::new(line, offset - self.rope.line_to_char(line))
    }

    fn char_at(&self, offset: usize) -> Option<char> {
        self.rope.get_char(offset)
    }

    fn slice(&self, range: Range) -> String {
        let start = self.offset_of(range.start);
        let end = self.offset_of(range.end).max(start);
        self.rope.slice(start..end).to_string()
    }

    fn contents(&self) -> String {
        self.rope.to_string()
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("lines", &self.rope.len_lines())
            .field("chars", &self.rope.len_chars())
            .finish()
    }
}
