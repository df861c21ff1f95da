//! Word and WORD scanning.
//!
//! | Function              | Key  | Lands on                        |
//! |-----------------------|------|---------------------------------|
//! | [`forward_start`]     | `w`  | first char of the next word     |
//! | [`backward_start`]    | `b`  | first char of the previous word |
//! | [`forward_end`]       | `e`  | last char of this/next word     |
//! | [`backward_end`]      | `ge` | last char of the previous word  |
//!
//! A **word** is a run of word chars (letters, digits, `_`) or a run of other
//! non-blank chars. A **WORD** is any run of non-blank chars. An empty line
//! counts as a word for `w`, `b` and `ge`.
//!
//! Everything works on flat char offsets (see [`crate::buffer`]). The forward
//! scanners return `buf.len_chars()` when they run off the end, which callers
//! clamp for cursor motions and keep as-is for operator spans.

use crate::buffer::TextBuffer;
use crate::position::Position;

// ---------------------------------------------------------------------------
// Character classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// Letters, digits, underscore.
    Word,
    /// Non-blank, non-word chars.
    Punctuation,
    /// Space and tab.
    Blank,
    Newline,
}

#[must_use]
pub fn classify(ch: char) -> CharClass {
    if ch == '\n' {
        CharClass::Newline
    } else if ch.is_whitespace() {
        CharClass::Blank
    } else if ch.is_alphanumeric() || ch == '_' {
        CharClass::Word
    } else {
        CharClass::Punctuation
    }
}

/// WORD classification: every non-blank char is one class.
#[must_use]
pub fn classify_big(ch: char) -> CharClass {
    match classify(ch) {
        CharClass::Punctuation => CharClass::Word,
        other => other,
    }
}

/// Pick the classifier for word (`false`) or WORD (`true`).
#[must_use]
pub fn classifier(big: bool) -> fn(char) -> CharClass {
    if big { classify_big } else { classify }
}

const fn is_token(class: CharClass) -> bool {
    matches!(class, CharClass::Word | CharClass::Punctuation)
}

// ---------------------------------------------------------------------------
// Scanners
// ---------------------------------------------------------------------------

/// `w`/`W`: skip the current token, then blanks and line breaks, stopping at
/// an empty line.
pub fn forward_start<B: TextBuffer + ?Sized>(buf: &B, start: usize, big: bool) -> usize {
    let class = classifier(big);
    let total = buf.len_chars();
    let at = |i: usize| buf.char_at(i).map_or(CharClass::Newline, class);
    if start >= total {
        return total;
    }

    let mut idx = start;
    let start_class = at(idx);
    if is_token(start_class) {
        while idx < total && at(idx) == start_class {
            idx += 1;
        }
    }

    while idx < total {
        match at(idx) {
            CharClass::Word | CharClass::Punctuation => break,
            CharClass::Blank => idx += 1,
            CharClass::Newline => {
                idx += 1;
                // The next line is empty when it starts with another break,
                // or when it is the final (empty) line.
                if idx >= total || at(idx) == CharClass::Newline {
                    break;
                }
            }
        }
    }
    idx.min(total)
}

/// `b`/`B`: step back over blanks and line breaks (an empty line stops the
/// scan), then to the start of that token.
pub fn backward_start<B: TextBuffer + ?Sized>(buf: &B, start: usize, big: bool) -> usize {
    let class = classifier(big);
    let at = |i: usize| buf.char_at(i).map_or(CharClass::Newline, class);
    if start == 0 {
        return 0;
    }

    let mut idx = start - 1;
    loop {
        match at(idx) {
            CharClass::Word | CharClass::Punctuation => break,
            CharClass::Newline if idx == 0 || at(idx - 1) == CharClass::Newline => {
                // `idx` is the break of an empty line.
                return idx;
            }
            _ => {
                if idx == 0 {
                    return 0;
                }
                idx -= 1;
            }
        }
    }

    let token = at(idx);
    while idx > 0 && at(idx - 1) == token {
        idx -= 1;
    }
    idx
}

/// `e`/`E`: advance at least one char, skip blanks and breaks, then run to
/// the last char of the token.
pub fn forward_end<B: TextBuffer + ?Sized>(buf: &B, start: usize, big: bool) -> usize {
    let class = classifier(big);
    let total = buf.len_chars();
    let at = |i: usize| buf.char_at(i).map_or(CharClass::Newline, class);
    if total == 0 {
        return 0;
    }

    let mut idx = start + 1;
    while idx < total && !is_token(at(idx)) {
        idx += 1;
    }
    if idx >= total {
        return total;
    }
    let token = at(idx);
    while idx + 1 < total && at(idx + 1) == token {
        idx += 1;
    }
    idx
}

/// `ge`/`gE`: back off the current token, skip blanks and breaks, land on the
/// last char of the previous token. An empty line stops the scan.
pub fn backward_end<B: TextBuffer + ?Sized>(buf: &B, start: usize, big: bool) -> usize {
    let class = classifier(big);
    let at = |i: usize| buf.char_at(i).map_or(CharClass::Newline, class);

    let mut idx = start;
    let here = at(idx);
    if is_token(here) {
        while idx > 0 && at(idx - 1) == here {
            idx -= 1;
        }
    }
    loop {
        if idx == 0 {
            return 0;
        }
        idx -= 1;
        match at(idx) {
            CharClass::Word | CharClass::Punctuation => return idx,
            CharClass::Newline if idx == 0 || at(idx - 1) == CharClass::Newline => return idx,
            _ => {}
        }
    }
}

/// Span `[start, end)` of the run of same-class chars around `offset`,
/// limited to its line. Blanks form runs too.
pub fn run_at<B: TextBuffer + ?Sized>(buf: &B, offset: usize, big: bool) -> (usize, usize) {
    let class = classifier(big);
    let at = |i: usize| buf.char_at(i).map_or(CharClass::Newline, class);
    let here = at(offset);
    if here == CharClass::Newline {
        return (offset, offset);
    }
    let mut start = offset;
    while start > 0 && at(start - 1) == here {
        start -= 1;
    }
    let mut end = offset + 1;
    let total = buf.len_chars();
    while end < total && at(end) == here {
        end += 1;
    }
    (start, end)
}

// ---------------------------------------------------------------------------
// Line-aware stepping
// ---------------------------------------------------------------------------

/// Result of one [`Walker`] step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// Moved within the line onto a char.
    Char,
    /// Moved onto the end-of-line cell.
    LineEnd,
    /// Crossed into another line.
    Line,
}

/// A cursor that walks text the way the word objects and `dw` count it:
/// each line has a virtual end-of-line cell at `col == len`, and that cell
/// reads as a blank.
pub(crate) struct Walker<'a, B: ?Sized> {
    buf: &'a B,
    pub pos: Position,
    class: fn(char) -> CharClass,
}

impl<'a, B: TextBuffer + ?Sized> Walker<'a, B> {
    pub fn new(buf: &'a B, pos: Position, big: bool) -> Self {
        Self {
            buf,
            pos,
            class: classifier(big),
        }
    }

    /// Class under the cursor; the end-of-line cell is a blank.
    pub fn class(&self) -> CharClass {
        self.buf
            .char_at_pos(self.pos)
            .map_or(CharClass::Blank, self.class)
    }

    pub fn on_blank(&self) -> bool {
        self.class() == CharClass::Blank
    }

    fn line_empty(&self) -> bool {
        self.buf.line_len(self.pos.line) == 0
    }

    /// One cell forward; `None` at the end of the buffer.
    pub fn inc(&mut self) -> Option<Step> {
        let len = self.buf.line_len(self.pos.line);
        if self.pos.col < len {
            self.pos.col += 1;
            Some(if self.pos.col < len { Step::Char } else { Step::LineEnd })
        } else if self.pos.line + 1 < self.buf.line_count() {
            self.pos = Position::new(self.pos.line + 1, 0);
            Some(Step::Line)
        } else {
            None
        }
    }

    /// One cell back; crossing a line lands on its end-of-line cell.
    pub fn dec(&mut self) -> Option<Step> {
        if self.pos.col > 0 {
            self.pos.col -= 1;
            Some(Step::Char)
        } else if self.pos.line > 0 {
            self.pos.line -= 1;
            self.pos.col = self.buf.line_len(self.pos.line);
            Some(Step::Line)
        } else {
            None
        }
    }

    /// Forward, stepping over the end-of-line cell of non-empty lines.
    pub fn incl(&mut self) -> Option<Step> {
        let step = self.inc()?;
        if step != Step::Char && self.pos.col != 0 {
            return self.inc();
        }
        Some(step)
    }

    /// Back, stepping over the end-of-line cell of non-empty lines.
    pub fn decl(&mut self) -> Option<Step> {
        let step = self.dec()?;
        if step == Step::Line && self.pos.col != 0 {
            return self.dec();
        }
        Some(step)
    }

    pub fn oneleft(&mut self) -> bool {
        if self.pos.col == 0 {
            return false;
        }
        self.pos.col -= 1;
        true
    }

    /// True if the cursor is within the line's indent, `extra` cells slack.
    pub fn in_indent(&self, extra: usize) -> bool {
        let indent = self
            .buf
            .line(self.pos.line)
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .count();
        indent >= self.pos.col + extra
    }

    /// Back to the first cell of the same-class run, within the line.
    pub fn back_in_line(&mut self) {
        let start = self.class();
        while self.pos.col > 0 {
            self.pos.col -= 1;
            if self.class() != start {
                self.pos.col += 1;
                break;
            }
        }
    }

    /// Advance while the class stays `class`. True if the buffer ran out.
    fn skip_forward(&mut self, class: CharClass) -> bool {
        while self.class() == class {
            if self.inc().is_none() {
                return true;
            }
        }
        false
    }

    /// `w` as the word objects use it. With `eol`, the last step stops at a
    /// line end instead of crossing it. False when already at the end.
    pub fn fwd_word(&mut self, count: usize, eol: bool) -> bool {
        for remaining in (0..count).rev() {
            let start = self.class();
            let last_line = self.pos.line + 1 >= self.buf.line_count();
            let step = self.inc();
            match step {
                None => return false,
                Some(s) if s != Step::Char && last_line => return false,
                Some(s) if s != Step::Char && eol && remaining == 0 => return true,
                _ => {}
            }
            if start != CharClass::Blank {
                while self.class() == start {
                    match self.inc() {
                        None => return true,
                        Some(s) if s != Step::Char && eol && remaining == 0 => return true,
                        _ => {}
                    }
                }
            }
            while self.on_blank() {
                if self.pos.col == 0 && self.line_empty() {
                    break;
                }
                match self.inc() {
                    None => return true,
                    Some(s) if s != Step::Char && eol && remaining == 0 => return true,
                    _ => {}
                }
            }
        }
        true
    }

    /// `e` as the word objects use it. `stop` keeps the first step from
    /// leaving a word the cursor already ends; `empty` stops on empty lines.
    pub fn end_word(&mut self, count: usize, stop: bool, empty: bool) -> bool {
        let mut stop = stop;
        for _ in 0..count {
            let start = self.class();
            if self.inc().is_none() {
                return false;
            }
            if self.class() == start && start != CharClass::Blank {
                if self.skip_forward(start) {
                    return false;
                }
            } else if !stop || start == CharClass::Blank {
                let mut parked = false;
                while self.on_blank() {
                    if self.pos.col == 0 && self.line_empty() && empty {
                        parked = true;
                        break;
                    }
                    if self.inc().is_none() {
                        return false;
                    }
                }
                if parked {
                    stop = false;
                    continue;
                }
                if self.skip_forward(self.class()) {
                    return false;
                }
            }
            self.dec();
            stop = false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Buffer;
    use crate::position::Position;
    use pretty_assertions::assert_eq;

    fn w(text: &str, from: (usize, usize)) -> Position {
        let b = Buffer::from_text(text);
        let off = b.offset_of(Position::new(from.0, from.1));
        b.position_of(forward_start(&b, off, false))
    }

    fn b_(text: &str, from: (usize, usize)) -> Position {
        let b = Buffer::from_text(text);
        let off = b.offset_of(Position::new(from.0, from.1));
        b.position_of(backward_start(&b, off, false))
    }

    fn e(text: &str, from: (usize, usize), big: bool) -> Position {
        let b = Buffer::from_text(text);
        let off = b.offset_of(Position::new(from.0, from.1));
        b.position_of(forward_end(&b, off, big))
    }

    fn ge(text: &str, from: (usize, usize)) -> Position {
        let b = Buffer::from_text(text);
        let off = b.offset_of(Position::new(from.0, from.1));
        b.position_of(backward_end(&b, off, false))
    }

    fn p(line: usize, col: usize) -> Position {
        Position::new(line, col)
    }

    // -- Classification -----------------------------------------------------

    #[test]
    fn classes() {
        assert_eq!(classify('a'), CharClass::Word);
        assert_eq!(classify('_'), CharClass::Word);
        assert_eq!(classify('é'), CharClass::Word);
        assert_eq!(classify('.'), CharClass::Punctuation);
        assert_eq!(classify('\t'), CharClass::Blank);
        assert_eq!(classify('\n'), CharClass::Newline);
        assert_eq!(classify_big('('), CharClass::Word);
    }

    // -- w ------------------------------------------------------------------

    #[test]
    fn w_basic() {
        assert_eq!(w("hello world", (0, 0)), p(0, 6));
        assert_eq!(w("hello.world", (0, 0)), p(0, 5));
        assert_eq!(w("hello.world", (0, 5)), p(0, 6));
        assert_eq!(w("  hello", (0, 0)), p(0, 2));
    }

    #[test]
    fn w_crosses_lines_and_stops_on_empty() {
        assert_eq!(w("hello\nworld", (0, 2)), p(1, 0));
        assert_eq!(w("hello\n\nworld", (0, 0)), p(1, 0));
        assert_eq!(w("hello\n   \nworld", (0, 0)), p(2, 0));
    }

    #[test]
    fn w_runs_off_the_end() {
        // The end of the buffer is the position after the last char.
        assert_eq!(w("one two", (0, 4)), p(0, 7));
    }

    #[test]
    fn big_w_skips_punctuation() {
        let b = Buffer::from_text("a.b c");
        assert_eq!(forward_start(&b, 0, true), 4);
    }

    // -- b ------------------------------------------------------------------

    #[test]
    fn b_basic() {
        assert_eq!(b_("hello world", (0, 8)), p(0, 6));
        assert_eq!(b_("hello world", (0, 6)), p(0, 0));
        assert_eq!(b_("hello.world", (0, 6)), p(0, 5));
        assert_eq!(b_("hello", (0, 0)), p(0, 0));
    }

    #[test]
    fn b_crosses_lines_and_stops_on_empty() {
        assert_eq!(b_("hello\nworld", (1, 0)), p(0, 0));
        assert_eq!(b_("hello\n\nworld", (2, 0)), p(1, 0));
        assert_eq!(b_("hello\n   \nworld", (2, 0)), p(0, 0));
    }

    // -- e ------------------------------------------------------------------

    #[test]
    fn e_basic() {
        assert_eq!(e("hello world", (0, 0), false), p(0, 4));
        assert_eq!(e("hello world", (0, 4), false), p(0, 10));
        assert_eq!(e("one((( two", (0, 0), false), p(0, 2));
        assert_eq!(e("one((( two", (0, 0), true), p(0, 5));
        assert_eq!(e("a\n\n  bc", (0, 0), false), p(2, 3));
    }

    // -- ge -----------------------------------------------------------------

    #[test]
    fn ge_basic() {
        assert_eq!(ge("one two", (0, 5)), p(0, 2));
        assert_eq!(ge("one\ntwo", (1, 1)), p(0, 2));
        assert_eq!(ge("one\n\ntwo", (2, 0)), p(1, 0));
        assert_eq!(ge("one", (0, 1)), p(0, 0));
    }

    // -- runs ---------------------------------------------------------------

    #[test]
    fn run_covers_same_class() {
        let b = Buffer::from_text("ab  cd.");
        assert_eq!(run_at(&b, 0, false), (0, 2));
        assert_eq!(run_at(&b, 3, false), (2, 4));
        assert_eq!(run_at(&b, 5, false), (4, 6));
        assert_eq!(run_at(&b, 5, true), (4, 7));
    }
}
