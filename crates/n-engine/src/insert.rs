//! Insert and Replace mode.
//!
//! An insert session starts with the command that entered the mode and ends
//! at `<Esc>`. Everything typed in between is one undo step and one change.
//! On the way out the session:
//!
//! 1. repeats the typed text for a count (`3ia<Esc>` types `aaa`),
//! 2. copies it to the other rows of a Visual-block insert,
//! 3. stores it in `".` and remembers where typing stopped for `gi`,
//! 4. steps the cursor left, onto the last typed char.

use n_keys::{KeyCode, KeyEvent};
use tracing::trace;

use crate::buffer::TextBuffer;
use crate::command::InsertKind;
use crate::format::display_width;
use crate::history::end_after;
use crate::mode::Mode;
use crate::motion::indent_len;
use crate::position::{Position, Range};
use crate::session::Session;
use crate::word::{classify, CharClass};

/// How the session began, which decides what a count repeats and whether
/// the text is copied to other lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Origin {
    Plain,
    /// `o`/`O`: each repeat opens another line with `indent`.
    OpenLine { indent: String },
    /// Visual-block `I`, `A` or `c`.
    Block {
        first: usize,
        last: usize,
        col: usize,
        to_eol: bool,
        append: bool,
    },
    /// `R`
    Replace,
}

#[derive(Debug, Clone)]
pub(crate) struct InsertSession {
    origin: Origin,
    count: usize,
    /// Text typed since the session began or the cursor was last moved by
    /// an arrow key.
    typed: String,
    /// Chars overwritten in Replace mode, `None` for appended ones.
    replaced: Vec<Option<char>>,
    /// `<C-r>` was typed; the next key names a register.
    awaiting_register: bool,
}

impl InsertSession {
    const fn new(origin: Origin, count: usize) -> Self {
        Self {
            origin,
            count,
            typed: String::new(),
            replaced: Vec::new(),
            awaiting_register: false,
        }
    }

    fn forget_typed(&mut self, n: usize) {
        for _ in 0..n {
            self.typed.pop();
        }
    }
}

impl<B: TextBuffer> Session<B> {
    // ── Entering ──

    /// `i`, `a`, `I`, `A`, `o`, `O`, `gi`, `gI`.
    pub(crate) fn start_insert(&mut self, kind: InsertKind, count: usize) {
        let line = self.cursor.line;
        let len = self.buffer.line_len(line);
        let mut origin = Origin::Plain;
        self.cursor = match kind {
            InsertKind::Before => self.cursor,
            InsertKind::After => self.cursor.with_col((self.cursor.col + 1).min(len)),
            InsertKind::LineStart => Position::new(line, indent_len(&self.buffer, line)),
            InsertKind::LineEnd => Position::new(line, len),
            InsertKind::Column0 => Position::new(line, 0),
            InsertKind::Resume => {
                let at = self.insert_point.unwrap_or_default();
                self.buffer.clamp(at, true)
            }
            InsertKind::Below => {
                let indent = self.auto_indent(line);
                self.edit(Range::point(Position::new(line, len)), &format!("\n{indent}"));
                let col = indent.chars().count();
                origin = Origin::OpenLine { indent };
                Position::new(line + 1, col)
            }
            InsertKind::Above => {
                let indent = self.auto_indent(line);
                self.edit(Range::point(Position::new(line, 0)), &format!("{indent}\n"));
                let col = indent.chars().count();
                origin = Origin::OpenLine { indent };
                Position::new(line, col)
            }
        };
        self.begin_insert(origin, count);
    }

    /// `R`
    pub(crate) fn start_replace(&mut self, count: usize) {
        self.begin_insert(Origin::Replace, count);
    }

    pub(crate) fn begin_insert(&mut self, origin: Origin, count: usize) {
        self.mode = if origin == Origin::Replace {
            Mode::Replace
        } else {
            Mode::Insert
        };
        trace!(target: "engine.insert", ?origin, count, at = ?self.cursor, "begin");
        self.insert = Some(InsertSession::new(origin, count.max(1)));
    }

    // ── Keys ──

    pub(crate) fn insert_key(&mut self, key: KeyEvent) {
        if self.recording && !self.replaying {
            if let Some(dot) = &mut self.dot {
                dot.inserted.push(key);
            }
        }
        let Some(mut ins) = self.insert.take() else {
            self.mode = Mode::Normal;
            return;
        };
        if ins.awaiting_register {
            ins.awaiting_register = false;
            if let Some(name) = key.typed_char() {
                let text = self.registers.get(Some(name)).content().to_string();
                self.type_text(&mut ins, &text);
            }
            self.insert = Some(ins);
            return;
        }
        if key.is_escape() {
            self.insert = Some(ins);
            self.finish_insert();
            return;
        }

        if key.is_ctrl('r') {
            ins.awaiting_register = true;
        } else if key.is_ctrl('w') {
            self.delete_word_before(&mut ins);
        } else if key.is_ctrl('u') {
            self.delete_line_before(&mut ins);
        } else if key.is_ctrl('h') {
            self.backspace(&mut ins);
        } else if key.is_ctrl('j') || key.is_ctrl('m') {
            self.newline(&mut ins);
        } else {
            match key.code {
                KeyCode::Enter => self.newline(&mut ins),
                KeyCode::Tab => {
                    let tab = self.tab_text();
                    self.type_text(&mut ins, &tab);
                }
                KeyCode::Backspace => self.backspace(&mut ins),
                KeyCode::Delete => self.delete_under(),
                KeyCode::Left
                | KeyCode::Right
                | KeyCode::Up
                | KeyCode::Down
                | KeyCode::Home
                | KeyCode::End => {
                    self.arrow(key.code);
                    ins.typed.clear();
                    ins.replaced.clear();
                }
                _ => {
                    if let Some(c) = key.typed_char() {
                        self.type_text(&mut ins, c.encode_utf8(&mut [0; 4]));
                    }
                }
            }
        }
        self.insert = Some(ins);
    }

    fn type_text(&mut self, ins: &mut InsertSession, text: &str) {
        if ins.origin == Origin::Replace {
            for c in text.chars() {
                let at = self.cursor;
                if c == '\n' {
                    self.edit(Range::point(at), "\n");
                    self.cursor = Position::new(at.line + 1, 0);
                    ins.replaced.clear();
                    continue;
                }
                let old = self.buffer.char_at_pos(at);
                let end = if old.is_some() { at.with_col(at.col + 1) } else { at };
                self.edit(Range::new(at, end), c.encode_utf8(&mut [0; 4]));
                ins.replaced.push(old);
                self.cursor = at.with_col(at.col + 1);
            }
        } else {
            self.edit(Range::point(self.cursor), text);
            self.cursor = end_after(self.cursor, text);
        }
        ins.typed.push_str(text);
    }

    fn newline(&mut self, ins: &mut InsertSession) {
        let indent = if ins.origin == Origin::Replace {
            String::new()
        } else {
            self.auto_indent(self.cursor.line)
        };
        self.type_text(ins, &format!("\n{indent}"));
    }

    fn tab_text(&self) -> String {
        if !self.options.expandtab {
            return "\t".to_string();
        }
        let ts = self.options.tabstop.max(1);
        let before: String = self
            .buffer
            .line(self.cursor.line)
            .chars()
            .take(self.cursor.col)
            .collect();
        let width = display_width(&before, ts);
        " ".repeat(ts - width % ts)
    }

    fn backspace(&mut self, ins: &mut InsertSession) {
        let at = self.cursor;
        if ins.origin == Origin::Replace {
            if at.col == 0 {
                return;
            }
            let prev = at.with_col(at.col - 1);
            match ins.replaced.pop() {
                Some(Some(original)) => self.edit(Range::new(prev, at), original.encode_utf8(&mut [0; 4])),
                Some(None) => self.edit(Range::new(prev, at), ""),
                None => {}
            }
            self.cursor = prev;
            ins.forget_typed(1);
            return;
        }
        if at.col > 0 {
            let prev = at.with_col(at.col - 1);
            self.edit(Range::new(prev, at), "");
            self.cursor = prev;
        } else if at.line > 0 {
            let prev = Position::new(at.line - 1, self.buffer.line_len(at.line - 1));
            self.edit(Range::new(prev, at), "");
            self.cursor = prev;
        } else {
            return;
        }
        ins.forget_typed(1);
    }

    fn delete_under(&mut self) {
        let at = self.cursor;
        let len = self.buffer.line_len(at.line);
        if at.col < len {
            self.edit(Range::new(at, at.with_col(at.col + 1)), "");
        } else if at.line + 1 < self.buffer.line_count() {
            self.edit(Range::new(at, Position::new(at.line + 1, 0)), "");
        }
    }

    /// `<C-w>`: blanks, then one word or punctuation run, before the cursor.
    fn delete_word_before(&mut self, ins: &mut InsertSession) {
        let at = self.cursor;
        if at.col == 0 {
            self.backspace(ins);
            return;
        }
        let chars: Vec<char> = self.buffer.line(at.line).chars().take(at.col).collect();
        let mut col = chars.len();
        while col > 0 && classify(chars[col - 1]) == CharClass::Blank {
            col -= 1;
        }
        if col > 0 {
            let class = classify(chars[col - 1]);
            while col > 0 && classify(chars[col - 1]) == class {
                col -= 1;
            }
        }
        self.edit(Range::new(at.with_col(col), at), "");
        self.cursor = at.with_col(col);
        ins.forget_typed(chars.len() - col);
    }

    /// `<C-u>`: everything before the cursor back to the indent, or the
    /// indent itself when the cursor is in it.
    fn delete_line_before(&mut self, ins: &mut InsertSession) {
        let at = self.cursor;
        let indent = indent_len(&self.buffer, at.line);
        let col = if at.col > indent { indent } else { 0 };
        if col == at.col {
            return;
        }
        self.edit(Range::new(at.with_col(col), at), "");
        self.cursor = at.with_col(col);
        ins.forget_typed(at.col - col);
    }

    fn arrow(&mut self, code: KeyCode) {
        let at = self.cursor;
        let last = self.buffer.line_count() - 1;
        let pos = match code {
            KeyCode::Left => at.with_col(at.col.saturating_sub(1)),
            KeyCode::Right => at.with_col((at.col + 1).min(self.buffer.line_len(at.line))),
            KeyCode::Up => Position::new(at.line.saturating_sub(1), at.col),
            KeyCode::Down => Position::new((at.line + 1).min(last), at.col),
            KeyCode::Home => at.with_col(0),
            _ => at.with_col(self.buffer.line_len(at.line)),
        };
        self.cursor = self.buffer.clamp(pos, true);
        self.desired_col = self.cursor.col;
    }

    // ── Leaving ──

    pub(crate) fn finish_insert(&mut self) {
        let Some(ins) = self.insert.take() else {
            return;
        };
        if ins.count > 1 && !ins.typed.is_empty() {
            let mut again = InsertSession::new(ins.origin.clone(), 1);
            let text = match &ins.origin {
                Origin::OpenLine { indent } => format!("\n{indent}{}", ins.typed),
                _ => ins.typed.clone(),
            };
            for _ in 1..ins.count {
                self.type_text(&mut again, &text);
            }
        }

        let mut step_left = true;
        if let Origin::Block {
            first,
            last,
            col,
            to_eol,
            append,
        } = ins.origin
        {
            if !ins.typed.is_empty() && !ins.typed.contains('\n') {
                for line in first + 1..=last {
                    let len = self.buffer.line_len(line);
                    let at = if to_eol {
                        len
                    } else if len < col {
                        if !append {
                            continue;
                        }
                        self.edit(Range::point(Position::new(line, len)), &" ".repeat(col - len));
                        col
                    } else {
                        col
                    };
                    self.edit(Range::point(Position::new(line, at)), &ins.typed);
                }
            }
            self.cursor = Position::new(first, col);
            step_left = false;
        }

        let stopped = self.cursor;
        self.insert_point = Some(stopped);
        self.marks.remember('^', stopped);
        self.registers.set_last_insert(ins.typed);
        self.mode = Mode::Normal;
        self.recording = false;
        if step_left && self.cursor.col > 0 {
            self.cursor.col -= 1;
        }
        self.desired_col = self.cursor.col;
        trace!(target: "engine.insert", at = ?self.cursor, "finish");
        self.finish_change();
    }
}
