//! Operators and the edits that are not motions.
//!
//! An operator runs in two steps. First its target becomes a [`Span`]
//! (a motion, a text object, the doubled-key line form, a search match or a
//! Visual selection). [`region`] then turns the span into the [`Region`] the
//! edit actually touches, applying Vim's exclusive/inclusive/linewise rules:
//!
//! | Span                                  | Region                       |
//! |---------------------------------------|------------------------------|
//! | linewise                              | whole lines                  |
//! | exclusive, ends at col 0 of a later line, starts in the indent | whole lines above the end |
//! | exclusive, ends at col 0 of a later line | chars up to the previous line end |
//! | inclusive                             | chars through the end char   |
//!
//! Put, join, `r`, `~` and `<C-a>` live here too: they edit text without
//! taking a motion.

use tracing::debug;

use crate::buffer::TextBuffer;
use crate::command::{Command, OpTarget};
use crate::error::{Error, Result};
use crate::format::{display_width, format_lines};
use crate::history::end_after;
use crate::increment::{increment_at, increment_in};
use crate::insert::Origin;
use crate::mode::{Mode, VisualKind};
use crate::motion::{first_non_blank, indent_len, MotionKind, Purpose, Span};
use crate::position::{Position, Range};
use crate::register::{Register, RegisterKind};
use crate::search::{compile, match_at_or_next, Match, SearchDirection};
use crate::session::Session;
use crate::text_object;

// ---------------------------------------------------------------------------
// Operator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Delete,
    Change,
    Yank,
    ShiftRight,
    ShiftLeft,
    /// `g~`
    ToggleCase,
    /// `gu`
    Lower,
    /// `gU`
    Upper,
    /// `g?`
    Rot13,
    /// `gq`
    Format,
}

impl Operator {
    /// Operators typed as a single key.
    #[must_use]
    pub const fn from_key(key: char) -> Option<Self> {
        match key {
            'd' => Some(Self::Delete),
            'c' => Some(Self::Change),
            'y' => Some(Self::Yank),
            '>' => Some(Self::ShiftRight),
            '<' => Some(Self::ShiftLeft),
            _ => None,
        }
    }

    /// Operators typed after `g`.
    #[must_use]
    pub const fn from_g_key(key: char) -> Option<Self> {
        match key {
            '~' => Some(Self::ToggleCase),
            'u' => Some(Self::Lower),
            'U' => Some(Self::Upper),
            '?' => Some(Self::Rot13),
            'q' => Some(Self::Format),
            _ => None,
        }
    }

    /// The key that, typed again, makes the operator act on lines.
    #[must_use]
    pub const fn line_key(self) -> char {
        match self {
            Self::Delete => 'd',
            Self::Change => 'c',
            Self::Yank => 'y',
            Self::ShiftRight => '>',
            Self::ShiftLeft => '<',
            Self::ToggleCase => '~',
            Self::Lower => 'u',
            Self::Upper => 'U',
            Self::Rot13 => '?',
            Self::Format => 'q',
        }
    }

    #[must_use]
    pub const fn is_g_operator(self) -> bool {
        matches!(
            self,
            Self::ToggleCase | Self::Lower | Self::Upper | Self::Rot13 | Self::Format
        )
    }

    /// Apply a case operator to `text`. Other operators return it unchanged.
    #[must_use]
    pub fn recase(self, text: &str) -> String {
        match self {
            Self::ToggleCase => text.chars().map(toggle_case).collect(),
            Self::Lower => text.to_lowercase(),
            Self::Upper => text.to_uppercase(),
            Self::Rot13 => text.chars().map(rot13).collect(),
            _ => text.to_string(),
        }
    }
}

fn toggle_case(c: char) -> String {
    if c.is_uppercase() {
        c.to_lowercase().collect()
    } else if c.is_lowercase() {
        c.to_uppercase().collect()
    } else {
        c.to_string()
    }
}

fn rot13(c: char) -> char {
    let rotate = |base: u8| char::from((c as u8 - base + 13) % 26 + base);
    match c {
        'a'..='z' => rotate(b'a'),
        'A'..='Z' => rotate(b'A'),
        _ => c,
    }
}

// ---------------------------------------------------------------------------
// Region
// ---------------------------------------------------------------------------

/// A rectangle of columns over a run of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub first: usize,
    pub last: usize,
    pub left: usize,
    /// Exclusive.
    pub right: usize,
    /// After `$`: every row runs to its line end.
    pub to_eol: bool,
}

impl Block {
    /// The char columns of `line` inside the block.
    fn cols<B: TextBuffer + ?Sized>(&self, buf: &B, line: usize) -> (usize, usize) {
        let len = buf.line_len(line);
        let left = self.left.min(len);
        let right = if self.to_eol { len } else { self.right.min(len) };
        (left, right.max(left))
    }
}

/// The text an operator edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Chars(Range),
    Lines { first: usize, last: usize },
    Block(Block),
}

impl Region {
    /// First and last line touched.
    #[must_use]
    pub const fn lines(&self) -> (usize, usize) {
        match self {
            Self::Chars(r) => (r.start.line, r.end.line),
            Self::Lines { first, last } => (*first, *last),
            Self::Block(b) => (b.first, b.last),
        }
    }
}

/// The region `span` covers. `visual` spans come from a charwise selection,
/// whose inclusive end past the last char takes the line break too.
#[must_use]
pub fn region<B: TextBuffer + ?Sized>(buf: &B, span: Span, visual: bool) -> Region {
    let Span { start, end, kind } = span;
    match kind {
        MotionKind::Linewise => Region::Lines {
            first: start.line,
            last: end.line,
        },
        MotionKind::Exclusive => {
            if !visual && start.line < end.line && end.col == 0 {
                let prev = end.line - 1;
                if start.col <= indent_len(buf, start.line) {
                    return Region::Lines {
                        first: start.line,
                        last: prev,
                    };
                }
                return Region::Chars(Range::new(start, Position::new(prev, buf.line_len(prev))));
            }
            Region::Chars(Range::new(start, end))
        }
        MotionKind::Inclusive => {
            let len = buf.line_len(end.line);
            if end.col < len {
                return Region::Chars(Range::new(start, end.with_col(end.col + 1)));
            }
            if visual && end.line + 1 < buf.line_count() {
                return Region::Chars(Range::new(start, Position::new(end.line + 1, 0)));
            }
            Region::Chars(Range::new(start, Position::new(end.line, len)))
        }
    }
}

/// How an operator was invoked.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OpArgs {
    pub register: Option<char>,
    /// Repeat count for shifts.
    pub count: usize,
    pub force_numbered: bool,
    pub visual: bool,
    /// Start of the target, where a linewise yank leaves the cursor.
    pub start: Position,
}

// ---------------------------------------------------------------------------
// Operator execution
// ---------------------------------------------------------------------------

impl<B: TextBuffer> Session<B> {
    /// Run `op` over a target outside Visual mode.
    pub(crate) fn operate(&mut self, op: Operator, target: &OpTarget, cmd: &Command) -> Result<()> {
        let n = cmd.count1();
        let (span, force_numbered) = match target {
            OpTarget::Line => {
                let last = (self.cursor.line + n - 1).min(self.buffer.line_count() - 1);
                let span = Span::new(self.cursor, Position::new(last, 0), MotionKind::Linewise);
                (span, false)
            }
            OpTarget::Motion(motion) => {
                let purpose = if op == Operator::Change {
                    Purpose::Change
                } else {
                    Purpose::Operator
                };
                let target = self.target(motion, cmd.count, purpose)?;
                let span = Span::between(self.cursor, target.pos, target.kind);
                (span, motion.forces_numbered_register())
            }
            OpTarget::Object { object, inner } => {
                let span = text_object::select(&self.buffer, self.cursor, *object, *inner, n)
                    .ok_or(Error::NoTarget)?;
                (span, false)
            }
            OpTarget::Match { forward } => (self.match_span(*forward)?, true),
        };
        let region = region(&self.buffer, span, false);
        self.apply(
            op,
            region,
            OpArgs {
                register: cmd.register,
                count: 1,
                force_numbered,
                visual: false,
                start: span.start,
            },
        )
    }

    pub(crate) fn apply(&mut self, op: Operator, region: Region, args: OpArgs) -> Result<()> {
        debug!(target: "engine.operator", ?op, ?region, register = ?args.register, "apply");
        match op {
            Operator::Yank => self.yank(region, args),
            Operator::Delete => self.delete_region(region, args),
            Operator::Change => self.change(region, args),
            Operator::ShiftRight | Operator::ShiftLeft => self.shift(op, region, args.count),
            Operator::Format => self.format(region, args.visual),
            Operator::ToggleCase | Operator::Lower | Operator::Upper | Operator::Rot13 => {
                self.map_region(region, |text| op.recase(text));
                self.cursor = match region {
                    Region::Chars(r) => r.start,
                    Region::Lines { first, .. } => Position::new(first, 0),
                    Region::Block(b) => Position::new(b.first, b.left),
                };
            }
        }
        self.desired_col = self.cursor.col;
        Ok(())
    }

    /// The text of `region` as a register value.
    pub(crate) fn region_text(&self, region: Region) -> Register {
        match region {
            Region::Chars(r) => Register::new(self.buffer.slice(r), RegisterKind::Char),
            Region::Lines { first, last } => {
                let mut text = String::new();
                for line in first..=last {
                    text.push_str(&self.buffer.line(line));
                    text.push('\n');
                }
                Register::new(text, RegisterKind::Line)
            }
            Region::Block(b) => {
                let rows: Vec<String> = (b.first..=b.last)
                    .map(|line| {
                        let (left, right) = b.cols(&self.buffer, line);
                        self.buffer.line(line).chars().skip(left).take(right - left).collect()
                    })
                    .collect();
                Register::new(rows.join("\n"), RegisterKind::Block)
            }
        }
    }

    fn yank(&mut self, region: Region, args: OpArgs) {
        self.registers.yank(args.register, self.region_text(region));
        let (first, last) = region.lines();
        self.cursor = match region {
            Region::Chars(r) => r.start,
            Region::Lines { .. } => args.start,
            Region::Block(b) => Position::new(b.first, b.left),
        };
        let n = last - first + 1;
        if n > 2 {
            let what = if matches!(region, Region::Block(_)) { "block of " } else { "" };
            self.set_status(format!("{what}{n} lines yanked"));
        }
    }

    fn delete_region(&mut self, region: Region, args: OpArgs) {
        if let Region::Chars(r) = region {
            if r.is_empty() {
                self.cursor = r.start;
                return;
            }
        }
        self.registers
            .delete(args.register, self.region_text(region), args.force_numbered);
        match region {
            Region::Chars(r) => {
                self.edit(r, "");
                self.cursor = r.start;
                self.report_fewer(r.end.line - r.start.line);
            }
            Region::Lines { first, last } => {
                self.delete_lines(first, last);
                let line = first.min(self.buffer.line_count() - 1);
                self.cursor = Position::new(line, first_non_blank(&self.buffer, line));
                self.report_fewer(last - first + 1);
            }
            Region::Block(b) => {
                self.delete_block(b);
                self.cursor = Position::new(b.first, b.left);
            }
        }
    }

    fn report_fewer(&mut self, n: usize) {
        if n > 2 {
            self.set_status(format!("{n} fewer lines"));
        }
    }

    /// Remove whole lines. The last line takes the break before it with it;
    /// removing every line leaves one empty line.
    pub(crate) fn delete_lines(&mut self, first: usize, last: usize) {
        let count = self.buffer.line_count();
        let last = last.min(count - 1);
        let range = if last + 1 < count {
            Range::new(Position::new(first, 0), Position::new(last + 1, 0))
        } else if first > 0 {
            let prev = first - 1;
            Range::new(
                Position::new(prev, self.buffer.line_len(prev)),
                Position::new(last, self.buffer.line_len(last)),
            )
        } else {
            Range::new(Position::new(0, 0), Position::new(last, self.buffer.line_len(last)))
        };
        self.edit(range, "");
    }

    fn delete_block(&mut self, b: Block) {
        for line in b.first..=b.last {
            let (left, right) = b.cols(&self.buffer, line);
            if right > left {
                self.edit(
                    Range::new(Position::new(line, left), Position::new(line, right)),
                    "",
                );
            }
        }
    }

    fn change(&mut self, region: Region, args: OpArgs) {
        if !matches!(region, Region::Chars(r) if r.is_empty()) {
            self.registers
                .delete(args.register, self.region_text(region), args.force_numbered);
        }
        match region {
            Region::Chars(r) => {
                self.edit(r, "");
                self.cursor = r.start;
                self.begin_insert(Origin::Plain, 1);
            }
            Region::Lines { first, last } => {
                let indent = self.auto_indent(first);
                let end = Position::new(last, self.buffer.line_len(last));
                self.edit(Range::new(Position::new(first, 0), end), &indent);
                self.cursor = Position::new(first, indent.chars().count());
                self.begin_insert(Origin::Plain, 1);
            }
            Region::Block(b) => {
                self.delete_block(b);
                self.cursor = Position::new(b.first, b.left);
                self.begin_insert(
                    Origin::Block {
                        first: b.first,
                        last: b.last,
                        col: b.left,
                        to_eol: false,
                        append: false,
                    },
                    1,
                );
            }
        }
    }

    /// Leading whitespace of `line` when `autoindent` is on.
    pub(crate) fn auto_indent(&self, line: usize) -> String {
        if !self.options.autoindent {
            return String::new();
        }
        self.buffer
            .line(line)
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .collect()
    }

    /// Indent text `width` columns wide.
    fn make_indent(&self, width: usize) -> String {
        if self.options.expandtab {
            return " ".repeat(width);
        }
        let ts = self.options.tabstop.max(1);
        format!("{}{}", "\t".repeat(width / ts), " ".repeat(width % ts))
    }

    fn shift(&mut self, op: Operator, region: Region, times: usize) {
        let (first, last) = region.lines();
        let amount = self.options.shift() * times;
        let right = op == Operator::ShiftRight;
        for line in first..=last {
            let text = self.buffer.line(line).into_owned();
            if right && text.is_empty() {
                continue;
            }
            let indent_chars = indent_len(&self.buffer, line);
            let indent: String = text.chars().take(indent_chars).collect();
            let width = display_width(&indent, self.options.tabstop);
            let width = if right { width + amount } else { width.saturating_sub(amount) };
            let replacement = self.make_indent(width);
            if replacement != indent {
                self.edit(
                    Range::new(Position::new(line, 0), Position::new(line, indent_chars)),
                    &replacement,
                );
            }
        }
        self.cursor = Position::new(first, first_non_blank(&self.buffer, first));
        let n = last - first + 1;
        if n > 2 {
            let key = if right { '>' } else { '<' };
            let plural = if times == 1 { "time" } else { "times" };
            self.set_status(format!("{n} lines {key}ed {times} {plural}"));
        }
    }

    fn format(&mut self, region: Region, visual: bool) {
        let (first, last) = region.lines();
        let lines: Vec<String> = (first..=last)
            .map(|l| self.buffer.line(l).into_owned())
            .collect();
        let out = format_lines(&lines, self.options.textwidth, self.options.tabstop);
        if out != lines {
            let end = Position::new(last, self.buffer.line_len(last));
            self.edit(Range::new(Position::new(first, 0), end), &out.join("\n"));
        }
        let line = if visual { first + out.len().saturating_sub(1) } else { first };
        self.cursor = Position::new(line, 0);
    }

    /// Rewrite the text of `region` through `f`, line by line for line and
    /// block regions. Line breaks inside a char region pass through `f`.
    fn map_region(&mut self, region: Region, f: impl Fn(&str) -> String) {
        match region {
            Region::Chars(r) => {
                let text = self.buffer.slice(r);
                let mapped = f(&text);
                if mapped != text {
                    self.edit(r, &mapped);
                }
            }
            Region::Lines { first, last } => {
                for line in first..=last {
                    let len = self.buffer.line_len(line);
                    self.map_range(Range::new(Position::new(line, 0), Position::new(line, len)), &f);
                }
            }
            Region::Block(b) => {
                for line in b.first..=b.last {
                    let (left, right) = b.cols(&self.buffer, line);
                    self.map_range(
                        Range::new(Position::new(line, left), Position::new(line, right)),
                        &f,
                    );
                }
            }
        }
    }

    fn map_range(&mut self, range: Range, f: &impl Fn(&str) -> String) {
        let text = self.buffer.slice(range);
        let mapped = f(&text);
        if mapped != text {
            self.edit(range, &mapped);
        }
    }

    // ── gn ──

    /// The match `gn`/`gN` act on.
    pub(crate) fn find_match(&self, forward: bool) -> Result<Match> {
        let last = self.search.last().ok_or(Error::NoPreviousPattern)?;
        let pattern = compile(&last.pattern, last.direction.prefix(), &self.options)?;
        match_at_or_next(
            &self.buffer,
            &pattern,
            self.cursor,
            SearchDirection::from_forward(forward),
            self.options.wrapscan,
        )
        .filter(|m| !m.is_empty())
        .ok_or_else(|| Error::PatternNotFound(last.pattern.clone()))
    }

    /// Position of the last char of `m`.
    pub(crate) fn match_last(&self, m: Match) -> Position {
        let end = self.buffer.offset_of(m.end);
        self.buffer.position_of(end.saturating_sub(1).max(self.buffer.offset_of(m.start)))
    }

    fn match_span(&self, forward: bool) -> Result<Span> {
        let m = self.find_match(forward)?;
        Ok(Span::new(m.start, self.match_last(m), MotionKind::Inclusive))
    }

    // ── Put ──

    pub(crate) fn put(
        &mut self,
        name: Option<char>,
        count: usize,
        before: bool,
        cursor_after: bool,
    ) -> Result<()> {
        let reg = self.registers.get(name).clone();
        if reg.is_empty() {
            return Err(Error::NoTarget);
        }
        if let Mode::Visual { kind, anchor } = self.mode {
            self.put_over_selection(&reg, count, kind, anchor);
            return Ok(());
        }
        match reg.kind() {
            RegisterKind::Char => self.put_chars(reg.content(), count, before, cursor_after),
            RegisterKind::Line => self.put_lines(reg.content(), count, before, cursor_after),
            RegisterKind::Block => self.put_block(&reg.rows(), count, before),
        }
        self.desired_col = self.cursor.col;
        Ok(())
    }

    fn put_chars(&mut self, content: &str, count: usize, before: bool, cursor_after: bool) {
        let text = content.repeat(count);
        let len = self.buffer.line_len(self.cursor.line);
        let at = if before || len == 0 {
            self.cursor
        } else {
            self.cursor.with_col((self.cursor.col + 1).min(len))
        };
        self.edit(Range::point(at), &text);
        let end = end_after(at, &text);
        self.cursor = if cursor_after {
            end
        } else if text.contains('\n') {
            at
        } else {
            Position::new(end.line, end.col.saturating_sub(1))
        };
    }

    fn put_lines(&mut self, content: &str, count: usize, before: bool, cursor_after: bool) {
        let text = content.repeat(count);
        let line = if before { self.cursor.line } else { self.cursor.line + 1 };
        let count = self.buffer.line_count();
        if line < count {
            self.edit(Range::point(Position::new(line, 0)), &text);
        } else {
            let last = count - 1;
            let body = text.strip_suffix('\n').unwrap_or(&text);
            let end = Position::new(last, self.buffer.line_len(last));
            self.edit(Range::point(end), &format!("\n{body}"));
        }
        self.cursor = if cursor_after {
            Position::new(line + text.matches('\n').count(), 0)
        } else {
            Position::new(line, first_non_blank(&self.buffer, line))
        };
    }

    fn put_block(&mut self, rows: &[&str], count: usize, before: bool) {
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let top = self.cursor.line;
        let len = self.buffer.line_len(top);
        let col = if before || len == 0 { self.cursor.col } else { self.cursor.col + 1 };
        for (i, row) in rows.iter().enumerate() {
            let line = top + i;
            if line >= self.buffer.line_count() {
                let last = self.buffer.line_count() - 1;
                let end = Position::new(last, self.buffer.line_len(last));
                self.edit(Range::point(end), "\n");
            }
            let len = self.buffer.line_len(line);
            let pad = " ".repeat(width - row.chars().count());
            let mut piece = " ".repeat(col.saturating_sub(len));
            for _ in 0..count {
                piece.push_str(row);
                piece.push_str(&pad);
            }
            if len <= col {
                piece.truncate(piece.trim_end_matches(' ').len());
            }
            self.edit(Range::point(Position::new(line, col.min(len))), &piece);
        }
        self.cursor = Position::new(top, col);
    }

    /// `p` in Visual mode: the selection is deleted into the unnamed register
    /// and `reg` takes its place.
    fn put_over_selection(&mut self, reg: &Register, count: usize, kind: VisualKind, anchor: Position) {
        let region = self.visual_region(kind, anchor, false);
        let start = anchor.min(self.cursor);
        self.leave_visual(kind, anchor);
        let args = OpArgs {
            register: None,
            count: 1,
            force_numbered: false,
            visual: true,
            start,
        };
        let whole = matches!(region, Region::Lines { first: 0, last } if last + 1 >= self.buffer.line_count());
        self.delete_region(region, args);
        match (region, reg.kind()) {
            (Region::Lines { first, .. }, kind) => {
                let text = if kind == RegisterKind::Line {
                    reg.content().repeat(count)
                } else {
                    format!("{}\n", reg.content().repeat(count))
                };
                if whole {
                    // The buffer is one empty line now; the text replaces it.
                    self.put_lines(&text, 1, true, false);
                    let last = self.buffer.line_count() - 1;
                    self.delete_lines(last, last);
                    self.cursor = Position::new(0, first_non_blank(&self.buffer, 0));
                } else {
                    self.put_lines(&text, 1, first < self.buffer.line_count(), false);
                }
            }
            (_, RegisterKind::Line) => {
                let at = self.cursor;
                let text = reg.content().repeat(count);
                self.edit(Range::point(at), &format!("\n{text}"));
                let line = at.line + 1;
                self.cursor = Position::new(line, first_non_blank(&self.buffer, line));
            }
            (_, _) => self.put_chars(reg.content(), count, true, false),
        }
        self.desired_col = self.cursor.col;
    }

    // ── Join ──

    /// `J`/`gJ`. A count joins that many lines (at least two).
    pub(crate) fn join(&mut self, count: Option<usize>, spaces: bool) -> Result<()> {
        let (first, lines) = if let Mode::Visual { kind, anchor } = self.mode {
            let (top, bottom) = (anchor.line.min(self.cursor.line), anchor.line.max(self.cursor.line));
            self.leave_visual(kind, anchor);
            (top, bottom - top + 1)
        } else {
            (self.cursor.line, count.unwrap_or(2))
        };
        let lines = lines.max(2);
        let total = self.buffer.line_count();
        if first + 1 >= total {
            return Err(Error::NoTarget);
        }
        let last = (first + lines - 1).min(total - 1);
        let mut col = 0;
        for _ in first..last {
            let current = self.buffer.line(first).into_owned();
            let next = self.buffer.line(first + 1).into_owned();
            let len = current.chars().count();
            let (removed, sep) = if spaces {
                let lead = next.chars().take_while(|c| c.is_whitespace()).count();
                let rest = next.trim_start();
                let bare = rest.is_empty()
                    || current.is_empty()
                    || current.ends_with([' ', '\t'])
                    || rest.starts_with(')');
                (lead, if bare { "" } else { " " })
            } else {
                (0, "")
            };
            self.edit(
                Range::new(Position::new(first, len), Position::new(first + 1, removed)),
                sep,
            );
            col = len;
        }
        self.cursor = Position::new(first, col);
        self.desired_col = col;
        Ok(())
    }

    // ── r and ~ ──

    pub(crate) fn replace_char(&mut self, ch: char, count: usize) -> Result<()> {
        if let Mode::Visual { kind, anchor } = self.mode {
            let region = self.visual_region(kind, anchor, false);
            self.leave_visual(kind, anchor);
            let with = ch.to_string();
            self.map_region(region, |text| {
                text.chars()
                    .map(|c| if c == '\n' { "\n" } else { with.as_str() })
                    .collect()
            });
            self.cursor = match region {
                Region::Chars(r) => r.start,
                Region::Lines { first, .. } => Position::new(first, 0),
                Region::Block(b) => Position::new(b.first, b.left),
            };
            return Ok(());
        }
        let at = self.cursor;
        if at.col + count > self.buffer.line_len(at.line) {
            return Err(Error::NoTarget);
        }
        let range = Range::new(at, at.with_col(at.col + count));
        if ch == '\n' {
            self.edit(range, "\n");
            self.cursor = Position::new(at.line + 1, 0);
        } else {
            self.edit(range, &ch.to_string().repeat(count));
            self.cursor = at.with_col(at.col + count - 1);
        }
        self.desired_col = self.cursor.col;
        Ok(())
    }

    /// `~` outside Visual mode: toggle `count` chars and step past them.
    pub(crate) fn toggle_chars(&mut self, count: usize) -> Result<()> {
        let at = self.cursor;
        let len = self.buffer.line_len(at.line);
        if len == 0 {
            return Err(Error::NoTarget);
        }
        let end = (at.col + count).min(len);
        self.map_range(Range::new(at, at.with_col(end)), &|t: &str| {
            Operator::ToggleCase.recase(t)
        });
        self.cursor = at.with_col(end.min(len - 1));
        self.desired_col = self.cursor.col;
        Ok(())
    }

    // ── <C-a> ──

    pub(crate) fn increment(&mut self, count: usize, negative: bool, progressive: bool) -> Result<()> {
        let step = i64::try_from(count).unwrap_or(i64::MAX);
        let step = if negative { -step } else { step };
        if let Mode::Visual { kind, anchor } = self.mode {
            self.increment_selection(kind, anchor, step, progressive);
            return Ok(());
        }
        let line = self.cursor.line;
        let text = self.buffer.line(line).into_owned();
        let done = increment_at(&text, self.cursor.col, step).ok_or(Error::NoTarget)?;
        self.set_line(line, &done.line);
        self.cursor = Position::new(line, done.cursor);
        self.desired_col = done.cursor;
        Ok(())
    }

    fn increment_selection(&mut self, kind: VisualKind, anchor: Position, step: i64, progressive: bool) {
        let (start, end) = (anchor.min(self.cursor), anchor.max(self.cursor));
        let (left, right) = (anchor.col.min(self.cursor.col), anchor.col.max(self.cursor.col));
        let to_eol = self.desired_col == usize::MAX;
        self.leave_visual(kind, anchor);
        let mut changed = 0;
        for line in start.line..=end.line {
            let len = self.buffer.line_len(line);
            let (lo, hi) = match kind {
                VisualKind::Char => (
                    if line == start.line { start.col } else { 0 },
                    if line == end.line { end.col + 1 } else { len },
                ),
                VisualKind::Line => (0, len),
                VisualKind::Block => (left, if to_eol { len } else { right + 1 }),
            };
            let delta = if progressive { step * (changed + 1) } else { step };
            let text = self.buffer.line(line).into_owned();
            if let Some(done) = increment_in(&text, lo, hi, delta) {
                self.set_line(line, &done.line);
                changed += 1;
            }
        }
        self.cursor = match kind {
            VisualKind::Line => Position::new(start.line, 0),
            VisualKind::Block => Position::new(start.line, left),
            VisualKind::Char => start,
        };
        self.desired_col = self.cursor.col;
    }

    /// Replace the text of `line`.
    pub(crate) fn set_line(&mut self, line: usize, text: &str) {
        let len = self.buffer.line_len(line);
        self.edit(Range::new(Position::new(line, 0), Position::new(line, len)), text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Buffer;
    use pretty_assertions::assert_eq;

    fn p(line: usize, col: usize) -> Position {
        Position::new(line, col)
    }

    #[test]
    fn operator_keys() {
        assert_eq!(Operator::from_key('d'), Some(Operator::Delete));
        assert_eq!(Operator::from_key('g'), None);
        assert_eq!(Operator::from_g_key('?'), Some(Operator::Rot13));
        assert_eq!(Operator::Upper.line_key(), 'U');
        assert!(Operator::Format.is_g_operator());
        assert!(!Operator::Yank.is_g_operator());
    }

    #[test]
    fn case_transforms() {
        assert_eq!(Operator::ToggleCase.recase("aBc 1"), "AbC 1");
        assert_eq!(Operator::Lower.recase("ABC"), "abc");
        assert_eq!(Operator::Upper.recase("straße"), "STRASSE");
        assert_eq!(Operator::Rot13.recase("Hello, World"), "Uryyb, Jbeyq");
        assert_eq!(Operator::Rot13.recase(&Operator::Rot13.recase("abcXYZ")), "abcXYZ");
    }

    #[test]
    fn linewise_span_is_whole_lines() {
        let buf = Buffer::from_lines(&["a", "b", "c"]);
        let span = Span::new(p(0, 0), p(2, 0), MotionKind::Linewise);
        assert_eq!(region(&buf, span, false), Region::Lines { first: 0, last: 2 });
    }

    #[test]
    fn exclusive_to_column_zero_backs_off() {
        let buf = Buffer::from_lines(&["  one two", "three"]);
        // From inside the indent: whole lines.
        let span = Span::new(p(0, 2), p(1, 0), MotionKind::Exclusive);
        assert_eq!(region(&buf, span, false), Region::Lines { first: 0, last: 0 });
        // From mid-line: up to the line end.
        let span = Span::new(p(0, 6), p(1, 0), MotionKind::Exclusive);
        assert_eq!(region(&buf, span, false), Region::Chars(Range::new(p(0, 6), p(0, 9))));
        // Visual selections are taken as they are.
        assert_eq!(region(&buf, span, true), Region::Chars(Range::new(p(0, 6), p(1, 0))));
    }

    #[test]
    fn inclusive_end_takes_its_char() {
        let buf = Buffer::from_lines(&["abc", "def"]);
        let span = Span::new(p(0, 0), p(0, 1), MotionKind::Inclusive);
        assert_eq!(region(&buf, span, false), Region::Chars(Range::new(p(0, 0), p(0, 2))));
        let past = Span::new(p(0, 1), p(0, 3), MotionKind::Inclusive);
        assert_eq!(region(&buf, past, false), Region::Chars(Range::new(p(0, 1), p(0, 3))));
        assert_eq!(region(&buf, past, true), Region::Chars(Range::new(p(0, 1), p(1, 0))));
    }

    #[test]
    fn block_columns_clip_to_each_line() {
        let buf = Buffer::from_lines(&["abcdef", "ab", ""]);
        let b = Block {
            first: 0,
            last: 2,
            left: 1,
            right: 4,
            to_eol: false,
        };
        assert_eq!(b.cols(&buf, 0), (1, 4));
        assert_eq!(b.cols(&buf, 1), (1, 2));
        assert_eq!(b.cols(&buf, 2), (0, 0));
        let eol = Block { to_eol: true, ..b };
        assert_eq!(eol.cols(&buf, 0), (1, 6));
    }
}
