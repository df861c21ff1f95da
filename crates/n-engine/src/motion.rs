//! Motions: cursor movement that doubles as an operator target.
//!
//! [`resolve`] turns a [`Motion`] and its count into a [`Target`]: where the
//! cursor lands and how an operator reads the distance to it. The three
//! kinds follow Vim:
//!
//! | Kind      | Motions                                                   |
//! |-----------|-----------------------------------------------------------|
//! | exclusive | `h l 0 ^ w W b B ( ) { } F T ]) ]} [( [{ <BS> <Space>`    |
//! | inclusive | `e E ge gE $ g_ f t %`                                    |
//! | linewise  | `j k + - _ <CR> G gg <C-d> <C-u>`                         |
//!
//! Searches, marks and `;`/`,` depend on session state, so the session
//! resolves those itself and only hands concrete motions to this module.

use tracing::trace;

use crate::buffer::TextBuffer;
use crate::options::Options;
use crate::position::Position;
use crate::text_object::{find_close, find_open, sentences};
use crate::word::{self, Walker};

// ---------------------------------------------------------------------------
// Kinds and spans
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionKind {
    /// The end position is not part of the span.
    Exclusive,
    /// The end position is the last char of the span.
    Inclusive,
    /// Whole lines from `start.line` to `end.line`.
    Linewise,
}

/// A region an operator acts on, ordered so `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
    pub kind: MotionKind,
}

impl Span {
    #[must_use]
    pub const fn new(start: Position, end: Position, kind: MotionKind) -> Self {
        Self { start, end, kind }
    }

    /// The span between the cursor and a motion target, in buffer order.
    #[must_use]
    pub fn between(cursor: Position, target: Position, kind: MotionKind) -> Self {
        if target < cursor {
            Self::new(target, cursor, kind)
        } else {
            Self::new(cursor, target, kind)
        }
    }
}

// ---------------------------------------------------------------------------
// Motions
// ---------------------------------------------------------------------------

/// `f`, `F`, `t`, `T`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindKind {
    Forward,
    Backward,
    TillForward,
    TillBackward,
}

impl FindKind {
    #[must_use]
    pub const fn from_key(key: char) -> Option<Self> {
        match key {
            'f' => Some(Self::Forward),
            'F' => Some(Self::Backward),
            't' => Some(Self::TillForward),
            'T' => Some(Self::TillBackward),
            _ => None,
        }
    }

    /// The same search in the other direction, for `,`.
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
            Self::TillForward => Self::TillBackward,
            Self::TillBackward => Self::TillForward,
        }
    }

    pub(crate) const fn is_forward(self) -> bool {
        matches!(self, Self::Forward | Self::TillForward)
    }

    pub(crate) const fn is_till(self) -> bool {
        matches!(self, Self::TillForward | Self::TillBackward)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Motion {
    /// `h`, `<Left>`
    Left,
    /// `l`, `<Right>`
    Right,
    /// `<BS>`
    BackspaceLeft,
    /// `<Space>`
    SpaceRight,
    /// `k`, `<Up>`
    Up,
    /// `j`, `<Down>`
    Down,
    /// `0`, `<Home>`
    LineStart,
    /// `^`
    FirstNonBlank,
    /// `$`, `<End>`
    LineEnd,
    /// `g_`
    LastNonBlank,
    /// `+`, `<CR>`
    NextLineStart,
    /// `-`
    PrevLineStart,
    /// `_`
    CurrentLineStart,
    WordForward { big: bool },
    WordBackward { big: bool },
    WordEnd { big: bool },
    WordEndBackward { big: bool },
    /// `G`: count is the line number, last line without one.
    GotoLine,
    /// `gg`
    GotoFirstLine,
    Find { kind: FindKind, ch: char },
    /// `;` (`reverse = false`) and `,`.
    RepeatFind { reverse: bool },
    /// `%`
    MatchPair,
    /// `])` `]}` `[(` `[{`, keyed by the bracket searched for.
    Unmatched(char),
    ParagraphForward,
    ParagraphBackward,
    SentenceForward,
    SentenceBackward,
    /// `/` and `?` with the typed text, which may carry an offset.
    Search { forward: bool, text: String },
    /// `n` (`reverse = false`) and `N`.
    SearchNext { reverse: bool },
    /// `*` and `#`.
    SearchWord { forward: bool },
    /// `` `x `` (`exact`) and `'x`.
    Mark { name: char, exact: bool },
    HalfPageDown,
    HalfPageUp,
}

impl Motion {
    /// Motions that need session state to resolve.
    #[must_use]
    pub const fn is_stateful(&self) -> bool {
        matches!(
            self,
            Self::RepeatFind { .. }
                | Self::Search { .. }
                | Self::SearchNext { .. }
                | Self::SearchWord { .. }
                | Self::Mark { .. }
        )
    }

    /// Motions Vim always records in `"1` when deleting, even within a line.
    #[must_use]
    pub const fn forces_numbered_register(&self) -> bool {
        matches!(
            self,
            Self::MatchPair
                | Self::SentenceForward
                | Self::SentenceBackward
                | Self::ParagraphForward
                | Self::ParagraphBackward
                | Self::Search { .. }
                | Self::SearchNext { .. }
                | Self::SearchWord { .. }
                | Self::Mark { exact: true, .. }
        )
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// What the motion is resolved for. Operators read some motions differently
/// (`w` stops at a line end, `l` may reach past the last char).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Purpose {
    #[default]
    Move,
    Operator,
    /// The `c` operator, which turns `w` into `e`.
    Change,
}

#[derive(Debug, Clone, Copy)]
pub struct MotionContext<'a> {
    pub options: &'a Options,
    /// Sticky column for vertical motions; `usize::MAX` after `$`.
    pub desired_col: usize,
    pub purpose: Purpose,
    /// Visual mode lets `$` land on the end-of-line cell.
    pub visual: bool,
}

impl MotionContext<'_> {
    const fn for_operator(&self) -> bool {
        !matches!(self.purpose, Purpose::Move)
    }
}

/// How a motion changes the sticky column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// Vertical motions keep it.
    Keep,
    /// Horizontal motions set it to the new column.
    Update,
    /// `$` pins it to the line end.
    LineEnd,
}

/// A resolved motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub pos: Position,
    pub kind: MotionKind,
    /// Whether the motion is a jump (recorded in the jump list).
    pub jump: bool,
    pub column: Column,
}

impl Target {
    pub(crate) const fn new(pos: Position, kind: MotionKind, column: Column) -> Self {
        Self {
            pos,
            kind,
            jump: false,
            column,
        }
    }

    pub(crate) const fn jump(mut self) -> Self {
        self.jump = true;
        self
    }
}

/// Resolve `motion` from `cursor`. `None` means the motion failed (Vim
/// beeps); stateful motions always return `None` here.
pub fn resolve<B: TextBuffer + ?Sized>(
    buf: &B,
    cursor: Position,
    motion: &Motion,
    count: Option<usize>,
    ctx: &MotionContext<'_>,
) -> Option<Target> {
    let n = count.unwrap_or(1).max(1);
    let last_line = buf.line_count().saturating_sub(1);
    let opts = ctx.options;

    let target = match motion {
        Motion::Left => left(buf, cursor, n, opts.wraps('h'), ctx),
        Motion::BackspaceLeft => left(buf, cursor, n, opts.wraps('b'), ctx),
        Motion::Right => right(buf, cursor, n, opts.wraps('l'), ctx),
        Motion::SpaceRight => right(buf, cursor, n, opts.wraps('s'), ctx),

        Motion::Up | Motion::Down => {
            let line = if *motion == Motion::Up {
                cursor.line.saturating_sub(n)
            } else {
                (cursor.line + n).min(last_line)
            };
            let pos = Position::new(line, sticky_col(buf, line, ctx));
            Some(Target::new(pos, MotionKind::Linewise, Column::Keep))
        }

        Motion::LineStart => Some(Target::new(
            cursor.with_col(0),
            MotionKind::Exclusive,
            Column::Update,
        )),
        Motion::FirstNonBlank => Some(Target::new(
            cursor.with_col(first_non_blank(buf, cursor.line)),
            MotionKind::Exclusive,
            Column::Update,
        )),
        Motion::LineEnd => {
            let line = (cursor.line + n - 1).min(last_line);
            let len = buf.line_len(line);
            let col = if ctx.visual { len } else { len.saturating_sub(1) };
            Some(Target::new(
                Position::new(line, col),
                MotionKind::Inclusive,
                Column::LineEnd,
            ))
        }
        Motion::LastNonBlank => {
            let line = (cursor.line + n - 1).min(last_line);
            Some(Target::new(
                Position::new(line, last_non_blank(buf, line)),
                MotionKind::Inclusive,
                Column::Update,
            ))
        }

        Motion::NextLineStart | Motion::PrevLineStart | Motion::CurrentLineStart => {
            let line = match motion {
                Motion::NextLineStart => (cursor.line + n).min(last_line),
                Motion::PrevLineStart => cursor.line.saturating_sub(n),
                _ => (cursor.line + n - 1).min(last_line),
            };
            Some(line_target(buf, line))
        }
        Motion::GotoLine => {
            let line = count.map_or(last_line, |c| c.saturating_sub(1).min(last_line));
            Some(line_target(buf, line).jump())
        }
        Motion::GotoFirstLine => {
            let line = count.map_or(0, |c| c.saturating_sub(1).min(last_line));
            Some(line_target(buf, line).jump())
        }

        Motion::WordForward { big } => word_forward(buf, cursor, n, *big, ctx),
        Motion::WordEnd { big } => word_end(buf, cursor, n, *big, false),
        Motion::WordBackward { big } => {
            let start = buf.offset_of(cursor);
            let off = (0..n).fold(start, |off, _| word::backward_start(buf, off, *big));
            (off != start).then(|| {
                Target::new(buf.position_of(off), MotionKind::Exclusive, Column::Update)
            })
        }
        Motion::WordEndBackward { big } => {
            let start = buf.offset_of(cursor);
            let off = (0..n).fold(start, |off, _| word::backward_end(buf, off, *big));
            (off != start).then(|| {
                Target::new(buf.position_of(off), MotionKind::Inclusive, Column::Update)
            })
        }

        Motion::Find { kind, ch } => find_char(buf, cursor, *kind, *ch, n, false).map(|pos| {
            let mk = if kind.is_forward() {
                MotionKind::Inclusive
            } else {
                MotionKind::Exclusive
            };
            Target::new(pos, mk, Column::Update)
        }),

        Motion::MatchPair => match count {
            // `N%` goes to N percent of the file.
            Some(pct) if pct <= 100 => {
                let line = (pct * buf.line_count()).div_ceil(100).saturating_sub(1);
                Some(line_target(buf, line.min(last_line)).jump())
            }
            Some(_) => None,
            None => match_pair(buf, cursor)
                .map(|pos| Target::new(pos, MotionKind::Inclusive, Column::Update).jump()),
        },
        Motion::Unmatched(ch) => unmatched(buf, cursor, *ch, n)
            .map(|pos| Target::new(pos, MotionKind::Exclusive, Column::Update)),

        Motion::ParagraphForward => paragraph(buf, cursor, n, true),
        Motion::ParagraphBackward => paragraph(buf, cursor, n, false),
        Motion::SentenceForward => sentence(buf, cursor, n, true, ctx),
        Motion::SentenceBackward => sentence(buf, cursor, n, false, ctx),

        Motion::HalfPageDown | Motion::HalfPageUp => {
            let amount = count.unwrap_or_else(|| opts.scroll_amount());
            let line = if *motion == Motion::HalfPageDown {
                if cursor.line >= last_line {
                    return None;
                }
                (cursor.line + amount).min(last_line)
            } else {
                if cursor.line == 0 {
                    return None;
                }
                cursor.line.saturating_sub(amount)
            };
            Some(line_target(buf, line))
        }

        Motion::RepeatFind { .. }
        | Motion::Search { .. }
        | Motion::SearchNext { .. }
        | Motion::SearchWord { .. }
        | Motion::Mark { .. } => None,
    };

    trace!(target: "engine.motion", ?motion, n, from = ?cursor, to = ?target.map(|t| t.pos), "resolve");
    target
}

// ---------------------------------------------------------------------------
// Line helpers
// ---------------------------------------------------------------------------

/// Column of the first non-blank char, or the last char of a blank line.
#[must_use]
pub fn first_non_blank<B: TextBuffer + ?Sized>(buf: &B, line: usize) -> usize {
    let text = buf.line(line);
    let indent = text.chars().take_while(|c| c.is_whitespace()).count();
    indent.min(text.chars().count().saturating_sub(1))
}

/// Width of the leading blank run in chars.
#[must_use]
pub fn indent_len<B: TextBuffer + ?Sized>(buf: &B, line: usize) -> usize {
    buf.line(line)
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .count()
}

fn last_non_blank<B: TextBuffer + ?Sized>(buf: &B, line: usize) -> usize {
    let chars: Vec<char> = buf.line(line).chars().collect();
    let mut col = chars.len().saturating_sub(1);
    while col > 0 && chars[col].is_whitespace() {
        col -= 1;
    }
    col
}

fn line_target<B: TextBuffer + ?Sized>(buf: &B, line: usize) -> Target {
    Target::new(
        Position::new(line, first_non_blank(buf, line)),
        MotionKind::Linewise,
        Column::Update,
    )
}

fn sticky_col<B: TextBuffer + ?Sized>(buf: &B, line: usize, ctx: &MotionContext<'_>) -> usize {
    let len = buf.line_len(line);
    if ctx.desired_col == usize::MAX && ctx.visual {
        return len;
    }
    ctx.desired_col.min(len.saturating_sub(1))
}

// ---------------------------------------------------------------------------
// Horizontal
// ---------------------------------------------------------------------------

fn left<B: TextBuffer + ?Sized>(
    buf: &B,
    cursor: Position,
    n: usize,
    wrap: bool,
    ctx: &MotionContext<'_>,
) -> Option<Target> {
    let mut pos = cursor;
    for _ in 0..n {
        if pos.col > 0 {
            pos.col -= 1;
        } else if wrap && pos.line > 0 {
            pos.line -= 1;
            // An operator wrapping back takes the line break with it.
            let len = buf.line_len(pos.line);
            pos.col = if ctx.for_operator() { len } else { len.saturating_sub(1) };
        } else {
            break;
        }
    }
    (pos != cursor).then_some(Target::new(pos, MotionKind::Exclusive, Column::Update))
}

fn right<B: TextBuffer + ?Sized>(
    buf: &B,
    cursor: Position,
    n: usize,
    wrap: bool,
    ctx: &MotionContext<'_>,
) -> Option<Target> {
    let last_line = buf.line_count().saturating_sub(1);
    let mut pos = cursor;
    for _ in 0..n {
        let len = buf.line_len(pos.line);
        let max = if ctx.for_operator() { len } else { len.saturating_sub(1) };
        if pos.col < max {
            pos.col += 1;
        } else if wrap && pos.line < last_line {
            pos = Position::new(pos.line + 1, 0);
        } else {
            break;
        }
    }
    (pos != cursor).then_some(Target::new(pos, MotionKind::Exclusive, Column::Update))
}

/// `f`/`F`/`t`/`T` on the cursor line. `repeat` is set for `;` and `,`,
/// where a till that would not move skips to the next occurrence.
pub fn find_char<B: TextBuffer + ?Sized>(
    buf: &B,
    cursor: Position,
    kind: FindKind,
    ch: char,
    count: usize,
    repeat: bool,
) -> Option<Position> {
    let chars: Vec<char> = buf.line(cursor.line).chars().collect();
    let skip = usize::from(repeat && kind.is_till() && count == 1);
    let mut remaining = count.max(1);

    if kind.is_forward() {
        let from = cursor.col + 1 + skip;
        for (col, c) in chars.iter().enumerate().skip(from) {
            if *c == ch {
                remaining -= 1;
                if remaining == 0 {
                    let col = if kind.is_till() { col - 1 } else { col };
                    return Some(cursor.with_col(col));
                }
            }
        }
    } else {
        let upto = cursor.col.saturating_sub(skip);
        for col in (0..upto).rev() {
            if chars[col] == ch {
                remaining -= 1;
                if remaining == 0 {
                    let col = if kind.is_till() { col + 1 } else { col };
                    return Some(cursor.with_col(col));
                }
            }
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Words
// ---------------------------------------------------------------------------

/// Past-the-text positions step back onto the last char. An operator span
/// that did so becomes inclusive.
fn adjust_eol<B: TextBuffer + ?Sized>(buf: &B, pos: Position) -> Option<Position> {
    (pos.col > 0 && pos.col >= buf.line_len(pos.line)).then(|| pos.with_col(pos.col - 1))
}

fn word_forward<B: TextBuffer + ?Sized>(
    buf: &B,
    cursor: Position,
    n: usize,
    big: bool,
    ctx: &MotionContext<'_>,
) -> Option<Target> {
    let mut w = Walker::new(buf, cursor, big);

    // `cw` on a word is `ce`. On blanks it falls through to `dw` rules.
    if ctx.purpose == Purpose::Change && !w.on_blank() && buf.line_len(cursor.line) > 0 {
        return word_end(buf, cursor, n, big, true);
    }

    let ok = w.fwd_word(n, ctx.for_operator());
    if !ok && !ctx.for_operator() && w.pos == cursor {
        return None;
    }
    let mut kind = MotionKind::Exclusive;
    if w.pos > cursor {
        if let Some(pos) = adjust_eol(buf, w.pos) {
            w.pos = pos;
            kind = MotionKind::Inclusive;
        }
    }
    (w.pos != cursor || ctx.for_operator())
        .then_some(Target::new(w.pos, kind, Column::Update))
}

fn word_end<B: TextBuffer + ?Sized>(
    buf: &B,
    cursor: Position,
    n: usize,
    big: bool,
    stop: bool,
) -> Option<Target> {
    let mut w = Walker::new(buf, cursor, big);
    if !w.end_word(n, stop, false) && w.pos == cursor {
        return None;
    }
    let pos = adjust_eol(buf, w.pos).unwrap_or(w.pos);
    Some(Target::new(pos, MotionKind::Inclusive, Column::Update))
}

// ---------------------------------------------------------------------------
// Brackets
// ---------------------------------------------------------------------------

const fn pair_of(ch: char) -> Option<(char, char, bool)> {
    match ch {
        '(' => Some(('(', ')', true)),
        '[' => Some(('[', ']', true)),
        '{' => Some(('{', '}', true)),
        ')' => Some(('(', ')', false)),
        ']' => Some(('[', ']', false)),
        '}' => Some(('{', '}', false)),
        _ => None,
    }
}

/// `%`: the first bracket at or after the cursor on its line, then its match.
fn match_pair<B: TextBuffer + ?Sized>(buf: &B, cursor: Position) -> Option<Position> {
    let (col, (open, close, forward)) = buf
        .line(cursor.line)
        .chars()
        .enumerate()
        .skip(cursor.col)
        .find_map(|(col, c)| pair_of(c).map(|p| (col, p)))?;
    let off = buf.offset_of(cursor.with_col(col));
    let found = if forward {
        find_close(buf, off, open, close)?
    } else {
        find_open(buf, off, open, close)?
    };
    Some(buf.position_of(found))
}

/// `])` and friends: the `n`-th unmatched `ch` away from the cursor.
fn unmatched<B: TextBuffer + ?Sized>(
    buf: &B,
    cursor: Position,
    ch: char,
    n: usize,
) -> Option<Position> {
    let (open, close, _) = pair_of(ch)?;
    let mut off = buf.offset_of(cursor);
    for _ in 0..n {
        off = if ch == close {
            find_close(buf, off, open, close)?
        } else {
            find_open(buf, off, open, close)?
        };
    }
    Some(buf.position_of(off))
}

// ---------------------------------------------------------------------------
// Paragraphs and sentences
// ---------------------------------------------------------------------------

/// `}` and `{`: move to the `n`-th empty line that follows a non-empty one.
/// Running into the buffer end on the last count lands on the last char of
/// the last line, inclusively.
fn paragraph<B: TextBuffer + ?Sized>(
    buf: &B,
    cursor: Position,
    n: usize,
    forward: bool,
) -> Option<Target> {
    let last = buf.line_count().saturating_sub(1);
    let empty = |l: usize| buf.line_len(l) == 0;
    let mut curr = cursor.line;

    for remaining in (0..n).rev() {
        let mut did_skip = false;
        let mut first = true;
        loop {
            if !empty(curr) {
                did_skip = true;
            }
            if !first && did_skip && empty(curr) {
                break;
            }
            first = false;
            let next = if forward {
                (curr < last).then_some(curr + 1)
            } else {
                curr.checked_sub(1)
            };
            match next {
                Some(l) => curr = l,
                None if remaining > 0 => return None,
                None => break,
            }
        }
    }

    if forward && curr == last && !empty(curr) {
        let col = buf.line_len(curr) - 1;
        return Some(
            Target::new(Position::new(curr, col), MotionKind::Inclusive, Column::Update).jump(),
        );
    }
    let pos = Position::new(curr, 0);
    (pos != cursor || curr != cursor.line)
        .then(|| Target::new(pos, MotionKind::Exclusive, Column::Update).jump())
}

/// `)` and `(`: sentence starts and empty lines are the stops.
fn sentence<B: TextBuffer + ?Sized>(
    buf: &B,
    cursor: Position,
    n: usize,
    forward: bool,
    ctx: &MotionContext<'_>,
) -> Option<Target> {
    let text: Vec<char> = buf.contents().chars().collect();
    let off = buf.offset_of(cursor);

    let mut stops: Vec<usize> = sentences(&text).iter().map(|(s, _)| *s).collect();
    let mut line_start = 0;
    for line in 0..buf.line_count() {
        let len = buf.line_len(line);
        if len == 0 {
            stops.push(line_start);
        }
        line_start += len + 1;
    }
    stops.sort_unstable();
    stops.dedup();

    let found = if forward {
        stops.iter().copied().filter(|s| *s > off).nth(n - 1)
    } else {
        stops.iter().copied().filter(|s| *s < off).rev().nth(n - 1)
    };
    let target = match found {
        Some(s) => s,
        None if forward => {
            let end = text.len();
            if ctx.for_operator() { end } else { end.saturating_sub(1) }
        }
        None => 0,
    };
    (target != off).then(|| {
        Target::new(buf.position_of(target), MotionKind::Exclusive, Column::Update).jump()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Buffer;
    use pretty_assertions::assert_eq;

    fn p(line: usize, col: usize) -> Position {
        Position::new(line, col)
    }

    fn go_with(
        lines: &[&str],
        at: Position,
        motion: Motion,
        count: Option<usize>,
        purpose: Purpose,
    ) -> Option<Target> {
        let buf = Buffer::from_lines(lines);
        let options = Options::default();
        let ctx = MotionContext {
            options: &options,
            desired_col: at.col,
            purpose,
            visual: false,
        };
        resolve(&buf, at, &motion, count, &ctx)
    }

    fn go(lines: &[&str], at: Position, motion: Motion) -> Option<Position> {
        go_with(lines, at, motion, None, Purpose::Move).map(|t| t.pos)
    }

    fn op(lines: &[&str], at: Position, motion: Motion, count: usize) -> Option<(Position, MotionKind)> {
        go_with(lines, at, motion, Some(count), Purpose::Operator).map(|t| (t.pos, t.kind))
    }

    // -- Horizontal ---------------------------------------------------------

    #[test]
    fn h_and_l_stop_at_line_edges() {
        assert_eq!(go(&["abc"], p(0, 0), Motion::Left), None);
        assert_eq!(go(&["abc"], p(0, 2), Motion::Right), None);
        assert_eq!(go(&["abc", "d"], p(0, 1), Motion::Right), Some(p(0, 2)));
    }

    #[test]
    fn operator_l_reaches_the_line_end() {
        assert_eq!(
            op(&["abc"], p(0, 2), Motion::Right, 1),
            Some((p(0, 3), MotionKind::Exclusive))
        );
        assert_eq!(
            op(&["abc"], p(0, 1), Motion::Right, 5),
            Some((p(0, 3), MotionKind::Exclusive))
        );
    }

    #[test]
    fn backspace_and_space_wrap_by_default() {
        assert_eq!(go(&["ab", "cd"], p(1, 0), Motion::BackspaceLeft), Some(p(0, 1)));
        assert_eq!(go(&["ab", "cd"], p(0, 1), Motion::SpaceRight), Some(p(1, 0)));
        assert_eq!(go(&["ab", "cd"], p(1, 0), Motion::Left), None);
    }

    #[test]
    fn find_and_till() {
        let line = ["aext text"];
        let f = |kind, at| go(&line, at, Motion::Find { kind, ch: 't' });
        assert_eq!(f(FindKind::Forward, p(0, 0)), Some(p(0, 3)));
        assert_eq!(f(FindKind::TillForward, p(0, 0)), Some(p(0, 2)));
        assert_eq!(f(FindKind::Backward, p(0, 8)), Some(p(0, 5)));
        assert_eq!(f(FindKind::TillBackward, p(0, 8)), Some(p(0, 6)));
        assert_eq!(f(FindKind::Forward, p(0, 8)), None);
    }

    #[test]
    fn repeated_till_skips_the_adjacent_match() {
        let buf = Buffer::from_text("a,b,c");
        assert_eq!(
            find_char(&buf, p(0, 0), FindKind::TillForward, ',', 1, false),
            Some(p(0, 0))
        );
        assert_eq!(
            find_char(&buf, p(0, 0), FindKind::TillForward, ',', 1, true),
            Some(p(0, 2))
        );
    }

    #[test]
    fn line_end_and_last_non_blank() {
        assert_eq!(go(&["abc  "], p(0, 0), Motion::LineEnd), Some(p(0, 4)));
        assert_eq!(go(&["abc  "], p(0, 0), Motion::LastNonBlank), Some(p(0, 2)));
        assert_eq!(
            go_with(&["a", "bcd  ", "e"], p(0, 0), Motion::LastNonBlank, Some(2), Purpose::Move)
                .map(|t| t.pos),
            Some(p(1, 3))
        );
        assert_eq!(go(&["  x"], p(0, 0), Motion::FirstNonBlank), Some(p(0, 2)));
    }

    // -- Vertical -----------------------------------------------------------

    #[test]
    fn vertical_motions_keep_the_sticky_column() {
        let lines = ["longer line", "ab", "another long"];
        let buf = Buffer::from_lines(&lines);
        let options = Options::default();
        let ctx = MotionContext {
            options: &options,
            desired_col: 8,
            purpose: Purpose::Move,
            visual: false,
        };
        let down = resolve(&buf, p(0, 8), &Motion::Down, None, &ctx).map(|t| t.pos);
        assert_eq!(down, Some(p(1, 1)));
        let down2 = resolve(&buf, p(1, 1), &Motion::Down, None, &ctx).map(|t| t.pos);
        assert_eq!(down2, Some(p(2, 8)));
    }

    #[test]
    fn goto_line_motions() {
        let lines = ["one", "  two", "three"];
        assert_eq!(go(&lines, p(0, 0), Motion::GotoLine), Some(p(2, 0)));
        assert_eq!(
            go_with(&lines, p(0, 0), Motion::GotoLine, Some(2), Purpose::Move).map(|t| t.pos),
            Some(p(1, 2))
        );
        assert_eq!(
            go_with(&lines, p(2, 0), Motion::GotoFirstLine, Some(99), Purpose::Move).map(|t| t.pos),
            Some(p(2, 0))
        );
        assert!(go_with(&lines, p(2, 0), Motion::GotoFirstLine, None, Purpose::Move).is_some_and(|t| t.jump));
    }

    #[test]
    fn half_page_moves_to_first_non_blank() {
        let lines = ["\t hello world", "hello", "hi hello", "foo"];
        assert_eq!(go(&lines, p(3, 2), Motion::HalfPageUp), Some(p(0, 2)));
        assert_eq!(go(&lines, p(0, 0), Motion::HalfPageUp), None);
    }

    // -- Words --------------------------------------------------------------

    #[test]
    fn operator_w_stops_at_the_line_end() {
        assert_eq!(
            op(&["one two", "three"], p(0, 4), Motion::WordForward { big: false }, 1),
            Some((p(0, 6), MotionKind::Inclusive))
        );
        assert_eq!(
            op(&["one two", "three"], p(0, 0), Motion::WordForward { big: false }, 1),
            Some((p(0, 4), MotionKind::Exclusive))
        );
    }

    #[test]
    fn w_on_the_last_word_moves_to_its_end() {
        assert_eq!(go(&["one two"], p(0, 4), Motion::WordForward { big: false }), Some(p(0, 6)));
        assert_eq!(go(&["one two"], p(0, 6), Motion::WordForward { big: false }), None);
    }

    #[test]
    fn cw_is_ce_on_a_word() {
        let t = go_with(
            &["one two"],
            p(0, 0),
            Motion::WordForward { big: false },
            None,
            Purpose::Change,
        );
        assert_eq!(t.map(|t| (t.pos, t.kind)), Some((p(0, 2), MotionKind::Inclusive)));
    }

    #[test]
    fn cw_on_blanks_changes_the_blank_run() {
        let t = go_with(
            &["one   two"],
            p(0, 3),
            Motion::WordForward { big: false },
            None,
            Purpose::Change,
        );
        assert_eq!(t.map(|t| (t.pos, t.kind)), Some((p(0, 6), MotionKind::Exclusive)));
    }

    #[test]
    fn backward_words() {
        assert_eq!(go(&["One two"], p(0, 6), Motion::WordBackward { big: false }), Some(p(0, 4)));
        assert_eq!(go(&["One"], p(0, 0), Motion::WordBackward { big: false }), None);
        assert_eq!(
            go(&["one two"], p(0, 5), Motion::WordEndBackward { big: false }),
            Some(p(0, 2))
        );
    }

    // -- Brackets -----------------------------------------------------------

    #[test]
    fn percent_finds_the_first_bracket_on_the_line() {
        assert_eq!(go(&["call(a, (b))"], p(0, 0), Motion::MatchPair), Some(p(0, 11)));
        assert_eq!(go(&["call(a, (b))"], p(0, 11), Motion::MatchPair), Some(p(0, 4)));
        assert_eq!(go(&["no brackets"], p(0, 0), Motion::MatchPair), None);
    }

    #[test]
    fn unmatched_close_skips_nested_pairs() {
        assert_eq!(
            op(&["(hello, world)"], p(0, 8), Motion::Unmatched(')'), 1),
            Some((p(0, 13), MotionKind::Exclusive))
        );
        assert_eq!(
            go(&["{ a { b } c }"], p(0, 2), Motion::Unmatched('}')),
            Some(p(0, 12))
        );
        assert_eq!(go(&["f(a, (b))"], p(0, 6), Motion::Unmatched('(')), Some(p(0, 5)));
    }

    // -- Paragraphs and sentences -------------------------------------------

    #[test]
    fn paragraph_forward_stops_on_empty_lines() {
        let lines = ["a", "b", "", "c", "", "d"];
        assert_eq!(go(&lines, p(0, 0), Motion::ParagraphForward), Some(p(2, 0)));
        assert_eq!(go(&lines, p(2, 0), Motion::ParagraphForward), Some(p(4, 0)));
        assert_eq!(
            go_with(&lines, p(4, 0), Motion::ParagraphForward, None, Purpose::Move)
                .map(|t| (t.pos, t.kind)),
            Some((p(5, 0), MotionKind::Inclusive))
        );
        assert_eq!(
            go_with(&lines, p(0, 0), Motion::ParagraphForward, Some(5), Purpose::Move),
            None
        );
    }

    #[test]
    fn paragraph_backward() {
        let lines = ["a", "", "b", "c"];
        assert_eq!(go(&lines, p(3, 0), Motion::ParagraphBackward), Some(p(1, 0)));
        assert_eq!(go(&lines, p(1, 0), Motion::ParagraphBackward), Some(p(0, 0)));
    }

    #[test]
    fn sentence_motions() {
        let lines = ["One two. Three four. Five"];
        assert_eq!(go(&lines, p(0, 0), Motion::SentenceForward), Some(p(0, 9)));
        assert_eq!(go(&lines, p(0, 12), Motion::SentenceBackward), Some(p(0, 9)));
        assert_eq!(go(&lines, p(0, 9), Motion::SentenceBackward), Some(p(0, 0)));
    }

    #[test]
    fn span_between_orders_its_ends() {
        let s = Span::between(p(2, 0), p(1, 4), MotionKind::Exclusive);
        assert_eq!((s.start, s.end), (p(1, 4), p(2, 0)));
    }
}
