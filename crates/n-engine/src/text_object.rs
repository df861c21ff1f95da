//! Text objects: regions selected by structure rather than by movement.
//!
//! Combined with an operator they form the composable half of the grammar:
//!
//! ```text
//! operator + text-object = action
//! d        + iw          = delete inner word
//! c        + i"          = change inside quotes
//! y        + 2a(         = yank the second enclosing parentheses
//! ```
//!
//! [`select`] returns a [`Span`] whose kind tells the operator how to read
//! its end (exclusive, inclusive or whole lines), or `None` when the object
//! does not exist around the cursor.
//!
//! | Inner      | Around     | Object                                   |
//! |------------|------------|------------------------------------------|
//! | `iw` `iW`  | `aw` `aW`  | word / WORD                              |
//! | `is`       | `as`       | sentence                                 |
//! | `ip`       | `ap`       | paragraph (linewise)                     |
//! | `i"` ...   | `a"` ...   | quoted string on the cursor line         |
//! | `i(` `ib`  | `a(` `ab`  | parentheses, also `[]`, `{}`/`B`, `<>`   |
//! | `it`       | `at`       | XML/HTML tag pair                        |
//! | `ii`       | `ai` `aI`  | indentation block (linewise)             |
//! | `ia`       | `aa`       | call argument                            |
//! | `ie`       | `ae`       | entire buffer (linewise)                 |

use crate::buffer::TextBuffer;
use crate::motion::{MotionKind, Span};
use crate::position::Position;
use crate::word::{Step, Walker};

// ---------------------------------------------------------------------------
// Object kinds
// ---------------------------------------------------------------------------

/// What follows `i` or `a`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextObject {
    Word { big: bool },
    Sentence,
    Paragraph,
    Quote(char),
    Bracket { open: char, close: char },
    Tag,
    /// `ii`/`ai` (`with_below = false`) and `iI`/`aI` (`true`).
    Indent { with_below: bool },
    Argument,
    Entire,
}

impl TextObject {
    /// The object named by `key`, if any.
    #[must_use]
    pub const fn from_key(key: char) -> Option<Self> {
        Some(match key {
            'w' => Self::Word { big: false },
            'W' => Self::Word { big: true },
            's' => Self::Sentence,
            'p' => Self::Paragraph,
            '"' | '\'' | '`' => Self::Quote(key),
            '(' | ')' | 'b' => Self::Bracket {
                open: '(',
                close: ')',
            },
            '{' | '}' | 'B' => Self::Bracket {
                open: '{',
                close: '}',
            },
            '[' | ']' => Self::Bracket {
                open: '[',
                close: ']',
            },
            '<' | '>' => Self::Bracket {
                open: '<',
                close: '>',
            },
            't' => Self::Tag,
            'i' => Self::Indent { with_below: false },
            'I' => Self::Indent { with_below: true },
            'a' => Self::Argument,
            'e' => Self::Entire,
            _ => return None,
        })
    }
}

/// Resolve `object` around `cursor`. `inner` is the `i` form; `count`
/// selects further objects (words, sentences, paragraphs) or outer pairs
/// (brackets, tags).
#[must_use]
pub fn select<B: TextBuffer + ?Sized>(
    buf: &B,
    cursor: Position,
    object: TextObject,
    inner: bool,
    count: usize,
) -> Option<Span> {
    let count = count.max(1);
    match object {
        TextObject::Word { big } => word(buf, cursor, inner, big, count),
        TextObject::Sentence => sentence(buf, cursor, inner, count),
        TextObject::Paragraph => paragraph(buf, cursor, inner, count),
        TextObject::Quote(q) => quote(buf, cursor, q, inner, count),
        TextObject::Bracket { open, close } => bracket(buf, cursor, open, close, inner, count),
        TextObject::Tag => tag(buf, cursor, inner, count),
        TextObject::Indent { with_below } => Some(indent(buf, cursor, inner, with_below)),
        TextObject::Argument => argument(buf, cursor, inner),
        TextObject::Entire => Some(entire(buf, inner)),
    }
}

fn flat_chars<B: TextBuffer + ?Sized>(buf: &B) -> Vec<char> {
    buf.contents().chars().collect()
}

fn is_white(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn line_is_blank<B: TextBuffer + ?Sized>(buf: &B, line: usize) -> bool {
    buf.line(line).chars().all(char::is_whitespace)
}

fn exclusive<B: TextBuffer + ?Sized>(buf: &B, start: usize, end: usize) -> Span {
    Span::new(buf.position_of(start), buf.position_of(end), MotionKind::Exclusive)
}

// ---------------------------------------------------------------------------
// Words
// ---------------------------------------------------------------------------

/// `iw`/`aw`/`iW`/`aW`.
///
/// Inner alternates word and blank runs; around takes a word plus the blank
/// run after it, or, when no blanks follow the first word, the blanks before
/// it (never the line's indent).
fn word<B: TextBuffer + ?Sized>(
    buf: &B,
    cursor: Position,
    inner: bool,
    big: bool,
    count: usize,
) -> Option<Span> {
    let around = !inner;
    let mut w = Walker::new(buf, cursor, big);
    w.back_in_line();
    let mut start = w.pos;
    let mut include_white = false;

    if w.on_blank() == around {
        if !w.end_word(1, true, true) {
            return None;
        }
    } else {
        w.fwd_word(1, true);
        if w.pos.col == 0 {
            w.decl();
        } else {
            w.oneleft();
        }
        include_white = around;
    }
    if w.pos < start {
        return None;
    }

    let first_ends_on_text = !w.on_blank();
    let mut inclusive = true;
    for remaining in (1..count).rev() {
        inclusive = true;
        w.incl()?;
        if around == w.on_blank() {
            if !w.end_word(1, true, true) {
                return None;
            }
        } else {
            if !w.fwd_word(1, true) && remaining > 1 {
                return None;
            }
            if !w.oneleft() {
                inclusive = false;
            }
        }
    }

    if include_white && first_ends_on_text && (!w.on_blank() || (w.pos.col == 0 && !inclusive)) {
        let end = w.pos;
        w.pos = start;
        if w.oneleft() {
            w.back_in_line();
            if w.on_blank() && w.pos.col > 0 {
                start = w.pos;
            }
        }
        w.pos = end;
    }

    let kind = if inclusive {
        MotionKind::Inclusive
    } else {
        MotionKind::Exclusive
    };
    Some(Span::new(start, w.pos, kind))
}

/// Extend a forward Visual selection ending at `active` by `count` more
/// word objects. Returns the new active end.
#[must_use]
pub fn extend_word<B: TextBuffer + ?Sized>(
    buf: &B,
    active: Position,
    inner: bool,
    big: bool,
    count: usize,
) -> Option<Position> {
    let around = !inner;
    let mut w = Walker::new(buf, active, big);
    for _ in 0..count.max(1) {
        w.incl()?;
        if around == w.on_blank() {
            if !w.end_word(1, true, true) {
                return None;
            }
        } else {
            w.fwd_word(1, true);
            if !w.oneleft() {
                w.decl();
            }
        }
    }
    Some(w.pos)
}

// ---------------------------------------------------------------------------
// Sentences
// ---------------------------------------------------------------------------

/// Sentence spans `[start, end)` in flat offsets, without surrounding
/// whitespace. A sentence ends after `.`, `!` or `?` (plus any closing
/// `)`, `]`, `"`, `'`) followed by whitespace or the end of the buffer, or
/// at an empty line.
pub(crate) fn sentences(text: &[char]) -> Vec<(usize, usize)> {
    let n = text.len();
    let mut out = Vec::new();
    let mut i = 0;
    while i < n {
        if text[i].is_whitespace() {
            i += 1;
            continue;
        }
        let start = i;
        let mut end = n;
        while i < n {
            let c = text[i];
            if c == '\n' && text.get(i + 1) == Some(&'\n') {
                end = i;
                break;
            }
            if matches!(c, '.' | '!' | '?') {
                let mut j = i + 1;
                while j < n && matches!(text[j], ')' | ']' | '"' | '\'') {
                    j += 1;
                }
                if j >= n || text[j].is_whitespace() {
                    end = j;
                    i = j;
                    break;
                }
            }
            i += 1;
        }
        while end > start && text[end - 1].is_whitespace() {
            end -= 1;
        }
        out.push((start, end));
    }
    out
}

/// Whitespace that may attach to a sentence: anything but an empty line.
fn soft_white(text: &[char], i: usize) -> bool {
    text[i].is_whitespace() && !(text[i] == '\n' && text.get(i + 1) == Some(&'\n'))
}

fn sentence<B: TextBuffer + ?Sized>(
    buf: &B,
    cursor: Position,
    inner: bool,
    count: usize,
) -> Option<Span> {
    let text = flat_chars(buf);
    let off = buf.offset_of(cursor);
    let spans = sentences(&text);
    if spans.is_empty() {
        return None;
    }

    // Index of the sentence holding the cursor, or of the next one when the
    // cursor sits in the whitespace before it.
    let inside = spans.iter().position(|&(s, e)| off >= s && off < e);
    let next = spans.iter().position(|&(s, _)| s > off);

    let trailing_end = |end: usize| {
        let mut t = end;
        while t < text.len() && soft_white(&text, t) {
            t += 1;
        }
        t
    };

    let Some(idx) = inside else {
        // On whitespace between sentences.
        let gap_start = spans
            .iter()
            .rev()
            .find(|&&(_, e)| e <= off)
            .map_or(0, |&(_, e)| e);
        let gap_end = next.map_or(text.len(), |i| spans[i].0);
        if inner {
            return Some(exclusive(buf, gap_start, gap_end));
        }
        let last = next.map(|i| (i + count - 1).min(spans.len() - 1));
        let end = last.map_or(gap_end, |i| spans[i].1);
        return Some(exclusive(buf, gap_start, end));
    };

    if inner {
        // Alternate sentence and gap units.
        let mut end = spans[idx].1;
        let mut i = idx;
        for unit in 1..count {
            if unit % 2 == 1 {
                end = trailing_end(end);
            } else if i + 1 < spans.len() {
                i += 1;
                end = spans[i].1;
            }
        }
        return Some(exclusive(buf, spans[idx].0, end));
    }

    let last = (idx + count - 1).min(spans.len() - 1);
    let mut start = spans[idx].0;
    let end = trailing_end(spans[last].1);
    if end == spans[last].1 {
        while start > 0 && soft_white(&text, start - 1) {
            start -= 1;
        }
    }
    Some(exclusive(buf, start, end))
}

// ---------------------------------------------------------------------------
// Paragraphs
// ---------------------------------------------------------------------------

/// Last line of the run of lines sharing `line`'s blankness.
fn run_end<B: TextBuffer + ?Sized>(buf: &B, line: usize) -> usize {
    let blank = line_is_blank(buf, line);
    let mut end = line;
    while end + 1 < buf.line_count() && line_is_blank(buf, end + 1) == blank {
        end += 1;
    }
    end
}

fn paragraph<B: TextBuffer + ?Sized>(
    buf: &B,
    cursor: Position,
    inner: bool,
    count: usize,
) -> Option<Span> {
    let last_line = buf.line_count() - 1;
    let line = cursor.line.min(last_line);
    let blank = line_is_blank(buf, line);
    let mut start = line;
    while start > 0 && line_is_blank(buf, start - 1) == blank {
        start -= 1;
    }

    let mut end = run_end(buf, line);
    let runs = if inner { count } else { count * 2 };
    for _ in 1..runs {
        if end >= last_line {
            break;
        }
        end = run_end(buf, end + 1);
    }

    // `ap` that could not take a blank run after the text takes the one
    // before it instead.
    if !inner && !blank && !line_is_blank(buf, end) {
        while start > 0 && line_is_blank(buf, start - 1) {
            start -= 1;
        }
    }

    Some(Span::new(
        Position::new(start, 0),
        Position::new(end, 0),
        MotionKind::Linewise,
    ))
}

// ---------------------------------------------------------------------------
// Quotes
// ---------------------------------------------------------------------------

/// Columns of the unescaped `quote` chars on `line`. A backslash escapes
/// the char after it, including another backslash.
fn quote_columns(line: &[char], quote: char) -> Vec<usize> {
    let mut cols = Vec::new();
    let mut escaped = false;
    for (i, &c) in line.iter().enumerate() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            cols.push(i);
        }
    }
    cols
}

/// The quote pair holding or following the cursor. Quotes pair up left to
/// right; a cursor on an unpaired quote finds nothing.
fn quote_pair(line: &[char], col: usize, quote: char) -> Option<(usize, usize)> {
    let cols = quote_columns(line, quote);
    let pairs: Vec<(usize, usize)> = cols
        .chunks(2)
        .filter(|p| p.len() == 2)
        .map(|p| (p[0], p[1]))
        .collect();

    if let Some(idx) = cols.iter().position(|&c| c == col) {
        return pairs.get(idx / 2).copied();
    }
    pairs
        .iter()
        .find(|&&(o, c)| o < col && col < c)
        .or_else(|| pairs.iter().find(|&&(o, _)| o > col))
        .copied()
}

fn quote<B: TextBuffer + ?Sized>(
    buf: &B,
    cursor: Position,
    quote: char,
    inner: bool,
    count: usize,
) -> Option<Span> {
    let line: Vec<char> = buf.line(cursor.line).chars().collect();
    let (open, close) = quote_pair(&line, cursor.col, quote)?;
    let at = |col: usize| Position::new(cursor.line, col);

    if inner && count == 1 {
        return Some(Span::new(at(open + 1), at(close), MotionKind::Exclusive));
    }
    if inner {
        return Some(Span::new(at(open), at(close + 1), MotionKind::Exclusive));
    }

    let mut start = open;
    let mut end = close + 1;
    if line.get(end).is_some_and(|&c| is_white(c)) {
        while line.get(end).is_some_and(|&c| is_white(c)) {
            end += 1;
        }
    } else {
        while start > 0 && is_white(line[start - 1]) {
            start -= 1;
        }
    }
    Some(Span::new(at(start), at(end), MotionKind::Exclusive))
}

// ---------------------------------------------------------------------------
// Brackets
// ---------------------------------------------------------------------------

/// Scan back from before `from` for an unmatched `open`.
pub(crate) fn find_open<B: TextBuffer + ?Sized>(
    buf: &B,
    from: usize,
    open: char,
    close: char,
) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = from;
    while i > 0 {
        i -= 1;
        match buf.char_at(i) {
            Some(c) if c == close => depth += 1,
            Some(c) if c == open => {
                if depth == 0 {
                    return Some(i);
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    None
}

/// Scan forward from after `from` for an unmatched `close`.
pub(crate) fn find_close<B: TextBuffer + ?Sized>(
    buf: &B,
    from: usize,
    open: char,
    close: char,
) -> Option<usize> {
    let total = buf.len_chars();
    let mut depth = 0usize;
    for i in from + 1..total {
        match buf.char_at(i) {
            Some(c) if c == open => depth += 1,
            Some(c) if c == close => {
                if depth == 0 {
                    return Some(i);
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    None
}

/// Offsets of the `count`-th pair enclosing `off`. A cursor on either
/// bracket of a pair counts as inside it.
pub(crate) fn bracket_pair<B: TextBuffer + ?Sized>(
    buf: &B,
    off: usize,
    open: char,
    close: char,
    count: usize,
) -> Option<(usize, usize)> {
    let here = buf.char_at(off);
    let (mut o, mut c) = if here == Some(open) {
        (off, find_close(buf, off, open, close)?)
    } else if here == Some(close) {
        (find_open(buf, off, open, close)?, off)
    } else {
        let o = find_open(buf, off, open, close)?;
        (o, find_close(buf, o, open, close)?)
    };
    for _ in 1..count {
        o = find_open(buf, o, open, close)?;
        c = find_close(buf, o, open, close)?;
    }
    Some((o, c))
}

fn bracket<B: TextBuffer + ?Sized>(
    buf: &B,
    cursor: Position,
    open: char,
    close: char,
    inner: bool,
    count: usize,
) -> Option<Span> {
    let (o, c) = bracket_pair(buf, buf.offset_of(cursor), open, close, count)?;
    let open_pos = buf.position_of(o);
    let close_pos = buf.position_of(c);
    if !inner {
        return Some(Span::new(open_pos, close_pos, MotionKind::Inclusive));
    }

    // Step inside both brackets. A close that only has indent before it
    // gives up its line, so the inner text ends with the previous line.
    let mut start = Walker::new(buf, open_pos, false);
    start.incl();
    let start = start.pos;

    let mut end = Walker::new(buf, close_pos, false);
    let mut sol = close_pos.col == 0;
    end.decl();
    while end.in_indent(1) {
        sol = true;
        if end.decl() != Some(Step::Char) {
            break;
        }
    }

    if sol {
        end.incl();
        Some(Span::new(start, end.pos.max(start), MotionKind::Exclusive))
    } else if start <= end.pos {
        Some(Span::new(start, end.pos, MotionKind::Inclusive))
    } else {
        Some(Span::new(start, start, MotionKind::Exclusive))
    }
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// A matched element: `<open ...>` at `[open.0, open.1)`, `</close>` at
/// `[close.0, close.1)`.
#[derive(Debug, Clone, Copy)]
struct Element {
    open: (usize, usize),
    close: (usize, usize),
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '_' | ':' | '.')
}

/// Pair up tags over the whole text. Stray closing tags are ignored and
/// opening tags left unclosed inside an element (`<br>`) are dropped when
/// the element closes.
fn elements(text: &[char]) -> Vec<Element> {
    let n = text.len();
    let mut stack: Vec<(String, usize, usize)> = Vec::new();
    let mut out = Vec::new();
    let mut i = 0;
    while i < n {
        if text[i] != '<' {
            i += 1;
            continue;
        }
        let start = i;
        let closing = text.get(i + 1) == Some(&'/');
        let name_start = if closing { i + 2 } else { i + 1 };
        let mut j = name_start;
        while j < n && is_name_char(text[j]) {
            j += 1;
        }
        if j == name_start {
            i += 1;
            continue;
        }
        let name: String = text[name_start..j].iter().collect();
        let Some(gt) = (j..n).find(|&k| text[k] == '>') else {
            break;
        };
        let end = gt + 1;
        if closing {
            if let Some(depth) = stack.iter().rposition(|(n, _, _)| *n == name) {
                let (_, os, oe) = stack[depth].clone();
                stack.truncate(depth);
                out.push(Element {
                    open: (os, oe),
                    close: (start, end),
                });
            }
        } else if text[gt - 1] != '/' {
            stack.push((name, start, end));
        }
        i = end;
    }
    out
}

fn tag<B: TextBuffer + ?Sized>(
    buf: &B,
    cursor: Position,
    inner: bool,
    count: usize,
) -> Option<Span> {
    let text = flat_chars(buf);
    // A cursor in the indent belongs to the tag the line starts with.
    let indent = indent_width(buf, cursor.line);
    let cursor = if cursor.col < indent && indent < buf.line_len(cursor.line) {
        cursor.with_col(indent)
    } else {
        cursor
    };
    let off = buf.offset_of(cursor);
    let mut enclosing: Vec<Element> = elements(&text)
        .into_iter()
        .filter(|e| e.open.0 <= off && off < e.close.1)
        .collect();
    // Innermost first.
    enclosing.sort_by(|a, b| b.open.0.cmp(&a.open.0));
    let el = enclosing.get(count - 1)?;
    Some(if inner {
        exclusive(buf, el.open.1, el.close.0)
    } else {
        exclusive(buf, el.open.0, el.close.1)
    })
}

// ---------------------------------------------------------------------------
// Indentation blocks
// ---------------------------------------------------------------------------

fn indent_width<B: TextBuffer + ?Sized>(buf: &B, line: usize) -> usize {
    buf.line(line).chars().take_while(|c| is_white(*c)).count()
}

/// `ii`: lines around the cursor indented at least as deep as the nearest
/// non-blank line at or above it. Blank lines never end the block. `ai`
/// adds the line above; `aI` the line below too.
fn indent<B: TextBuffer + ?Sized>(
    buf: &B,
    cursor: Position,
    inner: bool,
    with_below: bool,
) -> Span {
    let last = buf.line_count() - 1;
    let line = cursor.line.min(last);
    let anchor = (0..=line)
        .rev()
        .find(|&l| !line_is_blank(buf, l))
        .unwrap_or(line);
    let depth = indent_width(buf, anchor);
    let shallower = |l: usize| !line_is_blank(buf, l) && indent_width(buf, l) < depth;

    let mut start = (0..anchor).rev().find(|&l| shallower(l)).map_or(0, |l| l + 1);
    let mut end = (anchor..=last)
        .find(|&l| shallower(l))
        .map_or(last, |l| l - 1);

    if !inner {
        start = start.saturating_sub(1);
        if with_below {
            end = (end + 1).min(last);
        }
    }
    Span::new(
        Position::new(start, 0),
        Position::new(end, 0),
        MotionKind::Linewise,
    )
}

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

const fn is_arg_open(c: char) -> bool {
    matches!(c, '(' | '[' | '{')
}

const fn is_arg_close(c: char) -> bool {
    matches!(c, ')' | ']' | '}')
}

/// Back from before `from` to the unmatched opener, any bracket kind.
fn arg_open(text: &[char], from: usize) -> Option<usize> {
    let mut depth = 0usize;
    for i in (0..from).rev() {
        if is_arg_close(text[i]) {
            depth += 1;
        } else if is_arg_open(text[i]) {
            if depth == 0 {
                return Some(i);
            }
            depth -= 1;
        }
    }
    None
}

fn arg_close(text: &[char], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, &c) in text.iter().enumerate().skip(open + 1) {
        if is_arg_open(c) {
            depth += 1;
        } else if is_arg_close(c) {
            if depth == 0 {
                return Some(i);
            }
            depth -= 1;
        }
    }
    None
}

/// `ia`/`aa`. The enclosing brackets are split on top-level commas.
///
/// Inner is the argument without surrounding whitespace, or the whole gap
/// when the argument is only whitespace. Around takes the comma before the
/// argument, or for the first argument the comma after it and the blanks
/// that follow on its line.
fn argument<B: TextBuffer + ?Sized>(buf: &B, cursor: Position, inner: bool) -> Option<Span> {
    let text = flat_chars(buf);
    let off = buf.offset_of(cursor);
    let here = text.get(off).copied();

    let open = match here {
        Some(c) if is_arg_open(c) => off,
        Some(c) if is_arg_close(c) => arg_open(&text, off)?,
        _ => arg_open(&text, off)?,
    };
    let close = arg_close(&text, open)?;
    if off > close {
        return None;
    }

    let mut bounds = vec![open];
    let mut depth = 0usize;
    for (i, &c) in text.iter().enumerate().take(close).skip(open + 1) {
        if is_arg_open(c) {
            depth += 1;
        } else if is_arg_close(c) {
            depth = depth.saturating_sub(1);
        } else if c == ',' && depth == 0 {
            bounds.push(i);
        }
    }
    bounds.push(close);
    let segments = bounds.len() - 1;

    let seg = if off == open {
        0
    } else if off == close {
        segments - 1
    } else {
        // A cursor on a comma picks the argument after it.
        bounds
            .windows(2)
            .position(|w| w[0] <= off && off < w[1])
            .unwrap_or(0)
    };

    let (s, e) = (bounds[seg] + 1, bounds[seg + 1]);
    let first_text = (s..e).find(|&i| !text[i].is_whitespace());
    let (ts, te) = match first_text {
        Some(first) => {
            let last = (s..e).rev().find(|&i| !text[i].is_whitespace()).unwrap_or(first);
            (first, last + 1)
        }
        None => (s, e),
    };

    if inner || segments == 1 {
        return Some(exclusive(buf, ts, te));
    }
    if seg > 0 {
        return Some(exclusive(buf, bounds[seg], te));
    }
    let mut end = bounds[1] + 1;
    while end < close && is_white(text[end]) {
        end += 1;
    }
    Some(exclusive(buf, s, end))
}

// ---------------------------------------------------------------------------
// Entire buffer
// ---------------------------------------------------------------------------

/// `ae` is every line. `ie` runs from the first non-blank line to the end
/// of the last one, characterwise, and falls back to `ae` when every line is
/// blank.
fn entire<B: TextBuffer + ?Sized>(buf: &B, inner: bool) -> Span {
    let last = buf.line_count() - 1;
    let whole = Span::new(Position::new(0, 0), Position::new(last, 0), MotionKind::Linewise);
    if !inner {
        return whole;
    }
    let mut text_lines = (0..=last).filter(|&l| !line_is_blank(buf, l));
    let Some(first) = text_lines.next() else {
        return whole;
    };
    let final_line = text_lines.last().unwrap_or(first);
    Span::new(
        Position::new(first, 0),
        Position::new(final_line, buf.line_len(final_line).saturating_sub(1)),
        MotionKind::Inclusive,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Buffer;
    use pretty_assertions::assert_eq;

    fn p(line: usize, col: usize) -> Position {
        Position::new(line, col)
    }

    fn sel(lines: &[&str], at: Position, key: char, inner: bool, count: usize) -> Option<Span> {
        let b = Buffer::from_lines(lines);
        select(&b, at, TextObject::from_key(key)?, inner, count)
    }

    fn span(start: Position, end: Position, kind: MotionKind) -> Option<Span> {
        Some(Span::new(start, end, kind))
    }

    // -- Words ----------------------------------------------------------------

    #[test]
    fn inner_word_on_text_and_blanks() {
        let line = ["one   two   three"];
        assert_eq!(
            sel(&line, p(0, 7), 'w', true, 1),
            span(p(0, 6), p(0, 8), MotionKind::Inclusive)
        );
        assert_eq!(
            sel(&line, p(0, 4), 'w', true, 1),
            span(p(0, 3), p(0, 5), MotionKind::Inclusive)
        );
    }

    #[test]
    fn around_word_prefers_trailing_blanks() {
        assert_eq!(
            sel(&["one   two   three"], p(0, 7), 'w', false, 1),
            span(p(0, 6), p(0, 11), MotionKind::Inclusive)
        );
    }

    #[test]
    fn around_word_takes_leading_blanks_before_punctuation() {
        // "one   two   three,   four"
        assert_eq!(
            sel(&["one   two   three,   four  "], p(0, 14), 'w', false, 1),
            span(p(0, 9), p(0, 16), MotionKind::Inclusive)
        );
    }

    #[test]
    fn around_word_never_takes_indent() {
        assert_eq!(
            sel(&["  this.method();"], p(0, 2), 'w', false, 1),
            span(p(0, 2), p(0, 5), MotionKind::Inclusive)
        );
    }

    #[test]
    fn counted_around_word_crosses_lines() {
        let lines = ["one   two   three,   four  ", "five.  six"];
        assert_eq!(
            sel(&lines, p(0, 23), 'w', false, 2),
            span(p(0, 21), p(1, 3), MotionKind::Inclusive)
        );
    }

    #[test]
    fn around_big_word() {
        assert_eq!(
            sel(&["<div class=\"btn\">"], p(0, 16), 'W', false, 1),
            span(p(0, 4), p(0, 16), MotionKind::Inclusive)
        );
    }

    // -- Quotes ---------------------------------------------------------------

    #[test]
    fn quote_pairs_with_escapes() {
        let line: Vec<char> = r#""one \"two\"" x"#.chars().collect();
        assert_eq!(quote_columns(&line, '"'), vec![0, 12]);
        let line: Vec<char> = r#""\\""#.chars().collect();
        assert_eq!(quote_columns(&line, '"'), vec![0, 3]);
    }

    #[test]
    fn quote_ahead_and_unmatched() {
        let line: Vec<char> = "on 'two'".chars().collect();
        assert_eq!(quote_pair(&line, 0, '\''), Some((3, 7)));
        let line: Vec<char> = r#"a "b" c "d" e" f"#.chars().collect();
        assert_eq!(quote_pair(&line, 13, '"'), None);
    }

    #[test]
    fn around_quote_whitespace() {
        assert_eq!(
            sel(&[r#"one "two"   x"#], p(0, 5), '"', false, 1),
            span(p(0, 4), p(0, 12), MotionKind::Exclusive)
        );
        assert_eq!(
            sel(&[r#"one   "two"x"#], p(0, 7), '"', false, 1),
            span(p(0, 3), p(0, 11), MotionKind::Exclusive)
        );
        assert_eq!(
            sel(&[r#"one "two"   x"#], p(0, 5), '"', true, 2),
            span(p(0, 4), p(0, 9), MotionKind::Exclusive)
        );
    }

    // -- Brackets -------------------------------------------------------------

    #[test]
    fn inner_paren_single_line() {
        assert_eq!(
            sel(&[r#"print("hello")"#], p(0, 6), '(', true, 1),
            span(p(0, 6), p(0, 12), MotionKind::Inclusive)
        );
        assert_eq!(
            sel(&[r#"print("hello")"#], p(0, 6), ')', true, 1),
            sel(&[r#"print("hello")"#], p(0, 6), '(', true, 1),
        );
    }

    #[test]
    fn inner_paren_empty_pair() {
        assert_eq!(
            sel(&["one (()) two"], p(0, 6), '(', true, 1),
            span(p(0, 6), p(0, 6), MotionKind::Exclusive)
        );
    }

    #[test]
    fn counted_paren() {
        let line = [" b(l(baz(foo)baz)a)h "];
        assert_eq!(
            sel(&line, p(0, 10), ')', false, 3),
            span(p(0, 2), p(0, 18), MotionKind::Inclusive)
        );
    }

    #[test]
    fn inner_brace_multiline_gives_up_close_line() {
        assert_eq!(
            sel(&["one {", "", "}"], p(1, 0), '{', true, 1),
            span(p(1, 0), p(2, 0), MotionKind::Exclusive)
        );
        assert_eq!(
            sel(&["one {", "", "  }"], p(1, 0), '{', true, 1),
            span(p(1, 0), p(2, 0), MotionKind::Exclusive)
        );
    }

    #[test]
    fn missing_bracket_fails() {
        assert_eq!(sel(&["blaaah"], p(0, 0), '(', false, 1), None);
    }

    // -- Tags -----------------------------------------------------------------

    #[test]
    fn tags_skip_strays_and_unclosed() {
        let text: Vec<char> = "<a>x<br>y</h1>z</a>".chars().collect();
        let els = elements(&text);
        assert_eq!(els.len(), 1);
        assert_eq!(els[0].open, (0, 3));
        assert_eq!(els[0].close, (15, 19));
    }

    #[test]
    fn inner_tag_and_mismatch() {
        assert_eq!(
            sel(&["<blink>hello</blink>"], p(0, 9), 't', true, 1),
            span(p(0, 7), p(0, 12), MotionKind::Exclusive)
        );
        assert_eq!(sel(&["<blink>hello</unblink>"], p(0, 9), 't', true, 1), None);
        assert_eq!(
            sel(&["<div><div a=1/>{{c}}</div>"], p(0, 17), 't', true, 1),
            span(p(0, 5), p(0, 20), MotionKind::Exclusive)
        );
    }

    #[test]
    fn around_tag_from_indent_takes_the_line_tag() {
        let lines = ["<foo>", "  <bar>asd</bar>", "</foo>"];
        assert_eq!(
            sel(&lines, p(1, 1), 't', false, 1),
            span(p(1, 2), p(1, 16), MotionKind::Exclusive)
        );
        let lines = ["<foo>", "a  <bar>asd</bar>", "</foo>"];
        assert_eq!(
            sel(&lines, p(1, 2), 't', false, 1),
            span(p(0, 0), p(2, 6), MotionKind::Exclusive)
        );
    }

    // -- Sentences ------------------------------------------------------------

    #[test]
    fn sentence_segmentation() {
        let text: Vec<char> = "One. Two! (Three?) four\n\nFive".chars().collect();
        assert_eq!(sentences(&text), vec![(0, 4), (5, 9), (10, 18), (19, 23), (25, 29)]);
    }

    #[test]
    fn around_sentence_whitespace() {
        let line = ["That's my secret, Captain. I'm always angry."];
        assert_eq!(
            sel(&line, p(0, 13), 's', false, 1),
            span(p(0, 0), p(0, 27), MotionKind::Exclusive)
        );
        assert_eq!(
            sel(&line, p(0, 33), 's', false, 1),
            span(p(0, 26), p(0, 44), MotionKind::Exclusive)
        );
    }

    // -- Paragraphs, indent, entire -------------------------------------------

    #[test]
    fn paragraphs_are_linewise() {
        let lines = ["foo", "", "bar baz", "bar baz", "", "", "fun"];
        assert_eq!(
            sel(&lines, p(3, 4), 'p', true, 1),
            span(p(2, 0), p(3, 0), MotionKind::Linewise)
        );
        assert_eq!(
            sel(&lines, p(3, 4), 'p', false, 1),
            span(p(2, 0), p(5, 0), MotionKind::Linewise)
        );
    }

    #[test]
    fn around_paragraph_at_end_takes_blanks_before() {
        let lines = ["foo", "", "bar"];
        assert_eq!(
            sel(&lines, p(2, 0), 'p', false, 1),
            span(p(1, 0), p(2, 0), MotionKind::Linewise)
        );
    }

    #[test]
    fn indent_blocks() {
        let lines = ["if x:", "    a", "    b", "", "done"];
        assert_eq!(
            sel(&lines, p(3, 0), 'i', true, 1),
            span(p(1, 0), p(3, 0), MotionKind::Linewise)
        );
        assert_eq!(
            sel(&lines, p(1, 2), 'i', false, 1),
            span(p(0, 0), p(3, 0), MotionKind::Linewise)
        );
        assert_eq!(
            sel(&lines, p(1, 2), 'I', false, 1),
            span(p(0, 0), p(4, 0), MotionKind::Linewise)
        );
    }

    #[test]
    fn inner_entire_skips_blank_edges() {
        let lines = [" ", "", "a", "b", "  "];
        assert_eq!(
            sel(&lines, p(0, 0), 'e', true, 1),
            span(p(2, 0), p(3, 0), MotionKind::Inclusive)
        );
        assert_eq!(
            sel(&["  ", "one", "two three"], p(0, 0), 'e', true, 1),
            span(p(1, 0), p(2, 8), MotionKind::Inclusive)
        );
        assert_eq!(
            sel(&[" ", ""], p(0, 0), 'e', true, 1),
            span(p(0, 0), p(1, 0), MotionKind::Linewise)
        );
        assert_eq!(
            sel(&lines, p(0, 0), 'e', false, 1),
            span(p(0, 0), p(4, 0), MotionKind::Linewise)
        );
    }

    // -- Arguments ------------------------------------------------------------

    #[test]
    fn inner_argument() {
        let line = ["(foo, (void*) bar(Foo<T>), baz)"];
        assert_eq!(
            sel(&line, p(0, 16), 'a', true, 1),
            span(p(0, 6), p(0, 25), MotionKind::Exclusive)
        );
        assert_eq!(
            sel(&["(foo,  , baz)"], p(0, 6), 'a', true, 1),
            span(p(0, 5), p(0, 7), MotionKind::Exclusive)
        );
        assert_eq!(
            sel(&["(,,,)"], p(0, 1), 'a', true, 1),
            span(p(0, 2), p(0, 2), MotionKind::Exclusive)
        );
    }

    #[test]
    fn around_argument_separators() {
        let line = ["(foo, bar, baz)"];
        assert_eq!(
            sel(&line, p(0, 2), 'a', false, 1),
            span(p(0, 1), p(0, 6), MotionKind::Exclusive)
        );
        assert_eq!(
            sel(&line, p(0, 7), 'a', false, 1),
            span(p(0, 4), p(0, 9), MotionKind::Exclusive)
        );
        assert_eq!(
            sel(&line, p(0, 11), 'a', false, 1),
            span(p(0, 9), p(0, 14), MotionKind::Exclusive)
        );
    }

    #[test]
    fn argument_needs_enclosing_brackets() {
        assert_eq!(sel(&["foo"], p(0, 1), 'a', true, 1), None);
        assert_eq!(sel(&[")foo("], p(0, 1), 'a', true, 1), None);
        assert_eq!(sel(&["alpha,", "beta,", "gamma"], p(1, 1), 'a', true, 1), None);
    }
}
