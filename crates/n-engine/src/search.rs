//! Search: Vim patterns over the buffer.
//!
//! Patterns use Vim's "magic" dialect and are translated to the `regex`
//! crate's syntax by [`compile`]. Matching runs over the buffer's flat form
//! with multi-line mode on, so `^`/`$` anchor per line and `\n` crosses
//! lines.
//!
//! # Search flow
//!
//! 1. `/` or `?` opens a [`Prompt`]; keys edit its input
//! 2. `<CR>` submits: the text splits into pattern and [`SearchOffset`]
//! 3. The session stores the pattern in [`SearchState`] for `n`/`N`
//! 4. `<Esc>` (or `<BS>` on an empty prompt) cancels
//!
//! | Vim          | Meaning                               |
//! |--------------|---------------------------------------|
//! | `\( \) \|`   | group, alternation                    |
//! | `\+ \= \?`   | one or more, zero or one              |
//! | `\{n,m}`     | counted repeat (`\{-n,m}` is lazy)    |
//! | `\< \>`      | word boundaries                       |
//! | `\c \C`      | ignore / match case                   |
//! | `\%V`        | only inside the last visual selection |
//! | `( ) \| + {` | literal                               |

use std::fmt;

use n_keys::{KeyCode, KeyEvent};
use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::buffer::TextBuffer;
use crate::error::{Error, Result};
use crate::options::Options;
use crate::position::Position;
use crate::word::{CharClass, classify};

const HISTORY_MAX: usize = 50;

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SearchDirection {
    Forward,
    Backward,
}

impl SearchDirection {
    #[must_use]
    pub const fn from_forward(forward: bool) -> Self {
        if forward { Self::Forward } else { Self::Backward }
    }

    /// The opposite direction.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }

    /// The prompt char (`/` for forward, `?` for backward).
    #[must_use]
    pub const fn prefix(self) -> char {
        match self {
            Self::Forward => '/',
            Self::Backward => '?',
        }
    }
}

// ---------------------------------------------------------------------------
// Match
// ---------------------------------------------------------------------------

/// A match: `start` inclusive, `end` exclusive, possibly on another line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Match {
    pub start: Position,
    pub end: Position,
}

impl Match {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

// ---------------------------------------------------------------------------
// Offsets
// ---------------------------------------------------------------------------

/// What follows the closing delimiter: `/pat/e+1`, `/pat/s-2`, `/pat/3`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SearchOffset {
    #[default]
    None,
    /// `[+-]n`: lines down from the match, column 0. Linewise.
    Lines(i64),
    /// `e[+-n]`: chars from the last char of the match. Inclusive.
    End(i64),
    /// `s[+-n]`, `b[+-n]`: chars from the match start.
    Start(i64),
}

impl SearchOffset {
    /// Parse the text after the delimiter. Unrecognized text is no offset.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let signed = |s: &str, bare: i64| -> Option<i64> {
            match s {
                "" => Some(0),
                "+" => Some(bare),
                "-" => Some(-bare),
                _ => s.strip_prefix('+').unwrap_or(s).parse().ok(),
            }
        };
        let parsed = match text.chars().next() {
            None => Some(Self::None),
            Some('e') => signed(&text[1..], 1).map(Self::End),
            Some('s' | 'b') => signed(&text[1..], 1).map(Self::Start),
            Some(_) => signed(text, 1).map(Self::Lines),
        };
        parsed.unwrap_or_default()
    }
}

/// Split typed search text at the first unescaped `delimiter`.
#[must_use]
pub fn split_offset(text: &str, delimiter: char) -> (&str, SearchOffset) {
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == delimiter {
            return (&text[..i], SearchOffset::parse(&text[i + c.len_utf8()..]));
        }
    }
    (text, SearchOffset::None)
}

// ---------------------------------------------------------------------------
// Pattern compilation
// ---------------------------------------------------------------------------

/// A compiled search pattern.
#[derive(Clone, Debug)]
pub struct Pattern {
    regex: Regex,
    source: String,
    /// `\%V` was present.
    pub visual_only: bool,
}

impl Pattern {
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub const fn regex(&self) -> &Regex {
        &self.regex
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[derive(Default)]
struct Translated {
    regex: String,
    /// `Some(true)` for `\c`, `Some(false)` for `\C`.
    ignore_case: Option<bool>,
    visual_only: bool,
    has_upper: bool,
}

fn push_literal(out: &mut String, ch: char) {
    let mut tmp = [0u8; 4];
    out.push_str(&regex::escape(ch.encode_utf8(&mut tmp)));
}

/// True when `out` is at the start of a branch, where `*` and `^` are
/// special (or literal, for `*`).
fn at_branch_start(out: &str) -> bool {
    out.is_empty() || out.ends_with("(?:") || out.ends_with('|')
}

fn translate(pattern: &str, delimiter: char) -> Result<Translated> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut t = Translated::default();
    let out = &mut t.regex;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        i += 1;
        match c {
            '\\' => {
                let Some(&e) = chars.get(i) else {
                    out.push_str(r"\\");
                    break;
                };
                i += 1;
                match e {
                    '(' => out.push_str("(?:"),
                    ')' => out.push(')'),
                    '|' => out.push('|'),
                    '+' => out.push('+'),
                    '=' => out.push('?'),
                    '?' if delimiter != '?' => out.push('?'),
                    '{' => {
                        let close = chars[i..]
                            .iter()
                            .position(|c| *c == '}')
                            .ok_or_else(|| Error::InvalidPattern(pattern.to_string()))?;
                        let body: String = chars[i..i + close].iter().collect();
                        i += close + 1;
                        let (lazy, body) = match body.strip_prefix('-') {
                            Some(rest) => (true, rest.to_string()),
                            None => (false, body),
                        };
                        let quant = match body.as_str() {
                            "" => "*".to_string(),
                            b if b.starts_with(',') => format!("{{0{b}}}"),
                            b => format!("{{{b}}}"),
                        };
                        out.push_str(&quant);
                        if lazy {
                            out.push('?');
                        }
                    }
                    '<' | '>' => out.push_str(r"\b"),
                    'd' | 'D' | 'w' | 'W' | 's' | 'S' | 'n' | 't' => {
                        out.push('\\');
                        out.push(e);
                    }
                    'a' => out.push_str("[A-Za-z]"),
                    'A' => out.push_str("[^A-Za-z]"),
                    'l' => out.push_str("[a-z]"),
                    'L' => out.push_str("[^a-z]"),
                    'u' => out.push_str("[A-Z]"),
                    'U' => out.push_str("[^A-Z]"),
                    'x' => out.push_str("[0-9A-Fa-f]"),
                    'X' => out.push_str("[^0-9A-Fa-f]"),
                    'o' => out.push_str("[0-7]"),
                    'h' => out.push_str("[A-Za-z_]"),
                    'e' => out.push_str(r"\x1b"),
                    'r' => out.push_str(r"\r"),
                    'c' => t.ignore_case = Some(true),
                    'C' => t.ignore_case = Some(false),
                    '%' if chars.get(i) == Some(&'V') => {
                        i += 1;
                        t.visual_only = true;
                    }
                    other => push_literal(out, other),
                }
            }
            '^' if at_branch_start(out) => out.push('^'),
            '$' if i == chars.len()
                || (chars[i] == '\\' && matches!(chars.get(i + 1), Some(')' | '|'))) =>
            {
                out.push('$');
            }
            '.' => out.push('.'),
            '*' if !at_branch_start(out) => out.push('*'),
            '[' => match chars[i..].iter().skip(1).position(|c| *c == ']') {
                Some(rel) => {
                    let end = i + 1 + rel;
                    out.push('[');
                    for &b in &chars[i..end] {
                        if b == '[' {
                            out.push_str(r"\[");
                        } else {
                            out.push(b);
                        }
                    }
                    out.push(']');
                    i = end + 1;
                }
                None => push_literal(out, '['),
            },
            other => {
                if other.is_uppercase() {
                    t.has_upper = true;
                }
                push_literal(out, other);
            }
        }
    }
    Ok(t)
}

/// Compile a Vim pattern. `delimiter` is the prompt char, which may appear
/// escaped as a literal.
pub fn compile(pattern: &str, delimiter: char, options: &Options) -> Result<Pattern> {
    let t = translate(pattern, delimiter)?;
    let ignore_case = t
        .ignore_case
        .unwrap_or(options.ignorecase && !(options.smartcase && t.has_upper));
    let regex = RegexBuilder::new(&t.regex)
        .multi_line(true)
        .case_insensitive(ignore_case)
        .build()
        .map_err(|_| Error::InvalidPattern(pattern.to_string()))?;
    debug!(target: "engine.search", pattern, regex = %t.regex, ignore_case, "compile");
    Ok(Pattern {
        regex,
        source: pattern.to_string(),
        visual_only: t.visual_only,
    })
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// The buffer's flat text with a byte-to-char index.
struct Haystack {
    text: String,
    /// Byte offset of every char, plus the total length.
    starts: Vec<usize>,
}

impl Haystack {
    fn new<B: TextBuffer + ?Sized>(buf: &B) -> Self {
        let text = buf.contents();
        let mut starts: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        starts.push(text.len());
        Self { text, starts }
    }

    fn char_of(&self, byte: usize) -> usize {
        self.starts.partition_point(|b| *b < byte)
    }
}

/// Every match of `pattern`, one per start char, in buffer order.
/// `visual` is the last visual selection, inclusive, for `\%V`.
#[must_use]
pub fn find_all<B: TextBuffer + ?Sized>(
    buf: &B,
    pattern: &Pattern,
    visual: Option<(Position, Position)>,
) -> Vec<Match> {
    let hay = Haystack::new(buf);
    let mut out = Vec::new();
    let mut at = 0;
    while at <= hay.text.len() {
        let Some(m) = pattern.regex.find_at(&hay.text, at) else {
            break;
        };
        let start = buf.position_of(hay.char_of(m.start()));
        let end = buf.position_of(hay.char_of(m.end()));
        let found = Match { start, end };
        if !pattern.visual_only || inside(buf, found, visual) {
            out.push(found);
        }
        // Next start char, so overlapping matches are seen too.
        at = hay.text[m.start()..]
            .chars()
            .next()
            .map_or(hay.text.len() + 1, |c| m.start() + c.len_utf8());
    }
    out
}

fn inside<B: TextBuffer + ?Sized>(
    buf: &B,
    m: Match,
    visual: Option<(Position, Position)>,
) -> bool {
    let Some((start, end)) = visual else {
        return false;
    };
    let last = if m.is_empty() {
        m.start
    } else {
        buf.position_of(buf.offset_of(m.end).saturating_sub(1))
    };
    m.start >= start && last <= end
}

/// Where a match puts a Normal-mode cursor.
fn landing<B: TextBuffer + ?Sized>(buf: &B, pos: Position) -> Position {
    buf.clamp(pos, false)
}

/// The next match from `from` in `direction`, wrapping when `wrap` is set.
/// Matches are compared by where they would put the cursor, so an empty
/// match at a line end counts as the line's last char.
#[must_use]
pub fn find<B: TextBuffer + ?Sized>(
    buf: &B,
    pattern: &Pattern,
    from: Position,
    direction: SearchDirection,
    wrap: bool,
    visual: Option<(Position, Position)>,
) -> Option<Match> {
    let all = find_all(buf, pattern, visual);
    let from = landing(buf, from);
    let found = match direction {
        SearchDirection::Forward => all
            .iter()
            .find(|m| landing(buf, m.start) > from)
            .or_else(|| if wrap { all.first() } else { None }),
        SearchDirection::Backward => all
            .iter()
            .rev()
            .find(|m| landing(buf, m.start) < from)
            .or_else(|| if wrap { all.last() } else { None }),
    };
    found.copied()
}

/// `gn`/`gN`: the match under the cursor, else the next one in `direction`.
#[must_use]
pub fn match_at_or_next<B: TextBuffer + ?Sized>(
    buf: &B,
    pattern: &Pattern,
    cursor: Position,
    direction: SearchDirection,
    wrap: bool,
) -> Option<Match> {
    find_all(buf, pattern, None)
        .into_iter()
        .find(|m| m.start <= cursor && cursor < m.end)
        .or_else(|| find(buf, pattern, cursor, direction, wrap, None))
}

/// The keyword under or after the cursor on its line, with its start column,
/// for `*` and `#`.
#[must_use]
pub fn word_under_cursor<B: TextBuffer + ?Sized>(buf: &B, pos: Position) -> Option<(String, usize)> {
    let chars: Vec<char> = buf.line(pos.line).chars().collect();
    let mut col = pos.col.min(chars.len());
    while col < chars.len() && classify(chars[col]) == CharClass::Blank {
        col += 1;
    }
    let cls = classify(*chars.get(col)?);
    let mut start = col;
    while start > 0 && classify(chars[start - 1]) == cls {
        start -= 1;
    }
    let mut end = col + 1;
    while end < chars.len() && classify(chars[end]) == cls {
        end += 1;
    }
    Some((chars[start..end].iter().collect(), start))
}

/// The pattern `*` and `#` search for: whole keywords get word boundaries.
#[must_use]
pub fn star_pattern(word: &str) -> String {
    let escaped: String = word
        .chars()
        .map(|c| match c {
            '\\' | '/' | '?' | '.' | '*' | '$' | '^' | '~' | '[' | ']' => format!("\\{c}"),
            _ => c.to_string(),
        })
        .collect();
    if word.chars().next().is_some_and(|c| classify(c) == CharClass::Word) {
        format!("\\<{escaped}\\>")
    } else {
        escaped
    }
}

// ---------------------------------------------------------------------------
// SearchState
// ---------------------------------------------------------------------------

/// The last search, for `n`, `N`, `gn` and empty patterns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LastSearch {
    pub pattern: String,
    pub direction: SearchDirection,
    pub offset: SearchOffset,
}

/// Session search state: the last search plus the prompt history.
#[derive(Clone, Debug, Default)]
pub struct SearchState {
    last: Option<LastSearch>,
    history: Vec<String>,
}

impl SearchState {
    #[must_use]
    pub const fn last(&self) -> Option<&LastSearch> {
        self.last.as_ref()
    }

    pub fn set_last(&mut self, last: LastSearch) {
        self.last = Some(last);
    }

    /// Record submitted prompt text. Duplicates move to the newest slot.
    pub fn remember(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.history.retain(|h| h != text);
        self.history.push(text.to_string());
        if self.history.len() > HISTORY_MAX {
            self.history.remove(0);
        }
    }

    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.history
    }
}

// ---------------------------------------------------------------------------
// Prompt
// ---------------------------------------------------------------------------

/// What a prompt key did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PromptEvent {
    /// Keep reading.
    Editing,
    Submit(String),
    Cancel,
    /// `<C-l>`: the session should extend the input from the current match.
    ExtendFromMatch,
}

/// An open `/` or `?` prompt.
#[derive(Clone, Debug)]
pub struct Prompt {
    input: String,
    direction: SearchDirection,
    /// Where the cursor was when the prompt opened.
    saved_pos: Position,
    /// Index into the history while walking it with `<Up>`/`<Down>`.
    history_idx: Option<usize>,
    /// What was typed before walking the history.
    draft: String,
}

impl Prompt {
    #[must_use]
    pub const fn new(direction: SearchDirection, saved_pos: Position) -> Self {
        Self {
            input: String::new(),
            direction,
            saved_pos,
            history_idx: None,
            draft: String::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    #[inline]
    #[must_use]
    pub const fn direction(&self) -> SearchDirection {
        self.direction
    }

    #[inline]
    #[must_use]
    pub const fn saved_pos(&self) -> Position {
        self.saved_pos
    }

    pub fn push(&mut self, ch: char) {
        self.input.push(ch);
        self.history_idx = None;
    }

    /// Handle one key. `history` is oldest first.
    pub fn handle(&mut self, key: KeyEvent, history: &[String]) -> PromptEvent {
        if key.is_ctrl('l') {
            return PromptEvent::ExtendFromMatch;
        }
        match key.code {
            KeyCode::Escape => PromptEvent::Cancel,
            KeyCode::Enter => PromptEvent::Submit(std::mem::take(&mut self.input)),
            KeyCode::Backspace => {
                if self.input.pop().is_none() {
                    PromptEvent::Cancel
                } else {
                    PromptEvent::Editing
                }
            }
            KeyCode::Up => {
                let idx = match self.history_idx {
                    None => {
                        self.draft = self.input.clone();
                        history.len().checked_sub(1)
                    }
                    Some(i) => Some(i.saturating_sub(1)),
                };
                if let Some(i) = idx {
                    self.history_idx = Some(i);
                    self.input.clone_from(&history[i]);
                }
                PromptEvent::Editing
            }
            KeyCode::Down => {
                match self.history_idx {
                    Some(i) if i + 1 < history.len() => {
                        self.history_idx = Some(i + 1);
                        self.input.clone_from(&history[i + 1]);
                    }
                    Some(_) => {
                        self.history_idx = None;
                        self.input = std::mem::take(&mut self.draft);
                    }
                    None => {}
                }
                PromptEvent::Editing
            }
            KeyCode::Tab => {
                self.push('\t');
                PromptEvent::Editing
            }
            _ => {
                if let Some(ch) = key.typed_char() {
                    self.push(ch);
                }
                PromptEvent::Editing
            }
        }
    }
}
