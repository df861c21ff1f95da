//! The command grammar: keys in, [`Command`] values out.
//!
//! ```text
//! [count] ["x] [count] operator [count] { motion | text-object | operator }
//! [count] ["x] standalone
//! ```
//!
//! The parser is purely syntactic. It never looks at the buffer; whether a
//! motion or object resolves is the session's business. Each key yields one
//! [`Parsed`] result: `Incomplete` while a sequence is still open, then
//! `Complete`, `Invalid` or `Prompt` (a `/` or `?` that needs pattern text
//! before it can become a command).
//!
//! Aliases are desugared here so the executor only sees operator form:
//! `x` = `dl`, `X` = `dh`, `D` = `d$`, `C` = `c$`, `s` = `cl`, `S` = `cc`,
//! `Y` = `yy`.

use n_keys::{KeyCode, KeyEvent, Modifiers};
use tracing::trace;

use crate::mode::VisualKind;
use crate::motion::{FindKind, Motion};
use crate::operator::Operator;
use crate::register::is_valid_name;
use crate::text_object::TextObject;

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// A complete command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Effective count: the counts before and after the operator multiplied.
    pub count: Option<usize>,
    pub register: Option<char>,
    pub action: Action,
}

impl Command {
    #[must_use]
    pub const fn new(action: Action) -> Self {
        Self {
            count: None,
            register: None,
            action,
        }
    }

    /// The count, 1 when none was typed.
    #[must_use]
    pub fn count1(&self) -> usize {
        self.count.unwrap_or(1).max(1)
    }

    /// Whether `.` should repeat this command.
    #[must_use]
    pub const fn is_repeatable(&self) -> bool {
        match &self.action {
            Action::Operate { op, .. } | Action::Select { op, .. } => !matches!(op, Operator::Yank),
            Action::Insert(_)
            | Action::BlockInsert { .. }
            | Action::ReplaceMode
            | Action::Put { .. }
            | Action::Join { .. }
            | Action::ReplaceChar(_)
            | Action::ToggleCase
            | Action::Increment { .. } => true,
            _ => false,
        }
    }
}

/// What an operator acts on outside Visual mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpTarget {
    Motion(Motion),
    Object { object: TextObject, inner: bool },
    /// The doubled operator: `dd`, `cc`, `yy`, `>>`, `guu`, `gqq`...
    Line,
    /// `gn` (`forward`) and `gN`.
    Match { forward: bool },
}

/// How an insert command places the cursor before typing starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertKind {
    /// `i`
    Before,
    /// `a`
    After,
    /// `I`: before the first non-blank.
    LineStart,
    /// `A`
    LineEnd,
    /// `o`
    Below,
    /// `O`
    Above,
    /// `gi`: where the last insert stopped.
    Resume,
    /// `gI`: column 0.
    Column0,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Move(Motion),
    Operate { op: Operator, target: OpTarget },
    /// A Visual operator over the selection. `lines` widens it to whole
    /// lines (`D`, `X`, `Y`, `C`, `S`, `R`).
    Select { op: Operator, lines: bool },
    /// `iw`, `a(`... in Visual mode: grow the selection.
    SelectObject { object: TextObject, inner: bool },
    /// `gn` and `gN` without an operator.
    SelectMatch { forward: bool },
    Insert(InsertKind),
    /// Visual-block `I` and `A`.
    BlockInsert { append: bool },
    /// `R`
    ReplaceMode,
    /// `v`, `V`, `<C-v>`
    Visual(VisualKind),
    /// `gv`
    Reselect,
    /// `o` in Visual mode.
    SwapEnds,
    /// `p` `P` `gp` `gP`
    Put { before: bool, cursor_after: bool },
    Undo,
    Redo,
    /// `J` (`spaces`) and `gJ`.
    Join { spaces: bool },
    /// `r{char}`
    ReplaceChar(char),
    /// `~` outside Visual mode.
    ToggleCase,
    /// `<C-a>` `<C-x>` `g<C-a>` `g<C-x>`
    Increment { negative: bool, progressive: bool },
    /// `.`
    Repeat,
    /// `m{char}`
    SetMark(char),
    /// `g;`
    ChangeOlder,
    /// `g,`
    ChangeNewer,
    /// `<C-o>`
    JumpOlder,
    /// `<C-i>`, `<Tab>`
    JumpNewer,
    /// `<C-g>`
    FileInfo,
}

/// Everything a `/` or `?` prompt needs to become a command once the
/// pattern is typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptStart {
    pub forward: bool,
    pub count: Option<usize>,
    pub register: Option<char>,
    pub op: Option<Operator>,
}

impl PromptStart {
    /// The command this prompt produces for the submitted `text`.
    #[must_use]
    pub fn finish(self, text: String) -> Command {
        let motion = Motion::Search {
            forward: self.forward,
            text,
        };
        let action = match self.op {
            Some(op) => Action::Operate {
                op,
                target: OpTarget::Motion(motion),
            },
            None => Action::Move(motion),
        };
        Command {
            count: self.count,
            register: self.register,
            action,
        }
    }
}

/// Result of feeding one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    Incomplete,
    Complete(Command),
    /// A pattern prompt opened.
    Prompt(PromptStart),
    /// The pending sequence was discarded.
    Invalid,
}

/// Which grammar applies to the next key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseContext {
    Normal,
    Visual(VisualKind),
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// What the parser is waiting for.
///
/// Sub-states that can follow an operator carry it as `Option<Operator>`:
/// `None` means the same key sequence was typed without one (`fx` vs `dfx`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Pending {
    #[default]
    Start,
    /// `"` typed. Waiting for the register name.
    Register,
    /// `g` typed at the start.
    G,
    /// Operator typed. Waiting for a motion, an object prefix or the same
    /// key again.
    Operator(Operator),
    /// Operator then `g` (`dgg`, `dge`, `dgn`, `gugu`).
    OperatorG(Operator),
    /// `i` or `a`. Waiting for the object key.
    Object { op: Option<Operator>, inner: bool },
    /// `f` `F` `t` `T`. Waiting for the target char.
    Find { kind: FindKind, op: Option<Operator> },
    /// `` ` `` or `'`. Waiting for the mark name.
    Mark { exact: bool, op: Option<Operator> },
    /// `[` or `]`. Waiting for the bracket.
    Bracket { close: bool, op: Option<Operator> },
    /// `m`. Waiting for the mark name.
    SetMark,
    /// `r`. Waiting for the replacement char.
    ReplaceChar,
}

#[derive(Debug, Clone, Default)]
pub struct Parser {
    pending: Pending,
    /// Count typed before the operator.
    count: Option<usize>,
    /// Count typed after the operator.
    op_count: Option<usize>,
    register: Option<char>,
}

/// Merge two optional counts by multiplication.
///
/// Returns `None` only when both inputs are `None` (no count typed).
#[must_use]
pub const fn merge_counts(a: Option<usize>, b: Option<usize>) -> Option<usize> {
    match (a, b) {
        (None, None) => None,
        (Some(x), None) => Some(x),
        (None, Some(y)) => Some(y),
        (Some(x), Some(y)) => Some(x.saturating_mul(y)),
    }
}

/// Push a digit onto a count accumulator.
fn push_digit(count: Option<usize>, digit: u32) -> Option<usize> {
    Some(count.unwrap_or(0).saturating_mul(10).saturating_add(digit as usize))
}

/// The char a key stands for after `f`, `r`, `m`... `<CR>` and `<Tab>`
/// count as the chars they type.
fn literal(key: KeyEvent) -> Option<char> {
    match key.code {
        KeyCode::Enter if key.modifiers.is_empty() => Some('\n'),
        KeyCode::Tab if key.modifiers.is_empty() => Some('\t'),
        _ => key.typed_char(),
    }
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a sequence is open (a count alone counts).
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending != Pending::Start || self.count.is_some() || self.register.is_some()
    }

    /// Drop the pending sequence.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Feed one key.
    pub fn feed(&mut self, key: KeyEvent, ctx: ParseContext) -> Parsed {
        let result = if key.is_escape() {
            Parsed::Invalid
        } else {
            let pending = std::mem::take(&mut self.pending);
            self.step(pending, key, ctx)
        };
        trace!(target: "engine.parse", %key, ?result, "key");
        if result != Parsed::Incomplete {
            self.reset();
        }
        result
    }

    fn step(&mut self, pending: Pending, key: KeyEvent, ctx: ParseContext) -> Parsed {
        match pending {
            Pending::Start => self.start(key, ctx),
            Pending::Register => match key.typed_char() {
                Some(name) if is_valid_name(name) => {
                    self.register = Some(name);
                    Parsed::Incomplete
                }
                _ => Parsed::Invalid,
            },
            Pending::G => self.g_key(key, ctx),
            Pending::Operator(op) => self.after_operator(op, key),
            Pending::OperatorG(op) => self.after_operator_g(op, key),
            Pending::Object { op, inner } => {
                let Some(object) = key.typed_char().and_then(TextObject::from_key) else {
                    return Parsed::Invalid;
                };
                match op {
                    Some(op) => self.complete(Action::Operate {
                        op,
                        target: OpTarget::Object { object, inner },
                    }),
                    None => self.complete(Action::SelectObject { object, inner }),
                }
            }
            Pending::Find { kind, op } => match literal(key) {
                Some(ch) => self.motion(op, Motion::Find { kind, ch }),
                None => Parsed::Invalid,
            },
            Pending::Mark { exact, op } => match key.typed_char() {
                Some(name) => self.motion(op, Motion::Mark { name, exact }),
                None => Parsed::Invalid,
            },
            Pending::Bracket { close, op } => match (close, key.typed_char()) {
                (true, Some(ch @ (')' | '}'))) | (false, Some(ch @ ('(' | '{'))) => {
                    self.motion(op, Motion::Unmatched(ch))
                }
                _ => Parsed::Invalid,
            },
            Pending::SetMark => match key.typed_char() {
                Some(name) if name.is_ascii_alphabetic() || "'`[]<>".contains(name) => {
                    self.complete(Action::SetMark(name))
                }
                _ => Parsed::Invalid,
            },
            Pending::ReplaceChar => match literal(key) {
                Some(ch) => self.complete(Action::ReplaceChar(ch)),
                None => Parsed::Invalid,
            },
        }
    }

    fn complete(&mut self, action: Action) -> Parsed {
        Parsed::Complete(Command {
            count: merge_counts(self.count, self.op_count),
            register: self.register,
            action,
        })
    }

    fn wait(&mut self, pending: Pending) -> Parsed {
        self.pending = pending;
        Parsed::Incomplete
    }

    /// A motion, either on its own or as an operator target.
    fn motion(&mut self, op: Option<Operator>, motion: Motion) -> Parsed {
        match op {
            Some(op) => self.complete(Action::Operate {
                op,
                target: OpTarget::Motion(motion),
            }),
            None => self.complete(Action::Move(motion)),
        }
    }

    fn prompt(&self, forward: bool, op: Option<Operator>) -> Parsed {
        Parsed::Prompt(PromptStart {
            forward,
            count: merge_counts(self.count, self.op_count),
            register: self.register,
            op,
        })
    }

    /// Motion keys shared by every context. `None` when `key` does not start
    /// a motion.
    fn motion_key(&mut self, key: KeyEvent, op: Option<Operator>) -> Option<Parsed> {
        if let Some(motion) = simple_motion(key) {
            return Some(self.motion(op, motion));
        }
        let ch = key.typed_char()?;
        if let Some(kind) = FindKind::from_key(ch) {
            return Some(self.wait(Pending::Find { kind, op }));
        }
        Some(match ch {
            '\'' | '`' => self.wait(Pending::Mark {
                exact: ch == '`',
                op,
            }),
            '[' | ']' => self.wait(Pending::Bracket {
                close: ch == ']',
                op,
            }),
            '/' | '?' => self.prompt(ch == '/', op),
            _ => return None,
        })
    }

    // ── Start of a command ──────────────────────────────────────────────

    fn start(&mut self, key: KeyEvent, ctx: ParseContext) -> Parsed {
        if let Some(d) = key.typed_char().and_then(|c| c.to_digit(10)) {
            if d != 0 || self.count.is_some() {
                self.count = push_digit(self.count, d);
                return Parsed::Incomplete;
            }
        }
        if key.typed_char() == Some('"') {
            return self.wait(Pending::Register);
        }
        if key.typed_char() == Some('g') {
            return self.wait(Pending::G);
        }

        // Keys that mean the same in Normal and Visual mode.
        if key.is_ctrl('o') {
            return self.complete(Action::JumpOlder);
        }
        if key.is_ctrl('i') || key == KeyEvent::new(KeyCode::Tab) {
            return self.complete(Action::JumpNewer);
        }
        if key.is_ctrl('g') {
            return self.complete(Action::FileInfo);
        }
        if key.typed_char() == Some('m') {
            return self.wait(Pending::SetMark);
        }
        if key.is_ctrl('a') || key.is_ctrl('x') {
            return self.complete(Action::Increment {
                negative: key.is_ctrl('x'),
                progressive: false,
            });
        }
        if let Some(kind) = visual_key(key) {
            return self.complete(Action::Visual(kind));
        }

        match ctx {
            ParseContext::Normal => self.normal_key(key),
            ParseContext::Visual(_) => self.visual_key(key),
        }
    }

    fn normal_key(&mut self, key: KeyEvent) -> Parsed {
        if key.is_ctrl('r') {
            return self.complete(Action::Redo);
        }
        if key.code == KeyCode::Delete && key.modifiers.is_empty() {
            return self.alias(Operator::Delete, Motion::Right);
        }
        let Some(ch) = key.typed_char() else {
            return self.motion_key(key, None).unwrap_or(Parsed::Invalid);
        };
        if let Some(op) = Operator::from_key(ch) {
            return self.wait(Pending::Operator(op));
        }
        match ch {
            'x' => self.alias(Operator::Delete, Motion::Right),
            'X' => self.alias(Operator::Delete, Motion::Left),
            'D' => self.alias(Operator::Delete, Motion::LineEnd),
            'C' => self.alias(Operator::Change, Motion::LineEnd),
            's' => self.alias(Operator::Change, Motion::Right),
            'S' => self.line_alias(Operator::Change),
            'Y' => self.line_alias(Operator::Yank),
            'i' => self.complete(Action::Insert(InsertKind::Before)),
            'a' => self.complete(Action::Insert(InsertKind::After)),
            'I' => self.complete(Action::Insert(InsertKind::LineStart)),
            'A' => self.complete(Action::Insert(InsertKind::LineEnd)),
            'o' => self.complete(Action::Insert(InsertKind::Below)),
            'O' => self.complete(Action::Insert(InsertKind::Above)),
            'R' => self.complete(Action::ReplaceMode),
            'p' | 'P' => self.complete(Action::Put {
                before: ch == 'P',
                cursor_after: false,
            }),
            'u' => self.complete(Action::Undo),
            'J' => self.complete(Action::Join { spaces: true }),
            'r' => self.wait(Pending::ReplaceChar),
            '~' => self.complete(Action::ToggleCase),
            '.' => self.complete(Action::Repeat),
            _ => self.motion_key(key, None).unwrap_or(Parsed::Invalid),
        }
    }

    fn visual_key(&mut self, key: KeyEvent) -> Parsed {
        if key.code == KeyCode::Delete && key.modifiers.is_empty() {
            return self.select(Operator::Delete, false);
        }
        let Some(ch) = key.typed_char() else {
            return self.motion_key(key, None).unwrap_or(Parsed::Invalid);
        };
        match ch {
            'd' | 'x' => self.select(Operator::Delete, false),
            'X' | 'D' => self.select(Operator::Delete, true),
            'c' | 's' => self.select(Operator::Change, false),
            'C' | 'S' | 'R' => self.select(Operator::Change, true),
            'y' => self.select(Operator::Yank, false),
            'Y' => self.select(Operator::Yank, true),
            'u' => self.select(Operator::Lower, false),
            'U' => self.select(Operator::Upper, false),
            '~' => self.select(Operator::ToggleCase, false),
            '>' => self.select(Operator::ShiftRight, true),
            '<' => self.select(Operator::ShiftLeft, true),
            'J' => self.complete(Action::Join { spaces: true }),
            'r' => self.wait(Pending::ReplaceChar),
            'p' | 'P' => self.complete(Action::Put {
                before: ch == 'P',
                cursor_after: false,
            }),
            'o' | 'O' => self.complete(Action::SwapEnds),
            'I' | 'A' => self.complete(Action::BlockInsert { append: ch == 'A' }),
            'i' | 'a' => self.wait(Pending::Object {
                op: None,
                inner: ch == 'i',
            }),
            _ => self.motion_key(key, None).unwrap_or(Parsed::Invalid),
        }
    }

    fn select(&mut self, op: Operator, lines: bool) -> Parsed {
        self.complete(Action::Select { op, lines })
    }

    fn alias(&mut self, op: Operator, motion: Motion) -> Parsed {
        self.motion(Some(op), motion)
    }

    fn line_alias(&mut self, op: Operator) -> Parsed {
        self.complete(Action::Operate {
            op,
            target: OpTarget::Line,
        })
    }

    // ── g prefix ────────────────────────────────────────────────────────

    fn g_key(&mut self, key: KeyEvent, ctx: ParseContext) -> Parsed {
        if key.is_ctrl('a') || key.is_ctrl('x') {
            return self.complete(Action::Increment {
                negative: key.is_ctrl('x'),
                progressive: true,
            });
        }
        let Some(ch) = key.typed_char() else {
            return Parsed::Invalid;
        };
        if let Some(op) = Operator::from_g_key(ch) {
            return match ctx {
                ParseContext::Normal => self.wait(Pending::Operator(op)),
                ParseContext::Visual(_) => self.select(op, false),
            };
        }
        if let Some(motion) = g_motion(ch) {
            return self.complete(Action::Move(motion));
        }
        match ch {
            'n' | 'N' => self.complete(Action::SelectMatch { forward: ch == 'n' }),
            ';' => self.complete(Action::ChangeOlder),
            ',' => self.complete(Action::ChangeNewer),
            'v' => self.complete(Action::Reselect),
            'i' if ctx == ParseContext::Normal => self.complete(Action::Insert(InsertKind::Resume)),
            'I' if ctx == ParseContext::Normal => self.complete(Action::Insert(InsertKind::Column0)),
            'p' | 'P' => self.complete(Action::Put {
                before: ch == 'P',
                cursor_after: true,
            }),
            'J' => self.complete(Action::Join { spaces: false }),
            _ => Parsed::Invalid,
        }
    }

    // ── After an operator ───────────────────────────────────────────────

    fn after_operator(&mut self, op: Operator, key: KeyEvent) -> Parsed {
        if let Some(d) = key.typed_char().and_then(|c| c.to_digit(10)) {
            if d != 0 || self.op_count.is_some() {
                self.op_count = push_digit(self.op_count, d);
                self.pending = Pending::Operator(op);
                return Parsed::Incomplete;
            }
        }
        match key.typed_char() {
            Some(ch) if ch == op.line_key() => self.line_alias(op),
            Some('g') => self.wait(Pending::OperatorG(op)),
            Some(ch @ ('i' | 'a')) => self.wait(Pending::Object {
                op: Some(op),
                inner: ch == 'i',
            }),
            _ => self.motion_key(key, Some(op)).unwrap_or(Parsed::Invalid),
        }
    }

    fn after_operator_g(&mut self, op: Operator, key: KeyEvent) -> Parsed {
        let Some(ch) = key.typed_char() else {
            return Parsed::Invalid;
        };
        // `gugu`, `g~g~`, `gqgq`.
        if op.is_g_operator() && ch == op.line_key() {
            return self.line_alias(op);
        }
        if let Some(motion) = g_motion(ch) {
            return self.motion(Some(op), motion);
        }
        match ch {
            'n' | 'N' => self.complete(Action::Operate {
                op,
                target: OpTarget::Match { forward: ch == 'n' },
            }),
            _ => Parsed::Invalid,
        }
    }
}

fn visual_key(key: KeyEvent) -> Option<VisualKind> {
    if key.is_ctrl('v') {
        return Some(VisualKind::Block);
    }
    match key.typed_char() {
        Some('v') => Some(VisualKind::Char),
        Some('V') => Some(VisualKind::Line),
        _ => None,
    }
}

/// Motions after `g`.
const fn g_motion(ch: char) -> Option<Motion> {
    Some(match ch {
        'g' => Motion::GotoFirstLine,
        'e' => Motion::WordEndBackward { big: false },
        'E' => Motion::WordEndBackward { big: true },
        '_' => Motion::LastNonBlank,
        _ => return None,
    })
}

/// One-key motions.
fn simple_motion(key: KeyEvent) -> Option<Motion> {
    if key.modifiers == Modifiers::CTRL {
        return match key.code {
            KeyCode::Char('d') => Some(Motion::HalfPageDown),
            KeyCode::Char('u') => Some(Motion::HalfPageUp),
            KeyCode::Char('n' | 'j') => Some(Motion::Down),
            KeyCode::Char('p') => Some(Motion::Up),
            KeyCode::Char('h') | KeyCode::Backspace => Some(Motion::BackspaceLeft),
            _ => None,
        };
    }
    if !key.modifiers.difference(Modifiers::SHIFT).is_empty() {
        return None;
    }
    Some(match key.code {
        KeyCode::Left => Motion::Left,
        KeyCode::Right => Motion::Right,
        KeyCode::Up => Motion::Up,
        KeyCode::Down => Motion::Down,
        KeyCode::Home => Motion::LineStart,
        KeyCode::End => Motion::LineEnd,
        KeyCode::Backspace => Motion::BackspaceLeft,
        KeyCode::Enter => Motion::NextLineStart,
        KeyCode::Char(c) => match c {
            'h' => Motion::Left,
            'l' => Motion::Right,
            ' ' => Motion::SpaceRight,
            'k' => Motion::Up,
            'j' => Motion::Down,
            '0' => Motion::LineStart,
            '^' => Motion::FirstNonBlank,
            '$' => Motion::LineEnd,
            '+' => Motion::NextLineStart,
            '-' => Motion::PrevLineStart,
            '_' => Motion::CurrentLineStart,
            'w' | 'W' => Motion::WordForward { big: c == 'W' },
            'b' | 'B' => Motion::WordBackward { big: c == 'B' },
            'e' | 'E' => Motion::WordEnd { big: c == 'E' },
            'G' => Motion::GotoLine,
            '%' => Motion::MatchPair,
            '(' => Motion::SentenceBackward,
            ')' => Motion::SentenceForward,
            '{' => Motion::ParagraphBackward,
            '}' => Motion::ParagraphForward,
            ';' | ',' => Motion::RepeatFind { reverse: c == ',' },
            'n' | 'N' => Motion::SearchNext { reverse: c == 'N' },
            '*' | '#' => Motion::SearchWord { forward: c == '*' },
            _ => return None,
        },
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use n_keys::parse_keys;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    /// Feed `keys` in Normal mode and return the last result.
    fn parse(keys: &str) -> Parsed {
        parse_in(keys, ParseContext::Normal)
    }

    fn parse_in(keys: &str, ctx: ParseContext) -> Parsed {
        let mut parser = Parser::new();
        let mut last = Parsed::Invalid;
        for key in parse_keys(keys) {
            last = parser.feed(key, ctx);
        }
        last
    }

    fn cmd(count: Option<usize>, register: Option<char>, action: Action) -> Parsed {
        Parsed::Complete(Command {
            count,
            register,
            action,
        })
    }

    fn op(op: Operator, motion: Motion) -> Action {
        Action::Operate {
            op,
            target: OpTarget::Motion(motion),
        }
    }

    const W: Motion = Motion::WordForward { big: false };

    #[test]
    fn plain_motion() {
        assert_eq!(parse("w"), cmd(None, None, Action::Move(W)));
        assert_eq!(parse("0"), cmd(None, None, Action::Move(Motion::LineStart)));
        assert_eq!(parse("10"), Parsed::Incomplete);
    }

    #[test]
    fn ctrl_backspace_moves_left() {
        let bs = cmd(None, None, Action::Move(Motion::BackspaceLeft));
        assert_eq!(parse("<C-BS>"), bs);
        assert_eq!(parse("<BS>"), bs);
        assert_eq!(parse("<C-h>"), bs);
    }

    #[test]
    fn counts_multiply() {
        assert_eq!(parse("2d3w"), cmd(Some(6), None, op(Operator::Delete, W)));
        assert_eq!(parse("d10w"), cmd(Some(10), None, op(Operator::Delete, W)));
        assert_eq!(parse("3dd"), parse("d3d"));
    }

    #[test]
    fn register_before_or_after_count() {
        let yy = Action::Operate {
            op: Operator::Yank,
            target: OpTarget::Line,
        };
        assert_eq!(parse("\"a3yy"), cmd(Some(3), Some('a'), yy.clone()));
        assert_eq!(parse("3\"ayy"), cmd(Some(3), Some('a'), yy));
        assert_eq!(parse("\"!"), Parsed::Invalid);
    }

    #[test]
    fn aliases_desugar() {
        assert_eq!(parse("x"), cmd(None, None, op(Operator::Delete, Motion::Right)));
        assert_eq!(parse("D"), cmd(None, None, op(Operator::Delete, Motion::LineEnd)));
        assert_eq!(parse("s"), cmd(None, None, op(Operator::Change, Motion::Right)));
        assert_eq!(parse("S"), parse("cc"));
        assert_eq!(parse("Y"), parse("yy"));
    }

    #[test]
    fn text_objects() {
        let ci = cmd(
            None,
            None,
            Action::Operate {
                op: Operator::Change,
                target: OpTarget::Object {
                    object: TextObject::Bracket {
                        open: '(',
                        close: ')',
                    },
                    inner: true,
                },
            },
        );
        assert_eq!(parse("ci("), ci);
        assert_eq!(parse("ci)"), ci);
        assert_eq!(parse("cib"), ci);
        assert_eq!(parse("diz"), Parsed::Invalid);
    }

    #[test]
    fn g_operators_and_doubled_forms() {
        let line = |op| {
            cmd(
                None,
                None,
                Action::Operate {
                    op,
                    target: OpTarget::Line,
                },
            )
        };
        assert_eq!(parse("guu"), line(Operator::Lower));
        assert_eq!(parse("gugu"), line(Operator::Lower));
        assert_eq!(parse("gUU"), line(Operator::Upper));
        assert_eq!(parse("g~g~"), line(Operator::ToggleCase));
        assert_eq!(parse("gqq"), line(Operator::Format));
        assert_eq!(parse(">>"), line(Operator::ShiftRight));
        assert_eq!(
            parse("gUiw"),
            cmd(
                None,
                None,
                Action::Operate {
                    op: Operator::Upper,
                    target: OpTarget::Object {
                        object: TextObject::Word { big: false },
                        inner: true,
                    },
                },
            )
        );
    }

    #[test]
    fn operator_g_motions() {
        assert_eq!(
            parse("d2gg"),
            cmd(Some(2), None, op(Operator::Delete, Motion::GotoFirstLine))
        );
        assert_eq!(
            parse("dgn"),
            cmd(
                None,
                None,
                Action::Operate {
                    op: Operator::Delete,
                    target: OpTarget::Match { forward: true },
                },
            )
        );
    }

    #[test]
    fn pending_char_arguments() {
        assert_eq!(
            parse("dtx"),
            cmd(
                None,
                None,
                op(
                    Operator::Delete,
                    Motion::Find {
                        kind: FindKind::TillForward,
                        ch: 'x'
                    }
                )
            )
        );
        assert_eq!(parse("r<CR>"), cmd(None, None, Action::ReplaceChar('\n')));
        assert_eq!(parse("ma"), cmd(None, None, Action::SetMark('a')));
        assert_eq!(
            parse("d])"),
            cmd(None, None, op(Operator::Delete, Motion::Unmatched(')')))
        );
        assert_eq!(parse("d]("), Parsed::Invalid);
    }

    #[test]
    fn search_opens_a_prompt() {
        let Parsed::Prompt(start) = parse("3d/") else {
            panic!("expected a prompt");
        };
        assert_eq!(start.count, Some(3));
        assert_eq!(start.op, Some(Operator::Delete));
        assert_eq!(
            start.finish("two".into()),
            Command {
                count: Some(3),
                register: None,
                action: op(
                    Operator::Delete,
                    Motion::Search {
                        forward: true,
                        text: "two".into()
                    }
                ),
            }
        );
    }

    #[test]
    fn escape_cancels() {
        let mut parser = Parser::new();
        parser.feed(KeyEvent::char('2'), ParseContext::Normal);
        parser.feed(KeyEvent::char('d'), ParseContext::Normal);
        assert!(parser.is_pending());
        assert_eq!(
            parser.feed(KeyEvent::new(KeyCode::Escape), ParseContext::Normal),
            Parsed::Invalid
        );
        assert!(!parser.is_pending());
    }

    #[test]
    fn visual_grammar() {
        let v = ParseContext::Visual(VisualKind::Char);
        assert_eq!(
            parse_in("u", v),
            cmd(
                None,
                None,
                Action::Select {
                    op: Operator::Lower,
                    lines: false
                }
            )
        );
        assert_eq!(
            parse_in("iw", v),
            cmd(
                None,
                None,
                Action::SelectObject {
                    object: TextObject::Word { big: false },
                    inner: true
                }
            )
        );
        assert_eq!(parse_in("o", v), cmd(None, None, Action::SwapEnds));
        assert_eq!(
            parse_in("3<C-a>", v),
            cmd(
                Some(3),
                None,
                Action::Increment {
                    negative: false,
                    progressive: false
                }
            )
        );
    }

    #[test]
    fn unknown_keys_are_invalid() {
        assert_eq!(parse("Q"), Parsed::Invalid);
        assert_eq!(parse("gz"), Parsed::Invalid);
    }

    proptest! {
        #[test]
        fn composed_counts_multiply(a in 1usize..50, b in 1usize..50) {
            let composed = parse(&format!("{a}d{b}w"));
            prop_assert_eq!(composed, cmd(Some(a * b), None, op(Operator::Delete, W)));
        }
    }
}
