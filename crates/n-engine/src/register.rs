//! Registers: storage for yanked, deleted and inserted text.
//!
//! Every yank and delete writes to a register. Put (`p`, `P`) reads one back.
//! Each slot remembers how its text was captured, because put behaves
//! differently for each:
//!
//! - **Char**: inserted inline.
//! - **Line**: inserted as whole lines above or below. Content always ends
//!   with `'\n'`, one per line.
//! - **Block**: one row per line, pasted as a rectangle.
//!
//! ## Which slot gets written
//!
//! | Register    | Written by                                          |
//! |-------------|-----------------------------------------------------|
//! | `"`         | every yank and delete                               |
//! | `0`         | yanks without an explicit register                  |
//! | `1`–`9`     | linewise or multi-line deletes; older text shifts up |
//! | `-`         | deletes within one line                             |
//! | `a`–`z`     | explicit `"x`; uppercase appends                    |
//! | `_`         | nothing (black hole)                                |
//! | `.`         | the last inserted text (read-only)                  |

/// How the text was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegisterKind {
    #[default]
    Char,
    Line,
    Block,
}

/// One register slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Register {
    content: String,
    kind: RegisterKind,
}

impl Register {
    #[must_use]
    pub fn new(content: impl Into<String>, kind: RegisterKind) -> Self {
        let mut content = content.into();
        if kind == RegisterKind::Line && !content.ends_with('\n') {
            content.push('\n');
        }
        Self { content, kind }
    }

    /// Append for uppercase names. Mixing in linewise text makes the whole
    /// register linewise.
    fn append(&mut self, other: &Self) {
        if other.kind == RegisterKind::Line || self.kind == RegisterKind::Line {
            if !self.content.is_empty() && !self.content.ends_with('\n') {
                self.content.push('\n');
            }
            self.content.push_str(&other.content);
            if !self.content.ends_with('\n') {
                self.content.push('\n');
            }
            self.kind = RegisterKind::Line;
        } else {
            self.content.push_str(&other.content);
        }
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub const fn kind(&self) -> RegisterKind {
        self.kind
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Content split into rows: lines for linewise text (without the final
    /// terminator), rows for blocks, a single element otherwise.
    #[must_use]
    pub fn rows(&self) -> Vec<&str> {
        match self.kind {
            RegisterKind::Line => self
                .content
                .strip_suffix('\n')
                .unwrap_or(&self.content)
                .split('\n')
                .collect(),
            RegisterKind::Block => self.content.split('\n').collect(),
            RegisterKind::Char => vec![self.content.as_str()],
        }
    }
}

// ── Register file ────────────────────────────────────────────────────────

/// Whether `name` can follow `"`.
#[must_use]
pub const fn is_valid_name(name: char) -> bool {
    matches!(name, '"' | '0'..='9' | 'a'..='z' | 'A'..='Z' | '-' | '_' | '.')
}

/// The complete register set for one session.
#[derive(Debug, Clone, Default)]
pub struct RegisterFile {
    unnamed: Register,
    /// `0`–`9`.
    numbered: [Register; 10],
    /// `a`–`z`.
    named: [Register; 26],
    small_delete: Register,
    last_insert: Register,
    empty: Register,
}

impl RegisterFile {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store yanked text.
    pub fn yank(&mut self, name: Option<char>, reg: Register) {
        match name {
            Some('_') => {}
            Some(ch) if ch.is_ascii_alphabetic() => self.write_named(ch, reg),
            _ => {
                self.numbered[0] = reg.clone();
                self.unnamed = reg;
            }
        }
    }

    /// Store deleted or changed text. `force_numbered` is set for the motions
    /// Vim always records in `"1` (`%`, `(`, `)`, `` ` ``, `/`, `?`, `n`, `N`,
    /// `{`, `}`) even when the text is within one line.
    pub fn delete(&mut self, name: Option<char>, reg: Register, force_numbered: bool) {
        match name {
            Some('_') => {}
            Some(ch) if ch.is_ascii_alphabetic() => self.write_named(ch, reg),
            _ => {
                let multi_line =
                    reg.kind == RegisterKind::Line || reg.content.contains('\n');
                if multi_line || force_numbered {
                    self.numbered[1..].rotate_right(1);
                    self.numbered[1] = reg.clone();
                } else {
                    self.small_delete = reg.clone();
                }
                self.unnamed = reg;
            }
        }
    }

    /// Record the text typed during the last insert session.
    pub fn set_last_insert(&mut self, text: String) {
        self.last_insert = Register::new(text, RegisterKind::Char);
    }

    fn write_named(&mut self, ch: char, reg: Register) {
        let idx = (ch.to_ascii_lowercase() as u8 - b'a') as usize;
        if ch.is_ascii_uppercase() {
            self.named[idx].append(&reg);
        } else {
            self.named[idx] = reg;
        }
        self.unnamed = self.named[idx].clone();
    }

    /// The register to read. `None` and `"` are the unnamed register.
    #[must_use]
    pub fn get(&self, name: Option<char>) -> &Register {
        match name {
            None | Some('"') => &self.unnamed,
            Some(d @ '0'..='9') => &self.numbered[(d as u8 - b'0') as usize],
            Some(ch) if ch.is_ascii_alphabetic() => {
                &self.named[(ch.to_ascii_lowercase() as u8 - b'a') as usize]
            }
            Some('-') => &self.small_delete,
            Some('.') => &self.last_insert,
            Some(_) => &self.empty,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chars(s: &str) -> Register {
        Register::new(s, RegisterKind::Char)
    }

    fn lines(s: &str) -> Register {
        Register::new(s, RegisterKind::Line)
    }

    // ── Register ────────────────────────────────────────────────────────

    #[test]
    fn linewise_content_is_terminated() {
        assert_eq!(lines("one").content(), "one\n");
        assert_eq!(lines("one\ntwo\n").rows(), vec!["one", "two"]);
    }

    #[test]
    fn append_upgrades_to_linewise() {
        let mut r = chars("abc");
        r.append(&lines("def"));
        assert_eq!(r.kind(), RegisterKind::Line);
        assert_eq!(r.content(), "abc\ndef\n");
    }

    // ── Yank ────────────────────────────────────────────────────────────

    #[test]
    fn yank_writes_zero_and_unnamed() {
        let mut rf = RegisterFile::new();
        rf.yank(None, chars("word"));
        assert_eq!(rf.get(None).content(), "word");
        assert_eq!(rf.get(Some('0')).content(), "word");
        assert!(rf.get(Some('1')).is_empty());
    }

    #[test]
    fn named_yank_skips_zero() {
        let mut rf = RegisterFile::new();
        rf.yank(Some('a'), chars("x"));
        assert_eq!(rf.get(Some('a')).content(), "x");
        assert_eq!(rf.get(Some('"')).content(), "x");
        assert!(rf.get(Some('0')).is_empty());
    }

    #[test]
    fn uppercase_appends() {
        let mut rf = RegisterFile::new();
        rf.yank(Some('a'), chars("one"));
        rf.yank(Some('A'), chars("two"));
        assert_eq!(rf.get(Some('a')).content(), "onetwo");
        assert_eq!(rf.get(Some('A')).content(), "onetwo");
        assert_eq!(rf.get(None).content(), "onetwo");
    }

    // ── Delete ──────────────────────────────────────────────────────────

    #[test]
    fn linewise_deletes_shift_the_ring() {
        let mut rf = RegisterFile::new();
        rf.delete(None, lines("first"), false);
        rf.delete(None, lines("second"), false);
        assert_eq!(rf.get(Some('1')).content(), "second\n");
        assert_eq!(rf.get(Some('2')).content(), "first\n");
    }

    #[test]
    fn ring_drops_the_oldest() {
        let mut rf = RegisterFile::new();
        for i in 0..10 {
            rf.delete(None, lines(&i.to_string()), false);
        }
        assert_eq!(rf.get(Some('1')).content(), "9\n");
        assert_eq!(rf.get(Some('9')).content(), "1\n");
    }

    #[test]
    fn small_deletes_go_to_minus() {
        let mut rf = RegisterFile::new();
        rf.delete(None, chars("ab"), false);
        assert_eq!(rf.get(Some('-')).content(), "ab");
        assert!(rf.get(Some('1')).is_empty());
        assert_eq!(rf.get(None).content(), "ab");
    }

    #[test]
    fn forced_small_delete_goes_to_one() {
        let mut rf = RegisterFile::new();
        rf.delete(None, chars("(x)"), true);
        assert_eq!(rf.get(Some('1')).content(), "(x)");
        assert!(rf.get(Some('-')).is_empty());
    }

    #[test]
    fn black_hole_discards() {
        let mut rf = RegisterFile::new();
        rf.yank(None, chars("keep"));
        rf.delete(Some('_'), chars("gone"), false);
        assert_eq!(rf.get(None).content(), "keep");
        assert!(rf.get(Some('_')).is_empty());
    }

    #[test]
    fn valid_names() {
        assert!(is_valid_name('a'));
        assert!(is_valid_name('7'));
        assert!(is_valid_name('_'));
        assert!(!is_valid_name('!'));
    }
}
