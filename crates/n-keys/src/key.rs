// SPDX-License-Identifier: MIT
//
// Key event types.
//
// A `KeyEvent` is a key identity plus modifier flags. Printable keys use
// `KeyCode::Char` with the character as typed (so `A` is `Char('A')` with
// no SHIFT flag). Control chords on letters are normalized to lowercase:
// `<C-A>` and `<C-a>` are the same key, as in Vim. `<C-[>` is Escape.

use std::fmt;

use bitflags::bitflags;

// ─── Key Types ──────────────────────────────────────────────────────────────

/// A keyboard event with key identity and modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    /// Which key was pressed.
    pub code: KeyCode,
    /// Active modifier keys (Shift, Alt, Ctrl).
    pub modifiers: Modifiers,
}

/// Identity of a key.
///
/// Named keys have dedicated variants; printable characters use
/// [`Char`](KeyCode::Char).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A Unicode character (printable).
    Char(char),
    // ── Named keys ──────────────────────────────────────────────
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    // ── Navigation ──────────────────────────────────────────────
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
}

bitflags! {
    /// Keyboard modifier flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
    }
}

impl KeyEvent {
    /// A key with no modifiers.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
        }
    }

    /// A key with the given modifiers, normalized the way Vim compares keys.
    #[must_use]
    pub fn with_modifiers(code: KeyCode, modifiers: Modifiers) -> Self {
        match code {
            // <C-[> is the Escape byte.
            KeyCode::Char('[') if modifiers == Modifiers::CTRL => Self::new(KeyCode::Escape),
            KeyCode::Char(c) if modifiers.contains(Modifiers::CTRL) && c.is_ascii_alphabetic() => {
                Self {
                    code: KeyCode::Char(c.to_ascii_lowercase()),
                    modifiers,
                }
            }
            _ => Self { code, modifiers },
        }
    }

    /// A plain character key.
    #[must_use]
    pub const fn char(c: char) -> Self {
        Self::new(KeyCode::Char(c))
    }

    /// A Ctrl chord on a character.
    #[must_use]
    pub fn ctrl(c: char) -> Self {
        Self::with_modifiers(KeyCode::Char(c), Modifiers::CTRL)
    }

    /// The character this key types, if it is a plain printable key.
    ///
    /// Shift-only chords still type (`<S-x>` types `x`), everything with
    /// Ctrl or Alt does not.
    #[must_use]
    pub fn typed_char(&self) -> Option<char> {
        match self.code {
            KeyCode::Char(c) if !self.modifiers.intersects(Modifiers::CTRL | Modifiers::ALT) => {
                Some(c)
            }
            _ => None,
        }
    }

    /// Whether this is `Ctrl` + `c`.
    #[must_use]
    pub fn is_ctrl(&self, c: char) -> bool {
        self.modifiers == Modifiers::CTRL && self.code == KeyCode::Char(c)
    }

    /// Whether this is any Escape-equivalent key.
    #[must_use]
    pub fn is_escape(&self) -> bool {
        self.code == KeyCode::Escape
    }
}

impl From<char> for KeyEvent {
    fn from(c: char) -> Self {
        match c {
            '\n' | '\r' => Self::new(KeyCode::Enter),
            '\t' => Self::new(KeyCode::Tab),
            '\u{1b}' => Self::new(KeyCode::Escape),
            _ => Self::char(c),
        }
    }
}

// ─── Display (back to notation) ─────────────────────────────────────────────

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.code {
            KeyCode::Char(' ') => "Space".to_string(),
            KeyCode::Char('<') => "lt".to_string(),
            KeyCode::Char(c) => {
                if self.modifiers.is_empty() {
                    return write!(f, "{c}");
                }
                c.to_string()
            }
            KeyCode::Enter => "CR".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::Backspace => "BS".to_string(),
            KeyCode::Escape => "Esc".to_string(),
            KeyCode::Delete => "Del".to_string(),
            KeyCode::Up => "Up".to_string(),
            KeyCode::Down => "Down".to_string(),
            KeyCode::Left => "Left".to_string(),
            KeyCode::Right => "Right".to_string(),
            KeyCode::Home => "Home".to_string(),
            KeyCode::End => "End".to_string(),
        };
        f.write_str("<")?;
        if self.modifiers.contains(Modifiers::CTRL) {
            f.write_str("C-")?;
        }
        if self.modifiers.contains(Modifiers::SHIFT) {
            f.write_str("S-")?;
        }
        if self.modifiers.contains(Modifiers::ALT) {
            f.write_str("A-")?;
        }
        write!(f, "{name}>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ctrl_letters_normalize_to_lowercase() {
        assert_eq!(KeyEvent::ctrl('A'), KeyEvent::ctrl('a'));
        assert!(KeyEvent::ctrl('A').is_ctrl('a'));
    }

    #[test]
    fn ctrl_bracket_is_escape() {
        assert!(KeyEvent::ctrl('[').is_escape());
    }

    #[test]
    fn typed_char_ignores_ctrl_chords() {
        assert_eq!(KeyEvent::char('x').typed_char(), Some('x'));
        assert_eq!(KeyEvent::ctrl('x').typed_char(), None);
        let shifted = KeyEvent::with_modifiers(KeyCode::Char('x'), Modifiers::SHIFT);
        assert_eq!(shifted.typed_char(), Some('x'));
    }

    #[test]
    fn control_chars_map_to_named_keys() {
        assert_eq!(KeyEvent::from('\n'), KeyEvent::new(KeyCode::Enter));
        assert_eq!(KeyEvent::from('\t'), KeyEvent::new(KeyCode::Tab));
    }

    #[test]
    fn display_round_trips_notation() {
        assert_eq!(KeyEvent::char('d').to_string(), "d");
        assert_eq!(KeyEvent::ctrl('a').to_string(), "<C-a>");
        assert_eq!(KeyEvent::char('<').to_string(), "<lt>");
        assert_eq!(KeyEvent::new(KeyCode::Escape).to_string(), "<Esc>");
        let sbs = KeyEvent::with_modifiers(KeyCode::Backspace, Modifiers::SHIFT);
        assert_eq!(sbs.to_string(), "<S-BS>");
    }
}
