// SPDX-License-Identifier: MIT
//
// Vim key notation parser.
//
// Turns strings like `d3w`, `ci(<Esc>`, `15<C-a>` into `KeyEvent`s.
//
// A `<` starts a bracketed key name only when a recognized name follows
// and is closed by `>`. Anything else is a literal `<`, which is what
// makes `<<` (shift left) and `d<` type naturally. A standalone token
// can be parsed strictly with `str::parse::<KeyEvent>()`, which rejects
// unknown names instead of falling back.

use std::str::FromStr;

use thiserror::Error;

use crate::key::{KeyCode, KeyEvent, Modifiers};

/// Errors from strict single-token parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty key token")]
    Empty,
    #[error("unknown key name: <{0}>")]
    UnknownKey(String),
    #[error("key token has trailing input: {0}")]
    Trailing(String),
}

/// Parse a whole key sequence. Never fails: unrecognized `<...>` runs
/// are typed literally.
#[must_use]
pub fn parse_keys(input: &str) -> Vec<KeyEvent> {
    let mut keys = Vec::new();
    let mut rest = input;

    while let Some(c) = rest.chars().next() {
        if c == '<' {
            if let Some((key, consumed)) = bracketed(rest) {
                keys.push(key);
                rest = &rest[consumed..];
                continue;
            }
        }
        keys.push(KeyEvent::from(c));
        rest = &rest[c.len_utf8()..];
    }

    keys
}

impl FromStr for KeyEvent {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let Some(first) = chars.next() else {
            return Err(ParseError::Empty);
        };
        if first != '<' || s.len() == 1 {
            if chars.next().is_some() {
                return Err(ParseError::Trailing(s.to_string()));
            }
            return Ok(Self::from(first));
        }
        match bracketed(s) {
            Some((key, consumed)) if consumed == s.len() => Ok(key),
            Some(_) => Err(ParseError::Trailing(s.to_string())),
            None => {
                let inner = s.trim_start_matches('<').trim_end_matches('>');
                Err(ParseError::UnknownKey(inner.to_string()))
            }
        }
    }
}

// ─── Bracketed names ────────────────────────────────────────────────────────

/// Try to read `<...>` at the start of `input`. Returns the key and the
/// number of bytes consumed.
fn bracketed(input: &str) -> Option<(KeyEvent, usize)> {
    // `<C->>` names the `>` key, so a failed body retries at the next `>`.
    let mut search_from = 1;
    while let Some(offset) = input[search_from..].find('>') {
        let close = search_from + offset;
        if close > MAX_NAME_LEN {
            break;
        }
        if let Some(key) = parse_body(&input[1..close]) {
            return Some((key, close + 1));
        }
        search_from = close + 1;
    }
    None
}

/// Longest bracketed body we look at (`<C-S-Backspace>` fits).
const MAX_NAME_LEN: usize = 16;

fn parse_body(body: &str) -> Option<KeyEvent> {
    let mut modifiers = Modifiers::empty();
    let mut rest = body;

    loop {
        let mut chars = rest.chars();
        match (chars.next(), chars.next()) {
            (Some(m), Some('-')) if rest.len() > 2 => {
                let flag = match m.to_ascii_uppercase() {
                    'C' => Modifiers::CTRL,
                    'S' => Modifiers::SHIFT,
                    'A' | 'M' => Modifiers::ALT,
                    _ => return None,
                };
                modifiers |= flag;
                rest = &rest[2..];
            }
            _ => break,
        }
    }

    let code = named(rest).or_else(|| {
        let mut chars = rest.chars();
        let c = chars.next()?;
        // A bare single char is only a bracketed key when it carries a
        // modifier; `<x>` is typed literally.
        (chars.next().is_none() && !modifiers.is_empty()).then_some(KeyCode::Char(c))
    })?;

    Some(KeyEvent::with_modifiers(code, modifiers))
}

fn named(name: &str) -> Option<KeyCode> {
    let code = match name.to_ascii_lowercase().as_str() {
        "esc" | "escape" => KeyCode::Escape,
        "cr" | "enter" | "return" | "nl" => KeyCode::Enter,
        "bs" | "backspace" => KeyCode::Backspace,
        "del" | "delete" => KeyCode::Delete,
        "tab" => KeyCode::Tab,
        "space" => KeyCode::Char(' '),
        "lt" => KeyCode::Char('<'),
        "bslash" => KeyCode::Char('\\'),
        "bar" => KeyCode::Char('|'),
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        _ => return None,
    };
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chars(s: &str) -> Vec<KeyEvent> {
        s.chars().map(KeyEvent::char).collect()
    }

    #[test]
    fn plain_characters() {
        assert_eq!(parse_keys("d3w"), chars("d3w"));
    }

    #[test]
    fn named_keys() {
        assert_eq!(
            parse_keys("ihi<Esc>"),
            vec![
                KeyEvent::char('i'),
                KeyEvent::char('h'),
                KeyEvent::char('i'),
                KeyEvent::new(KeyCode::Escape),
            ]
        );
        assert_eq!(parse_keys("<CR>"), vec![KeyEvent::new(KeyCode::Enter)]);
        assert_eq!(parse_keys("<space>"), vec![KeyEvent::char(' ')]);
    }

    #[test]
    fn control_chords() {
        assert_eq!(
            parse_keys("15<C-a>"),
            vec![KeyEvent::char('1'), KeyEvent::char('5'), KeyEvent::ctrl('a')]
        );
        assert_eq!(parse_keys("<C-[>"), vec![KeyEvent::new(KeyCode::Escape)]);
    }

    #[test]
    fn modified_named_keys() {
        assert_eq!(
            parse_keys("<S-BS><C-BS>"),
            vec![
                KeyEvent::with_modifiers(KeyCode::Backspace, Modifiers::SHIFT),
                KeyEvent::with_modifiers(KeyCode::Backspace, Modifiers::CTRL),
            ]
        );
    }

    #[test]
    fn literal_angle_brackets() {
        assert_eq!(parse_keys("<<"), chars("<<"));
        assert_eq!(parse_keys("d<"), chars("d<"));
        assert_eq!(parse_keys("ci<"), chars("ci<"));
        assert_eq!(parse_keys("<x>"), chars("<x>"));
        assert_eq!(parse_keys("<lt>"), vec![KeyEvent::char('<')]);
    }

    #[test]
    fn ctrl_gt_is_a_key() {
        assert_eq!(
            parse_keys("<C->>"),
            vec![KeyEvent::with_modifiers(KeyCode::Char('>'), Modifiers::CTRL)]
        );
    }

    #[test]
    fn newline_in_source_is_enter() {
        assert_eq!(
            parse_keys("/a\n"),
            vec![KeyEvent::char('/'), KeyEvent::char('a'), KeyEvent::new(KeyCode::Enter)]
        );
    }

    #[test]
    fn strict_token_parsing() {
        assert_eq!("<Esc>".parse::<KeyEvent>(), Ok(KeyEvent::new(KeyCode::Escape)));
        assert_eq!("x".parse::<KeyEvent>(), Ok(KeyEvent::char('x')));
        assert_eq!("<".parse::<KeyEvent>(), Ok(KeyEvent::char('<')));
        assert_eq!(
            "<Foo>".parse::<KeyEvent>(),
            Err(ParseError::UnknownKey("Foo".to_string()))
        );
        assert_eq!("".parse::<KeyEvent>(), Err(ParseError::Empty));
        assert!(matches!("ab".parse::<KeyEvent>(), Err(ParseError::Trailing(_))));
    }
}
