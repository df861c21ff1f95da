//! `<C-a>` / `<C-x>`: add to the number under or after the cursor.
//!
//! Three number formats are recognized:
//!
//! | Text      | Format  | Result keeps          |
//! |-----------|---------|-----------------------|
//! | `-12`     | decimal | sign, drops leading 0 |
//! | `0x1F`    | hex     | width and letter case |
//! | `0017`    | octal   | width and leading 0   |
//!
//! Only decimals read a `-` directly before them as a sign. Hex and octal
//! values wrap as 64-bit unsigned.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Radix {
    Decimal,
    Octal,
    Hex,
}

/// A number in a line: chars `start..end`, `start` including a decimal's
/// sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberToken {
    pub start: usize,
    pub end: usize,
    pub radix: Radix,
}

/// The rewritten line and the column of the new number's last char.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incremented {
    pub line: String,
    pub cursor: usize,
}

/// Every number inside chars `lo..hi`.
#[must_use]
pub fn tokens(chars: &[char], lo: usize, hi: usize) -> Vec<NumberToken> {
    let hi = hi.min(chars.len());
    let mut out = Vec::new();
    let mut i = lo;
    while i < hi {
        let c = chars[i];
        if c == '0'
            && i + 2 < hi
            && matches!(chars[i + 1], 'x' | 'X')
            && chars[i + 2].is_ascii_hexdigit()
        {
            let mut end = i + 2;
            while end < hi && chars[end].is_ascii_hexdigit() {
                end += 1;
            }
            out.push(NumberToken { start: i, end, radix: Radix::Hex });
            i = end;
        } else if c.is_ascii_digit() {
            let mut end = i;
            while end < hi && chars[end].is_ascii_digit() {
                end += 1;
            }
            let octal = c == '0' && end - i > 1 && chars[i..end].iter().all(|d| *d < '8');
            let token = if octal {
                NumberToken { start: i, end, radix: Radix::Octal }
            } else {
                let signed = i > lo && chars[i - 1] == '-';
                NumberToken {
                    start: if signed { i - 1 } else { i },
                    end,
                    radix: Radix::Decimal,
                }
            };
            out.push(token);
            i = end;
        } else {
            i += 1;
        }
    }
    out
}

/// The replacement text for `token` after adding `delta`.
fn bumped(chars: &[char], token: NumberToken, delta: i64) -> Option<String> {
    let text: String = chars[token.start..token.end].iter().collect();
    match token.radix {
        Radix::Decimal => {
            let value: i128 = text.parse().ok()?;
            Some((value + i128::from(delta)).to_string())
        }
        Radix::Octal => {
            let digits = &text[1..];
            let value = u64::from_str_radix(digits, 8).ok()?;
            let next = value.wrapping_add_signed(delta);
            Some(format!("0{next:0width$o}", width = digits.len()))
        }
        Radix::Hex => {
            let (prefix, digits) = text.split_at(2);
            let value = u64::from_str_radix(digits, 16).ok()?;
            let next = value.wrapping_add_signed(delta);
            let width = digits.len();
            let upper = digits.chars().any(|c| c.is_ascii_uppercase());
            Some(if upper {
                format!("{prefix}{next:0width$X}")
            } else {
                format!("{prefix}{next:0width$x}")
            })
        }
    }
}

fn rewrite(chars: &[char], token: NumberToken, delta: i64) -> Option<Incremented> {
    let replacement = bumped(chars, token, delta)?;
    let cursor = token.start + replacement.chars().count() - 1;
    let mut line: String = chars[..token.start].iter().collect();
    line.push_str(&replacement);
    line.extend(&chars[token.end..]);
    Some(Incremented { line, cursor })
}

/// Normal mode: the first number ending after `col`.
#[must_use]
pub fn increment_at(line: &str, col: usize, delta: i64) -> Option<Incremented> {
    let chars: Vec<char> = line.chars().collect();
    let token = tokens(&chars, 0, chars.len())
        .into_iter()
        .find(|t| t.end > col)?;
    rewrite(&chars, token, delta)
}

/// Visual mode: the first number inside columns `lo..hi`.
#[must_use]
pub fn increment_in(line: &str, lo: usize, hi: usize, delta: i64) -> Option<Incremented> {
    let chars: Vec<char> = line.chars().collect();
    let token = tokens(&chars, lo, hi).into_iter().next()?;
    rewrite(&chars, token, delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn at(line: &str, col: usize, delta: i64) -> Option<(String, usize)> {
        increment_at(line, col, delta).map(|r| (r.line, r.cursor))
    }

    #[test]
    fn number_after_the_cursor() {
        assert_eq!(at("one 9", 0, 1), Some(("one 10".into(), 5)));
        assert_eq!(at("1 one 2", 2, 1), Some(("1 one 3".into(), 6)));
        assert_eq!(at("101", 2, 1), Some(("102".into(), 2)));
        assert_eq!(at("id: 1,", 5, 1), None);
    }

    #[test]
    fn decimal_sign() {
        assert_eq!(at("one -11", 5, 1), Some(("one -10".into(), 6)));
        assert_eq!(at("-10", 0, 15), Some(("5".into(), 0)));
        assert_eq!(at("test-2abc", 0, -3), Some(("test-5abc".into(), 5)));
        assert_eq!(at("-foo2", 3, 1), Some(("-foo3".into(), 4)));
    }

    #[test]
    fn decimal_point_is_not_part_of_the_number() {
        assert_eq!(at("11.123", 1, 1), Some(("12.123".into(), 1)));
        assert_eq!(at("-10.1", 4, 10), Some(("-10.11".into(), 5)));
    }

    #[test]
    fn leading_zeros() {
        assert_eq!(at("000009", 0, 1), Some(("10".into(), 1)));
        assert_eq!(at("000007", 0, 1), Some(("000010".into(), 5)));
        assert_eq!(at("07", 1, 1), Some(("010".into(), 2)));
        assert_eq!(at("00xf", 0, 1), Some(("01xf".into(), 1)));
        assert_eq!(at("0", 0, 10), Some(("10".into(), 1)));
    }

    #[test]
    fn hex() {
        assert_eq!(at("0xf", 0, 1), Some(("0x10".into(), 3)));
        assert_eq!(at("test0xf", 0, 1), Some(("test0x10".into(), 7)));
        assert_eq!(at("-0x0", 0, 1), Some(("-0x1".into(), 3)));
        assert_eq!(at("0x0A", 0, 1), Some(("0x0B".into(), 3)));
        assert_eq!(at("0x00", 0, -1), Some(("0xffffffffffffffff".into(), 17)));
    }

    #[test]
    fn signs_before_octal_and_hex_are_text() {
        assert_eq!(at("test-0116", 0, 1), Some(("test-0117".into(), 8)));
        assert_eq!(at("test+0116", 0, 1), Some(("test+0117".into(), 8)));
        assert_eq!(at("test-0xf", 0, 1), Some(("test-0x10".into(), 8)));
    }

    #[test]
    fn several_numbers_in_a_word() {
        assert_eq!(at("foo1bar2", 1, 1), Some(("foo2bar2".into(), 3)));
        assert_eq!(at("foo1bar2", 4, 1), Some(("foo1bar3".into(), 7)));
    }

    #[test]
    fn visual_range_limits_the_scan() {
        let r = increment_in("9 9 9", 1, 5, 3).unwrap();
        assert_eq!((r.line.as_str(), r.cursor), ("9 12 9", 3));
        assert_eq!(increment_in("9 9 9", 1, 2, 3), None);
        assert_eq!(increment_in("9 9 9", 0, 2, 3).unwrap().line, "12 9 9");
    }

    proptest! {
        #[test]
        fn decimal_add_then_subtract(n in -100_000i64..100_000, delta in -1_000i64..1_000) {
            let line = format!("x {n} y");
            let up = increment_at(&line, 0, delta).unwrap();
            prop_assert_eq!(up.line.clone(), format!("x {} y", n + delta));
            let down = increment_at(&up.line, 0, -delta).unwrap();
            prop_assert_eq!(down.line, line);
        }
    }
}
