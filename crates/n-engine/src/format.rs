//! `gq`: reflow lines to `textwidth`.
//!
//! Lines are grouped into paragraphs. A paragraph ends at a blank line, at a
//! line holding only a comment leader, or where the leader changes. Each
//! paragraph's words are rewrapped so no line is wider than `textwidth`; a word
//! longer than that gets a line of its own. Whitespace between words on the
//! same source line is kept while they stay together, and lines are joined
//! with a single space.
//!
//! Recognized comment leaders: `//`, `/*` (continued as ` *`) and `*`, each
//! with any indent before and any whitespace after.

use unicode_width::UnicodeWidthChar;

/// Display width of `text` starting at column 0.
#[must_use]
pub fn display_width(text: &str, tabstop: usize) -> usize {
    let tabstop = tabstop.max(1);
    text.chars().fold(0, |col, c| {
        if c == '\t' {
            col + tabstop - col % tabstop
        } else {
            col + c.width().unwrap_or(0)
        }
    })
}

/// A line split into its leader and the text after it.
struct Leader<'a> {
    /// The leader as written on this line.
    first: &'a str,
    /// The leader wrapped lines get.
    rest: String,
    body: &'a str,
}

fn leader(line: &str) -> Leader<'_> {
    let indent_len = line.len() - line.trim_start_matches([' ', '\t']).len();
    let (indent, after) = line.split_at(indent_len);
    let marker = ["//", "/*", "*"]
        .into_iter()
        .find(|m| after.starts_with(m) && !after.starts_with("*/"));
    let Some(marker) = marker else {
        return Leader {
            first: indent,
            rest: indent.to_string(),
            body: after,
        };
    };
    let tail = &after[marker.len()..];
    let gap = tail.len() - tail.trim_start_matches([' ', '\t']).len();
    let split = indent_len + marker.len() + gap;
    let rest = if marker == "/*" {
        format!("{indent} *{}", &tail[..gap.max(1)].replace('\t', " "))
    } else {
        line[..split].to_string()
    };
    Leader {
        first: &line[..split],
        rest,
        body: &line[split..],
    }
}

/// Reflow `lines`, returning their replacement.
#[must_use]
pub fn format_lines<S: AsRef<str>>(lines: &[S], textwidth: usize, tabstop: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let head = leader(lines[i].as_ref());
        if head.body.trim().is_empty() {
            out.push(lines[i].as_ref().to_string());
            i += 1;
            continue;
        }
        let mut words: Vec<(&str, &str)> = split_words(head.body).collect();
        i += 1;
        while i < lines.len() {
            let next = leader(lines[i].as_ref());
            if next.body.trim().is_empty() || next.first.trim_end() != head.rest.trim_end() {
                break;
            }
            words.extend(split_words(next.body));
            i += 1;
        }
        wrap(&words, head.first, &head.rest, textwidth, tabstop, &mut out);
    }
    out
}

/// Each word of `body` with the whitespace after it. The last word of the
/// line is followed by a single space.
fn split_words(body: &str) -> impl Iterator<Item = (&str, &str)> {
    let mut rest = body.trim_start_matches([' ', '\t']);
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let end = rest.find([' ', '\t']).unwrap_or(rest.len());
        let (word, tail) = rest.split_at(end);
        let after = tail.trim_start_matches([' ', '\t']);
        let gap = &tail[..tail.len() - after.len()];
        rest = after;
        Some((word, if rest.is_empty() { " " } else { gap }))
    })
}

fn wrap(
    words: &[(&str, &str)],
    first: &str,
    rest: &str,
    textwidth: usize,
    tabstop: usize,
    out: &mut Vec<String>,
) {
    let mut line = first.to_string();
    let mut gap: Option<&str> = None;
    for &(word, after) in words {
        if let Some(sep) = gap {
            let candidate = format!("{line}{sep}{word}");
            if display_width(&candidate, tabstop) <= textwidth {
                line = candidate;
                gap = Some(after);
                continue;
            }
            out.push(std::mem::replace(&mut line, rest.to_string()));
        }
        line.push_str(word);
        gap = Some(after);
    }
    out.push(line);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LONG: &str = "We choose to write a vim extension, not because it is easy, but because it is hard.";

    #[test]
    fn widths_expand_tabs() {
        assert_eq!(display_width("\tx", 4), 5);
        assert_eq!(display_width("ab\tx", 4), 5);
        assert_eq!(display_width("漢字", 8), 4);
    }

    #[test]
    fn line_comment_leader_keeps_its_spacing() {
        let out = format_lines(&[format!("//    {LONG}")], 80, 8);
        assert_eq!(
            out,
            vec![
                "//    We choose to write a vim extension, not because it is easy, but because it",
                "//    is hard.",
            ]
        );
    }

    #[test]
    fn indented_and_tabbed_leaders() {
        let out = format_lines(&[format!("    // {LONG}")], 80, 8);
        assert_eq!(
            out,
            vec![
                "    // We choose to write a vim extension, not because it is easy, but because",
                "    // it is hard.",
            ]
        );
        let out = format_lines(&[format!("\t\t// {LONG}")], 80, 4);
        assert_eq!(
            out,
            vec![
                "\t\t// We choose to write a vim extension, not because it is easy, but",
                "\t\t// because it is hard.",
            ]
        );
    }

    #[test]
    fn blank_lines_separate_paragraphs() {
        let lines = ["abc", "", "", "", "def"];
        assert_eq!(format_lines(&lines, 80, 8), lines);
    }

    #[test]
    fn block_comments_stay_put() {
        assert_eq!(format_lines(&["/* abc def */"], 80, 8), ["/* abc def */"]);
        let lines = ["/* abc", " *", " *", " * def */"];
        assert_eq!(format_lines(&lines, 80, 8), lines);
    }

    #[test]
    fn block_comment_continuation() {
        let out = format_lines(&["/* one", " * two three"], 80, 8);
        assert_eq!(out, ["/* one two three"]);
        let out = format_lines(&["/* one two three"], 10, 8);
        assert_eq!(out, ["/* one two", " * three"]);
    }

    #[test]
    fn break_at_exactly_textwidth() {
        let body = "1 3 5 7 911 3 5 7 921 3 5 7 931 3 5 7 941 3 5 7 951 3 5 7 961 3 5 7 971 3 5 7 9";
        let out = format_lines(&[format!("{body}x split")], 80, 8);
        assert_eq!(out, vec![format!("{body}x"), "split".to_string()]);
        let out = format_lines(&[format!("{body}xs split")], 80, 8);
        assert_eq!(
            out,
            vec![body[..body.len() - 2].to_string(), "9xs split".to_string()]
        );
    }

    #[test]
    fn long_words_get_their_own_line() {
        let huge = "s".repeat(90);
        let out = format_lines(&[format!("this is a {huge} long    word")], 20, 8);
        assert_eq!(out, vec!["this is a".to_string(), huge, "long    word".to_string()]);
    }

    #[test]
    fn inner_whitespace_is_kept_until_a_break() {
        let long = format!("l{}ng", "o".repeat(68));
        let line = format!("this is a s{}per {long}{}word", "u".repeat(80), " ".repeat(20));
        let out = format_lines(&[line], 80, 8);
        assert_eq!(
            out,
            vec![
                "this is a".to_string(),
                format!("s{}per", "u".repeat(80)),
                format!("long {long}"),
                "word".to_string(),
            ]
        );
        assert_eq!(format_lines(&["a  b   ", "c"], 80, 8), ["a  b c"]);
    }

    #[test]
    fn consecutive_lines_join() {
        assert_eq!(format_lines(&["a b", "c", "  d"], 80, 8), ["a b c d"]);
    }
}
