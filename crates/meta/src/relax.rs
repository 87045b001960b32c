//! Rewrites relaxed JSON into strict JSON.
//!
//! Metadata files are written by hand, and hand-written JSON tends to pick up
//! comments, trailing commas and single quotes. [`relax`] accepts exactly
//! those additions on top of standard JSON:
//!
//! 1. `// line comments`, up to the end of the line;
//! 2. `/* block comments */`, which must be closed;
//! 3. a trailing comma before `]` or `}`, with any whitespace or comments in
//!    between;
//! 4. `'single quoted'` strings, rewritten as double-quoted strings (`\'`
//!    becomes a bare `'`, a bare `"` gets escaped, other escapes are kept).
//!
//! The scanner tracks string literals, so comment markers, commas and quotes
//! that appear inside strings are left alone. Anything else that isn't JSON
//! is passed through untouched for the strict parser to reject.

use crate::error::{ErrorKind, Result};

/// Rewrite relaxed JSON text into strict JSON text.
///
/// # Errors
///
/// Returns [`Unterminated`](ErrorKind::Unterminated) when a string literal or
/// block comment is still open at the end of the input.
pub fn relax(input: &str) -> Result<String> {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '"' => i = copy_double_quoted(&chars, i, &mut out)?,
            '\'' => i = convert_single_quoted(&chars, i, &mut out)?,
            '/' if chars.get(i + 1) == Some(&'/') => i = skip_line_comment(&chars, i),
            '/' if chars.get(i + 1) == Some(&'*') => {
                i = skip_block_comment(&chars, i).ok_or(ErrorKind::Unterminated("block comment"))?;
                // Keep tokens on either side of the comment apart.
                out.push(' ');
            },
            ',' if closes_next(&chars, i + 1) => i += 1,
            c => {
                out.push(c);
                i += 1;
            },
        }
    }
    Ok(out)
}

/// Copies the double-quoted literal opening at `start`; returns the index
/// just past its closing quote.
fn copy_double_quoted(chars: &[char], start: usize, out: &mut String) -> Result<usize> {
    out.push('"');
    let mut j = start + 1;
    loop {
        match chars.get(j) {
            None => exn::bail!(ErrorKind::Unterminated("string")),
            Some('\\') => {
                out.push('\\');
                if let Some(&escaped) = chars.get(j + 1) {
                    out.push(escaped);
                }
                j += 2;
            },
            Some('"') => {
                out.push('"');
                return Ok(j + 1);
            },
            Some(&c) => {
                out.push(c);
                j += 1;
            },
        }
    }
}

/// Rewrites the single-quoted literal opening at `start` as a double-quoted
/// one; returns the index just past its closing quote.
fn convert_single_quoted(chars: &[char], start: usize, out: &mut String) -> Result<usize> {
    out.push('"');
    let mut j = start + 1;
    loop {
        match chars.get(j) {
            None => exn::bail!(ErrorKind::Unterminated("string")),
            Some('\\') => {
                match chars.get(j + 1) {
                    Some('\'') => out.push('\''),
                    Some(&escaped) => {
                        out.push('\\');
                        out.push(escaped);
                    },
                    None => exn::bail!(ErrorKind::Unterminated("string")),
                }
                j += 2;
            },
            Some('"') => {
                out.push_str("\\\"");
                j += 1;
            },
            Some('\'') => {
                out.push('"');
                return Ok(j + 1);
            },
            Some(&c) => {
                out.push(c);
                j += 1;
            },
        }
    }
}

/// Index of the newline ending the comment (or the end of input); the
/// newline itself is kept.
fn skip_line_comment(chars: &[char], start: usize) -> usize {
    let mut j = start + 2;
    while j < chars.len() && chars[j] != '\n' {
        j += 1;
    }
    j
}

/// Index just past the closing `*/`, or `None` if there isn't one.
fn skip_block_comment(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start + 2;
    while j + 1 < chars.len() {
        if chars[j] == '*' && chars[j + 1] == '/' {
            return Some(j + 2);
        }
        j += 1;
    }
    None
}

/// Whether the next meaningful character from `from` closes an array or
/// object, looking past whitespace and comments.
fn closes_next(chars: &[char], from: usize) -> bool {
    let mut j = from;
    loop {
        match chars.get(j) {
            Some(c) if c.is_whitespace() => j += 1,
            Some('/') if chars.get(j + 1) == Some(&'/') => j = skip_line_comment(chars, j),
            Some('/') if chars.get(j + 1) == Some(&'*') => match skip_block_comment(chars, j) {
                Some(end) => j = end,
                None => return false,
            },
            Some(']' | '}') => return true,
            _ => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::{Value, json};

    fn relaxed(input: &str) -> Value {
        serde_json::from_str(&relax(input).unwrap()).unwrap()
    }

    #[test]
    fn strict_json_is_unchanged() {
        let input = r#"{"name": "a", "keywords": ["b", "c"], "n": [1, 2.5, true, null]}"#;
        assert_eq!(relax(input).unwrap(), input);
    }

    #[rstest]
    #[case::end_of_line("{\"name\": \"a\" // the name\n}")]
    #[case::own_line("{\n// leading\n\"name\": \"a\"\n}")]
    #[case::end_of_input("{\"name\": \"a\"}\n// done")]
    fn line_comments(#[case] input: &str) {
        assert_eq!(relaxed(input), json!({"name": "a"}));
    }

    #[rstest]
    #[case::inline(r#"{"name": /* the name */ "a"}"#)]
    #[case::multiline("{\n/*\n * header\n */\n\"name\": \"a\"}")]
    #[case::separates_tokens(r#"{"name":/**/"a"}"#)]
    fn block_comments(#[case] input: &str) {
        assert_eq!(relaxed(input), json!({"name": "a"}));
    }

    #[rstest]
    #[case::object(r#"{"name": "a",}"#, json!({"name": "a"}))]
    #[case::array(r#"{"name": "a", "keywords": ["x", "y",]}"#, json!({"name": "a", "keywords": ["x", "y"]}))]
    #[case::whitespace_between("{\"name\": \"a\" ,\n\t }", json!({"name": "a"}))]
    #[case::comment_between("{\"name\": \"a\", // last\n}", json!({"name": "a"}))]
    #[case::block_comment_between(r#"{"name": "a", /* last */ }"#, json!({"name": "a"}))]
    fn trailing_commas(#[case] input: &str, #[case] expected: Value) {
        assert_eq!(relaxed(input), expected);
    }

    #[rstest]
    #[case::plain("{'name': 'a'}", r#"{"name": "a"}"#)]
    #[case::escaped_single_quote(r"{'name': 'it\'s'}", r#"{"name": "it's"}"#)]
    #[case::bare_double_quote(r#"{'name': 'say "hi"'}"#, r#"{"name": "say \"hi\""}"#)]
    #[case::other_escapes_kept(r"{'name': 'a\nb\\c'}", r#"{"name": "a\nb\\c"}"#)]
    #[case::mixed_quotes(r#"{"name": 'a'}"#, r#"{"name": "a"}"#)]
    fn single_quotes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(relax(input).unwrap(), expected);
    }

    #[rstest]
    #[case::comment_markers(r#"{"url": "http://a/*b*/c"}"#)]
    #[case::trailing_comma_lookalike(r#"{"text": "a,}b,]"}"#)]
    #[case::single_quote(r#"{"text": "it's"}"#)]
    #[case::escaped_quote(r#"{"text": "say \"//hi,}\""}"#)]
    fn string_contents_untouched(#[case] input: &str) {
        assert_eq!(relax(input).unwrap(), input);
    }

    #[rstest]
    #[case::block_comment("{\"name\": \"a\" /* oops", "block comment")]
    #[case::double_quoted("{\"name\": \"a", "string")]
    #[case::single_quoted("{'name': 'a", "string")]
    #[case::trailing_backslash(r"{'name': 'a\", "string")]
    fn unterminated(#[case] input: &str, #[case] what: &'static str) {
        let err = relax(input).unwrap_err();
        assert_eq!(*err, ErrorKind::Unterminated(what));
    }
}
