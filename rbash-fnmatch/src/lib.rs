//! Shell globbing patterns.
//!
//! A shell pattern is compiled once into a regular expression body and then
//! probed in various ways:
//!
//! - [`Pattern::is_match`] — whole-string match, used by `case` patterns and
//!   `[[ s == pat ]]` / `[[ s != pat ]]`.
//! - [`Pattern::longest_prefix`] / [`Pattern::shortest_prefix`] — used by
//!   `${name%pat}` / `${name%%pat}` style prefix removal.
//! - [`Pattern::longest_suffix`] / [`Pattern::shortest_suffix`] — used by
//!   `${name#pat}` / `${name##pat}` style suffix removal.
//!
//! Supported syntax: `?` (any one character), `*` (any run of characters),
//! and bracket expressions `[...]` / `[!...]` (character sets, ranges, and
//! negation). Anything else is matched literally; regular-expression
//! metacharacters occurring outside a bracket expression are escaped before
//! being handed to the underlying [`regex`] engine.

use regex::Regex;
use std::fmt;
use thiserror::Error;

/// An error compiling a shell pattern.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum Error {
    /// A bracket expression (`[...]`) was never closed.
    #[error("unterminated bracket expression")]
    UnterminatedBracket,
    /// The translated pattern was rejected by the regular-expression engine.
    #[error("invalid pattern: {0}")]
    Regex(String),
}

/// A compiled shell globbing pattern.
#[derive(Clone, Debug)]
pub struct Pattern {
    /// Regex body with no anchors, e.g. `*.txt` becomes `.*\.txt`.
    body: String,
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.body)
    }
}

impl Pattern {
    /// Compiles a shell pattern.
    pub fn parse(pattern: &str) -> Result<Self, Error> {
        Ok(Pattern {
            body: translate(pattern)?,
        })
    }

    fn whole_match_regex(&self) -> Regex {
        // The body was validated at parse time, so re-compilation cannot fail.
        Regex::new(&format!("^(?:{})$", self.body)).expect("validated pattern")
    }

    /// Returns whether the pattern matches the whole of `s`.
    pub fn is_match(&self, s: &str) -> bool {
        self.whole_match_regex().is_match(s)
    }

    /// Length, in bytes, of the shortest prefix of `s` that the whole pattern
    /// matches, or `None` if no prefix matches.
    pub fn shortest_prefix(&self, s: &str) -> Option<usize> {
        let re = self.whole_match_regex();
        char_boundaries(s).find(|&len| re.is_match(&s[..len]))
    }

    /// Length, in bytes, of the longest prefix of `s` that the whole pattern
    /// matches, or `None` if no prefix matches.
    pub fn longest_prefix(&self, s: &str) -> Option<usize> {
        let re = self.whole_match_regex();
        char_boundaries(s).rev().find(|&len| re.is_match(&s[..len]))
    }

    /// Byte offset of the shortest suffix of `s` that the whole pattern
    /// matches, or `None` if no suffix matches.
    pub fn shortest_suffix(&self, s: &str) -> Option<usize> {
        let re = self.whole_match_regex();
        char_boundaries(s)
            .rev()
            .find(|&start| re.is_match(&s[start..]))
    }

    /// Byte offset of the longest suffix of `s` that the whole pattern
    /// matches, or `None` if no suffix matches.
    pub fn longest_suffix(&self, s: &str) -> Option<usize> {
        let re = self.whole_match_regex();
        char_boundaries(s).find(|&start| re.is_match(&s[start..]))
    }

    /// Finds the first (leftmost, then longest) substring of `s` that the
    /// pattern matches anywhere, used by `${name/pat/rep}`.
    pub fn find(&self, s: &str) -> Option<(usize, usize)> {
        let re = Regex::new(&self.body).expect("validated pattern");
        re.find(s).map(|m| (m.start(), m.end()))
    }
}

/// Byte offsets of every character boundary in `s`, from `0` to `s.len()`
/// inclusive, in ascending order.
fn char_boundaries(s: &str) -> impl DoubleEndedIterator<Item = usize> + '_ {
    s.char_indices().map(|(i, _)| i).chain(std::iter::once(s.len()))
}

/// Translates a shell glob pattern into an unanchored regex body.
fn translate(pattern: &str) -> Result<String, Error> {
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '[' => translate_bracket(&mut chars, &mut out)?,
            _ => push_escaped(&mut out, c),
        }
    }
    Regex::new(&format!("^(?:{out})$")).map_err(|e| Error::Regex(e.to_string()))?;
    Ok(out)
}

fn translate_bracket(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    out: &mut String,
) -> Result<(), Error> {
    let mut body = String::new();
    let mut complement = false;
    if let Some(&next) = chars.peek() {
        if next == '!' || next == '^' {
            complement = true;
            chars.next();
        }
    }
    // A `]` as the very first character (after an optional `!`) is literal.
    if let Some(&']') = chars.peek() {
        body.push_str("\\]");
        chars.next();
    }
    let mut closed = false;
    while let Some(c) = chars.next() {
        if c == ']' {
            closed = true;
            break;
        }
        match c {
            '\\' => body.push_str("\\\\"),
            '^' => body.push_str("\\^"),
            ']' => unreachable!(),
            _ => body.push(c),
        }
    }
    if !closed {
        return Err(Error::UnterminatedBracket);
    }
    out.push('[');
    if complement {
        out.push('^');
    }
    out.push_str(&body);
    out.push(']');
    Ok(())
}

fn push_escaped(out: &mut String, c: char) {
    if regex_syntax_needs_escape(c) {
        out.push('\\');
    }
    out.push(c);
}

fn regex_syntax_needs_escape(c: char) -> bool {
    matches!(
        c,
        '.' | '^' | '$' | '+' | '(' | ')' | '{' | '}' | '|' | '\\'
    )
}
