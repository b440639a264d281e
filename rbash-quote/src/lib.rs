//! POSIX shell quoting.
//!
//! [`quote`] turns an arbitrary string into a shell word that expands back to
//! the same string. It picks the lightest quoting style that works:
//!
//! - if nothing in the string needs quoting, the string is returned as is;
//! - otherwise, if the string contains no single quote, it is wrapped in
//!   single quotes;
//! - otherwise, it is wrapped in double quotes, with `"`, `` ` ``, `$`, and
//!   `\` backslash-escaped.
//!
//! The following need quoting: `;`, `&`, `|`, `(`, `)`, `<`, `>`; whitespace;
//! `$`, `` ` ``, `\`, `"`, `'`; `=`, `*`, `?`; a leading `#` or `~`; a `{`
//! that precedes a `}`; and a `[` that precedes a `]`.
//!
//! This is what `printf %q` and the `${var@Q}` parameter transformation use.
//!
//! ```
//! # use std::borrow::Cow::{Borrowed, Owned};
//! # use rbash_quote::quote;
//! assert_eq!(quote("foo"), Borrowed("foo"));
//! assert_eq!(quote(""), Owned::<str>("''".to_owned()));
//! assert_eq!(quote("$foo"), Owned::<str>("'$foo'".to_owned()));
//! assert_eq!(quote("'$foo'"), Owned::<str>(r#""'\$foo'""#.to_owned()));
//! ```

use std::borrow::Cow::{self, Borrowed, Owned};

/// Quotes `s` so it re-parses to the same value.
///
/// Returns `Borrowed(s)` if no quoting is needed, `Owned` otherwise.
pub fn quote(s: &str) -> Cow<'_, str> {
    if !s.is_empty() && !str_needs_quoting(s) {
        return Borrowed(s);
    }

    if s.find('\'').is_none() {
        return Owned(format!("'{s}'"));
    }

    let mut result = String::with_capacity(s.len().saturating_add(8));
    result.push('"');
    for c in s.chars() {
        if matches!(c, '"' | '`' | '$' | '\\') {
            result.push('\\');
        }
        result.push(c);
    }
    result.push('"');
    Owned(result)
}

fn str_needs_quoting(s: &str) -> bool {
    if s.chars().any(char_needs_quoting) {
        return true;
    }

    if let Some(c) = s.chars().next() {
        if c == '#' || c == '~' {
            return true;
        }
    }

    if let Some(i) = s.find('{') {
        if s[i + 1..].find('}').is_some() {
            return true;
        }
    }

    if let Some(i) = s.find('[') {
        if s[i + 1..].find(']').is_some() {
            return true;
        }
    }

    false
}

fn char_needs_quoting(c: char) -> bool {
    match c {
        ';' | '&' | '|' | '(' | ')' | '<' | '>' | ' ' | '\t' | '\n' => true,
        '$' | '`' | '\\' | '"' | '\'' | '=' | '*' | '?' => true,
        _ => c.is_whitespace(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_quoting_needed() {
        for s in ["a", "z", "_", "!#%+,-./:@^~", "{", "{x", "}", "x}", "[", "[x", "]", "x]"] {
            assert_eq!(quote(s), Borrowed(s));
        }
    }

    #[test]
    fn single_quoted() {
        assert_eq!(quote(""), Owned::<str>("''".to_owned()));
        for c in ";&|()<> \t\n$`\\\"=*?#~".chars() {
            let s = c.to_string();
            assert_eq!(quote(&s), Owned::<str>(format!("'{s}'")));
        }
        assert_eq!(quote("{}"), Owned::<str>("'{}'".to_owned()));
        assert_eq!(quote("[a]"), Owned::<str>("'[a]'".to_owned()));
    }

    #[test]
    fn double_quoted() {
        assert_eq!(quote("'"), Owned::<str>(r#""'""#.to_owned()));
        assert_eq!(quote("'$"), Owned::<str>(r#""'\$""#.to_owned()));
        assert_eq!(quote("'foo'"), Owned::<str>(r#""'foo'""#.to_owned()));
    }
}
