//! Source locations attached to AST nodes.
//!
//! The lexer and parser that turn shell source text into a [`syntax`](crate::syntax)
//! tree are out of scope for this crate: callers hand the evaluator an
//! already-parsed tree, whether produced by a real parser or built by hand (as
//! the tests in this workspace do). [`Location`] is kept deliberately thin —
//! just enough for diagnostics to point somewhere — rather than carrying a
//! full source-file/include-chain model.

use std::fmt;

/// Position of a syntactic construct in the original source text.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Location {
    /// 1-based line number, or `0` if unknown.
    pub line: u32,
    /// 1-based column number, or `0` if unknown.
    pub column: u32,
    /// Name of the source, e.g. a script path or `"-c"`. Empty if unknown.
    pub source_name: String,
}

impl Location {
    /// A location with no known source position, used by hand-built ASTs and
    /// in tests.
    pub fn dummy() -> Self {
        Location::default()
    }

    pub fn new(source_name: impl Into<String>, line: u32, column: u32) -> Self {
        Location {
            line,
            column,
            source_name: source_name.into(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 {
            return write!(f, "<unknown>");
        }
        if self.source_name.is_empty() {
            write!(f, "line {}, column {}", self.line, self.column)
        } else {
            write!(f, "{}:{}:{}", self.source_name, self.line, self.column)
        }
    }
}
