//! The one error type every fallible evaluation operation returns.
//!
//! Grounded on `yash_semantics`'s convention of a single workspace-wide error
//! enum rather than one per module, since shell diagnostics are rendered
//! uniformly (a single stderr line, per §7) regardless of which stage raised
//! them.

use rbash_syntax::source::Location;
use thiserror::Error;

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    #[error("{location}: syntax error: {message}")]
    Syntax { message: String, location: Location },

    #[error("{name}: unbound variable")]
    Expansion { name: String, location: Location },

    #[error("{name}: {message}")]
    BadSubstitution {
        name: String,
        message: String,
        location: Location,
    },

    #[error("{expression}: {message}")]
    Arithmetic {
        expression: String,
        message: String,
        location: Location,
    },

    #[error("{target}: {message}")]
    Redirect {
        target: String,
        message: String,
        location: Location,
    },

    #[error("{name}: command not found")]
    NotFound { name: String, location: Location },

    #[error("{name}: not executable")]
    NotExecutable { name: String, location: Location },

    #[error("{name}: readonly variable")]
    ReadOnly { name: String, location: Location },

    #[error("{name}: invalid nameref target")]
    BadNameref { name: String, location: Location },

    #[error("loop iteration limit exceeded")]
    LoopLimitExceeded { location: Location },

    #[error("{pattern}: {message}")]
    Regex {
        pattern: String,
        message: String,
        location: Location,
    },

    #[error("{pattern}: {message}")]
    Substitution {
        pattern: String,
        message: String,
        location: Location,
    },
}

impl Error {
    pub fn location(&self) -> &Location {
        match self {
            Error::Syntax { location, .. }
            | Error::Expansion { location, .. }
            | Error::BadSubstitution { location, .. }
            | Error::Arithmetic { location, .. }
            | Error::Redirect { location, .. }
            | Error::NotFound { location, .. }
            | Error::NotExecutable { location, .. }
            | Error::ReadOnly { location, .. }
            | Error::BadNameref { location, .. }
            | Error::LoopLimitExceeded { location }
            | Error::Regex { location, .. }
            | Error::Substitution { location, .. } => location,
        }
    }

    /// The single stderr line §7 says every diagnostic renders as, prefixed
    /// with the short program label bash itself uses.
    pub fn diagnostic(&self, program_name: &str) -> String {
        format!("{program_name}: {self}\n")
    }
}

pub type Result<T> = std::result::Result<T, Error>;
