//! Arithmetic expansion for the shell interpreter.
//!
//! This crate evaluates the integer expressions found in `$((...))`
//! arithmetic expansion and `((...))` arithmetic commands. It knows nothing
//! about shell variables directly; callers provide an [`Env`] that reads and
//! writes named values, so the same evaluator can run standalone (see the
//! tests, which use a bare `HashMap`) or against a full session.
//!
//! ```
//! use std::collections::HashMap;
//! let mut vars = HashMap::new();
//! vars.insert("x".to_owned(), "3".to_owned());
//! assert_eq!(rbash_arith::eval("x + 2", &mut vars).unwrap(), 5);
//! ```

mod ast;
mod env;
mod eval;
mod parser;
mod token;

pub use env::Env;
use std::fmt;
use std::ops::Range;
use thiserror::Error;

/// Cause of an arithmetic evaluation error.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ErrorCause<E> {
    #[error("{0}")]
    Token(token::TokenError),
    #[error("{0}")]
    Parse(parser::ParseError),
    #[error("division by zero")]
    DivisionByZero,
    #[error("exponent less than zero")]
    NegativeExponent,
    #[error(transparent)]
    Assign(E),
}

/// An error produced while evaluating an arithmetic expression, together with
/// the byte range in the source it occurred at, when known.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("{cause}")]
pub struct Error<E> {
    pub cause: ErrorCause<E>,
    pub location: Option<Range<usize>>,
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for Error<E> {}

fn convert_eval_cause<E>(cause: eval::Cause<E>) -> ErrorCause<E> {
    match cause {
        eval::Cause::DivisionByZero => ErrorCause::DivisionByZero,
        eval::Cause::NegativeExponent => ErrorCause::NegativeExponent,
        eval::Cause::Assign(e) => ErrorCause::Assign(e),
    }
}

/// Tokenizes, parses, and evaluates `expression`, threading any variable
/// assignments through `env` as they occur, left to right.
pub fn eval<E: Env>(expression: &str, env: &mut E) -> Result<i64, Error<E::AssignError>> {
    let tokens = token::tokenize(expression).map_err(|e| Error {
        cause: ErrorCause::Token(e.cause),
        location: Some(e.location),
    })?;
    let ast = parser::parse(&tokens).map_err(|e| Error {
        cause: ErrorCause::Parse(e.cause),
        location: Some(e.location),
    })?;
    eval::eval(&ast, env).map_err(|cause| Error {
        cause: convert_eval_cause(cause),
        location: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn evaluates_simple_expression() {
        let mut env = HashMap::new();
        assert_eq!(eval("2 + 3 * 4", &mut env).unwrap(), 14);
    }

    #[test]
    fn assignment_persists_in_env() {
        let mut env = HashMap::new();
        eval("x = 10", &mut env).unwrap();
        assert_eq!(env.get("x").unwrap(), "10");
    }

    #[test]
    fn division_by_zero_reports_cause() {
        let mut env = HashMap::new();
        let err = eval("1 / 0", &mut env).unwrap_err();
        assert_eq!(err.cause, ErrorCause::DivisionByZero);
    }
}
