//! The `((expression))` arithmetic command — not to be confused with
//! `$((expression))` arithmetic expansion, which lives in
//! [`crate::expansion::arith`] and is reused here.
//!
//! Grounded on bash's rule: the command's exit status is 0 if the
//! expression evaluates to a non-zero value, 1 otherwise (including when
//! the expression itself fails to parse), the inverse of the usual C
//! truth convention.

use super::done;
use crate::context::Context;
use rbash_env::semantics::{ExitStatus, Outcome, Result};
use rbash_env::session::{Env, StateDelta};
use rbash_syntax::source::Location;
use rbash_syntax::syntax::{Redir, Text};

pub fn execute(
    content: &Text,
    location: &Location,
    context: &Context,
    env: &mut Env,
) -> Result<Outcome> {
    execute_with_redirs(content, &[], location, context, env)
}

/// Same as [`execute`], taking the command's redirections too — kept
/// separate so `(( ))` without redirections (the common case, and the one
/// [`super::Execute`] dispatches to) doesn't pay for an empty-slice
/// install/restore pair it doesn't need.
pub fn execute_with_redirs(
    content: &Text,
    redirs: &[Redir],
    _location: &Location,
    context: &Context,
    env: &mut Env,
) -> Result<Outcome> {
    let (guard, _stdin) = match crate::redir::install(redirs, context, env) {
        Ok(pair) => pair,
        Err(err) => return done(super::report_error(&err, context, env)),
    };

    let mut delta = StateDelta::default();
    let rendered = crate::expansion::arith::expand(content, _location, context, env, &mut delta);
    delta.merge_into(env);

    guard.restore(env);

    let status = match rendered.parse::<i64>() {
        Ok(0) | Err(_) => ExitStatus::FAILURE,
        Ok(_) => ExitStatus::SUCCESS,
    };
    done(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{BuiltinRegistry, Context, NullParser, NullSpawner};
    use rbash_env::io::Collector;
    use rbash_syntax::syntax::TextUnit;
    use std::ops::ControlFlow;

    fn test_env() -> Env {
        let collector = Collector::new();
        Env::new(collector.sink(), collector.sink())
    }

    fn literal_text(s: &str) -> Text {
        Text(s.chars().map(TextUnit::Literal).collect())
    }

    #[test]
    fn a_nonzero_expression_succeeds() {
        let mut env = test_env();
        let builtins = BuiltinRegistry::new();
        let context = Context::new(&NullParser, &NullSpawner, &builtins, "rbash");
        let outcome = execute(&literal_text("1 + 1"), &Location::dummy(), &context, &mut env);
        assert_eq!(outcome, ControlFlow::Continue(Outcome::Done(ExitStatus::SUCCESS)));
    }

    #[test]
    fn a_zero_expression_fails() {
        let mut env = test_env();
        let builtins = BuiltinRegistry::new();
        let context = Context::new(&NullParser, &NullSpawner, &builtins, "rbash");
        let outcome = execute(&literal_text("3 - 3"), &Location::dummy(), &context, &mut env);
        assert_eq!(outcome, ControlFlow::Continue(Outcome::Done(ExitStatus::FAILURE)));
    }
}
