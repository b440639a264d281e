//! `if condition; then body; elif ...; else ...; fi`.
//!
//! Grounded on `yash_semantics::command::if_command`'s linear scan: try
//! the `if` condition, then each `elif` in turn, running the first body
//! whose condition succeeds; fall back to `else`, or plain success if
//! there is none and every condition failed.

use crate::context::Context;
use rbash_env::semantics::{ExitStatus, Outcome, Result};
use rbash_env::session::Env;
use rbash_syntax::syntax::{ElifThen, List};
use std::ops::ControlFlow;

pub fn execute(
    condition: &List,
    body: &List,
    elifs: &[ElifThen],
    r#else: Option<&List>,
    context: &Context,
    env: &mut Env,
) -> Result<Outcome> {
    match succeeds(condition, context, env) {
        ControlFlow::Continue(true) => return crate::command::list::run(body, context, env),
        ControlFlow::Continue(false) => {}
        ControlFlow::Break(divert) => return ControlFlow::Break(divert),
    }
    for elif in elifs {
        match succeeds(&elif.condition, context, env) {
            ControlFlow::Continue(true) => return crate::command::list::run(&elif.body, context, env),
            ControlFlow::Continue(false) => {}
            ControlFlow::Break(divert) => return ControlFlow::Break(divert),
        }
    }
    match r#else {
        Some(body) => crate::command::list::run(body, context, env),
        None => ControlFlow::Continue(Outcome::Done(ExitStatus::SUCCESS)),
    }
}

/// Runs `condition`, propagating any divert, and reports whether it
/// succeeded (exit status 0).
fn succeeds(
    condition: &List,
    context: &Context,
    env: &mut Env,
) -> std::ops::ControlFlow<rbash_env::semantics::Divert, bool> {
    match crate::command::with_errexit_suppressed(env, |env| {
        crate::command::list::run(condition, context, env)
    }) {
        ControlFlow::Continue(outcome) => ControlFlow::Continue(
            outcome.exit_status().map(|s| s.is_successful()).unwrap_or(true),
        ),
        ControlFlow::Break(divert) => ControlFlow::Break(divert),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{BuiltinRegistry, Context, NullParser, NullSpawner};
    use rbash_env::io::Collector;
    use rbash_syntax::syntax::List;

    fn test_env() -> Env {
        let collector = Collector::new();
        Env::new(collector.sink(), collector.sink())
    }

    #[test]
    fn an_empty_condition_is_treated_as_success() {
        let mut env = test_env();
        let builtins = BuiltinRegistry::new();
        let context = Context::new(&NullParser, &NullSpawner, &builtins, "rbash");
        let outcome = execute(&List(vec![]), &List(vec![]), &[], None, &context, &mut env);
        assert_eq!(outcome, ControlFlow::Continue(Outcome::Done(ExitStatus::SUCCESS)));
    }
}
