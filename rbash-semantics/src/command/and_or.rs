//! Executes an [`AndOrList`]: a first [`Pipeline`] followed by more,
//! each gated by `&&` (run only if the previous exit status was zero) or
//! `||` (run only if it was non-zero).
//!
//! Grounded on `yash_semantics::command::and_or`'s short-circuit loop,
//! carrying each pipeline's exit status forward into the next gate's
//! decision and stopping early on a [`Divert`].

use super::pipeline;
use crate::context::Context;
use rbash_env::semantics::{Divert, ExitStatus, Outcome, Result};
use rbash_env::session::Env;
use rbash_syntax::syntax::{AndOr, AndOrList};
use std::ops::ControlFlow;

pub fn execute(and_or: &AndOrList, context: &Context, env: &mut Env) -> Result<Outcome> {
    let mut outcome = match pipeline::execute(&and_or.first, context, env) {
        ControlFlow::Continue(outcome) => outcome,
        ControlFlow::Break(divert) => return ControlFlow::Break(divert),
    };
    let mut status = outcome.exit_status().unwrap_or(ExitStatus::SUCCESS);
    let mut final_ran = and_or.rest.is_empty();
    let last_index = and_or.rest.len().checked_sub(1);

    for (index, (gate, next)) in and_or.rest.iter().enumerate() {
        let should_run = match gate {
            AndOr::AndThen => status.is_successful(),
            AndOr::OrElse => !status.is_successful(),
        };
        if !should_run {
            final_ran = false;
            continue;
        }
        outcome = match pipeline::execute(next, context, env) {
            ControlFlow::Continue(outcome) => outcome,
            ControlFlow::Break(divert) => return ControlFlow::Break(divert),
        };
        status = outcome.exit_status().unwrap_or(status);
        final_ran = last_index == Some(index);
    }

    if final_ran {
        if let Some(divert) = errexit_applies(status, env) {
            return ControlFlow::Break(divert);
        }
    }

    ControlFlow::Continue(outcome)
}

/// §7's errexit rule, checked once per and/or list rather than per
/// pipeline: bash only reacts to the pipeline following the final
/// `&&`/`||` (or the sole pipeline, if there is no `&&`/`||`), and only
/// if that pipeline actually ran — every other position in the chain is
/// a left-hand side `&&`/`||` test, exempt regardless of its exit code.
fn errexit_applies(status: ExitStatus, env: &Env) -> Option<Divert> {
    if status.is_successful() || !env.options.contains(rbash_env::option::Option::ErrExit) {
        return None;
    }
    Some(Divert::Exit(Some(status)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{BuiltinRegistry, Context, NullParser, NullSpawner};
    use rbash_env::io::Collector;
    use rbash_syntax::syntax::{Command, Pipeline, SimpleCommand, Word};
    use std::rc::Rc;

    fn test_env() -> Env {
        let collector = Collector::new();
        Env::new(collector.sink(), collector.sink())
    }

    fn pipeline_of(words: &[&str]) -> Pipeline {
        Pipeline {
            commands: vec![Rc::new(Command::Simple(SimpleCommand {
                assigns: vec![],
                words: words
                    .iter()
                    .map(|w| (Word::from_literal(*w), rbash_syntax::syntax::ExpansionMode::Multiple))
                    .collect(),
                redirs: Rc::new(vec![]),
            }))],
            negation: false,
        }
    }

    #[test]
    fn or_else_skips_when_the_first_pipeline_succeeds() {
        let mut env = test_env();
        let builtins = BuiltinRegistry::new();
        let context = Context::new(&NullParser, &NullSpawner, &builtins, "rbash");
        let and_or = AndOrList {
            first: Pipeline {
                commands: vec![],
                negation: false,
            },
            rest: vec![(AndOr::OrElse, pipeline_of(&["unused"]))],
        };
        let outcome = execute(&and_or, &context, &mut env);
        assert_eq!(outcome, ControlFlow::Continue(Outcome::Done(ExitStatus::SUCCESS)));
    }

    #[test]
    fn errexit_converts_a_failing_standalone_pipeline_to_exit() {
        let mut env = test_env();
        env.options.insert(rbash_env::option::Option::ErrExit);
        let builtins = BuiltinRegistry::new();
        let context = Context::new(&NullParser, &NullSpawner, &builtins, "rbash");
        let and_or = AndOrList {
            first: pipeline_of(&["no-such-command"]),
            rest: vec![],
        };
        let outcome = execute(&and_or, &context, &mut env);
        assert_eq!(
            outcome,
            ControlFlow::Break(rbash_env::semantics::Divert::Exit(Some(ExitStatus::NOT_FOUND)))
        );
    }

    #[test]
    fn errexit_does_not_fire_for_an_and_then_left_hand_side() {
        let mut env = test_env();
        env.options.insert(rbash_env::option::Option::ErrExit);
        let builtins = BuiltinRegistry::new();
        let context = Context::new(&NullParser, &NullSpawner, &builtins, "rbash");
        let and_or = AndOrList {
            first: pipeline_of(&["no-such-command"]),
            rest: vec![(AndOr::AndThen, pipeline_of(&["also-unused"]))],
        };
        let outcome = execute(&and_or, &context, &mut env);
        assert_eq!(
            outcome,
            ControlFlow::Continue(Outcome::Done(ExitStatus::NOT_FOUND))
        );
    }
}
