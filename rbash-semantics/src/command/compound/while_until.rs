//! `while condition; do body; done` and its `until` negation, per
//! `yash_semantics::command::while_command`: re-test `condition` before
//! every iteration, stop as soon as it stops matching the loop's sense.

use super::LoopSignal;
use crate::context::Context;
use crate::error::Error;
use rbash_env::semantics::{ExitStatus, Outcome, Result};
use rbash_env::session::Env;
use rbash_syntax::source::Location;
use rbash_syntax::syntax::List;
use std::ops::ControlFlow;

/// §4.7/§7's runaway-loop cap: a `while`/`until` that never stops on its
/// own (a condition with no side effect to eventually flip it) errors out
/// rather than spinning forever.
const ITERATION_LIMIT: u32 = 10_000;

pub fn execute(
    condition: &List,
    body: &List,
    until: bool,
    context: &Context,
    env: &mut Env,
) -> Result<Outcome> {
    let mut last = Outcome::Done(ExitStatus::SUCCESS);
    let mut iterations = 0u32;
    loop {
        let condition_outcome = match crate::command::with_errexit_suppressed(env, |env| {
            crate::command::list::run(condition, context, env)
        }) {
            ControlFlow::Continue(outcome) => outcome,
            ControlFlow::Break(divert) => return ControlFlow::Break(divert),
        };
        let succeeded = condition_outcome
            .exit_status()
            .map(|s| s.is_successful())
            .unwrap_or(true);
        if succeeded == until {
            break;
        }

        iterations += 1;
        if iterations > ITERATION_LIMIT {
            let err = Error::LoopLimitExceeded {
                location: Location::dummy(),
            };
            let status = crate::command::report_error(&err, context, env);
            return ControlFlow::Continue(Outcome::Done(status));
        }

        match super::loop_signal(crate::command::list::run(body, context, env)) {
            LoopSignal::Next(outcome) => last = outcome,
            LoopSignal::Stop(outcome) => {
                last = outcome;
                break;
            }
            LoopSignal::Propagate(cf) => return cf,
        }
    }
    ControlFlow::Continue(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{BuiltinRegistry, Context, NullParser, NullSpawner};
    use rbash_env::io::Collector;

    fn test_env() -> Env {
        let collector = Collector::new();
        Env::new(collector.sink(), collector.sink())
    }

    #[test]
    fn an_unbounded_while_loop_stops_at_the_iteration_cap() {
        let mut env = test_env();
        let builtins = BuiltinRegistry::new();
        let context = Context::new(&NullParser, &NullSpawner, &builtins, "rbash");
        let always_true = List(vec![rbash_syntax::syntax::Item {
            and_or: std::rc::Rc::new(rbash_syntax::syntax::AndOrList {
                first: rbash_syntax::syntax::Pipeline {
                    commands: vec![],
                    negation: false,
                },
                rest: vec![],
            }),
            async_flag: None,
        }]);
        let outcome = execute(&always_true, &List(vec![]), false, &context, &mut env);
        assert_eq!(
            outcome,
            ControlFlow::Continue(Outcome::Done(ExitStatus::ERROR))
        );
    }

    #[test]
    fn a_false_while_condition_never_runs_the_body() {
        let mut env = test_env();
        let builtins = BuiltinRegistry::new();
        let context = Context::new(&NullParser, &NullSpawner, &builtins, "rbash");
        let condition = List(vec![rbash_syntax::syntax::Item {
            and_or: std::rc::Rc::new(rbash_syntax::syntax::AndOrList {
                first: rbash_syntax::syntax::Pipeline {
                    commands: vec![],
                    negation: true,
                },
                rest: vec![],
            }),
            async_flag: None,
        }]);
        let outcome = execute(&condition, &List(vec![]), false, &context, &mut env);
        assert_eq!(outcome, ControlFlow::Continue(Outcome::Done(ExitStatus::SUCCESS)));
    }
}
