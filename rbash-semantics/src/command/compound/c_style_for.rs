//! `for (( init; condition; update )); do body; done`.
//!
//! Grounded on [`rbash_syntax::syntax::CompoundCommand::CStyleFor`]'s own
//! doc comment: each clause is raw arithmetic source, re-evaluated on
//! every pass (so `update` sees what `body` changed), with an empty
//! `condition` meaning "always true" as in bash's `((;;))`. Reuses
//! [`crate::expansion::arith::ArithAdapter`], the same bridge `$((...))`
//! expansion and the `((...))` command use.

use super::LoopSignal;
use crate::context::Context;
use crate::expansion::arith::ArithAdapter;
use rbash_env::semantics::{ExitStatus, Outcome, Result};
use rbash_env::session::{Env, StateDelta};
use rbash_syntax::source::Location;
use rbash_syntax::syntax::List;
use std::ops::ControlFlow;

pub fn execute(
    init: &str,
    condition: &str,
    update: &str,
    body: &List,
    _location: &Location,
    context: &Context,
    env: &mut Env,
) -> Result<Outcome> {
    eval(init, env);

    let mut last = Outcome::Done(ExitStatus::SUCCESS);
    loop {
        if !condition.trim().is_empty() && eval(condition, env) == 0 {
            break;
        }

        match super::loop_signal(crate::command::list::run(body, context, env)) {
            LoopSignal::Next(outcome) => last = outcome,
            LoopSignal::Stop(outcome) => {
                last = outcome;
                break;
            }
            LoopSignal::Propagate(cf) => return cf,
        }

        eval(update, env);
    }
    ControlFlow::Continue(last)
}

/// Evaluates `expression` against `env`, treating any parse/evaluation
/// failure as `0` — an empty clause (`for ((;;))`) reaches here too, and
/// is handled by the caller before ever calling this for `condition`.
fn eval(expression: &str, env: &mut Env) -> i64 {
    if expression.trim().is_empty() {
        return 0;
    }
    let mut delta = StateDelta::default();
    let mut adapter = ArithAdapter { env: &mut *env, delta: &mut delta };
    let result = rbash_arith::eval(expression, &mut adapter).unwrap_or(0);
    delta.merge_into(env);
    result
}
