//! Compound commands: the control-flow and grouping forms that take other
//! commands as a body — `{ }`, `( )`, `if`, `case`, `for`, `((;;))`,
//! `while`/`until`.
//!
//! Grounded on `yash_semantics::command::compound_command`'s one entry
//! point dispatching by [`CompoundCommand`] variant, with the command's
//! own redirections installed around the whole thing exactly like a
//! simple command's (§4.6).

pub mod c_style_for;
pub mod case;
pub mod for_in;
pub mod grouping;
pub mod if_command;
pub mod subshell;
pub mod while_until;

use crate::context::Context;
use rbash_env::semantics::{Divert, ExitStatus, Outcome, Result};
use rbash_env::session::Env;
use rbash_syntax::syntax::{CompoundCommand, FullCompoundCommand};
use std::ops::ControlFlow;

pub fn execute(full: &FullCompoundCommand, context: &Context, env: &mut Env) -> Result<Outcome> {
    let (guard, _stdin) = match crate::redir::install(&full.redirs, context, env) {
        Ok(pair) => pair,
        Err(err) => return super::done(super::report_error(&err, context, env)),
    };

    let outcome = match &full.command {
        CompoundCommand::Grouping(list) => grouping::execute(list, context, env),
        CompoundCommand::Subshell { body, .. } => subshell::execute(body, context, env),
        CompoundCommand::For { name, values, body } => {
            for_in::execute(name, values.as_deref(), body, context, env)
        }
        CompoundCommand::CStyleFor {
            init,
            condition,
            update,
            body,
            location,
        } => c_style_for::execute(init, condition, update, body, location, context, env),
        CompoundCommand::While { condition, body } => {
            while_until::execute(condition, body, false, context, env)
        }
        CompoundCommand::Until { condition, body } => {
            while_until::execute(condition, body, true, context, env)
        }
        CompoundCommand::If {
            condition,
            body,
            elifs,
            r#else,
        } => if_command::execute(condition, body, elifs, r#else.as_ref(), context, env),
        CompoundCommand::Case { subject, items } => case::execute(subject, items, context, env),
    };

    guard.restore(env);
    outcome
}

/// What running a loop body once means for the loop driving it: move on to
/// the next iteration with this outcome recorded as `$?`, stop the loop
/// (also recording an outcome), or bubble a divert further up (an outer
/// loop's `break 2`, a function's `return`, or `exit`) untouched.
enum LoopSignal {
    Next(Outcome),
    Stop(Outcome),
    Propagate(ControlFlow<Divert, Outcome>),
}

/// Interprets one loop-body iteration's result per §4.7's `break`/`continue`
/// level-counting rule: level `0` terminates (or restarts) *this* loop;
/// any other level decrements and keeps propagating outward.
fn loop_signal(result: Result<Outcome>) -> LoopSignal {
    match result {
        ControlFlow::Continue(outcome) => LoopSignal::Next(outcome),
        ControlFlow::Break(Divert::Break { count: 0 }) => {
            LoopSignal::Stop(Outcome::Done(ExitStatus::SUCCESS))
        }
        ControlFlow::Break(Divert::Break { count }) => {
            LoopSignal::Propagate(ControlFlow::Break(Divert::Break { count: count - 1 }))
        }
        ControlFlow::Break(Divert::Continue { count: 0 }) => {
            LoopSignal::Next(Outcome::Done(ExitStatus::SUCCESS))
        }
        ControlFlow::Break(Divert::Continue { count }) => {
            LoopSignal::Propagate(ControlFlow::Break(Divert::Continue { count: count - 1 }))
        }
        ControlFlow::Break(divert) => LoopSignal::Propagate(ControlFlow::Break(divert)),
    }
}
