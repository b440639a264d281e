//! `( list )` — runs `list` in "a forked-off copy of the shell state"
//! ([`rbash_syntax::syntax::CompoundCommand::Subshell`]'s own wording).
//!
//! A real subshell forks: the child's variable/function/option/directory
//! changes never reach the parent, but both share the same terminal and
//! inherited file descriptors, so anything the child writes is still
//! visible. Without a fork, this crate approximates the same contract by
//! running the body against a full clone of `env` — sharing the same
//! stdout/stderr sinks (cloning an `Rc<Sink>` still points at the same
//! writer) so output interleaves correctly, while every other field
//! (variables, functions, options, working directory, ...) is free to
//! diverge in the clone without ever being merged back.

use crate::context::Context;
use rbash_env::semantics::{Divert, ExitStatus, Outcome, Result};
use rbash_env::session::Env;
use rbash_syntax::syntax::List;
use std::ops::ControlFlow;

pub fn execute(body: &List, context: &Context, env: &mut Env) -> Result<Outcome> {
    let mut sub_env = env.clone();
    // A subshell starts with its own alias and command-hash tables rather
    // than inheriting the parent's; both are discarded along with
    // everything else in `sub_env` once the body finishes.
    sub_env.aliases.clear();
    sub_env.hash.clear();
    match crate::command::list::run(body, context, &mut sub_env) {
        ControlFlow::Continue(outcome) => ControlFlow::Continue(outcome),
        // `exit`/the fatal-error abort inside `( )` only ends the
        // subshell process in real bash, not the script that spawned it.
        ControlFlow::Break(Divert::Exit(status)) | ControlFlow::Break(Divert::Abort(status)) => {
            super::super::done(status.unwrap_or(ExitStatus::SUCCESS))
        }
        ControlFlow::Break(divert) => ControlFlow::Break(divert),
    }
}
