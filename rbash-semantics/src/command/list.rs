//! Executes a [`List`], the `;`/`&`-separated sequence of [`Item`]s that
//! makes up a script, a compound command's body, or a command
//! substitution's content.
//!
//! Grounded on `yash_semantics::List`'s `run` (which the teacher-level
//! docs describe as looping over items, running each in turn and
//! forwarding divergence); this crate's version is the entry point
//! [`crate::expansion::command_subst`] and [`crate::expansion::process_subst`]
//! already call via `crate::command::list::run`.

use super::item;
use crate::context::Context;
use rbash_env::semantics::{ExitStatus, Outcome, Result};
use rbash_env::session::Env;
use rbash_syntax::syntax::List;
use std::ops::ControlFlow;

/// Runs every item in `list` in order, returning the last one's outcome.
/// An empty list succeeds trivially, matching the teacher's convention
/// that an empty command list is success rather than an error.
pub fn run(list: &List, context: &Context, env: &mut Env) -> Result<Outcome> {
    let mut last = Outcome::Done(ExitStatus::SUCCESS);
    for it in &list.0 {
        match item::execute(it, context, env) {
            ControlFlow::Continue(outcome) => last = outcome,
            ControlFlow::Break(divert) => return ControlFlow::Break(divert),
        }
    }
    ControlFlow::Continue(last)
}
