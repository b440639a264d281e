//! Executes one [`Item`] of a [`List`] — an [`AndOrList`] together with its
//! optional trailing `&`.
//!
//! A real `&` hands the pipeline to a forked child and returns to the
//! script immediately while it runs concurrently; that requires exactly
//! the external-process collaborator §1 puts out of scope. What this
//! module offers instead: the and-or list still runs to completion (there
//! is nothing else to run it *on*), but its result is recorded as a
//! [`rbash_env::job::Job`] rather than surfacing as the item's own exit
//! status, and the item reports [`Outcome::Background`] — so `$!`, `$?`,
//! and the `jobs`/`wait` builtins built on top of [`rbash_env::job::JobSet`]
//! observe the same bookkeeping a true background job would have left
//! behind, just without the overlap in time a real fork would have given.
//! The job's `pid` is `0`, a sentinel for "no real process backs this
//! entry", since nothing in this workspace allocates one.

use super::and_or;
use crate::context::Context;
use rbash_env::job::{Job, JobStatus};
use rbash_env::semantics::{ExitStatus, Outcome, Result};
use rbash_env::session::Env;
use rbash_syntax::syntax::Item;
use std::ops::ControlFlow;

pub fn execute(item: &Item, context: &Context, env: &mut Env) -> Result<Outcome> {
    if item.async_flag.is_none() {
        return and_or::execute(&item.and_or, context, env);
    }

    let name = "background job".to_owned();
    match and_or::execute(&item.and_or, context, env) {
        ControlFlow::Continue(outcome) => {
            let status = outcome.exit_status().unwrap_or(ExitStatus::SUCCESS);
            let mut job = Job::new(0, name);
            job.status = JobStatus::Exited(status.0);
            let id = env.jobs.push(job);
            env.current_job = Some(id);
            ControlFlow::Continue(Outcome::Background(id))
        }
        ControlFlow::Break(divert) => ControlFlow::Break(divert),
    }
}
