//! `coproc [name] command` — runs `command` asynchronously with its stdin
//! and stdout wired to a pair of pipes exposed as `name[0]`/`name[1]`
//! (`COPROC` if unnamed), plus a `name_PID` variable.
//!
//! A real coprocess forks, wires two OS pipes to the child's stdin/stdout,
//! and leaves the parent shell free to read/write them while the child
//! runs concurrently — again the external-process collaborator §1 puts
//! out of scope (see [`crate::command::item`]'s identical problem with
//! plain `&` backgrounding, and [`crate::command::pipeline`]'s with
//! inter-stage streaming). Without it, this module runs the body the same
//! way [`crate::command::compound::subshell`] does — to completion,
//! against a throwaway clone of `env` so its variable changes don't leak
//! out — and records a [`rbash_env::job::Job`] with the same `pid: 0`
//! sentinel `item.rs` uses. `name[0]`/`name[1]` are set to `-1` (no real
//! descriptor backs them, matching `man bash`'s own description of what
//! happens if the pipe can't be created) rather than left unset, so
//! scripts that merely check `COPROC_PID`/`COPROC` are set see the shape
//! bash's documentation promises, even though reading or writing through
//! them would find nothing live on the other end.

use crate::context::Context;
use rbash_env::job::{Job, JobStatus};
use rbash_env::semantics::{ExitStatus, Outcome, Result};
use rbash_env::session::Env;
use rbash_env::variable::{Value, Variable};
use rbash_syntax::syntax::Coproc;
use std::ops::ControlFlow;

pub fn execute(coproc: &Coproc, context: &Context, env: &mut Env) -> Result<Outcome> {
    let name = coproc.name.clone().unwrap_or_else(|| "COPROC".to_owned());

    let mut sub_env = env.clone();
    let status = match super::compound::execute(&coproc.body, context, &mut sub_env) {
        ControlFlow::Continue(outcome) => outcome.exit_status().unwrap_or(ExitStatus::SUCCESS),
        ControlFlow::Break(divert) => return ControlFlow::Break(divert),
    };

    let mut job = Job::new(0, format!("coproc {name}"));
    job.status = JobStatus::Exited(status.0);
    let id = env.jobs.push(job);
    env.current_job = Some(id);

    let fds = env
        .variables
        .entry(name.clone())
        .or_insert_with(Variable::unset);
    let _ = fds.assign(&name, Value::array(["-1", "-1"]), None);

    let pid_name = format!("{name}_PID");
    let pid_var = env
        .variables
        .entry(pid_name.clone())
        .or_insert_with(Variable::unset);
    let _ = pid_var.assign(&pid_name, Value::scalar("0"), None);

    ControlFlow::Continue(Outcome::Background(id))
}
