//! Command execution: one `execute`-shaped entry point per AST node kind,
//! dispatched from [`Command`] down through pipelines, and-or lists, and
//! the individual command forms.
//!
//! Grounded on `yash_semantics::command::Command`'s trait-and-dispatch
//! shape (`pub trait Command { async fn execute(&self, env: &mut Env) ->
//! Result; }`), narrowed to synchronous execution: nothing in this
//! workspace drives an async executor (`rbash-executor`'s reactor model is
//! out of scope per §1's external-process boundary, since the only thing
//! worth awaiting — a spawned child or a concurrent job — is exactly the
//! collaborator this crate does not implement), so `execute` returns
//! directly rather than yielding a future.
//!
//! `rbash_syntax::syntax::Command` has more variants than the teacher's
//! (`Test`, `ExtendedTest`, `Arith`, `Coproc` alongside `Simple`/`Compound`/
//! `Function`), all dispatched from the same `impl Execute for
//! syntax::Command` below.

pub mod and_or;
pub mod arith_command;
pub mod compound;
pub mod coproc;
pub mod function_definition;
pub mod item;
pub mod list;
pub mod pipeline;
pub mod simple;

use crate::context::Context;
use crate::error::Error;
use rbash_env::semantics::{ExitStatus, Outcome, Result};
use rbash_env::session::Env;
use rbash_syntax::syntax;
use std::ops::ControlFlow;

/// One command-shaped AST node that can be run against a session.
pub trait Execute {
    fn execute(&self, context: &Context, env: &mut Env) -> Result<Outcome>;
}

impl Execute for syntax::Command {
    fn execute(&self, context: &Context, env: &mut Env) -> Result<Outcome> {
        match self {
            syntax::Command::Simple(simple) => simple::execute(simple, context, env),
            syntax::Command::Compound(full) => compound::execute(full, context, env),
            syntax::Command::Function(def) => function_definition::define(def, context, env),
            syntax::Command::Test(test) => crate::test_engine::posix_test::execute(test, env),
            syntax::Command::ExtendedTest {
                condition, location, ..
            } => crate::test_engine::extended_test::execute(condition, location, context, env),
            syntax::Command::Arith {
                content,
                redirs,
                location,
            } => arith_command::execute_with_redirs(content, redirs, location, context, env),
            syntax::Command::Coproc(body) => coproc::execute(body, context, env),
        }
    }
}

/// Renders `err` to stderr the way every other diagnostic in this crate
/// is rendered (§7's single stderr line) and turns it into the exit status
/// an evaluator function can hand back up, rather than aborting execution
/// — a shell keeps running after `cmd: command not found`, it just gets a
/// non-zero `$?`.
pub(crate) fn report_error(err: &Error, context: &Context, env: &Env) -> ExitStatus {
    env.write(
        rbash_env::io::StreamTag::Stderr,
        err.diagnostic(context.program_name).as_bytes(),
    );
    match err {
        Error::NotFound { .. } => ExitStatus::NOT_FOUND,
        Error::NotExecutable { .. } => ExitStatus::NOEXEC,
        _ => ExitStatus::ERROR,
    }
}

/// Shorthand for the common case of an evaluator function that only ever
/// completes or diverts, never backgrounds — used by every command form
/// except a pipeline's trailing `&`.
pub(crate) fn done(status: ExitStatus) -> Result<Outcome> {
    ControlFlow::Continue(Outcome::Done(status))
}

/// Runs `f` with `errexit` temporarily off, restoring it afterward —
/// §7's "outside of conditional contexts" exemption for `if`/`while`/
/// `until` condition evaluation, applied by toggling the option itself
/// rather than threading a context flag through `list::run`.
pub(crate) fn with_errexit_suppressed<R>(env: &mut Env, f: impl FnOnce(&mut Env) -> R) -> R {
    use rbash_env::option::Option as ShellOption;
    let was_set = env.options.contains(ShellOption::ErrExit);
    env.options.remove(ShellOption::ErrExit);
    let result = f(env);
    if was_set {
        env.options.insert(ShellOption::ErrExit);
    }
    result
}
