//! Executes a [`Pipeline`]: one or more commands conceptually connected
//! stdout-to-stdin, optionally negated with a leading `!`.
//!
//! A real pipeline forks one child per stage and wires an OS pipe between
//! each adjacent pair, so every stage runs concurrently and a stage's
//! stdin is literally the previous stage's stdout. That needs the
//! external-process collaborator §1 puts out of scope (see
//! [`crate::context::Spawner`]); without it there is no generic way to
//! feed one in-process command's output into another's input, since
//! [`rbash_env::io::Sink`] only models writing, not reading. This crate
//! instead runs every stage in turn, to completion, against the same
//! session — a pipeline of one builtin still behaves correctly, and a
//! pipeline of several still produces a single final exit status (via
//! `pipefail` or the last stage, per §4.5's pipeline rules), it just
//! cannot stream bytes between stages.

use super::Execute;
use crate::context::Context;
use rbash_env::option::Option as ShellOption;
use rbash_env::semantics::{ExitStatus, Outcome, Result};
use rbash_env::session::Env;
use rbash_env::variable::{Value, Variable};
use rbash_syntax::syntax::Pipeline;
use std::ops::ControlFlow;

pub fn execute(pipeline: &Pipeline, context: &Context, env: &mut Env) -> Result<Outcome> {
    let mut last = Outcome::Done(ExitStatus::SUCCESS);
    let mut rightmost_failure: Option<ExitStatus> = None;
    let mut pipestatus = Vec::with_capacity(pipeline.commands.len());

    for command in &pipeline.commands {
        last = match command.execute(context, env) {
            ControlFlow::Continue(outcome) => outcome,
            ControlFlow::Break(divert) => return ControlFlow::Break(divert),
        };
        let status = last.exit_status().unwrap_or(ExitStatus::SUCCESS);
        pipestatus.push(status.0.to_string());
        if !status.is_successful() {
            rightmost_failure = Some(status);
        }
    }

    set_pipestatus(&pipestatus, env);

    let pipefail = env.options.contains(ShellOption::PipeFail);
    let status = if pipefail {
        rightmost_failure.unwrap_or(ExitStatus::SUCCESS)
    } else {
        last.exit_status().unwrap_or(ExitStatus::SUCCESS)
    };

    let status = if pipeline.negation {
        if status.is_successful() {
            ExitStatus::FAILURE
        } else {
            ExitStatus::SUCCESS
        }
    } else {
        status
    };

    ControlFlow::Continue(match last {
        Outcome::Background(id) if !pipeline.negation => Outcome::Background(id),
        _ => Outcome::Done(status),
    })
}

/// Records each stage's exit code, by index, into `PIPESTATUS` — bash's
/// indexed array of per-stage exit codes, read after the pipeline runs
/// (`${PIPESTATUS[0]}`, ...).
fn set_pipestatus(stages: &[String], env: &mut Env) {
    let var = env
        .variables
        .entry("PIPESTATUS".to_owned())
        .or_insert_with(Variable::unset);
    let _ = var.assign("PIPESTATUS", Value::array(stages.iter().cloned()), None);
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
    fn an_empty_pipeline_succeeds() {
        let mut env = test_env();
        let builtins = BuiltinRegistry::new();
        let context = Context::new(&NullParser, &NullSpawner, &builtins, "rbash");
        let pipeline = Pipeline {
            commands: vec![],
            negation: false,
        };
        let outcome = execute(&pipeline, &context, &mut env);
        assert_eq!(outcome, ControlFlow::Continue(Outcome::Done(ExitStatus::SUCCESS)));
    }

    #[test]
    fn negation_inverts_a_successful_empty_pipeline() {
        let mut env = test_env();
        let builtins = BuiltinRegistry::new();
        let context = Context::new(&NullParser, &NullSpawner, &builtins, "rbash");
        let pipeline = Pipeline {
            commands: vec![],
            negation: true,
        };
        let outcome = execute(&pipeline, &context, &mut env);
        assert_eq!(outcome, ControlFlow::Continue(Outcome::Done(ExitStatus::FAILURE)));
    }

    #[test]
    fn pipestatus_records_one_exit_code_per_stage() {
        use rbash_syntax::syntax::{Command, SimpleCommand, Word};
        use std::rc::Rc;

        let mut env = test_env();
        let builtins = BuiltinRegistry::new();
        let context = Context::new(&NullParser, &NullSpawner, &builtins, "rbash");
        let pipeline = Pipeline {
            commands: vec![
                Rc::new(Command::Simple(SimpleCommand {
                    assigns: vec![],
                    words: vec![],
                    redirs: Rc::new(vec![]),
                })),
                Rc::new(Command::Simple(SimpleCommand {
                    assigns: vec![],
                    words: vec![(
                        Word::from_literal("no-such-command"),
                        rbash_syntax::syntax::ExpansionMode::Multiple,
                    )],
                    redirs: Rc::new(vec![]),
                })),
            ],
            negation: false,
        };
        execute(&pipeline, &context, &mut env);
        assert_eq!(
            env.get_variable("PIPESTATUS").unwrap().value(),
            Some(&Value::array(["0", "127"]))
        );
    }
}
