//! Simple-command executor: §4.5's ten-step sequence, the one place a
//! name and argument list actually turns into a running function,
//! builtin, or external command.
//!
//! Grounded on `yash_semantics::command::simple_command`'s step ordering
//! (DEBUG trap, expand, dispatch by kind, redirect teardown, ERR trap),
//! adapted to the function-pointer builtin registry [`crate::context`]
//! defines instead of the teacher's trait-object `Builtin`.

use super::{done, report_error};
use crate::context::Context;
use crate::error::Error;
use rbash_env::job::{Job, JobStatus};
use rbash_env::semantics::{ExitStatus, Field, Outcome, Result};
use rbash_env::session::{Env, StateDelta};
use rbash_env::trap::Condition;
use rbash_env::variable::{Value, Variable};
use rbash_syntax::syntax::{Assign, SimpleCommand};
use std::collections::HashMap;
use std::ops::ControlFlow;

/// What a builtin hands back. Read access to session state is a shared
/// `&Env` (builtins never mutate directly, per §5's "builtins receive a
/// read view and return a delta"); every write goes through the `Delta`
/// a successful invocation returns.
pub enum BuiltinResult {
    Ok(ExitStatus, StateDelta),
    Err(ExitStatus, String),
    Exit(Option<ExitStatus>),
    Break(usize),
    Continue(usize),
    Return(Option<ExitStatus>),
}

pub fn execute(cmd: &SimpleCommand, context: &Context, env: &mut Env) -> Result<Outcome> {
    // Step 1: DEBUG trap.
    match crate::trap_dispatch::fire(&Condition::Debug, context, env) {
        ControlFlow::Break(divert) => return ControlFlow::Break(divert),
        ControlFlow::Continue(_) => {}
    }

    if cmd.is_empty() {
        return done(ExitStatus::SUCCESS);
    }

    // A bare assignment (`x=5`, no words) mutates the real session
    // permanently; prefix assignments ahead of a command (`x=5 cmd`) only
    // take effect for that one invocation, so they are applied to a
    // throwaway clone instead.
    if cmd.words.is_empty() {
        for assign in &cmd.assigns {
            apply_assign(assign, context, env);
        }
        return done(ExitStatus::SUCCESS);
    }

    let mut exec_env = env.clone();
    let original: HashMap<String, Option<Variable>> = cmd
        .assigns
        .iter()
        .map(|a| (a.name.clone(), env.variables.get(&a.name).cloned()))
        .collect();
    for assign in &cmd.assigns {
        apply_assign(assign, context, &mut exec_env);
    }

    // Step 2: expand name + args against the (possibly prefix-assigned)
    // working environment.
    let mut delta = StateDelta::default();
    let mut fields: Vec<Field> = Vec::new();
    for (word, _mode) in &cmd.words {
        match crate::expansion::word::expand_word(word, context, &mut exec_env, &mut delta) {
            Ok(mut f) => fields.append(&mut f),
            Err(err) => {
                delta.merge_into(&mut exec_env);
                let status = report_error(&err, context, &exec_env);
                return done(status);
            }
        }
    }
    delta.merge_into(&mut exec_env);

    let Some(name_field) = fields.first().cloned() else {
        return done(ExitStatus::SUCCESS);
    };
    let name = name_field.value;
    let args: Vec<Field> = fields;

    // Step 4/5: redirections.
    let (guard, stdin_bytes) = match crate::redir::install(&cmd.redirs, context, &mut exec_env) {
        Ok(pair) => pair,
        Err(err) => {
            let status = report_error(&err, context, &exec_env);
            return done(status);
        }
    };

    // Step 6: xtrace/verbose.
    let traced: Vec<String> = args.iter().map(|f| f.value.clone()).collect();
    crate::xtrace::trace_command(&traced, &exec_env);

    // Step 7/8: dispatch.
    let outcome = dispatch(&name, &args, &stdin_bytes, context, env, &mut exec_env);

    // Step 9: close redirects, fire ERR trap.
    guard.restore(&mut exec_env);

    let outcome = match outcome {
        ControlFlow::Continue(outcome) => outcome,
        ControlFlow::Break(divert) => {
            if !cmd.assigns.is_empty() {
                restore_prefix_assigns(&original, &mut exec_env);
            }
            *env = exec_env;
            return ControlFlow::Break(divert);
        }
    };

    if !cmd.assigns.is_empty() {
        restore_prefix_assigns(&original, &mut exec_env);
    }
    *env = exec_env;

    if let Some(status) = outcome.exit_status() {
        if !status.is_successful() && env.options.contains(rbash_env::option::Option::ErrExit) {
            let _ = crate::trap_dispatch::fire(&Condition::Err, context, env);
        }
    }

    ControlFlow::Continue(outcome)
}

fn restore_prefix_assigns(original: &HashMap<String, Option<Variable>>, env: &mut Env) {
    for (name, value) in original {
        match value {
            Some(v) => {
                env.variables.insert(name.clone(), v.clone());
            }
            None => {
                env.variables.remove(name);
            }
        }
    }
}

/// Expands and installs one assignment word (`x=v`, `x=(a b)`, or
/// `x=([k]=v)`) into `env`. An expansion failure or a readonly target is
/// reported as a diagnostic rather than propagated — §4.5 models a
/// simple command's assignments as part of the same "expansion errors
/// raise to the enclosing simple-command, exit 1" rule as its words.
fn apply_assign(assign: &Assign, context: &Context, env: &mut Env) {
    use rbash_syntax::syntax::Value as AstValue;
    let mut delta = StateDelta::default();

    let value = match &assign.value {
        AstValue::Scalar(word) => {
            match crate::expansion::word::expand_word(word, context, env, &mut delta) {
                Ok(fields) => Some(Value::scalar(join_fields(fields, " "))),
                Err(err) => {
                    report_error(&err, context, env);
                    None
                }
            }
        }
        AstValue::Array(words) => {
            let mut values = Vec::new();
            let mut failed = false;
            for word in words {
                match crate::expansion::word::expand_word(word, context, env, &mut delta) {
                    Ok(fields) => values.extend(fields.into_iter().map(|f| f.value)),
                    Err(err) => {
                        report_error(&err, context, env);
                        failed = true;
                        break;
                    }
                }
            }
            (!failed).then(|| Value::array(values))
        }
        AstValue::Associative(pairs) => {
            let mut map = indexmap::IndexMap::new();
            let mut failed = false;
            for (key_word, value_word) in pairs {
                let key = match crate::expansion::word::expand_word(key_word, context, env, &mut delta) {
                    Ok(fields) => join_fields(fields, ""),
                    Err(err) => {
                        report_error(&err, context, env);
                        failed = true;
                        break;
                    }
                };
                let value = match crate::expansion::word::expand_word(value_word, context, env, &mut delta) {
                    Ok(fields) => join_fields(fields, " "),
                    Err(err) => {
                        report_error(&err, context, env);
                        failed = true;
                        break;
                    }
                };
                map.insert(key, value);
            }
            (!failed).then(|| Value::Associative(map))
        }
    };
    delta.merge_into(env);

    let Some(value) = value else { return };
    let var = env
        .variables
        .entry(assign.name.clone())
        .or_insert_with(Variable::unset);
    if var.assign(&assign.name, value, Some(assign.location.clone())).is_err() {
        report_error(
            &Error::ReadOnly {
                name: assign.name.clone(),
                location: assign.location.clone(),
            },
            context,
            env,
        );
    }
}

fn join_fields(fields: Vec<Field>, sep: &str) -> String {
    fields
        .into_iter()
        .map(|f| f.value)
        .collect::<Vec<_>>()
        .join(sep)
}

/// Dispatch order, per §4.5 step 7: user function (the `ns.func` dotted
/// namespace the spec calls out falls out of this naturally, since
/// function names are arbitrary strings and nothing here restricts them
/// to identifiers) → builtin registry → external. `env` is the real
/// session (for function calls, which must see and mutate real state
/// beyond this one invocation); `exec_env` carries this invocation's
/// redirections and temporary assignments.
fn dispatch(
    name: &str,
    args: &[Field],
    stdin_bytes: &[u8],
    context: &Context,
    env: &mut Env,
    exec_env: &mut Env,
) -> Result<Outcome> {
    if let Some(function) = env.functions.get(name).cloned() {
        return super::function_definition::call(&function, args, context, env);
    }

    if let Some(builtin) = context.builtins.get(name) {
        return match builtin(args, exec_env) {
            BuiltinResult::Ok(status, delta) => {
                delta.merge_into(exec_env);
                done(status)
            }
            BuiltinResult::Err(status, message) => {
                exec_env.write(
                    rbash_env::io::StreamTag::Stderr,
                    format!("{}: {message}\n", context.program_name).as_bytes(),
                );
                done(status)
            }
            BuiltinResult::Exit(status) => ControlFlow::Break(rbash_env::semantics::Divert::Exit(status)),
            BuiltinResult::Break(count) => {
                ControlFlow::Break(rbash_env::semantics::Divert::Break { count })
            }
            BuiltinResult::Continue(count) => {
                ControlFlow::Break(rbash_env::semantics::Divert::Continue { count })
            }
            BuiltinResult::Return(status) => {
                ControlFlow::Break(rbash_env::semantics::Divert::Return(status))
            }
        };
    }

    run_external(name, args, stdin_bytes, context, exec_env)
}

fn run_external(
    name: &str,
    args: &[Field],
    stdin_bytes: &[u8],
    context: &Context,
    exec_env: &mut Env,
) -> Result<Outcome> {
    let path = match resolve_path(name, exec_env) {
        Ok(path) => path,
        Err(err) => return done(report_error(&err, context, exec_env)),
    };

    let mut argv = vec![path];
    argv.extend(args.iter().skip(1).map(|f| f.value.clone()));

    let env_vars: HashMap<String, String> = exec_env
        .variables
        .iter()
        .filter(|(_, v)| v.is_exported())
        .filter_map(|(k, v)| v.value().and_then(|val| val.as_scalar()).map(|s| (k.clone(), s.to_owned())))
        .collect();

    match context
        .spawner
        .spawn(&argv, &env_vars, &exec_env.working_dir, stdin_bytes)
    {
        Ok(outcome) => {
            exec_env.write(rbash_env::io::StreamTag::Stdout, &outcome.stdout);
            exec_env.write(rbash_env::io::StreamTag::Stderr, &outcome.stderr);
            done(outcome.status)
        }
        Err(err) => done(report_error(&err, context, exec_env)),
    }
}

/// Resolves `name` to an executable path per §4.5 step 8: commands
/// containing `/` skip the hash/PATH search entirely; otherwise a cached
/// hash entry is reused if the path still exists, else `PATH` is
/// re-searched and the hash updated when `hashall` is set.
fn resolve_path(name: &str, env: &mut Env) -> std::result::Result<String, Error> {
    if name.contains('/') {
        return if std::path::Path::new(name).is_file() {
            Ok(name.to_owned())
        } else {
            Err(Error::NotFound {
                name: name.to_owned(),
                location: rbash_syntax::source::Location::dummy(),
            })
        };
    }

    if let Some(entry) = env.hash.get(name) {
        if entry.path.is_file() {
            return Ok(entry.path.display().to_string());
        }
    }

    let path_var = env
        .get_variable("PATH")
        .and_then(|v| v.value())
        .and_then(|v| v.as_scalar())
        .unwrap_or("");

    for dir in path_var.split(':') {
        let candidate = std::path::Path::new(dir).join(name);
        if candidate.is_file() {
            if env.options.contains(rbash_env::option::Option::HashAll) {
                env.hash.insert(
                    name.to_owned(),
                    rbash_env::hash::HashEntry {
                        path: candidate.clone(),
                        hit_count: env.hash.get(name).map_or(1, |e| e.hit_count + 1),
                    },
                );
            }
            return Ok(candidate.display().to_string());
        }
    }

    Err(Error::NotFound {
        name: name.to_owned(),
        location: rbash_syntax::source::Location::dummy(),
    })
}
