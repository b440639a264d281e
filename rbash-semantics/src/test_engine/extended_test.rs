//! `[[ condition ]]`, the extended test command.
//!
//! Unlike [`super::posix_test`], this form's grammar is parsed ahead of
//! time into a [`CondExpr`] tree (§1's out-of-scope parser's job), so
//! evaluation here just walks it: `&&`/`||` short-circuit without
//! expanding their untaken side (the same rule `command1 && command2`
//! follows one level up, in [`crate::command::and_or`]), word operands
//! are expanded but never split or globbed (quote removal only — an
//! unquoted `[[ $x == $pattern ]]` still pattern-matches, it just never
//! turns into more than one operand), and a successful `=~` populates
//! `BASH_REMATCH` with the whole match plus each capture group, mirroring
//! bash's own behavior.

use super::shared;
use crate::context::Context;
use rbash_env::semantics::{ExitStatus, Outcome, Result};
use rbash_env::session::{Env, StateDelta};
use rbash_env::variable::Value;
use rbash_syntax::cond::{BinaryCondOp, CondExpr, UnaryCondOp};
use rbash_syntax::source::Location;
use rbash_syntax::syntax::{Word, WordUnit};
use std::ops::ControlFlow;

pub fn execute(
    condition: &CondExpr,
    _location: &Location,
    context: &Context,
    env: &mut Env,
) -> Result<Outcome> {
    let status = match eval(condition, context, env) {
        Ok(true) => ExitStatus::SUCCESS,
        Ok(false) => ExitStatus::FAILURE,
        Err(err) => return ControlFlow::Continue(Outcome::Done(crate::command::report_error(&err, context, env))),
    };
    ControlFlow::Continue(Outcome::Done(status))
}

fn eval(expr: &CondExpr, context: &Context, env: &mut Env) -> crate::error::Result<bool> {
    match expr {
        CondExpr::Word(word) => Ok(!expand_operand(word, context, env)?.is_empty()),
        CondExpr::Unary { op, operand, .. } => {
            let value = expand_operand(operand, context, env)?;
            Ok(eval_unary(*op, &value, operand, env))
        }
        CondExpr::Binary { op, lhs, rhs, .. } => {
            let lhs_value = expand_operand(lhs, context, env)?;
            let rhs_value = expand_operand(rhs, context, env)?;
            eval_binary(*op, &lhs_value, &rhs_value, is_entirely_quoted(rhs), env)
        }
        CondExpr::Not(inner) => Ok(!eval(inner, context, env)?),
        CondExpr::And(lhs, rhs) => Ok(eval(lhs, context, env)? && eval(rhs, context, env)?),
        CondExpr::Or(lhs, rhs) => Ok(eval(lhs, context, env)? || eval(rhs, context, env)?),
        CondExpr::Paren(inner) => eval(inner, context, env),
    }
}

fn expand_operand(word: &Word, context: &Context, env: &mut Env) -> crate::error::Result<String> {
    let mut delta = StateDelta::default();
    let fields = crate::expansion::word::expand_word(word, context, env, &mut delta)?;
    delta.merge_into(env);
    Ok(fields.into_iter().map(|f| f.value).collect::<Vec<_>>().join(" "))
}

/// A word made entirely of quoted units (`'...'`, `"..."`, `$'...'`) is a
/// literal match even on the right-hand side of `==`/`!=`, per
/// [`rbash_syntax::cond::CondExpr::Binary`]'s doc comment.
fn is_entirely_quoted(word: &Word) -> bool {
    !word.units.is_empty()
        && word.units.iter().all(|u| {
            matches!(
                u,
                WordUnit::SingleQuote(_) | WordUnit::DoubleQuote(_) | WordUnit::DollarSingleQuote(_)
            )
        })
}

fn eval_unary(op: UnaryCondOp, value: &str, operand: &Word, env: &Env) -> bool {
    match op {
        UnaryCondOp::Exists => shared::exists(value),
        UnaryCondOp::Regular => shared::is_regular_file(value),
        UnaryCondOp::Directory => shared::is_directory(value),
        UnaryCondOp::Symlink => shared::is_symlink(value),
        UnaryCondOp::Readable => shared::is_readable(value),
        UnaryCondOp::Writable => shared::is_writable(value),
        UnaryCondOp::Executable => shared::is_executable(value),
        UnaryCondOp::NonEmptyFile => shared::is_non_empty_file(value),
        UnaryCondOp::StringNonEmpty => !value.is_empty(),
        UnaryCondOp::StringEmpty => value.is_empty(),
        UnaryCondOp::VarSet => {
            let name = operand.to_string();
            env.get_variable(&name).is_some()
        }
        UnaryCondOp::NameRef => {
            let name = operand.to_string();
            matches!(
                env.variables.get(&name),
                Some(rbash_env::variable::Variable::Nameref { .. })
            )
        }
    }
}

fn eval_binary(
    op: BinaryCondOp,
    lhs: &str,
    rhs: &str,
    rhs_quoted: bool,
    env: &mut Env,
) -> crate::error::Result<bool> {
    let parse_int = shared::parse_int;
    let int_error = || crate::error::Error::Arithmetic {
        expression: format!("{lhs} {rhs}"),
        message: "integer expression expected".to_owned(),
        location: Location::dummy(),
    };
    Ok(match op {
        BinaryCondOp::GlobEq | BinaryCondOp::GlobNe => {
            let matched = if rhs_quoted {
                lhs == rhs
            } else {
                match rbash_fnmatch::Pattern::parse(rhs) {
                    Ok(pattern) => pattern.is_match(lhs),
                    Err(_) => lhs == rhs,
                }
            };
            if matches!(op, BinaryCondOp::GlobNe) {
                !matched
            } else {
                matched
            }
        }
        BinaryCondOp::RegexMatch => match regex::Regex::new(rhs) {
            Ok(re) => match re.captures(lhs) {
                Some(captures) => {
                    set_bash_rematch(&captures, env);
                    true
                }
                None => false,
            },
            Err(_) => false,
        },
        BinaryCondOp::StringLt => lhs < rhs,
        BinaryCondOp::StringGt => lhs > rhs,
        BinaryCondOp::IntEq => parse_int(lhs).ok_or_else(int_error)? == parse_int(rhs).ok_or_else(int_error)?,
        BinaryCondOp::IntNe => parse_int(lhs).ok_or_else(int_error)? != parse_int(rhs).ok_or_else(int_error)?,
        BinaryCondOp::IntLt => parse_int(lhs).ok_or_else(int_error)? < parse_int(rhs).ok_or_else(int_error)?,
        BinaryCondOp::IntLe => parse_int(lhs).ok_or_else(int_error)? <= parse_int(rhs).ok_or_else(int_error)?,
        BinaryCondOp::IntGt => parse_int(lhs).ok_or_else(int_error)? > parse_int(rhs).ok_or_else(int_error)?,
        BinaryCondOp::IntGe => parse_int(lhs).ok_or_else(int_error)? >= parse_int(rhs).ok_or_else(int_error)?,
    })
}

fn set_bash_rematch(captures: &regex::Captures, env: &mut Env) {
    let values: Vec<String> = captures
        .iter()
        .map(|m| m.map(|m| m.as_str().to_owned()).unwrap_or_default())
        .collect();
    let var = env
        .variables
        .entry("BASH_REMATCH".to_owned())
        .or_insert_with(rbash_env::variable::Variable::unset);
    let _ = var.assign("BASH_REMATCH", Value::array(values), None);
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

    fn word(op: &str) -> Word {
        Word::from_literal(op)
    }

    #[test]
    fn glob_equality_matches_a_pattern() {
        let mut env = test_env();
        let builtins = BuiltinRegistry::new();
        let context = Context::new(&NullParser, &NullSpawner, &builtins, "rbash");
        let expr = CondExpr::Binary {
            op: BinaryCondOp::GlobEq,
            lhs: word("hello"),
            rhs: word("h*"),
            location: Location::dummy(),
        };
        let outcome = execute(&expr, &Location::dummy(), &context, &mut env);
        assert_eq!(outcome, ControlFlow::Continue(Outcome::Done(ExitStatus::SUCCESS)));
    }

    #[test]
    fn regex_match_populates_bash_rematch() {
        let mut env = test_env();
        let builtins = BuiltinRegistry::new();
        let context = Context::new(&NullParser, &NullSpawner, &builtins, "rbash");
        let expr = CondExpr::Binary {
            op: BinaryCondOp::RegexMatch,
            lhs: word("abc123"),
            rhs: word("([a-z]+)([0-9]+)"),
            location: Location::dummy(),
        };
        execute(&expr, &Location::dummy(), &context, &mut env);
        assert_eq!(
            env.get_variable("BASH_REMATCH").unwrap().value(),
            Some(&Value::array(["abc123", "abc", "123"]))
        );
    }

    #[test]
    fn and_short_circuits_on_a_false_left_side() {
        let mut env = test_env();
        let builtins = BuiltinRegistry::new();
        let context = Context::new(&NullParser, &NullSpawner, &builtins, "rbash");
        let expr = CondExpr::And(
            Box::new(CondExpr::Word(word(""))),
            Box::new(CondExpr::Unary {
                op: UnaryCondOp::StringNonEmpty,
                operand: word("anything"),
                location: Location::dummy(),
            }),
        );
        let outcome = execute(&expr, &Location::dummy(), &context, &mut env);
        assert_eq!(outcome, ControlFlow::Continue(Outcome::Done(ExitStatus::FAILURE)));
    }
}
