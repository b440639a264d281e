//! `for name [in values]; do body; done`.
//!
//! Grounded on `yash_semantics::command::for_command`: `values` of `None`
//! means iterate `"$@"` (the positional parameters), per
//! [`rbash_syntax::syntax::CompoundCommand::For`]'s own doc comment;
//! otherwise each word is expanded (splitting and globbing included, the
//! same as any other word) before iterating.

use super::LoopSignal;
use crate::context::Context;
use rbash_env::semantics::{ExitStatus, Outcome, Result};
use rbash_env::session::{Env, StateDelta};
use rbash_env::variable::{Value, Variable};
use rbash_syntax::syntax::{List, Word};
use std::ops::ControlFlow;

pub fn execute(
    name: &Word,
    values: Option<&[Word]>,
    body: &List,
    context: &Context,
    env: &mut Env,
) -> Result<Outcome> {
    let var_name = name.to_string();
    let values = match values {
        Some(words) => match expand_all(words, context, env) {
            Ok(values) => values,
            Err(err) => {
                return ControlFlow::Continue(Outcome::Done(super::super::report_error(
                    &err, context, env,
                )))
            }
        },
        None => env.current_positional_params().to_vec(),
    };

    let mut last = Outcome::Done(ExitStatus::SUCCESS);
    for value in values {
        let var = env
            .variables
            .entry(var_name.clone())
            .or_insert_with(Variable::unset);
        let _ = var.assign(&var_name, Value::scalar(value), None);

        match super::loop_signal(crate::command::list::run(body, context, env)) {
            LoopSignal::Next(outcome) => last = outcome,
            LoopSignal::Stop(outcome) => {
                last = outcome;
                break;
            }
            LoopSignal::Propagate(cf) => return cf,
        }
    }

    ControlFlow::Continue(last)
}

fn expand_all(words: &[Word], context: &Context, env: &mut Env) -> crate::error::Result<Vec<String>> {
    let mut delta = StateDelta::default();
    let mut values = Vec::new();
    for word in words {
        let fields = crate::expansion::word::expand_word(word, context, env, &mut delta)?;
        values.extend(fields.into_iter().map(|f| f.value));
    }
    delta.merge_into(env);
    Ok(values)
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
    fn iterating_an_explicit_list_sets_the_loop_variable_each_time() {
        let mut env = test_env();
        let builtins = BuiltinRegistry::new();
        let context = Context::new(&NullParser, &NullSpawner, &builtins, "rbash");
        let values = vec![Word::from_literal("a"), Word::from_literal("b")];
        let outcome = execute(
            &Word::from_literal("x"),
            Some(&values),
            &List(vec![]),
            &context,
            &mut env,
        );
        assert_eq!(outcome, ControlFlow::Continue(Outcome::Done(ExitStatus::SUCCESS)));
        assert_eq!(
            env.get_variable("x").unwrap().value(),
            Some(&Value::scalar("b"))
        );
    }

    #[test]
    fn no_values_falls_back_to_positional_params() {
        let mut env = test_env();
        env.push_positional_params(vec!["p1".to_owned(), "p2".to_owned()]);
        let builtins = BuiltinRegistry::new();
        let context = Context::new(&NullParser, &NullSpawner, &builtins, "rbash");
        execute(&Word::from_literal("x"), None, &List(vec![]), &context, &mut env);
        assert_eq!(
            env.get_variable("x").unwrap().value(),
            Some(&Value::scalar("p2"))
        );
    }
}
