//! `case subject in patterns) body ;; ... esac`.
//!
//! Grounded on `yash_semantics::command::case_command`'s pattern-match
//! loop, carrying bash's three branch terminators
//! ([`CaseContinuation`]): `;;` stops after a matching branch's body runs,
//! `;&` runs the *next* branch's body unconditionally (no pattern test),
//! and `;;&` resumes pattern-testing at the next branch instead of
//! stopping.

use crate::context::Context;
use rbash_env::semantics::{ExitStatus, Outcome, Result};
use rbash_env::session::{Env, StateDelta};
use rbash_syntax::syntax::{CaseContinuation, CaseItem, Word};
use std::ops::ControlFlow;

pub fn execute(subject: &Word, items: &[CaseItem], context: &Context, env: &mut Env) -> Result<Outcome> {
    let subject = match expand_one(subject, context, env) {
        Ok(s) => s,
        Err(err) => return ControlFlow::Continue(Outcome::Done(super::super::report_error(&err, context, env))),
    };

    let mut index = 0;
    let mut run_unconditionally = false;
    while index < items.len() {
        let item = &items[index];
        let matched = run_unconditionally || item_matches(item, &subject, context, env);
        if !matched {
            index += 1;
            continue;
        }

        let outcome = match crate::command::list::run(&item.body, context, env) {
            ControlFlow::Continue(outcome) => outcome,
            ControlFlow::Break(divert) => return ControlFlow::Break(divert),
        };

        match item.continuation {
            CaseContinuation::Break => return ControlFlow::Continue(outcome),
            CaseContinuation::FallThrough => {
                run_unconditionally = true;
                index += 1;
                if index >= items.len() {
                    return ControlFlow::Continue(outcome);
                }
            }
            CaseContinuation::Continue => {
                run_unconditionally = false;
                index += 1;
                if index >= items.len() {
                    return ControlFlow::Continue(outcome);
                }
            }
        }
    }

    ControlFlow::Continue(Outcome::Done(ExitStatus::SUCCESS))
}

fn item_matches(item: &CaseItem, subject: &str, context: &Context, env: &mut Env) -> bool {
    item.patterns.iter().any(|pattern| {
        let Ok(text) = expand_one(pattern, context, env) else {
            return false;
        };
        match rbash_fnmatch::Pattern::parse(&text) {
            Ok(pattern) => pattern.is_match(subject),
            Err(_) => text == subject,
        }
    })
}

fn expand_one(word: &Word, context: &Context, env: &mut Env) -> crate::error::Result<String> {
    let mut delta = StateDelta::default();
    let fields = crate::expansion::word::expand_word(word, context, env, &mut delta)?;
    delta.merge_into(env);
    Ok(fields.into_iter().map(|f| f.value).collect::<Vec<_>>().join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{BuiltinRegistry, Context, NullParser, NullSpawner};
    use rbash_env::io::Collector;
    use rbash_syntax::syntax::List;

    fn test_env() -> Env {
        let collector = Collector::new();
        Env::new(collector.sink(), collector.sink())
    }

    #[test]
    fn no_matching_branch_succeeds_trivially() {
        let mut env = test_env();
        let builtins = BuiltinRegistry::new();
        let context = Context::new(&NullParser, &NullSpawner, &builtins, "rbash");
        let items = vec![CaseItem {
            patterns: vec![Word::from_literal("nope")],
            body: List(vec![]),
            continuation: CaseContinuation::Break,
        }];
        let outcome = execute(&Word::from_literal("x"), &items, &context, &mut env);
        assert_eq!(outcome, ControlFlow::Continue(Outcome::Done(ExitStatus::SUCCESS)));
    }

    #[test]
    fn a_glob_pattern_matches_the_subject() {
        let mut env = test_env();
        let builtins = BuiltinRegistry::new();
        let context = Context::new(&NullParser, &NullSpawner, &builtins, "rbash");
        let items = vec![CaseItem {
            patterns: vec![Word::from_literal("a*")],
            body: List(vec![]),
            continuation: CaseContinuation::Break,
        }];
        let outcome = execute(&Word::from_literal("abc"), &items, &context, &mut env);
        assert_eq!(outcome, ControlFlow::Continue(Outcome::Done(ExitStatus::SUCCESS)));
    }
}
