//! Orchestrates all eight expansion stages over one [`Word`], producing the
//! [`Field`]s a command line, assignment, or redirection target ultimately
//! sees.
//!
//! Grounded on §4.1's stage ordering: brace, tilde, parameter/command/
//! arithmetic/process substitution (interleaved at the text-unit level by
//! [`super::param`]), word splitting, then pathname expansion.

use super::Segment;
use crate::context::Context;
use crate::error::Result;
use rbash_env::option::Option as ShellOption;
use rbash_env::semantics::Field;
use rbash_env::session::{Env, StateDelta};
use rbash_syntax::syntax::{ParamType, SpecialParam, Word, WordUnit};

/// Expands one word into zero or more fields, threading `delta` through
/// every stage so later parts of the same word (and the caller, once it
/// merges the returned delta) see the effects of earlier ones — `${x:=v}`
/// setting `x` before a later `$x` in the same command line, for instance.
pub fn expand_word(
    word: &Word,
    context: &Context,
    env: &mut Env,
    delta: &mut StateDelta,
) -> Result<Vec<Field>> {
    let origin = word.location.clone();
    let mut fields = Vec::new();

    for braced in super::brace::expand(word) {
        let tilded = super::tilde::expand(&braced, env);

        if is_standalone_at(&tilded) {
            for value in env.current_positional_params().to_vec() {
                fields.push(Field {
                    value,
                    origin: origin.clone(),
                });
            }
            continue;
        }

        let segments = super::param::expand_word_to_segments(&tilded, context, env, delta)?;
        for value in split_and_glob(&segments, env) {
            fields.push(Field {
                value,
                origin: origin.clone(),
            });
        }
    }

    Ok(fields)
}

/// Detects the idiomatic standalone `"$@"`/`$@` case: a word consisting of
/// exactly one unquoted `At` special-parameter unit, which expands to one
/// field per positional parameter regardless of `IFS` or quoting. Any other
/// placement of `$@` (embedded mid-word, alongside other units) falls back
/// to the generic pipeline, which treats it like `$*` — joined by `IFS`'s
/// first character — a documented simplification rather than bash's
/// per-positional-parameter splicing into the surrounding word.
fn is_standalone_at(word: &Word) -> bool {
    matches!(
        word.units.as_slice(),
        [WordUnit::Unquoted(rbash_syntax::syntax::TextUnit::RawParam {
            param,
            ..
        })] if matches!(param.r#type, ParamType::Special(SpecialParam::At))
    )
}

fn split_and_glob(segments: &[Segment], env: &Env) -> Vec<String> {
    let fields = super::split::split(segments, env);
    if env.options.contains(ShellOption::NoGlob) {
        return fields;
    }
    fields
        .into_iter()
        .flat_map(|f| super::glob::expand(&f, &env.working_dir, false))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{BuiltinRegistry, Context, NullParser, NullSpawner};
    use rbash_env::io::Collector;
    use rbash_syntax::syntax::{Param, TextUnit};

    fn test_env() -> Env {
        let collector = Collector::new();
        Env::new(collector.sink(), collector.sink())
    }

    #[test]
    fn a_literal_word_expands_to_one_field() {
        let mut env = test_env();
        let mut delta = StateDelta::default();
        let builtins = BuiltinRegistry::new();
        let context = Context::new(&NullParser, &NullSpawner, &builtins, "rbash");
        let word = Word::from_literal("hello");
        let fields = expand_word(&word, &context, &mut env, &mut delta).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].value, "hello");
    }

    #[test]
    fn an_unquoted_word_splits_on_whitespace() {
        let mut env = test_env();
        env.variables
            .insert("x".to_owned(), rbash_env::variable::Variable::new("a b c"));
        let mut delta = StateDelta::default();
        let builtins = BuiltinRegistry::new();
        let context = Context::new(&NullParser, &NullSpawner, &builtins, "rbash");
        let word = Word {
            units: vec![WordUnit::Unquoted(TextUnit::RawParam {
                param: Param::variable("x"),
                location: Default::default(),
            })],
            location: Default::default(),
        };
        let fields = expand_word(&word, &context, &mut env, &mut delta).unwrap();
        let values: Vec<_> = fields.into_iter().map(|f| f.value).collect();
        assert_eq!(values, vec!["a", "b", "c"]);
    }

    #[test]
    fn standalone_at_produces_one_field_per_positional_parameter() {
        let mut env = test_env();
        env.push_positional_params(vec!["one".to_owned(), "two words".to_owned()]);
        let mut delta = StateDelta::default();
        let builtins = BuiltinRegistry::new();
        let context = Context::new(&NullParser, &NullSpawner, &builtins, "rbash");
        let word = Word {
            units: vec![WordUnit::Unquoted(TextUnit::RawParam {
                param: Param {
                    id: "@".to_owned(),
                    r#type: ParamType::Special(SpecialParam::At),
                },
                location: Default::default(),
            })],
            location: Default::default(),
        };
        let fields = expand_word(&word, &context, &mut env, &mut delta).unwrap();
        let values: Vec<_> = fields.into_iter().map(|f| f.value).collect();
        assert_eq!(values, vec!["one", "two words"]);
    }

    #[test]
    fn double_quoted_text_is_a_single_field_even_with_spaces() {
        let mut env = test_env();
        let mut delta = StateDelta::default();
        let builtins = BuiltinRegistry::new();
        let context = Context::new(&NullParser, &NullSpawner, &builtins, "rbash");
        let word = Word {
            units: vec![WordUnit::DoubleQuote(rbash_syntax::syntax::Text(vec![
                TextUnit::Literal('a'),
                TextUnit::Literal(' '),
                TextUnit::Literal('b'),
            ]))],
            location: Default::default(),
        };
        let fields = expand_word(&word, &context, &mut env, &mut delta).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].value, "a b");
    }
}
