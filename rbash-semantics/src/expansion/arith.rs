//! Stage 5: arithmetic expansion, `$((...))`.
//!
//! Grounded on §4.1 bullet 5: nested `$(...)` inside the expression is
//! expanded first (the expression text itself is just a [`Text`], so its
//! own `TextUnit`s — including `CommandSubst`/`RawParam`/etc — already go
//! through the normal parameter/command-substitution walk before the
//! arithmetic parser ever sees the result), and a failing expression
//! expands to the empty string rather than aborting the surrounding word.
//! The `((...))` arithmetic *command* (not an expansion) reuses
//! [`ArithAdapter`] too; see `crate::command::arith_command`.

use crate::context::Context;
use rbash_env::session::{Env, StateDelta};
use rbash_env::variable::{self, Value, Variable};
use rbash_syntax::source::Location;
use rbash_syntax::syntax::Text;

/// Bridges `rbash_arith::Env` to a shell session: variable reads resolve
/// namerefs and fall back to `0` for an unset or non-numeric value (per
/// arithmetic context's usual numeric coercion), and assignments go through
/// the same readonly check and nameref resolution a parameter-expansion
/// assignment switch (`${x:=v}`) would, recording the write in `delta` so
/// the caller's expansion-stage merge sees it.
pub struct ArithAdapter<'a> {
    pub env: &'a mut Env,
    pub delta: &'a mut StateDelta,
}

impl rbash_arith::Env for ArithAdapter<'_> {
    type AssignError = variable::AssignError;

    fn get(&self, name: &str) -> Option<String> {
        match variable::get(&self.env.variables, name)? {
            Variable::Value { value, .. } => value.as_ref().and_then(Value::as_scalar).map(str::to_owned),
            Variable::Nameref { .. } => None,
        }
    }

    fn assign(&mut self, name: &str, value: i64) -> Result<(), variable::AssignError> {
        let resolved =
            variable::resolve_name(&self.env.variables, name).unwrap_or_else(|| name.to_owned());
        let var = self
            .env
            .variables
            .entry(resolved.clone())
            .or_insert_with(Variable::unset);
        // A bare name in arithmetic context writes through to element `0` of
        // an existing array rather than flattening the whole variable to a
        // scalar (bash: `arr=(1 2 3); ((arr = 5))` leaves `arr[1]`/`arr[2]`
        // alone and only changes `arr[0]`).
        let new_value = match var.value() {
            Some(Value::Indexed(map)) => {
                let mut map = map.clone();
                map.insert(0, value.to_string());
                Value::Indexed(map)
            }
            Some(Value::Associative(map)) => {
                let mut map = map.clone();
                map.insert("0".to_owned(), value.to_string());
                Value::Associative(map)
            }
            Some(Value::Scalar(_)) | None => Value::scalar(value.to_string()),
        };
        var.assign(&resolved, new_value, None)?;
        self.delta.var_updates.insert(resolved, var.clone());
        Ok(())
    }
}

/// Expands `content` (already a parsed `Text`, i.e. `$((x + 1))`'s inner
/// `x + 1`) by first running it through the ordinary text expansion walk
/// (so embedded `$var`/`$(cmd)` are substituted as plain text) and then
/// parsing and evaluating the result as an arithmetic expression.
pub fn expand(
    content: &Text,
    _location: &Location,
    context: &Context,
    env: &mut Env,
    delta: &mut StateDelta,
) -> String {
    let source = match super::param::expand_text(content, context, env, delta) {
        Ok(s) => s,
        Err(_) => return String::new(),
    };
    let mut adapter = ArithAdapter { env, delta };
    match rbash_arith::eval(&source, &mut adapter) {
        Ok(n) => n.to_string(),
        Err(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{BuiltinRegistry, Context, NullParser, NullSpawner};
    use rbash_env::io::Collector;
    use rbash_syntax::syntax::TextUnit;

    fn test_env() -> Env {
        let collector = Collector::new();
        Env::new(collector.sink(), collector.sink())
    }

    fn literal_text(s: &str) -> Text {
        Text(s.chars().map(TextUnit::Literal).collect())
    }

    #[test]
    fn evaluates_a_plain_expression() {
        let mut env = test_env();
        let mut delta = StateDelta::default();
        let builtins = BuiltinRegistry::new();
        let context = Context::new(&NullParser, &NullSpawner, &builtins, "rbash");
        let result = expand(&literal_text("2 + 3"), &Location::dummy(), &context, &mut env, &mut delta);
        assert_eq!(result, "5");
    }

    #[test]
    fn assignment_expression_updates_the_variable_and_delta() {
        let mut env = test_env();
        let mut delta = StateDelta::default();
        let builtins = BuiltinRegistry::new();
        let context = Context::new(&NullParser, &NullSpawner, &builtins, "rbash");
        let result = expand(&literal_text("n = 7"), &Location::dummy(), &context, &mut env, &mut delta);
        assert_eq!(result, "7");
        assert_eq!(
            env.get_variable("n").and_then(|v| v.value()).and_then(|v| v.as_scalar()),
            Some("7")
        );
        assert!(delta.var_updates.contains_key("n"));
    }

    #[test]
    fn an_invalid_expression_expands_to_empty_string() {
        let mut env = test_env();
        let mut delta = StateDelta::default();
        let builtins = BuiltinRegistry::new();
        let context = Context::new(&NullParser, &NullSpawner, &builtins, "rbash");
        let result = expand(&literal_text("1 +"), &Location::dummy(), &context, &mut env, &mut delta);
        assert_eq!(result, "");
    }

    #[test]
    fn embedded_parameter_is_substituted_before_parsing() {
        let mut env = test_env();
        env.variables.insert("x".to_owned(), Variable::new("4"));
        let mut delta = StateDelta::default();
        let builtins = BuiltinRegistry::new();
        let context = Context::new(&NullParser, &NullSpawner, &builtins, "rbash");
        let content = Text(vec![TextUnit::RawParam {
            param: rbash_syntax::syntax::Param::variable("x"),
            location: Location::dummy(),
        }]);
        let result = expand(&content, &Location::dummy(), &context, &mut env, &mut delta);
        assert_eq!(result, "4");
    }
}
