//! Function definition (`name() { ... }` / `function name { ... }`) and
//! call, per §4.5's "Function call" paragraph and §4.9.
//!
//! Grounded on `yash_semantics::command::function`'s two halves: defining
//! never evaluates the body, just records it; calling pushes a fresh
//! positional-parameter frame, runs the body, and absorbs a `Divert::Return`
//! into a plain exit status rather than letting it propagate further up.

use super::done;
use crate::context::Context;
use rbash_env::function::Function;
use rbash_env::semantics::{Divert, ExitStatus, Field, Outcome, Result};
use rbash_env::session::Env;
use rbash_syntax::syntax::FunctionDefinition;
use std::ops::ControlFlow;

/// Records `def` in the session's function table. A function that already
/// exists and was marked read-only (the `readonly -f` builtin's doing)
/// would reject the redefinition; until that builtin exists, this always
/// succeeds.
pub fn define(def: &FunctionDefinition, _context: &Context, env: &mut Env) -> Result<Outcome> {
    let name = def.name.to_string();
    if let Some(existing) = env.functions.get(&name) {
        if existing.is_read_only() {
            let status = super::report_error(
                &crate::error::Error::ReadOnly {
                    name,
                    location: def.name.location.clone(),
                },
                _context,
                env,
            );
            return done(status);
        }
    }
    let function = Function::new(name.clone(), def.body.clone(), def.name.location.clone());
    env.functions.insert(name, function);
    done(ExitStatus::SUCCESS)
}

/// Runs `function`'s body with `args` (the command name plus its operands,
/// matching how `$0`/`$@` read inside a function call) as the new
/// positional-parameter frame, popping it again once the body returns or
/// diverts. A `Divert::Return` is the normal way a function call ends and
/// is absorbed into the call's own exit status here rather than
/// propagating to whatever invoked this function.
pub fn call(
    function: &Function,
    args: &[Field],
    context: &Context,
    env: &mut Env,
) -> Result<Outcome> {
    let positional = args.iter().skip(1).map(|f| f.value.clone()).collect();
    env.push_positional_params(positional);

    let outcome = super::compound::execute(&function.body, context, env);

    env.pop_positional_params();

    match outcome {
        ControlFlow::Continue(outcome) => ControlFlow::Continue(outcome),
        ControlFlow::Break(Divert::Return(status)) => {
            done(status.unwrap_or(ExitStatus::SUCCESS))
        }
        ControlFlow::Break(divert) => ControlFlow::Break(divert),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{BuiltinRegistry, Context, NullParser, NullSpawner};
    use rbash_env::io::Collector;
    use rbash_syntax::syntax::{CompoundCommand, FullCompoundCommand, Word};
    use std::rc::Rc;

    fn test_env() -> Env {
        let collector = Collector::new();
        Env::new(collector.sink(), collector.sink())
    }

    fn empty_body() -> Rc<FullCompoundCommand> {
        Rc::new(FullCompoundCommand {
            command: CompoundCommand::Grouping(rbash_syntax::syntax::List(vec![])),
            redirs: vec![],
        })
    }

    #[test]
    fn defining_a_function_records_it() {
        let mut env = test_env();
        let builtins = BuiltinRegistry::new();
        let context = Context::new(&NullParser, &NullSpawner, &builtins, "rbash");
        let def = FunctionDefinition {
            has_keyword: false,
            name: Word::from_literal("greet"),
            body: empty_body(),
        };
        let outcome = define(&def, &context, &mut env);
        assert_eq!(outcome, ControlFlow::Continue(Outcome::Done(ExitStatus::SUCCESS)));
        assert!(env.functions.contains_key("greet"));
    }

    #[test]
    fn calling_pushes_and_pops_positional_params() {
        let mut env = test_env();
        let builtins = BuiltinRegistry::new();
        let context = Context::new(&NullParser, &NullSpawner, &builtins, "rbash");
        let function = Function::new("greet", empty_body(), rbash_syntax::source::Location::dummy());
        let args = Field::dummies(["greet", "a", "b"]);
        call(&function, &args, &context, &mut env);
        assert!(env.current_positional_params().is_empty());
    }
}
