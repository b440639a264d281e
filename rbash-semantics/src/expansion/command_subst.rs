//! Stage 4: command substitution, `$(...)` and `` `...` ``.
//!
//! Grounded on §4.1 bullet 4. The command list runs in a cloned `Env` whose
//! `stdout_sink` is redirected into a [`Collector`] — the same
//! clone-and-discard isolation a subshell uses, since command substitution
//! must not let the substituted commands' variable assignments or
//! directory changes leak into the surrounding shell. Only `$?` crosses
//! back out, set to the exit status of the substituted list, matching
//! every other shell's observable behavior that `$?` after `x=$(false)`
//! reports `1`.

use crate::context::Context;
use crate::error::Result;
use rbash_env::io::Collector;
use rbash_env::semantics::ExitStatus;
use rbash_env::session::{Env, StateDelta};
use rbash_syntax::source::Location;
use std::ops::ControlFlow;
use std::rc::Rc;

pub fn run(
    content: &Rc<str>,
    location: &Location,
    context: &Context,
    env: &mut Env,
    _delta: &mut StateDelta,
) -> Result<String> {
    let list = context.parser.parse(content, location)?;

    let collector = Collector::new();
    let mut sub_env = env.clone();
    sub_env.stdout_sink = collector.sink();

    let status = match crate::command::list::run(&list, context, &mut sub_env) {
        ControlFlow::Continue(outcome) => outcome.exit_status().unwrap_or(ExitStatus::SUCCESS),
        ControlFlow::Break(divert) => divert.exit_status().unwrap_or(ExitStatus::SUCCESS),
    };
    env.exit_status = status;

    let bytes = collector.stdout.borrow();
    let text = String::from_utf8_lossy(&bytes);
    Ok(text.trim_end_matches('\n').to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{BuiltinRegistry, Context, NullParser, NullSpawner};
    use assert_matches::assert_matches;

    fn test_env() -> Env {
        let collector = Collector::new();
        Env::new(collector.sink(), collector.sink())
    }

    #[test]
    fn an_unavailable_parser_reports_a_syntax_error() {
        let mut env = test_env();
        let mut delta = StateDelta::default();
        let builtins = BuiltinRegistry::new();
        let context = Context::new(&NullParser, &NullSpawner, &builtins, "rbash");
        let err = run(&Rc::from("echo hi"), &Location::dummy(), &context, &mut env, &mut delta)
            .unwrap_err();
        assert_matches!(err, crate::error::Error::Syntax { .. });
    }
}
