//! `{ list; }` — runs `list` in the current shell environment, unlike a
//! subshell. Exists only to have a name at the same level as
//! [`super::subshell`] in the `CompoundCommand` dispatch.

use crate::context::Context;
use rbash_env::semantics::{Outcome, Result};
use rbash_env::session::Env;
use rbash_syntax::syntax::List;

pub fn execute(list: &List, context: &Context, env: &mut Env) -> Result<Outcome> {
    crate::command::list::run(list, context, env)
}
