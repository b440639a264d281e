//! Fires `DEBUG`/`ERR`/`EXIT`/signal traps at the points §4.5 and §4.7
//! name, guarded by a re-entrancy flag so a trap body that itself runs a
//! command cannot recursively re-fire the same trap from inside its own
//! execution.
//!
//! Grounded on `yash_env::trap`'s condition/action model (see
//! [`rbash_env::trap`]), simplified to this workspace's synchronous,
//! non-signal-handling scope: there is no real OS signal delivery to
//! react to (installing a disposition with the kernel is the external
//! collaborator §1 puts out of scope), so the only conditions this module
//! ever actually fires are the ones the evaluator itself reaches
//! structurally — `Debug` before a simple command, `Err` after one exits
//! non-zero with `errexit`-adjacent reporting enabled, and `Exit` when the
//! interpreter is about to stop. Named signal traps are recorded in
//! [`rbash_env::trap::TrapSet`] and inspectable by the `trap` builtin, but
//! nothing in this crate delivers one, since nothing here receives signals
//! in the first place.

use crate::context::Context;
use rbash_env::semantics::{ExitStatus, Outcome, Result};
use rbash_env::session::Env;
use rbash_env::trap::{Action, Condition};
use std::ops::ControlFlow;

/// Runs the trap installed for `condition`, if any, unless one is already
/// running (`env.in_trap`). Returns the trap body's outcome so a caller
/// that cares about divergence (a trap that itself calls `exit`) can
/// forward it; most call sites only care that `in_trap` was respected.
pub fn fire(condition: &Condition, context: &Context, env: &mut Env) -> Result<Outcome> {
    if env.in_trap {
        return ControlFlow::Continue(Outcome::Done(ExitStatus::SUCCESS));
    }
    let Some(state) = env.traps.get(condition) else {
        return ControlFlow::Continue(Outcome::Done(ExitStatus::SUCCESS));
    };
    let body = match &state.action {
        Action::Command { body, .. } => body.clone(),
        Action::Default | Action::Ignore => {
            return ControlFlow::Continue(Outcome::Done(ExitStatus::SUCCESS))
        }
    };

    env.in_trap = true;
    let outcome = crate::command::list::run(&body, context, env);
    env.in_trap = false;
    outcome
}
