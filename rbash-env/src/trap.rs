//! Trap configuration: `DEBUG`/`ERR`/`EXIT`/named-signal handlers.
//!
//! Grounded on `yash_env::trap`'s `Condition`/`Action`/`TrapSet` shape,
//! narrowed to what `rbash-semantics`'s trap dispatch actually needs:
//! installing a signal disposition with the real OS (`SignalSystem` in the
//! teacher) is out of this workspace's scope, so a condition here is just a
//! lookup key and an action is just a command to run, with no system call
//! plumbing attached.

use rbash_syntax::source::Location;
use rbash_syntax::syntax::List;
use std::collections::HashMap;
use std::rc::Rc;

/// Event a trap can be attached to.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Condition {
    Exit,
    Err,
    Debug,
    /// A signal by its symbolic name, e.g. `"INT"`, `"TERM"`.
    Signal(String),
}

/// What happens when a [`Condition`] fires.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Action {
    /// No trap installed; default disposition applies.
    Default,
    /// `trap '' COND` — the condition is silently ignored.
    Ignore,
    /// `trap 'commands' COND`.
    Command { body: Rc<List>, origin: Location },
}

/// A trap setting together with where it was installed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TrapState {
    pub action: Action,
    pub origin: Location,
}

/// All trap settings for one session.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TrapSet {
    traps: HashMap<Condition, TrapState>,
}

impl TrapSet {
    pub fn get(&self, condition: &Condition) -> std::option::Option<&TrapState> {
        self.traps.get(condition)
    }

    pub fn set(&mut self, condition: Condition, action: Action, origin: Location) {
        self.traps.insert(condition, TrapState { action, origin });
    }

    pub fn unset(&mut self, condition: &Condition) {
        self.traps.remove(condition);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Condition, &TrapState)> {
        self.traps.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_trap_reports_default_by_absence() {
        let traps = TrapSet::default();
        assert!(traps.get(&Condition::Exit).is_none());
    }

    #[test]
    fn setting_then_unsetting_a_trap_removes_it() {
        let mut traps = TrapSet::default();
        traps.set(
            Condition::Debug,
            Action::Command {
                body: Rc::new(List(vec![])),
                origin: Location::dummy(),
            },
            Location::dummy(),
        );
        assert!(traps.get(&Condition::Debug).is_some());
        traps.unset(&Condition::Debug);
        assert!(traps.get(&Condition::Debug).is_none());
    }
}
