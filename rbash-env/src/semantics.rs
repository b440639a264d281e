//! Types for command execution results.
//!
//! Non-local control flow (`break`/`continue`/`return`/`exit`) is modeled as
//! a discriminated [`Divert`] value carried by [`std::ops::ControlFlow`]
//! rather than as a host-language exception, per the design note that every
//! intervening construct must pattern-match and selectively forward these
//! outcomes instead of letting them unwind past constructs that need to
//! react to them (loops absorbing `break`, functions absorbing `return`).

use rbash_syntax::source::Location;
use std::ops::ControlFlow;

/// A string produced by word expansion, together with the word it came
/// from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Field {
    pub value: String,
    pub origin: Location,
}

impl Field {
    pub fn dummy(value: impl Into<String>) -> Field {
        let value = value.into();
        Field {
            origin: Location::dummy(),
            value,
        }
    }

    pub fn dummies<I, S>(values: I) -> Vec<Field>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        values.into_iter().map(Field::dummy).collect()
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.value.fmt(f)
    }
}

/// Exit status of a command, in `0..=255` by convention though not
/// enforced at the type level (mirrors raw process exit statuses, which
/// can technically be any `i32`).
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ExitStatus(pub i32);

impl ExitStatus {
    pub const SUCCESS: ExitStatus = ExitStatus(0);
    pub const FAILURE: ExitStatus = ExitStatus(1);
    pub const ERROR: ExitStatus = ExitStatus(2);
    pub const NOEXEC: ExitStatus = ExitStatus(126);
    pub const NOT_FOUND: ExitStatus = ExitStatus(127);

    pub const fn is_successful(self) -> bool {
        self.0 == 0
    }

    /// Exit status bash reports for termination by signal `n`: `128 + n`.
    pub const fn from_signal(signal_number: i32) -> ExitStatus {
        ExitStatus(128 + signal_number)
    }
}

impl From<i32> for ExitStatus {
    fn from(value: i32) -> Self {
        ExitStatus(value)
    }
}

impl From<ExitStatus> for i32 {
    fn from(status: ExitStatus) -> Self {
        status.0
    }
}

impl std::fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Outcome of interrupted command execution, ordered by severity (a
/// construct that must re-raise the more severe of two diverts, e.g. when
/// both a trap and the command it ran during diverge, picks the greater).
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Divert {
    /// Continue the loop `count` levels further out (`0` = innermost).
    Continue { count: usize },
    /// Break the loop `count` levels further out (`0` = innermost).
    Break { count: usize },
    /// Return from the current function or script.
    Return(Option<ExitStatus>),
    /// Exit the shell after running the EXIT trap, if any.
    Exit(Option<ExitStatus>),
    /// Exit the shell immediately, without running the EXIT trap.
    Abort(Option<ExitStatus>),
}

impl Divert {
    /// The exit status carried by `Return`, `Exit`, or `Abort`; `None` for
    /// loop-control diverts, which do not terminate anything that has an
    /// exit status of its own.
    pub fn exit_status(&self) -> Option<ExitStatus> {
        match self {
            Divert::Continue { .. } | Divert::Break { .. } => None,
            Divert::Return(s) | Divert::Exit(s) | Divert::Abort(s) => *s,
        }
    }
}

/// Result of evaluating a command or expression: either it completed
/// (possibly with a value), or execution diverted out of it.
pub type Result<T = ()> = ControlFlow<Divert, T>;

/// Outcome of evaluating a pipeline or and-or list, distinguishing a
/// completed foreground result from a backgrounded job. `ControlFlow` only
/// has two arms and backgrounding is neither an error nor a loop-control
/// divert, so it is carried alongside rather than folded into [`Divert`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    Done(ExitStatus),
    Diverted(Divert),
    /// The preceding pipeline was detached with a trailing `&`; its job ID
    /// is recorded in the session job list.
    Background(usize),
}

impl Outcome {
    pub fn exit_status(&self) -> Option<ExitStatus> {
        match self {
            Outcome::Done(status) => Some(*status),
            Outcome::Diverted(divert) => divert.exit_status(),
            Outcome::Background(_) => Some(ExitStatus::SUCCESS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divert_ordering_places_abort_above_continue() {
        assert!(Divert::Abort(None) > Divert::Continue { count: 0 });
    }

    #[test]
    fn exit_status_from_signal_adds_128() {
        assert_eq!(ExitStatus::from_signal(9), ExitStatus(137));
    }
}
