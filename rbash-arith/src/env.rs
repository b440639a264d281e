//! Variable environment used during evaluation.

use std::collections::HashMap;
use std::convert::Infallible;

/// Interface for accessing variables during evaluation.
///
/// This crate does not implement variable storage itself: the caller of
/// [`crate::eval`] supplies an implementation, which lets the same evaluator
/// run against a full shell session or a bare `HashMap` in tests.
pub trait Env {
    /// Error produced when an assignment cannot be performed, e.g. because
    /// the variable is read-only.
    type AssignError;

    /// Returns the current value of `name`, or `None` if it is unset.
    ///
    /// Implementations do not need to validate that the value parses as an
    /// integer; [`crate::eval`] treats an unparsable value as `0`.
    fn get(&self, name: &str) -> Option<String>;

    /// Assigns `value` to `name`.
    fn assign(&mut self, name: &str, value: i64) -> Result<(), Self::AssignError>;
}

impl Env for HashMap<String, String> {
    type AssignError = Infallible;

    fn get(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }

    fn assign(&mut self, name: &str, value: i64) -> Result<(), Infallible> {
        self.insert(name.to_owned(), value.to_string());
        Ok(())
    }
}
