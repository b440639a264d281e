//! Shell function definitions.
//!
//! Grounded on `yash_env::function::Function`, simplified: the teacher
//! stores a boxed `FunctionBody` trait object so a function body can be any
//! executable thing (including, upstream, built-ins defined as functions at
//! compile time). This workspace only ever executes a function body by
//! walking its `FullCompoundCommand` with `rbash-semantics`, so the body is
//! stored directly as that AST node rather than behind a trait object.

use rbash_syntax::source::Location;
use rbash_syntax::syntax::FullCompoundCommand;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Clone, Debug)]
pub struct Function {
    pub name: String,
    /// Shared with the `FunctionDefinition` AST node that defined it, so
    /// redefining a function elsewhere does not need to clone the body.
    pub body: Rc<FullCompoundCommand>,
    pub origin: Location,
    pub read_only_location: Option<Location>,
}

impl Function {
    pub fn new(name: impl Into<String>, body: Rc<FullCompoundCommand>, origin: Location) -> Self {
        Function {
            name: name.into(),
            body,
            origin,
            read_only_location: None,
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only_location.is_some()
    }

    #[must_use]
    pub fn make_read_only(mut self, location: Location) -> Self {
        self.read_only_location = Some(location);
        self
    }
}

/// Name-to-function table for one session.
pub type FunctionSet = HashMap<String, Function>;
