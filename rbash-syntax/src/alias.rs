//! Alias definitions.
//!
//! Alias substitution itself happens in the lexer, which is out of scope for
//! this crate. This module only defines the data the session state holds so
//! that the `alias`/`unalias` builtins (also out of scope) have somewhere to
//! read and write.

use crate::source::Location;
use std::borrow::Borrow;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Name-value pair that defines an alias.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Alias {
    /// Name matched against the first word of a command.
    pub name: String,
    /// Text substituted in place of the matched word.
    pub replacement: String,
    /// Whether this is a global alias (substitutable anywhere, not just in
    /// command position).
    pub global: bool,
    /// Where the alias was defined.
    pub origin: Location,
}

/// Wrapper so [`Alias`]es can be kept in a [`HashSet`] keyed by name alone.
///
/// The alias is reference-counted so a snapshot (e.g. a subshell's cloned
/// state) can keep referring to a definition after the original set is
/// mutated or dropped.
#[derive(Clone, Debug, Eq)]
pub struct HashEntry(pub Rc<Alias>);

impl HashEntry {
    pub fn new(name: String, replacement: String, global: bool, origin: Location) -> HashEntry {
        HashEntry(Rc::new(Alias {
            name,
            replacement,
            global,
            origin,
        }))
    }
}

impl PartialEq for HashEntry {
    fn eq(&self, other: &HashEntry) -> bool {
        self.0.name == other.0.name
    }
}

impl Hash for HashEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.name.hash(state)
    }
}

impl Borrow<str> for HashEntry {
    fn borrow(&self) -> &str {
        &self.0.name
    }
}

/// Collection of aliases known to a session.
pub type AliasSet = HashSet<HashEntry>;
