//! Shell variables.
//!
//! A [`Variable`] is either a regular value cell or a nameref that forwards
//! reads and writes to another variable. Keeping these as two enum arms
//! (rather than one struct with an optional `nameref_target` field sitting
//! alongside a `value` field) follows design note 4: the two shapes should
//! not be mixable, so there is no state in which a variable has both a
//! value and a nameref target at once.
//!
//! Variable *scoping* here is flat — one name-to-variable map per session —
//! because the `local`/`declare` builtins that would push a nested scope
//! are themselves out of this workspace's scope (they are builtins, and
//! individual builtin implementations are an external collaborator). Only
//! positional parameters get a push/pop stack, since function-call framing
//! of positional parameters is this crate's concern per the simple-command
//! executor's own description, not a builtin's.

use enumset::{EnumSet, EnumSetType};
use indexmap::IndexMap;
use rbash_syntax::source::Location;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// How many nameref hops [`resolve`] will follow before giving up. Matches
/// the cycle-breaking cap named in the data model.
pub const NAMEREF_DEPTH_LIMIT: usize = 10;

/// Boolean attribute of a [`Variable::Value`]. `readonly` is tracked
/// separately as a location (see [`Variable::read_only_location`]) rather
/// than a flag here, since a read-only variable also needs to remember
/// *where* it was made read-only for diagnostics.
#[derive(Debug, EnumSetType)]
pub enum Attribute {
    Export,
    Integer,
    Lowercase,
    Uppercase,
}

/// Shape and content of a variable's value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Value {
    Scalar(String),
    /// Sparse, ordered by index.
    Indexed(BTreeMap<usize, String>),
    /// Ordered by insertion, per [`indexmap`].
    Associative(IndexMap<String, String>),
}

impl Value {
    pub fn scalar(value: impl Into<String>) -> Self {
        Value::Scalar(value.into())
    }

    pub fn array<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Value::Indexed(
            values
                .into_iter()
                .enumerate()
                .map(|(i, v)| (i, v.into()))
                .collect(),
        )
    }

    /// The scalar string bash substitutes for this value in an unsubscripted
    /// expansion: the value itself for a scalar, or element `0` (bash's
    /// `${arr}` == `${arr[0]}` convention) for an array.
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Value::Scalar(s) => Some(s),
            Value::Indexed(map) => map.get(&0).map(String::as_str),
            Value::Associative(map) => map.get("0").map(String::as_str),
        }
    }
}

/// Error produced by an invalid variable assignment.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum AssignError {
    #[error("{name}: readonly variable")]
    ReadOnly { name: String },
}

/// A named shell variable.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Variable {
    Value {
        value: Option<Value>,
        attributes: EnumSet<Attribute>,
        last_assigned_location: Option<Location>,
        read_only_location: Option<Location>,
    },
    /// `declare -n target_name`.
    Nameref {
        target: String,
        location: Location,
    },
}

impl Variable {
    pub fn new(value: impl Into<String>) -> Self {
        Variable::Value {
            value: Some(Value::scalar(value)),
            attributes: EnumSet::empty(),
            last_assigned_location: None,
            read_only_location: None,
        }
    }

    pub fn new_array<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Variable::Value {
            value: Some(Value::array(values)),
            attributes: EnumSet::empty(),
            last_assigned_location: None,
            read_only_location: None,
        }
    }

    pub fn unset() -> Self {
        Variable::Value {
            value: None,
            attributes: EnumSet::empty(),
            last_assigned_location: None,
            read_only_location: None,
        }
    }

    pub fn nameref(target: impl Into<String>, location: Location) -> Self {
        Variable::Nameref {
            target: target.into(),
            location,
        }
    }

    pub fn is_read_only(&self) -> bool {
        match self {
            Variable::Value {
                read_only_location, ..
            } => read_only_location.is_some(),
            Variable::Nameref { .. } => false,
        }
    }

    pub fn is_exported(&self) -> bool {
        match self {
            Variable::Value { attributes, .. } => attributes.contains(Attribute::Export),
            Variable::Nameref { .. } => false,
        }
    }

    #[must_use]
    pub fn export(mut self) -> Self {
        if let Variable::Value { attributes, .. } = &mut self {
            attributes.insert(Attribute::Export);
        }
        self
    }

    #[must_use]
    pub fn make_read_only(mut self, location: Location) -> Self {
        if let Variable::Value {
            read_only_location, ..
        } = &mut self
        {
            *read_only_location = Some(location);
        }
        self
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Variable::Value { value, .. } => value.as_ref(),
            Variable::Nameref { .. } => None,
        }
    }

    /// Assigns a new value, folding case per the `lowercase`/`uppercase`
    /// attributes and rejecting the write if the variable is read-only.
    pub fn assign(
        &mut self,
        name: &str,
        new_value: Value,
        location: Option<Location>,
    ) -> Result<(), AssignError> {
        let Variable::Value {
            value,
            attributes,
            last_assigned_location,
            read_only_location,
        } = self
        else {
            // Assigning through a nameref is resolved by the caller before
            // reaching here; reaching this arm means the caller passed a
            // bare nameref cell directly, which is a logic error in this
            // crate, not a shell-visible one.
            unreachable!("assign target must be resolved past namerefs first")
        };
        if read_only_location.is_some() {
            return Err(AssignError::ReadOnly {
                name: name.to_owned(),
            });
        }
        let folded = fold_case(new_value, *attributes);
        *value = Some(folded);
        *last_assigned_location = location;
        Ok(())
    }
}

fn fold_case(value: Value, attributes: EnumSet<Attribute>) -> Value {
    if !attributes.contains(Attribute::Lowercase) && !attributes.contains(Attribute::Uppercase) {
        return value;
    }
    let fold = |s: String| -> String {
        if attributes.contains(Attribute::Uppercase) {
            s.to_uppercase()
        } else {
            s.to_lowercase()
        }
    };
    match value {
        Value::Scalar(s) => Value::Scalar(fold(s)),
        Value::Indexed(map) => Value::Indexed(map.into_iter().map(|(i, v)| (i, fold(v))).collect()),
        Value::Associative(map) => {
            Value::Associative(map.into_iter().map(|(k, v)| (k, fold(v))).collect())
        }
    }
}

/// Flat name-to-variable table for one session.
pub type VariableSet = HashMap<String, Variable>;

/// Follows nameref links starting at `name`, returning the name of the
/// variable that actually holds (or would hold) the value — itself, if
/// `name` does not name a nameref. Returns `None` if the chain exceeds
/// [`NAMEREF_DEPTH_LIMIT`] hops, which callers should treat as an unset /
/// empty value per the nameref-termination testable property, not as an
/// error.
pub fn resolve_name(vars: &VariableSet, name: &str) -> Option<String> {
    let mut current = name.to_owned();
    for _ in 0..NAMEREF_DEPTH_LIMIT {
        match vars.get(&current) {
            Some(Variable::Nameref { target, .. }) => current = target.clone(),
            Some(Variable::Value { .. }) | None => return Some(current),
        }
    }
    None
}

/// Looks up a variable by name, following namerefs.
pub fn get<'a>(vars: &'a VariableSet, name: &str) -> Option<&'a Variable> {
    let resolved = resolve_name(vars, name)?;
    vars.get(&resolved)
}

/// Looks up a variable for mutation, following namerefs, creating an unset
/// `Value` cell at the resolved name if none exists yet.
pub fn get_or_new<'a>(vars: &'a mut VariableSet, name: &str) -> Option<&'a mut Variable> {
    let resolved = resolve_name(vars, name)?;
    Some(vars.entry(resolved).or_insert_with(Variable::unset))
}
