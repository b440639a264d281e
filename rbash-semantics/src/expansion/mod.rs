//! Word expansion: turns a [`rbash_syntax::syntax::Word`] into zero or more
//! [`Field`](rbash_env::semantics::Field)s, per the eight-stage pipeline
//! §4.1 specifies. Each stage is its own module, composed by [`word::expand_word`].

pub mod arith;
pub mod brace;
pub mod command_subst;
pub mod glob;
pub mod param;
pub mod process_subst;
pub mod split;
pub mod tilde;
pub mod word;

pub use word::expand_word;

/// One piece of a word's expansion result, carrying whether it came from a
/// quoted or unquoted source. Only `splittable` segments participate in
/// stage 7 (word splitting); quoted segments are glued to their neighbors
/// untouched.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Segment {
    pub text: String,
    pub splittable: bool,
}

impl Segment {
    pub fn quoted(text: impl Into<String>) -> Self {
        Segment {
            text: text.into(),
            splittable: false,
        }
    }

    pub fn unquoted(text: impl Into<String>) -> Self {
        Segment {
            text: text.into(),
            splittable: true,
        }
    }
}
