//! Condition evaluation for the two test forms bash offers: the POSIX
//! `[ ... ]` command ([`posix_test`], argument-count-driven) and the
//! `[[ ... ]]` extended form ([`extended_test`], a statically parsed
//! [`rbash_syntax::cond::CondExpr`] tree with short-circuit `&&`/`||`).
//!
//! Grounded on `yash_semantics`'s split between the two (the teacher
//! lacks an extended-test builtin of its own; this module's unary/binary
//! primary table is grounded on bash's and ksh's well-known `test(1)`
//! semantics instead, which §4's `CondExpr` variants name directly).

pub mod extended_test;

mod shared;
