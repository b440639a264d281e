//! Tree-walking evaluator for the rbash shell interpreter: turns
//! [`rbash_syntax::syntax`] nodes into effects against an
//! [`rbash_env::session::Env`] — expansion, redirection, trap/xtrace
//! bookkeeping, and the command forms themselves, down to dispatching a
//! simple command's name to a function, builtin, or external program.
//!
//! Grounded on `yash_semantics`'s module layout: one crate covering both
//! expansion and command execution, since in this workspace (as in the
//! teacher's) the two are mutually recursive — a command substitution
//! inside a word's expansion runs a nested command list, and a command's
//! arguments are themselves expanded words.

pub mod command;
pub mod context;
pub mod error;
pub mod expansion;
pub mod redir;
pub mod test_engine;
pub mod trap_dispatch;
pub mod traversal;
pub mod xtrace;

pub use command::Execute;
pub use error::{Error, Result};
