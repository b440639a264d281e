//! Open file descriptor table (fd ≥ 3).
//!
//! fds 0-2 are always the session's stdin device / stdout sink / stderr
//! sink and are not entries here; this table only tracks descriptors a
//! redirection or `exec` opened, grounded on `yash_syntax::syntax::Fd`'s
//! representation of a descriptor number paired with `spec.md` §3's
//! `file_descriptors (integer fd ≥ 3 → opened file/device)`.

use rbash_syntax::syntax::Fd;
use std::collections::HashMap;
use std::fs::File;
use std::rc::Rc;

/// What a tracked file descriptor refers to. Actually opening a file is an
/// ordinary blocking syscall this workspace performs directly (no external
/// collaborator is named for "open a file" the way one is for "spawn a
/// process"), so this holds a real `std::fs::File`.
#[derive(Clone, Debug)]
pub enum OpenFile {
    File(Rc<File>),
    /// Duplicated from another descriptor; resolved to the same `File` via
    /// `Rc` rather than a second OS-level dup, since every read/write this
    /// workspace performs against it already goes through the same handle.
    Duplicate(Fd),
}

/// Table of descriptors ≥ 3 open in the current session.
pub type FdTable = HashMap<Fd, OpenFile>;
