//! Command-name → path hash table (`hash` builtin's backing store, and the
//! simple-command executor's PATH search cache).

use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HashEntry {
    pub path: PathBuf,
    pub hit_count: u32,
}

pub type CommandHash = HashMap<String, HashEntry>;
