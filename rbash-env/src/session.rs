//! Session state: the `Env` the whole interpreter threads through
//! evaluation, and the `StateDelta` each statement produces instead of
//! mutating `Env` directly (design note 3).

use crate::fd::{FdTable, OpenFile};
use crate::function::FunctionSet;
use crate::hash::{CommandHash, HashEntry as CommandHashEntry};
use crate::io::{Sink, StreamTag};
use crate::job::JobSet;
use crate::option::{self, OptionSet};
use crate::semantics::ExitStatus;
use crate::trap::TrapSet;
use crate::variable::{self, Variable, VariableSet};
use rbash_syntax::alias::{AliasSet, HashEntry as AliasHashEntry};
use rbash_syntax::syntax::Fd;
use std::collections::HashMap;
use std::path::PathBuf;

/// One function call's worth of positional parameters (`$1`, `$2`, ...).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PositionalParams {
    pub values: Vec<String>,
}

/// The full state an evaluator reads and, via [`StateDelta`], writes.
///
/// Grounded on `spec.md` §3's session-state field list and on the
/// teacher's `yash_env::Env` as the aggregate-struct-of-subsystems
/// pattern, simplified throughout to the flat (non-async, non-scoped
/// beyond positional parameters) shapes `rbash-env`'s other modules define.
///
/// `Clone` backs the subshell-isolation and word-expansion-staging
/// patterns: a subshell clones `Env`, runs against the clone, and discards
/// it; word expansion clones `Env` once per word and threads successive
/// stages' deltas through the clone so later parts see earlier effects,
/// without ever mutating the caller's canonical `Env` until it chooses to
/// merge.
#[derive(Clone)]
pub struct Env {
    pub variables: VariableSet,
    pub functions: FunctionSet,
    pub aliases: AliasSet,
    pub options: OptionSet,
    pub working_dir: PathBuf,
    /// Stack of positional-parameter frames; `[0]` is the script's own
    /// arguments, pushed deeper on each function call.
    pub positional_params: Vec<PositionalParams>,
    pub file_descriptors: FdTable,
    pub hash: CommandHash,
    pub jobs: JobSet,
    pub current_job: Option<usize>,
    pub stdout_sink: Sink,
    pub stderr_sink: Sink,
    pub traps: TrapSet,
    pub loop_depth: usize,
    pub in_trap: bool,
    /// `$?`
    pub exit_status: ExitStatus,
    /// `$$`
    pub pid: libc::pid_t,
    /// `$0`
    pub shell_name: String,
}

impl Env {
    pub fn new(stdout_sink: Sink, stderr_sink: Sink) -> Self {
        Env {
            variables: VariableSet::new(),
            functions: FunctionSet::new(),
            aliases: AliasSet::new(),
            options: option::defaults(),
            working_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/")),
            positional_params: vec![PositionalParams::default()],
            file_descriptors: FdTable::new(),
            hash: CommandHash::new(),
            jobs: JobSet::default(),
            current_job: None,
            stdout_sink,
            stderr_sink,
            traps: TrapSet::default(),
            loop_depth: 0,
            in_trap: false,
            exit_status: ExitStatus::SUCCESS,
            pid: std::process::id() as libc::pid_t,
            shell_name: "rbash".to_owned(),
        }
    }

    pub fn write(&self, tag: StreamTag, bytes: &[u8]) {
        match tag {
            StreamTag::Stdout => (self.stdout_sink)(tag, bytes),
            StreamTag::Stderr => (self.stderr_sink)(tag, bytes),
        }
    }

    pub fn get_variable(&self, name: &str) -> Option<&Variable> {
        variable::get(&self.variables, name)
    }

    pub fn current_positional_params(&self) -> &[String] {
        self.positional_params
            .last()
            .map(|p| p.values.as_slice())
            .unwrap_or(&[])
    }

    pub fn push_positional_params(&mut self, values: Vec<String>) {
        self.positional_params.push(PositionalParams { values });
    }

    pub fn pop_positional_params(&mut self) {
        if self.positional_params.len() > 1 {
            self.positional_params.pop();
        }
    }
}

/// Set of state changes produced by evaluating one statement, merged into
/// the caller's canonical `Env` at well-defined boundaries. Deltas merge in
/// the order they were produced, later writes winning per key, per the
/// delta-additivity testable property.
#[derive(Clone, Default)]
pub struct StateDelta {
    /// Plain string updates, for the common case of a variable assignment
    /// that does not also change attributes or shape.
    pub env_updates: HashMap<String, String>,
    /// Full variable updates (attributes, array shape, readonly, ...).
    pub var_updates: HashMap<String, Variable>,
    pub working_dir: Option<PathBuf>,
    pub hash_updates: HashMap<String, CommandHashEntry>,
    pub alias_updates: Vec<AliasHashEntry>,
    /// `None` entries close the descriptor.
    pub file_descriptors: HashMap<Fd, Option<OpenFile>>,
}

impl StateDelta {
    /// Combines two deltas produced in sequence into one with the same
    /// observable effect as applying `self` then `other`, `other`'s writes
    /// winning per key. Used where a multi-stage operation (word expansion,
    /// a `List` of statements run against a cloned `Env`) needs to hand its
    /// caller a single delta summarizing every stage's effect.
    #[must_use]
    pub fn merge(mut self, other: StateDelta) -> StateDelta {
        self.env_updates.extend(other.env_updates);
        self.var_updates.extend(other.var_updates);
        if other.working_dir.is_some() {
            self.working_dir = other.working_dir;
        }
        self.hash_updates.extend(other.hash_updates);
        self.alias_updates.extend(other.alias_updates);
        self.file_descriptors.extend(other.file_descriptors);
        self
    }

    pub fn merge_into(self, env: &mut Env) {
        for (name, value) in self.env_updates {
            env.variables.insert(name, Variable::new(value));
        }
        for (name, variable) in self.var_updates {
            env.variables.insert(name, variable);
        }
        if let Some(dir) = self.working_dir {
            env.working_dir = dir;
        }
        env.hash.extend(self.hash_updates);
        for entry in self.alias_updates {
            env.aliases.replace(entry);
        }
        for (fd, open_file) in self.file_descriptors {
            match open_file {
                Some(file) => {
                    env.file_descriptors.insert(fd, file);
                }
                None => {
                    env.file_descriptors.remove(&fd);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::Collector;
    use crate::variable::Value;

    fn test_env() -> Env {
        let collector = Collector::new();
        Env::new(collector.sink(), collector.sink())
    }

    #[test]
    fn delta_merge_applies_variable_updates() {
        let mut env = test_env();
        let mut delta = StateDelta::default();
        delta
            .var_updates
            .insert("x".to_owned(), Variable::new("5"));
        delta.merge_into(&mut env);
        assert_eq!(
            env.get_variable("x").unwrap().value(),
            Some(&Value::scalar("5"))
        );
    }

    #[test]
    fn delta_additivity_holds_across_two_statements() {
        // x=3; y=$((x+2)) applied as two deltas should match applying both
        // updates in one merge.
        let mut sequential = test_env();
        let mut d1 = StateDelta::default();
        d1.var_updates.insert("x".to_owned(), Variable::new("3"));
        d1.merge_into(&mut sequential);
        let mut d2 = StateDelta::default();
        d2.var_updates.insert("y".to_owned(), Variable::new("5"));
        d2.merge_into(&mut sequential);

        let mut combined = test_env();
        let mut d = StateDelta::default();
        d.var_updates.insert("x".to_owned(), Variable::new("3"));
        d.var_updates.insert("y".to_owned(), Variable::new("5"));
        d.merge_into(&mut combined);

        assert_eq!(
            sequential.get_variable("x").unwrap().value(),
            combined.get_variable("x").unwrap().value()
        );
        assert_eq!(
            sequential.get_variable("y").unwrap().value(),
            combined.get_variable("y").unwrap().value()
        );
    }

    #[test]
    fn positional_params_push_and_pop_restore_previous_frame() {
        let mut env = test_env();
        env.push_positional_params(vec!["a".to_owned()]);
        assert_eq!(env.current_positional_params(), &["a".to_owned()]);
        env.pop_positional_params();
        assert!(env.current_positional_params().is_empty());
    }
}
