//! External collaborators this crate calls out to but does not implement:
//! the lexer/parser, process spawning, and the builtin registry. Bundled
//! into one [`Context`] so every evaluator function threads a single extra
//! parameter rather than three, mirroring the teacher's habit of bundling
//! system-level collaborators behind one `Env`/`System` handle
//! (`yash_env::System`) rather than passing each separately.

use crate::error::Error;
use rbash_env::semantics::{ExitStatus, Field};
use rbash_env::session::Env;
use rbash_syntax::source::Location;
use rbash_syntax::syntax::List;
use std::collections::HashMap;

/// Turns shell source text into a syntax tree. Out of scope for this
/// workspace per §1; command substitution (§4.1 bullet 4) and the CLI's
/// `-c`/script-file entry points are the only callers, and both receive
/// one of these from their embedder rather than this crate providing a
/// real implementation.
pub trait SourceParser {
    fn parse(&self, source: &str, location: &Location) -> Result<List, Error>;
}

/// A parser that always reports parsing as unavailable, used where no real
/// parser has been wired in (e.g. a test that never exercises command
/// substitution, or a minimal embedding that only runs hand-built ASTs).
pub struct NullParser;

impl SourceParser for NullParser {
    fn parse(&self, _source: &str, location: &Location) -> Result<List, Error> {
        Err(Error::Syntax {
            message: "no parser is configured for command substitution".to_owned(),
            location: location.clone(),
        })
    }
}

/// Spawns an external command and waits for it to finish. Out of scope for
/// this workspace per §1 ("external-process spawning"); the simple-command
/// executor (§4.5 step 8), pipelines' external-stage runs, and process
/// substitution all go through this instead of calling `std::process`
/// directly, so a caller can substitute a real implementation, a sandboxed
/// one, or (in tests) a scripted fake.
pub trait Spawner {
    /// Runs `argv[0]` with the rest of `argv` as arguments and `env_vars` as
    /// its exported environment, feeding it `stdin` and returning its
    /// captured stdout/stderr and exit status.
    fn spawn(
        &self,
        argv: &[String],
        env_vars: &HashMap<String, String>,
        working_dir: &std::path::Path,
        stdin: &[u8],
    ) -> Result<SpawnOutcome, Error>;
}

pub struct SpawnOutcome {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// A spawner that reports every command as not found, used where no real
/// process-spawning collaborator has been wired in.
pub struct NullSpawner;

impl Spawner for NullSpawner {
    fn spawn(
        &self,
        argv: &[String],
        _env_vars: &HashMap<String, String>,
        _working_dir: &std::path::Path,
        _stdin: &[u8],
    ) -> Result<SpawnOutcome, Error> {
        Err(Error::NotFound {
            name: argv.first().cloned().unwrap_or_default(),
            location: Location::dummy(),
        })
    }
}

/// Signature a builtin implementation must have. Individual builtins
/// (`echo`, `cd`, `declare`, ...) are out of scope per §1; this crate only
/// defines the function-pointer shape and dispatch order (§4.5 step 7),
/// grounded on `yash_env::builtin`'s `Main` function-pointer pattern.
pub type BuiltinFn = fn(args: &[Field], env: &Env) -> crate::command::simple::BuiltinResult;

/// Name-to-implementation table the simple-command executor consults
/// between user functions and external commands.
pub type BuiltinRegistry = HashMap<&'static str, BuiltinFn>;

/// Bundle of external collaborators threaded through every evaluator entry
/// point that might need one.
pub struct Context<'a> {
    pub parser: &'a dyn SourceParser,
    pub spawner: &'a dyn Spawner,
    pub builtins: &'a BuiltinRegistry,
    /// Program name prefixed to diagnostics, per §7's "short program label".
    pub program_name: &'a str,
}

impl<'a> Context<'a> {
    pub fn new(
        parser: &'a dyn SourceParser,
        spawner: &'a dyn Spawner,
        builtins: &'a BuiltinRegistry,
        program_name: &'a str,
    ) -> Self {
        Context {
            parser,
            spawner,
            builtins,
            program_name,
        }
    }
}
