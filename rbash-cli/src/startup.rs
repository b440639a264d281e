//! Shell startup: turning argv and the process environment into a
//! configured [`Env`] and a source to run.
//!
//! Grounded on `yash-cli`'s `startup` module (`auto_interactive`,
//! `prepare_input`, `configure_environment`), narrowed to this workspace's
//! synchronous, non-interactive scope: there is no `Prompter`/`Echo`
//! input-decorator pipeline here since an interactive line-editing front
//! end is a named non-goal, so a source is read to completion up front
//! rather than streamed line-by-line to a lexer.

pub mod args;

use self::args::{Run, Source};
use rbash_env::session::{Env, PositionalParams};
use rbash_env::variable::Variable;
use rbash_semantics::context::{SpawnOutcome, Spawner};
use rbash_semantics::error::Error;
use rbash_syntax::source::Location;
use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::Path;
use std::process::Stdio;
use thiserror::Error as ThisError;

/// Copies `run`'s parsed options, positional parameters, and `$0` into
/// `env`, mirroring `yash-cli`'s `configure_environment`.
pub fn configure_environment(env: &mut Env, run: &Run, program_name: &str) {
    for &(option, enabled) in &run.options {
        if enabled {
            env.options.insert(option);
        } else {
            env.options.remove(option);
        }
    }
    env.positional_params[0] = PositionalParams {
        values: run.positional_params.clone(),
    };
    env.shell_name = match (&run.shell_name, &run.source) {
        (Some(name), _) => name.clone(),
        (None, Source::File { path }) => path.clone(),
        (None, _) => program_name.to_owned(),
    };
}

/// Imports the process's environment variables as exported scalars, the
/// way a freshly started shell inherits its parent's environment.
pub fn import_environment(env: &mut Env) {
    for (key, value) in std::env::vars() {
        env.variables.insert(key, Variable::new(value).export());
    }
}

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SourceError {
    #[error("cannot open script file '{path}': {message}")]
    CannotOpen { path: String, message: String },
    #[error("cannot read standard input: {message}")]
    CannotReadStdin { message: String },
}

/// A label for diagnostics and for the location attached to the parsed
/// source, mirroring what `yash_syntax::source::Source` names each of
/// [`Source`]'s variants.
pub fn source_name(source: &Source) -> String {
    match source {
        Source::Stdin => "-".to_owned(),
        Source::File { path } => path.clone(),
        Source::String(_) => "-c".to_owned(),
    }
}

/// Reads `source` to completion. Real shells stream stdin through the
/// lexer as it arrives; this workspace's parser collaborator is out of
/// scope (§1), so there is nothing to stream into, and the whole source is
/// read up front instead.
pub fn read_source(source: &Source) -> Result<String, SourceError> {
    match source {
        Source::String(command) => Ok(command.clone()),
        Source::File { path } => std::fs::read_to_string(path).map_err(|e| SourceError::CannotOpen {
            path: path.clone(),
            message: e.to_string(),
        }),
        Source::Stdin => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| SourceError::CannotReadStdin {
                    message: e.to_string(),
                })?;
            Ok(buf)
        }
    }
}

/// Exit status for a source-preparation failure, mirroring `yash-cli`'s own
/// `ENOENT`/`ENOTDIR`/`EILSEQ` → `NOT_FOUND`, everything else → `NOEXEC`
/// mapping.
pub fn source_error_status(error: &SourceError) -> rbash_env::semantics::ExitStatus {
    use rbash_env::semantics::ExitStatus;
    match error {
        SourceError::CannotOpen { .. } => ExitStatus::NOT_FOUND,
        SourceError::CannotReadStdin { .. } => ExitStatus::NOEXEC,
    }
}

pub fn location_for(source: &Source) -> Location {
    Location::new(source_name(source), 1, 1)
}

/// Spawns an external command with a real child process, the one piece of
/// the [`Spawner`] trait `rbash-semantics` leaves abstract (§1's
/// external-process boundary) that the CLI, as the outermost embedder, can
/// give a concrete implementation rather than a [`NullSpawner`](rbash_semantics::context::NullSpawner) stub.
pub struct RealSpawner;

impl Spawner for RealSpawner {
    fn spawn(
        &self,
        argv: &[String],
        env_vars: &HashMap<String, String>,
        working_dir: &Path,
        stdin: &[u8],
    ) -> Result<SpawnOutcome, Error> {
        let Some((program, rest)) = argv.split_first() else {
            return Err(Error::NotFound {
                name: String::new(),
                location: Location::dummy(),
            });
        };

        let mut command = std::process::Command::new(program);
        command
            .args(rest)
            .current_dir(working_dir)
            .env_clear()
            .envs(env_vars)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command.spawn().map_err(|_| Error::NotFound {
            name: program.clone(),
            location: Location::dummy(),
        })?;

        if let Some(mut child_stdin) = child.stdin.take() {
            let _ = child_stdin.write_all(stdin);
        }

        let output = child.wait_with_output().map_err(|_| Error::NotExecutable {
            name: program.clone(),
            location: Location::dummy(),
        })?;

        let status = exit_status_of(&output.status);
        Ok(SpawnOutcome {
            status,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

fn exit_status_of(status: &std::process::ExitStatus) -> rbash_env::semantics::ExitStatus {
    use rbash_env::semantics::ExitStatus;
    if let Some(code) = status.code() {
        return ExitStatus(code);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt as _;
        if let Some(signal) = status.signal() {
            return ExitStatus::from_signal(signal);
        }
    }
    ExitStatus::FAILURE
}
