//! Stage 6: process substitution, `<(cmd)` and `>(cmd)`.
//!
//! A real shell gives `cmd` a FIFO (or `/dev/fd/N` on platforms without
//! named pipes) connected to a concurrently running child process; reading
//! or writing the substituted path streams live with that child. Spawning
//! a concurrent child and wiring a pipe to it is exactly the
//! external-process collaborator §1 puts out of scope (see
//! [`crate::context::Spawner`]), so this crate cannot offer the streaming
//! version.
//!
//! What it offers instead: for `<(cmd)` (read direction), `cmd` is run to
//! completion eagerly, its stdout captured the same way command
//! substitution captures its output, and written to a real temporary file
//! whose path is returned — a consumer that reads the path after this
//! expansion completes sees the same bytes a FIFO would have streamed, it
//! just cannot interleave with `cmd` still running. `>(cmd)` (write
//! direction) has no eager equivalent — nothing has been written yet for
//! `cmd` to consume — so it is reported as unsupported rather than
//! silently producing a path nothing will ever read from.

use crate::context::Context;
use crate::error::{Error, Result};
use rbash_env::io::Collector;
use rbash_env::session::Env;
use rbash_syntax::source::Location;
use rbash_syntax::syntax::{List, ProcessSubstDirection};
use std::io::Write;
use std::rc::Rc;

pub fn expand(
    direction: ProcessSubstDirection,
    command: &Rc<List>,
    location: &Location,
    context: &Context,
    env: &mut Env,
) -> Result<String> {
    match direction {
        ProcessSubstDirection::Out => Err(Error::NotExecutable {
            name: "process substitution (>(...)) is not supported".to_owned(),
            location: location.clone(),
        }),
        ProcessSubstDirection::In => {
            let collector = Collector::new();
            let mut sub_env = env.clone();
            sub_env.stdout_sink = collector.sink();

            let _ = crate::command::list::run(command, context, &mut sub_env);

            let bytes = collector.stdout.borrow();
            let mut file = tempfile::NamedTempFile::new().map_err(|e| Error::Redirect {
                target: "<(...)".to_owned(),
                message: e.to_string(),
                location: location.clone(),
            })?;
            file.write_all(&bytes).map_err(|e| Error::Redirect {
                target: "<(...)".to_owned(),
                message: e.to_string(),
                location: location.clone(),
            })?;
            let path = file.into_temp_path();
            let path = path.keep().map_err(|e| Error::Redirect {
                target: "<(...)".to_owned(),
                message: e.to_string(),
                location: location.clone(),
            })?;
            Ok(path.display().to_string())
        }
    }
}
