//! Command-line front end: turns process argv and the environment into a
//! running shell, translating the result back into a process exit code.
//!
//! Grounded on `yash-cli`'s `lib.rs` (`parse_and_print`/`main`), narrowed
//! to this workspace's synchronous scope — no `LocalPool`/`futures_executor`
//! reactor loop, since nothing here is async (see
//! [`rbash_semantics::command`]'s module doc comment for why). The one
//! genuine gap relative to the teacher: §1 puts the lexer/parser that
//! turns source text into a [`rbash_syntax::syntax::List`] out of scope for
//! this workspace, so this crate wires a real [`startup::RealSpawner`] for
//! external commands but can only hand `rbash-semantics` a
//! [`rbash_semantics::context::NullParser`] — every invocation that isn't a
//! hand-built AST fails at the parse step with a clearly reported "no
//! parser is configured" diagnostic rather than silently doing nothing.

pub mod startup;

use rbash_env::io::fd_sink;
use rbash_env::semantics::{ExitStatus, Outcome};
use rbash_env::session::Env;
use rbash_env::trap::Condition;
use rbash_semantics::context::{BuiltinRegistry, Context, NullParser};
use self::startup::args::{self, Parse};
use std::ops::ControlFlow;
use std::process::ExitCode;

/// Entry point used by `src/main.rs`. Public so the binary crate stays a
/// one-line shim, matching the teacher's own `yash_cli::main`/`yash3`
/// split (a thin `main.rs` exists only so `cargo` has a `[[bin]]` target
/// to build).
pub fn run() -> ExitCode {
    init_tracing();

    let mut argv = std::env::args();
    let program = argv.next().unwrap_or_else(|| "rbash".to_owned());

    match args::parse(argv) {
        Ok(Parse::Help) => {
            print_usage(&program);
            ExitCode::SUCCESS
        }
        Ok(Parse::Version) => {
            println!("rbash {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        Ok(Parse::Run(run)) => run_shell(&program, run),
        Err(err) => {
            eprintln!("{program}: {err}");
            tracing::warn!(%err, "argument parsing failed");
            exit_code(ExitStatus::ERROR)
        }
    }
}

fn run_shell(program: &str, run: args::Run) -> ExitCode {
    let mut env = Env::new(fd_sink(), fd_sink());
    startup::import_environment(&mut env);
    startup::configure_environment(&mut env, &run, program);

    let source_text = match startup::read_source(&run.source) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("{program}: {err}");
            tracing::warn!(%err, "could not read source");
            return exit_code(startup::source_error_status(&err));
        }
    };

    let builtins = BuiltinRegistry::new();
    let parser = NullParser;
    let spawner = startup::RealSpawner;
    let context = Context::new(&parser, &spawner, &builtins, program);
    let location = startup::location_for(&run.source);

    let list = match context.parser.parse(&source_text, &location) {
        Ok(list) => list,
        Err(err) => {
            eprint!("{}", err.diagnostic(program));
            tracing::warn!(%err, "parse failed");
            return exit_code(ExitStatus::NOEXEC);
        }
    };

    tracing::debug!(source = %startup::source_name(&run.source), "running script");

    let result = rbash_semantics::command::list::run(&list, &context, &mut env);
    env.exit_status = outcome_status(&result).unwrap_or(env.exit_status);

    if !matches!(result, ControlFlow::Break(rbash_env::semantics::Divert::Abort(_))) {
        let _ = rbash_semantics::trap_dispatch::fire(&Condition::Exit, &context, &mut env);
    }

    exit_code(env.exit_status)
}

fn outcome_status(
    result: &ControlFlow<rbash_env::semantics::Divert, Outcome>,
) -> Option<ExitStatus> {
    match result {
        ControlFlow::Continue(outcome) => outcome.exit_status(),
        ControlFlow::Break(divert) => divert.exit_status(),
    }
}

fn exit_code(status: ExitStatus) -> ExitCode {
    ExitCode::from(clamp_byte(status))
}

/// `ExitStatus` is an unclamped `i32` (matching a raw process exit code);
/// `ExitCode` only holds a `u8`, so anything outside that range is clamped
/// rather than silently truncated (wrapping `300` down to `44` would be a
/// far more confusing exit code than the clamped `255`).
fn clamp_byte(status: ExitStatus) -> u8 {
    status.0.clamp(0, 255) as u8
}

fn print_usage(program: &str) {
    println!(
        "usage: {program} [-o option | +o option | -LETTER | +LETTER]... [script [args...]]\n       {program} -c command [name [args...]]"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use rbash_env::semantics::Divert;

    #[test]
    fn outcome_status_reads_a_completed_outcome() {
        let result = ControlFlow::Continue(Outcome::Done(ExitStatus::FAILURE));
        assert_eq!(outcome_status(&result), Some(ExitStatus::FAILURE));
    }

    #[test]
    fn outcome_status_reads_an_exit_diverts_status() {
        let result: ControlFlow<Divert, Outcome> = ControlFlow::Break(Divert::Exit(Some(ExitStatus(42))));
        assert_eq!(outcome_status(&result), Some(ExitStatus(42)));
    }

    #[test]
    fn exit_code_clamps_to_a_byte() {
        assert_eq!(clamp_byte(ExitStatus(300)), 255);
        assert_eq!(clamp_byte(ExitStatus(-1)), 0);
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    // Silent unless RUST_LOG is set, the same opt-in default any binary
    // built against `tracing-subscriber`'s env-filter feature gets.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}
