//! Redirection manager: resolves a simple command's `Vec<Redir>` into
//! substituted sinks/effective stdin, and undoes the substitution
//! afterward.
//!
//! Grounded on `yash_semantics::redir`, narrowed to the sink-substitution
//! model design note 5 establishes (no real file descriptor table for fds
//! 0-2; only `Sink` swapping). File-target redirects (`>`, `>>`, `<`, ...)
//! are applied before descriptor duplications (`>&`, `<&`), per §4.4, so
//! `cmd >f 2>&1` makes fd 2 follow fd 1 to `f` rather than the reverse.
//! There is no dedicated `&>`/`&>>` AST node — the grammar that would
//! produce one is assumed to already have lowered it to an equivalent
//! `>file` plus `n>&m` pair by the time a [`Redir`] reaches here, so this
//! module needs no special case for it; a stray redirect to `/dev/stdin`-
//! style descriptors wired by hand is outside what §1's out-of-scope
//! parser would ever hand this crate.
//!
//! Restoration is an explicit, unconditional call ([`RedirGuard::restore`])
//! rather than a `Drop` impl, matching the teacher's preference for
//! explicit restore points where ordering against trap/xtrace output
//! matters (§5's ordering guarantee).

use crate::context::Context;
use crate::error::{Error, Result};
use crate::expansion::param::expand_text;
use rbash_env::io::{Sink, StreamTag};
use rbash_env::session::Env;
use rbash_syntax::syntax::{Fd, Redir, RedirBody, RedirOp, TextUnit, Word, WordUnit};
use std::cell::RefCell;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::rc::Rc;

/// Saved session state to restore once a command finishes, plus whatever
/// bytes an input redirection collected for the external-spawner's
/// `stdin` parameter ([`crate::context::Spawner::spawn`]) — the only
/// consumer of redirected stdin this workspace has, since [`crate::context::BuiltinFn`]
/// takes no stdin parameter at all.
pub struct RedirGuard {
    saved_stdout: Sink,
    saved_stderr: Sink,
}

/// Installs `redirs` against `env`, returning a guard to undo them and
/// the bytes an input redirection (file, heredoc, or herestring) made
/// available, if any.
pub fn install(redirs: &[Redir], context: &Context, env: &mut Env) -> Result<(RedirGuard, Vec<u8>)> {
    let guard = RedirGuard {
        saved_stdout: Rc::clone(&env.stdout_sink),
        saved_stderr: Rc::clone(&env.stderr_sink),
    };
    let mut stdin_bytes = Vec::new();

    let (file_targets, fd_dups): (Vec<&Redir>, Vec<&Redir>) = redirs
        .iter()
        .partition(|r| !matches!(&r.body, RedirBody::Normal { operator: RedirOp::FdIn | RedirOp::FdOut, .. }));

    for redir in file_targets {
        apply_file_target(redir, context, env, &mut stdin_bytes)?;
    }
    for redir in fd_dups {
        apply_fd_dup(redir, context, env)?;
    }

    Ok((guard, stdin_bytes))
}

impl RedirGuard {
    /// Unconditionally restores the stdout/stderr sinks a command's
    /// redirections replaced.
    pub fn restore(self, env: &mut Env) {
        env.stdout_sink = self.saved_stdout;
        env.stderr_sink = self.saved_stderr;
    }
}

fn open_error(target: &str, e: std::io::Error, location: &rbash_syntax::source::Location) -> Error {
    Error::Redirect {
        target: target.to_owned(),
        message: e.to_string(),
        location: location.clone(),
    }
}

fn file_sink(file: File) -> Sink {
    let file = Rc::new(RefCell::new(file));
    Rc::new(move |_tag, bytes| {
        let _ = file.borrow_mut().write_all(bytes);
    })
}

fn expand_operand(operand: &rbash_syntax::syntax::Word, context: &Context, env: &mut Env) -> Result<String> {
    let mut delta = rbash_env::session::StateDelta::default();
    let fields = crate::expansion::word::expand_word(operand, context, env, &mut delta)?;
    delta.merge_into(env);
    Ok(fields.into_iter().map(|f| f.value).collect::<Vec<_>>().join(" "))
}

/// Whether `delimiter` (`<<EOF` vs `<<'EOF'`/`<<\EOF`) disables expansion
/// of the heredoc body, per §4.4: quoted iff any unit of the delimiter
/// word is itself a quote or a backslash escape.
fn delimiter_is_quoted(delimiter: &Word) -> bool {
    delimiter.units.iter().any(|unit| {
        matches!(
            unit,
            WordUnit::SingleQuote(_) | WordUnit::DoubleQuote(_) | WordUnit::DollarSingleQuote(_)
        ) || matches!(unit, WordUnit::Unquoted(TextUnit::Backslashed(_)))
    })
}

fn apply_file_target(
    redir: &Redir,
    context: &Context,
    env: &mut Env,
    stdin_bytes: &mut Vec<u8>,
) -> Result<()> {
    let fd = redir.fd_or_default();
    match &redir.body {
        RedirBody::HereDoc(here_doc) => {
            let content = match here_doc.content.get() {
                Some(text) if delimiter_is_quoted(&here_doc.delimiter) => text.to_string(),
                Some(text) => {
                    let mut delta = rbash_env::session::StateDelta::default();
                    let expanded = expand_text(text, context, env, &mut delta)?;
                    delta.merge_into(env);
                    expanded
                }
                None => String::new(),
            };
            let content = if here_doc.remove_tabs {
                content
                    .lines()
                    .map(|line| line.trim_start_matches('\t'))
                    .collect::<Vec<_>>()
                    .join("\n")
                    + if content.ends_with('\n') { "\n" } else { "" }
            } else {
                content
            };
            stdin_bytes.extend_from_slice(content.as_bytes());
            Ok(())
        }
        RedirBody::Normal { operator, operand } => {
            let location = operand.location.clone();
            let path = expand_operand(operand, context, env)?;
            match operator {
                RedirOp::String => {
                    stdin_bytes.extend_from_slice(path.as_bytes());
                    stdin_bytes.push(b'\n');
                    Ok(())
                }
                RedirOp::FileIn | RedirOp::FileInOut => {
                    let mut opts = OpenOptions::new();
                    opts.read(true);
                    if matches!(operator, RedirOp::FileInOut) {
                        opts.write(true).create(true);
                    }
                    let mut file = opts
                        .open(&path)
                        .map_err(|e| open_error(&path, e, &location))?;
                    let mut buf = Vec::new();
                    let _ = file.read_to_end(&mut buf);
                    stdin_bytes.extend_from_slice(&buf);
                    Ok(())
                }
                RedirOp::FileOut | RedirOp::FileAppend | RedirOp::FileClobber => {
                    if matches!(operator, RedirOp::FileOut)
                        && env.options.contains(rbash_env::option::Option::NoClobber)
                        && std::path::Path::new(&path).exists()
                    {
                        return Err(Error::Redirect {
                            target: path,
                            message: "cannot overwrite existing file (noclobber)".to_owned(),
                            location,
                        });
                    }
                    let file = OpenOptions::new()
                        .write(true)
                        .create(true)
                        .append(matches!(operator, RedirOp::FileAppend))
                        .truncate(!matches!(operator, RedirOp::FileAppend))
                        .open(&path)
                        .map_err(|e| open_error(&path, e, &location))?;
                    install_output_target(fd, file, env);
                    Ok(())
                }
                RedirOp::FdIn | RedirOp::FdOut => unreachable!("partitioned out"),
            }
        }
    }
}

/// Installs a newly opened file as the target of `fd`: a [`Sink`] for the
/// two standard streams this crate actually writes through, or a tracked
/// entry in `file_descriptors` for anything else (`>&3`'s target, an
/// `exec`-installed descriptor, ...), matching `spec.md`'s
/// `file_descriptors (integer fd ≥ 3 → opened file/device)`.
fn install_output_target(fd: Fd, file: File, env: &mut Env) {
    match fd {
        Fd::STDOUT => env.stdout_sink = file_sink(file),
        Fd::STDERR => env.stderr_sink = file_sink(file),
        other => {
            env.file_descriptors
                .insert(other, rbash_env::fd::OpenFile::File(Rc::new(file)));
        }
    }
}

/// Installs `sink` as `fd`'s target, for fd-duplication redirects
/// (`>&1`), which only ever target the two standard streams this crate's
/// sink abstraction covers — duplicating onto a tracked `file_descriptors`
/// entry would need a second open handle on the same file, which this
/// workspace's [`rbash_env::fd::OpenFile::Duplicate`] represents but this
/// redirect path does not yet wire up.
fn install_output_sink(fd: Fd, sink: Sink, env: &mut Env) {
    match fd {
        Fd::STDOUT => env.stdout_sink = sink,
        Fd::STDERR => env.stderr_sink = sink,
        _ => {}
    }
}

fn apply_fd_dup(redir: &Redir, context: &Context, env: &mut Env) -> Result<()> {
    let RedirBody::Normal { operator, operand } = &redir.body else {
        return Ok(());
    };
    let fd = redir.fd_or_default();
    let location = operand.location.clone();
    let target = expand_operand(operand, context, env)?;

    if target == "-" {
        match fd {
            Fd::STDOUT => env.stdout_sink = Rc::new(|_, _| {}),
            Fd::STDERR => env.stderr_sink = Rc::new(|_, _| {}),
            other => {
                env.file_descriptors.remove(&other);
            }
        }
        return Ok(());
    }

    let target_fd: i32 = target.parse().map_err(|_| Error::Redirect {
        target: target.clone(),
        message: "not a file descriptor number".to_owned(),
        location: location.clone(),
    })?;

    match operator {
        RedirOp::FdOut => {
            let source = match target_fd {
                1 => Rc::clone(&env.stdout_sink),
                2 => Rc::clone(&env.stderr_sink),
                _ => {
                    return Err(Error::Redirect {
                        target,
                        message: "duplicating a non-standard descriptor is not supported"
                            .to_owned(),
                        location,
                    })
                }
            };
            install_output_sink(fd, source, env);
            Ok(())
        }
        RedirOp::FdIn => Ok(()),
        _ => unreachable!("only Fd* operators reach apply_fd_dup"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{BuiltinRegistry, Context, NullParser, NullSpawner};
    use rbash_env::io::Collector;
    use rbash_syntax::syntax::Word;
    use tempfile::tempdir;

    fn test_env() -> Env {
        let collector = Collector::new();
        Env::new(collector.sink(), collector.sink())
    }

    #[test]
    fn output_redirect_to_a_file_replaces_the_stdout_sink() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let mut env = test_env();
        let builtins = BuiltinRegistry::new();
        let context = Context::new(&NullParser, &NullSpawner, &builtins, "rbash");
        let redirs = vec![Redir {
            fd: None,
            body: RedirBody::Normal {
                operator: RedirOp::FileOut,
                operand: Word::from_literal(path.to_str().unwrap()),
            },
        }];
        let (guard, _) = install(&redirs, &context, &mut env).unwrap();
        env.write(StreamTag::Stdout, b"hello");
        guard.restore(&mut env);
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "hello");
    }

    #[test]
    fn noclobber_rejects_an_existing_target() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.txt");
        std::fs::write(&path, b"old").unwrap();
        let mut env = test_env();
        env.options.insert(rbash_env::option::Option::NoClobber);
        let builtins = BuiltinRegistry::new();
        let context = Context::new(&NullParser, &NullSpawner, &builtins, "rbash");
        let redirs = vec![Redir {
            fd: None,
            body: RedirBody::Normal {
                operator: RedirOp::FileOut,
                operand: Word::from_literal(path.to_str().unwrap()),
            },
        }];
        assert!(install(&redirs, &context, &mut env).is_err());
    }

    #[test]
    fn herestring_appends_a_trailing_newline() {
        let mut env = test_env();
        let builtins = BuiltinRegistry::new();
        let context = Context::new(&NullParser, &NullSpawner, &builtins, "rbash");
        let redirs = vec![Redir {
            fd: None,
            body: RedirBody::Normal {
                operator: RedirOp::String,
                operand: Word::from_literal("hi"),
            },
        }];
        let (_guard, stdin) = install(&redirs, &context, &mut env).unwrap();
        assert_eq!(stdin, b"hi\n");
    }

    fn heredoc_with(content: rbash_syntax::syntax::Text, delimiter: Word) -> rbash_syntax::syntax::HereDoc {
        let here_doc = rbash_syntax::syntax::HereDoc {
            delimiter,
            remove_tabs: false,
            content: std::cell::OnceCell::new(),
        };
        here_doc.content.set(content).unwrap();
        here_doc
    }

    #[test]
    fn an_unquoted_delimiter_expands_the_heredoc_body() {
        use rbash_syntax::syntax::{Param, ParamType, Text, TextUnit};

        let mut env = test_env();
        env.variables.insert(
            "name".to_owned(),
            rbash_env::variable::Variable::new("world"),
        );
        let builtins = BuiltinRegistry::new();
        let context = Context::new(&NullParser, &NullSpawner, &builtins, "rbash");
        let content = Text(vec![
            TextUnit::Literal('h'),
            TextUnit::Literal('i'),
            TextUnit::Literal(' '),
            TextUnit::RawParam {
                param: Param {
                    id: "name".to_owned(),
                    r#type: ParamType::Variable,
                },
                location: rbash_syntax::source::Location::dummy(),
            },
            TextUnit::Literal('\n'),
        ]);
        let here_doc = heredoc_with(content, Word::from_literal("EOF"));
        let redirs = vec![Redir {
            fd: None,
            body: RedirBody::HereDoc(here_doc),
        }];
        let (_guard, stdin) = install(&redirs, &context, &mut env).unwrap();
        assert_eq!(stdin, b"hi world\n");
    }

    #[test]
    fn a_quoted_delimiter_suppresses_heredoc_expansion() {
        use rbash_syntax::syntax::{Param, ParamType, Text, TextUnit};

        let mut env = test_env();
        env.variables.insert(
            "name".to_owned(),
            rbash_env::variable::Variable::new("world"),
        );
        let builtins = BuiltinRegistry::new();
        let context = Context::new(&NullParser, &NullSpawner, &builtins, "rbash");
        let content = Text(vec![
            TextUnit::Literal('h'),
            TextUnit::Literal('i'),
            TextUnit::Literal(' '),
            TextUnit::RawParam {
                param: Param {
                    id: "name".to_owned(),
                    r#type: ParamType::Variable,
                },
                location: rbash_syntax::source::Location::dummy(),
            },
            TextUnit::Literal('\n'),
        ]);
        let quoted_delimiter = Word {
            units: vec![WordUnit::SingleQuote("EOF".to_owned())],
            location: rbash_syntax::source::Location::dummy(),
        };
        let here_doc = heredoc_with(content, quoted_delimiter);
        let redirs = vec![Redir {
            fd: None,
            body: RedirBody::HereDoc(here_doc),
        }];
        let (_guard, stdin) = install(&redirs, &context, &mut env).unwrap();
        assert_eq!(stdin, &b"hi $name\n"[..]);
    }
}
