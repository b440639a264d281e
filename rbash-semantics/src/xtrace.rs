//! Emits `xtrace`/`verbose` diagnostic lines to the stderr sink, per
//! §4.5 step 6.
//!
//! Grounded on `yash_semantics::xtrace`'s prefix convention (`+ ` repeated
//! once per nesting level, though this crate does not track nesting depth
//! separately from `loop_depth` and so always uses a single `+`, a
//! documented simplification relative to the teacher's per-subshell-depth
//! prefix).

use rbash_env::io::StreamTag;
use rbash_env::option::Option as ShellOption;
use rbash_env::session::Env;
use rbash_syntax::syntax::Word;

/// Writes `+ name arg1 arg2 ...` to stderr if the `xtrace` option is set.
/// Each field is quoted via [`rbash_quote::quote`] so a traced line can be
/// re-fed to a shell and parse the same way.
pub fn trace_command(fields: &[String], env: &Env) {
    if !env.options.contains(ShellOption::XTrace) {
        return;
    }
    let line = fields
        .iter()
        .map(|f| rbash_quote::quote(f).into_owned())
        .collect::<Vec<_>>()
        .join(" ");
    env.write(StreamTag::Stderr, format!("+ {line}\n").as_bytes());
}

/// Writes the literal source text of a word being read, if `verbose` is
/// set — distinct from `xtrace`, which traces the *expanded* command.
pub fn trace_verbose(word: &Word, env: &Env) {
    if !env.options.contains(ShellOption::Verbose) {
        return;
    }
    env.write(StreamTag::Stderr, format!("{word}\n").as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use rbash_env::io::Collector;

    fn test_env() -> Env {
        let collector = Collector::new();
        Env::new(collector.sink(), collector.sink())
    }

    #[test]
    fn xtrace_is_silent_unless_the_option_is_set() {
        let collector = Collector::new();
        let mut env = Env::new(collector.sink(), collector.sink());
        trace_command(&["echo".to_owned(), "hi".to_owned()], &env);
        assert!(collector.stderr.borrow().is_empty());

        env.options.insert(ShellOption::XTrace);
        trace_command(&["echo".to_owned(), "hi".to_owned()], &env);
        assert_eq!(&*collector.stderr.borrow(), b"+ echo hi\n");
    }
}
