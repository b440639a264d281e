//! Hand-rolled argument parsing, grounded on `yash-cli`'s own `Parse`/`Run`
//! split (recognize `--help`/`--version` first, then fold everything else
//! into a `Run` describing what to execute) but reading the option surface
//! this workspace actually models: `-o name`/`+o name`, the single-letter
//! toggles `rbash_env::option::Option::short_letter` exposes, `-c
//! command`, and `--` ending option scanning. No `clap`, matching the
//! teacher's own choice to hand-write this rather than pull in an
//! argument-parsing crate for a grammar this small and shell-specific
//! (leading `+`/`-` dual-sign toggles aren't something a generic parser
//! models anyway).

use rbash_env::option::Option as ShellOption;
use thiserror::Error;

/// Where the script comes from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Source {
    /// No script file or `-c` command given; read from standard input.
    Stdin,
    File { path: String },
    /// The argument to `-c`.
    String(String),
}

/// Everything needed to run a shell invocation, after argument parsing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Run {
    pub source: Source,
    /// Each `-o`/`+o` or single-letter toggle, in the order given.
    pub options: Vec<(ShellOption, bool)>,
    pub positional_params: Vec<String>,
    /// `$0`, overridden by the operand following `-c command`.
    pub shell_name: Option<String>,
}

/// What `--help`/`--version` short-circuit to, mirroring `yash-cli`'s own
/// `Parse` enum.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Parse {
    Help,
    Version,
    Run(Run),
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ArgsError {
    #[error("{0}: invalid option")]
    UnknownOption(String),
    #[error("{0}: invalid option name")]
    UnknownOptionName(String),
    #[error("{0}: option requires an argument")]
    MissingArgument(String),
}

fn option_by_letter(letter: char) -> Option<ShellOption> {
    enumset::EnumSet::<ShellOption>::all()
        .iter()
        .find(|o| o.short_letter() == Some(letter))
}

/// Parses `args` (argv with the program name already stripped off).
pub fn parse<I>(args: I) -> Result<Parse, ArgsError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter().peekable();
    let mut options = Vec::new();
    let mut command_string = None;

    while let Some(arg) = args.peek() {
        match arg.as_str() {
            "--help" => {
                args.next();
                return Ok(Parse::Help);
            }
            "--version" => {
                args.next();
                return Ok(Parse::Version);
            }
            "--" => {
                args.next();
                break;
            }
            "-" => break,
            _ => {}
        }

        if let Some(rest) = arg.strip_prefix("-o") {
            let rest = rest.to_owned();
            args.next();
            let name = take_option_operand(&mut args, "-o", &rest)?;
            let option = ShellOption::from_long_name(&name).ok_or(ArgsError::UnknownOptionName(name))?;
            options.push((option, true));
        } else if let Some(rest) = arg.strip_prefix("+o") {
            let rest = rest.to_owned();
            args.next();
            let name = take_option_operand(&mut args, "+o", &rest)?;
            let option = ShellOption::from_long_name(&name).ok_or(ArgsError::UnknownOptionName(name))?;
            options.push((option, false));
        } else if let Some(rest) = arg.strip_prefix("-c") {
            let rest = rest.to_owned();
            args.next();
            let command = take_option_operand(&mut args, "-c", &rest)?;
            command_string = Some(command);
        } else if arg.len() > 1 && (arg.starts_with('-') || arg.starts_with('+')) {
            let enabled = arg.starts_with('-');
            let letters = arg[1..].to_owned();
            args.next();
            for letter in letters.chars() {
                let option = option_by_letter(letter).ok_or_else(|| {
                    ArgsError::UnknownOption(format!("{}{letter}", if enabled { '-' } else { '+' }))
                })?;
                options.push((option, enabled));
            }
        } else {
            break;
        }
    }

    let operands: Vec<String> = args.collect();

    let (source, shell_name, positional_params) = if let Some(command) = command_string {
        let mut operands = operands.into_iter();
        let shell_name = operands.next();
        (Source::String(command), shell_name, operands.collect())
    } else if let Some((path, rest)) = operands.split_first() {
        (Source::File { path: path.clone() }, None, rest.to_vec())
    } else {
        (Source::Stdin, None, Vec::new())
    };

    Ok(Parse::Run(Run {
        source,
        options,
        positional_params,
        shell_name,
    }))
}

/// `-o`/`+o`/`-c` all accept their operand either stuck to the flag
/// (`-oerrexit`) or as the next argument (`-o errexit`).
fn take_option_operand<I>(args: &mut std::iter::Peekable<I>, flag: &str, stuck: &str) -> Result<String, ArgsError>
where
    I: Iterator<Item = String>,
{
    if !stuck.is_empty() {
        return Ok(stuck.to_owned());
    }
    args.next().ok_or_else(|| ArgsError::MissingArgument(flag.to_owned()))
}
