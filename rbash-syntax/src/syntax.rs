//! Shell command language syntax.
//!
//! This module defines the abstract syntax tree (AST) types for the shell
//! command language. Turning source text into these types is the lexer and
//! parser's job, which this workspace does not implement — callers hand the
//! evaluator an already-built tree, whether produced by a real parser
//! upstream or assembled directly (as this workspace's own tests do).
//!
//! ## Syntactic elements
//!
//! A whole script is a [`List`], a vector of [`Item`]s. An `Item` is a
//! possibly asynchronous [`AndOrList`], a sequence of conditionally executed
//! [`Pipeline`]s. A `Pipeline` is a sequence of [`Command`]s separated by
//! `|`. A `Command` is a [`SimpleCommand`], a [`FullCompoundCommand`], a
//! [`FunctionDefinition`], a [`TestCommand`] (`[ ... ]`), an extended test
//! (`[[ ... ]]`, see [`crate::cond`]), an arithmetic command (`(( ... ))`),
//! or a [`Coproc`].
//!
//! ## Lexical elements
//!
//! Tokens that make up commands may contain quotations and expansions. A
//! [`Word`], a sequence of [`WordUnit`]s, represents a token that appears in
//! a simple command and some other contexts. In contexts where tilde
//! expansion and quoting are not recognized, a [`Text`] (a sequence of
//! [`TextUnit`]s) is used instead.

use crate::cond::CondExpr;
use crate::source::Location;
use std::cell::OnceCell;
use std::rc::Rc;

#[cfg(unix)]
pub type RawFd = std::os::unix::io::RawFd;
#[cfg(not(unix))]
pub type RawFd = i32;

/// Special parameter, e.g. `@`, `#`, `?`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SpecialParam {
    /// `@` (all positional parameters, each a separate field)
    At,
    /// `*` (all positional parameters, joined by `IFS`'s first character when quoted)
    Asterisk,
    /// `#` (number of positional parameters)
    Number,
    /// `?` (exit status of the last command)
    Question,
    /// `-` (active shell options)
    Hyphen,
    /// `$` (process ID of the shell)
    Dollar,
    /// `!` (process ID of the last asynchronous command)
    Exclamation,
    /// `0` (name of the shell or script)
    Zero,
}

/// Type of a parameter, precomputed alongside its name so expansion need not
/// reparse the name every time.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ParamType {
    /// Named parameter (ordinary variable)
    Variable,
    Special(SpecialParam),
    /// Positional parameter, 1-based. Index `0` never refers to an existing
    /// parameter.
    Positional(usize),
}

/// Parameter referenced in a parameter expansion.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Param {
    /// Literal name as it appeared in the source, e.g. `foo`, `@`, `12`.
    pub id: String,
    pub r#type: ParamType,
}

impl Param {
    pub fn variable(name: impl Into<String>) -> Self {
        Param {
            id: name.into(),
            r#type: ParamType::Variable,
        }
    }
}

/// Optional array subscript of a parameter expansion, e.g. `${a[1]}` or
/// `${a[@]}`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Index {
    /// An arithmetic expression naming a single element.
    Arith(Text),
    /// `@` or `*` — every element.
    All,
}

/// How a [switch](Switch) decides whether to substitute its word.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SwitchType {
    /// `+` — substitute only if the parameter is set (and non-empty, if
    /// combined with `:`).
    Alter,
    /// `-` — substitute a default for a missing value.
    Default,
    /// `=` — assign a default to the variable if the value is missing.
    Assign,
    /// `?` — error out if the value is missing.
    Error,
}

/// Whether a [switch](Switch) also triggers on an empty (not just unset)
/// value.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SwitchCondition {
    Unset,
    UnsetOrEmpty,
}

/// Parameter expansion modifier that conditionally substitutes a value, e.g.
/// `+foo`, `:-bar`, `:=baz`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Switch {
    pub r#type: SwitchType,
    pub condition: SwitchCondition,
    pub word: Word,
}

/// Which side of a value a [trim](Trim) removes from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TrimSide {
    Prefix,
    Suffix,
}

/// How greedily a [trim](Trim) matches its pattern.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TrimLength {
    Shortest,
    Longest,
}

/// Parameter expansion modifier that removes a matching prefix or suffix,
/// e.g. `#foo`, `##bar`, `%%baz*`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Trim {
    pub side: TrimSide,
    pub length: TrimLength,
    pub pattern: Word,
}

/// `/pattern/replacement` substitution modifier, e.g. `${name/pat/rep}`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Subst {
    /// Whether every non-overlapping match is replaced (`//`) rather than
    /// just the first.
    pub all: bool,
    /// Whether only a match anchored at the start (`/#`) or end (`/%`) of
    /// the value counts.
    pub anchor: Option<TrimSide>,
    pub pattern: Word,
    pub replacement: Word,
}

/// Attribute that modifies a parameter expansion.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Modifier {
    None,
    /// `#` prefix (`${#foo}`) — length of the value.
    Length,
    Switch(Switch),
    Trim(Trim),
    Subst(Subst),
    /// `@Q`/`@E`/... single-letter transformation suffix (`${foo@Q}`).
    Transform(char),
}

/// The `!` prefix of `${!...}`, which bash overloads into four distinct
/// forms depending on what follows the name.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
pub enum Indirection {
    /// `${name}` — no leading `!`.
    #[default]
    Direct,
    /// `${!name}` — expand the variable *named by* `name`'s current value.
    Ref,
    /// `${!prefix*}` — every variable name starting with `prefix`, joined
    /// by the first character of `IFS`.
    PrefixNames,
    /// `${!prefix@}` — every variable name starting with `prefix`, as
    /// separate fields.
    PrefixNamesAt,
    /// `${!name[@]}`/`${!name[*]}` — every index/key of the array `name`.
    Keys,
}

/// Parameter expansion enclosed in braces, e.g. `${foo:-bar}`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BracedParam {
    pub param: Param,
    pub index: Option<Index>,
    pub modifier: Modifier,
    pub indirection: Indirection,
    pub location: Location,
}

/// Element of a [`WordUnit::DollarSingleQuote`] ANSI-C quoted string.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EscapeUnit {
    Literal(char),
    DoubleQuote,
    SingleQuote,
    Backslash,
    Question,
    Alert,
    Backspace,
    Escape,
    FormFeed,
    Newline,
    CarriageReturn,
    Tab,
    VerticalTab,
    Control(u8),
    Octal(u8),
    Hex(u8),
    Unicode(char),
}

/// Sequence of [`EscapeUnit`]s, the content of a `$'...'` string.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EscapedString(pub Vec<EscapeUnit>);

/// Element of a backquoted command substitution, `` `...` ``.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BackquoteUnit {
    Literal(char),
    Backslashed(char),
}

/// Element of a [`Text`]: something that can be expanded but is not subject
/// to quoting or tilde expansion.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TextUnit {
    Literal(char),
    Backslashed(char),
    /// Parameter expansion not enclosed in braces, e.g. `$foo`.
    RawParam { param: Param, location: Location },
    /// Parameter expansion enclosed in braces, e.g. `${foo}`.
    BracedParam(BracedParam),
    /// `$(...)` command substitution. The content is kept as unparsed text —
    /// parsing happens only if and when it runs — so an error in code that
    /// never executes (e.g. the untaken branch of an `if`) does not abort
    /// expansion of the rest of the word.
    CommandSubst { content: Rc<str>, location: Location },
    /// `` `...` `` command substitution.
    Backquote {
        content: Vec<BackquoteUnit>,
        location: Location,
    },
    /// `$((...))` arithmetic expansion.
    Arith { content: Text, location: Location },
    /// `<(...)` or `>(...)` process substitution appearing inside a word
    /// that is not itself a full word unit position (e.g. inside a double
    /// quote is not valid, but nested in an unquoted context it is).
    ProcessSubst {
        direction: ProcessSubstDirection,
        command: Rc<List>,
        location: Location,
    },
}

/// String that may contain expansions, used where quoting is not
/// recognized (inside double quotes, here-documents, etc).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Text(pub Vec<TextUnit>);

/// Direction of a process substitution, `<(...)` vs `>(...)`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProcessSubstDirection {
    /// `<(...)` — substitutes a path the shell can read the command's
    /// stdout from.
    In,
    /// `>(...)` — substitutes a path the shell can write to feed the
    /// command's stdin.
    Out,
}

/// One alternative or range expression inside a brace expansion, e.g. the
/// `{a,b,c}` or `{1..10..2}` in `pre{a,b,c}post`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BraceItem {
    /// `{a,b,c}` — cartesian alternatives, each a full word.
    Alternatives(Vec<Word>),
    /// `{1..10}`, `{01..10}`, `{a..z}`, `{1..10..2}`. Bounds are kept as the
    /// literal text that appeared in the source so zero-padding width and
    /// the choice between numeric and alphabetic stepping can be recovered
    /// without re-deriving it from a parsed integer.
    Range {
        from: String,
        to: String,
        step: Option<String>,
    },
}

/// Element of a [`Word`]: text with quotes, tilde expansion, and brace
/// expansion recognized.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum WordUnit {
    /// Unquoted [`TextUnit`].
    Unquoted(TextUnit),
    /// `'...'`
    SingleQuote(String),
    /// `"..."`
    DoubleQuote(Text),
    /// `$'...'`
    DollarSingleQuote(EscapedString),
    /// `~foo` tilde expansion. The string does not include the leading `~`.
    Tilde(String),
    /// `{a,b,c}` or `{1..10}` brace expansion.
    Brace(BraceItem),
}

/// Token that may involve expansions and quotes.
///
/// A word is a sequence of [`WordUnit`]s. Whether an empty word is valid is
/// context-dependent.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Word {
    pub units: Vec<WordUnit>,
    pub location: Location,
}

impl Word {
    /// A word consisting of a single unquoted literal string, useful for
    /// building test fixtures and synthetic command words.
    pub fn from_literal(s: impl AsRef<str>) -> Self {
        Word {
            units: s
                .as_ref()
                .chars()
                .map(|c| WordUnit::Unquoted(TextUnit::Literal(c)))
                .collect(),
            location: Location::dummy(),
        }
    }

    /// Returns the word's content if it consists only of unquoted literal
    /// characters, with no expansions, quoting, or brace/tilde syntax.
    pub fn to_string_if_literal(&self) -> Option<String> {
        let mut s = String::new();
        for unit in &self.units {
            match unit {
                WordUnit::Unquoted(TextUnit::Literal(c)) => s.push(*c),
                _ => return None,
            }
        }
        Some(s)
    }
}

/// Value assigned by an [`Assign`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Value {
    /// Scalar value, a possibly empty word.
    Scalar(Word),
    /// Indexed array, e.g. `(a b c)`. A non-portable extension.
    Array(Vec<Word>),
    /// Associative array, e.g. `([k1]=v1 [k2]=v2)`. A non-portable
    /// extension; order is preserved.
    Associative(Vec<(Word, Word)>),
}

/// Assignment word, e.g. `foo=bar` or `foo=(a b c)`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Assign {
    pub name: String,
    pub value: Value,
    pub location: Location,
}

/// File descriptor number.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Fd(pub RawFd);

impl Fd {
    pub const STDIN: Fd = Fd(0);
    pub const STDOUT: Fd = Fd(1);
    pub const STDERR: Fd = Fd(2);
}

/// Redirection operator, excluding here-documents (see [`HereDoc`]) and
/// process redirection (see [`WordUnit::Brace`]... actually [`TextUnit::ProcessSubst`]).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RedirOp {
    /// `<`
    FileIn,
    /// `<>`
    FileInOut,
    /// `>`
    FileOut,
    /// `>>`
    FileAppend,
    /// `>|`
    FileClobber,
    /// `<&`
    FdIn,
    /// `>&`
    FdOut,
    /// `<<<` (here-string)
    String,
}

/// Here-document body.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HereDoc {
    /// Token marking the end of the content.
    pub delimiter: Word,
    /// `<<-` strips leading tabs from each content line; `<<` does not.
    pub remove_tabs: bool,
    /// Content, filled in once the heredoc body has been read. Kept in a
    /// cell because the delimiter is recognized before the body that
    /// follows it on later lines is available.
    pub content: OnceCell<Text>,
}

/// Nature of the file descriptor produced by a redirection.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RedirBody {
    Normal { operator: RedirOp, operand: Word },
    HereDoc(Rc<HereDoc>),
}

impl RedirBody {
    pub fn operand(&self) -> &Word {
        match self {
            RedirBody::Normal { operand, .. } => operand,
            RedirBody::HereDoc(here_doc) => &here_doc.delimiter,
        }
    }
}

/// A single redirection, e.g. `2>&1` or `<file`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Redir {
    /// File descriptor modified by this redirection, if explicit.
    pub fd: Option<Fd>,
    pub body: RedirBody,
}

impl Redir {
    /// The file descriptor this redirection modifies, falling back to the
    /// operator's default (0 for input forms, 1 for output forms).
    pub fn fd_or_default(&self) -> Fd {
        use RedirOp::*;
        self.fd.unwrap_or(match &self.body {
            RedirBody::Normal { operator, .. } => match operator {
                FileIn | FileInOut | FdIn | String => Fd::STDIN,
                FileOut | FileAppend | FileClobber | FdOut => Fd::STDOUT,
            },
            RedirBody::HereDoc(_) => Fd::STDIN,
        })
    }
}

/// Whether a word in a simple command expands to one field or may split
/// into several.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExpansionMode {
    Single,
    Multiple,
}

/// A command built from assignments, a command name and arguments, and
/// redirections. At least one of the three must be present.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SimpleCommand {
    pub assigns: Vec<Assign>,
    pub words: Vec<(Word, ExpansionMode)>,
    pub redirs: Rc<Vec<Redir>>,
}

impl SimpleCommand {
    pub fn is_empty(&self) -> bool {
        self.assigns.is_empty() && self.words.is_empty() && self.redirs.is_empty()
    }
}

/// POSIX test command, `[ arg ... ]`. Unlike `[[ ... ]]`, its primaries are
/// evaluated left to right at run time over already-expanded words rather
/// than a statically parsed condition tree — POSIX leaves the `[ ]` grammar
/// ambiguous enough (it is, after all, just a command whose name is `[`)
/// that bash itself re-derives the meaning from the argument count and
/// values rather than a fixed grammar.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TestCommand {
    pub args: Vec<Word>,
    pub location: Location,
}

/// `elif`-`then` clause of an `if` command.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ElifThen {
    pub condition: List,
    pub body: List,
}

/// What happens after a `case` branch's body runs.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CaseContinuation {
    /// `;;`
    #[default]
    Break,
    /// `;&`
    FallThrough,
    /// `;;&`
    Continue,
}

/// One branch of a `case` command.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CaseItem {
    /// Patterns tried against the subject word; at least one.
    pub patterns: Vec<Word>,
    pub body: List,
    pub continuation: CaseContinuation,
}

/// Command that contains other commands as its body.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CompoundCommand {
    /// `{ ... }` — a list run in the current shell environment.
    Grouping(List),
    /// `( ... )` — a list run in a forked-off copy of the shell state;
    /// state changes inside do not escape.
    Subshell { body: Rc<List>, location: Location },
    /// `for name [in values]; do body; done`. `values` of `None` means
    /// iterate over `"$@"`.
    For {
        name: Word,
        values: Option<Vec<Word>>,
        body: List,
    },
    /// `for (( init; cond; update )); do body; done`. The three clauses are
    /// kept as raw arithmetic source text, each handed to the arithmetic
    /// evaluator independently on every evaluation (so that e.g. `update`
    /// sees variables the previous iteration's `body` changed); an empty
    /// string in `cond` means "always true", matching `((;;))`.
    CStyleFor {
        init: String,
        condition: String,
        update: String,
        body: List,
        location: Location,
    },
    While { condition: List, body: List },
    Until { condition: List, body: List },
    If {
        condition: List,
        body: List,
        elifs: Vec<ElifThen>,
        r#else: Option<List>,
    },
    Case { subject: Word, items: Vec<CaseItem> },
}

/// Compound command together with its redirections.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FullCompoundCommand {
    pub command: CompoundCommand,
    pub redirs: Vec<Redir>,
}

/// `function name { ... }` or `name () { ... }`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FunctionDefinition {
    /// Whether the `function` reserved word introduced the definition.
    pub has_keyword: bool,
    pub name: Word,
    pub body: Rc<FullCompoundCommand>,
}

/// `coproc [name] command` — runs `command` asynchronously with its stdin
/// and stdout connected to pipes recorded under `name` (or `COPROC` if no
/// name is given).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Coproc {
    pub name: Option<String>,
    pub body: Rc<FullCompoundCommand>,
    pub location: Location,
}

/// Element of a pipe sequence.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    Simple(SimpleCommand),
    Compound(FullCompoundCommand),
    Function(FunctionDefinition),
    /// `[ ... ]`
    Test(TestCommand),
    /// `[[ ... ]]`
    ExtendedTest {
        condition: CondExpr,
        redirs: Vec<Redir>,
        location: Location,
    },
    /// `(( ... ))`. Distinct from [`TextUnit::Arith`], which is the
    /// expression-position `$((...))` form; this is the command-position
    /// form whose exit status is 0 if the expression is non-zero and 1
    /// otherwise.
    Arith {
        content: Text,
        redirs: Vec<Redir>,
        location: Location,
    },
    Coproc(Coproc),
}

/// Commands separated by `|`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pipeline {
    /// At least one command. Kept in `Rc` so pipeline stages can be handed
    /// to concurrently running children without cloning the AST.
    pub commands: Vec<Rc<Command>>,
    /// Whether the pipeline is prefixed with `!`.
    pub negation: bool,
}

/// Condition deciding whether the next [`Pipeline`] in an [`AndOrList`]
/// runs.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AndOr {
    AndThen,
    OrElse,
}

/// Pipelines separated by `&&` and `||`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AndOrList {
    pub first: Pipeline,
    pub rest: Vec<(AndOr, Pipeline)>,
}

/// Element of a [`List`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Item {
    pub and_or: Rc<AndOrList>,
    /// Location of the trailing `&`, if the item runs asynchronously.
    pub async_flag: Option<Location>,
}

/// Sequence of [`Item`]s separated by `;` or `&`. Whether an empty list is
/// valid is context-dependent (a function body or subshell may not be
/// empty; the top level of an empty script is).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct List(pub Vec<Item>);

mod impl_display;

pub use impl_display::quote_as_needed;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_word_round_trips_through_display() {
        let word = Word::from_literal("echo");
        assert_eq!(word.to_string(), "echo");
        assert_eq!(word.to_string_if_literal().as_deref(), Some("echo"));
    }

    #[test]
    fn quoted_word_is_not_literal() {
        let word = Word {
            units: vec![WordUnit::SingleQuote("hi".to_owned())],
            location: Location::dummy(),
        };
        assert_eq!(word.to_string(), "'hi'");
        assert_eq!(word.to_string_if_literal(), None);
    }

    #[test]
    fn simple_command_displays_assigns_words_and_redirs() {
        let command = SimpleCommand {
            assigns: vec![Assign {
                name: "x".to_owned(),
                value: Value::Scalar(Word::from_literal("1")),
                location: Location::dummy(),
            }],
            words: vec![
                (Word::from_literal("echo"), ExpansionMode::Single),
                (Word::from_literal("$x"), ExpansionMode::Multiple),
            ],
            redirs: Rc::new(vec![Redir {
                fd: Some(Fd(2)),
                body: RedirBody::Normal {
                    operator: RedirOp::FdOut,
                    operand: Word::from_literal("1"),
                },
            }]),
        };
        assert_eq!(command.to_string(), "x=1 echo $x 2>&1");
    }

    #[test]
    fn brace_alternatives_display_as_source() {
        let word = Word {
            units: vec![WordUnit::Brace(BraceItem::Alternatives(vec![
                Word::from_literal("a"),
                Word::from_literal("b"),
            ]))],
            location: Location::dummy(),
        };
        assert_eq!(word.to_string(), "{a,b}");
    }

    #[test]
    fn redir_fd_or_default_falls_back_by_operator() {
        let redir = Redir {
            fd: None,
            body: RedirBody::Normal {
                operator: RedirOp::FileAppend,
                operand: Word::from_literal("log"),
            },
        };
        assert_eq!(redir.fd_or_default(), Fd::STDOUT);
    }
}
