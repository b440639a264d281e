//! Condition tree for the extended test command, `[[ ... ]]`.
//!
//! `[ ... ]` (the POSIX test command) is flat — a list of words interpreted
//! by the test engine at evaluation time — and needs no dedicated tree; see
//! [`crate::syntax::TestCommand`]. `[[ ... ]]` additionally supports `&&`,
//! `||`, `!`, and parentheses with short-circuit evaluation, which this
//! module's [`CondExpr`] captures structurally instead of leaving to runtime
//! re-parsing.

use crate::source::Location;
use crate::syntax::Word;
use std::fmt;

/// Unary primary of a `[[ ]]` condition, e.g. `-f file`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UnaryCondOp {
    /// `-e` (path exists)
    Exists,
    /// `-f` (regular file)
    Regular,
    /// `-d` (directory)
    Directory,
    /// `-L` / `-h` (symbolic link)
    Symlink,
    /// `-r` (readable)
    Readable,
    /// `-w` (writable)
    Writable,
    /// `-x` (executable)
    Executable,
    /// `-s` (non-empty file)
    NonEmptyFile,
    /// `-n` (non-empty string)
    StringNonEmpty,
    /// `-z` (empty string)
    StringEmpty,
    /// `-v` (parameter is set)
    VarSet,
    /// `-R` (parameter is a nameref)
    NameRef,
}

/// Binary primary of a `[[ ]]` condition, e.g. `$a == $b`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BinaryCondOp {
    /// `==` or `=` (glob pattern match)
    GlobEq,
    /// `!=` (negated glob pattern match)
    GlobNe,
    /// `=~` (POSIX extended regular expression match)
    RegexMatch,
    /// `<` (string less-than, byte-wise)
    StringLt,
    /// `>` (string greater-than, byte-wise)
    StringGt,
    /// `-eq`
    IntEq,
    /// `-ne`
    IntNe,
    /// `-lt`
    IntLt,
    /// `-le`
    IntLe,
    /// `-gt`
    IntGt,
    /// `-ge`
    IntGe,
}

/// Node of a parsed `[[ ... ]]` condition.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CondExpr {
    /// A bare word, true iff it expands to a non-empty string.
    Word(Word),
    Unary {
        op: UnaryCondOp,
        operand: Word,
        location: Location,
    },
    Binary {
        op: BinaryCondOp,
        lhs: Word,
        /// Right-hand word. For [`BinaryCondOp::GlobEq`] and
        /// [`BinaryCondOp::GlobNe`], quote removal still applies but the
        /// word's quotedness also decides whether it is matched as a glob
        /// pattern or a literal substring — an entirely quoted right-hand
        /// side is a literal match.
        rhs: Word,
        location: Location,
    },
    Not(Box<CondExpr>),
    And(Box<CondExpr>, Box<CondExpr>),
    Or(Box<CondExpr>, Box<CondExpr>),
    Paren(Box<CondExpr>),
}

impl fmt::Display for UnaryCondOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use UnaryCondOp::*;
        f.write_str(match self {
            Exists => "-e",
            Regular => "-f",
            Directory => "-d",
            Symlink => "-L",
            Readable => "-r",
            Writable => "-w",
            Executable => "-x",
            NonEmptyFile => "-s",
            StringNonEmpty => "-n",
            StringEmpty => "-z",
            VarSet => "-v",
            NameRef => "-R",
        })
    }
}

impl fmt::Display for BinaryCondOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use BinaryCondOp::*;
        f.write_str(match self {
            GlobEq => "==",
            GlobNe => "!=",
            RegexMatch => "=~",
            StringLt => "<",
            StringGt => ">",
            IntEq => "-eq",
            IntNe => "-ne",
            IntLt => "-lt",
            IntLe => "-le",
            IntGt => "-gt",
            IntGe => "-ge",
        })
    }
}

impl fmt::Display for CondExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CondExpr::Word(word) => word.fmt(f),
            CondExpr::Unary { op, operand, .. } => write!(f, "{op} {operand}"),
            CondExpr::Binary { op, lhs, rhs, .. } => write!(f, "{lhs} {op} {rhs}"),
            CondExpr::Not(inner) => write!(f, "! {inner}"),
            CondExpr::And(lhs, rhs) => write!(f, "{lhs} && {rhs}"),
            CondExpr::Or(lhs, rhs) => write!(f, "{lhs} || {rhs}"),
            CondExpr::Paren(inner) => write!(f, "( {inner} )"),
        }
    }
}
