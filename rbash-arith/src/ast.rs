//! Abstract syntax tree for arithmetic expressions.

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UnOp {
    Plus,
    Minus,
    Not,
    BitNot,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Shl,
    Shr,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    BitAnd,
    BitXor,
    BitOr,
    LogAnd,
    LogOr,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IncDec {
    Inc,
    Dec,
}

/// Node of a parsed arithmetic expression.
///
/// Variable names are kept by value (rather than borrowing the source) so
/// that the tree can outlive the tokenizer; expressions are short-lived so
/// the extra allocations do not matter.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Expr {
    Num(i64),
    Var(String),
    Unary(UnOp, Box<Expr>),
    PreIncDec(IncDec, String),
    PostIncDec(IncDec, String),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Assign(String, Box<Expr>),
    CompoundAssign(BinOp, String, Box<Expr>),
    Ternary(Box<Expr>, Box<Expr>, Box<Expr>),
    Comma(Box<Expr>, Box<Expr>),
}
