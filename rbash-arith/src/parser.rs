//! Recursive-descent parser turning tokens into an [`Expr`](crate::ast::Expr) tree.
//!
//! Precedence, low to high: comma, assignment, ternary, `||`, `&&`, `|`, `^`,
//! `&`, equality, relational, shift, additive, multiplicative, `**`, unary,
//! pre/post increment, primary. This mirrors the grammar `sh`/`bash`
//! implement for `$(( ))` and `(( ))`.

use crate::ast::{BinOp, Expr, IncDec, UnOp};
use crate::token::{Op, Token};
use std::iter::Peekable;
use std::ops::Range;
use thiserror::Error;

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ParseError {
    #[error("unexpected end of expression")]
    UnexpectedEof,
    #[error("unexpected token")]
    UnexpectedToken,
    #[error("left-hand side of assignment is not a variable")]
    NotAssignable,
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("{cause}")]
pub struct Error {
    pub cause: ParseError,
    pub location: Range<usize>,
}

type Toks<'a> = Peekable<std::slice::Iter<'a, (Token, Range<usize>)>>;

pub fn parse(tokens: &[(Token, Range<usize>)]) -> Result<Expr, Error> {
    let mut it = tokens.iter().peekable();
    let expr = parse_comma(&mut it)?;
    if let Some((_, range)) = it.next() {
        return Err(Error {
            cause: ParseError::UnexpectedToken,
            location: range.clone(),
        });
    }
    Ok(expr)
}

fn peek_range(it: &mut Toks<'_>, tokens_end: usize) -> Range<usize> {
    it.peek()
        .map(|(_, r)| r.clone())
        .unwrap_or(tokens_end..tokens_end)
}

fn eof_error(it: &mut Toks<'_>) -> Error {
    Error {
        cause: ParseError::UnexpectedEof,
        location: peek_range(it, 0),
    }
}

fn parse_comma(it: &mut Toks<'_>) -> Result<Expr, Error> {
    let mut lhs = parse_assign(it)?;
    while matches!(it.peek(), Some((Token::Comma, _))) {
        it.next();
        let rhs = parse_assign(it)?;
        lhs = Expr::Comma(Box::new(lhs), Box::new(rhs));
    }
    Ok(lhs)
}

fn compound_op(op: Op) -> Option<BinOp> {
    Some(match op {
        Op::AddAssign => BinOp::Add,
        Op::SubAssign => BinOp::Sub,
        Op::MulAssign => BinOp::Mul,
        Op::DivAssign => BinOp::Div,
        Op::RemAssign => BinOp::Rem,
        Op::ShlAssign => BinOp::Shl,
        Op::ShrAssign => BinOp::Shr,
        Op::AndAssign => BinOp::BitAnd,
        Op::XorAssign => BinOp::BitXor,
        Op::OrAssign => BinOp::BitOr,
        _ => return None,
    })
}

fn parse_assign(it: &mut Toks<'_>) -> Result<Expr, Error> {
    let lhs = parse_ternary(it)?;
    let Some((Token::Op(op), range)) = it.peek().cloned() else {
        return Ok(lhs);
    };
    if *op == Op::Assign {
        it.next();
        let Expr::Var(name) = lhs else {
            return Err(Error {
                cause: ParseError::NotAssignable,
                location: range.clone(),
            });
        };
        let rhs = parse_assign(it)?;
        return Ok(Expr::Assign(name, Box::new(rhs)));
    }
    if let Some(bin) = compound_op(*op) {
        it.next();
        let Expr::Var(name) = lhs else {
            return Err(Error {
                cause: ParseError::NotAssignable,
                location: range.clone(),
            });
        };
        let rhs = parse_assign(it)?;
        return Ok(Expr::CompoundAssign(bin, name, Box::new(rhs)));
    }
    Ok(lhs)
}

fn parse_ternary(it: &mut Toks<'_>) -> Result<Expr, Error> {
    let cond = parse_logor(it)?;
    if matches!(it.peek(), Some((Token::Question, _))) {
        it.next();
        let then_branch = parse_assign(it)?;
        match it.next() {
            Some((Token::Colon, _)) => {}
            Some((_, range)) => {
                return Err(Error {
                    cause: ParseError::UnexpectedToken,
                    location: range.clone(),
                });
            }
            None => return Err(eof_error(it)),
        }
        let else_branch = parse_assign(it)?;
        return Ok(Expr::Ternary(
            Box::new(cond),
            Box::new(then_branch),
            Box::new(else_branch),
        ));
    }
    Ok(cond)
}

macro_rules! left_assoc_binop {
    ($name:ident, $next:ident, [$($op:pat => $bin:expr),+ $(,)?]) => {
        fn $name(it: &mut Toks<'_>) -> Result<Expr, Error> {
            let mut lhs = $next(it)?;
            loop {
                let bin = match it.peek() {
                    $(Some((Token::Op($op), _)) => $bin,)+
                    _ => break,
                };
                it.next();
                let rhs = $next(it)?;
                lhs = Expr::Binary(bin, Box::new(lhs), Box::new(rhs));
            }
            Ok(lhs)
        }
    };
}

left_assoc_binop!(parse_logor, parse_logand, [Op::LogOr => BinOp::LogOr]);
left_assoc_binop!(parse_logand, parse_bitor, [Op::LogAnd => BinOp::LogAnd]);
left_assoc_binop!(parse_bitor, parse_bitxor, [Op::BitOr => BinOp::BitOr]);
left_assoc_binop!(parse_bitxor, parse_bitand, [Op::BitXor => BinOp::BitXor]);
left_assoc_binop!(parse_bitand, parse_equality, [Op::BitAnd => BinOp::BitAnd]);
left_assoc_binop!(parse_equality, parse_relational, [
    Op::Eq => BinOp::Eq,
    Op::Ne => BinOp::Ne,
]);
left_assoc_binop!(parse_relational, parse_shift, [
    Op::Lt => BinOp::Lt,
    Op::Le => BinOp::Le,
    Op::Gt => BinOp::Gt,
    Op::Ge => BinOp::Ge,
]);
left_assoc_binop!(parse_shift, parse_additive, [
    Op::Shl => BinOp::Shl,
    Op::Shr => BinOp::Shr,
]);
left_assoc_binop!(parse_additive, parse_multiplicative, [
    Op::Add => BinOp::Add,
    Op::Sub => BinOp::Sub,
]);
left_assoc_binop!(parse_multiplicative, parse_power, [
    Op::Mul => BinOp::Mul,
    Op::Div => BinOp::Div,
    Op::Rem => BinOp::Rem,
]);

// `**` is right-associative.
fn parse_power(it: &mut Toks<'_>) -> Result<Expr, Error> {
    let lhs = parse_unary(it)?;
    if matches!(it.peek(), Some((Token::Op(Op::Pow), _))) {
        it.next();
        let rhs = parse_power(it)?;
        return Ok(Expr::Binary(BinOp::Pow, Box::new(lhs), Box::new(rhs)));
    }
    Ok(lhs)
}

fn parse_unary(it: &mut Toks<'_>) -> Result<Expr, Error> {
    if let Some((Token::Op(op), _)) = it.peek().cloned() {
        let un = match op {
            Op::Add => Some(UnOp::Plus),
            Op::Sub => Some(UnOp::Minus),
            Op::Not => Some(UnOp::Not),
            Op::BitNot => Some(UnOp::BitNot),
            _ => None,
        };
        if let Some(un) = un {
            it.next();
            let operand = parse_unary(it)?;
            return Ok(Expr::Unary(un, Box::new(operand)));
        }
        if op == Op::Inc || op == Op::Dec {
            it.next();
            let kind = if op == Op::Inc { IncDec::Inc } else { IncDec::Dec };
            let range = peek_range(it, 0);
            let Expr::Var(name) = parse_unary(it)? else {
                return Err(Error {
                    cause: ParseError::NotAssignable,
                    location: range,
                });
            };
            return Ok(Expr::PreIncDec(kind, name));
        }
    }
    parse_postfix(it)
}

fn parse_postfix(it: &mut Toks<'_>) -> Result<Expr, Error> {
    let primary = parse_primary(it)?;
    if let Some((Token::Op(op), _)) = it.peek() {
        if *op == Op::Inc || *op == Op::Dec {
            let kind = if *op == Op::Inc { IncDec::Inc } else { IncDec::Dec };
            if let Expr::Var(name) = primary {
                it.next();
                return Ok(Expr::PostIncDec(kind, name));
            }
        }
    }
    Ok(primary)
}

fn parse_primary(it: &mut Toks<'_>) -> Result<Expr, Error> {
    match it.next() {
        Some((Token::Num(n), _)) => Ok(Expr::Num(*n)),
        Some((Token::Name(name), _)) => Ok(Expr::Var(name.clone())),
        Some((Token::LParen, _)) => {
            let inner = parse_comma(it)?;
            match it.next() {
                Some((Token::RParen, _)) => Ok(inner),
                Some((_, range)) => Err(Error {
                    cause: ParseError::UnexpectedToken,
                    location: range.clone(),
                }),
                None => Err(eof_error(it)),
            }
        }
        Some((_, range)) => Err(Error {
            cause: ParseError::UnexpectedToken,
            location: range.clone(),
        }),
        None => Err(eof_error(it)),
    }
}
