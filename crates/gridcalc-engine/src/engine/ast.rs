//! Formula expression tree.

use std::fmt;

use super::CellRef;
use super::format::format_number;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOp {
    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            BinaryOp::Add => lhs + rhs,
            BinaryOp::Subtract => lhs - rhs,
            BinaryOp::Multiply => lhs * rhs,
            BinaryOp::Divide => lhs / rhs,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
        };
        f.write_str(symbol)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Number(f64),
    Cell(CellRef),
    Range(CellRef, CellRef),
    /// A bare word that is neither a reference nor a call.
    Name(String),
    Neg(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// `name(args)`. Plain parentheses are a call with an empty name.
    Call {
        name: String,
        args: Vec<Expr>,
    },
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => f.write_str(&format_number(*n)),
            Expr::Cell(cell) => write!(f, "{}", cell),
            Expr::Range(start, end) => write!(f, "{}:{}", start, end),
            Expr::Name(name) => f.write_str(name),
            Expr::Neg(inner) => write!(f, "-{}", inner),
            Expr::Binary { op, lhs, rhs } => write!(f, "{}{}{}", lhs, op, rhs),
            Expr::Call { name, args } => {
                let args = args.iter().map(|a| a.to_string()).collect::<Vec<_>>();
                write!(f, "{}({})", name, args.join(","))
            }
        }
    }
}
