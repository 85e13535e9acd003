//! Formula parser
//!
//! A recursive descent parser with two precedence levels.
//!
//! ```text
//! formula  := args EOF
//! args     := expr (',' expr)*
//! expr     := term (('+' | '-') term)*
//! term     := unary (('*' | '/') unary)*
//! unary    := '-' unary | primary
//! primary  := NUMBER | CELL (':' CELL)? | IDENT '(' args? ')' | '(' args? ')' | IDENT
//! ```
//!
//! Nesting (parentheses, calls, unary minus and operator chains) is limited
//! to [`MAX_DEPTH`] levels; deeper input is a parse error.

use thiserror::Error;

use super::ast::{BinaryOp, Expr};
use super::lexer::{Spanned, Token, tokenize};

/// Deepest expression tree the parser will build.
pub const MAX_DEPTH: usize = 256;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("Parse error at {pos}: {message}")]
pub struct ParseError {
    pub message: String,
    pub pos: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, pos: usize) -> Self {
        ParseError {
            message: message.into(),
            pos,
        }
    }
}

/// Parse formula text (without the leading `=`) into its top-level,
/// comma-separated expressions.
pub fn parse_formula(input: &str) -> Result<Vec<Expr>, ParseError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let exprs = parser.parse_args()?;
    parser.expect(&Token::Eof, "end of formula")?;
    Ok(exprs)
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        // `tokenize` always ends with Eof, and Eof is never consumed past.
        &self.tokens[self.pos.min(self.tokens.len() - 1)].token
    }

    fn offset(&self) -> usize {
        self.tokens[self.pos.min(self.tokens.len() - 1)].pos
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token != Token::Eof {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: &Token, what: &str) -> Result<(), ParseError> {
        if self.peek() == expected {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::new(
                format!("expected {}, found {:?}", what, self.peek()),
                self.offset(),
            ))
        }
    }

    fn descend(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ParseError::new(
                format!("formula nested more than {} levels deep", MAX_DEPTH),
                self.offset(),
            ));
        }
        Ok(())
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = vec![self.parse_expr()?];
        while *self.peek() == Token::Comma {
            self.advance();
            args.push(self.parse_expr()?);
        }
        Ok(args)
    }

    /// Arguments inside parentheses; the opening `(` is already consumed.
    fn parse_call_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        if *self.peek() == Token::RightParen {
            self.advance();
            return Ok(Vec::new());
        }
        let args = self.parse_args()?;
        self.expect(&Token::RightParen, "')'")?;
        Ok(args)
    }

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let depth = self.depth;
        let mut lhs = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Subtract,
                _ => {
                    self.depth = depth;
                    return Ok(lhs);
                }
            };
            self.advance();
            self.descend()?;
            let rhs = self.parse_term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let depth = self.depth;
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Token::Star => BinaryOp::Multiply,
                Token::Slash => BinaryOp::Divide,
                _ => {
                    self.depth = depth;
                    return Ok(lhs);
                }
            };
            self.advance();
            self.descend()?;
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if *self.peek() == Token::Minus {
            self.advance();
            self.descend()?;
            let inner = self.parse_unary()?;
            self.depth -= 1;
            return Ok(Expr::Neg(Box::new(inner)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let pos = self.offset();
        match self.advance() {
            Token::Number(n) => Ok(Expr::Number(n)),
            Token::Cell(start) => {
                if *self.peek() != Token::Colon {
                    return Ok(Expr::Cell(start));
                }
                self.advance();
                match self.advance() {
                    Token::Cell(end) => Ok(Expr::Range(start, end)),
                    other => Err(ParseError::new(
                        format!("expected cell after ':', found {:?}", other),
                        self.offset(),
                    )),
                }
            }
            Token::Ident(name) => {
                if *self.peek() != Token::LeftParen {
                    return Ok(Expr::Name(name));
                }
                self.advance();
                self.descend()?;
                let args = self.parse_call_args()?;
                self.depth -= 1;
                Ok(Expr::Call { name, args })
            }
            Token::LeftParen => {
                self.descend()?;
                let args = self.parse_call_args()?;
                self.depth -= 1;
                Ok(Expr::Call {
                    name: String::new(),
                    args,
                })
            }
            other => Err(ParseError::new(format!("unexpected {:?}", other), pos)),
        }
    }
}
