use pivotdb_error::{DbError, Result};
use serde::{Deserialize, Serialize};

use super::{AstParseable, Ident, PathExpr};
use crate::keywords::{Keyword, is_reserved_property};
use crate::parser::Parser;
use crate::tokens::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOperator {
    /// Minus, e.g. `-9`
    Minus,
    /// Not, e.g. `NOT ISEMPTY(x)`
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    /// Plus, e.g. `a + b`
    Plus,
    /// Minus, e.g. `a - b`
    Minus,
    /// Multiply, e.g. `a * b`
    Multiply,
    /// Divide, e.g. `a / b`
    Divide,
    /// Equal, e.g. `a = b`
    Eq,
    /// Not equal, e.g. `a <> b`
    NotEq,
    /// Less than, e.g. `a < b`
    Lt,
    /// Less equal, e.g. `a <= b`
    LtEq,
    /// Greater than, e.g. `a > b`
    Gt,
    /// Greater equal, e.g. `a >= b`
    GtEq,
    /// And, e.g. `a AND b`
    And,
    /// Or, e.g. `a OR b`
    Or,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Literal {
    /// Unparsed number literal.
    Number(String),
    /// String literal.
    String(String),
    /// Bare symbol literal, e.g. the `BASC` sort flag.
    Symbol(String),
}

/// A function call, either function syntax `F(a, b)` or method syntax
/// `a.F(b)` with the base flattened into the first argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: Ident,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// A member path literal.
    Path(PathExpr),
    /// An expression literal.
    Literal(Literal),
    /// A function call.
    Call(FunctionCall),
    /// A reserved property access, e.g. `[Store].CURRENTMEMBER`.
    Property { expr: Box<Expr>, name: Ident },
    /// A set constructor, e.g. `{[a], [b]}`.
    Set(Vec<Expr>),
    /// A tuple, e.g. `([a], [b])`. Also produced for parenthesized
    /// expressions.
    Tuple(Vec<Expr>),
    /// A unary expression.
    UnaryExpr {
        op: UnaryOperator,
        expr: Box<Expr>,
    },
    /// A binary expression.
    BinaryExpr {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },
}

impl AstParseable for Expr {
    fn parse(parser: &mut Parser) -> Result<Self> {
        Self::parse_subexpr(parser, 0)
    }
}

// Precedences, ordered low to high.
const PREC_OR: u8 = 10;
const PREC_AND: u8 = 20;
const PREC_NOT: u8 = 30;
const PREC_COMPARISON: u8 = 50;
const PREC_ADD_SUB: u8 = 80;
const PREC_MUL_DIV: u8 = 90;
const PREC_UNARY: u8 = 100;

impl Expr {
    fn parse_subexpr(parser: &mut Parser, precedence: u8) -> Result<Self> {
        let mut expr = Expr::parse_prefix(parser)?;

        loop {
            let next_precedence = Self::get_infix_precedence(parser);
            if precedence >= next_precedence {
                break;
            }

            expr = Self::parse_infix(parser, expr, next_precedence)?;
        }

        Ok(expr)
    }

    fn parse_prefix(parser: &mut Parser) -> Result<Self> {
        let tok = match parser.peek() {
            Some(tok) => tok.token.clone(),
            None => {
                return Err(DbError::new(
                    "Expected prefix expression, found end of statement",
                ));
            }
        };

        let expr = match tok {
            Token::Word(w) => match w.keyword {
                Some(Keyword::NOT) => {
                    parser.next();
                    let expr = Self::parse_subexpr(parser, PREC_NOT)?;
                    return Ok(Expr::UnaryExpr {
                        op: UnaryOperator::Not,
                        expr: Box::new(expr),
                    });
                }
                Some(
                    Keyword::ASC | Keyword::DESC | Keyword::BASC | Keyword::BDESC,
                ) => {
                    parser.next();
                    Expr::Literal(Literal::Symbol(w.value))
                }
                _ => {
                    if w.quote.is_none()
                        && matches!(
                            parser.peek_nth(1).map(|t| &t.token),
                            Some(Token::LeftParen)
                        )
                    {
                        parser.next();
                        parser.next();
                        let args = Self::parse_call_args(parser)?;
                        Expr::Call(FunctionCall {
                            name: Ident { value: w.value },
                            args,
                        })
                    } else {
                        Expr::Path(PathExpr::parse(parser)?)
                    }
                }
            },
            Token::Number(_) => match parser.next().map(|t| t.token.clone()) {
                Some(Token::Number(n)) => Expr::Literal(Literal::Number(n)),
                _ => unreachable!("peeked token"),
            },
            Token::SingleQuotedString(_) => match parser.next().map(|t| t.token.clone()) {
                Some(Token::SingleQuotedString(s)) => Expr::Literal(Literal::String(s)),
                _ => unreachable!("peeked token"),
            },
            Token::Minus => {
                parser.next();
                let expr = Self::parse_subexpr(parser, PREC_UNARY)?;
                return Ok(Expr::UnaryExpr {
                    op: UnaryOperator::Minus,
                    expr: Box::new(expr),
                });
            }
            Token::Plus => {
                // Nothing to do, just parse and return the inner expression.
                parser.next();
                return Self::parse_subexpr(parser, PREC_UNARY);
            }
            Token::LeftBrace => {
                parser.next();
                if parser.consume_token(&Token::RightBrace) {
                    Expr::Set(Vec::new())
                } else {
                    let exprs = parser.parse_comma_separated(Expr::parse)?;
                    parser.expect_token(&Token::RightBrace)?;
                    Expr::Set(exprs)
                }
            }
            Token::LeftParen => {
                parser.next();
                let exprs = parser.parse_comma_separated(Expr::parse)?;
                parser.expect_token(&Token::RightParen)?;
                Expr::Tuple(exprs)
            }
            other => {
                return Err(DbError::new(format!(
                    "Unexpected token '{other}'. Expected expression."
                )));
            }
        };

        Self::parse_postfix(parser, expr)
    }

    /// Parse a chain of property accesses and method calls following an
    /// expression.
    fn parse_postfix(parser: &mut Parser, mut expr: Expr) -> Result<Self> {
        loop {
            if !matches!(parser.peek().map(|t| &t.token), Some(Token::Period)) {
                break;
            }

            let word = match parser.peek_nth(1).map(|t| t.token.clone()) {
                Some(Token::Word(w)) if w.quote.is_none() => w,
                _ => break,
            };

            if matches!(
                parser.peek_nth(2).map(|t| &t.token),
                Some(Token::LeftParen)
            ) {
                // Method syntax: base becomes the first argument.
                parser.next();
                parser.next();
                parser.next();
                let mut args = Self::parse_call_args(parser)?;
                args.insert(0, expr);
                expr = Expr::Call(FunctionCall {
                    name: Ident { value: word.value },
                    args,
                });
            } else if is_reserved_property(&word.value) {
                parser.next();
                parser.next();
                expr = Expr::Property {
                    expr: Box::new(expr),
                    name: Ident { value: word.value },
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// Parse call arguments, the opening paren already consumed.
    fn parse_call_args(parser: &mut Parser) -> Result<Vec<Expr>> {
        if parser.consume_token(&Token::RightParen) {
            return Ok(Vec::new());
        }
        let args = parser.parse_comma_separated(Expr::parse)?;
        parser.expect_token(&Token::RightParen)?;
        Ok(args)
    }

    /// Get the relative precedence of the next operator.
    fn get_infix_precedence(parser: &mut Parser) -> u8 {
        let tok = match parser.peek() {
            Some(tok) => &tok.token,
            None => return 0,
        };

        match tok {
            Token::Word(w) if w.keyword == Some(Keyword::OR) => PREC_OR,
            Token::Word(w) if w.keyword == Some(Keyword::AND) => PREC_AND,

            Token::Eq | Token::Neq | Token::Lt | Token::LtEq | Token::Gt | Token::GtEq => {
                PREC_COMPARISON
            }

            Token::Plus | Token::Minus => PREC_ADD_SUB,
            Token::Mul | Token::Div => PREC_MUL_DIV,

            _ => 0,
        }
    }

    fn parse_infix(parser: &mut Parser, prefix: Expr, precedence: u8) -> Result<Self> {
        let tok = match parser.next() {
            Some(tok) => &tok.token,
            None => {
                return Err(DbError::new(
                    "Expected infix expression, found end of statement",
                ));
            }
        };

        let op = match tok {
            Token::Eq => BinaryOperator::Eq,
            Token::Neq => BinaryOperator::NotEq,
            Token::Lt => BinaryOperator::Lt,
            Token::LtEq => BinaryOperator::LtEq,
            Token::Gt => BinaryOperator::Gt,
            Token::GtEq => BinaryOperator::GtEq,
            Token::Plus => BinaryOperator::Plus,
            Token::Minus => BinaryOperator::Minus,
            Token::Mul => BinaryOperator::Multiply,
            Token::Div => BinaryOperator::Divide,
            Token::Word(w) if w.keyword == Some(Keyword::AND) => BinaryOperator::And,
            Token::Word(w) if w.keyword == Some(Keyword::OR) => BinaryOperator::Or,
            other => {
                return Err(DbError::new(format!(
                    "Unable to parse token {other} as an expression"
                )));
            }
        };

        Ok(Expr::BinaryExpr {
            left: Box::new(prefix),
            op,
            right: Box::new(Self::parse_subexpr(parser, precedence)?),
        })
    }
}
