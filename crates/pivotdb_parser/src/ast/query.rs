use pivotdb_error::{DbError, Result, ResultExt};
use serde::{Deserialize, Serialize};

use super::{AstParseable, Expr, Ident, PathExpr};
use crate::keywords::Keyword;
use crate::parser::Parser;
use crate::tokens::Token;

/// A parsed SELECT statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectStatement {
    /// WITH MEMBER/SET formulas, in declaration order.
    pub formulas: Vec<Formula>,
    /// Query axes, in declaration order.
    pub axes: Vec<QueryAxis>,
    /// The cube being queried.
    pub cube: Ident,
    /// Optional WHERE slicer expression.
    pub slicer: Option<Expr>,
    /// CELL PROPERTIES names.
    pub cell_properties: Vec<Ident>,
}

/// A WITH clause formula defining a calculated member or named set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Formula {
    Member {
        /// The name being defined. Not a member reference.
        name: PathExpr,
        body: Expr,
        /// Trailing property assignments, e.g. `FORMAT_STRING = 'Standard'`.
        properties: Vec<MemberProperty>,
    },
    Set {
        name: PathExpr,
        body: Expr,
    },
}

impl Formula {
    pub fn name(&self) -> &PathExpr {
        match self {
            Formula::Member { name, .. } => name,
            Formula::Set { name, .. } => name,
        }
    }

    pub fn body(&self) -> &Expr {
        match self {
            Formula::Member { body, .. } => body,
            Formula::Set { body, .. } => body,
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Formula::Set { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberProperty {
    pub name: Ident,
    pub value: Expr,
}

/// A query axis, e.g. `NON EMPTY [*SORTED_ROW_AXIS] ON ROWS`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryAxis {
    pub non_empty: bool,
    pub expr: Expr,
    pub name: AxisName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisName {
    Columns,
    Rows,
    /// An explicit ordinal, `ON 2` or `ON AXIS(2)`.
    Ordinal(u64),
}

impl AstParseable for SelectStatement {
    fn parse(parser: &mut Parser) -> Result<Self> {
        let mut formulas = Vec::new();
        if parser.parse_keyword(Keyword::WITH) {
            loop {
                if parser.parse_keyword(Keyword::MEMBER) {
                    formulas.push(Formula::parse_member(parser)?);
                } else if parser.parse_keyword(Keyword::SET) {
                    formulas.push(Formula::parse_set(parser)?);
                } else {
                    break;
                }
            }
            if formulas.is_empty() {
                return Err(DbError::new("Expected MEMBER or SET after WITH"));
            }
        }

        parser.expect_keyword(Keyword::SELECT)?;

        let mut axes = Vec::new();
        let at_from = matches!(parser.peek(), Some(tok) if tok.is_keyword(Keyword::FROM));
        if !at_from {
            axes = parser.parse_comma_separated(QueryAxis::parse)?;
        }

        parser.expect_keyword(Keyword::FROM)?;
        let cube = Ident::parse(parser)?;

        let slicer = match parser.parse_keyword(Keyword::WHERE) {
            true => Some(Expr::parse(parser)?),
            false => None,
        };

        let cell_properties =
            match parser.parse_keyword_sequence(&[Keyword::CELL, Keyword::PROPERTIES]) {
                true => parser.parse_comma_separated(Ident::parse)?,
                false => Vec::new(),
            };

        Ok(SelectStatement {
            formulas,
            axes,
            cube,
            slicer,
            cell_properties,
        })
    }
}

impl Formula {
    /// Parse a MEMBER formula, the MEMBER keyword already consumed.
    fn parse_member(parser: &mut Parser) -> Result<Self> {
        let name = PathExpr::parse(parser)?;
        parser.expect_keyword(Keyword::AS)?;
        let body = Self::parse_body(parser)?;

        // Trailing `, NAME = <expr>` property assignments.
        let mut properties = Vec::new();
        loop {
            if !matches!(parser.peek().map(|t| &t.token), Some(Token::Comma)) {
                break;
            }
            let is_assignment = matches!(
                parser.peek_nth(1).map(|t| &t.token),
                Some(Token::Word(w)) if w.quote.is_none()
            ) && matches!(parser.peek_nth(2).map(|t| &t.token), Some(Token::Eq));
            if !is_assignment {
                break;
            }

            parser.next();
            let name = Ident::parse(parser)?;
            parser.expect_token(&Token::Eq)?;
            let value = Expr::parse(parser)?;
            properties.push(MemberProperty { name, value });
        }

        Ok(Formula::Member {
            name,
            body,
            properties,
        })
    }

    /// Parse a SET formula, the SET keyword already consumed.
    fn parse_set(parser: &mut Parser) -> Result<Self> {
        let name = PathExpr::parse(parser)?;
        parser.expect_keyword(Keyword::AS)?;
        let body = Self::parse_body(parser)?;
        Ok(Formula::Set { name, body })
    }

    /// Parse a formula body, either a bare expression or an expression inside
    /// a quoted string.
    fn parse_body(parser: &mut Parser) -> Result<Expr> {
        if let Some(Token::SingleQuotedString(_)) = parser.peek().map(|t| &t.token) {
            let source = match parser.next().map(|t| t.token.clone()) {
                Some(Token::SingleQuotedString(s)) => s,
                _ => unreachable!("peeked token"),
            };
            return parser.parse_embedded_expr(&source);
        }
        Expr::parse(parser)
    }
}

impl AstParseable for QueryAxis {
    fn parse(parser: &mut Parser) -> Result<Self> {
        let non_empty = parser.parse_keyword_sequence(&[Keyword::NON, Keyword::EMPTY]);
        let expr = Expr::parse(parser)?;
        parser.expect_keyword(Keyword::ON)?;
        let name = AxisName::parse(parser)?;

        Ok(QueryAxis {
            non_empty,
            expr,
            name,
        })
    }
}

impl AstParseable for AxisName {
    fn parse(parser: &mut Parser) -> Result<Self> {
        match parser.parse_one_of_keywords(&[Keyword::COLUMNS, Keyword::ROWS, Keyword::AXIS]) {
            Some(Keyword::COLUMNS) => Ok(AxisName::Columns),
            Some(Keyword::ROWS) => Ok(AxisName::Rows),
            Some(Keyword::AXIS) => {
                parser.expect_token(&Token::LeftParen)?;
                let ordinal = Self::parse_ordinal(parser)?;
                parser.expect_token(&Token::RightParen)?;
                Ok(AxisName::Ordinal(ordinal))
            }
            _ => Ok(AxisName::Ordinal(Self::parse_ordinal(parser)?)),
        }
    }
}

impl AxisName {
    fn parse_ordinal(parser: &mut Parser) -> Result<u64> {
        let tok = match parser.next() {
            Some(tok) => &tok.token,
            None => {
                return Err(DbError::new(
                    "Expected axis ordinal, found end of statement",
                ));
            }
        };
        match tok {
            Token::Number(n) => {
                let n = n.clone();
                n.parse::<u64>()
                    .context_fn(|| format!("Invalid axis ordinal: {n}"))
            }
            other => Err(DbError::new(format!(
                "Expected axis ordinal, got {other}"
            ))),
        }
    }
}
