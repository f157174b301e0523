pub mod expr;
pub use expr::*;
pub mod query;
pub use query::*;

use std::fmt;

use pivotdb_error::{DbError, Result};
use serde::{Deserialize, Serialize};

use crate::keywords::is_reserved_property;
use crate::parser::Parser;
use crate::tokens::Token;

pub trait AstParseable: Sized {
    /// Parse an instance of Self from the provided parser.
    ///
    /// It's assumed that the parser is in the correct state for parsing Self,
    /// and if it isn't, an error should be returned.
    fn parse(parser: &mut Parser) -> Result<Self>;
}

/// A plain identifier (axis names, cube names, property names).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Ident {
    pub value: String,
}

impl Ident {
    pub fn from_string(s: impl Into<String>) -> Self {
        Ident { value: s.into() }
    }
}

impl AstParseable for Ident {
    fn parse(parser: &mut Parser) -> Result<Self> {
        let tok = match parser.next() {
            Some(tok) => &tok.token,
            None => {
                return Err(DbError::new(
                    "Expected identifier, found end of statement",
                ));
            }
        };

        match tok {
            Token::Word(w) => Ok(Ident {
                value: w.value.clone(),
            }),
            other => Err(DbError::new(format!(
                "Unexpected token: {other}. Expected an identifier.",
            ))),
        }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Identity of a path expression node within a statement.
///
/// Assigned by the parser in parse order. The resolver's output map is keyed
/// by these ids so downstream binding can correlate resolved members back to
/// the nodes they came from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PathId(pub u32);

/// A single segment of a member path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathSegment {
    /// A name segment, e.g. `[Dairy]` or a bare `Dairy`.
    Name {
        value: String,
        /// True if the segment was bracket-quoted in the source. Formatting
        /// only, ignored for equality by the resolver.
        quoted: bool,
    },
    /// A key segment, e.g. `&[1997]` or a composite `&[1997]&[Q1]`.
    Key(Vec<String>),
}

impl PathSegment {
    pub fn plain(value: impl Into<String>) -> Self {
        PathSegment::Name {
            value: value.into(),
            quoted: false,
        }
    }

    pub fn quoted(value: impl Into<String>) -> Self {
        PathSegment::Name {
            value: value.into(),
            quoted: true,
        }
    }

    /// Get the segment name if this is a name segment.
    pub fn name(&self) -> Option<&str> {
        match self {
            PathSegment::Name { value, .. } => Some(value),
            PathSegment::Key(_) => None,
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Name { value, .. } => {
                write!(f, "[{}]", value.replace(']', "]]"))
            }
            PathSegment::Key(values) => {
                for value in values {
                    write!(f, "&[{}]", value.replace(']', "]]"))?;
                }
                Ok(())
            }
        }
    }
}

/// A dotted member path, e.g. `[Product].[Food].[Dairy]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathExpr {
    pub id: PathId,
    pub segments: Vec<PathSegment>,
}

impl PathExpr {
    /// Create a path from name segments.
    ///
    /// Useful in tests, probably unlikely that it should be used anywhere
    /// else.
    pub fn from_names<S>(id: PathId, names: impl IntoIterator<Item = S>) -> Self
    where
        S: Into<String>,
    {
        PathExpr {
            id,
            segments: names.into_iter().map(PathSegment::quoted).collect(),
        }
    }
}

impl AstParseable for PathExpr {
    fn parse(parser: &mut Parser) -> Result<Self> {
        let first = match parser.next() {
            Some(tok) => match &tok.token {
                Token::Word(w) => PathSegment::Name {
                    value: w.value.clone(),
                    quoted: w.quote.is_some(),
                },
                other => {
                    return Err(DbError::new(format!(
                        "Unexpected token: {other}. Expected a member path.",
                    )));
                }
            },
            None => {
                return Err(DbError::new(
                    "Expected member path, found end of statement",
                ));
            }
        };

        let mut segments = vec![first];
        loop {
            if !matches!(parser.peek().map(|t| &t.token), Some(Token::Period)) {
                break;
            }

            match parser.peek_nth(1).map(|t| t.token.clone()) {
                Some(Token::Word(w)) => {
                    // An unquoted word continues the path unless it's a
                    // reserved property or a method call; those belong to the
                    // expression layer.
                    if w.quote.is_none() {
                        if is_reserved_property(&w.value) {
                            break;
                        }
                        if matches!(
                            parser.peek_nth(2).map(|t| &t.token),
                            Some(Token::LeftParen)
                        ) {
                            break;
                        }
                    }
                    parser.next();
                    parser.next();
                    segments.push(PathSegment::Name {
                        value: w.value,
                        quoted: w.quote.is_some(),
                    });
                }
                Some(Token::Ampersand) => {
                    parser.next();
                    parser.next();
                    segments.push(Self::parse_key_segment(parser)?);
                }
                _ => break,
            }
        }

        Ok(PathExpr {
            id: parser.next_path_id(),
            segments,
        })
    }
}

impl PathExpr {
    /// Parse a key segment, the leading '&' already consumed.
    fn parse_key_segment(parser: &mut Parser) -> Result<PathSegment> {
        let mut values = vec![Self::parse_key_value(parser)?];
        while parser.consume_token(&Token::Ampersand) {
            values.push(Self::parse_key_value(parser)?);
        }
        Ok(PathSegment::Key(values))
    }

    fn parse_key_value(parser: &mut Parser) -> Result<String> {
        match parser.next() {
            Some(tok) => match &tok.token {
                Token::Word(w) if w.quote.is_some() => Ok(w.value.clone()),
                other => Err(DbError::new(format!(
                    "Unexpected token: {other}. Expected a bracketed key value.",
                ))),
            },
            None => Err(DbError::new(
                "Expected key value, found end of statement",
            )),
        }
    }
}

impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, segment) in self.segments.iter().enumerate() {
            if idx > 0 {
                write!(f, ".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::testutil::parse_ast;
    use super::*;

    #[test]
    fn parse_simple_path() {
        let path: PathExpr = parse_ast("[Product].[Food].[Dairy]").unwrap();
        assert_eq!(
            PathExpr::from_names(PathId(0), ["Product", "Food", "Dairy"]),
            path,
        );
    }

    #[test]
    fn parse_mixed_quoting() {
        let path: PathExpr = parse_ast("time.foo").unwrap();
        assert_eq!(
            vec![PathSegment::plain("time"), PathSegment::plain("foo")],
            path.segments,
        );
    }

    #[test]
    fn parse_path_stops_at_reserved_property() {
        let path: PathExpr = parse_ast("[Time.Weekly].CurrentMember").unwrap();
        assert_eq!(vec![PathSegment::quoted("Time.Weekly")], path.segments);
    }

    #[test]
    fn parse_path_keeps_unreserved_word_segment() {
        let path: PathExpr = parse_ast("[Time.Weekly].Week").unwrap();
        assert_eq!(
            vec![
                PathSegment::quoted("Time.Weekly"),
                PathSegment::plain("Week"),
            ],
            path.segments,
        );
    }

    #[test]
    fn parse_key_segment() {
        let path: PathExpr = parse_ast("[Time].&[1997]&[Q1]").unwrap();
        assert_eq!(
            vec![
                PathSegment::quoted("Time"),
                PathSegment::Key(vec!["1997".to_string(), "Q1".to_string()]),
            ],
            path.segments,
        );
    }

    #[test]
    fn display_roundtrip() {
        let path: PathExpr = parse_ast("[Store Size in SQFT].[#null]").unwrap();
        assert_eq!("[Store Size in SQFT].[#null]", path.to_string());
    }
}
