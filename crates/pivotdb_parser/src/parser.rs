use pivotdb_error::{DbError, Result, ResultExt, not_implemented};

use crate::ast::{AstParseable, Expr, PathId, SelectStatement};
use crate::keywords::Keyword;
use crate::tokens::{Token, TokenWithLocation, Tokenizer};

#[derive(Debug)]
pub struct Parser {
    toks: Vec<TokenWithLocation>,
    /// Index of token we should process next.
    idx: usize,
    /// Next id to hand out for a path expression node.
    next_path_id: u32,
}

impl Parser {
    pub fn with_tokens(toks: Vec<TokenWithLocation>) -> Self {
        Parser {
            toks,
            idx: 0,
            next_path_id: 0,
        }
    }

    pub fn with_query_string(query: &str) -> Result<Self> {
        let toks = Tokenizer::new(query)
            .tokenize()
            .context("Failed to tokenize query")?;
        Ok(Self::with_tokens(toks))
    }

    /// Parse a complete SELECT statement, erroring on trailing tokens.
    pub fn parse_statement(&mut self) -> Result<SelectStatement> {
        if let Some(tok) = self.peek() {
            if tok.is_keyword(Keyword::DRILLTHROUGH) {
                not_implemented!("DRILLTHROUGH statements");
            }
        }

        let statement = SelectStatement::parse(self)?;
        // Trailing semicolon is allowed, anything else is not.
        self.consume_token(&Token::SemiColon);
        if let Some(tok) = self.next() {
            return Err(
                DbError::new("Unexpected token after statement").with_field("token", &tok.token)
            );
        }
        Ok(statement)
    }

    /// Parse an expression from a separate source string, keeping path ids
    /// unique across the enclosing statement.
    ///
    /// Used for formula bodies provided as quoted strings.
    pub(crate) fn parse_embedded_expr(&mut self, source: &str) -> Result<Expr> {
        let toks = Tokenizer::new(source).tokenize()?;
        let mut sub = Parser {
            toks,
            idx: 0,
            next_path_id: self.next_path_id,
        };
        let expr = Expr::parse(&mut sub)?;
        if let Some(tok) = sub.next() {
            return Err(DbError::new(format!(
                "Unexpected token after expression: {}",
                tok.token
            )));
        }
        self.next_path_id = sub.next_path_id;
        Ok(expr)
    }

    pub(crate) fn next_path_id(&mut self) -> PathId {
        let id = PathId(self.next_path_id);
        self.next_path_id += 1;
        id
    }

    /// Parse a single keyword.
    pub(crate) fn parse_keyword(&mut self, keyword: Keyword) -> bool {
        let idx = self.idx;
        if let Some(tok) = self.next() {
            if tok.is_keyword(keyword) {
                return true;
            }
        }

        // Keyword doesn't match. Reset index and return.
        self.idx = idx;
        false
    }

    /// Parse an exact sequence of keywords.
    ///
    /// If the sequence doesn't match, idx is not changed, and false is
    /// returned.
    pub(crate) fn parse_keyword_sequence(&mut self, keywords: &[Keyword]) -> bool {
        let idx = self.idx;
        for keyword in keywords {
            if let Some(tok) = self.next() {
                if tok.is_keyword(*keyword) {
                    continue;
                }
            }

            // Keyword doesn't match. Reset index and return.
            self.idx = idx;
            return false;
        }
        true
    }

    /// Parse any one of the provided keywords, returning which one matched.
    pub(crate) fn parse_one_of_keywords(&mut self, keywords: &[Keyword]) -> Option<Keyword> {
        let idx = self.idx;
        let kw = match self.next() {
            Some(tok) => tok.keyword(),
            None => return None,
        };

        if let Some(kw) = kw {
            if keywords.contains(&kw) {
                return Some(kw);
            }
        }

        // No matches, reset index.
        self.idx = idx;
        None
    }

    pub(crate) fn expect_keyword(&mut self, keyword: Keyword) -> Result<()> {
        if !self.parse_keyword(keyword) {
            return Err(match self.peek() {
                Some(tok) => DbError::new(format!("Expected {keyword:?}, got {}", tok.token)),
                None => DbError::new(format!("Expected {keyword:?}, found end of statement")),
            });
        }
        Ok(())
    }

    /// Consume the given token if it's the next one, returning whether it was
    /// consumed.
    pub(crate) fn consume_token(&mut self, expected: &Token) -> bool {
        let idx = self.idx;
        if let Some(tok) = self.next() {
            if &tok.token == expected {
                return true;
            }
        }
        self.idx = idx;
        false
    }

    pub(crate) fn expect_token(&mut self, expected: &Token) -> Result<()> {
        if !self.consume_token(expected) {
            return Err(match self.peek() {
                Some(tok) => DbError::new(format!("Expected {expected}, got {}", tok.token)),
                None => DbError::new(format!("Expected {expected}, found end of statement")),
            });
        }
        Ok(())
    }

    /// Parse a comma separated list of items.
    pub(crate) fn parse_comma_separated<T>(
        &mut self,
        mut parse: impl FnMut(&mut Parser) -> Result<T>,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        loop {
            items.push(parse(self)?);
            if !self.consume_token(&Token::Comma) {
                break;
            }
        }
        Ok(items)
    }

    /// Get the next non-whitespace token.
    pub(crate) fn next(&mut self) -> Option<&TokenWithLocation> {
        loop {
            if self.idx >= self.toks.len() {
                return None;
            }

            let tok = &self.toks[self.idx];
            self.idx += 1;

            if matches!(&tok.token, Token::Whitespace) {
                continue;
            }

            return Some(tok);
        }
    }

    /// Peek at the next non-whitespace token without consuming it.
    pub(crate) fn peek(&mut self) -> Option<&TokenWithLocation> {
        self.peek_nth(0)
    }

    /// Peek at the nth (0-indexed) non-whitespace token ahead of the current
    /// position.
    pub(crate) fn peek_nth(&mut self, n: usize) -> Option<&TokenWithLocation> {
        let mut remaining = n;
        for tok in self.toks[self.idx.min(self.toks.len())..].iter() {
            if matches!(tok.token, Token::Whitespace) {
                continue;
            }
            if remaining == 0 {
                return Some(tok);
            }
            remaining -= 1;
        }
        None
    }
}
