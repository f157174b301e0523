pub mod ast;
pub mod keywords;
pub mod parser;
pub mod tokens;

use ast::SelectStatement;
use parser::Parser;
use pivotdb_error::Result;

/// Parse a query string into a statement.
pub fn parse(query: &str) -> Result<SelectStatement> {
    let mut parser = Parser::with_query_string(query)?;
    parser.parse_statement()
}
