//! The metric definition language (MDL) frontend.
//!
//! MDL is the small expression language operators write metric definitions
//! in. A definition combines registered metrics, makers, and dimension
//! filters:
//!
//! - `revenue - cost` - arithmetic over registered metrics
//! - `dayAvg(clicks)` - maker invocation
//! - `impressions | country == US` - filter applied to a metric
//! - `(revenue - cost) / revenue * 100` - the usual grouping rules
//!
//! The frontend is two passes: [`lexer::lex`] turns the definition string
//! into typed tokens, and [`parser::Parser`] reduces them into a single
//! root [`Operand`] via an operator-precedence (shunting-yard) engine.
//! Identifier and maker resolution is deferred to materialization, so
//! parsing needs no dictionaries.
//!
//! # Example
//!
//! ```
//! use cricket::mdl;
//!
//! let root = mdl::parse("revenue - cost")?;
//! assert!(root.is_metric());
//! # Ok::<(), cricket::mdl::MdlError>(())
//! ```

pub mod ast;
pub mod lexer;
pub mod parser;

pub use ast::{ArithmeticOp, FilterKind, Literal, Operand, Operator, Precedence};
pub use lexer::{lex, LexError, Lexeme, TokenKind};
pub use parser::{ParseError, Parser};

use thiserror::Error;

/// A frontend failure: either no viable token or a grammar violation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MdlError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Lex and parse a definition string into its root operand.
pub fn parse(definition: &str) -> Result<Operand, MdlError> {
    let tokens = lexer::lex(definition)?;
    Ok(Parser::new(&tokens).parse()?)
}
