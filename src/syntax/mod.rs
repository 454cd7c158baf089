//! Syntax module for the deflang language.
//!
//! Turns source text into a sequence of top-level [`Node`]s with a hand-written,
//! character-level recursive descent parser. The surface grammar is:
//!
//! - call: `(` name args... `)` where the name is a term or a single operator
//! - argument list: `[` `name:Type`... `]`
//! - number: a digit run with at most one `.`
//! - term: an ASCII letter followed by letters, digits or `_`
//! - operator: one of `+ - / * %`
//!
//! Space and newline separate tokens; no other whitespace is recognised.
//! Calls and argument lists nest at most [`parser::MAX_DEPTH`] levels deep.
//! The first error aborts the parse.

use crate::ast::Node;
use crate::DeflangError;

pub mod parser;

/// Name given to sources parsed without a file name.
pub const ANONYMOUS_SOURCE: &str = "source";

/// Parses source text into its top-level nodes.
pub fn parse(source: &str) -> Result<Vec<Node>, DeflangError> {
    parse_named(ANONYMOUS_SOURCE, source)
}

/// Parses source text, naming it `name` in any diagnostic.
pub fn parse_named(name: &str, source: &str) -> Result<Vec<Node>, DeflangError> {
    parser::Parser::new(name, source).parse()
}
