//! Shared helpers for the deflang integration tests.

#![allow(dead_code)]

use deflang::{DeflangError, Node};
use serde_json::Value;

/// Parses `source`, panicking with the diagnostic on failure.
pub fn parse_ok(source: &str) -> Vec<Node> {
    deflang::parse(source).unwrap_or_else(|e| panic!("`{source}` failed to parse: {e}"))
}

/// Parses `source`, panicking if it succeeds.
pub fn parse_err(source: &str) -> DeflangError {
    match deflang::parse(source) {
        Ok(nodes) => panic!("expected `{source}` to fail, got {nodes:?}"),
        Err(e) => e,
    }
}

/// Parses and expands `source`.
pub fn expand(source: &str) -> Result<Vec<Node>, DeflangError> {
    deflang::expand_defs(parse_ok(source))
}

/// JSON inspection form of a node sequence.
pub fn json(nodes: &[Node]) -> Value {
    deflang::ast::to_json_array(nodes)
}
