//! The `def` expansion.
//!
//! `(def name [arg:Type ...] body...)` is promoted from a plain call into a
//! [`Def`] node. It runs as a `Call` handler, so nested `def` forms inside a body
//! are expanded before the enclosing one is inspected.

use crate::ast::{Call, Def, Node, NodeKind};
use crate::{err_ctx, DeflangError};

use super::{rewrite, Handlers};

/// Head identifier recognised by the expansion.
pub const DEF_KEYWORD: &str = "def";

const DEF_USAGE: &str = "write definitions as `(def name [arg:Type ...] body...)`";

/// `Call` handler that turns a `def` call into a [`Def`] node.
///
/// Calls with any other head are returned unchanged.
pub fn expand_def(node: Node) -> Result<Node, DeflangError> {
    let call = match node {
        Node::Call(call) => call,
        other => {
            return Err(err_ctx!(
                Internal,
                format!("def expansion received a {} node", other.kind()),
                other.line()
            ))
        }
    };
    if !call.is_named(DEF_KEYWORD) {
        return Ok(Node::Call(call));
    }

    let Call { line, args, .. } = call;
    let mut args = args.into_iter();

    let name = match args.next() {
        Some(Node::Term(term)) => term,
        found => {
            return Err(err_ctx!(
                Validation,
                format!("expected a valid name after `def`, found {}", describe(found.as_ref())),
                line,
                help = DEF_USAGE
            ))
        }
    };
    let params = match args.next() {
        Some(Node::ArgList(list)) => list,
        found => {
            return Err(err_ctx!(
                Validation,
                format!(
                    "expected an argument list after `def {}`, found {}",
                    name.text,
                    describe(found.as_ref())
                ),
                line,
                help = DEF_USAGE
            ))
        }
    };

    Ok(Node::Def(Def::new(line, name, params, args.collect())))
}

/// Handler set performing the `def` expansion.
pub fn def_handlers<'h>() -> Handlers<'h> {
    Handlers::new().on(NodeKind::Call, expand_def)
}

/// Expands every `def` call in `nodes`.
pub fn expand_defs(nodes: Vec<Node>) -> Result<Vec<Node>, DeflangError> {
    rewrite(nodes, &def_handlers())
}

fn describe(node: Option<&Node>) -> String {
    match node {
        Some(node) => format!("{} `{}`", node.kind(), node.pretty()),
        None => "nothing".to_string(),
    }
}
