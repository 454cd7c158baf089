//! # deflang Rewrite Engine
//!
//! Purely syntactic, bottom-up transformation of the tree. A pass is driven by a
//! partial [`Handlers`] set: one optional handler per [`NodeKind`]. Variants without
//! a handler pass through unchanged.
//!
//! ## Core Principles
//!
//! - **Post-order**: children are rewritten before the handler for their parent runs,
//!   so a handler always sees already-rewritten children.
//! - **Reconstruction**: the engine rebuilds nodes rather than mutating them; a call keeps
//!   its name and line and receives the rewritten arguments.
//! - **Closed shapes**: an `ArgList` handler must return an `ArgList`, and an `Arg`
//!   handler running inside a list must return an `Arg`. Anything else is a structural
//!   error.
//! - **Fatal errors**: the first handler error, in post-order, aborts the whole pass.
//!
//! The `def` expansion in [`def`] is the reference pass.

use std::collections::HashMap;
use std::fmt;

use crate::ast::{Arg, ArgList, Call, Def, Node, NodeKind};
use crate::{err_ctx, DeflangError};

pub mod def;

pub use def::{def_handlers, expand_def, expand_defs, DEF_KEYWORD};

// ============================================================================
// HANDLER SET
// ============================================================================

/// A transformer for one node variant.
pub type Handler<'h> = Box<dyn Fn(Node) -> Result<Node, DeflangError> + 'h>;

/// Partial map from node variant to handler.
#[derive(Default)]
pub struct Handlers<'h> {
    table: HashMap<NodeKind, Handler<'h>>,
}

impl<'h> Handlers<'h> {
    /// An empty set; rewriting with it is the identity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `kind`, replacing any previous one.
    pub fn on<F>(mut self, kind: NodeKind, handler: F) -> Self
    where
        F: Fn(Node) -> Result<Node, DeflangError> + 'h,
    {
        self.table.insert(kind, Box::new(handler));
        self
    }

    pub fn contains(&self, kind: NodeKind) -> bool {
        self.table.contains_key(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Runs the handler registered for the node's variant, or returns the node as is.
    fn apply(&self, node: Node) -> Result<Node, DeflangError> {
        match self.table.get(&node.kind()) {
            Some(handler) => handler(node),
            None => Ok(node),
        }
    }
}

impl fmt::Debug for Handlers<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<NodeKind> = NodeKind::ALL
            .into_iter()
            .filter(|kind| self.contains(*kind))
            .collect();
        f.debug_struct("Handlers").field("kinds", &kinds).finish()
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Rewrites each node of `nodes`, producing one output node per input node.
pub fn rewrite(nodes: Vec<Node>, handlers: &Handlers<'_>) -> Result<Vec<Node>, DeflangError> {
    nodes
        .into_iter()
        .map(|node| rewrite_node(node, handlers))
        .collect()
}

/// Rewrites one node and, recursively, its children.
pub fn rewrite_node(node: Node, handlers: &Handlers<'_>) -> Result<Node, DeflangError> {
    match node {
        Node::Int(_) | Node::Float(_) | Node::Operator(_) | Node::Term(_) | Node::Arg(_) => {
            handlers.apply(node)
        }
        Node::Call(call) => map_call(call, handlers),
        Node::ArgList(list) => map_arg_list(list, handlers).map(Node::ArgList),
        Node::Def(def) => map_def(def, handlers),
    }
}

// ============================================================================
// TRAVERSAL HELPERS
// ============================================================================

fn map_call(call: Call, handlers: &Handlers<'_>) -> Result<Node, DeflangError> {
    let Call { line, name, args } = call;
    let args = rewrite(args, handlers)?;
    handlers.apply(Node::Call(Call::new(line, name, args)))
}

fn map_def(def: Def, handlers: &Handlers<'_>) -> Result<Node, DeflangError> {
    let Def {
        line,
        name,
        args,
        body,
    } = def;
    let args = map_arg_list(args, handlers)?;
    let body = rewrite(body, handlers)?;
    handlers.apply(Node::Def(Def::new(line, name, args, body)))
}

/// Rewrites a list's entries and the list itself, checking both stay in shape.
fn map_arg_list(list: ArgList, handlers: &Handlers<'_>) -> Result<ArgList, DeflangError> {
    let ArgList { line, args } = list;
    let args = args
        .into_iter()
        .map(|arg| map_arg(arg, handlers))
        .collect::<Result<Vec<_>, _>>()?;

    match handlers.apply(Node::ArgList(ArgList::new(line, args)))? {
        Node::ArgList(list) => Ok(list),
        other => Err(err_ctx!(
            Structural,
            "attempted to replace an arg list with a non-arg-list",
            line,
            help = format!("the ArgList handler returned a {} node", other.kind())
        )),
    }
}

fn map_arg(arg: Arg, handlers: &Handlers<'_>) -> Result<Arg, DeflangError> {
    let line = arg.line;
    match handlers.apply(Node::Arg(arg))? {
        Node::Arg(arg) => Ok(arg),
        other => Err(err_ctx!(
            Structural,
            "attempted to replace an arg in a list with a non-arg",
            line,
            help = format!("the Arg handler returned a {} node", other.kind())
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{CallName, Int, Operator, Term};
    use crate::ErrorType;

    fn sample() -> Vec<Node> {
        let params = ArgList::new(
            1,
            vec![Arg::new(1, Term::new(1, "x"), Term::new(1, "Int"))],
        );
        let call = Call::new(
            1,
            CallName::Term(Term::new(1, "f")),
            vec![
                params.clone().into(),
                Call::new(
                    2,
                    CallName::Operator(Operator::new(2, '*')),
                    vec![Int::new(2, "2").into(), Term::new(2, "x").into()],
                )
                .into(),
            ],
        );
        let def = Def::new(3, Term::new(3, "g"), params, vec![Int::new(3, "7").into()]);
        vec![call.into(), def.into(), Int::new(4, "1").into()]
    }

    #[test]
    fn empty_handler_set_is_identity() {
        let handlers = Handlers::new();
        assert!(handlers.is_empty());
        assert_eq!(rewrite(sample(), &handlers).unwrap(), sample());
    }

    #[test]
    fn leaf_handler_reaches_nested_nodes() {
        let handlers = Handlers::new().on(NodeKind::Int, |node| match node {
            Node::Int(int) => Ok(Int::new(int.line, format!("{}0", int.tokens)).into()),
            other => Ok(other),
        });
        let out = rewrite(sample(), &handlers).unwrap();
        assert_eq!(
            out.iter().map(Node::pretty).collect::<Vec<_>>(),
            vec!["(f [x:Int] (* 20 x))", "(def g [x:Int] 70)", "10"]
        );
    }

    #[test]
    fn children_are_rewritten_before_parent() {
        let seen = std::cell::RefCell::new(Vec::new());
        let handlers = Handlers::new().on(NodeKind::Call, |node| {
            seen.borrow_mut().push(node.pretty());
            Ok(node)
        });
        rewrite(sample(), &handlers).unwrap();
        assert_eq!(*seen.borrow(), vec!["(* 2 x)", "(f [x:Int] (* 2 x))"]);
    }

    #[test]
    fn arg_list_handler_applies_inside_def() {
        let handlers = Handlers::new().on(NodeKind::ArgList, |node| match node {
            Node::ArgList(list) => Ok(ArgList::new(list.line, vec![]).into()),
            other => Ok(other),
        });
        let out = rewrite(sample(), &handlers).unwrap();
        assert_eq!(out[1].pretty(), "(def g [] 7)");
        assert_eq!(out[0].pretty(), "(f [] (* 2 x))");
    }

    #[test]
    fn arg_list_replaced_by_other_kind_fails() {
        let handlers =
            Handlers::new().on(NodeKind::ArgList, |node| Ok(Term::new(node.line(), "oops").into()));
        let err = rewrite(sample(), &handlers).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Structural);
        assert_eq!(
            err.message(),
            "attempted to replace an arg list with a non-arg-list"
        );
        assert_eq!(err.line(), Some(1));
    }

    #[test]
    fn arg_replaced_by_other_kind_fails() {
        let handlers =
            Handlers::new().on(NodeKind::Arg, |node| Ok(Int::new(node.line(), "0").into()));
        let err = rewrite(sample(), &handlers).unwrap_err();
        assert_eq!(
            err.message(),
            "attempted to replace an arg in a list with a non-arg"
        );
    }

    #[test]
    fn top_level_arg_list_may_not_change_kind_either() {
        let nodes = vec![Node::ArgList(ArgList::new(5, vec![]))];
        let handlers = Handlers::new().on(NodeKind::ArgList, |_| Ok(Int::new(5, "1").into()));
        assert!(rewrite(nodes, &handlers).is_err());
    }

    #[test]
    fn handler_errors_abort_the_pass() {
        let handlers = Handlers::new().on(NodeKind::Term, |node| {
            Err(err_ctx!(Validation, "no terms allowed", node.line()))
        });
        let err = rewrite(sample(), &handlers).unwrap_err();
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn debug_lists_registered_kinds() {
        let handlers = Handlers::new()
            .on(NodeKind::Def, Ok)
            .on(NodeKind::Call, Ok);
        assert_eq!(format!("{handlers:?}"), "Handlers { kinds: [Call, Def] }");
    }
}
