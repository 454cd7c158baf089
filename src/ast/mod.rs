//! AST module for the deflang language.
//!
//! Every node variant is its own struct, and [`Node`] is the closed union over them.
//! Nodes are immutable value trees: the parser builds them once and the rewrite engine
//! rebuilds them. Each node records the 1-based line on which it began.
//!
//! `Def` never comes out of the parser; only the `def` expansion produces it.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{err_ctx, DeflangError};

mod json;

pub use json::to_json_array;

// ============================================================================
// LEAVES
// ============================================================================

/// Integer literal. The digit text is kept verbatim; the value is decoded on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Int {
    pub line: usize,
    pub tokens: String,
}

impl Int {
    pub fn new(line: usize, tokens: impl Into<String>) -> Self {
        Self {
            line,
            tokens: tokens.into(),
        }
    }

    /// Base-10 value of the literal.
    pub fn value(&self) -> Result<i64, DeflangError> {
        self.tokens.parse::<i64>().map_err(|e| {
            err_ctx!(
                Parse,
                format!("invalid integer literal `{}`: {e}", self.tokens),
                self.line
            )
        })
    }
}

/// Floating literal with exactly one `.` in its text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Float {
    pub line: usize,
    pub tokens: String,
}

impl Float {
    pub fn new(line: usize, tokens: impl Into<String>) -> Self {
        Self {
            line,
            tokens: tokens.into(),
        }
    }

    /// Decimal value of the literal.
    pub fn value(&self) -> Result<f64, DeflangError> {
        self.tokens.parse::<f64>().map_err(|e| {
            err_ctx!(
                Parse,
                format!("invalid float literal `{}`: {e}", self.tokens),
                self.line
            )
        })
    }
}

/// One of `+ - / * %`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    pub line: usize,
    pub symbol: char,
}

impl Operator {
    pub const SYMBOLS: [char; 5] = ['+', '-', '/', '*', '%'];

    pub fn new(line: usize, symbol: char) -> Self {
        Self { line, symbol }
    }
}

/// Identifier: an ASCII letter followed by letters, digits or underscores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub line: usize,
    pub text: String,
}

impl Term {
    pub fn new(line: usize, text: impl Into<String>) -> Self {
        Self {
            line,
            text: text.into(),
        }
    }
}

/// One `name:Type` entry of an argument list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arg {
    pub line: usize,
    pub term: Term,
    pub term_type: Term,
}

impl Arg {
    pub fn new(line: usize, term: Term, term_type: Term) -> Self {
        Self {
            line,
            term,
            term_type,
        }
    }
}

// ============================================================================
// COMPOSITES
// ============================================================================

/// The head of a call: a term or a single operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallName {
    Term(Term),
    Operator(Operator),
}

impl CallName {
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            CallName::Term(term) => Cow::Borrowed(&term.text),
            CallName::Operator(op) => Cow::Owned(op.symbol.to_string()),
        }
    }

    pub fn line(&self) -> usize {
        match self {
            CallName::Term(term) => term.line,
            CallName::Operator(op) => op.line,
        }
    }
}

/// A parenthesized form `(name arg...)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    pub line: usize,
    pub name: CallName,
    pub args: Vec<Node>,
}

impl Call {
    pub fn new(line: usize, name: CallName, args: Vec<Node>) -> Self {
        Self { line, name, args }
    }

    /// True when the head is the identifier `name`. Operators never match.
    pub fn is_named(&self, name: &str) -> bool {
        matches!(&self.name, CallName::Term(term) if term.text == name)
    }
}

/// A bracketed list of typed parameters, `[x:Int y:Float]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgList {
    pub line: usize,
    pub args: Vec<Arg>,
}

impl ArgList {
    pub fn new(line: usize, args: Vec<Arg>) -> Self {
        Self { line, args }
    }
}

/// Expanded form of `(def name [args...] body...)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Def {
    pub line: usize,
    pub name: Term,
    pub args: ArgList,
    pub body: Vec<Node>,
}

impl Def {
    pub fn new(line: usize, name: Term, args: ArgList, body: Vec<Node>) -> Self {
        Self {
            line,
            name,
            args,
            body,
        }
    }
}

// ============================================================================
// NODE
// ============================================================================

/// The closed set of syntax tree nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node {
    Int(Int),
    Float(Float),
    Operator(Operator),
    Term(Term),
    Call(Call),
    Arg(Arg),
    ArgList(ArgList),
    Def(Def),
}

/// Variant tag of a [`Node`], used to key rewrite handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Int,
    Float,
    Operator,
    Term,
    Call,
    Arg,
    ArgList,
    Def,
}

impl NodeKind {
    pub const ALL: [NodeKind; 8] = [
        NodeKind::Int,
        NodeKind::Float,
        NodeKind::Operator,
        NodeKind::Term,
        NodeKind::Call,
        NodeKind::Arg,
        NodeKind::ArgList,
        NodeKind::Def,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Int => "Int",
            NodeKind::Float => "Float",
            NodeKind::Operator => "Operator",
            NodeKind::Term => "Term",
            NodeKind::Call => "Call",
            NodeKind::Arg => "Arg",
            NodeKind::ArgList => "ArgList",
            NodeKind::Def => "Def",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Int(_) => NodeKind::Int,
            Node::Float(_) => NodeKind::Float,
            Node::Operator(_) => NodeKind::Operator,
            Node::Term(_) => NodeKind::Term,
            Node::Call(_) => NodeKind::Call,
            Node::Arg(_) => NodeKind::Arg,
            Node::ArgList(_) => NodeKind::ArgList,
            Node::Def(_) => NodeKind::Def,
        }
    }

    /// Line on which this construct began.
    pub fn line(&self) -> usize {
        match self {
            Node::Int(n) => n.line,
            Node::Float(n) => n.line,
            Node::Operator(n) => n.line,
            Node::Term(n) => n.line,
            Node::Call(n) => n.line,
            Node::Arg(n) => n.line,
            Node::ArgList(n) => n.line,
            Node::Def(n) => n.line,
        }
    }

    /// Renders the node back into surface syntax.
    ///
    /// A `Def` prints as the `def` call it was expanded from.
    pub fn pretty(&self) -> String {
        match self {
            Node::Int(n) => n.tokens.clone(),
            Node::Float(n) => n.tokens.clone(),
            Node::Operator(n) => n.symbol.to_string(),
            Node::Term(n) => n.text.clone(),
            Node::Call(call) => pretty_form(&call.name.text(), &call.args),
            Node::Arg(arg) => pretty_arg(arg),
            Node::ArgList(list) => pretty_arg_list(list),
            Node::Def(def) => {
                let mut head = format!("def {} {}", def.name.text, pretty_arg_list(&def.args));
                for node in &def.body {
                    head.push(' ');
                    head.push_str(&node.pretty());
                }
                format!("({head})")
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Pretty-printing helpers
// ----------------------------------------------------------------------------

fn pretty_form(head: &str, args: &[Node]) -> String {
    let mut s = format!("({head}");
    for arg in args {
        s.push(' ');
        s.push_str(&arg.pretty());
    }
    s.push(')');
    s
}

fn pretty_arg(arg: &Arg) -> String {
    format!("{}:{}", arg.term.text, arg.term_type.text)
}

fn pretty_arg_list(list: &ArgList) -> String {
    let inner = list.args.iter().map(pretty_arg).collect::<Vec<_>>().join(" ");
    format!("[{inner}]")
}

// ============================================================================
// CONVERSIONS
// ============================================================================

macro_rules! impl_from_variant {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Node {
                fn from(node: $variant) -> Self {
                    Node::$variant(node)
                }
            }
        )*
    };
}

impl_from_variant!(Int, Float, Operator, Term, Call, Arg, ArgList, Def);

impl From<CallName> for Node {
    fn from(name: CallName) -> Self {
        match name {
            CallName::Term(term) => Node::Term(term),
            CallName::Operator(op) => Node::Operator(op),
        }
    }
}
