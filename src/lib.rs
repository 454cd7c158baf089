//! deflang: a front end for a small S-expression language.
//!
//! Source text is parsed by a hand-written recursive descent parser into a tree of
//! [`Node`]s, which a bottom-up rewrite engine can then transform. The reference
//! transformation promotes `(def name [arg:Type ...] body...)` calls into `Def` nodes.
//!
//! ```
//! let nodes = deflang::parse("(def foo [x:Int] (+ x 1))").unwrap();
//! let expanded = deflang::expand_defs(nodes).unwrap();
//! assert_eq!(expanded[0].kind(), deflang::NodeKind::Def);
//! ```

pub use crate::ast::{Node, NodeKind};
pub use crate::diagnostics::{DeflangError, ErrorContext, ErrorType, Span};
pub use crate::macros::{expand_defs, rewrite, Handlers};
pub use crate::syntax::parse;

pub mod ast;
pub mod cli;
pub mod diagnostics;
pub mod engine;
pub mod macros;
pub mod syntax;
