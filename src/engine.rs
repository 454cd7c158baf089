//! Pipeline tying parsing, `def` expansion and rendering together.
//!
//! Library callers that only need one stage can use [`crate::syntax::parse`] and
//! [`crate::macros::rewrite`] directly; the pipeline adds source naming, file
//! reading and output rendering for the CLI.

use std::path::Path;

use clap::ValueEnum;
use miette::Report;

use crate::ast::{to_json_array, Node};
use crate::macros::expand_defs;
use crate::syntax::{parse_named, ANONYMOUS_SOURCE};
use crate::{err_msg, DeflangError};

// ============================================================================
// OUTPUT FORMAT
// ============================================================================

/// How a node sequence is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// A JSON array of tagged node objects.
    #[default]
    Json,
    /// One line of surface syntax per top-level node.
    Pretty,
}

/// Renders `nodes` in the requested format.
pub fn render(nodes: &[Node], format: OutputFormat) -> Result<String, DeflangError> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(&to_json_array(nodes))
            .map_err(|e| err_msg!(Internal, "failed to serialise tree: {}", e)),
        OutputFormat::Pretty => Ok(nodes
            .iter()
            .map(Node::pretty)
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Runs the front end over one named source.
#[derive(Debug, Clone)]
pub struct Pipeline {
    source_name: String,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(ANONYMOUS_SOURCE)
    }
}

impl Pipeline {
    pub fn new(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
        }
    }

    /// Pipeline named after the file at `path`.
    pub fn for_path(path: &Path) -> Self {
        Self::new(path.display().to_string())
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn read_file(path: &Path) -> Result<String, DeflangError> {
        std::fs::read_to_string(path)
            .map_err(|e| err_msg!(Io, "failed to read '{}': {}", path.display(), e))
    }

    /// Parses `source` without expanding anything.
    pub fn parse_source(&self, source: &str) -> Result<Vec<Node>, DeflangError> {
        parse_named(&self.source_name, source)
    }

    /// Parses `source` and expands its `def` forms.
    pub fn expand_source(&self, source: &str) -> Result<Vec<Node>, DeflangError> {
        let nodes = self.parse_source(source)?;
        self.expand_nodes(nodes, source)
    }

    /// Expands the `def` forms of `nodes`, previously parsed from `source`.
    ///
    /// Expansion errors only know their line; the source is attached so they still
    /// render with a snippet.
    pub fn expand_nodes(&self, nodes: Vec<Node>, source: &str) -> Result<Vec<Node>, DeflangError> {
        expand_defs(nodes).map_err(|e| e.with_source(&self.source_name, source))
    }
}

/// Prints an error through miette's report handler.
pub fn print_error(error: DeflangError) {
    let report = Report::new(error);
    eprintln!("{report:?}");
}
