//! The deflang Command-Line Interface.
//!
//! This module is the entry point for all CLI commands and orchestrates the
//! library pipeline: read the file, parse, optionally expand, render.

use std::path::Path;
use std::process;

use clap::Parser;

use crate::ast::Node;
use crate::cli::args::{Command, DeflangArgs};
use crate::cli::output::{print_diff, print_result, StatusReporter};
use crate::engine::{print_error, render, OutputFormat, Pipeline};
use crate::DeflangError;

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() {
    let args = DeflangArgs::parse();
    let mut status = StatusReporter::new(args.verbose);

    let result = match args.command {
        Command::Ast { file, format } => handle_ast(&file, format, &mut status),
        Command::Expand { file, format, diff } => handle_expand(&file, format, diff, &mut status),
    };

    if let Err(e) = result {
        print_error(e);
        process::exit(1);
    }
}

// ============================================================================
// COMMAND HANDLERS
// ============================================================================

fn handle_ast(
    file: &Path,
    format: OutputFormat,
    status: &mut StatusReporter,
) -> Result<(), DeflangError> {
    let source = Pipeline::read_file(file)?;
    let nodes = parse_reporting(&Pipeline::for_path(file), &source, status)?;
    print_result(&render(&nodes, format)?);
    Ok(())
}

fn handle_expand(
    file: &Path,
    format: OutputFormat,
    diff: bool,
    status: &mut StatusReporter,
) -> Result<(), DeflangError> {
    let pipeline = Pipeline::for_path(file);
    let source = Pipeline::read_file(file)?;
    let parsed = parse_reporting(&pipeline, &source, status)?;
    let before = diff.then(|| render(&parsed, format)).transpose()?;

    let expanded = pipeline.expand_nodes(parsed, &source)?;
    status.success("Expansion succeeded!");
    status.detail(&format!("{} definition(s) expanded", count_defs(&expanded)));

    match before {
        Some(before) => print_diff(&before, &render(&expanded, format)?),
        None => print_result(&render(&expanded, format)?),
    }
    Ok(())
}

// ============================================================================
// HELPERS
// ============================================================================

fn parse_reporting(
    pipeline: &Pipeline,
    source: &str,
    status: &mut StatusReporter,
) -> Result<Vec<Node>, DeflangError> {
    let nodes = pipeline.parse_source(source)?;
    status.success("Parse succeeded!");
    status.detail(&format!("{} top-level node(s)", nodes.len()));
    Ok(nodes)
}

/// Counts `Def` nodes at any depth.
fn count_defs(nodes: &[Node]) -> usize {
    nodes
        .iter()
        .map(|node| match node {
            Node::Def(def) => 1 + count_defs(&def.body),
            Node::Call(call) => count_defs(&call.args),
            _ => 0,
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_nested_defs() {
        let nodes = Pipeline::default()
            .expand_source("(def f [] (def g [] 1)) (do (def h [] 2)) 3")
            .unwrap();
        assert_eq!(count_defs(&nodes), 3);
    }
}
