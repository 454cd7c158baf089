//! Defines the command-line arguments and subcommands for the deflang CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::engine::OutputFormat;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "deflang",
    version,
    about = "Parse deflang sources and expand their `def` forms."
)]
pub struct DeflangArgs {
    /// Report each pipeline stage on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse a file and print its syntax tree.
    Ast {
        /// The path to the source file to parse.
        #[arg(required = true)]
        file: PathBuf,
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Parse a file, expand its `def` forms and print the result.
    Expand {
        /// The path to the source file to expand.
        #[arg(required = true)]
        file: PathBuf,
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
        /// Show a line diff between the parsed and the expanded renderings instead.
        #[arg(long)]
        diff: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_expand_with_flags() {
        let args =
            DeflangArgs::try_parse_from(["deflang", "expand", "main.dl", "--format", "pretty", "-v"])
                .unwrap();
        assert!(args.verbose);
        match args.command {
            Command::Expand { file, format, diff } => {
                assert_eq!(file, PathBuf::from("main.dl"));
                assert_eq!(format, OutputFormat::Pretty);
                assert!(!diff);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn format_defaults_to_json() {
        let args = DeflangArgs::try_parse_from(["deflang", "ast", "main.dl"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Ast {
                format: OutputFormat::Json,
                ..
            }
        ));
    }

    #[test]
    fn file_is_required() {
        assert!(DeflangArgs::try_parse_from(["deflang", "ast"]).is_err());
    }
}
