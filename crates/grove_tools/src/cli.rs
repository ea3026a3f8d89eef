//! CLI interface for the `grove` binary

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "grove")]
#[command(version, about = "Parse source code and print its syntax tree", long_about = None)]
pub struct Cli {
    /// Increase logging verbosity (-v: debug, -vv+: trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Parse a file, or the bundled sample for a language, and print the tree
    Parse {
        /// Grammar to use; asked for on stdin when missing
        #[arg(short, long)]
        language: Option<String>,

        /// Source file (default: the language's sample snippet)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Show byte ranges
        #[arg(long)]
        ranges: bool,

        /// Show row/column points
        #[arg(long)]
        points: bool,
    },

    /// List the registered grammars
    Languages,
}

/// Default `tracing` filter for a `-v` count; `RUST_LOG` takes precedence.
#[must_use]
pub const fn directive_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "grove=warn,grove_tools=info",
        1 => "grove=debug,grove_tools=debug",
        _ => "grove=trace,grove_tools=trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_arguments() {
        let cli = Cli::try_parse_from(["grove", "-vv", "parse", "-l", "cpp", "--ranges"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Parse {
                language,
                file,
                ranges,
                points,
            } => {
                assert_eq!(language.as_deref(), Some("cpp"));
                assert!(file.is_none());
                assert!(ranges);
                assert!(!points);
            }
            Commands::Languages => panic!("expected parse"),
        }
    }

    #[test]
    fn test_verbosity_directives() {
        assert_eq!(directive_for_verbosity(0), "grove=warn,grove_tools=info");
        assert!(directive_for_verbosity(1).contains("grove=debug"));
        assert_eq!(directive_for_verbosity(7), directive_for_verbosity(2));
    }
}
