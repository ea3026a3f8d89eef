//! Grove CLI
//!
//! Parses a source file or a bundled sample and prints its syntax tree.

use clap::Parser;
use grove::{GrammarRegistry, PrinterConfig, TreePrinter};
use grove_tools::cli::{Cli, Commands, directive_for_verbosity};
use grove_tools::demo::{language_for_path, prompt_language};
use grove_tools::run_parse;
use miette::{IntoDiagnostic, Result};
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))?;

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(directive_for_verbosity(cli.verbose))),
        )
        .with_writer(io::stderr)
        .init();

    let registry = GrammarRegistry::global();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Parse {
            language,
            file,
            ranges,
            points,
        } => {
            let language = match language
                .map(|name| name.to_lowercase())
                .or_else(|| file.as_deref().and_then(language_for_path).map(str::to_owned))
            {
                Some(language) => language,
                None => prompt_language(&mut io::stdin().lock(), &mut out).into_diagnostic()?,
            };
            let printer = TreePrinter::with_config(PrinterConfig {
                ranges,
                points,
                ..PrinterConfig::default()
            });
            run_parse(registry, &language, file.as_deref(), &printer, &mut out)?;
        }
        Commands::Languages => {
            for name in registry.names() {
                writeln!(out, "{name}").into_diagnostic()?;
            }
        }
    }

    Ok(())
}
