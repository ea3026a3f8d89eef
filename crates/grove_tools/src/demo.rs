//! The parse-and-print flow behind `grove parse`.

use grove::languages::sample_code;
use grove::{Grammar, GrammarRegistry, Parser, TreePrinter};
use miette::Diagnostic;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Prompt shown when no language was given on the command line
pub const PROMPT: &str = "Enter language (python/cpp/javascript): ";

#[derive(Debug, Error, Diagnostic)]
pub enum ToolError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Grove(#[from] grove::Error),

    #[error("failed to read {}", path.display())]
    #[diagnostic(code(grove_tools::read))]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no sample snippet for '{language}'")]
    #[diagnostic(code(grove_tools::no_sample), help("pass a source file with --file"))]
    NoSample { language: String },

    #[error("failed to write output")]
    #[diagnostic(code(grove_tools::write))]
    Write(#[from] io::Error),
}

/// Write the prompt to `output` and read one language name from `input`.
///
/// The answer is trimmed and lowercased.
///
/// # Errors
///
/// Returns an error if writing the prompt or reading the answer fails.
pub fn prompt_language(input: &mut impl BufRead, output: &mut impl Write) -> io::Result<String> {
    output.write_all(PROMPT.as_bytes())?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_lowercase())
}

/// Grammar name for a file extension
#[must_use]
pub fn language_for_path(path: &Path) -> Option<&'static str> {
    match path.extension()?.to_str()? {
        "py" | "pyi" => Some("python"),
        "cpp" | "cc" | "cxx" | "hpp" | "hh" | "h" => Some("cpp"),
        "js" | "mjs" | "cjs" => Some("javascript"),
        _ => None,
    }
}

/// Source text to parse: the file's contents, or the language's sample.
///
/// # Errors
///
/// Returns [`ToolError::Read`] if the file can't be read and
/// [`ToolError::NoSample`] if there is no file and no bundled sample.
pub fn load_code(language: &str, file: Option<&Path>) -> Result<String, ToolError> {
    match file {
        Some(path) => std::fs::read_to_string(path).map_err(|source| ToolError::Read {
            path: path.to_path_buf(),
            source,
        }),
        None => sample_code(language)
            .map(str::to_owned)
            .ok_or_else(|| ToolError::NoSample {
                language: language.to_owned(),
            }),
    }
}

/// Load the grammar registered as `language`, then parse `file` (or the
/// bundled sample) and print the tree.
///
/// # Errors
///
/// Returns an error if the grammar can't be loaded, the source can't be
/// read, or `out` fails.
pub fn run_parse(
    registry: &GrammarRegistry,
    language: &str,
    file: Option<&Path>,
    printer: &TreePrinter,
    out: &mut impl Write,
) -> Result<(), ToolError> {
    let grammar = registry.load(language)?;
    let code = load_code(language, file)?;
    print_tree(&grammar, &code, printer, out)
}

/// Parse `code` and print the tree.
///
/// Writes `Parsing code: <code>`, a blank line, `AST Structure:` and then one
/// line per node.
///
/// # Errors
///
/// Returns an error if `code` is too large to parse or `out` fails.
pub fn print_tree(
    grammar: &Arc<Grammar>,
    code: &str,
    printer: &TreePrinter,
    out: &mut impl Write,
) -> Result<(), ToolError> {
    let tree = Parser::new().parse_str(grammar, code)?;
    let metrics = tree.metrics();
    tracing::debug!(
        grammar = grammar.name(),
        nodes = metrics.nodes_created,
        errors = metrics.errors,
        elapsed = ?metrics.duration,
        "parsed"
    );
    if tree.has_error() {
        tracing::warn!(grammar = grammar.name(), "source has syntax errors");
    }

    writeln!(out, "Parsing code: {code}")?;
    writeln!(out)?;
    writeln!(out, "AST Structure:")?;
    out.write_all(printer.print(&tree).as_bytes())?;
    Ok(())
}
