//! # Error Types
//!
//! - [`Error`]: failures returned by the public API (registry lookups,
//!   grammar loading, source decoding and size)
//! - [`GrammarError`]: why a grammar definition or table was rejected
//! - [`EncodingError`]: source bytes that are not valid UTF-8
//! - [`LexerError`]: characters no token rule matches; recorded in the tree,
//!   never returned as a failure
//!
//! Syntax errors are not errors in this sense: they are `ERROR` nodes in an
//! otherwise complete tree.
//!
//! ## Diagnostics Support
//!
//! When the `diagnostics` feature is enabled, errors integrate with [`miette`]
//! for rich error reporting with source code snippets.

use crate::syntax::TextRange;
use thiserror::Error;

#[cfg(feature = "diagnostics")]
use miette::Diagnostic;

pub use crate::syntax::BuilderError;

/// Errors returned by the public API
#[derive(Debug, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum Error {
    #[error("no grammar registered under '{name}'")]
    #[cfg_attr(
        feature = "diagnostics",
        diagnostic(code(registry::not_found), help("run `grove languages` to list grammars"))
    )]
    GrammarNotFound { name: String },

    #[error("failed to load grammar '{name}'")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(registry::load)))]
    GrammarLoad {
        name: String,
        #[source]
        source: GrammarError,
    },

    #[error(transparent)]
    #[cfg_attr(feature = "diagnostics", diagnostic(transparent))]
    Encoding(#[from] EncodingError),

    #[error("source is {len} bytes, larger than the {max} bytes a tree can address")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(source::too_large)))]
    SourceTooLarge { len: usize, max: usize },
}

/// Source bytes that are not valid UTF-8
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
#[cfg_attr(feature = "diagnostics", diagnostic(code(source::encoding)))]
#[error("source is not valid UTF-8: invalid sequence at byte {valid_up_to}")]
pub struct EncodingError {
    /// Length of the valid prefix
    pub valid_up_to: usize,
    /// Length of the invalid sequence; `None` when the input ends mid-sequence
    pub error_len: Option<usize>,
}

impl From<std::str::Utf8Error> for EncodingError {
    fn from(err: std::str::Utf8Error) -> Self {
        Self {
            valid_up_to: err.valid_up_to(),
            error_len: err.error_len(),
        }
    }
}

/// Why a grammar definition was rejected
#[derive(Debug, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum GrammarError {
    #[error("grammar has no entry rule")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::missing_entry)))]
    MissingEntryPoint,

    #[error("entry rule '{name}' is not defined or is hidden")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::undefined_rule)))]
    UndefinedRule { name: String },

    #[error("rule '{rule}' refers to undefined symbol '{name}'")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::undefined_symbol)))]
    UndefinedSymbol { rule: String, name: String },

    #[error("symbol '{name}' is defined more than once")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::duplicate)))]
    DuplicateRule { name: String },

    #[error("left recursion through {}", cycle.join(" -> "))]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::left_recursion)))]
    LeftRecursion { cycle: Vec<String> },

    #[error("token '{name}' matches the empty string")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::empty_pattern)))]
    EmptyPattern { name: String },

    #[error("token '{name}' has an invalid pattern: {message}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::invalid_regex)))]
    InvalidRegex { name: String, message: String },

    #[error("grammar table is malformed: {0}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::malformed_table)))]
    MalformedTable(#[from] serde_json::Error),

    #[error("grammar defines more than {max} symbols")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::too_many_symbols)))]
    TooManySymbols { max: usize },
}

/// Lexer error with location information
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
#[error("{kind}")]
pub struct LexerError {
    #[cfg_attr(feature = "diagnostics", label)]
    pub span: TextRange,
    #[source]
    pub kind: LexerErrorKind,
}

/// Types of lexer errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum LexerErrorKind {
    #[error("Unexpected character: '{char}'")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(lexer::unexpected_char)))]
    UnexpectedChar { char: char },
}

impl LexerErrorKind {
    #[must_use]
    pub const fn unexpected_char(char: char) -> Self {
        Self::UnexpectedChar { char }
    }
}
