//! # Parser Module
//!
//! Turns source bytes into a [`SyntaxTree`].
//!
//! ## Pipeline
//!
//! 1. UTF-8 validation into a [`SourceBuffer`]
//! 2. Tokenization with the grammar's compiled lexer, plus the layout pass
//!    for indentation-sensitive grammars
//! 3. A packrat PEG engine over the significant tokens, building a green
//!    tree directly
//!
//! Syntax errors never fail a parse: they become `ERROR` nodes, and the
//! resulting tree always covers the whole input. The only errors are invalid
//! UTF-8 and sources longer than [`MAX_SOURCE_LEN`], reported before any
//! parsing.
//!
//! A [`Parser`] holds configuration only, so one parser and one grammar can
//! be shared by any number of threads.

mod engine;
#[cfg(feature = "parallel")]
mod parallel;
mod state;

use crate::error::Error;
use crate::grammar::Grammar;
use crate::lexer::{TokenStream, apply_layout};
use crate::source::SourceBuffer;
use crate::syntax::{GreenNode, SyntaxTree};
use engine::{Engine, EngineStats};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Longest source a tree can address, since offsets are `u32`
pub const MAX_SOURCE_LEN: usize = u32::MAX as usize;

/// Configuration options for the parser
///
/// # Example
///
/// ```rust
/// use grove::parser::ParseConfig;
///
/// let config = ParseConfig {
///     memoize: false,
///     ..ParseConfig::default()
/// };
/// assert_eq!(config.max_depth, 256);
/// ```
#[derive(Debug, Clone)]
pub struct ParseConfig {
    /// Cache rule results per token position (packrat parsing)
    pub memoize: bool,
    /// Maximum nesting of node-producing rules, counting rules that start at
    /// the same token once. Reaching it ends parsing: the tokens not yet
    /// matched are wrapped in `ERROR`.
    pub max_depth: usize,
    /// Memo entries kept before the table is cleared
    pub max_memo_entries: usize,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            memoize: true,
            max_depth: 256,
            max_memo_entries: 100_000,
        }
    }
}

/// Statistics about one parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseMetrics {
    /// Significant tokens, layout tokens included
    pub tokens: usize,
    pub nodes_created: usize,
    pub memo_hits: usize,
    /// `ERROR` nodes inserted by the parser
    pub errors: usize,
    pub lexer_errors: usize,
    pub duration: Duration,
}

/// Grammar-driven parser
#[derive(Debug, Clone, Default)]
pub struct Parser {
    config: ParseConfig,
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_config(config: ParseConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &ParseConfig {
        &self.config
    }

    /// Parse UTF-8 `source` with `grammar`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceTooLarge`] if `source` is longer than
    /// [`MAX_SOURCE_LEN`] and [`Error::Encoding`] if it is not valid UTF-8.
    pub fn parse(&self, grammar: &Arc<Grammar>, source: impl AsRef<[u8]>) -> Result<SyntaxTree, Error> {
        let source = source.as_ref();
        check_source_len(source.len())?;
        let source = SourceBuffer::from_bytes(source)?;
        Ok(self.parse_source(grammar, source))
    }

    /// Parse text that is already known to be valid UTF-8.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceTooLarge`] if `text` is longer than
    /// [`MAX_SOURCE_LEN`].
    pub fn parse_str(&self, grammar: &Arc<Grammar>, text: &str) -> Result<SyntaxTree, Error> {
        check_source_len(text.len())?;
        Ok(self.parse_source(grammar, SourceBuffer::new(text)))
    }

    fn parse_source(&self, grammar: &Arc<Grammar>, source: SourceBuffer) -> SyntaxTree {
        let started = Instant::now();
        let text = source.text();

        let lexed = grammar.lexer().tokenize(text);
        let tokens = match grammar.layout() {
            Some(layout) => apply_layout(lexed.tokens, text, layout),
            None => lexed.tokens,
        };
        let stream = TokenStream::new(tokens);

        let (root, stats) = Engine::new(grammar, &stream, &self.config)
            .run()
            .unwrap_or_else(|err| {
                tracing::debug!(%err, "tree builder failed, returning a flat error tree");
                error_tree(grammar, &stream)
            });

        let metrics = ParseMetrics {
            tokens: stream.len(),
            nodes_created: stats.nodes_created,
            memo_hits: stats.memo_hits,
            errors: stats.errors,
            lexer_errors: lexed.errors.len(),
            duration: started.elapsed(),
        };
        tracing::debug!(
            grammar = grammar.name(),
            bytes = text.len(),
            tokens = metrics.tokens,
            nodes = metrics.nodes_created,
            memo_hits = metrics.memo_hits,
            errors = metrics.errors,
            duration = ?metrics.duration,
            "parsed"
        );

        SyntaxTree::new(root, source, Arc::clone(grammar), lexed.errors, metrics)
    }
}

fn check_source_len(len: usize) -> Result<(), Error> {
    if len > MAX_SOURCE_LEN {
        return Err(Error::SourceTooLarge {
            len,
            max: MAX_SOURCE_LEN,
        });
    }
    Ok(())
}

/// Root holding a single `ERROR` node over every token
fn error_tree(grammar: &Grammar, stream: &TokenStream) -> (Arc<GreenNode>, EngineStats) {
    use crate::syntax::{GreenElement, GreenToken, Symbol};

    let mut leading = Vec::new();
    let mut inner = Vec::new();
    for (index, token) in stream.tokens().iter().enumerate() {
        let target = if index == 0 { &mut leading } else { &mut inner };
        target.extend(
            stream
                .leading_trivia(index)
                .iter()
                .map(|trivia| GreenElement::Token(GreenToken::new(trivia.kind, trivia.text.clone()))),
        );
        inner.push(GreenElement::Token(GreenToken::new(token.kind, token.text.clone())));
    }

    let mut children = leading;
    children.push(GreenElement::Node(GreenNode::new(Symbol::ERROR, inner)));
    children.extend(
        stream
            .trailing_trivia()
            .iter()
            .map(|trivia| GreenElement::Token(GreenToken::new(trivia.kind, trivia.text.clone()))),
    );

    let stats = EngineStats {
        nodes_created: 2,
        memo_hits: 0,
        errors: 1,
    };
    (GreenNode::new(grammar.entry(), children), stats)
}
