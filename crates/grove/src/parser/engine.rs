//! Packrat PEG engine over a [`TokenStream`].
//!
//! The engine appends straight into a [`GreenNodeBuilder`]; backtracking
//! rolls the builder back to a checkpoint. Extras are emitted lazily: the
//! trivia before a token is flushed right before the token is consumed or a
//! visible node starts there, so nodes start at their first token and end at
//! their last.

use crate::grammar::{Grammar, Production, ResolvedTail};
use crate::lexer::TokenStream;
use crate::parser::ParseConfig;
use crate::parser::state::{MemoEntry, MemoSuccess, MemoTable};
use crate::syntax::{BuilderError, Checkpoint, FieldId, GreenElement, GreenNode, GreenNodeBuilder, Symbol};
use hashbrown::HashSet;
use std::sync::Arc;

/// Stack left before a rule call moves to a fresh segment
const RED_ZONE: usize = 64 * 1024;
/// Size of each fresh stack segment
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Counters collected during one parse
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct EngineStats {
    pub(crate) nodes_created: usize,
    pub(crate) memo_hits: usize,
    pub(crate) errors: usize,
}

/// Parser position: builder checkpoint, token index and trivia state
#[derive(Debug, Clone, Copy)]
struct Mark {
    checkpoint: Checkpoint,
    pos: usize,
    trivia_flushed: bool,
}

pub(crate) struct Engine<'a> {
    grammar: &'a Grammar,
    tokens: &'a TokenStream,
    config: &'a ParseConfig,
    builder: GreenNodeBuilder,
    /// Index of the next significant token
    pos: usize,
    /// Whether the extras before `pos` are already in the builder
    trivia_flushed: bool,
    memo: MemoTable,
    /// Rule calls in progress, to stop left recursion at runtime
    active: HashSet<(Symbol, usize), ahash::RandomState>,
    /// Start positions of the visible rule calls in progress, one entry per
    /// distinct position; its length is the nesting depth
    nesting: Vec<usize>,
    /// Set once `max_depth` is hit; every later rule call fails at once
    aborted: bool,
    stats: EngineStats,
}

impl<'a> Engine<'a> {
    pub(crate) fn new(grammar: &'a Grammar, tokens: &'a TokenStream, config: &'a ParseConfig) -> Self {
        Self {
            grammar,
            tokens,
            config,
            builder: GreenNodeBuilder::new(),
            pos: 0,
            trivia_flushed: false,
            memo: MemoTable::new(config.max_memo_entries),
            active: HashSet::with_hasher(ahash::RandomState::new()),
            nesting: Vec::new(),
            aborted: false,
            stats: EngineStats::default(),
        }
    }

    /// Parse the whole token stream into a tree rooted at the entry rule.
    ///
    /// # Errors
    ///
    /// Only fails on builder misuse, which indicates a bug in the engine.
    pub(crate) fn run(mut self) -> Result<(Arc<GreenNode>, EngineStats), BuilderError> {
        let grammar = self.grammar;
        let entry = grammar.entry();
        self.builder.start_node(entry);

        let start = self.mark();
        self.active.insert((entry, 0));
        let parsed = grammar
            .rule_body(entry)
            .is_some_and(|body| self.parse(body));
        self.active.remove(&(entry, 0));

        if !parsed {
            tracing::debug!(rule = self.grammar.symbol_name(entry), "entry rule failed");
            self.reset(start);
        }
        if !parsed || self.pos < self.tokens.len() {
            tracing::trace!(from = self.pos, "wrapping unconsumed tokens");
            self.flush_trivia();
            let checkpoint = self.builder.checkpoint();
            while self.pos < self.tokens.len() {
                self.bump()?;
            }
            self.wrap_error(checkpoint)?;
        }
        self.flush_trivia();

        self.stats.nodes_created = self.builder.nodes_created() + 1;
        let root = self.builder.finish()?;
        Ok((root, self.stats))
    }

    fn mark(&self) -> Mark {
        Mark {
            checkpoint: self.builder.checkpoint(),
            pos: self.pos,
            trivia_flushed: self.trivia_flushed,
        }
    }

    fn reset(&mut self, mark: Mark) {
        self.builder.rollback(mark.checkpoint);
        self.pos = mark.pos;
        self.trivia_flushed = mark.trivia_flushed;
    }

    fn flush_trivia(&mut self) {
        if self.trivia_flushed {
            return;
        }
        let trivia = if self.pos < self.tokens.len() {
            self.tokens.leading_trivia(self.pos)
        } else {
            self.tokens.trailing_trivia()
        };
        for token in trivia {
            // The root node is open for the whole parse
            let _ = self.builder.token(token.kind, token.text.clone());
        }
        self.trivia_flushed = true;
    }

    /// Consume the current token whatever its kind.
    fn bump(&mut self) -> Result<(), BuilderError> {
        let Some(token) = self.tokens.get(self.pos) else {
            return Ok(());
        };
        self.flush_trivia();
        self.builder.token(token.kind, token.text.clone())?;
        self.pos += 1;
        self.trivia_flushed = false;
        Ok(())
    }

    fn wrap_error(&mut self, checkpoint: Checkpoint) -> Result<(), BuilderError> {
        self.stats.errors += 1;
        self.builder.wrap_since(checkpoint, Symbol::ERROR)
    }

    fn at_end(&self, end: &[Symbol]) -> bool {
        self.tokens
            .kind(self.pos)
            .is_none_or(|kind| end.contains(&kind))
    }

    /// Elements a field or alias applies to: visible, non-extra, non-error
    fn is_labelable(grammar: &Grammar, element: &GreenElement) -> bool {
        let kind = element.kind();
        !kind.is_error() && grammar.is_visible(kind) && !grammar.is_extra(kind)
    }

    fn parse(&mut self, production: &Production) -> bool {
        match production {
            Production::Token(kind) => self.parse_token(*kind),
            Production::Rule(rule) => self.parse_rule(*rule),
            Production::Seq(parts) => {
                let start = self.mark();
                for part in parts {
                    if !self.parse(part) {
                        self.reset(start);
                        return false;
                    }
                }
                true
            }
            Production::Choice(alternatives) => {
                let start = self.mark();
                for alternative in alternatives {
                    if self.parse(alternative) {
                        return true;
                    }
                    self.reset(start);
                }
                false
            }
            Production::Opt(inner) => {
                let start = self.mark();
                if !self.parse(inner) {
                    self.reset(start);
                }
                true
            }
            Production::Repeat { expr, min, max } => self.parse_repeat(expr, *min, *max),
            Production::Field { field, expr } => self.parse_field(*field, expr),
            Production::Alias { symbol, expr } => {
                let checkpoint = self.builder.checkpoint();
                if !self.parse(expr) {
                    return false;
                }
                let grammar = self.grammar;
                self.builder
                    .relabel_since(checkpoint, *symbol, |element| Self::is_labelable(grammar, element));
                true
            }
            Production::LeftFold { operand, tails } => self.parse_left_fold(operand, tails),
            Production::Items { item, end } => self.parse_items(item, end),
            Production::Eof => self.pos >= self.tokens.len(),
            Production::Empty => true,
        }
    }

    fn parse_token(&mut self, kind: Symbol) -> bool {
        if self.tokens.kind(self.pos) != Some(kind) {
            return false;
        }
        self.bump().is_ok()
    }

    fn parse_field(&mut self, field: FieldId, expr: &Production) -> bool {
        let checkpoint = self.builder.checkpoint();
        if !self.parse(expr) {
            return false;
        }
        let grammar = self.grammar;
        self.builder
            .label_since(checkpoint, field, |element| Self::is_labelable(grammar, element));
        true
    }

    fn parse_repeat(&mut self, expr: &Production, min: usize, max: Option<usize>) -> bool {
        let start = self.mark();
        let mut count = 0;
        while max.is_none_or(|max| count < max) {
            let before = self.mark();
            if !self.parse(expr) {
                self.reset(before);
                break;
            }
            if self.pos == before.pos {
                // Matched empty: further iterations would match empty too
                self.reset(before);
                count = count.max(min);
                break;
            }
            count += 1;
        }
        if count < min {
            self.reset(start);
            return false;
        }
        true
    }

    fn parse_rule(&mut self, rule: Symbol) -> bool {
        if self.aborted {
            return false;
        }
        let grammar = self.grammar;
        let Some(body) = grammar.rule_body(rule) else {
            return false;
        };
        let key = (rule, self.pos);

        if self.config.memoize {
            if let Some(entry) = self.memo.get(rule, self.pos) {
                if entry.trivia_flushed == self.trivia_flushed {
                    self.stats.memo_hits += 1;
                    let Some(success) = entry.result.clone() else {
                        return false;
                    };
                    for child in success.children {
                        let _ = self.builder.push(child);
                    }
                    self.pos = success.end;
                    self.trivia_flushed = success.end_trivia_flushed;
                    return true;
                }
            }
        }

        if self.active.contains(&key) {
            tracing::trace!(rule = self.grammar.symbol_name(rule), pos = self.pos, "recursion guard");
            return false;
        }
        let visible = grammar.is_visible(rule);
        // Rules stacked on the same token share one level
        let nests = visible && self.nesting.last() != Some(&self.pos);
        if nests && self.nesting.len() >= self.config.max_depth {
            tracing::debug!(
                depth = self.nesting.len(),
                pos = self.pos,
                "maximum nesting depth reached, abandoning the rest of the input"
            );
            self.aborted = true;
            return false;
        }

        let start = self.mark();
        if nests {
            self.nesting.push(self.pos);
        }
        self.active.insert(key);

        let parsed = stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, || {
            if visible {
                self.flush_trivia();
                let checkpoint = self.builder.checkpoint();
                self.parse(body) && self.builder.wrap_since(checkpoint, rule).is_ok()
            } else {
                self.parse(body)
            }
        });

        self.active.remove(&key);
        if nests {
            self.nesting.pop();
        }
        if !parsed {
            self.reset(start);
        }

        if self.config.memoize {
            let result = parsed.then(|| MemoSuccess {
                children: self.builder.children_since(start.checkpoint).to_vec(),
                end: self.pos,
                end_trivia_flushed: self.trivia_flushed,
            });
            self.memo.insert(
                rule,
                start.pos,
                MemoEntry {
                    trivia_flushed: start.trivia_flushed,
                    result,
                },
            );
        }
        parsed
    }

    fn parse_left_fold(&mut self, operand: &Production, tails: &[ResolvedTail]) -> bool {
        let start = self.mark();
        self.flush_trivia();
        let checkpoint = self.builder.checkpoint();
        if !self.parse(operand) {
            self.reset(start);
            return false;
        }

        'chain: loop {
            for tail in tails {
                let before = self.mark();
                let split = self.builder.child_count();
                if self.parse(&tail.expr) && self.pos > before.pos {
                    if let Some(left) = tail.left {
                        let grammar = self.grammar;
                        self.builder.label_range(checkpoint.index(), split, left, |element| {
                            Self::is_labelable(grammar, element)
                        });
                    }
                    if self.builder.wrap_since(checkpoint, tail.node).is_err() {
                        self.reset(start);
                        return false;
                    }
                    continue 'chain;
                }
                self.reset(before);
            }
            break;
        }
        true
    }

    fn parse_items(&mut self, item: &Production, end: &[Symbol]) -> bool {
        while !self.at_end(end) {
            let before = self.mark();
            if self.parse(item) && self.pos > before.pos {
                continue;
            }
            self.reset(before);
            if self.recover(item, end).is_err() {
                return false;
            }
        }
        true
    }

    /// Skip tokens until `item` can start again, wrapping them in `ERROR`.
    fn recover(&mut self, item: &Production, end: &[Symbol]) -> Result<(), BuilderError> {
        self.flush_trivia();
        let checkpoint = self.builder.checkpoint();
        let from = self.pos;
        loop {
            self.bump()?;
            if self.at_end(end) || self.starts_item(item) {
                break;
            }
        }
        tracing::trace!(from, to = self.pos, "skipped tokens");
        self.wrap_error(checkpoint)
    }

    /// Whether `item` parses with progress here; never moves the parser.
    fn starts_item(&mut self, item: &Production) -> bool {
        let before = self.mark();
        let matched = self.parse(item) && self.pos > before.pos;
        self.reset(before);
        matched
    }
}
