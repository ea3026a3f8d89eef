//! # Grammar Module
//!
//! Runtime grammar definitions.
//!
//! ## Overview
//!
//! A [`Grammar`] is plain data: a symbol table, token patterns and rule
//! expressions. Grammars are written in code with [`GrammarBuilder`] or
//! loaded from JSON with [`GrammarTable`]; both go through the same
//! validation:
//!
//! - every referenced name must be a declared token or rule
//! - rule and token names must be unique
//! - the entry rule must exist and be visible
//! - no rule may reach itself without consuming a token (left recursion)
//!
//! Left-associative operators are written with [`Expr::left_fold`] instead
//! of left recursion.
//!
//! ## Naming
//!
//! Names starting with `_` are hidden: their children are spliced into the
//! parent node. Literals (`"("`, `"def"`) are anonymous and visible.

mod builder;
mod expr;
mod table;
mod validate;

pub use builder::{DEDENT, GrammarBuilder, INDENT, NEWLINE};
pub use expr::{Expr, FoldTail};
pub(crate) use expr::{Production, ResolvedTail};
pub use table::{GrammarTable, RuleDef, TokenDef};

use crate::lexer::{CompiledLexer, LayoutSymbols};
use crate::syntax::{FieldId, Symbol, SymbolInfo};
use compact_str::CompactString;
use hashbrown::HashMap;
use lasso::{RodeoReader, Spur};

/// A validated grammar with a compiled lexer
#[derive(Debug)]
pub struct Grammar {
    pub(crate) name: CompactString,
    pub(crate) names: RodeoReader,
    pub(crate) symbols: Vec<SymbolInfo>,
    pub(crate) named: HashMap<Spur, Symbol, ahash::RandomState>,
    pub(crate) literals: HashMap<Spur, Symbol, ahash::RandomState>,
    pub(crate) fields: Vec<Spur>,
    pub(crate) field_ids: HashMap<Spur, FieldId, ahash::RandomState>,
    /// Rule bodies indexed by symbol
    pub(crate) rules: Vec<Option<Production>>,
    pub(crate) rule_count: usize,
    pub(crate) entry: Symbol,
    pub(crate) lexer: CompiledLexer,
    pub(crate) layout: Option<LayoutSymbols>,
}

impl Grammar {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The rule a parse starts from; also the kind of every tree's root
    #[must_use]
    pub const fn entry(&self) -> Symbol {
        self.entry
    }

    /// Name of `symbol`; literals are named by their text.
    ///
    /// Unknown symbols resolve to `"ERROR"`.
    #[must_use]
    pub fn symbol_name(&self, symbol: Symbol) -> &str {
        let info = self.symbols.get(symbol.index()).unwrap_or(&self.symbols[0]);
        self.names.resolve(&info.name)
    }

    #[must_use]
    pub fn symbol_info(&self, symbol: Symbol) -> Option<&SymbolInfo> {
        self.symbols.get(symbol.index())
    }

    /// Named symbol (token, rule, alias) called `name`
    #[must_use]
    pub fn symbol(&self, name: &str) -> Option<Symbol> {
        if name == "ERROR" {
            return Some(Symbol::ERROR);
        }
        self.names
            .get(name)
            .and_then(|spur| self.named.get(&spur).copied())
    }

    /// Anonymous literal token matching `text`
    #[must_use]
    pub fn literal(&self, text: &str) -> Option<Symbol> {
        self.names
            .get(text)
            .and_then(|spur| self.literals.get(&spur).copied())
    }

    #[must_use]
    pub fn field_name(&self, field: FieldId) -> Option<&str> {
        self.fields
            .get(field.index())
            .map(|spur| self.names.resolve(spur))
    }

    #[must_use]
    pub fn field_id(&self, name: &str) -> Option<FieldId> {
        self.names
            .get(name)
            .and_then(|spur| self.field_ids.get(&spur).copied())
    }

    #[must_use]
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub const fn rule_count(&self) -> usize {
        self.rule_count
    }

    #[inline]
    #[must_use]
    pub fn is_visible(&self, symbol: Symbol) -> bool {
        self.symbols
            .get(symbol.index())
            .is_some_and(SymbolInfo::is_visible)
    }

    #[inline]
    #[must_use]
    pub fn is_named(&self, symbol: Symbol) -> bool {
        self.symbols
            .get(symbol.index())
            .is_some_and(SymbolInfo::is_named)
    }

    #[inline]
    #[must_use]
    pub fn is_extra(&self, symbol: Symbol) -> bool {
        self.symbols
            .get(symbol.index())
            .is_some_and(SymbolInfo::is_extra)
    }

    #[must_use]
    pub const fn lexer(&self) -> &CompiledLexer {
        &self.lexer
    }

    /// Layout symbols, for grammars with significant indentation
    #[must_use]
    pub const fn layout(&self) -> Option<LayoutSymbols> {
        self.layout
    }

    pub(crate) fn rule_body(&self, symbol: Symbol) -> Option<&Production> {
        self.rules.get(symbol.index()).and_then(Option::as_ref)
    }
}
