//! Symbol and field identifiers.
//!
//! A grammar owns a symbol table; trees store only the small copyable ids
//! defined here and resolve names through the grammar.
//!
//! Symbols fall into a few categories:
//! - named tokens produced by the lexer (`identifier`, `integer`)
//! - anonymous literal tokens (`(`, `def`)
//! - rules produced by the parser (`function_definition`)
//! - the reserved [`Symbol::ERROR`]
//!
//! Extras (whitespace, comments) and layout tokens are named tokens with
//! extra flags. Symbols whose name starts with `_` are hidden.

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Id of a symbol in a grammar's symbol table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Symbol(u16);

impl Symbol {
    /// Reserved symbol for syntax errors; always id 0.
    pub const ERROR: Self = Self(0);

    #[must_use]
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[must_use]
    pub const fn is_error(self) -> bool {
        self.0 == 0
    }
}

/// Id of a field name in a grammar's field table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct FieldId(u16);

impl FieldId {
    #[must_use]
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// What produced a symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// Token with a lexical pattern
    Token,
    /// Anonymous token matching fixed text (punctuation, keywords)
    Literal,
    /// Production rule
    Rule,
    /// Name introduced by an alias or a left-fold node
    Alias,
    /// Zero-width token synthesised from indentation
    Layout,
    /// The reserved `ERROR` symbol
    Error,
}

/// Per-symbol flags, stored in the grammar's symbol table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolInfo {
    pub(crate) name: lasso::Spur,
    pub(crate) kind: SymbolKind,
    pub(crate) hidden: bool,
    pub(crate) extra: bool,
}

impl SymbolInfo {
    #[must_use]
    pub const fn kind(&self) -> SymbolKind {
        self.kind
    }

    /// Named symbols are everything except anonymous literals.
    #[must_use]
    pub const fn is_named(&self) -> bool {
        !matches!(self.kind, SymbolKind::Literal)
    }

    /// Visible symbols show up as nodes; hidden ones are skipped.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        !self.hidden
    }

    #[must_use]
    pub const fn is_extra(&self) -> bool {
        self.extra
    }
}
