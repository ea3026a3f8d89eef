//! # Grove
//!
//! Grammar-driven concrete syntax trees with allocation-free tree cursors.
//!
//! ## Overview
//!
//! Grove turns UTF-8 source text into an immutable, shareable concrete syntax
//! tree and lets you walk it with a cursor:
//!
//! - **Grammar registry**: grammars are loaded by name, built once per
//!   process and shared as `Arc<Grammar>`
//! - **Lexer**: token patterns compiled into a DFA, with keyword re-tagging
//!   and an indentation layout pass for Python-like languages
//! - **Parser**: a packrat PEG engine that never fails on bad syntax; errors
//!   become `ERROR` nodes in a tree that still covers the whole input
//! - **Syntax tree**: green nodes without positions; [`Node`]s compute byte
//!   offsets and row/column points while navigating
//! - **Tree cursor**: goto-style navigation with an inline frame stack
//!
//! Bundled grammars cover subsets of Python, C++ and JavaScript with
//! tree-sitter style node and field names.
//!
//! ## Quick Start
//!
//! ```rust
//! use grove::{GrammarRegistry, Parser, TreePrinter};
//!
//! let grammar = GrammarRegistry::global().load("python")?;
//! let tree = Parser::new().parse(&grammar, "def main():\n    print('hi')\n")?;
//!
//! let function = tree.root().child(0).unwrap();
//! assert_eq!(function.kind(), "function_definition");
//! assert_eq!(function.child_by_field_name("name").unwrap().text(), "main");
//!
//! let mut cursor = tree.cursor();
//! assert!(cursor.goto_first_child());
//! assert_eq!(cursor.current_node().kind(), "function_definition");
//!
//! let printed = TreePrinter::new().print(&tree);
//! assert!(printed.starts_with("module\n  function_definition\n    def\n"));
//! # Ok::<(), grove::Error>(())
//! ```
//!
//! ## Modules
//!
//! - [`registry`] - Grammar lookup by name
//! - [`grammar`] - Grammar definition, JSON tables and validation
//! - [`lexer`] - Tokenization and the indentation layout pass
//! - [`parser`] - The packrat parsing engine
//! - [`syntax`] - Green trees, nodes, cursors and the printer
//! - [`languages`] - Bundled grammars
//! - [`source`] - Source buffers and line indexes
//! - [`error`] - Error types and diagnostics

pub mod error;
pub mod grammar;
pub mod languages;
pub mod lexer;
pub mod parser;
pub mod registry;
pub mod source;
pub mod syntax;

pub use error::{EncodingError, Error, GrammarError, LexerError};
pub use grammar::{Expr, Grammar, GrammarBuilder, GrammarTable};
pub use parser::{ParseConfig, ParseMetrics, Parser};
pub use registry::{GrammarRegistry, GrammarSource, TableSource};
pub use source::{Point, SourceBuffer};
pub use syntax::{
    Node, Preorder, PrinterConfig, Symbol, SyntaxTree, TextRange, TextSize, TreeCursor, TreePath,
    TreePrinter,
};
