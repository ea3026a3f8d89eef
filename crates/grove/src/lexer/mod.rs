//! # Lexer Module
//!
//! Tokenization for grammar-driven parsing.
//!
//! ## Overview
//!
//! Token rules are [`Pattern`]s compiled into a single DFA (Thompson
//! construction, then subset construction). Scanning uses maximal munch with
//! declaration order as the tie-breaker; regex patterns are matched with the
//! `regex` crate as a fallback. A word token (usually `identifier`) whose text
//! is a keyword is re-tagged as that keyword.
//!
//! The lexer never fails: characters no rule matches become `ERROR` tokens
//! and [`LexerError`](crate::error::LexerError) records.
//!
//! ```rust
//! use grove::lexer::{CharSet, LexerBuilder, Pattern};
//! use grove::syntax::Symbol;
//!
//! let ident = Symbol::from_raw(1);
//! let space = Symbol::from_raw(2);
//! let lexer = LexerBuilder::new()
//!     .token("identifier", ident, Pattern::many1(Pattern::class(CharSet::alpha())))
//!     .token("_whitespace", space, Pattern::many1(Pattern::class(CharSet::whitespace())))
//!     .extra(space)
//!     .build()?;
//!
//! let output = lexer.tokenize("hello world");
//! assert_eq!(output.tokens.len(), 3);
//! assert!(output.errors.is_empty());
//! # Ok::<(), grove::error::GrammarError>(())
//! ```

pub mod builder;
pub mod dfa;
pub mod layout;
pub mod stream;
pub mod token;

pub use builder::{CharSet, LexRule, LexerBuilder, Pattern};
pub use dfa::{CompiledLexer, LexOutput};
pub use layout::{LayoutSymbols, apply_layout};
pub use stream::TokenStream;
pub use token::Token;
