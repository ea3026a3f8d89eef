//! Bundled grammars.
//!
//! Subsets of Python, C++ and JavaScript, with node and field names
//! following the tree-sitter grammars for those languages
//! (`function_definition`, `argument_list`, field `body`, ...).
//!
//! String literals are single tokens, and the C++ grammar has no
//! preprocessor.

pub mod cpp;
pub mod javascript;
pub mod python;

use crate::error::GrammarError;
use crate::grammar::Grammar;
use crate::lexer::{CharSet, Pattern};

/// Builds one bundled grammar
pub type BuildFn = fn() -> Result<Grammar, GrammarError>;

/// Bundled grammars by registry name
pub const BUILTIN: &[(&str, BuildFn)] = &[
    ("python", python::grammar),
    ("cpp", cpp::grammar),
    ("javascript", javascript::grammar),
];

/// Demo snippet for a bundled language
#[must_use]
pub fn sample_code(language: &str) -> Option<&'static str> {
    match language {
        "python" => Some(python::SAMPLE),
        "cpp" => Some(cpp::SAMPLE),
        "javascript" => Some(javascript::SAMPLE),
        _ => None,
    }
}

/// Short constructors for grammar definitions
pub(crate) mod dsl {
    pub(crate) use crate::grammar::{Expr, FoldTail};

    pub(crate) fn sym(name: &str) -> Expr {
        Expr::sym(name)
    }

    pub(crate) fn lit(text: &str) -> Expr {
        Expr::lit(text)
    }

    pub(crate) fn lits(texts: &[&str]) -> Expr {
        Expr::lits(texts)
    }

    pub(crate) fn seq<const N: usize>(exprs: [Expr; N]) -> Expr {
        Expr::seq(exprs)
    }

    pub(crate) fn choice<const N: usize>(exprs: [Expr; N]) -> Expr {
        Expr::choice(exprs)
    }

    pub(crate) fn opt(expr: Expr) -> Expr {
        Expr::opt(expr)
    }

    pub(crate) fn star(expr: Expr) -> Expr {
        Expr::star(expr)
    }

    pub(crate) fn plus(expr: Expr) -> Expr {
        Expr::plus(expr)
    }

    pub(crate) fn field(name: &str, expr: Expr) -> Expr {
        Expr::field(name, expr)
    }

    pub(crate) fn alias(expr: Expr, name: &str) -> Expr {
        Expr::alias(expr, name)
    }

    /// `item ("," item)*`, no trailing separator
    pub(crate) fn comma_sep1(item: Expr) -> Expr {
        Expr::sep1(item, Expr::lit(","))
    }

    pub(crate) fn comma_sep(item: Expr) -> Expr {
        Expr::opt(comma_sep1(item))
    }

    /// Comma list with an optional trailing comma
    pub(crate) fn comma_list(item: Expr) -> Expr {
        Expr::sep_trailing(item, ",")
    }

    pub(crate) fn binary(node: &str, operand: &str, operators: &[&str]) -> Expr {
        Expr::binary(node, operand, operators)
    }

    pub(crate) fn tail(node: &str, left: &str, expr: Expr) -> FoldTail {
        FoldTail::new(node, expr).left(left)
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`, plus `extra` characters in both positions
pub(crate) fn identifier(extra: &str) -> Pattern {
    Pattern::seq([
        Pattern::class(CharSet::alpha().with_chars("_").with_chars(extra)),
        Pattern::many(Pattern::class(CharSet::word().with_chars(extra))),
    ])
}

pub(crate) fn whitespace() -> Pattern {
    Pattern::many1(Pattern::class(CharSet::whitespace()))
}

/// `prefix` up to the end of the line
pub(crate) fn line_comment(prefix: &str) -> Pattern {
    Pattern::seq([
        Pattern::literal(prefix),
        Pattern::many(Pattern::class(CharSet::none_of("\n"))),
    ])
}

/// `/* ... */`
pub(crate) fn block_comment() -> Pattern {
    let not_star = || Pattern::many(Pattern::class(CharSet::none_of("*")));
    let stars = || Pattern::many1(Pattern::literal("*"));
    Pattern::seq([
        Pattern::literal("/*"),
        not_star(),
        stars(),
        Pattern::many(Pattern::seq([
            Pattern::class(CharSet::none_of("/*")),
            not_star(),
            stars(),
        ])),
        Pattern::literal("/"),
    ])
}

/// `quote ( [^quote \\ \n] | \\ any )* quote`
pub(crate) fn quoted(quote: char) -> Pattern {
    let mut excluded = String::from("\\\n");
    excluded.push(quote);
    let quote = quote.to_string();
    Pattern::seq([
        Pattern::literal(&quote),
        Pattern::many(Pattern::choice([
            Pattern::class(CharSet::none_of(&excluded)),
            Pattern::seq([Pattern::literal("\\"), Pattern::Any]),
        ])),
        Pattern::literal(&quote),
    ])
}

pub(crate) fn digits(separator: &str) -> Pattern {
    Pattern::seq([
        Pattern::class(CharSet::digits()),
        Pattern::many(Pattern::class(CharSet::digits().with_chars(separator))),
    ])
}

/// `0x` followed by hex digits
pub(crate) fn hex_number(separator: &str) -> Pattern {
    Pattern::seq([
        Pattern::literal("0"),
        Pattern::class(CharSet::chars("xX")),
        Pattern::many1(Pattern::class(CharSet::hex_digits().with_chars(separator))),
    ])
}

/// Decimal number with optional fraction and exponent: `1`, `1.5`, `.5`, `1e10`
pub(crate) fn decimal_number(separator: &str) -> Pattern {
    let exponent = || {
        Pattern::optional(Pattern::seq([
            Pattern::class(CharSet::chars("eE")),
            Pattern::optional(Pattern::class(CharSet::chars("+-"))),
            digits(separator),
        ]))
    };
    Pattern::choice([
        Pattern::seq([
            digits(separator),
            Pattern::optional(Pattern::seq([
                Pattern::literal("."),
                Pattern::many(Pattern::class(CharSet::digits().with_chars(separator))),
            ])),
            exponent(),
        ]),
        Pattern::seq([Pattern::literal("."), digits(separator), exponent()]),
    ])
}
