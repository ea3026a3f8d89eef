//! Grammar expressions.
//!
//! [`Expr`] is the authoring form: it refers to tokens and rules by name and
//! is what [`GrammarBuilder`](super::GrammarBuilder) and the JSON
//! [`GrammarTable`](super::GrammarTable) accept. Building a grammar resolves
//! names into [`Production`]s, which the parser runs.

use crate::syntax::{FieldId, Symbol};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Grammar expression over symbol names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    /// A named token or rule
    Sym(CompactString),
    /// An anonymous token with fixed text; registered automatically
    Lit(CompactString),
    Seq(Vec<Expr>),
    /// Ordered choice: the first alternative that matches wins
    Choice(Vec<Expr>),
    Opt(Box<Expr>),
    Repeat {
        expr: Box<Expr>,
        #[serde(default)]
        min: usize,
        #[serde(default)]
        max: Option<usize>,
    },
    /// Label every visible element produced by `expr` with `name`
    Field { name: CompactString, expr: Box<Expr> },
    /// Rename the element produced by `expr` to the named symbol `name`
    Alias { name: CompactString, expr: Box<Expr> },
    /// Left-associative chain: `operand (tail)*`, each tail wrapping
    /// everything so far into a new node
    LeftFold {
        operand: Box<Expr>,
        tails: Vec<FoldTail>,
    },
    /// Zero or more `item`s up to one of the `end` tokens or end of input;
    /// tokens that start no item are wrapped into `ERROR` nodes
    Items {
        item: Box<Expr>,
        #[serde(default)]
        end: Vec<Expr>,
    },
    Eof,
    Empty,
}

/// One way to extend a [`Expr::LeftFold`] chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldTail {
    /// Kind of the node wrapping the chain so far plus this tail
    pub node: CompactString,
    /// Field given to the chain so far inside the new node
    #[serde(default)]
    pub left: Option<CompactString>,
    pub expr: Expr,
}

impl FoldTail {
    #[must_use]
    pub fn new(node: &str, expr: Expr) -> Self {
        Self {
            node: CompactString::new(node),
            left: None,
            expr,
        }
    }

    #[must_use]
    pub fn left(mut self, field: &str) -> Self {
        self.left = Some(CompactString::new(field));
        self
    }
}

impl Expr {
    #[must_use]
    pub fn sym(name: &str) -> Self {
        Self::Sym(CompactString::new(name))
    }

    #[must_use]
    pub fn lit(text: &str) -> Self {
        Self::Lit(CompactString::new(text))
    }

    #[must_use]
    pub fn seq(exprs: impl IntoIterator<Item = Self>) -> Self {
        Self::Seq(exprs.into_iter().collect())
    }

    #[must_use]
    pub fn choice(exprs: impl IntoIterator<Item = Self>) -> Self {
        Self::Choice(exprs.into_iter().collect())
    }

    /// Choice between literal tokens
    #[must_use]
    pub fn lits(texts: &[&str]) -> Self {
        Self::choice(texts.iter().map(|text| Self::lit(text)))
    }

    #[must_use]
    pub fn opt(expr: Self) -> Self {
        Self::Opt(Box::new(expr))
    }

    #[must_use]
    pub fn repeat(expr: Self, min: usize, max: Option<usize>) -> Self {
        Self::Repeat {
            expr: Box::new(expr),
            min,
            max,
        }
    }

    /// Zero or more
    #[must_use]
    pub fn star(expr: Self) -> Self {
        Self::repeat(expr, 0, None)
    }

    /// One or more
    #[must_use]
    pub fn plus(expr: Self) -> Self {
        Self::repeat(expr, 1, None)
    }

    #[must_use]
    pub fn field(name: &str, expr: Self) -> Self {
        Self::Field {
            name: CompactString::new(name),
            expr: Box::new(expr),
        }
    }

    #[must_use]
    pub fn alias(expr: Self, name: &str) -> Self {
        Self::Alias {
            name: CompactString::new(name),
            expr: Box::new(expr),
        }
    }

    #[must_use]
    pub fn left_fold(operand: Self, tails: impl IntoIterator<Item = FoldTail>) -> Self {
        Self::LeftFold {
            operand: Box::new(operand),
            tails: tails.into_iter().collect(),
        }
    }

    /// Left-associative binary operators over `operand`, producing `node`
    /// with `left`, `operator` and `right` fields.
    #[must_use]
    pub fn binary(node: &str, operand: &str, operators: &[&str]) -> Self {
        Self::left_fold(
            Self::sym(operand),
            [FoldTail::new(
                node,
                Self::seq([
                    Self::field("operator", Self::lits(operators)),
                    Self::field("right", Self::sym(operand)),
                ]),
            )
            .left("left")],
        )
    }

    #[must_use]
    pub fn items(item: Self, end: impl IntoIterator<Item = Self>) -> Self {
        Self::Items {
            item: Box::new(item),
            end: end.into_iter().collect(),
        }
    }

    /// `item (sep item)*`
    #[must_use]
    pub fn sep1(item: Self, sep: Self) -> Self {
        Self::seq([item.clone(), Self::star(Self::seq([sep, item]))])
    }

    /// `item (sep item)* sep?`
    #[must_use]
    pub fn sep1_trailing(item: Self, sep: &str) -> Self {
        Self::seq([Self::sep1(item, Self::lit(sep)), Self::opt(Self::lit(sep))])
    }

    /// Optional comma-style list with an optional trailing separator
    #[must_use]
    pub fn sep_trailing(item: Self, sep: &str) -> Self {
        Self::opt(Self::sep1_trailing(item, sep))
    }

    /// Calls `f` on every symbol name this expression mentions, with whether
    /// the name is a literal.
    pub(crate) fn visit_names<'a>(&'a self, f: &mut impl FnMut(&'a str, NameUse)) {
        match self {
            Self::Sym(name) => f(name, NameUse::Symbol),
            Self::Lit(text) => f(text, NameUse::Literal),
            Self::Seq(exprs) | Self::Choice(exprs) => {
                for expr in exprs {
                    expr.visit_names(f);
                }
            }
            Self::Opt(expr) | Self::Repeat { expr, .. } => expr.visit_names(f),
            Self::Field { name, expr } => {
                f(name, NameUse::Field);
                expr.visit_names(f);
            }
            Self::Alias { name, expr } => {
                f(name, NameUse::Alias);
                expr.visit_names(f);
            }
            Self::LeftFold { operand, tails } => {
                operand.visit_names(f);
                for tail in tails {
                    f(&tail.node, NameUse::Alias);
                    if let Some(left) = &tail.left {
                        f(left, NameUse::Field);
                    }
                    tail.expr.visit_names(f);
                }
            }
            Self::Items { item, end } => {
                item.visit_names(f);
                for expr in end {
                    expr.visit_names(f);
                }
            }
            Self::Eof | Self::Empty => {}
        }
    }
}

/// How an expression mentions a name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NameUse {
    Symbol,
    Literal,
    Field,
    /// Names a symbol the expression creates (alias target, fold node)
    Alias,
}

/// Expression with names resolved to symbol and field ids
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Production {
    Token(Symbol),
    Rule(Symbol),
    Seq(Vec<Production>),
    Choice(Vec<Production>),
    Opt(Box<Production>),
    Repeat {
        expr: Box<Production>,
        min: usize,
        max: Option<usize>,
    },
    Field {
        field: FieldId,
        expr: Box<Production>,
    },
    Alias {
        symbol: Symbol,
        expr: Box<Production>,
    },
    LeftFold {
        operand: Box<Production>,
        tails: Vec<ResolvedTail>,
    },
    Items {
        item: Box<Production>,
        end: SmallVec<[Symbol; 4]>,
    },
    Eof,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResolvedTail {
    pub(crate) node: Symbol,
    pub(crate) left: Option<FieldId>,
    pub(crate) expr: Production,
}

impl Production {
    /// Whether this expression can succeed without consuming a token
    pub(crate) fn is_nullable(&self, rule_nullable: &impl Fn(Symbol) -> bool) -> bool {
        match self {
            Self::Token(_) => false,
            Self::Rule(symbol) => rule_nullable(*symbol),
            Self::Seq(exprs) => exprs.iter().all(|e| e.is_nullable(rule_nullable)),
            Self::Choice(exprs) => exprs.iter().any(|e| e.is_nullable(rule_nullable)),
            Self::Opt(_) | Self::Items { .. } | Self::Eof | Self::Empty => true,
            Self::Repeat { expr, min, .. } => *min == 0 || expr.is_nullable(rule_nullable),
            Self::Field { expr, .. } | Self::Alias { expr, .. } => expr.is_nullable(rule_nullable),
            Self::LeftFold { operand, .. } => operand.is_nullable(rule_nullable),
        }
    }

    /// Rules this expression may invoke before consuming any token
    pub(crate) fn leftmost_rules(
        &self,
        rule_nullable: &impl Fn(Symbol) -> bool,
        out: &mut Vec<Symbol>,
    ) {
        match self {
            Self::Token(_) | Self::Eof | Self::Empty => {}
            Self::Rule(symbol) => out.push(*symbol),
            Self::Seq(exprs) => {
                for expr in exprs {
                    expr.leftmost_rules(rule_nullable, out);
                    if !expr.is_nullable(rule_nullable) {
                        break;
                    }
                }
            }
            Self::Choice(exprs) => {
                for expr in exprs {
                    expr.leftmost_rules(rule_nullable, out);
                }
            }
            Self::Opt(expr)
            | Self::Repeat { expr, .. }
            | Self::Field { expr, .. }
            | Self::Alias { expr, .. }
            | Self::Items { item: expr, .. } => expr.leftmost_rules(rule_nullable, out),
            Self::LeftFold { operand, tails } => {
                operand.leftmost_rules(rule_nullable, out);
                if operand.is_nullable(rule_nullable) {
                    for tail in tails {
                        tail.expr.leftmost_rules(rule_nullable, out);
                    }
                }
            }
        }
    }
}
