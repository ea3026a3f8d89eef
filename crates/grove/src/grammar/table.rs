//! Serialisable grammar tables.
//!
//! A [`GrammarTable`] is a grammar as data: token patterns and rule
//! expressions by name, stored as JSON. Tables are what
//! [`GrammarBuilder`](super::GrammarBuilder) accumulates, so any grammar
//! built in code can be exported and loaded back.
//!
//! ```json
//! {
//!   "name": "calc",
//!   "tokens": [
//!     {"name": "number", "pattern": {"repeat": {"pattern": {"char_class": {"ranges": [["0", "9"]]}}, "min": 1}}},
//!     {"name": "_whitespace", "pattern": {"repeat": {"pattern": {"literal": " "}, "min": 1}}, "extra": true}
//!   ],
//!   "rules": [
//!     {"name": "sum", "expr": {"seq": [{"sym": "number"}, {"lit": "+"}, {"sym": "number"}]}}
//!   ]
//! }
//! ```

use crate::error::GrammarError;
use crate::grammar::{Expr, Grammar, GrammarBuilder};
use crate::lexer::Pattern;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarTable {
    pub name: CompactString,
    /// Entry rule; defaults to the first rule
    #[serde(default)]
    pub entry: Option<CompactString>,
    /// Token that keywords are extracted from
    #[serde(default)]
    pub word: Option<CompactString>,
    /// Run the indentation layout pass
    #[serde(default)]
    pub indentation: bool,
    #[serde(default)]
    pub tokens: Vec<TokenDef>,
    #[serde(default)]
    pub rules: Vec<RuleDef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDef {
    pub name: CompactString,
    pub pattern: Pattern,
    #[serde(default)]
    pub extra: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDef {
    pub name: CompactString,
    pub expr: Expr,
}

impl GrammarTable {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: CompactString::new(name),
            entry: None,
            word: None,
            indentation: false,
            tokens: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Decode a table from JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::MalformedTable`] if the bytes are not a valid table.
    pub fn from_json(bytes: &[u8]) -> Result<Self, GrammarError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Encode the table as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::MalformedTable`] if serialisation fails.
    pub fn to_json(&self) -> Result<String, GrammarError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate and compile the table.
    ///
    /// # Errors
    ///
    /// Returns a [`GrammarError`] describing the first problem found.
    pub fn build(self) -> Result<Grammar, GrammarError> {
        GrammarBuilder::from_table(self).build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CALC: &str = r#"{
        "name": "calc",
        "tokens": [
            {"name": "number", "pattern": {"repeat": {"pattern": {"char_class": {"ranges": [["0", "9"]]}}, "min": 1}}},
            {"name": "_whitespace", "pattern": {"repeat": {"pattern": {"literal": " "}, "min": 1}}, "extra": true}
        ],
        "rules": [
            {"name": "sum", "expr": {"seq": [{"sym": "number"}, {"lit": "+"}, {"sym": "number"}]}}
        ]
    }"#;

    #[test]
    fn test_from_json_and_build() {
        let table = GrammarTable::from_json(CALC.as_bytes()).unwrap();
        assert_eq!(table.name, "calc");
        assert_eq!(table.tokens.len(), 2);
        assert!(table.tokens[1].extra);
        assert!(table.entry.is_none());

        let grammar = table.build().unwrap();
        assert_eq!(grammar.symbol_name(grammar.entry()), "sum");
        assert!(grammar.literal("+").is_some());
    }

    #[test]
    fn test_malformed_json() {
        let err = GrammarTable::from_json(b"{\"name\": 3}").unwrap_err();
        assert!(matches!(err, GrammarError::MalformedTable(_)));
        let err = GrammarTable::from_json(b"not json").unwrap_err();
        assert!(matches!(err, GrammarError::MalformedTable(_)));
    }

    #[test]
    fn test_json_round_trip() {
        let table = GrammarTable::from_json(CALC.as_bytes()).unwrap();
        let json = table.to_json().unwrap();
        assert_eq!(GrammarTable::from_json(json.as_bytes()).unwrap(), table);
    }

    #[test]
    fn test_named_expressions_survive_json() {
        use crate::grammar::{Expr, FoldTail, GrammarBuilder};
        use crate::lexer::{CharSet, Pattern};

        let builder = GrammarBuilder::new("calls")
            .token("identifier", Pattern::many1(Pattern::class(CharSet::chars("abc"))))
            .rule(
                "program",
                Expr::left_fold(
                    Expr::alias(Expr::sym("identifier"), "callee"),
                    [FoldTail::new("call", Expr::field("arguments", Expr::lits(&["(", ")"]))).left("function")],
                ),
            )
            .word("identifier");
        let table = builder.to_table();
        let json = table.to_json().unwrap();
        assert!(json.contains("\"callee\""));
        assert!(json.contains("\"function\""));

        let decoded = GrammarTable::from_json(json.as_bytes()).unwrap();
        assert_eq!(decoded, table);
        let grammar = decoded.build().unwrap();
        assert!(grammar.literal("(").is_some());
    }
}
