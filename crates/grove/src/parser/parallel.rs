//! # Parallel Parsing Support
//!
//! Batch parsing of many sources on the rayon thread pool. Each source gets
//! its own engine state; the grammar is shared read-only.

use crate::error::Error;
use crate::grammar::Grammar;
use crate::parser::Parser;
use crate::syntax::SyntaxTree;
use rayon::prelude::*;
use std::sync::Arc;

impl Parser {
    /// Parse every source concurrently.
    ///
    /// Results come back in input order; a source with invalid UTF-8 or
    /// over [`MAX_SOURCE_LEN`](crate::parser::MAX_SOURCE_LEN) bytes yields an
    /// `Err` without affecting the others.
    pub fn parse_batch<S>(&self, grammar: &Arc<Grammar>, sources: &[S]) -> Vec<Result<SyntaxTree, Error>>
    where
        S: AsRef<[u8]> + Sync,
    {
        tracing::debug!(grammar = grammar.name(), sources = sources.len(), "parsing batch");
        sources
            .par_iter()
            .map(|source| self.parse(grammar, source))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Expr, GrammarBuilder};
    use crate::lexer::{CharSet, Pattern};

    #[test]
    fn test_parse_batch_keeps_order() {
        let grammar = Arc::new(
            GrammarBuilder::new("digits")
                .token("digit", Pattern::class(CharSet::digits()))
                .rule("number", Expr::plus(Expr::sym("digit")))
                .build()
                .unwrap(),
        );
        let sources: Vec<Vec<u8>> = vec![b"1".to_vec(), b"12".to_vec(), vec![0xFF], b"123".to_vec()];
        let results = Parser::new().parse_batch(&grammar, &sources);

        assert_eq!(results.len(), 4);
        let lens: Vec<_> = results
            .iter()
            .map(|result| result.as_ref().ok().map(|tree| tree.text().len()))
            .collect();
        assert_eq!(lens, [Some(1), Some(2), None, Some(3)]);
        assert!(matches!(results[2], Err(Error::Encoding(_))));
    }
}
