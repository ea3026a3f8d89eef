use crate::lexer::Token;
use crate::syntax::Symbol;
use std::ops::Range;

/// Significant tokens with the extras that precede each of them
///
/// The parser only ever looks at significant tokens; extras are replayed
/// into the tree just before the token they precede.
#[derive(Debug, Clone, Default)]
pub struct TokenStream {
    tokens: Vec<Token>,
    trivia: Vec<Token>,
    leading: Vec<Range<usize>>,
    trailing: Range<usize>,
}

impl TokenStream {
    /// Split a complete token sequence into significant tokens and extras.
    #[must_use]
    pub fn new(all: Vec<Token>) -> Self {
        let mut stream = Self::default();
        let mut pending = 0;

        for token in all {
            if token.extra {
                stream.trivia.push(token);
            } else {
                stream.leading.push(pending..stream.trivia.len());
                pending = stream.trivia.len();
                stream.tokens.push(token);
            }
        }
        stream.trailing = pending..stream.trivia.len();
        stream
    }

    /// Number of significant tokens
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    #[inline]
    #[must_use]
    pub fn kind(&self, index: usize) -> Option<Symbol> {
        self.tokens.get(index).map(|token| token.kind)
    }

    /// Extras between token `index - 1` and token `index`
    #[must_use]
    pub fn leading_trivia(&self, index: usize) -> &[Token] {
        self.leading
            .get(index)
            .and_then(|range| self.trivia.get(range.clone()))
            .unwrap_or(&[])
    }

    /// Extras after the last significant token
    #[must_use]
    pub fn trailing_trivia(&self) -> &[Token] {
        self.trivia.get(self.trailing.clone()).unwrap_or(&[])
    }

    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}
