use crate::syntax::{Symbol, TextRange, TextSize};
use compact_str::CompactString;

/// A token produced by the lexer.
///
/// Tokens carry their own text so the parser can build green tokens without
/// going back to the source buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: Symbol,
    pub text: CompactString,
    /// The byte range in the source text where this token appears
    pub range: TextRange,
    /// Whitespace or comment, allowed between any two significant tokens
    pub extra: bool,
}

impl Token {
    #[must_use]
    pub fn new(kind: Symbol, text: impl Into<CompactString>, range: TextRange) -> Self {
        Self {
            kind,
            text: text.into(),
            range,
            extra: false,
        }
    }

    /// Zero-width token synthesised at `offset`
    #[must_use]
    pub fn zero_width(kind: Symbol, offset: TextSize) -> Self {
        Self::new(kind, CompactString::default(), TextRange::empty(offset))
    }

    #[must_use]
    pub const fn len(&self) -> TextSize {
        self.range.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}
