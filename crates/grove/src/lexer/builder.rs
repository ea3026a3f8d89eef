use crate::error::GrammarError;
use crate::lexer::dfa::CompiledLexer;
use crate::syntax::Symbol;
use compact_str::CompactString;
use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Highest Unicode scalar value, as used by [`CharSet`] complements
pub(crate) const MAX_CHAR: u32 = char::MAX as u32;

/// Lexical pattern for a token rule
///
/// Everything except [`Pattern::Regex`] compiles into the lexer's DFA.
/// Regex patterns are only allowed at the top level of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    Literal(CompactString),
    CharClass(CharSet),
    Seq(Vec<Pattern>),
    Choice(Vec<Pattern>),
    Repeat {
        pattern: Box<Pattern>,
        #[serde(default)]
        min: usize,
        #[serde(default)]
        max: Option<usize>,
    },
    Regex(CompactString),
    Any,
}

impl Pattern {
    #[must_use]
    pub fn literal(text: &str) -> Self {
        Self::Literal(CompactString::new(text))
    }

    #[must_use]
    pub const fn class(set: CharSet) -> Self {
        Self::CharClass(set)
    }

    #[must_use]
    pub fn regex(source: &str) -> Self {
        Self::Regex(CompactString::new(source))
    }

    #[must_use]
    pub fn seq(parts: impl IntoIterator<Item = Self>) -> Self {
        Self::Seq(parts.into_iter().collect())
    }

    #[must_use]
    pub fn choice(alternatives: impl IntoIterator<Item = Self>) -> Self {
        Self::Choice(alternatives.into_iter().collect())
    }

    #[must_use]
    pub fn repeat(pattern: Self, min: usize, max: Option<usize>) -> Self {
        Self::Repeat {
            pattern: Box::new(pattern),
            min,
            max,
        }
    }

    /// Zero or more
    #[must_use]
    pub fn many(pattern: Self) -> Self {
        Self::repeat(pattern, 0, None)
    }

    /// One or more
    #[must_use]
    pub fn many1(pattern: Self) -> Self {
        Self::repeat(pattern, 1, None)
    }

    #[must_use]
    pub fn optional(pattern: Self) -> Self {
        Self::repeat(pattern, 0, Some(1))
    }
}

/// Set of characters, given as inclusive ranges
///
/// A negated set matches every character outside its ranges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharSet {
    ranges: Vec<(char, char)>,
    #[serde(default)]
    negated: bool,
}

impl CharSet {
    /// Create a new character set with the given ranges
    #[must_use]
    pub const fn new(ranges: Vec<(char, char)>) -> Self {
        Self {
            ranges,
            negated: false,
        }
    }

    /// Every character except those in `ranges`
    #[must_use]
    pub const fn except(ranges: Vec<(char, char)>) -> Self {
        Self {
            ranges,
            negated: true,
        }
    }

    /// Exactly the characters of `chars`
    #[must_use]
    pub fn chars(chars: &str) -> Self {
        Self::new(chars.chars().map(|c| (c, c)).collect())
    }

    /// Every character not in `chars`
    #[must_use]
    pub fn none_of(chars: &str) -> Self {
        Self::except(chars.chars().map(|c| (c, c)).collect())
    }

    /// Create a character set for digits [0-9]
    #[must_use]
    pub fn digits() -> Self {
        Self::new(vec![('0', '9')])
    }

    #[must_use]
    pub fn hex_digits() -> Self {
        Self::new(vec![('0', '9'), ('a', 'f'), ('A', 'F')])
    }

    /// ASCII letters
    #[must_use]
    pub fn alpha() -> Self {
        Self::new(vec![('a', 'z'), ('A', 'Z')])
    }

    /// ASCII letters, digits and `_`
    #[must_use]
    pub fn word() -> Self {
        Self::new(vec![('a', 'z'), ('A', 'Z'), ('0', '9'), ('_', '_')])
    }

    /// Create a character set for whitespace characters
    #[must_use]
    pub fn whitespace() -> Self {
        Self::new(vec![(' ', ' '), ('\t', '\t'), ('\r', '\r'), ('\n', '\n'), ('\u{0C}', '\u{0C}')])
    }

    /// Add `chars` to the ranges (for a negated set: exclude them too).
    #[must_use]
    pub fn with_chars(mut self, chars: &str) -> Self {
        self.ranges.extend(chars.chars().map(|c| (c, c)));
        self
    }

    #[must_use]
    pub fn with_range(mut self, start: char, end: char) -> Self {
        self.ranges.push((start, end));
        self
    }

    /// Check if a character matches this character set
    #[must_use]
    pub fn matches(&self, c: char) -> bool {
        self.ranges.iter().any(|(start, end)| c >= *start && c <= *end) != self.negated
    }

    /// Sorted, merged, non-empty code point ranges matched by this set
    #[must_use]
    pub(crate) fn code_point_ranges(&self) -> Vec<(u32, u32)> {
        let mut ranges: Vec<(u32, u32)> = self
            .ranges
            .iter()
            .filter(|(start, end)| start <= end)
            .map(|&(start, end)| (start as u32, end as u32))
            .collect();
        ranges.sort_unstable();

        let mut merged: Vec<(u32, u32)> = Vec::with_capacity(ranges.len());
        for (start, end) in ranges {
            match merged.last_mut() {
                Some(last) if start <= last.1.saturating_add(1) => last.1 = last.1.max(end),
                _ => merged.push((start, end)),
            }
        }

        if !self.negated {
            return merged;
        }

        let mut complement = Vec::with_capacity(merged.len() + 1);
        let mut next = 0u32;
        for (start, end) in merged {
            if start > next {
                complement.push((next, start - 1));
            }
            next = end.saturating_add(1);
        }
        if next <= MAX_CHAR {
            complement.push((next, MAX_CHAR));
        }
        complement
    }
}

/// One token rule waiting to be compiled
#[derive(Debug, Clone)]
pub struct LexRule {
    pub name: CompactString,
    pub pattern: Pattern,
    pub kind: Symbol,
    pub priority: u32,
}

/// Collects token rules, keywords and extras, then compiles them into a
/// [`CompiledLexer`].
///
/// Rules added earlier win ties between equally long matches.
#[derive(Debug, Clone, Default)]
pub struct LexerBuilder {
    rules: SmallVec<[LexRule; 16]>,
    keywords: HashMap<CompactString, Symbol, ahash::RandomState>,
    extras: HashSet<Symbol, ahash::RandomState>,
    word: Option<Symbol>,
}

impl LexerBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn token(mut self, name: &str, kind: Symbol, pattern: Pattern) -> Self {
        self.rules.push(LexRule {
            name: CompactString::new(name),
            pattern,
            kind,
            priority: u32::try_from(self.rules.len()).unwrap_or(u32::MAX),
        });
        self
    }

    /// Re-tag word tokens whose text equals `text` as `kind`.
    #[must_use]
    pub fn keyword(mut self, text: &str, kind: Symbol) -> Self {
        self.keywords.insert(CompactString::new(text), kind);
        self
    }

    /// Mark `kind` as an extra (whitespace, comments).
    #[must_use]
    pub fn extra(mut self, kind: Symbol) -> Self {
        self.extras.insert(kind);
        self
    }

    /// The token keywords are extracted from, usually `identifier`
    #[must_use]
    pub const fn word(mut self, kind: Symbol) -> Self {
        self.word = Some(kind);
        self
    }

    /// Build the lexer from the configured rules.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern matches the empty string, a regex does
    /// not compile, or a regex is nested inside another pattern.
    pub fn build(self) -> Result<CompiledLexer, GrammarError> {
        CompiledLexer::compile(&self.rules, self.keywords, self.extras, self.word)
    }
}
