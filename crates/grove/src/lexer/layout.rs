//! Indentation layout for whitespace-sensitive grammars.
//!
//! Python-style blocks are delimited by indentation rather than brackets.
//! This pass turns indentation into zero-width `_newline`, `_indent` and
//! `_dedent` tokens so the parser can treat blocks like bracketed lists:
//!
//! - `_newline` and `_dedent` sit at the end of the last significant token
//!   of a logical line, before the trivia that follows it
//! - `_indent` sits at the start of the first token of the deeper line
//! - lines inside `()`, `[]` or `{}` continue the current logical line
//! - so do lines ending in a backslash, which the grammar lexes as an extra
//!   token starting with `\`
//!
//! Blank lines and comment-only lines never affect indentation since only
//! significant tokens are looked at.

use crate::lexer::Token;
use crate::syntax::{Symbol, TextSize};
use smallvec::{SmallVec, smallvec};

/// Symbols of the three layout tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutSymbols {
    pub newline: Symbol,
    pub indent: Symbol,
    pub dedent: Symbol,
}

/// Insert layout tokens into a complete token sequence.
#[must_use]
pub fn apply_layout(tokens: Vec<Token>, source: &str, symbols: LayoutSymbols) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len() + tokens.len() / 4 + 2);
    let mut indents: SmallVec<[u32; 16]> = smallvec![0];
    let mut bracket_depth = 0usize;
    let mut last_end: Option<TextSize> = None;
    // Index in `out` right after the last significant token
    let mut insert_at = 0;
    // Line breaks escaped by backslashes since the last significant token
    let mut escaped = 0usize;

    for token in tokens {
        if token.extra {
            if token.text.starts_with('\\') {
                escaped += memchr::memchr_iter(b'\n', token.text.as_bytes()).count();
            }
            out.push(token);
            continue;
        }

        let start = token.range.start();
        let column = column_of(source, start);
        match last_end {
            Some(prev_end)
                if bracket_depth == 0 && line_breaks_between(source, prev_end, start) > escaped =>
            {
                let mut closing: SmallVec<[Token; 4]> = smallvec![Token::zero_width(symbols.newline, prev_end)];
                while indents.len() > 1 && column < indents[indents.len() - 1] {
                    indents.pop();
                    closing.push(Token::zero_width(symbols.dedent, prev_end));
                }
                out.splice(insert_at..insert_at, closing);
                if column > indents[indents.len() - 1] {
                    indents.push(column);
                    out.push(Token::zero_width(symbols.indent, start));
                }
            }
            None if column > 0 => {
                indents.push(column);
                out.push(Token::zero_width(symbols.indent, start));
            }
            _ => {}
        }

        match token.text.as_str() {
            "(" | "[" | "{" => bracket_depth += 1,
            ")" | "]" | "}" => bracket_depth = bracket_depth.saturating_sub(1),
            _ => {}
        }
        last_end = Some(token.range.end());
        escaped = 0;
        out.push(token);
        insert_at = out.len();
    }

    if let Some(prev_end) = last_end {
        let closing = std::iter::once(Token::zero_width(symbols.newline, prev_end)).chain(
            (1..indents.len()).map(|_| Token::zero_width(symbols.dedent, prev_end)),
        );
        out.splice(insert_at..insert_at, closing);
    }

    out
}

fn line_breaks_between(source: &str, from: TextSize, to: TextSize) -> usize {
    source
        .as_bytes()
        .get(from.to_usize()..to.to_usize())
        .map_or(0, |between| memchr::memchr_iter(b'\n', between).count())
}

/// Byte column of `offset` within its line
fn column_of(source: &str, offset: TextSize) -> u32 {
    let offset = offset.to_usize().min(source.len());
    let line_start = memchr::memrchr(b'\n', &source.as_bytes()[..offset]).map_or(0, |i| i + 1);
    u32::try_from(offset - line_start).unwrap_or(u32::MAX)
}
