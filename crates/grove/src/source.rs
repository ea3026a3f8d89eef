//! Source buffers and byte offset → row/column conversion.

use crate::error::EncodingError;
use crate::syntax::TextSize;
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;

/// Zero-based row and byte column in source text
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point {
    pub row: u32,
    /// Column in UTF-8 bytes from the start of the row
    pub column: u32,
}

impl Point {
    #[must_use]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.row, self.column)
    }
}

/// Text encoding of a source buffer. Only UTF-8 is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    Utf8,
}

/// Line start table for O(log n) offset → point lookups
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offsets of line starts, beginning with 0
    line_starts: Vec<TextSize>,
    text_len: TextSize,
}

impl LineIndex {
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::zero()];
        line_starts.extend(
            memchr::memchr_iter(b'\n', text.as_bytes())
                .map(|i| TextSize::from(u32::try_from(i + 1).unwrap_or(u32::MAX))),
        );
        Self {
            line_starts,
            text_len: TextSize::of(text),
        }
    }

    /// Point of `offset`; offsets past the end clamp to the end of the text.
    #[must_use]
    pub fn point(&self, offset: TextSize) -> Point {
        let offset = offset.min(self.text_len);
        let row = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        };
        let column = offset - self.line_starts[row];
        Point {
            row: u32::try_from(row).unwrap_or(u32::MAX),
            column: column.into(),
        }
    }

    /// Byte offset of `point`, if the row exists
    #[must_use]
    pub fn offset(&self, point: Point) -> Option<TextSize> {
        let start = *self.line_starts.get(point.row as usize)?;
        let offset = start + TextSize::from(point.column);
        (offset <= self.text_len).then_some(offset)
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

/// Immutable UTF-8 source text with a lazily built line index
///
/// Cloning shares the text.
#[derive(Debug, Clone)]
pub struct SourceBuffer {
    text: Arc<str>,
    line_index: Arc<OnceCell<LineIndex>>,
}

impl SourceBuffer {
    /// Validate `bytes` as UTF-8 and take ownership of them.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError`] with the offset of the first invalid sequence.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EncodingError> {
        let text = std::str::from_utf8(bytes).map_err(EncodingError::from)?;
        Ok(Self::new(text))
    }

    #[must_use]
    pub fn new(text: &str) -> Self {
        Self {
            text: Arc::from(text),
            line_index: Arc::new(OnceCell::new()),
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn len(&self) -> TextSize {
        TextSize::of(&self.text)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    #[must_use]
    pub const fn encoding(&self) -> Encoding {
        Encoding::Utf8
    }

    #[must_use]
    pub fn line_index(&self) -> &LineIndex {
        self.line_index.get_or_init(|| LineIndex::new(&self.text))
    }

    #[must_use]
    pub fn point(&self, offset: TextSize) -> Point {
        self.line_index().point(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_index_points() {
        let index = LineIndex::new("line 1\nline 2\nline 3");
        assert_eq!(index.line_count(), 3);
        assert_eq!(index.point(TextSize::zero()), Point::new(0, 0));
        assert_eq!(index.point(TextSize::from(7)), Point::new(1, 0));
        assert_eq!(index.point(TextSize::from(10)), Point::new(1, 3));
        assert_eq!(index.point(TextSize::from(500)), Point::new(2, 6));
    }

    #[test]
    fn test_line_index_offset_round_trip() {
        let index = LineIndex::new("ab\ncd\n");
        let point = index.point(TextSize::from(4));
        assert_eq!(index.offset(point), Some(TextSize::from(4)));
        assert_eq!(index.offset(Point::new(9, 0)), None);
    }

    #[test]
    fn test_source_buffer_rejects_invalid_utf8() {
        let err = SourceBuffer::from_bytes(b"ok\xff\xfe").unwrap_err();
        assert_eq!(err.valid_up_to, 2);
        assert_eq!(err.error_len, Some(1));
    }

    #[test]
    fn test_source_buffer_accessors() {
        let source = SourceBuffer::from_bytes("héllo\nwörld".as_bytes()).unwrap();
        assert_eq!(source.len(), TextSize::from(13));
        assert_eq!(source.encoding(), Encoding::Utf8);
        assert_eq!(source.point(TextSize::from(7)), Point::new(1, 0));
        assert_eq!(Point::new(1, 0).to_string(), "[1, 0]");
    }
}
