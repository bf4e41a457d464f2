//! Source positions for tokens and diagnostics
//!
//! The lexer works on byte offsets (that is what logos hands back); humans want
//! lines and columns. [`SourceLocation`] indexes line starts once per document
//! and answers offset lookups with a binary search.
//!
//! Both line and column are 1-based, and columns count characters rather than
//! bytes so that a non-ASCII string earlier on the line does not push the
//! reported column to the right.

use std::fmt;

/// A 1-based line:column position in a source document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

/// Converts byte offsets into a document to line/column positions
pub struct SourceLocation<'src> {
    source: &'src str,
    /// Byte offsets where each line starts
    line_starts: Vec<usize>,
}

impl<'src> SourceLocation<'src> {
    pub fn new(source: &'src str) -> Self {
        let mut line_starts = vec![0];

        for (byte_pos, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(byte_pos + 1);
            }
        }

        Self {
            source,
            line_starts,
        }
    }

    /// Convert a byte offset to a position. Offsets past the end clamp to the
    /// end of the document.
    pub fn byte_to_position(&self, byte_offset: usize) -> Position {
        let byte_offset = byte_offset.min(self.source.len());
        let line = self
            .line_starts
            .binary_search(&byte_offset)
            .unwrap_or_else(|i| i - 1);

        let line_start = self.line_starts[line];
        let column = self
            .source
            .get(line_start..byte_offset)
            .map(|prefix| prefix.chars().count())
            .unwrap_or(byte_offset - line_start);

        Position::new(line + 1, column + 1)
    }

    /// Position just past the last character, used for `Eof` tokens
    pub fn end_position(&self) -> Position {
        self.byte_to_position(self.source.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_to_position_single_line() {
        let loc = SourceLocation::new("Hello");
        assert_eq!(loc.byte_to_position(0), Position::new(1, 1));
        assert_eq!(loc.byte_to_position(4), Position::new(1, 5));
    }

    #[test]
    fn test_byte_to_position_multiline() {
        let loc = SourceLocation::new("{\n  \"a\": 1\n}");

        assert_eq!(loc.byte_to_position(0), Position::new(1, 1));
        assert_eq!(loc.byte_to_position(4), Position::new(2, 3));
        assert_eq!(loc.byte_to_position(11), Position::new(3, 1));
    }

    #[test]
    fn test_columns_count_characters() {
        let loc = SourceLocation::new("\"é\" x");
        // 'x' sits at byte 5 but is the fifth character
        assert_eq!(loc.byte_to_position(5), Position::new(1, 5));
    }

    #[test]
    fn test_end_position() {
        let loc = SourceLocation::new("[1,\n2]\n");
        assert_eq!(loc.end_position(), Position::new(3, 1));
        assert_eq!(SourceLocation::new("").end_position(), Position::new(1, 1));
    }

    #[test]
    fn test_position_display() {
        assert_eq!(Position::new(3, 14).to_string(), "3:14");
    }
}
