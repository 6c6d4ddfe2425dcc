//! Source location tracking
//!
//! Tokens and syntax nodes both carry positions in the lexer's convention:
//! 1-based lines and 0-based columns. Positions order lexicographically, which
//! the aligner relies on when it sorts call arguments and detects grouping
//! parentheses.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in source text.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct SourcePosition {
    /// Line number (1-based)
    pub line: u32,
    /// Column number (0-based)
    pub column: u32,
}

impl SourcePosition {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// Advance position by one character
    pub fn advance(self, ch: char) -> Self {
        match ch {
            '\n' => Self {
                line: self.line + 1,
                column: 0,
            },
            _ => Self {
                line: self.line,
                column: self.column + 1,
            },
        }
    }

    /// Advance position over a whole string
    pub fn advance_str(self, s: &str) -> Self {
        s.chars().fold(self, |pos, ch| pos.advance(ch))
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Editors count columns from 1
        write!(f, "{}:{}", self.line, self.column + 1)
    }
}

/// A span of source text from start to end position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start position (inclusive)
    pub start: SourcePosition,
    /// End position (exclusive)
    pub end: SourcePosition,
}

impl Span {
    pub fn new(start: SourcePosition, end: SourcePosition) -> Self {
        debug_assert!(start <= end, "Span start must not be after end");
        Self { start, end }
    }

    /// Span covering `text` when it begins at `start`
    pub fn for_text(start: SourcePosition, text: &str) -> Self {
        Self {
            start,
            end: start.advance_str(text),
        }
    }

    /// Zero-width span at a position
    pub fn point(pos: SourcePosition) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Merge two spans into one covering both
    pub fn merge(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn is_multiline(&self) -> bool {
        self.start.line != self.end.line
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else if self.is_multiline() {
            write!(f, "{}-{}", self.start, self.end)
        } else {
            write!(
                f,
                "{}:{}-{}",
                self.start.line,
                self.start.column + 1,
                self.end.column + 1
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_order_by_line_then_column() {
        let a = SourcePosition::new(1, 10);
        let b = SourcePosition::new(2, 0);
        let c = SourcePosition::new(2, 3);
        assert!(a < b);
        assert!(b < c);
        let mut sorted = vec![c, a, b];
        sorted.sort();
        assert_eq!(sorted, vec![a, b, c]);
    }

    #[test]
    fn test_span_for_multiline_text() {
        let span = Span::for_text(SourcePosition::new(3, 4), "'''a\nbc'''");
        assert_eq!(span.end, SourcePosition::new(4, 5));
        assert!(span.is_multiline());
    }

    #[test]
    fn test_span_display() {
        let span = Span::for_text(SourcePosition::new(1, 0), "abc");
        assert_eq!(span.to_string(), "1:1-4");
        assert_eq!(Span::point(SourcePosition::new(7, 2)).to_string(), "7:3");
    }

    #[test]
    fn test_span_merge() {
        let left = Span::for_text(SourcePosition::new(1, 0), "x");
        let right = Span::for_text(SourcePosition::new(1, 4), "y");
        let merged = left.merge(right);
        assert_eq!(merged.start, SourcePosition::new(1, 0));
        assert_eq!(merged.end, SourcePosition::new(1, 5));
    }
}
