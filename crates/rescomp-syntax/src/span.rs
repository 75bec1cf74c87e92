//! Source location tracking for AST nodes.

use std::ops::Range;

use facet::Facet;

/// A span representing a range in source code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Facet)]
pub struct Span {
    /// Start byte offset (0-indexed).
    pub start: u32,
    /// End byte offset (exclusive).
    pub end: u32,
    /// Start line (0-indexed).
    pub start_line: u32,
    /// Start column (0-indexed, in bytes).
    pub start_col: u32,
    /// End line (0-indexed).
    pub end_line: u32,
    /// End column (0-indexed, in bytes).
    pub end_col: u32,
}

impl Span {
    /// Create a new span from byte offsets and positions.
    #[must_use]
    pub const fn new(
        start: u32,
        end: u32,
        start_line: u32,
        start_col: u32,
        end_line: u32,
        end_col: u32,
    ) -> Self {
        Self {
            start,
            end,
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// Create a span from a tree-sitter node.
    #[must_use]
    pub fn from_node(node: &tree_sitter::Node) -> Self {
        let start = node.start_position();
        let end = node.end_position();
        Self {
            start: node.start_byte() as u32,
            end: node.end_byte() as u32,
            start_line: start.row as u32,
            start_col: start.column as u32,
            end_line: end.row as u32,
            end_col: end.column as u32,
        }
    }

    /// Create a dummy span (for synthesized nodes).
    #[must_use]
    pub const fn dummy() -> Self {
        Self::new(0, 0, 0, 0, 0, 0)
    }

    /// Check if this span is a dummy span.
    #[must_use]
    pub const fn is_dummy(&self) -> bool {
        self.start == 0 && self.end == 0
    }

    /// Get the length in bytes.
    #[must_use]
    pub const fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Check if the span is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check whether a byte offset falls inside this span.
    #[must_use]
    pub const fn contains(&self, offset: u32) -> bool {
        self.start <= offset && offset < self.end
    }

    /// The byte range covered by this span.
    #[must_use]
    pub const fn range(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }

    /// Merge two spans to create a span covering both.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        let first = if self.start <= other.start { self } else { other };
        let last = if self.end >= other.end { self } else { other };
        Self::new(
            first.start,
            last.end,
            first.start_line,
            first.start_col,
            last.end_line,
            last.end_col,
        )
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.start_line + 1,
            self.start_col + 1,
            self.end_line + 1,
            self.end_col + 1
        )
    }
}
