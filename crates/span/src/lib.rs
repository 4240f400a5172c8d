//! Source positions shared by the fast parser, the compiler AST adapter and
//! the language service.
//!
//! Two coordinate systems meet here:
//! 1. [`SourceLocation`], the compiler's `start:length:file` byte triplet.
//! 2. [`LineCol`] / [`LineColRange`], line and column pairs produced by a
//!    [`LineIndex`] or attached to fast-parse nodes.

mod line_index;
mod source_location;


pub use line_index::LineIndex;
pub use source_location::{SourceLocation, SpanError};

use serde::{Deserialize, Serialize};

/// A line and column pair. Whether `line` is 0 or 1 based depends on the
/// producer: fast-parse locations are 1-based, converter output is 0-based.
/// Columns are always 0-based and counted in chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LineCol {
    pub line: usize,
    pub column: usize,
}

impl LineCol {
    #[inline]
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Whether `self` is before or equal to `other`.
    #[inline]
    pub fn less_equal(&self, other: &LineCol) -> bool {
        self <= other
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LineColRange {
    pub start: LineCol,
    pub end: LineCol,
}

impl LineColRange {
    #[inline]
    pub fn new(start: LineCol, end: LineCol) -> Self {
        Self { start, end }
    }

    /// Check if the range covers the line `line`, inclusive on both ends.
    #[inline]
    pub fn contains_line(&self, line: usize) -> bool {
        self.start.line <= line && line <= self.end.line
    }

    #[inline]
    pub fn contains(&self, pos: &LineCol) -> bool {
        self.start.less_equal(pos) && pos.less_equal(&self.end)
    }
}

/// Cursor position reported by the editor. `line_number` is 1-based,
/// `column` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub line_number: usize,
    pub column: usize,
}

impl Position {
    #[inline]
    pub fn new(line_number: usize, column: usize) -> Self {
        Self {
            line_number,
            column,
        }
    }
}
