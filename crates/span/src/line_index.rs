use ropey::Rope;

use crate::{LineCol, LineColRange, SourceLocation};

/// Offset to line/column conversion over one source text.
///
/// Lines and columns produced here are 0-based, columns count chars.
#[derive(Debug, Clone)]
pub struct LineIndex {
    rope: Rope,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    pub fn len_bytes(&self) -> usize {
        self.rope.len_bytes()
    }

    /// Convert a byte offset. Offsets past the end of the text or inside a
    /// multi-byte char yield `None`.
    pub fn line_col(&self, offset: usize) -> Option<LineCol> {
        let char_idx = self.rope.try_byte_to_char(offset).ok()?;
        if self.rope.try_char_to_byte(char_idx).ok()? != offset {
            return None;
        }
        let line = self.rope.try_char_to_line(char_idx).ok()?;
        let line_start = self.rope.try_line_to_char(line).ok()?;
        Some(LineCol::new(line, char_idx - line_start))
    }

    /// Convert a whole source location into a 0-based line/column range.
    pub fn range(&self, loc: &SourceLocation) -> Option<LineColRange> {
        Some(LineColRange::new(
            self.line_col(loc.start)?,
            self.line_col(loc.end())?,
        ))
    }

    /// Inverse of [`LineIndex::line_col`].
    pub fn offset(&self, pos: LineCol) -> Option<usize> {
        let line_start = self.rope.try_line_to_char(pos.line).ok()?;
        let line_len = self.rope.get_line(pos.line)?.len_chars();
        if pos.column > line_len {
            return None;
        }
        self.rope.try_char_to_byte(line_start + pos.column).ok()
    }
}
