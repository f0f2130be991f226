//! Authoritative text buffer for the shader editor.
//!
//! A `Document` stores its characters in a `ropey::Rope` and keeps a separate
//! line-start table that is patched on every insert/delete instead of being
//! rebuilt by scanning. All offsets are char indices; the buffer never holds
//! presentation state such as the line-number gutter.
//!
//! Invariants (hold after every public call):
//! * `line_count() >= 1`. An empty document is a single empty line.
//! * The line-start table agrees with the LF positions in the content.
//! * Content is LF-only. Other endings are normalized on load.

use ropey::Rope;
use std::fmt;
use tracing::trace;

mod line_ending;
mod line_index;

pub use line_ending::{LineEnding, NormalizedText, normalize_line_endings};
use line_index::LineIndex;

/// Bounds violations. Callers clamp before addressing the buffer, so seeing
/// one of these means an upstream coordinate invariant was broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TextError {
    #[error("offset {offset} out of range (document length {len})")]
    OffsetOutOfRange { offset: usize, len: usize },
    #[error("row {row} out of range (line count {line_count})")]
    RowOutOfRange { row: usize, line_count: usize },
}

#[derive(Clone)]
pub struct Document {
    rope: Rope,
    lines: LineIndex,
    line_ending: LineEnding,
}

impl Document {
    /// Build a document from loaded source text, normalizing line endings.
    pub fn new(content: &str) -> Self {
        let norm = normalize_line_endings(content);
        if norm.mixed {
            tracing::warn!(target: "text", original = ?norm.original, "mixed_line_endings");
        }
        Self {
            lines: LineIndex::scan(&norm.normalized),
            rope: Rope::from_str(&norm.normalized),
            line_ending: norm.original,
        }
    }

    /// Content with LF rewritten to the dominant line ending of the text this
    /// document was loaded from.
    pub fn export(&self) -> String {
        let text = self.to_string();
        match self.line_ending {
            LineEnding::Lf => text,
            other => text.replace('\n', other.as_str()),
        }
    }

    /// Total number of characters.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    pub fn line_count(&self) -> usize {
        self.lines.line_count()
    }

    /// Length of `row` in chars, excluding the terminator. Zero past the last row.
    pub fn line_len(&self, row: usize) -> usize {
        self.lines.line_len(row, self.len_chars()).unwrap_or(0)
    }

    /// Text of `row` with the terminator stripped.
    pub fn line_at(&self, row: usize) -> Result<String, TextError> {
        if row >= self.line_count() {
            return Err(self.row_error(row));
        }
        Ok(self.line_slice(row))
    }

    /// Offset of the first character of `row`: the sum of `line_len(i) + 1` for `i < row`.
    pub fn line_start_offset(&self, row: usize) -> Result<usize, TextError> {
        self.lines.start(row).ok_or_else(|| self.row_error(row))
    }

    /// Row containing `offset`; offsets at or past the end resolve to the last row.
    pub fn row_of_offset(&self, offset: usize) -> usize {
        self.lines.row_of(offset.min(self.len_chars()))
    }

    pub fn char_at(&self, offset: usize) -> Option<char> {
        (offset < self.len_chars()).then(|| self.rope.char(offset))
    }

    /// Insert `ch` before position `offset`.
    pub fn insert(&mut self, offset: usize, ch: char) -> Result<(), TextError> {
        let len = self.len_chars();
        if offset > len {
            return Err(TextError::OffsetOutOfRange { offset, len });
        }
        self.rope.insert_char(offset, ch);
        self.lines.inserted(offset, ch);
        trace!(target: "text", op = "insert", offset, newline = ch == '\n', lines = self.line_count(), "edit");
        self.debug_check_index();
        Ok(())
    }

    /// Backspace semantics: remove the character immediately before `offset`.
    ///
    /// Returns the removed character, or `None` when `offset == 0`.
    pub fn delete(&mut self, offset: usize) -> Result<Option<char>, TextError> {
        let len = self.len_chars();
        if offset > len {
            return Err(TextError::OffsetOutOfRange { offset, len });
        }
        if offset == 0 {
            return Ok(None);
        }
        let pos = offset - 1;
        let ch = self.rope.char(pos);
        self.rope.remove(pos..offset);
        self.lines.removed(pos, ch);
        trace!(target: "text", op = "delete", offset, newline = ch == '\n', lines = self.line_count(), "edit");
        self.debug_check_index();
        Ok(Some(ch))
    }

    /// Iterate lines without their terminators.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.line_count()).map(|row| self.line_slice(row))
    }

    // Sliced through the line index rather than `Rope::line`, which also
    // breaks on Unicode separators the editor treats as ordinary characters.
    fn line_slice(&self, row: usize) -> String {
        let start = self.lines.start(row).unwrap_or(0);
        let end = start + self.line_len(row);
        self.rope.slice(start..end).to_string()
    }

    fn row_error(&self, row: usize) -> TextError {
        TextError::RowOutOfRange {
            row,
            line_count: self.line_count(),
        }
    }

    fn debug_check_index(&self) {
        #[cfg(debug_assertions)]
        {
            let rescanned = LineIndex::scan(&self.to_string());
            debug_assert_eq!(self.lines, rescanned, "line index drifted from content");
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("")
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.rope.chunks() {
            f.write_str(chunk)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("len_chars", &self.len_chars())
            .field("line_count", &self.line_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_document_is_one_empty_line() {
        let d = Document::new("");
        assert_eq!(d.line_count(), 1);
        assert_eq!(d.line_len(0), 0);
        assert_eq!(d.line_at(0).unwrap(), "");
        assert_eq!(d.line_start_offset(0).unwrap(), 0);
    }

    #[test]
    fn trailing_newline_yields_trailing_empty_line() {
        let d = Document::new("a\n");
        assert_eq!(d.line_count(), 2);
        assert_eq!(d.line_at(1).unwrap(), "");
        assert_eq!(d.line_start_offset(1).unwrap(), 2);
    }

    #[test]
    fn insert_before_first_char() {
        let mut d = Document::new("a");
        d.insert(0, 'x').unwrap();
        assert_eq!(d.to_string(), "xa");
    }

    #[test]
    fn insert_past_end_is_out_of_range() {
        let mut d = Document::new("ab");
        assert_eq!(
            d.insert(3, 'x'),
            Err(TextError::OffsetOutOfRange { offset: 3, len: 2 })
        );
        assert_eq!(d.to_string(), "ab");
    }

    #[test]
    fn delete_removes_preceding_char() {
        let mut d = Document::new("abc");
        assert_eq!(d.delete(2).unwrap(), Some('b'));
        assert_eq!(d.to_string(), "ac");
    }

    #[test]
    fn delete_at_zero_is_noop() {
        let mut d = Document::new("abc");
        assert_eq!(d.delete(0).unwrap(), None);
        assert_eq!(d.to_string(), "abc");
    }

    #[test]
    fn delete_newline_joins_lines() {
        let mut d = Document::new("ab\ncd");
        assert_eq!(d.delete(3).unwrap(), Some('\n'));
        assert_eq!(d.line_count(), 1);
        assert_eq!(d.line_at(0).unwrap(), "abcd");
    }

    #[test]
    fn line_at_past_end_fails() {
        let d = Document::new("a\nb");
        assert_eq!(
            d.line_at(2),
            Err(TextError::RowOutOfRange {
                row: 2,
                line_count: 2
            })
        );
    }

    #[test]
    fn line_starts_follow_edits() {
        let mut d = Document::new("one\ntwo\nthree");
        assert_eq!(d.line_start_offset(2).unwrap(), 8);
        d.insert(1, '\n').unwrap();
        assert_eq!(d.line_count(), 4);
        assert_eq!(d.line_start_offset(1).unwrap(), 2);
        assert_eq!(d.line_start_offset(3).unwrap(), 9);
        d.insert(0, 'z').unwrap();
        assert_eq!(d.line_start_offset(3).unwrap(), 10);
    }

    #[test]
    fn crlf_source_is_normalized() {
        let d = Document::new("a\r\nb");
        assert_eq!(d.to_string(), "a\nb");
        assert_eq!(d.lines().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn export_restores_dominant_line_ending() {
        let mut d = Document::new("a\r\nb\r\nc\rd");
        assert_eq!(d.line_count(), 4);
        d.insert(1, '\n').unwrap();
        assert_eq!(d.to_string(), "a\n\nb\nc\nd");
        assert_eq!(d.export(), "a\r\n\r\nb\r\nc\r\nd");
        assert_eq!(Document::new("x\ry").export(), "x\ry");
        assert_eq!(Document::new("x\ny").export(), "x\ny");
    }

    #[test]
    fn multibyte_chars_count_once() {
        let mut d = Document::new("é\nü");
        assert_eq!(d.line_len(0), 1);
        assert_eq!(d.line_start_offset(1).unwrap(), 2);
        d.insert(1, 'ß').unwrap();
        assert_eq!(d.line_at(0).unwrap(), "éß");
        assert_eq!(d.row_of_offset(4), 1);
    }
}
