//! Line-number gutter geometry.
//!
//! Every rendered row is `pad(line_number, digits) + " " + line_text`, so the
//! gutter reserves `digits + 1` leading columns and text starts at column
//! `width()`. The digit count follows the document's line count and therefore
//! changes whenever the count crosses a power of ten.

use core_text::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GutterLayout {
    digits: usize,
}

impl GutterLayout {
    pub fn for_line_count(line_count: usize) -> Self {
        Self {
            digits: line_count.max(1).ilog10() as usize + 1,
        }
    }

    pub fn for_document(doc: &Document) -> Self {
        Self::for_line_count(doc.line_count())
    }

    /// Columns occupied by the right-aligned line number.
    pub fn digits(&self) -> usize {
        self.digits
    }

    /// Digit columns plus the separator: the first text column of every row.
    pub fn width(&self) -> usize {
        self.digits + 1
    }

    /// Rendered prefix for zero-based `row`.
    pub fn prefix(&self, row: usize) -> String {
        format!("{:>width$} ", row + 1, width = self.digits)
    }
}

/// Render `doc` with gutter prefixes applied, lines joined by `'\n'`.
pub fn render_text(doc: &Document, gutter: GutterLayout) -> String {
    let mut out = String::with_capacity(doc.len_chars() + doc.line_count() * (gutter.width() + 1));
    for (row, line) in doc.lines().enumerate() {
        if row > 0 {
            out.push('\n');
        }
        out.push_str(&gutter.prefix(row));
        out.push_str(&line);
    }
    out
}
