//! Incrementally maintained table of line-start offsets.
//!
//! Offsets are char indices into the document. Entry `i` is the offset of the
//! first character of line `i`; entry 0 is always 0 and the table is never
//! empty (an empty document is one empty line).

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    /// Build the table by scanning `text` once.
    pub(crate) fn scan(text: &str) -> Self {
        let mut starts = vec![0];
        for (i, c) in text.chars().enumerate() {
            if c == '\n' {
                starts.push(i + 1);
            }
        }
        Self { starts }
    }

    pub(crate) fn line_count(&self) -> usize {
        self.starts.len()
    }

    pub(crate) fn start(&self, row: usize) -> Option<usize> {
        self.starts.get(row).copied()
    }

    /// Row containing `offset`. Offsets past the end resolve to the last row.
    pub(crate) fn row_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&s| s <= offset) - 1
    }

    /// Length of `row` excluding its terminator, given total document length.
    pub(crate) fn line_len(&self, row: usize, doc_len: usize) -> Option<usize> {
        let start = self.start(row)?;
        let end = match self.start(row + 1) {
            Some(next) => next - 1,
            None => doc_len,
        };
        Some(end - start)
    }

    /// Account for `ch` inserted before `offset`.
    pub(crate) fn inserted(&mut self, offset: usize, ch: char) {
        let row = self.row_of(offset);
        for s in &mut self.starts[row + 1..] {
            *s += 1;
        }
        if ch == '\n' {
            self.starts.insert(row + 1, offset + 1);
        }
    }

    /// Account for `ch` removed from position `pos`.
    pub(crate) fn removed(&mut self, pos: usize, ch: char) {
        let row = self.row_of(pos);
        if ch == '\n' {
            debug_assert_eq!(self.starts.get(row + 1), Some(&(pos + 1)));
            self.starts.remove(row + 1);
        }
        for s in &mut self.starts[row + 1..] {
            *s -= 1;
        }
    }
}
