//! Coordinate conversion between pixels, grid cells and buffer offsets.
//!
//! All column math that knows about the gutter lives here. A `GridAddressor`
//! is a borrowed view over the document: construct one after each mutation so
//! the gutter width and line lengths it sees are current.

use crate::{GlyphMetrics, GridCell, GutterLayout, PixelPoint};
use core_text::{Document, TextError};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error(transparent)]
    Text(#[from] TextError),
    #[error("column {col} lies inside the gutter (text starts at {gutter})")]
    GutterColumn { col: usize, gutter: usize },
    #[error("column {col} past end of row {row} (max {max})")]
    PastLineEnd { row: usize, col: usize, max: usize },
}

#[derive(Debug, Clone, Copy)]
pub struct GridAddressor<'a> {
    metrics: GlyphMetrics,
    gutter: GutterLayout,
    doc: &'a Document,
}

impl<'a> GridAddressor<'a> {
    pub fn new(metrics: GlyphMetrics, doc: &'a Document) -> Self {
        Self {
            metrics,
            gutter: GutterLayout::for_document(doc),
            doc,
        }
    }

    pub fn metrics(&self) -> GlyphMetrics {
        self.metrics
    }

    pub fn gutter(&self) -> GutterLayout {
        self.gutter
    }

    pub fn line_count(&self) -> usize {
        self.doc.line_count()
    }

    /// Inclusive column bounds of editable cells on `row`.
    pub fn text_cols(&self, row: usize) -> (usize, usize) {
        let first = self.gutter.width();
        (first, first + self.doc.line_len(row))
    }

    /// Clamp `cell` into the editable grid: row into `[0, line_count - 1]`,
    /// column into the text span of that row.
    pub fn clamp(&self, cell: GridCell) -> GridCell {
        let row = cell.row.min(self.line_count() - 1);
        let (min, max) = self.text_cols(row);
        GridCell::new(row, cell.col.clamp(min, max))
    }

    /// Pixel to cell. Columns round half away from zero (the caret sits on the
    /// nearest glyph boundary); rows floor. The result is always clamped, so
    /// any input, including negative, infinite or NaN coordinates, yields an
    /// addressable cell.
    pub fn pixel_to_cell(&self, x: f32, y: f32) -> GridCell {
        // Float-to-int `as` saturates: NaN and negatives become 0.
        let col = (x / self.metrics.width()).round() as usize;
        let row = (y / self.metrics.height()).floor() as usize;
        let cell = self.clamp(GridCell::new(row, col));
        trace!(target: "grid", x, y, row = cell.row, col = cell.col, "pixel_to_cell");
        cell
    }

    pub fn cell_to_pixel(&self, cell: GridCell) -> PixelPoint {
        cell.origin(self.metrics)
    }

    /// Buffer offset addressed by a text cell.
    pub fn cell_to_offset(&self, cell: GridCell) -> Result<usize, GridError> {
        let start = self.doc.line_start_offset(cell.row)?;
        let (min, max) = self.text_cols(cell.row);
        if cell.col < min {
            return Err(GridError::GutterColumn {
                col: cell.col,
                gutter: min,
            });
        }
        if cell.col > max {
            return Err(GridError::PastLineEnd {
                row: cell.row,
                col: cell.col,
                max,
            });
        }
        Ok(start + (cell.col - min))
    }

    /// Cell addressing buffer `offset`; offsets past the end clamp to the end.
    pub fn offset_to_cell(&self, offset: usize) -> GridCell {
        let offset = offset.min(self.doc.len_chars());
        let row = self.doc.row_of_offset(offset);
        let start = self.doc.line_start_offset(row).unwrap_or(0);
        GridCell::new(row, self.gutter.width() + (offset - start))
    }
}
