//! Grid model for the fixed-width editor surface.
//!
//! The editor paints onto a character grid where every glyph, gutter digits
//! and separator included, occupies exactly one `GlyphMetrics`-sized cell.
//! This crate owns the value types of that grid and the single place where
//! pixel, cell and buffer-offset coordinates are converted (`GridAddressor`).
//!
//! Invariants:
//! * `GlyphMetrics` width and height are finite and strictly positive.
//! * A `GridCell` produced by `GridAddressor::pixel_to_cell` or
//!   `GridAddressor::clamp` always satisfies `row < line_count` and
//!   `gutter.width() <= col <= gutter.width() + line_len(row)`.

mod addressor;
mod gutter;

pub use addressor::{GridAddressor, GridError};
pub use gutter::{GutterLayout, render_text};

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("glyph metrics must be finite and positive (got {width}x{height})")]
pub struct InvalidGlyphMetrics {
    pub width: f32,
    pub height: f32,
}

/// Pixel size of one monospace glyph cell, supplied by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphMetrics {
    width: f32,
    height: f32,
}

impl GlyphMetrics {
    pub fn new(width: f32, height: f32) -> Result<Self, InvalidGlyphMetrics> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if valid(width) && valid(height) {
            Ok(Self { width, height })
        } else {
            Err(InvalidGlyphMetrics { width, height })
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }
}

impl Default for GlyphMetrics {
    fn default() -> Self {
        Self {
            width: 8.0,
            height: 16.0,
        }
    }
}

/// A `{row, col}` address in the rendered character grid. Columns count the
/// gutter, so `col < gutter.width()` names a gutter cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
}

impl GridCell {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Top-left pixel of this cell.
    pub fn origin(&self, metrics: GlyphMetrics) -> PixelPoint {
        PixelPoint::new(
            self.col as f32 * metrics.width(),
            self.row as f32 * metrics.height(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelPoint {
    pub x: f32,
    pub y: f32,
}

impl PixelPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl PixelRect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_degenerate_metrics() {
        assert!(GlyphMetrics::new(0.0, 16.0).is_err());
        assert!(GlyphMetrics::new(8.0, -1.0).is_err());
        assert!(GlyphMetrics::new(f32::NAN, 16.0).is_err());
        assert!(GlyphMetrics::new(f32::INFINITY, 16.0).is_err());
        assert!(GlyphMetrics::new(7.5, 15.0).is_ok());
    }

    #[test]
    fn cell_origin_scales_by_metrics() {
        let m = GlyphMetrics::new(7.5, 15.0).unwrap();
        assert_eq!(GridCell::new(2, 4).origin(m), PixelPoint::new(30.0, 30.0));
    }
}
