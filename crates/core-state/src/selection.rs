use core_model::{GlyphMetrics, GridCell, PixelRect};

/// Pointer selection between two cells. Empty when `anchor == active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub anchor: GridCell,
    pub active: GridCell,
}

impl Selection {
    /// Empty selection collapsed onto `cell`.
    pub fn collapsed(cell: GridCell) -> Self {
        Self {
            anchor: cell,
            active: cell,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.active
    }

    /// Single-row highlight box on the anchor's row, from the anchor's x to
    /// the active cell's x. Multi-row selections still paint one row.
    pub fn rect(&self, metrics: GlyphMetrics) -> Option<PixelRect> {
        if self.is_empty() {
            return None;
        }
        let a = self.anchor.origin(metrics);
        let b = self.active.origin(metrics);
        Some(PixelRect::new(
            a.x.min(b.x),
            a.y,
            (b.x - a.x).abs(),
            metrics.height(),
        ))
    }
}
