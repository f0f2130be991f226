//! Paint-ready snapshot handed to the host view.

use core_model::PixelRect;
use core_syntax::{HighlightSpan, StyleTag};

/// Everything the host needs to draw one frame: the gutter-prefixed text, its
/// style runs, the caret box and the optional selection box.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderModel {
    pub text: String,
    pub spans: Vec<HighlightSpan>,
    /// Thin caret: a quarter glyph wide, one glyph tall.
    pub cursor_rect: PixelRect,
    pub selection_rect: Option<PixelRect>,
}

impl RenderModel {
    /// `(slice, tag)` pairs in paint order.
    pub fn styled_runs(&self) -> impl Iterator<Item = (&str, StyleTag)> + '_ {
        self.spans
            .iter()
            .filter_map(|s| self.text.get(s.range.clone()).map(|slice| (slice, s.tag)))
    }
}
