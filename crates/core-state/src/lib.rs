//! Cursor and selection state machine.
//!
//! `CursorController` owns the single caret and the pointer selection. It
//! interprets pointer and key events, addresses the grid through
//! `GridAddressor`, and applies edits to the `Document` it is handed. It does
//! not own the document; the engine passes it in for each event so all editor
//! state stays explicit and owned by one place.
//!
//! States: `Idle` and `Selecting`. Pointer-down enters `Selecting`, pointer-up
//! returns to `Idle`. Keys are only interpreted while `Idle`, drags only while
//! `Selecting`; anything else is ignored.
//!
//! Column navigation is grid based, not character based: moving left at the
//! first text column holds at that column instead of wrapping to the previous
//! line, and moving vertically clamps the column into the target row.
//!
//! After an edit the cursor is re-derived from the buffer offset it should
//! land on. This keeps it on the right character when the edit changes the
//! gutter width (line count crossing a power of ten) and when a backspace at
//! the first text column joins the line onto the previous one.

use core_events::{KeyEvent, NamedKey, PointerEvent, PointerPhase};
use core_model::{GlyphMetrics, GridAddressor, GridCell, GridError, GutterLayout};
use core_text::{Document, TextError};
use tracing::trace;

mod selection;
pub use selection::Selection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerState {
    #[default]
    Idle,
    Selecting,
}

/// Failure while applying an edit. Only reachable if the cursor invariant
/// (always an addressable text cell) was broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CursorError {
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Text(#[from] TextError),
}

/// What a handled event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// The document changed; the engine must re-highlight.
    pub mutated: bool,
    /// The event was not valid in the current state and had no effect.
    pub ignored: bool,
}

impl Transition {
    pub fn moved() -> Self {
        Self {
            mutated: false,
            ignored: false,
        }
    }
    pub fn mutated() -> Self {
        Self {
            mutated: true,
            ignored: false,
        }
    }
    pub fn ignored() -> Self {
        Self {
            mutated: false,
            ignored: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CursorController {
    state: ControllerState,
    cursor: GridCell,
    selection: Selection,
}

impl CursorController {
    /// Controller in `Idle` with the caret on the first text cell.
    pub fn new(doc: &Document) -> Self {
        let origin = GridCell::new(0, GutterLayout::for_document(doc).width());
        Self {
            state: ControllerState::Idle,
            cursor: origin,
            selection: Selection::collapsed(origin),
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn cursor(&self) -> GridCell {
        self.cursor
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn handle_pointer(&mut self, event: PointerEvent, grid: &GridAddressor<'_>) -> Transition {
        match event.phase {
            PointerPhase::Down => self.pointer_down(event.x, event.y, grid),
            PointerPhase::Drag => self.pointer_drag(event.x, event.y, grid),
            PointerPhase::Up => self.pointer_up(),
        }
    }

    pub fn pointer_down(&mut self, x: f32, y: f32, grid: &GridAddressor<'_>) -> Transition {
        let cell = grid.pixel_to_cell(x, y);
        self.cursor = cell;
        self.selection = Selection::collapsed(cell);
        self.state = ControllerState::Selecting;
        trace!(target: "cursor", op = "pointer_down", x, y, row = cell.row, col = cell.col, "transition");
        Transition::moved()
    }

    pub fn pointer_drag(&mut self, x: f32, y: f32, grid: &GridAddressor<'_>) -> Transition {
        if self.state != ControllerState::Selecting {
            trace!(target: "cursor", op = "pointer_drag", state = ?self.state, "ignored");
            return Transition::ignored();
        }
        let cell = grid.pixel_to_cell(x, y);
        self.selection.active = cell;
        self.cursor = cell;
        trace!(target: "cursor", op = "pointer_drag", x, y, row = cell.row, col = cell.col, "transition");
        Transition::moved()
    }

    pub fn pointer_up(&mut self) -> Transition {
        if self.state != ControllerState::Selecting {
            return Transition::ignored();
        }
        self.state = ControllerState::Idle;
        trace!(target: "cursor", op = "pointer_up", selection = !self.selection.is_empty(), "transition");
        Transition::moved()
    }

    /// Interpret a key press, editing `doc` when the key inserts or deletes.
    pub fn handle_key(
        &mut self,
        key: KeyEvent,
        doc: &mut Document,
        metrics: GlyphMetrics,
    ) -> Result<Transition, CursorError> {
        if self.state != ControllerState::Idle {
            trace!(target: "cursor", op = "key", %key, state = ?self.state, "ignored");
            return Ok(Transition::ignored());
        }
        let Some(key) = key.normalized() else {
            trace!(target: "cursor", op = "key", %key, "ignored_control");
            return Ok(Transition::ignored());
        };
        let transition = match key {
            KeyEvent::Char(ch) => self.insert(ch, doc, metrics)?,
            KeyEvent::Named(NamedKey::Enter) => self.insert('\n', doc, metrics)?,
            KeyEvent::Named(NamedKey::Backspace) => self.backspace(doc, metrics)?,
            KeyEvent::Named(arrow) => {
                self.step(arrow, &GridAddressor::new(metrics, doc));
                Transition::moved()
            }
        };
        self.selection = Selection::collapsed(self.cursor);
        Ok(transition)
    }

    fn insert(
        &mut self,
        ch: char,
        doc: &mut Document,
        metrics: GlyphMetrics,
    ) -> Result<Transition, CursorError> {
        let offset = GridAddressor::new(metrics, doc).cell_to_offset(self.cursor)?;
        doc.insert(offset, ch)?;
        let before = self.cursor;
        self.cursor = GridAddressor::new(metrics, doc).offset_to_cell(offset + 1);
        trace!(target: "cursor", op = "insert", offset, newline = ch == '\n', from_row = before.row, from_col = before.col, to_row = self.cursor.row, to_col = self.cursor.col, "edit");
        Ok(Transition::mutated())
    }

    fn backspace(
        &mut self,
        doc: &mut Document,
        metrics: GlyphMetrics,
    ) -> Result<Transition, CursorError> {
        let offset = GridAddressor::new(metrics, doc).cell_to_offset(self.cursor)?;
        if doc.delete(offset)?.is_none() {
            trace!(target: "cursor", op = "backspace", "at_document_start");
            return Ok(Transition::moved());
        }
        let before = self.cursor;
        self.cursor = GridAddressor::new(metrics, doc).offset_to_cell(offset - 1);
        trace!(target: "cursor", op = "backspace", offset, from_row = before.row, from_col = before.col, to_row = self.cursor.row, to_col = self.cursor.col, "edit");
        Ok(Transition::mutated())
    }

    fn step(&mut self, key: NamedKey, grid: &GridAddressor<'_>) {
        let GridCell { row, col } = self.cursor;
        let target = match key {
            NamedKey::ArrowUp => GridCell::new(row.saturating_sub(1), col),
            NamedKey::ArrowDown => GridCell::new(row + 1, col),
            NamedKey::ArrowLeft => GridCell::new(row, col.saturating_sub(1)),
            NamedKey::ArrowRight => GridCell::new(row, col + 1),
            NamedKey::Enter | NamedKey::Backspace => self.cursor,
        };
        self.cursor = grid.clamp(target);
        trace!(target: "cursor", op = "motion", %key, row = self.cursor.row, col = self.cursor.col, "transition");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn metrics() -> GlyphMetrics {
        GlyphMetrics::new(10.0, 20.0).unwrap()
    }

    fn key(c: &mut CursorController, doc: &mut Document, k: KeyEvent) -> Transition {
        c.handle_key(k, doc, metrics()).unwrap()
    }

    fn named(k: NamedKey) -> KeyEvent {
        KeyEvent::Named(k)
    }

    #[test]
    fn starts_idle_at_first_text_cell() {
        let doc = Document::new("abc");
        let c = CursorController::new(&doc);
        assert_eq!(c.state(), ControllerState::Idle);
        assert_eq!(c.cursor(), GridCell::new(0, 2));
        assert!(c.selection().is_empty());
    }

    #[test]
    fn typing_advances_cursor() {
        let mut doc = Document::new("a");
        let mut c = CursorController::new(&doc);
        assert!(key(&mut c, &mut doc, KeyEvent::Char('x')).mutated);
        assert_eq!(doc.to_string(), "xa");
        assert_eq!(c.cursor(), GridCell::new(0, 3));
    }

    #[test]
    fn enter_moves_to_next_row_first_column() {
        let mut doc = Document::new("ab");
        let mut c = CursorController::new(&doc);
        key(&mut c, &mut doc, named(NamedKey::ArrowRight));
        key(&mut c, &mut doc, KeyEvent::Char('\r'));
        assert_eq!(doc.to_string(), "a\nb");
        assert_eq!(c.cursor(), GridCell::new(1, 2));
    }

    #[test]
    fn backspace_at_document_start_is_noop() {
        let mut doc = Document::new("abc");
        let mut c = CursorController::new(&doc);
        let t = key(&mut c, &mut doc, named(NamedKey::Backspace));
        assert!(!t.mutated);
        assert_eq!(doc.to_string(), "abc");
        assert_eq!(c.cursor(), GridCell::new(0, 2));
    }

    #[test]
    fn backspace_removes_previous_char() {
        let mut doc = Document::new("abc");
        let mut c = CursorController::new(&doc);
        key(&mut c, &mut doc, named(NamedKey::ArrowRight));
        key(&mut c, &mut doc, named(NamedKey::ArrowRight));
        key(&mut c, &mut doc, named(NamedKey::Backspace));
        assert_eq!(doc.to_string(), "ac");
        assert_eq!(c.cursor(), GridCell::new(0, 3));
    }

    #[test]
    fn backspace_at_line_start_joins_previous_line() {
        let mut doc = Document::new("ab\ncd");
        let mut c = CursorController::new(&doc);
        key(&mut c, &mut doc, named(NamedKey::ArrowDown));
        key(&mut c, &mut doc, named(NamedKey::Backspace));
        assert_eq!(doc.to_string(), "abcd");
        assert_eq!(c.cursor(), GridCell::new(0, 4));
    }

    #[test]
    fn left_holds_at_first_text_column() {
        let mut doc = Document::new("ab\ncd");
        let mut c = CursorController::new(&doc);
        key(&mut c, &mut doc, named(NamedKey::ArrowDown));
        key(&mut c, &mut doc, named(NamedKey::ArrowLeft));
        assert_eq!(c.cursor(), GridCell::new(1, 2));
    }

    #[test]
    fn vertical_motion_clamps_column_and_row() {
        let mut doc = Document::new("abcdef\nx");
        let mut c = CursorController::new(&doc);
        for _ in 0..5 {
            key(&mut c, &mut doc, named(NamedKey::ArrowRight));
        }
        assert_eq!(c.cursor(), GridCell::new(0, 7));
        key(&mut c, &mut doc, named(NamedKey::ArrowDown));
        assert_eq!(c.cursor(), GridCell::new(1, 3));
        key(&mut c, &mut doc, named(NamedKey::ArrowDown));
        assert_eq!(c.cursor(), GridCell::new(1, 3));
        key(&mut c, &mut doc, named(NamedKey::ArrowUp));
        key(&mut c, &mut doc, named(NamedKey::ArrowUp));
        assert_eq!(c.cursor(), GridCell::new(0, 3));
    }

    #[test]
    fn right_holds_at_line_end() {
        let mut doc = Document::new("ab");
        let mut c = CursorController::new(&doc);
        for _ in 0..5 {
            key(&mut c, &mut doc, named(NamedKey::ArrowRight));
        }
        assert_eq!(c.cursor(), GridCell::new(0, 4));
    }

    #[test]
    fn drag_extends_selection_and_up_keeps_it() {
        let doc = Document::new("hello world");
        let mut c = CursorController::new(&doc);
        let g = GridAddressor::new(metrics(), &doc);
        c.handle_pointer(PointerEvent::down(20.0, 5.0), &g);
        assert_eq!(c.state(), ControllerState::Selecting);
        c.handle_pointer(PointerEvent::drag(70.0, 5.0), &g);
        c.handle_pointer(PointerEvent::up(70.0, 5.0), &g);
        assert_eq!(c.state(), ControllerState::Idle);
        let s = c.selection();
        assert_eq!(s.anchor, GridCell::new(0, 2));
        assert_eq!(s.active, GridCell::new(0, 7));
        assert_eq!(c.cursor(), GridCell::new(0, 7));
    }

    #[test]
    fn click_without_drag_leaves_empty_selection() {
        let doc = Document::new("hello");
        let mut c = CursorController::new(&doc);
        let g = GridAddressor::new(metrics(), &doc);
        c.handle_pointer(PointerEvent::down(40.0, 0.0), &g);
        c.handle_pointer(PointerEvent::up(40.0, 0.0), &g);
        assert!(c.selection().is_empty());
        assert_eq!(c.cursor(), GridCell::new(0, 4));
    }

    #[test]
    fn drag_back_to_anchor_releases_as_empty_selection() {
        let doc = Document::new("hello");
        let mut c = CursorController::new(&doc);
        let g = GridAddressor::new(metrics(), &doc);
        c.handle_pointer(PointerEvent::down(30.0, 0.0), &g);
        c.handle_pointer(PointerEvent::drag(60.0, 0.0), &g);
        c.handle_pointer(PointerEvent::drag(30.0, 0.0), &g);
        c.handle_pointer(PointerEvent::up(30.0, 0.0), &g);
        assert_eq!(c.state(), ControllerState::Idle);
        assert_eq!(c.selection(), Selection::collapsed(GridCell::new(0, 3)));
        assert_eq!(c.cursor(), GridCell::new(0, 3));
    }

    #[test]
    fn drag_while_idle_is_ignored() {
        let doc = Document::new("hello");
        let mut c = CursorController::new(&doc);
        let g = GridAddressor::new(metrics(), &doc);
        assert!(c.handle_pointer(PointerEvent::drag(40.0, 0.0), &g).ignored);
        assert_eq!(c.cursor(), GridCell::new(0, 2));
    }

    #[test]
    fn keys_while_selecting_are_ignored() {
        let mut doc = Document::new("hello");
        let mut c = CursorController::new(&doc);
        {
            let g = GridAddressor::new(metrics(), &doc);
            c.handle_pointer(PointerEvent::down(40.0, 0.0), &g);
        }
        assert!(key(&mut c, &mut doc, KeyEvent::Char('x')).ignored);
        assert_eq!(doc.to_string(), "hello");
    }

    #[test]
    fn key_collapses_selection() {
        let mut doc = Document::new("hello");
        let mut c = CursorController::new(&doc);
        {
            let g = GridAddressor::new(metrics(), &doc);
            c.handle_pointer(PointerEvent::down(20.0, 0.0), &g);
            c.handle_pointer(PointerEvent::drag(50.0, 0.0), &g);
            c.handle_pointer(PointerEvent::up(50.0, 0.0), &g);
        }
        assert!(!c.selection().is_empty());
        key(&mut c, &mut doc, named(NamedKey::ArrowLeft));
        assert!(c.selection().is_empty());
        assert_eq!(c.selection().anchor, c.cursor());
    }

    #[test]
    fn enter_on_ninth_line_rebases_for_wider_gutter() {
        let mut doc = Document::new(&["l"; 9].join("\n"));
        let mut c = CursorController::new(&doc);
        for _ in 0..8 {
            key(&mut c, &mut doc, named(NamedKey::ArrowDown));
        }
        key(&mut c, &mut doc, named(NamedKey::ArrowRight));
        assert_eq!(c.cursor(), GridCell::new(8, 3));
        key(&mut c, &mut doc, named(NamedKey::Enter));
        assert_eq!(doc.line_count(), 10);
        assert_eq!(c.cursor(), GridCell::new(9, 3));
        key(&mut c, &mut doc, KeyEvent::Char('z'));
        assert_eq!(doc.line_at(9).unwrap(), "z");
        assert_eq!(c.cursor(), GridCell::new(9, 4));
    }

    #[test]
    fn backspace_shrinking_gutter_keeps_cursor_on_char() {
        let mut doc = Document::new(&["ab"; 10].join("\n"));
        let mut c = CursorController::new(&doc);
        assert_eq!(c.cursor(), GridCell::new(0, 3));
        for _ in 0..9 {
            key(&mut c, &mut doc, named(NamedKey::ArrowDown));
        }
        key(&mut c, &mut doc, named(NamedKey::Backspace));
        assert_eq!(doc.line_count(), 9);
        assert_eq!(doc.line_at(8).unwrap(), "abab");
        assert_eq!(c.cursor(), GridCell::new(8, 4));
    }
}
