//! Editor composition root.
//!
//! `EditorEngine` owns the `Document`, the `CursorController`, the compiled
//! `Highlighter` and the last highlight result. Every host event is handled
//! to completion on the caller's thread: the controller interprets it, the
//! document is edited if the event inserts or deletes, and a mutation
//! triggers a full re-highlight of the rendered text plus a notification to
//! every registered `TextObserver`. Nothing runs in the background.
//!
//! Highlighting is total, not incremental. Events that leave the document
//! untouched reuse the previous spans, which equal what a fresh pass would
//! return because `Highlighter::highlight` is pure.

mod render;

pub use render::RenderModel;

use core_config::Config;
use core_events::{EditorEvent, KeyEvent, PointerEvent};
use core_model::{
    GlyphMetrics, GridAddressor, GridCell, GridError, GutterLayout, InvalidGlyphMetrics, PixelRect,
    render_text,
};
use core_state::{ControllerState, CursorController, CursorError, Selection, Transition};
use core_syntax::{HighlightSpan, Highlighter};
use core_text::{Document, TextError};
use tracing::{debug, error, info, trace, warn};

/// Receives the full document text after every mutation.
pub trait TextObserver {
    fn on_text_changed(&self, text: &str);
}

/// An edit reached an out-of-range offset. Clamping is supposed to make this
/// unreachable, so callers treat it as a fatal internal fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("text invariant violated: {0}")]
    Text(#[from] TextError),
    #[error("grid invariant violated: {0}")]
    Grid(#[from] GridError),
}

impl From<CursorError> for EngineError {
    fn from(e: CursorError) -> Self {
        match e {
            CursorError::Grid(g) => EngineError::Grid(g),
            CursorError::Text(t) => EngineError::Text(t),
        }
    }
}

pub struct EditorEngine {
    doc: Document,
    metrics: GlyphMetrics,
    controller: CursorController,
    highlighter: Highlighter,
    rendered: String,
    spans: Vec<HighlightSpan>,
    observers: Vec<Box<dyn TextObserver>>,
}

impl EditorEngine {
    /// Mount an editor over `text` and run the initial highlight pass.
    pub fn new(text: &str, metrics: GlyphMetrics, highlighter: Highlighter) -> Self {
        let doc = Document::new(text);
        let controller = CursorController::new(&doc);
        let mut engine = Self {
            doc,
            metrics,
            controller,
            highlighter,
            rendered: String::new(),
            spans: Vec::new(),
            observers: Vec::new(),
        };
        engine.rehighlight();
        info!(
            target: "engine",
            lines = engine.doc.line_count(),
            chars = engine.doc.len_chars(),
            rules = engine.highlighter.table().len(),
            "mounted"
        );
        engine
    }

    /// Mount with glyph metrics and highlight rules taken from `config`.
    pub fn from_config(text: &str, config: &Config) -> Self {
        Self::new(
            text,
            config.glyph_metrics(),
            Highlighter::new(config.rule_table()),
        )
    }

    pub fn add_observer(&mut self, observer: Box<dyn TextObserver>) {
        self.observers.push(observer);
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Current full document text (without gutter).
    pub fn text(&self) -> String {
        self.doc.to_string()
    }

    /// Gutter-prefixed text the spans index into.
    pub fn rendered_text(&self) -> &str {
        &self.rendered
    }

    pub fn spans(&self) -> &[HighlightSpan] {
        &self.spans
    }

    pub fn metrics(&self) -> GlyphMetrics {
        self.metrics
    }

    pub fn state(&self) -> ControllerState {
        self.controller.state()
    }

    pub fn cursor(&self) -> GridCell {
        self.controller.cursor()
    }

    pub fn selection(&self) -> Selection {
        self.controller.selection()
    }

    pub fn handle_event(&mut self, event: EditorEvent) -> Result<Transition, EngineError> {
        match event {
            EditorEvent::Pointer(p) => Ok(self.handle_pointer(p)),
            EditorEvent::Key(k) => self.handle_key(k),
            EditorEvent::GlyphMetrics { width, height } => {
                match self.set_glyph_metrics(width, height) {
                    Ok(()) => Ok(Transition::moved()),
                    Err(_) => Ok(Transition::ignored()),
                }
            }
        }
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) -> Transition {
        let grid = GridAddressor::new(self.metrics, &self.doc);
        self.controller.handle_pointer(event, &grid)
    }

    pub fn handle_pointer_down(&mut self, x: f32, y: f32) -> Transition {
        self.handle_pointer(PointerEvent::down(x, y))
    }

    pub fn handle_pointer_drag(&mut self, x: f32, y: f32) -> Transition {
        self.handle_pointer(PointerEvent::drag(x, y))
    }

    pub fn handle_pointer_up(&mut self, x: f32, y: f32) -> Transition {
        self.handle_pointer(PointerEvent::up(x, y))
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<Transition, EngineError> {
        let gutter_before = GutterLayout::for_document(&self.doc);
        let transition = match self.controller.handle_key(key, &mut self.doc, self.metrics) {
            Ok(t) => t,
            Err(e) => {
                error!(target: "engine", %key, error = %e, "edit_invariant_violation");
                return Err(e.into());
            }
        };
        if transition.mutated {
            let gutter_after = GutterLayout::for_document(&self.doc);
            if gutter_after != gutter_before {
                debug!(
                    target: "engine",
                    from = gutter_before.width(),
                    to = gutter_after.width(),
                    "gutter_width_changed"
                );
            }
            self.after_mutation();
        }
        Ok(transition)
    }

    /// Adopt new host glyph metrics. Cells are metric independent, so the
    /// cursor and selection stay put and only their pixel geometry changes.
    pub fn set_glyph_metrics(&mut self, width: f32, height: f32) -> Result<(), InvalidGlyphMetrics> {
        let metrics = match GlyphMetrics::new(width, height) {
            Ok(m) => m,
            Err(e) => {
                warn!(target: "engine", error = %e, "glyph_metrics_ignored");
                return Err(e);
            }
        };
        if metrics != self.metrics {
            debug!(
                target: "engine",
                width = metrics.width(),
                height = metrics.height(),
                "glyph_metrics_changed"
            );
            self.metrics = metrics;
        }
        Ok(())
    }

    /// Replace the whole document. Resets the caret to the first text cell
    /// with an empty selection.
    pub fn load(&mut self, text: &str) {
        self.doc = Document::new(text);
        self.controller = CursorController::new(&self.doc);
        info!(target: "engine", lines = self.doc.line_count(), chars = self.doc.len_chars(), "document_loaded");
        self.after_mutation();
    }

    pub fn render_model(&self) -> RenderModel {
        let origin = self.controller.cursor().origin(self.metrics);
        RenderModel {
            text: self.rendered.clone(),
            spans: self.spans.clone(),
            cursor_rect: PixelRect::new(
                origin.x,
                origin.y,
                self.metrics.width() / 4.0,
                self.metrics.height(),
            ),
            selection_rect: self.controller.selection().rect(self.metrics),
        }
    }

    fn after_mutation(&mut self) {
        self.rehighlight();
        if self.observers.is_empty() {
            return;
        }
        let text = self.doc.to_string();
        for obs in &self.observers {
            obs.on_text_changed(&text);
        }
        trace!(target: "engine", observers = self.observers.len(), chars = self.doc.len_chars(), "text_observers_notified");
    }

    fn rehighlight(&mut self) {
        self.rendered = render_text(&self.doc, GutterLayout::for_document(&self.doc));
        self.spans = self.highlighter.highlight(&self.rendered);
        trace!(target: "engine", bytes = self.rendered.len(), spans = self.spans.len(), "rehighlighted");
    }
}
