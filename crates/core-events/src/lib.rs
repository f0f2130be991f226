//! Input events delivered by the host view to the editor engine.
//!
//! Coordinates are in the editor's local pixel space. Events are handled one
//! at a time to completion; nothing here is queued or timestamped.

use std::fmt;
use std::str::FromStr;

/// Top-level event enum consumed by `EditorEngine::handle_event`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditorEvent {
    Pointer(PointerEvent),
    Key(KeyEvent),
    /// Host font changed; carries the new glyph cell size in pixels.
    GlyphMetrics { width: f32, height: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerPhase {
    Down,
    Drag,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub x: f32,
    pub y: f32,
}

impl PointerEvent {
    pub fn down(x: f32, y: f32) -> Self {
        Self {
            phase: PointerPhase::Down,
            x,
            y,
        }
    }
    pub fn drag(x: f32, y: f32) -> Self {
        Self {
            phase: PointerPhase::Drag,
            x,
            y,
        }
    }
    pub fn up(x: f32, y: f32) -> Self {
        Self {
            phase: PointerPhase::Up,
            x,
            y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Backspace,
    Enter,
}

/// A key press: a printable character or one of the named control keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEvent {
    Char(char),
    Named(NamedKey),
}

impl KeyEvent {
    /// Fold raw platform characters onto the canonical forms.
    ///
    /// * `'\r'` and `'\n'` become `Enter` (the newline surrogate).
    /// * DEL (`0x7f`) and BS (`0x08`) become `Backspace`.
    /// * Any other control character except `'\t'` is dropped (`None`).
    pub fn normalized(self) -> Option<KeyEvent> {
        match self {
            KeyEvent::Char('\r' | '\n') => Some(KeyEvent::Named(NamedKey::Enter)),
            KeyEvent::Char('\u{7f}' | '\u{8}') => Some(KeyEvent::Named(NamedKey::Backspace)),
            KeyEvent::Char('\t') => Some(self),
            KeyEvent::Char(c) if c.is_control() => None,
            other => Some(other),
        }
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyEvent::Char(c) => write!(f, "Char({:?})", c),
            KeyEvent::Named(k) => write!(f, "{}", k),
        }
    }
}

impl fmt::Display for NamedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NamedKey::ArrowUp => "ArrowUp",
            NamedKey::ArrowDown => "ArrowDown",
            NamedKey::ArrowLeft => "ArrowLeft",
            NamedKey::ArrowRight => "ArrowRight",
            NamedKey::Backspace => "Backspace",
            NamedKey::Enter => "Enter",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown key name `{0}`")]
pub struct ParseKeyError(pub String);

impl FromStr for NamedKey {
    type Err = ParseKeyError;

    /// Case-insensitive; the `Arrow` prefix is optional (`up` == `ArrowUp`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        let name = lower.strip_prefix("arrow").unwrap_or(&lower);
        match name {
            "up" => Ok(NamedKey::ArrowUp),
            "down" => Ok(NamedKey::ArrowDown),
            "left" => Ok(NamedKey::ArrowLeft),
            "right" => Ok(NamedKey::ArrowRight),
            "backspace" => Ok(NamedKey::Backspace),
            "enter" | "return" => Ok(NamedKey::Enter),
            _ => Err(ParseKeyError(s.to_string())),
        }
    }
}
