//! Event scripts for headless replay.
//!
//! One event per line; blank lines and `#` comments are skipped.
//!
//! ```text
//! down 24 0        # pointer down at x=24 y=0
//! drag 64 0
//! up
//! key x            # a single printable character
//! key space        # `space` and `tab` name whitespace characters
//! key ArrowLeft    # a named key (the `Arrow` prefix is optional)
//! type float4 c;   # every character of the rest of the line
//! glyph 7.5 15     # host font change
//! ```

use anyhow::{Context, Result, anyhow, bail};
use core_events::{EditorEvent, KeyEvent, NamedKey, PointerEvent};

/// Parsed events tagged with their 1-based source line.
pub fn parse(content: &str) -> Result<Vec<(usize, EditorEvent)>> {
    let mut events = Vec::new();
    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = strip_comment(raw);
        if line.trim().is_empty() {
            continue;
        }
        parse_line(line, line_no, &mut events).with_context(|| format!("script line {line_no}"))?;
    }
    Ok(events)
}

// `#` starts a comment unless it is the argument of `key`/`type`.
fn strip_comment(raw: &str) -> &str {
    let trimmed = raw.trim_start();
    if trimmed.starts_with("key ") || trimmed.starts_with("type ") {
        return raw;
    }
    raw.split_once('#').map_or(raw, |(head, _)| head)
}

fn parse_line(line: &str, line_no: usize, out: &mut Vec<(usize, EditorEvent)>) -> Result<()> {
    let line = line.trim_start();
    let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
    match verb {
        "down" | "drag" | "up" => {
            let (x, y) = if verb == "up" && rest.trim().is_empty() {
                (0.0, 0.0)
            } else {
                pair(rest)?
            };
            let event = match verb {
                "down" => PointerEvent::down(x, y),
                "drag" => PointerEvent::drag(x, y),
                _ => PointerEvent::up(x, y),
            };
            out.push((line_no, EditorEvent::Pointer(event)));
        }
        "key" => out.push((line_no, EditorEvent::Key(key(rest.trim())?))),
        "type" => {
            for ch in rest.chars() {
                out.push((line_no, EditorEvent::Key(KeyEvent::Char(ch))));
            }
        }
        "glyph" => {
            let (width, height) = pair(rest)?;
            out.push((line_no, EditorEvent::GlyphMetrics { width, height }));
        }
        other => bail!("unknown event `{other}`"),
    }
    Ok(())
}

fn pair(rest: &str) -> Result<(f32, f32)> {
    let mut it = rest.split_whitespace();
    let (Some(a), Some(b), None) = (it.next(), it.next(), it.next()) else {
        bail!("expected two numbers, got `{}`", rest.trim());
    };
    let a = a.parse().with_context(|| format!("bad number `{a}`"))?;
    let b = b.parse().with_context(|| format!("bad number `{b}`"))?;
    Ok((a, b))
}

fn key(token: &str) -> Result<KeyEvent> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (None, _) => Err(anyhow!("`key` needs an argument")),
        (Some(c), None) => Ok(KeyEvent::Char(c)),
        _ => match token.to_ascii_lowercase().as_str() {
            "space" => Ok(KeyEvent::Char(' ')),
            "tab" => Ok(KeyEvent::Char('\t')),
            _ => Ok(KeyEvent::Named(token.parse::<NamedKey>()?)),
        },
    }
}
