//! Shaderpad entrypoint.
//!
//! A headless host for the editor core: it loads a shader source, mounts an
//! `EditorEngine`, optionally replays an event script against it and prints
//! the resulting render model (or the plain document text) to stdout.
use anyhow::{Context, Result};
use clap::Parser;
use core_config::{Config, load_from};
use core_engine::{EditorEngine, RenderModel, TextObserver};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::{debug, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

mod script;

const LOG_FILE_NAME: &str = "shaderpad.log";

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "shaderpad", version, about = "Shader source grid editor (headless)")]
struct Args {
    /// Shader source to open (UTF-8 text). If omitted an empty document is used.
    pub path: Option<PathBuf>,
    /// Optional configuration file path (overrides discovery of `shaderpad.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Event script to replay after mounting, one event per line.
    #[arg(long = "script")]
    pub script: Option<PathBuf>,
    /// Glyph cell width in pixels (overrides `[glyph] width`).
    #[arg(long = "glyph-width")]
    pub glyph_width: Option<f32>,
    /// Glyph cell height in pixels (overrides `[glyph] height`).
    #[arg(long = "glyph-height")]
    pub glyph_height: Option<f32>,
    /// Print only the final document text, in the source's line endings.
    #[arg(long = "text")]
    pub text_only: bool,
}

/// Stands in for the shader compiler: records each text revision.
struct RevisionLog;

impl TextObserver for RevisionLog {
    fn on_text_changed(&self, text: &str) {
        debug!(
            target: "runtime",
            bytes = text.len(),
            lines = text.split('\n').count(),
            "text_revision"
        );
    }
}

fn configure_logging(config: &Config) -> Result<Option<WorkerGuard>> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join(LOG_FILE_NAME);
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::try_new(&config.file.log.filter)
            .with_context(|| format!("invalid log filter `{}`", config.file.log.filter))?,
    };
    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(_) => Ok(Some(guard)),
        // Global subscriber already installed; dropping the guard shuts the writer down.
        Err(_) => Ok(None),
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

fn read_source(path: Option<&Path>) -> String {
    let Some(path) = path else {
        return String::new();
    };
    match std::fs::read_to_string(path) {
        Ok(content) => {
            debug!(target: "io", file = %path.display(), size_bytes = content.len(), "file_read_ok");
            content
        }
        Err(e) => {
            error!(target: "io", file = %path.display(), ?e, "file_open_error");
            String::new()
        }
    }
}

fn replay(engine: &mut EditorEngine, path: &Path) -> Result<usize> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading script {}", path.display()))?;
    let events = script::parse(&content)?;
    let mut ignored = 0usize;
    for (line, event) in &events {
        let transition = engine
            .handle_event(*event)
            .with_context(|| format!("replaying script line {line}"))?;
        if transition.ignored {
            ignored += 1;
        }
    }
    info!(target: "runtime", events = events.len(), ignored, "script_replayed");
    Ok(events.len())
}

fn write_model(out: &mut impl Write, model: &RenderModel) -> io::Result<()> {
    writeln!(out, "--- text")?;
    writeln!(out, "{}", model.text)?;
    writeln!(out, "--- spans")?;
    for span in &model.spans {
        let slice = model.text.get(span.range.clone()).unwrap_or_default();
        writeln!(
            out,
            "{:>5}..{:<5} {:<14} {:?}",
            span.range.start,
            span.range.end,
            span.tag.as_str(),
            slice
        )?;
    }
    let c = model.cursor_rect;
    writeln!(out, "--- cursor x={} y={} w={} h={}", c.x, c.y, c.w, c.h)?;
    match model.selection_rect {
        Some(s) => writeln!(out, "--- selection x={} y={} w={} h={}", s.x, s.y, s.w, s.h),
        None => writeln!(out, "--- selection none"),
    }
}

fn write_output(out: &mut impl Write, engine: &EditorEngine, text_only: bool) -> io::Result<()> {
    if text_only {
        write!(out, "{}", engine.document().export())
    } else {
        write_model(out, &engine.render_model())
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_from(args.config.clone())?;
    let _log_guard = configure_logging(&config)?;
    install_panic_hook();
    info!(target: "runtime", config_override = args.config.is_some(), "startup");

    let source = read_source(args.path.as_deref());
    let mut engine = EditorEngine::from_config(&source, &config);
    engine.add_observer(Box::new(RevisionLog));

    if args.glyph_width.is_some() || args.glyph_height.is_some() {
        let current = engine.metrics();
        let width = args.glyph_width.unwrap_or(current.width());
        let height = args.glyph_height.unwrap_or(current.height());
        engine
            .set_glyph_metrics(width, height)
            .context("invalid --glyph-width/--glyph-height")?;
    }

    if let Some(script) = args.script.as_deref() {
        replay(&mut engine, script)?;
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_output(&mut out, &engine, args.text_only)?;
    out.flush()?;
    info!(target: "runtime", lines = engine.document().line_count(), "shutdown");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_syntax::Highlighter;
    use pretty_assertions::assert_eq;

    #[test]
    fn model_dump_lists_spans_and_rects() {
        let engine = EditorEngine::new(
            "// 1",
            core_config::Config::default().glyph_metrics(),
            Highlighter::default(),
        );
        let mut buf = Vec::new();
        write_model(&mut buf, &engine.render_model()).unwrap();
        let dump = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = dump.lines().collect();
        assert_eq!(lines[0], "--- text");
        assert_eq!(lines[1], "1 // 1");
        assert_eq!(lines[2], "--- spans");
        assert!(lines[3].contains("line_number"));
        assert!(lines[5].contains("comment") && lines[5].ends_with("\"// 1\""));
        assert_eq!(lines[6], "--- cursor x=16 y=0 w=2 h=16");
        assert_eq!(lines[7], "--- selection none");
    }

    #[test]
    fn replay_applies_script_events() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "key right\nkey Enter\ntype return 0;\n").unwrap();
        let mut engine = EditorEngine::new("a", Default::default(), Highlighter::default());
        assert_eq!(replay(&mut engine, tmp.path()).unwrap(), 11);
        assert_eq!(engine.text(), "a\nreturn 0;");
    }

    #[test]
    fn text_output_keeps_source_line_endings() {
        let mut engine = EditorEngine::new(
            "float4 a;\r\nreturn a;\r\n",
            Default::default(),
            Highlighter::default(),
        );
        engine
            .handle_key(core_events::KeyEvent::Named(core_events::NamedKey::Enter))
            .unwrap();
        let mut buf = Vec::new();
        write_output(&mut buf, &engine, true).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "\r\nfloat4 a;\r\nreturn a;\r\n"
        );
        assert_eq!(engine.text(), "\nfloat4 a;\nreturn a;\n");
    }

    #[test]
    fn missing_source_reads_as_empty() {
        assert_eq!(read_source(Some(Path::new("__no_such_shader__.metal"))), "");
        assert_eq!(read_source(None), "");
    }
}
