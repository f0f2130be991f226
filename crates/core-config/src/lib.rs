//! Configuration loading and parsing.
//!
//! Reads `shaderpad.toml` (or an override path supplied by the binary). Every
//! table and field is optional; anything missing falls back to defaults and a
//! file that fails to parse is treated like a missing one (logged at `warn`).
//!
//! ```toml
//! [glyph]
//! width = 8.0
//! height = 16.0
//!
//! [highlight]
//! keywords = ["float4", "return"]
//! directives = ["include"]
//!
//! [[highlight.extra]]
//! pattern = "\\bTODO\\b"
//! style = "comment"
//!
//! [log]
//! filter = "info,syntax=debug"
//! ```

use anyhow::{Context, Result};
use core_model::GlyphMetrics;
use core_syntax::{RuleSpec, RuleTable, Vocabulary, default_rules};
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "shaderpad.toml";

#[derive(Debug, Deserialize, Clone)]
pub struct GlyphConfig {
    #[serde(default = "GlyphConfig::default_width")]
    pub width: f32,
    #[serde(default = "GlyphConfig::default_height")]
    pub height: f32,
}

impl Default for GlyphConfig {
    fn default() -> Self {
        Self {
            width: Self::default_width(),
            height: Self::default_height(),
        }
    }
}

impl GlyphConfig {
    const fn default_width() -> f32 {
        8.0
    }
    const fn default_height() -> f32 {
        16.0
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ExtraRule {
    pub pattern: String,
    pub style: String,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct HighlightConfig {
    /// Replaces the built-in keyword list when present.
    pub keywords: Option<Vec<String>>,
    /// Replaces the built-in directive list when present.
    pub directives: Option<Vec<String>>,
    /// Applied after the built-in rules, in declaration order.
    #[serde(default)]
    pub extra: Vec<ExtraRule>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    #[serde(default = "LogConfig::default_filter")]
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: Self::default_filter(),
        }
    }
}

impl LogConfig {
    fn default_filter() -> String {
        "info".to_string()
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub glyph: GlyphConfig,
    #[serde(default)]
    pub highlight: HighlightConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
}

/// Config path: local working directory first, then the platform config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("shaderpad").join(CONFIG_FILE_NAME);
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = fs::read_to_string(&path)
        .with_context(|| format!("reading config {}", path.display()))?;
    Ok(parse_str(&content))
}

/// Parse config text, falling back to defaults on a malformed file.
pub fn parse_str(content: &str) -> Config {
    match toml::from_str::<ConfigFile>(content) {
        Ok(file) => Config {
            raw: Some(content.to_string()),
            file,
        },
        Err(e) => {
            warn!(target: "config", error = %e, "config_parse_failed_using_defaults");
            Config::default()
        }
    }
}

impl Config {
    /// Validated default glyph metrics; invalid values fall back to 8x16.
    pub fn glyph_metrics(&self) -> GlyphMetrics {
        let GlyphConfig { width, height } = self.file.glyph;
        match GlyphMetrics::new(width, height) {
            Ok(m) => m,
            Err(e) => {
                warn!(target: "config", error = %e, "glyph_metrics_rejected");
                GlyphMetrics::default()
            }
        }
    }

    pub fn vocabulary(&self) -> Vocabulary {
        let mut vocab = Vocabulary::default();
        if let Some(k) = &self.file.highlight.keywords {
            vocab.keywords = k.clone();
        }
        if let Some(d) = &self.file.highlight.directives {
            vocab.directives = d.clone();
        }
        vocab
    }

    /// Compile the built-in rules for the configured vocabulary followed by
    /// any extra rules. Bad extra rules are skipped individually.
    pub fn rule_table(&self) -> RuleTable {
        let mut specs = default_rules(&self.vocabulary());
        let mut rejected = Vec::new();
        for extra in &self.file.highlight.extra {
            match RuleSpec::parse(&extra.pattern, &extra.style) {
                Ok(spec) => specs.push(spec),
                Err(e) => rejected.push(e),
            }
        }
        let mut table = RuleTable::compile(specs);
        for e in rejected {
            table.note_skipped(e);
        }
        if !table.skipped().is_empty() {
            info!(
                target: "config",
                compiled = table.len(),
                skipped = table.skipped().len(),
                "highlight_rules_partially_applied"
            );
        }
        table
    }
}
