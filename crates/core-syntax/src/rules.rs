//! Ordered highlight rules and their one-time compilation.
//!
//! Default order (later rules overwrite earlier tags on overlap):
//! 1. keywords, 2. `#` directives, 3. string literals, 4. numbers,
//! 5. gutter line numbers, 6. `//` line comments.
//!
//! One exception to last-applied-wins: the number rule yields to string
//! literals, so digits inside a quoted string stay `string_literal`.

use crate::StyleTag;
use regex::Regex;
use tracing::{debug, warn};

pub const DEFAULT_KEYWORDS: &[&str] = &[
    "using",
    "namespace",
    "struct",
    "bool",
    "constant",
    "vertex",
    "return",
    "fragment",
    "kernel",
    "device",
    "thread",
    "threadgroup",
    "const",
    "if",
    "else",
    "for",
    "while",
    "void",
    "float",
    "float2",
    "float3",
    "float4",
    "half",
    "half4",
    "int",
    "uint",
    "uint2",
];

pub const DEFAULT_DIRECTIVES: &[&str] = &[
    "include", "define", "undef", "if", "ifdef", "ifndef", "elif", "else", "endif", "pragma",
];

const STRING_PATTERN: &str = r#""[^"\\]*(?:\\.[^"\\]*)*""#;
const NUMBER_PATTERN: &str = r"\b\d+\.?\d*\b";
const LINE_NUMBER_PATTERN: &str = r"(?m)^[ \t]*\d+";
const COMMENT_PATTERN: &str = r"(?m)//.*$";

#[derive(Debug, Clone, thiserror::Error)]
pub enum RuleError {
    #[error("pattern `{pattern}` failed to compile: {source}")]
    PatternCompile {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("unknown style `{style}` for pattern `{pattern}`")]
    UnknownStyle { pattern: String, style: String },
}

/// Uncompiled rule: a pattern, the tag it applies, and tags it must not overwrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSpec {
    pub pattern: String,
    pub tag: StyleTag,
    pub yields_to: Vec<StyleTag>,
}

impl RuleSpec {
    pub fn new(pattern: impl Into<String>, tag: StyleTag) -> Self {
        Self {
            pattern: pattern.into(),
            tag,
            yields_to: Vec::new(),
        }
    }

    pub fn yielding_to(mut self, tag: StyleTag) -> Self {
        self.yields_to.push(tag);
        self
    }

    /// Build a rule from config strings; the style name must parse.
    pub fn parse(pattern: &str, style: &str) -> Result<Self, RuleError> {
        let tag = style.parse().map_err(|style| RuleError::UnknownStyle {
            pattern: pattern.to_string(),
            style,
        })?;
        Ok(Self::new(pattern, tag))
    }
}

/// Word lists feeding the keyword and directive rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    pub keywords: Vec<String>,
    pub directives: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            directives: DEFAULT_DIRECTIVES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn alternation(words: &[String]) -> String {
    words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|")
}

/// The six built-in rules in priority order. An empty word list drops its rule.
pub fn default_rules(vocab: &Vocabulary) -> Vec<RuleSpec> {
    let mut rules = Vec::with_capacity(6);
    if !vocab.keywords.is_empty() {
        rules.push(RuleSpec::new(
            format!(r"\b(?:{})\b", alternation(&vocab.keywords)),
            StyleTag::Keyword,
        ));
    }
    if !vocab.directives.is_empty() {
        rules.push(RuleSpec::new(
            format!(r"#(?:{})\b", alternation(&vocab.directives)),
            StyleTag::Preprocessor,
        ));
    }
    rules.push(RuleSpec::new(STRING_PATTERN, StyleTag::StringLiteral));
    rules.push(RuleSpec::new(NUMBER_PATTERN, StyleTag::Number).yielding_to(StyleTag::StringLiteral));
    rules.push(RuleSpec::new(LINE_NUMBER_PATTERN, StyleTag::LineNumber));
    rules.push(RuleSpec::new(COMMENT_PATTERN, StyleTag::Comment));
    rules
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledRule {
    pub(crate) regex: Regex,
    pub(crate) tag: StyleTag,
    pub(crate) yields_to: Vec<StyleTag>,
}

/// Precompiled, ordered rule table. Rules whose pattern fails to compile are
/// left out and reported through `skipped`; the rest keep their order.
#[derive(Debug, Clone)]
pub struct RuleTable {
    pub(crate) rules: Vec<CompiledRule>,
    skipped: Vec<RuleError>,
}

impl RuleTable {
    pub fn compile(specs: impl IntoIterator<Item = RuleSpec>) -> Self {
        let mut rules = Vec::new();
        let mut skipped = Vec::new();
        for spec in specs {
            match Regex::new(&spec.pattern) {
                Ok(regex) => rules.push(CompiledRule {
                    regex,
                    tag: spec.tag,
                    yields_to: spec.yields_to,
                }),
                Err(source) => {
                    warn!(target: "syntax", pattern = %spec.pattern, tag = %spec.tag, "rule_skipped_pattern_compile");
                    skipped.push(RuleError::PatternCompile {
                        pattern: spec.pattern,
                        source,
                    });
                }
            }
        }
        debug!(target: "syntax", compiled = rules.len(), skipped = skipped.len(), "rule_table_compiled");
        Self { rules, skipped }
    }

    /// Record a rule that was rejected before compilation (e.g. unknown style).
    pub fn note_skipped(&mut self, err: RuleError) {
        warn!(target: "syntax", error = %err, "rule_skipped");
        self.skipped.push(err);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn tags(&self) -> impl Iterator<Item = StyleTag> + '_ {
        self.rules.iter().map(|r| r.tag)
    }

    pub fn skipped(&self) -> &[RuleError] {
        &self.skipped
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::compile(default_rules(&Vocabulary::default()))
    }
}
