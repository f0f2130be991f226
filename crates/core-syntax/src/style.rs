//! Style tags and tagged spans produced by the highlighter.
//!
//! Spans are half-open UTF-8 byte ranges over the rendered (gutter-prefixed)
//! text. A highlight result covers the whole text: untagged runs carry
//! `StyleTag::Plain` and adjacent runs never share a tag.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum StyleTag {
    #[default]
    Plain,
    Keyword,
    Preprocessor,
    StringLiteral,
    Number,
    LineNumber,
    Comment,
}

impl StyleTag {
    pub fn as_str(self) -> &'static str {
        match self {
            StyleTag::Plain => "plain",
            StyleTag::Keyword => "keyword",
            StyleTag::Preprocessor => "preprocessor",
            StyleTag::StringLiteral => "string_literal",
            StyleTag::Number => "number",
            StyleTag::LineNumber => "line_number",
            StyleTag::Comment => "comment",
        }
    }
}

impl fmt::Display for StyleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StyleTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "plain" => Ok(StyleTag::Plain),
            "keyword" => Ok(StyleTag::Keyword),
            "preprocessor" | "directive" => Ok(StyleTag::Preprocessor),
            "string_literal" | "string" => Ok(StyleTag::StringLiteral),
            "number" => Ok(StyleTag::Number),
            "line_number" => Ok(StyleTag::LineNumber),
            "comment" => Ok(StyleTag::Comment),
            _ => Err(s.to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HighlightSpan {
    pub range: Range<usize>,
    pub tag: StyleTag,
}

impl HighlightSpan {
    pub fn new(range: Range<usize>, tag: StyleTag) -> Self {
        Self { range, tag }
    }
}

/// Collapse a per-byte tag map into maximal runs.
pub(crate) fn coalesce(tags: &[StyleTag]) -> Vec<HighlightSpan> {
    let mut spans: Vec<HighlightSpan> = Vec::new();
    for (i, &tag) in tags.iter().enumerate() {
        match spans.last_mut() {
            Some(last) if last.tag == tag => last.range.end = i + 1,
            _ => spans.push(HighlightSpan::new(i..i + 1, tag)),
        }
    }
    spans
}
