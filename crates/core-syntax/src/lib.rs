//! Pattern-driven syntax highlighting over rendered editor text.
//!
//! `Highlighter::highlight` is a pure function of its input: it scans the
//! whole text with every rule of a precompiled `RuleTable`, paints matches
//! into a per-byte tag map in rule order, and returns the coalesced runs.
//! There is no incremental mode; callers re-run it on the full rendered text
//! after each document mutation. That is fine for shader-sized sources and is
//! not meant to scale to large files.

mod rules;
mod style;

pub use rules::{
    DEFAULT_DIRECTIVES, DEFAULT_KEYWORDS, RuleError, RuleSpec, RuleTable, Vocabulary, default_rules,
};
pub use style::{HighlightSpan, StyleTag};

use tracing::trace;

#[derive(Debug, Clone, Default)]
pub struct Highlighter {
    table: RuleTable,
}

impl Highlighter {
    pub fn new(table: RuleTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    /// Tag `text` into ordered spans covering every byte.
    pub fn highlight(&self, text: &str) -> Vec<HighlightSpan> {
        let mut tags = vec![StyleTag::Plain; text.len()];
        for rule in &self.table.rules {
            for m in rule.regex.find_iter(text) {
                for slot in &mut tags[m.range()] {
                    if !rule.yields_to.contains(slot) {
                        *slot = rule.tag;
                    }
                }
            }
        }
        let spans = style::coalesce(&tags);
        trace!(target: "syntax", bytes = text.len(), spans = spans.len(), "highlight");
        spans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use StyleTag::*;

    fn spans(text: &str) -> Vec<(&str, StyleTag)> {
        Highlighter::default()
            .highlight(text)
            .into_iter()
            .map(|s| (&text[s.range.clone()], s.tag))
            .collect()
    }

    #[test]
    fn empty_text_has_no_spans() {
        assert!(Highlighter::default().highlight("").is_empty());
    }

    #[test]
    fn comment_overrides_number() {
        assert_eq!(spans("// 42"), vec![("// 42", Comment)]);
    }

    #[test]
    fn digits_inside_string_stay_string() {
        assert_eq!(
            spans(r#"x = "v 42";"#),
            vec![("x = ", Plain), (r#""v 42""#, StringLiteral), (";", Plain)]
        );
    }

    #[test]
    fn escaped_quote_does_not_end_string() {
        assert_eq!(
            spans(r#""a\"b" c"#),
            vec![(r#""a\"b""#, StringLiteral), (" c", Plain)]
        );
    }

    #[test]
    fn rendered_lines_tag_gutter_keywords_and_directives() {
        let text = "1 #include <metal_stdlib>\n2 using namespace metal;\n3 return 1.5;";
        assert_eq!(
            spans(text),
            vec![
                ("1", LineNumber),
                (" ", Plain),
                ("#include", Preprocessor),
                (" <metal_stdlib>\n", Plain),
                ("2", LineNumber),
                (" ", Plain),
                ("using", Keyword),
                (" ", Plain),
                ("namespace", Keyword),
                (" metal;\n", Plain),
                ("3", LineNumber),
                (" ", Plain),
                ("return", Keyword),
                (" ", Plain),
                ("1.5", Number),
                (";", Plain),
            ]
        );
    }

    #[test]
    fn padded_gutter_numbers_are_line_numbers() {
        let text = " 9 x\n10 7";
        assert_eq!(
            spans(text),
            vec![
                (" 9", LineNumber),
                (" x\n", Plain),
                ("10", LineNumber),
                (" ", Plain),
                ("7", Number),
            ]
        );
    }

    #[test]
    fn comments_on_every_line_are_tagged() {
        let text = "1 a // one\n2 b // two";
        let tagged: Vec<_> = spans(text)
            .into_iter()
            .filter(|(_, t)| *t == Comment)
            .collect();
        assert_eq!(tagged, vec![("// one", Comment), ("// two", Comment)]);
    }

    #[test]
    fn keyword_needs_word_boundary() {
        assert_eq!(spans("returned"), vec![("returned", Plain)]);
    }

    #[test]
    fn failed_rule_does_not_block_others() {
        let mut specs = default_rules(&Vocabulary::default());
        specs.insert(0, RuleSpec::new("[", Keyword));
        let h = Highlighter::new(RuleTable::compile(specs));
        assert_eq!(h.table().skipped().len(), 1);
        let out = h.highlight("// 1");
        assert_eq!(out, vec![HighlightSpan::new(0..4, Comment)]);
    }

    #[test]
    fn spans_cover_multibyte_text_on_char_boundaries() {
        let text = "1 \"é\" ü 3";
        let out = Highlighter::default().highlight(text);
        assert_eq!(out.first().map(|s| s.range.start), Some(0));
        assert_eq!(out.last().map(|s| s.range.end), Some(text.len()));
        for s in &out {
            assert!(text.is_char_boundary(s.range.start));
            assert!(text.is_char_boundary(s.range.end));
        }
    }
}
