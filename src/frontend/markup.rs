//! Test markup: `[|...|]` marks a span and `$$` marks a caret position.
//!
//! Used by fixtures and by the `refactor` command to describe selections
//! inline with the source text.

use crate::syntax::TextSpan;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkedSource {
    pub text: String,
    pub spans: Vec<TextSpan>,
    pub caret: Option<usize>,
}

impl MarkedSource {
    /// The selection a refactoring should see: the first marked span, else an
    /// empty span at the caret.
    pub fn selection(&self) -> Option<TextSpan> {
        self.spans
            .first()
            .copied()
            .or_else(|| self.caret.map(TextSpan::empty))
    }
}

/// Strips markers from `input` and records their positions in the
/// resulting text. Unbalanced `|]` markers are kept as plain text.
pub fn parse_markup(input: &str) -> MarkedSource {
    let mut text = String::with_capacity(input.len());
    let mut spans = Vec::new();
    let mut open = Vec::new();
    let mut caret = None;
    let mut rest = input;
    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("[|") {
            open.push(text.len());
            rest = after;
        } else if rest.starts_with("|]") && !open.is_empty() {
            if let Some(start) = open.pop() {
                spans.push(TextSpan::new(start, text.len()));
            }
            rest = &rest[2..];
        } else if let Some(after) = rest.strip_prefix("$$") {
            caret = Some(text.len());
            rest = after;
        } else {
            let ch = rest.chars().next().unwrap_or_default();
            text.push(ch);
            rest = &rest[ch.len_utf8()..];
        }
    }
    spans.sort();
    MarkedSource { text, spans, caret }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_span_and_caret_markers() {
        let marked = parse_markup("[|Console|].Write$$Line(\"a\");");
        assert_eq!(marked.text, "Console.WriteLine(\"a\");");
        assert_eq!(marked.spans, vec![TextSpan::new(0, 7)]);
        assert_eq!(marked.caret, Some(13));
        assert_eq!(marked.selection(), Some(TextSpan::new(0, 7)));
    }

    #[test]
    fn caret_only_selection_is_empty_span() {
        let marked = parse_markup("A.$$B b;");
        assert_eq!(marked.selection(), Some(TextSpan::empty(2)));
    }
}
