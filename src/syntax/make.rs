//! Small constructors for synthesized green elements.
//!
//! Synthesized tokens carry no trivia unless a caller adds it; the language
//! generators in `crate::lang` decide where spaces and line breaks go.

use super::{GreenElement, GreenNode, GreenToken, SyntaxKind};

pub fn token(kind: SyntaxKind, text: &str) -> GreenElement {
    GreenToken::new(kind, text).into()
}

pub fn keyword(text: &str) -> GreenElement {
    token(SyntaxKind::KeywordToken, text)
}

pub fn punct(text: &str) -> GreenElement {
    token(SyntaxKind::PunctuationToken, text)
}

pub fn ident(text: &str) -> GreenElement {
    token(SyntaxKind::IdentifierToken, text)
}

pub fn node(kind: SyntaxKind, children: Vec<GreenElement>) -> GreenElement {
    GreenNode::new(kind, children).into()
}

pub fn identifier_name(text: &str) -> GreenElement {
    node(SyntaxKind::IdentifierName, vec![ident(text)])
}

/// Joins elements with a separator token that carries `separator_trailing`.
pub fn separated(
    elements: Vec<GreenElement>,
    separator: &str,
    separator_trailing: &str,
) -> Vec<GreenElement> {
    let mut out = Vec::with_capacity(elements.len() * 2);
    for (index, element) in elements.into_iter().enumerate() {
        if index > 0 {
            out.push(punct(separator).with_trailing_trivia(separator_trailing));
        }
        out.push(element);
    }
    out
}
