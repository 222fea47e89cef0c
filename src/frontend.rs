//! Host-side front end: a trivia-preserving lexer plus recursive-descent
//! parsers for the C# and Visual Basic subsets the analyzers understand.

mod csharp;
mod cursor;
mod lexer;
pub mod markup;
mod visual_basic;

use tracing::trace;

use crate::error::{SemfixError, SemfixResult};
use crate::syntax::{Language, SyntaxTree};
use cursor::TokenCursor;

pub use markup::{MarkedSource, parse_markup};

const GENERATED_SUFFIXES: &[&str] = &[
    ".g.cs",
    ".g.i.cs",
    ".designer.cs",
    ".generated.cs",
    ".g.vb",
    ".designer.vb",
    ".generated.vb",
];

/// Parses `text` as a document named `name`.
pub fn parse_document(name: &str, language: Language, text: &str) -> SemfixResult<SyntaxTree> {
    let tokens = lexer::tokenize(name, text, language)?;
    let cursor = TokenCursor::new(name, language, tokens);
    let root = match language {
        Language::CSharp => csharp::parse(cursor)?,
        Language::VisualBasic => visual_basic::parse(cursor)?,
    };
    let tree = SyntaxTree::new(language, root);
    if tree.text() != text {
        return Err(SemfixError::parse(
            name,
            0,
            "tree text does not reproduce the source",
        ));
    }
    trace!(document = name, bytes = text.len(), "parsed document");
    Ok(tree)
}

pub fn parse_csharp(text: &str) -> SemfixResult<SyntaxTree> {
    parse_document("document.cs", Language::CSharp, text)
}

pub fn parse_visual_basic(text: &str) -> SemfixResult<SyntaxTree> {
    parse_document("document.vb", Language::VisualBasic, text)
}

/// Generated documents are skipped by the analyzers: recognized by file
/// name or by an `<auto-generated` marker in the file's header comments.
pub fn is_generated(name: &str, text: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    if GENERATED_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix)) {
        return true;
    }
    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            continue;
        }
        let is_comment = line.starts_with("//") || line.starts_with('\'') || line.starts_with("/*");
        if !is_comment {
            break;
        }
        if line.contains("<auto-generated") {
            return true;
        }
    }
    false
}
