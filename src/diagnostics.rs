use serde::Serialize;

use crate::level::LintLevel;
use crate::lint::LintDescriptor;
use crate::semantic::DocumentId;
use crate::syntax::TextSpan;

/// A single finding produced by a semfix rule.
#[derive(Debug, Clone)]
#[must_use]
pub struct Diagnostic {
    pub lint: &'static LintDescriptor,
    pub level: LintLevel,
    pub document: DocumentId,
    pub file: Option<String>,
    /// Primary location.
    pub location: TextSpan,
    /// `location` as 1-based row/column positions.
    pub span: Span,
    /// Secondary locations the fixes re-locate their target from.
    pub additional_locations: Vec<TextSpan>,
    pub message: String,
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn code(&self) -> &'static str {
        self.lint.code
    }
}

/// Span in a source document (1-based row/column positions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

/// Single position in a source document (1-based row/column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub row: usize,
    pub column: usize,
}

impl Span {
    /// Converts a byte span of `source` to 1-based positions.
    #[must_use]
    pub fn from_text_span(source: &str, span: TextSpan) -> Self {
        Self {
            start: position_from_byte_offset(source, span.start),
            end: position_from_byte_offset(source, span.end),
        }
    }
}

/// Columns count bytes, matching the byte offsets the spans carry.
pub fn position_from_byte_offset(source: &str, byte_offset: usize) -> Position {
    let mut row = 1usize;
    let mut col = 1usize;

    let end = byte_offset.min(source.len());
    for b in source.as_bytes().iter().take(end) {
        if *b == b'\n' {
            row += 1;
            col = 1;
        } else {
            col += 1;
        }
    }

    Position { row, column: col }
}
