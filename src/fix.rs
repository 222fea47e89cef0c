//! Text edits between syntax trees.
//!
//! Code actions produce whole new trees. The batch fixer turns each of those
//! into byte-offset edits against the original text with `text_edits`, merges
//! the edits of many actions, and applies them in one pass.
//!
//! ## Safety Guarantees
//!
//! - Edits are validated to be non-overlapping before application
//! - Edits are applied in reverse order to preserve byte offsets
//! - All operations are pure (no side effects)

use thiserror::Error;

use crate::error::SemfixError;
use crate::syntax::{GreenElement, SyntaxTree};

/// Error type for fix application operations.
#[derive(Debug, Error)]
pub enum FixError {
    #[error("Overlapping edits detected at byte {0}")]
    OverlappingEdits(usize),

    #[error("Edit range [{start}..{end}) exceeds source length {source_len}")]
    InvalidRange {
        start: usize,
        end: usize,
        source_len: usize,
    },

    #[error("Edit start {start} is after edit end {end}")]
    InvalidEditOrder { start: usize, end: usize },
}

impl From<FixError> for SemfixError {
    fn from(err: FixError) -> Self {
        SemfixError::edit(err.to_string())
    }
}

/// A replacement of the byte range `[start_byte..end_byte)` of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    /// Starting byte offset (inclusive).
    pub start_byte: usize,
    /// Ending byte offset (exclusive).
    pub end_byte: usize,
    /// Text to insert in place of the range [start_byte..end_byte).
    pub replacement: String,
}

impl TextEdit {
    pub fn new(start_byte: usize, end_byte: usize, replacement: String) -> Self {
        Self {
            start_byte,
            end_byte,
            replacement,
        }
    }

    pub fn delete(start_byte: usize, end_byte: usize) -> Self {
        Self::new(start_byte, end_byte, String::new())
    }

    pub fn insert(byte_offset: usize, text: String) -> Self {
        Self::new(byte_offset, byte_offset, text)
    }

    pub fn replace(start_byte: usize, end_byte: usize, replacement: String) -> Self {
        Self::new(start_byte, end_byte, replacement)
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        self.start_byte..self.end_byte
    }

    pub fn is_insertion(&self) -> bool {
        self.start_byte == self.end_byte
    }

    /// Returns true if this edit overlaps with another. Insertions only
    /// overlap edits whose range strictly contains their offset.
    pub fn overlaps_with(&self, other: &TextEdit) -> bool {
        // Two ranges [a, b) and [c, d) overlap if:
        // a < d && c < b
        self.start_byte < other.end_byte && other.start_byte < self.end_byte
    }

    pub fn validate(&self, source_len: usize) -> Result<(), FixError> {
        if self.start_byte > self.end_byte {
            return Err(FixError::InvalidEditOrder {
                start: self.start_byte,
                end: self.end_byte,
            });
        }

        if self.end_byte > source_len {
            return Err(FixError::InvalidRange {
                start: self.start_byte,
                end: self.end_byte,
                source_len,
            });
        }

        Ok(())
    }
}

/// Validate that a list of edits are non-overlapping and within bounds.
pub fn validate_edits(edits: &[TextEdit], source_len: usize) -> Result<(), FixError> {
    for edit in edits {
        edit.validate(source_len)?;
    }

    for i in 0..edits.len() {
        for j in (i + 1)..edits.len() {
            if edits[i].overlaps_with(&edits[j]) {
                return Err(FixError::OverlappingEdits(edits[i].start_byte));
            }
        }
    }

    Ok(())
}

/// Apply a list of non-overlapping edits to source code.
///
/// Edits are applied from the end of the text backwards. At a shared start
/// offset the replacement goes first and insertions follow in reverse list
/// order, so inserted text lands in front of the replaced text and in the
/// order the edits were listed.
///
/// # Example
///
/// ```rust
/// use semfix::fix::{TextEdit, apply_fixes};
///
/// let source = "o.Equals(1)";
/// let edits = vec![
///     TextEdit::replace(0, 1, "EqualityComparer<object>.Default".to_string()),
///     TextEdit::insert(9, "o, ".to_string()),
/// ];
///
/// let result = apply_fixes(source, &edits).unwrap();
/// assert_eq!(result, "EqualityComparer<object>.Default.Equals(o, 1)");
/// ```
pub fn apply_fixes(source: &str, edits: &[TextEdit]) -> Result<String, FixError> {
    if edits.is_empty() {
        return Ok(source.to_string());
    }

    validate_edits(edits, source.len())?;

    let mut order: Vec<usize> = (0..edits.len()).collect();
    order.sort_by(|&a, &b| {
        let (left, right) = (&edits[a], &edits[b]);
        right
            .start_byte
            .cmp(&left.start_byte)
            .then(right.end_byte.cmp(&left.end_byte))
            .then(b.cmp(&a))
    });

    let mut result = source.to_string();
    for index in order {
        let edit = &edits[index];
        result.replace_range(edit.range(), &edit.replacement);
    }

    Ok(result)
}

pub fn apply_fix(source: &str, edit: &TextEdit) -> Result<String, FixError> {
    apply_fixes(source, std::slice::from_ref(edit))
}

/// Edits that turn the text of `old` into the text of `new`.
///
/// Walks both green trees together and only descends where the trees
/// differ, so an edit deep inside one statement never touches its
/// neighbours. Unchanged subtrees shared between the trees are skipped
/// without comparing their text.
pub fn text_edits(old: &SyntaxTree, new: &SyntaxTree) -> Vec<TextEdit> {
    let mut edits = Vec::new();
    diff_element(
        &GreenElement::Node(old.green_root().clone()),
        &GreenElement::Node(new.green_root().clone()),
        0,
        &mut edits,
    );
    edits
}

fn diff_element(old: &GreenElement, new: &GreenElement, offset: usize, edits: &mut Vec<TextEdit>) {
    if same_element(old, new) {
        return;
    }
    match (old, new) {
        (GreenElement::Node(old_node), GreenElement::Node(new_node))
            if old_node.kind() == new_node.kind() =>
        {
            diff_children(old_node.children(), new_node.children(), offset, edits);
        }
        _ => edits.push(TextEdit::replace(offset, offset + old.full_len(), new.text())),
    }
}

fn same_element(old: &GreenElement, new: &GreenElement) -> bool {
    match (old, new) {
        (GreenElement::Node(a), GreenElement::Node(b)) => std::sync::Arc::ptr_eq(a, b) || a == b,
        (GreenElement::Token(a), GreenElement::Token(b)) => std::sync::Arc::ptr_eq(a, b) || a == b,
        _ => false,
    }
}

fn diff_children(
    old: &[GreenElement],
    new: &[GreenElement],
    offset: usize,
    edits: &mut Vec<TextEdit>,
) {
    let prefix = old
        .iter()
        .zip(new)
        .take_while(|(a, b)| same_element(a, b))
        .count();
    let suffix = old[prefix..]
        .iter()
        .rev()
        .zip(new[prefix..].iter().rev())
        .take_while(|(a, b)| same_element(a, b))
        .count();
    let old_mid = &old[prefix..old.len() - suffix];
    let new_mid = &new[prefix..new.len() - suffix];

    // Changed children are paired by kind from the end, then from the
    // start; whatever stays unpaired is replaced as one range.
    let mut tail = 0;
    while tail < old_mid.len()
        && tail < new_mid.len()
        && old_mid[old_mid.len() - 1 - tail].kind() == new_mid[new_mid.len() - 1 - tail].kind()
    {
        tail += 1;
    }
    let old_rest = &old_mid[..old_mid.len() - tail];
    let new_rest = &new_mid[..new_mid.len() - tail];
    let mut head = 0;
    while head < old_rest.len()
        && head < new_rest.len()
        && old_rest[head].kind() == new_rest[head].kind()
    {
        head += 1;
    }

    let mut position = offset + old[..prefix].iter().map(GreenElement::full_len).sum::<usize>();
    for (old_child, new_child) in old_rest[..head].iter().zip(&new_rest[..head]) {
        diff_element(old_child, new_child, position, edits);
        position += old_child.full_len();
    }

    let old_gap = &old_rest[head..];
    let new_gap = &new_rest[head..];
    if !old_gap.is_empty() || !new_gap.is_empty() {
        let len: usize = old_gap.iter().map(GreenElement::full_len).sum();
        let replacement: String = new_gap.iter().map(GreenElement::text).collect();
        edits.push(TextEdit::replace(position, position + len, replacement));
        position += len;
    }

    let old_tail = &old_mid[old_mid.len() - tail..];
    let new_tail = &new_mid[new_mid.len() - tail..];
    for (old_child, new_child) in old_tail.iter().zip(new_tail) {
        diff_element(old_child, new_child, position, edits);
        position += old_child.full_len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parse_csharp;
    use crate::syntax::{SyntaxKind, make};

    #[test]
    fn test_text_edit_creation() {
        let edit = TextEdit::new(0, 5, "hello".to_string());
        assert_eq!(edit.start_byte, 0);
        assert_eq!(edit.end_byte, 5);
        assert_eq!(edit.replacement, "hello");
    }

    #[test]
    fn test_text_edit_insert() {
        let edit = TextEdit::insert(5, "inserted".to_string());
        assert!(edit.is_insertion());
        assert_eq!(edit.range(), 5..5);
    }

    #[test]
    fn test_overlaps_with() {
        let edit1 = TextEdit::new(0, 10, "a".to_string());
        let edit2 = TextEdit::new(5, 15, "b".to_string());
        let edit3 = TextEdit::new(10, 20, "c".to_string());
        let insertion = TextEdit::insert(10, "d".to_string());

        assert!(edit1.overlaps_with(&edit2));
        assert!(edit2.overlaps_with(&edit1));
        assert!(!edit1.overlaps_with(&edit3));
        assert!(!edit3.overlaps_with(&edit1));
        assert!(!insertion.overlaps_with(&edit1));
        assert!(!insertion.overlaps_with(&edit3));
        assert!(insertion.overlaps_with(&edit2));
    }

    #[test]
    fn test_validate_edit_invalid_order() {
        let edit = TextEdit::new(10, 5, "hello".to_string());
        assert!(matches!(
            edit.validate(20),
            Err(FixError::InvalidEditOrder { .. })
        ));
    }

    #[test]
    fn test_validate_edit_exceeds_length() {
        let edit = TextEdit::new(0, 15, "hello".to_string());
        assert!(matches!(
            edit.validate(10),
            Err(FixError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_validate_edits_overlapping() {
        let edits = vec![
            TextEdit::new(0, 10, "a".to_string()),
            TextEdit::new(5, 15, "b".to_string()),
        ];
        assert!(matches!(
            validate_edits(&edits, 20),
            Err(FixError::OverlappingEdits(_))
        ));
    }

    #[test]
    fn test_fix_error_becomes_edit_error() {
        let err: SemfixError = FixError::OverlappingEdits(4).into();
        assert_eq!(
            err.to_string(),
            "invalid edit: Overlapping edits detected at byte 4"
        );
    }

    #[test]
    fn test_apply_single_deletion() {
        let result = apply_fix("hello world", &TextEdit::delete(5, 11)).unwrap();
        assert_eq!(result, "hello");
    }

    #[test]
    fn test_apply_edits_reversed_order() {
        let source = "abc def ghi";
        let edits = vec![
            TextEdit::replace(8, 11, "3".to_string()),
            TextEdit::replace(0, 3, "1".to_string()),
            TextEdit::replace(4, 7, "2".to_string()),
        ];
        let result = apply_fixes(source, &edits).unwrap();
        assert_eq!(result, "1 2 3");
    }

    #[test]
    fn test_insertions_at_one_offset_keep_list_order() {
        let source = "class C { }";
        let edits = vec![
            TextEdit::insert(0, "using A;\n".to_string()),
            TextEdit::replace(0, 5, "\nclass".to_string()),
            TextEdit::insert(0, "using B;\n".to_string()),
        ];
        let result = apply_fixes(source, &edits).unwrap();
        assert_eq!(result, "using A;\nusing B;\n\nclass C { }");
    }

    #[test]
    fn test_idempotency_no_edits() {
        let result = apply_fixes("unchanged", &[]).unwrap();
        assert_eq!(result, "unchanged");
    }

    #[test]
    fn test_identical_trees_have_no_edits() {
        let tree = parse_csharp("class C\n{\n}\n").unwrap();
        assert!(text_edits(&tree, &tree.clone()).is_empty());
    }

    #[test]
    fn test_diff_is_local_to_the_changed_node() {
        let source = "class C\n{\n    bool M(object o)\n    {\n        return o.Equals(1);\n    }\n}\n";
        let old = parse_csharp(source).unwrap();
        let name = old
            .nodes()
            .find(|node| node.kind() == SyntaxKind::IdentifierName && node.text() == "Equals")
            .unwrap();
        let new = old.replace(
            name.id(),
            make::identifier_name("ReferenceEquals").with_trivia_from(name.green()),
        );

        let edits = text_edits(&old, &new);
        let start = source.find("Equals").unwrap();
        assert_eq!(
            edits,
            vec![TextEdit::replace(start, start + 6, "ReferenceEquals".to_string())]
        );
        assert_eq!(apply_fixes(source, &edits).unwrap(), new.text());
    }

    #[test]
    fn test_inserted_children_become_insertions() {
        let source = "using System;\n\nclass C\n{\n}\n";
        let old = parse_csharp(source).unwrap();
        let directive = old.root().child_nodes().next().unwrap();
        let new = old.insert_children(
            old.root().id(),
            directive.index_in_parent() + 1,
            vec![directive.green().clone()],
        );

        let edits = text_edits(&old, &new);
        assert_eq!(
            edits,
            vec![TextEdit::insert(14, "using System;\n".to_string())]
        );
        assert_eq!(apply_fixes(source, &edits).unwrap(), new.text());
    }
}
