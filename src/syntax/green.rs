use std::sync::Arc;

use super::SyntaxKind;
use crate::semantic::SymbolId;

/// Marker attached to a green node by a rewriter and consumed by the
/// reference simplifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Annotation {
    /// Reduce this qualified reference to its trailing name if that name
    /// still binds to the given symbol.
    Simplify(SymbolId),
    /// Make the given namespace or type available through an import.
    AddImport(SymbolId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GreenToken {
    kind: SyntaxKind,
    text: String,
    leading: String,
    trailing: String,
}

impl GreenToken {
    pub fn new(kind: SyntaxKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            leading: String::new(),
            trailing: String::new(),
        }
    }

    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn leading(&self) -> &str {
        &self.leading
    }

    pub fn trailing(&self) -> &str {
        &self.trailing
    }

    pub fn full_len(&self) -> usize {
        self.leading.len() + self.text.len() + self.trailing.len()
    }

    #[must_use]
    pub fn with_leading(mut self, trivia: impl Into<String>) -> Self {
        self.leading = trivia.into();
        self
    }

    #[must_use]
    pub fn with_trailing(mut self, trivia: impl Into<String>) -> Self {
        self.trailing = trivia.into();
        self
    }

    fn write_to(&self, out: &mut String) {
        out.push_str(&self.leading);
        out.push_str(&self.text);
        out.push_str(&self.trailing);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GreenNode {
    kind: SyntaxKind,
    children: Vec<GreenElement>,
    annotations: Vec<Annotation>,
    full_len: usize,
}

impl GreenNode {
    pub fn new(kind: SyntaxKind, children: Vec<GreenElement>) -> Self {
        let full_len = children.iter().map(GreenElement::full_len).sum();
        Self {
            kind,
            children,
            annotations: Vec::new(),
            full_len,
        }
    }

    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    pub fn children(&self) -> &[GreenElement] {
        &self.children
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn full_len(&self) -> usize {
        self.full_len
    }

    #[must_use]
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        if !self.annotations.contains(&annotation) {
            self.annotations.push(annotation);
        }
        self
    }

    /// Drops this node's own annotations; descendants keep theirs.
    #[must_use]
    pub fn without_annotations(&self) -> Self {
        Self {
            annotations: Vec::new(),
            ..self.clone()
        }
    }

    /// Deep copy without annotations anywhere in the subtree.
    #[must_use]
    pub fn strip_annotations(&self) -> Self {
        let children = self
            .children
            .iter()
            .map(|child| match child {
                GreenElement::Node(node) => GreenElement::Node(Arc::new(node.strip_annotations())),
                GreenElement::Token(_) => child.clone(),
            })
            .collect();
        Self::new(self.kind, children)
    }

    pub fn has_annotations(&self) -> bool {
        !self.annotations.is_empty()
            || self
                .children
                .iter()
                .any(|child| child.as_node().is_some_and(|node| node.has_annotations()))
    }

    #[must_use]
    pub fn replace_child(&self, index: usize, child: GreenElement) -> Self {
        let mut children = self.children.clone();
        children[index] = child;
        Self {
            annotations: self.annotations.clone(),
            ..Self::new(self.kind, children)
        }
    }

    #[must_use]
    pub fn insert_children(
        &self,
        index: usize,
        inserted: impl IntoIterator<Item = GreenElement>,
    ) -> Self {
        let mut children = self.children.clone();
        let index = index.min(children.len());
        children.splice(index..index, inserted);
        Self {
            annotations: self.annotations.clone(),
            ..Self::new(self.kind, children)
        }
    }

    pub fn first_token(&self) -> Option<&GreenToken> {
        self.children.iter().find_map(GreenElement::first_token)
    }

    pub fn last_token(&self) -> Option<&GreenToken> {
        self.children.iter().rev().find_map(GreenElement::last_token)
    }

    pub fn write_to(&self, out: &mut String) {
        for child in &self.children {
            child.write_to(out);
        }
    }

    /// Full text including leading and trailing trivia.
    pub fn text(&self) -> String {
        let mut out = String::with_capacity(self.full_len);
        self.write_to(&mut out);
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GreenElement {
    Node(Arc<GreenNode>),
    Token(Arc<GreenToken>),
}

#[derive(Clone, Copy)]
enum Edge {
    First,
    Last,
}

impl GreenElement {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            GreenElement::Node(node) => node.kind(),
            GreenElement::Token(token) => token.kind(),
        }
    }

    pub fn full_len(&self) -> usize {
        match self {
            GreenElement::Node(node) => node.full_len(),
            GreenElement::Token(token) => token.full_len(),
        }
    }

    pub fn as_node(&self) -> Option<&Arc<GreenNode>> {
        match self {
            GreenElement::Node(node) => Some(node),
            GreenElement::Token(_) => None,
        }
    }

    pub fn as_token(&self) -> Option<&Arc<GreenToken>> {
        match self {
            GreenElement::Token(token) => Some(token),
            GreenElement::Node(_) => None,
        }
    }

    pub fn annotations(&self) -> &[Annotation] {
        match self {
            GreenElement::Node(node) => node.annotations(),
            GreenElement::Token(_) => &[],
        }
    }

    pub fn first_token(&self) -> Option<&GreenToken> {
        match self {
            GreenElement::Node(node) => node.first_token(),
            GreenElement::Token(token) => Some(token),
        }
    }

    pub fn last_token(&self) -> Option<&GreenToken> {
        match self {
            GreenElement::Node(node) => node.last_token(),
            GreenElement::Token(token) => Some(token),
        }
    }

    pub fn leading_trivia(&self) -> &str {
        self.first_token().map_or("", GreenToken::leading)
    }

    pub fn trailing_trivia(&self) -> &str {
        self.last_token().map_or("", GreenToken::trailing)
    }

    #[must_use]
    pub fn with_leading_trivia(&self, trivia: impl Into<String>) -> GreenElement {
        let trivia = trivia.into();
        self.map_edge_token(Edge::First, &mut |token| {
            token.clone().with_leading(trivia.clone())
        })
    }

    #[must_use]
    pub fn with_trailing_trivia(&self, trivia: impl Into<String>) -> GreenElement {
        let trivia = trivia.into();
        self.map_edge_token(Edge::Last, &mut |token| {
            token.clone().with_trailing(trivia.clone())
        })
    }

    #[must_use]
    pub fn without_trivia(&self) -> GreenElement {
        self.with_leading_trivia("").with_trailing_trivia("")
    }

    /// Copies the outer leading and trailing trivia of `other` onto this element.
    #[must_use]
    pub fn with_trivia_from(&self, other: &GreenElement) -> GreenElement {
        self.with_leading_trivia(other.leading_trivia())
            .with_trailing_trivia(other.trailing_trivia())
    }

    /// Returns a copy carrying `annotation`. Tokens cannot be annotated and are
    /// returned unchanged.
    #[must_use]
    pub fn with_annotation(&self, annotation: Annotation) -> GreenElement {
        match self {
            GreenElement::Node(node) => {
                GreenElement::Node(Arc::new(node.as_ref().clone().with_annotation(annotation)))
            }
            GreenElement::Token(_) => self.clone(),
        }
    }

    pub fn write_to(&self, out: &mut String) {
        match self {
            GreenElement::Node(node) => node.write_to(out),
            GreenElement::Token(token) => token.write_to(out),
        }
    }

    pub fn text(&self) -> String {
        let mut out = String::with_capacity(self.full_len());
        self.write_to(&mut out);
        out
    }

    /// Text without the outer leading and trailing trivia.
    pub fn trimmed_text(&self) -> String {
        let full = self.text();
        let start = self.leading_trivia().len();
        let end = full.len() - self.trailing_trivia().len();
        full[start..end.max(start)].to_string()
    }

    fn map_edge_token(
        &self,
        edge: Edge,
        f: &mut dyn FnMut(&GreenToken) -> GreenToken,
    ) -> GreenElement {
        match self {
            GreenElement::Token(token) => GreenElement::Token(Arc::new(f(token))),
            GreenElement::Node(node) => {
                let has_token = |child: &GreenElement| child.first_token().is_some();
                let position = match edge {
                    Edge::First => node.children().iter().position(has_token),
                    Edge::Last => node.children().iter().rposition(has_token),
                };
                match position {
                    Some(index) => {
                        let child = node.children()[index].map_edge_token(edge, f);
                        GreenElement::Node(Arc::new(node.replace_child(index, child)))
                    }
                    None => self.clone(),
                }
            }
        }
    }
}

impl From<GreenNode> for GreenElement {
    fn from(node: GreenNode) -> Self {
        GreenElement::Node(Arc::new(node))
    }
}

impl From<GreenToken> for GreenElement {
    fn from(token: GreenToken) -> Self {
        GreenElement::Token(Arc::new(token))
    }
}
