use std::fmt;
use std::sync::Arc;

use super::{Annotation, GreenElement, GreenNode, GreenToken, Language, SyntaxKind, TextSpan};

/// Preorder index of an element within one `SyntaxTree`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
struct Entry {
    element: GreenElement,
    parent: Option<NodeId>,
    index_in_parent: usize,
    children: Vec<NodeId>,
    full_start: usize,
    subtree_end: u32,
}

/// A positioned, immutable view over a green root.
///
/// Clones are cheap; edits return new trees that share unchanged green
/// subtrees with the original.
#[derive(Clone)]
pub struct SyntaxTree {
    language: Language,
    root: Arc<GreenNode>,
    entries: Arc<[Entry]>,
    text: Arc<str>,
}

impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("language", &self.language)
            .field("text", &self.text)
            .finish()
    }
}

impl PartialEq for SyntaxTree {
    fn eq(&self, other: &Self) -> bool {
        self.language == other.language && self.root == other.root
    }
}

impl SyntaxTree {
    pub fn new(language: Language, root: GreenNode) -> Self {
        Self::from_arc(language, Arc::new(root))
    }

    fn from_arc(language: Language, root: Arc<GreenNode>) -> Self {
        let mut entries = Vec::new();
        index_element(GreenElement::Node(root.clone()), None, 0, 0, &mut entries);
        let text = root.text();
        Self {
            language,
            root,
            entries: entries.into(),
            text: text.into(),
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn green_root(&self) -> &Arc<GreenNode> {
        &self.root
    }

    pub fn root(&self) -> SyntaxNode<'_> {
        SyntaxNode {
            tree: self,
            id: NodeId::ROOT,
        }
    }

    pub fn get(&self, id: NodeId) -> Option<SyntaxNode<'_>> {
        (id.index() < self.entries.len()).then_some(SyntaxNode { tree: self, id })
    }

    /// Every element of the tree, tokens included, in preorder.
    pub fn nodes(&self) -> impl Iterator<Item = SyntaxNode<'_>> + '_ {
        (0..self.entries.len()).map(move |index| SyntaxNode {
            tree: self,
            id: NodeId(index as u32),
        })
    }

    /// Innermost element whose span (trivia excluded) contains `span`.
    pub fn covering_element(&self, span: TextSpan) -> Option<SyntaxNode<'_>> {
        let mut current = self.root();
        if !current.full_span().contains_span(span) {
            return None;
        }
        loop {
            let next = current
                .children()
                .find(|child| child.span().contains_span(span) && !child.full_span().is_empty());
            match next {
                Some(child) => current = child,
                None => return Some(current),
            }
        }
    }

    /// Finds the node of `kind` whose span is exactly `span`.
    pub fn node_at(&self, span: TextSpan, kind: SyntaxKind) -> Option<SyntaxNode<'_>> {
        self.nodes()
            .find(|node| node.kind() == kind && node.span() == span)
    }

    /// The outermost node that shares the span of the innermost node
    /// covering `span`. Tokens resolve to their parent node.
    pub fn find_node(&self, span: TextSpan) -> Option<SyntaxNode<'_>> {
        let mut node = self.covering_element(span)?;
        if node.is_token() {
            node = node.parent()?;
        }
        while let Some(parent) = node.parent() {
            if parent.span() != node.span() || parent.id == NodeId::ROOT {
                break;
            }
            node = parent;
        }
        Some(node)
    }

    /// The outermost expression whose span is exactly `span`.
    pub fn expression_at(&self, span: TextSpan) -> Option<SyntaxNode<'_>> {
        let mut node = self.covering_element(span)?;
        if node.is_token() {
            node = node.parent()?;
        }
        if !node.kind().is_expression() || node.span() != span {
            return None;
        }
        while let Some(parent) = node.parent() {
            if parent.span() != span || !parent.kind().is_expression() {
                break;
            }
            node = parent;
        }
        Some(node)
    }

    /// Replaces the element `target` and rebuilds the path to the root.
    pub fn replace(&self, target: NodeId, replacement: GreenElement) -> SyntaxTree {
        let mut current = replacement;
        let mut id = target;
        while let Some(parent) = self.entries[id.index()].parent {
            let GreenElement::Node(parent_green) = &self.entries[parent.index()].element else {
                return self.clone();
            };
            let index = self.entries[id.index()].index_in_parent;
            current = GreenElement::Node(Arc::new(parent_green.replace_child(index, current)));
            id = parent;
        }
        match current {
            GreenElement::Node(root) => Self::from_arc(self.language, root),
            GreenElement::Token(_) => self.clone(),
        }
    }

    /// Inserts `elements` as children of `parent` starting at `index`.
    pub fn insert_children(
        &self,
        parent: NodeId,
        index: usize,
        elements: Vec<GreenElement>,
    ) -> SyntaxTree {
        let GreenElement::Node(node) = &self.entries[parent.index()].element else {
            return self.clone();
        };
        let updated = node.insert_children(index, elements);
        self.replace(parent, GreenElement::Node(Arc::new(updated)))
    }

    pub fn has_annotations(&self) -> bool {
        self.root.has_annotations()
    }

    pub fn strip_annotations(&self) -> SyntaxTree {
        if !self.has_annotations() {
            return self.clone();
        }
        Self::new(self.language, self.root.strip_annotations())
    }

    /// Nodes carrying at least one annotation, outermost first.
    pub fn annotated_nodes(&self) -> impl Iterator<Item = SyntaxNode<'_>> + '_ {
        self.nodes().filter(|node| !node.annotations().is_empty())
    }
}

fn index_element(
    element: GreenElement,
    parent: Option<NodeId>,
    index_in_parent: usize,
    full_start: usize,
    entries: &mut Vec<Entry>,
) -> NodeId {
    let id = NodeId(entries.len() as u32);
    let green_children: Vec<GreenElement> = match &element {
        GreenElement::Node(node) => node.children().to_vec(),
        GreenElement::Token(_) => Vec::new(),
    };
    entries.push(Entry {
        element,
        parent,
        index_in_parent,
        children: Vec::new(),
        full_start,
        subtree_end: 0,
    });
    let mut offset = full_start;
    let mut children = Vec::with_capacity(green_children.len());
    for (index, child) in green_children.into_iter().enumerate() {
        let len = child.full_len();
        children.push(index_element(child, Some(id), index, offset, entries));
        offset += len;
    }
    let subtree_end = entries.len() as u32;
    let entry = &mut entries[id.index()];
    entry.children = children;
    entry.subtree_end = subtree_end;
    id
}

/// Positioned cursor over one element of a `SyntaxTree`.
#[derive(Clone, Copy)]
pub struct SyntaxNode<'t> {
    tree: &'t SyntaxTree,
    id: NodeId,
}

impl PartialEq for SyntaxNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for SyntaxNode<'_> {}

impl fmt::Debug for SyntaxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{}", self.kind(), self.span())
    }
}

impl<'t> SyntaxNode<'t> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'t SyntaxTree {
        self.tree
    }

    fn entry(&self) -> &'t Entry {
        &self.tree.entries[self.id.index()]
    }

    pub fn kind(&self) -> SyntaxKind {
        self.entry().element.kind()
    }

    pub fn green(&self) -> &'t GreenElement {
        &self.entry().element
    }

    pub fn is_token(&self) -> bool {
        matches!(self.entry().element, GreenElement::Token(_))
    }

    pub fn annotations(&self) -> &'t [Annotation] {
        self.entry().element.annotations()
    }

    pub fn index_in_parent(&self) -> usize {
        self.entry().index_in_parent
    }

    pub fn full_span(&self) -> TextSpan {
        let start = self.entry().full_start;
        TextSpan::new(start, start + self.green().full_len())
    }

    /// Span without the outer leading and trailing trivia.
    pub fn span(&self) -> TextSpan {
        let full = self.full_span();
        let green = self.green();
        if green.first_token().is_none() {
            return TextSpan::empty(full.start);
        }
        let start = full.start + green.leading_trivia().len();
        let end = full.end - green.trailing_trivia().len();
        TextSpan::new(start, end.max(start))
    }

    pub fn text(&self) -> &'t str {
        let span = self.span();
        &self.tree.text()[span.start..span.end]
    }

    pub fn full_text(&self) -> &'t str {
        let span = self.full_span();
        &self.tree.text()[span.start..span.end]
    }

    pub fn token(&self) -> Option<&'t GreenToken> {
        self.green().as_token().map(|token| token.as_ref())
    }

    pub fn parent(&self) -> Option<SyntaxNode<'t>> {
        let tree = self.tree;
        self.entry().parent.map(|id| SyntaxNode { tree, id })
    }

    /// Strict ancestors, innermost first.
    pub fn ancestors(&self) -> impl Iterator<Item = SyntaxNode<'t>> + 't + use<'t> {
        std::iter::successors(self.parent(), |node| node.parent())
    }

    pub fn ancestors_and_self(&self) -> impl Iterator<Item = SyntaxNode<'t>> + 't + use<'t> {
        std::iter::successors(Some(*self), |node| node.parent())
    }

    /// Direct children, tokens included.
    pub fn children(&self) -> impl Iterator<Item = SyntaxNode<'t>> + 't + use<'t> {
        let tree = self.tree;
        self.entry()
            .children
            .iter()
            .map(move |&id| SyntaxNode { tree, id })
    }

    pub fn child_nodes(&self) -> impl Iterator<Item = SyntaxNode<'t>> + 't + use<'t> {
        self.children().filter(|child| !child.is_token())
    }

    pub fn child_tokens(&self) -> impl Iterator<Item = SyntaxNode<'t>> + 't + use<'t> {
        self.children().filter(|child| child.is_token())
    }

    pub fn child_of_kind(&self, kind: SyntaxKind) -> Option<SyntaxNode<'t>> {
        self.children().find(|child| child.kind() == kind)
    }

    /// Strict descendants in preorder.
    pub fn descendants(&self) -> impl Iterator<Item = SyntaxNode<'t>> + 't + use<'t> {
        let tree = self.tree;
        let start = self.id.0 + 1;
        let end = self.entry().subtree_end;
        (start..end).map(move |index| SyntaxNode {
            tree,
            id: NodeId(index),
        })
    }

    pub fn first_token(&self) -> Option<SyntaxNode<'t>> {
        if self.is_token() {
            return Some(*self);
        }
        self.descendants().find(|node| node.is_token())
    }

    pub fn last_token(&self) -> Option<SyntaxNode<'t>> {
        if self.is_token() {
            return Some(*self);
        }
        self.descendants().filter(|node| node.is_token()).last()
    }

    /// True when a direct child token spells `keyword` in this tree's
    /// language (VB keywords compare case-insensitively).
    pub fn has_keyword(&self, keyword: &str) -> bool {
        let language = self.tree.language();
        self.child_tokens().any(|token| {
            token.kind() == SyntaxKind::KeywordToken && language.names_equal(token.text(), keyword)
        })
    }

    /// The first identifier token among the direct children.
    pub fn identifier(&self) -> Option<SyntaxNode<'t>> {
        self.child_tokens()
            .find(|token| token.kind() == SyntaxKind::IdentifierToken)
    }
}
