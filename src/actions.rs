//! Code actions and the change sets they produce.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::semantic::DocumentId;
use crate::syntax::SyntaxTree;

/// New trees for every document an action touches. Built completely before
/// it is handed out, so a consumer never sees half of a multi-document edit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    documents: BTreeMap<DocumentId, SyntaxTree>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(document: DocumentId, tree: SyntaxTree) -> Self {
        let mut changes = Self::new();
        changes.insert(document, tree);
        changes
    }

    pub fn insert(&mut self, document: DocumentId, tree: SyntaxTree) {
        self.documents.insert(document, tree);
    }

    pub fn get(&self, document: DocumentId) -> Option<&SyntaxTree> {
        self.documents.get(&document)
    }

    pub fn text(&self, document: DocumentId) -> Option<&str> {
        self.get(document).map(SyntaxTree::text)
    }

    pub fn documents(&self) -> impl Iterator<Item = (DocumentId, &SyntaxTree)> + '_ {
        self.documents.iter().map(|(id, tree)| (*id, tree))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Cooperative cancellation shared between a host and running actions.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

type ComputeFn<'a> = dyn Fn(&CancellationToken) -> Option<ChangeSet> + Send + Sync + 'a;

/// An offered edit. Nothing is computed until `apply` runs.
pub struct CodeAction<'a> {
    pub title: String,
    /// Groups equivalent actions across diagnostics for fix-all.
    pub equivalence_key: String,
    compute: Box<ComputeFn<'a>>,
}

impl<'a> CodeAction<'a> {
    pub fn new(
        title: impl Into<String>,
        equivalence_key: impl Into<String>,
        compute: impl Fn(&CancellationToken) -> Option<ChangeSet> + Send + Sync + 'a,
    ) -> Self {
        Self {
            title: title.into(),
            equivalence_key: equivalence_key.into(),
            compute: Box::new(compute),
        }
    }

    pub fn apply(&self) -> Option<ChangeSet> {
        self.apply_with(&CancellationToken::new())
    }

    /// Runs the action. Returns `None` when the edit no longer applies or
    /// `cancel` fired.
    pub fn apply_with(&self, cancel: &CancellationToken) -> Option<ChangeSet> {
        if cancel.is_cancelled() {
            return None;
        }
        let changes = (self.compute)(cancel)?;
        if cancel.is_cancelled() || changes.is_empty() {
            return None;
        }
        Some(changes)
    }
}

impl fmt::Debug for CodeAction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeAction")
            .field("title", &self.title)
            .field("equivalence_key", &self.equivalence_key)
            .finish_non_exhaustive()
    }
}
