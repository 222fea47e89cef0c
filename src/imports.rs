//! Import directive insertion shared by the code fixes and the refactor.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::lang;
use crate::semantic::lookup::is_static_directive;
use crate::semantic::{
    SemanticModel, SymbolId, directive_target, directives_in_scope, qualified_path,
};
use crate::syntax::{GreenElement, SyntaxKind, SyntaxNode, SyntaxTree};

/// How rewrites make sure the names they introduce are imported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ImportStrategy {
    /// The rewriter checks the existing directives and appends what is
    /// missing itself.
    #[default]
    Explicit,
    /// The rewriter emits fully qualified, annotated references and leaves
    /// imports and shortening to a `ReferenceSimplifier`.
    Simplifier,
}

impl ImportStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportStrategy::Explicit => "explicit",
            ImportStrategy::Simplifier => "simplifier",
        }
    }
}

/// Line break convention of a document.
pub fn line_ending(tree: &SyntaxTree) -> &'static str {
    if tree.text().contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

/// Top-level import directives of the compilation unit, in order.
pub fn import_directives(tree: &SyntaxTree) -> impl Iterator<Item = SyntaxNode<'_>> + '_ {
    tree.root()
        .child_nodes()
        .filter(|node| node.kind() == SyntaxKind::ImportDirective)
}

/// Whether a directive in scope at `position` already imports `target` in
/// the requested form. Namespace-level directives count for positions inside
/// that namespace.
pub fn has_import<M: SemanticModel + ?Sized>(
    model: &M,
    tree: &SyntaxTree,
    position: usize,
    target: SymbolId,
    is_static: bool,
) -> bool {
    let language = tree.language();
    let spelled = qualified_path(model, target).join(".");
    let directives = directives_in_scope(tree, position);
    directives.into_iter().any(|directive| match directive_target(model, directive) {
        Some(resolved) => {
            resolved == target && is_static_directive(model, directive, resolved) == is_static
        }
        // Directives naming something the model does not know still count
        // when they spell the same name.
        None => directive
            .child_nodes()
            .find(|child| child.kind().is_name())
            .is_some_and(|name| {
                let written: String = name.text().split_whitespace().collect();
                language.names_equal(&written, &spelled)
                    && (language != crate::syntax::Language::CSharp
                        || directive.has_keyword("static") == is_static)
            }),
    })
}

/// The dotted name of `target` as syntax, outermost segment first.
pub fn qualified_name_syntax<M: SemanticModel + ?Sized>(
    model: &M,
    tree: &SyntaxTree,
    target: SymbolId,
) -> Option<GreenElement> {
    let generator = lang::generator(tree.language());
    qualified_path(model, target)
        .iter()
        .map(|segment| generator.identifier_name(segment))
        .reduce(|left, right| generator.qualified_name(left, right))
}

/// Returns `tree` with an import of `target`, unless one is already in scope
/// at `position`.
///
/// The directive goes after the last existing one; without any, it becomes
/// the first element of the unit and takes over the unit's leading trivia.
pub fn ensure_import<M: SemanticModel + ?Sized>(
    model: &M,
    tree: &SyntaxTree,
    position: usize,
    target: SymbolId,
    is_static: bool,
) -> SyntaxTree {
    if has_import(model, tree, position, target, is_static) {
        return tree.clone();
    }
    let Some(name) = qualified_name_syntax(model, tree, target) else {
        return tree.clone();
    };
    let newline = line_ending(tree);
    let directive = lang::generator(tree.language())
        .import_directive(name, is_static)
        .with_trailing_trivia(newline);
    trace!(
        target = %qualified_path(model, target).join("."),
        is_static,
        "adding import directive"
    );

    let root = tree.root();
    match import_directives(tree).last() {
        Some(last) => {
            let directive = if last.green().trailing_trivia().ends_with('\n') {
                directive
            } else {
                directive.with_leading_trivia(newline)
            };
            tree.insert_children(root.id(), last.index_in_parent() + 1, vec![directive])
        }
        None => {
            let Some(green_root) = root.green().as_node() else {
                return tree.clone();
            };
            let Some(first) = green_root.children().first() else {
                return SyntaxTree::new(
                    tree.language(),
                    green_root.insert_children(0, [directive]),
                );
            };
            let directive = directive.with_leading_trivia(first.leading_trivia());
            let first = if first.kind() == SyntaxKind::EndOfFileToken {
                first.with_leading_trivia("")
            } else {
                first.with_leading_trivia(newline)
            };
            let updated = green_root
                .replace_child(0, first)
                .insert_children(0, [directive]);
            SyntaxTree::new(tree.language(), updated)
        }
    }
}
