//! Host-side reference simplification.
//!
//! Rewriters that run with `ImportStrategy::Simplifier` emit fully qualified
//! references carrying `Annotation::Simplify` (and `Annotation::AddImport`
//! for imports they need regardless). A `ReferenceSimplifier` turns those
//! into the shortest form that still binds to the same symbol.

use std::sync::Arc;

use tracing::trace;

use crate::imports::ensure_import;
use crate::semantic::{SemanticModel, Symbol, SymbolId, binds_uniquely, name_segments};
use crate::syntax::{Annotation, GreenElement, SyntaxKind, SyntaxTree, TextSpan};

pub trait ReferenceSimplifier: Send + Sync {
    /// Resolves every annotation in `tree` and returns the tree without
    /// annotations.
    fn simplify(&self, model: &dyn SemanticModel, tree: &SyntaxTree) -> SyntaxTree;
}

/// Simplifies against the model's scope-based name lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScopeSimplifier;

impl ReferenceSimplifier for ScopeSimplifier {
    fn simplify(&self, model: &dyn SemanticModel, tree: &SyntaxTree) -> SyntaxTree {
        let mut current = tree.clone();
        // Outermost first; each pass clears one node's annotations.
        loop {
            let Some(node) = current.annotated_nodes().next() else {
                break;
            };
            let span = node.span();
            let kind = node.kind();
            let annotations = node.annotations().to_vec();
            let Some(green) = node.green().as_node() else {
                break;
            };
            let cleared = GreenElement::Node(Arc::new(green.without_annotations()));
            let before = current.replace(node.id(), cleared);

            let mut next = before.clone();
            for annotation in &annotations {
                if let Annotation::AddImport(target) = annotation {
                    let is_static = model.symbol(*target).is_some_and(Symbol::is_named_type);
                    let position = span.start + (next.text().len() - before.text().len());
                    next = ensure_import(model, &next, position, *target, is_static);
                }
            }
            let shift = next.text().len() - before.text().len();
            for annotation in &annotations {
                if let Annotation::Simplify(symbol) = annotation {
                    if let Some(reduced) = reduce(model, &next, span.shifted(shift), kind, *symbol) {
                        next = reduced;
                    }
                }
            }
            current = next;
        }
        current.strip_annotations()
    }
}

/// Replaces the qualified reference at `span` with its trailing name when
/// that name binds to `symbol` alone, importing the symbol's namespace if
/// that is what it takes.
fn reduce(
    model: &dyn SemanticModel,
    tree: &SyntaxTree,
    span: TextSpan,
    kind: SyntaxKind,
    symbol: SymbolId,
) -> Option<SyntaxTree> {
    if !matches!(
        kind,
        SyntaxKind::QualifiedName | SyntaxKind::MemberAccessExpression
    ) {
        return None;
    }
    let node = tree.node_at(span, kind)?;
    let trailing = node
        .child_nodes()
        .last()
        .filter(|name| name.kind().is_simple_name())?;
    let segment = name_segments(trailing).pop()?;

    if binds_uniquely(model, tree, span.start, &segment.name, symbol, segment.arity) {
        trace!(name = %segment.name, "simplified qualified reference");
        let short = trailing.green().with_trivia_from(node.green());
        return Some(tree.replace(node.id(), short));
    }

    let container = model.symbol(symbol)?.container?;
    if container == model.global_namespace() || !model.symbol(container)?.is_namespace() {
        return None;
    }
    let imported = ensure_import(model, tree, span.start, container, false);
    let shift = imported.text().len() - tree.text().len();
    if !binds_uniquely(
        model,
        &imported,
        span.start + shift,
        &segment.name,
        symbol,
        segment.arity,
    ) {
        return None;
    }
    let node = imported.node_at(span.shifted(shift), kind)?;
    let trailing = node.child_nodes().last()?;
    trace!(name = %segment.name, "simplified qualified reference with a new import");
    let short = trailing.green().with_trivia_from(node.green());
    Some(imported.replace(node.id(), short))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imports::qualified_name_syntax;
    use crate::semantic::{CompilationBuilder, CoreLibrary};
    use crate::syntax::make;

    #[test]
    fn annotated_name_is_shortened_and_imported() {
        let source = "class C\n{\n    object M()\n    {\n        return x;\n    }\n}\n";
        let mut builder = CompilationBuilder::new();
        let corlib = CoreLibrary::install(&mut builder);
        let document = builder.add_document("a.cs", source).unwrap();
        let compilation = builder.build();
        let tree = &compilation.document(document).unwrap().tree;

        let target = tree
            .nodes()
            .find(|node| node.kind() == SyntaxKind::IdentifierName && node.text() == "x")
            .unwrap();
        let qualified = qualified_name_syntax(&compilation, tree, corlib.console)
            .unwrap()
            .with_annotation(Annotation::Simplify(corlib.console));
        let edited = tree.replace(target.id(), qualified);
        assert!(edited.has_annotations());
        assert!(edited.text().contains("return System.Console;"));

        let simplified = ScopeSimplifier.simplify(&compilation, &edited);
        assert!(!simplified.has_annotations());
        assert_eq!(
            simplified.text(),
            "using System;\n\nclass C\n{\n    object M()\n    {\n        return Console;\n    }\n}\n"
        );
    }

    #[test]
    fn names_that_would_not_bind_stay_qualified() {
        let source = "namespace App\n{\n    class Console { }\n\n    class C\n    {\n        void M()\n        {\n            x();\n        }\n    }\n}\n";
        let mut builder = CompilationBuilder::new();
        let corlib = CoreLibrary::install(&mut builder);
        let app = builder.namespace("App");
        builder.add_type(app, "Console", crate::semantic::TypeKind::Class);
        builder.add_type(app, "C", crate::semantic::TypeKind::Class);
        let document = builder.add_document("a.cs", source).unwrap();
        let compilation = builder.build();
        let tree = &compilation.document(document).unwrap().tree;

        let target = tree
            .nodes()
            .find(|node| node.kind() == SyntaxKind::IdentifierName && node.text() == "x")
            .unwrap();
        let qualified = qualified_name_syntax(&compilation, tree, corlib.console)
            .unwrap()
            .with_annotation(Annotation::Simplify(corlib.console));
        let parenthesized = make::node(
            SyntaxKind::ParenthesizedExpression,
            vec![make::punct("("), qualified, make::punct(")")],
        );
        let edited = tree.replace(target.id(), parenthesized);

        let simplified = ScopeSimplifier.simplify(&compilation, &edited);
        assert!(simplified.text().contains("(System.Console)();"));
        assert!(!simplified.text().contains("using"));
    }
}
