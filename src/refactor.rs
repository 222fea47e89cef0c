//! "Use qualified-static import": rewrites `Console.WriteLine(..)` to
//! `WriteLine(..)` and adds `using static System.Console;`.

use tracing::{debug, trace};

use crate::actions::{CancellationToken, ChangeSet, CodeAction};
use crate::context::AnalysisContext;
use crate::imports::ensure_import;
use crate::semantic::{Document, DocumentId, SemanticModel, Symbol, SymbolId, binds_uniquely, name_segments};
use crate::syntax::{Annotation, GreenElement, SyntaxKind, SyntaxNode, SyntaxTree, TextSpan};

pub const USE_STATIC_IMPORT: &str = "Use qualified-static import";

/// A member access or qualified name whose left side names a type and whose
/// trailing name is a static member or nested type of it.
#[derive(Debug, Clone, Copy)]
pub struct QualifiedReference<'t> {
    pub node: SyntaxNode<'t>,
    pub trailing: SyntaxNode<'t>,
    /// The type the new static import names.
    pub container: SymbolId,
    pub member: SymbolId,
}

/// The nearest member access around `selection`, else the nearest
/// qualified name.
pub fn locate(tree: &SyntaxTree, selection: TextSpan) -> Option<SyntaxNode<'_>> {
    let start = tree.covering_element(selection)?;
    start
        .ancestors_and_self()
        .find(|node| node.kind() == SyntaxKind::MemberAccessExpression)
        .or_else(|| {
            start
                .ancestors_and_self()
                .find(|node| node.kind() == SyntaxKind::QualifiedName)
        })
}

pub fn classify<'t, M: SemanticModel + ?Sized>(
    model: &M,
    document: DocumentId,
    node: SyntaxNode<'t>,
) -> Option<QualifiedReference<'t>> {
    let left = node.child_nodes().next()?;
    let trailing = node
        .child_nodes()
        .last()
        .filter(|name| name.kind().is_simple_name() && name.id() != left.id())?;

    let container = model.symbol_info(document, left.span())?;
    if !model.symbol(container).is_some_and(Symbol::is_named_type) {
        return None;
    }
    let member = model
        .symbol_info(document, trailing.span())
        .or_else(|| model.symbol_info(document, node.span()))?;
    let member_symbol = model.symbol(member)?;
    let importable = match node.kind() {
        SyntaxKind::MemberAccessExpression => {
            member_symbol.is_static || member_symbol.is_named_type()
        }
        _ => member_symbol.is_named_type(),
    };
    importable.then_some(QualifiedReference {
        node,
        trailing,
        container,
        member,
    })
}

/// True when, after importing the container statically, the bare trailing
/// name still binds to the member and nothing else.
fn survives_import<M: SemanticModel + ?Sized>(
    model: &M,
    tree: &SyntaxTree,
    reference: &QualifiedReference<'_>,
) -> bool {
    let Some(segment) = name_segments(reference.trailing).pop() else {
        return false;
    };
    let position = reference.node.span().start;
    let imported = ensure_import(model, tree, position, reference.container, true);
    let shift = imported.text().len() - tree.text().len();
    binds_uniquely(
        model,
        &imported,
        position + shift,
        &segment.name,
        reference.member,
        segment.arity,
    )
}

/// The refactor offered at `selection`, if any.
pub fn static_import_actions<'a>(
    analysis: &'a AnalysisContext<'a>,
    document: DocumentId,
    selection: TextSpan,
) -> Vec<CodeAction<'a>> {
    let model = analysis.model();
    let Some(document) = analysis.document(document) else {
        return Vec::new();
    };
    let tree = &document.tree;
    let Some(reference) = locate(tree, selection).and_then(|node| classify(model, document.id, node))
    else {
        return Vec::new();
    };
    if !survives_import(model, tree, &reference) {
        debug!(
            document = %document.name,
            reference = %reference.node.text(),
            "bare name would bind differently after the import"
        );
        return Vec::new();
    }

    let span = reference.node.span();
    let kind = reference.node.kind();
    vec![CodeAction::new(USE_STATIC_IMPORT, USE_STATIC_IMPORT, move |cancel| {
        let tree = apply(analysis, document, span, kind, cancel)?;
        Some(ChangeSet::single(document.id, tree))
    })]
}

fn apply(
    analysis: &AnalysisContext<'_>,
    document: &Document,
    span: TextSpan,
    kind: SyntaxKind,
    cancel: &CancellationToken,
) -> Option<SyntaxTree> {
    let model = analysis.model();
    let tree = &document.tree;
    let node = tree.node_at(span, kind)?;
    let reference = classify(model, document.id, node)?;
    if !survives_import(model, tree, &reference) || cancel.is_cancelled() {
        return None;
    }

    let edited = match analysis.simplifier() {
        Some(simplifier) => {
            let marked = node
                .green()
                .with_annotation(Annotation::AddImport(reference.container))
                .with_annotation(Annotation::Simplify(reference.member));
            let marked = tree.replace(node.id(), marked);
            simplifier.simplify(model, &marked)
        }
        None => {
            let short: GreenElement = reference.trailing.green().with_trivia_from(node.green());
            let shortened = tree.replace(node.id(), short);
            ensure_import(model, &shortened, span.start, reference.container, true)
        }
    };
    trace!(
        document = %document.name,
        reference = %node.text(),
        "replaced qualified reference with a static import"
    );
    (!cancel.is_cancelled()).then_some(edited)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parse_csharp;

    #[test]
    fn member_access_wins_over_qualified_name() {
        let source = "class C { void M() { System.Console.WriteLine(1); A.B x; } }";
        let tree = parse_csharp(source).unwrap();

        let at = |needle: &str| {
            let start = source.find(needle).unwrap();
            TextSpan::new(start, start + needle.len())
        };
        assert_eq!(
            locate(&tree, at("WriteLine")).map(|node| node.text()),
            Some("System.Console.WriteLine")
        );
        assert_eq!(
            locate(&tree, at("Console")).map(|node| node.text()),
            Some("System.Console")
        );
        assert_eq!(locate(&tree, at("B")).map(|node| node.text()), Some("A.B"));
        assert!(locate(&tree, at("void")).is_none());
    }
}
