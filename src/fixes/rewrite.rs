use tracing::trace;

use super::strategy::{EQUALITY_COMPARER, IEQUATABLE, generic_type};
use crate::actions::{CancellationToken, ChangeSet};
use crate::context::AnalysisContext;
use crate::imports::{ensure_import, qualified_name_syntax};
use crate::lang;
use crate::rules::ResolvedCallSite;
use crate::semantic::{
    Document, SemanticModel, Symbol, SymbolId, SyntaxReference, Ty, TypeKind, binds_uniquely,
};
use crate::syntax::{Annotation, GreenElement, SyntaxKind, SyntaxNode, SyntaxTree, TextSpan};

/// The syntax of both compared operands, provided it sits inside the
/// invocation. A conditional-access receiver (`o?.Equals(x)`) or the
/// `With` target of a receiver-less VB call cannot be moved into the
/// replacement.
pub(super) fn operand_syntax<'t>(
    tree: &'t SyntaxTree,
    site: &ResolvedCallSite<'_>,
) -> Option<(SyntaxNode<'t>, SyntaxNode<'t>)> {
    let (left, right) = site.operands()?;
    let locate = |span: TextSpan| {
        if span.is_empty() || !site.span.contains_span(span) {
            return None;
        }
        tree.expression_at(span)
    };
    Some((locate(left.span)?, locate(right.span)?))
}

/// `left.Equals(right)` becomes `EqualityComparer<T>.Default.Equals(left, right)`.
pub(super) fn use_typed_comparer(
    analysis: &AnalysisContext<'_>,
    document: &Document,
    location: TextSpan,
    ty: &Ty,
    cancel: &CancellationToken,
) -> Option<SyntaxTree> {
    let model = analysis.model();
    let tree = &document.tree;
    let invocation = tree.node_at(location, SyntaxKind::InvocationExpression)?;
    let site = ResolvedCallSite::resolve(model, document.id, invocation)?;
    let (left, right) = operand_syntax(tree, &site)?;
    let comparer = generic_type(model, EQUALITY_COMPARER, None)?;
    let comparer_ty = Ty::generic(comparer, vec![ty.clone()]);

    let mut namer = TypeNamer::new(model, tree, location.start);
    let comparer_syntax = match analysis.simplifier() {
        Some(_) => qualified_spelling(model, tree, &comparer_ty)?,
        None => namer.spell(&comparer_ty)?,
    };
    if cancel.is_cancelled() {
        return None;
    }

    let generator = lang::generator(tree.language());
    let default = generator.member_access(comparer_syntax, generator.identifier_name("Default"));
    let equals = generator.member_access(default, generator.identifier_name("Equals"));
    let replacement = generator
        .invocation(equals, vec![left.green().clone(), right.green().clone()])
        .with_trivia_from(invocation.green());
    trace!(
        document = %document.name,
        invocation = %location,
        replacement = %replacement.trimmed_text(),
        "rewrote Equals call"
    );
    let edited = tree.replace(invocation.id(), replacement);
    if cancel.is_cancelled() {
        return None;
    }
    Some(finish(analysis, &namer, edited))
}

/// Adds `where T : IEquatable<T>` (`T As IEquatable(Of T)`) at the type
/// parameter's declaration, which may live in another document.
pub(super) fn add_equatable_constraint(
    analysis: &AnalysisContext<'_>,
    type_parameter: SymbolId,
    declaration: SyntaxReference,
    cancel: &CancellationToken,
) -> Option<ChangeSet> {
    let model = analysis.model();
    let document = analysis.document(declaration.document)?;
    let tree = &document.tree;
    let parameter = tree.node_at(declaration.span, SyntaxKind::TypeParameter)?;
    let iequatable = generic_type(model, IEQUATABLE, Some(TypeKind::Interface))?;
    let constraint_ty = Ty::generic(iequatable, vec![Ty::param(type_parameter)]);

    let mut namer = TypeNamer::new(model, tree, declaration.span.start);
    let constraint = match analysis.simplifier() {
        Some(_) => qualified_spelling(model, tree, &constraint_ty)?,
        None => namer.spell(&constraint_ty)?,
    };
    if cancel.is_cancelled() {
        return None;
    }

    let edited = lang::generator(tree.language()).add_type_constraint(
        tree,
        parameter.id(),
        constraint,
    )?;
    trace!(
        document = %document.name,
        type_parameter = %parameter.text(),
        "added IEquatable constraint"
    );
    if cancel.is_cancelled() {
        return None;
    }
    Some(ChangeSet::single(
        declaration.document,
        finish(analysis, &namer, edited),
    ))
}

fn finish(analysis: &AnalysisContext<'_>, namer: &TypeNamer<'_>, edited: SyntaxTree) -> SyntaxTree {
    match analysis.simplifier() {
        Some(simplifier) => simplifier.simplify(analysis.model(), &edited),
        None => namer.apply_imports(&edited),
    }
}

/// Spells types as they would be written at one position of a document.
///
/// A name is written short when it binds to the intended type there, if
/// need be after importing the type's namespace; the namespaces imported
/// that way are collected for `apply_imports`. Anything else is written
/// qualified.
pub(crate) struct TypeNamer<'m> {
    model: &'m dyn SemanticModel,
    tree: SyntaxTree,
    origin: usize,
    position: usize,
    imports: Vec<SymbolId>,
}

impl<'m> TypeNamer<'m> {
    pub(crate) fn new(model: &'m dyn SemanticModel, tree: &SyntaxTree, position: usize) -> Self {
        Self {
            model,
            tree: tree.clone(),
            origin: position,
            position,
            imports: Vec::new(),
        }
    }

    pub(crate) fn spell(&mut self, ty: &Ty) -> Option<GreenElement> {
        let model = self.model;
        let generator = lang::generator(self.tree.language());
        match ty {
            Ty::Param(symbol) => Some(generator.identifier_name(&model.symbol(*symbol)?.name)),
            Ty::Named { symbol, args } => {
                let named = model.symbol(*symbol)?;
                if args.is_empty()
                    && let Some(keyword) = named.special().and_then(|s| generator.predefined_type(s))
                {
                    return Some(keyword);
                }
                let arguments = args
                    .iter()
                    .map(|arg| self.spell(arg))
                    .collect::<Option<Vec<_>>>()?;
                let short = if arguments.is_empty() {
                    generator.identifier_name(&named.name)
                } else {
                    generator.generic_name(&named.name, arguments)
                };
                if self.binds_short(*symbol, named, args.len()) {
                    return Some(short);
                }
                match named.container {
                    Some(container) if container != model.global_namespace() => {
                        let qualifier = qualified_name_syntax(model, &self.tree, container)?;
                        Some(generator.qualified_name(qualifier, short))
                    }
                    _ => Some(short),
                }
            }
        }
    }

    fn binds_short(&mut self, symbol: SymbolId, named: &Symbol, arity: usize) -> bool {
        let model = self.model;
        if binds_uniquely(model, &self.tree, self.position, &named.name, symbol, arity) {
            return true;
        }
        let Some(namespace) = named.container.filter(|&container| {
            container != model.global_namespace()
                && model.symbol(container).is_some_and(Symbol::is_namespace)
        }) else {
            return false;
        };
        let imported = ensure_import(model, &self.tree, self.position, namespace, false);
        let position = self.position + (imported.text().len() - self.tree.text().len());
        if !binds_uniquely(model, &imported, position, &named.name, symbol, arity) {
            return false;
        }
        self.tree = imported;
        self.position = position;
        self.imports.push(namespace);
        true
    }

    /// Adds the imports the short spellings rely on. `tree` must keep the
    /// text before the namer's position unchanged.
    pub(crate) fn apply_imports(&self, tree: &SyntaxTree) -> SyntaxTree {
        let mut position = self.origin;
        let mut current = tree.clone();
        for &namespace in &self.imports {
            let imported = ensure_import(self.model, &current, position, namespace, false);
            position += imported.text().len() - current.text().len();
            current = imported;
        }
        current
    }
}

/// Fully qualified spelling with every qualified name marked for the
/// reference simplifier.
fn qualified_spelling(model: &dyn SemanticModel, tree: &SyntaxTree, ty: &Ty) -> Option<GreenElement> {
    let generator = lang::generator(tree.language());
    match ty {
        Ty::Param(symbol) => Some(generator.identifier_name(&model.symbol(*symbol)?.name)),
        Ty::Named { symbol, args } => {
            let named = model.symbol(*symbol)?;
            if args.is_empty()
                && let Some(keyword) = named.special().and_then(|s| generator.predefined_type(s))
            {
                return Some(keyword);
            }
            let arguments = args
                .iter()
                .map(|arg| qualified_spelling(model, tree, arg))
                .collect::<Option<Vec<_>>>()?;
            let short = if arguments.is_empty() {
                generator.identifier_name(&named.name)
            } else {
                generator.generic_name(&named.name, arguments)
            };
            match named.container {
                Some(container) if container != model.global_namespace() => {
                    let qualifier = qualified_name_syntax(model, tree, container)?;
                    Some(
                        generator
                            .qualified_name(qualifier, short)
                            .with_annotation(Annotation::Simplify(*symbol)),
                    )
                }
                _ => Some(short),
            }
        }
    }
}
