use tracing::debug;

use crate::rules::ResolvedCallSite;
use crate::semantic::{
    Operation, SemanticModel, SymbolId, SyntaxReference, Ty, TypeKind, display_type,
};

pub(crate) const EQUALITY_COMPARER: &str = "System.Collections.Generic.EqualityComparer`1";
pub(crate) const IEQUATABLE: &str = "System.IEquatable`1";

/// A rewrite that removes an `Equals(object)` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixStrategy {
    /// `EqualityComparer<T>.Default.Equals(left, right)`
    UseTypedComparer(Ty),
    /// Constrain the type parameter to `IEquatable<T>` so the call binds to
    /// the typed overload.
    AddConstraint {
        type_parameter: SymbolId,
        declaration: SyntaxReference,
    },
}

/// The rewrites that apply to `site`, comparer first.
pub fn select_strategies<M: SemanticModel + ?Sized>(
    model: &M,
    site: &ResolvedCallSite<'_>,
) -> Vec<FixStrategy> {
    let Some((left, right)) = site.operands() else {
        return Vec::new();
    };
    let Some(ty) = agreed_type(left, right) else {
        debug!(invocation = %site.span, "operands disagree on their type");
        return Vec::new();
    };

    let mut strategies = Vec::new();
    if generic_type(model, EQUALITY_COMPARER, None).is_some() {
        strategies.push(FixStrategy::UseTypedComparer(ty.clone()));
    }
    if let Some(type_parameter) = ty.as_type_parameter() {
        let declaration = single_unconstrained_declaration(model, type_parameter);
        if let Some(declaration) = declaration
            && generic_type(model, IEQUATABLE, Some(TypeKind::Interface)).is_some()
        {
            strategies.push(FixStrategy::AddConstraint {
                type_parameter,
                declaration,
            });
        }
    }
    debug!(
        invocation = %site.span,
        ty = %display_type(model, &ty),
        strategies = strategies.len(),
        "selected fix strategies"
    );
    strategies
}

/// The type both operands agree on. Operand types are compared with
/// implicit conversions removed first, then as converted, so `o.Equals(1)`
/// agrees on `object`.
fn agreed_type(left: &Operation, right: &Operation) -> Option<Ty> {
    let stripped = (
        left.strip_implicit_conversions().ty.as_ref(),
        right.strip_implicit_conversions().ty.as_ref(),
    );
    if let (Some(left), Some(right)) = stripped
        && left == right
    {
        return Some(left.clone());
    }
    match (left.ty.as_ref(), right.ty.as_ref()) {
        (Some(left), Some(right)) if left == right => Some(left.clone()),
        _ => None,
    }
}

/// Resolves a single-arity generic type by metadata name.
pub(crate) fn generic_type<M: SemanticModel + ?Sized>(
    model: &M,
    metadata_name: &str,
    kind: Option<TypeKind>,
) -> Option<SymbolId> {
    let id = model.type_by_metadata_name(metadata_name)?;
    let symbol = model.symbol(id)?;
    let kind_matches = kind.is_none_or(|kind| symbol.type_kind() == Some(kind));
    (symbol.arity() == 1 && kind_matches).then_some(id)
}

fn single_unconstrained_declaration<M: SemanticModel + ?Sized>(
    model: &M,
    type_parameter: SymbolId,
) -> Option<SyntaxReference> {
    let symbol = model.symbol(type_parameter)?;
    if !symbol.is_type_parameter() || !symbol.constraints().is_empty() {
        return None;
    }
    match symbol.declarations.as_slice() {
        [declaration] => Some(*declaration),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::{CompilationBuilder, CoreLibrary, DocumentId, Symbol, SymbolKind};
    use crate::syntax::TextSpan;

    fn call<'o>(
        target: SymbolId,
        instance: Option<&'o Operation>,
        arguments: &'o [Operation],
    ) -> ResolvedCallSite<'o> {
        ResolvedCallSite {
            document: DocumentId::new(0),
            span: TextSpan::new(0, 20),
            target,
            instance,
            arguments,
        }
    }

    fn boxed(operation: Operation, corlib: &CoreLibrary) -> Operation {
        Operation::conversion(operation, corlib.object_ty(), true)
    }

    #[test]
    fn boxed_literal_agrees_on_object() {
        let mut builder = CompilationBuilder::new();
        let corlib = CoreLibrary::install(&mut builder);
        let compilation = builder.build();

        let receiver = Operation::literal(TextSpan::new(0, 1), corlib.object_ty());
        let arguments = [boxed(
            Operation::literal(TextSpan::new(9, 10), corlib.int_ty()),
            &corlib,
        )];
        let site = call(corlib.object_equals, Some(&receiver), &arguments);
        assert_eq!(
            select_strategies(&compilation, &site),
            vec![FixStrategy::UseTypedComparer(corlib.object_ty())]
        );
    }

    #[test]
    fn explicit_casts_contribute_their_type() {
        let mut builder = CompilationBuilder::new();
        let corlib = CoreLibrary::install(&mut builder);
        let compilation = builder.build();

        let left = Operation::literal(TextSpan::new(0, 1), corlib.int_ty());
        let cast = Operation::conversion(
            Operation::literal(TextSpan::new(10, 11), corlib.object_ty()),
            corlib.int_ty(),
            false,
        );
        let arguments = [boxed(left, &corlib), boxed(cast, &corlib)];
        let site = call(corlib.object_static_equals, None, &arguments);
        assert_eq!(
            select_strategies(&compilation, &site),
            vec![FixStrategy::UseTypedComparer(corlib.int_ty())]
        );
    }

    #[test]
    fn mismatched_operands_get_no_fix() {
        let mut builder = CompilationBuilder::new();
        let corlib = CoreLibrary::install(&mut builder);
        let compilation = builder.build();

        let receiver = Operation::literal(TextSpan::new(0, 1), corlib.string_ty());
        let arguments = [boxed(
            Operation::literal(TextSpan::new(9, 10), corlib.int_ty()),
            &corlib,
        )];
        let site = call(corlib.string_equals_object, Some(&receiver), &arguments);
        assert!(select_strategies(&compilation, &site).is_empty());
    }

    #[test]
    fn unconstrained_type_parameter_gets_both_fixes() {
        let mut builder = CompilationBuilder::new();
        let corlib = CoreLibrary::install(&mut builder);
        let global = builder.global_namespace();
        let c = builder.add_type(global, "C", TypeKind::Class);
        let method = builder.add_method(c, "M", Vec::new(), false);
        let t = builder.add_type_parameter(method, "T");
        let declaration = SyntaxReference {
            document: DocumentId::new(0),
            span: TextSpan::new(30, 31),
        };
        builder.add_declaration(t, declaration.document, declaration.span);
        let compilation = builder.build();

        let receiver = Operation::literal(TextSpan::new(0, 1), Ty::param(t));
        let arguments = [boxed(
            Operation::literal(TextSpan::new(9, 10), Ty::param(t)),
            &corlib,
        )];
        let site = call(corlib.object_equals, Some(&receiver), &arguments);
        assert_eq!(
            select_strategies(&compilation, &site),
            vec![
                FixStrategy::UseTypedComparer(Ty::param(t)),
                FixStrategy::AddConstraint {
                    type_parameter: t,
                    declaration,
                },
            ]
        );
    }

    #[test]
    fn constrained_or_partial_type_parameters_only_get_the_comparer() {
        let mut builder = CompilationBuilder::new();
        let corlib = CoreLibrary::install(&mut builder);
        let global = builder.global_namespace();
        let c = builder.add_type(global, "C", TypeKind::Class);
        let constrained = builder.add_type_parameter(c, "T");
        builder.set_constraints(constrained, vec![Ty::named(corlib.object)]);
        builder.add_declaration(constrained, DocumentId::new(0), TextSpan::new(8, 9));
        let partial = builder.add_type_parameter(c, "U");
        builder.add_declaration(partial, DocumentId::new(0), TextSpan::new(11, 12));
        builder.add_declaration(partial, DocumentId::new(1), TextSpan::new(11, 12));
        let compilation = builder.build();

        for parameter in [constrained, partial] {
            let receiver = Operation::literal(TextSpan::new(0, 1), Ty::param(parameter));
            let arguments = [Operation::literal(TextSpan::new(9, 10), Ty::param(parameter))];
            let site = call(corlib.object_equals, Some(&receiver), &arguments);
            assert_eq!(
                select_strategies(&compilation, &site),
                vec![FixStrategy::UseTypedComparer(Ty::param(parameter))]
            );
        }
    }

    #[test]
    fn missing_comparer_type_suppresses_the_comparer_fix() {
        let mut builder = CompilationBuilder::new();
        let system = builder.namespace("System");
        let object = builder.add_symbol(
            Symbol::new(
                "Object",
                SymbolKind::NamedType {
                    type_kind: TypeKind::Class,
                    type_parameters: Vec::new(),
                    special: None,
                },
            )
            .in_container(system),
        );
        let equals = builder.add_method(object, "Equals", vec![Ty::named(object)], false);
        let compilation = builder.build();

        let receiver = Operation::literal(TextSpan::new(0, 1), Ty::named(object));
        let arguments = [Operation::literal(TextSpan::new(9, 10), Ty::named(object))];
        let site = call(equals, Some(&receiver), &arguments);
        assert!(select_strategies(&compilation, &site).is_empty());
    }
}
