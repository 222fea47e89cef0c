use tracing::debug;

use crate::actions::CodeAction;
use crate::context::AnalysisContext;
use crate::diagnostics::Diagnostic;
use crate::lang;
use crate::lint::{FixDescriptor, LintCategory, LintContext, LintDescriptor, LintRule};
use crate::semantic::{
    Accessibility, DocumentId, Operation, OperationKind, SemanticModel, SpecialType, SymbolId, Ty,
    root_definition,
};
use crate::syntax::{SyntaxNode, TextSpan};

// ============================================================================
// EqualsObjectLint - APC0001
// ============================================================================

pub struct EqualsObjectLint;

pub static EQUALS_OBJECT: LintDescriptor = LintDescriptor {
    name: "equals_object",
    code: "APC0001",
    title: "Don't use Equals(object)",
    category: LintCategory::CodeQuality,
    description: "Calls binding to `Object.Equals(object)` or `Object.Equals(object, object)` box value types and compare operands of unrelated types without complaint",
    message: "Use strongly typed equality on object.",
    fix: FixDescriptor::safe(
        "Use EqualityComparer<T>.Default, or constrain the type parameter to IEquatable<T>",
    ),
};

/// `System.Object.Equals(object)` and `System.Object.Equals(object, object)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalEqualityMethods {
    pub instance: SymbolId,
    pub static_equals: SymbolId,
}

impl CanonicalEqualityMethods {
    pub fn resolve<M: SemanticModel + ?Sized>(model: &M) -> Option<Self> {
        let object = model.special_type(SpecialType::Object)?;
        let object_ty = Ty::named(object);
        let find = |is_static: bool, arity: usize| {
            model.members(object).iter().copied().find(|&member| {
                model.symbol(member).is_some_and(|symbol| {
                    symbol.is_method()
                        && symbol.name == "Equals"
                        && symbol.is_static == is_static
                        && symbol.accessibility == Accessibility::Public
                        && symbol.parameters().len() == arity
                        && symbol.parameters().iter().all(|p| *p == object_ty)
                })
            })
        };
        Some(Self {
            instance: find(false, 1)?,
            static_equals: find(true, 2)?,
        })
    }

    /// Instance calls match through any chain of overrides; static calls
    /// must bind to the static method itself.
    pub fn matches<M: SemanticModel + ?Sized>(&self, model: &M, site: &ResolvedCallSite<'_>) -> bool {
        match site.instance {
            Some(_) => root_definition(model, site.target) == self.instance,
            None => site.target == self.static_equals,
        }
    }
}

/// A bound invocation, as far as the equality rule cares.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedCallSite<'o> {
    pub document: DocumentId,
    /// Span of the whole invocation.
    pub span: TextSpan,
    pub target: SymbolId,
    pub instance: Option<&'o Operation>,
    pub arguments: &'o [Operation],
}

impl<'o> ResolvedCallSite<'o> {
    pub fn resolve<M: SemanticModel + ?Sized>(
        model: &'o M,
        document: DocumentId,
        invocation: SyntaxNode<'_>,
    ) -> Option<Self> {
        let span = invocation.span();
        let operation = model.operation(document, span)?.strip_implicit_conversions();
        let OperationKind::Invocation {
            target,
            instance,
            arguments,
        } = &operation.kind
        else {
            return None;
        };
        Some(Self {
            document,
            span,
            target: *target,
            instance: instance.as_deref(),
            arguments,
        })
    }

    /// The compared values: receiver and argument, or both arguments of the
    /// static form.
    pub fn operands(&self) -> Option<(&'o Operation, &'o Operation)> {
        match self.instance {
            Some(instance) => Some((instance, self.arguments.first()?)),
            None => Some((self.arguments.first()?, self.arguments.get(1)?)),
        }
    }
}

impl LintRule for EqualsObjectLint {
    fn descriptor(&self) -> &'static LintDescriptor {
        &EQUALS_OBJECT
    }

    fn check_invocation(
        &self,
        analysis: &AnalysisContext<'_>,
        invocation: SyntaxNode<'_>,
        ctx: &mut LintContext<'_>,
    ) {
        let Some(canonical) = analysis.canonical_equality_methods() else {
            return;
        };
        let model = analysis.model();
        let document = ctx.document();
        let Some(site) = ResolvedCallSite::resolve(model, document.id, invocation) else {
            return;
        };
        if !canonical.matches(model, &site) {
            return;
        }

        let name = lang::surface(document.language()).method_name(invocation);
        debug!(
            document = %document.name,
            invocation = %site.span,
            is_static = site.instance.is_none(),
            "call binds to Object.Equals"
        );
        ctx.report(self.descriptor(), name.span(), vec![site.span]);
    }

    fn fixes<'a>(
        &self,
        analysis: &'a AnalysisContext<'a>,
        diagnostic: &Diagnostic,
    ) -> Vec<CodeAction<'a>> {
        crate::fixes::equality_fixes(analysis, diagnostic)
    }
}
