use serde::{Deserialize, Serialize};

use super::symbols::ty_references;
use super::{SymbolId, Ty};
use crate::syntax::TextSpan;

/// A bound operation: what an expression means after binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub span: TextSpan,
    #[serde(default)]
    pub ty: Option<Ty>,
    #[serde(default)]
    pub is_implicit: bool,
    pub kind: OperationKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    Invocation {
        target: SymbolId,
        #[serde(default)]
        instance: Option<Box<Operation>>,
        #[serde(default)]
        arguments: Vec<Operation>,
    },
    Conversion {
        operand: Box<Operation>,
    },
    Literal,
    LocalReference {
        local: SymbolId,
    },
    ParameterReference {
        parameter: SymbolId,
    },
    FieldReference {
        field: SymbolId,
        #[serde(default)]
        instance: Option<Box<Operation>>,
    },
    InstanceReference,
    Other,
}

impl Operation {
    pub fn new(span: TextSpan, kind: OperationKind) -> Self {
        Self {
            span,
            ty: None,
            is_implicit: false,
            kind,
        }
    }

    #[must_use]
    pub fn with_type(mut self, ty: Ty) -> Self {
        self.ty = Some(ty);
        self
    }

    #[must_use]
    pub fn implicit(mut self) -> Self {
        self.is_implicit = true;
        self
    }

    pub fn invocation(
        span: TextSpan,
        target: SymbolId,
        instance: Option<Operation>,
        arguments: Vec<Operation>,
    ) -> Self {
        Self::new(
            span,
            OperationKind::Invocation {
                target,
                instance: instance.map(Box::new),
                arguments,
            },
        )
    }

    /// A conversion of `operand` to `ty`, spanning the operand's text.
    pub fn conversion(operand: Operation, ty: Ty, is_implicit: bool) -> Self {
        Self {
            span: operand.span,
            ty: Some(ty),
            is_implicit,
            kind: OperationKind::Conversion {
                operand: Box::new(operand),
            },
        }
    }

    pub fn literal(span: TextSpan, ty: Ty) -> Self {
        Self::new(span, OperationKind::Literal).with_type(ty)
    }

    pub fn local_reference(span: TextSpan, local: SymbolId, ty: Ty) -> Self {
        Self::new(span, OperationKind::LocalReference { local }).with_type(ty)
    }

    pub fn parameter_reference(span: TextSpan, parameter: SymbolId, ty: Ty) -> Self {
        Self::new(span, OperationKind::ParameterReference { parameter }).with_type(ty)
    }

    pub fn is_implicit_conversion(&self) -> bool {
        self.is_implicit && matches!(self.kind, OperationKind::Conversion { .. })
    }

    /// Peels implicit conversions; explicit conversions (casts) are kept.
    pub fn strip_implicit_conversions(&self) -> &Operation {
        let mut current = self;
        while let OperationKind::Conversion { operand } = &current.kind {
            if !current.is_implicit {
                break;
            }
            current = operand;
        }
        current
    }

    /// Direct child operations.
    pub fn children(&self) -> Vec<&Operation> {
        match &self.kind {
            OperationKind::Invocation {
                instance,
                arguments,
                ..
            } => instance.as_deref().into_iter().chain(arguments).collect(),
            OperationKind::Conversion { operand } => vec![operand.as_ref()],
            OperationKind::FieldReference { instance, .. } => instance.as_deref().into_iter().collect(),
            _ => Vec::new(),
        }
    }

    /// Preorder walk over this operation and every nested one.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Operation)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    /// Every symbol this operation tree refers to.
    pub fn references(&self) -> Vec<SymbolId> {
        let mut out = Vec::new();
        self.walk(&mut |operation| {
            if let Some(ty) = &operation.ty {
                ty_references(ty, &mut out);
            }
            match &operation.kind {
                OperationKind::Invocation { target, .. } => out.push(*target),
                OperationKind::LocalReference { local } => out.push(*local),
                OperationKind::ParameterReference { parameter } => out.push(*parameter),
                OperationKind::FieldReference { field, .. } => out.push(*field),
                _ => {}
            }
        });
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_stops_at_explicit_conversion() {
        let object = Ty::named(SymbolId::new(1));
        let int = Ty::named(SymbolId::new(2));
        let literal = Operation::literal(TextSpan::new(10, 11), int.clone());
        let cast = Operation::conversion(literal.clone(), object.clone(), false);
        let boxed = Operation::conversion(cast.clone(), object.clone(), true);
        assert_eq!(boxed.strip_implicit_conversions(), &cast);

        let boxed_literal = Operation::conversion(literal.clone(), object, true);
        assert_eq!(boxed_literal.strip_implicit_conversions(), &literal);
        assert_eq!(
            boxed_literal.strip_implicit_conversions().ty.as_ref(),
            Some(&int)
        );
    }
}
