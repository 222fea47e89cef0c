use std::fmt;

use serde::{Deserialize, Serialize};

use crate::syntax::TextSpan;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SymbolId(u32);

impl SymbolId {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DocumentId(u32);

impl DocumentId {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Accessibility {
    #[default]
    Public,
    Internal,
    Protected,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
    Module,
    Enum,
}

/// Types the binder knows by keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpecialType {
    Object,
    Boolean,
    Char,
    Byte,
    Int16,
    Int32,
    Int64,
    Single,
    Double,
    Decimal,
    String,
    Void,
}

impl SpecialType {
    pub const ALL: [SpecialType; 12] = [
        SpecialType::Object,
        SpecialType::Boolean,
        SpecialType::Char,
        SpecialType::Byte,
        SpecialType::Int16,
        SpecialType::Int32,
        SpecialType::Int64,
        SpecialType::Single,
        SpecialType::Double,
        SpecialType::Decimal,
        SpecialType::String,
        SpecialType::Void,
    ];

    pub fn metadata_name(self) -> &'static str {
        match self {
            SpecialType::Object => "System.Object",
            SpecialType::Boolean => "System.Boolean",
            SpecialType::Char => "System.Char",
            SpecialType::Byte => "System.Byte",
            SpecialType::Int16 => "System.Int16",
            SpecialType::Int32 => "System.Int32",
            SpecialType::Int64 => "System.Int64",
            SpecialType::Single => "System.Single",
            SpecialType::Double => "System.Double",
            SpecialType::Decimal => "System.Decimal",
            SpecialType::String => "System.String",
            SpecialType::Void => "System.Void",
        }
    }
}

/// A resolved type: a named type applied to arguments, or a type parameter.
///
/// Two `Ty` values are the same type exactly when they are structurally
/// equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Ty {
    Named {
        symbol: SymbolId,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<Ty>,
    },
    Param(SymbolId),
}

impl Ty {
    pub fn named(symbol: SymbolId) -> Self {
        Ty::Named {
            symbol,
            args: Vec::new(),
        }
    }

    pub fn generic(symbol: SymbolId, args: Vec<Ty>) -> Self {
        Ty::Named { symbol, args }
    }

    pub fn param(symbol: SymbolId) -> Self {
        Ty::Param(symbol)
    }

    /// The named type's definition or the type parameter.
    pub fn symbol(&self) -> SymbolId {
        match self {
            Ty::Named { symbol, .. } | Ty::Param(symbol) => *symbol,
        }
    }

    pub fn as_type_parameter(&self) -> Option<SymbolId> {
        match self {
            Ty::Param(symbol) => Some(*symbol),
            Ty::Named { .. } => None,
        }
    }

    fn collect_symbols(&self, out: &mut Vec<SymbolId>) {
        out.push(self.symbol());
        if let Ty::Named { args, .. } = self {
            for arg in args {
                arg.collect_symbols(out);
            }
        }
    }
}

/// Where a symbol is declared in source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SyntaxReference {
    pub document: DocumentId,
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SymbolKind {
    Namespace,
    NamedType {
        type_kind: TypeKind,
        #[serde(default)]
        type_parameters: Vec<SymbolId>,
        #[serde(default)]
        special: Option<SpecialType>,
    },
    Method {
        #[serde(default)]
        parameters: Vec<Ty>,
        #[serde(default)]
        overridden: Option<SymbolId>,
        #[serde(default)]
        type_parameters: Vec<SymbolId>,
    },
    TypeParameter {
        #[serde(default)]
        constraints: Vec<Ty>,
    },
    Field {
        ty: Ty,
    },
    Property {
        ty: Ty,
    },
    Local {
        ty: Ty,
    },
    Parameter {
        ty: Ty,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    #[serde(default)]
    pub container: Option<SymbolId>,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub accessibility: Accessibility,
    #[serde(default)]
    pub declarations: Vec<SyntaxReference>,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind) -> Self {
        Self {
            name: name.into(),
            kind,
            container: None,
            is_static: false,
            accessibility: Accessibility::Public,
            declarations: Vec::new(),
        }
    }

    #[must_use]
    pub fn in_container(mut self, container: SymbolId) -> Self {
        self.container = Some(container);
        self
    }

    #[must_use]
    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn is_namespace(&self) -> bool {
        matches!(self.kind, SymbolKind::Namespace)
    }

    pub fn is_named_type(&self) -> bool {
        matches!(self.kind, SymbolKind::NamedType { .. })
    }

    pub fn is_method(&self) -> bool {
        matches!(self.kind, SymbolKind::Method { .. })
    }

    pub fn is_type_parameter(&self) -> bool {
        matches!(self.kind, SymbolKind::TypeParameter { .. })
    }

    pub fn type_kind(&self) -> Option<TypeKind> {
        match &self.kind {
            SymbolKind::NamedType { type_kind, .. } => Some(*type_kind),
            _ => None,
        }
    }

    pub fn special(&self) -> Option<SpecialType> {
        match &self.kind {
            SymbolKind::NamedType { special, .. } => *special,
            _ => None,
        }
    }

    pub fn type_parameters(&self) -> &[SymbolId] {
        match &self.kind {
            SymbolKind::NamedType {
                type_parameters, ..
            }
            | SymbolKind::Method {
                type_parameters, ..
            } => type_parameters,
            _ => &[],
        }
    }

    pub fn arity(&self) -> usize {
        self.type_parameters().len()
    }

    pub fn parameters(&self) -> &[Ty] {
        match &self.kind {
            SymbolKind::Method { parameters, .. } => parameters,
            _ => &[],
        }
    }

    pub fn overridden(&self) -> Option<SymbolId> {
        match &self.kind {
            SymbolKind::Method { overridden, .. } => *overridden,
            _ => None,
        }
    }

    pub fn constraints(&self) -> &[Ty] {
        match &self.kind {
            SymbolKind::TypeParameter { constraints } => constraints,
            _ => &[],
        }
    }

    /// Declared type of a field, property, local or parameter.
    pub fn value_type(&self) -> Option<&Ty> {
        match &self.kind {
            SymbolKind::Field { ty }
            | SymbolKind::Property { ty }
            | SymbolKind::Local { ty }
            | SymbolKind::Parameter { ty } => Some(ty),
            _ => None,
        }
    }

    /// Every symbol this one refers to.
    pub fn references(&self) -> Vec<SymbolId> {
        let mut out: Vec<SymbolId> = self.container.into_iter().collect();
        match &self.kind {
            SymbolKind::Namespace => {}
            SymbolKind::NamedType {
                type_parameters, ..
            } => out.extend(type_parameters),
            SymbolKind::Method {
                parameters,
                overridden,
                type_parameters,
            } => {
                out.extend(type_parameters);
                out.extend(overridden);
                for parameter in parameters {
                    parameter.collect_symbols(&mut out);
                }
            }
            SymbolKind::TypeParameter { constraints } => {
                for constraint in constraints {
                    constraint.collect_symbols(&mut out);
                }
            }
            SymbolKind::Field { ty }
            | SymbolKind::Property { ty }
            | SymbolKind::Local { ty }
            | SymbolKind::Parameter { ty } => ty.collect_symbols(&mut out),
        }
        out
    }
}

pub(crate) fn ty_references(ty: &Ty, out: &mut Vec<SymbolId>) {
    ty.collect_symbols(out);
}
