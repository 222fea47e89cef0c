//! Symbols, types and bound operations, plus the narrow `SemanticModel`
//! interface the analyzers and rewriters consume.

mod compilation;
mod corlib;
pub mod lookup;
mod operations;
mod symbols;

pub use compilation::{Compilation, CompilationBuilder, Document};
pub use corlib::CoreLibrary;
pub use lookup::{
    NameSegment, binds_uniquely, directive_target, directives_in_scope, name_segments, resolve_path,
};
pub use operations::{Operation, OperationKind};
pub use symbols::{
    Accessibility, DocumentId, SpecialType, Symbol, SymbolId, SymbolKind, SyntaxReference, Ty,
    TypeKind,
};

use crate::syntax::{SyntaxTree, TextSpan};

/// Read-only view of a bound compilation.
///
/// `Compilation` is the in-memory implementation; hosts with their own binder
/// implement the required methods and inherit lookup by metadata name and
/// scope-based name lookup.
pub trait SemanticModel: Sync {
    fn documents(&self) -> &[Document];

    fn symbol(&self, id: SymbolId) -> Option<&Symbol>;

    /// Symbols whose container is `container`, in declaration order.
    fn members(&self, container: SymbolId) -> &[SymbolId];

    fn global_namespace(&self) -> SymbolId;

    fn special_type(&self, special: SpecialType) -> Option<SymbolId>;

    /// The outermost bound operation whose span is exactly `span`.
    fn operation(&self, document: DocumentId, span: TextSpan) -> Option<&Operation>;

    /// The symbol the name at `span` binds to.
    fn symbol_info(&self, document: DocumentId, span: TextSpan) -> Option<SymbolId>;

    fn document(&self, id: DocumentId) -> Option<&Document> {
        self.documents().iter().find(|document| document.id == id)
    }

    fn type_by_metadata_name(&self, metadata_name: &str) -> Option<SymbolId> {
        lookup::type_by_metadata_name(self, metadata_name)
    }

    /// Symbols named `name` visible at `position` in `tree`, from the
    /// innermost scope that declares or imports any.
    fn lookup_name(&self, tree: &SyntaxTree, position: usize, name: &str) -> Vec<SymbolId> {
        lookup::lookup_name(self, tree, position, name)
    }
}

/// Names from the outermost namespace down to `id`, global namespace excluded.
pub fn qualified_path<M: SemanticModel + ?Sized>(model: &M, id: SymbolId) -> Vec<String> {
    let global = model.global_namespace();
    let mut path = Vec::new();
    let mut current = Some(id);
    while let Some(symbol_id) = current {
        if symbol_id == global {
            break;
        }
        let Some(symbol) = model.symbol(symbol_id) else {
            break;
        };
        path.push(symbol.name.clone());
        current = symbol.container;
    }
    path.reverse();
    path
}

/// The nearest namespace containing `id`.
pub fn containing_namespace<M: SemanticModel + ?Sized>(model: &M, id: SymbolId) -> Option<SymbolId> {
    let mut current = model.symbol(id)?.container;
    while let Some(container) = current {
        let symbol = model.symbol(container)?;
        if symbol.is_namespace() {
            return Some(container);
        }
        current = symbol.container;
    }
    None
}

/// Follows `overridden` links to the method that introduced the slot.
pub fn root_definition<M: SemanticModel + ?Sized>(model: &M, method: SymbolId) -> SymbolId {
    let mut current = method;
    let mut seen = vec![method];
    while let Some(base) = model.symbol(current).and_then(Symbol::overridden) {
        // A malformed snapshot may link a cycle.
        if seen.contains(&base) {
            break;
        }
        seen.push(base);
        current = base;
    }
    current
}

/// Human-readable rendering of a type, used in log events.
pub fn display_type<M: SemanticModel + ?Sized>(model: &M, ty: &Ty) -> String {
    match ty {
        Ty::Param(symbol) => model
            .symbol(*symbol)
            .map_or_else(|| symbol.to_string(), |s| s.name.clone()),
        Ty::Named { symbol, args } => {
            let name = qualified_path(model, *symbol).join(".");
            if args.is_empty() {
                name
            } else {
                let args: Vec<String> = args.iter().map(|arg| display_type(model, arg)).collect();
                format!("{name}<{}>", args.join(", "))
            }
        }
    }
}
