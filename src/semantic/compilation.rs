use std::collections::HashMap;

use tracing::debug;

use super::{
    DocumentId, Operation, SemanticModel, SpecialType, Symbol, SymbolId, SymbolKind,
    SyntaxReference, Ty, TypeKind,
};
use crate::error::{SemfixError, SemfixResult};
use crate::frontend::{self, parse_document};
use crate::syntax::{Language, SyntaxTree, TextSpan};

/// A parsed document of a compilation.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: DocumentId,
    pub name: String,
    pub tree: SyntaxTree,
}

impl Document {
    pub fn language(&self) -> Language {
        self.tree.language()
    }

    pub fn text(&self) -> &str {
        self.tree.text()
    }

    pub fn is_generated(&self) -> bool {
        frontend::is_generated(&self.name, self.text())
    }
}

/// Immutable semantic snapshot of a set of documents.
#[derive(Debug)]
pub struct Compilation {
    documents: Vec<Document>,
    symbols: Vec<Symbol>,
    members: HashMap<SymbolId, Vec<SymbolId>>,
    global: SymbolId,
    special_types: HashMap<SpecialType, SymbolId>,
    operations: HashMap<(DocumentId, TextSpan), Operation>,
    bindings: HashMap<(DocumentId, TextSpan), SymbolId>,
    operation_roots: Vec<(DocumentId, Operation)>,
    binding_list: Vec<(DocumentId, TextSpan, SymbolId)>,
}

impl Compilation {
    pub fn builder() -> CompilationBuilder {
        CompilationBuilder::new()
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn document_by_name(&self, name: &str) -> Option<&Document> {
        self.documents.iter().find(|document| document.name == name)
    }

    /// Bound operation trees in the order they were added.
    pub fn operation_roots(&self) -> &[(DocumentId, Operation)] {
        &self.operation_roots
    }

    /// Name bindings in the order they were recorded.
    pub fn bindings(&self) -> &[(DocumentId, TextSpan, SymbolId)] {
        &self.binding_list
    }
}

impl SemanticModel for Compilation {
    fn documents(&self) -> &[Document] {
        &self.documents
    }

    fn document(&self, id: DocumentId) -> Option<&Document> {
        self.documents.get(id.index())
    }

    fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.index())
    }

    fn members(&self, container: SymbolId) -> &[SymbolId] {
        self.members.get(&container).map_or(&[], Vec::as_slice)
    }

    fn global_namespace(&self) -> SymbolId {
        self.global
    }

    fn special_type(&self, special: SpecialType) -> Option<SymbolId> {
        self.special_types.get(&special).copied()
    }

    fn operation(&self, document: DocumentId, span: TextSpan) -> Option<&Operation> {
        self.operations.get(&(document, span))
    }

    fn symbol_info(&self, document: DocumentId, span: TextSpan) -> Option<SymbolId> {
        self.bindings.get(&(document, span)).copied()
    }
}

/// Mutable staging area for a `Compilation`.
#[derive(Debug)]
pub struct CompilationBuilder {
    documents: Vec<Document>,
    symbols: Vec<Symbol>,
    operations: Vec<(DocumentId, Operation)>,
    bindings: Vec<(DocumentId, TextSpan, SymbolId)>,
    global: SymbolId,
}

impl Default for CompilationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CompilationBuilder {
    pub fn new() -> Self {
        Self {
            documents: Vec::new(),
            symbols: vec![Symbol::new("", SymbolKind::Namespace)],
            operations: Vec::new(),
            bindings: Vec::new(),
            global: SymbolId::new(0),
        }
    }

    /// Starts from an existing symbol table. The first namespace without a
    /// container becomes the global namespace; one is appended if missing.
    pub fn from_symbols(mut symbols: Vec<Symbol>) -> Self {
        let global = match symbols
            .iter()
            .position(|symbol| symbol.is_namespace() && symbol.container.is_none())
        {
            Some(index) => SymbolId::new(index as u32),
            None => {
                symbols.push(Symbol::new("", SymbolKind::Namespace));
                SymbolId::new((symbols.len() - 1) as u32)
            }
        };
        Self {
            documents: Vec::new(),
            symbols,
            operations: Vec::new(),
            bindings: Vec::new(),
            global,
        }
    }

    pub fn global_namespace(&self) -> SymbolId {
        self.global
    }

    pub fn add_document(&mut self, name: impl Into<String>, text: &str) -> SemfixResult<DocumentId> {
        let name = name.into();
        let language = Language::from_path(&name).ok_or_else(|| {
            SemfixError::other(format!("cannot infer the language of `{name}`"))
        })?;
        self.add_document_with_language(name, language, text)
    }

    pub fn add_document_with_language(
        &mut self,
        name: impl Into<String>,
        language: Language,
        text: &str,
    ) -> SemfixResult<DocumentId> {
        let name = name.into();
        let tree = parse_document(&name, language, text)?;
        Ok(self.add_tree(name, tree))
    }

    pub fn add_tree(&mut self, name: impl Into<String>, tree: SyntaxTree) -> DocumentId {
        let id = DocumentId::new(self.documents.len() as u32);
        self.documents.push(Document {
            id,
            name: name.into(),
            tree,
        });
        id
    }

    pub fn document(&self, id: DocumentId) -> Option<&Document> {
        self.documents.get(id.index())
    }

    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.index())
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> Option<&mut Symbol> {
        self.symbols.get_mut(id.index())
    }

    pub fn add_symbol(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId::new(self.symbols.len() as u32);
        self.symbols.push(symbol);
        id
    }

    /// Finds or creates the namespace chain for a dotted name.
    pub fn namespace(&mut self, qualified: &str) -> SymbolId {
        let mut current = self.global;
        for segment in qualified.split('.').filter(|segment| !segment.is_empty()) {
            let existing = self.symbols.iter().position(|symbol| {
                symbol.is_namespace() && symbol.container == Some(current) && symbol.name == segment
            });
            current = match existing {
                Some(index) => SymbolId::new(index as u32),
                None => self.add_symbol(
                    Symbol::new(segment, SymbolKind::Namespace).in_container(current),
                ),
            };
        }
        current
    }

    pub fn add_type(&mut self, container: SymbolId, name: &str, type_kind: TypeKind) -> SymbolId {
        self.add_symbol(
            Symbol::new(
                name,
                SymbolKind::NamedType {
                    type_kind,
                    type_parameters: Vec::new(),
                    special: None,
                },
            )
            .in_container(container),
        )
    }

    pub fn add_generic_type(
        &mut self,
        container: SymbolId,
        name: &str,
        type_kind: TypeKind,
        type_parameters: &[&str],
    ) -> SymbolId {
        let ty = self.add_type(container, name, type_kind);
        for parameter in type_parameters {
            self.add_type_parameter(ty, parameter);
        }
        ty
    }

    /// Adds a type parameter to a named type or method.
    pub fn add_type_parameter(&mut self, owner: SymbolId, name: &str) -> SymbolId {
        let parameter = self.add_symbol(
            Symbol::new(
                name,
                SymbolKind::TypeParameter {
                    constraints: Vec::new(),
                },
            )
            .in_container(owner),
        );
        if let Some(symbol) = self.symbol_mut(owner) {
            match &mut symbol.kind {
                SymbolKind::NamedType {
                    type_parameters, ..
                }
                | SymbolKind::Method {
                    type_parameters, ..
                } => type_parameters.push(parameter),
                _ => {}
            }
        }
        parameter
    }

    pub fn set_constraints(&mut self, type_parameter: SymbolId, new_constraints: Vec<Ty>) {
        if let Some(Symbol {
            kind: SymbolKind::TypeParameter { constraints },
            ..
        }) = self.symbol_mut(type_parameter)
        {
            *constraints = new_constraints;
        }
    }

    pub fn add_method(
        &mut self,
        container: SymbolId,
        name: &str,
        parameters: Vec<Ty>,
        is_static: bool,
    ) -> SymbolId {
        self.add_symbol(
            Symbol::new(
                name,
                SymbolKind::Method {
                    parameters,
                    overridden: None,
                    type_parameters: Vec::new(),
                },
            )
            .in_container(container)
            .with_static(is_static),
        )
    }

    pub fn set_parameters(&mut self, method: SymbolId, new_parameters: Vec<Ty>) {
        if let Some(Symbol {
            kind: SymbolKind::Method { parameters, .. },
            ..
        }) = self.symbol_mut(method)
        {
            *parameters = new_parameters;
        }
    }

    pub fn set_overridden(&mut self, method: SymbolId, base: SymbolId) {
        if let Some(Symbol {
            kind: SymbolKind::Method { overridden, .. },
            ..
        }) = self.symbol_mut(method)
        {
            *overridden = Some(base);
        }
    }

    pub fn mark_special(&mut self, ty: SymbolId, special_type: SpecialType) {
        if let Some(Symbol {
            kind: SymbolKind::NamedType { special, .. },
            ..
        }) = self.symbol_mut(ty)
        {
            *special = Some(special_type);
        }
    }

    pub fn add_field(&mut self, container: SymbolId, name: &str, ty: Ty, is_static: bool) -> SymbolId {
        self.add_symbol(
            Symbol::new(name, SymbolKind::Field { ty })
                .in_container(container)
                .with_static(is_static),
        )
    }

    pub fn add_property(
        &mut self,
        container: SymbolId,
        name: &str,
        ty: Ty,
        is_static: bool,
    ) -> SymbolId {
        self.add_symbol(
            Symbol::new(name, SymbolKind::Property { ty })
                .in_container(container)
                .with_static(is_static),
        )
    }

    pub fn add_parameter(&mut self, method: SymbolId, name: &str, ty: Ty) -> SymbolId {
        self.add_symbol(Symbol::new(name, SymbolKind::Parameter { ty }).in_container(method))
    }

    pub fn add_local(&mut self, method: SymbolId, name: &str, ty: Ty) -> SymbolId {
        self.add_symbol(Symbol::new(name, SymbolKind::Local { ty }).in_container(method))
    }

    pub fn add_declaration(&mut self, symbol: SymbolId, document: DocumentId, span: TextSpan) {
        if let Some(symbol) = self.symbol_mut(symbol) {
            symbol.declarations.push(SyntaxReference { document, span });
        }
    }

    /// Records what the name at `span` binds to.
    pub fn bind(&mut self, document: DocumentId, span: TextSpan, symbol: SymbolId) {
        self.bindings.push((document, span, symbol));
    }

    pub fn add_operation(&mut self, document: DocumentId, operation: Operation) {
        self.operations.push((document, operation));
    }

    pub fn build(self) -> Compilation {
        let mut members: HashMap<SymbolId, Vec<SymbolId>> = HashMap::new();
        let mut special_types = HashMap::new();
        for (index, symbol) in self.symbols.iter().enumerate() {
            let id = SymbolId::new(index as u32);
            if let Some(container) = symbol.container {
                members.entry(container).or_default().push(id);
            }
            if let Some(special) = symbol.special() {
                special_types.entry(special).or_insert(id);
            }
        }

        // The outermost operation wins when several share a span.
        let mut operations = HashMap::new();
        for (document, root) in &self.operations {
            root.walk(&mut |operation| {
                operations
                    .entry((*document, operation.span))
                    .or_insert_with(|| operation.clone());
            });
        }

        let bindings = self
            .bindings
            .iter()
            .map(|&(document, span, symbol)| ((document, span), symbol))
            .collect();

        debug!(
            documents = self.documents.len(),
            symbols = self.symbols.len(),
            operations = operations.len(),
            "built compilation"
        );

        Compilation {
            documents: self.documents,
            symbols: self.symbols,
            members,
            global: self.global,
            special_types,
            operations,
            bindings,
            operation_roots: self.operations,
            binding_list: self.bindings,
        }
    }
}
