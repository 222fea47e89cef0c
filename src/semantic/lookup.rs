//! Scope-based name lookup over a syntax tree and the symbol table.
//!
//! Scopes are searched innermost first: the enclosing method's locals,
//! parameters and type parameters, then enclosing type declarations, then
//! enclosing namespaces, then the global namespace, then the imports in
//! scope. The first scope with any match wins.

use super::{SemanticModel, Symbol, SymbolId, SymbolKind};
use crate::syntax::{Language, SyntaxKind, SyntaxNode, SyntaxTree, TextSpan};

/// One segment of a dotted name: the identifier and its type-argument count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameSegment {
    pub name: String,
    pub arity: usize,
}

/// Splits a name node (`A.B<C>.D`) into its segments.
pub fn name_segments(node: SyntaxNode<'_>) -> Vec<NameSegment> {
    match node.kind() {
        SyntaxKind::QualifiedName | SyntaxKind::MemberAccessExpression => node
            .child_nodes()
            .flat_map(name_segments)
            .collect(),
        SyntaxKind::IdentifierName => node
            .identifier()
            .map(|token| NameSegment {
                name: token.text().to_string(),
                arity: 0,
            })
            .into_iter()
            .collect(),
        SyntaxKind::GenericName => {
            let arity = node
                .child_of_kind(SyntaxKind::TypeArgumentList)
                .map_or(0, |list| list.child_nodes().count());
            node.identifier()
                .map(|token| NameSegment {
                    name: token.text().to_string(),
                    arity,
                })
                .into_iter()
                .collect()
        }
        _ => Vec::new(),
    }
}

fn find_member<M: SemanticModel + ?Sized>(
    model: &M,
    container: SymbolId,
    segment: &NameSegment,
    language: Language,
) -> Option<SymbolId> {
    model.members(container).iter().copied().find(|&member| {
        model.symbol(member).is_some_and(|symbol| {
            language.names_equal(&symbol.name, &segment.name)
                && match &symbol.kind {
                    SymbolKind::Namespace => segment.arity == 0,
                    SymbolKind::NamedType { .. } => symbol.arity() == segment.arity,
                    _ => false,
                }
        })
    })
}

/// Resolves a namespace-or-type path from the global namespace.
pub fn resolve_path<M: SemanticModel + ?Sized>(
    model: &M,
    segments: &[NameSegment],
    language: Language,
) -> Option<SymbolId> {
    if segments.is_empty() {
        return None;
    }
    segments.iter().try_fold(model.global_namespace(), |current, segment| {
        find_member(model, current, segment, language)
    })
}

/// Resolves names like `System.Collections.Generic.EqualityComparer`1` and
/// `Outer+Inner` exactly (case-sensitive).
pub(super) fn type_by_metadata_name<M: SemanticModel + ?Sized>(
    model: &M,
    metadata_name: &str,
) -> Option<SymbolId> {
    let mut nested = metadata_name.split('+');
    let outer = nested.next()?;
    let (namespace, type_name) = outer.rsplit_once('.').unwrap_or(("", outer));
    let mut segments: Vec<NameSegment> = namespace
        .split('.')
        .filter(|segment| !segment.is_empty())
        .map(|segment| NameSegment {
            name: segment.to_string(),
            arity: 0,
        })
        .collect();
    segments.push(metadata_segment(type_name));
    segments.extend(nested.map(metadata_segment));
    let resolved = resolve_path(model, &segments, Language::CSharp)?;
    model
        .symbol(resolved)
        .is_some_and(Symbol::is_named_type)
        .then_some(resolved)
}

fn metadata_segment(segment: &str) -> NameSegment {
    match segment.split_once('`') {
        Some((name, arity)) => NameSegment {
            name: name.to_string(),
            arity: arity.parse().unwrap_or(0),
        },
        None => NameSegment {
            name: segment.to_string(),
            arity: 0,
        },
    }
}

/// The symbol an import directive names, if it resolves.
pub fn directive_target<M: SemanticModel + ?Sized>(
    model: &M,
    directive: SyntaxNode<'_>,
) -> Option<SymbolId> {
    let name = directive.child_nodes().find(|child| child.kind().is_name())?;
    resolve_path(model, &name_segments(name), directive.tree().language())
}

/// Whether a directive imports the members of a type rather than the types
/// of a namespace. C# spells it `using static`; VB decides by what the name
/// resolves to.
pub fn is_static_directive<M: SemanticModel + ?Sized>(
    model: &M,
    directive: SyntaxNode<'_>,
    target: SymbolId,
) -> bool {
    match directive.tree().language() {
        Language::CSharp => directive.has_keyword("static"),
        Language::VisualBasic => model.symbol(target).is_some_and(Symbol::is_named_type),
    }
}

/// Namespaces and types enclosing `position`, innermost first, ending with
/// the global namespace.
fn enclosing_containers<M: SemanticModel + ?Sized>(
    model: &M,
    tree: &SyntaxTree,
    position: usize,
) -> Vec<SymbolId> {
    let language = tree.language();
    let global = model.global_namespace();
    let Some(anchor) = tree.covering_element(TextSpan::empty(position)) else {
        return vec![global];
    };
    let mut declarations: Vec<SyntaxNode<'_>> = anchor
        .ancestors_and_self()
        .filter(|node| {
            matches!(
                node.kind(),
                SyntaxKind::TypeDeclaration | SyntaxKind::NamespaceDeclaration
            )
        })
        .collect();
    declarations.reverse();

    let mut chain = vec![global];
    let mut current = global;
    'outer: for declaration in declarations {
        for segment in declaration_segments(declaration) {
            match find_member(model, current, &segment, language) {
                Some(next) => {
                    current = next;
                    chain.push(next);
                }
                None => break 'outer,
            }
        }
    }
    chain.reverse();
    chain
}

fn declaration_segments(declaration: SyntaxNode<'_>) -> Vec<NameSegment> {
    match declaration.kind() {
        SyntaxKind::NamespaceDeclaration => declaration
            .child_nodes()
            .find(|child| child.kind().is_name())
            .map(name_segments)
            .unwrap_or_default(),
        SyntaxKind::TypeDeclaration => {
            let arity = declaration
                .child_of_kind(SyntaxKind::TypeParameterList)
                .map_or(0, |list| list.child_nodes().count());
            declaration
                .identifier()
                .map(|token| NameSegment {
                    name: token.text().to_string(),
                    arity,
                })
                .into_iter()
                .collect()
        }
        _ => Vec::new(),
    }
}

/// The method whose declaration encloses `position`, resolved among the
/// members of `container` by name, then by parameter count and arity.
fn enclosing_method<M: SemanticModel + ?Sized>(
    model: &M,
    tree: &SyntaxTree,
    position: usize,
    container: SymbolId,
) -> Option<SymbolId> {
    let language = tree.language();
    let declaration = tree
        .covering_element(TextSpan::empty(position))?
        .ancestors_and_self()
        .find(|node| node.kind() == SyntaxKind::MethodDeclaration)?;
    let name = declaration.identifier()?;
    let count = |kind: SyntaxKind| {
        declaration
            .child_of_kind(kind)
            .map_or(0, |list| list.child_nodes().count())
    };
    let (parameters, arity) = (
        count(SyntaxKind::ParameterList),
        count(SyntaxKind::TypeParameterList),
    );

    let named: Vec<SymbolId> = model
        .members(container)
        .iter()
        .copied()
        .filter(|&member| {
            model.symbol(member).is_some_and(|symbol| {
                symbol.is_method() && language.names_equal(&symbol.name, name.text())
            })
        })
        .collect();
    named
        .iter()
        .copied()
        .find(|&method| {
            model.symbol(method).is_some_and(|symbol| {
                symbol.parameters().len() == parameters && symbol.arity() == arity
            })
        })
        .or_else(|| named.first().copied())
}

pub(super) fn lookup_name<M: SemanticModel + ?Sized>(
    model: &M,
    tree: &SyntaxTree,
    position: usize,
    name: &str,
) -> Vec<SymbolId> {
    let language = tree.language();
    let containers = enclosing_containers(model, tree, position);
    let method = containers
        .first()
        .and_then(|&innermost| enclosing_method(model, tree, position, innermost));
    for container in method.into_iter().chain(containers) {
        let found: Vec<SymbolId> = model
            .members(container)
            .iter()
            .copied()
            .filter(|&member| {
                model
                    .symbol(member)
                    .is_some_and(|symbol| language.names_equal(&symbol.name, name))
            })
            .collect();
        if !found.is_empty() {
            return found;
        }
    }
    imported_candidates(model, tree, position, name)
}

/// Import directives visible at `position`: the compilation unit's, then
/// those of each enclosing namespace declaration, outermost first.
pub fn directives_in_scope(tree: &SyntaxTree, position: usize) -> Vec<SyntaxNode<'_>> {
    let mut scopes = vec![tree.root()];
    if let Some(anchor) = tree.covering_element(TextSpan::empty(position)) {
        let mut namespaces: Vec<SyntaxNode<'_>> = anchor
            .ancestors_and_self()
            .filter(|node| node.kind() == SyntaxKind::NamespaceDeclaration)
            .collect();
        namespaces.reverse();
        scopes.extend(namespaces);
    }
    scopes
        .into_iter()
        .flat_map(|scope| scope.child_nodes())
        .filter(|node| node.kind() == SyntaxKind::ImportDirective)
        .collect()
}

fn imported_candidates<M: SemanticModel + ?Sized>(
    model: &M,
    tree: &SyntaxTree,
    position: usize,
    name: &str,
) -> Vec<SymbolId> {
    let language = tree.language();
    let mut found = Vec::new();
    for directive in directives_in_scope(tree, position) {
        let Some(target) = directive_target(model, directive) else {
            continue;
        };
        let Some(imported) = model.symbol(target) else {
            continue;
        };
        let is_static = is_static_directive(model, directive, target);
        for &member in model.members(target) {
            let Some(symbol) = model.symbol(member) else {
                continue;
            };
            if !language.names_equal(&symbol.name, name) {
                continue;
            }
            let visible = if is_static {
                imported.is_named_type() && (symbol.is_static || symbol.is_named_type())
            } else {
                imported.is_namespace() && symbol.is_named_type()
            };
            if visible && !found.contains(&member) {
                found.push(member);
            }
        }
    }
    found
}

/// True when `name` (with `arity` type arguments), written at `position`,
/// would bind to `target` and nothing else.
///
/// Methods bind uniquely when every candidate is an overload from the
/// target's own container.
pub fn binds_uniquely<M: SemanticModel + ?Sized>(
    model: &M,
    tree: &SyntaxTree,
    position: usize,
    name: &str,
    target: SymbolId,
    arity: usize,
) -> bool {
    let Some(symbol) = model.symbol(target) else {
        return false;
    };
    let candidates = model.lookup_name(tree, position, name);
    match &symbol.kind {
        SymbolKind::NamedType { .. } => {
            let relevant: Vec<SymbolId> = candidates
                .into_iter()
                .filter(|&candidate| {
                    model.symbol(candidate).is_some_and(|other| match &other.kind {
                        SymbolKind::NamedType { .. } => other.arity() == arity,
                        SymbolKind::Namespace | SymbolKind::TypeParameter { .. } => arity == 0,
                        _ => true,
                    })
                })
                .collect();
            relevant == [target]
        }
        SymbolKind::Method { .. } => {
            !candidates.is_empty()
                && candidates.iter().all(|&candidate| {
                    model.symbol(candidate).is_some_and(|other| {
                        other.is_method() && other.container == symbol.container
                    })
                })
        }
        _ => candidates == [target],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::{CompilationBuilder, CoreLibrary, Ty, TypeKind};

    const SOURCE: &str = "using System;\n\nnamespace App\n{\n    class Console\n    {\n    }\n\n    class C\n    {\n        void M()\n        {\n            int x = 1;\n        }\n    }\n}\n";

    #[test]
    fn enclosing_namespace_shadows_imports() {
        let mut builder = CompilationBuilder::new();
        let corlib = CoreLibrary::install(&mut builder);
        let app = builder.namespace("App");
        let local_console = builder.add_type(app, "Console", TypeKind::Class);
        let c = builder.add_type(app, "C", TypeKind::Class);
        let document = builder.add_document("a.cs", SOURCE).unwrap();
        let compilation = builder.build();
        let tree = &compilation.document(document).unwrap().tree;
        let position = SOURCE.find("int x").unwrap();

        assert_eq!(
            compilation.lookup_name(tree, position, "Console"),
            vec![local_console]
        );
        assert_eq!(compilation.lookup_name(tree, position, "C"), vec![c]);
        assert_eq!(
            compilation.lookup_name(tree, position, "String"),
            vec![corlib.string]
        );
        assert!(!binds_uniquely(
            &compilation,
            tree,
            position,
            "Console",
            corlib.console,
            0
        ));
        assert!(binds_uniquely(
            &compilation,
            tree,
            position,
            "String",
            corlib.string,
            0
        ));
    }

    #[test]
    fn static_imports_expose_static_members() {
        let source = "using static System.Console;\n\nclass C\n{\n    void M()\n    {\n        WriteLine(\"a\");\n    }\n}\n";
        let mut builder = CompilationBuilder::new();
        let corlib = CoreLibrary::install(&mut builder);
        let document = builder.add_document("a.cs", source).unwrap();
        let compilation = builder.build();
        let tree = &compilation.document(document).unwrap().tree;
        let position = source.find("WriteLine").unwrap();
        assert_eq!(
            compilation.lookup_name(tree, position, "WriteLine"),
            vec![corlib.console_write_line]
        );
        assert!(compilation.lookup_name(tree, position, "Console").is_empty());
    }

    #[test]
    fn method_names_shadow_members_and_imports() {
        let source = "namespace App\n{\n    using System;\n\n    class C\n    {\n        int Console;\n\n        void M<T>(T value)\n        {\n            int String = 1;\n        }\n    }\n}\n\nclass D\n{\n}\n";
        let mut builder = CompilationBuilder::new();
        let corlib = CoreLibrary::install(&mut builder);
        let app = builder.namespace("App");
        let c = builder.add_type(app, "C", TypeKind::Class);
        let field = builder.add_field(c, "Console", corlib.int_ty(), false);
        let m = builder.add_method(c, "M", Vec::new(), false);
        let t = builder.add_type_parameter(m, "T");
        let value = builder.add_parameter(m, "value", Ty::param(t));
        let local = builder.add_local(m, "String", corlib.int_ty());
        let document = builder.add_document("a.cs", source).unwrap();
        let compilation = builder.build();
        let tree = &compilation.document(document).unwrap().tree;
        let position = source.find("int String").unwrap();

        assert_eq!(compilation.lookup_name(tree, position, "T"), vec![t]);
        assert_eq!(compilation.lookup_name(tree, position, "value"), vec![value]);
        assert_eq!(compilation.lookup_name(tree, position, "String"), vec![local]);
        assert_eq!(compilation.lookup_name(tree, position, "Console"), vec![field]);
        assert_eq!(
            compilation.lookup_name(tree, position, "Int32"),
            vec![corlib.int32]
        );

        let outside = source.find("class D").unwrap();
        assert!(compilation.lookup_name(tree, outside, "Int32").is_empty());
        assert!(compilation.lookup_name(tree, outside, "value").is_empty());
        assert_eq!(directives_in_scope(tree, position).len(), 1);
        assert!(directives_in_scope(tree, outside).is_empty());
    }

    #[test]
    fn metadata_names_carry_arity_and_nesting() {
        let mut builder = CompilationBuilder::new();
        let corlib = CoreLibrary::install(&mut builder);
        let outer = builder.add_type(builder.global_namespace(), "Outer", TypeKind::Class);
        let inner = builder.add_type(outer, "Inner", TypeKind::Class);
        let compilation = builder.build();
        assert_eq!(
            compilation.type_by_metadata_name("System.Collections.Generic.EqualityComparer`1"),
            Some(corlib.equality_comparer)
        );
        assert_eq!(
            compilation.type_by_metadata_name("System.Collections.Generic.EqualityComparer"),
            None
        );
        assert_eq!(compilation.type_by_metadata_name("Outer+Inner"), Some(inner));
        assert_eq!(compilation.type_by_metadata_name("System"), None);
    }
}
