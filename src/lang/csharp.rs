use std::sync::Arc;

use super::{SurfaceSyntax, SyntaxGenerator};
use crate::semantic::SpecialType;
use crate::syntax::make::{self, ident, keyword, node, punct};
use crate::syntax::{GreenElement, Language, NodeId, SyntaxKind, SyntaxNode, SyntaxTree};

#[derive(Debug, Clone, Copy, Default)]
pub struct CSharp;

impl SurfaceSyntax for CSharp {
    fn language(&self) -> Language {
        Language::CSharp
    }

    fn method_name<'t>(&self, invocation: SyntaxNode<'t>) -> SyntaxNode<'t> {
        let Some(expression) = invocation.child_nodes().next() else {
            return invocation;
        };
        match expression.kind() {
            // `a.M` and the `.M` binding of `a?.M`
            SyntaxKind::MemberAccessExpression | SyntaxKind::MemberBindingExpression => expression
                .child_nodes()
                .last()
                .filter(|name| name.kind().is_simple_name())
                .unwrap_or(expression),
            _ => expression,
        }
    }
}

impl SyntaxGenerator for CSharp {
    fn language(&self) -> Language {
        Language::CSharp
    }

    fn generic_name(&self, name: &str, type_arguments: Vec<GreenElement>) -> GreenElement {
        let mut list = vec![punct("<")];
        list.extend(make::separated(type_arguments, ",", " "));
        list.push(punct(">"));
        node(
            SyntaxKind::GenericName,
            vec![ident(name), node(SyntaxKind::TypeArgumentList, list)],
        )
    }

    fn predefined_type(&self, special: SpecialType) -> Option<GreenElement> {
        let keyword_text = match special {
            SpecialType::Object => "object",
            SpecialType::Boolean => "bool",
            SpecialType::Char => "char",
            SpecialType::Byte => "byte",
            SpecialType::Int16 => "short",
            SpecialType::Int32 => "int",
            SpecialType::Int64 => "long",
            SpecialType::Single => "float",
            SpecialType::Double => "double",
            SpecialType::Decimal => "decimal",
            SpecialType::String => "string",
            SpecialType::Void => "void",
        };
        Some(node(SyntaxKind::PredefinedType, vec![keyword(keyword_text)]))
    }

    fn import_directive(&self, name: GreenElement, is_static: bool) -> GreenElement {
        let mut children = vec![keyword("using").with_trailing_trivia(" ")];
        if is_static {
            children.push(keyword("static").with_trailing_trivia(" "));
        }
        children.push(name.without_trivia());
        children.push(punct(";").with_trailing_trivia("\n"));
        node(SyntaxKind::ImportDirective, children)
    }

    /// Inserts `where T : constraint` in front of the declaration body. The
    /// line break that followed the parameter list moves to the end of the
    /// new clause.
    fn add_type_constraint(
        &self,
        tree: &SyntaxTree,
        type_parameter: NodeId,
        constraint: GreenElement,
    ) -> Option<SyntaxTree> {
        let parameter = tree.get(type_parameter)?;
        if parameter.kind() != SyntaxKind::TypeParameter {
            return None;
        }
        let name = parameter.identifier()?.text().to_string();
        let declaration = parameter.parent()?.parent()?;
        let already_constrained = declaration
            .child_nodes()
            .filter(|child| child.kind() == SyntaxKind::ConstraintClause)
            .any(|clause| clause.identifier().is_some_and(|token| token.text() == name));
        if already_constrained {
            return None;
        }

        let body_index = declaration
            .children()
            .position(|child| {
                child.kind() == SyntaxKind::Block
                    || (child.is_token() && matches!(child.text(), "{" | "=>" | ";"))
            })?;
        let preceding_index = body_index.checked_sub(1)?;
        let green = declaration.green().as_node()?;
        let preceding = &green.children()[preceding_index];
        let moved_trivia = preceding.trailing_trivia().to_string();

        let clause = node(
            SyntaxKind::ConstraintClause,
            vec![
                ident("where").with_trailing_trivia(" "),
                ident(&name).with_trailing_trivia(" "),
                punct(":").with_trailing_trivia(" "),
                constraint.without_trivia(),
            ],
        )
        .with_trailing_trivia(moved_trivia);

        let updated = green
            .replace_child(preceding_index, preceding.with_trailing_trivia(" "))
            .insert_children(body_index, [clause]);
        Some(tree.replace(declaration.id(), GreenElement::Node(Arc::new(updated))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parse_csharp;

    fn first_type_parameter(tree: &SyntaxTree) -> NodeId {
        tree.nodes()
            .find(|node| node.kind() == SyntaxKind::TypeParameter)
            .unwrap()
            .id()
    }

    fn iequatable_t() -> GreenElement {
        CSharp.generic_name("IEquatable", vec![make::identifier_name("T")])
    }

    #[test]
    fn constraint_goes_between_parameters_and_block() {
        let source = "class C\n{\n    bool M<T>(T a, T b)\n    {\n        return a.Equals(b);\n    }\n}\n";
        let tree = parse_csharp(source).unwrap();
        let edited = CSharp
            .add_type_constraint(&tree, first_type_parameter(&tree), iequatable_t())
            .unwrap();
        assert_eq!(
            edited.text(),
            "class C\n{\n    bool M<T>(T a, T b) where T : IEquatable<T>\n    {\n        return a.Equals(b);\n    }\n}\n"
        );
    }

    #[test]
    fn constraint_on_type_declaration_follows_base_list() {
        let source = "class Box<T> : Base { }\n";
        let tree = parse_csharp(source).unwrap();
        let edited = CSharp
            .add_type_constraint(&tree, first_type_parameter(&tree), iequatable_t())
            .unwrap();
        assert_eq!(
            edited.text(),
            "class Box<T> : Base where T : IEquatable<T> { }\n"
        );
    }

    #[test]
    fn method_name_of_conditional_access_is_the_bound_member() {
        let source = "class C { bool M(object o) { return o?.Equals(o) == true; } }";
        let tree = parse_csharp(source).unwrap();
        let invocation = tree
            .nodes()
            .find(|node| node.kind() == SyntaxKind::InvocationExpression)
            .unwrap();
        assert_eq!(CSharp.method_name(invocation).text(), "Equals");
    }
}
