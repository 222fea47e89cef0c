use std::sync::Arc;

use super::{SurfaceSyntax, SyntaxGenerator};
use crate::semantic::SpecialType;
use crate::syntax::make::{self, ident, keyword, node, punct};
use crate::syntax::{GreenElement, Language, NodeId, SyntaxKind, SyntaxNode, SyntaxTree};

#[derive(Debug, Clone, Copy, Default)]
pub struct VisualBasic;

impl SurfaceSyntax for VisualBasic {
    fn language(&self) -> Language {
        Language::VisualBasic
    }

    fn method_name<'t>(&self, invocation: SyntaxNode<'t>) -> SyntaxNode<'t> {
        let Some(expression) = invocation.child_nodes().next() else {
            return invocation;
        };
        match expression.kind() {
            // `a.M`, `a?.M` and the receiver-less `.M` inside a `With` block
            SyntaxKind::MemberAccessExpression | SyntaxKind::MemberBindingExpression => expression
                .child_nodes()
                .filter(|child| child.kind().is_simple_name())
                .last()
                .unwrap_or(expression),
            _ => expression,
        }
    }
}

impl SyntaxGenerator for VisualBasic {
    fn language(&self) -> Language {
        Language::VisualBasic
    }

    fn generic_name(&self, name: &str, type_arguments: Vec<GreenElement>) -> GreenElement {
        let mut list = vec![punct("("), keyword("Of").with_trailing_trivia(" ")];
        list.extend(make::separated(type_arguments, ",", " "));
        list.push(punct(")"));
        node(
            SyntaxKind::GenericName,
            vec![ident(name), node(SyntaxKind::TypeArgumentList, list)],
        )
    }

    fn predefined_type(&self, special: SpecialType) -> Option<GreenElement> {
        let keyword_text = match special {
            SpecialType::Object => "Object",
            SpecialType::Boolean => "Boolean",
            SpecialType::Char => "Char",
            SpecialType::Byte => "Byte",
            SpecialType::Int16 => "Short",
            SpecialType::Int32 => "Integer",
            SpecialType::Int64 => "Long",
            SpecialType::Single => "Single",
            SpecialType::Double => "Double",
            SpecialType::Decimal => "Decimal",
            SpecialType::String => "String",
            SpecialType::Void => return None,
        };
        Some(node(SyntaxKind::PredefinedType, vec![keyword(keyword_text)]))
    }

    /// VB has no `static` form: `Imports Namespace.Type` imports the type's
    /// shared members.
    fn import_directive(&self, name: GreenElement, _is_static: bool) -> GreenElement {
        node(
            SyntaxKind::ImportDirective,
            vec![
                keyword("Imports").with_trailing_trivia(" "),
                name.without_trivia().with_trailing_trivia("\n"),
            ],
        )
    }

    /// Rewrites `T` into `T As constraint` inside the type parameter list.
    fn add_type_constraint(
        &self,
        tree: &SyntaxTree,
        type_parameter: NodeId,
        constraint: GreenElement,
    ) -> Option<SyntaxTree> {
        let parameter = tree.get(type_parameter)?;
        if parameter.kind() != SyntaxKind::TypeParameter
            || parameter.child_of_kind(SyntaxKind::ConstraintClause).is_some()
        {
            return None;
        }
        let name = parameter.identifier()?.green().clone();
        let moved_trivia = name.trailing_trivia().to_string();
        let clause = node(
            SyntaxKind::ConstraintClause,
            vec![
                keyword("As").with_trailing_trivia(" "),
                constraint.without_trivia(),
            ],
        )
        .with_trailing_trivia(moved_trivia);
        let updated = crate::syntax::GreenNode::new(
            SyntaxKind::TypeParameter,
            vec![name.with_trailing_trivia(" "), clause],
        );
        Some(tree.replace(parameter.id(), GreenElement::Node(Arc::new(updated))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parse_visual_basic;

    #[test]
    fn constraint_is_added_inside_the_type_parameter() {
        let source = "Class C\n    Function M(Of T)(a As T, b As T) As Boolean\n        Return a.Equals(b)\n    End Function\nEnd Class\n";
        let tree = parse_visual_basic(source).unwrap();
        let parameter = tree
            .nodes()
            .find(|node| node.kind() == SyntaxKind::TypeParameter)
            .unwrap()
            .id();
        let constraint = VisualBasic.generic_name("IEquatable", vec![make::identifier_name("T")]);
        let edited = VisualBasic
            .add_type_constraint(&tree, parameter, constraint)
            .unwrap();
        assert_eq!(
            edited.text(),
            source.replace("(Of T)", "(Of T As IEquatable(Of T))")
        );
    }

    #[test]
    fn method_name_of_with_block_call_is_the_member_name() {
        let source = "Module M\n    Sub Run(o As Object)\n        With o\n            .Equals(o)\n        End With\n    End Sub\nEnd Module\n";
        let tree = parse_visual_basic(source).unwrap();
        let invocation = tree
            .nodes()
            .find(|node| node.kind() == SyntaxKind::InvocationExpression)
            .unwrap();
        assert_eq!(VisualBasic.method_name(invocation).text(), "Equals");
    }
}
