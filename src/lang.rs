//! Per-language adapters.
//!
//! `SurfaceSyntax` answers the one question the analyzer asks of the concrete
//! grammar (which node names the invoked method); `SyntaxGenerator` builds
//! the new nodes the rewriters splice in.

mod csharp;
mod visual_basic;

pub use csharp::CSharp;
pub use visual_basic::VisualBasic;

use crate::semantic::SpecialType;
use crate::syntax::make::{self, node, punct};
use crate::syntax::{GreenElement, Language, NodeId, SyntaxKind, SyntaxNode, SyntaxTree};

pub trait SurfaceSyntax: Send + Sync {
    fn language(&self) -> Language;

    /// The node naming the invoked method: the member name of a member
    /// access or binding, otherwise the invoked expression itself.
    fn method_name<'t>(&self, invocation: SyntaxNode<'t>) -> SyntaxNode<'t>;
}

pub trait SyntaxGenerator: Send + Sync {
    fn language(&self) -> Language;

    fn identifier_name(&self, name: &str) -> GreenElement {
        make::identifier_name(name)
    }

    fn generic_name(&self, name: &str, type_arguments: Vec<GreenElement>) -> GreenElement;

    fn qualified_name(&self, left: GreenElement, right: GreenElement) -> GreenElement {
        node(SyntaxKind::QualifiedName, vec![left, punct("."), right])
    }

    /// The keyword spelling of a special type, if the language has one.
    fn predefined_type(&self, special: SpecialType) -> Option<GreenElement>;

    fn member_access(&self, expression: GreenElement, name: GreenElement) -> GreenElement {
        node(
            SyntaxKind::MemberAccessExpression,
            vec![expression, punct("."), name],
        )
    }

    fn invocation(&self, expression: GreenElement, arguments: Vec<GreenElement>) -> GreenElement {
        let arguments = arguments
            .into_iter()
            .map(|argument| node(SyntaxKind::Argument, vec![argument.without_trivia()]))
            .collect();
        let mut list = vec![punct("(")];
        list.extend(make::separated(arguments, ",", " "));
        list.push(punct(")"));
        node(
            SyntaxKind::InvocationExpression,
            vec![expression, node(SyntaxKind::ArgumentList, list)],
        )
    }

    /// An import directive for `name` ending in a line break.
    fn import_directive(&self, name: GreenElement, is_static: bool) -> GreenElement;

    /// Adds `constraint` to the type parameter at `type_parameter`. Returns
    /// `None` if the node is not a type parameter or already has a
    /// constraint the edit would have to merge with.
    fn add_type_constraint(
        &self,
        tree: &SyntaxTree,
        type_parameter: NodeId,
        constraint: GreenElement,
    ) -> Option<SyntaxTree>;
}

static CSHARP: CSharp = CSharp;
static VISUAL_BASIC: VisualBasic = VisualBasic;

pub fn surface(language: Language) -> &'static dyn SurfaceSyntax {
    match language {
        Language::CSharp => &CSHARP,
        Language::VisualBasic => &VISUAL_BASIC,
    }
}

pub fn generator(language: Language) -> &'static dyn SyntaxGenerator {
    match language {
        Language::CSharp => &CSHARP,
        Language::VisualBasic => &VISUAL_BASIC,
    }
}
