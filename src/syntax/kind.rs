use serde::{Deserialize, Serialize};

/// The two surface syntaxes sharing one object model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "csharp", alias = "cs", alias = "c#")]
    CSharp,
    #[serde(rename = "visual-basic", alias = "vb")]
    VisualBasic,
}

impl Language {
    /// Infers the language from a document name's extension.
    pub fn from_path(path: &str) -> Option<Self> {
        let lower = path.to_ascii_lowercase();
        if lower.ends_with(".cs") {
            Some(Self::CSharp)
        } else if lower.ends_with(".vb") {
            Some(Self::VisualBasic)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::CSharp => "C#",
            Language::VisualBasic => "Visual Basic",
        }
    }

    pub fn is_case_sensitive(&self) -> bool {
        matches!(self, Language::CSharp)
    }

    /// Compares two identifiers the way this language's binder would.
    pub fn names_equal(&self, left: &str, right: &str) -> bool {
        if self.is_case_sensitive() {
            left == right
        } else {
            left.eq_ignore_ascii_case(right)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    // Tokens
    IdentifierToken,
    KeywordToken,
    PunctuationToken,
    NumericLiteralToken,
    StringLiteralToken,
    CharacterLiteralToken,
    EndOfFileToken,

    // Declarations
    CompilationUnit,
    ImportDirective,
    NamespaceDeclaration,
    TypeDeclaration,
    BaseList,
    TypeParameterList,
    TypeParameter,
    ConstraintClause,
    FieldDeclaration,
    MethodDeclaration,
    ParameterList,
    Parameter,

    // Statements
    Block,
    ReturnStatement,
    ExpressionStatement,
    LocalDeclaration,
    IfStatement,
    ElseClause,
    WithBlock,

    // Expressions
    InvocationExpression,
    ArgumentList,
    Argument,
    MemberAccessExpression,
    ConditionalAccessExpression,
    MemberBindingExpression,
    BinaryExpression,
    PrefixUnaryExpression,
    CastExpression,
    ParenthesizedExpression,
    LiteralExpression,
    ThisExpression,
    ObjectCreationExpression,

    // Names and types
    IdentifierName,
    GenericName,
    TypeArgumentList,
    QualifiedName,
    PredefinedType,
}

impl SyntaxKind {
    pub fn is_token(self) -> bool {
        matches!(
            self,
            SyntaxKind::IdentifierToken
                | SyntaxKind::KeywordToken
                | SyntaxKind::PunctuationToken
                | SyntaxKind::NumericLiteralToken
                | SyntaxKind::StringLiteralToken
                | SyntaxKind::CharacterLiteralToken
                | SyntaxKind::EndOfFileToken
        )
    }

    /// Simple names: an identifier, optionally with type arguments.
    pub fn is_simple_name(self) -> bool {
        matches!(self, SyntaxKind::IdentifierName | SyntaxKind::GenericName)
    }

    pub fn is_name(self) -> bool {
        self.is_simple_name() || self == SyntaxKind::QualifiedName
    }

    pub fn is_expression(self) -> bool {
        self.is_name()
            || matches!(
                self,
                SyntaxKind::InvocationExpression
                    | SyntaxKind::MemberAccessExpression
                    | SyntaxKind::ConditionalAccessExpression
                    | SyntaxKind::MemberBindingExpression
                    | SyntaxKind::BinaryExpression
                    | SyntaxKind::PrefixUnaryExpression
                    | SyntaxKind::CastExpression
                    | SyntaxKind::ParenthesizedExpression
                    | SyntaxKind::LiteralExpression
                    | SyntaxKind::ThisExpression
                    | SyntaxKind::ObjectCreationExpression
                    | SyntaxKind::PredefinedType
            )
    }
}
