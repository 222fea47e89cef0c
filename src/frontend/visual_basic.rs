use super::cursor::TokenCursor;
use crate::error::SemfixResult;
use crate::syntax::make::node;
use crate::syntax::{GreenElement, GreenNode, SyntaxKind};

const MODIFIERS: &[&str] = &[
    "Public", "Private", "Protected", "Friend", "Shared", "Overrides", "Overridable",
    "NotOverridable", "MustOverride", "MustInherit", "NotInheritable", "Partial", "Shadows",
    "Overloads", "ReadOnly", "Static", "Const",
];

const PREDEFINED_TYPES: &[&str] = &[
    "Boolean", "Byte", "Char", "Date", "Decimal", "Double", "Integer", "Long", "Object",
    "Short", "Single", "String",
];

const TYPE_KEYWORDS: &[&str] = &["Class", "Structure", "Interface", "Module"];

const LITERAL_KEYWORDS: &[&str] = &["True", "False", "Nothing"];

const CAST_KEYWORDS: &[&str] = &["DirectCast", "CType", "TryCast"];

/// Keywords that close the statement list of the enclosing block.
const BLOCK_TERMINATORS: &[&str] = &["End", "Else", "ElseIf"];

pub(super) fn parse(cursor: TokenCursor<'_>) -> SemfixResult<GreenNode> {
    VisualBasicParser { c: cursor }.compilation_unit()
}

struct VisualBasicParser<'d> {
    c: TokenCursor<'d>,
}

impl VisualBasicParser<'_> {
    fn compilation_unit(&mut self) -> SemfixResult<GreenNode> {
        let mut children = Vec::new();
        while self.c.at("Imports") {
            let keyword = self.c.bump();
            let name = self.name()?;
            children.push(node(SyntaxKind::ImportDirective, vec![keyword, name]));
        }
        while !self.c.at_eof() {
            children.push(self.namespace_member()?);
        }
        children.push(self.c.bump());
        Ok(GreenNode::new(SyntaxKind::CompilationUnit, children))
    }

    fn namespace_member(&mut self) -> SemfixResult<GreenElement> {
        if self.c.at("Namespace") {
            let mut children = vec![self.c.bump(), self.name()?];
            while !self.c.at("End") {
                if self.c.at_eof() {
                    return Err(self.c.error("expected `End Namespace`"));
                }
                children.push(self.namespace_member()?);
            }
            children.push(self.c.bump());
            children.push(self.c.expect("Namespace")?);
            return Ok(node(SyntaxKind::NamespaceDeclaration, children));
        }
        let modifiers = self.modifiers();
        if self.c.at_any(TYPE_KEYWORDS) {
            return self.type_declaration(modifiers);
        }
        Err(self.c.error("expected a namespace or type declaration"))
    }

    fn modifiers(&mut self) -> Vec<GreenElement> {
        let mut modifiers = Vec::new();
        while self.c.at_any(MODIFIERS) {
            modifiers.push(self.c.bump());
        }
        modifiers
    }

    fn type_declaration(&mut self, mut children: Vec<GreenElement>) -> SemfixResult<GreenElement> {
        let keyword_text = self.c.current().text().to_string();
        children.push(self.c.bump());
        children.push(self.c.expect_identifier()?);
        if self.c.at("(") && self.c.nth_at(1, "Of") {
            children.push(self.type_parameter_list()?);
        }
        loop {
            if self.c.at("Inherits") || self.c.at("Implements") {
                let mut clause = vec![self.c.bump(), self.type_syntax()?];
                while let Some(comma) = self.c.eat(",") {
                    clause.push(comma);
                    clause.push(self.type_syntax()?);
                }
                children.push(node(SyntaxKind::BaseList, clause));
            } else if self.c.at("End") {
                break;
            } else if self.c.at_eof() {
                return Err(self.c.error(format!("expected `End {keyword_text}`")));
            } else {
                children.push(self.type_member()?);
            }
        }
        children.push(self.c.bump());
        children.push(self.c.expect(&keyword_text)?);
        Ok(node(SyntaxKind::TypeDeclaration, children))
    }

    fn type_parameter_list(&mut self) -> SemfixResult<GreenElement> {
        let mut children = vec![self.c.expect("(")?, self.c.expect("Of")?];
        loop {
            let mut parameter = vec![self.c.expect_identifier()?];
            if self.c.at("As") {
                parameter.push(self.constraint_clause()?);
            }
            children.push(node(SyntaxKind::TypeParameter, parameter));
            match self.c.eat(",") {
                Some(comma) => children.push(comma),
                None => break,
            }
        }
        children.push(self.c.expect(")")?);
        Ok(node(SyntaxKind::TypeParameterList, children))
    }

    fn constraint_clause(&mut self) -> SemfixResult<GreenElement> {
        let mut children = vec![self.c.bump()];
        if let Some(open) = self.c.eat("{") {
            children.push(open);
            loop {
                children.push(self.constraint()?);
                match self.c.eat(",") {
                    Some(comma) => children.push(comma),
                    None => break,
                }
            }
            children.push(self.c.expect("}")?);
        } else {
            children.push(self.constraint()?);
        }
        Ok(node(SyntaxKind::ConstraintClause, children))
    }

    fn constraint(&mut self) -> SemfixResult<GreenElement> {
        if self.c.at_any(&["Class", "Structure", "New"]) {
            return Ok(self.c.bump());
        }
        self.type_syntax()
    }

    fn type_member(&mut self) -> SemfixResult<GreenElement> {
        let mut children = self.modifiers();
        if self.c.at_any(TYPE_KEYWORDS) {
            return self.type_declaration(children);
        }
        if self.c.at("Sub") || self.c.at("Function") {
            return self.method(children);
        }
        if let Some(dim) = self.c.eat("Dim") {
            children.push(dim);
        }
        children.push(self.c.expect_identifier()?);
        if let Some(as_keyword) = self.c.eat("As") {
            children.push(as_keyword);
            if let Some(new_keyword) = self.c.eat("New") {
                children.push(new_keyword);
            }
            children.push(self.type_syntax()?);
        }
        if let Some(equals) = self.c.eat("=") {
            children.push(equals);
            children.push(self.expression()?);
        }
        Ok(node(SyntaxKind::FieldDeclaration, children))
    }

    fn method(&mut self, mut children: Vec<GreenElement>) -> SemfixResult<GreenElement> {
        let is_abstract = children.iter().any(|modifier| {
            modifier
                .first_token()
                .is_some_and(|token| token.text().eq_ignore_ascii_case("MustOverride"))
        });
        let keyword_text = self.c.current().text().to_string();
        children.push(self.c.bump());
        if self.c.at("New") {
            children.push(self.c.bump());
        } else {
            children.push(self.c.expect_identifier()?);
        }
        if self.c.at("(") && self.c.nth_at(1, "Of") {
            children.push(self.type_parameter_list()?);
        }
        if self.c.at("(") {
            children.push(self.parameter_list()?);
        }
        if let Some(as_keyword) = self.c.eat("As") {
            children.push(as_keyword);
            children.push(self.type_syntax()?);
        }
        if self.c.at("Implements") {
            let mut clause = vec![self.c.bump(), self.name()?];
            while let Some(comma) = self.c.eat(",") {
                clause.push(comma);
                clause.push(self.name()?);
            }
            children.push(node(SyntaxKind::BaseList, clause));
        }
        if is_abstract {
            return Ok(node(SyntaxKind::MethodDeclaration, children));
        }
        children.push(self.statements()?);
        children.push(self.c.expect("End")?);
        children.push(self.c.expect(&keyword_text)?);
        Ok(node(SyntaxKind::MethodDeclaration, children))
    }

    fn parameter_list(&mut self) -> SemfixResult<GreenElement> {
        let mut children = vec![self.c.expect("(")?];
        if !self.c.at(")") {
            loop {
                let mut parameter = Vec::new();
                while self.c.at_any(&["ByVal", "ByRef", "Optional", "ParamArray"]) {
                    parameter.push(self.c.bump());
                }
                parameter.push(self.c.expect_identifier()?);
                if let Some(as_keyword) = self.c.eat("As") {
                    parameter.push(as_keyword);
                    parameter.push(self.type_syntax()?);
                }
                if let Some(equals) = self.c.eat("=") {
                    parameter.push(equals);
                    parameter.push(self.expression()?);
                }
                children.push(node(SyntaxKind::Parameter, parameter));
                match self.c.eat(",") {
                    Some(comma) => children.push(comma),
                    None => break,
                }
            }
        }
        children.push(self.c.expect(")")?);
        Ok(node(SyntaxKind::ParameterList, children))
    }

    fn type_syntax(&mut self) -> SemfixResult<GreenElement> {
        if self.c.at_any(PREDEFINED_TYPES) {
            return Ok(node(SyntaxKind::PredefinedType, vec![self.c.bump()]));
        }
        self.name()
    }

    fn name(&mut self) -> SemfixResult<GreenElement> {
        let mut name = self.simple_name()?;
        while self.c.at(".") && self.c.nth(1).kind() == SyntaxKind::IdentifierToken {
            let dot = self.c.bump();
            let right = self.simple_name()?;
            name = node(SyntaxKind::QualifiedName, vec![name, dot, right]);
        }
        Ok(name)
    }

    fn simple_name(&mut self) -> SemfixResult<GreenElement> {
        let identifier = self.c.expect_identifier()?;
        if self.c.at("(") && self.c.nth_at(1, "Of") {
            let mut arguments = vec![self.c.bump(), self.c.bump(), self.type_syntax()?];
            while let Some(comma) = self.c.eat(",") {
                arguments.push(comma);
                arguments.push(self.type_syntax()?);
            }
            arguments.push(self.c.expect(")")?);
            let list = node(SyntaxKind::TypeArgumentList, arguments);
            return Ok(node(SyntaxKind::GenericName, vec![identifier, list]));
        }
        Ok(node(SyntaxKind::IdentifierName, vec![identifier]))
    }

    /// Statements up to (not including) `End`, `Else` or `ElseIf`.
    fn statements(&mut self) -> SemfixResult<GreenElement> {
        let mut children = Vec::new();
        while !self.c.at_any(BLOCK_TERMINATORS) {
            if self.c.at_eof() {
                return Err(self.c.error("expected `End`"));
            }
            children.push(self.statement()?);
        }
        Ok(node(SyntaxKind::Block, children))
    }

    fn statement(&mut self) -> SemfixResult<GreenElement> {
        if self.c.at("Return") {
            let mut children = vec![self.c.bump()];
            if !self.c.line_ended() && !self.c.at_eof() {
                children.push(self.expression()?);
            }
            return Ok(node(SyntaxKind::ReturnStatement, children));
        }
        if self.c.at("Dim") {
            let mut children = vec![self.c.bump(), self.c.expect_identifier()?];
            if let Some(as_keyword) = self.c.eat("As") {
                children.push(as_keyword);
                if let Some(new_keyword) = self.c.eat("New") {
                    children.push(new_keyword);
                }
                children.push(self.type_syntax()?);
            }
            if let Some(equals) = self.c.eat("=") {
                children.push(equals);
                children.push(self.expression()?);
            }
            return Ok(node(SyntaxKind::LocalDeclaration, children));
        }
        if self.c.at("If") {
            let mut children = vec![self.c.bump(), self.expression()?];
            if let Some(then) = self.c.eat("Then") {
                children.push(then);
            }
            children.push(self.statements()?);
            if self.c.at("Else") {
                let keyword = self.c.bump();
                let body = self.statements()?;
                children.push(node(SyntaxKind::ElseClause, vec![keyword, body]));
            }
            children.push(self.c.expect("End")?);
            children.push(self.c.expect("If")?);
            return Ok(node(SyntaxKind::IfStatement, children));
        }
        if self.c.at("With") {
            let mut children = vec![self.c.bump(), self.expression()?];
            children.push(self.statements()?);
            children.push(self.c.expect("End")?);
            children.push(self.c.expect("With")?);
            return Ok(node(SyntaxKind::WithBlock, children));
        }
        let mut children = Vec::new();
        if let Some(call) = self.c.eat("Call") {
            children.push(call);
        }
        children.push(self.expression()?);
        Ok(node(SyntaxKind::ExpressionStatement, children))
    }

    fn expression(&mut self) -> SemfixResult<GreenElement> {
        self.binary(1)
    }

    fn binary_precedence(&self) -> Option<u8> {
        if self.c.line_ended() {
            return None;
        }
        let table: &[(&str, u8)] = &[
            ("OrElse", 1),
            ("Or", 1),
            ("AndAlso", 2),
            ("And", 2),
            ("=", 3),
            ("<>", 3),
            ("<", 3),
            (">", 3),
            ("<=", 3),
            (">=", 3),
            ("Is", 3),
            ("IsNot", 3),
            ("&", 4),
            ("+", 5),
            ("-", 5),
            ("*", 6),
            ("/", 6),
        ];
        table
            .iter()
            .find(|(text, _)| self.c.at(text))
            .map(|&(_, precedence)| precedence)
    }

    fn binary(&mut self, min_precedence: u8) -> SemfixResult<GreenElement> {
        let mut left = self.unary()?;
        while let Some(precedence) = self.binary_precedence() {
            if precedence < min_precedence {
                break;
            }
            let operator = self.c.bump();
            let right = self.binary(precedence + 1)?;
            left = node(SyntaxKind::BinaryExpression, vec![left, operator, right]);
        }
        Ok(left)
    }

    fn unary(&mut self) -> SemfixResult<GreenElement> {
        if self.c.at("Not") || self.c.at("-") {
            let operator = self.c.bump();
            let operand = self.unary()?;
            return Ok(node(SyntaxKind::PrefixUnaryExpression, vec![operator, operand]));
        }
        self.postfix()
    }

    fn postfix(&mut self) -> SemfixResult<GreenElement> {
        let mut expression = self.primary()?;
        while !self.c.line_ended() {
            if self.c.at(".") {
                let dot = self.c.bump();
                let name = self.simple_name()?;
                expression = node(SyntaxKind::MemberAccessExpression, vec![expression, dot, name]);
            } else if self.c.at("?") && self.c.nth_at(1, ".") {
                let question = self.c.bump();
                let dot = self.c.bump();
                let name = self.simple_name()?;
                let mut when_not_null = node(SyntaxKind::MemberBindingExpression, vec![dot, name]);
                if self.c.at("(") && !self.c.line_ended() {
                    let arguments = self.argument_list()?;
                    when_not_null =
                        node(SyntaxKind::InvocationExpression, vec![when_not_null, arguments]);
                }
                expression = node(
                    SyntaxKind::ConditionalAccessExpression,
                    vec![expression, question, when_not_null],
                );
            } else if self.c.at("(") {
                let arguments = self.argument_list()?;
                expression = node(SyntaxKind::InvocationExpression, vec![expression, arguments]);
            } else {
                break;
            }
        }
        Ok(expression)
    }

    fn primary(&mut self) -> SemfixResult<GreenElement> {
        match self.c.current().kind() {
            SyntaxKind::NumericLiteralToken
            | SyntaxKind::StringLiteralToken
            | SyntaxKind::CharacterLiteralToken => {
                return Ok(node(SyntaxKind::LiteralExpression, vec![self.c.bump()]));
            }
            SyntaxKind::IdentifierToken => return self.simple_name(),
            _ => {}
        }
        if self.c.at_any(LITERAL_KEYWORDS) {
            return Ok(node(SyntaxKind::LiteralExpression, vec![self.c.bump()]));
        }
        if self.c.at("Me") || self.c.at("MyBase") {
            return Ok(node(SyntaxKind::ThisExpression, vec![self.c.bump()]));
        }
        if self.c.at_any(PREDEFINED_TYPES) {
            return Ok(node(SyntaxKind::PredefinedType, vec![self.c.bump()]));
        }
        if self.c.at(".") {
            // Receiver-less member access inside a `With` block.
            let dot = self.c.bump();
            let name = self.simple_name()?;
            return Ok(node(SyntaxKind::MemberAccessExpression, vec![dot, name]));
        }
        if self.c.at("(") {
            let open = self.c.bump();
            let inner = self.expression()?;
            let close = self.c.expect(")")?;
            return Ok(node(
                SyntaxKind::ParenthesizedExpression,
                vec![open, inner, close],
            ));
        }
        if self.c.at_any(CAST_KEYWORDS) {
            let children = vec![
                self.c.bump(),
                self.c.expect("(")?,
                self.expression()?,
                self.c.expect(",")?,
                self.type_syntax()?,
                self.c.expect(")")?,
            ];
            return Ok(node(SyntaxKind::CastExpression, children));
        }
        if self.c.at("New") {
            let mut children = vec![self.c.bump(), self.type_syntax()?];
            if self.c.at("(") && !self.c.line_ended() {
                children.push(self.argument_list()?);
            }
            return Ok(node(SyntaxKind::ObjectCreationExpression, children));
        }
        Err(self.c.error("expected expression"))
    }

    fn argument_list(&mut self) -> SemfixResult<GreenElement> {
        let mut children = vec![self.c.expect("(")?];
        if !self.c.at(")") {
            loop {
                let argument = self.expression()?;
                children.push(node(SyntaxKind::Argument, vec![argument]));
                match self.c.eat(",") {
                    Some(comma) => children.push(comma),
                    None => break,
                }
            }
        }
        children.push(self.c.expect(")")?);
        Ok(node(SyntaxKind::ArgumentList, children))
    }
}

#[cfg(test)]
mod tests {
    use crate::frontend::parse_visual_basic;
    use crate::syntax::SyntaxKind;

    const SOURCE: &str = "Imports System\n\nClass C\n    Function M(Of T)(a As T, b As T) As Boolean\n        With a\n            Return .Equals(b)\n        End With\n    End Function\nEnd Class\n";

    #[test]
    fn parses_with_blocks_and_receiverless_calls() {
        let tree = parse_visual_basic(SOURCE).unwrap();
        assert_eq!(tree.text(), SOURCE);
        let invocation = tree
            .nodes()
            .find(|node| node.kind() == SyntaxKind::InvocationExpression)
            .unwrap();
        assert_eq!(invocation.text(), ".Equals(b)");
        assert_eq!(
            invocation.parent().unwrap().kind(),
            SyntaxKind::ReturnStatement
        );
        assert!(
            invocation
                .ancestors()
                .any(|node| node.kind() == SyntaxKind::WithBlock)
        );
    }

    #[test]
    fn statements_end_at_line_breaks() {
        let source = "Module M\n    Sub Run(o As Object)\n        Dim x = o\n        x.Equals(o)\n        Call Object.Equals(x, o)\n    End Sub\nEnd Module\n";
        let tree = parse_visual_basic(source).unwrap();
        let statements: Vec<_> = tree
            .nodes()
            .filter(|node| {
                matches!(
                    node.kind(),
                    SyntaxKind::LocalDeclaration | SyntaxKind::ExpressionStatement
                )
            })
            .map(|node| node.text().to_string())
            .collect();
        assert_eq!(
            statements,
            vec!["Dim x = o", "x.Equals(o)", "Call Object.Equals(x, o)"]
        );
    }

    #[test]
    fn type_parameter_constraints_are_part_of_the_parameter() {
        let source = "Class Box(Of T As {Class, IComparable})\nEnd Class\n";
        let tree = parse_visual_basic(source).unwrap();
        let parameter = tree
            .nodes()
            .find(|node| node.kind() == SyntaxKind::TypeParameter)
            .unwrap();
        assert_eq!(parameter.text(), "T As {Class, IComparable}");
    }
}
