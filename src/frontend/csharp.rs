use super::cursor::TokenCursor;
use crate::error::SemfixResult;
use crate::syntax::make::node;
use crate::syntax::{GreenElement, GreenNode, SyntaxKind};

const MODIFIERS: &[&str] = &[
    "public", "private", "protected", "internal", "static", "abstract", "sealed", "partial",
    "virtual", "override", "readonly", "new", "extern", "const",
];

const PREDEFINED_TYPES: &[&str] = &[
    "bool", "byte", "char", "decimal", "double", "float", "int", "long", "object", "sbyte",
    "short", "string", "uint", "ulong", "ushort", "void",
];

const TYPE_KEYWORDS: &[&str] = &["class", "struct", "interface"];

const LITERAL_KEYWORDS: &[&str] = &["true", "false", "null"];

pub(super) fn parse(cursor: TokenCursor<'_>) -> SemfixResult<GreenNode> {
    CSharpParser { c: cursor }.compilation_unit()
}

struct CSharpParser<'d> {
    c: TokenCursor<'d>,
}

impl CSharpParser<'_> {
    fn compilation_unit(&mut self) -> SemfixResult<GreenNode> {
        let mut children = Vec::new();
        while self.c.at("using") {
            children.push(self.using_directive()?);
        }
        while !self.c.at_eof() {
            children.push(self.namespace_member()?);
        }
        children.push(self.c.bump());
        Ok(GreenNode::new(SyntaxKind::CompilationUnit, children))
    }

    fn using_directive(&mut self) -> SemfixResult<GreenElement> {
        let mut children = vec![self.c.bump()];
        if let Some(keyword) = self.c.eat("static") {
            children.push(keyword);
        }
        children.push(self.name()?);
        children.push(self.c.expect(";")?);
        Ok(node(SyntaxKind::ImportDirective, children))
    }

    fn namespace_member(&mut self) -> SemfixResult<GreenElement> {
        if self.c.at("namespace") {
            return self.namespace_declaration();
        }
        let modifiers = self.modifiers();
        if self.c.at_any(TYPE_KEYWORDS) {
            return self.type_declaration(modifiers);
        }
        Err(self.c.error("expected a namespace or type declaration"))
    }

    fn namespace_declaration(&mut self) -> SemfixResult<GreenElement> {
        let mut children = vec![self.c.bump(), self.name()?, self.c.expect("{")?];
        while self.c.at("using") {
            children.push(self.using_directive()?);
        }
        while !self.c.at("}") {
            if self.c.at_eof() {
                return Err(self.c.error("expected `}`"));
            }
            children.push(self.namespace_member()?);
        }
        children.push(self.c.bump());
        Ok(node(SyntaxKind::NamespaceDeclaration, children))
    }

    fn modifiers(&mut self) -> Vec<GreenElement> {
        let mut modifiers = Vec::new();
        while self.c.at_any(MODIFIERS) {
            modifiers.push(self.c.bump());
        }
        modifiers
    }

    fn type_declaration(&mut self, mut children: Vec<GreenElement>) -> SemfixResult<GreenElement> {
        children.push(self.c.bump());
        children.push(self.c.expect_identifier()?);
        if self.c.at("<") {
            children.push(self.type_parameter_list()?);
        }
        if self.c.at(":") {
            children.push(self.base_list()?);
        }
        while self.c.at("where") {
            children.push(self.constraint_clause()?);
        }
        children.push(self.c.expect("{")?);
        while !self.c.at("}") {
            if self.c.at_eof() {
                return Err(self.c.error("expected `}`"));
            }
            children.push(self.type_member()?);
        }
        children.push(self.c.bump());
        if let Some(semicolon) = self.c.eat(";") {
            children.push(semicolon);
        }
        Ok(node(SyntaxKind::TypeDeclaration, children))
    }

    fn type_parameter_list(&mut self) -> SemfixResult<GreenElement> {
        let mut children = vec![self.c.expect("<")?];
        loop {
            let name = self.c.expect_identifier()?;
            children.push(node(SyntaxKind::TypeParameter, vec![name]));
            match self.c.eat(",") {
                Some(comma) => children.push(comma),
                None => break,
            }
        }
        children.push(self.c.expect(">")?);
        Ok(node(SyntaxKind::TypeParameterList, children))
    }

    fn base_list(&mut self) -> SemfixResult<GreenElement> {
        let mut children = vec![self.c.bump(), self.type_syntax()?];
        while let Some(comma) = self.c.eat(",") {
            children.push(comma);
            children.push(self.type_syntax()?);
        }
        Ok(node(SyntaxKind::BaseList, children))
    }

    fn constraint_clause(&mut self) -> SemfixResult<GreenElement> {
        let mut children = vec![self.c.bump(), self.c.expect_identifier()?, self.c.expect(":")?];
        loop {
            if self.c.at("class") || self.c.at("struct") {
                children.push(self.c.bump());
            } else if self.c.at("new") {
                children.push(self.c.bump());
                children.push(self.c.expect("(")?);
                children.push(self.c.expect(")")?);
            } else {
                children.push(self.type_syntax()?);
            }
            match self.c.eat(",") {
                Some(comma) => children.push(comma),
                None => break,
            }
        }
        Ok(node(SyntaxKind::ConstraintClause, children))
    }

    fn type_member(&mut self) -> SemfixResult<GreenElement> {
        let mut children = self.modifiers();
        if self.c.at_any(TYPE_KEYWORDS) {
            return self.type_declaration(children);
        }
        let is_constructor =
            self.c.at_kind(SyntaxKind::IdentifierToken) && self.c.nth_at(1, "(");
        if !is_constructor {
            children.push(self.type_syntax()?);
        }
        children.push(self.c.expect_identifier()?);
        if self.c.at("(") || self.c.at("<") {
            if self.c.at("<") {
                children.push(self.type_parameter_list()?);
            }
            children.push(self.parameter_list()?);
            while self.c.at("where") {
                children.push(self.constraint_clause()?);
            }
            if self.c.at("{") {
                children.push(self.block()?);
            } else if let Some(arrow) = self.c.eat("=>") {
                children.push(arrow);
                children.push(self.expression()?);
                children.push(self.c.expect(";")?);
            } else {
                children.push(self.c.expect(";")?);
            }
            return Ok(node(SyntaxKind::MethodDeclaration, children));
        }
        if let Some(equals) = self.c.eat("=") {
            children.push(equals);
            children.push(self.expression()?);
        }
        children.push(self.c.expect(";")?);
        Ok(node(SyntaxKind::FieldDeclaration, children))
    }

    fn parameter_list(&mut self) -> SemfixResult<GreenElement> {
        let mut children = vec![self.c.expect("(")?];
        if !self.c.at(")") {
            loop {
                let mut parameter = Vec::new();
                while self.c.at_any(&["ref", "out", "in", "params", "this"]) {
                    parameter.push(self.c.bump());
                }
                parameter.push(self.type_syntax()?);
                parameter.push(self.c.expect_identifier()?);
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

    /// A possibly qualified name in type context.
    fn name(&mut self) -> SemfixResult<GreenElement> {
        let mut name = self.simple_name(true)?;
        while self.c.at(".") && self.c.nth(1).kind() == SyntaxKind::IdentifierToken {
            let dot = self.c.bump();
            let right = self.simple_name(true)?;
            name = node(SyntaxKind::QualifiedName, vec![name, dot, right]);
        }
        Ok(name)
    }

    /// In expression context a `<` only starts type arguments when the list
    /// closes and is followed by `(` or `.`.
    fn simple_name(&mut self, type_context: bool) -> SemfixResult<GreenElement> {
        let identifier = self.c.expect_identifier()?;
        if self.c.at("<") {
            let checkpoint = self.c.checkpoint();
            match self.type_argument_list() {
                Ok(arguments) if type_context || self.c.at("(") || self.c.at(".") => {
                    return Ok(node(SyntaxKind::GenericName, vec![identifier, arguments]));
                }
                _ => self.c.rewind(checkpoint),
            }
        }
        Ok(node(SyntaxKind::IdentifierName, vec![identifier]))
    }

    fn type_argument_list(&mut self) -> SemfixResult<GreenElement> {
        let mut children = vec![self.c.expect("<")?, self.type_syntax()?];
        while let Some(comma) = self.c.eat(",") {
            children.push(comma);
            children.push(self.type_syntax()?);
        }
        children.push(self.c.expect(">")?);
        Ok(node(SyntaxKind::TypeArgumentList, children))
    }

    fn block(&mut self) -> SemfixResult<GreenElement> {
        let mut children = vec![self.c.expect("{")?];
        while !self.c.at("}") {
            if self.c.at_eof() {
                return Err(self.c.error("expected `}`"));
            }
            children.push(self.statement()?);
        }
        children.push(self.c.bump());
        Ok(node(SyntaxKind::Block, children))
    }

    fn statement(&mut self) -> SemfixResult<GreenElement> {
        if self.c.at("{") {
            return self.block();
        }
        if self.c.at("return") {
            let mut children = vec![self.c.bump()];
            if !self.c.at(";") {
                children.push(self.expression()?);
            }
            children.push(self.c.expect(";")?);
            return Ok(node(SyntaxKind::ReturnStatement, children));
        }
        if self.c.at("if") {
            let mut children = vec![
                self.c.bump(),
                self.c.expect("(")?,
                self.expression()?,
                self.c.expect(")")?,
                self.statement()?,
            ];
            if self.c.at("else") {
                let keyword = self.c.bump();
                let body = self.statement()?;
                children.push(node(SyntaxKind::ElseClause, vec![keyword, body]));
            }
            return Ok(node(SyntaxKind::IfStatement, children));
        }
        if let Some(local) = self.local_declaration()? {
            return Ok(local);
        }
        let expression = self.expression()?;
        let semicolon = self.c.expect(";")?;
        Ok(node(SyntaxKind::ExpressionStatement, vec![expression, semicolon]))
    }

    fn local_declaration(&mut self) -> SemfixResult<Option<GreenElement>> {
        if !(self.c.at_kind(SyntaxKind::IdentifierToken) || self.c.at_any(PREDEFINED_TYPES)) {
            return Ok(None);
        }
        let checkpoint = self.c.checkpoint();
        let Ok(ty) = self.type_syntax() else {
            self.c.rewind(checkpoint);
            return Ok(None);
        };
        let declares = self.c.at_kind(SyntaxKind::IdentifierToken)
            && (self.c.nth_at(1, "=") || self.c.nth_at(1, ";"));
        if !declares {
            self.c.rewind(checkpoint);
            return Ok(None);
        }
        let mut children = vec![ty, self.c.bump()];
        if let Some(equals) = self.c.eat("=") {
            children.push(equals);
            children.push(self.expression()?);
        }
        children.push(self.c.expect(";")?);
        Ok(Some(node(SyntaxKind::LocalDeclaration, children)))
    }

    fn expression(&mut self) -> SemfixResult<GreenElement> {
        let left = self.binary(1)?;
        if self.c.at("=") {
            let operator = self.c.bump();
            let right = self.expression()?;
            return Ok(node(SyntaxKind::BinaryExpression, vec![left, operator, right]));
        }
        Ok(left)
    }

    fn binary_precedence(&self) -> Option<u8> {
        let token = self.c.current();
        if token.kind() != SyntaxKind::PunctuationToken {
            return None;
        }
        match token.text() {
            "??" => Some(1),
            "||" => Some(2),
            "&&" => Some(3),
            "==" | "!=" => Some(4),
            "<" | ">" | "<=" | ">=" => Some(5),
            "+" | "-" => Some(6),
            "*" | "/" | "%" => Some(7),
            _ => None,
        }
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
        if self.c.at("!") || self.c.at("-") {
            let operator = self.c.bump();
            let operand = self.unary()?;
            return Ok(node(SyntaxKind::PrefixUnaryExpression, vec![operator, operand]));
        }
        if self.c.at("(") {
            if let Some(cast) = self.cast()? {
                return Ok(cast);
            }
        }
        self.postfix()
    }

    /// `(T)x` is a cast only when the parenthesized part is a type and the
    /// next token can start an operand.
    fn cast(&mut self) -> SemfixResult<Option<GreenElement>> {
        let checkpoint = self.c.checkpoint();
        let open = self.c.bump();
        let Ok(ty) = self.type_syntax() else {
            self.c.rewind(checkpoint);
            return Ok(None);
        };
        if !self.c.at(")") {
            self.c.rewind(checkpoint);
            return Ok(None);
        }
        let close = self.c.bump();
        let operand_follows = matches!(
            self.c.current().kind(),
            SyntaxKind::IdentifierToken
                | SyntaxKind::NumericLiteralToken
                | SyntaxKind::StringLiteralToken
                | SyntaxKind::CharacterLiteralToken
        ) || self.c.at_any(&["(", "this", "new", "base"])
            || self.c.at_any(LITERAL_KEYWORDS)
            || self.c.at_any(PREDEFINED_TYPES);
        if !operand_follows {
            self.c.rewind(checkpoint);
            return Ok(None);
        }
        let operand = self.unary()?;
        Ok(Some(node(
            SyntaxKind::CastExpression,
            vec![open, ty, close, operand],
        )))
    }

    fn postfix(&mut self) -> SemfixResult<GreenElement> {
        let mut expression = self.primary()?;
        loop {
            if self.c.at(".") {
                let dot = self.c.bump();
                let name = self.simple_name(false)?;
                expression = node(SyntaxKind::MemberAccessExpression, vec![expression, dot, name]);
            } else if self.c.at("?") && self.c.nth_at(1, ".") {
                expression = self.conditional_access(expression)?;
            } else if self.c.at("(") {
                let arguments = self.argument_list()?;
                expression = node(SyntaxKind::InvocationExpression, vec![expression, arguments]);
            } else {
                return Ok(expression);
            }
        }
    }

    fn conditional_access(&mut self, expression: GreenElement) -> SemfixResult<GreenElement> {
        let question = self.c.bump();
        let dot = self.c.bump();
        let name = self.simple_name(false)?;
        let mut when_not_null = node(SyntaxKind::MemberBindingExpression, vec![dot, name]);
        loop {
            if self.c.at(".") {
                let dot = self.c.bump();
                let name = self.simple_name(false)?;
                when_not_null =
                    node(SyntaxKind::MemberAccessExpression, vec![when_not_null, dot, name]);
            } else if self.c.at("(") {
                let arguments = self.argument_list()?;
                when_not_null =
                    node(SyntaxKind::InvocationExpression, vec![when_not_null, arguments]);
            } else if self.c.at("?") && self.c.nth_at(1, ".") {
                when_not_null = self.conditional_access(when_not_null)?;
                break;
            } else {
                break;
            }
        }
        Ok(node(
            SyntaxKind::ConditionalAccessExpression,
            vec![expression, question, when_not_null],
        ))
    }

    fn primary(&mut self) -> SemfixResult<GreenElement> {
        match self.c.current().kind() {
            SyntaxKind::NumericLiteralToken
            | SyntaxKind::StringLiteralToken
            | SyntaxKind::CharacterLiteralToken => {
                return Ok(node(SyntaxKind::LiteralExpression, vec![self.c.bump()]));
            }
            SyntaxKind::IdentifierToken => return self.simple_name(false),
            _ => {}
        }
        if self.c.at_any(LITERAL_KEYWORDS) {
            return Ok(node(SyntaxKind::LiteralExpression, vec![self.c.bump()]));
        }
        if self.c.at("this") || self.c.at("base") {
            return Ok(node(SyntaxKind::ThisExpression, vec![self.c.bump()]));
        }
        if self.c.at_any(PREDEFINED_TYPES) {
            return Ok(node(SyntaxKind::PredefinedType, vec![self.c.bump()]));
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
        if self.c.at("new") {
            let mut children = vec![self.c.bump(), self.type_syntax()?];
            if self.c.at("(") {
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
                let mut argument = Vec::new();
                if self.c.at_any(&["ref", "out", "in"]) {
                    argument.push(self.c.bump());
                }
                argument.push(self.expression()?);
                children.push(node(SyntaxKind::Argument, argument));
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
