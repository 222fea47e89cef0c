use crate::error::{SemfixError, SemfixResult};
use crate::syntax::{GreenToken, Language, SyntaxKind};

const CSHARP_KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "decimal", "default", "do", "double", "else", "enum", "extern", "false", "finally",
    "float", "for", "foreach", "if", "in", "int", "interface", "internal", "is", "long",
    "namespace", "new", "null", "object", "out", "override", "params", "private", "protected",
    "public", "readonly", "ref", "return", "sbyte", "sealed", "short", "static", "string",
    "struct", "switch", "this", "throw", "true", "try", "typeof", "uint", "ulong", "ushort",
    "using", "virtual", "void", "while",
];

const VB_KEYWORDS: &[&str] = &[
    "addressof", "and", "andalso", "as", "boolean", "byref", "byte", "byval", "call", "case",
    "char", "class", "const", "ctype", "date", "decimal", "dim", "directcast", "do", "double",
    "each", "else", "elseif", "end", "enum", "false", "for", "friend", "function", "get",
    "implements", "imports", "in", "inherits", "integer", "interface", "is", "isnot", "long",
    "me", "module", "mustinherit", "mustoverride", "mybase", "namespace", "new", "next", "not",
    "notinheritable", "notoverridable", "nothing", "object", "of", "optional", "or", "orelse",
    "overloads", "overridable", "overrides", "paramarray", "partial", "private", "property",
    "protected", "public", "readonly", "return", "shadows", "shared", "short", "single",
    "static", "string", "structure", "sub", "then", "to", "true", "trycast", "typeof", "while",
    "with",
];

const CSHARP_PUNCT2: &[&str] = &[
    "==", "!=", "&&", "||", "<=", ">=", "=>", "++", "--", "+=", "-=", "::", "??",
];

const VB_PUNCT2: &[&str] = &["<>", "<=", ">=", ":=", "+=", "-=", "&="];

const PUNCT1: &[u8] = b".,;:(){}[]<>=!?+-*/&|%^~#";

/// A token plus the byte offset where its text (not its trivia) starts.
#[derive(Debug, Clone)]
pub(crate) struct LexedToken {
    pub token: GreenToken,
    pub start: usize,
}

pub(crate) fn is_keyword(language: Language, text: &str) -> bool {
    match language {
        Language::CSharp => CSHARP_KEYWORDS.contains(&text),
        Language::VisualBasic => {
            let lower = text.to_ascii_lowercase();
            VB_KEYWORDS.contains(&lower.as_str())
        }
    }
}

/// Splits `source` into tokens with attached trivia.
///
/// Trailing trivia runs up to and including the first line break after a
/// token; everything after that belongs to the next token's leading trivia.
/// The final end-of-file token carries whatever trivia is left, so the
/// concatenated tokens always reproduce `source` exactly.
pub(crate) fn tokenize(
    document: &str,
    source: &str,
    language: Language,
) -> SemfixResult<Vec<LexedToken>> {
    let mut lexer = Lexer {
        document,
        src: source,
        bytes: source.as_bytes(),
        pos: 0,
        language,
    };
    let mut tokens = Vec::new();
    loop {
        let leading_start = lexer.pos;
        lexer.skip_leading()?;
        let leading = &source[leading_start..lexer.pos];
        let start = lexer.pos;
        if start >= source.len() {
            tokens.push(LexedToken {
                token: GreenToken::new(SyntaxKind::EndOfFileToken, "").with_leading(leading),
                start,
            });
            return Ok(tokens);
        }
        let kind = lexer.scan()?;
        let end = lexer.pos;
        lexer.skip_trailing()?;
        let token = GreenToken::new(kind, &source[start..end])
            .with_leading(leading)
            .with_trailing(&source[end..lexer.pos]);
        tokens.push(LexedToken { token, start });
    }
}

struct Lexer<'s> {
    document: &'s str,
    src: &'s str,
    bytes: &'s [u8],
    pos: usize,
    language: Language,
}

fn is_ident_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_' || byte >= 0x80
}

fn is_ident_continue(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte >= 0x80
}

impl Lexer<'_> {
    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> SemfixError {
        SemfixError::parse(self.document, offset, message)
    }

    fn starts_comment(&self) -> bool {
        match self.language {
            Language::CSharp => {
                self.peek_at(0) == Some(b'/') && matches!(self.peek_at(1), Some(b'/' | b'*'))
            }
            Language::VisualBasic => self.peek_at(0) == Some(b'\''),
        }
    }

    fn skip_comment(&mut self) -> SemfixResult<()> {
        if self.language == Language::CSharp && self.peek_at(1) == Some(b'*') {
            let start = self.pos;
            match self.src[self.pos + 2..].find("*/") {
                Some(index) => self.pos += 2 + index + 2,
                None => return Err(self.error(start, "unterminated block comment")),
            }
            return Ok(());
        }
        while let Some(byte) = self.peek_at(0) {
            if byte == b'\n' || byte == b'\r' {
                break;
            }
            self.pos += 1;
        }
        Ok(())
    }

    fn skip_leading(&mut self) -> SemfixResult<()> {
        loop {
            match self.peek_at(0) {
                Some(b' ' | b'\t' | b'\r' | b'\n') => self.pos += 1,
                Some(_) if self.starts_comment() => self.skip_comment()?,
                _ => return Ok(()),
            }
        }
    }

    fn skip_trailing(&mut self) -> SemfixResult<()> {
        loop {
            match self.peek_at(0) {
                Some(b' ' | b'\t') => self.pos += 1,
                Some(b'\n') => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(b'\r') => {
                    self.pos += 1;
                    if self.peek_at(0) == Some(b'\n') {
                        self.pos += 1;
                    }
                    return Ok(());
                }
                Some(_) if self.starts_comment() => self.skip_comment()?,
                _ => return Ok(()),
            }
        }
    }

    fn scan(&mut self) -> SemfixResult<SyntaxKind> {
        let start = self.pos;
        let byte = self.bytes[start];

        if is_ident_start(byte) {
            self.pos += 1;
            while self.peek_at(0).is_some_and(is_ident_continue) {
                self.pos += 1;
            }
            let text = &self.src[start..self.pos];
            return Ok(if is_keyword(self.language, text) {
                SyntaxKind::KeywordToken
            } else {
                SyntaxKind::IdentifierToken
            });
        }

        if byte.is_ascii_digit() {
            self.pos += 1;
            while let Some(next) = self.peek_at(0) {
                let fraction = next == b'.' && self.peek_at(1).is_some_and(|d| d.is_ascii_digit());
                if next.is_ascii_alphanumeric() || next == b'_' || fraction {
                    self.pos += 1;
                } else {
                    break;
                }
            }
            return Ok(SyntaxKind::NumericLiteralToken);
        }

        match (self.language, byte) {
            (Language::CSharp, b'"') => {
                self.scan_escaped_string(start)?;
                return Ok(SyntaxKind::StringLiteralToken);
            }
            (Language::CSharp, b'@') if self.peek_at(1) == Some(b'"') => {
                self.pos += 1;
                self.scan_doubled_quote_string(start)?;
                return Ok(SyntaxKind::StringLiteralToken);
            }
            (Language::CSharp, b'\'') => {
                self.scan_char(start)?;
                return Ok(SyntaxKind::CharacterLiteralToken);
            }
            (Language::VisualBasic, b'"') => {
                self.scan_doubled_quote_string(start)?;
                if matches!(self.peek_at(0), Some(b'c' | b'C'))
                    && !self.peek_at(1).is_some_and(is_ident_continue)
                {
                    self.pos += 1;
                    return Ok(SyntaxKind::CharacterLiteralToken);
                }
                return Ok(SyntaxKind::StringLiteralToken);
            }
            _ => {}
        }

        let pairs = match self.language {
            Language::CSharp => CSHARP_PUNCT2,
            Language::VisualBasic => VB_PUNCT2,
        };
        if let Some(two) = self.src.get(start..start + 2) {
            if pairs.contains(&two) {
                self.pos += 2;
                return Ok(SyntaxKind::PunctuationToken);
            }
        }
        if PUNCT1.contains(&byte) {
            self.pos += 1;
            return Ok(SyntaxKind::PunctuationToken);
        }

        let found = self.src[start..].chars().next().unwrap_or('?');
        Err(self.error(start, format!("unexpected character `{found}`")))
    }

    fn scan_escaped_string(&mut self, start: usize) -> SemfixResult<()> {
        self.pos += 1;
        loop {
            match self.peek_at(0) {
                Some(b'\\') => self.pos += 2,
                Some(b'"') => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(b'\n') | None => return Err(self.error(start, "unterminated string literal")),
                Some(_) => self.pos += 1,
            }
        }
    }

    fn scan_doubled_quote_string(&mut self, start: usize) -> SemfixResult<()> {
        self.pos += 1;
        loop {
            match self.peek_at(0) {
                Some(b'"') if self.peek_at(1) == Some(b'"') => self.pos += 2,
                Some(b'"') => {
                    self.pos += 1;
                    return Ok(());
                }
                None => return Err(self.error(start, "unterminated string literal")),
                Some(_) => self.pos += 1,
            }
        }
    }

    fn scan_char(&mut self, start: usize) -> SemfixResult<()> {
        self.pos += 1;
        loop {
            match self.peek_at(0) {
                Some(b'\\') => self.pos += 2,
                Some(b'\'') => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(b'\n') | None => {
                    return Err(self.error(start, "unterminated character literal"));
                }
                Some(_) => self.pos += 1,
            }
        }
    }
}
