use super::lexer::LexedToken;
use crate::error::{SemfixError, SemfixResult};
use crate::syntax::{GreenElement, GreenToken, Language, SyntaxKind};

/// Token stream shared by both recursive-descent parsers.
pub(super) struct TokenCursor<'d> {
    document: &'d str,
    language: Language,
    tokens: Vec<LexedToken>,
    pos: usize,
}

impl<'d> TokenCursor<'d> {
    pub(super) fn new(document: &'d str, language: Language, tokens: Vec<LexedToken>) -> Self {
        Self {
            document,
            language,
            tokens,
            pos: 0,
        }
    }

    pub(super) fn nth(&self, n: usize) -> &GreenToken {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[(self.pos + n).min(last)].token
    }

    pub(super) fn current(&self) -> &GreenToken {
        self.nth(0)
    }

    /// True when the `n`th token spells `text`. Literal tokens never match.
    pub(super) fn nth_at(&self, n: usize, text: &str) -> bool {
        let token = self.nth(n);
        matches!(
            token.kind(),
            SyntaxKind::KeywordToken | SyntaxKind::IdentifierToken | SyntaxKind::PunctuationToken
        ) && self.language.names_equal(token.text(), text)
    }

    pub(super) fn at(&self, text: &str) -> bool {
        self.nth_at(0, text)
    }

    pub(super) fn at_any(&self, texts: &[&str]) -> bool {
        texts.iter().any(|text| self.at(text))
    }

    pub(super) fn at_kind(&self, kind: SyntaxKind) -> bool {
        self.current().kind() == kind
    }

    pub(super) fn at_eof(&self) -> bool {
        self.at_kind(SyntaxKind::EndOfFileToken)
    }

    pub(super) fn bump(&mut self) -> GreenElement {
        let token = self.current().clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token.into()
    }

    pub(super) fn eat(&mut self, text: &str) -> Option<GreenElement> {
        self.at(text).then(|| self.bump())
    }

    pub(super) fn expect(&mut self, text: &str) -> SemfixResult<GreenElement> {
        if self.at(text) {
            Ok(self.bump())
        } else {
            Err(self.error(format!("expected `{text}`")))
        }
    }

    pub(super) fn expect_identifier(&mut self) -> SemfixResult<GreenElement> {
        if self.at_kind(SyntaxKind::IdentifierToken) {
            Ok(self.bump())
        } else {
            Err(self.error("expected identifier"))
        }
    }

    pub(super) fn checkpoint(&self) -> usize {
        self.pos
    }

    pub(super) fn rewind(&mut self, checkpoint: usize) {
        self.pos = checkpoint;
    }

    /// True when the previous token's trailing trivia ended its line.
    pub(super) fn line_ended(&self) -> bool {
        match self.pos.checked_sub(1) {
            Some(previous) => self.tokens[previous].token.trailing().contains('\n'),
            None => true,
        }
    }

    pub(super) fn error(&self, message: impl Into<String>) -> SemfixError {
        let last = self.tokens.len().saturating_sub(1);
        let offset = self.tokens.get(self.pos.min(last)).map_or(0, |lexed| lexed.start);
        let found = self.current().text();
        let message = message.into();
        let message = if found.is_empty() {
            format!("{message}, found end of file")
        } else {
            format!("{message}, found `{found}`")
        };
        SemfixError::parse(self.document, offset, message)
    }
}
