//! Helper methods and utilities

use super::*;

impl Parser {
    pub(crate) fn parse_identifier(&mut self) -> ParseResult<Ident> {
        let token = self.consume(TokenKind::Identifier)?;
        Ok(Ident::new(token.value.clone(), token.span))
    }

    pub(crate) fn current_token(&self) -> &Token {
        let index = self.current.min(self.tokens.len().saturating_sub(1));
        &self.tokens[index]
    }

    pub(crate) fn previous_token(&self) -> &Token {
        let index = self.current.saturating_sub(1).min(self.tokens.len().saturating_sub(1));
        &self.tokens[index]
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous_token()
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        !self.is_at_end() && &self.current_token().kind == kind
    }

    pub(crate) fn peek_kind(&self, offset: usize) -> Option<&TokenKind> {
        self.tokens.get(self.current + offset).map(|t| &t.kind)
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len() || self.current_token().kind == TokenKind::Eof
    }

    pub(crate) fn consume(&mut self, kind: TokenKind) -> ParseResult<&Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else if self.current_token().kind == TokenKind::Error {
            Err(self.lexer_error())
        } else {
            Err(self.error(format!(
                "Expected {}, found {}",
                kind,
                self.current_token().kind
            )))
        }
    }

    pub(crate) fn error(&self, message: String) -> ParseError {
        ParseError {
            message,
            span: self.current_token().span,
        }
    }

    /// Surfaces the message carried by an `Error` token.
    pub(crate) fn lexer_error(&self) -> ParseError {
        self.error(self.current_token().value.clone())
    }

    /// Skips to the next file-level declaration keyword.
    pub(crate) fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            match self.current_token().kind {
                TokenKind::Fn | TokenKind::Struct | TokenKind::Import => return,
                _ => {}
            }

            self.advance();
        }
    }
}
