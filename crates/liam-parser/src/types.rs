//! Type expression parsing

use super::*;

impl Parser {
    /// `u64`, `Pair[T]`, `ns.Name`, `^T`, `~T`, `[]T`, `[N]T`
    pub(crate) fn parse_type(&mut self) -> ParseResult<Node<TypeExpr>> {
        let start = self.current_token().span;

        let ty = match self.current_token().kind {
            TokenKind::Caret | TokenKind::Tilde => {
                let owned = self.advance().kind == TokenKind::Tilde;
                let pointee = self.parse_type()?;
                TypeExpr::Pointer {
                    pointee: Box::new(pointee),
                    owned,
                }
            }
            TokenKind::LBracket => {
                self.advance();
                if self.check(&TokenKind::RBracket) {
                    self.advance();
                    TypeExpr::Slice(Box::new(self.parse_type()?))
                } else {
                    let length_token = self.consume(TokenKind::NumberLiteral)?.clone();
                    let length = length_token.value.parse::<u64>().map_err(|_| ParseError {
                        message: format!("Invalid array length '{}'", length_token.value),
                        span: length_token.span,
                    })?;
                    self.consume(TokenKind::RBracket)?;
                    TypeExpr::Array {
                        length,
                        element: Box::new(self.parse_type()?),
                    }
                }
            }
            TokenKind::Identifier => {
                let first = self.parse_identifier()?;
                let (namespace, name) = if self.check(&TokenKind::Dot) {
                    self.advance();
                    (Some(first), self.parse_identifier()?)
                } else {
                    (None, first)
                };
                let args = if self.check(&TokenKind::LBracket) {
                    self.parse_type_arguments()?
                } else {
                    Vec::new()
                };
                TypeExpr::Named {
                    namespace,
                    name,
                    args,
                }
            }
            _ => {
                return Err(self.error(format!(
                    "Expected type, found {}",
                    self.current_token().kind
                )))
            }
        };

        Ok(self.finish(ty, start))
    }

    /// `[T, U]`
    pub(crate) fn parse_type_arguments(&mut self) -> ParseResult<Vec<Node<TypeExpr>>> {
        self.consume(TokenKind::LBracket)?;
        let mut args = Vec::new();
        while !self.check(&TokenKind::RBracket) && !self.is_at_end() {
            args.push(self.parse_type()?);
            if !self.check(&TokenKind::RBracket) {
                self.consume(TokenKind::Comma)?;
            }
        }
        self.consume(TokenKind::RBracket)?;
        Ok(args)
    }
}
