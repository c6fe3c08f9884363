//! Statement parsing

use super::*;

impl Parser {
    /// `{ stmt* }`
    pub(crate) fn parse_block(&mut self) -> ParseResult<Block> {
        let start = self.consume(TokenKind::LBrace)?.span;
        let mut stmts = Vec::new();

        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            stmts.push(self.parse_statement()?);
        }

        let end = self.consume(TokenKind::RBrace)?.span;
        Ok(Block {
            stmts,
            span: start.merge(&end),
        })
    }

    pub(crate) fn parse_statement(&mut self) -> ParseResult<Node<Stmt>> {
        let start = self.current_token().span;

        let stmt = match self.current_token().kind {
            TokenKind::Let => {
                let stmt = self.parse_let()?;
                self.consume(TokenKind::Semicolon)?;
                stmt
            }
            TokenKind::LBrace => Stmt::Scope(self.parse_block()?),
            TokenKind::Return => {
                self.advance();
                let value = if self.check(&TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                self.consume(TokenKind::Semicolon)?;
                Stmt::Return(value)
            }
            TokenKind::Break => {
                self.advance();
                self.consume(TokenKind::Semicolon)?;
                Stmt::Break
            }
            TokenKind::Continue => {
                self.advance();
                self.consume(TokenKind::Semicolon)?;
                Stmt::Continue
            }
            TokenKind::If => return self.parse_if(),
            TokenKind::For => Stmt::For(self.parse_for()?),
            TokenKind::Fn | TokenKind::Struct | TokenKind::Import => {
                return Err(self.error(format!(
                    "{} declarations are only allowed at top level",
                    self.current_token().kind
                )))
            }
            _ => {
                let stmt = self.parse_assign_or_expr()?;
                self.consume(TokenKind::Semicolon)?;
                stmt
            }
        };

        Ok(self.finish(stmt, start))
    }

    /// `let name: Type = init` / `let name := init`, without the semicolon
    fn parse_let(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::Let)?;
        let name = self.parse_identifier()?;
        self.consume(TokenKind::Colon)?;
        let ty = if self.check(&TokenKind::Eq) {
            None
        } else {
            Some(self.parse_type()?)
        };
        self.consume(TokenKind::Eq)?;
        let init = self.parse_expression()?;
        Ok(Stmt::Let { name, ty, init })
    }

    /// `target = value` or a bare expression, without the semicolon
    fn parse_assign_or_expr(&mut self) -> ParseResult<Stmt> {
        let target = self.parse_expression()?;
        if self.check(&TokenKind::Eq) {
            self.advance();
            let value = self.parse_expression()?;
            return Ok(Stmt::Assign { target, value });
        }
        Ok(Stmt::Expr(target))
    }

    fn parse_if(&mut self) -> ParseResult<Node<Stmt>> {
        let start = self.consume(TokenKind::If)?.span;
        let condition = self.parse_expression()?;
        let then_block = self.parse_block()?;

        let else_branch = if self.check(&TokenKind::Else) {
            self.advance();
            if self.check(&TokenKind::If) {
                Some(Box::new(self.parse_if()?))
            } else {
                let else_start = self.current_token().span;
                let block = self.parse_block()?;
                Some(Box::new(self.finish(Stmt::Scope(block), else_start)))
            }
        } else {
            None
        };

        Ok(self.finish(
            Stmt::If(IfStmt {
                condition,
                then_block,
                else_branch,
            }),
            start,
        ))
    }

    fn parse_for(&mut self) -> ParseResult<ForStmt> {
        self.consume(TokenKind::For)?;

        let head = if self.check(&TokenKind::Let) {
            let init_start = self.current_token().span;
            let init = self.parse_let()?;
            let init = self.finish(init, init_start);
            self.consume(TokenKind::Semicolon)?;

            let condition = self.parse_expression()?;
            self.consume(TokenKind::Semicolon)?;

            let update_start = self.current_token().span;
            let update = self.parse_assign_or_expr()?;
            let update = self.finish(update, update_start);

            ForHead::Counted {
                init: Box::new(init),
                condition,
                update: Box::new(update),
            }
        } else {
            let binding = self.parse_identifier()?;
            self.consume(TokenKind::Colon)?;
            let iterable = self.parse_expression()?;
            ForHead::Each { binding, iterable }
        };

        let body = self.parse_block()?;
        Ok(ForStmt { head, body })
    }
}
