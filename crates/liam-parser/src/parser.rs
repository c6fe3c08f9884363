//! Core Parser struct and file-level declarations

use super::*;

/// Recursive descent parser for Liam
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) current: usize,
    next_id: u32,
}

impl Parser {
    /// Creates a new parser from a token stream
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            current: 0,
            next_id: 0,
        }
    }

    /// Parses a complete file, collecting every error and resynchronising after each.
    pub fn parse_file(&mut self) -> Result<SourceFile, Vec<ParseError>> {
        let start_span = self.current_token().span;
        let mut items = Vec::new();
        let mut errors = Vec::new();

        while !self.is_at_end() {
            match self.parse_declaration() {
                Ok(item) => items.push(item),
                Err(err) => {
                    errors.push(err);
                    self.synchronize();
                }
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let span = match items.last() {
            Some(last) => start_span.merge(&last.span),
            None => start_span,
        };
        log::trace!("parsed {} top-level items ({} nodes)", items.len(), self.next_id);
        Ok(SourceFile { items, span })
    }

    /// Wraps `value` in a node with a fresh id.
    pub(crate) fn node<T>(&mut self, value: T, span: Span) -> Node<T> {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        Node::new(id, value, span)
    }

    /// Node spanning from `start` to the previously consumed token.
    pub(crate) fn finish<T>(&mut self, value: T, start: Span) -> Node<T> {
        let span = start.merge(&self.previous_token().span);
        self.node(value, span)
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    pub(crate) fn parse_declaration(&mut self) -> ParseResult<Node<Stmt>> {
        let start = self.current_token().span;

        let stmt = match self.current_token().kind {
            TokenKind::Import => Stmt::Import(self.parse_import_decl()?),
            TokenKind::Struct => Stmt::Struct(self.parse_struct_decl()?),
            TokenKind::Fn => Stmt::Fn(self.parse_fn_decl()?),
            TokenKind::Error => return Err(self.lexer_error()),
            _ => {
                return Err(self.error(format!(
                    "Expected 'import', 'struct' or 'fn' at top level, found {}",
                    self.current_token().kind
                )))
            }
        };

        Ok(self.finish(stmt, start))
    }

    /// `import "path.liam" alias;`
    pub(crate) fn parse_import_decl(&mut self) -> ParseResult<ImportDecl> {
        self.consume(TokenKind::Import)?;
        let path_token = self.consume(TokenKind::StringLiteral)?;
        let path = path_token.value.clone();
        let path_span = path_token.span;
        let alias = self.parse_identifier()?;
        self.consume(TokenKind::Semicolon)?;

        Ok(ImportDecl {
            path,
            path_span,
            alias,
        })
    }

    /// `struct Name[T] { a: T, b: u64 }`
    pub(crate) fn parse_struct_decl(&mut self) -> ParseResult<StructDecl> {
        self.consume(TokenKind::Struct)?;
        let name = self.parse_identifier()?;
        let generics = self.parse_generic_params()?;

        self.consume(TokenKind::LBrace)?;
        let mut members = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            let member_name = self.parse_identifier()?;
            self.consume(TokenKind::Colon)?;
            let ty = self.parse_type()?;
            members.push(Member {
                name: member_name,
                ty,
            });
            if !self.check(&TokenKind::RBrace) {
                self.consume(TokenKind::Comma)?;
            }
        }
        self.consume(TokenKind::RBrace)?;

        Ok(StructDecl {
            name,
            generics,
            members,
        })
    }

    /// `fn name[T](a: T) Ret { ... }`
    pub(crate) fn parse_fn_decl(&mut self) -> ParseResult<FnDecl> {
        self.consume(TokenKind::Fn)?;
        let name = self.parse_identifier()?;
        let generics = self.parse_generic_params()?;

        self.consume(TokenKind::LParen)?;
        let mut params = Vec::new();
        while !self.check(&TokenKind::RParen) && !self.is_at_end() {
            let param_name = self.parse_identifier()?;
            self.consume(TokenKind::Colon)?;
            let ty = self.parse_type()?;
            params.push(Param {
                name: param_name,
                ty,
            });
            if !self.check(&TokenKind::RParen) {
                self.consume(TokenKind::Comma)?;
            }
        }
        self.consume(TokenKind::RParen)?;

        let return_type = if self.check(&TokenKind::LBrace) {
            None
        } else {
            Some(self.parse_type()?)
        };

        let body = self.parse_block()?;

        Ok(FnDecl {
            name,
            generics,
            params,
            return_type,
            body,
        })
    }

    /// Optional `[T, U]` after a declaration name
    fn parse_generic_params(&mut self) -> ParseResult<Vec<Ident>> {
        let mut generics = Vec::new();
        if !self.check(&TokenKind::LBracket) {
            return Ok(generics);
        }
        self.advance();
        while !self.check(&TokenKind::RBracket) && !self.is_at_end() {
            generics.push(self.parse_identifier()?);
            if !self.check(&TokenKind::RBracket) {
                self.consume(TokenKind::Comma)?;
            }
        }
        self.consume(TokenKind::RBracket)?;
        if generics.is_empty() {
            return Err(self.error("Generic parameter list cannot be empty".to_string()));
        }
        Ok(generics)
    }
}
