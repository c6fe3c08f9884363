//! Expression parsing

use super::*;

/// Binding power of prefix operators; binds tighter than every infix operator.
const PREFIX_PRECEDENCE: u8 = 8;

impl Parser {
    pub(crate) fn parse_expression(&mut self) -> ParseResult<Node<Expr>> {
        self.parse_expression_with_precedence(1)
    }

    pub(crate) fn parse_expression_with_precedence(&mut self, min_precedence: u8) -> ParseResult<Node<Expr>> {
        let start = self.current_token().span;
        let mut left = self.parse_prefix_expression()?;

        loop {
            let precedence = self.get_infix_precedence();
            if precedence == 0 || precedence < min_precedence {
                break;
            }

            let op_kind = self.advance().kind;

            if op_kind == TokenKind::DotDot {
                // Ranges do not chain
                let end = self.parse_expression_with_precedence(precedence + 1)?;
                left = self.finish(
                    Expr::Range {
                        start: Box::new(left),
                        end: Box::new(end),
                    },
                    start,
                );
                continue;
            }

            let op = binary_op(op_kind)
                .ok_or_else(|| self.error(format!("Unknown binary operator {}", op_kind)))?;
            let right = self.parse_expression_with_precedence(precedence + 1)?;
            left = self.finish(
                Expr::Binary {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                start,
            );
        }

        Ok(left)
    }

    fn get_infix_precedence(&self) -> u8 {
        match self.current_token().kind {
            TokenKind::DotDot => 1,
            TokenKind::Or => 2,
            TokenKind::And => 3,
            TokenKind::EqEq | TokenKind::BangEq => 4,
            TokenKind::Lt | TokenKind::Gt | TokenKind::LtEq | TokenKind::GtEq => 5,
            TokenKind::Plus | TokenKind::Minus => 6,
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => 7,
            _ => 0,
        }
    }

    fn parse_prefix_expression(&mut self) -> ParseResult<Node<Expr>> {
        let start = self.current_token().span;

        let op = match self.current_token().kind {
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Negate,
            TokenKind::Amp => UnaryOp::AddressOf,
            TokenKind::Star => UnaryOp::Deref,
            TokenKind::Own => UnaryOp::Own,
            _ => return self.parse_postfix_expression(),
        };

        self.advance();
        let operand = self.parse_expression_with_precedence(PREFIX_PRECEDENCE)?;
        Ok(self.finish(
            Expr::Unary {
                op,
                operand: Box::new(operand),
            },
            start,
        ))
    }

    fn parse_postfix_expression(&mut self) -> ParseResult<Node<Expr>> {
        let start = self.current_token().span;
        let mut expr = self.parse_primary_expression()?;

        loop {
            match self.current_token().kind {
                TokenKind::LParen => {
                    let args = self.parse_arguments()?;
                    expr = self.finish(
                        Expr::Call {
                            callee: Box::new(expr),
                            type_args: Vec::new(),
                            args,
                        },
                        start,
                    );
                }
                // f:[u64](x)
                TokenKind::Colon if self.peek_kind(1) == Some(&TokenKind::LBracket) => {
                    self.advance();
                    let type_args = self.parse_type_arguments()?;
                    let args = self.parse_arguments()?;
                    expr = self.finish(
                        Expr::Call {
                            callee: Box::new(expr),
                            type_args,
                            args,
                        },
                        start,
                    );
                }
                TokenKind::Dot => {
                    self.advance();
                    let member = self.parse_identifier()?;
                    expr = self.finish(
                        Expr::Get {
                            object: Box::new(expr),
                            member,
                        },
                        start,
                    );
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expression()?;
                    self.consume(TokenKind::RBracket)?;
                    expr = self.finish(
                        Expr::Subscript {
                            object: Box::new(expr),
                            index: Box::new(index),
                        },
                        start,
                    );
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    fn parse_primary_expression(&mut self) -> ParseResult<Node<Expr>> {
        let start = self.current_token().span;

        let expr = match self.current_token().kind {
            TokenKind::NumberLiteral => {
                let literal = self.parse_number_literal()?;
                Expr::Number(literal)
            }
            TokenKind::StringLiteral => Expr::String(self.advance().value.clone()),
            TokenKind::True => {
                self.advance();
                Expr::Bool(true)
            }
            TokenKind::False => {
                self.advance();
                Expr::Bool(false)
            }
            TokenKind::Null => {
                self.advance();
                Expr::Null
            }
            TokenKind::Zero => {
                self.advance();
                Expr::Zero
            }
            TokenKind::Identifier => Expr::Ident(self.parse_identifier()?),
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.consume(TokenKind::RParen)?;
                Expr::Group(Box::new(inner))
            }
            TokenKind::New => {
                self.advance();
                let ty = self.parse_type()?;
                let fields = self.parse_field_inits()?;
                Expr::New { ty, fields }
            }
            TokenKind::LBracket => {
                let ty = self.parse_type()?;
                if !matches!(ty.value, TypeExpr::Array { .. }) {
                    return Err(ParseError {
                        message: "Static array literal requires a length, e.g. [3]u64{...}"
                            .to_string(),
                        span: ty.span,
                    });
                }
                let elements = self.parse_array_elements()?;
                Expr::StaticArray { ty, elements }
            }
            TokenKind::Error => return Err(self.lexer_error()),
            _ => {
                return Err(self.error(format!(
                    "Expected expression, found {}",
                    self.current_token().kind
                )))
            }
        };

        Ok(self.finish(expr, start))
    }

    /// Splits `10u8` into digits and suffix.
    fn parse_number_literal(&mut self) -> ParseResult<NumberLiteral> {
        let token = self.advance().clone();
        let split = token
            .value
            .find(|c: char| c.is_ascii_alphabetic())
            .unwrap_or(token.value.len());
        let (text, suffix_text) = token.value.split_at(split);

        let suffix = if suffix_text.is_empty() {
            None
        } else {
            let suffix = NumberSuffix::parse(suffix_text).ok_or_else(|| ParseError {
                message: format!("Invalid number suffix '{}'", suffix_text),
                span: token.span,
            })?;
            Some(suffix)
        };

        let literal = NumberLiteral {
            text: text.to_string(),
            suffix,
        };
        if literal.is_decimal() && suffix.map_or(false, |s| s.kind != NumberKind::Float) {
            return Err(ParseError {
                message: format!("Decimal literal '{}' cannot have an integer suffix", token.value),
                span: token.span,
            });
        }
        Ok(literal)
    }

    fn parse_arguments(&mut self) -> ParseResult<Vec<Node<Expr>>> {
        self.consume(TokenKind::LParen)?;
        let mut args = Vec::new();
        while !self.check(&TokenKind::RParen) && !self.is_at_end() {
            args.push(self.parse_expression()?);
            if !self.check(&TokenKind::RParen) {
                self.consume(TokenKind::Comma)?;
            }
        }
        self.consume(TokenKind::RParen)?;
        Ok(args)
    }

    /// `{ name: value, ... }` after `new Type`
    fn parse_field_inits(&mut self) -> ParseResult<Vec<FieldInit>> {
        self.consume(TokenKind::LBrace)?;
        let mut fields = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            let name = self.parse_identifier()?;
            self.consume(TokenKind::Colon)?;
            let value = self.parse_expression()?;
            fields.push(FieldInit { name, value });
            if !self.check(&TokenKind::RBrace) {
                self.consume(TokenKind::Comma)?;
            }
        }
        self.consume(TokenKind::RBrace)?;
        Ok(fields)
    }

    fn parse_array_elements(&mut self) -> ParseResult<Vec<Node<Expr>>> {
        self.consume(TokenKind::LBrace)?;
        let mut elements = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            elements.push(self.parse_expression()?);
            if !self.check(&TokenKind::RBrace) {
                self.consume(TokenKind::Comma)?;
            }
        }
        self.consume(TokenKind::RBrace)?;
        Ok(elements)
    }
}

fn binary_op(kind: TokenKind) -> Option<BinaryOp> {
    let op = match kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Mod,
        TokenKind::EqEq => BinaryOp::Eq,
        TokenKind::BangEq => BinaryOp::Ne,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::LtEq => BinaryOp::Le,
        TokenKind::GtEq => BinaryOp::Ge,
        TokenKind::And => BinaryOp::And,
        TokenKind::Or => BinaryOp::Or,
        _ => return None,
    };
    Some(op)
}
