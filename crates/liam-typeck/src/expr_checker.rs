//! Expression checking methods

use liam_ast::{BinaryOp, Expr, FieldInit, Ident, Node, NumberKind, NumberLiteral, Span, TypeExpr, UnaryOp};

use crate::checker::UnitChecker;
use crate::error::ErrorKind;
use crate::generics::Instantiator;
use crate::helpers::TypeHelpers;
use crate::types::{FnType, NumberType, Ownership, TypeInfo};

impl<'a> UnitChecker<'a> {
    /// Checks `expr`, records its type and returns it.
    ///
    /// Never fails: a bad node is reported and typed `Any` so siblings are
    /// still checked.
    pub(crate) fn check_expr(&mut self, expr: &Node<Expr>) -> TypeInfo {
        let ty = match &expr.value {
            Expr::Binary { left, op, right } => self.check_binary(left, *op, right),
            Expr::Unary { op, operand } => self.check_unary(*op, operand),
            Expr::Number(literal) => number_literal_type(literal),
            Expr::String(_) => TypeInfo::String,
            Expr::Bool(_) => TypeInfo::Bool,
            Expr::Ident(ident) => self.check_ident(ident),
            Expr::Call { callee, type_args, args } => self.check_call(expr.span, callee, type_args, args),
            Expr::Get { object, member } => self.check_get(object, member),
            Expr::New { ty, fields } => self.check_new(expr.span, ty, fields),
            Expr::Group(inner) => self.check_expr(inner),
            Expr::Null => TypeInfo::null_pointer(),
            Expr::Zero => TypeInfo::Any,
            Expr::StaticArray { ty, elements } => self.check_static_array(expr.span, ty, elements),
            Expr::Subscript { object, index } => self.check_subscript(object, index),
            Expr::Range { start, end } => self.check_range(start, end),
        };
        self.table.record(expr.id, ty.clone());
        ty
    }

    fn check_ident(&mut self, ident: &Ident) -> TypeInfo {
        let unit = self.unit;
        let found = self
            .locals
            .lookup(&ident.name)
            .or_else(|| unit.scopes.functions.get(&ident.name))
            .or_else(|| unit.scopes.namespaces.get(&ident.name))
            .cloned();
        match found {
            Some(ty) => ty,
            None => {
                self.error(ident.span, ErrorKind::UnknownIdentifier(ident.name.clone()));
                TypeInfo::Any
            }
        }
    }

    fn check_binary(&mut self, left: &Node<Expr>, op: BinaryOp, right: &Node<Expr>) -> TypeInfo {
        let left_ty = self.check_expr(left);
        let right_ty = self.check_expr(right);

        if op.is_logical() {
            self.expect_operand(op, left.span, &left_ty, |ty| *ty == TypeInfo::Bool);
            self.expect_operand(op, right.span, &right_ty, |ty| *ty == TypeInfo::Bool);
            return TypeInfo::Bool;
        }

        let numeric = |ty: &TypeInfo| matches!(ty, TypeInfo::Number(_));
        let comparable = |ty: &TypeInfo| {
            matches!(
                ty,
                TypeInfo::Number(_) | TypeInfo::Bool | TypeInfo::String | TypeInfo::Pointer { .. }
            )
        };
        let operands_ok = if op.is_equality() {
            self.expect_operand(op, left.span, &left_ty, comparable)
                & self.expect_operand(op, right.span, &right_ty, comparable)
        } else {
            self.expect_operand(op, left.span, &left_ty, numeric)
                & self.expect_operand(op, right.span, &right_ty, numeric)
        };

        let unified = if operands_ok {
            match TypeHelpers::unify(&left_ty, &right_ty) {
                Some(ty) => ty,
                None => {
                    self.error(
                        right.span,
                        ErrorKind::TypeMismatch {
                            expected: left_ty,
                            found: right_ty,
                        },
                    );
                    TypeInfo::Any
                }
            }
        } else {
            TypeInfo::Any
        };

        if op.is_arithmetic() {
            unified
        } else {
            TypeInfo::Bool
        }
    }

    /// Reports `ty` as an invalid operand of `op` unless `accept` holds or it is `Any`.
    fn expect_operand(&mut self, op: impl ToString, span: Span, ty: &TypeInfo, accept: impl Fn(&TypeInfo) -> bool) -> bool {
        if ty.is_any() || accept(ty) {
            return true;
        }
        self.error(
            span,
            ErrorKind::InvalidOperand {
                op: op.to_string().trim().to_string(),
                ty: ty.clone(),
            },
        );
        false
    }

    fn check_unary(&mut self, op: UnaryOp, operand: &Node<Expr>) -> TypeInfo {
        let operand_ty = self.check_expr(operand);
        match op {
            UnaryOp::Not => {
                self.expect_operand(op, operand.span, &operand_ty, |ty| *ty == TypeInfo::Bool);
                TypeInfo::Bool
            }
            UnaryOp::Negate => {
                let signed = |ty: &TypeInfo| {
                    matches!(ty, TypeInfo::Number(n) if n.kind != NumberKind::Unsigned)
                };
                if self.expect_operand(op, operand.span, &operand_ty, signed) {
                    operand_ty
                } else {
                    TypeInfo::Any
                }
            }
            UnaryOp::AddressOf => TypeInfo::pointer(operand_ty, Ownership::Weak),
            UnaryOp::Own => TypeInfo::pointer(operand_ty, Ownership::Owned),
            UnaryOp::Deref => match operand_ty {
                TypeInfo::Pointer { pointee, .. } => *pointee,
                TypeInfo::Any => TypeInfo::Any,
                other => {
                    self.error(operand.span, ErrorKind::DerefNonPointer(other));
                    TypeInfo::Any
                }
            },
        }
    }

    fn check_call(
        &mut self,
        span: Span,
        callee: &Node<Expr>,
        type_args: &[Node<TypeExpr>],
        args: &[Node<Expr>],
    ) -> TypeInfo {
        let callee_ty = self.check_expr(callee);
        let arg_types: Vec<(Span, TypeInfo)> = args.iter().map(|arg| (arg.span, self.check_expr(arg))).collect();

        let signature = match callee_ty {
            TypeInfo::Fn(signature) => signature,
            TypeInfo::Any => return TypeInfo::Any,
            other => {
                self.error(callee.span, ErrorKind::NotCallable(other));
                return TypeInfo::Any;
            }
        };

        let signature = self.instantiate_call(callee, &signature, type_args);

        if signature.params.len() != arg_types.len() {
            self.error(
                span,
                ErrorKind::ArgumentCount {
                    expected: signature.params.len(),
                    found: arg_types.len(),
                },
            );
        }
        for ((arg_span, found), expected) in arg_types.iter().zip(&signature.params) {
            self.expect_type(*arg_span, found, expected);
        }

        *signature.return_type
    }

    /// Binds explicit type arguments; on an arity mismatch the missing ones become `Any`.
    fn instantiate_call(&mut self, callee: &Node<Expr>, signature: &FnType, type_args: &[Node<TypeExpr>]) -> FnType {
        let resolved: Vec<TypeInfo> = type_args.iter().map(|arg| self.resolve_type(arg)).collect();
        if resolved.len() != signature.generic_arity {
            let name = match &callee.value {
                Expr::Ident(ident) => ident.name.clone(),
                Expr::Get { member, .. } => member.name.clone(),
                _ => "function".to_string(),
            };
            self.error(
                callee.span,
                ErrorKind::GenericArity {
                    name,
                    expected: signature.generic_arity,
                    found: resolved.len(),
                },
            );
            let fitted = Instantiator::fit_args(resolved, signature.generic_arity);
            return self.instantiator.instantiate_fn(signature, &fitted);
        }
        if signature.generic_arity == 0 {
            return signature.clone();
        }
        self.instantiator.instantiate_fn(signature, &resolved)
    }

    fn check_get(&mut self, object: &Node<Expr>, member: &Ident) -> TypeInfo {
        let object_ty = self.check_expr(object);
        let target = match &object_ty {
            TypeInfo::Namespace(unit) => {
                let found = self.bundle.get(*unit).and_then(|u| u.scopes.functions.get(&member.name));
                return match found {
                    Some(ty) => ty.clone(),
                    None => {
                        self.unknown_member(member, &object_ty);
                        TypeInfo::Any
                    }
                };
            }
            TypeInfo::Pointer { pointee, .. } => pointee.as_ref(),
            other => other,
        };

        match target {
            TypeInfo::Any => TypeInfo::Any,
            TypeInfo::Struct { .. } | TypeInfo::StructInstance { .. } => {
                match Instantiator::member_type(self.bundle, target, &member.name) {
                    Some(ty) => ty,
                    None => {
                        let owner = target.clone();
                        self.unknown_member(member, &owner);
                        TypeInfo::Any
                    }
                }
            }
            other => {
                let other = other.clone();
                self.error(object.span, ErrorKind::NotAStruct(other));
                TypeInfo::Any
            }
        }
    }

    fn unknown_member(&mut self, member: &Ident, ty: &TypeInfo) {
        self.error(
            member.span,
            ErrorKind::UnknownMember {
                ty: ty.clone(),
                member: member.name.clone(),
            },
        );
    }

    fn check_new(&mut self, span: Span, ty: &Node<TypeExpr>, fields: &[FieldInit]) -> TypeInfo {
        let resolved = self.resolve_type(ty);
        let values: Vec<TypeInfo> = fields.iter().map(|field| self.check_expr(&field.value)).collect();

        if resolved.is_any() {
            return TypeInfo::pointer(TypeInfo::Any, Ownership::Owned);
        }
        let Some(members) = Instantiator::members(self.bundle, &resolved) else {
            self.error(ty.span, ErrorKind::NotAStruct(resolved));
            return TypeInfo::Any;
        };

        if members.len() != fields.len() {
            self.error(
                span,
                ErrorKind::FieldCount {
                    name: resolved.to_string(),
                    expected: members.len(),
                    found: fields.len(),
                },
            );
        }
        for ((field, found), (name, expected)) in fields.iter().zip(&values).zip(&members) {
            if field.name.name != *name {
                self.error(
                    field.name.span,
                    ErrorKind::FieldOrder {
                        expected: name.clone(),
                        found: field.name.name.clone(),
                    },
                );
                continue;
            }
            self.expect_type(field.value.span, found, expected);
        }

        TypeInfo::pointer(resolved, Ownership::Owned)
    }

    fn check_static_array(&mut self, span: Span, ty: &Node<TypeExpr>, elements: &[Node<Expr>]) -> TypeInfo {
        let resolved = self.resolve_type(ty);
        let element_types: Vec<(Span, TypeInfo)> =
            elements.iter().map(|e| (e.span, self.check_expr(e))).collect();

        let TypeInfo::Array { element, length } = &resolved else {
            return TypeInfo::Any;
        };
        if *length != element_types.len() as u64 {
            self.error(
                span,
                ErrorKind::ArrayLength {
                    expected: *length,
                    found: element_types.len(),
                },
            );
        }
        for (element_span, found) in &element_types {
            self.expect_type(*element_span, found, element);
        }
        resolved
    }

    fn check_subscript(&mut self, object: &Node<Expr>, index: &Node<Expr>) -> TypeInfo {
        let object_ty = self.check_expr(object);
        let index_ty = self.check_expr(index);

        let element = match object_ty {
            TypeInfo::Array { element, .. } | TypeInfo::Slice { element } => *element,
            TypeInfo::Any => return TypeInfo::Any,
            other => {
                self.error(object.span, ErrorKind::NotIndexable(other));
                return TypeInfo::Any;
            }
        };

        match index_ty {
            TypeInfo::Range(_) => TypeInfo::Slice {
                element: Box::new(element),
            },
            TypeInfo::Number(n) if n.is_integer() => element,
            TypeInfo::Any => element,
            other => {
                self.error(
                    index.span,
                    ErrorKind::TypeMismatch {
                        expected: TypeInfo::number(NumberKind::Unsigned, 64),
                        found: other,
                    },
                );
                element
            }
        }
    }

    fn check_range(&mut self, start: &Node<Expr>, end: &Node<Expr>) -> TypeInfo {
        let start_ty = self.check_expr(start);
        let end_ty = self.check_expr(end);
        let integer = |ty: &TypeInfo| matches!(ty, TypeInfo::Number(n) if n.is_integer());
        let ok = self.expect_operand("..", start.span, &start_ty, integer)
            & self.expect_operand("..", end.span, &end_ty, integer);
        if !ok {
            return TypeInfo::Any;
        }
        match TypeHelpers::unify(&start_ty, &end_ty) {
            Some(TypeInfo::Number(n)) => TypeInfo::Range(n),
            Some(_) => TypeInfo::Range(NumberType::new(NumberKind::Signed, 64)),
            None => {
                self.error(
                    end.span,
                    ErrorKind::TypeMismatch {
                        expected: start_ty,
                        found: end_ty,
                    },
                );
                TypeInfo::Any
            }
        }
    }
}

/// Unsuffixed integers are `i64` and unsuffixed decimals `f64`.
fn number_literal_type(literal: &NumberLiteral) -> TypeInfo {
    match literal.suffix {
        Some(suffix) => TypeInfo::number(suffix.kind, suffix.width),
        None if literal.is_decimal() => TypeInfo::number(NumberKind::Float, 64),
        None => TypeInfo::number(NumberKind::Signed, 64),
    }
}
