//! Statement checking methods

use liam_ast::{Block, Expr, FnDecl, ForHead, ForStmt, IfStmt, Node, Span, Stmt, TypeExpr, UnaryOp};

use crate::checker::UnitChecker;
use crate::decl_checker::TypeResolver;
use crate::error::{ErrorKind, StructuralError};
use crate::helpers::TypeHelpers;
use crate::scope::ScopeStack;
use crate::types::TypeInfo;

impl<'a> UnitChecker<'a> {
    pub(crate) fn check_unit(&mut self) -> Result<(), StructuralError> {
        let unit = self.unit;
        for item in &unit.ast().items {
            match &item.value {
                Stmt::Import(import) => {
                    let ty = unit
                        .scopes
                        .namespaces
                        .get(&import.alias.name)
                        .cloned()
                        .unwrap_or(TypeInfo::Any);
                    self.table.record(item.id, ty);
                }
                Stmt::Struct(decl) => {
                    let ty = unit
                        .scopes
                        .types
                        .get(&decl.name.name)
                        .cloned()
                        .unwrap_or(TypeInfo::Any);
                    self.table.record(item.id, ty);
                }
                Stmt::Fn(decl) => self.check_fn(item, decl)?,
                _ => return Err(StructuralError::StatementAtTopLevel { span: item.span }),
            }
        }
        Ok(())
    }

    fn check_fn(&mut self, item: &Node<Stmt>, decl: &FnDecl) -> Result<(), StructuralError> {
        let signature = match self.unit.scopes.functions.get(&decl.name.name) {
            Some(TypeInfo::Fn(signature)) => signature.clone(),
            _ => {
                return Err(StructuralError::MissingDeclaration {
                    name: decl.name.name.clone(),
                    span: decl.name.span,
                })
            }
        };
        log::trace!("check fn {}", decl.name.name);

        self.generics = decl.generics.iter().map(|g| g.name.clone()).collect();
        self.return_type = (*signature.return_type).clone();
        self.locals = ScopeStack::new();
        self.loop_depth = 0;

        for (param, ty) in decl.params.iter().zip(&signature.params) {
            if self.locals.declare(&param.name.name, ty.clone()).is_err() {
                self.error(param.name.span, ErrorKind::DuplicateDeclaration(param.name.name.clone()));
            }
        }
        for stmt in &decl.body.stmts {
            self.check_stmt(stmt)?;
        }

        self.table.record(item.id, TypeInfo::Fn(signature));
        Ok(())
    }

    pub(crate) fn check_block(&mut self, block: &Block) -> Result<(), StructuralError> {
        self.locals.push_scope();
        for stmt in &block.stmts {
            self.check_stmt(stmt)?;
        }
        self.locals.pop_scope();
        Ok(())
    }

    pub(crate) fn check_stmt(&mut self, stmt: &Node<Stmt>) -> Result<(), StructuralError> {
        let ty = match &stmt.value {
            Stmt::Import(_) => return Err(declaration_in_body("import", stmt.span)),
            Stmt::Struct(_) => return Err(declaration_in_body("struct", stmt.span)),
            Stmt::Fn(_) => return Err(declaration_in_body("fn", stmt.span)),
            Stmt::Let { name, ty, init } => {
                let init_ty = self.check_expr(init);
                let bound = match ty {
                    Some(annotation) => {
                        let declared = self.resolve_type(annotation);
                        self.expect_type(init.span, &init_ty, &declared);
                        declared
                    }
                    None if init_ty == TypeInfo::Void => {
                        self.error(init.span, ErrorKind::VoidBinding(name.name.clone()));
                        TypeInfo::Any
                    }
                    None => init_ty,
                };
                if self.locals.declare(&name.name, bound.clone()).is_err() {
                    self.error(name.span, ErrorKind::DuplicateDeclaration(name.name.clone()));
                }
                bound
            }
            Stmt::Scope(block) => {
                self.check_block(block)?;
                TypeInfo::Void
            }
            Stmt::Assign { target, value } => {
                if !is_assignable(&target.value) {
                    self.error(target.span, ErrorKind::InvalidAssignTarget);
                }
                let target_ty = self.check_expr(target);
                let value_ty = self.check_expr(value);
                self.expect_type(value.span, &value_ty, &target_ty);
                TypeInfo::Void
            }
            Stmt::Return(value) => {
                let (span, found) = match value {
                    Some(value) => (value.span, self.check_expr(value)),
                    None => (stmt.span, TypeInfo::Void),
                };
                let expected = self.return_type.clone();
                self.expect_type(span, &found, &expected);
                TypeInfo::Void
            }
            Stmt::Break => {
                self.expect_loop(stmt.span, "break");
                TypeInfo::Void
            }
            Stmt::Continue => {
                self.expect_loop(stmt.span, "continue");
                TypeInfo::Void
            }
            Stmt::For(for_stmt) => {
                self.check_for(for_stmt)?;
                TypeInfo::Void
            }
            Stmt::If(if_stmt) => {
                self.check_if(if_stmt)?;
                TypeInfo::Void
            }
            Stmt::Expr(expr) => self.check_expr(expr),
        };
        self.table.record(stmt.id, ty);
        Ok(())
    }

    fn check_for(&mut self, for_stmt: &ForStmt) -> Result<(), StructuralError> {
        self.locals.push_scope();
        match &for_stmt.head {
            ForHead::Each { binding, iterable } => {
                let iterable_ty = self.check_expr(iterable);
                let element = match iterable_ty {
                    TypeInfo::Array { element, .. } | TypeInfo::Slice { element } => *element,
                    TypeInfo::Range(number) => TypeInfo::Number(number),
                    TypeInfo::Any => TypeInfo::Any,
                    other => {
                        self.error(iterable.span, ErrorKind::NotIterable(other));
                        TypeInfo::Any
                    }
                };
                if self.locals.declare(&binding.name, element).is_err() {
                    self.error(binding.span, ErrorKind::DuplicateDeclaration(binding.name.clone()));
                }
                self.check_loop_body(&for_stmt.body)?;
            }
            ForHead::Counted {
                init,
                condition,
                update,
            } => {
                self.check_stmt(init)?;
                let condition_ty = self.check_expr(condition);
                self.expect_type(condition.span, &condition_ty, &TypeInfo::Bool);
                self.check_loop_body(&for_stmt.body)?;
                self.check_stmt(update)?;
            }
        }
        self.locals.pop_scope();
        Ok(())
    }

    fn check_loop_body(&mut self, body: &Block) -> Result<(), StructuralError> {
        self.loop_depth += 1;
        let result = self.check_block(body);
        self.loop_depth -= 1;
        result
    }

    fn check_if(&mut self, if_stmt: &IfStmt) -> Result<(), StructuralError> {
        let condition_ty = self.check_expr(&if_stmt.condition);
        self.expect_type(if_stmt.condition.span, &condition_ty, &TypeInfo::Bool);
        self.check_block(&if_stmt.then_block)?;
        if let Some(else_branch) = &if_stmt.else_branch {
            self.check_stmt(else_branch)?;
        }
        Ok(())
    }

    fn expect_loop(&mut self, span: Span, keyword: &'static str) {
        if self.loop_depth == 0 {
            self.error(span, ErrorKind::OutsideLoop(keyword));
        }
    }

    /// Reports a mismatch unless `found` coerces to `expected`.
    pub(crate) fn expect_type(&mut self, span: Span, found: &TypeInfo, expected: &TypeInfo) {
        if !TypeHelpers::coerces_to(found, expected) {
            self.error(
                span,
                ErrorKind::TypeMismatch {
                    expected: expected.clone(),
                    found: found.clone(),
                },
            );
        }
    }

    pub(crate) fn resolve_type(&mut self, expr: &Node<TypeExpr>) -> TypeInfo {
        let mut resolver = TypeResolver::new(self.bundle, self.unit.id(), &self.generics);
        let ty = resolver.resolve(expr, self.instantiator);
        let errors = resolver.errors;
        for (span, kind) in errors {
            self.error(span, kind);
        }
        ty
    }
}

fn declaration_in_body(what: &'static str, span: Span) -> StructuralError {
    StructuralError::DeclarationInBody { what, span }
}

fn is_assignable(target: &Expr) -> bool {
    matches!(
        target,
        Expr::Ident(_)
            | Expr::Get { .. }
            | Expr::Subscript { .. }
            | Expr::Unary {
                op: UnaryOp::Deref,
                ..
            }
    )
}

#[cfg(test)]
mod tests {
    use crate::test_support::{check, kinds};
    use crate::ErrorKind;
    use liam_ast::{Block, Expr, ForHead, Node, NodeId, Stmt};

    #[test]
    fn test_forward_reference_checks() {
        let diagnostics = check(&[(
            "main.liam",
            "fn main() { let n := later(2u8); }\nfn later(x: u8) u64 { return 1u64; }",
        )]);
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.reports());
    }

    #[test]
    fn test_let_annotation_mismatch() {
        let diagnostics = check(&[("main.liam", "fn main() { let x: bool = 1u8; }")]);
        assert!(matches!(kinds(&diagnostics)[..], [ErrorKind::TypeMismatch { .. }]));
    }

    #[test]
    fn test_void_binding_and_duplicate_local() {
        let diagnostics = check(&[(
            "main.liam",
            "fn nothing() { }\nfn main() { let a := nothing(); let b := 1; let b := 2; }",
        )]);
        let kinds = kinds(&diagnostics);
        assert!(matches!(kinds[0], ErrorKind::VoidBinding(ref name) if name == "a"));
        assert!(matches!(kinds[1], ErrorKind::DuplicateDeclaration(ref name) if name == "b"));
    }

    #[test]
    fn test_shadowing_in_nested_scope() {
        let diagnostics = check(&[(
            "main.liam",
            "fn main() { let a := 1; { let a := true; let b: bool = a; } let c: i64 = a; }",
        )]);
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.reports());
    }

    #[test]
    fn test_return_type_checked() {
        let diagnostics = check(&[("main.liam", "fn f() u64 { return true; }\nfn g() { return 1u8; }")]);
        assert_eq!(diagnostics.len(), 2);
    }

    #[test]
    fn test_break_outside_loop() {
        let diagnostics = check(&[(
            "main.liam",
            "fn main() { break; for x : 0u64..10u64 { continue; } }",
        )]);
        assert!(matches!(kinds(&diagnostics)[..], [ErrorKind::OutsideLoop("break")]));
    }

    #[test]
    fn test_for_loops_bind_element_types() {
        let diagnostics = check(&[(
            "main.liam",
            r#"
            fn main() {
                let values := [3]u64{1u64, 2u64, 3u64};
                for v : values { let w: u64 = v; }
                for let i := 0u32; i < 10u32; i = i + 1u32 { let j: u32 = i; }
                for r : 0u8..4u8 { let s: u64 = r; }
            }
            "#,
        )]);
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.reports());
    }

    #[test]
    fn test_not_iterable() {
        let diagnostics = check(&[("main.liam", "fn main() { for x : true { } }")]);
        assert!(matches!(kinds(&diagnostics)[..], [ErrorKind::NotIterable(_)]));
    }

    #[test]
    fn test_if_condition_must_be_bool() {
        let diagnostics = check(&[(
            "main.liam",
            "fn main() { if 1 { } else if true { } else { } }",
        )]);
        assert!(matches!(kinds(&diagnostics)[..], [ErrorKind::TypeMismatch { .. }]));
    }

    #[test]
    fn test_invalid_assign_target() {
        let diagnostics = check(&[("main.liam", "fn main() { let a := 1; a = 2; 1 + 1 = 2; }")]);
        assert!(kinds(&diagnostics).contains(&ErrorKind::InvalidAssignTarget));
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_statement_types_recorded() {
        let (bundle, diagnostics) = crate::test_support::check_bundle(&[(
            "main.liam",
            "fn main() { let a := 1u16; a; }",
        )]);
        assert!(diagnostics.is_empty());
        let unit = bundle.unit(crate::UnitId(0));
        let liam_ast::Stmt::Fn(main) = &unit.ast().items[0].value else {
            panic!("expected fn");
        };
        let ty = unit.types().type_of(&main.body.stmts[1]);
        assert_eq!(ty, Some(&crate::TypeInfo::number(crate::NumberKind::Unsigned, 16)));
        assert!(unit.types().type_of(&unit.ast().items[0]).is_some());
    }

    fn block_ids(block: &Block, ids: &mut Vec<NodeId>) {
        for stmt in &block.stmts {
            stmt_ids(stmt, ids);
        }
    }

    fn stmt_ids(stmt: &Node<Stmt>, ids: &mut Vec<NodeId>) {
        ids.push(stmt.id);
        match &stmt.value {
            Stmt::Import(_) | Stmt::Struct(_) | Stmt::Break | Stmt::Continue => {}
            Stmt::Fn(decl) => block_ids(&decl.body, ids),
            Stmt::Let { init, .. } => expr_ids(init, ids),
            Stmt::Scope(block) => block_ids(block, ids),
            Stmt::Assign { target, value } => {
                expr_ids(target, ids);
                expr_ids(value, ids);
            }
            Stmt::Return(value) => {
                if let Some(value) = value {
                    expr_ids(value, ids);
                }
            }
            Stmt::For(for_stmt) => {
                match &for_stmt.head {
                    ForHead::Each { iterable, .. } => expr_ids(iterable, ids),
                    ForHead::Counted {
                        init,
                        condition,
                        update,
                    } => {
                        stmt_ids(init, ids);
                        expr_ids(condition, ids);
                        stmt_ids(update, ids);
                    }
                }
                block_ids(&for_stmt.body, ids);
            }
            Stmt::If(if_stmt) => {
                expr_ids(&if_stmt.condition, ids);
                block_ids(&if_stmt.then_block, ids);
                if let Some(else_branch) = &if_stmt.else_branch {
                    stmt_ids(else_branch, ids);
                }
            }
            Stmt::Expr(expr) => expr_ids(expr, ids),
        }
    }

    fn expr_ids(expr: &Node<Expr>, ids: &mut Vec<NodeId>) {
        ids.push(expr.id);
        match &expr.value {
            Expr::Binary { left, right, .. } => {
                expr_ids(left, ids);
                expr_ids(right, ids);
            }
            Expr::Unary { operand, .. } => expr_ids(operand, ids),
            Expr::Call { callee, args, .. } => {
                expr_ids(callee, ids);
                args.iter().for_each(|arg| expr_ids(arg, ids));
            }
            Expr::Get { object, .. } => expr_ids(object, ids),
            Expr::New { fields, .. } => fields.iter().for_each(|field| expr_ids(&field.value, ids)),
            Expr::Group(inner) => expr_ids(inner, ids),
            Expr::StaticArray { elements, .. } => elements.iter().for_each(|element| expr_ids(element, ids)),
            Expr::Subscript { object, index } => {
                expr_ids(object, ids);
                expr_ids(index, ids);
            }
            Expr::Range { start, end } => {
                expr_ids(start, ids);
                expr_ids(end, ids);
            }
            Expr::Number(_) | Expr::String(_) | Expr::Bool(_) | Expr::Ident(_) | Expr::Null | Expr::Zero => {}
        }
    }

    #[test]
    fn test_every_node_has_a_type() {
        let (bundle, diagnostics) = crate::test_support::check_bundle(&[
            (
                "main.liam",
                r#"
                import "util.liam" util;
                struct Pair[T] { left: T, right: T }
                fn first[T](p: ^Pair[T]) T { return p.left; }
                fn main() {
                    let p := new Pair[u64]{ left: 1u64, right: util.two() };
                    let xs := [3]u64{1u64, first:[u64](&*p), (2u64 + 3u64)};
                    let part: []u64 = xs[0u64..2u64];
                    let flag: bool = !false and -1 < 0;
                    let name := "liam";
                    let none: ^u64 = null;
                    let nothing: u64 = zero;
                    { let inner := *&nothing; }
                    for let i := 0u64; i < 3u64; i = i + 1u64 {
                        if i == 1u64 { continue; } else if i == 2u64 { break; } else { p.left = xs[i]; }
                    }
                    for v : part { util.two(); }
                    return;
                }
                "#,
            ),
            ("util.liam", "fn two() u64 { return 2u64; }"),
        ]);
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.reports());

        for unit in bundle.units() {
            let mut ids = Vec::new();
            for item in &unit.ast().items {
                stmt_ids(item, &mut ids);
            }
            assert!(!ids.is_empty());
            for id in ids {
                assert!(
                    unit.types().get(id).is_some(),
                    "{} in {} has no type",
                    id,
                    unit.path().display()
                );
            }
        }
    }
}
