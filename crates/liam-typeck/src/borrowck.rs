//! Move checking for owned pointers

use liam_ast::{BinaryOp, Block, Expr, FnDecl, ForHead, ForStmt, Ident, IfStmt, Node, Span, Stmt, UnaryOp};

use crate::bundle::CompilationBundle;
use crate::diagnostics::{Diagnostics, ErrorReport, Pass};
use crate::error::ErrorKind;
use crate::ownership::{OwnershipStatus, OwnershipTable};
use crate::types::TypeInfo;
use crate::unit::CompilationUnit;

/// Walks a fully typed bundle and reports uses of moved owned pointers.
pub struct BorrowChecker<'d> {
    diagnostics: &'d mut Diagnostics,
}

impl<'d> BorrowChecker<'d> {
    pub fn new(diagnostics: &'d mut Diagnostics) -> Self {
        Self { diagnostics }
    }

    pub fn check_bundle(&mut self, bundle: &CompilationBundle) {
        for unit in bundle.units() {
            log::debug!("borrow check: {}", unit.path().display());
            let mut checker = UnitBorrowChecker {
                unit,
                diagnostics: self.diagnostics,
            };
            checker.check_unit();
        }
    }
}

struct UnitBorrowChecker<'a> {
    unit: &'a CompilationUnit,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> UnitBorrowChecker<'a> {
    fn check_unit(&mut self) {
        let unit = self.unit;
        for item in &unit.ast().items {
            if let Stmt::Fn(decl) = &item.value {
                self.check_fn(item, decl);
            }
        }
    }

    fn check_fn(&mut self, item: &Node<Stmt>, decl: &FnDecl) {
        let mut table = OwnershipTable::new();
        if let Some(TypeInfo::Fn(signature)) = self.unit.types().type_of(item) {
            for (param, ty) in decl.params.iter().zip(&signature.params) {
                if ty.is_owned_pointer() {
                    table.own(&param.name.name, ty.clone(), param.name.span);
                }
            }
        }
        for stmt in &decl.body.stmts {
            self.stmt(&mut table, stmt);
        }
    }

    /// Runs `block` on a copy of `table` and returns the copy.
    fn nested_block(&mut self, table: &OwnershipTable, block: &Block) -> OwnershipTable {
        let mut inner = table.clone();
        for stmt in &block.stmts {
            self.stmt(&mut inner, stmt);
        }
        inner
    }

    fn stmt(&mut self, table: &mut OwnershipTable, stmt: &Node<Stmt>) {
        match &stmt.value {
            Stmt::Import(_) | Stmt::Struct(_) | Stmt::Fn(_) | Stmt::Break | Stmt::Continue => {}
            Stmt::Let { name, init, .. } => {
                self.expr(table, init, true);
                match self.unit.types().type_of(stmt) {
                    Some(ty) if ty.is_owned_pointer() => table.own(&name.name, ty.clone(), name.span),
                    _ => table.release(&name.name, name.span),
                }
            }
            Stmt::Scope(block) => {
                let inner = self.nested_block(table, block);
                table.merge_block(&inner);
            }
            Stmt::Assign { target, value } => {
                self.expr(table, value, true);
                match &target.value {
                    Expr::Ident(ident) => table.reown(&ident.name),
                    _ => self.expr(table, target, false),
                }
            }
            Stmt::Return(value) => {
                if let Some(value) = value {
                    self.expr(table, value, true);
                }
            }
            Stmt::For(for_stmt) => self.for_stmt(table, for_stmt),
            Stmt::If(if_stmt) => self.if_stmt(table, if_stmt),
            Stmt::Expr(expr) => self.expr(table, expr, true),
        }
    }

    fn if_stmt(&mut self, table: &mut OwnershipTable, if_stmt: &IfStmt) {
        self.expr(table, &if_stmt.condition, true);
        let then_table = self.nested_block(table, &if_stmt.then_block);
        let mut else_table = table.clone();
        if let Some(else_branch) = &if_stmt.else_branch {
            self.stmt(&mut else_table, else_branch);
        }
        table.merge_branches(&then_table, &else_table);
    }

    fn for_stmt(&mut self, table: &mut OwnershipTable, for_stmt: &ForStmt) {
        let mut loop_table = table.clone();
        match &for_stmt.head {
            ForHead::Each { binding, iterable } => {
                self.expr(&mut loop_table, iterable, true);
                match self.element_type(iterable) {
                    Some(ty) if ty.is_owned_pointer() => loop_table.own(&binding.name, ty, binding.span),
                    _ => loop_table.release(&binding.name, binding.span),
                }
                self.nested_block(&loop_table, &for_stmt.body);
            }
            ForHead::Counted {
                init,
                condition,
                update,
            } => {
                self.stmt(&mut loop_table, init);
                self.expr(&mut loop_table, condition, true);
                let mut body_table = self.nested_block(&loop_table, &for_stmt.body);
                self.stmt(&mut body_table, update);
            }
        }
    }

    fn element_type(&self, iterable: &Node<Expr>) -> Option<TypeInfo> {
        match self.unit.types().type_of(iterable)? {
            TypeInfo::Array { element, .. } | TypeInfo::Slice { element } => Some(element.as_ref().clone()),
            _ => None,
        }
    }

    /// Walks `expr`; an owned identifier in a consuming position is moved.
    fn expr(&mut self, table: &mut OwnershipTable, expr: &Node<Expr>, consume: bool) {
        match &expr.value {
            Expr::Ident(ident) => self.use_ident(table, ident, consume),
            Expr::Binary { left, op, right } => {
                let consume = !matches!(op, BinaryOp::Eq | BinaryOp::Ne);
                self.expr(table, left, consume);
                self.expr(table, right, consume);
            }
            Expr::Unary { op, operand } => {
                let consume = !matches!(op, UnaryOp::AddressOf | UnaryOp::Deref);
                self.expr(table, operand, consume);
            }
            Expr::Call { callee, args, .. } => {
                self.expr(table, callee, false);
                for arg in args {
                    self.expr(table, arg, true);
                }
            }
            Expr::Get { object, member } => match &object.value {
                Expr::Ident(ident) => self.access_member(table, ident, member),
                _ => self.expr(table, object, false),
            },
            Expr::New { fields, .. } => {
                for field in fields {
                    self.expr(table, &field.value, true);
                }
            }
            Expr::Group(inner) => self.expr(table, inner, consume),
            Expr::StaticArray { elements, .. } => {
                for element in elements {
                    self.expr(table, element, true);
                }
            }
            Expr::Subscript { object, index } => {
                self.expr(table, object, false);
                self.expr(table, index, true);
            }
            Expr::Range { start, end } => {
                self.expr(table, start, true);
                self.expr(table, end, true);
            }
            Expr::Number(_) | Expr::String(_) | Expr::Bool(_) | Expr::Null | Expr::Zero => {}
        }
    }

    fn use_ident(&mut self, table: &mut OwnershipTable, ident: &Ident, consume: bool) {
        if consume {
            match table.consume(&ident.name, ident.span) {
                Ok(()) => {
                    if table.get(&ident.name).is_some() {
                        log::trace!("move {} at {}:{}", ident.name, ident.span.line, ident.span.column);
                    }
                }
                Err(previous) => self.use_after_move(ident, &previous),
            }
        } else if let Some(previous) = table.get(&ident.name).filter(|s| s.is_moved()).cloned() {
            self.use_after_move(ident, &previous);
        }
    }

    fn access_member(&mut self, table: &OwnershipTable, ident: &Ident, member: &Ident) {
        let Some(previous) = table.get(&ident.name).filter(|s| s.is_moved()).cloned() else {
            return;
        };
        let kind = ErrorKind::MovedMemberAccess {
            name: ident.name.clone(),
            member: member.name.clone(),
        };
        self.report(ident.span, kind, &previous);
    }

    fn use_after_move(&mut self, ident: &Ident, previous: &OwnershipStatus) {
        self.report(ident.span, ErrorKind::UseAfterMove(ident.name.clone()), previous);
    }

    fn report(&mut self, span: Span, kind: ErrorKind, previous: &OwnershipStatus) {
        let mut report = ErrorReport::new(Pass::BorrowCheck, self.unit.path(), span, kind)
            .with_note(previous.declared_at, "value owned here");
        if let Some(moved_at) = previous.moved_at {
            report = report.with_note(moved_at, "value moved here");
        }
        self.diagnostics.report(report);
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{borrow_check, kinds};
    use crate::ErrorKind;

    const PRELUDE: &str = "struct T { v: u64 }\nfn foo(t: ~T) { }\nfn peek(t: ^T) { }\n";

    fn source(body: &str) -> String {
        format!("{}fn main() {{\n{}\n}}", PRELUDE, body)
    }

    #[test]
    fn test_use_after_move_reports_once_with_both_spans() {
        let diagnostics = borrow_check(&source(
            "let a := new T{ v: 1u64 };\nfoo(a);\nfoo(a);",
        ));
        let reports = diagnostics.reports();
        assert_eq!(reports.len(), 1, "{:?}", reports);
        let report = &reports[0];
        assert_eq!(report.kind, ErrorKind::UseAfterMove("a".to_string()));
        assert_eq!(report.line, 7);
        assert_eq!(report.notes.len(), 2);
        assert_eq!(report.notes[0].message, "value owned here");
        assert_eq!(report.notes[0].span.line, 5);
        assert_eq!(report.notes[1].message, "value moved here");
        assert_eq!(report.notes[1].span.line, 6);
    }

    #[test]
    fn test_move_in_one_branch_not_visible_after_if() {
        let diagnostics = borrow_check(&source(
            "let a := new T{ v: 1u64 };\nif true { foo(a); }\nfoo(a);",
        ));
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.reports());

        let diagnostics = borrow_check(&source(
            "let a := new T{ v: 1u64 };\nif true { foo(a); } else { }\nfoo(a);",
        ));
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.reports());
    }

    #[test]
    fn test_move_in_both_branches_visible_after_if() {
        let diagnostics = borrow_check(&source(
            "let a := new T{ v: 1u64 };\nif true { foo(a); } else { foo(a); }\nfoo(a);",
        ));
        assert!(matches!(kinds(&diagnostics)[..], [ErrorKind::UseAfterMove(_)]));
    }

    #[test]
    fn test_branches_do_not_see_each_other() {
        let diagnostics = borrow_check(&source(
            "let a := new T{ v: 1u64 };\nif true { foo(a); } else if false { foo(a); } else { foo(a); }",
        ));
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.reports());
    }

    #[test]
    fn test_member_access_after_move() {
        let diagnostics = borrow_check(&source(
            "let a := new T{ v: 1u64 };\nlet v := a.v;\nfoo(a);\nlet w := a.v;",
        ));
        assert!(matches!(
            kinds(&diagnostics)[..],
            [ErrorKind::MovedMemberAccess { .. }]
        ));
    }

    #[test]
    fn test_non_consuming_positions() {
        let diagnostics = borrow_check(&source(
            "let a := new T{ v: 1u64 };\nlet p := &a;\nlet same := a == null;\nfoo(a);\nlet q := &a;",
        ));
        assert!(matches!(kinds(&diagnostics)[..], [ErrorKind::UseAfterMove(_)]));
    }

    #[test]
    fn test_parameters_and_reassignment() {
        let src = format!(
            "{}fn take(t: ~T) {{\nfoo(t);\nt = new T{{ v: 2u64 }};\nfoo(t);\nfoo(t);\n}}",
            PRELUDE
        );
        let diagnostics = borrow_check(&src);
        let reports = diagnostics.reports();
        assert_eq!(reports.len(), 1, "{:?}", reports);
        assert_eq!(reports[0].line, 8);
    }

    #[test]
    fn test_loop_update_sees_body_moves() {
        let diagnostics = borrow_check(&source(
            "let a := new T{ v: 1u64 };\nfor let i := 0u64; i < 3u64; foo(a) {\nfoo(a);\n}",
        ));
        assert!(matches!(kinds(&diagnostics)[..], [ErrorKind::UseAfterMove(_)]));
    }

    #[test]
    fn test_loop_body_moves_stay_in_loop() {
        let diagnostics = borrow_check(&source(
            "let a := new T{ v: 1u64 };\nfor x : 0u64..3u64 { foo(a); }\nfoo(a);",
        ));
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.reports());
    }

    #[test]
    fn test_nested_block_moves_propagate() {
        let diagnostics = borrow_check(&source(
            "let a := new T{ v: 1u64 };\n{ foo(a); }\nfoo(a);",
        ));
        assert!(matches!(kinds(&diagnostics)[..], [ErrorKind::UseAfterMove(_)]));
    }

    #[test]
    fn test_shadowing_in_block_keeps_outer_move() {
        let diagnostics = borrow_check(&source(
            "let a := new T{ v: 1u64 };\n{\nfoo(a);\nlet a := new T{ v: 2u64 };\n}\nfoo(a);",
        ));
        let reports = diagnostics.reports();
        assert!(matches!(kinds(&diagnostics)[..], [ErrorKind::UseAfterMove(_)]), "{:?}", reports);
        assert_eq!(reports[0].line, 10);

        let diagnostics = borrow_check(&source(
            "let a := new T{ v: 1u64 };\n{\nlet a := new T{ v: 2u64 };\nfoo(a);\n}\nfoo(a);",
        ));
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.reports());
    }

    #[test]
    fn test_reassigned_in_both_branches_is_owned() {
        let diagnostics = borrow_check(&source(
            "let a := new T{ v: 1u64 };\nfoo(a);\nif true { a = new T{ v: 2u64 }; } else { a = new T{ v: 3u64 }; }\nfoo(a);",
        ));
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.reports());
    }

    #[test]
    fn test_reassigned_in_one_branch_is_owned() {
        let diagnostics = borrow_check(&source(
            "let a := new T{ v: 1u64 };\nfoo(a);\nif true { a = new T{ v: 2u64 }; }\nfoo(a);",
        ));
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.reports());
    }

    #[test]
    fn test_moved_before_if_stays_moved() {
        let diagnostics = borrow_check(&source(
            "let a := new T{ v: 1u64 };\nfoo(a);\nif true { } else { }\nfoo(a);",
        ));
        let reports = diagnostics.reports();
        assert!(matches!(kinds(&diagnostics)[..], [ErrorKind::UseAfterMove(_)]), "{:?}", reports);
        assert_eq!(reports[0].line, 8);
    }

    #[test]
    fn test_weak_pointers_untracked() {
        let diagnostics = borrow_check(&source(
            "let a := new T{ v: 1u64 };\nlet w := &*a;\npeek(w);\npeek(w);",
        ));
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.reports());
    }
}
