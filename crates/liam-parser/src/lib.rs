//! # Liam Parser
//!
//! Recursive descent parser for Liam source files.
//! Expressions use precedence climbing; errors are collected per file and
//! parsing resumes at the next top-level declaration.

use liam_ast::*;
use liam_lexer::{Token, TokenKind};

// Module declarations
mod error;
mod parser;
mod expr;
mod stmt;
mod types;
mod helpers;

// Re-export public types
pub use error::{ParseError, ParseResult};
pub use parser::Parser;

/// Lexes and parses `source`; lexer errors surface as parse errors.
pub fn parse_source(source: &str, file_id: usize) -> Result<SourceFile, Vec<ParseError>> {
    let tokens = liam_lexer::tokenize(source, file_id);
    Parser::new(tokens).parse_file()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<SourceFile, Vec<ParseError>> {
        parse_source(source, 0)
    }

    fn first_fn(file: &SourceFile) -> &FnDecl {
        file.items
            .iter()
            .find_map(|item| match &item.value {
                Stmt::Fn(decl) => Some(decl),
                _ => None,
            })
            .expect("no function in file")
    }

    fn body_expr(source: &str) -> Node<Expr> {
        let file = parse(&format!("fn main() {{ {}; }}", source)).unwrap();
        match &first_fn(&file).body.stmts[0].value {
            Stmt::Expr(expr) => expr.clone(),
            other => panic!("Expected expression statement, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_function_declaration() {
        let file = parse("fn add(a: u64, b: u64) u64 { return a + b; }").unwrap();
        assert_eq!(file.items.len(), 1);
        let decl = first_fn(&file);
        assert_eq!(decl.name.name, "add");
        assert_eq!(decl.params.len(), 2);
        assert!(decl.return_type.is_some());
    }

    #[test]
    fn test_parse_void_function_without_return_type() {
        let file = parse("fn main() { }").unwrap();
        assert!(first_fn(&file).return_type.is_none());
    }

    #[test]
    fn test_parse_generic_struct() {
        let file = parse("struct Pair[T, U] { first: T, second: ^U, }").unwrap();
        match &file.items[0].value {
            Stmt::Struct(decl) => {
                assert_eq!(decl.generics.len(), 2);
                assert_eq!(decl.members.len(), 2);
                assert_eq!(decl.members[1].ty.value.to_string(), "^U");
            }
            other => panic!("Expected struct, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_import() {
        let file = parse(r#"import "lib/math.liam" math;"#).unwrap();
        match &file.items[0].value {
            Stmt::Import(import) => {
                assert_eq!(import.path, "lib/math.liam");
                assert_eq!(import.alias.name, "math");
            }
            other => panic!("Expected import, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_let_forms() {
        let file = parse("fn main() { let a: u64 = 1u64; let b := a; }").unwrap();
        let stmts = &first_fn(&file).body.stmts;
        assert!(matches!(&stmts[0].value, Stmt::Let { ty: Some(_), .. }));
        assert!(matches!(&stmts[1].value, Stmt::Let { ty: None, .. }));
    }

    #[test]
    fn test_precedence() {
        let expr = body_expr("1 + 2 * 3 == 7 and true");
        match expr.value {
            Expr::Binary { op: BinaryOp::And, left, .. } => match left.value {
                Expr::Binary { op: BinaryOp::Eq, left, .. } => {
                    assert!(matches!(left.value, Expr::Binary { op: BinaryOp::Add, .. }));
                }
                other => panic!("Expected ==, got {:?}", other),
            },
            other => panic!("Expected and, got {:?}", other),
        }
    }

    #[test]
    fn test_number_suffix() {
        let expr = body_expr("10u8");
        match expr.value {
            Expr::Number(literal) => {
                assert_eq!(literal.text, "10");
                assert_eq!(
                    literal.suffix,
                    Some(NumberSuffix {
                        kind: NumberKind::Unsigned,
                        width: 8
                    })
                );
            }
            other => panic!("Expected number, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_number_suffix() {
        let errors = parse("fn main() { 1u7; }").unwrap_err();
        assert!(errors[0].message.contains("suffix"));
        let errors = parse("fn main() { 1.5u8; }").unwrap_err();
        assert!(errors[0].message.contains("integer suffix"));
    }

    #[test]
    fn test_generic_call_and_member_access() {
        let expr = body_expr("math.id:[u64](x).value");
        match expr.value {
            Expr::Get { object, member } => {
                assert_eq!(member.name, "value");
                match object.value {
                    Expr::Call { callee, type_args, args } => {
                        assert_eq!(type_args.len(), 1);
                        assert_eq!(args.len(), 1);
                        assert!(matches!(callee.value, Expr::Get { .. }));
                    }
                    other => panic!("Expected call, got {:?}", other),
                }
            }
            other => panic!("Expected member access, got {:?}", other),
        }
    }

    #[test]
    fn test_new_and_static_array() {
        let expr = body_expr("new Pair[u64]{ first: 1u64, second: 2u64 }");
        assert!(matches!(expr.value, Expr::New { ref fields, .. } if fields.len() == 2));

        let expr = body_expr("[3]u8{1u8, 2u8, 3u8}");
        assert!(matches!(expr.value, Expr::StaticArray { ref elements, .. } if elements.len() == 3));
    }

    #[test]
    fn test_unary_and_range() {
        let expr = body_expr("*&x");
        match expr.value {
            Expr::Unary { op: UnaryOp::Deref, operand } => {
                assert!(matches!(operand.value, Expr::Unary { op: UnaryOp::AddressOf, .. }));
            }
            other => panic!("Expected deref, got {:?}", other),
        }
        assert!(matches!(body_expr("xs[0..2]").value, Expr::Subscript { .. }));
        assert!(matches!(body_expr("own 5u64").value, Expr::Unary { op: UnaryOp::Own, .. }));
    }

    #[test]
    fn test_for_forms() {
        let source = r#"
            fn main() {
                for i : 0..10 { }
                for let j := 0; j < 10; j = j + 1 { continue; }
            }
        "#;
        let file = parse(source).unwrap();
        let stmts = &first_fn(&file).body.stmts;
        assert!(matches!(&stmts[0].value, Stmt::For(ForStmt { head: ForHead::Each { .. }, .. })));
        match &stmts[1].value {
            Stmt::For(ForStmt { head: ForHead::Counted { update, .. }, .. }) => {
                assert!(matches!(update.value, Stmt::Assign { .. }));
            }
            other => panic!("Expected counted for, got {:?}", other),
        }
    }

    #[test]
    fn test_else_if_chain() {
        let source = "fn main() { if a { } else if b { } else { } }";
        let file = parse(source).unwrap();
        match &first_fn(&file).body.stmts[0].value {
            Stmt::If(stmt) => {
                let else_branch = stmt.else_branch.as_ref().unwrap();
                match &else_branch.value {
                    Stmt::If(inner) => {
                        assert!(matches!(
                            inner.else_branch.as_ref().map(|s| &s.value),
                            Some(Stmt::Scope(_))
                        ));
                    }
                    other => panic!("Expected else if, got {:?}", other),
                }
            }
            other => panic!("Expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_node_ids_are_unique() {
        let file = parse("fn main() { let a := 1 + 2; f(a); }").unwrap();
        let decl = first_fn(&file);
        let mut ids = vec![file.items[0].id];
        for stmt in &decl.body.stmts {
            ids.push(stmt.id);
        }
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_errors_are_collected_and_recovered() {
        let source = r#"
            fn broken( { }
            fn fine() { }
            let stray := 1;
        "#;
        let errors = parse(source).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[1].message.contains("top level"));
    }

    #[test]
    fn test_nested_declaration_rejected() {
        let errors = parse("fn main() { fn inner() { } }").unwrap_err();
        assert!(errors[0].message.contains("only allowed at top level"));
    }

    #[test]
    fn test_lexer_error_surfaces() {
        let errors = parse("fn main() { let a := $; }").unwrap_err();
        assert!(errors[0].message.contains("Unexpected character"));
        assert_eq!(errors[0].span.line, 1);
    }
}
