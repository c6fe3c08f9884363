//! # Liam AST
//!
//! Syntax tree definitions for the Liam language.
//! Every statement and expression is wrapped in a [`Node`] carrying a
//! source span and a [`NodeId`] that later passes use as a key for
//! side tables (resolved types, ownership state).

use std::fmt;

// =============================================================================
// Core Types (kept in lib.rs - used by all modules)
// =============================================================================

/// Source location information.
///
/// `start`/`end` are byte offsets into the file; `line` and `column` are
/// 1-based and describe `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
    pub file_id: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: u32, column: u32, file_id: usize) -> Self {
        Self {
            start,
            end,
            line,
            column,
            file_id,
        }
    }

    /// Smallest span covering both; line and column come from whichever starts first.
    pub fn merge(&self, other: &Span) -> Span {
        let (line, column) = if self.start <= other.start {
            (self.line, self.column)
        } else {
            (other.line, other.column)
        };
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line,
            column,
            file_id: self.file_id,
        }
    }
}

/// Identity of a node within one source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// AST node wrapper that includes span and identity
#[derive(Debug, Clone, PartialEq)]
pub struct Node<T> {
    pub id: NodeId,
    pub span: Span,
    pub value: T,
}

impl<T> Node<T> {
    pub fn new(id: NodeId, value: T, span: Span) -> Self {
        Self { id, span, value }
    }
}

/// Identifier together with where it was written
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

// =============================================================================
// Module Declarations
// =============================================================================

pub mod types;
pub mod expr;
pub mod stmt;

pub use types::*;
pub use expr::*;
pub use stmt::*;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, end: usize, column: u32) -> Span {
        Span::new(start, end, 1, column, 0)
    }

    #[test]
    fn test_span_merge_keeps_first_position() {
        let a = span(4, 6, 5);
        let b = span(10, 14, 11);
        let merged = b.merge(&a);
        assert_eq!(merged.start, 4);
        assert_eq!(merged.end, 14);
        assert_eq!(merged.column, 5);
    }

    #[test]
    fn test_number_suffix_display() {
        let suffix = NumberSuffix {
            kind: NumberKind::Unsigned,
            width: 8,
        };
        assert_eq!(suffix.to_string(), "u8");
        assert_eq!(NumberSuffix::parse("f32").map(|s| s.kind), Some(NumberKind::Float));
        assert_eq!(NumberSuffix::parse("f8"), None);
        assert_eq!(NumberSuffix::parse("i128"), None);
    }

    #[test]
    fn test_binary_op_classes() {
        assert!(BinaryOp::Add.is_arithmetic());
        assert!(BinaryOp::Le.is_relational());
        assert!(BinaryOp::Ne.is_equality());
        assert!(BinaryOp::And.is_logical());
        assert_eq!(format!("{}", BinaryOp::Or), "or");
    }

    #[test]
    fn test_type_expr_display() {
        let s = span(0, 0, 1);
        let inner = Node::new(
            NodeId(0),
            TypeExpr::Named {
                namespace: None,
                name: Ident::new("u64", s),
                args: vec![],
            },
            s,
        );
        let ptr = TypeExpr::Pointer {
            pointee: Box::new(inner),
            owned: true,
        };
        assert_eq!(ptr.to_string(), "~u64");
    }
}
