//! Statement and declaration definitions for the AST

use super::*;

/// Statement
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `import "path.liam" alias;`
    Import(ImportDecl),

    /// `struct Name[T] { member: Type, ... }`
    Struct(StructDecl),

    /// `fn name[T](param: Type) Ret { ... }`
    Fn(FnDecl),

    /// `let name: Type = init;` or `let name := init;`
    Let {
        name: Ident,
        ty: Option<Node<TypeExpr>>,
        init: Node<Expr>,
    },

    /// Nested block `{ ... }`
    Scope(Block),

    /// `target = value;`
    Assign {
        target: Node<Expr>,
        value: Node<Expr>,
    },

    /// `return value;`
    Return(Option<Node<Expr>>),

    Break,

    Continue,

    For(ForStmt),

    If(IfStmt),

    /// Expression evaluated for its effect
    Expr(Node<Expr>),
}

impl Stmt {
    /// Whether this statement may only appear at file level.
    pub fn is_declaration(&self) -> bool {
        matches!(self, Stmt::Import(_) | Stmt::Struct(_) | Stmt::Fn(_))
    }
}

/// Braced statement list
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Node<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    /// Path exactly as written, without quotes
    pub path: String,
    pub path_span: Span,
    pub alias: Ident,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructDecl {
    pub name: Ident,
    pub generics: Vec<Ident>,
    pub members: Vec<Member>,
}

/// `name: Type` in a struct declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub name: Ident,
    pub ty: Node<TypeExpr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FnDecl {
    pub name: Ident,
    pub generics: Vec<Ident>,
    pub params: Vec<Param>,
    /// `None` means `void`
    pub return_type: Option<Node<TypeExpr>>,
    pub body: Block,
}

/// Function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Ident,
    pub ty: Node<TypeExpr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub head: ForHead,
    pub body: Block,
}

/// The two loop forms
#[derive(Debug, Clone, PartialEq)]
pub enum ForHead {
    /// `for x : iterable`
    Each {
        binding: Ident,
        iterable: Node<Expr>,
    },

    /// `for let i := 0; i < n; i = i + 1`
    Counted {
        init: Box<Node<Stmt>>,
        condition: Node<Expr>,
        update: Box<Node<Stmt>>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Node<Expr>,
    pub then_block: Block,
    /// Either another `If` (for `else if`) or a `Scope`
    pub else_branch: Option<Box<Node<Stmt>>>,
}

/// Parsed file
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub items: Vec<Node<Stmt>>,
    pub span: Span,
}
