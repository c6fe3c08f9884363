//! Semantic error kinds

use liam_ast::Span;
use thiserror::Error;

use crate::types::TypeInfo;

/// Recoverable errors found by the checker passes
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    // Resolution
    #[error("unknown identifier '{0}'")]
    UnknownIdentifier(String),
    #[error("unknown type '{0}'")]
    UnknownType(String),
    #[error("unknown namespace '{0}'")]
    UnknownNamespace(String),
    #[error("duplicate declaration of '{0}'")]
    DuplicateDeclaration(String),
    #[error("unresolved import '{0}'")]
    UnresolvedImport(String),

    // Types
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: TypeInfo, found: TypeInfo },
    #[error("argument count mismatch: expected {expected}, found {found}")]
    ArgumentCount { expected: usize, found: usize },
    #[error("'{name}' expects {expected} generic argument(s), found {found}")]
    GenericArity {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("'{name}' has {expected} field(s), found {found}")]
    FieldCount {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("expected field '{expected}', found '{found}'")]
    FieldOrder { expected: String, found: String },
    #[error("array of length {expected} initialised with {found} element(s)")]
    ArrayLength { expected: u64, found: usize },
    #[error("cannot call value of type {0}")]
    NotCallable(TypeInfo),
    #[error("cannot index value of type {0}")]
    NotIndexable(TypeInfo),
    #[error("cannot iterate over value of type {0}")]
    NotIterable(TypeInfo),
    #[error("cannot dereference non-pointer type {0}")]
    DerefNonPointer(TypeInfo),
    #[error("operator '{op}' cannot be applied to {ty}")]
    InvalidOperand { op: String, ty: TypeInfo },
    #[error("type {0} is not a struct")]
    NotAStruct(TypeInfo),
    #[error("no member '{member}' on {ty}")]
    UnknownMember { ty: TypeInfo, member: String },
    #[error("invalid assignment target")]
    InvalidAssignTarget,
    #[error("cannot bind '{0}' to a void value")]
    VoidBinding(String),
    #[error("'{0}' outside of a loop")]
    OutsideLoop(&'static str),

    // Ownership
    #[error("use of already moved value '{0}'")]
    UseAfterMove(String),
    #[error("access to member '{member}' of already moved value '{name}'")]
    MovedMemberAccess { name: String, member: String },

    // Stops the pipeline outright
    #[error("{0}")]
    Fatal(String),
}

impl ErrorKind {
    /// Short stable code used when rendering diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::UnknownIdentifier(_)
            | ErrorKind::UnknownType(_)
            | ErrorKind::UnknownNamespace(_)
            | ErrorKind::DuplicateDeclaration(_)
            | ErrorKind::UnresolvedImport(_) => "E1000",
            ErrorKind::UseAfterMove(_) | ErrorKind::MovedMemberAccess { .. } => "E3000",
            ErrorKind::Fatal(_) => "E0001",
            _ => "E2000",
        }
    }
}

/// Tree shapes the checker cannot handle; these abort the run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StructuralError {
    #[error("{what} declaration inside a function body")]
    DeclarationInBody { what: &'static str, span: Span },
    #[error("only import, struct and fn are allowed at top level")]
    StatementAtTopLevel { span: Span },
    #[error("'{name}' was never declared; the declare pass must run first")]
    MissingDeclaration { name: String, span: Span },
}

impl StructuralError {
    pub fn span(&self) -> Span {
        match self {
            StructuralError::DeclarationInBody { span, .. }
            | StructuralError::StatementAtTopLevel { span }
            | StructuralError::MissingDeclaration { span, .. } => *span,
        }
    }
}
