//! Expression definitions for the AST

use super::*;

/// Expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Binary operation: left op right
    Binary {
        left: Box<Node<Expr>>,
        op: BinaryOp,
        right: Box<Node<Expr>>,
    },

    /// Prefix operation: op operand
    Unary {
        op: UnaryOp,
        operand: Box<Node<Expr>>,
    },

    /// `42`, `10u8`, `2.5f32`
    Number(NumberLiteral),

    /// `"text"`
    String(String),

    /// `true` / `false`
    Bool(bool),

    /// Identifier
    Ident(Ident),

    /// Function call: callee:[type_args](args)
    Call {
        callee: Box<Node<Expr>>,
        type_args: Vec<Node<TypeExpr>>,
        args: Vec<Node<Expr>>,
    },

    /// Member access: object.member
    Get {
        object: Box<Node<Expr>>,
        member: Ident,
    },

    /// Heap instantiation: `new Type{ field: value, ... }`
    New {
        ty: Node<TypeExpr>,
        fields: Vec<FieldInit>,
    },

    /// Parenthesized expression
    Group(Box<Node<Expr>>),

    /// `null`
    Null,

    /// `zero`
    Zero,

    /// `[N]T{a, b, c}`
    StaticArray {
        ty: Node<TypeExpr>,
        elements: Vec<Node<Expr>>,
    },

    /// Index access: object[index]
    Subscript {
        object: Box<Node<Expr>>,
        index: Box<Node<Expr>>,
    },

    /// `start..end`
    Range {
        start: Box<Node<Expr>>,
        end: Box<Node<Expr>>,
    },
}

/// Numeric literal, digits kept as written
#[derive(Debug, Clone, PartialEq)]
pub struct NumberLiteral {
    pub text: String,
    pub suffix: Option<NumberSuffix>,
}

impl NumberLiteral {
    pub fn is_decimal(&self) -> bool {
        self.text.contains('.')
    }
}

/// `name: value` inside a `new` expression
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInit {
    pub name: Ident,
    pub value: Node<Expr>,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    pub fn is_arithmetic(self) -> bool {
        matches!(self, Self::Add | Self::Sub | Self::Mul | Self::Div | Self::Mod)
    }

    pub fn is_relational(self) -> bool {
        matches!(self, Self::Lt | Self::Gt | Self::Le | Self::Ge)
    }

    pub fn is_equality(self) -> bool {
        matches!(self, Self::Eq | Self::Ne)
    }

    pub fn is_logical(self) -> bool {
        matches!(self, Self::And | Self::Or)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        };
        write!(f, "{}", s)
    }
}

/// Prefix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `!`
    Not,
    /// `-`
    Negate,
    /// `&` - weak pointer to the operand
    AddressOf,
    /// `*`
    Deref,
    /// `own` - owned pointer to the operand
    Own,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnaryOp::Not => "!",
            UnaryOp::Negate => "-",
            UnaryOp::AddressOf => "&",
            UnaryOp::Deref => "*",
            UnaryOp::Own => "own ",
        };
        write!(f, "{}", s)
    }
}
