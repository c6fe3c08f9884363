//! Type expressions as written in source

use super::*;

/// Type expression
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    /// `u64`, `Pair[u64]`, `math.Vec[T]`
    Named {
        namespace: Option<Ident>,
        name: Ident,
        args: Vec<Node<TypeExpr>>,
    },

    /// `^T` (weak) or `~T` (owned)
    Pointer {
        pointee: Box<Node<TypeExpr>>,
        owned: bool,
    },

    /// `[N]T`
    Array {
        length: u64,
        element: Box<Node<TypeExpr>>,
    },

    /// `[]T`
    Slice(Box<Node<TypeExpr>>),
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Named {
                namespace,
                name,
                args,
            } => {
                if let Some(ns) = namespace {
                    write!(f, "{}.", ns)?;
                }
                write!(f, "{}", name)?;
                if !args.is_empty() {
                    write!(f, "[")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", arg.value)?;
                    }
                    write!(f, "]")?;
                }
                Ok(())
            }
            TypeExpr::Pointer { pointee, owned } => {
                write!(f, "{}{}", if *owned { "~" } else { "^" }, pointee.value)
            }
            TypeExpr::Array { length, element } => write!(f, "[{}]{}", length, element.value),
            TypeExpr::Slice(element) => write!(f, "[]{}", element.value),
        }
    }
}

/// Numeric kind shared by literal suffixes and resolved number types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberKind {
    Unsigned,
    Signed,
    Float,
}

/// Literal suffix such as `u8` or `f32`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NumberSuffix {
    pub kind: NumberKind,
    pub width: u8,
}

impl NumberSuffix {
    /// Parses `u8`..`u64`, `i8`..`i64`, `f32` and `f64`.
    pub fn parse(text: &str) -> Option<Self> {
        let mut chars = text.chars();
        let kind = match chars.next()? {
            'u' => NumberKind::Unsigned,
            'i' => NumberKind::Signed,
            'f' => NumberKind::Float,
            _ => return None,
        };
        let width: u8 = chars.as_str().parse().ok()?;
        let valid = match kind {
            NumberKind::Float => matches!(width, 32 | 64),
            _ => matches!(width, 8 | 16 | 32 | 64),
        };
        valid.then_some(Self { kind, width })
    }
}

impl fmt::Display for NumberSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.kind {
            NumberKind::Unsigned => 'u',
            NumberKind::Signed => 'i',
            NumberKind::Float => 'f',
        };
        write!(f, "{}{}", prefix, self.width)
    }
}
