//! Resolved type representation

use std::fmt;

pub use liam_ast::NumberKind;

/// Index of a compilation unit inside its bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(pub usize);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit {}", self.0)
    }
}

/// Declaration site of a struct: its unit and position in that unit's struct arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StructId {
    pub unit: UnitId,
    pub index: usize,
}

/// Width and kind of a number type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NumberType {
    pub kind: NumberKind,
    pub width: u8,
}

impl NumberType {
    pub const fn new(kind: NumberKind, width: u8) -> Self {
        Self { kind, width }
    }

    pub fn is_integer(&self) -> bool {
        self.kind != NumberKind::Float
    }
}

impl fmt::Display for NumberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.kind {
            NumberKind::Unsigned => 'u',
            NumberKind::Signed => 'i',
            NumberKind::Float => 'f',
        };
        write!(f, "{}{}", prefix, self.width)
    }
}

/// Pointer ownership
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ownership {
    /// Must be consumed at most once
    Owned,
    /// Non-owning reference
    Weak,
}

/// Function signature
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FnType {
    pub generic_arity: usize,
    pub params: Vec<TypeInfo>,
    pub return_type: Box<TypeInfo>,
}

/// A resolved type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeInfo {
    /// Matches anything; assigned to `zero` and to nodes that failed to check
    Any,
    Void,
    Bool,
    Number(NumberType),
    String,
    Pointer {
        pointee: Box<TypeInfo>,
        ownership: Ownership,
    },
    Array {
        element: Box<TypeInfo>,
        length: u64,
    },
    Slice {
        element: Box<TypeInfo>,
    },
    Fn(FnType),
    /// A declared struct; members live in the declaring unit's struct arena
    Struct {
        id: StructId,
        name: String,
        generic_arity: usize,
    },
    /// A generic struct bound to concrete arguments
    StructInstance {
        base: StructId,
        name: String,
        type_args: Vec<TypeInfo>,
    },
    Namespace(UnitId),
    /// Placeholder for the `index`-th generic parameter of the enclosing declaration
    Generic {
        index: usize,
        name: String,
    },
    Range(NumberType),
}

impl TypeInfo {
    pub fn number(kind: NumberKind, width: u8) -> Self {
        TypeInfo::Number(NumberType::new(kind, width))
    }

    pub fn pointer(pointee: TypeInfo, ownership: Ownership) -> Self {
        TypeInfo::Pointer {
            pointee: Box::new(pointee),
            ownership,
        }
    }

    /// Type of the `null` literal
    pub fn null_pointer() -> Self {
        Self::pointer(TypeInfo::Any, Ownership::Weak)
    }

    pub fn is_any(&self) -> bool {
        matches!(self, TypeInfo::Any)
    }

    pub fn is_owned_pointer(&self) -> bool {
        matches!(
            self,
            TypeInfo::Pointer {
                ownership: Ownership::Owned,
                ..
            }
        )
    }

    pub fn as_number(&self) -> Option<NumberType> {
        match self {
            TypeInfo::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The struct declaration behind a struct, instance or pointer to either.
    pub fn struct_base(&self) -> Option<StructId> {
        match self {
            TypeInfo::Struct { id, .. } => Some(*id),
            TypeInfo::StructInstance { base, .. } => Some(*base),
            TypeInfo::Pointer { pointee, .. } => match pointee.as_ref() {
                TypeInfo::Struct { id, .. } => Some(*id),
                TypeInfo::StructInstance { base, .. } => Some(*base),
                _ => None,
            },
            _ => None,
        }
    }

    /// Whether any generic placeholder occurs inside this type.
    pub fn has_generics(&self) -> bool {
        match self {
            TypeInfo::Generic { .. } => true,
            TypeInfo::Pointer { pointee, .. } => pointee.has_generics(),
            TypeInfo::Array { element, .. } | TypeInfo::Slice { element } => element.has_generics(),
            TypeInfo::Fn(f) => f.params.iter().any(TypeInfo::has_generics) || f.return_type.has_generics(),
            TypeInfo::StructInstance { type_args, .. } => type_args.iter().any(TypeInfo::has_generics),
            _ => false,
        }
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeInfo::Any => write!(f, "any"),
            TypeInfo::Void => write!(f, "void"),
            TypeInfo::Bool => write!(f, "bool"),
            TypeInfo::Number(n) => write!(f, "{}", n),
            TypeInfo::String => write!(f, "str"),
            TypeInfo::Pointer { pointee, ownership } => match ownership {
                Ownership::Owned => write!(f, "~{}", pointee),
                Ownership::Weak => write!(f, "^{}", pointee),
            },
            TypeInfo::Array { element, length } => write!(f, "[{}]{}", length, element),
            TypeInfo::Slice { element } => write!(f, "[]{}", element),
            TypeInfo::Fn(func) => {
                write!(f, "fn(")?;
                write_list(f, &func.params)?;
                write!(f, ") {}", func.return_type)
            }
            TypeInfo::Struct { name, .. } => write!(f, "{}", name),
            TypeInfo::StructInstance { name, type_args, .. } => {
                write!(f, "{}[", name)?;
                write_list(f, type_args)?;
                write!(f, "]")
            }
            TypeInfo::Namespace(unit) => write!(f, "namespace({})", unit),
            TypeInfo::Generic { name, .. } => write!(f, "{}", name),
            TypeInfo::Range(n) => write!(f, "range[{}]", n),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, types: &[TypeInfo]) -> fmt::Result {
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", ty)?;
    }
    Ok(())
}

/// Builtin type names seeded into every unit's type scope
pub fn builtin_types() -> Vec<(&'static str, TypeInfo)> {
    use NumberKind::*;
    vec![
        ("void", TypeInfo::Void),
        ("bool", TypeInfo::Bool),
        ("str", TypeInfo::String),
        ("u8", TypeInfo::number(Unsigned, 8)),
        ("u16", TypeInfo::number(Unsigned, 16)),
        ("u32", TypeInfo::number(Unsigned, 32)),
        ("u64", TypeInfo::number(Unsigned, 64)),
        ("i8", TypeInfo::number(Signed, 8)),
        ("i16", TypeInfo::number(Signed, 16)),
        ("i32", TypeInfo::number(Signed, 32)),
        ("i64", TypeInfo::number(Signed, 64)),
        ("f32", TypeInfo::number(Float, 32)),
        ("f64", TypeInfo::number(Float, 64)),
    ]
}
