//! Matching, coercion and substitution rules

use crate::types::{FnType, Ownership, TypeInfo};

/// Helper methods for type comparison
pub struct TypeHelpers;

impl TypeHelpers {
    /// Structural match. `Any` on either side matches everything.
    pub fn matches(a: &TypeInfo, b: &TypeInfo) -> bool {
        match (a, b) {
            (TypeInfo::Any, _) | (_, TypeInfo::Any) => true,
            (
                TypeInfo::Pointer {
                    pointee: pa,
                    ownership: oa,
                },
                TypeInfo::Pointer {
                    pointee: pb,
                    ownership: ob,
                },
            ) => oa == ob && Self::matches(pa, pb),
            (
                TypeInfo::Array {
                    element: ea,
                    length: la,
                },
                TypeInfo::Array {
                    element: eb,
                    length: lb,
                },
            ) => la == lb && Self::matches(ea, eb),
            (TypeInfo::Slice { element: ea }, TypeInfo::Slice { element: eb }) => Self::matches(ea, eb),
            (TypeInfo::Fn(fa), TypeInfo::Fn(fb)) => {
                fa.generic_arity == fb.generic_arity
                    && Self::all_match(&fa.params, &fb.params)
                    && Self::matches(&fa.return_type, &fb.return_type)
            }
            (TypeInfo::Struct { id: a, .. }, TypeInfo::Struct { id: b, .. }) => a == b,
            (
                TypeInfo::StructInstance {
                    base: ba,
                    type_args: aa,
                    ..
                },
                TypeInfo::StructInstance {
                    base: bb,
                    type_args: ab,
                    ..
                },
            ) => ba == bb && Self::all_match(aa, ab),
            (TypeInfo::Generic { index: a, .. }, TypeInfo::Generic { index: b, .. }) => a == b,
            _ => a == b,
        }
    }

    fn all_match(a: &[TypeInfo], b: &[TypeInfo]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| Self::matches(x, y))
    }

    /// Whether a value of type `actual` may be stored where `expected` is required.
    ///
    /// Numbers widen within their kind; `null` fits any pointer.
    pub fn coerces_to(actual: &TypeInfo, expected: &TypeInfo) -> bool {
        if Self::matches(actual, expected) {
            return true;
        }
        match (actual, expected) {
            (TypeInfo::Number(a), TypeInfo::Number(e)) => a.kind == e.kind && e.width >= a.width,
            (
                TypeInfo::Pointer {
                    pointee: from,
                    ownership: Ownership::Weak,
                },
                TypeInfo::Pointer { .. },
            ) => from.is_any(),
            _ => false,
        }
    }

    /// Common type of two operands: the wider number of one kind, or the
    /// operands' shared type when they match.
    pub fn unify(a: &TypeInfo, b: &TypeInfo) -> Option<TypeInfo> {
        match (a, b) {
            (TypeInfo::Any, other) | (other, TypeInfo::Any) => Some(other.clone()),
            (TypeInfo::Number(x), TypeInfo::Number(y)) if x.kind == y.kind => {
                Some(if x.width >= y.width { a.clone() } else { b.clone() })
            }
            _ if Self::coerces_to(b, a) => Some(a.clone()),
            _ if Self::coerces_to(a, b) => Some(b.clone()),
            _ => None,
        }
    }

    /// Replaces every `Generic{index}` with `args[index]`.
    ///
    /// Out-of-range placeholders become `Any`.
    pub fn substitute(ty: &TypeInfo, args: &[TypeInfo]) -> TypeInfo {
        match ty {
            TypeInfo::Generic { index, .. } => args.get(*index).cloned().unwrap_or(TypeInfo::Any),
            TypeInfo::Pointer { pointee, ownership } => TypeInfo::Pointer {
                pointee: Box::new(Self::substitute(pointee, args)),
                ownership: *ownership,
            },
            TypeInfo::Array { element, length } => TypeInfo::Array {
                element: Box::new(Self::substitute(element, args)),
                length: *length,
            },
            TypeInfo::Slice { element } => TypeInfo::Slice {
                element: Box::new(Self::substitute(element, args)),
            },
            TypeInfo::Fn(f) => TypeInfo::Fn(Self::substitute_fn(f, args)),
            TypeInfo::StructInstance {
                base,
                name,
                type_args,
            } => TypeInfo::StructInstance {
                base: *base,
                name: name.clone(),
                type_args: type_args.iter().map(|t| Self::substitute(t, args)).collect(),
            },
            other => other.clone(),
        }
    }

    /// Substitutes a function's generics; the result takes no generic arguments.
    pub fn substitute_fn(f: &FnType, args: &[TypeInfo]) -> FnType {
        FnType {
            generic_arity: 0,
            params: f.params.iter().map(|p| Self::substitute(p, args)).collect(),
            return_type: Box::new(Self::substitute(&f.return_type, args)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NumberKind, StructId, UnitId};

    fn u(width: u8) -> TypeInfo {
        TypeInfo::number(NumberKind::Unsigned, width)
    }

    #[test]
    fn test_number_matching_requires_width_and_kind() {
        assert!(TypeHelpers::matches(&u(64), &u(64)));
        assert!(!TypeHelpers::matches(&u(8), &u(64)));
        assert!(!TypeHelpers::matches(&u(64), &TypeInfo::number(NumberKind::Float, 64)));
    }

    #[test]
    fn test_widening_coercion() {
        assert!(TypeHelpers::coerces_to(&u(8), &u(64)));
        assert!(!TypeHelpers::coerces_to(&u(64), &u(8)));
        assert!(!TypeHelpers::coerces_to(&u(8), &TypeInfo::number(NumberKind::Signed, 64)));
        assert_eq!(TypeHelpers::unify(&u(8), &u(64)), Some(u(64)));
        assert_eq!(TypeHelpers::unify(&u(64), &TypeInfo::number(NumberKind::Float, 64)), None);
    }

    #[test]
    fn test_pointer_ownership_must_match() {
        let owned = TypeInfo::pointer(u(8), Ownership::Owned);
        let weak = TypeInfo::pointer(u(8), Ownership::Weak);
        assert!(!TypeHelpers::matches(&owned, &weak));
        assert!(TypeHelpers::coerces_to(&TypeInfo::null_pointer(), &owned));
        assert!(TypeHelpers::coerces_to(&TypeInfo::null_pointer(), &weak));
    }

    #[test]
    fn test_struct_instances_match_pairwise() {
        let base = StructId {
            unit: UnitId(0),
            index: 0,
        };
        let instance = |arg: TypeInfo| TypeInfo::StructInstance {
            base,
            name: "Box".to_string(),
            type_args: vec![arg],
        };
        assert!(TypeHelpers::matches(&instance(u(8)), &instance(u(8))));
        assert!(!TypeHelpers::matches(&instance(u(8)), &instance(u(16))));
    }

    #[test]
    fn test_substitute_nested_generics() {
        let generic = TypeInfo::Generic {
            index: 0,
            name: "T".to_string(),
        };
        let ty = TypeInfo::Slice {
            element: Box::new(TypeInfo::pointer(generic, Ownership::Owned)),
        };
        let substituted = TypeHelpers::substitute(&ty, &[TypeInfo::Bool]);
        assert_eq!(
            substituted,
            TypeInfo::Slice {
                element: Box::new(TypeInfo::pointer(TypeInfo::Bool, Ownership::Owned)),
            }
        );
        assert!(!substituted.has_generics());
    }
}
