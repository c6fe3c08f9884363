//! Declare pass and type-expression resolution

use liam_ast::{Node, Span, TypeExpr};

use crate::bundle::CompilationBundle;
use crate::checker::TypeChecker;
use crate::diagnostics::Pass;
use crate::error::ErrorKind;
use crate::generics::Instantiator;
use crate::types::{FnType, Ownership, StructId, TypeInfo, UnitId};
use crate::unit::StructDef;

/// Resolves type expressions written inside one unit.
///
/// Errors are collected rather than reported so the resolver can run while
/// the bundle is only borrowed immutably.
pub(crate) struct TypeResolver<'a> {
    bundle: &'a CompilationBundle,
    unit: UnitId,
    generics: &'a [String],
    pub(crate) errors: Vec<(Span, ErrorKind)>,
}

impl<'a> TypeResolver<'a> {
    pub(crate) fn new(bundle: &'a CompilationBundle, unit: UnitId, generics: &'a [String]) -> Self {
        Self {
            bundle,
            unit,
            generics,
            errors: Vec::new(),
        }
    }

    /// Resolves `expr`, yielding `Any` after recording an error when it cannot.
    pub(crate) fn resolve(&mut self, expr: &Node<TypeExpr>, instantiator: &mut Instantiator) -> TypeInfo {
        match &expr.value {
            TypeExpr::Pointer { pointee, owned } => {
                let ownership = if *owned { Ownership::Owned } else { Ownership::Weak };
                TypeInfo::pointer(self.resolve(pointee, instantiator), ownership)
            }
            TypeExpr::Array { length, element } => TypeInfo::Array {
                element: Box::new(self.resolve(element, instantiator)),
                length: *length,
            },
            TypeExpr::Slice(element) => TypeInfo::Slice {
                element: Box::new(self.resolve(element, instantiator)),
            },
            TypeExpr::Named { namespace, name, args } => {
                let mut owner = self.unit;
                if let Some(ns) = namespace {
                    match self.bundle.unit(self.unit).scopes.namespaces.get(&ns.name) {
                        Some(TypeInfo::Namespace(target)) => owner = *target,
                        _ => {
                            self.errors.push((ns.span, ErrorKind::UnknownNamespace(ns.name.clone())));
                            return TypeInfo::Any;
                        }
                    }
                } else if let Some(index) = self.generics.iter().position(|g| *g == name.name) {
                    if !args.is_empty() {
                        self.arity_error(expr.span, &name.name, 0, args.len());
                    }
                    return TypeInfo::Generic {
                        index,
                        name: name.name.clone(),
                    };
                }

                let base = match self.bundle.unit(owner).scopes.types.get(&name.name) {
                    Some(ty) => ty.clone(),
                    None => {
                        self.errors.push((name.span, ErrorKind::UnknownType(expr.value.to_string())));
                        return TypeInfo::Any;
                    }
                };

                let arity = match &base {
                    TypeInfo::Struct { generic_arity, .. } => *generic_arity,
                    _ => 0,
                };
                if arity != args.len() {
                    self.arity_error(expr.span, &name.name, arity, args.len());
                }
                if arity == 0 {
                    return base;
                }

                let resolved: Vec<TypeInfo> = args.iter().map(|arg| self.resolve(arg, instantiator)).collect();
                let resolved = Instantiator::fit_args(resolved, arity);
                match base
                    .struct_base()
                    .and_then(|id| self.bundle.struct_def(id))
                {
                    Some(def) => instantiator.instantiate_struct(def, &resolved),
                    None => TypeInfo::Any,
                }
            }
        }
    }

    fn arity_error(&mut self, span: Span, name: &str, expected: usize, found: usize) {
        self.errors.push((
            span,
            ErrorKind::GenericArity {
                name: name.to_string(),
                expected,
                found,
            },
        ));
    }
}

/// Outcome of resolving one unit's signatures
struct Signatures {
    structs: Vec<(usize, Vec<(String, TypeInfo)>)>,
    fns: Vec<(String, Span, FnType)>,
    errors: Vec<(Span, ErrorKind)>,
}

impl<'d> TypeChecker<'d> {
    /// Registers every namespace, struct and function signature of every unit.
    ///
    /// Bodies are not looked at, so later declarations are visible to earlier
    /// bodies once the full pass runs.
    pub fn declare_pass(&mut self, bundle: &mut CompilationBundle) {
        let ids: Vec<UnitId> = bundle.unit_ids().collect();

        for &id in &ids {
            self.declare_namespaces(bundle, id);
        }

        let mut shells = Vec::with_capacity(ids.len());
        for &id in &ids {
            shells.push(self.declare_struct_shells(bundle, id));
        }

        for (&id, shells) in ids.iter().zip(&shells) {
            let signatures = self.resolve_signatures(bundle, id, shells);
            self.commit_signatures(bundle, id, signatures);
        }
    }

    fn declare_namespaces(&mut self, bundle: &mut CompilationBundle, id: UnitId) {
        let imports = bundle.unit(id).imports().to_vec();
        for import in imports {
            let Some(target) = import.target else {
                self.report(Pass::Declare, bundle.unit(id), import.span, ErrorKind::UnresolvedImport(import.path));
                continue;
            };
            let inserted = bundle
                .unit_mut(id)
                .scopes
                .namespaces
                .insert(import.alias.clone(), TypeInfo::Namespace(target));
            if inserted.is_err() {
                self.report(Pass::Declare, bundle.unit(id), import.span, ErrorKind::DuplicateDeclaration(import.alias));
            }
        }
    }

    /// Pushes an empty `StructDef` per struct; the result maps each struct
    /// declaration to its arena slot, or `None` for a rejected duplicate.
    fn declare_struct_shells(&mut self, bundle: &mut CompilationBundle, id: UnitId) -> Vec<Option<usize>> {
        let decls: Vec<(String, Span, Vec<String>)> = bundle
            .unit(id)
            .struct_decls()
            .map(|decl| {
                (
                    decl.name.name.clone(),
                    decl.name.span,
                    decl.generics.iter().map(|g| g.name.clone()).collect(),
                )
            })
            .collect();

        let mut slots = Vec::with_capacity(decls.len());
        for (name, span, generics) in decls {
            let unit = bundle.unit_mut(id);
            let def = StructDef {
                id: StructId {
                    unit: id,
                    index: unit.structs.len(),
                },
                name: name.clone(),
                span,
                generics,
                members: Vec::new(),
            };
            if unit.scopes.types.insert(name.clone(), def.type_info()).is_err() {
                self.report(Pass::Declare, bundle.unit(id), span, ErrorKind::DuplicateDeclaration(name));
                slots.push(None);
                continue;
            }
            log::trace!("declare struct {} in {}", def.name, id);
            slots.push(Some(def.id.index));
            unit.structs.push(def);
        }
        slots
    }

    fn resolve_signatures(
        &mut self,
        bundle: &CompilationBundle,
        id: UnitId,
        shells: &[Option<usize>],
    ) -> Signatures {
        let unit = bundle.unit(id);
        let mut signatures = Signatures {
            structs: Vec::new(),
            fns: Vec::new(),
            errors: Vec::new(),
        };

        for (decl, slot) in unit.struct_decls().zip(shells) {
            let Some(index) = *slot else { continue };
            let generics: Vec<String> = decl.generics.iter().map(|g| g.name.clone()).collect();
            let mut resolver = TypeResolver::new(bundle, id, &generics);
            let mut members: Vec<(String, TypeInfo)> = Vec::with_capacity(decl.members.len());
            for member in &decl.members {
                let ty = resolver.resolve(&member.ty, &mut self.instantiator);
                if members.iter().any(|(name, _)| *name == member.name.name) {
                    resolver
                        .errors
                        .push((member.name.span, ErrorKind::DuplicateDeclaration(member.name.name.clone())));
                    continue;
                }
                members.push((member.name.name.clone(), ty));
            }
            signatures.errors.append(&mut resolver.errors);
            signatures.structs.push((index, members));
        }

        for decl in unit.fn_decls() {
            let generics: Vec<String> = decl.generics.iter().map(|g| g.name.clone()).collect();
            let mut resolver = TypeResolver::new(bundle, id, &generics);
            let params = decl
                .params
                .iter()
                .map(|param| resolver.resolve(&param.ty, &mut self.instantiator))
                .collect();
            let return_type = match &decl.return_type {
                Some(ty) => resolver.resolve(ty, &mut self.instantiator),
                None => TypeInfo::Void,
            };
            signatures.errors.append(&mut resolver.errors);
            signatures.fns.push((
                decl.name.name.clone(),
                decl.name.span,
                FnType {
                    generic_arity: generics.len(),
                    params,
                    return_type: Box::new(return_type),
                },
            ));
        }

        signatures
    }

    fn commit_signatures(&mut self, bundle: &mut CompilationBundle, id: UnitId, signatures: Signatures) {
        for (span, kind) in signatures.errors {
            self.report(Pass::Declare, bundle.unit(id), span, kind);
        }

        let unit = bundle.unit_mut(id);
        for (index, members) in signatures.structs {
            if let Some(def) = unit.structs.get_mut(index) {
                def.members = members;
            }
        }

        for (name, span, signature) in signatures.fns {
            log::trace!("declare fn {} in {}", name, id);
            if bundle
                .unit_mut(id)
                .scopes
                .functions
                .insert(name.clone(), TypeInfo::Fn(signature))
                .is_err()
            {
                self.report(Pass::Declare, bundle.unit(id), span, ErrorKind::DuplicateDeclaration(name));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{bundle_of, declare};
    use crate::{ErrorKind, TypeInfo};

    #[test]
    fn test_declare_registers_signatures() {
        let mut bundle = bundle_of(&[(
            "main.liam",
            "struct Node[T] { value: T, next: ^Node[T] }\nfn len[T](n: ^Node[T]) u64 { return 0u64; }",
        )]);
        let diagnostics = declare(&mut bundle);
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.reports());

        let unit = bundle.unit(crate::UnitId(0));
        let def = &unit.structs()[0];
        assert_eq!(def.members.len(), 2);
        assert!(matches!(def.members[1].1, TypeInfo::Pointer { .. }));
        match unit.scopes().functions.get("len") {
            Some(TypeInfo::Fn(f)) => {
                assert_eq!(f.generic_arity, 1);
                assert_eq!(f.params.len(), 1);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_top_level_names() {
        let mut bundle = bundle_of(&[(
            "main.liam",
            "struct A { }\nstruct A { }\nfn f() { }\nfn f() { }\nstruct u8 { }",
        )]);
        let diagnostics = declare(&mut bundle);
        let duplicates = diagnostics
            .reports()
            .iter()
            .filter(|r| matches!(r.kind, ErrorKind::DuplicateDeclaration(_)))
            .count();
        assert_eq!(duplicates, 3);
    }

    #[test]
    fn test_duplicate_member_and_unknown_type() {
        let mut bundle = bundle_of(&[("main.liam", "struct P { x: u64, x: u8, y: Missing }")]);
        let diagnostics = declare(&mut bundle);
        let kinds: Vec<_> = diagnostics.reports().iter().map(|r| r.kind.clone()).collect();
        assert!(kinds.contains(&ErrorKind::DuplicateDeclaration("x".to_string())));
        assert!(kinds.contains(&ErrorKind::UnknownType("Missing".to_string())));
    }

    #[test]
    fn test_generic_arity_in_signature() {
        let mut bundle = bundle_of(&[("main.liam", "struct Box[T] { v: T }\nfn f(b: Box) { }")]);
        let diagnostics = declare(&mut bundle);
        assert!(matches!(
            diagnostics.reports()[0].kind,
            ErrorKind::GenericArity {
                expected: 1,
                found: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_arity_mismatch_pads_with_any() {
        let mut bundle = bundle_of(&[(
            "main.liam",
            "struct Pair[A, B] { a: A, b: B }\nfn f(p: ^Pair[u8], q: ^Pair[u8, u8, u8]) { }",
        )]);
        let diagnostics = declare(&mut bundle);
        assert_eq!(diagnostics.len(), 2, "{:?}", diagnostics.reports());

        let Some(TypeInfo::Fn(f)) = bundle.unit(crate::UnitId(0)).scopes().functions.get("f") else {
            panic!("f not declared");
        };
        let args_of = |ty: &TypeInfo| match ty {
            TypeInfo::Pointer { pointee, .. } => match pointee.as_ref() {
                TypeInfo::StructInstance { type_args, .. } => type_args.clone(),
                other => panic!("unexpected {:?}", other),
            },
            other => panic!("unexpected {:?}", other),
        };
        let u8_type = TypeInfo::number(crate::NumberKind::Unsigned, 8);
        assert_eq!(args_of(&f.params[0]), vec![u8_type.clone(), TypeInfo::Any]);
        assert_eq!(args_of(&f.params[1]), vec![u8_type.clone(), u8_type]);
    }

    #[test]
    fn test_cross_unit_struct_reference() {
        let mut bundle = bundle_of(&[
            ("main.liam", "import \"shapes.liam\" shapes;\nfn area(p: ^shapes.Point) u64 { return p.x; }"),
            ("shapes.liam", "struct Point { x: u64, y: u64 }"),
        ]);
        let diagnostics = declare(&mut bundle);
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.reports());
    }
}
