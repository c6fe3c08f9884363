//! Generic instantiation with a per-compilation cache

use std::collections::HashMap;

use crate::bundle::CompilationBundle;
use crate::helpers::TypeHelpers;
use crate::types::{FnType, StructId, TypeInfo};
use crate::unit::StructDef;

/// Caches struct and function instantiations so equal arguments give equal results.
#[derive(Debug, Default)]
pub struct Instantiator {
    structs: HashMap<(StructId, Vec<TypeInfo>), TypeInfo>,
    fns: HashMap<(FnType, Vec<TypeInfo>), FnType>,
}

impl Instantiator {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Name[args]` for the generic struct `def`.
    pub fn instantiate_struct(&mut self, def: &StructDef, args: &[TypeInfo]) -> TypeInfo {
        let key = (def.id, args.to_vec());
        if let Some(hit) = self.structs.get(&key) {
            log::trace!("instantiate {}: cache hit", def.name);
            return hit.clone();
        }
        let instance = TypeInfo::StructInstance {
            base: def.id,
            name: def.name.clone(),
            type_args: args.to_vec(),
        };
        self.structs.insert(key, instance.clone());
        instance
    }

    /// Trims or pads `args` to `arity`; missing arguments become `Any`.
    pub fn fit_args(mut args: Vec<TypeInfo>, arity: usize) -> Vec<TypeInfo> {
        args.resize(arity, TypeInfo::Any);
        args
    }

    /// Specialises `f` for `args`, substituting parameter and return types.
    pub fn instantiate_fn(&mut self, f: &FnType, args: &[TypeInfo]) -> FnType {
        let key = (f.clone(), args.to_vec());
        if let Some(hit) = self.fns.get(&key) {
            return hit.clone();
        }
        let specialised = TypeHelpers::substitute_fn(f, args);
        self.fns.insert(key, specialised.clone());
        specialised
    }

    /// Type of `member` on a struct or instance, with the instance's arguments applied.
    pub fn member_type(bundle: &CompilationBundle, ty: &TypeInfo, member: &str) -> Option<TypeInfo> {
        let (base, args): (StructId, &[TypeInfo]) = match ty {
            TypeInfo::Struct { id, .. } => (*id, &[]),
            TypeInfo::StructInstance { base, type_args, .. } => (*base, type_args.as_slice()),
            _ => return None,
        };
        let def = bundle.struct_def(base)?;
        let declared = def.member(member)?;
        Some(TypeHelpers::substitute(declared, args))
    }

    /// All members of a struct or instance, in declaration order, with arguments applied.
    pub fn members(bundle: &CompilationBundle, ty: &TypeInfo) -> Option<Vec<(String, TypeInfo)>> {
        let (base, args): (StructId, &[TypeInfo]) = match ty {
            TypeInfo::Struct { id, .. } => (*id, &[]),
            TypeInfo::StructInstance { base, type_args, .. } => (*base, type_args.as_slice()),
            _ => return None,
        };
        let def = bundle.struct_def(base)?;
        Some(
            def.members
                .iter()
                .map(|(name, ty)| (name.clone(), TypeHelpers::substitute(ty, args)))
                .collect(),
        )
    }

    pub fn cached_structs(&self) -> usize {
        self.structs.len()
    }
}
