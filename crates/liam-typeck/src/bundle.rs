//! The set of units reachable from an entry file

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use liam_ast::SourceFile;
use liam_lexer::Token;

use crate::types::{StructId, UnitId};
use crate::unit::{CompilationUnit, StructDef};

/// Units deduplicated by canonical path, in load order.
///
/// The first unit is the entry file.
#[derive(Debug, Default)]
pub struct CompilationBundle {
    units: Vec<CompilationUnit>,
    by_path: HashMap<PathBuf, UnitId>,
}

impl CompilationBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next added unit will receive; used as the lexer's file id.
    pub fn next_id(&self) -> UnitId {
        UnitId(self.units.len())
    }

    pub fn index_of(&self, path: &Path) -> Option<UnitId> {
        self.by_path.get(path).copied()
    }

    /// Adds a unit for `path`, or returns the existing one without touching it.
    pub fn add_unit(&mut self, path: PathBuf, source: String, tokens: Vec<Token>, ast: SourceFile) -> UnitId {
        if let Some(existing) = self.index_of(&path) {
            return existing;
        }
        let id = self.next_id();
        log::debug!("bundle: {} -> {}", id, path.display());
        self.by_path.insert(path.clone(), id);
        self.units.push(CompilationUnit::new(id, path, source, tokens, ast));
        id
    }

    pub fn unit(&self, id: UnitId) -> &CompilationUnit {
        &self.units[id.0]
    }

    pub fn unit_mut(&mut self, id: UnitId) -> &mut CompilationUnit {
        &mut self.units[id.0]
    }

    pub fn get(&self, id: UnitId) -> Option<&CompilationUnit> {
        self.units.get(id.0)
    }

    pub fn units(&self) -> &[CompilationUnit] {
        &self.units
    }

    pub fn unit_ids(&self) -> impl Iterator<Item = UnitId> {
        (0..self.units.len()).map(UnitId)
    }

    pub fn entry(&self) -> Option<&CompilationUnit> {
        self.units.first()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn struct_def(&self, id: StructId) -> Option<&StructDef> {
        self.get(id.unit).and_then(|unit| unit.structs.get(id.index))
    }
}
