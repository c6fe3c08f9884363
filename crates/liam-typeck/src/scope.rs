//! Name-to-type tables

use std::collections::HashMap;

use crate::types::TypeInfo;

/// One level of name bindings; a name maps to at most one declaration.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    entries: HashMap<String, TypeInfo>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `name`, refusing to replace an existing entry.
    ///
    /// On conflict the existing type is returned and the scope is unchanged.
    pub fn insert(&mut self, name: impl Into<String>, ty: TypeInfo) -> Result<(), TypeInfo> {
        use std::collections::hash_map::Entry;
        match self.entries.entry(name.into()) {
            Entry::Occupied(existing) => Err(existing.get().clone()),
            Entry::Vacant(slot) => {
                slot.insert(ty);
                Ok(())
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&TypeInfo> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by name, for stable output.
    pub fn sorted(&self) -> Vec<(&str, &TypeInfo)> {
        let mut entries: Vec<_> = self.entries.iter().map(|(k, v)| (k.as_str(), v)).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

/// Builds a scope from distinct names; a repeated name keeps its first type.
impl<N: Into<String>> FromIterator<(N, TypeInfo)> for Scope {
    fn from_iter<I: IntoIterator<Item = (N, TypeInfo)>>(iter: I) -> Self {
        let mut entries = HashMap::new();
        for (name, ty) in iter {
            entries.entry(name.into()).or_insert(ty);
        }
        Self { entries }
    }
}

/// Local bindings of a function body.
///
/// Entering a block pushes a fresh level; outer levels are never written
/// while an inner level is active, so shadowing never leaks outward.
#[derive(Debug, Clone)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new()],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::new());
    }

    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Declares in the innermost scope; fails if that scope already has `name`.
    pub fn declare(&mut self, name: &str, ty: TypeInfo) -> Result<(), TypeInfo> {
        match self.scopes.last_mut() {
            Some(scope) => scope.insert(name, ty),
            None => Ok(()),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&TypeInfo> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}
