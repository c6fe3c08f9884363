//! Ownership tracking

use std::collections::HashMap;

use liam_ast::Span;

use crate::types::TypeInfo;

/// Who holds an owned value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    /// Owned by the binding's scope
    ScopeOwned,
    /// Consumed; further use is an error
    Moved,
}

/// Tracking entry for one owned-pointer binding
#[derive(Debug, Clone, PartialEq)]
pub struct OwnershipStatus {
    pub owner: Owner,
    pub type_info: TypeInfo,
    pub declared_at: Span,
    pub moved_at: Option<Span>,
}

impl OwnershipStatus {
    pub fn is_moved(&self) -> bool {
        self.owner == Owner::Moved
    }

    /// Whether both entries describe the same binding.
    fn same_binding(&self, other: &OwnershipStatus) -> bool {
        self.declared_at == other.declared_at
    }
}

/// Move state of the owned bindings visible at one nesting level.
///
/// Nested scopes work on a clone, so a move inside a branch is invisible to
/// its sibling and to the parent until explicitly merged back.
#[derive(Debug, Clone, Default)]
pub struct OwnershipTable {
    entries: HashMap<String, OwnershipStatus>,
    /// Final states of bindings hidden by a later `let` of the same name
    shadowed: Vec<OwnershipStatus>,
}

impl OwnershipTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking `name` as owned by the current scope.
    pub fn own(&mut self, name: &str, type_info: TypeInfo, declared_at: Span) {
        let status = OwnershipStatus {
            owner: Owner::ScopeOwned,
            type_info,
            declared_at,
            moved_at: None,
        };
        if let Some(previous) = self.entries.insert(name.to_string(), status) {
            self.shadow(previous, declared_at);
        }
    }

    /// Stops tracking `name`; used when a non-owned binding shadows it.
    pub fn release(&mut self, name: &str, declared_at: Span) {
        if let Some(previous) = self.entries.remove(name) {
            self.shadow(previous, declared_at);
        }
    }

    fn shadow(&mut self, previous: OwnershipStatus, declared_at: Span) {
        if previous.declared_at != declared_at {
            self.shadowed.push(previous);
        }
    }

    pub fn get(&self, name: &str) -> Option<&OwnershipStatus> {
        self.entries.get(name)
    }

    /// Marks `name` moved at `span`.
    ///
    /// Returns the prior status when the value was already moved; the table
    /// keeps the first move in that case.
    pub fn consume(&mut self, name: &str, span: Span) -> Result<(), OwnershipStatus> {
        let Some(status) = self.entries.get_mut(name) else {
            return Ok(());
        };
        if status.is_moved() {
            return Err(status.clone());
        }
        status.owner = Owner::Moved;
        status.moved_at = Some(span);
        Ok(())
    }

    /// Gives `name` a fresh value after an assignment.
    pub fn reown(&mut self, name: &str) {
        if let Some(status) = self.entries.get_mut(name) {
            status.owner = Owner::ScopeOwned;
            status.moved_at = None;
        }
    }

    /// Last known state of the binding `status` describes, whether it is
    /// still reachable by `name` or has since been shadowed.
    fn final_state(&self, name: &str, status: &OwnershipStatus) -> Option<&OwnershipStatus> {
        self.entries
            .get(name)
            .filter(|after| after.same_binding(status))
            .or_else(|| self.shadowed.iter().rev().find(|after| after.same_binding(status)))
    }

    /// Applies what happened inside an always-executed nested block.
    ///
    /// Bindings declared inside the block are dropped with it; outer bindings
    /// take the block's final state, even when the block shadowed them.
    pub fn merge_block(&mut self, inner: &OwnershipTable) {
        for (name, status) in self.entries.iter_mut() {
            if let Some(after) = inner.final_state(name, status) {
                *status = after.clone();
            }
        }
    }

    /// Joins the two arms of an `if`/`else`.
    ///
    /// A binding is moved afterwards only when both arms end with it moved;
    /// otherwise it is owned again.
    pub fn merge_branches(&mut self, then_table: &OwnershipTable, else_table: &OwnershipTable) {
        for (name, status) in self.entries.iter_mut() {
            let then_state = then_table.final_state(name, status).cloned();
            let else_state = else_table.final_state(name, status);
            let then_moved = then_state.as_ref().map_or(status.is_moved(), OwnershipStatus::is_moved);
            let else_moved = else_state.map_or(status.is_moved(), OwnershipStatus::is_moved);

            if then_moved && else_moved {
                let moved_at = then_state.and_then(|after| after.moved_at).or(status.moved_at);
                status.owner = Owner::Moved;
                status.moved_at = moved_at;
            } else {
                status.owner = Owner::ScopeOwned;
                status.moved_at = None;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
