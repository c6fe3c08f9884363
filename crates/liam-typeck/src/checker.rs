//! Type checker entry points

use liam_ast::Span;

use crate::bundle::CompilationBundle;
use crate::diagnostics::{Diagnostics, ErrorReport, Pass};
use crate::error::{ErrorKind, StructuralError};
use crate::generics::Instantiator;
use crate::scope::ScopeStack;
use crate::types::{TypeInfo, UnitId};
use crate::unit::{CompilationUnit, TypeTable};

/// Runs the declare and full passes over a bundle.
///
/// Recoverable errors go to the diagnostics sink; a `StructuralError`
/// aborts the pass that hit it.
pub struct TypeChecker<'d> {
    pub(crate) diagnostics: &'d mut Diagnostics,
    pub(crate) instantiator: Instantiator,
}

impl<'d> TypeChecker<'d> {
    pub fn new(diagnostics: &'d mut Diagnostics) -> Self {
        Self {
            diagnostics,
            instantiator: Instantiator::new(),
        }
    }

    /// Declare pass followed by the full pass, stopping early if the
    /// declare pass reported anything.
    pub fn check_bundle(&mut self, bundle: &mut CompilationBundle) -> Result<(), StructuralError> {
        let checkpoint = self.diagnostics.checkpoint();
        self.declare_pass(bundle);
        if self.diagnostics.has_errors_since(checkpoint) {
            return Ok(());
        }
        self.check_pass(bundle)
    }

    /// Checks every function body of every unit and stores each unit's type table.
    pub fn check_pass(&mut self, bundle: &mut CompilationBundle) -> Result<(), StructuralError> {
        let ids: Vec<UnitId> = bundle.unit_ids().collect();
        for id in ids {
            log::debug!("type check: {}", bundle.unit(id).path().display());
            let table = {
                let mut checker = UnitChecker::new(bundle, id, self.diagnostics, &mut self.instantiator);
                checker.check_unit()?;
                checker.table
            };
            log::debug!("type check: {} typed node(s) in {}", table.len(), id);
            bundle.unit_mut(id).set_types(table);
        }
        Ok(())
    }

    pub(crate) fn report(&mut self, pass: Pass, unit: &CompilationUnit, span: Span, kind: ErrorKind) {
        self.diagnostics
            .report(ErrorReport::new(pass, unit.path(), span, kind));
    }
}

/// Full-pass state for one unit.
pub(crate) struct UnitChecker<'a> {
    pub(crate) bundle: &'a CompilationBundle,
    pub(crate) unit: &'a CompilationUnit,
    diagnostics: &'a mut Diagnostics,
    pub(crate) instantiator: &'a mut Instantiator,
    pub(crate) locals: ScopeStack,
    /// Generic parameter names of the function being checked
    pub(crate) generics: Vec<String>,
    pub(crate) table: TypeTable,
    pub(crate) return_type: TypeInfo,
    pub(crate) loop_depth: usize,
}

impl<'a> UnitChecker<'a> {
    fn new(
        bundle: &'a CompilationBundle,
        id: UnitId,
        diagnostics: &'a mut Diagnostics,
        instantiator: &'a mut Instantiator,
    ) -> Self {
        Self {
            bundle,
            unit: bundle.unit(id),
            diagnostics,
            instantiator,
            locals: ScopeStack::new(),
            generics: Vec::new(),
            table: TypeTable::default(),
            return_type: TypeInfo::Void,
            loop_depth: 0,
        }
    }

    pub(crate) fn error(&mut self, span: Span, kind: ErrorKind) {
        self.diagnostics
            .report(ErrorReport::new(Pass::TypeCheck, self.unit.path(), span, kind));
    }
}
