//! # Liam Type Checker
//!
//! Semantic core of the liam compiler: the compilation bundle, resolved
//! types and scopes, the two-pass type checker with generic instantiation,
//! and the borrow checker for owned pointers.
//!
//! Every pass reports into an explicitly passed [`Diagnostics`] sink. The
//! caller takes a [`Checkpoint`] before a pass and stops the pipeline when
//! the pass added reports.

mod types;
mod scope;
mod error;
mod diagnostics;
mod unit;
mod bundle;
mod helpers;
mod generics;
mod checker;
mod decl_checker;
mod stmt_checker;
mod expr_checker;
mod ownership;
mod borrowck;

// Re-export public API
pub use types::{builtin_types, FnType, NumberKind, NumberType, Ownership, StructId, TypeInfo, UnitId};
pub use scope::{Scope, ScopeStack};
pub use error::{ErrorKind, StructuralError};
pub use diagnostics::{Checkpoint, Diagnostics, ErrorReport, Note, Pass};
pub use unit::{CompilationUnit, StructDef, TypeTable, UnitImport, UnitScopes};
pub use bundle::CompilationBundle;
pub use helpers::TypeHelpers;
pub use generics::Instantiator;
pub use checker::TypeChecker;
pub use ownership::{Owner, OwnershipStatus, OwnershipTable};
pub use borrowck::BorrowChecker;

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::{Path, PathBuf};

    use crate::{BorrowChecker, CompilationBundle, Diagnostics, ErrorKind, TypeChecker, UnitId};

    /// Builds a bundle from `(path, source)` pairs; imports resolve by exact path.
    pub fn bundle_of(files: &[(&str, &str)]) -> CompilationBundle {
        let mut bundle = CompilationBundle::new();
        for (path, source) in files {
            let file_id = bundle.next_id().0;
            let ast = liam_parser::parse_source(source, file_id)
                .unwrap_or_else(|errors| panic!("{} does not parse: {:?}", path, errors));
            bundle.add_unit(
                PathBuf::from(path),
                source.to_string(),
                liam_lexer::tokenize(source, file_id),
                ast,
            );
        }

        let ids: Vec<UnitId> = bundle.unit_ids().collect();
        for id in ids {
            let targets: Vec<(usize, UnitId)> = bundle
                .unit(id)
                .imports()
                .iter()
                .enumerate()
                .filter_map(|(index, import)| bundle.index_of(Path::new(&import.path)).map(|t| (index, t)))
                .collect();
            for (index, target) in targets {
                bundle.unit_mut(id).resolve_import(index, target);
            }
        }
        bundle
    }

    pub fn declare(bundle: &mut CompilationBundle) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        TypeChecker::new(&mut diagnostics).declare_pass(bundle);
        diagnostics
    }

    pub fn check_bundle(files: &[(&str, &str)]) -> (CompilationBundle, Diagnostics) {
        let mut bundle = bundle_of(files);
        let mut diagnostics = Diagnostics::new();
        TypeChecker::new(&mut diagnostics)
            .check_bundle(&mut bundle)
            .expect("well-formed tree");
        (bundle, diagnostics)
    }

    pub fn check(files: &[(&str, &str)]) -> Diagnostics {
        check_bundle(files).1
    }

    /// Type checks `source` as `main.liam`, which must succeed, then borrow checks it.
    pub fn borrow_check(source: &str) -> Diagnostics {
        let (bundle, mut diagnostics) = check_bundle(&[("main.liam", source)]);
        assert!(diagnostics.is_empty(), "type errors: {:?}", diagnostics.reports());
        BorrowChecker::new(&mut diagnostics).check_bundle(&bundle);
        diagnostics
    }

    pub fn kinds(diagnostics: &Diagnostics) -> Vec<ErrorKind> {
        diagnostics.reports().iter().map(|r| r.kind.clone()).collect()
    }
}
