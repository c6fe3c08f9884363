//! Pass sequencing and the halting contract

use std::path::Path;

use liam_typeck::{
    BorrowChecker, CompilationBundle, Diagnostics, ErrorKind, ErrorReport, Pass, StructuralError, TypeChecker, UnitId,
};

use crate::backend::Backend;
use crate::loader::Loader;

/// Stages in execution order
pub const STAGES: [Pass; 5] = [Pass::Load, Pass::Declare, Pass::TypeCheck, Pass::BorrowCheck, Pass::Backend];

/// Settings for one pipeline run
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Last stage to run even when everything succeeds
    pub stop_after: Option<Pass>,
}

/// Everything a run produced
#[derive(Debug, Default)]
pub struct Compilation {
    pub bundle: CompilationBundle,
    pub diagnostics: Diagnostics,
    /// Stages that were started, in order
    pub stages: Vec<Pass>,
    /// The stage whose reports stopped the run
    pub halted_at: Option<Pass>,
}

impl Compilation {
    pub fn succeeded(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

pub struct Pipeline {
    options: CompileOptions,
    loader: Loader,
}

impl Pipeline {
    pub fn new(options: CompileOptions) -> Self {
        Self {
            options,
            loader: Loader::default(),
        }
    }

    /// Runs every stage on `entry`, halting after the first stage that reports.
    ///
    /// Without a backend the run ends after borrow checking.
    pub fn run(&self, entry: &Path, mut backend: Option<&mut dyn Backend>) -> Compilation {
        let mut compilation = Compilation::default();

        for stage in STAGES {
            if stage == Pass::Backend && backend.is_none() {
                break;
            }
            log::info!("stage: {}", stage);
            let checkpoint = compilation.diagnostics.checkpoint();
            compilation.stages.push(stage);

            self.run_stage(stage, entry, &mut compilation, &mut backend);

            if compilation.diagnostics.has_errors_since(checkpoint) {
                log::info!(
                    "halting after {}: {} report(s)",
                    stage,
                    compilation.diagnostics.since(checkpoint).len()
                );
                compilation.halted_at = Some(stage);
                break;
            }
            if self.options.stop_after == Some(stage) {
                break;
            }
        }
        compilation
    }

    fn run_stage(
        &self,
        stage: Pass,
        entry: &Path,
        compilation: &mut Compilation,
        backend: &mut Option<&mut dyn Backend>,
    ) {
        let Compilation {
            bundle, diagnostics, ..
        } = compilation;

        match stage {
            Pass::Load => {
                if let Err(errors) = self.loader.load(entry, bundle) {
                    for error in errors {
                        diagnostics.report(error.into_report());
                    }
                }
            }
            Pass::Declare => TypeChecker::new(diagnostics).declare_pass(bundle),
            Pass::TypeCheck => {
                if let Err(error) = TypeChecker::new(diagnostics).check_pass(bundle) {
                    report_structural(bundle, diagnostics, error);
                }
            }
            Pass::BorrowCheck => BorrowChecker::new(diagnostics).check_bundle(bundle),
            Pass::Backend => {
                let Some(backend) = backend.as_mut() else { return };
                log::debug!("emitting with {}", backend.name());
                if let Err(error) = backend.emit(bundle) {
                    diagnostics.report(ErrorReport::new(
                        Pass::Backend,
                        entry,
                        Default::default(),
                        ErrorKind::Fatal(error.to_string()),
                    ));
                }
            }
        }
    }
}

fn report_structural(bundle: &CompilationBundle, diagnostics: &mut Diagnostics, error: StructuralError) {
    let span = error.span();
    let file = bundle
        .get(UnitId(span.file_id))
        .map(|unit| unit.path().to_path_buf())
        .unwrap_or_default();
    diagnostics.report(ErrorReport::new(
        Pass::TypeCheck,
        &file,
        span,
        ErrorKind::Fatal(error.to_string()),
    ));
}
