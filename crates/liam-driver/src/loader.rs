//! Bundle assembly from disk

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use liam_ast::Span;
use liam_lexer::TokenKind;
use liam_parser::Parser;
use liam_typeck::{CompilationBundle, ErrorKind, ErrorReport, Pass, UnitId};
use thiserror::Error;

use crate::resolver::ModuleResolver;

/// Failure while reading, lexing, parsing or resolving a file
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("lexical error: {message}")]
    Lex { path: PathBuf, span: Span, message: String },
    #[error("parse error: {message}")]
    Parse { path: PathBuf, span: Span, message: String },
    #[error("cannot resolve import '{import}'")]
    UnresolvedImport { path: PathBuf, span: Span, import: String },
}

impl LoadError {
    /// The file the error was found in.
    pub fn path(&self) -> &Path {
        match self {
            LoadError::Io { path, .. }
            | LoadError::Lex { path, .. }
            | LoadError::Parse { path, .. }
            | LoadError::UnresolvedImport { path, .. } => path,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            LoadError::Io { .. } => Span::default(),
            LoadError::Lex { span, .. } | LoadError::Parse { span, .. } | LoadError::UnresolvedImport { span, .. } => {
                *span
            }
        }
    }

    /// Converts into a load-pass diagnostic.
    pub fn into_report(self) -> ErrorReport {
        let path = self.path().to_path_buf();
        let span = self.span();
        let kind = match self {
            LoadError::UnresolvedImport { import, .. } => ErrorKind::UnresolvedImport(import),
            other => ErrorKind::Fatal(other.to_string()),
        };
        ErrorReport::new(Pass::Load, &path, span, kind)
    }
}

/// Loads an entry file and everything it imports into a bundle
#[derive(Debug, Default)]
pub struct Loader {
    resolver: ModuleResolver,
}

impl Loader {
    pub fn new(resolver: ModuleResolver) -> Self {
        Self { resolver }
    }

    /// Loads `entry` and its imports in preorder.
    ///
    /// Files already in the bundle are not read again, which also ends
    /// import cycles. The first failing file aborts the load.
    pub fn load(&self, entry: &Path, bundle: &mut CompilationBundle) -> Result<UnitId, Vec<LoadError>> {
        let canonical = entry.canonicalize().map_err(|source| {
            vec![LoadError::Io {
                path: entry.to_path_buf(),
                source,
            }]
        })?;
        self.load_file(canonical, bundle)
    }

    fn load_file(&self, path: PathBuf, bundle: &mut CompilationBundle) -> Result<UnitId, Vec<LoadError>> {
        if let Some(existing) = bundle.index_of(&path) {
            log::trace!("already loaded {}", path.display());
            return Ok(existing);
        }

        let source = fs::read_to_string(&path).map_err(|source| {
            vec![LoadError::Io {
                path: path.clone(),
                source,
            }]
        })?;

        let file_id = bundle.next_id().0;
        let tokens = liam_lexer::tokenize(&source, file_id);
        let lex_errors: Vec<LoadError> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Error)
            .map(|t| LoadError::Lex {
                path: path.clone(),
                span: t.span,
                message: t.value.clone(),
            })
            .collect();
        if !lex_errors.is_empty() {
            return Err(lex_errors);
        }

        let ast = Parser::new(tokens.clone()).parse_file().map_err(|errors| {
            errors
                .into_iter()
                .map(|e| LoadError::Parse {
                    path: path.clone(),
                    span: e.span,
                    message: e.message,
                })
                .collect::<Vec<_>>()
        })?;

        log::debug!("loaded {} ({} item(s))", path.display(), ast.items.len());
        let id = bundle.add_unit(path.clone(), source, tokens, ast);

        let imports: Vec<(usize, String, Span)> = bundle
            .unit(id)
            .imports()
            .iter()
            .enumerate()
            .map(|(index, import)| (index, import.path.clone(), import.span))
            .collect();
        for (index, import, span) in imports {
            let Some(target_path) = self.resolver.resolve(&import, &path) else {
                return Err(vec![LoadError::UnresolvedImport {
                    path: path.clone(),
                    span,
                    import,
                }]);
            };
            let target = self.load_file(target_path, bundle)?;
            bundle.unit_mut(id).resolve_import(index, target);
        }

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, source: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, source).unwrap();
        path
    }

    #[test]
    fn test_diamond_import_loads_shared_unit_once() {
        let dir = TempDir::new().expect("create temp dir");
        let entry = write(&dir, "a.liam", "import \"b\" b;\nimport \"c\" c;\nfn main() { }");
        write(&dir, "b.liam", "import \"d\" d;\nfn b() { }");
        write(&dir, "c.liam", "import \"d.liam\" d;\nfn c() { }");
        write(&dir, "d.liam", "fn d() { }");

        let mut bundle = CompilationBundle::new();
        let entry_id = Loader::default().load(&entry, &mut bundle).unwrap();

        assert_eq!(entry_id, UnitId(0));
        assert_eq!(bundle.len(), 4);
        let d_units = bundle
            .units()
            .iter()
            .filter(|u| u.path().ends_with("d.liam"))
            .count();
        assert_eq!(d_units, 1);

        let b = &bundle.units()[1];
        let c = bundle.units().iter().find(|u| u.path().ends_with("c.liam")).unwrap();
        assert_eq!(b.imports()[0].target, c.imports()[0].target);
    }

    #[test]
    fn test_import_cycle_terminates() {
        let dir = TempDir::new().expect("create temp dir");
        let entry = write(&dir, "a.liam", "import \"b\" b;\nfn a() { }");
        write(&dir, "b.liam", "import \"a\" a;\nfn b() { }");

        let mut bundle = CompilationBundle::new();
        Loader::default().load(&entry, &mut bundle).unwrap();
        assert_eq!(bundle.len(), 2);
        assert_eq!(bundle.units()[1].imports()[0].target, Some(UnitId(0)));
    }

    #[test]
    fn test_missing_import_is_reported() {
        let dir = TempDir::new().expect("create temp dir");
        let entry = write(&dir, "a.liam", "import \"gone\" g;\nfn a() { }");

        let mut bundle = CompilationBundle::new();
        let errors = Loader::default().load(&entry, &mut bundle).unwrap_err();
        assert!(matches!(
            &errors[..],
            [LoadError::UnresolvedImport { import, .. }] if import == "gone"
        ));
        let report = errors.into_iter().next().unwrap().into_report();
        assert_eq!(report.pass, Pass::Load);
        assert_eq!(report.line, 1);
    }

    #[test]
    fn test_parse_errors_are_collected() {
        let dir = TempDir::new().expect("create temp dir");
        let entry = write(&dir, "a.liam", "fn a( { }\nfn b() { let; }\nfn c() { }");

        let mut bundle = CompilationBundle::new();
        let errors = Loader::default().load(&entry, &mut bundle).unwrap_err();
        assert!(errors.len() >= 2);
        assert!(errors.iter().all(|e| matches!(e, LoadError::Parse { .. })));
        assert!(bundle.is_empty());
    }

    #[test]
    fn test_missing_entry() {
        let dir = TempDir::new().expect("create temp dir");
        let mut bundle = CompilationBundle::new();
        let errors = Loader::default()
            .load(&dir.path().join("nope.liam"), &mut bundle)
            .unwrap_err();
        assert!(matches!(&errors[..], [LoadError::Io { .. }]));
    }
}
