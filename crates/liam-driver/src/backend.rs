//! Code generation seam

use std::io::{self, Write};

use liam_typeck::{CompilationBundle, TypeInfo};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

/// Consumer of a fully checked bundle.
///
/// The pipeline only calls `emit` when every earlier pass finished without
/// reports, so every visited node has an entry in its unit's type table.
pub trait Backend {
    fn name(&self) -> &str;
    fn emit(&mut self, bundle: &CompilationBundle) -> Result<(), BackendError>;
}

/// Writes each unit's imports, structs and function signatures.
pub struct SignatureDump<W: Write> {
    out: W,
}

impl<W: Write> SignatureDump<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Backend for SignatureDump<W> {
    fn name(&self) -> &str {
        "signature-dump"
    }

    fn emit(&mut self, bundle: &CompilationBundle) -> Result<(), BackendError> {
        for unit in bundle.units() {
            writeln!(self.out, "{} {}", unit.id(), unit.path().display())?;

            for import in unit.imports() {
                match import.target {
                    Some(target) => writeln!(self.out, "  import {} = {}", import.alias, target)?,
                    None => writeln!(self.out, "  import {} = ?", import.alias)?,
                }
            }

            for def in unit.structs() {
                write!(self.out, "  struct {}", def.name)?;
                if !def.generics.is_empty() {
                    write!(self.out, "[{}]", def.generics.join(", "))?;
                }
                let members: Vec<String> = def
                    .members
                    .iter()
                    .map(|(name, ty)| format!("{}: {}", name, ty))
                    .collect();
                writeln!(self.out, " {{ {} }}", members.join(", "))?;
            }

            for (name, ty) in unit.scopes().functions.sorted() {
                if let TypeInfo::Fn(signature) = ty {
                    let params: Vec<String> = signature.params.iter().map(ToString::to_string).collect();
                    writeln!(
                        self.out,
                        "  fn {}({}) {}",
                        name,
                        params.join(", "),
                        signature.return_type
                    )?;
                }
            }
        }
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liam_typeck::{Diagnostics, TypeChecker};
    use std::path::PathBuf;

    #[test]
    fn test_signature_dump_output() {
        let source = "struct Pair[T] { a: T, b: ^u64 }\nfn make(x: u64) ~Pair[u64] { return new Pair[u64]{ a: x, b: null }; }\nfn main() { }";
        let mut bundle = CompilationBundle::new();
        let ast = liam_parser::parse_source(source, 0).unwrap();
        bundle.add_unit(
            PathBuf::from("main.liam"),
            source.to_string(),
            liam_lexer::tokenize(source, 0),
            ast,
        );
        let mut diagnostics = Diagnostics::new();
        TypeChecker::new(&mut diagnostics).check_bundle(&mut bundle).unwrap();
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.reports());

        let mut dump = SignatureDump::new(Vec::new());
        dump.emit(&bundle).unwrap();
        let text = String::from_utf8(dump.into_inner()).unwrap();
        assert_eq!(
            text,
            "unit 0 main.liam\n  struct Pair[T] { a: T, b: ^u64 }\n  fn main() void\n  fn make(u64) ~Pair[u64]\n"
        );
    }
}
