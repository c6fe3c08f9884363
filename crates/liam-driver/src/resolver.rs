//! Module resolution logic for import statements

use std::path::{Path, PathBuf};

/// File extension of liam sources
pub const SOURCE_EXTENSION: &str = "liam";

/// Maps import strings to canonical source paths
#[derive(Debug, Clone, Default)]
pub struct ModuleResolver;

impl ModuleResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolves `specifier` as written in `from_file`.
    ///
    /// Relative specifiers are joined to the importing file's directory and
    /// `.liam` is appended when missing. Returns `None` when no such file exists.
    pub fn resolve(&self, specifier: &str, from_file: &Path) -> Option<PathBuf> {
        let mut target = PathBuf::from(specifier);
        if target.is_relative() {
            let from_dir = from_file.parent().unwrap_or_else(|| Path::new("."));
            target = from_dir.join(target);
        }
        if target.extension().and_then(|e| e.to_str()) != Some(SOURCE_EXTENSION) {
            let mut with_ext = target.into_os_string();
            with_ext.push(".");
            with_ext.push(SOURCE_EXTENSION);
            target = PathBuf::from(with_ext);
        }

        if !target.is_file() {
            log::debug!("unresolved import {} from {}", specifier, from_file.display());
            return None;
        }
        target.canonicalize().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_relative_resolution() {
        let temp = tempfile::TempDir::new().expect("create temp dir");
        fs::create_dir_all(temp.path().join("lib")).unwrap();
        fs::write(temp.path().join("lib/math.liam"), "fn one() u64 { return 1u64; }").unwrap();
        let from_file = temp.path().join("main.liam");

        let resolver = ModuleResolver::new();
        let with_ext = resolver.resolve("lib/math.liam", &from_file).unwrap();
        let without_ext = resolver.resolve("./lib/math", &from_file).unwrap();
        assert_eq!(with_ext, without_ext);
        assert!(with_ext.ends_with("lib/math.liam"));
        assert!(with_ext.is_absolute());
    }

    #[test]
    fn test_parent_directory_and_missing() {
        let temp = tempfile::TempDir::new().expect("create temp dir");
        fs::create_dir_all(temp.path().join("app")).unwrap();
        fs::write(temp.path().join("shared.liam"), "").unwrap();
        let from_file = temp.path().join("app/main.liam");

        let resolver = ModuleResolver::new();
        assert!(resolver.resolve("../shared", &from_file).is_some());
        assert!(resolver.resolve("nowhere", &from_file).is_none());
    }
}
