//! Compilation unit: one source file and its global scopes

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use liam_ast::{FnDecl, Node, NodeId, SourceFile, Span, Stmt, StructDecl};
use liam_lexer::Token;

use crate::scope::Scope;
use crate::types::{builtin_types, StructId, TypeInfo, UnitId};

/// The three file-level scopes
#[derive(Debug, Clone)]
pub struct UnitScopes {
    /// Builtins and this unit's structs
    pub types: Scope,
    pub functions: Scope,
    /// Import aliases
    pub namespaces: Scope,
}

impl UnitScopes {
    fn seeded() -> Self {
        Self {
            types: builtin_types().into_iter().collect(),
            functions: Scope::new(),
            namespaces: Scope::new(),
        }
    }
}

/// Resolved shape of a struct declaration
#[derive(Debug, Clone, PartialEq)]
pub struct StructDef {
    pub id: StructId,
    pub name: String,
    pub span: Span,
    pub generics: Vec<String>,
    /// Ordered; filled in by the declare pass
    pub members: Vec<(String, TypeInfo)>,
}

impl StructDef {
    pub fn member(&self, name: &str) -> Option<&TypeInfo> {
        self.members.iter().find(|(n, _)| n == name).map(|(_, ty)| ty)
    }

    /// The `TypeInfo::Struct` naming this declaration.
    pub fn type_info(&self) -> TypeInfo {
        TypeInfo::Struct {
            id: self.id,
            name: self.name.clone(),
            generic_arity: self.generics.len(),
        }
    }
}

/// An import of this unit and the unit it resolved to
#[derive(Debug, Clone, PartialEq)]
pub struct UnitImport {
    pub alias: String,
    pub path: String,
    pub span: Span,
    pub target: Option<UnitId>,
}

/// Resolved types of statement and expression nodes
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    types: HashMap<NodeId, TypeInfo>,
}

impl TypeTable {
    pub fn record(&mut self, id: NodeId, ty: TypeInfo) {
        self.types.insert(id, ty);
    }

    pub fn get(&self, id: NodeId) -> Option<&TypeInfo> {
        self.types.get(&id)
    }

    pub fn type_of<T>(&self, node: &Node<T>) -> Option<&TypeInfo> {
        self.get(node.id)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// One source file plus everything the checker learns about it
#[derive(Debug)]
pub struct CompilationUnit {
    id: UnitId,
    path: PathBuf,
    source: String,
    tokens: Vec<Token>,
    ast: SourceFile,
    imports: Vec<UnitImport>,
    /// Indices into `ast.items`
    struct_decls: Vec<usize>,
    fn_decls: Vec<usize>,
    pub(crate) scopes: UnitScopes,
    pub(crate) structs: Vec<StructDef>,
    pub(crate) types: TypeTable,
}

impl CompilationUnit {
    pub fn new(id: UnitId, path: PathBuf, source: String, tokens: Vec<Token>, ast: SourceFile) -> Self {
        let mut imports = Vec::new();
        let mut struct_decls = Vec::new();
        let mut fn_decls = Vec::new();

        for (index, item) in ast.items.iter().enumerate() {
            match &item.value {
                Stmt::Import(import) => imports.push(UnitImport {
                    alias: import.alias.name.clone(),
                    path: import.path.clone(),
                    span: import.path_span,
                    target: None,
                }),
                Stmt::Struct(_) => struct_decls.push(index),
                Stmt::Fn(_) => fn_decls.push(index),
                _ => {}
            }
        }

        Self {
            id,
            path,
            source,
            tokens,
            ast,
            imports,
            struct_decls,
            fn_decls,
            scopes: UnitScopes::seeded(),
            structs: Vec::new(),
            types: TypeTable::default(),
        }
    }

    pub fn id(&self) -> UnitId {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn ast(&self) -> &SourceFile {
        &self.ast
    }

    pub fn imports(&self) -> &[UnitImport] {
        &self.imports
    }

    /// Records which unit the `index`-th import resolved to.
    pub fn resolve_import(&mut self, index: usize, target: UnitId) {
        if let Some(import) = self.imports.get_mut(index) {
            import.target = Some(target);
        }
    }

    pub fn struct_decls(&self) -> impl Iterator<Item = &StructDecl> {
        self.struct_decls.iter().filter_map(|&i| match &self.ast.items[i].value {
            Stmt::Struct(decl) => Some(decl),
            _ => None,
        })
    }

    pub fn fn_decls(&self) -> impl Iterator<Item = &FnDecl> {
        self.fn_decls.iter().filter_map(|&i| match &self.ast.items[i].value {
            Stmt::Fn(decl) => Some(decl),
            _ => None,
        })
    }

    pub fn scopes(&self) -> &UnitScopes {
        &self.scopes
    }

    pub fn structs(&self) -> &[StructDef] {
        &self.structs
    }

    pub fn types(&self) -> &TypeTable {
        &self.types
    }

    pub(crate) fn set_types(&mut self, types: TypeTable) {
        self.types = types;
    }
}
