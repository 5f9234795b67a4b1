//! Symbol Table
//!
//! A tree of scopes stored in one vector and linked by [`ScopeId`] indices.
//! The root is the global scope; every module gets a child of the root, and
//! functions, blocks, loops and branches open further children below it.
//!
//! - Lookup walks from a scope up to the root, so inner names shadow outer ones.
//! - Names are unique within one scope; [`SymbolTable::insert`] rejects duplicates.
//! - Modules are registered in the global scope under their mangled name
//!   (`__module_<name>`), which is how `@use` finds them.
//! - Qualified lookup (`alias.symbol`) walks the import lists upward and
//!   honours `pub`/`priv`: private symbols are only visible from the module
//!   that declares them.

use cinder_ast::nodes::{Position, Stmt, TypeNode};
use rustc_hash::FxHashMap;

use crate::errors::TypeCheckError;

/// Index of a scope inside its [`SymbolTable`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct ScopeId(pub u32);

impl ScopeId {
    pub const GLOBAL: ScopeId = ScopeId(0);

    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum SymbolKind {
    Variable,
    Constant,
    Parameter,
    Function,
    Struct,
    Enum,
    Module,
}

impl SymbolKind {
    #[must_use]
    pub fn is_type(self) -> bool {
        matches!(self, SymbolKind::Struct | SymbolKind::Enum)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Symbol<'a> {
    pub name: &'a str,
    pub kind: SymbolKind,
    pub ty: &'a TypeNode<'a>,
    pub is_public: bool,
    pub is_mutable: bool,
    /// Depth of the scope the symbol was declared in.
    pub depth: u32,
    pub declaration: Option<&'a Stmt<'a>>,
    pub position: Position,
    /// Scope a [`SymbolKind::Module`] symbol stands for.
    pub module_scope: Option<ScopeId>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ModuleInfo {
    pub name: String,
    pub mangled_name: String,
}

/// One `@use module as alias;` recorded in the scope it appeared in.
#[derive(Clone, Debug)]
pub struct ModuleImport<'a> {
    pub module_name: &'a str,
    pub alias: &'a str,
    pub target: ScopeId,
    pub position: Position,
}

#[derive(Debug)]
pub struct Scope<'a> {
    pub id: ScopeId,
    pub parent: Option<ScopeId>,
    pub name: String,
    pub depth: u32,
    pub is_function_scope: bool,
    pub is_loop_scope: bool,
    /// Function or loop statement that opened the scope.
    pub declaration: Option<&'a Stmt<'a>>,
    pub symbols: FxHashMap<&'a str, Symbol<'a>>,
    pub children: Vec<ScopeId>,
    pub module: Option<ModuleInfo>,
    pub imports: Vec<ModuleImport<'a>>,
}

/// What kind of scope [`SymbolTable::push_scope`] opens.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ScopeKind {
    Module,
    Function,
    Loop,
    Block,
}

/// Reason a qualified `alias.name` lookup failed.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum QualifiedLookupError {
    UnknownAlias,
    Private { module: String },
    Missing { module: String },
}

#[must_use]
pub fn mangled_module_name(name: &str) -> String {
    format!("__module_{name}")
}

#[derive(Debug)]
pub struct SymbolTable<'a> {
    scopes: Vec<Scope<'a>>,
}

impl Default for SymbolTable<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> SymbolTable<'a> {
    #[must_use]
    pub fn new() -> Self {
        let global = Scope {
            id: ScopeId::GLOBAL,
            parent: None,
            name: "global".to_string(),
            depth: 0,
            is_function_scope: false,
            is_loop_scope: false,
            declaration: None,
            symbols: FxHashMap::default(),
            children: Vec::new(),
            module: None,
            imports: Vec::new(),
        };
        Self {
            scopes: vec![global],
        }
    }

    #[must_use]
    pub fn global(&self) -> ScopeId {
        ScopeId::GLOBAL
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// # Panics
    ///
    /// Panics if `id` was not produced by this table.
    #[must_use]
    pub fn scope(&self, id: ScopeId) -> &Scope<'a> {
        &self.scopes[id.index()]
    }

    pub fn scopes(&self) -> impl Iterator<Item = &Scope<'a>> {
        self.scopes.iter()
    }

    /// Opens a child of `parent` and returns its id.
    pub fn push_scope(
        &mut self,
        parent: ScopeId,
        name: &str,
        kind: ScopeKind,
        declaration: Option<&'a Stmt<'a>>,
    ) -> ScopeId {
        let id = ScopeId(u32::try_from(self.scopes.len()).unwrap_or(u32::MAX));
        let depth = self.scope(parent).depth + 1;
        let module = (kind == ScopeKind::Module).then(|| ModuleInfo {
            name: name.to_string(),
            mangled_name: mangled_module_name(name),
        });
        tracing::trace!(scope = id.0, parent = parent.0, depth, name, "push scope");
        self.scopes.push(Scope {
            id,
            parent: Some(parent),
            name: name.to_string(),
            depth,
            is_function_scope: kind == ScopeKind::Function,
            is_loop_scope: kind == ScopeKind::Loop,
            declaration,
            symbols: FxHashMap::default(),
            children: Vec::new(),
            module,
            imports: Vec::new(),
        });
        self.scopes[parent.index()].children.push(id);
        id
    }

    /// Declares `symbol` in `scope`; a name already declared in that very scope is an error.
    ///
    /// # Errors
    ///
    /// Returns [`TypeCheckError::DuplicateDeclaration`] pointing at both declarations.
    pub fn insert(&mut self, scope: ScopeId, mut symbol: Symbol<'a>) -> Result<(), TypeCheckError> {
        if let Some(existing) = self.lookup_current_only(scope, symbol.name) {
            return Err(TypeCheckError::DuplicateDeclaration {
                name: symbol.name.to_string(),
                previous: existing.position,
                position: symbol.position,
            });
        }
        let target = &mut self.scopes[scope.index()];
        symbol.depth = target.depth;
        target.symbols.insert(symbol.name, symbol);
        Ok(())
    }

    #[must_use]
    pub fn lookup_current_only(&self, scope: ScopeId, name: &str) -> Option<&Symbol<'a>> {
        self.scope(scope).symbols.get(name)
    }

    /// Innermost declaration of `name` visible from `scope`.
    #[must_use]
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<&Symbol<'a>> {
        self.lookup_with_scope(scope, name).map(|(symbol, _)| symbol)
    }

    /// Like [`lookup`](Self::lookup), also returning the scope that declares the symbol.
    #[must_use]
    pub fn lookup_with_scope(&self, scope: ScopeId, name: &str) -> Option<(&Symbol<'a>, ScopeId)> {
        self.ancestors(scope).find_map(|current| {
            self.lookup_current_only(current.id, name)
                .map(|symbol| (symbol, current.id))
        })
    }

    /// `scope` followed by each of its parents up to the global scope.
    pub fn ancestors(&self, scope: ScopeId) -> impl Iterator<Item = &Scope<'a>> {
        std::iter::successors(Some(self.scope(scope)), |current| {
            current.parent.map(|parent| self.scope(parent))
        })
    }

    /// Nearest enclosing module scope, `scope` included.
    #[must_use]
    pub fn enclosing_module(&self, scope: ScopeId) -> Option<ScopeId> {
        self.ancestors(scope)
            .find(|current| current.module.is_some())
            .map(|current| current.id)
    }

    /// Nearest enclosing function scope, `scope` included.
    #[must_use]
    pub fn enclosing_function(&self, scope: ScopeId) -> Option<&Scope<'a>> {
        self.ancestors(scope).find(|current| current.is_function_scope)
    }

    /// Whether `break`/`continue` in `scope` has a loop to target. Function
    /// boundaries stop the search.
    #[must_use]
    pub fn in_loop(&self, scope: ScopeId) -> bool {
        for current in self.ancestors(scope) {
            if current.is_loop_scope {
                return true;
            }
            if current.is_function_scope {
                return false;
            }
        }
        false
    }

    /// Creates the scope for module `name`, or returns the existing one when
    /// another file already declared the same module.
    pub fn register_module(
        &mut self,
        name: &'a str,
        ty: &'a TypeNode<'a>,
        position: Position,
    ) -> ScopeId {
        if let Some(existing) = self.module_scope(name) {
            return existing;
        }
        let scope = self.push_scope(ScopeId::GLOBAL, name, ScopeKind::Module, None);
        let mangled = mangled_module_name(name);
        let key: &'a str = ty.as_named().unwrap_or(name);
        debug_assert_eq!(key, mangled);
        let target = &mut self.scopes[ScopeId::GLOBAL.index()];
        target.symbols.insert(
            key,
            Symbol {
                name: key,
                kind: SymbolKind::Module,
                ty,
                is_public: true,
                is_mutable: false,
                depth: 0,
                declaration: None,
                position,
                module_scope: Some(scope),
            },
        );
        scope
    }

    /// Scope of module `name`, found through its mangled global symbol.
    #[must_use]
    pub fn module_scope(&self, name: &str) -> Option<ScopeId> {
        self.lookup_current_only(ScopeId::GLOBAL, &mangled_module_name(name))
            .filter(|symbol| symbol.kind == SymbolKind::Module)
            .and_then(|symbol| symbol.module_scope)
    }

    pub fn add_import(&mut self, scope: ScopeId, import: ModuleImport<'a>) {
        self.scopes[scope.index()].imports.push(import);
    }

    /// Nearest import bound to `alias`, searching `scope` and its parents.
    #[must_use]
    pub fn find_import(&self, scope: ScopeId, alias: &str) -> Option<&ModuleImport<'a>> {
        self.ancestors(scope)
            .find_map(|current| current.imports.iter().find(|import| import.alias == alias))
    }

    /// Resolves `alias.name` as seen from `from`.
    ///
    /// # Errors
    ///
    /// Fails when no import binds `alias`, when the target module has no
    /// `name`, or when `name` is private and `from` lies outside that module.
    pub fn resolve_qualified(
        &self,
        from: ScopeId,
        alias: &str,
        name: &str,
    ) -> Result<&Symbol<'a>, QualifiedLookupError> {
        let import = self
            .find_import(from, alias)
            .ok_or(QualifiedLookupError::UnknownAlias)?;
        let module = import.module_name.to_string();
        let Some(symbol) = self.lookup_current_only(import.target, name) else {
            return Err(QualifiedLookupError::Missing { module });
        };
        if !symbol.is_public && self.enclosing_module(from) != Some(import.target) {
            return Err(QualifiedLookupError::Private { module });
        }
        Ok(symbol)
    }

    /// Resolves an unqualified type `name` through the modules imported into
    /// `from` or its parents, nearest import first. Returns `Ok(None)` when no
    /// imported module declares a struct or enum of that name.
    ///
    /// # Errors
    ///
    /// Fails with [`QualifiedLookupError::Private`] when the only match is
    /// private to a module other than the one enclosing `from`.
    pub fn resolve_imported_type(
        &self,
        from: ScopeId,
        name: &str,
    ) -> Result<Option<&Symbol<'a>>, QualifiedLookupError> {
        let current_module = self.enclosing_module(from);
        let mut hidden = None;
        for import in self.ancestors(from).flat_map(|scope| scope.imports.iter()) {
            let Some(symbol) = self
                .lookup_current_only(import.target, name)
                .filter(|symbol| symbol.kind.is_type())
            else {
                continue;
            };
            if symbol.is_public || current_module == Some(import.target) {
                return Ok(Some(symbol));
            }
            hidden.get_or_insert_with(|| import.module_name.to_string());
        }
        match hidden {
            Some(module) => Err(QualifiedLookupError::Private { module }),
            None => Ok(None),
        }
    }
}
