//! Typed Context - type annotations for a checked program
//!
//! [`TypedContext`] is what a code generator receives after a successful
//! check: the program itself, the type of every expression the checker
//! visited (keyed by [`NodeId`]) and the scope tree with all symbols.
//!
//! ```text
//! TypedContext
//! ├─ Program (the AST, arena-allocated)
//! ├─ expr_types: FxHashMap<NodeId, &TypeNode>
//! └─ SymbolTable
//!    ├─ global scope with one `__module_<name>` symbol per module
//!    └─ module scopes → function scopes → block/loop scopes
//! ```
//!
//! Only value expressions carry a type. Declaration names, type annotations
//! and the module alias in `alias.symbol` have none; an `Enum` in
//! `Enum.Variant` is not a value either, only the whole access is.

use cinder_ast::nodes::{BasicType, Expr, FunctionDecl, Module, NodeId, Program, TypeNode};
use rustc_hash::FxHashMap;

use crate::symbol_table::{ScopeId, Symbol, SymbolTable};

#[derive(Debug)]
pub struct TypedContext<'a> {
    program: &'a Program<'a>,
    symbol_table: SymbolTable<'a>,
    expr_types: FxHashMap<NodeId, &'a TypeNode<'a>>,
    /// Scope of each module, parallel to `program.modules`.
    module_scopes: Vec<ScopeId>,
}

impl<'a> TypedContext<'a> {
    pub(crate) fn new(
        program: &'a Program<'a>,
        symbol_table: SymbolTable<'a>,
        expr_types: FxHashMap<NodeId, &'a TypeNode<'a>>,
        module_scopes: Vec<ScopeId>,
    ) -> Self {
        Self {
            program,
            symbol_table,
            expr_types,
            module_scopes,
        }
    }

    #[must_use]
    pub fn program(&self) -> &'a Program<'a> {
        self.program
    }

    #[must_use]
    pub fn symbol_table(&self) -> &SymbolTable<'a> {
        &self.symbol_table
    }

    #[must_use]
    pub fn expr_type(&self, expr: &Expr<'_>) -> Option<&'a TypeNode<'a>> {
        self.node_type(expr.id)
    }

    #[must_use]
    pub fn node_type(&self, id: NodeId) -> Option<&'a TypeNode<'a>> {
        self.expr_types.get(&id).copied()
    }

    #[must_use]
    pub fn is_expr_basic(&self, expr: &Expr<'_>, basic: BasicType) -> bool {
        self.expr_type(expr).is_some_and(|ty| ty.is_basic(basic))
    }

    #[must_use]
    pub fn typed_expression_count(&self) -> usize {
        self.expr_types.len()
    }

    /// Resolves `name` from `scope` outward, like the checker did.
    #[must_use]
    pub fn scope_lookup(&self, scope: ScopeId, name: &str) -> Option<&Symbol<'a>> {
        self.symbol_table.lookup(scope, name)
    }

    #[must_use]
    pub fn global_scope(&self) -> ScopeId {
        self.symbol_table.global()
    }

    #[must_use]
    pub fn module_scope(&self, name: &str) -> Option<ScopeId> {
        self.symbol_table.module_scope(name)
    }

    /// Scope of the given module node of this program.
    #[must_use]
    pub fn scope_of_module(&self, module: &Module<'_>) -> Option<ScopeId> {
        self.program
            .modules()
            .position(|candidate| candidate.id == module.id)
            .and_then(|index| self.module_scopes.get(index).copied())
    }

    /// Top-level functions of every module, in program order.
    pub fn functions(&self) -> impl Iterator<Item = (&'a Module<'a>, &'a FunctionDecl<'a>)> + '_ {
        self.program.modules().flat_map(|module| {
            module
                .items
                .iter()
                .copied()
                .filter_map(move |item| item.as_function().map(|function| (module, function)))
        })
    }

    /// The `main` function, if any module defines one.
    #[must_use]
    pub fn entry_point(&self) -> Option<(&'a Module<'a>, &'a FunctionDecl<'a>)> {
        self.functions()
            .find(|(_, function)| function.name.name == "main")
    }
}
