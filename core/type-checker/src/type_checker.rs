//! Type Checker Core
//!
//! Walks a parsed [`Program`] and reports every type error to the shared
//! diagnostics sink. Checking runs in phases over all modules:
//!
//! 1. **Register modules** - one scope per module name under the global
//!    scope, announced by a mangled `__module_<name>` symbol
//! 2. **Collect declarations** - structs and enums, then `@use` imports,
//!    then struct field types and function signatures, so bodies may refer
//!    to anything declared later or in another module
//! 3. **Check globals** - imported modules before their importers
//! 4. **Check function bodies** - in source order
//!
//! Named types resolve lexically first and then through imported modules;
//! a private struct or enum is only nameable inside its own module.
//!
//! Expressions yield `Option<&TypeNode>`; `None` means an error was already
//! reported and callers must not report again. Statements yield `bool`: a
//! failed statement fails its enclosing construct, but its siblings are
//! still checked so one run surfaces as many errors as possible.

use cinder_ast::Builder;
use cinder_ast::diagnostics::{Diagnostic, Diagnostics};
use cinder_ast::nodes::{
    BasicType, Block, EnumDecl, Expr, ExprKind, FunctionDecl, Identifier, IfStmt, LiteralValue,
    LoopKind, LoopStmt, Module, NodeId, OperatorClass, Position, PostfixOp, Program, Stmt, StmtKind,
    StructDecl, TypeKind, TypeNode, UnaryOp, UseDirective, VarDecl, Visibility,
};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use crate::errors::{TypeCheckError, TypeMismatchContext};
use crate::symbol_table::{
    ModuleImport, QualifiedLookupError, ScopeId, ScopeKind, Symbol, SymbolKind, SymbolTable,
    mangled_module_name,
};
use crate::types_match::types_match;

/// One shared node per basic type, used for inferred types.
struct Builtins<'a> {
    int: &'a TypeNode<'a>,
    float: &'a TypeNode<'a>,
    char: &'a TypeNode<'a>,
    bool: &'a TypeNode<'a>,
    string: &'a TypeNode<'a>,
    void: &'a TypeNode<'a>,
    null: &'a TypeNode<'a>,
}

impl<'a> Builtins<'a> {
    fn new(builder: &Builder<'a>) -> Self {
        let make = |basic| builder.basic_type(Position::default(), basic);
        Self {
            int: make(BasicType::Int),
            float: make(BasicType::Float),
            char: make(BasicType::Char),
            bool: make(BasicType::Bool),
            string: make(BasicType::String),
            void: make(BasicType::Void),
            null: make(BasicType::Null),
        }
    }
}

/// Everything the checker produced for one program.
pub(crate) struct CheckOutcome<'a> {
    pub(crate) symbol_table: SymbolTable<'a>,
    pub(crate) expr_types: FxHashMap<NodeId, &'a TypeNode<'a>>,
    pub(crate) module_scopes: Vec<ScopeId>,
    pub(crate) errors: usize,
    pub(crate) warnings: usize,
}

pub(crate) struct TypeChecker<'a, 'b> {
    builder: &'b Builder<'a>,
    diagnostics: &'b mut Diagnostics,
    table: SymbolTable<'a>,
    expr_types: FxHashMap<NodeId, &'a TypeNode<'a>>,
    builtins: Builtins<'a>,
    /// Declaration each resolved named type node refers to. Types carry only
    /// a name, so values of another module's struct find their fields here.
    named_types: FxHashMap<NodeId, &'a Stmt<'a>>,
    /// Functions whose signature was rejected; their bodies are not checked.
    invalid_functions: FxHashSet<NodeId>,
    module: Option<&'a Module<'a>>,
    reported: FxHashSet<String>,
    errors: usize,
    warnings: usize,
}

impl<'a, 'b> TypeChecker<'a, 'b> {
    pub(crate) fn new(builder: &'b Builder<'a>, diagnostics: &'b mut Diagnostics) -> Self {
        Self {
            builder,
            diagnostics,
            table: SymbolTable::new(),
            expr_types: FxHashMap::default(),
            builtins: Builtins::new(builder),
            named_types: FxHashMap::default(),
            invalid_functions: FxHashSet::default(),
            module: None,
            reported: FxHashSet::default(),
            errors: 0,
            warnings: 0,
        }
    }

    pub(crate) fn check(mut self, program: &'a Program<'a>) -> CheckOutcome<'a> {
        debug!(modules = program.modules.len(), "registering modules");
        let module_scopes: Vec<ScopeId> = program
            .modules()
            .map(|module| self.register_module(module))
            .collect();

        debug!("collecting declarations");
        self.for_each_item(program, &module_scopes, |checker, scope, item| match &item.kind {
            StmtKind::Struct(decl) => {
                checker.declare_struct(scope, item, decl);
            }
            StmtKind::Enum(decl) => {
                checker.declare_enum(scope, item, decl);
            }
            _ => {}
        });
        self.for_each_item(program, &module_scopes, |checker, scope, item| {
            if let StmtKind::Use(directive) = &item.kind {
                checker.check_use(scope, item, directive);
            }
        });
        self.for_each_item(program, &module_scopes, |checker, scope, item| {
            if let StmtKind::Struct(decl) = &item.kind {
                for field in decl.fields {
                    checker.validate_type(scope, field.ty);
                }
            }
        });
        self.for_each_item(program, &module_scopes, |checker, scope, item| {
            if let StmtKind::Function(decl) = &item.kind {
                checker.declare_function(scope, item, decl);
            }
        });

        // Imported modules have their globals checked first, so initializers
        // may read another module's constants whatever the file order.
        debug!("checking globals");
        for scope in self.global_order(&module_scopes) {
            for (module, _) in program
                .modules()
                .zip(&module_scopes)
                .filter(|(_, module_scope)| **module_scope == scope)
            {
                self.module = Some(module);
                for item in module.items {
                    if let StmtKind::VarDecl(decl) = &item.kind {
                        self.check_var_decl(scope, item, decl);
                    }
                }
            }
        }

        debug!("checking function bodies");
        self.for_each_item(program, &module_scopes, |checker, scope, item| match &item.kind {
            StmtKind::Function(decl) => {
                checker.check_function_body(scope, item, decl);
            }
            StmtKind::Struct(_) | StmtKind::Enum(_) | StmtKind::Use(_) | StmtKind::VarDecl(_) => {}
            _ => checker.report(TypeCheckError::StatementAtModuleLevel {
                position: item.position,
            }),
        });

        debug!(
            errors = self.errors,
            warnings = self.warnings,
            scopes = self.table.len(),
            "type checking finished"
        );
        CheckOutcome {
            symbol_table: self.table,
            expr_types: self.expr_types,
            module_scopes,
            errors: self.errors,
            warnings: self.warnings,
        }
    }

    /// Runs `visit` on every top-level item, module by module in file order.
    fn for_each_item(
        &mut self,
        program: &'a Program<'a>,
        module_scopes: &[ScopeId],
        mut visit: impl FnMut(&mut Self, ScopeId, &'a Stmt<'a>),
    ) {
        for (module, &scope) in program.modules().zip(module_scopes) {
            self.module = Some(module);
            for &item in module.items {
                visit(self, scope, item);
            }
        }
    }

    /// Module scopes ordered so that each comes after the modules it imports.
    /// An import cycle is broken at the module reached first.
    fn global_order(&self, module_scopes: &[ScopeId]) -> Vec<ScopeId> {
        let mut visited = FxHashSet::default();
        let mut order = Vec::with_capacity(module_scopes.len());
        for &scope in module_scopes {
            self.visit_imports(scope, &mut visited, &mut order);
        }
        order
    }

    fn visit_imports(
        &self,
        scope: ScopeId,
        visited: &mut FxHashSet<ScopeId>,
        order: &mut Vec<ScopeId>,
    ) {
        if !visited.insert(scope) {
            return;
        }
        for import in &self.table.scope(scope).imports {
            self.visit_imports(import.target, visited, order);
        }
        order.push(scope);
    }

    fn register_module(&mut self, module: &'a Module<'a>) -> ScopeId {
        let name = module.name.name;
        if let Some(existing) = self.table.module_scope(name) {
            trace!(module = name, "module scope shared with an earlier file");
            return existing;
        }
        let marker = self
            .builder
            .named_type(module.name.position, &mangled_module_name(name));
        self.table
            .register_module(name, marker, module.name.position)
    }

    // Declarations

    fn declare_struct(
        &mut self,
        scope: ScopeId,
        stmt: &'a Stmt<'a>,
        decl: &StructDecl<'a>,
    ) -> bool {
        let mut ok = true;
        for (index, field) in decl.fields.iter().enumerate() {
            if let Some(previous) = decl.fields[..index]
                .iter()
                .find(|other| other.name.name == field.name.name)
            {
                self.report(TypeCheckError::DuplicateDeclaration {
                    name: field.name.name.to_string(),
                    previous: previous.name.position,
                    position: field.name.position,
                });
                ok = false;
            }
        }
        let declared = self.declare_type(
            scope,
            stmt,
            decl.name,
            decl.visibility,
            SymbolKind::Struct,
        );
        declared && ok
    }

    fn declare_enum(&mut self, scope: ScopeId, stmt: &'a Stmt<'a>, decl: &EnumDecl<'a>) -> bool {
        let mut ok = true;
        for (index, variant) in decl.variants.iter().enumerate() {
            if let Some(previous) = decl.variants[..index]
                .iter()
                .find(|other| other.name == variant.name)
            {
                self.report(TypeCheckError::DuplicateDeclaration {
                    name: variant.name.to_string(),
                    previous: previous.position,
                    position: variant.position,
                });
                ok = false;
            }
        }
        let declared =
            self.declare_type(scope, stmt, decl.name, decl.visibility, SymbolKind::Enum);
        declared && ok
    }

    fn declare_type(
        &mut self,
        scope: ScopeId,
        stmt: &'a Stmt<'a>,
        name: Identifier<'a>,
        visibility: Option<Visibility>,
        kind: SymbolKind,
    ) -> bool {
        let ty = self.builder.named_type(name.position, name.name);
        let symbol = Symbol {
            name: name.name,
            kind,
            ty,
            is_public: visibility.is_some_and(Visibility::is_public),
            is_mutable: false,
            depth: 0,
            declaration: Some(stmt),
            position: name.position,
            module_scope: None,
        };
        match self.table.insert(scope, symbol) {
            Ok(()) => {
                self.named_types.insert(ty.id, stmt);
                true
            }
            Err(error) => {
                self.report(error);
                false
            }
        }
    }

    /// Registers the arrow type of a function in `scope`. A function with a
    /// broken signature is still registered so that calls to it do not
    /// cascade into unknown-identifier errors, but its body is skipped.
    fn declare_function(&mut self, scope: ScopeId, stmt: &'a Stmt<'a>, decl: &FunctionDecl<'a>) {
        let name = decl.name.name;
        let is_main = name == "main" && self.table.scope(scope).module.is_some();
        let mut valid = true;

        let return_type = if let Some(ty) = decl.return_type {
            valid &= self.validate_type(scope, ty);
            ty
        } else {
            self.report(TypeCheckError::MissingReturnType {
                name: name.to_string(),
                position: decl.name.position,
            });
            valid = false;
            self.builtins.void
        };
        if is_main {
            if decl.return_type.is_some() && !return_type.is_basic(BasicType::Int) {
                self.report(TypeCheckError::InvalidMain {
                    found: return_type.to_string(),
                    position: return_type.position,
                });
                valid = false;
            }
            if decl.visibility == Some(Visibility::Private) {
                self.report(TypeCheckError::PrivateMain {
                    position: stmt.position,
                });
            }
        }

        let mut params = self.builder.vec();
        for (index, param) in decl.params.iter().enumerate() {
            if let Some(ty) = param.ty {
                valid &= self.validate_type(scope, ty);
                params.push(ty);
            }
            if param.name.is_none() || param.ty.is_none() {
                self.report(TypeCheckError::IncompleteParameter {
                    function: name.to_string(),
                    index: index + 1,
                    position: param.position,
                });
                valid = false;
            }
        }
        let arrow = self
            .builder
            .function_type(decl.name.position, params.into_bump_slice(), return_type);

        let symbol = Symbol {
            name,
            kind: SymbolKind::Function,
            ty: arrow,
            is_public: is_main || decl.visibility.is_some_and(Visibility::is_public),
            is_mutable: false,
            depth: 0,
            declaration: Some(stmt),
            position: decl.name.position,
            module_scope: None,
        };
        if let Err(error) = self.table.insert(scope, symbol) {
            self.report(error);
            valid = false;
        }
        if !valid {
            self.invalid_functions.insert(stmt.id);
        }
        trace!(function = name, %arrow, valid, "declared function");
    }

    /// Named types must refer to a declared struct or enum.
    fn validate_type(&mut self, scope: ScopeId, ty: &'a TypeNode<'a>) -> bool {
        match &ty.kind {
            TypeKind::Basic(_) => true,
            TypeKind::Pointer(inner) | TypeKind::Array { element: inner, .. } => {
                self.validate_type(scope, inner)
            }
            TypeKind::Function {
                params,
                return_type,
            } => {
                let mut ok = true;
                for param in *params {
                    ok &= self.validate_type(scope, param);
                }
                self.validate_type(scope, return_type) && ok
            }
            TypeKind::Named(name) => self.resolve_named_type(scope, ty, name),
        }
    }

    /// Binds the named type node `ty` to the struct or enum it names: a
    /// declaration in lexical scope first, then a type of an imported module.
    fn resolve_named_type(&mut self, scope: ScopeId, ty: &'a TypeNode<'a>, name: &str) -> bool {
        let local = self
            .table
            .lookup(scope, name)
            .filter(|symbol| symbol.kind.is_type())
            .and_then(|symbol| symbol.declaration);
        let resolved = match local {
            Some(decl) => Ok(Some(decl)),
            None => self
                .table
                .resolve_imported_type(scope, name)
                .map(|symbol| symbol.and_then(|symbol| symbol.declaration)),
        };
        match resolved {
            Ok(Some(decl)) => {
                self.named_types.insert(ty.id, decl);
                true
            }
            Err(QualifiedLookupError::Private { module }) => {
                self.report(TypeCheckError::PrivateAccess {
                    module,
                    name: name.to_string(),
                    position: ty.position,
                });
                false
            }
            Ok(None) | Err(_) => {
                self.report(TypeCheckError::UnknownType {
                    name: name.to_string(),
                    position: ty.position,
                });
                false
            }
        }
    }

    // Statements

    fn check_function_body(
        &mut self,
        scope: ScopeId,
        stmt: &'a Stmt<'a>,
        decl: &FunctionDecl<'a>,
    ) -> bool {
        if self.invalid_functions.contains(&stmt.id) {
            return false;
        }
        let function_scope =
            self.table
                .push_scope(scope, decl.name.name, ScopeKind::Function, Some(stmt));
        let mut ok = true;
        for param in decl.params {
            let (Some(name), Some(ty)) = (param.name, param.ty) else {
                continue;
            };
            let symbol = Symbol {
                name: name.name,
                kind: SymbolKind::Parameter,
                ty,
                is_public: false,
                is_mutable: true,
                depth: 0,
                declaration: Some(stmt),
                position: name.position,
                module_scope: None,
            };
            if let Err(error) = self.table.insert(function_scope, symbol) {
                self.report(error);
                ok = false;
            }
        }
        ok &= self.check_statements(function_scope, decl.body.statements);

        if let Some(return_type) = decl.return_type
            && !return_type.is_void()
            && !block_returns(decl.body.statements)
        {
            self.report(TypeCheckError::MissingReturn {
                name: decl.name.name.to_string(),
                expected: return_type.to_string(),
                position: decl.name.position,
            });
            ok = false;
        }
        ok
    }

    fn check_statements(&mut self, scope: ScopeId, statements: &'a [&'a Stmt<'a>]) -> bool {
        let mut ok = true;
        for stmt in statements {
            ok &= self.check_statement(scope, stmt);
        }
        ok
    }

    fn check_block(&mut self, parent: ScopeId, block: &'a Block<'a>) -> bool {
        let scope = self.table.push_scope(parent, "block", ScopeKind::Block, None);
        self.check_statements(scope, block.statements)
    }

    fn check_statement(&mut self, scope: ScopeId, stmt: &'a Stmt<'a>) -> bool {
        match &stmt.kind {
            StmtKind::Expression(expr) => self.infer(scope, expr).is_some(),
            StmtKind::VarDecl(decl) => self.check_var_decl(scope, stmt, decl),
            StmtKind::Function(decl) => {
                self.declare_function(scope, stmt, decl);
                self.check_function_body(scope, stmt, decl)
            }
            StmtKind::Struct(decl) => {
                let mut ok = self.declare_struct(scope, stmt, decl);
                for field in decl.fields {
                    ok &= self.validate_type(scope, field.ty);
                }
                ok
            }
            StmtKind::Enum(decl) => self.declare_enum(scope, stmt, decl),
            StmtKind::If(if_stmt) => self.check_if(scope, if_stmt),
            StmtKind::Loop(loop_stmt) => self.check_loop(scope, stmt, loop_stmt),
            StmtKind::Block(block) => self.check_block(scope, block),
            StmtKind::Return(value) => self.check_return(scope, stmt, *value),
            StmtKind::Break => self.check_loop_control(scope, stmt, "break"),
            StmtKind::Continue => self.check_loop_control(scope, stmt, "continue"),
            StmtKind::Print(args) => {
                let mut ok = true;
                for arg in *args {
                    match self.infer(scope, arg) {
                        Some(ty) if ty.is_void() => {
                            self.report(TypeCheckError::InvalidPrintArgument {
                                found: ty.to_string(),
                                position: arg.position,
                            });
                            ok = false;
                        }
                        Some(_) => {}
                        None => ok = false,
                    }
                }
                ok
            }
            StmtKind::Use(directive) => self.check_use(scope, stmt, directive),
        }
    }

    fn check_var_decl(&mut self, scope: ScopeId, stmt: &'a Stmt<'a>, decl: &VarDecl<'a>) -> bool {
        let name = decl.name.name;
        let mut ok = true;

        let declared = match decl.ty {
            Some(ty) if self.validate_type(scope, ty) => Some(ty),
            Some(_) => {
                ok = false;
                None
            }
            None => None,
        };
        // The initializer is checked before the name is bound, so `let x = x;`
        // refers to an outer `x`.
        let value = match decl.value {
            Some(expr) => {
                let ty = self.infer(scope, expr);
                ok &= ty.is_some();
                ty.map(|ty| (expr, ty))
            }
            None => None,
        };
        if let (Some(declared), Some((expr, ty))) = (declared, value)
            && !self.coerces(expr, ty, declared)
        {
            self.report(TypeCheckError::TypeMismatch {
                expected: declared.to_string(),
                found: ty.to_string(),
                context: TypeMismatchContext::Initializer {
                    name: name.to_string(),
                },
                position: expr.position,
            });
            ok = false;
        }

        let resolved = declared.or_else(|| {
            value
                .map(|(_, ty)| ty)
                .filter(|ty| is_inferable(ty))
        });
        let Some(resolved) = resolved else {
            if ok {
                self.report(TypeCheckError::CannotInferType {
                    name: name.to_string(),
                    position: decl.name.position,
                });
            }
            return false;
        };
        if resolved.is_void() {
            self.report(TypeCheckError::VoidVariable {
                name: name.to_string(),
                position: decl.name.position,
            });
            return false;
        }

        let symbol = Symbol {
            name,
            kind: if decl.is_const {
                SymbolKind::Constant
            } else {
                SymbolKind::Variable
            },
            ty: resolved,
            is_public: decl.visibility.is_some_and(Visibility::is_public),
            is_mutable: !decl.is_const,
            depth: 0,
            declaration: Some(stmt),
            position: decl.name.position,
            module_scope: None,
        };
        if let Err(error) = self.table.insert(scope, symbol) {
            self.report(error);
            ok = false;
        }
        ok
    }

    fn check_use(&mut self, scope: ScopeId, stmt: &'a Stmt<'a>, directive: &UseDirective<'a>) -> bool {
        let module_name = directive.module.name;
        let Some(target) = self.table.module_scope(module_name) else {
            self.report(TypeCheckError::UnknownModule {
                name: module_name.to_string(),
                position: directive.module.position,
            });
            return false;
        };
        let alias = directive.binding();
        let previous = self
            .table
            .scope(scope)
            .imports
            .iter()
            .find(|import| import.alias == alias.name)
            .map(|import| import.position);
        if let Some(previous) = previous {
            self.report(TypeCheckError::DuplicateDeclaration {
                name: alias.name.to_string(),
                previous,
                position: alias.position,
            });
            return false;
        }
        trace!(module = module_name, alias = alias.name, "import");
        self.table.add_import(
            scope,
            ModuleImport {
                module_name,
                alias: alias.name,
                target,
                position: stmt.position,
            },
        );
        true
    }

    fn check_if(&mut self, scope: ScopeId, if_stmt: &IfStmt<'a>) -> bool {
        let mut ok = true;
        for branch in if_stmt.branches {
            ok &= self.check_condition(scope, branch.condition);
            ok &= self.check_block(scope, branch.body);
        }
        if let Some(else_branch) = if_stmt.else_branch {
            ok &= self.check_block(scope, else_branch);
        }
        ok
    }

    /// The `for` initializer and condition live in the loop scope; the body
    /// gets a child of it.
    fn check_loop(&mut self, scope: ScopeId, stmt: &'a Stmt<'a>, loop_stmt: &LoopStmt<'a>) -> bool {
        let loop_scope = self
            .table
            .push_scope(scope, "loop", ScopeKind::Loop, Some(stmt));
        let mut ok = true;
        match &loop_stmt.kind {
            LoopKind::Infinite => {}
            LoopKind::While { condition } => {
                ok &= self.check_condition(loop_scope, condition);
            }
            LoopKind::For {
                init,
                condition,
                step,
            } => {
                if let Some(init) = init {
                    ok &= self.check_statement(loop_scope, init);
                }
                if let Some(condition) = condition {
                    ok &= self.check_condition(loop_scope, condition);
                }
                if let Some(step) = step {
                    ok &= self.infer(loop_scope, step).is_some();
                }
            }
        }
        ok &= self.check_block(loop_scope, loop_stmt.body);
        ok
    }

    fn check_return(&mut self, scope: ScopeId, stmt: &'a Stmt<'a>, value: Option<&'a Expr<'a>>) -> bool {
        let Some(declaration) = self.table.enclosing_function(scope).map(|f| f.declaration) else {
            self.report(TypeCheckError::ReturnOutsideFunction {
                position: stmt.position,
            });
            return false;
        };
        let expected = declaration
            .and_then(|stmt| stmt.as_function())
            .and_then(|function| function.return_type)
            .unwrap_or(self.builtins.void);

        match value {
            Some(value) => {
                let Some(found) = self.infer(scope, value) else {
                    return false;
                };
                if (expected.is_void() && !found.is_void())
                    || (!expected.is_void() && !self.coerces(value, found, expected))
                {
                    self.report(TypeCheckError::TypeMismatch {
                        expected: expected.to_string(),
                        found: found.to_string(),
                        context: TypeMismatchContext::Return,
                        position: value.position,
                    });
                    return false;
                }
                true
            }
            None if !expected.is_void() => {
                self.report(TypeCheckError::TypeMismatch {
                    expected: expected.to_string(),
                    found: BasicType::Void.name().to_string(),
                    context: TypeMismatchContext::Return,
                    position: stmt.position,
                });
                false
            }
            None => true,
        }
    }

    fn check_loop_control(&mut self, scope: ScopeId, stmt: &'a Stmt<'a>, keyword: &'static str) -> bool {
        if self.table.in_loop(scope) {
            return true;
        }
        self.report(TypeCheckError::OutsideLoop {
            keyword,
            position: stmt.position,
        });
        false
    }

    fn check_condition(&mut self, scope: ScopeId, condition: &'a Expr<'a>) -> bool {
        let Some(ty) = self.infer(scope, condition) else {
            return false;
        };
        if types_match(ty, self.builtins.bool).is_match() {
            return true;
        }
        self.report(TypeCheckError::TypeMismatch {
            expected: BasicType::Bool.name().to_string(),
            found: ty.to_string(),
            context: TypeMismatchContext::Condition,
            position: condition.position,
        });
        false
    }

    // Expressions

    /// Infers the type of `expr` and records it in the typed context.
    fn infer(&mut self, scope: ScopeId, expr: &'a Expr<'a>) -> Option<&'a TypeNode<'a>> {
        let ty = self.infer_kind(scope, expr)?;
        self.expr_types.insert(expr.id, ty);
        Some(ty)
    }

    fn infer_kind(&mut self, scope: ScopeId, expr: &'a Expr<'a>) -> Option<&'a TypeNode<'a>> {
        match &expr.kind {
            ExprKind::Literal(value) => Some(match value {
                LiteralValue::Int(_) => self.builtins.int,
                LiteralValue::Float(_) => self.builtins.float,
                LiteralValue::Str(_) => self.builtins.string,
                LiteralValue::Char(_) => self.builtins.char,
                LiteralValue::Bool(_) => self.builtins.bool,
                LiteralValue::Null => self.builtins.null,
            }),
            ExprKind::Identifier(name) => self.infer_identifier(scope, name, expr.position),
            ExprKind::Binary { op, left, right } => {
                let left_ty = self.infer(scope, left);
                let right_ty = self.infer(scope, right);
                let (left_ty, right_ty) = (left_ty?, right_ty?);
                self.binary_result(op.symbol(), op.class(), left_ty, right_ty, expr.position)
            }
            ExprKind::Unary { op, operand } => self.infer_unary(scope, *op, operand, expr.position),
            ExprKind::Postfix { op, operand } => self.infer_postfix(scope, *op, operand),
            ExprKind::Assign { op, target, value } => {
                let target_ty = self.infer(scope, target);
                let value_ty = self.infer(scope, value);
                let (target_ty, value_ty) = (target_ty?, value_ty?);
                if !target.is_place() {
                    self.report(TypeCheckError::InvalidAssignmentTarget {
                        position: target.position,
                    });
                    return None;
                }
                if !self.check_mutable(scope, target) {
                    return None;
                }
                if let Some(binary) = op.binary_op() {
                    self.binary_result(
                        binary.symbol(),
                        binary.class(),
                        target_ty,
                        value_ty,
                        expr.position,
                    )?;
                } else if !self.coerces(value, value_ty, target_ty) {
                    self.report(TypeCheckError::TypeMismatch {
                        expected: target_ty.to_string(),
                        found: value_ty.to_string(),
                        context: TypeMismatchContext::Assignment,
                        position: value.position,
                    });
                    return None;
                }
                Some(target_ty)
            }
            ExprKind::Ternary {
                condition,
                then_branch,
                else_branch,
            } => {
                let condition_ok = self.check_condition(scope, condition);
                let then_ty = self.infer(scope, then_branch);
                let else_ty = self.infer(scope, else_branch);
                let (then_ty, else_ty) = (then_ty?, else_ty?);
                if !condition_ok {
                    return None;
                }
                if types_match(then_ty, else_ty).is_match() {
                    Some(then_ty)
                } else if then_ty.is_basic(BasicType::Null) && else_ty.is_pointer() {
                    Some(else_ty)
                } else if else_ty.is_basic(BasicType::Null) && then_ty.is_pointer() {
                    Some(then_ty)
                } else {
                    self.report(TypeCheckError::TypeMismatch {
                        expected: then_ty.to_string(),
                        found: else_ty.to_string(),
                        context: TypeMismatchContext::TernaryBranches,
                        position: else_branch.position,
                    });
                    None
                }
            }
            ExprKind::Call { callee, args } => self.infer_call(scope, expr, callee, args),
            ExprKind::Member { object, member } => {
                self.infer_member(scope, object, member.name, member.position)
            }
            ExprKind::Index { object, index } => {
                let object_ty = self.infer(scope, object);
                let index_ty = self.infer(scope, index);
                let (object_ty, index_ty) = (object_ty?, index_ty?);
                if !index_ty.is_integral() {
                    self.report(TypeCheckError::TypeMismatch {
                        expected: BasicType::Int.name().to_string(),
                        found: index_ty.to_string(),
                        context: TypeMismatchContext::Index,
                        position: index.position,
                    });
                    return None;
                }
                match object_ty.kind {
                    TypeKind::Array { element, .. } => Some(element),
                    TypeKind::Pointer(pointee) => Some(pointee),
                    TypeKind::Basic(BasicType::String) => Some(self.builtins.char),
                    _ => {
                        self.report(TypeCheckError::NotIndexable {
                            found: object_ty.to_string(),
                            position: object.position,
                        });
                        None
                    }
                }
            }
            ExprKind::ArrayLiteral(elements) => self.infer_array_literal(scope, expr, elements),
            ExprKind::Grouping(inner) => self.infer(scope, inner),
        }
    }

    fn infer_identifier(
        &mut self,
        scope: ScopeId,
        name: &'a str,
        position: Position,
    ) -> Option<&'a TypeNode<'a>> {
        match self.table.lookup(scope, name).copied() {
            Some(symbol) if symbol.kind.is_type() => {
                self.report(TypeCheckError::TypeUsedAsValue {
                    name: name.to_string(),
                    position,
                });
                None
            }
            Some(symbol) => Some(symbol.ty),
            None => {
                let key = format!("identifier:{}:{name}", self.module_path());
                self.report_dedup(
                    key,
                    TypeCheckError::UnknownIdentifier {
                        name: name.to_string(),
                        position,
                    },
                );
                None
            }
        }
    }

    fn binary_result(
        &mut self,
        operator: &'static str,
        class: OperatorClass,
        left: &'a TypeNode<'a>,
        right: &'a TypeNode<'a>,
        position: Position,
    ) -> Option<&'a TypeNode<'a>> {
        let (accepted, expected) = match class {
            OperatorClass::Logical => return Some(self.builtins.bool),
            OperatorClass::Arithmetic => {
                (left.is_numeric() && right.is_numeric(), "numeric operands")
            }
            OperatorClass::Bitwise | OperatorClass::Shift => {
                (left.is_integral() && right.is_integral(), "integral operands")
            }
            OperatorClass::Equality | OperatorClass::Relational => {
                let null_pointer = (left.is_basic(BasicType::Null) && right.is_pointer())
                    || (right.is_basic(BasicType::Null) && left.is_pointer());
                if types_match(left, right).is_match() || null_pointer {
                    return Some(self.builtins.bool);
                }
                (false, "operands of matching types")
            }
        };
        if accepted {
            return Some(wider(left, right));
        }
        self.report(TypeCheckError::InvalidBinaryOperands {
            operator,
            left: left.to_string(),
            right: right.to_string(),
            expected,
            position,
        });
        None
    }

    fn infer_unary(
        &mut self,
        scope: ScopeId,
        op: UnaryOp,
        operand: &'a Expr<'a>,
        position: Position,
    ) -> Option<&'a TypeNode<'a>> {
        let ty = self.infer(scope, operand)?;
        let (result, expected) = match op {
            UnaryOp::Neg => (ty.is_numeric().then_some(ty), "a numeric operand"),
            UnaryOp::Not => (Some(self.builtins.bool), ""),
            UnaryOp::BitNot => (ty.is_integral().then_some(ty), "an integral operand"),
            UnaryOp::Deref => match ty.kind {
                TypeKind::Pointer(pointee) => (Some(pointee), ""),
                _ => (None, "a pointer operand"),
            },
            UnaryOp::AddressOf => (
                operand
                    .is_place()
                    .then(|| self.builder.pointer_type(position, ty)),
                "an addressable operand",
            ),
        };
        if result.is_none() {
            self.report(TypeCheckError::InvalidUnaryOperand {
                operator: op.symbol(),
                operand: ty.to_string(),
                expected,
                position,
            });
        }
        result
    }

    fn infer_postfix(
        &mut self,
        scope: ScopeId,
        op: PostfixOp,
        operand: &'a Expr<'a>,
    ) -> Option<&'a TypeNode<'a>> {
        let ty = self.infer(scope, operand)?;
        if !ty.is_numeric() || !operand.is_place() {
            self.report(TypeCheckError::InvalidUnaryOperand {
                operator: op.symbol(),
                operand: ty.to_string(),
                expected: "a numeric variable",
                position: operand.position,
            });
            return None;
        }
        self.check_mutable(scope, operand).then_some(ty)
    }

    fn infer_call(
        &mut self,
        scope: ScopeId,
        expr: &'a Expr<'a>,
        callee: &'a Expr<'a>,
        args: &'a [&'a Expr<'a>],
    ) -> Option<&'a TypeNode<'a>> {
        let callee_ty = self.infer(scope, callee);
        let arg_types: Vec<_> = args.iter().map(|arg| self.infer(scope, arg)).collect();
        let callee_ty = callee_ty?;
        let TypeKind::Function {
            params,
            return_type,
        } = callee_ty.kind
        else {
            self.report(TypeCheckError::NotCallable {
                found: callee_ty.to_string(),
                position: callee.position,
            });
            return None;
        };
        let name = callee_name(callee);
        if params.len() != args.len() {
            self.report(TypeCheckError::ArgumentCountMismatch {
                name,
                expected: params.len(),
                found: args.len(),
                position: expr.position,
            });
            return None;
        }
        let mut ok = true;
        for (index, ((arg, arg_ty), param)) in args.iter().zip(arg_types).zip(params).enumerate() {
            let Some(arg_ty) = arg_ty else {
                ok = false;
                continue;
            };
            if !self.coerces(arg, arg_ty, param) {
                self.report(TypeCheckError::TypeMismatch {
                    expected: param.to_string(),
                    found: arg_ty.to_string(),
                    context: TypeMismatchContext::Argument {
                        function: name.clone(),
                        index: index + 1,
                    },
                    position: arg.position,
                });
                ok = false;
            }
        }
        ok.then_some(return_type)
    }

    /// `Enum.Variant`, `alias.symbol` or `value.field`, tried in that order.
    fn infer_member(
        &mut self,
        scope: ScopeId,
        object: &'a Expr<'a>,
        member: &'a str,
        position: Position,
    ) -> Option<&'a TypeNode<'a>> {
        if let Some((decl, ty)) = self.enum_target(scope, object) {
            if decl.has_variant(member) {
                return Some(ty);
            }
            self.report(TypeCheckError::VariantNotFound {
                enum_name: decl.name.name.to_string(),
                variant: member.to_string(),
                position,
            });
            return None;
        }

        if let Some(alias) = self.module_alias(scope, object) {
            let resolved = self.table.resolve_qualified(scope, alias, member).copied();
            return match resolved {
                Ok(symbol) if symbol.kind.is_type() => {
                    self.report(TypeCheckError::TypeUsedAsValue {
                        name: format!("{alias}.{member}"),
                        position: object.position,
                    });
                    None
                }
                Ok(symbol) => Some(symbol.ty),
                Err(QualifiedLookupError::Private { module }) => {
                    self.report(TypeCheckError::PrivateAccess {
                        module,
                        name: member.to_string(),
                        position: object.position,
                    });
                    None
                }
                Err(QualifiedLookupError::Missing { module }) => {
                    self.report(TypeCheckError::UnknownModuleMember {
                        module,
                        name: member.to_string(),
                        position: object.position,
                    });
                    None
                }
                Err(QualifiedLookupError::UnknownAlias) => {
                    self.report(TypeCheckError::UnknownIdentifier {
                        name: alias.to_string(),
                        position: object.position,
                    });
                    None
                }
            };
        }

        let object_ty = self.infer(scope, object)?;
        // Fields are reachable through one level of pointer.
        let struct_ty = match object_ty.kind {
            TypeKind::Pointer(pointee) => pointee,
            _ => object_ty,
        };
        let decl = self
            .named_types
            .get(&struct_ty.id)
            .and_then(|stmt| stmt.as_struct());
        let Some(decl) = decl else {
            self.report(TypeCheckError::InvalidMemberAccess {
                found: object_ty.to_string(),
                position,
            });
            return None;
        };
        if let Some(field) = decl.field(member) {
            return Some(field.ty);
        }
        self.report(TypeCheckError::FieldNotFound {
            struct_name: decl.name.name.to_string(),
            field: member.to_string(),
            position,
        });
        None
    }

    fn infer_array_literal(
        &mut self,
        scope: ScopeId,
        expr: &'a Expr<'a>,
        elements: &'a [&'a Expr<'a>],
    ) -> Option<&'a TypeNode<'a>> {
        let types: Vec<_> = elements.iter().map(|e| self.infer(scope, e)).collect();
        let length = u64::try_from(elements.len()).ok();
        let Some(first) = types.first() else {
            return Some(self.builder.array_type(expr.position, self.builtins.void, length));
        };
        let first = (*first)?;
        let mut ok = true;
        for (index, (element, ty)) in elements.iter().zip(&types).enumerate().skip(1) {
            let Some(ty) = *ty else {
                ok = false;
                continue;
            };
            if !self.coerces(element, ty, first) {
                self.report(TypeCheckError::TypeMismatch {
                    expected: first.to_string(),
                    found: ty.to_string(),
                    context: TypeMismatchContext::ArrayElement { index },
                    position: element.position,
                });
                ok = false;
            }
        }
        ok.then(|| self.builder.array_type(expr.position, first, length))
    }

    /// Enum declaration named by `object`, either `Enum` or `alias.Enum`.
    fn enum_target(
        &self,
        scope: ScopeId,
        object: &'a Expr<'a>,
    ) -> Option<(&'a EnumDecl<'a>, &'a TypeNode<'a>)> {
        let symbol = match &object.ungrouped().kind {
            ExprKind::Identifier(name) => self.table.lookup(scope, name).copied()?,
            ExprKind::Member { object, member } => {
                let alias = self.module_alias(scope, object)?;
                self.table
                    .resolve_qualified(scope, alias, member.name)
                    .ok()
                    .copied()?
            }
            _ => return None,
        };
        if symbol.kind != SymbolKind::Enum {
            return None;
        }
        let decl = symbol.declaration?.as_enum()?;
        Some((decl, symbol.ty))
    }

    /// `object` names an imported module: an identifier with no ordinary
    /// declaration in scope but an import bound to it.
    fn module_alias(&self, scope: ScopeId, object: &'a Expr<'a>) -> Option<&'a str> {
        let name = object.ungrouped().as_identifier()?;
        if self.table.lookup(scope, name).is_some() {
            return None;
        }
        self.table.find_import(scope, name).map(|_| name)
    }

    /// Reports an error when `target` is rooted in something that cannot change.
    fn check_mutable(&mut self, scope: ScopeId, target: &'a Expr<'a>) -> bool {
        let target = target.ungrouped();
        match &target.kind {
            ExprKind::Identifier(name) => {
                let immutable = self
                    .table
                    .lookup(scope, name)
                    .is_some_and(|symbol| !symbol.is_mutable);
                if immutable {
                    self.report(TypeCheckError::AssignToImmutable {
                        name: (*name).to_string(),
                        position: target.position,
                    });
                }
                !immutable
            }
            ExprKind::Member { object, member } => {
                if let Some(alias) = self.module_alias(scope, object) {
                    let immutable = self
                        .table
                        .resolve_qualified(scope, alias, member.name)
                        .is_ok_and(|symbol| !symbol.is_mutable);
                    if immutable {
                        self.report(TypeCheckError::AssignToImmutable {
                            name: format!("{alias}.{}", member.name),
                            position: target.position,
                        });
                    }
                    return !immutable;
                }
                if self.enum_target(scope, object).is_some() {
                    self.report(TypeCheckError::AssignToImmutable {
                        name: member.name.to_string(),
                        position: member.position,
                    });
                    return false;
                }
                self.through_pointer(object) || self.check_mutable(scope, object)
            }
            ExprKind::Index { object, .. } => {
                self.through_pointer(object) || self.check_mutable(scope, object)
            }
            _ => true,
        }
    }

    fn through_pointer(&self, object: &Expr<'a>) -> bool {
        self.expr_types
            .get(&object.id)
            .is_some_and(|ty| ty.is_pointer())
    }

    /// Whether a value of type `found` produced by `expr` may be stored where
    /// `expected` is required.
    fn coerces(&self, expr: &Expr<'a>, found: &TypeNode<'a>, expected: &TypeNode<'a>) -> bool {
        if !self.same_declarations(found, expected) {
            return false;
        }
        if types_match(found, expected).is_match() {
            return true;
        }
        if found.is_basic(BasicType::Null) && expected.is_pointer() {
            return true;
        }
        if let TypeKind::Array {
            element,
            length: Some(0),
        } = found.kind
            && element.is_void()
            && matches!(expected.kind, TypeKind::Array { .. })
        {
            return true;
        }
        expected.is_numeric() && found.is_numeric() && is_numeric_literal(expr)
    }

    /// Named types are compared by spelling; two modules may still declare
    /// distinct types of the same name.
    fn same_declarations(&self, a: &TypeNode<'a>, b: &TypeNode<'a>) -> bool {
        match (&a.kind, &b.kind) {
            (TypeKind::Named(_), TypeKind::Named(_)) => {
                match (self.named_types.get(&a.id), self.named_types.get(&b.id)) {
                    (Some(left), Some(right)) => std::ptr::eq(*left, *right),
                    _ => true,
                }
            }
            (TypeKind::Pointer(left), TypeKind::Pointer(right))
            | (
                TypeKind::Array { element: left, .. },
                TypeKind::Array { element: right, .. },
            ) => self.same_declarations(left, right),
            _ => true,
        }
    }

    // Reporting

    fn module_path(&self) -> &'a str {
        self.module.map_or("", |module| module.path)
    }

    fn report(&mut self, error: TypeCheckError) {
        if error.is_warning() {
            self.warnings += 1;
        } else {
            self.errors += 1;
        }
        debug!(position = %error.position(), "{error}");
        let diagnostic = match self.module {
            Some(module) => error.to_diagnostic(module),
            None => Diagnostic::type_error("", error.to_string(), error.position()),
        };
        self.diagnostics.add(diagnostic);
    }

    /// Reports `error` only the first time `key` is seen.
    fn report_dedup(&mut self, key: String, error: TypeCheckError) {
        if self.reported.insert(key) {
            self.report(error);
        }
    }
}

/// The operand ranking higher in char < int < float < double.
fn wider<'a>(left: &'a TypeNode<'a>, right: &'a TypeNode<'a>) -> &'a TypeNode<'a> {
    let rank = |ty: &TypeNode<'_>| ty.as_basic().and_then(BasicType::numeric_rank);
    if rank(right) > rank(left) { right } else { left }
}

fn is_inferable(ty: &TypeNode<'_>) -> bool {
    match ty.kind {
        TypeKind::Basic(BasicType::Null) => false,
        TypeKind::Array { element, .. } => !element.is_void(),
        _ => true,
    }
}

fn is_numeric_literal(expr: &Expr<'_>) -> bool {
    match &expr.ungrouped().kind {
        ExprKind::Literal(LiteralValue::Int(_) | LiteralValue::Float(_) | LiteralValue::Char(_)) => {
            true
        }
        ExprKind::Unary {
            op: UnaryOp::Neg,
            operand,
        } => is_numeric_literal(operand),
        _ => false,
    }
}

fn callee_name(callee: &Expr<'_>) -> String {
    match &callee.ungrouped().kind {
        ExprKind::Identifier(name) => (*name).to_string(),
        ExprKind::Member { object, member } => format!("{}.{}", callee_name(object), member.name),
        _ => "<expression>".to_string(),
    }
}

/// Whether control can never fall off the end of `statements`.
fn block_returns(statements: &[&Stmt<'_>]) -> bool {
    statements.iter().any(|stmt| stmt_returns(stmt))
}

fn stmt_returns(stmt: &Stmt<'_>) -> bool {
    match &stmt.kind {
        StmtKind::Return(_) => true,
        StmtKind::Block(block) => block_returns(block.statements),
        StmtKind::If(if_stmt) => {
            if_stmt
                .else_branch
                .is_some_and(|block| block_returns(block.statements))
                && if_stmt
                    .branches
                    .iter()
                    .all(|branch| block_returns(branch.body.statements))
        }
        StmtKind::Loop(loop_stmt) => {
            let infinite = matches!(
                loop_stmt.kind,
                LoopKind::Infinite | LoopKind::For { condition: None, .. }
            );
            infinite && !breaks_out(loop_stmt.body.statements)
        }
        _ => false,
    }
}

/// A `break` that targets the loop owning `statements`; nested loops and
/// functions own their own breaks.
fn breaks_out(statements: &[&Stmt<'_>]) -> bool {
    statements.iter().any(|stmt| match &stmt.kind {
        StmtKind::Break => true,
        StmtKind::Block(block) => breaks_out(block.statements),
        StmtKind::If(if_stmt) => {
            if_stmt
                .branches
                .iter()
                .any(|branch| breaks_out(branch.body.statements))
                || if_stmt
                    .else_branch
                    .is_some_and(|block| breaks_out(block.statements))
        }
        _ => false,
    })
}
