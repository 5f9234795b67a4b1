//! Scope tree as seen through the typed context.

use cinder_type_checker::symbol_table::{ScopeId, SymbolKind};

use crate::utils::{check_source, with_typed_context};

#[test]
fn child_scope_shadows_parent() {
    let source = "\
let x: int = 1;
fn main() -> int {
    let x: float = 2.5;
    {
        let x: bool = true;
    }
    return 0;
}
";
    with_typed_context(&[("main.cnd", source)], |context| {
        let table = context.symbol_table();
        let module = context.module_scope("main").unwrap();
        assert_eq!(
            context.scope_lookup(module, "x").unwrap().ty.to_string(),
            "int"
        );

        let function = table
            .scopes()
            .find(|scope| scope.is_function_scope && scope.name == "main")
            .unwrap();
        assert_eq!(function.parent, Some(module));
        let in_function = context.scope_lookup(function.id, "x").unwrap();
        assert_eq!(in_function.ty.to_string(), "float");
        assert_eq!(in_function.depth, function.depth);

        let block: ScopeId = function.children[0];
        assert_eq!(
            context.scope_lookup(block, "x").unwrap().ty.to_string(),
            "bool"
        );
        assert!(table.lookup_current_only(block, "main").is_none());
        assert_eq!(
            context.scope_lookup(block, "main").unwrap().kind,
            SymbolKind::Function
        );
    });
}

#[test]
fn same_scope_redeclaration_is_rejected() {
    let report = check_source("fn main() -> int { let x = 1; let x = 2; return x; }");
    assert_eq!(report.errors, ["`x` is already declared in this scope"]);
}

#[test]
fn parameters_live_in_the_function_scope() {
    let report = check_source("fn f(a: int) -> int { let a = 2; return a; }\nfn main() -> int { return f(1); }");
    assert_eq!(report.errors, ["`a` is already declared in this scope"]);
}

#[test]
fn block_locals_do_not_leak() {
    let report = check_source("fn main() -> int { { let inner = 1; } return inner; }");
    assert_eq!(report.errors, ["use of undeclared identifier `inner`"]);
}

#[test]
fn loop_initializer_is_scoped_to_the_loop() {
    let report = check_source(
        "fn main() -> int { loop [let i = 0; i < 3; i++] { print(i); } return i; }",
    );
    assert_eq!(report.errors, ["use of undeclared identifier `i`"]);
}

#[test]
fn modules_are_registered_globally() {
    with_typed_context(&[("a.cnd", "@module alpha; pub let v = 1;")], |context| {
        let global = context.global_scope();
        let marker = context.scope_lookup(global, "__module_alpha").unwrap();
        assert_eq!(marker.kind, SymbolKind::Module);
        let scope = context.module_scope("alpha").unwrap();
        assert_eq!(marker.module_scope, Some(scope));
        let info = context.symbol_table().scope(scope).module.as_ref().unwrap();
        assert_eq!(info.mangled_name, "__module_alpha");
    });
}
