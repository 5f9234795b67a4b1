//! The checker keeps going after an error and reports each problem once.

use crate::utils::check_source;

#[test]
fn sibling_statements_are_still_checked() {
    let report = check_source(
        "fn main() -> int {\n    let a: bool = 1;\n    let b = missing;\n    let c: string = 2;\n    return 0;\n}",
    );
    assert_eq!(report.errors.len(), 3);
    assert!(report.has_error("`missing`"));
}

#[test]
fn later_functions_are_checked_after_a_failure() {
    let report = check_source(
        "fn broken() -> int { return nope; }\nfn also_broken() -> int { return 1 + \"x\"; }\nfn main() -> int { return 0; }",
    );
    assert_eq!(report.errors.len(), 2);
}

#[test]
fn unknown_identifier_is_reported_once_per_module() {
    let report = check_source("fn main() -> int { let a = ghost; let b = ghost; return ghost; }");
    assert_eq!(report.errors, ["use of undeclared identifier `ghost`"]);
}

#[test]
fn failed_subexpressions_do_not_cascade() {
    let report = check_source("fn main() -> int { let total = (unknown + 1) * 2; return 0; }");
    assert_eq!(report.errors, ["use of undeclared identifier `unknown`"]);
}

#[test]
fn statements_at_module_level_are_rejected() {
    let report = check_source("print(1);\nfn main() -> int { return 0; }");
    assert_eq!(
        report.errors,
        ["only declarations and '@use' directives are allowed at module level"]
    );
}
