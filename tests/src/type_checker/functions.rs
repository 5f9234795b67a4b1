//! Function signatures, `main` and return paths.

use crate::utils::{assert_clean, check_source};

#[test]
fn main_must_return_int() {
    let report = check_source("fn main() -> float { return 1.0; }");
    assert_eq!(report.errors, ["`main` must return `int`, found `float`"]);
}

#[test]
fn private_main_is_a_warning() {
    let report = check_source("priv fn main() -> int { return 0; }");
    assert!(report.errors.is_empty());
    assert_eq!(
        report.warnings,
        ["`main` is declared `priv` but entry points are always public"]
    );
}

#[test]
fn return_type_is_required() {
    let report = check_source("fn helper() { }\nfn main() -> int { return 0; }");
    assert_eq!(report.errors, ["function `helper` is missing a return type"]);
}

#[test]
fn incomplete_parameters_are_rejected() {
    let report = check_source("fn f(a, b: int) -> int { return b; }\nfn main() -> int { return 0; }");
    assert_eq!(report.errors, ["parameter 1 of `f` needs a name and a type"]);
}

#[test]
fn every_path_must_return() {
    let report = check_source(
        "fn sign(x: int) -> int { if x > 0 { return 1; } elif x < 0 { return -1; } }\n\
         fn main() -> int { return sign(2); }",
    );
    assert_eq!(
        report.errors,
        ["function `sign` must return a value of type `int` on every path"]
    );
}

#[test]
fn complete_branches_and_endless_loops_return() {
    assert_clean(&[(
        "main.cnd",
        "fn sign(x: int) -> int { if x > 0 { return 1; } elif x < 0 { return -1; } else { return 0; } }\n\
         fn spin() -> int { loop { } }\n\
         fn count() -> int { loop [;;] { return 1; } }\n\
         fn main() -> int { return sign(spin() + count()); }",
    )]);
}

#[test]
fn a_breaking_loop_does_not_return() {
    let report = check_source(
        "fn wait() -> int { loop { break; } }\nfn main() -> int { return wait(); }",
    );
    assert_eq!(
        report.errors,
        ["function `wait` must return a value of type `int` on every path"]
    );
}

#[test]
fn recursion_and_forward_calls_resolve() {
    assert_clean(&[(
        "main.cnd",
        "fn main() -> int { return even(10) ? 0 : 1; }\n\
         fn even(n: int) -> bool { return n == 0 ? true : odd(n - 1); }\n\
         fn odd(n: int) -> bool { return n == 0 ? false : even(n - 1); }",
    )]);
}

#[test]
fn arguments_are_checked_by_count_and_type() {
    let report = check_source(
        "fn pair(a: int, flag: bool) -> int { return a; }\n\
         fn main() -> int { pair(1); return pair(1, \"yes\"); }",
    );
    assert_eq!(
        report.errors,
        [
            "function `pair` expects 2 argument(s), but 1 were provided",
            "type mismatch in argument 2 of `pair`: expected `bool`, found `string`",
        ]
    );
}

#[test]
fn loop_control_needs_a_loop() {
    let report = check_source("fn main() -> int { break; continue; return 0; }");
    assert_eq!(
        report.errors,
        ["`break` outside of a loop", "`continue` outside of a loop"]
    );
}

#[test]
fn void_functions_may_fall_off_the_end() {
    assert_clean(&[(
        "main.cnd",
        "fn log(x: int) -> void { print(x); }\nfn main() -> int { log(1); return 0; }",
    )]);
}
